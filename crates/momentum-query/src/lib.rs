//! Natural-language query engine over a corpus of classified moments.
//!
//! Turns free-text questions into structured intents, executes them
//! against an in-memory corpus, and keeps a bounded conversation history
//! with follow-up suggestions. The engine is deterministic: the same
//! corpus, query, and context always produce the same result.

pub mod context;
pub mod error;
pub mod executor;
pub mod history;
pub mod orchestrator;
pub mod parser;
pub mod types;

pub use context::{ActiveView, CorpusStats, QueryContext, QueryContextBuilder};
pub use error::QueryError;
pub use executor::QueryExecutor;
pub use history::ConversationHistory;
pub use orchestrator::QueryOrchestrator;
pub use parser::QueryParser;
pub use types::{
    AggregateData, ComparisonEntry, ConversationEntry, Correlation, EntityCluster,
    EntityMentions, FactorSelector, KnownEntities, MetricKeyword, QueryData, QueryFilters,
    QueryIntent, QueryKind, QueryResults, ResultKind, SearchMetrics, Timeframe, TimelinePoint,
    TrendBucket, VisualizationHint, VisualizationKind, VisualizationSpec,
};

// Core types that appear in public fields of the query types above.
pub use momentum_core::types::{ConfidenceLevel, MacroFactor, MicroFactor, Moment, SourceKind};
