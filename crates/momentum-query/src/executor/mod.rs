//! Query execution over the in-memory corpus.
//!
//! [`QueryExecutor`] owns the corpus and dispatches parsed intents to the
//! eight analytical pipelines. Execution is total: [`QueryExecutor::execute`]
//! converts any pipeline error into a zero-confidence summary result, so
//! callers always receive a well-formed envelope. [`QueryExecutor::try_execute`]
//! exposes the fallible form for callers that surface errors themselves.

pub mod aggregate;
pub mod analysis;
pub mod comparison;
pub mod filters;
pub mod pattern;
pub mod search;
pub mod temporal;
pub mod trend;

use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use momentum_core::config::AnalysisConfig;
use momentum_core::types::Moment;

use crate::context::QueryContext;
use crate::error::QueryError;
use crate::types::{
    KnownEntities, QueryData, QueryIntent, QueryKind, QueryResults, ResultKind, VisualizationHint,
    VisualizationKind, VisualizationSpec,
};

/// Intermediate pipeline product, wrapped into the result envelope by the
/// dispatcher.
#[derive(Debug)]
pub(crate) struct PipelineOutput {
    pub data: QueryData,
    pub explanation: String,
    pub visualization: Option<VisualizationSpec>,
}

/// Executes parsed intents against the installed corpus.
///
/// The corpus is installed wholesale via [`QueryExecutor::update_data`] and
/// read-only during execution; the borrow checker enforces the
/// single-writer discipline.
pub struct QueryExecutor {
    moments: Vec<Moment>,
    known: KnownEntities,
    config: AnalysisConfig,
}

impl Default for QueryExecutor {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl QueryExecutor {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            moments: Vec::new(),
            known: KnownEntities::default(),
            config,
        }
    }

    /// Replace the corpus and rebuild the known-entity catalog.
    pub fn update_data(
        &mut self,
        moments: Vec<Moment>,
        companies: Vec<String>,
        technologies: Vec<String>,
    ) {
        self.known = KnownEntities::from_corpus(&moments, companies, technologies);
        info!(
            "Corpus updated: {} moments, {} companies, {} technologies",
            moments.len(),
            self.known.companies.len(),
            self.known.technologies.len()
        );
        self.moments = moments;
    }

    /// The entity catalog harvested from the installed corpus.
    pub fn known_entities(&self) -> &KnownEntities {
        &self.known
    }

    pub fn moments(&self) -> &[Moment] {
        &self.moments
    }

    pub fn moment_count(&self) -> usize {
        self.moments.len()
    }

    /// Execute an intent. Never fails; pipeline errors become a summary
    /// result with confidence 0.
    pub fn execute(&self, intent: &QueryIntent, context: &QueryContext) -> QueryResults {
        let started = Instant::now();
        match self.try_execute(intent, context) {
            Ok(results) => results,
            Err(err) => {
                warn!("Query execution failed: {}", err);
                QueryResults {
                    kind: ResultKind::Summary,
                    data: QueryData::Summary(err.to_string()),
                    visualization: None,
                    explanation: format!("The query could not be completed: {}", err),
                    confidence: 0,
                    processing_time_ms: started.elapsed().as_millis() as u64,
                }
            }
        }
    }

    /// Fallible execution: dispatch to the pipeline for the intent kind and
    /// wrap its output into the result envelope.
    pub fn try_execute(
        &self,
        intent: &QueryIntent,
        context: &QueryContext,
    ) -> Result<QueryResults, QueryError> {
        let started = Instant::now();
        let now = Utc::now();
        debug!(
            "Executing {} pipeline ({:?} view) over {} moments",
            intent.kind,
            context.active_view,
            self.moments.len()
        );

        let output = match intent.kind {
            QueryKind::Search => search::run(&self.moments, intent, &self.config, now),
            QueryKind::Analysis => analysis::run(&self.moments, intent, &self.config, now),
            QueryKind::Comparison => comparison::run(&self.moments, intent, &self.config, now),
            QueryKind::Trend => trend::run(&self.moments, intent, &self.config, now),
            QueryKind::Pattern => pattern::run(&self.moments, intent, &self.config, now),
            QueryKind::Filter => search::run_filter(&self.moments, intent, &self.config, now),
            QueryKind::Aggregate => aggregate::run(&self.moments, intent, &self.config, now),
            QueryKind::Temporal => temporal::run(&self.moments, intent, &self.config, now),
        }?;

        let elapsed = started.elapsed().as_millis() as u64;
        debug!("{} pipeline finished in {} ms", intent.kind, elapsed);

        Ok(QueryResults {
            kind: ResultKind::from(intent.kind),
            data: output.data,
            visualization: output.visualization,
            explanation: output.explanation,
            confidence: intent.confidence,
            processing_time_ms: elapsed,
        })
    }
}

/// Make the parser's hint concrete for the rendering collaborator. The
/// generic `chart` hint becomes a line for trends and a bar elsewhere.
pub(crate) fn visualization_kind(hint: VisualizationHint, kind: QueryKind) -> VisualizationKind {
    match hint {
        VisualizationHint::Cards => VisualizationKind::Cards,
        VisualizationHint::Timeline => VisualizationKind::Timeline,
        VisualizationHint::Network => VisualizationKind::Network,
        VisualizationHint::Table => VisualizationKind::Table,
        VisualizationHint::Heatmap => VisualizationKind::Heatmap,
        VisualizationHint::Chart => match kind {
            QueryKind::Trend => VisualizationKind::Line,
            _ => VisualizationKind::Bar,
        },
    }
}
