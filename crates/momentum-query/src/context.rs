//! Snapshot of host application state supplied with each query.

use chrono::{DateTime, Utc};
use momentum_core::types::Moment;
use serde::{Deserialize, Serialize};

/// The view the user is looking at when the query is issued.
///
/// Used by the parser to boost intents that fit the current view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveView {
    #[default]
    Dashboard,
    Moments,
    Companies,
    Technologies,
    Network,
    Timeline,
}

/// Corpus shape at snapshot time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub moment_count: usize,
    pub company_count: usize,
    pub technology_count: usize,
    /// Earliest and latest extraction timestamps, when the corpus is nonempty.
    pub date_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl CorpusStats {
    /// Compute stats from a moment slice and catalog sizes.
    pub fn from_moments(moments: &[Moment], company_count: usize, technology_count: usize) -> Self {
        let date_range = match (
            moments.iter().map(|m| m.extracted_at).min(),
            moments.iter().map(|m| m.extracted_at).max(),
        ) {
            (Some(earliest), Some(latest)) => Some((earliest, latest)),
            _ => None,
        };
        Self {
            moment_count: moments.len(),
            company_count,
            technology_count,
            date_range,
        }
    }
}

/// Per-call snapshot of application state.
///
/// The engine reads it but never mutates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryContext {
    pub active_view: ActiveView,
    /// Entity names currently selected in the host UI, if any.
    pub selected_entities: Option<Vec<String>>,
    /// Timeframe phrase the host view is currently scoped to, if any.
    pub timeframe: Option<String>,
    pub recent_queries: Vec<String>,
    pub stats: CorpusStats,
}

impl QueryContext {
    pub fn builder() -> QueryContextBuilder {
        QueryContextBuilder::default()
    }
}

/// Builds a [`QueryContext`] from host state piece by piece.
#[derive(Debug, Clone, Default)]
pub struct QueryContextBuilder {
    context: QueryContext,
}

impl QueryContextBuilder {
    pub fn active_view(mut self, view: ActiveView) -> Self {
        self.context.active_view = view;
        self
    }

    pub fn selected_entities(mut self, entities: Vec<String>) -> Self {
        self.context.selected_entities = Some(entities);
        self
    }

    pub fn timeframe(mut self, phrase: impl Into<String>) -> Self {
        self.context.timeframe = Some(phrase.into());
        self
    }

    pub fn recent_queries(mut self, queries: Vec<String>) -> Self {
        self.context.recent_queries = queries;
        self
    }

    pub fn stats(mut self, stats: CorpusStats) -> Self {
        self.context.stats = stats;
        self
    }

    /// Compute and attach stats from the corpus itself.
    pub fn stats_from_corpus(
        mut self,
        moments: &[Moment],
        company_count: usize,
        technology_count: usize,
    ) -> Self {
        self.context.stats = CorpusStats::from_moments(moments, company_count, technology_count);
        self
    }

    pub fn build(self) -> QueryContext {
        self.context
    }
}
