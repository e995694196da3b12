//! Engine facade wiring parser, executor, and history into one call.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use momentum_core::config::EngineConfig;
use momentum_core::types::Moment;

use crate::context::QueryContext;
use crate::executor::QueryExecutor;
use crate::history::ConversationHistory;
use crate::parser::QueryParser;
use crate::types::{ConversationEntry, KnownEntities};

/// Owns the engine components and runs the query lifecycle: record, parse,
/// execute, finalize.
pub struct QueryOrchestrator {
    parser: QueryParser,
    executor: QueryExecutor,
    history: ConversationHistory,
}

impl Default for QueryOrchestrator {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl QueryOrchestrator {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            parser: QueryParser::new(config.parser),
            executor: QueryExecutor::new(config.analysis),
            history: ConversationHistory::new(config.history),
        }
    }

    /// Replaces the corpus and the entity catalog behind it.
    pub fn update_data(
        &mut self,
        moments: Vec<Moment>,
        companies: Vec<String>,
        technologies: Vec<String>,
    ) {
        self.executor.update_data(moments, companies, technologies);
    }

    /// Runs one query to completion and records it in history.
    ///
    /// Never panics across this boundary: a failed pipeline produces an
    /// entry with `error` set and `results` unset.
    pub fn process_query(&mut self, text: &str, context: &QueryContext) -> ConversationEntry {
        let mut entry = ConversationEntry {
            id: Uuid::new_v4(),
            text: text.to_string(),
            timestamp: Utc::now(),
            intent: None,
            results: None,
            loading: true,
            error: None,
        };
        self.history.add(entry.clone());
        info!("Processing query: {}", text);

        let intent = self
            .parser
            .parse(text, context, self.executor.known_entities());
        entry.intent = Some(intent.clone());

        match self.executor.try_execute(&intent, context) {
            Ok(results) => entry.results = Some(results),
            Err(err) => {
                warn!("Query failed: {}", err);
                entry.error = Some(err.to_string());
            }
        }
        entry.loading = false;
        self.history.update(entry.id, entry.clone());
        entry
    }

    pub fn known_entities(&self) -> &KnownEntities {
        self.executor.known_entities()
    }

    pub fn moment_count(&self) -> usize {
        self.executor.moment_count()
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn suggestions(&self) -> Vec<String> {
        self.history.suggestions()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
