//! Bounded conversation history and follow-up suggestions.

use std::collections::VecDeque;

use tracing::debug;
use uuid::Uuid;

use momentum_core::config::HistoryConfig;

use crate::types::{ConversationEntry, Timeframe};

/// Shown alongside mined suggestions, and alone when history is empty.
const FALLBACK_SUGGESTIONS: &[&str] = &[
    "show me high impact moments",
    "what happened this week",
    "analyze recent activity",
    "how many moments this month",
    "what is trending",
];

/// Newest-first record of queries and their outcomes, bounded by capacity.
#[derive(Debug, Default)]
pub struct ConversationHistory {
    entries: VecDeque<ConversationEntry>,
    config: HistoryConfig,
}

impl ConversationHistory {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            entries: VecDeque::new(),
            config,
        }
    }

    /// Inserts at the head, evicting the oldest entries past capacity.
    pub fn add(&mut self, entry: ConversationEntry) {
        self.entries.push_front(entry);
        if self.entries.len() > self.config.capacity {
            debug!("History full, evicting oldest entries");
            self.entries.truncate(self.config.capacity);
        }
    }

    /// Replaces the entry carrying `id`. Returns false when no entry has it.
    pub fn update(&mut self, id: Uuid, entry: ConversationEntry) -> bool {
        match self.entries.iter_mut().find(|existing| existing.id == id) {
            Some(slot) => {
                *slot = entry;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `n` most recent entries, newest first.
    pub fn recent(&self, n: usize) -> Vec<&ConversationEntry> {
        self.entries.iter().take(n).collect()
    }

    /// Entries that completed with results, newest first.
    pub fn successful(&self) -> Vec<&ConversationEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.is_successful())
            .collect()
    }

    /// Raw query texts of the `n` most recent entries, newest first.
    pub fn recent_texts(&self, n: usize) -> Vec<String> {
        self.entries
            .iter()
            .take(n)
            .map(|entry| entry.text.clone())
            .collect()
    }

    /// Follow-up suggestions recombined from recent successful queries,
    /// padded with fallbacks, deduplicated case-insensitively.
    pub fn suggestions(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let mut phrases: Vec<String> = Vec::new();
        for entry in self
            .entries
            .iter()
            .filter(|entry| entry.is_successful())
            .take(self.config.suggestion_sources)
        {
            let Some(intent) = &entry.intent else {
                continue;
            };
            for name in intent.entities.all_names() {
                if !names.iter().any(|seen| seen.eq_ignore_ascii_case(&name)) {
                    names.push(name);
                }
            }
            if let Some(Timeframe::Phrase(phrase)) = &intent.timeframe {
                if !phrases.iter().any(|seen| seen.eq_ignore_ascii_case(phrase)) {
                    phrases.push(phrase.clone());
                }
            }
        }

        let mut candidates: Vec<String> = Vec::new();
        for name in names.iter().take(2) {
            candidates.push(format!("analyze {}", name));
            candidates.push(format!("show me the trend for {}", name));
        }
        if names.len() >= 2 {
            candidates.push(format!("compare {} and {}", names[0], names[1]));
        }
        if let Some(phrase) = phrases.first() {
            candidates.push(format!("what happened {}", phrase));
            if let Some(name) = names.first() {
                candidates.push(format!("show me moments about {} {}", name, phrase));
            }
        }
        candidates.extend(FALLBACK_SUGGESTIONS.iter().map(|s| s.to_string()));

        let mut suggestions: Vec<String> = Vec::new();
        let mut seen: Vec<String> = Vec::new();
        for candidate in candidates {
            if suggestions.len() >= self.config.suggestion_limit {
                break;
            }
            let lower = candidate.to_lowercase();
            if seen.contains(&lower) {
                continue;
            }
            seen.push(lower);
            suggestions.push(candidate);
        }
        suggestions
    }
}
