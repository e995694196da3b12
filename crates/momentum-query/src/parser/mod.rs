//! Natural-language query parsing.
//!
//! [`QueryParser::parse`] turns free-form query text into a structured
//! [`QueryIntent`]. Parsing is total: unrecognized input degrades to a
//! low-confidence search intent instead of failing.

pub mod extract;
pub mod patterns;

use momentum_core::config::ParserConfig;
use tracing::debug;

use crate::context::{ActiveView, QueryContext};
use crate::types::{KnownEntities, QueryIntent, QueryKind, Timeframe, VisualizationHint};

use self::patterns::{PatternMatch, PatternSet};

/// Parses query text into intents against a known-entity catalog.
///
/// The pattern set is compiled once at construction; `parse` itself is
/// read-only and cheap to call per query.
pub struct QueryParser {
    config: ParserConfig,
    patterns: PatternSet,
}

impl Default for QueryParser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl QueryParser {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            patterns: PatternSet::new(),
        }
    }

    /// Parse query text into an intent. Never fails.
    ///
    /// The best pattern match decides the intent kind and confidence;
    /// generic extractors fill in every field the pattern did not claim.
    /// With no pattern match the intent falls back to a search over
    /// whatever entities the text mentions.
    pub fn parse(&self, text: &str, context: &QueryContext, known: &KnownEntities) -> QueryIntent {
        let raw = text.trim();
        if raw.is_empty() {
            return QueryIntent {
                kind: QueryKind::Search,
                entities: Default::default(),
                timeframe: None,
                factors: None,
                filters: None,
                metrics: Vec::new(),
                visualization: VisualizationHint::Cards,
                confidence: self.config.fallback_confidence,
            };
        }
        let normalized = raw.to_lowercase();

        let best = self.patterns.detect(&normalized, known).into_iter().next();
        let (kind, confidence, fields) = match best {
            Some(PatternMatch {
                kind,
                confidence,
                matched_text,
                fields,
            }) => {
                let adjusted = self.adjust_confidence(
                    confidence,
                    kind,
                    context.active_view,
                    matched_text.chars().count(),
                );
                (kind, adjusted, fields)
            }
            None => (
                QueryKind::Search,
                self.config.fallback_confidence,
                Default::default(),
            ),
        };

        // Pattern-claimed fields win over the generic extractors. Entity
        // recognition runs on the raw text so capitalization cues survive.
        let entities = fields
            .entities
            .unwrap_or_else(|| extract::extract_entities(raw, known));
        let metrics = fields
            .metrics
            .unwrap_or_else(|| extract::extract_metrics(&normalized));
        let timeframe = extract::extract_timeframe(&normalized).or_else(|| {
            context
                .timeframe
                .as_ref()
                .map(|phrase| Timeframe::Phrase(phrase.clone()))
        });
        let factors = extract::extract_factors(&normalized);
        let filters = extract::extract_filters(&normalized);
        let visualization = extract::extract_visualization(&normalized)
            .unwrap_or_else(|| extract::default_visualization(kind));

        debug!(
            "Parsed query as {} intent (confidence {}): {} entities",
            kind,
            confidence,
            entities.all_names().len()
        );

        QueryIntent {
            kind,
            entities,
            timeframe,
            factors,
            filters,
            metrics,
            visualization,
            confidence,
        }
    }

    /// Apply the view-relevance boost and short-match penalty, clamped
    /// to the 0 to 100 range.
    fn adjust_confidence(
        &self,
        base: u8,
        kind: QueryKind,
        view: ActiveView,
        matched_chars: usize,
    ) -> u8 {
        let mut confidence = i16::from(base);
        if view_relevant(view, kind) {
            confidence += i16::from(self.config.view_boost);
        }
        if matched_chars < self.config.short_match_len {
            confidence -= i16::from(self.config.short_match_penalty);
        }
        confidence.clamp(0, 100) as u8
    }
}

/// Whether an intent kind is the natural one for the caller's active view.
fn view_relevant(view: ActiveView, kind: QueryKind) -> bool {
    matches!(
        (view, kind),
        (ActiveView::Dashboard, QueryKind::Aggregate | QueryKind::Analysis)
            | (ActiveView::Moments, QueryKind::Search | QueryKind::Filter)
            | (ActiveView::Companies, QueryKind::Comparison | QueryKind::Analysis)
            | (ActiveView::Technologies, QueryKind::Comparison | QueryKind::Trend)
            | (ActiveView::Network, QueryKind::Pattern | QueryKind::Analysis)
            | (ActiveView::Timeline, QueryKind::Temporal | QueryKind::Trend)
    )
}
