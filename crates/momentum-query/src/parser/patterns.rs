//! Regex-based query intent pattern matching.
//!
//! Provides the ordered pattern table and matching logic for detecting
//! query kinds from normalized query text. Each pattern carries a field
//! extractor that turns its capture groups into intent field overrides.

use regex::{Captures, Regex};

use super::extract;
use crate::types::{EntityMentions, KnownEntities, MetricKeyword, QueryKind};

/// Intent field overrides produced by a pattern's capture groups.
///
/// A populated field wins over the generic extractors' result for the
/// same field; `None` defers to them.
#[derive(Debug, Clone, Default)]
pub struct PatternFields {
    pub entities: Option<EntityMentions>,
    pub metrics: Option<Vec<MetricKeyword>>,
}

/// Extracts [`PatternFields`] from a pattern's captures.
pub type FieldExtractor = fn(&Captures<'_>, &KnownEntities) -> PatternFields;

/// A single compiled regex pattern linked to a query kind.
pub struct IntentPattern {
    pub regex: Regex,
    pub kind: QueryKind,
    pub base_confidence: u8,
    pub extract: FieldExtractor,
}

/// A match result from pattern detection.
#[derive(Debug, Clone)]
pub struct PatternMatch {
    pub kind: QueryKind,
    pub confidence: u8,
    pub matched_text: String,
    pub fields: PatternFields,
}

/// Collection of all intent patterns, compiled once and reused.
pub struct PatternSet {
    patterns: Vec<IntentPattern>,
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternSet {
    /// Create a new PatternSet with all compiled patterns.
    pub fn new() -> Self {
        let mut patterns = Vec::new();

        // =====================================================================
        // Search patterns
        // =====================================================================
        let search_patterns: Vec<(&str, u8, FieldExtractor)> = vec![
            (
                r"(?i)\bshow\s+me\s+(?:all\s+)?(?:moments?|events?|news)\s+(?:about|on|for|involving|related\s+to|mentioning)\s+(.+)",
                85,
                subject_fields,
            ),
            (
                r"(?i)\bfind\s+(?:all\s+)?(?:moments?|events?)\s+(?:about|on|for|involving|mentioning)\s+(.+)",
                84,
                subject_fields,
            ),
            (
                r"(?i)\b(?:moments?|events?)\s+(?:about|involving|mentioning)\s+(.+)",
                78,
                subject_fields,
            ),
            (r"(?i)\bsearch\s+(?:for\s+)?(.+)", 75, subject_fields),
            (r"(?i)\bshow\s+me\b(.*)", 72, subject_fields),
            (r"(?i)\banything\s+(?:about|on)\s+(.+)", 70, subject_fields),
            (r"(?i)\bfind\b(.+)", 70, subject_fields),
            (r"(?i)\blook\s+(?:up|for)\s+(.+)", 68, subject_fields),
        ];
        for &(pat, conf, extract) in &search_patterns {
            patterns.push(IntentPattern {
                regex: Regex::new(pat).expect("Invalid search regex"),
                kind: QueryKind::Search,
                base_confidence: conf,
                extract,
            });
        }

        // =====================================================================
        // Analysis patterns
        // =====================================================================
        let analysis_patterns: Vec<(&str, u8, FieldExtractor)> = vec![
            (r"(?i)\banaly[sz]e\b(.*)", 85, subject_fields),
            (
                r"(?i)\b(?:an?\s+)?analysis\s+(?:of|on|for)\s+(.+)",
                84,
                subject_fields,
            ),
            (
                r"(?i)\bwhat(?:'s|\s+is)\s+(?:driving|happening\s+with|going\s+on\s+with)\s+(.+)",
                80,
                subject_fields,
            ),
            (
                r"(?i)\b(?:insights?|takeaways?)\s+(?:about|on|for|from|into)\b(.*)",
                78,
                subject_fields,
            ),
            (
                r"(?i)\b(?:correlations?|relationships?)\b(.*)",
                75,
                subject_fields,
            ),
            (r"(?i)\bdeep\s+dive\b(.*)", 72, subject_fields),
            (r"(?i)\bbreak\s+down\b(.*)", 72, subject_fields),
            (r"(?i)\bwhy\s+(?:is|are|did|does)\b(.+)", 70, subject_fields),
        ];
        for &(pat, conf, extract) in &analysis_patterns {
            patterns.push(IntentPattern {
                regex: Regex::new(pat).expect("Invalid analysis regex"),
                kind: QueryKind::Analysis,
                base_confidence: conf,
                extract,
            });
        }

        // =====================================================================
        // Temporal patterns
        // =====================================================================
        let temporal_patterns: Vec<(&str, u8, FieldExtractor)> = vec![
            (r"(?i)\bwhat\s+happened\b(.*)", 85, subject_fields),
            (r"(?i)\btimeline\s+(?:of|for)\s+(.+)", 84, subject_fields),
            (
                r"(?i)\bin\s+(?:chronological|time)\s+order\b",
                80,
                no_fields,
            ),
            (
                r"(?i)\b(?:show\s+(?:me\s+)?)?(?:the\s+)?timeline\b(.*)",
                78,
                subject_fields,
            ),
            (r"(?i)\bchronolog(?:y|ical(?:ly)?)\b(.*)", 78, subject_fields),
            (r"(?i)\bday\s+by\s+day\b(.*)", 76, subject_fields),
            (r"(?i)\bwhen\s+did\b(.+)", 72, subject_fields),
        ];
        for &(pat, conf, extract) in &temporal_patterns {
            patterns.push(IntentPattern {
                regex: Regex::new(pat).expect("Invalid temporal regex"),
                kind: QueryKind::Temporal,
                base_confidence: conf,
                extract,
            });
        }

        // =====================================================================
        // Comparison patterns
        // =====================================================================
        let comparison_patterns: Vec<(&str, u8, FieldExtractor)> = vec![
            (
                r"(?i)\bcompare\s+(.+?)\s+(?:and|with|against|to|vs\.?|versus)\s+(.+)",
                90,
                pair_fields,
            ),
            (
                r"(?i)\bhow\s+do(?:es)?\s+(.+?)\s+(?:compare|stack\s+up)\s+(?:to|with|against)\s+(.+)",
                86,
                pair_fields,
            ),
            (r"(?i)\b(.+?)\s+(?:vs\.?|versus)\s+(.+)", 85, pair_fields),
            (
                r"(?i)\b(?:difference|differences)\s+between\s+(.+?)\s+and\s+(.+)",
                85,
                pair_fields,
            ),
            (r"(?i)\bcompare\b(.*)", 80, subject_fields),
            (
                r"(?i)\bwhich\s+is\s+(?:better|bigger|stronger|more\s+active)\b(.*)",
                72,
                subject_fields,
            ),
        ];
        for &(pat, conf, extract) in &comparison_patterns {
            patterns.push(IntentPattern {
                regex: Regex::new(pat).expect("Invalid comparison regex"),
                kind: QueryKind::Comparison,
                base_confidence: conf,
                extract,
            });
        }

        // =====================================================================
        // Aggregate patterns
        // =====================================================================
        let aggregate_patterns: Vec<(&str, u8, FieldExtractor)> = vec![
            (r"(?i)\bhow\s+many\b(.*)", 85, count_fields),
            (
                r"(?i)\b(?:what(?:'s|\s+is)\s+the\s+)?average\s+impact\b(.*)",
                84,
                average_fields,
            ),
            (
                r"(?i)\b(?:total|overall)\s+(?:number|count)\b(.*)",
                83,
                count_fields,
            ),
            (
                r"(?i)\b(?:highest|biggest|largest|top|maximum|max)[\s-]impact\b(.*)",
                83,
                max_fields,
            ),
            (
                r"(?i)\b(?:lowest|smallest|minimum|min)[\s-]impact\b(.*)",
                83,
                min_fields,
            ),
            (r"(?i)\bcount\s+(?:of|the)\b(.*)", 80, count_fields),
            (r"(?i)\bmost\s+impactful\b(.*)", 80, max_fields),
            (r"(?i)\baverage\b(.*)", 74, average_fields),
            (
                r"(?i)\b(?:summary\s+)?statistics\b(.*)",
                72,
                count_fields,
            ),
            (r"(?i)\bhow\s+much\b(.*)", 70, count_fields),
        ];
        for &(pat, conf, extract) in &aggregate_patterns {
            patterns.push(IntentPattern {
                regex: Regex::new(pat).expect("Invalid aggregate regex"),
                kind: QueryKind::Aggregate,
                base_confidence: conf,
                extract,
            });
        }

        // =====================================================================
        // Filter patterns
        // =====================================================================
        let filter_patterns: Vec<(&str, u8, FieldExtractor)> = vec![
            (r"(?i)\bfilter\s+(?:by|for|on|to)\s+(.+)", 85, subject_fields),
            (r"(?i)\bshow\s+me\s+only\s+(.+)", 80, subject_fields),
            (r"(?i)\bfilter\b(.*)", 78, subject_fields),
            (r"(?i)\bnarrow\s+(?:down|to)\b(.*)", 76, subject_fields),
            (
                r"(?i)\bhigh[\s-]impact\s+(?:moments?|events?|stories|news)\b",
                74,
                no_fields,
            ),
            (
                r"(?i)\bonly\s+(?:show\s+(?:me\s+)?)?(.+)",
                72,
                subject_fields,
            ),
            (r"(?i)\bjust\s+(?:the\s+)?(.+)", 68, subject_fields),
        ];
        for &(pat, conf, extract) in &filter_patterns {
            patterns.push(IntentPattern {
                regex: Regex::new(pat).expect("Invalid filter regex"),
                kind: QueryKind::Filter,
                base_confidence: conf,
                extract,
            });
        }

        // =====================================================================
        // Trend patterns
        // =====================================================================
        let trend_patterns: Vec<(&str, u8, FieldExtractor)> = vec![
            (
                r"(?i)\btrend(?:ing|s)?\s+(?:of|for|in|on)\s+(.+)",
                85,
                subject_fields,
            ),
            (
                r"(?i)\b(?:momentum|trajectory)\s+(?:of|for|in)\s+(.+)",
                80,
                subject_fields,
            ),
            (r"(?i)\bweek\s+(?:over|by)\s+week\b(.*)", 80, subject_fields),
            (r"(?i)\btrend(?:ing|s)?\b(.*)", 78, subject_fields),
            (r"(?i)\b(?:momentum|trajectory)\b(.*)", 74, subject_fields),
            (r"(?i)\bover\s+time\b(.*)", 74, subject_fields),
            (r"(?i)\bgrowth\s+of\b(.*)", 72, subject_fields),
            (
                r"(?i)\b(?:growing|increasing|declining|decreasing|accelerating|slowing)\b(.*)",
                70,
                subject_fields,
            ),
        ];
        for &(pat, conf, extract) in &trend_patterns {
            patterns.push(IntentPattern {
                regex: Regex::new(pat).expect("Invalid trend regex"),
                kind: QueryKind::Trend,
                base_confidence: conf,
                extract,
            });
        }

        // =====================================================================
        // Pattern-mining patterns
        // =====================================================================
        let pattern_patterns: Vec<(&str, u8, FieldExtractor)> = vec![
            (
                r"(?i)\b(?:recurring|repeating|common)\s+(?:themes?|patterns?|behaviou?rs?)\b(.*)",
                82,
                subject_fields,
            ),
            (r"(?i)\bpatterns?\b(.*)", 80, subject_fields),
            (r"(?i)\bclusters?\b(.*)", 76, subject_fields),
            (r"(?i)\bsequences?\s+(?:of|in)\b(.*)", 76, subject_fields),
            (
                r"(?i)\bwhat\s+(?:tends|keeps)\s+(?:to\s+)?happen(?:ing)?\b(.*)",
                74,
                subject_fields,
            ),
            (r"(?i)\bconnections?\s+between\b(.*)", 72, subject_fields),
            (r"(?i)\bnetwork\s+of\b(.*)", 70, subject_fields),
        ];
        for &(pat, conf, extract) in &pattern_patterns {
            patterns.push(IntentPattern {
                regex: Regex::new(pat).expect("Invalid pattern regex"),
                kind: QueryKind::Pattern,
                base_confidence: conf,
                extract,
            });
        }

        Self { patterns }
    }

    /// Detect all matching patterns in the given text, sorted by confidence
    /// descending. The sort is stable, so on equal confidence the earlier
    /// table entry wins.
    pub fn detect(&self, text: &str, known: &KnownEntities) -> Vec<PatternMatch> {
        let mut matches = Vec::new();

        for pattern in &self.patterns {
            if let Some(caps) = pattern.regex.captures(text) {
                let matched_text = caps.get(0).map_or("", |m| m.as_str()).to_string();
                let fields = (pattern.extract)(&caps, known);
                matches.push(PatternMatch {
                    kind: pattern.kind,
                    confidence: pattern.base_confidence,
                    matched_text,
                    fields,
                });
            }
        }

        matches.sort_by(|a, b| b.confidence.cmp(&a.confidence));
        matches
    }
}

// =============================================================================
// Field extractors
// =============================================================================

fn no_fields(_caps: &Captures<'_>, _known: &KnownEntities) -> PatternFields {
    PatternFields::default()
}

/// Classify capture group 1 as the query subject.
fn subject_fields(caps: &Captures<'_>, known: &KnownEntities) -> PatternFields {
    let subject = caps.get(1).map_or("", |m| m.as_str());
    let entities = extract::classify_subject(subject, known);
    PatternFields {
        entities: if entities.is_empty() {
            None
        } else {
            Some(entities)
        },
        metrics: None,
    }
}

/// Classify capture groups 1 and 2 as compared subjects and merge them.
fn pair_fields(caps: &Captures<'_>, known: &KnownEntities) -> PatternFields {
    let mut merged = EntityMentions::default();
    for idx in 1..=2 {
        let side = caps.get(idx).map_or("", |m| m.as_str());
        merge_mentions(&mut merged, extract::classify_subject(side, known));
    }
    PatternFields {
        entities: if merged.is_empty() {
            None
        } else {
            Some(merged)
        },
        metrics: None,
    }
}

fn count_fields(_caps: &Captures<'_>, _known: &KnownEntities) -> PatternFields {
    PatternFields {
        entities: None,
        metrics: Some(vec![MetricKeyword::Count]),
    }
}

fn average_fields(_caps: &Captures<'_>, _known: &KnownEntities) -> PatternFields {
    PatternFields {
        entities: None,
        metrics: Some(vec![MetricKeyword::Average]),
    }
}

fn max_fields(_caps: &Captures<'_>, _known: &KnownEntities) -> PatternFields {
    PatternFields {
        entities: None,
        metrics: Some(vec![MetricKeyword::Max]),
    }
}

fn min_fields(_caps: &Captures<'_>, _known: &KnownEntities) -> PatternFields {
    PatternFields {
        entities: None,
        metrics: Some(vec![MetricKeyword::Min]),
    }
}

fn merge_mentions(dest: &mut EntityMentions, src: EntityMentions) {
    extend_unique(&mut dest.companies, src.companies);
    extend_unique(&mut dest.technologies, src.technologies);
    extend_unique(&mut dest.concepts, src.concepts);
    extend_unique(&mut dest.people, src.people);
    extend_unique(&mut dest.locations, src.locations);
}

fn extend_unique(dest: &mut Vec<String>, additions: Vec<String>) {
    for name in additions {
        if !dest.iter().any(|existing| existing.eq_ignore_ascii_case(&name)) {
            dest.push(name);
        }
    }
}
