//! Query-side types: intents, results, and conversation entries.
//!
//! Everything here is transient per request except `ConversationEntry`,
//! which lives in the bounded history for the session lifetime.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use momentum_core::types::{ConfidenceLevel, MacroFactor, MicroFactor, Moment, SourceKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Intent
// =============================================================================

/// The eight query intents the parser can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Search,
    Analysis,
    Comparison,
    Trend,
    Pattern,
    Filter,
    Aggregate,
    Temporal,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKind::Search => write!(f, "search"),
            QueryKind::Analysis => write!(f, "analysis"),
            QueryKind::Comparison => write!(f, "comparison"),
            QueryKind::Trend => write!(f, "trend"),
            QueryKind::Pattern => write!(f, "pattern"),
            QueryKind::Filter => write!(f, "filter"),
            QueryKind::Aggregate => write!(f, "aggregate"),
            QueryKind::Temporal => write!(f, "temporal"),
        }
    }
}

impl std::str::FromStr for QueryKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "search" => Ok(QueryKind::Search),
            "analysis" => Ok(QueryKind::Analysis),
            "comparison" => Ok(QueryKind::Comparison),
            "trend" => Ok(QueryKind::Trend),
            "pattern" => Ok(QueryKind::Pattern),
            "filter" => Ok(QueryKind::Filter),
            "aggregate" => Ok(QueryKind::Aggregate),
            "temporal" => Ok(QueryKind::Temporal),
            _ => Err(format!("Unknown query kind: {}", s)),
        }
    }
}

/// Entity names mentioned in a query, by category.
///
/// Concepts are free-form topic terms that matched no known catalog entry;
/// they are matched against moment keywords and raw text at execution time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMentions {
    pub companies: Vec<String>,
    pub technologies: Vec<String>,
    pub concepts: Vec<String>,
    pub people: Vec<String>,
    pub locations: Vec<String>,
}

impl EntityMentions {
    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
            && self.technologies.is_empty()
            && self.concepts.is_empty()
            && self.people.is_empty()
            && self.locations.is_empty()
    }

    /// All mentioned names across categories, in field order.
    pub fn all_names(&self) -> Vec<String> {
        self.companies
            .iter()
            .chain(self.technologies.iter())
            .chain(self.concepts.iter())
            .chain(self.people.iter())
            .chain(self.locations.iter())
            .cloned()
            .collect()
    }
}

/// A query's time window: either a relative phrase resolved at execution
/// time, or an explicit range supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    Phrase(String),
    Range {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Requested factor constraints. OR within each list, AND between them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorSelector {
    pub micro: Vec<MicroFactor>,
    pub macro_factors: Vec<MacroFactor>,
}

impl FactorSelector {
    pub fn is_empty(&self) -> bool {
        self.micro.is_empty() && self.macro_factors.is_empty()
    }
}

/// Generic result filters extracted from the query text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilters {
    /// Minimum impact score a moment must reach.
    pub impact_threshold: Option<u8>,
    /// Exact classification confidence tier required.
    pub confidence_level: Option<ConfidenceLevel>,
    /// Restrict to moments from one source kind.
    pub source_kind: Option<SourceKind>,
}

impl QueryFilters {
    pub fn is_empty(&self) -> bool {
        self.impact_threshold.is_none()
            && self.confidence_level.is_none()
            && self.source_kind.is_none()
    }
}

/// Metric vocabulary recognized in query text.
///
/// `Max` and `Min` are produced only by aggregate phrasing and select the
/// extreme-score operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKeyword {
    Impact,
    Count,
    Average,
    Growth,
    Confidence,
    Max,
    Min,
}

/// Rendering hint the parser attaches to an intent.
///
/// `Chart` is generic; the executor makes it concrete (bar or line) per
/// pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualizationHint {
    #[default]
    Cards,
    Timeline,
    Chart,
    Network,
    Table,
    Heatmap,
}

/// A parsed query: what to do, against what, under which constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryIntent {
    pub kind: QueryKind,
    pub entities: EntityMentions,
    pub timeframe: Option<Timeframe>,
    pub factors: Option<FactorSelector>,
    pub filters: Option<QueryFilters>,
    pub metrics: Vec<MetricKeyword>,
    pub visualization: VisualizationHint,
    /// Parser confidence, 0 to 100.
    pub confidence: u8,
}

// =============================================================================
// Results
// =============================================================================

/// Result envelope tag: the eight query kinds plus the failure summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    Search,
    Analysis,
    Comparison,
    Trend,
    Pattern,
    Filter,
    Aggregate,
    Temporal,
    Summary,
}

impl From<QueryKind> for ResultKind {
    fn from(kind: QueryKind) -> Self {
        match kind {
            QueryKind::Search => ResultKind::Search,
            QueryKind::Analysis => ResultKind::Analysis,
            QueryKind::Comparison => ResultKind::Comparison,
            QueryKind::Trend => ResultKind::Trend,
            QueryKind::Pattern => ResultKind::Pattern,
            QueryKind::Filter => ResultKind::Filter,
            QueryKind::Aggregate => ResultKind::Aggregate,
            QueryKind::Temporal => ResultKind::Temporal,
        }
    }
}

/// Concrete visualization type for the rendering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualizationKind {
    Cards,
    Timeline,
    Bar,
    Line,
    Network,
    Heatmap,
    Table,
}

/// Tagged payload describing a potential rendering. Produced, never consumed,
/// by this engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationSpec {
    pub kind: VisualizationKind,
    pub config: serde_json::Value,
    pub data: serde_json::Value,
}

/// Summary statistics over a ranked moment list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchMetrics {
    pub count: usize,
    pub average_impact: f64,
    pub high_impact_count: usize,
}

/// Two entities that repeatedly appear in the same moments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub entity_a: String,
    pub entity_b: String,
    pub count: usize,
    /// 0.0 to 1.0, saturating with co-occurrence count.
    pub strength: f64,
}

/// Per-entity statistics in a comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub moment_count: usize,
    pub average_impact: f64,
    pub high_impact_count: usize,
    /// Moments within the comparison recency window.
    pub recent_count: usize,
    /// Up to three most frequent factors, most frequent first.
    pub top_factors: Vec<String>,
}

/// One calendar week of activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendBucket {
    /// Monday of the ISO week.
    pub week_start: NaiveDate,
    pub count: usize,
    pub average_impact: f64,
}

/// Moments sharing an identical company + technology entity fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityCluster {
    pub companies: Vec<String>,
    pub technologies: Vec<String>,
    pub moment_ids: Vec<String>,
}

impl EntityCluster {
    pub fn size(&self) -> usize {
        self.moment_ids.len()
    }
}

/// One event projected onto a flat timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub date: DateTime<Utc>,
    pub title: String,
    pub impact: u8,
    pub entities: Vec<String>,
}

/// Operator-selected aggregate bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateData {
    Count {
        total_moments: usize,
        high_impact_moments: usize,
        unique_companies: usize,
        unique_technologies: usize,
    },
    Average {
        average_impact: f64,
        total_moments: usize,
    },
    Max {
        highest_impact: u8,
        title: Option<String>,
    },
    Min {
        lowest_impact: u8,
        title: Option<String>,
    },
}

/// Payload of a query result. Shape follows the pipeline that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryData {
    /// Ranked moments with summary metrics. `effectiveness` is set only by
    /// the filter pipeline (filtered share of the corpus).
    Moments {
        moments: Vec<Moment>,
        metrics: SearchMetrics,
        effectiveness: Option<f64>,
    },
    Analysis {
        insights: Vec<String>,
        correlations: Vec<Correlation>,
        patterns: Vec<String>,
    },
    Comparison {
        entities: BTreeMap<String, ComparisonEntry>,
        insights: Vec<String>,
    },
    Trend {
        buckets: Vec<TrendBucket>,
        insights: Vec<String>,
    },
    Patterns {
        factor_patterns: Vec<String>,
        clusters: Vec<EntityCluster>,
        sequences: Vec<String>,
    },
    Aggregate(AggregateData),
    Timeline {
        points: Vec<TimelinePoint>,
        insights: Vec<String>,
    },
    Summary(String),
}

/// Uniform result envelope returned by every pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResults {
    pub kind: ResultKind,
    pub data: QueryData,
    pub visualization: Option<VisualizationSpec>,
    pub explanation: String,
    /// Copied from the intent; 0 on execution failure.
    pub confidence: u8,
    pub processing_time_ms: u64,
}

// =============================================================================
// Conversation
// =============================================================================

/// One processed query in the conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub id: Uuid,
    /// Raw query text as the user typed it.
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub intent: Option<QueryIntent>,
    pub results: Option<QueryResults>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ConversationEntry {
    /// Completed without error and produced results.
    pub fn is_successful(&self) -> bool {
        self.error.is_none() && !self.loading && self.results.is_some()
    }
}

// =============================================================================
// Known-entity catalog
// =============================================================================

/// Canonical-cased entity names the parser can recognize in query text.
///
/// Company and technology lists come from the corpus holder; people and
/// locations are harvested from moment entities during a corpus swap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownEntities {
    pub companies: Vec<String>,
    pub technologies: Vec<String>,
    pub people: Vec<String>,
    pub locations: Vec<String>,
}

impl KnownEntities {
    /// Build a catalog from the supplied name lists plus every entity name
    /// appearing in the corpus, deduplicated case-insensitively.
    pub fn from_corpus(
        moments: &[Moment],
        companies: Vec<String>,
        technologies: Vec<String>,
    ) -> Self {
        let mut known = Self {
            companies,
            technologies,
            people: Vec::new(),
            locations: Vec::new(),
        };
        for moment in moments {
            merge_names(&mut known.companies, &moment.entities.companies);
            merge_names(&mut known.technologies, &moment.entities.technologies);
            merge_names(&mut known.people, &moment.entities.people);
            merge_names(&mut known.locations, &moment.entities.locations);
        }
        known
    }
}

fn merge_names(dest: &mut Vec<String>, additions: &[String]) {
    for name in additions {
        if name.is_empty() {
            continue;
        }
        if !dest.iter().any(|existing| existing.eq_ignore_ascii_case(name)) {
            dest.push(name.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use momentum_core::types::{Classification, EntitySet, Impact, MomentSource};
    use std::str::FromStr;

    fn make_moment(id: &str, companies: Vec<&str>, people: Vec<&str>) -> Moment {
        Moment {
            id: id.to_string(),
            title: format!("moment {}", id),
            description: String::new(),
            raw_text: String::new(),
            extracted_at: Utc::now(),
            source: MomentSource {
                kind: SourceKind::Company,
                name: "Acme".to_string(),
            },
            entities: EntitySet {
                companies: companies.into_iter().map(String::from).collect(),
                technologies: vec![],
                people: people.into_iter().map(String::from).collect(),
                locations: vec![],
            },
            classification: Classification::default(),
            impact: Impact::new(50),
            timeline_date: None,
        }
    }

    // ---- QueryKind ----

    #[test]
    fn test_query_kind_display_fromstr_roundtrip() {
        let all = [
            QueryKind::Search,
            QueryKind::Analysis,
            QueryKind::Comparison,
            QueryKind::Trend,
            QueryKind::Pattern,
            QueryKind::Filter,
            QueryKind::Aggregate,
            QueryKind::Temporal,
        ];
        for kind in all {
            assert_eq!(QueryKind::from_str(&kind.to_string()).unwrap(), kind);
        }
        assert!(QueryKind::from_str("summary").is_err());
    }

    #[test]
    fn test_result_kind_from_query_kind() {
        assert_eq!(ResultKind::from(QueryKind::Search), ResultKind::Search);
        assert_eq!(ResultKind::from(QueryKind::Temporal), ResultKind::Temporal);
    }

    // ---- EntityMentions ----

    #[test]
    fn test_entity_mentions_is_empty() {
        let mut mentions = EntityMentions::default();
        assert!(mentions.is_empty());
        mentions.concepts.push("ai".to_string());
        assert!(!mentions.is_empty());
    }

    #[test]
    fn test_entity_mentions_all_names_order() {
        let mentions = EntityMentions {
            companies: vec!["Acme".to_string()],
            technologies: vec!["RoboX".to_string()],
            concepts: vec!["robotics".to_string()],
            people: vec![],
            locations: vec!["Europe".to_string()],
        };
        assert_eq!(
            mentions.all_names(),
            vec!["Acme", "RoboX", "robotics", "Europe"]
        );
    }

    // ---- Serde shapes ----

    #[test]
    fn test_timeframe_phrase_serde_roundtrip() {
        let timeframe = Timeframe::Phrase("last 30 days".to_string());
        let json = serde_json::to_string(&timeframe).unwrap();
        let back: Timeframe = serde_json::from_str(&json).unwrap();
        assert_eq!(back, timeframe);
    }

    #[test]
    fn test_aggregate_data_serde_tag() {
        let data = AggregateData::Count {
            total_moments: 10,
            high_impact_moments: 3,
            unique_companies: 4,
            unique_technologies: 2,
        };
        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("\"count\""));
        assert!(json.contains("\"total_moments\":10"));
    }

    #[test]
    fn test_query_results_serde_roundtrip() {
        let results = QueryResults {
            kind: ResultKind::Summary,
            data: QueryData::Summary("nothing to report".to_string()),
            visualization: None,
            explanation: "nothing to report".to_string(),
            confidence: 0,
            processing_time_ms: 3,
        };
        let json = serde_json::to_string(&results).unwrap();
        let back: QueryResults = serde_json::from_str(&json).unwrap();
        assert_eq!(back, results);
    }

    // ---- ConversationEntry ----

    #[test]
    fn test_entry_success_requires_results_and_no_error() {
        let mut entry = ConversationEntry {
            id: Uuid::new_v4(),
            text: "show me moments".to_string(),
            timestamp: Utc::now(),
            intent: None,
            results: None,
            loading: true,
            error: None,
        };
        assert!(!entry.is_successful());

        entry.loading = false;
        assert!(!entry.is_successful());

        entry.results = Some(QueryResults {
            kind: ResultKind::Search,
            data: QueryData::Summary("ok".to_string()),
            visualization: None,
            explanation: String::new(),
            confidence: 50,
            processing_time_ms: 0,
        });
        assert!(entry.is_successful());

        entry.error = Some("boom".to_string());
        assert!(!entry.is_successful());
    }

    // ---- KnownEntities ----

    #[test]
    fn test_known_entities_harvests_corpus_names() {
        let moments = vec![
            make_moment("1", vec!["Acme"], vec!["Jane Doe"]),
            make_moment("2", vec!["acme", "Globex"], vec![]),
        ];
        let known = KnownEntities::from_corpus(
            &moments,
            vec!["Acme".to_string()],
            vec!["RoboX".to_string()],
        );
        // "acme" dedupes against the supplied canonical "Acme"
        assert_eq!(known.companies, vec!["Acme", "Globex"]);
        assert_eq!(known.technologies, vec!["RoboX"]);
        assert_eq!(known.people, vec!["Jane Doe"]);
        assert!(known.locations.is_empty());
    }

    #[test]
    fn test_entity_cluster_size() {
        let cluster = EntityCluster {
            companies: vec!["Acme".to_string()],
            technologies: vec!["RoboX".to_string()],
            moment_ids: vec!["1".to_string(), "2".to_string()],
        };
        assert_eq!(cluster.size(), 2);
    }
}
