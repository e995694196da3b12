//! Core domain types for the Momentum engine.
//!
//! Defines moments (classified business/technology events), their sources,
//! entities, and the closed factor taxonomies used for classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Enums
// =============================================================================

/// The kind of source a moment was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Content tracked for a company.
    Company,
    /// Content tracked for a technology.
    Technology,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Company => write!(f, "company"),
            SourceKind::Technology => write!(f, "technology"),
        }
    }
}

impl std::str::FromStr for SourceKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "company" => Ok(SourceKind::Company),
            "technology" => Ok(SourceKind::Technology),
            _ => Err(format!("Unknown source kind: {}", s)),
        }
    }
}

/// Company-level causal categories. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MicroFactor {
    Company,
    Competition,
    Partners,
    Customers,
}

impl fmt::Display for MicroFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MicroFactor::Company => write!(f, "company"),
            MicroFactor::Competition => write!(f, "competition"),
            MicroFactor::Partners => write!(f, "partners"),
            MicroFactor::Customers => write!(f, "customers"),
        }
    }
}

impl std::str::FromStr for MicroFactor {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "company" => Ok(MicroFactor::Company),
            "competition" => Ok(MicroFactor::Competition),
            "partners" => Ok(MicroFactor::Partners),
            "customers" => Ok(MicroFactor::Customers),
            _ => Err(format!("Unknown micro factor: {}", s)),
        }
    }
}

/// Market-level causal categories. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroFactor {
    Economic,
    Regulation,
    Technology,
    GeoPolitical,
    Environment,
    SupplyChain,
}

impl fmt::Display for MacroFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacroFactor::Economic => write!(f, "economic"),
            MacroFactor::Regulation => write!(f, "regulation"),
            MacroFactor::Technology => write!(f, "technology"),
            MacroFactor::GeoPolitical => write!(f, "geo_political"),
            MacroFactor::Environment => write!(f, "environment"),
            MacroFactor::SupplyChain => write!(f, "supply_chain"),
        }
    }
}

impl std::str::FromStr for MacroFactor {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "economic" => Ok(MacroFactor::Economic),
            "regulation" => Ok(MacroFactor::Regulation),
            "technology" => Ok(MacroFactor::Technology),
            "geo_political" => Ok(MacroFactor::GeoPolitical),
            "environment" => Ok(MacroFactor::Environment),
            "supply_chain" => Ok(MacroFactor::SupplyChain),
            _ => Err(format!("Unknown macro factor: {}", s)),
        }
    }
}

/// Classification confidence tier assigned at extraction time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceLevel::Low => write!(f, "low"),
            ConfidenceLevel::Medium => write!(f, "medium"),
            ConfidenceLevel::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for ConfidenceLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(ConfidenceLevel::Low),
            "medium" => Ok(ConfidenceLevel::Medium),
            "high" => Ok(ConfidenceLevel::High),
            _ => Err(format!("Unknown confidence level: {}", s)),
        }
    }
}

// =============================================================================
// Value Objects
// =============================================================================

/// Where a moment was extracted from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MomentSource {
    pub kind: SourceKind,
    /// Name of the tracked company or technology.
    pub name: String,
}

/// Named entities recognized in a moment's text, by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySet {
    pub companies: Vec<String>,
    pub technologies: Vec<String>,
    pub people: Vec<String>,
    pub locations: Vec<String>,
}

impl EntitySet {
    /// Company and technology names combined, in field order.
    pub fn companies_and_technologies(&self) -> Vec<String> {
        self.companies
            .iter()
            .chain(self.technologies.iter())
            .cloned()
            .collect()
    }
}

/// Factor taxonomy assignment plus extraction metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub micro_factors: Vec<MicroFactor>,
    pub macro_factors: Vec<MacroFactor>,
    pub keywords: Vec<String>,
    pub confidence: ConfidenceLevel,
}

/// Significance rating of a moment.
///
/// Invariant: `score` is always within 0..=100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Impact {
    pub score: u8,
}

impl Impact {
    /// Build an impact rating, clamping the score to the 0..=100 range.
    pub fn new(score: u8) -> Self {
        Self {
            score: score.min(100),
        }
    }
}

// =============================================================================
// Moment
// =============================================================================

/// A classified, timestamped business/technology event.
///
/// Immutable once ingested; the corpus holder replaces moments wholesale
/// rather than editing them in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Moment {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Full free text the moment was extracted from.
    pub raw_text: String,
    /// When the moment was extracted.
    pub extracted_at: DateTime<Utc>,
    pub source: MomentSource,
    pub entities: EntitySet,
    pub classification: Classification,
    pub impact: Impact,
    /// Estimated date the described event takes effect, when known.
    pub timeline_date: Option<DateTime<Utc>>,
}

impl Moment {
    /// Whether this moment's impact meets the given threshold.
    pub fn is_high_impact(&self, threshold: u8) -> bool {
        self.impact.score >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn make_moment() -> Moment {
        Moment {
            id: "m-1".to_string(),
            title: "Acme ships RoboX".to_string(),
            description: "Acme released the RoboX platform".to_string(),
            raw_text: "Acme Corp released the RoboX robotics platform today".to_string(),
            extracted_at: Utc::now(),
            source: MomentSource {
                kind: SourceKind::Company,
                name: "Acme".to_string(),
            },
            entities: EntitySet {
                companies: vec!["Acme".to_string()],
                technologies: vec!["RoboX".to_string()],
                people: vec![],
                locations: vec![],
            },
            classification: Classification {
                micro_factors: vec![MicroFactor::Company],
                macro_factors: vec![MacroFactor::Technology],
                keywords: vec!["robotics".to_string()],
                confidence: ConfidenceLevel::High,
            },
            impact: Impact::new(80),
            timeline_date: None,
        }
    }

    // ---- Enum round-trips ----

    #[test]
    fn test_source_kind_display_fromstr_roundtrip() {
        for kind in [SourceKind::Company, SourceKind::Technology] {
            assert_eq!(SourceKind::from_str(&kind.to_string()).unwrap(), kind);
        }
        assert!(SourceKind::from_str("person").is_err());
    }

    #[test]
    fn test_micro_factor_display_fromstr_roundtrip() {
        let all = [
            MicroFactor::Company,
            MicroFactor::Competition,
            MicroFactor::Partners,
            MicroFactor::Customers,
        ];
        for factor in all {
            assert_eq!(MicroFactor::from_str(&factor.to_string()).unwrap(), factor);
        }
        assert!(MicroFactor::from_str("macro").is_err());
    }

    #[test]
    fn test_macro_factor_display_fromstr_roundtrip() {
        let all = [
            MacroFactor::Economic,
            MacroFactor::Regulation,
            MacroFactor::Technology,
            MacroFactor::GeoPolitical,
            MacroFactor::Environment,
            MacroFactor::SupplyChain,
        ];
        for factor in all {
            assert_eq!(MacroFactor::from_str(&factor.to_string()).unwrap(), factor);
        }
        assert!(MacroFactor::from_str("weather").is_err());
    }

    #[test]
    fn test_macro_factor_serde_snake_case() {
        let json = serde_json::to_string(&MacroFactor::GeoPolitical).unwrap();
        assert_eq!(json, "\"geo_political\"");
        let json = serde_json::to_string(&MacroFactor::SupplyChain).unwrap();
        assert_eq!(json, "\"supply_chain\"");
    }

    #[test]
    fn test_confidence_level_default_is_medium() {
        assert_eq!(ConfidenceLevel::default(), ConfidenceLevel::Medium);
    }

    #[test]
    fn test_confidence_level_serde() {
        let json = serde_json::to_string(&ConfidenceLevel::High).unwrap();
        assert_eq!(json, "\"high\"");
        let parsed: ConfidenceLevel = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(parsed, ConfidenceLevel::Low);
    }

    // ---- Impact ----

    #[test]
    fn test_impact_clamps_to_100() {
        assert_eq!(Impact::new(250).score, 100);
        assert_eq!(Impact::new(100).score, 100);
        assert_eq!(Impact::new(42).score, 42);
        assert_eq!(Impact::new(0).score, 0);
    }

    #[test]
    fn test_impact_ordering() {
        assert!(Impact::new(80) > Impact::new(40));
        assert_eq!(Impact::default().score, 0);
    }

    // ---- EntitySet ----

    #[test]
    fn test_companies_and_technologies_order() {
        let entities = EntitySet {
            companies: vec!["Acme".to_string(), "Globex".to_string()],
            technologies: vec!["RoboX".to_string()],
            people: vec!["Jane Doe".to_string()],
            locations: vec![],
        };
        assert_eq!(
            entities.companies_and_technologies(),
            vec!["Acme", "Globex", "RoboX"]
        );
    }

    #[test]
    fn test_entity_set_default_is_empty() {
        let entities = EntitySet::default();
        assert!(entities.companies.is_empty());
        assert!(entities.technologies.is_empty());
        assert!(entities.people.is_empty());
        assert!(entities.locations.is_empty());
    }

    // ---- Moment ----

    #[test]
    fn test_moment_high_impact_threshold() {
        let moment = make_moment();
        assert!(moment.is_high_impact(70));
        assert!(moment.is_high_impact(80));
        assert!(!moment.is_high_impact(81));
    }

    #[test]
    fn test_moment_serde_roundtrip() {
        let moment = make_moment();
        let json = serde_json::to_string(&moment).unwrap();
        let back: Moment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, moment);
    }

    #[test]
    fn test_classification_default() {
        let classification = Classification::default();
        assert!(classification.micro_factors.is_empty());
        assert!(classification.macro_factors.is_empty());
        assert_eq!(classification.confidence, ConfidenceLevel::Medium);
    }
}
