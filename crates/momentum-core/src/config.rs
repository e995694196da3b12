use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MomentumError, Result};

/// Top-level configuration for the Momentum engine.
///
/// Every knob has a working default, so hosts can run with no file at all.
/// Each section corresponds to one engine component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            analysis: AnalysisConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| MomentumError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// Intent parser tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Confidence boost when the matched intent fits the caller's active view.
    pub view_boost: u8,
    /// Confidence penalty for pattern matches shorter than `short_match_len`.
    pub short_match_penalty: u8,
    /// Minimum matched-span length (characters) before the penalty applies.
    pub short_match_len: usize,
    /// Confidence assigned to the fallback search intent.
    pub fallback_confidence: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            view_boost: 10,
            short_match_penalty: 15,
            short_match_len: 10,
            fallback_confidence: 50,
        }
    }
}

/// Thresholds for the analytical pipelines.
///
/// These are heuristics, not fixed law; hosts tune them per corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Impact score at or above which a moment counts as high impact.
    pub high_impact_threshold: u8,
    /// Minimum co-occurrence count before a correlation is reported.
    pub correlation_min_count: usize,
    /// Co-occurrence count that saturates correlation strength at 1.0.
    pub correlation_strength_divisor: f64,
    /// Maximum correlations reported per analysis.
    pub correlation_limit: usize,
    /// Fraction of moments a factor must appear in to count as dominant.
    pub dominance_ratio: f64,
    /// Minimum moments on one day to count as a burst.
    pub burst_min_count: usize,
    /// Multiple of the mean daily count that marks an activity peak.
    pub peak_ratio: f64,
    /// Maximum day gap between two moments in a sequential pattern.
    pub sequence_window_days: i64,
    /// Maximum sequential patterns reported.
    pub sequence_limit: usize,
    /// Day window for "recent activity" insights.
    pub recent_window_days: i64,
    /// Day window for per-entity recent counts in comparisons.
    pub comparison_recent_days: i64,
    /// Minimum moments sharing an entity fingerprint to form a cluster.
    pub cluster_min_size: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            high_impact_threshold: 70,
            correlation_min_count: 2,
            correlation_strength_divisor: 5.0,
            correlation_limit: 10,
            dominance_ratio: 0.3,
            burst_min_count: 3,
            peak_ratio: 1.5,
            sequence_window_days: 7,
            sequence_limit: 3,
            recent_window_days: 7,
            comparison_recent_days: 30,
            cluster_min_size: 2,
        }
    }
}

/// Conversation history and suggestion tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum entries retained, oldest evicted first.
    pub capacity: usize,
    /// Maximum suggestion strings generated.
    pub suggestion_limit: usize,
    /// Number of recent successful entries mined for suggestions.
    pub suggestion_sources: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: 50,
            suggestion_limit: 8,
            suggestion_sources: 5,
        }
    }
}
