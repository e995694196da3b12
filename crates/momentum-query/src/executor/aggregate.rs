//! Aggregate pipeline: count, average, max, and min bundles over the
//! filtered corpus.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::debug;

use momentum_core::config::AnalysisConfig;
use momentum_core::types::Moment;

use super::{filters, visualization_kind, PipelineOutput};
use crate::error::QueryError;
use crate::types::{AggregateData, MetricKeyword, QueryData, QueryIntent, VisualizationSpec};

pub(crate) fn run(
    moments: &[Moment],
    intent: &QueryIntent,
    config: &AnalysisConfig,
    now: DateTime<Utc>,
) -> Result<PipelineOutput, QueryError> {
    let filtered = filters::filter_moments(moments, intent, now);
    let operator = select_operator(&intent.metrics);
    debug!(
        "Aggregating {} of {} moments with {:?}",
        filtered.len(),
        moments.len(),
        operator
    );

    let (data, explanation) = match operator {
        MetricKeyword::Average => {
            let total_impact: u64 = filtered.iter().map(|m| u64::from(m.impact.score)).sum();
            let average_impact = total_impact as f64 / filtered.len().max(1) as f64;
            (
                AggregateData::Average {
                    average_impact,
                    total_moments: filtered.len(),
                },
                format!(
                    "Average impact is {:.1} across {} moments",
                    average_impact,
                    filtered.len()
                ),
            )
        }
        MetricKeyword::Max => {
            let best = filtered.iter().max_by_key(|m| m.impact.score);
            let explanation = match best {
                Some(m) => format!("Highest impact is {}: \"{}\"", m.impact.score, m.title),
                None => "No moments to aggregate".to_string(),
            };
            (
                AggregateData::Max {
                    highest_impact: best.map_or(0, |m| m.impact.score),
                    title: best.map(|m| m.title.clone()),
                },
                explanation,
            )
        }
        MetricKeyword::Min => {
            let worst = filtered.iter().min_by_key(|m| m.impact.score);
            let explanation = match worst {
                Some(m) => format!("Lowest impact is {}: \"{}\"", m.impact.score, m.title),
                None => "No moments to aggregate".to_string(),
            };
            (
                AggregateData::Min {
                    lowest_impact: worst.map_or(0, |m| m.impact.score),
                    title: worst.map(|m| m.title.clone()),
                },
                explanation,
            )
        }
        _ => {
            let high_impact = filtered
                .iter()
                .filter(|m| m.is_high_impact(config.high_impact_threshold))
                .count();
            (
                AggregateData::Count {
                    total_moments: filtered.len(),
                    high_impact_moments: high_impact,
                    unique_companies: unique_names(&filtered, |m| &m.entities.companies),
                    unique_technologies: unique_names(&filtered, |m| &m.entities.technologies),
                },
                format!(
                    "Counted {} moments ({} high impact)",
                    filtered.len(),
                    high_impact
                ),
            )
        }
    };

    let visualization = if filtered.is_empty() {
        None
    } else {
        Some(VisualizationSpec {
            kind: visualization_kind(intent.visualization, intent.kind),
            config: json!({ "title": "Aggregate" }),
            data: json!({ "aggregate": data }),
        })
    };

    Ok(PipelineOutput {
        data: QueryData::Aggregate(data),
        explanation,
        visualization,
    })
}

/// Average, max, and min keywords take precedence over the count default.
fn select_operator(metrics: &[MetricKeyword]) -> MetricKeyword {
    if metrics.contains(&MetricKeyword::Average) {
        MetricKeyword::Average
    } else if metrics.contains(&MetricKeyword::Max) {
        MetricKeyword::Max
    } else if metrics.contains(&MetricKeyword::Min) {
        MetricKeyword::Min
    } else {
        MetricKeyword::Count
    }
}

fn unique_names<F>(moments: &[&Moment], select: F) -> usize
where
    F: Fn(&Moment) -> &Vec<String>,
{
    let mut names: BTreeSet<String> = BTreeSet::new();
    for moment in moments {
        for name in select(moment) {
            let trimmed = name.trim();
            if !trimmed.is_empty() {
                names.insert(trimmed.to_lowercase());
            }
        }
    }
    names.len()
}
