//! Search and filter pipelines: ranked moment retrieval.
//!
//! The filter pipeline is the search pipeline plus a filter-effectiveness
//! figure (share of the corpus that survived the chain).

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::debug;

use momentum_core::config::AnalysisConfig;
use momentum_core::types::Moment;

use super::{filters, visualization_kind, PipelineOutput};
use crate::error::QueryError;
use crate::types::{QueryData, QueryIntent, SearchMetrics, Timeframe, VisualizationSpec};

pub(crate) fn run(
    moments: &[Moment],
    intent: &QueryIntent,
    config: &AnalysisConfig,
    now: DateTime<Utc>,
) -> Result<PipelineOutput, QueryError> {
    let ranked = ranked_selection(moments, intent, now);
    debug!("Search matched {} of {} moments", ranked.len(), moments.len());

    let explanation = describe_selection(ranked.len(), intent);
    let visualization = moments_visualization(&ranked, intent);
    let metrics = compute_metrics(&ranked, config);
    Ok(PipelineOutput {
        data: QueryData::Moments {
            moments: ranked,
            metrics,
            effectiveness: None,
        },
        explanation,
        visualization,
    })
}

pub(crate) fn run_filter(
    moments: &[Moment],
    intent: &QueryIntent,
    config: &AnalysisConfig,
    now: DateTime<Utc>,
) -> Result<PipelineOutput, QueryError> {
    let ranked = ranked_selection(moments, intent, now);
    let effectiveness = ranked.len() as f64 / moments.len().max(1) as f64;
    debug!(
        "Filter kept {} of {} moments ({:.0}%)",
        ranked.len(),
        moments.len(),
        effectiveness * 100.0
    );

    let explanation = format!(
        "{} ({:.0}% of the corpus)",
        describe_selection(ranked.len(), intent),
        effectiveness * 100.0
    );
    let visualization = moments_visualization(&ranked, intent);
    let metrics = compute_metrics(&ranked, config);
    Ok(PipelineOutput {
        data: QueryData::Moments {
            moments: ranked,
            metrics,
            effectiveness: Some(effectiveness),
        },
        explanation,
        visualization,
    })
}

/// Filter chain, then rank by impact descending with recency as the
/// tie-break.
fn ranked_selection(moments: &[Moment], intent: &QueryIntent, now: DateTime<Utc>) -> Vec<Moment> {
    let mut ranked: Vec<Moment> = filters::filter_moments(moments, intent, now)
        .into_iter()
        .cloned()
        .collect();
    ranked.sort_by(|a, b| {
        b.impact
            .score
            .cmp(&a.impact.score)
            .then(b.extracted_at.cmp(&a.extracted_at))
    });
    ranked
}

fn compute_metrics(moments: &[Moment], config: &AnalysisConfig) -> SearchMetrics {
    let count = moments.len();
    let average_impact = moments
        .iter()
        .map(|moment| f64::from(moment.impact.score))
        .sum::<f64>()
        / count.max(1) as f64;
    let high_impact_count = moments
        .iter()
        .filter(|moment| moment.is_high_impact(config.high_impact_threshold))
        .count();
    SearchMetrics {
        count,
        average_impact,
        high_impact_count,
    }
}

/// Deterministic explanation naming the result count and every applied
/// constraint.
fn describe_selection(count: usize, intent: &QueryIntent) -> String {
    let mut constraints = Vec::new();
    let names = intent.entities.all_names();
    if !names.is_empty() {
        constraints.push(format!("mentioning {}", names.join(", ")));
    }
    match &intent.timeframe {
        Some(Timeframe::Phrase(phrase)) => constraints.push(format!("within {}", phrase)),
        Some(Timeframe::Range { .. }) => constraints.push("within the selected range".to_string()),
        None => {}
    }
    if intent.factors.is_some() {
        constraints.push("with matching factors".to_string());
    }
    if let Some(filters) = &intent.filters {
        if let Some(threshold) = filters.impact_threshold {
            constraints.push(format!("with impact {}+", threshold));
        }
        if let Some(level) = filters.confidence_level {
            constraints.push(format!("with {} confidence", level));
        }
        if let Some(kind) = filters.source_kind {
            constraints.push(format!("from {} sources", kind));
        }
    }

    if constraints.is_empty() {
        format!("Found {} moments", count)
    } else {
        format!("Found {} moments {}", count, constraints.join(", "))
    }
}

fn moments_visualization(moments: &[Moment], intent: &QueryIntent) -> Option<VisualizationSpec> {
    if moments.is_empty() {
        return None;
    }
    let items: Vec<_> = moments
        .iter()
        .map(|moment| {
            json!({
                "id": moment.id,
                "title": moment.title,
                "impact": moment.impact.score,
                "date": moment.extracted_at,
            })
        })
        .collect();
    Some(VisualizationSpec {
        kind: visualization_kind(intent.visualization, intent.kind),
        config: json!({ "title": "Matching moments" }),
        data: json!(items),
    })
}
