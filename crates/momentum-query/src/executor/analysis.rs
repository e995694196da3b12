//! Analysis pipeline: insight strings, entity co-occurrence correlations,
//! and activity patterns over the filtered corpus.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde_json::json;
use tracing::debug;

use momentum_core::config::AnalysisConfig;
use momentum_core::types::Moment;

use super::{filters, visualization_kind, PipelineOutput};
use crate::error::QueryError;
use crate::types::{Correlation, QueryData, QueryIntent, VisualizationSpec};

pub(crate) fn run(
    moments: &[Moment],
    intent: &QueryIntent,
    config: &AnalysisConfig,
    now: DateTime<Utc>,
) -> Result<PipelineOutput, QueryError> {
    let filtered = filters::filter_moments(moments, intent, now);
    debug!(
        "Analysis over {} of {} moments",
        filtered.len(),
        moments.len()
    );

    let insights = build_insights(&filtered, config, now);
    let correlations = find_correlations(&filtered, config);
    let mut patterns = burst_patterns(&filtered, config);
    patterns.extend(factor_dominance(&filtered, config));

    let explanation = format!(
        "Analyzed {} moments: {} insights, {} correlations, {} patterns",
        filtered.len(),
        insights.len(),
        correlations.len(),
        patterns.len()
    );
    let visualization = if insights.is_empty() && correlations.is_empty() {
        None
    } else {
        Some(VisualizationSpec {
            kind: visualization_kind(intent.visualization, intent.kind),
            config: json!({ "title": "Analysis" }),
            data: json!({
                "insights": insights,
                "correlations": correlations,
            }),
        })
    };

    Ok(PipelineOutput {
        data: QueryData::Analysis {
            insights,
            correlations,
            patterns,
        },
        explanation,
        visualization,
    })
}

fn build_insights(moments: &[&Moment], config: &AnalysisConfig, now: DateTime<Utc>) -> Vec<String> {
    let mut insights = Vec::new();
    if moments.is_empty() {
        return insights;
    }

    let high_impact = moments
        .iter()
        .filter(|moment| moment.is_high_impact(config.high_impact_threshold))
        .count();
    if high_impact > 0 {
        insights.push(format!(
            "{} of {} moments are high impact (score {}+)",
            high_impact,
            moments.len(),
            config.high_impact_threshold
        ));
    }

    if let Some((factor, count)) = dominant_factor(moments) {
        insights.push(format!(
            "The most common factor is {} ({} moments)",
            factor, count
        ));
    }

    let cutoff = now - Duration::days(config.recent_window_days);
    let recent = moments
        .iter()
        .filter(|moment| moment.extracted_at >= cutoff)
        .count();
    if recent > 0 {
        insights.push(format!(
            "{} moments in the last {} days",
            recent, config.recent_window_days
        ));
    }

    insights
}

/// Frequency of every micro and macro factor across the moments, keyed by
/// factor name. The two enums share no names, so pooling is safe.
pub(crate) fn factor_counts(moments: &[&Moment]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for moment in moments {
        for factor in &moment.classification.micro_factors {
            *counts.entry(factor.to_string()).or_insert(0) += 1;
        }
        for factor in &moment.classification.macro_factors {
            *counts.entry(factor.to_string()).or_insert(0) += 1;
        }
    }
    counts
}

fn dominant_factor(moments: &[&Moment]) -> Option<(String, usize)> {
    factor_counts(moments)
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1))
}

/// Pairwise co-occurrence of company and technology names within single
/// moments. Pairs are keyed in sorted order, counted over the whole set,
/// reported above the configured minimum, strongest first.
fn find_correlations(moments: &[&Moment], config: &AnalysisConfig) -> Vec<Correlation> {
    let mut pair_counts: BTreeMap<(String, String), usize> = BTreeMap::new();
    for moment in moments {
        let mut names = moment.entities.companies_and_technologies();
        names.sort();
        names.dedup();
        for i in 0..names.len() {
            for j in (i + 1)..names.len() {
                *pair_counts
                    .entry((names[i].clone(), names[j].clone()))
                    .or_insert(0) += 1;
            }
        }
    }

    let mut correlations: Vec<Correlation> = pair_counts
        .into_iter()
        .filter(|(_, count)| *count >= config.correlation_min_count)
        .map(|((entity_a, entity_b), count)| Correlation {
            entity_a,
            entity_b,
            count,
            strength: (count as f64 / config.correlation_strength_divisor).min(1.0),
        })
        .collect();
    correlations.sort_by(|a, b| b.count.cmp(&a.count));
    correlations.truncate(config.correlation_limit);
    correlations
}

/// Days whose moment count reaches the burst minimum.
fn burst_patterns(moments: &[&Moment], config: &AnalysisConfig) -> Vec<String> {
    let mut daily: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for moment in moments {
        *daily.entry(moment.extracted_at.date_naive()).or_insert(0) += 1;
    }
    daily
        .into_iter()
        .filter(|(_, count)| *count >= config.burst_min_count)
        .map(|(day, count)| format!("Activity burst on {}: {} moments", day, count))
        .collect()
}

/// Factors present in at least the configured share of the moments.
pub(crate) fn factor_dominance(moments: &[&Moment], config: &AnalysisConfig) -> Vec<String> {
    if moments.is_empty() {
        return Vec::new();
    }
    let threshold = ((config.dominance_ratio * moments.len() as f64).ceil() as usize).max(1);
    factor_counts(moments)
        .into_iter()
        .filter(|(_, count)| *count >= threshold)
        .map(|(factor, count)| {
            format!(
                "Factor {} appears in {} of {} moments",
                factor,
                count,
                moments.len()
            )
        })
        .collect()
}
