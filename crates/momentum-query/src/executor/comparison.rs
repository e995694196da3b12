//! Comparison pipeline: side-by-side statistics for two or more named
//! entities of the same kind.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::debug;

use momentum_core::config::AnalysisConfig;
use momentum_core::types::Moment;

use super::{analysis, filters, visualization_kind, PipelineOutput};
use crate::error::QueryError;
use crate::types::{ComparisonEntry, QueryData, QueryIntent, VisualizationSpec};

const TOP_FACTOR_LIMIT: usize = 3;

pub(crate) fn run(
    moments: &[Moment],
    intent: &QueryIntent,
    config: &AnalysisConfig,
    now: DateTime<Utc>,
) -> Result<PipelineOutput, QueryError> {
    let names = compared_names(intent)?;
    // The entity stage is skipped so each compared entity selects its own
    // subset; AND semantics would empty the pool for disjoint entities.
    let base = filters::filter_moments_without_entities(moments, intent, now);
    debug!(
        "Comparing {} entities over {} moments",
        names.len(),
        base.len()
    );

    let mut entities: BTreeMap<String, ComparisonEntry> = BTreeMap::new();
    for name in &names {
        let subset: Vec<&Moment> = base
            .iter()
            .filter(|moment| filters::moment_mentions(moment, name))
            .copied()
            .collect();
        entities.insert(name.clone(), entry_stats(&subset, config, now));
    }

    let insights = comparison_insights(&entities);
    let explanation = format!(
        "Compared {} entities across {} moments",
        entities.len(),
        base.len()
    );

    let labels: Vec<&String> = entities.keys().collect();
    let moment_counts: Vec<usize> = entities.values().map(|e| e.moment_count).collect();
    let average_impact: Vec<f64> = entities.values().map(|e| e.average_impact).collect();
    let visualization = Some(VisualizationSpec {
        kind: visualization_kind(intent.visualization, intent.kind),
        config: json!({ "title": "Comparison" }),
        data: json!({
            "labels": labels,
            "moment_counts": moment_counts,
            "average_impact": average_impact,
        }),
    });

    Ok(PipelineOutput {
        data: QueryData::Comparison { entities, insights },
        explanation,
        visualization,
    })
}

/// Companies when two or more are mentioned, otherwise technologies.
/// Mixed-kind mentions compare whichever kind has at least two names.
fn compared_names(intent: &QueryIntent) -> Result<Vec<String>, QueryError> {
    if intent.entities.companies.len() >= 2 {
        return Ok(intent.entities.companies.clone());
    }
    if intent.entities.technologies.len() >= 2 {
        return Ok(intent.entities.technologies.clone());
    }
    Err(QueryError::ComparisonNeedsEntities(
        intent
            .entities
            .companies
            .len()
            .max(intent.entities.technologies.len()),
    ))
}

fn entry_stats(subset: &[&Moment], config: &AnalysisConfig, now: DateTime<Utc>) -> ComparisonEntry {
    let total_impact: u64 = subset.iter().map(|m| u64::from(m.impact.score)).sum();
    let cutoff = now - Duration::days(config.comparison_recent_days);

    let mut factors: Vec<(String, usize)> = analysis::factor_counts(subset).into_iter().collect();
    factors.sort_by(|a, b| b.1.cmp(&a.1));
    factors.truncate(TOP_FACTOR_LIMIT);

    ComparisonEntry {
        moment_count: subset.len(),
        average_impact: total_impact as f64 / subset.len().max(1) as f64,
        high_impact_count: subset
            .iter()
            .filter(|m| m.is_high_impact(config.high_impact_threshold))
            .count(),
        recent_count: subset.iter().filter(|m| m.extracted_at >= cutoff).count(),
        top_factors: factors.into_iter().map(|(name, _)| name).collect(),
    }
}

fn comparison_insights(entities: &BTreeMap<String, ComparisonEntry>) -> Vec<String> {
    if entities.values().all(|entry| entry.moment_count == 0) {
        return vec!["No moments found for the compared entities".to_string()];
    }

    let mut insights = Vec::new();
    if let Some((name, entry)) = entities
        .iter()
        .max_by(|a, b| {
            a.1.average_impact
                .partial_cmp(&b.1.average_impact)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    {
        insights.push(format!(
            "{} has the highest average impact ({:.1})",
            name, entry.average_impact
        ));
    }
    if let Some((name, entry)) = entities.iter().max_by_key(|(_, entry)| entry.moment_count) {
        insights.push(format!(
            "{} is the most active ({} moments)",
            name, entry.moment_count
        ));
    }
    insights
}
