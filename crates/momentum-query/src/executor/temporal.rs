//! Temporal pipeline: flat event timeline with span and peak-day insights.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use tracing::debug;

use momentum_core::config::AnalysisConfig;
use momentum_core::types::Moment;

use super::{filters, visualization_kind, PipelineOutput};
use crate::error::QueryError;
use crate::types::{QueryData, QueryIntent, TimelinePoint, VisualizationSpec};

pub(crate) fn run(
    moments: &[Moment],
    intent: &QueryIntent,
    config: &AnalysisConfig,
    now: DateTime<Utc>,
) -> Result<PipelineOutput, QueryError> {
    let filtered = filters::filter_moments(moments, intent, now);
    debug!(
        "Timeline over {} of {} moments",
        filtered.len(),
        moments.len()
    );

    let mut points: Vec<TimelinePoint> = filtered
        .iter()
        .map(|moment| TimelinePoint {
            date: moment.timeline_date.unwrap_or(moment.extracted_at),
            title: moment.title.clone(),
            impact: moment.impact.score,
            entities: moment.entities.companies_and_technologies(),
        })
        .collect();
    points.sort_by_key(|point| point.date);

    let insights = timeline_insights(&points, config);
    let explanation = format!("Timeline of {} events", points.len());
    let visualization = if points.is_empty() {
        None
    } else {
        Some(VisualizationSpec {
            kind: visualization_kind(intent.visualization, intent.kind),
            config: json!({ "title": "Timeline" }),
            data: json!({ "points": points }),
        })
    };

    Ok(PipelineOutput {
        data: QueryData::Timeline { points, insights },
        explanation,
        visualization,
    })
}

fn timeline_insights(points: &[TimelinePoint], config: &AnalysisConfig) -> Vec<String> {
    let mut insights = Vec::new();
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() >= 2 => (first, last),
        _ => return insights,
    };
    insights.push(format!(
        "Events span {} days",
        (last.date - first.date).num_days()
    ));

    let mut daily: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for point in points {
        *daily.entry(point.date.date_naive()).or_insert(0) += 1;
    }
    let mean = points.len() as f64 / daily.len().max(1) as f64;
    let peaks = daily
        .values()
        .filter(|count| **count as f64 > config.peak_ratio * mean)
        .count();
    if peaks > 0 {
        insights.push(format!(
            "{} days show peak activity (more than {:.1}x the daily average)",
            peaks, config.peak_ratio
        ));
    }

    insights
}
