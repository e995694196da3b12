//! Trend pipeline: weekly activity buckets and direction insights.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde_json::json;
use tracing::debug;

use momentum_core::config::AnalysisConfig;
use momentum_core::types::Moment;

use super::{filters, visualization_kind, PipelineOutput};
use crate::error::QueryError;
use crate::types::{QueryData, QueryIntent, TrendBucket, VisualizationSpec};

pub(crate) fn run(
    moments: &[Moment],
    intent: &QueryIntent,
    _config: &AnalysisConfig,
    now: DateTime<Utc>,
) -> Result<PipelineOutput, QueryError> {
    let filtered = filters::filter_moments(moments, intent, now);
    debug!("Trend over {} of {} moments", filtered.len(), moments.len());

    let buckets = week_buckets(&filtered);
    let insights = trend_insights(&buckets);

    let explanation = format!(
        "Trend over {} weeks ({} moments)",
        buckets.len(),
        filtered.len()
    );
    let visualization = if buckets.is_empty() {
        None
    } else {
        let labels: Vec<String> = buckets.iter().map(|b| b.week_start.to_string()).collect();
        let counts: Vec<usize> = buckets.iter().map(|b| b.count).collect();
        let average_impact: Vec<f64> = buckets.iter().map(|b| b.average_impact).collect();
        Some(VisualizationSpec {
            kind: visualization_kind(intent.visualization, intent.kind),
            config: json!({ "title": "Weekly trend" }),
            data: json!({
                "labels": labels,
                "counts": counts,
                "average_impact": average_impact,
            }),
        })
    };

    Ok(PipelineOutput {
        data: QueryData::Trend { buckets, insights },
        explanation,
        visualization,
    })
}

/// Buckets moments into ISO weeks keyed by their Monday, ascending.
fn week_buckets(moments: &[&Moment]) -> Vec<TrendBucket> {
    let mut weeks: BTreeMap<NaiveDate, (usize, u64)> = BTreeMap::new();
    for moment in moments {
        let date = moment.extracted_at.date_naive();
        let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
        let entry = weeks.entry(monday).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += u64::from(moment.impact.score);
    }
    weeks
        .into_iter()
        .map(|(week_start, (count, total_impact))| TrendBucket {
            week_start,
            count,
            average_impact: total_impact as f64 / count.max(1) as f64,
        })
        .collect()
}

/// Compares the two most recent weeks. Fewer than two weeks of data gives
/// no direction to report.
fn trend_insights(buckets: &[TrendBucket]) -> Vec<String> {
    let mut insights = Vec::new();
    let (previous, latest) = match buckets {
        [.., previous, latest] => (previous, latest),
        _ => return insights,
    };

    match latest.count.cmp(&previous.count) {
        std::cmp::Ordering::Greater => insights.push(format!(
            "Activity is rising: {} moments in the latest week, up from {}",
            latest.count, previous.count
        )),
        std::cmp::Ordering::Less => insights.push(format!(
            "Activity is falling: {} moments in the latest week, down from {}",
            latest.count, previous.count
        )),
        std::cmp::Ordering::Equal => insights.push(format!(
            "Activity is steady at {} moments per week",
            latest.count
        )),
    }

    if latest.average_impact > previous.average_impact {
        insights.push(format!(
            "Average impact is rising ({:.1} vs {:.1})",
            latest.average_impact, previous.average_impact
        ));
    } else if latest.average_impact < previous.average_impact {
        insights.push(format!(
            "Average impact is falling ({:.1} vs {:.1})",
            latest.average_impact, previous.average_impact
        ));
    } else {
        insights.push(format!(
            "Average impact is steady at {:.1}",
            latest.average_impact
        ));
    }

    insights
}
