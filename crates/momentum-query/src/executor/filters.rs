//! Shared moment filter chain.
//!
//! Four stages applied in fixed order: entity match, timeframe window,
//! factor membership, generic filters. Each stage only removes moments,
//! so adding a constraint never grows the result set.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

use momentum_core::types::Moment;

use crate::types::{EntityMentions, FactorSelector, QueryFilters, QueryIntent, Timeframe};

/// Run the full filter chain over the corpus.
pub(crate) fn filter_moments<'a>(
    moments: &'a [Moment],
    intent: &QueryIntent,
    now: DateTime<Utc>,
) -> Vec<&'a Moment> {
    filter_stages(moments, intent, now, true)
}

/// Filter chain without the entity stage, for pipelines that do their own
/// per-entity selection.
pub(crate) fn filter_moments_without_entities<'a>(
    moments: &'a [Moment],
    intent: &QueryIntent,
    now: DateTime<Utc>,
) -> Vec<&'a Moment> {
    filter_stages(moments, intent, now, false)
}

fn filter_stages<'a>(
    moments: &'a [Moment],
    intent: &QueryIntent,
    now: DateTime<Utc>,
    with_entities: bool,
) -> Vec<&'a Moment> {
    moments
        .iter()
        .filter(|moment| !with_entities || matches_entities(moment, &intent.entities))
        .filter(|moment| {
            intent
                .timeframe
                .as_ref()
                .map_or(true, |timeframe| within_timeframe(moment, timeframe, now))
        })
        .filter(|moment| {
            intent
                .factors
                .as_ref()
                .map_or(true, |selector| matches_factors(moment, selector))
        })
        .filter(|moment| {
            intent
                .filters
                .as_ref()
                .map_or(true, |filters| matches_filters(moment, filters))
        })
        .collect()
}

// =============================================================================
// Stage 1: entity match
// =============================================================================

/// AND across categories; within a category any requested name may match.
/// An empty category is a wildcard.
fn matches_entities(moment: &Moment, mentions: &EntityMentions) -> bool {
    category_matches(&mentions.companies, &moment.entities.companies, moment)
        && category_matches(&mentions.technologies, &moment.entities.technologies, moment)
        && category_matches(&mentions.concepts, &moment.classification.keywords, moment)
        && category_matches(&mentions.people, &moment.entities.people, moment)
        && category_matches(&mentions.locations, &moment.entities.locations, moment)
}

fn category_matches(requested: &[String], list: &[String], moment: &Moment) -> bool {
    if requested.is_empty() {
        return true;
    }
    requested
        .iter()
        .any(|name| name_matches(name, list, moment))
}

/// A name matches against the category's entity list (bidirectional
/// substring), the source name, or the raw text.
fn name_matches(requested: &str, list: &[String], moment: &Moment) -> bool {
    let requested = requested.to_lowercase();
    if requested.is_empty() {
        return false;
    }
    list.iter()
        .any(|candidate| overlaps(&requested, &candidate.to_lowercase()))
        || overlaps(&requested, &moment.source.name.to_lowercase())
        || moment.raw_text.to_lowercase().contains(&requested)
}

fn overlaps(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(b) || b.contains(a)
}

/// Whether a moment mentions the given name in any entity list, its source
/// name, or its raw text. Used by pipelines that select per entity.
pub(crate) fn moment_mentions(moment: &Moment, name: &str) -> bool {
    let name = name.to_lowercase();
    if name.is_empty() {
        return false;
    }
    let lists = [
        &moment.entities.companies,
        &moment.entities.technologies,
        &moment.entities.people,
        &moment.entities.locations,
    ];
    lists.iter().any(|list| {
        list.iter()
            .any(|candidate| overlaps(&name, &candidate.to_lowercase()))
    }) || overlaps(&name, &moment.source.name.to_lowercase())
        || moment.raw_text.to_lowercase().contains(&name)
}

// =============================================================================
// Stage 2: timeframe window
// =============================================================================

/// Phrase windows are half-open `[start, end)`; explicit ranges are
/// inclusive on both ends. An unparseable phrase filters nothing.
fn within_timeframe(moment: &Moment, timeframe: &Timeframe, now: DateTime<Utc>) -> bool {
    match timeframe {
        Timeframe::Range { start, end } => {
            moment.extracted_at >= *start && moment.extracted_at <= *end
        }
        Timeframe::Phrase(phrase) => match resolve_phrase(phrase, now) {
            Some((start, end)) => moment.extracted_at >= start && moment.extracted_at < end,
            None => true,
        },
    }
}

/// Resolve a relative-timeframe phrase to a concrete window.
///
/// Grammar: `today`, `yesterday`, `this week/month/year`,
/// `last N days/weeks/months/years` (bare unit means N = 1), `qN YYYY`.
/// Months count as 30 days and years as 365 when offsetting from now.
/// Spans too large to represent resolve to `None`.
pub(crate) fn resolve_phrase(
    phrase: &str,
    now: DateTime<Utc>,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let phrase = phrase.to_lowercase();
    let parts: Vec<&str> = phrase.split_whitespace().collect();
    match parts.as_slice() {
        ["today"] => Some((start_of_day(now)?, now)),
        ["yesterday"] => {
            let today = start_of_day(now)?;
            Some((today - Duration::days(1), today))
        }
        ["this", "week"] => {
            let monday = start_of_day(now)?
                - Duration::days(i64::from(now.weekday().num_days_from_monday()));
            Some((monday, now))
        }
        ["this", "month"] => {
            let start = Utc
                .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
                .single()?;
            Some((start, now))
        }
        ["this", "year"] => {
            let start = Utc.with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0).single()?;
            Some((start, now))
        }
        ["last", unit] => {
            let days = unit_days(unit)?;
            Some((now - Duration::days(days), now))
        }
        ["last", count, unit] => {
            let count: i64 = count.parse().ok()?;
            let days = unit_days(unit)?;
            let span = Duration::try_days(count.checked_mul(days)?)?;
            Some((now.checked_sub_signed(span)?, now))
        }
        [quarter, year] => {
            let quarter: u32 = quarter.strip_prefix('q')?.parse().ok()?;
            let year: i32 = year.parse().ok()?;
            quarter_window(quarter, year)
        }
        _ => None,
    }
}

fn start_of_day(at: DateTime<Utc>) -> Option<DateTime<Utc>> {
    at.date_naive().and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}

fn unit_days(unit: &str) -> Option<i64> {
    match unit {
        "day" | "days" => Some(1),
        "week" | "weeks" => Some(7),
        "month" | "months" => Some(30),
        "year" | "years" => Some(365),
        _ => None,
    }
}

fn quarter_window(quarter: u32, year: i32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    if !(1..=4).contains(&quarter) {
        return None;
    }
    let start_month = (quarter - 1) * 3 + 1;
    let start = Utc
        .with_ymd_and_hms(year, start_month, 1, 0, 0, 0)
        .single()?;
    let end = if quarter == 4 {
        Utc.with_ymd_and_hms(year.checked_add(1)?, 1, 1, 0, 0, 0)
            .single()?
    } else {
        Utc.with_ymd_and_hms(year, start_month + 3, 1, 0, 0, 0)
            .single()?
    };
    Some((start, end))
}

// =============================================================================
// Stage 3: factor membership
// =============================================================================

/// OR within each factor list, AND between the two groups.
fn matches_factors(moment: &Moment, selector: &FactorSelector) -> bool {
    let micro_ok = selector.micro.is_empty()
        || moment
            .classification
            .micro_factors
            .iter()
            .any(|factor| selector.micro.contains(factor));
    let macro_ok = selector.macro_factors.is_empty()
        || moment
            .classification
            .macro_factors
            .iter()
            .any(|factor| selector.macro_factors.contains(factor));
    micro_ok && macro_ok
}

// =============================================================================
// Stage 4: generic filters
// =============================================================================

fn matches_filters(moment: &Moment, filters: &QueryFilters) -> bool {
    filters
        .impact_threshold
        .map_or(true, |threshold| moment.impact.score >= threshold)
        && filters
            .confidence_level
            .map_or(true, |level| moment.classification.confidence == level)
        && filters
            .source_kind
            .map_or(true, |kind| moment.source.kind == kind)
}
