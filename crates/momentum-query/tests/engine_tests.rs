//! End-to-end tests for the query engine.
//!
//! Each test drives the public surface the way a host would: load a corpus,
//! issue free-text queries through the orchestrator or executor, and check
//! the finalized entries. Cross-cutting properties (totality, idempotence,
//! filter monotonicity, history bounds) get their own section.

use chrono::{Duration, Utc};
use momentum_core::config::EngineConfig;
use momentum_core::types::{
    Classification, EntitySet, Impact, Moment, MomentSource, SourceKind,
};
use momentum_query::{
    AggregateData, EntityMentions, QueryContext, QueryData, QueryExecutor, QueryFilters,
    QueryIntent, QueryKind, QueryOrchestrator, ResultKind, VisualizationHint,
};

// =============================================================================
// Helpers
// =============================================================================

fn make_moment(id: &str, companies: Vec<&str>, impact: u8, days_ago: i64) -> Moment {
    Moment {
        id: id.to_string(),
        title: format!("moment {}", id),
        description: String::new(),
        raw_text: String::new(),
        extracted_at: Utc::now() - Duration::days(days_ago),
        source: MomentSource {
            kind: SourceKind::Company,
            name: "Newswire".to_string(),
        },
        entities: EntitySet {
            companies: companies.into_iter().map(String::from).collect(),
            ..EntitySet::default()
        },
        classification: Classification::default(),
        impact: Impact::new(impact),
        timeline_date: None,
    }
}

fn orchestrator_with(moments: Vec<Moment>, companies: Vec<&str>) -> QueryOrchestrator {
    let mut orchestrator = QueryOrchestrator::new(EngineConfig::default());
    orchestrator.update_data(
        moments,
        companies.into_iter().map(String::from).collect(),
        vec![],
    );
    orchestrator
}

fn search_intent(companies: Vec<&str>) -> QueryIntent {
    QueryIntent {
        kind: QueryKind::Search,
        entities: EntityMentions {
            companies: companies.into_iter().map(String::from).collect(),
            ..EntityMentions::default()
        },
        timeframe: None,
        factors: None,
        filters: None,
        metrics: Vec::new(),
        visualization: VisualizationHint::Cards,
        confidence: 85,
    }
}

fn moments_in(data: &QueryData) -> &Vec<Moment> {
    match data {
        QueryData::Moments { moments, .. } => moments,
        other => panic!("unexpected payload: {:?}", other),
    }
}

// =============================================================================
// End-to-end scenarios
// =============================================================================

#[test]
fn test_search_finds_and_ranks_company_moments() {
    let mut orchestrator = orchestrator_with(
        vec![
            make_moment("low", vec!["Acme"], 40, 5),
            make_moment("high", vec!["Acme"], 80, 3),
            make_moment("other", vec!["Globex"], 90, 1),
        ],
        vec!["Acme", "Globex"],
    );
    let entry = orchestrator.process_query("show me moments about Acme", &QueryContext::default());

    let intent = entry.intent.as_ref().unwrap();
    assert_eq!(intent.kind, QueryKind::Search);
    assert_eq!(intent.entities.companies, vec!["Acme"]);
    assert_eq!(intent.confidence, 85);

    let results = entry.results.unwrap();
    assert_eq!(results.kind, ResultKind::Search);
    let impacts: Vec<u8> = moments_in(&results.data)
        .iter()
        .map(|m| m.impact.score)
        .collect();
    assert_eq!(impacts, vec![80, 40]);
}

#[test]
fn test_count_aggregate_over_whole_corpus() {
    let mut moments = Vec::new();
    for i in 0..10 {
        let impact = if i < 3 { 85 } else { 40 };
        moments.push(make_moment(&i.to_string(), vec!["Acme"], impact, i));
    }
    let mut orchestrator = orchestrator_with(moments, vec!["Acme"]);
    let entry = orchestrator.process_query("how many moments", &QueryContext::default());

    assert_eq!(entry.intent.as_ref().unwrap().kind, QueryKind::Aggregate);
    match entry.results.unwrap().data {
        QueryData::Aggregate(AggregateData::Count {
            total_moments,
            high_impact_moments,
            ..
        }) => {
            assert_eq!(total_moments, 10);
            assert_eq!(high_impact_moments, 3);
        }
        other => panic!("unexpected payload: {:?}", other),
    }
}

#[test]
fn test_comparison_of_disjoint_companies() {
    let mut moments = Vec::new();
    for i in 0..4 {
        moments.push(make_moment(&format!("a{}", i), vec!["Acme"], 50, i));
    }
    for i in 0..7 {
        moments.push(make_moment(&format!("g{}", i), vec!["Globex"], 50, i));
    }
    let mut orchestrator = orchestrator_with(moments, vec!["Acme", "Globex"]);
    let entry = orchestrator.process_query("compare Acme and Globex", &QueryContext::default());

    let intent = entry.intent.as_ref().unwrap();
    assert_eq!(intent.kind, QueryKind::Comparison);
    assert_eq!(intent.confidence, 90);

    match entry.results.unwrap().data {
        QueryData::Comparison { entities, .. } => {
            let keys: Vec<&String> = entities.keys().collect();
            assert_eq!(keys, vec!["Acme", "Globex"]);
            assert_eq!(entities["Acme"].moment_count, 4);
            assert_eq!(entities["Globex"].moment_count, 7);
        }
        other => panic!("unexpected payload: {:?}", other),
    }
}

#[test]
fn test_trend_on_empty_corpus() {
    let mut orchestrator = orchestrator_with(vec![], vec![]);
    let entry = orchestrator.process_query("trending AI", &QueryContext::default());

    assert_eq!(entry.intent.as_ref().unwrap().kind, QueryKind::Trend);
    assert!(entry.error.is_none());
    match entry.results.unwrap().data {
        QueryData::Trend { buckets, insights } => {
            assert!(buckets.is_empty());
            assert!(insights.is_empty());
        }
        other => panic!("unexpected payload: {:?}", other),
    }
}

#[test]
fn test_pattern_finds_three_day_sequence() {
    let mut first = make_moment("launch", vec!["Acme"], 60, 6);
    first.title = "Acme launches RoboX".to_string();
    first.entities.technologies = vec!["RoboX".to_string()];
    let mut second = make_moment("expand", vec!["Acme"], 70, 3);
    second.title = "Acme expands RoboX production".to_string();
    second.entities.technologies = vec!["RoboX".to_string()];

    let mut orchestrator = orchestrator_with(vec![first, second], vec!["Acme"]);
    let entry =
        orchestrator.process_query("show me patterns in the data", &QueryContext::default());

    assert_eq!(entry.intent.as_ref().unwrap().kind, QueryKind::Pattern);
    match entry.results.unwrap().data {
        QueryData::Patterns { sequences, .. } => {
            assert!(!sequences.is_empty());
            assert!(sequences[0].contains("Acme launches RoboX"));
            assert!(sequences[0].contains("Acme expands RoboX production"));
            assert!(sequences[0].contains("3 days later"));
        }
        other => panic!("unexpected payload: {:?}", other),
    }
}

// =============================================================================
// Totality and idempotence
// =============================================================================

#[test]
fn test_parse_and_execute_never_fail() {
    let mut orchestrator = orchestrator_with(
        vec![make_moment("1", vec!["Acme"], 50, 1)],
        vec!["Acme"],
    );
    let long_query = "very long query ".repeat(200);
    let inputs = [
        "",
        "   ",
        "?????",
        "show me",
        "a",
        "compare",
        "how many moments about acme last 30 days",
        "what happened last 200000000000 days",
        "show me moments from last 9999999999 years",
        "🚀🚀🚀",
        "SELECT * FROM moments",
        long_query.as_str(),
    ];
    for input in inputs {
        let entry = orchestrator.process_query(input, &QueryContext::default());
        assert!(!entry.loading);
        let intent = entry.intent.as_ref().unwrap();
        assert!(intent.confidence <= 100, "confidence out of range for {:?}", input);
        // Comparison arity errors are legitimate; everything else completes.
        if entry.error.is_none() {
            assert!(entry.results.is_some(), "no results for {:?}", input);
        }
    }
}

#[test]
fn test_execute_is_total_even_for_failing_pipelines() {
    let executor = QueryExecutor::default();
    let mut intent = search_intent(vec!["Acme"]);
    intent.kind = QueryKind::Comparison;

    let results = executor.execute(&intent, &QueryContext::default());
    assert_eq!(results.confidence, 0);
    assert!(matches!(results.data, QueryData::Summary(_)));
}

#[test]
fn test_identical_queries_give_identical_data() {
    let mut orchestrator = orchestrator_with(
        vec![
            make_moment("1", vec!["Acme"], 80, 1),
            make_moment("2", vec!["Acme", "Globex"], 60, 2),
            make_moment("3", vec!["Globex"], 40, 3),
        ],
        vec!["Acme", "Globex"],
    );
    let first = orchestrator.process_query("analyze acme", &QueryContext::default());
    let second = orchestrator.process_query("analyze acme", &QueryContext::default());
    assert_eq!(
        first.results.unwrap().data,
        second.results.unwrap().data
    );
}

// =============================================================================
// Filter monotonicity
// =============================================================================

#[test]
fn test_each_added_constraint_narrows_results() {
    let mut executor = QueryExecutor::default();
    let mut moments = Vec::new();
    for i in 0..12 {
        let company = if i % 3 == 0 { "Acme" } else { "Globex" };
        moments.push(make_moment(&i.to_string(), vec![company], (i * 8) as u8, i));
    }
    executor.update_data(
        moments,
        vec!["Acme".to_string(), "Globex".to_string()],
        vec![],
    );
    let context = QueryContext::default();

    let unconstrained = search_intent(vec![]);
    let all = moments_in(&executor.execute(&unconstrained, &context).data).len();

    let by_entity = search_intent(vec!["Acme"]);
    let entity_count = moments_in(&executor.execute(&by_entity, &context).data).len();

    let mut by_entity_and_impact = search_intent(vec!["Acme"]);
    by_entity_and_impact.filters = Some(QueryFilters {
        impact_threshold: Some(50),
        ..QueryFilters::default()
    });
    let narrowed = moments_in(&executor.execute(&by_entity_and_impact, &context).data).len();

    assert_eq!(all, 12);
    assert!(entity_count <= all);
    assert!(narrowed <= entity_count);
    assert!(narrowed > 0);
}

// =============================================================================
// History
// =============================================================================

#[test]
fn test_history_keeps_only_newest_fifty() {
    let mut orchestrator = orchestrator_with(
        vec![make_moment("1", vec!["Acme"], 50, 1)],
        vec!["Acme"],
    );
    for i in 0..60 {
        orchestrator.process_query(&format!("query {}", i), &QueryContext::default());
    }
    assert_eq!(orchestrator.history().len(), 50);
    assert_eq!(orchestrator.history().recent_texts(1), vec!["query 59"]);
}

#[test]
fn test_suggestions_available_without_history() {
    let orchestrator = QueryOrchestrator::default();
    let suggestions = orchestrator.suggestions();
    assert!(!suggestions.is_empty());
    assert!(suggestions.len() <= 8);
}
