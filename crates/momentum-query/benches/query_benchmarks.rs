//! Benchmarks for query parsing and execution.
//!
//! Parsing runs the full pattern table against realistic query texts;
//! execution runs each pipeline over a synthetic thousand-moment corpus.
//! Both paths are pure in-memory scans, so these numbers bound the
//! per-query latency a host sees.

use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use criterion::{criterion_group, criterion_main, Criterion};

use momentum_core::types::{
    Classification, ConfidenceLevel, EntitySet, Impact, MacroFactor, MicroFactor, Moment,
    MomentSource, SourceKind,
};
use momentum_query::{KnownEntities, QueryContext, QueryExecutor, QueryParser};

const COMPANIES: &[&str] = &["Acme", "Globex", "Initech", "Umbrella", "Stark"];
const TECHNOLOGIES: &[&str] = &["solar", "robotics", "batteries", "quantum"];

/// Build a corpus with varied entities, factors, impacts, and dates.
fn generate_corpus(size: usize) -> Vec<Moment> {
    let now = Utc::now();
    (0..size)
        .map(|i| {
            let company = COMPANIES[i % COMPANIES.len()];
            let technology = TECHNOLOGIES[i % TECHNOLOGIES.len()];
            let micro = match i % 4 {
                0 => MicroFactor::Company,
                1 => MicroFactor::Competition,
                2 => MicroFactor::Partners,
                _ => MicroFactor::Customers,
            };
            let macro_factor = match i % 3 {
                0 => MacroFactor::Economic,
                1 => MacroFactor::Regulation,
                _ => MacroFactor::Technology,
            };
            Moment {
                id: format!("moment-{}", i),
                title: format!("{} announces {} initiative {}", company, technology, i),
                description: format!("Details of the {} {} program.", company, technology),
                raw_text: format!(
                    "{} has announced a new {} initiative affecting the market.",
                    company, technology
                ),
                extracted_at: now - Duration::days((i % 90) as i64),
                source: MomentSource {
                    kind: SourceKind::Company,
                    name: format!("{} Newsroom", company),
                },
                entities: EntitySet {
                    companies: vec![company.to_string()],
                    technologies: vec![technology.to_string()],
                    ..EntitySet::default()
                },
                classification: Classification {
                    micro_factors: vec![micro],
                    macro_factors: vec![macro_factor],
                    keywords: vec![technology.to_string()],
                    confidence: ConfidenceLevel::Medium,
                },
                impact: Impact::new(((i * 7) % 101) as u8),
                timeline_date: None,
            }
        })
        .collect()
}

fn catalog() -> KnownEntities {
    KnownEntities {
        companies: COMPANIES.iter().map(|s| s.to_string()).collect(),
        technologies: TECHNOLOGIES.iter().map(|s| s.to_string()).collect(),
        people: Vec::new(),
        locations: Vec::new(),
    }
}

const QUERIES: &[&str] = &[
    "show me moments about Acme",
    "compare Acme and Globex",
    "how many moments in the last 30 days",
    "analyze solar",
    "what happened this month",
    "trending robotics",
    "show me patterns in the data",
    "filter by high impact",
];

fn bench_parse(c: &mut Criterion) {
    let parser = QueryParser::default();
    let known = catalog();
    let context = QueryContext::default();

    let mut group = c.benchmark_group("parse");
    group.sample_size(200);
    group.measurement_time(StdDuration::from_secs(5));

    group.bench_function("pattern_queries", |b| {
        let mut idx = 0usize;
        b.iter(|| {
            let intent = parser.parse(QUERIES[idx % QUERIES.len()], &context, &known);
            idx += 1;
            intent
        });
    });

    // No pattern matches this text, so it takes the fallback path.
    group.bench_function("fallback_query", |b| {
        b.iter(|| parser.parse("acme globex solar robotics", &context, &known));
    });

    group.finish();
}

fn bench_execute(c: &mut Criterion) {
    let parser = QueryParser::default();
    let known = catalog();
    let context = QueryContext::default();

    let mut executor = QueryExecutor::default();
    executor.update_data(
        generate_corpus(1000),
        COMPANIES.iter().map(|s| s.to_string()).collect(),
        TECHNOLOGIES.iter().map(|s| s.to_string()).collect(),
    );

    let intents: Vec<_> = QUERIES
        .iter()
        .map(|query| parser.parse(query, &context, &known))
        .collect();

    let mut group = c.benchmark_group("execute");
    group.sample_size(100);
    group.measurement_time(StdDuration::from_secs(10));

    group.bench_function("all_pipelines_1000_moments", |b| {
        let mut idx = 0usize;
        b.iter(|| {
            let results = executor.execute(&intents[idx % intents.len()], &context);
            idx += 1;
            results
        });
    });

    group.bench_function("search_1000_moments", |b| {
        b.iter(|| executor.execute(&intents[0], &context));
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_execute);
criterion_main!(benches);
