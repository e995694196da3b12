//! Pattern pipeline: dominant factors, entity co-mention clusters, and
//! short sequential chains of related moments.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::debug;

use momentum_core::config::AnalysisConfig;
use momentum_core::types::Moment;

use super::{analysis, filters, visualization_kind, PipelineOutput};
use crate::error::QueryError;
use crate::types::{EntityCluster, QueryData, QueryIntent, VisualizationSpec};

pub(crate) fn run(
    moments: &[Moment],
    intent: &QueryIntent,
    config: &AnalysisConfig,
    now: DateTime<Utc>,
) -> Result<PipelineOutput, QueryError> {
    let filtered = filters::filter_moments(moments, intent, now);
    debug!(
        "Pattern detection over {} of {} moments",
        filtered.len(),
        moments.len()
    );

    let factor_patterns = analysis::factor_dominance(&filtered, config);
    let clusters = entity_clusters(&filtered, config);
    let sequences = sequential_patterns(&filtered, config);

    let explanation = format!(
        "Found {} factor patterns, {} clusters, {} sequences in {} moments",
        factor_patterns.len(),
        clusters.len(),
        sequences.len(),
        filtered.len()
    );
    let visualization = if clusters.is_empty() {
        None
    } else {
        let cluster_data: Vec<serde_json::Value> = clusters
            .iter()
            .map(|cluster| {
                json!({
                    "companies": cluster.companies,
                    "technologies": cluster.technologies,
                    "size": cluster.size(),
                })
            })
            .collect();
        Some(VisualizationSpec {
            kind: visualization_kind(intent.visualization, intent.kind),
            config: json!({ "title": "Entity clusters" }),
            data: json!({ "clusters": cluster_data }),
        })
    };

    Ok(PipelineOutput {
        data: QueryData::Patterns {
            factor_patterns,
            clusters,
            sequences,
        },
        explanation,
        visualization,
    })
}

/// Groups moments by their exact set of companies and technologies. Groups
/// reaching the minimum size become clusters, ordered by fingerprint.
fn entity_clusters(moments: &[&Moment], config: &AnalysisConfig) -> Vec<EntityCluster> {
    let mut groups: BTreeMap<(Vec<String>, Vec<String>), Vec<String>> = BTreeMap::new();
    for moment in moments {
        let mut companies = moment.entities.companies.clone();
        companies.sort();
        companies.dedup();
        let mut technologies = moment.entities.technologies.clone();
        technologies.sort();
        technologies.dedup();
        if companies.is_empty() && technologies.is_empty() {
            continue;
        }
        groups
            .entry((companies, technologies))
            .or_default()
            .push(moment.id.clone());
    }

    groups
        .into_iter()
        .filter(|(_, ids)| ids.len() >= config.cluster_min_size)
        .map(|((companies, technologies), moment_ids)| EntityCluster {
            companies,
            technologies,
            moment_ids,
        })
        .collect()
}

/// Chronologically adjacent moments that fall within the sequence window
/// and share an entity or a factor.
fn sequential_patterns(moments: &[&Moment], config: &AnalysisConfig) -> Vec<String> {
    let mut ordered: Vec<&Moment> = moments.to_vec();
    ordered.sort_by_key(|moment| moment.extracted_at);

    let mut sequences = Vec::new();
    for pair in ordered.windows(2) {
        if sequences.len() >= config.sequence_limit {
            break;
        }
        let (first, second) = (pair[0], pair[1]);
        let gap = (second.extracted_at - first.extracted_at).num_days();
        if gap > config.sequence_window_days {
            continue;
        }
        if shares_entity_or_factor(first, second) {
            sequences.push(format!(
                "\"{}\" was followed by \"{}\" {} days later",
                first.title, second.title, gap
            ));
        }
    }
    sequences
}

fn shares_entity_or_factor(first: &Moment, second: &Moment) -> bool {
    let first_names = first.entities.companies_and_technologies();
    let second_names = second.entities.companies_and_technologies();
    let shared_entity = first_names.iter().any(|a| {
        second_names
            .iter()
            .any(|b| a.eq_ignore_ascii_case(b))
    });
    if shared_entity {
        return true;
    }
    first
        .classification
        .micro_factors
        .iter()
        .any(|f| second.classification.micro_factors.contains(f))
        || first
            .classification
            .macro_factors
            .iter()
            .any(|f| second.classification.macro_factors.contains(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntityMentions, QueryKind, VisualizationHint, VisualizationKind};
    use chrono::Duration;
    use momentum_core::types::{
        Classification, EntitySet, Impact, MacroFactor, MomentSource, SourceKind,
    };

    fn make_moment(id: &str, companies: Vec<&str>, days_ago: i64) -> Moment {
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
            impact: Impact::new(50),
            timeline_date: None,
        }
    }

    fn intent() -> QueryIntent {
        QueryIntent {
            kind: QueryKind::Pattern,
            entities: EntityMentions::default(),
            timeframe: None,
            factors: None,
            filters: None,
            metrics: Vec::new(),
            visualization: VisualizationHint::Network,
            confidence: 80,
        }
    }

    fn payload(output: &PipelineOutput) -> (&Vec<String>, &Vec<EntityCluster>, &Vec<String>) {
        match &output.data {
            QueryData::Patterns {
                factor_patterns,
                clusters,
                sequences,
            } => (factor_patterns, clusters, sequences),
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    // ---- Clusters ----

    #[test]
    fn test_cluster_needs_min_size() {
        let corpus = vec![
            make_moment("1", vec!["Acme"], 1),
            make_moment("2", vec!["Acme"], 2),
            make_moment("3", vec!["Globex"], 3),
        ];
        let output = run(&corpus, &intent(), &AnalysisConfig::default(), Utc::now()).unwrap();
        let (_, clusters, _) = payload(&output);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].companies, vec!["Acme"]);
        assert_eq!(clusters[0].size(), 2);
    }

    #[test]
    fn test_cluster_fingerprint_ignores_order() {
        let corpus = vec![
            make_moment("1", vec!["Globex", "Acme"], 1),
            make_moment("2", vec!["Acme", "Globex"], 2),
        ];
        let output = run(&corpus, &intent(), &AnalysisConfig::default(), Utc::now()).unwrap();
        let (_, clusters, _) = payload(&output);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].companies, vec!["Acme", "Globex"]);
    }

    #[test]
    fn test_entityless_moments_never_cluster() {
        let corpus = vec![make_moment("1", vec![], 1), make_moment("2", vec![], 2)];
        let output = run(&corpus, &intent(), &AnalysisConfig::default(), Utc::now()).unwrap();
        let (_, clusters, _) = payload(&output);
        assert!(clusters.is_empty());
        assert!(output.visualization.is_none());
    }

    // ---- Sequences ----

    #[test]
    fn test_sequence_within_window() {
        // Pin one instant so the gap is exactly 3 days; two separate
        // Utc::now() reads would leave it a hair short and truncate to 2.
        let now = Utc::now();
        let mut later = make_moment("later", vec!["Acme"], 2);
        let mut earlier = make_moment("earlier", vec!["Acme"], 5);
        later.extracted_at = now - Duration::days(2);
        earlier.extracted_at = now - Duration::days(5);
        let corpus = vec![later, earlier];
        let output = run(&corpus, &intent(), &AnalysisConfig::default(), now).unwrap();
        let (_, _, sequences) = payload(&output);
        assert_eq!(sequences.len(), 1);
        assert!(sequences[0].contains("moment earlier"));
        assert!(sequences[0].contains("moment later"));
        assert!(sequences[0].contains("3 days later"));
    }

    #[test]
    fn test_sequence_gap_too_wide() {
        let corpus = vec![
            make_moment("1", vec!["Acme"], 1),
            make_moment("2", vec!["Acme"], 20),
        ];
        let output = run(&corpus, &intent(), &AnalysisConfig::default(), Utc::now()).unwrap();
        let (_, _, sequences) = payload(&output);
        assert!(sequences.is_empty());
    }

    #[test]
    fn test_sequence_requires_shared_entity_or_factor() {
        let corpus = vec![
            make_moment("1", vec!["Acme"], 1),
            make_moment("2", vec!["Globex"], 2),
        ];
        let output = run(&corpus, &intent(), &AnalysisConfig::default(), Utc::now()).unwrap();
        let (_, _, sequences) = payload(&output);
        assert!(sequences.is_empty());
    }

    #[test]
    fn test_sequence_via_shared_factor() {
        let mut first = make_moment("1", vec!["Acme"], 4);
        first.classification.macro_factors = vec![MacroFactor::Regulation];
        let mut second = make_moment("2", vec!["Globex"], 1);
        second.classification.macro_factors = vec![MacroFactor::Regulation];
        let corpus = vec![first, second];

        let output = run(&corpus, &intent(), &AnalysisConfig::default(), Utc::now()).unwrap();
        let (_, _, sequences) = payload(&output);
        assert_eq!(sequences.len(), 1);
    }

    #[test]
    fn test_sequence_limit_respected() {
        let corpus: Vec<Moment> = (0..10)
            .map(|i| make_moment(&i.to_string(), vec!["Acme"], 10 - i))
            .collect();
        let output = run(&corpus, &intent(), &AnalysisConfig::default(), Utc::now()).unwrap();
        let (_, _, sequences) = payload(&output);
        assert_eq!(sequences.len(), AnalysisConfig::default().sequence_limit);
    }

    // ---- Factor patterns and visualization ----

    #[test]
    fn test_dominant_factor_reported() {
        let mut moments = Vec::new();
        for i in 0..4 {
            let mut moment = make_moment(&i.to_string(), vec!["Acme"], i);
            moment.classification.macro_factors = vec![MacroFactor::Economic];
            moments.push(moment);
        }
        let output = run(&moments, &intent(), &AnalysisConfig::default(), Utc::now()).unwrap();
        let (factor_patterns, _, _) = payload(&output);
        assert!(factor_patterns.iter().any(|p| p.contains("economic")));
    }

    #[test]
    fn test_network_visualization_with_clusters() {
        let corpus = vec![
            make_moment("1", vec!["Acme"], 1),
            make_moment("2", vec!["Acme"], 2),
        ];
        let output = run(&corpus, &intent(), &AnalysisConfig::default(), Utc::now()).unwrap();
        let viz = output.visualization.unwrap();
        assert_eq!(viz.kind, VisualizationKind::Network);
        assert_eq!(viz.data["clusters"][0]["size"], 2);
    }

    #[test]
    fn test_empty_corpus() {
        let output = run(&[], &intent(), &AnalysisConfig::default(), Utc::now()).unwrap();
        let (factor_patterns, clusters, sequences) = payload(&output);
        assert!(factor_patterns.is_empty());
        assert!(clusters.is_empty());
        assert!(sequences.is_empty());
    }
}
