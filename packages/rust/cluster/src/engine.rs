//! Cluster engine: pivot → participation filter → PCA → k-means.

use rollcall_shared::{ClusterAssignment, ClusterOptions, RecodedTable, Result, RollCallError};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::kmeans;
use crate::matrix::SenatorVoteMatrix;
use crate::pca;

/// Clustering outcome plus the diagnostics consumers may want to display.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterReport {
    /// One entry per retained senator, in senator-name order.
    pub assignments: Vec<ClusterAssignment>,
    /// Senators removed by the participation filter.
    pub dropped_senators: Vec<String>,
    /// Vote columns in the projected matrix.
    pub votes: usize,
    /// Share of variance captured by each principal component.
    pub explained_variance_ratio: Vec<f64>,
    /// Within-cluster sum of squares of the final partition.
    pub inertia: f64,
}

/// Cluster senators and return one assignment per retained senator.
pub fn cluster(table: &RecodedTable, options: &ClusterOptions) -> Result<Vec<ClusterAssignment>> {
    Ok(cluster_report(table, options)?.assignments)
}

/// Cluster senators and return the assignments with projection diagnostics.
///
/// Fails with `InsufficientData` when fewer than two senators survive the
/// participation filter, when there are fewer than two votes, or when more
/// clusters are requested than senators remain.
#[instrument(skip_all, fields(rows = table.len(), k = options.cluster_count))]
pub fn cluster_report(table: &RecodedTable, options: &ClusterOptions) -> Result<ClusterReport> {
    options.validate()?;

    let matrix = SenatorVoteMatrix::pivot(table);
    let (retained, dropped) =
        matrix.retain_participating(options.participation_threshold, options.participation);
    let (senators, votes) = retained.shape();

    debug!(
        pivoted = matrix.shape().0,
        retained = senators,
        dropped = dropped.len(),
        votes,
        measure = ?options.participation,
        "participation filter applied"
    );

    if senators < 2 {
        return Err(RollCallError::insufficient(
            senators,
            votes,
            format!(
                "need at least 2 senators with participation >= {}",
                options.participation_threshold
            ),
        ));
    }
    if votes < 2 {
        return Err(RollCallError::insufficient(
            senators,
            votes,
            "need at least 2 votes",
        ));
    }
    if options.cluster_count > senators {
        return Err(RollCallError::insufficient(
            senators,
            votes,
            format!("cannot form {} clusters", options.cluster_count),
        ));
    }

    let data = retained.materialize(options.fill);
    let projection = pca::project(&data);
    let fit = kmeans::fit(
        &projection.scores,
        options.cluster_count,
        options.random_seed,
        options.n_init,
        options.max_iterations,
    );

    let assignments: Vec<ClusterAssignment> = retained
        .senators()
        .iter()
        .zip(projection.scores)
        .zip(&fit.labels)
        .map(|((senator, coordinates), &cluster_label)| ClusterAssignment {
            senator: senator.clone(),
            cluster_label,
            coordinates,
        })
        .collect();

    info!(
        senators,
        votes,
        clusters = options.cluster_count,
        inertia = fit.inertia,
        iterations = fit.iterations,
        "clustering complete"
    );

    Ok(ClusterReport {
        assignments,
        dropped_senators: dropped,
        votes,
        explained_variance_ratio: projection.explained_variance_ratio,
        inertia: fit.inertia,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_shared::{ParticipationMeasure, RecodedRecord};
    use std::collections::BTreeSet;

    fn table_from_rows(rows: &[(&str, [u8; 5])]) -> RecodedTable {
        let mut records = Vec::new();
        for v in 0..5 {
            for (senator, casts) in rows {
                records.push(RecodedRecord {
                    senator: senator.to_string(),
                    cast_raw: if casts[v] == 1 { "Yea" } else { "Nay" }.into(),
                    vote_id: format!("vote_{v}"),
                    cast_binary: casts[v],
                });
            }
        }
        RecodedTable { records }
    }

    fn ten_by_five() -> RecodedTable {
        table_from_rows(&[
            ("S00", [1, 1, 1, 0, 0]),
            ("S01", [1, 1, 1, 0, 0]),
            ("S02", [1, 1, 1, 0, 0]),
            ("S03", [1, 1, 1, 0, 0]),
            ("S04", [0, 0, 0, 1, 1]),
            ("S05", [0, 0, 0, 1, 1]),
            ("S06", [0, 0, 0, 1, 1]),
            ("S07", [1, 0, 1, 0, 1]),
            ("S08", [1, 0, 1, 0, 1]),
            ("S09", [1, 0, 1, 0, 1]),
        ])
    }

    #[test]
    fn three_clusters_over_ten_senators() {
        let assignments = cluster(&ten_by_five(), &ClusterOptions::new(1, 3, 0)).unwrap();

        assert_eq!(assignments.len(), 10);
        let names: BTreeSet<&str> = assignments.iter().map(|a| a.senator.as_str()).collect();
        assert_eq!(names.len(), 10);

        let labels: BTreeSet<usize> = assignments.iter().map(|a| a.cluster_label).collect();
        assert_eq!(labels, BTreeSet::from([0, 1, 2]));

        // Identical voting records share a label
        let label_of = |s: &str| assignments.iter().find(|a| a.senator == s).unwrap().cluster_label;
        assert_eq!(label_of("S00"), label_of("S03"));
        assert_eq!(label_of("S04"), label_of("S06"));
        assert_eq!(label_of("S07"), label_of("S09"));
        assert_ne!(label_of("S00"), label_of("S04"));

        // Full coordinate vectors: min(10 senators, 5 votes) components
        assert!(assignments.iter().all(|a| a.coordinates.len() == 5));
    }

    #[test]
    fn same_seed_is_deterministic() {
        let table = ten_by_five();
        let a = cluster(&table, &ClusterOptions::new(1, 2, 99)).unwrap();
        let b = cluster(&table, &ClusterOptions::new(1, 2, 99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn single_senator_single_vote_is_insufficient() {
        let table = RecodedTable {
            records: vec![RecodedRecord {
                senator: "Solo".into(),
                cast_raw: "Yea".into(),
                vote_id: "vote_1".into(),
                cast_binary: 1,
            }],
        };
        let err = cluster(&table, &ClusterOptions::new(1, 1, 0)).unwrap_err();
        assert!(matches!(
            err,
            RollCallError::InsufficientData { senators: 1, votes: 1, .. }
        ));
    }

    #[test]
    fn filter_boundary_drops_only_strictly_below() {
        // Signal masses: Zero = 0, One = 1, Two = 2
        let table = table_from_rows(&[
            ("Zero", [0, 0, 0, 0, 0]),
            ("One", [1, 0, 0, 0, 0]),
            ("Two", [1, 1, 0, 0, 0]),
        ]);
        let report = cluster_report(&table, &ClusterOptions::new(1, 2, 0)).unwrap();
        let kept: Vec<&str> = report.assignments.iter().map(|a| a.senator.as_str()).collect();
        assert_eq!(kept, vec!["One", "Two"]);
        assert_eq!(report.dropped_senators, vec!["Zero".to_string()]);
    }

    #[test]
    fn votes_cast_measure_keeps_all_nay_senators() {
        let table = table_from_rows(&[
            ("Zero", [0, 0, 0, 0, 0]),
            ("One", [1, 0, 0, 0, 0]),
            ("Two", [1, 1, 0, 0, 0]),
        ]);
        let mut options = ClusterOptions::new(1, 2, 0);
        options.participation = ParticipationMeasure::VotesCast;
        let report = cluster_report(&table, &options).unwrap();
        assert_eq!(report.assignments.len(), 3);
        assert!(report.dropped_senators.is_empty());
    }

    #[test]
    fn too_many_clusters_is_insufficient() {
        let table = table_from_rows(&[("A", [1, 0, 1, 0, 1]), ("B", [0, 1, 0, 1, 1])]);
        let err = cluster(&table, &ClusterOptions::new(1, 3, 0)).unwrap_err();
        assert_eq!(err.stage(), "cluster");
    }

    #[test]
    fn invalid_options_are_config_errors() {
        let err = cluster(&ten_by_five(), &ClusterOptions::new(1, 0, 0)).unwrap_err();
        assert_eq!(err.stage(), "config");
    }

    #[test]
    fn report_serializes_for_sinks() {
        let report = cluster_report(&ten_by_five(), &ClusterOptions::new(1, 3, 0)).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["assignments"].as_array().unwrap().len(), 10);
        assert_eq!(json["votes"], 5);
        let ratios: f64 = report.explained_variance_ratio.iter().sum();
        assert!((ratios - 1.0).abs() < 1e-9);
    }
}
