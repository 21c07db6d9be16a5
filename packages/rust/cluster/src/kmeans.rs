//! Seeded k-means with k-means++ initialization.
//!
//! All randomness comes from one `ChaCha8Rng` seeded by the caller, so equal
//! seeds give equal labels. Each of `n_init` restarts runs Lloyd iterations
//! until assignments stop changing; the run with the lowest inertia wins.

use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Result of a k-means fit.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    /// Cluster label per point, numbered by first appearance.
    pub labels: Vec<usize>,
    /// Centroid per label.
    pub centroids: Vec<Vec<f64>>,
    /// Sum of squared distances from points to their centroids.
    pub inertia: f64,
    /// Lloyd iterations used by the winning run.
    pub iterations: usize,
}

/// Partition `points` into `k` clusters.
///
/// Callers guarantee `1 <= k <= points.len()` and `n_init >= 1`.
pub fn fit(
    points: &[Vec<f64>],
    k: usize,
    seed: u64,
    n_init: usize,
    max_iterations: usize,
) -> KMeansFit {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut best = lloyd(points, plus_plus_init(points, k, &mut rng), max_iterations);

    for _ in 1..n_init {
        let run = lloyd(points, plus_plus_init(points, k, &mut rng), max_iterations);
        if run.inertia < best.inertia {
            best = run;
        }
    }

    relabel_by_first_appearance(best, k)
}

/// k-means++ seeding: each next centroid is drawn with probability
/// proportional to its squared distance from the nearest chosen centroid.
fn plus_plus_init(points: &[Vec<f64>], k: usize, rng: &mut ChaCha8Rng) -> Vec<Vec<f64>> {
    let n = points.len();
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..n)].clone());

    let mut nearest: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let next = match WeightedIndex::new(&nearest) {
            Ok(dist) => dist.sample(rng),
            // Every point coincides with a centroid
            Err(_) => rng.gen_range(0..n),
        };
        let chosen = points[next].clone();
        for (d, p) in nearest.iter_mut().zip(points) {
            *d = d.min(squared_distance(p, &chosen));
        }
        centroids.push(chosen);
    }

    centroids
}

fn lloyd(points: &[Vec<f64>], mut centroids: Vec<Vec<f64>>, max_iterations: usize) -> KMeansFit {
    let n = points.len();
    let k = centroids.len();
    let dim = points.first().map_or(0, Vec::len);
    let mut labels = vec![usize::MAX; n];
    let mut iterations = 0;

    while iterations < max_iterations {
        iterations += 1;

        let mut changed = false;
        for (label, p) in labels.iter_mut().zip(points) {
            let nearest = nearest_centroid(p, &centroids);
            if *label != nearest {
                *label = nearest;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        let mut sums = vec![vec![0.0; dim]; k];
        let mut counts = vec![0usize; k];
        for (&label, p) in labels.iter().zip(points) {
            counts[label] += 1;
            for (s, x) in sums[label].iter_mut().zip(p) {
                *s += x;
            }
        }

        for c in 0..k {
            if counts[c] > 0 {
                centroids[c] = sums[c].iter().map(|s| s / counts[c] as f64).collect();
            }
        }

        // Empty cluster: take over the point farthest from its own centroid.
        // Points already sitting on their centroid are never moved.
        for c in 0..k {
            if counts[c] > 0 {
                continue;
            }
            let farthest = (0..n)
                .map(|i| (i, squared_distance(&points[i], &centroids[labels[i]])))
                .filter(|&(_, d)| d > 0.0)
                .max_by(|a, b| a.1.total_cmp(&b.1));
            let Some((farthest, _)) = farthest else {
                continue;
            };

            let donor = labels[farthest];
            counts[donor] -= 1;
            for (s, x) in sums[donor].iter_mut().zip(&points[farthest]) {
                *s -= x;
            }
            centroids[donor] = sums[donor].iter().map(|s| s / counts[donor] as f64).collect();

            counts[c] = 1;
            sums[c] = points[farthest].clone();
            centroids[c] = points[farthest].clone();
            labels[farthest] = c;
        }
    }

    let inertia = labels
        .iter()
        .zip(points)
        .map(|(&label, p)| squared_distance(p, &centroids[label]))
        .sum();

    KMeansFit {
        labels,
        centroids,
        inertia,
        iterations,
    }
}

/// Renumber labels so cluster 0 holds the first point, the next new cluster is 1, and so on.
fn relabel_by_first_appearance(fit: KMeansFit, k: usize) -> KMeansFit {
    let mut mapping = vec![usize::MAX; k];
    let mut next = 0;
    for &label in &fit.labels {
        if mapping[label] == usize::MAX {
            mapping[label] = next;
            next += 1;
        }
    }
    // Clusters that ended up empty keep trailing numbers
    for slot in mapping.iter_mut().filter(|m| **m == usize::MAX) {
        *slot = next;
        next += 1;
    }

    let mut centroids = vec![Vec::new(); k];
    for (old, centroid) in fit.centroids.into_iter().enumerate() {
        centroids[mapping[old]] = centroid;
    }

    KMeansFit {
        labels: fit.labels.iter().map(|&l| mapping[l]).collect(),
        centroids,
        inertia: fit.inertia,
        iterations: fit.iterations,
    }
}

fn nearest_centroid(point: &[f64], centroids: &[Vec<f64>]) -> usize {
    centroids
        .iter()
        .enumerate()
        .map(|(i, c)| (i, squared_distance(point, c)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map_or(0, |(i, _)| i)
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![0.0, 0.1],
            vec![10.0, 10.0],
            vec![10.1, 10.0],
            vec![-10.0, 10.0],
            vec![-10.0, 10.1],
        ]
    }

    #[test]
    fn separates_obvious_blobs() {
        let fit = fit(&blobs(), 3, 0, 10, 300);
        assert_eq!(fit.labels, vec![0, 0, 0, 1, 1, 2, 2]);
        assert!(fit.inertia < 0.1);
    }

    #[test]
    fn same_seed_same_result() {
        let points: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![(i * 7 % 11) as f64, (i * 3 % 5) as f64])
            .collect();
        let a = fit(&points, 4, 42, 3, 300);
        let b = fit(&points, 4, 42, 3, 300);
        assert_eq!(a, b);
    }

    #[test]
    fn single_cluster_is_the_mean() {
        let points = vec![vec![0.0], vec![2.0], vec![4.0]];
        let fit = fit(&points, 1, 7, 1, 10);
        assert_eq!(fit.labels, vec![0, 0, 0]);
        assert!((fit.centroids[0][0] - 2.0).abs() < 1e-12);
        assert!((fit.inertia - 8.0).abs() < 1e-12);
    }

    #[test]
    fn k_equal_to_points_isolates_each() {
        let points = vec![vec![0.0], vec![5.0], vec![9.0]];
        let fit = fit(&points, 3, 1, 2, 50);
        assert_eq!(fit.labels, vec![0, 1, 2]);
        assert_eq!(fit.inertia, 0.0);
    }

    #[test]
    fn fewer_distinct_points_than_clusters_converges() {
        let points = vec![vec![0.0], vec![0.0], vec![5.0], vec![5.0]];
        let max_iterations = 300;
        for seed in 0..8 {
            let fit = fit(&points, 3, seed, 5, max_iterations);
            assert!(fit.iterations < max_iterations, "seed {seed} ran {} iterations", fit.iterations);
            assert_eq!(fit.labels[0], fit.labels[1]);
            assert_eq!(fit.labels[2], fit.labels[3]);
            assert_ne!(fit.labels[0], fit.labels[2]);
            assert_eq!(fit.inertia, 0.0);
        }
    }

    #[test]
    fn empty_cluster_takes_farthest_point_and_donor_recenters() {
        // Two starting centroids share a spot, so one starts out empty
        let points = vec![vec![0.0], vec![1.0], vec![10.0]];
        let fit = lloyd(&points, vec![vec![0.5], vec![0.5], vec![10.0]], 100);
        let mut labels = fit.labels.clone();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), 3);
        assert_eq!(fit.inertia, 0.0);
        assert!(fit.iterations < 100);
    }

    #[test]
    fn plus_plus_never_picks_duplicate_centroids_when_avoidable() {
        let points = vec![vec![1.0], vec![1.0], vec![1.0], vec![4.0]];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let centroids = plus_plus_init(&points, 2, &mut rng);
        assert_ne!(centroids[0], centroids[1]);
    }
}
