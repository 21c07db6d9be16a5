//! Principal component analysis over a dense senator-by-vote matrix.
//!
//! Scores are computed from the eigendecomposition of the centered Gram
//! matrix `Xc·Xcᵀ` (senators × senators), which stays small no matter how
//! many votes a session has. Component `k` has score vector `u_k·sqrt(λ_k)`,
//! identical to the left singular vectors scaled by singular values.

/// Sweeps of the cyclic Jacobi solver before giving up on convergence.
const MAX_SWEEPS: usize = 100;

/// Projection of every row onto all principal components.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// One score vector per input row, strongest component first.
    pub scores: Vec<Vec<f64>>,
    /// Variance captured by each component (sample variance, `n - 1` denominator).
    pub explained_variance: Vec<f64>,
    /// Share of total variance per component; all zero if the data has no variance.
    pub explained_variance_ratio: Vec<f64>,
}

/// Project `rows` onto `min(rows, columns)` principal components.
///
/// Each component's sign is chosen so its largest-magnitude score is positive.
/// Expects at least two rows of equal, non-zero length.
pub fn project(rows: &[Vec<f64>]) -> Projection {
    let n = rows.len();
    let p = rows.first().map_or(0, Vec::len);
    let components = n.min(p);
    let dof = n.saturating_sub(1).max(1) as f64;

    let centered = center_columns(rows);

    let mut gram = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in i..n {
            let dot: f64 = centered[i].iter().zip(&centered[j]).map(|(a, b)| a * b).sum();
            gram[i][j] = dot;
            gram[j][i] = dot;
        }
    }
    let total_variance = (0..n).map(|i| gram[i][i]).sum::<f64>() / dof;

    let (values, vectors) = symmetric_eigen(gram);
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));

    let mut scores = vec![Vec::with_capacity(components); n];
    let mut explained_variance = Vec::with_capacity(components);

    for &c in order.iter().take(components) {
        let lambda = values[c].max(0.0);
        let scale = lambda.sqrt();
        let mut column: Vec<f64> = (0..n).map(|i| vectors[i][c] * scale).collect();

        let pivot = column
            .iter()
            .copied()
            .max_by(|a, b| a.abs().total_cmp(&b.abs()))
            .unwrap_or(0.0);
        if pivot < 0.0 {
            column.iter_mut().for_each(|s| *s = -*s);
        }

        for (row, score) in scores.iter_mut().zip(column) {
            row.push(score);
        }
        explained_variance.push(lambda / dof);
    }

    let explained_variance_ratio = explained_variance
        .iter()
        .map(|v| if total_variance > 0.0 { v / total_variance } else { 0.0 })
        .collect();

    Projection {
        scores,
        explained_variance,
        explained_variance_ratio,
    }
}

fn center_columns(rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = rows.len() as f64;
    let p = rows.first().map_or(0, Vec::len);
    let means: Vec<f64> = (0..p)
        .map(|j| rows.iter().map(|r| r[j]).sum::<f64>() / n)
        .collect();

    rows.iter()
        .map(|r| r.iter().zip(&means).map(|(x, m)| x - m).collect())
        .collect()
}

/// Cyclic Jacobi eigendecomposition of a symmetric matrix.
///
/// Returns eigenvalues and a matrix whose column `k` is the eigenvector for value `k`.
fn symmetric_eigen(mut a: Vec<Vec<f64>>) -> (Vec<f64>, Vec<Vec<f64>>) {
    let n = a.len();
    let mut v: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    let scale: f64 = a.iter().flatten().map(|x| x * x).sum();
    let tolerance = (f64::EPSILON * f64::EPSILON * scale).max(f64::MIN_POSITIVE);

    for _ in 0..MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|p| ((p + 1)..n).map(move |q| (p, q)))
            .map(|(p, q)| a[p][q] * a[p][q])
            .sum();
        if off <= tolerance {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[p][q];
                if apq == 0.0 {
                    continue;
                }
                let theta = (a[q][q] - a[p][p]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let (akp, akq) = (a[k][p], a[k][q]);
                    a[k][p] = c * akp - s * akq;
                    a[k][q] = s * akp + c * akq;
                }
                for k in 0..n {
                    let (apk, aqk) = (a[p][k], a[q][k]);
                    a[p][k] = c * apk - s * aqk;
                    a[q][k] = s * apk + c * aqk;
                }
                for row in v.iter_mut() {
                    let (vkp, vkq) = (row[p], row[q]);
                    row[p] = c * vkp - s * vkq;
                    row[q] = s * vkp + c * vkq;
                }
            }
        }
    }

    let values = (0..n).map(|i| a[i][i]).collect();
    (values, v)
}
