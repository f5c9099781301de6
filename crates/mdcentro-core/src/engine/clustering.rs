use crate::engine::config::ClusteringConfig;
use crate::engine::error::EngineError;
use nalgebra::DMatrix;
use rand::{distributions::WeightedIndex, prelude::*};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument, trace};

/// Consecutive batches without improvement of the smoothed inertia before stopping.
const MAX_NO_IMPROVEMENT: usize = 10;

/// A fitted k-means model.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansModel {
    pub k: usize,
    pub centers: Vec<Vec<f64>>,
    /// Sum of squared distances of every point to its nearest center.
    pub inertia: f64,
    /// Nearest center of every input point.
    pub labels: Vec<usize>,
    /// Mini-batch updates performed before convergence or exhaustion.
    pub n_steps: usize,
}

/// Mini-batch k-means with k-means++ seeding and a deterministic RNG.
#[derive(Debug, Clone)]
pub struct MiniBatchKMeans {
    k: usize,
    seed: u64,
    batch_size: usize,
    max_iterations: usize,
}

impl MiniBatchKMeans {
    pub fn new(k: usize, config: &ClusteringConfig) -> Self {
        Self {
            k,
            seed: config.seed,
            batch_size: config.batch_size,
            max_iterations: config.max_iterations,
        }
    }

    #[instrument(level = "debug", skip_all, fields(k = self.k, n = points.len()))]
    pub fn fit(&self, points: &[Vec<f64>]) -> Result<KMeansModel, EngineError> {
        let n = points.len();
        if self.k == 0 || n < self.k {
            return Err(self.error(format!("cannot form {} cluster(s) from {} point(s)", self.k, n)));
        }
        if self.batch_size == 0 {
            return Err(self.error("batch size must be positive".to_string()));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut centers = self.init_centers(points, &mut rng)?;
        let mut counts = vec![0usize; self.k];

        let batch_size = self.batch_size.min(n);
        let n_steps_max = self
            .max_iterations
            .checked_mul(n)
            .ok_or_else(|| {
                self.error(format!(
                    "{} iterations over {} points exceed the step counter",
                    self.max_iterations, n
                ))
            })?
            .div_ceil(batch_size);
        let alpha = (2.0 * batch_size as f64 / (n as f64 + 1.0)).min(1.0);

        let mut ewa_inertia: Option<f64> = None;
        let mut best_inertia = f64::INFINITY;
        let mut no_improvement = 0;
        let mut n_steps = 0;

        for step in 0..n_steps_max {
            n_steps = step + 1;
            let mut batch_inertia = 0.0;
            for _ in 0..batch_size {
                let point = &points[rng.gen_range(0..n)];
                let (label, distance) = nearest_center(&centers, point);
                batch_inertia += distance;

                counts[label] += 1;
                let eta = 1.0 / counts[label] as f64;
                for (c, &x) in centers[label].iter_mut().zip(point.iter()) {
                    *c += eta * (x - *c);
                }
            }
            batch_inertia /= batch_size as f64;

            let smoothed = match ewa_inertia {
                None => batch_inertia,
                Some(previous) => previous * (1.0 - alpha) + batch_inertia * alpha,
            };
            ewa_inertia = Some(smoothed);
            trace!(step, batch_inertia, smoothed, "Mini-batch step.");

            if smoothed < best_inertia {
                best_inertia = smoothed;
                no_improvement = 0;
            } else {
                no_improvement += 1;
                if no_improvement >= MAX_NO_IMPROVEMENT {
                    debug!(step, "Converged: smoothed inertia stopped improving.");
                    break;
                }
            }
        }

        recenter(points, &mut centers);
        let (labels, inertia) = assign_all(points, &centers);

        Ok(KMeansModel {
            k: self.k,
            centers,
            inertia,
            labels,
            n_steps,
        })
    }

    /// k-means++ seeding. Falls back to uniform draws when every remaining
    /// point already coincides with a chosen center.
    fn init_centers(
        &self,
        points: &[Vec<f64>],
        rng: &mut impl Rng,
    ) -> Result<Vec<Vec<f64>>, EngineError> {
        let n = points.len();
        let mut centers = Vec::with_capacity(self.k);
        centers.push(points[rng.gen_range(0..n)].clone());

        while centers.len() < self.k {
            let weights: Vec<f64> = points
                .iter()
                .map(|p| nearest_center(&centers, p).1)
                .collect();
            let total: f64 = weights.iter().sum();

            let chosen = if total <= f64::EPSILON {
                rng.gen_range(0..n)
            } else {
                WeightedIndex::new(&weights)
                    .map_err(|e| self.error(format!("seeding failed: {}", e)))?
                    .sample(rng)
            };
            centers.push(points[chosen].clone());
        }
        Ok(centers)
    }

    fn error(&self, reason: String) -> EngineError {
        EngineError::Clustering { k: self.k, reason }
    }
}

#[inline]
fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Index of and squared distance to the closest center; ties go to the lower index.
fn nearest_center(centers: &[Vec<f64>], point: &[f64]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, center) in centers.iter().enumerate() {
        let d = squared_distance(center, point);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

fn assign_all(points: &[Vec<f64>], centers: &[Vec<f64>]) -> (Vec<usize>, f64) {
    let mut inertia = 0.0;
    let labels = points
        .iter()
        .map(|p| {
            let (label, d) = nearest_center(centers, p);
            inertia += d;
            label
        })
        .collect();
    (labels, inertia)
}

/// Moves each center to the mean of the points assigned to it. Empty clusters keep their center.
fn recenter(points: &[Vec<f64>], centers: &mut [Vec<f64>]) {
    let (labels, _) = assign_all(points, centers);
    let dim = centers.first().map_or(0, Vec::len);
    let mut sums = vec![vec![0.0; dim]; centers.len()];
    let mut counts = vec![0usize; centers.len()];

    for (point, &label) in points.iter().zip(labels.iter()) {
        counts[label] += 1;
        for (s, &x) in sums[label].iter_mut().zip(point.iter()) {
            *s += x;
        }
    }
    for ((center, sum), count) in centers.iter_mut().zip(sums).zip(counts) {
        if count > 0 {
            *center = sum.into_iter().map(|s| s / count as f64).collect();
        }
    }
}

/// Rows of a feature matrix as owned point vectors.
pub fn matrix_rows(data: &DMatrix<f64>) -> Vec<Vec<f64>> {
    data.row_iter()
        .map(|row| row.iter().copied().collect())
        .collect()
}

/// The one-cluster and two-cluster models fitted on the same data.
#[derive(Debug, Clone)]
pub struct ClusterAnalysis {
    pub single: KMeansModel,
    pub split: KMeansModel,
}

pub fn analyze(data: &DMatrix<f64>, config: &ClusteringConfig) -> Result<ClusterAnalysis, EngineError> {
    let points = matrix_rows(data);
    let single = MiniBatchKMeans::new(1, config).fit(&points)?;
    let split = MiniBatchKMeans::new(2, config).fit(&points)?;
    debug!(
        inertia_k1 = single.inertia,
        inertia_k2 = split.inertia,
        "Clustering complete."
    );
    Ok(ClusterAnalysis { single, split })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u64, batch_size: usize) -> ClusteringConfig {
        ClusteringConfig {
            seed,
            batch_size,
            max_iterations: 100,
        }
    }

    fn two_blobs() -> Vec<Vec<f64>> {
        let mut points = Vec::new();
        for i in 0..20 {
            let jitter = (i as f64 * 0.37).sin() * 0.2;
            points.push(vec![jitter, 1.0 + jitter]);
            points.push(vec![10.0 - jitter, 11.0 + jitter]);
        }
        points
    }

    fn mean(points: &[Vec<f64>]) -> Vec<f64> {
        let dim = points[0].len();
        (0..dim)
            .map(|d| points.iter().map(|p| p[d]).sum::<f64>() / points.len() as f64)
            .collect()
    }

    #[test]
    fn single_cluster_center_is_data_mean() {
        let points = two_blobs();
        let model = MiniBatchKMeans::new(1, &config(42, 8)).fit(&points).unwrap();
        let expected = mean(&points);
        for (c, e) in model.centers[0].iter().zip(expected.iter()) {
            assert!((c - e).abs() < 1e-9);
        }
        assert!(model.labels.iter().all(|&l| l == 0));
    }

    #[test]
    fn two_clusters_separate_the_blobs() {
        let points = two_blobs();
        let model = MiniBatchKMeans::new(2, &config(42, 8)).fit(&points).unwrap();
        for pair in model.labels.chunks(2) {
            assert_ne!(pair[0], pair[1]);
        }
        let single = MiniBatchKMeans::new(1, &config(42, 8)).fit(&points).unwrap();
        assert!(model.inertia < single.inertia / 10.0);
    }

    #[test]
    fn same_seed_reproduces_model() {
        let points = two_blobs();
        let a = MiniBatchKMeans::new(2, &config(7, 5)).fit(&points).unwrap();
        let b = MiniBatchKMeans::new(2, &config(7, 5)).fit(&points).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn single_inertia_never_below_split_inertia() {
        for seed in 0..5 {
            let points: Vec<Vec<f64>> = (0..15)
                .map(|i| vec![(i as f64 * 1.7).cos() * 3.0, (i as f64 * 0.9).sin()])
                .collect();
            let analysis = analyze(
                &DMatrix::from_fn(15, 2, |r, c| points[r][c]),
                &config(seed, 4),
            )
            .unwrap();
            assert!(analysis.single.inertia >= analysis.split.inertia);
        }
    }

    #[test]
    fn oversized_iteration_budget_is_an_error_not_an_overflow() {
        let config = ClusteringConfig {
            seed: 1,
            batch_size: 4,
            max_iterations: usize::MAX,
        };
        let err = MiniBatchKMeans::new(2, &config).fit(&two_blobs()).unwrap_err();
        assert!(matches!(err, EngineError::Clustering { k: 2, .. }));
    }

    #[test]
    fn identical_points_give_zero_inertia() {
        let points = vec![vec![1.0, 2.0, 3.0]; 6];
        let model = MiniBatchKMeans::new(2, &config(42, 5000)).fit(&points).unwrap();
        assert_eq!(model.inertia, 0.0);
    }

    #[test]
    fn fit_rejects_fewer_points_than_clusters() {
        let err = MiniBatchKMeans::new(2, &config(42, 10))
            .fit(&[vec![0.0]])
            .unwrap_err();
        assert!(matches!(err, EngineError::Clustering { k: 2, .. }));
    }

    #[test]
    fn nearest_center_prefers_lower_index_on_tie() {
        let centers = vec![vec![-1.0], vec![1.0]];
        assert_eq!(nearest_center(&centers, &[0.0]), (0, 1.0));
    }
}
