use crate::core::models::trajectory::Trajectory;
use crate::engine::config::FeatureConfig;
use crate::engine::error::EngineError;
use nalgebra::{DMatrix, DVector, SymmetricEigen};
use tracing::debug;

const EIGEN_EPSILON: f64 = f64::EPSILON;
// Zero lets the eigensolver iterate until convergence.
const EIGEN_MAX_ITERATIONS: usize = 0;

/// Flattens the selected atoms of every frame into one row of `3 * atoms` values.
pub fn flatten_coordinates(
    trajectory: &Trajectory,
    atom_indices: &[usize],
) -> Result<DMatrix<f64>, EngineError> {
    let n_atoms = trajectory.n_atoms();
    if let Some(&index) = atom_indices.iter().find(|&&i| i >= n_atoms) {
        return Err(EngineError::TopologyMismatch {
            message: format!(
                "feature atom index {} is outside a topology of {} atoms",
                index, n_atoms
            ),
        });
    }

    let frames = trajectory.frames();
    Ok(DMatrix::from_fn(
        frames.len(),
        atom_indices.len() * 3,
        |row, col| frames[row][atom_indices[col / 3]][col % 3],
    ))
}

/// Principal-component projection of a data matrix.
#[derive(Debug, Clone)]
pub struct Pca {
    /// Column means subtracted before decomposition.
    pub mean: DVector<f64>,
    /// Singular values of the centered data, descending.
    pub singular_values: Vec<f64>,
    /// Frame scores, one column per component.
    pub scores: DMatrix<f64>,
    /// Sum of squared deviations from the mean over all features.
    pub total_variance: f64,
}

impl Pca {
    /// Fits `n_components` components on `data` (rows are samples).
    ///
    /// The eigenproblem is solved on whichever of the Gram matrix or the
    /// covariance matrix is smaller. Each score column is oriented so that its
    /// entry of largest magnitude is positive.
    pub fn fit(data: &DMatrix<f64>, n_components: usize) -> Result<Self, EngineError> {
        let (n_samples, n_features) = data.shape();
        if n_components == 0 || n_components > n_samples.min(n_features) {
            return Err(EngineError::DegenerateDimensionality {
                requested: n_components,
                frames: n_samples,
                features: n_features,
            });
        }

        let mean_row = data.row_mean();
        let mut centered = data.clone();
        for mut row in centered.row_iter_mut() {
            row -= &mean_row;
        }
        let mean = mean_row.transpose();
        let total_variance = centered.norm_squared();

        let scores;
        let singular_values;
        if n_samples <= n_features {
            let gram = &centered * centered.transpose();
            let (values, vectors) = sorted_eigen(gram, n_components)?;
            singular_values = values.iter().map(|v| v.max(0.0).sqrt()).collect::<Vec<_>>();
            let mut s = DMatrix::zeros(n_samples, n_components);
            for (j, sigma) in singular_values.iter().enumerate() {
                s.set_column(j, &(vectors.column(j) * *sigma));
            }
            scores = s;
        } else {
            let covariance = centered.tr_mul(&centered);
            let (values, vectors) = sorted_eigen(covariance, n_components)?;
            singular_values = values.iter().map(|v| v.max(0.0).sqrt()).collect::<Vec<_>>();
            scores = &centered * vectors;
        }

        let mut pca = Self {
            mean,
            singular_values,
            scores,
            total_variance,
        };
        pca.orient_components();
        Ok(pca)
    }

    pub fn n_components(&self) -> usize {
        self.scores.ncols()
    }

    /// Fraction of total variance carried by each kept component.
    pub fn explained_variance_ratio(&self) -> Vec<f64> {
        if self.total_variance <= 0.0 {
            return vec![0.0; self.singular_values.len()];
        }
        self.singular_values
            .iter()
            .map(|s| s * s / self.total_variance)
            .collect()
    }

    fn orient_components(&mut self) {
        for mut column in self.scores.column_iter_mut() {
            let mut pivot = 0.0_f64;
            for &value in column.iter() {
                if value.abs() > pivot.abs() {
                    pivot = value;
                }
            }
            if pivot < 0.0 {
                column.neg_mut();
            }
        }
    }
}

/// Top `k` eigenpairs of a symmetric matrix, eigenvalues descending.
fn sorted_eigen(matrix: DMatrix<f64>, k: usize) -> Result<(Vec<f64>, DMatrix<f64>), EngineError> {
    let n = matrix.nrows();
    let eigen = SymmetricEigen::try_new(matrix, EIGEN_EPSILON, EIGEN_MAX_ITERATIONS).ok_or_else(
        || EngineError::Decomposition("symmetric eigensolver did not converge".to_string()),
    )?;

    let mut order: Vec<usize> = (0..eigen.eigenvalues.len()).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

    let values = order.iter().take(k).map(|&i| eigen.eigenvalues[i]).collect();
    let mut vectors = DMatrix::zeros(n, k);
    for (j, &i) in order.iter().take(k).enumerate() {
        vectors.set_column(j, &eigen.eigenvectors.column(i));
    }
    Ok((values, vectors))
}

/// The two independent reductions computed for one system.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub plot: Pca,
    pub cluster: Pca,
}

/// Flattens the fitting atoms and fits both reductions on this data alone.
pub fn extract(
    trajectory: &Trajectory,
    atom_indices: &[usize],
    config: &FeatureConfig,
) -> Result<FeatureSet, EngineError> {
    let data = flatten_coordinates(trajectory, atom_indices)?;
    debug!(
        frames = data.nrows(),
        features = data.ncols(),
        "Feature matrix assembled."
    );

    let plot = Pca::fit(&data, config.plot_components)?;
    let cluster = Pca::fit(&data, config.cluster_components)?;
    debug!(
        plot_variance = plot.explained_variance_ratio().iter().sum::<f64>(),
        cluster_variance = cluster.explained_variance_ratio().iter().sum::<f64>(),
        "Explained variance of both reductions."
    );
    Ok(FeatureSet { plot, cluster })
}
