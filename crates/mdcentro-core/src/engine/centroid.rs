use crate::core::models::trajectory::Trajectory;
use crate::core::utils::geometry;
use crate::engine::error::EngineError;
use nalgebra::{DMatrix, Point3};
use rayon::prelude::*;
use tracing::debug;

/// The frame chosen to represent an ensemble and its spread around it.
#[derive(Debug, Clone, PartialEq)]
pub struct CentroidSelection {
    pub frame_index: usize,
    /// Euclidean distance of the frame's feature vector to the cluster center.
    pub distance: f64,
    /// Largest backbone RMSD of any frame to the selected frame, in Angstroms.
    pub max_rmsd: f64,
    pub rmsd_per_frame: Vec<f64>,
}

/// Row of `features` closest to `center`; on ties the first such row wins.
pub fn nearest_frame(features: &DMatrix<f64>, center: &[f64]) -> Option<(usize, f64)> {
    if center.len() != features.ncols() {
        return None;
    }
    let mut best: Option<(usize, f64)> = None;
    for (i, row) in features.row_iter().enumerate() {
        let d2: f64 = row
            .iter()
            .zip(center.iter())
            .map(|(x, c)| (x - c) * (x - c))
            .sum();
        if best.is_none_or(|(_, b)| d2 < b) {
            best = Some((i, d2));
        }
    }
    best.map(|(i, d2)| (i, d2.sqrt()))
}

/// Selects the frame nearest `center` and measures every frame's fitted RMSD to it.
pub fn select(
    trajectory: &Trajectory,
    atom_indices: &[usize],
    features: &DMatrix<f64>,
    center: &[f64],
) -> Result<CentroidSelection, EngineError> {
    if features.nrows() != trajectory.n_frames() {
        return Err(EngineError::Internal(format!(
            "{} feature rows for {} frames",
            features.nrows(),
            trajectory.n_frames()
        )));
    }
    let (frame_index, distance) = nearest_frame(features, center).ok_or_else(|| {
        EngineError::Internal("no frame available for centroid selection".to_string())
    })?;

    let backbone = |frame: usize| -> Result<Vec<Point3<f64>>, EngineError> {
        trajectory
            .coordinates_of(frame, atom_indices)
            .ok_or_else(|| EngineError::TopologyMismatch {
                message: format!("backbone selection out of range in frame {}", frame),
            })
    };
    let target = backbone(frame_index)?;

    let rmsd_per_frame = (0..trajectory.n_frames())
        .into_par_iter()
        .map(|i| -> Result<f64, EngineError> {
            Ok(geometry::superposed_rmsd(&backbone(i)?, &target)?)
        })
        .collect::<Result<Vec<f64>, EngineError>>()?;
    let max_rmsd = rmsd_per_frame.iter().copied().fold(0.0, f64::max);

    debug!(frame_index, distance, max_rmsd, "Centroid frame selected.");
    Ok(CentroidSelection {
        frame_index,
        distance,
        max_rmsd,
        rmsd_per_frame,
    })
}
