use thiserror::Error;

use crate::core::models::trajectory::TrajectoryError;
use crate::core::utils::geometry::GeometryError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("Topology mismatch with the reference structure: {message}")]
    TopologyMismatch { message: String },

    #[error(
        "Cannot extract {requested} principal components from {frames} frame(s) with {features} feature(s)"
    )]
    DegenerateDimensionality {
        requested: usize,
        frames: usize,
        features: usize,
    },

    #[error("Superposition failed: {source}")]
    Geometry {
        #[from]
        source: GeometryError,
    },

    #[error("Trajectory error: {source}")]
    Trajectory {
        #[from]
        source: TrajectoryError,
    },

    #[error("Principal component analysis failed: {0}")]
    Decomposition(String),

    #[error("Clustering with k={k} failed: {reason}")]
    Clustering { k: usize, reason: String },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
