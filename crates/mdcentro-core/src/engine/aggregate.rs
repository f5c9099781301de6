use crate::core::models::trajectory::{Trajectory, TrajectoryError};
use crate::engine::error::EngineError;
use tracing::debug;

/// Replicates joined into one frame sequence, with per-frame provenance.
#[derive(Debug, Clone)]
pub struct AggregatedTrajectory {
    pub trajectory: Trajectory,
    /// Index of each frame within its own replicate.
    pub time_labels: Vec<usize>,
    /// Replicate each frame came from, in input order.
    pub replicate_indices: Vec<usize>,
}

impl AggregatedTrajectory {
    pub fn n_frames(&self) -> usize {
        self.trajectory.n_frames()
    }

    /// `(replicate, frame within replicate)` of an aggregated frame.
    pub fn provenance(&self, frame: usize) -> Option<(usize, usize)> {
        Some((
            *self.replicate_indices.get(frame)?,
            *self.time_labels.get(frame)?,
        ))
    }
}

/// Concatenates replicates in order.
///
/// Replicates without frames contribute nothing but keep their position, so
/// `replicate_indices` always refer to the input order. Returns `Ok(None)`
/// when there is nothing to aggregate, either because no replicates were
/// given or because all of them are empty.
pub fn aggregate(replicates: Vec<Trajectory>) -> Result<Option<AggregatedTrajectory>, EngineError> {
    let total: usize = replicates.iter().map(Trajectory::n_frames).sum();
    if total == 0 {
        return Ok(None);
    }

    let mut time_labels = Vec::with_capacity(total);
    let mut replicate_indices = Vec::with_capacity(total);
    let mut joined: Option<Trajectory> = None;

    for (replicate, trajectory) in replicates.into_iter().enumerate() {
        let n = trajectory.n_frames();
        if n == 0 {
            continue;
        }
        time_labels.extend(0..n);
        replicate_indices.extend(std::iter::repeat_n(replicate, n));

        match joined.as_mut() {
            None => joined = Some(trajectory),
            Some(acc) => acc.append(trajectory).map_err(|e| match e {
                TrajectoryError::IncompatibleTopology { left, right } => {
                    EngineError::TopologyMismatch {
                        message: format!(
                            "replicate {} has {} atoms but the first replicate has {}",
                            replicate, right, left
                        ),
                    }
                }
                other => other.into(),
            })?,
        }
    }

    let trajectory = joined.ok_or_else(|| {
        EngineError::Internal("frames counted but no replicate collected".to_string())
    })?;
    debug!(
        frames = trajectory.n_frames(),
        last_replicate = replicate_indices.last().copied(),
        "Replicates aggregated."
    );

    Ok(Some(AggregatedTrajectory {
        trajectory,
        time_labels,
        replicate_indices,
    }))
}
