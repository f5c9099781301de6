use super::topology::Topology;
use nalgebra::Point3;
use thiserror::Error;

/// Coordinates of every atom of a topology at one instant, in Angstroms.
pub type Frame = Vec<Point3<f64>>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrajectoryError {
    #[error("Frame {frame} has {found} atoms but the topology has {expected}")]
    FrameSize {
        frame: usize,
        expected: usize,
        found: usize,
    },
    #[error("Atom index {index} is out of range for a topology of {len} atoms")]
    AtomIndexOutOfRange { index: usize, len: usize },
    #[error("Cannot join trajectories with {left} and {right} atoms")]
    IncompatibleTopology { left: usize, right: usize },
}

/// An ordered sequence of conformations sharing one topology.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    topology: Topology,
    frames: Vec<Frame>,
}

impl Trajectory {
    /// Creates a trajectory, checking every frame against the topology size.
    pub fn new(topology: Topology, frames: Vec<Frame>) -> Result<Self, TrajectoryError> {
        let expected = topology.len();
        if let Some((frame, f)) = frames.iter().enumerate().find(|(_, f)| f.len() != expected) {
            return Err(TrajectoryError::FrameSize {
                frame,
                expected,
                found: f.len(),
            });
        }
        Ok(Self { topology, frames })
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut [Frame] {
        &mut self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn n_atoms(&self) -> usize {
        self.topology.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Returns a new trajectory restricted to the given atoms, in the given order.
    pub fn atom_slice(&self, indices: &[usize]) -> Result<Trajectory, TrajectoryError> {
        let len = self.topology.len();
        let topology = self
            .topology
            .subset(indices)
            .map_err(|index| TrajectoryError::AtomIndexOutOfRange { index, len })?;
        let frames = self
            .frames
            .iter()
            .map(|f| indices.iter().map(|&i| f[i]).collect())
            .collect();
        Ok(Trajectory { topology, frames })
    }

    /// Restricts this trajectory to the given atoms in place.
    pub fn retain_atoms(&mut self, indices: &[usize]) -> Result<(), TrajectoryError> {
        *self = self.atom_slice(indices)?;
        Ok(())
    }

    /// Copies one frame out as a single-frame trajectory.
    pub fn extract_frame(&self, index: usize) -> Option<Trajectory> {
        self.frames.get(index).map(|f| Trajectory {
            topology: self.topology.clone(),
            frames: vec![f.clone()],
        })
    }

    /// Appends the frames of `other`, which must have the same atom count.
    pub fn append(&mut self, other: Trajectory) -> Result<(), TrajectoryError> {
        if other.n_atoms() != self.n_atoms() {
            return Err(TrajectoryError::IncompatibleTopology {
                left: self.n_atoms(),
                right: other.n_atoms(),
            });
        }
        self.frames.extend(other.frames);
        Ok(())
    }

    /// Gathers the coordinates of the given atoms from one frame.
    pub fn coordinates_of(&self, frame: usize, indices: &[usize]) -> Option<Vec<Point3<f64>>> {
        let f = self.frames.get(frame)?;
        indices.iter().map(|&i| f.get(i).copied()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;

    fn topology(n: usize) -> Topology {
        Topology::new(
            (0..n)
                .map(|i| Atom::new(i + 1, "CA", "GLY", i as isize + 1, 'A'))
                .collect(),
        )
    }

    fn frame(n: usize, offset: f64) -> Frame {
        (0..n)
            .map(|i| Point3::new(i as f64 + offset, 0.0, 0.0))
            .collect()
    }

    #[test]
    fn new_rejects_frames_of_wrong_size() {
        let err = Trajectory::new(topology(3), vec![frame(3, 0.0), frame(2, 0.0)]).unwrap_err();
        assert_eq!(
            err,
            TrajectoryError::FrameSize {
                frame: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn atom_slice_selects_coordinates_and_topology() {
        let traj = Trajectory::new(topology(4), vec![frame(4, 0.0), frame(4, 10.0)]).unwrap();
        let sliced = traj.atom_slice(&[3, 0]).unwrap();
        assert_eq!(sliced.n_atoms(), 2);
        assert_eq!(sliced.n_frames(), 2);
        assert_eq!(sliced.frame(1).unwrap()[0], Point3::new(13.0, 0.0, 0.0));
        assert_eq!(sliced.topology().atom(1).unwrap().serial, 1);
    }

    #[test]
    fn atom_slice_rejects_out_of_range_index() {
        let traj = Trajectory::new(topology(2), vec![frame(2, 0.0)]).unwrap();
        assert_eq!(
            traj.atom_slice(&[5]).unwrap_err(),
            TrajectoryError::AtomIndexOutOfRange { index: 5, len: 2 }
        );
    }

    #[test]
    fn append_concatenates_frames_in_order() {
        let mut a = Trajectory::new(topology(2), vec![frame(2, 0.0)]).unwrap();
        let b = Trajectory::new(topology(2), vec![frame(2, 1.0), frame(2, 2.0)]).unwrap();
        a.append(b).unwrap();
        assert_eq!(a.n_frames(), 3);
        assert_eq!(a.frame(2).unwrap()[0].x, 2.0);
    }

    #[test]
    fn append_rejects_different_atom_counts() {
        let mut a = Trajectory::new(topology(2), vec![frame(2, 0.0)]).unwrap();
        let b = Trajectory::new(topology(3), vec![frame(3, 0.0)]).unwrap();
        assert!(matches!(
            a.append(b),
            Err(TrajectoryError::IncompatibleTopology { left: 2, right: 3 })
        ));
    }

    #[test]
    fn extract_frame_returns_single_frame_copy() {
        let traj = Trajectory::new(topology(2), vec![frame(2, 0.0), frame(2, 5.0)]).unwrap();
        let single = traj.extract_frame(1).unwrap();
        assert_eq!(single.n_frames(), 1);
        assert_eq!(single.frame(0).unwrap()[1].x, 6.0);
        assert!(traj.extract_frame(2).is_none());
    }

    #[test]
    fn coordinates_of_gathers_selected_atoms() {
        let traj = Trajectory::new(topology(3), vec![frame(3, 0.0)]).unwrap();
        let coords = traj.coordinates_of(0, &[2, 1]).unwrap();
        assert_eq!(coords, vec![Point3::new(2.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)]);
        assert!(traj.coordinates_of(0, &[7]).is_none());
        assert!(traj.coordinates_of(1, &[0]).is_none());
    }
}
