use crate::core::models::trajectory::Trajectory;
use crate::core::utils::geometry;
use crate::engine::error::EngineError;
use nalgebra::Point3;
use rayon::prelude::*;
use tracing::{debug, instrument};

/// Superposes trajectories onto a fixed reference conformation.
///
/// The backbone selection of the reference defines the fitting atoms. The
/// same indices are looked up in every solvent-stripped trajectory, so the two
/// topologies must agree on those sites.
#[derive(Debug, Clone)]
pub struct Aligner {
    reference: Trajectory,
    atom_indices: Vec<usize>,
    reference_coords: Vec<Point3<f64>>,
}

impl Aligner {
    /// Builds an aligner from the first frame of `reference` and its backbone atoms.
    pub fn new(reference: &Trajectory) -> Result<Self, EngineError> {
        let atom_indices = reference.topology().backbone_indices();
        Self::with_indices(reference, atom_indices)
    }

    pub fn with_indices(
        reference: &Trajectory,
        atom_indices: Vec<usize>,
    ) -> Result<Self, EngineError> {
        if atom_indices.is_empty() {
            return Err(EngineError::Initialization(
                "reference structure contains no backbone atoms".to_string(),
            ));
        }
        let reference = reference.extract_frame(0).ok_or_else(|| {
            EngineError::Initialization("reference structure has no coordinates".to_string())
        })?;
        let reference_coords = reference.coordinates_of(0, &atom_indices).ok_or_else(|| {
            EngineError::Initialization(
                "backbone index outside of the reference structure".to_string(),
            )
        })?;

        debug!(
            n_atoms = atom_indices.len(),
            "Aligner initialized on reference backbone."
        );
        Ok(Self {
            reference,
            atom_indices,
            reference_coords,
        })
    }

    pub fn atom_indices(&self) -> &[usize] {
        &self.atom_indices
    }

    /// Removes every solvent atom from the trajectory.
    pub fn strip_solvent(trajectory: &mut Trajectory) -> Result<(), EngineError> {
        let keep = trajectory.topology().non_solvent_indices();
        if keep.len() != trajectory.n_atoms() {
            debug!(
                removed = trajectory.n_atoms() - keep.len(),
                "Stripping solvent atoms."
            );
            trajectory.retain_atoms(&keep)?;
        }
        Ok(())
    }

    /// Checks that every fitting site of the reference exists with the same identity.
    pub fn check_topology(&self, trajectory: &Trajectory) -> Result<(), EngineError> {
        let reference = self.reference.topology();
        let mobile = trajectory.topology();
        for &index in &self.atom_indices {
            let expected = reference.atom(index).ok_or_else(|| {
                EngineError::Internal(format!("reference lost backbone atom {}", index))
            })?;
            let found = mobile.atom(index).ok_or_else(|| EngineError::TopologyMismatch {
                message: format!(
                    "trajectory has {} atoms after solvent removal but backbone atom index {} is required",
                    mobile.len(),
                    index
                ),
            })?;
            if !expected.same_identity(found) {
                return Err(EngineError::TopologyMismatch {
                    message: format!(
                        "atom {} is {} {} in the reference but {} {} in the trajectory",
                        index, expected.residue_name, expected.name, found.residue_name, found.name
                    ),
                });
            }
        }
        Ok(())
    }

    /// Superposes every frame in place onto the reference backbone.
    pub fn superpose(&self, trajectory: &mut Trajectory) -> Result<(), EngineError> {
        self.check_topology(trajectory)?;
        let indices = &self.atom_indices;
        let target = &self.reference_coords;

        trajectory
            .frames_mut()
            .par_iter_mut()
            .try_for_each(|frame| -> Result<(), EngineError> {
                let mobile: Vec<Point3<f64>> = indices.iter().map(|&i| frame[i]).collect();
                let transform = geometry::superposition(&mobile, target)?;
                transform.apply_all(frame);
                Ok(())
            })
    }

    /// Strips solvent, then superposes.
    #[instrument(level = "debug", skip_all, fields(frames = trajectory.n_frames()))]
    pub fn prepare(&self, trajectory: &mut Trajectory) -> Result<(), EngineError> {
        Self::strip_solvent(trajectory)?;
        self.superpose(trajectory)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::topology::Topology;
    use crate::core::utils::geometry::calculate_rmsd;
    use nalgebra::{Rotation3, Vector3};

    /// Two glycine residues (8 backbone atoms) followed by one water.
    pub(crate) fn peptide_atoms(with_water: bool) -> Vec<Atom> {
        let mut atoms = Vec::new();
        let mut serial = 1;
        for res in 1..=2 {
            for name in ["N", "CA", "C", "O"] {
                atoms.push(Atom::new(serial, name, "GLY", res, 'A'));
                serial += 1;
            }
        }
        if with_water {
            atoms.push(Atom::new(serial, "O", "HOH", 3, 'W'));
        }
        atoms
    }

    pub(crate) fn peptide_coords() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.46, 0.0, 0.0),
            Point3::new(2.0, 1.4, 0.0),
            Point3::new(1.3, 2.4, 0.2),
            Point3::new(3.3, 1.5, -0.3),
            Point3::new(4.0, 2.8, -0.4),
            Point3::new(5.5, 2.6, -0.1),
            Point3::new(6.1, 1.6, 0.4),
        ]
    }

    pub(crate) fn reference() -> Trajectory {
        Trajectory::new(Topology::new(peptide_atoms(false)), vec![peptide_coords()]).unwrap()
    }

    fn moved_trajectory(n_frames: usize) -> Trajectory {
        let frames = (0..n_frames)
            .map(|i| {
                let rotation = Rotation3::from_euler_angles(0.1 * i as f64, 0.7, -0.2);
                let shift = Vector3::new(i as f64, -3.0, 8.0);
                let mut frame: Vec<_> = peptide_coords()
                    .iter()
                    .map(|p| rotation * p + shift)
                    .collect();
                frame.push(Point3::new(50.0, 50.0, 50.0));
                frame
            })
            .collect();
        Trajectory::new(Topology::new(peptide_atoms(true)), frames).unwrap()
    }

    #[test]
    fn new_rejects_reference_without_backbone() {
        let reference = Trajectory::new(
            Topology::new(vec![Atom::new(1, "C1", "LIG", 1, 'A')]),
            vec![vec![Point3::origin()]],
        )
        .unwrap();
        assert!(matches!(
            Aligner::new(&reference),
            Err(EngineError::Initialization(_))
        ));
    }

    #[test]
    fn new_rejects_reference_without_frames() {
        let reference = Trajectory::new(Topology::new(peptide_atoms(false)), vec![]).unwrap();
        assert!(Aligner::new(&reference).is_err());
    }

    #[test]
    fn strip_solvent_removes_water_atoms() {
        let mut traj = moved_trajectory(2);
        Aligner::strip_solvent(&mut traj).unwrap();
        assert_eq!(traj.n_atoms(), 8);
        assert!(traj.topology().atoms().iter().all(|a| a.residue_name != "HOH"));
    }

    #[test]
    fn prepare_superposes_every_frame_onto_reference() {
        let aligner = Aligner::new(&reference()).unwrap();
        let mut traj = moved_trajectory(4);
        aligner.prepare(&mut traj).unwrap();

        for frame in traj.frames() {
            let rmsd = calculate_rmsd(frame, &peptide_coords()).unwrap();
            assert!(rmsd < 1e-8, "frame not superposed, rmsd = {rmsd}");
        }
    }

    #[test]
    fn superpose_rejects_trajectory_missing_backbone_sites() {
        let aligner = Aligner::new(&reference()).unwrap();
        let atoms: Vec<_> = peptide_atoms(false).into_iter().take(5).collect();
        let frame = peptide_coords().into_iter().take(5).collect();
        let mut traj = Trajectory::new(Topology::new(atoms), vec![frame]).unwrap();

        assert!(matches!(
            aligner.superpose(&mut traj),
            Err(EngineError::TopologyMismatch { .. })
        ));
    }

    #[test]
    fn superpose_rejects_renamed_atom() {
        let aligner = Aligner::new(&reference()).unwrap();
        let mut atoms = peptide_atoms(false);
        atoms[1] = Atom::new(2, "CA", "ALA", 1, 'A');
        let mut traj = Trajectory::new(Topology::new(atoms), vec![peptide_coords()]).unwrap();

        let err = aligner.superpose(&mut traj).unwrap_err();
        assert!(err.to_string().contains("ALA"));
    }
}
