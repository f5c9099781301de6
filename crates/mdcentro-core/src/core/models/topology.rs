use super::atom::{Atom, AtomRole};

/// Ordered list of atoms shared by every frame of a trajectory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Topology {
    atoms: Vec<Atom>,
}

impl Topology {
    pub fn new(atoms: Vec<Atom>) -> Self {
        Self { atoms }
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Indices of all atoms with the given role, in file order.
    pub fn indices_by_role(&self, role: AtomRole) -> Vec<usize> {
        self.atoms
            .iter()
            .enumerate()
            .filter(|(_, a)| a.role == role)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn backbone_indices(&self) -> Vec<usize> {
        self.indices_by_role(AtomRole::Backbone)
    }

    /// Indices of every atom that is not solvent water.
    pub fn non_solvent_indices(&self) -> Vec<usize> {
        self.atoms
            .iter()
            .enumerate()
            .filter(|(_, a)| a.role != AtomRole::Water)
            .map(|(i, _)| i)
            .collect()
    }

    /// Builds a new topology from the given atom indices, preserving their order.
    ///
    /// Returns the first out-of-range index on failure.
    pub fn subset(&self, indices: &[usize]) -> Result<Topology, usize> {
        let atoms = indices
            .iter()
            .map(|&i| self.atoms.get(i).cloned().ok_or(i))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Topology { atoms })
    }
}
