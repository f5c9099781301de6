use crate::core::utils::identifiers;

/// Represents the role or classification of an atom within a molecular structure.
///
/// Roles are derived from the atom and residue names when a structure is read,
/// and drive the two selections used throughout the analysis: the backbone
/// subset used for superposition and RMSD, and the solvent atoms that are
/// stripped before processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum AtomRole {
    /// Main-chain heavy atom of a protein residue (N, CA, C, O).
    Backbone,
    /// Any other atom of a protein residue.
    Sidechain,
    /// Atom of a non-protein, non-solvent residue.
    Ligand,
    /// Solvent water atom.
    Water,
    /// Unknown or unclassified atom role.
    #[default]
    Other,
}

impl AtomRole {
    /// Classifies an atom from its name and the name of its residue.
    pub fn classify(atom_name: &str, residue_name: &str) -> Self {
        if identifiers::is_water_residue(residue_name) {
            AtomRole::Water
        } else if identifiers::is_protein_residue(residue_name) {
            if identifiers::is_backbone_atom(atom_name) {
                AtomRole::Backbone
            } else {
                AtomRole::Sidechain
            }
        } else if residue_name.trim().is_empty() {
            AtomRole::Other
        } else {
            AtomRole::Ligand
        }
    }

    pub fn is_protein(&self) -> bool {
        matches!(self, AtomRole::Backbone | AtomRole::Sidechain)
    }
}

/// Topological description of a single atom.
///
/// Coordinates are not stored here; they live per frame in a
/// [`Trajectory`](super::trajectory::Trajectory) so that one topology can be
/// shared by any number of conformations.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Serial number as found in the source file.
    pub serial: usize,
    /// The name of the atom (e.g., "CA", "N", "O").
    pub name: String,
    /// Three-letter residue name (e.g., "ALA", "HOH").
    pub residue_name: String,
    /// Residue sequence number from the source file.
    pub residue_number: isize,
    /// Single-character chain identifier.
    pub chain_id: char,
    /// Element symbol (e.g., "C", "N").
    pub element: String,
    /// The role or classification of the atom.
    pub role: AtomRole,
}

impl Atom {
    /// Creates a new `Atom`, classifying its role from the names.
    pub fn new(
        serial: usize,
        name: &str,
        residue_name: &str,
        residue_number: isize,
        chain_id: char,
    ) -> Self {
        Self {
            serial,
            name: name.to_string(),
            residue_name: residue_name.to_string(),
            residue_number,
            chain_id,
            element: identifiers::infer_element(name, residue_name),
            role: AtomRole::classify(name, residue_name),
        }
    }

    pub fn with_element(mut self, element: &str) -> Self {
        if !element.trim().is_empty() {
            self.element = element.trim().to_string();
        }
        self
    }

    /// Two atoms are the same site when name and residue name agree.
    pub fn same_identity(&self, other: &Atom) -> bool {
        self.name == other.name && self.residue_name == other.residue_name
    }
}
