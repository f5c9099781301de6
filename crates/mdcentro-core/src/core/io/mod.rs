//! Provides input/output functionality for molecular structure and trajectory files.
//!
//! Structures are handled through the [`traits::StructureFile`] interface; the
//! PDB implementation reads multi-model files as trajectories and writes single
//! conformations such as the selected centroid frame.

pub mod pdb;
pub mod traits;
