//! # Core Module
//!
//! Stateless building blocks of MDCentro: the molecular data model, structure and
//! trajectory file I/O, and the geometric primitives (centroids, rigid-body
//! superposition, RMSD) used by the analysis engine.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, topologies, and trajectories
//! - **File I/O** ([`io`]) - Reading multi-model PDB trajectories and writing structures
//! - **Utilities** ([`utils`]) - Geometry and atom/residue name tables

pub mod io;
pub mod models;
pub mod utils;
