//! # Core Models Module
//!
//! Data structures describing molecular conformations as they flow through the
//! analysis pipeline.
//!
//! ## Key Components
//!
//! - [`atom`] - Per-atom topology record and role classification (backbone, water, ...)
//! - [`topology`] - Ordered atom list shared by every frame, with role-based selections
//! - [`trajectory`] - Ordered frames of coordinates over one topology
//!
//! ## Usage
//!
//! ```ignore
//! use mdcentro::core::models::{atom::Atom, topology::Topology, trajectory::Trajectory};
//!
//! let topology = Topology::new(vec![Atom::new(1, "CA", "ALA", 1, 'A')]);
//! let trajectory = Trajectory::new(topology, vec![vec![Point3::origin()]])?;
//! let backbone = trajectory.atom_slice(&trajectory.topology().backbone_indices())?;
//! ```

pub mod atom;
pub mod topology;
pub mod trajectory;
