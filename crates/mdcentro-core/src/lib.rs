//! # MDCentro Core Library
//!
//! Finds a representative ("centroid") structure for ensembles of molecular-dynamics
//! replicate trajectories and judges whether that single structure represents the
//! ensemble well.
//!
//! ## Layers
//!
//! - **[`core`]: The Foundation.** Atom and trajectory models, the multi-model PDB
//!   reader/writer, and geometric primitives such as Kabsch superposition and RMSD.
//!
//! - **[`engine`]: The Pipeline Stages.** Alignment, replicate aggregation, PCA
//!   feature reduction, mini-batch k-means, centroid selection and the acceptance
//!   test, together with configuration, errors and progress events.
//!
//! - **[`workflows`]: The Public API.** Runs all stages for one system and writes the
//!   batch summary.

pub mod core;
pub mod engine;
pub mod workflows;
