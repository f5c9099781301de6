//! # Engine Module
//!
//! The per-system analysis stages, each usable on its own:
//!
//! - [`align`] strips solvent and superposes frames onto the reference backbone.
//! - [`aggregate`] joins replicates and records where every frame came from.
//! - [`features`] flattens backbone coordinates and fits the PCA reductions.
//! - [`clustering`] fits the k=1 and k=2 mini-batch k-means models.
//! - [`centroid`] picks the representative frame and measures RMSD spread.
//! - [`acceptance`] turns the spread into a verdict.
//!
//! Shared types live in [`config`], [`error`], [`progress`] and [`state`].

pub mod acceptance;
pub mod aggregate;
pub mod align;
pub mod centroid;
pub mod clustering;
pub mod config;
pub mod error;
pub mod features;
pub mod progress;
pub mod state;
