//! # Workflows Module
//!
//! High-level entry points that tie [`crate::engine`] and [`crate::core`] together.
//!
//! - **System analysis** ([`analyze`]) - runs the whole pipeline for one system,
//!   from raw replicate trajectories to a result record and plot data.
//! - **Summary** ([`summary`]) - persists batch outcomes as a CSV table plus the
//!   methodology note that explains the verdict column.

pub mod analyze;
pub mod summary;
