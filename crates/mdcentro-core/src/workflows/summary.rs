use crate::engine::state::SystemOutcome;
use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

pub const SUMMARY_FILE_NAME: &str = "clustering_summary.csv";
pub const METHODOLOGY_FILE_NAME: &str = "clustering_summary_readme.txt";

const SUMMARY_HEADER: [&str; 5] = [
    "System",
    "Inertia_k1",
    "Inertia_k2",
    "Max_RMSD_to_k1_center_Å",
    "k=1_acceptable",
];
const FAILED_VERDICT: &str = "Failed";

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV writing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
}

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    system: &'a str,
    inertia_k1: Option<f64>,
    inertia_k2: Option<f64>,
    max_rmsd: Option<f64>,
    verdict: String,
}

impl<'a> SummaryRow<'a> {
    fn from_outcome(outcome: &'a SystemOutcome) -> Option<Self> {
        match outcome {
            SystemOutcome::Completed(record) => Some(Self {
                system: &record.system,
                inertia_k1: Some(round3(record.inertia_k1)),
                inertia_k2: Some(round3(record.inertia_k2)),
                max_rmsd: Some(round3(record.max_rmsd)),
                verdict: record.verdict.to_string(),
            }),
            SystemOutcome::Failed { system, .. } => Some(Self {
                system,
                inertia_k1: None,
                inertia_k2: None,
                max_rmsd: None,
                verdict: FAILED_VERDICT.to_string(),
            }),
            SystemOutcome::Skipped { .. } => None,
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Writes one row per completed or failed system, sorted by system name.
///
/// Skipped systems produce no row. The header is written even when no row follows.
pub fn write_summary(path: &Path, outcomes: &[SystemOutcome]) -> Result<usize, SummaryError> {
    let csv_error = |source: csv::Error| SummaryError::Csv {
        path: path.to_string_lossy().to_string(),
        source,
    };

    let mut rows: Vec<SummaryRow> = outcomes.iter().filter_map(SummaryRow::from_outcome).collect();
    rows.sort_by(|a, b| a.system.cmp(b.system));

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_error)?;
    writer.write_record(SUMMARY_HEADER).map_err(csv_error)?;
    for row in &rows {
        writer.serialize(row).map_err(csv_error)?;
    }
    writer.flush().map_err(|e| SummaryError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;

    debug!(rows = rows.len(), path = %path.display(), "Summary table written.");
    Ok(rows.len())
}

/// The one-line description of how `k=1_acceptable` was decided.
pub fn methodology_note(max_rmsd: f64) -> String {
    format!(
        "k=1_acceptable = 'Yes' if max backbone RMSD to k=1 center ≤ {:?} Å, else 'No'",
        max_rmsd
    )
}

pub fn write_methodology_note(path: &Path, max_rmsd: f64) -> Result<(), SummaryError> {
    fs::write(path, methodology_note(max_rmsd) + "\n").map_err(|e| SummaryError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}
