use crate::engine::acceptance::Verdict;

/// Final numbers for one fully analyzed system.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub system: String,
    pub inertia_k1: f64,
    pub inertia_k2: f64,
    pub max_rmsd: f64,
    pub verdict: Verdict,
}

/// What happened to one system during a batch run.
#[derive(Debug, Clone, PartialEq)]
pub enum SystemOutcome {
    Completed(ResultRecord),
    /// Nothing to analyze; not reported in the summary.
    Skipped { system: String, reason: String },
    Failed { system: String, reason: String },
}

impl SystemOutcome {
    pub fn system_name(&self) -> &str {
        match self {
            SystemOutcome::Completed(record) => &record.system,
            SystemOutcome::Skipped { system, .. } | SystemOutcome::Failed { system, .. } => system,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, SystemOutcome::Completed(_))
    }
}
