use serde::Serialize;
use std::fmt;

/// Whether one centroid represents the ensemble well enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    #[serde(rename = "Yes")]
    Accepted,
    #[serde(rename = "No")]
    Rejected,
}

impl Verdict {
    pub fn is_accepted(self) -> bool {
        self == Verdict::Accepted
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accepted => write!(f, "Yes"),
            Verdict::Rejected => write!(f, "No"),
        }
    }
}

/// Accepts when `max_rmsd <= threshold`. A NaN distance is never accepted.
pub fn evaluate(max_rmsd: f64, threshold: f64) -> Verdict {
    if max_rmsd <= threshold {
        Verdict::Accepted
    } else {
        Verdict::Rejected
    }
}
