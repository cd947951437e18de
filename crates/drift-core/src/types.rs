use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Final state of one reconciliation target after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    /// The probe held on first check; no write was issued.
    AlreadySatisfied,
    /// The probe failed, a corrective action was applied, and the re-probe held.
    Corrected,
    /// The target could not be brought into the expected state automatically.
    Failed,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::AlreadySatisfied => "already-satisfied",
            Status::Corrected => "corrected",
            Status::Failed => "failed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "already-satisfied" => Ok(Status::AlreadySatisfied),
            "corrected" => Ok(Status::Corrected),
            "failed" => Ok(Status::Failed),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of processing one target. Lives only for the duration of a run;
/// printed by the reporter, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub target: String,
    pub status: Status,
    /// Short operator-facing note (error text, or how the correction landed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Literal corrective SQL surfaced when automated correction failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

impl Outcome {
    pub fn satisfied(target: &str) -> Self {
        Outcome {
            target: target.to_string(),
            status: Status::AlreadySatisfied,
            detail: None,
            fallback: None,
        }
    }

    pub fn corrected(target: &str, detail: impl Into<String>) -> Self {
        Outcome {
            target: target.to_string(),
            status: Status::Corrected,
            detail: Some(detail.into()),
            fallback: None,
        }
    }

    pub fn failed(target: &str, detail: impl Into<String>, fallback: Option<String>) -> Self {
        Outcome {
            target: target.to_string(),
            status: Status::Failed,
            detail: Some(detail.into()),
            fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_round_trips_through_str() {
        for s in [Status::AlreadySatisfied, Status::Corrected, Status::Failed] {
            assert_eq!(Status::from_str(s.as_str()).unwrap(), s);
        }
        assert!(Status::from_str("pending").is_err());
    }

    #[test]
    fn outcome_constructors_set_status() {
        assert_eq!(Outcome::satisfied("a").status, Status::AlreadySatisfied);
        assert_eq!(Outcome::corrected("a", "ok").status, Status::Corrected);
        let f = Outcome::failed("a", "nope", Some("ALTER TABLE t".into()));
        assert_eq!(f.status, Status::Failed);
        assert_eq!(f.fallback.as_deref(), Some("ALTER TABLE t"));
    }
}
