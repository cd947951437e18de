use crate::client::StoreClient;
use crate::error::Result;
use crate::manifest::Manifest;
use crate::patch::{self, PatchResult};
use crate::probe::{self, ProbeFinding};
use crate::target::{ActionSpec, ProbeSpec, ReconciliationTarget};
use crate::types::{Outcome, Status};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{error, info};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// The remote operations the runner needs. [`StoreClient`] is the real
/// implementation; tests drive the runner with a scripted fake.
pub trait Store {
    fn probe(&self, spec: &ProbeSpec) -> Result<ProbeFinding>;
    fn patch(&self, target: &ReconciliationTarget) -> Result<PatchResult>;
    fn delete_scaffold(&self, table: &str, key_column: &str) -> Result<bool>;
}

impl Store for StoreClient {
    fn probe(&self, spec: &ProbeSpec) -> Result<ProbeFinding> {
        probe::run(self, spec)
    }

    fn patch(&self, target: &ReconciliationTarget) -> Result<PatchResult> {
        patch::apply(self, target)
    }

    fn delete_scaffold(&self, table: &str, key_column: &str) -> Result<bool> {
        let resp = self.delete_scaffold_rows(table, key_column)?;
        Ok(resp.is_success())
    }
}

// ---------------------------------------------------------------------------
// RunReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct AbortInfo {
    /// Target being processed when the transport failure hit.
    pub target: String,
    pub error: String,
}

/// Everything one invocation produced. Outcomes are in processing order and
/// survive an abort; targets after the abort point are listed, not guessed at.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub outcomes: Vec<Outcome>,
    pub not_attempted: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abort: Option<AbortInfo>,
}

impl RunReport {
    fn new() -> Self {
        RunReport {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            outcomes: Vec::new(),
            not_attempted: Vec::new(),
            abort: None,
        }
    }

    pub fn count(&self, status: Status) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn fully_succeeded(&self) -> bool {
        self.abort.is_none() && self.count(Status::Failed) == 0
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

/// Reconcile every manifest target, sequentially, in dependency order.
///
/// Per target: probe, then (if unsatisfied) patch, then re-probe to verify.
/// Target-level failures are isolated; a transport error aborts the rest of
/// the run but keeps the outcomes already produced.
pub fn run(store: &dyn Store, manifest: &Manifest) -> Result<RunReport> {
    let order = manifest.execution_order()?;
    let mut report = RunReport::new();
    let mut satisfied: HashSet<&str> = HashSet::new();

    for (pos, target) in order.iter().enumerate() {
        // A target whose dependency did not end satisfied cannot assume the
        // state its corrective action needs; fail it without probing.
        if let Some(dep) = target
            .depends_on
            .iter()
            .find(|d| !satisfied.contains(d.as_str()))
        {
            report.outcomes.push(Outcome::failed(
                &target.name,
                format!("dependency '{dep}' not satisfied"),
                Some(target.fallback.clone()),
            ));
            continue;
        }

        match reconcile_one(store, target) {
            Ok(outcome) => {
                info!(name = %target.name, status = %outcome.status, "target processed");
                if outcome.status != Status::Failed {
                    satisfied.insert(target.name.as_str());
                }
                report.outcomes.push(outcome);
            }
            Err(e) => {
                error!(name = %target.name, "transport failure, aborting run: {e}");
                report.abort = Some(AbortInfo {
                    target: target.name.clone(),
                    error: e.to_string(),
                });
                report.not_attempted = order[pos + 1..]
                    .iter()
                    .map(|t| t.name.clone())
                    .collect();
                break;
            }
        }
    }

    Ok(report)
}

/// The linear per-target pipeline: probe → patch → verify.
fn reconcile_one(store: &dyn Store, target: &ReconciliationTarget) -> Result<Outcome> {
    match store.probe(&target.probe)? {
        ProbeFinding::Satisfied => return Ok(Outcome::satisfied(&target.name)),
        ProbeFinding::Unsatisfied { code, message } => {
            info!(name = %target.name, %code, "unsatisfied: {message}");
        }
    }

    let note = match store.patch(target)? {
        PatchResult::NotApplicable => {
            return Ok(Outcome::failed(
                &target.name,
                "no automated correction available over REST",
                Some(target.fallback.clone()),
            ));
        }
        PatchResult::Rejected { detail } => {
            return Ok(Outcome::failed(
                &target.name,
                detail,
                Some(target.fallback.clone()),
            ));
        }
        PatchResult::Applied { note } => note,
    };

    // "applied" is never taken at face value; only the re-probe decides.
    match store.probe(&target.probe)? {
        ProbeFinding::Satisfied => Ok(Outcome::corrected(&target.name, note)),
        ProbeFinding::Unsatisfied { message, .. } => Ok(Outcome::failed(
            &target.name,
            format!("patch applied but condition still unsatisfied ({message}); manual intervention required"),
            Some(target.fallback.clone()),
        )),
    }
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct CheckFinding {
    pub target: String,
    pub satisfied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub findings: Vec<CheckFinding>,
    pub not_attempted: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abort: Option<AbortInfo>,
}

impl CheckReport {
    pub fn all_satisfied(&self) -> bool {
        self.abort.is_none() && self.findings.iter().all(|f| f.satisfied)
    }
}

/// Probe-only pass over every target. Issues zero writes.
pub fn check(store: &dyn Store, manifest: &Manifest) -> Result<CheckReport> {
    let order = manifest.execution_order()?;
    let mut report = CheckReport {
        findings: Vec::new(),
        not_attempted: Vec::new(),
        abort: None,
    };

    for (pos, target) in order.iter().enumerate() {
        match store.probe(&target.probe) {
            Ok(ProbeFinding::Satisfied) => report.findings.push(CheckFinding {
                target: target.name.clone(),
                satisfied: true,
                detail: None,
            }),
            Ok(ProbeFinding::Unsatisfied { message, .. }) => report.findings.push(CheckFinding {
                target: target.name.clone(),
                satisfied: false,
                detail: Some(message),
            }),
            Err(e) => {
                report.abort = Some(AbortInfo {
                    target: target.name.clone(),
                    error: e.to_string(),
                });
                report.not_attempted = order[pos + 1..]
                    .iter()
                    .map(|t| t.name.clone())
                    .collect();
                break;
            }
        }
    }

    Ok(report)
}

// ---------------------------------------------------------------------------
// clean
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct CleanOutcome {
    pub table: String,
    pub key_column: String,
    pub ok: bool,
}

/// Delete scaffold rows written by previous runs. Only tables reachable from
/// `scaffold_row` actions are touched, and only rows carrying the synthetic
/// key prefix.
pub fn clean(store: &dyn Store, manifest: &Manifest) -> Result<Vec<CleanOutcome>> {
    let mut seen = HashSet::new();
    let mut outcomes = Vec::new();
    for target in &manifest.targets {
        if let ActionSpec::ScaffoldRow {
            table, key_column, ..
        } = &target.action
        {
            if !seen.insert((table.clone(), key_column.clone())) {
                continue;
            }
            let ok = store.delete_scaffold(table, key_column)?;
            outcomes.push(CleanOutcome {
                table: table.clone(),
                key_column: key_column.clone(),
                ok,
            });
        }
    }
    Ok(outcomes)
}
