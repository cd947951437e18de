use crate::runner::{CheckReport, CleanOutcome, RunReport};
use crate::types::Status;
use std::fmt::Write;

// One line per target, fixed-width status column, so operators can grep a
// run log by status without worrying about layout drift between versions.
const STATUS_WIDTH: usize = 17; // len("already-satisfied")

/// Render a reconciliation run for the operator.
pub fn render_run(report: &RunReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "drift run {} at {}",
        report.run_id,
        report.started_at.format("%Y-%m-%dT%H:%M:%SZ")
    );

    for o in &report.outcomes {
        match &o.detail {
            Some(d) => {
                let _ = writeln!(
                    out,
                    "{:w$}  {}  ({d})",
                    o.status.as_str(),
                    o.target,
                    w = STATUS_WIDTH
                );
            }
            None => {
                let _ = writeln!(out, "{:w$}  {}", o.status.as_str(), o.target, w = STATUS_WIDTH);
            }
        }
    }

    for o in &report.outcomes {
        if let (Status::Failed, Some(fallback)) = (o.status, &o.fallback) {
            let _ = writeln!(out, "\n-- fallback for {}: run this in the SQL editor", o.target);
            let _ = writeln!(out, "{}", fallback.trim_end());
        }
    }

    if let Some(abort) = &report.abort {
        let _ = writeln!(out, "\naborted at '{}': {}", abort.target, abort.error);
        if !report.not_attempted.is_empty() {
            let _ = writeln!(out, "not attempted: {}", report.not_attempted.join(", "));
        }
    }

    let _ = writeln!(
        out,
        "\n{} already satisfied, {} corrected, {} failed",
        report.count(Status::AlreadySatisfied),
        report.count(Status::Corrected),
        report.count(Status::Failed),
    );
    out
}

/// Render a probe-only check.
pub fn render_check(report: &CheckReport) -> String {
    let mut out = String::new();
    for f in &report.findings {
        let status = if f.satisfied { "satisfied" } else { "unsatisfied" };
        match &f.detail {
            Some(d) => {
                let _ = writeln!(out, "{status:<11}  {}  ({d})", f.target);
            }
            None => {
                let _ = writeln!(out, "{status:<11}  {}", f.target);
            }
        }
    }

    if let Some(abort) = &report.abort {
        let _ = writeln!(out, "\naborted at '{}': {}", abort.target, abort.error);
        if !report.not_attempted.is_empty() {
            let _ = writeln!(out, "not attempted: {}", report.not_attempted.join(", "));
        }
    }

    let unsatisfied = report.findings.iter().filter(|f| !f.satisfied).count();
    let _ = writeln!(
        out,
        "\n{} satisfied, {} unsatisfied",
        report.findings.len() - unsatisfied,
        unsatisfied
    );
    out
}

/// Render scaffold cleanup results.
pub fn render_clean(outcomes: &[CleanOutcome]) -> String {
    if outcomes.is_empty() {
        return "no scaffold tables in manifest; nothing to clean\n".to_string();
    }
    let mut out = String::new();
    for c in outcomes {
        let status = if c.ok { "cleaned" } else { "failed" };
        let _ = writeln!(out, "{status:<8}  {} (key {})", c.table, c.key_column);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::AbortInfo;
    use crate::types::Outcome;
    use chrono::Utc;
    use uuid::Uuid;

    fn report_with(outcomes: Vec<Outcome>) -> RunReport {
        RunReport {
            run_id: Uuid::nil(),
            started_at: Utc::now(),
            outcomes,
            not_attempted: Vec::new(),
            abort: None,
        }
    }

    #[test]
    fn one_line_per_target_greppable_by_status() {
        let text = render_run(&report_with(vec![
            Outcome::satisfied("student-exams-table"),
            Outcome::corrected("add-has-completed", "scaffold row upserted into active_students"),
        ]));
        assert!(text.contains("already-satisfied  student-exams-table"));
        assert!(text.contains(&format!("{:17}  add-has-completed", "corrected")));
        assert!(text.contains("1 already satisfied, 1 corrected, 0 failed"));
    }

    #[test]
    fn failed_target_prints_fallback_verbatim() {
        let sql = "ALTER TABLE active_students ADD COLUMN IF NOT EXISTS has_completed BOOLEAN DEFAULT FALSE;";
        let text = render_run(&report_with(vec![Outcome::failed(
            "add-has-completed",
            "permission denied",
            Some(sql.to_string()),
        )]));
        assert!(text.contains("-- fallback for add-has-completed"));
        assert!(text.contains(sql));
        assert!(text.contains("0 already satisfied, 0 corrected, 1 failed"));
    }

    #[test]
    fn abort_lists_unattempted_targets() {
        let mut r = report_with(vec![Outcome::satisfied("a")]);
        r.abort = Some(AbortInfo {
            target: "b".into(),
            error: "connection refused".into(),
        });
        r.not_attempted = vec!["c".into(), "d".into()];
        let text = render_run(&r);
        assert!(text.contains("aborted at 'b': connection refused"));
        assert!(text.contains("not attempted: c, d"));
    }

    #[test]
    fn check_rendering_tallies() {
        let r = CheckReport {
            findings: vec![
                crate::runner::CheckFinding {
                    target: "a".into(),
                    satisfied: true,
                    detail: None,
                },
                crate::runner::CheckFinding {
                    target: "b".into(),
                    satisfied: false,
                    detail: Some("column does not exist".into()),
                },
            ],
            not_attempted: Vec::new(),
            abort: None,
        };
        let text = render_check(&r);
        assert!(text.contains("satisfied    a"));
        assert!(text.contains("unsatisfied  b  (column does not exist)"));
        assert!(text.contains("1 satisfied, 1 unsatisfied"));
    }
}
