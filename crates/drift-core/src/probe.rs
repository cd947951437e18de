use crate::client::{StoreClient, StoreResponse};
use crate::error::{DriftError, Result};
use crate::target::ProbeSpec;
use tracing::debug;

// ---------------------------------------------------------------------------
// ProbeFinding
// ---------------------------------------------------------------------------

/// What the probe learned about one target's condition.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeFinding {
    Satisfied,
    /// The store reported the expected schema element as absent.
    Unsatisfied { code: String, message: String },
}

/// Error codes the store uses to signal semantic absence, as opposed to a
/// broken request or infrastructure failure:
///  - `42703` undefined column
///  - `42P01` undefined table
///  - `PGRST200` missing relationship (embedded select)
///  - `PGRST204` column not found in schema cache
///  - `PGRST205` table not found in schema cache
const ABSENCE_CODES: &[&str] = &["42703", "42P01", "PGRST200", "PGRST204", "PGRST205"];

pub fn is_absence_code(code: &str) -> bool {
    ABSENCE_CODES.contains(&code)
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

/// Execute one probe. Read-only; never writes.
///
/// Only a typed absence error counts as unsatisfied. Anything else non-2xx is
/// an infrastructure problem and propagates as a fatal error for the run.
pub fn run(client: &StoreClient, spec: &ProbeSpec) -> Result<ProbeFinding> {
    let resp = client.select_one(spec.table(), &spec.select_clause())?;
    classify(spec, &resp, client.config().url.as_str())
}

fn classify(spec: &ProbeSpec, resp: &StoreResponse, url: &str) -> Result<ProbeFinding> {
    if resp.is_success() {
        debug!(probe = %spec.describe(), "satisfied");
        return Ok(ProbeFinding::Satisfied);
    }

    match resp.error_code() {
        Some(code) if is_absence_code(&code) => {
            debug!(probe = %spec.describe(), %code, "unsatisfied");
            Ok(ProbeFinding::Unsatisfied {
                message: resp.error_message(),
                code,
            })
        }
        _ => Err(DriftError::Transport {
            url: url.to_string(),
            detail: format!(
                "probe '{}' got HTTP {}: {}",
                spec.describe(),
                resp.status,
                resp.error_message()
            ),
        }),
    }
}
