use crate::error::{DriftError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Key prefix marking rows created by this tool. Only rows carrying this
/// prefix are ever upserted or deleted by automated correction.
pub const SCAFFOLD_PREFIX: &str = "drift-scaffold-";

// ---------------------------------------------------------------------------
// ProbeSpec
// ---------------------------------------------------------------------------

/// Read-only condition checked against the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeSpec {
    /// Column `column` on `table` exists and is selectable.
    Column { table: String, column: String },
    /// Table (or view) `table` is queryable at all.
    Table { table: String },
    /// An embedded-relation select succeeds, e.g. `select: "id, exams(id)"`.
    Relation { table: String, select: String },
}

impl ProbeSpec {
    pub fn table(&self) -> &str {
        match self {
            ProbeSpec::Column { table, .. }
            | ProbeSpec::Table { table }
            | ProbeSpec::Relation { table, .. } => table,
        }
    }

    /// The `select=` clause the probe issues. Limiting the projection to the
    /// condition under test is what makes absence surface as a typed error.
    pub fn select_clause(&self) -> String {
        match self {
            ProbeSpec::Column { column, .. } => column.clone(),
            ProbeSpec::Table { .. } => "*".to_string(),
            ProbeSpec::Relation { select, .. } => select.clone(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ProbeSpec::Column { table, column } => format!("column {table}.{column}"),
            ProbeSpec::Table { table } => format!("table {table}"),
            ProbeSpec::Relation { table, select } => format!("relation {table} ({select})"),
        }
    }
}

// ---------------------------------------------------------------------------
// ActionSpec
// ---------------------------------------------------------------------------

/// Corrective action attempted when the probe reports unsatisfied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionSpec {
    /// Invoke a remote procedure (`POST /rest/v1/rpc/{function}`). Preferred
    /// path when a migration-execution function is exposed.
    Rpc {
        function: String,
        #[serde(default)]
        args: BTreeMap<String, Value>,
    },
    /// Degraded mode: upsert a scaffold row carrying the missing field to
    /// coerce the store into accepting it. The key value is synthetic
    /// (`drift-scaffold-{target}`), so re-runs only ever touch their own row.
    ScaffoldRow {
        table: String,
        key_column: String,
        row: BTreeMap<String, Value>,
    },
    /// No correction is possible over REST; the fallback text is the remedy.
    Manual,
}

impl ActionSpec {
    pub fn describe(&self) -> String {
        match self {
            ActionSpec::Rpc { function, .. } => format!("rpc {function}"),
            ActionSpec::ScaffoldRow { table, .. } => format!("scaffold row in {table}"),
            ActionSpec::Manual => "manual".to_string(),
        }
    }

    /// The synthetic key written for a scaffold row. Deterministic per target
    /// so repeated runs upsert the same row instead of accreting new ones.
    pub fn scaffold_key(target_name: &str) -> String {
        format!("{SCAFFOLD_PREFIX}{target_name}")
    }
}

// ---------------------------------------------------------------------------
// ReconciliationTarget
// ---------------------------------------------------------------------------

/// One expected piece of remote schema/data state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationTarget {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Targets that must end satisfied before this one is attempted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    pub probe: ProbeSpec,
    pub action: ActionSpec,
    /// Literal SQL for the operator to run in the store's SQL editor when
    /// automated correction fails or is not applicable.
    pub fallback: String,
}

// ---------------------------------------------------------------------------
// Name validation
// ---------------------------------------------------------------------------

static NAME_RE: OnceLock<Regex> = OnceLock::new();

fn name_re() -> &'static Regex {
    NAME_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 64 || !name_re().is_match(name) {
        return Err(DriftError::InvalidTargetName(name.to_string()));
    }
    Ok(())
}
