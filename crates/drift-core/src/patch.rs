use crate::client::StoreClient;
use crate::error::Result;
use crate::target::{ActionSpec, ReconciliationTarget};
use serde_json::{Map, Value};
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// PatchResult
// ---------------------------------------------------------------------------

/// What the patch applier did for one unsatisfied target.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchResult {
    /// The corrective write was accepted. `note` says how (rpc vs scaffold).
    Applied { note: String },
    /// The action is `manual`; nothing was attempted over REST.
    NotApplicable,
    /// The store rejected the corrective write. Fatal for this target only.
    Rejected { detail: String },
}

// ---------------------------------------------------------------------------
// apply
// ---------------------------------------------------------------------------

/// Execute the corrective action for one target. Single-shot: a rejection is
/// reported, never retried.
///
/// Transport-level failures (connection, auth) propagate as errors and abort
/// the run; everything else is contained in the returned [`PatchResult`].
pub fn apply(client: &StoreClient, target: &ReconciliationTarget) -> Result<PatchResult> {
    match &target.action {
        ActionSpec::Manual => {
            debug!(name = %target.name, "no automated correction; fallback only");
            Ok(PatchResult::NotApplicable)
        }

        ActionSpec::Rpc { function, args } => {
            let args = Value::Object(args.iter().map(|(k, v)| (k.clone(), v.clone())).collect());
            let resp = client.rpc(function, &args)?;
            if resp.is_success() {
                Ok(PatchResult::Applied {
                    note: format!("rpc {function} accepted"),
                })
            } else {
                warn!(name = %target.name, function, status = resp.status, "rpc rejected");
                Ok(PatchResult::Rejected {
                    detail: format!("rpc {function} rejected: {}", resp.error_message()),
                })
            }
        }

        ActionSpec::ScaffoldRow {
            table,
            key_column,
            row,
        } => {
            let mut body: Map<String, Value> = row.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            // The synthetic key confines every write to a row this tool owns.
            body.insert(
                key_column.clone(),
                Value::String(ActionSpec::scaffold_key(&target.name)),
            );
            let resp = client.upsert_row(table, key_column, &Value::Object(body))?;
            if resp.is_success() {
                Ok(PatchResult::Applied {
                    note: format!("scaffold row upserted into {table}"),
                })
            } else {
                warn!(name = %target.name, table, status = resp.status, "scaffold write rejected");
                Ok(PatchResult::Rejected {
                    detail: format!("scaffold write to {table} rejected: {}", resp.error_message()),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::target::{ProbeSpec, SCAFFOLD_PREFIX};
    use std::collections::BTreeMap;

    fn client_for(server: &mockito::ServerGuard) -> StoreClient {
        let config = StoreConfig::new(Some(server.url()), Some("test-key".into())).unwrap();
        StoreClient::new(config).unwrap()
    }

    fn scaffold_target() -> ReconciliationTarget {
        let mut row = BTreeMap::new();
        row.insert("has_completed".to_string(), Value::Bool(false));
        ReconciliationTarget {
            name: "add-has-completed".into(),
            description: None,
            depends_on: vec![],
            probe: ProbeSpec::Column {
                table: "active_students".into(),
                column: "has_completed".into(),
            },
            action: ActionSpec::ScaffoldRow {
                table: "active_students".into(),
                key_column: "id".into(),
                row,
            },
            fallback: "ALTER TABLE active_students ADD COLUMN IF NOT EXISTS has_completed BOOLEAN DEFAULT FALSE;".into(),
        }
    }

    #[test]
    fn manual_action_is_not_applicable() {
        let server = mockito::Server::new();
        let mut t = scaffold_target();
        t.action = ActionSpec::Manual;
        let result = apply(&client_for(&server), &t).unwrap();
        assert_eq!(result, PatchResult::NotApplicable);
    }

    #[test]
    fn scaffold_row_carries_synthetic_key_and_field() {
        let mut server = mockito::Server::new();
        let m = server
            .mock("POST", "/rest/v1/active_students")
            .match_query(mockito::Matcher::UrlEncoded("on_conflict".into(), "id".into()))
            .match_header("prefer", "return=minimal,resolution=merge-duplicates")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "id": format!("{SCAFFOLD_PREFIX}add-has-completed"),
                "has_completed": false
            })))
            .with_status(201)
            .create();

        let result = apply(&client_for(&server), &scaffold_target()).unwrap();
        assert!(matches!(result, PatchResult::Applied { .. }));
        m.assert();
    }

    #[test]
    fn rejected_write_is_contained() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/rest/v1/active_students")
            .match_query(mockito::Matcher::Any)
            .with_status(403)
            .with_body(r#"{"code":"42501","message":"permission denied for table active_students"}"#)
            .create();

        let result = apply(&client_for(&server), &scaffold_target()).unwrap();
        match result {
            PatchResult::Rejected { detail } => assert!(detail.contains("permission denied")),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn missing_rpc_function_is_rejected_not_fatal() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/rest/v1/rpc/exec_migration")
            .with_status(404)
            .with_body(r#"{"code":"PGRST202","message":"Could not find the function public.exec_migration"}"#)
            .create();

        let mut t = scaffold_target();
        t.action = ActionSpec::Rpc {
            function: "exec_migration".into(),
            args: BTreeMap::new(),
        };
        let result = apply(&client_for(&server), &t).unwrap();
        assert!(matches!(result, PatchResult::Rejected { .. }));
    }
}
