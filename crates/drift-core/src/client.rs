use crate::config::StoreConfig;
use crate::error::{DriftError, Result};
use crate::target::SCAFFOLD_PREFIX;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

// ---------------------------------------------------------------------------
// StoreResponse
// ---------------------------------------------------------------------------

/// A completed HTTP exchange with the store. Transport-level failures never
/// produce one of these; they surface as [`DriftError`] before this point.
#[derive(Debug, Clone)]
pub struct StoreResponse {
    pub status: u16,
    pub body: String,
}

impl StoreResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// PostgREST error payloads carry a `code` field (Postgres SQLSTATE like
    /// `42703`, or a `PGRST*` code from the API layer itself).
    pub fn error_code(&self) -> Option<String> {
        serde_json::from_str::<Value>(&self.body)
            .ok()?
            .get("code")?
            .as_str()
            .map(str::to_string)
    }

    pub fn error_message(&self) -> String {
        serde_json::from_str::<Value>(&self.body)
            .ok()
            .and_then(|v| v.get("message")?.as_str().map(str::to_string))
            .unwrap_or_else(|| format!("HTTP {}", self.status))
    }
}

// ---------------------------------------------------------------------------
// StoreClient
// ---------------------------------------------------------------------------

/// Thin blocking wrapper over the store's REST surface. One outstanding
/// request at a time; the pipeline is strictly sequential.
pub struct StoreClient {
    config: StoreConfig,
    http: reqwest::blocking::Client,
}

impl StoreClient {
    pub fn new(config: StoreConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DriftError::Transport {
                url: config.url.clone(),
                detail: e.to_string(),
            })?;
        Ok(StoreClient { config, http })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Read-only select used by probes: `GET /rest/v1/{table}?select=...&limit=1`.
    pub fn select_one(&self, table: &str, select: &str) -> Result<StoreResponse> {
        let url = self.config.table_endpoint(table);
        debug!(table, select, "probe select");
        let req = self
            .http
            .get(&url)
            .query(&[("select", select), ("limit", "1")]);
        self.send(&url, req)
    }

    /// Invoke a remote procedure with JSON arguments.
    pub fn rpc(&self, function: &str, args: &Value) -> Result<StoreResponse> {
        let url = self.config.rpc_endpoint(function);
        debug!(function, "rpc call");
        let req = self.http.post(&url).json(args);
        self.send(&url, req)
    }

    /// Upsert a single row keyed on `key_column`. Merge-duplicates resolution
    /// makes re-runs land on the same row instead of accreting copies.
    pub fn upsert_row(&self, table: &str, key_column: &str, row: &Value) -> Result<StoreResponse> {
        let url = self.config.table_endpoint(table);
        debug!(table, key_column, "scaffold upsert");
        let req = self
            .http
            .post(&url)
            .query(&[("on_conflict", key_column)])
            .header("Prefer", "return=minimal,resolution=merge-duplicates")
            .json(row);
        self.send(&url, req)
    }

    /// Delete rows whose key carries the scaffold prefix. The filter is the
    /// guarantee that only tool-created rows are touched.
    pub fn delete_scaffold_rows(&self, table: &str, key_column: &str) -> Result<StoreResponse> {
        let url = self.config.table_endpoint(table);
        let pattern = format!("like.{SCAFFOLD_PREFIX}*");
        debug!(table, key_column, "scaffold delete");
        let req = self
            .http
            .delete(&url)
            .query(&[(key_column, pattern.as_str())])
            .header("Prefer", "return=minimal");
        self.send(&url, req)
    }

    fn send(&self, url: &str, req: reqwest::blocking::RequestBuilder) -> Result<StoreResponse> {
        let resp = req
            .header("apikey", self.config.key.as_str())
            .bearer_auth(&self.config.key)
            .send()
            .map_err(|e| DriftError::Transport {
                url: url.to_string(),
                detail: e.to_string(),
            })?;

        let status = resp.status().as_u16();
        // An invalid or expired key is an infrastructure failure, never a
        // "needs patch" signal.
        if status == 401 {
            return Err(DriftError::Auth { status });
        }
        let body = resp.text().map_err(|e| DriftError::Transport {
            url: url.to_string(),
            detail: e.to_string(),
        })?;
        Ok(StoreResponse { status, body })
    }
}
