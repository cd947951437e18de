use crate::error::{DriftError, Result};

/// Connection settings for the remote store, resolved at process start from
/// flags or environment. Never embedded in code or manifests.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Project base URL, e.g. `https://abcd.supabase.co`. Stored without a
    /// trailing slash.
    pub url: String,
    /// Service-role key, sent as both `apikey` and bearer token.
    pub key: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl StoreConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub fn new(url: Option<String>, key: Option<String>) -> Result<Self> {
        let url = url.filter(|u| !u.trim().is_empty()).ok_or(DriftError::MissingUrl)?;
        let key = key.filter(|k| !k.trim().is_empty()).ok_or(DriftError::MissingKey)?;
        Ok(StoreConfig {
            url: url.trim_end_matches('/').to_string(),
            key,
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        })
    }

    /// REST endpoint for a table, e.g. `{url}/rest/v1/active_students`.
    pub fn table_endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    /// RPC endpoint, e.g. `{url}/rest/v1/rpc/exec_migration`.
    pub fn rpc_endpoint(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.url, function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_slash() {
        let c = StoreConfig::new(
            Some("https://abcd.supabase.co/".into()),
            Some("service-key".into()),
        )
        .unwrap();
        assert_eq!(c.url, "https://abcd.supabase.co");
        assert_eq!(
            c.table_endpoint("active_students"),
            "https://abcd.supabase.co/rest/v1/active_students"
        );
        assert_eq!(
            c.rpc_endpoint("exec_sql"),
            "https://abcd.supabase.co/rest/v1/rpc/exec_sql"
        );
    }

    #[test]
    fn missing_url_or_key_is_an_error() {
        assert!(matches!(
            StoreConfig::new(None, Some("k".into())),
            Err(DriftError::MissingUrl)
        ));
        assert!(matches!(
            StoreConfig::new(Some("https://x".into()), Some("  ".into())),
            Err(DriftError::MissingKey)
        ));
    }
}
