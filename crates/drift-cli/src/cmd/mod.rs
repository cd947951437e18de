pub mod check;
pub mod clean;
pub mod fallback;
pub mod list;
pub mod run;
pub mod validate;

use anyhow::Context;
use drift_core::client::StoreClient;
use drift_core::config::StoreConfig;
use drift_core::manifest::Manifest;
use std::path::Path;
use std::process::ExitCode;

/// Some targets could not be reconciled (fallbacks were printed); distinct
/// from exit 1, which means the run itself broke (transport, bad manifest).
pub const EXIT_UNRESOLVED: u8 = 2;

pub fn load_manifest(path: &Path) -> anyhow::Result<Manifest> {
    Manifest::load(path).with_context(|| format!("failed to load manifest {}", path.display()))
}

pub fn store_client(url: Option<String>, key: Option<String>) -> anyhow::Result<StoreClient> {
    let config = StoreConfig::new(url, key)?;
    Ok(StoreClient::new(config)?)
}

pub fn exit_unresolved() -> ExitCode {
    ExitCode::from(EXIT_UNRESOLVED)
}
