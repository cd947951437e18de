use crate::cmd;
use std::path::Path;
use std::process::ExitCode;

/// Print the literal fallback SQL for one target, suitable for piping
/// straight into the store's SQL editor.
pub fn run(manifest_path: &Path, target: &str) -> anyhow::Result<ExitCode> {
    let manifest = cmd::load_manifest(manifest_path)?;
    let target = manifest.find(target)?;
    println!("{}", target.fallback.trim_end());
    Ok(ExitCode::SUCCESS)
}
