use crate::cmd;
use crate::output::print_json;
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;

#[derive(Serialize)]
struct ValidateOutput {
    manifest: String,
    targets: usize,
    valid: bool,
}

/// Structural validation only; no network. Load already validates, so getting
/// here means the manifest is sound.
pub fn run(manifest_path: &Path, json: bool) -> anyhow::Result<ExitCode> {
    let manifest = cmd::load_manifest(manifest_path)?;

    if json {
        print_json(&ValidateOutput {
            manifest: manifest_path.display().to_string(),
            targets: manifest.targets.len(),
            valid: true,
        })?;
    } else {
        println!(
            "{}: {} target(s), dependency order ok",
            manifest_path.display(),
            manifest.targets.len()
        );
    }
    Ok(ExitCode::SUCCESS)
}
