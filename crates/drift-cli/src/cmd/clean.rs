use crate::cmd;
use crate::output::print_json;
use drift_core::{report, runner};
use std::path::Path;
use std::process::ExitCode;

pub fn run(
    manifest_path: &Path,
    url: Option<String>,
    key: Option<String>,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let manifest = cmd::load_manifest(manifest_path)?;
    let client = cmd::store_client(url, key)?;

    let outcomes = runner::clean(&client, &manifest)?;

    if json {
        print_json(&outcomes)?;
    } else {
        print!("{}", report::render_clean(&outcomes));
    }

    if outcomes.iter().all(|c| c.ok) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(cmd::exit_unresolved())
    }
}
