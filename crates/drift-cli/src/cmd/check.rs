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

    let check_report = runner::check(&client, &manifest)?;

    if json {
        print_json(&check_report)?;
    } else {
        print!("{}", report::render_check(&check_report));
    }

    if check_report.abort.is_some() {
        return Ok(ExitCode::FAILURE);
    }
    if check_report.all_satisfied() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(cmd::exit_unresolved())
    }
}
