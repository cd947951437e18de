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

    let run_report = runner::run(&client, &manifest)?;

    if json {
        print_json(&run_report)?;
    } else {
        print!("{}", report::render_run(&run_report));
    }

    if run_report.abort.is_some() {
        return Ok(ExitCode::FAILURE);
    }
    if run_report.fully_succeeded() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(cmd::exit_unresolved())
    }
}
