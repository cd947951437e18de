use crate::cmd;
use crate::output::{print_json, print_table};
use std::path::Path;
use std::process::ExitCode;

pub fn run(manifest_path: &Path, json: bool) -> anyhow::Result<ExitCode> {
    let manifest = cmd::load_manifest(manifest_path)?;

    if json {
        print_json(&manifest.targets)?;
        return Ok(ExitCode::SUCCESS);
    }

    let rows: Vec<Vec<String>> = manifest
        .targets
        .iter()
        .map(|t| {
            vec![
                t.name.clone(),
                t.probe.describe(),
                t.action.describe(),
                t.depends_on.join(", "),
            ]
        })
        .collect();
    print_table(&["NAME", "PROBE", "ACTION", "DEPENDS ON"], rows);
    Ok(ExitCode::SUCCESS)
}
