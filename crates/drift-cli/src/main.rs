mod cmd;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "drift",
    about = "Reconcile expected schema/data state against a Supabase-backed store",
    version,
    propagate_version = true
)]
struct Cli {
    /// Manifest of reconciliation targets
    #[arg(long, global = true, env = "DRIFT_MANIFEST", default_value = "drift.yaml")]
    manifest: PathBuf,

    /// Store base URL, e.g. https://abcd.supabase.co
    #[arg(long, global = true, env = "DRIFT_SUPABASE_URL")]
    url: Option<String>,

    /// Service-role key (prefer the environment variable over the flag)
    #[arg(long, global = true, env = "DRIFT_SERVICE_KEY", hide_env_values = true)]
    key: Option<String>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile every target: probe, patch if unsatisfied, verify, report
    Run,

    /// Probe every target without writing anything
    Check,

    /// List manifest targets (no network)
    List,

    /// Validate the manifest: names, dependency edges, cycles (no network)
    Validate,

    /// Print a target's fallback SQL verbatim
    Fallback { target: String },

    /// Delete scaffold rows left behind by previous runs
    Clean,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Run => cmd::run::run(&cli.manifest, cli.url, cli.key, cli.json),
        Commands::Check => cmd::check::run(&cli.manifest, cli.url, cli.key, cli.json),
        Commands::List => cmd::list::run(&cli.manifest, cli.json),
        Commands::Validate => cmd::validate::run(&cli.manifest, cli.json),
        Commands::Fallback { target } => cmd::fallback::run(&cli.manifest, &target),
        Commands::Clean => cmd::clean::run(&cli.manifest, cli.url, cli.key, cli.json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            // Print the full error chain (anyhow's alternate Display)
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
