use std::path::PathBuf;

use ab_host::bootstrap::{run_app, RunOptions};
use anyhow::Result;
use clap::Parser;

/// Run a single-instance application host.
///
/// A second launch with the same identity hands its arguments and working
/// directory to the running instance and exits immediately.
#[derive(Debug, Parser)]
#[command(name = "appbridge", version, about)]
struct Cli {
    /// Config file (default: config.toml in the application data directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Instance identity, overriding the app-name + user derivation
    #[arg(long)]
    identity: Option<String>,

    /// Arguments forwarded to the primary instance as part of argv
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    #[allow(dead_code)] // read back from the process argv
    args: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let code = run_app(RunOptions {
        config_path: cli.config,
        identity: cli.identity,
    })
    .await?;

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
