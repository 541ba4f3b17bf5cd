//! Build one (configuration, board) pair and print the relocated artifacts.

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use wpt_harness::config::{Board, BuildConfig, BuildRequest, HarnessConfig};
use wpt_harness::{preflight, workflow};

#[derive(Parser)]
#[command(name = "wpt-build", about = "Build the charger firmware for one board")]
struct Args {
    /// Build configuration profile.
    #[arg(long, value_enum, default_value_t = BuildConfig::Debug)]
    config: BuildConfig,

    /// Target board.
    #[arg(long, value_enum)]
    board: Board,

    /// Harness configuration file.
    #[arg(long, default_value = "harness.toml")]
    harness: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = HarnessConfig::load(&args.harness)?;
    preflight::check_build_tools(&config)?;

    let request = BuildRequest {
        config: args.config,
        board: args.board,
    };
    let run = workflow::run_build(&config, request)?;

    for path in run.manifest.files() {
        println!("{}", path.display());
    }

    if run.report.has_failures() {
        bail!("build finished with failures: {}", run.report.summary());
    }
    Ok(())
}
