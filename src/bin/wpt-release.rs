//! Build one (configuration, board) pair and package a release archive.

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use wpt_harness::config::{Board, BuildConfig, BuildRequest, HarnessConfig};
use wpt_harness::{archive, preflight, workflow};

#[derive(Parser)]
#[command(
    name = "wpt-release",
    about = "Build the charger firmware and package a release archive"
)]
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

    match run.resolved.tag() {
        Some((version, build_id)) => {
            let name = archive::archive_file_name(request.board, &version, build_id);
            let path = archive::create_release_archive(&run.manifest, &config.release_dir, &name)?;
            info!("release packaged: '{}'", path.display());
            println!("{}", path.display());
        }
        None => {
            // Without a version there is no archive name to honor.
            error!("skipping release archive: firmware version or build identifier unresolved");
        }
    }

    if run.report.has_failures() {
        bail!("release build finished with failures: {}", run.report.summary());
    }
    Ok(())
}
