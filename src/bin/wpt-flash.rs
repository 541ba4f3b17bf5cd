//! Flash the relocated artifacts of one (configuration, board) pair.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use wpt_harness::config::{Board, BuildConfig, BuildRequest, HarnessConfig};
use wpt_harness::{flash, preflight};

#[derive(Parser)]
#[command(name = "wpt-flash", about = "Flash built charger firmware over a debug probe")]
struct Args {
    /// Build configuration profile the artifacts were built with.
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
    preflight::check_flash_tools(&config)?;

    let request = BuildRequest {
        config: args.config,
        board: args.board,
    };
    flash::flash(&config, request)
}
