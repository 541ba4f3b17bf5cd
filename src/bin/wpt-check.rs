//! Run the static analyzer over the firmware source tree.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use wpt_harness::config::HarnessConfig;
use wpt_harness::report::StepStatus;
use wpt_harness::{analysis, preflight};

#[derive(Parser)]
#[command(name = "wpt-check", about = "Run static analysis over the charger firmware sources")]
struct Args {
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
    preflight::check_analysis_tools(&config)?;

    // Findings are advisory; only an unstartable analyzer is fatal.
    if let StepStatus::Degraded(reason) = analysis::run_analysis(&config)? {
        warn!("static analysis completed with findings: {}", reason);
    }
    Ok(())
}
