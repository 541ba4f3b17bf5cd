//! Static analysis over the firmware source tree.
//!
//! Wraps the cppcheck analyzer with a fixed flag set. Findings are a
//! log-and-continue matter: the analyzer's diagnostics go to the console
//! and the run is reported degraded, never aborted. Only a failure to
//! start the analyzer at all is an error.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;
use tracing::{error, info};

use crate::config::HarnessConfig;
use crate::report::StepStatus;

/// Run the analyzer over the configured source tree.
pub fn run_analysis(config: &HarnessConfig) -> Result<StepStatus> {
    run_analyzer(
        &config.cppcheck_path,
        &config.analysis_source_dir,
        &config.analysis_include_dir,
    )
}

fn run_analyzer(tool: &Path, source: &Path, include: &Path) -> Result<StepStatus> {
    info!(
        "running static analysis on '{}' with '{}'",
        source.display(),
        tool.display()
    );
    let status = Command::new(tool)
        .args(analyzer_args(source, include))
        .status()
        .with_context(|| format!("running static analyzer '{}'", tool.display()))?;

    if status.success() {
        info!("static analysis passed");
        Ok(StepStatus::Succeeded)
    } else {
        error!("static analyzer exited with {}", status);
        Ok(StepStatus::Degraded(format!(
            "analyzer exited with {}",
            status
        )))
    }
}

/// Fixed analyzer invocation; only the source and include paths vary.
fn analyzer_args(source: &Path, include: &Path) -> Vec<OsString> {
    let mut include_flag = OsString::from("-I");
    include_flag.push(include);
    vec![
        OsString::from("--enable=all"),
        include_flag,
        OsString::from("--quiet"),
        OsString::from("--inconclusive"),
        OsString::from("--suppress=missingIncludeSystem"),
        source.as_os_str().to_os_string(),
    ]
}
