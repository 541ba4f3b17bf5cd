//! Preflight checks for workflow validation.
//!
//! Validates that the external tools a workflow shells out to are present
//! before it starts. This prevents cryptic subprocess errors halfway
//! through a run.

use anyhow::{bail, Result};
use std::path::Path;

use crate::config::HarnessConfig;

/// Check that a tool binary exists, either at an explicit path or on PATH.
pub fn tool_exists(tool: &Path) -> bool {
    if tool.components().count() > 1 {
        tool.is_file()
    } else {
        which::which(tool).is_ok()
    }
}

/// Check that specific tools are available.
///
/// Each tuple is (binary, role shown in the error message).
pub fn check_required_tools(tools: &[(&Path, &str)]) -> Result<()> {
    let missing: Vec<String> = tools
        .iter()
        .filter(|(tool, _)| !tool_exists(tool))
        .map(|(tool, role)| format!("  {} ({})", tool.display(), role))
        .collect();

    if !missing.is_empty() {
        bail!("missing required host tools:\n{}", missing.join("\n"));
    }
    Ok(())
}

/// Tools required by the build workflow.
pub fn check_build_tools(config: &HarnessConfig) -> Result<()> {
    check_required_tools(&[
        (&config.embuild_path, "vendor build engine"),
        (Path::new("git"), "source-control query"),
    ])
}

/// Tools required by the flash workflow.
pub fn check_flash_tools(config: &HarnessConfig) -> Result<()> {
    check_required_tools(&[(&config.jlink_path, "debug probe driver")])
}

/// Tools required by the static analysis workflow.
pub fn check_analysis_tools(config: &HarnessConfig) -> Result<()> {
    check_required_tools(&[(&config.cppcheck_path, "static analyzer")])
}
