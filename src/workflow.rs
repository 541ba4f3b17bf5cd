//! The end-to-end build workflow.
//!
//! Sequential wiring of board selection, version resolution, engine
//! invocation, artifact collection and relocation. Everything runs on one
//! thread with blocking subprocess calls and no locking; concurrent
//! invocations against the same (configuration, board) pair must be
//! serialized by the caller.

use anyhow::{Context, Result};
use std::fs;
use tracing::{error, info};

use crate::artifact::{collect, relocate, ArtifactManifest};
use crate::board;
use crate::config::{BuildRequest, HarnessConfig};
use crate::invoke::{BuildInvoker, EmBuildEngine, WorkspaceMetadataPurge};
use crate::report::{StepStatus, WorkflowReport};
use crate::version::{self, FirmwareVersion};

/// Version and build identifier resolved once per run.
#[derive(Clone, Debug)]
pub struct ResolvedVersion {
    pub version: Option<FirmwareVersion>,
    pub build_id: Option<String>,
}

impl ResolvedVersion {
    pub fn resolve(config: &HarnessConfig) -> Self {
        Self {
            version: version::firmware_version(&config.version_header),
            build_id: version::build_id(&config.repo_root),
        }
    }

    /// Both parts, when the run is able to name artifacts.
    pub fn tag(&self) -> Option<(FirmwareVersion, &str)> {
        match (self.version, self.build_id.as_deref()) {
            (Some(version), Some(build_id)) => Some((version, build_id)),
            _ => None,
        }
    }
}

/// Everything one build run produced.
#[derive(Debug)]
pub struct BuildRun {
    pub report: WorkflowReport,
    pub manifest: ArtifactManifest,
    pub resolved: ResolvedVersion,
}

/// Run the full build workflow for `request`.
///
/// Most failures degrade the run instead of aborting it: an exhausted
/// engine, an unresolved version or a stuck rename all get recorded in the
/// report while the remaining steps continue. Only filesystem-level
/// problems that make the artifact contract impossible (no output
/// directory, failed relocation) abort with an error.
pub fn run_build(config: &HarnessConfig, request: BuildRequest) -> Result<BuildRun> {
    let mut report = WorkflowReport::new();
    info!(
        "building '{}' profile '{}' for board '{}'",
        config.project_name,
        request.config.profile(),
        request.board.name()
    );

    board::select_board(&config.board_header, request.board)
        .context("selecting board variant")?;
    report.record("board-config", StepStatus::Succeeded);

    let resolved = ResolvedVersion::resolve(config);
    match resolved.tag() {
        Some((version, build_id)) => {
            info!(
                "building version {} build {} ({}_{})",
                version,
                build_id,
                request.config.profile(),
                request.board.name()
            );
            report.record("version", StepStatus::Succeeded);
        }
        None => report.record(
            "version",
            StepStatus::Failed("firmware version or build identifier unresolved".to_string()),
        ),
    }

    let output_dir = config.build_output_dir(request.config);
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("creating build output directory '{}'", output_dir.display()))?;

    report.record("purge", collect::purge_stale_outputs(&output_dir));

    let engine = EmBuildEngine::new(config);
    let recovery = WorkspaceMetadataPurge::new(&config.workspace_path);
    let mut invoker = BuildInvoker::new(engine, recovery);
    report.record("build", invoker.run(request.config.profile()));

    report.record(
        "dependency",
        collect::stage_dependency(&config.softdevice_hex, &output_dir),
    );

    match resolved.tag() {
        Some((version, build_id)) => report.record(
            "rename",
            collect::rename_outputs(&output_dir, request.board, &version, build_id),
        ),
        None => {
            error!("skipping artifact rename: firmware version or build identifier unresolved");
            report.record(
                "rename",
                StepStatus::Degraded("skipped, version unresolved".to_string()),
            );
        }
    }

    let destination = config.variant_dir(request);
    let manifest =
        relocate::relocate(&output_dir, &destination).context("relocating build artifacts")?;
    report.record("relocate", StepStatus::Succeeded);

    info!("build workflow finished: {}", report.summary());
    Ok(BuildRun {
        report,
        manifest,
        resolved,
    })
}
