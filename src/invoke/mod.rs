//! External build engine invocation with bounded retry and recovery.
//!
//! The vendor engine is flaky under stale-workspace conditions, so a failed
//! build attempt triggers a targeted recovery action (dropping the IDE
//! workspace index) before the single retry. The retry policy and the
//! recovery action are separate pieces so each can be exercised without a
//! vendor toolchain on the host.
//!
//! Both engine steps are synchronous and blocking with no timeout; a hung
//! engine blocks the whole workflow. The invoker owns the engine process
//! lifetime only, never the artifact files it produces.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{error, info, warn};

use crate::config::HarnessConfig;
use crate::report::StepStatus;

/// Attempts allowed for each of the clean and build steps.
pub const MAX_ATTEMPTS: u32 = 2;

/// Phases of one engine invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildPhase {
    Idle,
    Cleaning,
    Building,
    Succeeded,
    GaveUp,
}

/// Abstraction over the external build engine.
///
/// The engine reports pass/fail through its exit status only; its verbose
/// output goes straight to the console and never feeds control decisions.
pub trait BuildEngine {
    /// Remove previous build products for `profile`.
    fn clean(&mut self, profile: &str) -> Result<()>;

    /// Run a full rebuild of `profile`.
    fn rebuild(&mut self, profile: &str) -> Result<()>;
}

/// A targeted recovery step run between failed build attempts.
///
/// Declared as a precondition plus an action so the recovery and the retry
/// policy that triggers it stay independently testable.
pub trait RecoveryAction {
    fn describe(&self) -> String;

    /// Whether there is anything to recover from.
    fn precondition(&self) -> bool;

    fn recover(&mut self) -> Result<()>;
}

/// Deletes the IDE workspace metadata directory.
///
/// A stale workspace index is the known trigger for spurious engine
/// failures; removing `.metadata` forces a clean index on the next attempt
/// without a full environment teardown.
pub struct WorkspaceMetadataPurge {
    metadata_dir: PathBuf,
}

impl WorkspaceMetadataPurge {
    pub fn new(workspace: &Path) -> Self {
        Self {
            metadata_dir: workspace.join(".metadata"),
        }
    }
}

impl RecoveryAction for WorkspaceMetadataPurge {
    fn describe(&self) -> String {
        format!("remove workspace metadata '{}'", self.metadata_dir.display())
    }

    fn precondition(&self) -> bool {
        self.metadata_dir.exists()
    }

    fn recover(&mut self) -> Result<()> {
        fs::remove_dir_all(&self.metadata_dir)
            .with_context(|| format!("removing '{}'", self.metadata_dir.display()))
    }
}

/// The emBuild command-line engine.
pub struct EmBuildEngine {
    embuild: PathBuf,
    project: String,
    emproject: PathBuf,
}

impl EmBuildEngine {
    pub fn new(config: &HarnessConfig) -> Self {
        Self {
            embuild: config.embuild_path.clone(),
            project: config.project_name.clone(),
            emproject: config.emproject_path(),
        }
    }

    fn run(&self, profile: &str, mode: &str) -> Result<()> {
        info!(
            "running {} {} for profile '{}'",
            self.embuild.display(),
            mode,
            profile
        );
        let status = Command::new(&self.embuild)
            .arg("-config")
            .arg(profile)
            .arg(mode)
            .arg("-verbose")
            .arg("-time")
            .arg("-project")
            .arg(&self.project)
            .arg(&self.emproject)
            .status()
            .with_context(|| format!("running build engine '{}'", self.embuild.display()))?;
        if !status.success() {
            bail!("build engine exited with {}", status);
        }
        Ok(())
    }
}

impl BuildEngine for EmBuildEngine {
    fn clean(&mut self, profile: &str) -> Result<()> {
        self.run(profile, "-clean")
    }

    fn rebuild(&mut self, profile: &str) -> Result<()> {
        self.run(profile, "-rebuild")
    }
}

/// Drives the clean+build sequence through its phases.
pub struct BuildInvoker<E, R> {
    engine: E,
    recovery: R,
    phase: BuildPhase,
}

impl<E: BuildEngine, R: RecoveryAction> BuildInvoker<E, R> {
    pub fn new(engine: E, recovery: R) -> Self {
        Self {
            engine,
            recovery,
            phase: BuildPhase::Idle,
        }
    }

    pub fn phase(&self) -> BuildPhase {
        self.phase
    }

    /// Run the invocation to completion and report the terminal outcome.
    ///
    /// Clean failures are retried and then tolerated: the build step's own
    /// validation governs success. Build failures trigger the recovery
    /// action once, between the two attempts. Exhaustion is reported as a
    /// failed step rather than an error so the remaining collection steps
    /// still run; an engine that produced nothing simply leaves them no
    /// fresh outputs to handle.
    pub fn run(&mut self, profile: &str) -> StepStatus {
        self.phase = BuildPhase::Cleaning;
        let mut clean_failed = true;
        for attempt in 1..=MAX_ATTEMPTS {
            match self.engine.clean(profile) {
                Ok(()) => {
                    clean_failed = false;
                    break;
                }
                Err(e) => error!("engine clean attempt #{} failed: {:#}", attempt, e),
            }
        }
        if clean_failed {
            warn!("clean step never succeeded; continuing to build");
        }

        self.phase = BuildPhase::Building;
        for attempt in 1..=MAX_ATTEMPTS {
            match self.engine.rebuild(profile) {
                Ok(()) => {
                    self.phase = BuildPhase::Succeeded;
                    info!("engine build succeeded on attempt #{}", attempt);
                    return if clean_failed {
                        StepStatus::Degraded("clean step never succeeded".to_string())
                    } else {
                        StepStatus::Succeeded
                    };
                }
                Err(e) => {
                    error!("engine build attempt #{} failed: {:#}", attempt, e);
                    if attempt < MAX_ATTEMPTS {
                        self.try_recover();
                    }
                }
            }
        }

        self.phase = BuildPhase::GaveUp;
        StepStatus::Failed(format!("build engine failed after {} attempts", MAX_ATTEMPTS))
    }

    fn try_recover(&mut self) {
        if !self.recovery.precondition() {
            info!("recovery skipped, nothing to do: {}", self.recovery.describe());
            return;
        }
        info!("attempting recovery: {}", self.recovery.describe());
        match self.recovery.recover() {
            Ok(()) => info!("recovery completed"),
            Err(e) => warn!("recovery failed: {:#}", e),
        }
    }
}
