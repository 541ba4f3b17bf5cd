//! Artifact collection: purge stale outputs, stage the dependency image,
//! rename fresh outputs.
//!
//! Each phase is individually fault tolerant. A failure on one file is
//! logged and the remaining files are still processed; only the phase
//! outcome as a whole is reported back to the workflow.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::{ArtifactKind, ArtifactRecord, SOFTDEVICE_FILE_NAME};
use crate::config::Board;
use crate::report::StepStatus;
use crate::version::FirmwareVersion;

/// Enumerate files of one kind in `dir`, sorted by name.
fn files_of_kind(dir: &Path, kind: ArtifactKind) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("reading output directory '{}'", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && ArtifactKind::from_path(&path) == Some(kind) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Delete every pre-existing output file of the four known kinds.
///
/// Stale artifacts from an earlier failed build must not be mistaken for
/// fresh output. Deletions are independent; failures are logged and counted
/// but never block the remaining files.
pub fn purge_stale_outputs(output_dir: &Path) -> StepStatus {
    let mut removed = 0usize;
    let mut failures = 0usize;

    for kind in ArtifactKind::ALL {
        let files = match files_of_kind(output_dir, kind) {
            Ok(files) => files,
            Err(e) => {
                warn!("could not enumerate stale .{} files: {:#}", kind.extension(), e);
                failures += 1;
                continue;
            }
        };
        for file in files {
            match fs::remove_file(&file) {
                Ok(()) => {
                    info!("removed stale artifact '{}'", file.display());
                    removed += 1;
                }
                Err(e) => {
                    warn!("could not remove stale artifact '{}': {}", file.display(), e);
                    failures += 1;
                }
            }
        }
    }

    info!("purged {} stale artifacts", removed);
    if failures == 0 {
        StepStatus::Succeeded
    } else {
        StepStatus::Degraded(format!("{} stale artifacts left behind", failures))
    }
}

/// Copy the wireless-stack dependency image into the output directory.
///
/// The image is required alongside the application at flash time but is
/// never rebuilt here; it ships pre-built in the SDK tree.
pub fn stage_dependency(softdevice: &Path, output_dir: &Path) -> StepStatus {
    let dest = output_dir.join(SOFTDEVICE_FILE_NAME);
    match fs::copy(softdevice, &dest) {
        Ok(_) => {
            info!("staged dependency image at '{}'", dest.display());
            StepStatus::Succeeded
        }
        Err(e) => StepStatus::Failed(format!(
            "copying dependency image '{}' to '{}': {}",
            softdevice.display(),
            dest.display(),
            e
        )),
    }
}

/// Rename fresh outputs to embed board, version and build identifier.
///
/// The dependency image is matched by its reserved base name and never
/// renamed. Each rename is attempted independently; a failure is logged
/// and does not block sibling files.
pub fn rename_outputs(
    output_dir: &Path,
    board: Board,
    version: &FirmwareVersion,
    build_id: &str,
) -> StepStatus {
    let mut renamed = 0usize;
    let mut failures = 0usize;

    for kind in ArtifactKind::ALL {
        let files = match files_of_kind(output_dir, kind) {
            Ok(files) => files,
            Err(e) => {
                warn!("could not enumerate .{} outputs: {:#}", kind.extension(), e);
                failures += 1;
                continue;
            }
        };
        for file in files {
            let Some(record) = ArtifactRecord::from_path(&file) else {
                continue;
            };
            if record.is_dependency() {
                continue;
            }
            let new_path = output_dir.join(record.renamed_file_name(board, version, build_id));
            match fs::rename(&record.path, &new_path) {
                Ok(()) => {
                    info!(
                        "renamed '{}' to '{}'",
                        record.path.display(),
                        new_path.display()
                    );
                    renamed += 1;
                }
                Err(e) => {
                    warn!(
                        "could not rename '{}' to '{}': {}",
                        record.path.display(),
                        new_path.display(),
                        e
                    );
                    failures += 1;
                }
            }
        }
    }

    info!("renamed {} artifacts", renamed);
    if failures == 0 {
        StepStatus::Succeeded
    } else {
        StepStatus::Degraded(format!("{} artifacts kept their original names", failures))
    }
}
