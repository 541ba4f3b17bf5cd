//! Release archive packaging.
//!
//! Zips the artifact manifest of one build into a release archive with a
//! fixed naming contract:
//! `cbgm-fih-ie-firmware-archive-<board>-v<version>_<build-id>.zip`.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::artifact::ArtifactManifest;
use crate::config::Board;
use crate::version::FirmwareVersion;

/// Release archive file name for one build.
pub fn archive_file_name(board: Board, version: &FirmwareVersion, build_id: &str) -> String {
    format!(
        "cbgm-fih-ie-firmware-archive-{}-v{}_{}.zip",
        board.name(),
        version,
        build_id
    )
}

/// Zip the manifest into `<release_dir>/<archive_name>`.
///
/// Plain files land under their basenames; directory entries are walked
/// recursively with their relative structure preserved. An existing archive
/// of the same name is overwritten.
pub fn create_release_archive(
    manifest: &ArtifactManifest,
    release_dir: &Path,
    archive_name: &str,
) -> Result<PathBuf> {
    fs::create_dir_all(release_dir)
        .with_context(|| format!("creating release directory '{}'", release_dir.display()))?;

    let archive_path = release_dir.join(archive_name);
    let file = File::create(&archive_path)
        .with_context(|| format!("creating archive '{}'", archive_path.display()))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    for entry in manifest.files() {
        if entry.is_file() {
            let name = entry
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .with_context(|| format!("archive entry '{}' has no file name", entry.display()))?;
            append_file(&mut writer, entry, &name, options)?;
        } else if entry.is_dir() {
            for ent in WalkDir::new(entry).into_iter().filter_map(Result::ok) {
                if !ent.file_type().is_file() {
                    continue;
                }
                let rel = ent.path().strip_prefix(entry).unwrap_or(ent.path());
                let name = rel.to_string_lossy().replace('\\', "/");
                append_file(&mut writer, ent.path(), &name, options)?;
            }
        }
    }

    writer
        .finish()
        .with_context(|| format!("finalizing archive '{}'", archive_path.display()))?;
    info!("release archive written to '{}'", archive_path.display());
    Ok(archive_path)
}

fn append_file(
    writer: &mut ZipWriter<File>,
    path: &Path,
    name: &str,
    options: SimpleFileOptions,
) -> Result<()> {
    writer
        .start_file(name, options)
        .with_context(|| format!("starting archive entry '{}'", name))?;
    let mut src =
        File::open(path).with_context(|| format!("opening '{}' for archiving", path.display()))?;
    io::copy(&mut src, writer)
        .with_context(|| format!("archiving '{}'", path.display()))?;
    Ok(())
}
