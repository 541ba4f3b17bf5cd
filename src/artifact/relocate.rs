//! Artifact relocation into the stable per-(configuration, board) directory.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

use super::{ArtifactKind, ArtifactManifest};

/// Move the per-configuration output directory to `destination`.
///
/// Any prior destination is deleted recursively first (replace, not merge),
/// so nothing from an earlier run can leak into the new artifact set. The
/// move itself is a single rename; an artifact root on a different
/// filesystem than the build output is a configuration error, not a case
/// to paper over with a copy.
pub fn relocate(output_dir: &Path, destination: &Path) -> Result<ArtifactManifest> {
    if destination.exists() {
        fs::remove_dir_all(destination).with_context(|| {
            format!(
                "removing previous artifact set '{}'",
                destination.display()
            )
        })?;
    }
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating artifact root '{}'", parent.display()))?;
    }

    fs::rename(output_dir, destination).with_context(|| {
        format!(
            "moving '{}' to '{}'",
            output_dir.display(),
            destination.display()
        )
    })?;
    info!("artifact set relocated to '{}'", destination.display());

    enumerate_manifest(destination)
}

/// Enumerate the collectible artifacts at `dir`, sorted by path.
///
/// Re-reads the directory rather than trusting in-memory state, so the
/// manifest reflects what is actually on disk. Debug symbol images stay on
/// disk but are excluded.
pub fn enumerate_manifest(dir: &Path) -> Result<ArtifactManifest> {
    let mut files = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("enumerating artifacts in '{}'", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match ArtifactKind::from_path(&path) {
            Some(kind) if ArtifactKind::COLLECTIBLE.contains(&kind) => files.push(path),
            _ => {}
        }
    }
    files.sort();
    Ok(ArtifactManifest::new(files))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{collect, SOFTDEVICE_FILE_NAME};
    use crate::config::Board;
    use crate::version::FirmwareVersion;
    use tempfile::TempDir;

    #[test]
    fn relocation_replaces_prior_destination_entirely() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("Exe");
        let dest = temp.path().join("development_devkit");
        fs::create_dir_all(&output).unwrap();
        fs::write(output.join("fresh.hex"), b"new").unwrap();

        // Leftovers from an unrelated prior run.
        fs::create_dir_all(dest.join("nested")).unwrap();
        fs::write(dest.join("leftover.bin"), b"old").unwrap();
        fs::write(dest.join("nested/leftover.map"), b"old").unwrap();

        let manifest = relocate(&output, &dest).unwrap();

        assert!(!output.exists());
        assert!(!dest.join("leftover.bin").exists());
        assert!(!dest.join("nested").exists());
        assert_eq!(manifest.files(), &[dest.join("fresh.hex")]);
    }

    #[test]
    fn manifest_excludes_debug_symbols() {
        let temp = TempDir::new().unwrap();
        for name in ["app.hex", "app.bin", "app.map", "app.elf", "readme.txt"] {
            fs::write(temp.path().join(name), b"x").unwrap();
        }

        let manifest = enumerate_manifest(temp.path()).unwrap();
        let names: Vec<_> = manifest
            .files()
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["app.bin", "app.hex", "app.map"]);
        // The elf stays on disk even though it is not in the manifest.
        assert!(temp.path().join("app.elf").exists());
    }

    /// Full collect-and-relocate pass over a simulated successful build.
    #[test]
    fn collected_artifacts_land_renamed_under_the_variant_directory() {
        let temp = TempDir::new().unwrap();
        let sdk = temp.path().join("sdk");
        let output = temp.path().join("Output/development/Exe");
        let dest = temp.path().join("development_devkit");
        fs::create_dir_all(&sdk).unwrap();
        fs::create_dir_all(&output).unwrap();
        let softdevice = sdk.join(SOFTDEVICE_FILE_NAME);
        fs::write(&softdevice, b"sd").unwrap();

        // What the engine would have produced.
        fs::write(output.join("app.hex"), b"h").unwrap();
        fs::write(output.join("app.bin"), b"b").unwrap();

        let version = FirmwareVersion {
            major: 1,
            minor: 2,
            revision: 3,
        };
        collect::stage_dependency(&softdevice, &output);
        collect::rename_outputs(&output, Board::Devkit, &version, "abcdef12");
        let manifest = relocate(&output, &dest).unwrap();

        let names: Vec<_> = manifest
            .files()
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "appdevkit_v1.2.3_abcdef12.bin",
                "appdevkit_v1.2.3_abcdef12.hex",
                SOFTDEVICE_FILE_NAME,
            ]
        );
    }
}
