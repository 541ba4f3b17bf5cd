//! Build artifact data model.
//!
//! This module provides the typed records threaded between the collection
//! and relocation steps:
//! - [`collect`] - purge stale outputs, stage the dependency image, rename
//! - [`relocate`] - move the artifact set into its stable directory
//!
//! File names follow a fixed contract consumed by downstream tools:
//! `<base><board>_v<major>.<minor>.<revision>_<8-hex-build-id>.<ext>`, with
//! the wireless-stack dependency image keeping its literal original name.

pub mod collect;
pub mod relocate;

use std::path::{Path, PathBuf};

use crate::config::Board;
use crate::version::FirmwareVersion;

/// Reserved base name of the wireless-stack dependency image.
pub const SOFTDEVICE_BASE_NAME: &str = "s140_nrf52_7.2.0_softdevice";

/// File name of the dependency image, kept verbatim through renaming.
pub const SOFTDEVICE_FILE_NAME: &str = "s140_nrf52_7.2.0_softdevice.hex";

/// The closed set of output file types produced by one build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Firmware image, Intel hex.
    Hex,
    /// Firmware image, raw binary.
    Bin,
    /// Debug symbol image.
    Elf,
    /// Linker map.
    Map,
}

impl ArtifactKind {
    /// Every kind handled by purge and rename.
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::Hex,
        ArtifactKind::Bin,
        ArtifactKind::Elf,
        ArtifactKind::Map,
    ];

    /// Kinds included in the manifest handed to downstream consumers.
    /// Debug symbols stay on disk but are excluded.
    pub const COLLECTIBLE: [ArtifactKind; 3] =
        [ArtifactKind::Hex, ArtifactKind::Bin, ArtifactKind::Map];

    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Hex => "hex",
            ArtifactKind::Bin => "bin",
            ArtifactKind::Elf => "elf",
            ArtifactKind::Map => "map",
        }
    }

    pub fn from_path(path: &Path) -> Option<ArtifactKind> {
        let ext = path.extension()?.to_str()?;
        Self::ALL.into_iter().find(|kind| kind.extension() == ext)
    }
}

/// An output file discovered in the build output directory.
#[derive(Clone, Debug)]
pub struct ArtifactRecord {
    pub path: PathBuf,
    pub kind: ArtifactKind,
    pub base_name: String,
}

impl ArtifactRecord {
    /// Classify a file by extension; `None` for anything outside the closed
    /// kind set or without a usable file stem.
    pub fn from_path(path: &Path) -> Option<Self> {
        let kind = ArtifactKind::from_path(path)?;
        let base_name = path.file_stem()?.to_str()?.to_string();
        Some(Self {
            path: path.to_path_buf(),
            kind,
            base_name,
        })
    }

    /// Whether this is the dependency image, which keeps its original name.
    pub fn is_dependency(&self) -> bool {
        self.base_name == SOFTDEVICE_BASE_NAME
    }

    /// Final file name embedding board, version and build identifier.
    pub fn renamed_file_name(&self, board: Board, version: &FirmwareVersion, build_id: &str) -> String {
        format!(
            "{}{}_v{}_{}.{}",
            self.base_name,
            board.name(),
            version,
            build_id,
            self.kind.extension()
        )
    }
}

/// Ordered list of final artifact paths in the relocated directory.
///
/// The manifest is always re-enumerated from disk at the relocation
/// boundary, never cached, so it reflects on-disk truth rather than
/// in-memory build state.
#[derive(Clone, Debug, Default)]
pub struct ArtifactManifest {
    files: Vec<PathBuf>,
}

impl ArtifactManifest {
    pub(crate) fn new(files: Vec<PathBuf>) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_path_covers_the_closed_set() {
        assert_eq!(
            ArtifactKind::from_path(Path::new("out/app.hex")),
            Some(ArtifactKind::Hex)
        );
        assert_eq!(
            ArtifactKind::from_path(Path::new("out/app.bin")),
            Some(ArtifactKind::Bin)
        );
        assert_eq!(
            ArtifactKind::from_path(Path::new("out/app.elf")),
            Some(ArtifactKind::Elf)
        );
        assert_eq!(
            ArtifactKind::from_path(Path::new("out/app.map")),
            Some(ArtifactKind::Map)
        );
        assert_eq!(ArtifactKind::from_path(Path::new("out/app.o")), None);
        assert_eq!(ArtifactKind::from_path(Path::new("out/app")), None);
    }

    #[test]
    fn record_embeds_board_version_and_build_id() {
        let record = ArtifactRecord::from_path(Path::new("out/app.hex")).unwrap();
        let version = FirmwareVersion {
            major: 1,
            minor: 2,
            revision: 3,
        };
        assert_eq!(
            record.renamed_file_name(Board::Devkit, &version, "abcdef12"),
            "appdevkit_v1.2.3_abcdef12.hex"
        );
    }

    #[test]
    fn dependency_image_is_recognized_by_base_name() {
        let record =
            ArtifactRecord::from_path(Path::new("out/s140_nrf52_7.2.0_softdevice.hex")).unwrap();
        assert!(record.is_dependency());

        let record = ArtifactRecord::from_path(Path::new("out/app.hex")).unwrap();
        assert!(!record.is_dependency());
    }
}
