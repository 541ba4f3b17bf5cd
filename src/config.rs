//! Harness configuration and build request types.
//!
//! The configuration file (`harness.toml`) carries the external tool paths
//! (build engine, IDE workspace, probe driver) and the source-tree locations
//! the harness reads and writes. Everything is loaded once into a
//! [`HarnessConfig`] value and passed by reference into each component; no
//! component re-reads the file mid-run.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Build configuration profile understood by the vendor engine.
///
/// The lowercase profile name doubles as the on-disk directory component for
/// build outputs and relocated artifact sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BuildConfig {
    Production,
    Manufacturing,
    Development,
    Debug,
}

impl BuildConfig {
    /// Engine profile name, also used in directory names.
    pub fn profile(self) -> &'static str {
        match self {
            BuildConfig::Production => "production",
            BuildConfig::Manufacturing => "manufacturing",
            BuildConfig::Development => "development",
            BuildConfig::Debug => "debug",
        }
    }
}

impl fmt::Display for BuildConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile())
    }
}

/// Target hardware identity, compiled into the firmware via a preprocessor
/// definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Board {
    Devkit,
    Pcba,
}

impl Board {
    /// Name embedded in artifact file names and directory names.
    pub fn name(self) -> &'static str {
        match self {
            Board::Devkit => "devkit",
            Board::Pcba => "pcba",
        }
    }

    /// Preprocessor token written into the shared config header.
    pub fn definition(self) -> &'static str {
        match self {
            Board::Devkit => "DEV_KIT",
            Board::Pcba => "PCBA",
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One build/flash/release request. Immutable once parsed from the CLI.
#[derive(Clone, Copy, Debug)]
pub struct BuildRequest {
    pub config: BuildConfig,
    pub board: Board,
}

impl BuildRequest {
    /// Directory name of the relocated artifact set: `<config>_<board>`.
    ///
    /// Downstream tools locate artifacts by this exact name; the format is a
    /// contract, not a convention.
    pub fn variant_dir_name(&self) -> String {
        format!("{}_{}", self.config.profile(), self.board.name())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct HarnessToml {
    engine: EngineToml,
    probe: ProbeToml,
    #[serde(default)]
    analysis: AnalysisToml,
    #[serde(default)]
    paths: PathsToml,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct AnalysisToml {
    cppcheck_path: Option<PathBuf>,
    source_dir: Option<PathBuf>,
    include_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EngineToml {
    embuild_path: PathBuf,
    workspace_path: PathBuf,
    project_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProbeToml {
    jlink_path: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PathsToml {
    version_header: Option<PathBuf>,
    board_header: Option<PathBuf>,
    softdevice_hex: Option<PathBuf>,
    build_output_root: Option<PathBuf>,
    artifacts_root: Option<PathBuf>,
    release_dir: Option<PathBuf>,
}

/// Loaded harness configuration with all paths resolved.
///
/// Relative source-tree paths are resolved against the directory containing
/// the configuration file (the firmware repo root). Tool paths are left
/// as-is so bare names still resolve through `PATH`.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Directory the configuration file lives in.
    pub repo_root: PathBuf,
    /// Vendor build engine binary.
    pub embuild_path: PathBuf,
    /// IDE workspace directory holding the `.emProject` file.
    pub workspace_path: PathBuf,
    /// Project name passed to the engine and used to find the flash image.
    pub project_name: String,
    /// Debug probe driver binary.
    pub jlink_path: PathBuf,
    /// Static analyzer binary.
    pub cppcheck_path: PathBuf,
    /// Source tree scanned by the analyzer.
    pub analysis_source_dir: PathBuf,
    /// Include directory handed to the analyzer.
    pub analysis_include_dir: PathBuf,
    /// Header carrying the `VER_MAJOR`/`VER_MINOR`/`VER_REVISION` directives.
    pub version_header: PathBuf,
    /// Shared config header carrying the `#define BOARD` directive.
    pub board_header: PathBuf,
    /// Pre-built wireless-stack image copied alongside the application.
    pub softdevice_hex: PathBuf,
    /// Root of the engine's per-profile output tree.
    pub build_output_root: PathBuf,
    /// Where relocated `<config>_<board>` artifact sets land.
    pub artifacts_root: PathBuf,
    /// Where release archives are written.
    pub release_dir: PathBuf,
}

impl HarnessConfig {
    /// Load and resolve the harness configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading harness config '{}'", path.display()))?;
        let parsed: HarnessToml = toml::from_str(&raw)
            .with_context(|| format!("parsing harness config '{}'", path.display()))?;

        let repo_root = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let analysis = parsed.analysis;
        let paths = parsed.paths;
        Ok(Self {
            embuild_path: parsed.engine.embuild_path,
            workspace_path: resolve(&repo_root, &parsed.engine.workspace_path),
            project_name: parsed.engine.project_name,
            jlink_path: parsed.probe.jlink_path,
            cppcheck_path: analysis
                .cppcheck_path
                .unwrap_or_else(|| PathBuf::from("cppcheck")),
            analysis_source_dir: resolve_or(&repo_root, analysis.source_dir, "src"),
            analysis_include_dir: resolve_or(&repo_root, analysis.include_dir, "include"),
            version_header: resolve_or(&repo_root, paths.version_header, "src/project/version.h"),
            board_header: resolve_or(&repo_root, paths.board_header, "src/project/config.h"),
            softdevice_hex: resolve_or(
                &repo_root,
                paths.softdevice_hex,
                "src/core_layer/sdk/nrf5/nRF5_SDK_17.1.0_ddde560/components/softdevice/s140/hex/s140_nrf52_7.2.0_softdevice.hex",
            ),
            build_output_root: resolve_or(
                &repo_root,
                paths.build_output_root,
                "src/project/project/Output",
            ),
            artifacts_root: resolve_or(&repo_root, paths.artifacts_root, "."),
            release_dir: resolve_or(&repo_root, paths.release_dir, "release"),
            repo_root,
        })
    }

    /// Engine output directory for one build configuration.
    pub fn build_output_dir(&self, config: BuildConfig) -> PathBuf {
        self.build_output_root.join(config.profile()).join("Exe")
    }

    /// Stable destination directory for one (configuration, board) pair.
    pub fn variant_dir(&self, request: BuildRequest) -> PathBuf {
        self.artifacts_root.join(request.variant_dir_name())
    }

    /// Path to the IDE project file inside the workspace.
    pub fn emproject_path(&self) -> PathBuf {
        self.workspace_path
            .join(format!("{}.emProject", self.project_name))
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

fn resolve_or(root: &Path, path: Option<PathBuf>, default: &str) -> PathBuf {
    match path {
        Some(p) => resolve(root, &p),
        None => root.join(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MINIMAL_TOML: &str = r#"
[engine]
embuild_path = "emBuild"
workspace_path = "workspace"
project_name = "wpt-charger"

[probe]
jlink_path = "JLinkExe"
"#;

    #[test]
    fn load_resolves_defaults_against_repo_root() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("harness.toml");
        fs::write(&config_path, MINIMAL_TOML).unwrap();

        let config = HarnessConfig::load(&config_path).unwrap();
        assert_eq!(config.repo_root, temp.path());
        assert_eq!(
            config.version_header,
            temp.path().join("src/project/version.h")
        );
        assert_eq!(config.workspace_path, temp.path().join("workspace"));
        assert_eq!(
            config.emproject_path(),
            temp.path().join("workspace/wpt-charger.emProject")
        );
        // Tool binaries stay unresolved so PATH lookup still works.
        assert_eq!(config.embuild_path, PathBuf::from("emBuild"));
        assert_eq!(config.cppcheck_path, PathBuf::from("cppcheck"));
        assert_eq!(config.analysis_source_dir, temp.path().join("src"));
        assert_eq!(config.analysis_include_dir, temp.path().join("include"));
    }

    #[test]
    fn analysis_section_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("harness.toml");
        fs::write(
            &config_path,
            format!("{MINIMAL_TOML}\n[analysis]\ncppcheck_path = \"/opt/cppcheck\"\nsource_dir = \"firmware/src\"\n"),
        )
        .unwrap();

        let config = HarnessConfig::load(&config_path).unwrap();
        assert_eq!(config.cppcheck_path, PathBuf::from("/opt/cppcheck"));
        assert_eq!(
            config.analysis_source_dir,
            temp.path().join("firmware/src")
        );
        assert_eq!(config.analysis_include_dir, temp.path().join("include"));
    }

    #[test]
    fn load_rejects_unknown_fields() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("harness.toml");
        fs::write(
            &config_path,
            format!("{MINIMAL_TOML}\n[paths]\nbogus_key = \"x\"\n"),
        )
        .unwrap();

        assert!(HarnessConfig::load(&config_path).is_err());
    }

    #[test]
    fn variant_dir_name_joins_config_and_board() {
        let request = BuildRequest {
            config: BuildConfig::Development,
            board: Board::Devkit,
        };
        assert_eq!(request.variant_dir_name(), "development_devkit");

        let request = BuildRequest {
            config: BuildConfig::Debug,
            board: Board::Pcba,
        };
        assert_eq!(request.variant_dir_name(), "debug_pcba");
    }

    #[test]
    fn board_definitions_match_tokens() {
        assert_eq!(Board::Devkit.definition(), "DEV_KIT");
        assert_eq!(Board::Pcba.definition(), "PCBA");
    }
}
