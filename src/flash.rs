//! Probe flashing workflow.
//!
//! Locates the two required images in the relocated artifact directory,
//! renders a J-Link command script and hands it to the probe driver. Unlike
//! the build workflow, missing inputs here are fatal: flashing proceeds
//! with both images or not at all.

use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;

use crate::artifact::SOFTDEVICE_FILE_NAME;
use crate::config::{BuildRequest, HarnessConfig};

/// Flash offset of the wireless-stack dependency image.
pub const SOFTDEVICE_FLASH_OFFSET: &str = "0x00000000";

/// Flash offset of the application image.
pub const APPLICATION_FLASH_OFFSET: &str = "0x00027000";

/// Name of the generated probe command file.
pub const PROBE_SCRIPT_FILE_NAME: &str = "jlink_connect_wpt_charger_profile.jlink";

/// The two images required at flash time.
#[derive(Clone, Debug)]
pub struct FlashImages {
    pub softdevice: PathBuf,
    pub application: PathBuf,
}

/// Locate the dependency and application images for `request`.
///
/// The dependency image is matched by its literal reserved name; the
/// application image is the binary carrying the project name and the
/// board/version tag. Either one missing is an error and the probe is
/// never invoked.
pub fn locate_images(
    variant_dir: &Path,
    project_name: &str,
    request: BuildRequest,
) -> Result<FlashImages> {
    let softdevice = variant_dir.join(SOFTDEVICE_FILE_NAME);
    if !softdevice.is_file() {
        bail!(
            "dependency image '{}' not found in '{}'",
            SOFTDEVICE_FILE_NAME,
            variant_dir.display()
        );
    }

    let application = find_application_image(variant_dir, project_name, request)?.ok_or_else(|| {
        anyhow!(
            "no application image for project '{}' and board '{}' in '{}'",
            project_name,
            request.board.name(),
            variant_dir.display()
        )
    })?;

    Ok(FlashImages {
        softdevice,
        application,
    })
}

fn find_application_image(
    variant_dir: &Path,
    project_name: &str,
    request: BuildRequest,
) -> Result<Option<PathBuf>> {
    let board_tag = format!("{}_v", request.board.name());
    let mut matches = Vec::new();

    for entry in fs::read_dir(variant_dir)
        .with_context(|| format!("reading artifact directory '{}'", variant_dir.display()))?
    {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with(project_name) && name.contains(&board_tag) && name.ends_with(".bin") {
            matches.push(path);
        }
    }

    matches.sort();
    Ok(matches.into_iter().next())
}

/// Render the probe command script that writes both images.
///
/// The command sequence and flash offsets are fixed; only the image paths
/// vary per build.
pub fn render_probe_script(images: &FlashImages) -> String {
    format!(
        "device nRF52840_xxAA\n\
         USB\n\
         si SWD\n\
         speed 4000\n\
         jtagconf -1,-1\n\
         connect\n\
         st\n\
         h\n\
         erase 0 0 noreset\n\
         loadfile {sd} {sd_off}\n\
         verifybin {sd} {sd_off}\n\
         Sleep 100\n\
         loadfile {app} {app_off}\n\
         verifybin {app} {app_off}\n\
         r\n\
         exit\n",
        sd = images.softdevice.display(),
        sd_off = SOFTDEVICE_FLASH_OFFSET,
        app = images.application.display(),
        app_off = APPLICATION_FLASH_OFFSET,
    )
}

/// Flash the artifacts of one (configuration, board) pair.
pub fn flash(config: &HarnessConfig, request: BuildRequest) -> Result<()> {
    let variant_dir = config.variant_dir(request);
    info!("flashing artifacts from '{}'", variant_dir.display());

    let images = locate_images(&variant_dir, &config.project_name, request)?;
    info!("dependency image: '{}'", images.softdevice.display());
    info!("application image: '{}'", images.application.display());

    let script_path = variant_dir.join(PROBE_SCRIPT_FILE_NAME);
    fs::write(&script_path, render_probe_script(&images))
        .with_context(|| format!("writing probe command file '{}'", script_path.display()))?;
    info!("probe command file written to '{}'", script_path.display());

    let status = Command::new(&config.jlink_path)
        .arg("-CommandFile")
        .arg(&script_path)
        .status()
        .with_context(|| format!("running probe driver '{}'", config.jlink_path.display()))?;
    if !status.success() {
        bail!("probe driver exited with {}", status);
    }

    info!("firmware flashed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Board, BuildConfig};
    use tempfile::TempDir;

    fn request() -> BuildRequest {
        BuildRequest {
            config: BuildConfig::Development,
            board: Board::Devkit,
        }
    }

    #[test]
    fn locates_both_required_images() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(SOFTDEVICE_FILE_NAME), b"sd").unwrap();
        fs::write(
            temp.path().join("wpt-chargerdevkit_v1.2.3_abcdef12.bin"),
            b"app",
        )
        .unwrap();

        let images = locate_images(temp.path(), "wpt-charger", request()).unwrap();
        assert_eq!(
            images.application.file_name().unwrap(),
            "wpt-chargerdevkit_v1.2.3_abcdef12.bin"
        );
        assert_eq!(images.softdevice.file_name().unwrap(), SOFTDEVICE_FILE_NAME);
    }

    #[test]
    fn missing_application_image_is_fatal() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(SOFTDEVICE_FILE_NAME), b"sd").unwrap();

        let result = locate_images(temp.path(), "wpt-charger", request());
        assert!(result.is_err());
    }

    #[test]
    fn missing_dependency_image_is_fatal() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("wpt-chargerdevkit_v1.2.3_abcdef12.bin"),
            b"app",
        )
        .unwrap();

        let result = locate_images(temp.path(), "wpt-charger", request());
        assert!(result.is_err());
    }

    #[test]
    fn other_boards_images_do_not_match() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(SOFTDEVICE_FILE_NAME), b"sd").unwrap();
        fs::write(
            temp.path().join("wpt-chargerpcba_v1.2.3_abcdef12.bin"),
            b"app",
        )
        .unwrap();

        let result = locate_images(temp.path(), "wpt-charger", request());
        assert!(result.is_err());
    }

    #[test]
    fn probe_script_targets_fixed_offsets() {
        let images = FlashImages {
            softdevice: PathBuf::from("/fw/s140_nrf52_7.2.0_softdevice.hex"),
            application: PathBuf::from("/fw/appdevkit_v1.2.3_abcdef12.bin"),
        };
        let script = render_probe_script(&images);

        assert!(script.starts_with("device nRF52840_xxAA\n"));
        assert!(script.contains("si SWD\n"));
        assert!(script.contains("erase 0 0 noreset\n"));
        assert!(script
            .contains("loadfile /fw/s140_nrf52_7.2.0_softdevice.hex 0x00000000\n"));
        assert!(script.contains("verifybin /fw/appdevkit_v1.2.3_abcdef12.bin 0x00027000\n"));
        assert!(script.ends_with("r\nexit\n"));
    }
}
