//! Firmware version and build identifier resolution.
//!
//! The firmware version lives in a C header as three `#define` directives;
//! the build identifier is the short form of the current git revision. Both
//! resolvers return `None` instead of erroring: an absent value degrades the
//! run (artifact renaming and archive naming are skipped) rather than
//! aborting it, and callers must never substitute a default.

use std::fmt;
use std::fs;
use std::path::Path;
use std::process::Command;
use tracing::{error, info};

/// Marker substrings matched against each line of the version header.
const VER_MAJOR_MARKER: &str = "VER_MAJOR";
const VER_MINOR_MARKER: &str = "VER_MINOR";
const VER_REVISION_MARKER: &str = "VER_REVISION";

/// Characters of the git revision kept as the build identifier.
const BUILD_ID_LEN: usize = 8;

/// Semantic firmware version parsed from the version header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    pub revision: u8,
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.revision)
    }
}

/// Resolve the firmware version from the version header.
///
/// Scans line-by-line for the `VER_MAJOR`, `VER_MINOR` and `VER_REVISION`
/// markers and takes the first decimal digit on each matching line. All
/// three must be found or resolution fails as a unit; there is no partial
/// version. Returns `None` when the header cannot be read or a marker is
/// missing.
///
/// Only the first digit on a matching line is used, so multi-digit version
/// components are not supported. Versions are single-digit by project
/// convention; widening the extraction rule is a product decision, not a
/// fix.
pub fn firmware_version(header: &Path) -> Option<FirmwareVersion> {
    let content = match fs::read_to_string(header) {
        Ok(content) => content,
        Err(e) => {
            error!("failed to read version header '{}': {}", header.display(), e);
            return None;
        }
    };

    let mut major = None;
    let mut minor = None;
    let mut revision = None;
    for line in content.lines() {
        if line.contains(VER_MAJOR_MARKER) {
            major = first_digit(line);
        } else if line.contains(VER_MINOR_MARKER) {
            minor = first_digit(line);
        } else if line.contains(VER_REVISION_MARKER) {
            revision = first_digit(line);
        }
    }

    match (major, minor, revision) {
        (Some(major), Some(minor), Some(revision)) => {
            let version = FirmwareVersion {
                major,
                minor,
                revision,
            };
            info!("firmware version: {}", version);
            Some(version)
        }
        _ => {
            error!(
                "version header '{}' is missing one or more of {}/{}/{}",
                header.display(),
                VER_MAJOR_MARKER,
                VER_MINOR_MARKER,
                VER_REVISION_MARKER
            );
            None
        }
    }
}

/// Resolve the short build identifier from the current git revision.
///
/// Returns the first 8 characters of `git rev-parse HEAD` run in
/// `repo_dir`, or `None` when the query fails (not a checkout, git missing).
/// The identifier is an opaque disambiguating tag; nothing ever parses it
/// back.
pub fn build_id(repo_dir: &Path) -> Option<String> {
    let output = match Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(repo_dir)
        .output()
    {
        Ok(output) => output,
        Err(e) => {
            error!("failed to run git rev-parse: {}", e);
            return None;
        }
    };

    if !output.status.success() {
        error!(
            "git rev-parse failed in '{}' with {}",
            repo_dir.display(),
            output.status
        );
        return None;
    }

    let revision = String::from_utf8_lossy(&output.stdout);
    let id = short_revision(revision.trim());
    info!("build identifier: {}", id);
    Some(id)
}

/// Truncate a revision string to the build identifier length.
fn short_revision(revision: &str) -> String {
    revision.chars().take(BUILD_ID_LEN).collect()
}

fn first_digit(line: &str) -> Option<u8> {
    line.chars()
        .find(char::is_ascii_digit)
        .map(|c| c as u8 - b'0')
}
