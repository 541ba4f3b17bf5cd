//! Build, flash and release automation for the WPT charger firmware.
//!
//! The harness wraps the vendor toolchain (SEGGER emBuild, J-Link) behind
//! three workflows:
//!
//! - **build**: configure the target board, invoke the engine with bounded
//!   retry, collect and rename the outputs, and relocate them to a stable
//!   per-(configuration, board) directory.
//! - **flash**: locate the relocated images and drive the debug probe.
//! - **release**: run a build and zip its artifact manifest into a release
//!   archive.
//! - **check**: run the static analyzer over the firmware sources.
//!
//! Each workflow is a thin sequence over the modules below; the binaries in
//! `src/bin/` only parse arguments and pick the workflow.

pub mod analysis;
pub mod archive;
pub mod artifact;
pub mod board;
pub mod config;
pub mod flash;
pub mod invoke;
pub mod preflight;
pub mod report;
pub mod version;
pub mod workflow;

pub use artifact::ArtifactManifest;
pub use config::{Board, BuildConfig, BuildRequest, HarnessConfig};
pub use report::{StepStatus, WorkflowReport};
