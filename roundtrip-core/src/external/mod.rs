// ============================================================================
// roundtrip-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with External Executables
//
// This module encapsulates the harness's two kinds of external collaborators:
// the codec executables (encoder and decoder, run synchronously to completion
// via ToolRunner) and the media engine backend (pipeline construction and
// event stream, in the sidecar submodule).
//
// The traits exist for dependency injection: tests provide their own
// implementations so no external binary is needed to exercise the
// orchestration logic.

use crate::error::{CoreError, CoreResult};
use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

/// Contains the ffmpeg-sidecar pipeline backend
pub mod sidecar;

pub use sidecar::{SidecarPipeline, SidecarPipelineBuilder};

/// Runs an external executable synchronously and reports its exit status.
///
/// Invocation blocks the calling orchestration step until the process
/// terminates. A non-zero exit is reported, never retried.
pub trait ToolRunner {
    fn run(&self, executable: &Path, args: &[String]) -> CoreResult<ExitStatus>;
}

/// Standard implementation of [`ToolRunner`] using `std::process::Command`.
///
/// The tool's own stdout is irrelevant to the harness (only the exit status
/// matters), so it is discarded; stderr is passed through for the operator.
#[derive(Debug, Clone, Default)]
pub struct CommandToolRunner;

impl ToolRunner for CommandToolRunner {
    fn run(&self, executable: &Path, args: &[String]) -> CoreResult<ExitStatus> {
        log::info!("Running {} {}", executable.display(), args.join(" "));

        let status = Command::new(executable)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()
            .map_err(|source| CoreError::CommandStart {
                tool: executable.display().to_string(),
                source,
            })?;

        log::debug!("{} exited with {}", executable.display(), status);
        Ok(status)
    }
}

/// Checks that a required external command is available and executable by
/// probing it with `-version`.
pub(crate) fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {cmd_name}");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{cmd_name}' not found.");
            Err(CoreError::CommandStart {
                tool: cmd_name.to_string(),
                source: e,
            })
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{cmd_name}': {e}");
            Err(CoreError::CommandStart {
                tool: cmd_name.to_string(),
                source: e,
            })
        }
    }
}
