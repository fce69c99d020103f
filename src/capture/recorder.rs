use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::capture::process::{CommandSpec, ExitOutcome, ProcessHandle, ProcessLauncher};
use crate::foundation::error::SpecterResult;

/// Lifecycle of a capture session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Capturing,
    Stopped,
}

/// Owns at most one capture process writing to a fixed output file.
///
/// Starting a new session first terminates and reaps the previous one, so two writers never
/// share the output file.
pub struct RecorderSession {
    launcher: Arc<dyn ProcessLauncher>,
    command: CommandSpec,
    output: PathBuf,
    handle: Option<Box<dyn ProcessHandle>>,
    phase: SessionPhase,
}

impl RecorderSession {
    /// `command` may reference the output file as `{output}`.
    pub fn new(launcher: Arc<dyn ProcessLauncher>, command: CommandSpec, output: impl Into<PathBuf>) -> Self {
        Self {
            launcher,
            command,
            output: output.into(),
            handle: None,
            phase: SessionPhase::Idle,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn is_capturing(&self) -> bool {
        self.handle.is_some()
    }

    /// Begin capturing. A still-running session is stopped first.
    pub fn start(&mut self) -> SpecterResult<()> {
        if self.handle.is_some() {
            self.stop()?;
        }
        if let Some(parent) = self.output.parent().filter(|p| !p.as_os_str().is_empty())
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            tracing::warn!(dir = %parent.display(), error = %e, "cannot create capture directory");
        }
        let output = self.output.to_string_lossy().into_owned();
        let cmd = self.command.substitute(&[("output", output.as_str())]);
        let handle = self.launcher.spawn(&cmd)?;
        tracing::info!(pid = handle.id(), output = %self.output.display(), "capture started");
        self.handle = Some(handle);
        self.phase = SessionPhase::Capturing;
        Ok(())
    }

    /// Terminate and reap the capture process. Returns `None` if nothing was running.
    pub fn stop(&mut self) -> SpecterResult<Option<ExitOutcome>> {
        let Some(mut handle) = self.handle.take() else {
            return Ok(None);
        };
        self.phase = SessionPhase::Stopped;
        let done = handle.terminate()?;
        tracing::info!(pid = handle.id(), code = ?done.code, "capture stopped");
        Ok(Some(done))
    }
}

impl Drop for RecorderSession {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!(error = %e, "failed to stop capture on drop");
        }
    }
}
