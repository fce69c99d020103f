use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::capture::process::CommandSpec;
use crate::foundation::error::{SpecterError, SpecterResult};

/// Answer produced for one captured clip.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize)]
pub struct Description {
    #[serde(default)]
    pub text: Option<String>,
    /// Synthesized speech to play back.
    #[serde(default)]
    pub audio: Option<PathBuf>,
}

/// Remote describer for captured audio. Every failure is a [`SpecterError::Service`].
pub trait DescriptionService: Send {
    fn describe(&self, audio: &Path) -> SpecterResult<Description>;
}

/// Used when no helper is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableService;

impl DescriptionService for UnavailableService {
    fn describe(&self, _audio: &Path) -> SpecterResult<Description> {
        Err(SpecterError::service("no description helper configured"))
    }
}

/// Description service settings.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DescribeConfig {
    /// Helper invoked with `{audio}` and `{answer}` placeholders.
    pub command: Option<CommandSpec>,
    pub timeout_ms: u64,
    pub answer_path: PathBuf,
}

impl Default for DescribeConfig {
    fn default() -> Self {
        Self {
            command: None,
            timeout_ms: 60_000,
            answer_path: PathBuf::from("data/answer.wav"),
        }
    }
}

/// Runs an external helper that talks to the cloud API.
///
/// The helper prints either a JSON object `{"text": ..., "audio": ...}` or plain text. When it
/// names no audio file, the configured answer path is used if the helper created it.
#[derive(Clone, Debug)]
pub struct CommandDescriptionService {
    command: CommandSpec,
    timeout: Duration,
    answer: PathBuf,
}

impl CommandDescriptionService {
    pub fn new(command: CommandSpec, timeout: Duration, answer: impl Into<PathBuf>) -> Self {
        Self {
            command,
            timeout,
            answer: answer.into(),
        }
    }

    /// Build from config; falls back to [`UnavailableService`] without a helper.
    pub fn from_config(cfg: &DescribeConfig) -> Box<dyn DescriptionService> {
        match &cfg.command {
            Some(cmd) => Box::new(Self::new(
                cmd.clone(),
                Duration::from_millis(cfg.timeout_ms),
                cfg.answer_path.clone(),
            )),
            None => Box::new(UnavailableService),
        }
    }

    fn run(&self, audio: &Path) -> SpecterResult<String> {
        let audio = audio.to_string_lossy();
        let answer = self.answer.to_string_lossy();
        let cmd = self
            .command
            .substitute(&[("audio", audio.as_ref()), ("answer", answer.as_ref())]);

        let mut child = Command::new(&cmd.program)
            .args(&cmd.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| SpecterError::service(format!("failed to spawn '{}': {e}", cmd.display())))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| SpecterError::service("failed to open helper stdout"))?;
        let reader = std::thread::spawn(move || {
            let mut out = String::new();
            stdout.read_to_string(&mut out).map(|_| out)
        });

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(SpecterError::service(format!(
                        "helper timed out after {} ms",
                        self.timeout.as_millis()
                    )));
                }
                Ok(None) => std::thread::sleep(Duration::from_millis(20)),
                Err(e) => return Err(SpecterError::service(format!("failed to poll helper: {e}"))),
            }
        };
        if !status.success() {
            return Err(SpecterError::service(format!("helper exited with {status}")));
        }
        reader
            .join()
            .map_err(|_| SpecterError::service("helper output reader panicked"))?
            .map_err(|e| SpecterError::service(format!("failed to read helper output: {e}")))
    }
}

impl DescriptionService for CommandDescriptionService {
    fn describe(&self, audio: &Path) -> SpecterResult<Description> {
        if self.answer.exists()
            && let Err(e) = std::fs::remove_file(&self.answer)
        {
            tracing::warn!(path = %self.answer.display(), error = %e, "cannot remove stale answer audio");
        }
        let stdout = self.run(audio)?;
        let mut description = parse_output(&stdout)?;
        if description.audio.is_none() && self.answer.exists() {
            description.audio = Some(self.answer.clone());
        }
        if description.text.is_none() && description.audio.is_none() {
            return Err(SpecterError::service("helper returned neither text nor audio"));
        }
        Ok(description)
    }
}

/// Parse helper stdout: a JSON object, or plain text.
pub fn parse_output(stdout: &str) -> SpecterResult<Description> {
    let trimmed = stdout.trim();
    if trimmed.starts_with('{') {
        let mut d: Description = serde_json::from_str(trimmed)
            .map_err(|e| SpecterError::service(format!("malformed helper payload: {e}")))?;
        d.text = d.text.filter(|t| !t.trim().is_empty());
        return Ok(d);
    }
    Ok(Description {
        text: (!trimmed.is_empty()).then(|| trimmed.to_string()),
        audio: None,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/capture/service.rs"]
mod tests;
