//! External process capability used for capture, playback and helper tools.

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use crate::foundation::error::{SpecterError, SpecterResult};

/// Program plus arguments. Arguments may contain `{name}` placeholders.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Replace every `{key}` in the arguments with its value.
    pub fn substitute(&self, vars: &[(&str, &str)]) -> Self {
        let args = self
            .args
            .iter()
            .map(|a| {
                vars.iter()
                    .fold(a.clone(), |acc, (k, v)| acc.replace(&format!("{{{k}}}"), v))
            })
            .collect();
        Self {
            program: self.program.clone(),
            args,
        }
    }

    /// Shell-like rendering for logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How a process ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExitOutcome {
    /// `None` when the process was killed by a signal.
    pub code: Option<i32>,
}

impl ExitOutcome {
    pub fn success(self) -> bool {
        self.code == Some(0)
    }
}

/// A started external process.
pub trait ProcessHandle: Send {
    fn id(&self) -> u32;
    fn try_wait(&mut self) -> SpecterResult<Option<ExitOutcome>>;
    fn wait(&mut self) -> SpecterResult<ExitOutcome>;
    /// Ask the process to stop, then wait until it has exited.
    fn terminate(&mut self) -> SpecterResult<ExitOutcome>;
    /// Stop immediately and reap.
    fn kill(&mut self) -> SpecterResult<ExitOutcome>;
}

/// Starts external processes.
pub trait ProcessLauncher: Send + Sync {
    fn spawn(&self, cmd: &CommandSpec) -> SpecterResult<Box<dyn ProcessHandle>>;

    /// Start `cmd` and block until it exits.
    fn run(&self, cmd: &CommandSpec) -> SpecterResult<ExitOutcome> {
        self.spawn(cmd)?.wait()
    }
}

/// Launcher backed by `std::process`.
#[derive(Clone, Debug)]
pub struct SystemLauncher {
    /// How long `terminate` waits after the polite signal before killing.
    pub grace: Duration,
}

impl Default for SystemLauncher {
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(2),
        }
    }
}

impl ProcessLauncher for SystemLauncher {
    fn spawn(&self, cmd: &CommandSpec) -> SpecterResult<Box<dyn ProcessHandle>> {
        let child = Command::new(&cmd.program)
            .args(&cmd.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| SpecterError::process(format!("failed to spawn '{}': {e}", cmd.display())))?;
        tracing::debug!(pid = child.id(), cmd = %cmd.display(), "spawned process");
        Ok(Box::new(SystemHandle {
            child,
            grace: self.grace,
        }))
    }
}

struct SystemHandle {
    child: Child,
    grace: Duration,
}

fn outcome(status: std::process::ExitStatus) -> ExitOutcome {
    ExitOutcome {
        code: status.code(),
    }
}

impl ProcessHandle for SystemHandle {
    fn id(&self) -> u32 {
        self.child.id()
    }

    fn try_wait(&mut self) -> SpecterResult<Option<ExitOutcome>> {
        self.child
            .try_wait()
            .map(|s| s.map(outcome))
            .map_err(|e| SpecterError::process(format!("failed to poll process: {e}")))
    }

    fn wait(&mut self) -> SpecterResult<ExitOutcome> {
        self.child
            .wait()
            .map(outcome)
            .map_err(|e| SpecterError::process(format!("failed to wait for process: {e}")))
    }

    fn terminate(&mut self) -> SpecterResult<ExitOutcome> {
        if let Some(done) = self.try_wait()? {
            return Ok(done);
        }
        let signalled = Command::new("kill")
            .args(["-TERM", &self.child.id().to_string()])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false);
        if signalled {
            let deadline = Instant::now() + self.grace;
            while Instant::now() < deadline {
                if let Some(done) = self.try_wait()? {
                    return Ok(done);
                }
                std::thread::sleep(Duration::from_millis(10));
            }
            tracing::warn!(pid = self.child.id(), "process ignored SIGTERM, killing");
        }
        self.kill()
    }

    fn kill(&mut self) -> SpecterResult<ExitOutcome> {
        if let Some(done) = self.try_wait()? {
            return Ok(done);
        }
        let _ = self.child.kill();
        self.wait()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/process.rs"]
mod tests;
