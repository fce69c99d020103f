use crate::capture::process::{CommandSpec, ProcessLauncher};

/// ALSA mixer levels applied once at startup.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MixerConfig {
    pub enabled: bool,
    pub program: String,
    pub card: String,
    pub speaker: String,
    pub capture: String,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "amixer".to_string(),
            card: "wm8960soundcard".to_string(),
            speaker: "121".to_string(),
            capture: "100".to_string(),
        }
    }
}

impl MixerConfig {
    pub fn commands(&self) -> Vec<CommandSpec> {
        let device = format!("hw:{}", self.card);
        [("Speaker", &self.speaker), ("Capture", &self.capture)]
            .into_iter()
            .map(|(control, level)| {
                CommandSpec::new(
                    self.program.clone(),
                    ["-D", device.as_str(), "sset", control, level.as_str()],
                )
            })
            .collect()
    }
}

/// Set speaker and capture levels. Best-effort: failures are logged. Returns commands that succeeded.
pub fn apply_mixer(launcher: &dyn ProcessLauncher, cfg: &MixerConfig) -> usize {
    if !cfg.enabled {
        return 0;
    }
    let mut ok = 0;
    for cmd in cfg.commands() {
        match launcher.run(&cmd) {
            Ok(done) if done.success() => ok += 1,
            Ok(done) => tracing::warn!(code = ?done.code, cmd = %cmd.display(), "mixer command failed"),
            Err(e) => tracing::warn!(error = %e, "mixer unavailable"),
        }
    }
    ok
}

#[cfg(test)]
#[path = "../../tests/unit/capture/mixer.rs"]
mod tests;
