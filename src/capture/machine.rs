use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::capture::feedback::{FeedbackSequence, Indicator};
use crate::capture::process::{CommandSpec, ProcessLauncher};
use crate::capture::recorder::RecorderSession;
use crate::capture::service::DescriptionService;
use crate::display::button::ButtonEvent;
use crate::display::state::{DisplayUpdate, SharedDisplay};
use crate::foundation::core::Rgb;
use crate::foundation::error::SpecterResult;

/// Where the controller is in the capture / playback / describe cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureState {
    AwaitingStart,
    Recording,
    Feedback,
    Playback,
    Querying,
    AnswerPlayback,
}

/// What happens after a capture has been played back and described.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TogglePolicy {
    /// Wait for the next press before recording again.
    #[default]
    Toggle,
    /// Start recording again right away.
    Continuous,
}

impl std::str::FromStr for TogglePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "toggle" => Ok(Self::Toggle),
            "continuous" => Ok(Self::Continuous),
            other => Err(format!("unknown policy '{other}' (expected toggle or continuous)")),
        }
    }
}

/// Audio tooling and stage images.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Capture command; `{output}` is replaced with `recording_path`.
    pub capture: CommandSpec,
    /// Playback command; `{file}` is replaced with the clip to play.
    pub playback: CommandSpec,
    pub recording_path: PathBuf,
    /// Shown while recording.
    pub recording_image: Option<PathBuf>,
    /// Shown while playing audio back.
    pub playback_image: Option<PathBuf>,
    pub boot_audio: Option<PathBuf>,
    pub policy: TogglePolicy,
    /// Scroll speed applied to answer text.
    pub answer_scroll_speed: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            capture: CommandSpec::new(
                "arecord",
                ["-D", "hw:wm8960soundcard", "-f", "S16_LE", "-r", "16000", "-c", "2", "{output}"],
            ),
            playback: CommandSpec::new("aplay", ["-D", "plughw:wm8960soundcard", "{file}"]),
            recording_path: PathBuf::from("data/recorded_voice.wav"),
            recording_image: None,
            playback_image: None,
            boot_audio: None,
            policy: TogglePolicy::Toggle,
            answer_scroll_speed: 6,
        }
    }
}

const STATUS_READY: &str = "Ready";
const STATUS_RECORDING: &str = "Recording";
const STATUS_PLAYING: &str = "Playing";
const STATUS_THINKING: &str = "Thinking";
const STATUS_ANSWERING: &str = "Answering";
const STATUS_CAPTURE_FAILED: &str = "Mic error";

/// Button-driven controller.
///
/// Runs on its own thread and blocks on external processes; it talks to the frame loop only
/// through [`SharedDisplay`].
pub struct CaptureMachine {
    state: CaptureState,
    cfg: AudioConfig,
    launcher: Arc<dyn ProcessLauncher>,
    recorder: RecorderSession,
    service: Box<dyn DescriptionService>,
    indicator: Box<dyn Indicator>,
    feedback: FeedbackSequence,
    display: SharedDisplay,
    visited: Vec<CaptureState>,
}

impl CaptureMachine {
    pub fn new(
        cfg: AudioConfig,
        launcher: Arc<dyn ProcessLauncher>,
        service: Box<dyn DescriptionService>,
        indicator: Box<dyn Indicator>,
        feedback: FeedbackSequence,
        display: SharedDisplay,
    ) -> Self {
        let recorder = RecorderSession::new(
            Arc::clone(&launcher),
            cfg.capture.clone(),
            cfg.recording_path.clone(),
        );
        Self {
            state: CaptureState::AwaitingStart,
            cfg,
            launcher,
            recorder,
            service,
            indicator,
            feedback,
            display,
            visited: Vec::new(),
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// States entered while handling the most recent event.
    pub fn last_transitions(&self) -> &[CaptureState] {
        &self.visited
    }

    pub fn is_capturing(&self) -> bool {
        self.recorder.is_capturing()
    }

    fn enter(&mut self, next: CaptureState) {
        tracing::info!(from = ?self.state, to = ?next, "capture state");
        self.state = next;
        self.visited.push(next);
    }

    /// Play the boot sound, then settle in the idle state (or start recording when continuous).
    pub fn start(&mut self) -> SpecterResult<()> {
        self.visited.clear();
        if let Some(boot) = self.cfg.boot_audio.clone() {
            self.show_stage(STATUS_PLAYING, self.cfg.playback_image.clone());
            self.play(&boot);
        }
        match self.cfg.policy {
            TogglePolicy::Continuous => self.start_recording(),
            TogglePolicy::Toggle => {
                self.show_idle();
                Ok(())
            }
        }
    }

    /// React to one button event and return the state the machine settled in.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn handle(&mut self, event: ButtonEvent) -> SpecterResult<CaptureState> {
        self.visited.clear();
        match (self.state, event) {
            (CaptureState::AwaitingStart, ButtonEvent::Pressed) => self.start_recording()?,
            (CaptureState::Recording, ButtonEvent::Pressed) => self.finish_capture()?,
            (busy, ButtonEvent::Pressed) => {
                tracing::debug!(state = ?busy, "press ignored while busy");
            }
        }
        Ok(self.state)
    }

    fn start_recording(&mut self) -> SpecterResult<()> {
        match self.recorder.start() {
            Ok(()) => {
                self.enter(CaptureState::Recording);
                self.show_stage(STATUS_RECORDING, self.cfg.recording_image.clone());
                Ok(())
            }
            Err(e) if !e.is_fatal() => {
                tracing::warn!(error = %e, "capture did not start");
                self.display.update(
                    &DisplayUpdate::new()
                        .status(STATUS_CAPTURE_FAILED)
                        .clear_image(),
                );
                self.state = CaptureState::AwaitingStart;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn finish_capture(&mut self) -> SpecterResult<()> {
        self.enter(CaptureState::Feedback);
        match self.recorder.stop() {
            Ok(Some(done)) if !done.success() => {
                tracing::debug!(code = ?done.code, "capture ended by signal");
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "capture did not stop cleanly"),
        }
        self.feedback.run(&self.display, self.indicator.as_mut());

        self.enter(CaptureState::Playback);
        self.show_stage(STATUS_PLAYING, self.cfg.playback_image.clone());
        let clip = self.cfg.recording_path.clone();
        self.play(&clip);

        self.enter(CaptureState::Querying);
        self.display.update(&DisplayUpdate::new().status(STATUS_THINKING));
        match self.service.describe(&clip) {
            Ok(answer) => {
                self.enter(CaptureState::AnswerPlayback);
                let mut update = DisplayUpdate::new().status(STATUS_ANSWERING);
                if let Some(text) = &answer.text {
                    update = update
                        .body_text(text.clone())
                        .scroll_speed(self.cfg.answer_scroll_speed)
                        .clear_image();
                }
                self.display.update(&update);
                if let Some(audio) = &answer.audio {
                    self.play(audio);
                }
            }
            Err(e) => tracing::warn!(error = %e, "description unavailable"),
        }

        self.enter(CaptureState::AwaitingStart);
        match self.cfg.policy {
            TogglePolicy::Continuous => self.start_recording(),
            TogglePolicy::Toggle => {
                self.show_idle();
                Ok(())
            }
        }
    }

    /// Blocking playback; failures are logged and the chain carries on.
    fn play(&mut self, file: &Path) {
        let path = file.to_string_lossy();
        let cmd = self.cfg.playback.substitute(&[("file", path.as_ref())]);
        match self.launcher.run(&cmd) {
            Ok(done) if done.success() => {}
            Ok(done) => tracing::warn!(code = ?done.code, cmd = %cmd.display(), "playback failed"),
            Err(e) => tracing::warn!(error = %e, "playback did not start"),
        }
    }

    fn show_stage(&self, status: &str, image: Option<PathBuf>) {
        let update = DisplayUpdate::new().status(status).clear_fill();
        let update = match image {
            Some(path) => update.image(path),
            None => update.clear_image(),
        };
        self.display.update(&update);
    }

    fn show_idle(&self) {
        self.display.update(
            &DisplayUpdate::new()
                .status(STATUS_READY)
                .clear_image()
                .clear_fill(),
        );
    }

    /// Stop any capture in progress and switch the LED off.
    pub fn shutdown(&mut self) {
        if let Err(e) = self.recorder.stop() {
            tracing::warn!(error = %e, "capture did not stop on shutdown");
        }
        if let Err(e) = self.indicator.set_rgb(Rgb::BLACK) {
            tracing::warn!(error = %e, "indicator reset failed");
        }
    }

    /// Handle presses until `stop` is set or every sender is gone, then shut down.
    ///
    /// Presses that queued up while a capture was being processed are discarded.
    pub fn run(&mut self, events: &Receiver<ButtonEvent>, stop: &AtomicBool) -> SpecterResult<()> {
        let result = loop {
            if stop.load(Ordering::Relaxed) {
                break Ok(());
            }
            match events.recv_timeout(Duration::from_millis(100)) {
                Ok(event) => {
                    let chain = self.state == CaptureState::Recording;
                    if let Err(e) = self.handle(event) {
                        break Err(e);
                    }
                    if chain {
                        let dropped = events.try_iter().count();
                        if dropped > 0 {
                            tracing::debug!(dropped, "discarded presses queued during processing");
                        }
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break Ok(()),
            }
        };
        self.shutdown();
        result
    }
}
