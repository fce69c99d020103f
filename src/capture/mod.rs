//! Button-driven capture, playback and description.

pub mod feedback;
pub mod machine;
pub mod mixer;
pub mod process;
pub mod recorder;
pub mod service;

pub use feedback::{
    FeedbackConfig, FeedbackSequence, Indicator, LedConfig, NullIndicator, SysfsLedIndicator,
    open_indicator,
};
pub use machine::{AudioConfig, CaptureMachine, CaptureState, TogglePolicy};
pub use mixer::{MixerConfig, apply_mixer};
pub use process::{CommandSpec, ExitOutcome, ProcessHandle, ProcessLauncher, SystemLauncher};
pub use recorder::{RecorderSession, SessionPhase};
pub use service::{
    CommandDescriptionService, DescribeConfig, Description, DescriptionService, UnavailableService,
};
