use super::*;
use crate::capture::process::SystemLauncher;

#[test]
fn builds_speaker_and_capture_commands() {
    let cmds = MixerConfig::default().commands();
    assert_eq!(cmds.len(), 2);
    assert_eq!(
        cmds[0].display(),
        "amixer -D hw:wm8960soundcard sset Speaker 121"
    );
    assert_eq!(
        cmds[1].display(),
        "amixer -D hw:wm8960soundcard sset Capture 100"
    );
}

#[test]
fn missing_mixer_is_not_an_error() {
    let cfg = MixerConfig {
        program: "specter-test-no-such-amixer".to_string(),
        ..MixerConfig::default()
    };
    assert_eq!(apply_mixer(&SystemLauncher::default(), &cfg), 0);
}

#[test]
fn disabled_mixer_runs_nothing() {
    let cfg = MixerConfig {
        enabled: false,
        ..MixerConfig::default()
    };
    assert_eq!(apply_mixer(&SystemLauncher::default(), &cfg), 0);
}
