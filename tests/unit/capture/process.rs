use super::*;

#[test]
fn placeholders_are_substituted() {
    let cmd = CommandSpec::new("helper", ["--in", "{audio}", "--out={answer}", "{audio}"]);
    let got = cmd.substitute(&[("audio", "data/in.wav"), ("answer", "data/out.wav")]);
    assert_eq!(got.args, vec!["--in", "data/in.wav", "--out=data/out.wav", "data/in.wav"]);
    assert_eq!(got.program, "helper");
}

#[test]
fn display_joins_program_and_args() {
    let cmd = CommandSpec::new("aplay", ["-D", "plughw:wm8960soundcard"]).arg("a.wav");
    assert_eq!(cmd.display(), "aplay -D plughw:wm8960soundcard a.wav");
}

#[test]
fn command_spec_reads_from_json() {
    let cmd: CommandSpec = serde_json::from_str(r#"{"program":"arecord"}"#).unwrap();
    assert!(cmd.args.is_empty());
}

#[test]
fn missing_program_is_a_process_error() {
    let err = SystemLauncher::default()
        .spawn(&CommandSpec::new("specter-test-no-such-program", Vec::<String>::new()))
        .err()
        .unwrap();
    assert!(matches!(err, SpecterError::Process(_)));
    assert!(!err.is_fatal());
}

#[cfg(unix)]
#[test]
fn exit_codes_are_reported() {
    let launcher = SystemLauncher::default();
    assert!(launcher.run(&CommandSpec::new("true", Vec::<String>::new())).unwrap().success());
    let failed = launcher.run(&CommandSpec::new("false", Vec::<String>::new())).unwrap();
    assert_eq!(failed.code, Some(1));
}

#[cfg(unix)]
#[test]
fn terminate_stops_and_reaps_a_running_process() {
    let launcher = SystemLauncher::default();
    let mut handle = launcher.spawn(&CommandSpec::new("sleep", ["30"])).unwrap();
    assert!(handle.try_wait().unwrap().is_none());
    let started = Instant::now();
    let done = handle.terminate().unwrap();
    assert!(!done.success());
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(handle.try_wait().unwrap().is_some());
}
