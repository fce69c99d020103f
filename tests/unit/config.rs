use super::*;
use crate::capture::process::CommandSpec;

fn temp_file(name: &str, body: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let path = std::env::temp_dir().join(format!(
        "specter_config_{name}_{}_{nanos}.json",
        std::process::id()
    ));
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn defaults_match_the_stock_board() {
    let cfg = Config::default();
    assert_eq!(cfg.panel, PanelSize { width: 240, height: 280 });
    assert_eq!(cfg.fps, 30);
    assert_eq!(cfg.backlight, 50);
    assert_eq!(cfg.boot.logo_hold_ms, 1000);
    assert!(cfg.button.stdin);
    assert!(matches!(cfg.transport, TransportConfig::Framebuffer(_)));
    cfg.validate().unwrap();
}

#[test]
fn empty_object_is_the_default_config() {
    let cfg: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(cfg, Config::default());
}

#[test]
fn partial_file_overrides_only_named_fields() {
    let path = temp_file(
        "partial",
        r##"{
            "fps": 20,
            "panel": {"width": 320, "height": 240},
            "body": {"font_size": 18},
            "transport": {"kind": "memory"},
            "audio": {"policy": "continuous"}
        }"##,
    );
    let cfg = Config::load(&path).unwrap();
    assert_eq!(cfg.fps, 20);
    assert_eq!(cfg.panel.width, 320);
    assert_eq!(cfg.body.font_size, 18.0);
    assert_eq!(cfg.body.margin, BodyStyle::default().margin);
    assert_eq!(cfg.transport, TransportConfig::Memory);
    assert_eq!(cfg.audio.policy, crate::capture::machine::TogglePolicy::Continuous);
    cfg.validate().unwrap();
    let _ = std::fs::remove_file(path);
}

#[test]
fn malformed_file_is_a_validation_error() {
    let path = temp_file("bad", "{ fps: ");
    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, SpecterError::Validation(_)));
    let _ = std::fs::remove_file(path);
}

#[test]
fn missing_file_reports_the_path() {
    let err = Config::load(Path::new("/nonexistent/specter.json")).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/specter.json"));
}

#[test]
fn validate_rejects_zero_fps_and_bad_backlight() {
    let mut cfg = Config::default();
    cfg.fps = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = Config::default();
    cfg.backlight = 101;
    assert!(cfg.validate().is_err());
}

#[test]
fn validate_rejects_header_taller_than_panel() {
    let mut cfg = Config::default();
    cfg.header.height = cfg.panel.height;
    assert!(cfg.validate().is_err());
}

#[test]
fn validate_rejects_huge_margins_without_overflow() {
    let mut cfg = Config::default();
    cfg.body.margin = u32::MAX / 2 + 1;
    assert!(cfg.validate().is_err());
    cfg.body.margin = u32::MAX;
    assert!(cfg.validate().is_err());
}

#[test]
fn validate_rejects_oversized_panel() {
    let mut cfg = Config::default();
    cfg.panel.width = 70_000;
    assert!(cfg.validate().is_err());
}

#[test]
fn validate_rejects_empty_programs_and_zero_channels() {
    let mut cfg = Config::default();
    cfg.audio.playback.program = " ".to_string();
    assert!(cfg.validate().is_err());

    let mut cfg = Config::default();
    cfg.audio.capture = CommandSpec::new("arecord", ["-c", "0", "{output}"]);
    assert!(cfg.validate().is_err());

    let mut cfg = Config::default();
    cfg.audio.capture = CommandSpec::new("arecord", ["--channels=0", "{output}"]);
    assert!(cfg.validate().is_err());

    let mut cfg = Config::default();
    cfg.describe.command = Some(CommandSpec::new("", Vec::<String>::new()));
    assert!(cfg.validate().is_err());
}

#[test]
fn channel_count_reads_short_and_long_forms() {
    let args = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    assert_eq!(channel_count(&args(&["-c", "2"])), Some(2));
    assert_eq!(channel_count(&args(&["--channels", "1"])), Some(1));
    assert_eq!(channel_count(&args(&["--channels=4"])), Some(4));
    assert_eq!(channel_count(&args(&["-r", "16000"])), None);
}

#[test]
fn fonts_fall_back_to_fixed_face() {
    let mut fonts = FontConfig::default().load().unwrap();
    assert_eq!(fonts.advance("ab", 20.0), 20.0);
}

#[test]
fn unreadable_font_is_a_decode_error() {
    let fonts = FontConfig {
        text: Some(PathBuf::from("/nonexistent/font.ttf")),
        emoji: None,
    };
    assert!(matches!(fonts.load(), Err(SpecterError::Decode(_))));
}
