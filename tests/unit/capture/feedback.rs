use std::sync::{Arc, Mutex};

use super::*;

#[derive(Clone, Default)]
struct RecordingIndicator(Arc<Mutex<Vec<Rgb>>>);

impl Indicator for RecordingIndicator {
    fn set_rgb(&mut self, color: Rgb) -> SpecterResult<()> {
        self.0.lock().unwrap().push(color);
        Ok(())
    }
}

struct BrokenIndicator;

impl Indicator for BrokenIndicator {
    fn set_rgb(&mut self, _color: Rgb) -> SpecterResult<()> {
        Err(crate::foundation::error::SpecterError::process("led gone"))
    }
}

fn quick(images: Vec<PathBuf>) -> FeedbackConfig {
    FeedbackConfig {
        step_ms: 0,
        images,
        ..FeedbackConfig::default()
    }
}

#[test]
fn plays_three_colors_then_turns_off() {
    let display = SharedDisplay::default();
    let led = RecordingIndicator::default();
    let mut seq = FeedbackSequence::new(&quick(Vec::new()));
    let steps = seq.run(&display, &mut led.clone());
    assert_eq!(steps, 3);
    assert_eq!(
        *led.0.lock().unwrap(),
        vec![Rgb::RED, Rgb::GREEN, Rgb::BLUE, Rgb::BLACK]
    );
    assert!(display.snapshot().fill.is_none());
}

#[test]
fn images_cycle_across_runs() {
    let display = SharedDisplay::default();
    let images = vec![PathBuf::from("a.png"), PathBuf::from("b.png")];
    let mut seq = FeedbackSequence::new(&quick(images));
    seq.run(&display, &mut NullIndicator);
    // Three steps over two images end on "a".
    assert_eq!(display.snapshot().image_path, Some(PathBuf::from("a.png")));
    seq.run(&display, &mut NullIndicator);
    assert_eq!(display.snapshot().image_path, Some(PathBuf::from("b.png")));
}

#[test]
fn indicator_failures_do_not_stop_the_sequence() {
    let display = SharedDisplay::default();
    let mut seq = FeedbackSequence::new(&quick(Vec::new()));
    assert_eq!(seq.run(&display, &mut BrokenIndicator), 3);
}

fn led_dir(name: &str, max: Option<&str>) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("specter_led_{name}_{}", std::process::id()));
    for channel in ["red", "green", "blue"] {
        let ch = dir.join(channel);
        std::fs::create_dir_all(&ch).unwrap();
        std::fs::write(ch.join("brightness"), "0").unwrap();
        if let Some(max) = max {
            std::fs::write(ch.join("max_brightness"), max).unwrap();
        }
    }
    dir
}

fn led_config(dir: &Path) -> LedConfig {
    LedConfig {
        red: dir.join("red/brightness"),
        green: dir.join("green/brightness"),
        blue: dir.join("blue/brightness"),
    }
}

fn levels(dir: &Path) -> Vec<String> {
    ["red", "green", "blue"]
        .iter()
        .map(|c| std::fs::read_to_string(dir.join(c).join("brightness")).unwrap())
        .collect()
}

#[test]
fn sysfs_led_scales_to_max_brightness() {
    let dir = led_dir("scaled", Some("1\n"));
    let mut led = SysfsLedIndicator::open(&led_config(&dir));
    led.set_rgb(Rgb::new(255, 0, 128)).unwrap();
    assert_eq!(levels(&dir), vec!["1", "0", "0"]);

    let dir = led_dir("full", None);
    let mut led = SysfsLedIndicator::open(&led_config(&dir));
    led.set_rgb(Rgb::new(255, 10, 128)).unwrap();
    assert_eq!(levels(&dir), vec!["255", "10", "128"]);
}

#[test]
fn feedback_drives_the_sysfs_led_and_turns_it_off() {
    let dir = led_dir("sequence", Some("255"));
    let display = SharedDisplay::default();
    let mut seq = FeedbackSequence::new(&quick(Vec::new()));
    let mut led = open_indicator(Some(&led_config(&dir)));
    assert_eq!(seq.run(&display, led.as_mut()), 3);
    assert_eq!(levels(&dir), vec!["0", "0", "0"]);
}

#[test]
fn missing_led_file_is_a_transport_error() {
    let dir = std::env::temp_dir().join(format!("specter_led_missing_{}", std::process::id()));
    let mut led = SysfsLedIndicator::open(&led_config(&dir));
    let err = led.set_rgb(Rgb::RED).unwrap_err();
    assert!(matches!(err, crate::foundation::error::SpecterError::Transport(_)));
}
