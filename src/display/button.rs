use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Input delivered to the capture controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonEvent {
    Pressed,
}

/// Turns raw button levels into debounced press events.
#[derive(Clone, Debug)]
pub struct EdgeDetector {
    active_low: bool,
    debounce: Duration,
    pressed: bool,
    last_change: Option<Instant>,
}

impl EdgeDetector {
    pub fn new(active_low: bool, debounce: Duration) -> Self {
        Self {
            active_low,
            debounce,
            pressed: false,
            last_change: None,
        }
    }

    /// Feed one raw sample (`true` = line high). Returns a press on a debounced rising edge.
    pub fn feed(&mut self, high: bool, now: Instant) -> Option<ButtonEvent> {
        let level = high != self.active_low;
        if level == self.pressed {
            return None;
        }
        let settled = self
            .last_change
            .is_none_or(|t| now.saturating_duration_since(t) >= self.debounce);
        if !settled {
            return None;
        }
        self.pressed = level;
        self.last_change = Some(now);
        level.then_some(ButtonEvent::Pressed)
    }
}

/// Polled sysfs GPIO value file.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GpioButtonConfig {
    pub value_path: PathBuf,
    pub active_low: bool,
    pub debounce_ms: u64,
    pub poll_ms: u64,
}

impl Default for GpioButtonConfig {
    fn default() -> Self {
        Self {
            value_path: PathBuf::from("/sys/class/gpio/gpio11/value"),
            active_low: true,
            debounce_ms: 50,
            poll_ms: 10,
        }
    }
}

/// Poll the GPIO value file until `stop` is set, sending one event per debounced press.
pub fn spawn_gpio_button(
    cfg: GpioButtonConfig,
    events: Sender<ButtonEvent>,
    stop: Arc<AtomicBool>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut edges = EdgeDetector::new(cfg.active_low, Duration::from_millis(cfg.debounce_ms));
        let poll = Duration::from_millis(cfg.poll_ms.max(1));
        let mut warned = false;
        while !stop.load(Ordering::Relaxed) {
            match std::fs::read_to_string(&cfg.value_path) {
                Ok(raw) => {
                    let high = raw.trim() == "1";
                    if let Some(ev) = edges.feed(high, Instant::now()) {
                        tracing::debug!("button pressed (gpio)");
                        if events.send(ev).is_err() {
                            break;
                        }
                    }
                }
                Err(e) if !warned => {
                    tracing::warn!(path = %cfg.value_path.display(), error = %e, "cannot read button gpio");
                    warned = true;
                }
                Err(_) => {}
            }
            std::thread::sleep(poll);
        }
    })
}

/// Treat every line read from `reader` as one press. Ends at EOF or when the receiver is gone.
pub fn spawn_line_button<R>(reader: R, events: Sender<ButtonEvent>) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    std::thread::spawn(move || {
        for line in reader.lines() {
            if line.is_err() || events.send(ButtonEvent::Pressed).is_err() {
                break;
            }
            tracing::debug!("button pressed (line input)");
        }
    })
}

#[cfg(test)]
#[path = "../../tests/unit/display/button.rs"]
mod tests;
