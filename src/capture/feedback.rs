use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;

use crate::display::state::{DisplayUpdate, SharedDisplay};
use crate::foundation::core::Rgb;
use crate::foundation::error::{SpecterError, SpecterResult};

/// Board RGB LED.
pub trait Indicator: Send {
    fn set_rgb(&mut self, color: Rgb) -> SpecterResult<()>;
}

/// Indicator for boards without an LED; logs the requested color.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullIndicator;

impl Indicator for NullIndicator {
    fn set_rgb(&mut self, color: Rgb) -> SpecterResult<()> {
        tracing::debug!(r = color.r, g = color.g, b = color.b, "indicator");
        Ok(())
    }
}

/// sysfs LED class brightness files, one per channel, e.g. `/sys/class/leds/red/brightness`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LedConfig {
    pub red: PathBuf,
    pub green: PathBuf,
    pub blue: PathBuf,
}

/// RGB LED driven through three sysfs brightness files.
#[derive(Debug)]
pub struct SysfsLedIndicator {
    channels: [LedChannel; 3],
}

#[derive(Debug)]
struct LedChannel {
    path: PathBuf,
    max: u32,
}

impl LedChannel {
    fn open(path: &Path) -> Self {
        let max = path
            .parent()
            .map(|dir| dir.join("max_brightness"))
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(255);
        Self {
            path: path.to_path_buf(),
            max,
        }
    }

    fn set(&self, level: u8) -> SpecterResult<()> {
        let value = u64::from(level) * u64::from(self.max) / 255;
        std::fs::write(&self.path, value.to_string())
            .with_context(|| format!("failed to write led '{}'", self.path.display()))
            .map_err(|e| SpecterError::transport(format!("{e:#}")))
    }
}

impl SysfsLedIndicator {
    /// Reads each channel's `max_brightness` next to its brightness file, defaulting to 255.
    pub fn open(cfg: &LedConfig) -> Self {
        let channels = [&cfg.red, &cfg.green, &cfg.blue].map(|p| LedChannel::open(p));
        tracing::info!(
            red = channels[0].max,
            green = channels[1].max,
            blue = channels[2].max,
            "opened sysfs led"
        );
        Self { channels }
    }
}

impl Indicator for SysfsLedIndicator {
    fn set_rgb(&mut self, color: Rgb) -> SpecterResult<()> {
        for (channel, level) in self.channels.iter().zip([color.r, color.g, color.b]) {
            channel.set(level)?;
        }
        Ok(())
    }
}

/// LED from config, or [`NullIndicator`] when none is configured.
pub fn open_indicator(led: Option<&LedConfig>) -> Box<dyn Indicator> {
    match led {
        Some(cfg) => Box::new(SysfsLedIndicator::open(cfg)),
        None => Box::new(NullIndicator),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub colors: Vec<Rgb>,
    pub step_ms: u64,
    /// Shown one per step instead of the solid color, cycling across runs.
    pub images: Vec<PathBuf>,
    /// Board LED; without one the sequence only drives the panel.
    pub led: Option<LedConfig>,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            colors: vec![Rgb::RED, Rgb::GREEN, Rgb::BLUE],
            step_ms: 400,
            images: Vec::new(),
            led: None,
        }
    }
}

/// Short color sequence played after a capture stops. Best-effort: nothing here fails the chain.
#[derive(Clone, Debug)]
pub struct FeedbackSequence {
    colors: Vec<Rgb>,
    step: Duration,
    images: Vec<PathBuf>,
    next_image: usize,
}

impl FeedbackSequence {
    pub fn new(cfg: &FeedbackConfig) -> Self {
        Self {
            colors: cfg.colors.clone(),
            step: Duration::from_millis(cfg.step_ms),
            images: cfg.images.clone(),
            next_image: 0,
        }
    }

    /// Play every step, then switch the LED off and drop the fill. Returns the steps shown.
    pub fn run(&mut self, display: &SharedDisplay, indicator: &mut dyn Indicator) -> usize {
        for &color in &self.colors {
            let update = match self.images.get(self.next_image % self.images.len().max(1)) {
                Some(path) => {
                    self.next_image = (self.next_image + 1) % self.images.len();
                    DisplayUpdate::new().clear_fill().image(path.clone())
                }
                None => DisplayUpdate::new().fill(color),
            };
            display.update(&update);
            if let Err(e) = indicator.set_rgb(color) {
                tracing::warn!(error = %e, "indicator update failed");
            }
            std::thread::sleep(self.step);
        }
        if let Err(e) = indicator.set_rgb(Rgb::BLACK) {
            tracing::warn!(error = %e, "indicator reset failed");
        }
        display.update(&DisplayUpdate::new().clear_fill());
        self.colors.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/feedback.rs"]
mod tests;
