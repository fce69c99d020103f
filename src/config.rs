//! Device configuration: JSON file with every field defaulted, overridable from the command line.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::capture::feedback::FeedbackConfig;
use crate::capture::machine::AudioConfig;
use crate::capture::mixer::MixerConfig;
use crate::capture::service::DescribeConfig;
use crate::display::button::GpioButtonConfig;
use crate::display::transport::FramebufferConfig;
use crate::foundation::core::{Fps, PanelSize};
use crate::foundation::error::{SpecterError, SpecterResult};
use crate::render::body::BodyStyle;
use crate::render::header::HeaderStyle;
use crate::text::typeface::{FixedFace, FontFace, FontSet, Typeface};

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// TrueType/OpenType file for all text. Without one, fixed box glyphs are drawn.
    pub text: Option<PathBuf>,
    /// Separate face for emoji and other pictographs.
    pub emoji: Option<PathBuf>,
}

impl FontConfig {
    /// Open the configured faces, substituting [`FixedFace`] for a missing text font.
    pub fn load(&self) -> SpecterResult<FontSet> {
        let text: Box<dyn Typeface> = match &self.text {
            Some(path) => Box::new(FontFace::from_path(path)?),
            None => {
                tracing::warn!("no text font configured, drawing fixed box glyphs");
                Box::new(FixedFace::default())
            }
        };
        let emoji = match &self.emoji {
            Some(path) => Some(Box::new(FontFace::from_path(path)?) as Box<dyn Typeface>),
            None => None,
        };
        Ok(FontSet::new(text, emoji))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BootConfig {
    pub logo: Option<PathBuf>,
    pub logo_hold_ms: u64,
    pub video: Option<PathBuf>,
    pub ffmpeg: String,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            logo: Some(PathBuf::from("img/logo.png")),
            logo_hold_ms: 1000,
            video: None,
            ffmpeg: "ffmpeg".to_string(),
        }
    }
}

/// Panel backend.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TransportConfig {
    Framebuffer(FramebufferConfig),
    /// In-memory panel, for running without hardware.
    Memory,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::Framebuffer(FramebufferConfig::default())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ButtonConfig {
    /// Every line on stdin counts as a press.
    pub stdin: bool,
    pub gpio: Option<GpioButtonConfig>,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            stdin: true,
            gpio: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub panel: PanelSize,
    pub fps: u32,
    /// Backlight percentage after boot.
    pub backlight: u8,
    pub fonts: FontConfig,
    pub header: HeaderStyle,
    pub body: BodyStyle,
    pub boot: BootConfig,
    pub audio: AudioConfig,
    pub mixer: MixerConfig,
    pub describe: DescribeConfig,
    pub feedback: FeedbackConfig,
    pub transport: TransportConfig,
    pub button: ButtonConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            panel: PanelSize::default(),
            fps: 30,
            backlight: 50,
            fonts: FontConfig::default(),
            header: HeaderStyle::default(),
            body: BodyStyle::default(),
            boot: BootConfig::default(),
            audio: AudioConfig::default(),
            mixer: MixerConfig::default(),
            describe: DescribeConfig::default(),
            feedback: FeedbackConfig::default(),
            transport: TransportConfig::default(),
            button: ButtonConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> SpecterResult<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        let cfg: Config = serde_json::from_str(&raw)
            .map_err(|e| SpecterError::validation(format!("config '{}': {e}", path.display())))?;
        Ok(cfg)
    }

    pub fn frame_rate(&self) -> SpecterResult<Fps> {
        Fps::new(self.fps, 1)
    }

    pub fn validate(&self) -> SpecterResult<()> {
        PanelSize::new(self.panel.width, self.panel.height)?;
        self.frame_rate()?;
        if self.backlight > 100 {
            return Err(SpecterError::validation("backlight must be 0..=100"));
        }
        if self.header.height == 0 || self.header.height >= self.panel.height {
            return Err(SpecterError::validation(format!(
                "header height {} must be between 1 and panel height {}",
                self.header.height, self.panel.height
            )));
        }
        for (what, size) in [
            ("status", self.header.status_size),
            ("glyph", self.header.glyph_size),
            ("battery", self.header.battery.font_size),
            ("body", self.body.font_size),
        ] {
            if !(size.is_finite() && size > 0.0) {
                return Err(SpecterError::validation(format!("{what} font size must be > 0")));
            }
        }
        if self.body.margin.saturating_mul(2) >= self.panel.width {
            return Err(SpecterError::validation("body margins leave no room for text"));
        }
        for (what, cmd) in [
            ("capture", &self.audio.capture),
            ("playback", &self.audio.playback),
        ] {
            if cmd.program.trim().is_empty() {
                return Err(SpecterError::validation(format!("{what} program must not be empty")));
            }
        }
        if channel_count(&self.audio.capture.args) == Some(0) {
            return Err(SpecterError::validation("capture channel count must be > 0"));
        }
        if let Some(cmd) = &self.describe.command
            && cmd.program.trim().is_empty()
        {
            return Err(SpecterError::validation("describe program must not be empty"));
        }
        if self.describe.timeout_ms == 0 {
            return Err(SpecterError::validation("describe timeout must be > 0"));
        }
        Ok(())
    }
}

/// Value of `-c N` / `--channels=N` in capture arguments, if present.
fn channel_count(args: &[String]) -> Option<u32> {
    args.iter().enumerate().find_map(|(i, a)| {
        if a == "-c" || a == "--channels" {
            args.get(i + 1).and_then(|v| v.parse().ok())
        } else {
            a.strip_prefix("--channels=").and_then(|v| v.parse().ok())
        }
    })
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
