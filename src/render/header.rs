use image::RgbaImage;

use crate::display::state::DisplayState;
use crate::foundation::core::Rgb;
use crate::foundation::error::SpecterResult;
use crate::render::battery::{BatteryGauge, BatteryStyle};
use crate::render::surface::Surface;
use crate::text::typeface::Typeface;

/// Header strip layout, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HeaderStyle {
    pub height: u32,
    pub status_size: f32,
    /// Left inset of the status label (clears the panel's rounded corner).
    pub status_x: u32,
    pub glyph_size: f32,
    /// Gap between the status line and the glyph.
    pub glyph_gap: u32,
    pub foreground: Rgb,
    pub background: Rgb,
    pub battery: BatteryStyle,
}

impl Default for HeaderStyle {
    fn default() -> Self {
        Self {
            height: 98,
            status_size: 24.0,
            status_x: 20,
            glyph_size: 40.0,
            glyph_gap: 8,
            foreground: Rgb::WHITE,
            background: Rgb::BLACK,
            battery: BatteryStyle::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct HeaderKey {
    status: String,
    glyph: String,
    battery_level: Option<u8>,
    battery_color: Option<Rgb>,
}

impl HeaderKey {
    fn of(state: &DisplayState) -> Self {
        Self {
            status: state.status.clone(),
            glyph: state.glyph.clone(),
            battery_level: state.battery_level,
            battery_color: state.battery_color,
        }
    }
}

/// Composes the status / glyph / battery strip at the top of the panel.
///
/// The last strip is kept and returned as-is while its inputs are unchanged.
pub struct HeaderComposer {
    style: HeaderStyle,
    gauge: BatteryGauge,
    surface: Surface,
    key: Option<HeaderKey>,
    image: RgbaImage,
}

impl HeaderComposer {
    pub fn new(width: u32, style: HeaderStyle) -> SpecterResult<Self> {
        Ok(Self {
            surface: Surface::new(width, style.height)?,
            gauge: BatteryGauge::new(style.battery),
            image: RgbaImage::new(width, style.height),
            style,
            key: None,
        })
    }

    pub fn style(&self) -> &HeaderStyle {
        &self.style
    }

    pub fn height(&self) -> u32 {
        self.style.height
    }

    pub fn render(&mut self, face: &mut dyn Typeface, state: &DisplayState) -> &RgbaImage {
        let key = HeaderKey::of(state);
        if self.key.as_ref() != Some(&key) {
            tracing::debug!(status = %key.status, "recomposing header");
            self.image = self.compose(face, &key);
            self.key = Some(key);
        }
        &self.image
    }

    fn compose(&mut self, face: &mut dyn Typeface, key: &HeaderKey) -> RgbaImage {
        let s = self.style;
        let width = self.surface.width();
        self.surface.reset();

        face.draw(
            &mut self.surface,
            &key.status,
            s.status_size,
            s.status_x as f32,
            0.0,
            s.foreground,
        );

        let glyph_w = face.advance(&key.glyph, s.glyph_size);
        let glyph_x = ((width as f32 - glyph_w) / 2.0).floor().max(0.0);
        let glyph_y = s.status_size.floor() + s.glyph_gap as f32;
        face.draw(
            &mut self.surface,
            &key.glyph,
            s.glyph_size,
            glyph_x,
            glyph_y,
            s.foreground,
        );

        if let Some(level) = key.battery_level {
            let y = (s.status_size as u32) / 2;
            self.gauge.draw(
                &mut self.surface,
                face,
                level,
                key.battery_color,
                y,
                s.background,
            );
        }

        self.surface.render_over(s.background)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/header.rs"]
mod tests;
