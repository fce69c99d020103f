use crate::foundation::core::Rgb;
use crate::render::surface::Surface;
use crate::text::typeface::Typeface;

/// Fill luminance above which the level label switches to a dark color.
pub const LABEL_LUMINANCE_THRESHOLD: f32 = 128.0;

/// Battery gauge geometry, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BatteryStyle {
    pub width: u32,
    pub height: u32,
    pub margin_right: u32,
    pub corner_radius: f64,
    pub outline_width: f64,
    pub nub_width: u32,
    pub nub_height: u32,
    pub font_size: f32,
    pub outline: Rgb,
}

impl Default for BatteryStyle {
    fn default() -> Self {
        Self {
            width: 26,
            height: 15,
            margin_right: 20,
            corner_radius: 3.0,
            outline_width: 2.0,
            nub_width: 2,
            nub_height: 5,
            font_size: 13.0,
            outline: Rgb::WHITE,
        }
    }
}

/// Label color that stays legible on `fill`.
pub fn label_color(fill: Rgb) -> Rgb {
    if fill.luminance() > LABEL_LUMINANCE_THRESHOLD {
        Rgb::BLACK
    } else {
        Rgb::WHITE
    }
}

/// Rounded battery outline with a terminal nub and a centered level label.
#[derive(Clone, Copy, Debug, Default)]
pub struct BatteryGauge {
    pub style: BatteryStyle,
}

impl BatteryGauge {
    pub fn new(style: BatteryStyle) -> Self {
        Self { style }
    }

    /// Left edge of the gauge body for a strip `strip_width` pixels wide.
    pub fn origin_x(&self, strip_width: u32) -> u32 {
        strip_width.saturating_sub(self.style.width + self.style.margin_right)
    }

    /// Draw the gauge with its top edge at `y`.
    ///
    /// A `None` or black fill leaves the interior at `background`.
    pub fn draw(
        &self,
        surface: &mut Surface,
        face: &mut dyn Typeface,
        level: u8,
        fill: Option<Rgb>,
        y: u32,
        background: Rgb,
    ) {
        let s = &self.style;
        let x0 = f64::from(self.origin_x(surface.width()));
        let y0 = f64::from(y);
        let x1 = x0 + f64::from(s.width);
        let y1 = y0 + f64::from(s.height);
        let inset = s.outline_width / 2.0;

        let fill = fill.unwrap_or(Rgb::BLACK);
        let interior = if fill == Rgb::BLACK { background } else { fill };

        surface.fill_rounded_rect(x0, y0, x1, y1, s.corner_radius, s.outline);
        surface.fill_rounded_rect(
            x0 + inset,
            y0 + inset,
            x1 - inset,
            y1 - inset,
            (s.corner_radius - inset).max(0.0),
            interior,
        );

        let nub_y = y0 + f64::from(s.height.saturating_sub(s.nub_height) / 2);
        surface.fill_rect(
            x1,
            nub_y,
            x1 + f64::from(s.nub_width),
            nub_y + f64::from(s.nub_height),
            s.outline,
        );

        let label = level.min(100).to_string();
        let text_w = face.advance(&label, s.font_size);
        let text_h = face.metrics(s.font_size).line_height();
        let tx = (x0 as f32 + (s.width as f32 - text_w) / 2.0).floor();
        let ty = (y0 as f32 + (s.height as f32 - text_h) / 2.0).floor();
        face.draw(surface, &label, s.font_size, tx, ty, label_color(fill));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/battery.rs"]
mod tests;
