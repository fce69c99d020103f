use image::RgbaImage;

use crate::display::state::DisplayState;
use crate::foundation::core::Rgb;
use crate::foundation::error::SpecterResult;
use crate::render::line_cache::LineCache;
use crate::render::scroll::visible_range;
use crate::render::surface::Surface;
use crate::text::typeface::Typeface;
use crate::text::wrap::TextLayout;

/// Scroll body text style.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BodyStyle {
    pub font_size: f32,
    /// Horizontal margin on each side of the wrapped text.
    pub margin: u32,
    pub foreground: Rgb,
    pub background: Rgb,
}

impl Default for BodyStyle {
    fn default() -> Self {
        Self {
            font_size: 20.0,
            margin: 10,
            foreground: Rgb::WHITE,
            background: Rgb::BLACK,
        }
    }
}

/// Wrapping facts of the last rendered body, used to drive autoscroll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BodyMetrics {
    pub line_count: usize,
    pub line_height: u32,
    pub body_height: u32,
}

/// Renders the scrolling text body through [`TextLayout`] and [`LineCache`].
pub struct ScrollRenderer {
    style: BodyStyle,
    width: u32,
    height: u32,
    layout: TextLayout,
    cache: LineCache,
    image: RgbaImage,
}

impl ScrollRenderer {
    pub fn new(width: u32, height: u32, style: BodyStyle) -> Self {
        Self {
            style,
            width,
            height,
            layout: TextLayout::new(),
            cache: LineCache::new(),
            image: RgbaImage::new(width, height),
        }
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cache(&self) -> &LineCache {
        &self.cache
    }

    /// Last rendered body.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Drop wrapped lines and the cached raster, e.g. after the font changed.
    pub fn invalidate(&mut self) {
        self.layout.invalidate();
        self.cache.invalidate();
    }

    /// Render the visible window of `state.body_text` at `state.scroll_offset`.
    pub fn render(&mut self, face: &mut dyn Typeface, state: &DisplayState) -> SpecterResult<BodyMetrics> {
        let style = self.style;
        let width = self.width;
        let text = state.body_text.as_deref().unwrap_or("");
        let wrap_width = width.saturating_sub(style.margin.saturating_mul(2)) as f32;
        let line_height = face.metrics(style.font_size).line_height_px();

        let lines = self.layout.lines(face, text, style.font_size, wrap_width);
        let range = visible_range(lines.len(), line_height, state.scroll_offset, self.height);
        let metrics = BodyMetrics {
            line_count: lines.len(),
            line_height,
            body_height: self.height,
        };

        fill(&mut self.image, style.background);
        let visible = &lines[range.clone()];
        if visible.is_empty() {
            return Ok(metrics);
        }
        let tile = self.cache.get_or_render(
            state.message_epoch,
            range.start,
            visible,
            line_height,
            |lines| rasterize_lines(face, lines, width, line_height, style),
        )?;
        image::imageops::overlay(&mut self.image, &tile.image, 0, tile.body_y(state.scroll_offset));
        Ok(metrics)
    }
}

fn rasterize_lines(
    face: &mut dyn Typeface,
    lines: &[String],
    width: u32,
    line_height: u32,
    style: BodyStyle,
) -> SpecterResult<RgbaImage> {
    let height = line_height.saturating_mul(lines.len() as u32);
    let mut surface = Surface::new(width, height)?;
    for (i, line) in lines.iter().enumerate() {
        face.draw(
            &mut surface,
            line,
            style.font_size,
            style.margin as f32,
            (i as u32 * line_height) as f32,
            style.foreground,
        );
    }
    Ok(surface.render_over(style.background))
}

fn fill(image: &mut RgbaImage, color: Rgb) {
    let px = image::Rgba(color.to_rgba8());
    for p in image.pixels_mut() {
        *p = px;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/body.rs"]
mod tests;
