use std::collections::HashMap;
use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::Rgb;
use crate::foundation::error::{SpecterError, SpecterResult};
use crate::render::surface::{Surface, paint};

/// Vertical metrics of one line of text at a given size, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LineMetrics {
    /// Distance from the top of the line to the baseline.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the line.
    pub descent: f32,
}

impl LineMetrics {
    pub fn line_height(self) -> f32 {
        self.ascent + self.descent
    }

    /// Integer line pitch used by the scroll body.
    pub fn line_height_px(self) -> u32 {
        self.line_height().ceil().max(1.0) as u32
    }
}

/// Font metrics source and glyph rasterizer.
///
/// `draw` positions text by its top-left corner; glyphs sit on `top + ascent`.
pub trait Typeface {
    /// Horizontal advance of `text` at `size_px`, trailing whitespace included.
    fn advance(&mut self, text: &str, size_px: f32) -> f32;
    fn metrics(&mut self, size_px: f32) -> LineMetrics;
    fn draw(&mut self, surface: &mut Surface, text: &str, size_px: f32, x: f32, y: f32, color: Rgb);
}

const ADVANCE_CACHE_LIMIT: usize = 4096;

/// TrueType/OpenType face shaped with `parley` and rasterized with `vello_cpu`.
pub struct FontFace {
    family: String,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Rgb>,
    font: vello_cpu::peniko::FontData,
    advance_cache: HashMap<(String, u32), f32>,
}

impl FontFace {
    pub fn from_path(path: &Path) -> SpecterResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read font '{}'", path.display()))
            .map_err(|e| SpecterError::decode(format!("{e:#}")))?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> SpecterResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| SpecterError::decode("no font families registered from font bytes"))?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| SpecterError::decode("registered font family has no name"))?
            .to_string();

        Ok(Self {
            family,
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            font: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0),
            advance_cache: HashMap::new(),
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    fn layout(&mut self, text: &str, size_px: f32) -> parley::Layout<Rgb> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        let mut layout: parley::Layout<Rgb> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

impl Typeface for FontFace {
    fn advance(&mut self, text: &str, size_px: f32) -> f32 {
        if text.is_empty() || !valid_size(size_px) {
            return 0.0;
        }
        let key = (text.to_string(), size_px.to_bits());
        if let Some(w) = self.advance_cache.get(&key) {
            return *w;
        }
        let w = self.layout(text, size_px).full_width();
        if self.advance_cache.len() >= ADVANCE_CACHE_LIMIT {
            self.advance_cache.clear();
        }
        self.advance_cache.insert(key, w);
        w
    }

    fn metrics(&mut self, size_px: f32) -> LineMetrics {
        if !valid_size(size_px) {
            return LineMetrics::default();
        }
        let layout = self.layout("Ag", size_px);
        layout
            .lines()
            .next()
            .map(|line| {
                let m = line.metrics();
                LineMetrics {
                    ascent: m.ascent,
                    descent: m.descent,
                }
            })
            .unwrap_or(LineMetrics {
                ascent: size_px * 0.8,
                descent: size_px * 0.2,
            })
    }

    fn draw(&mut self, surface: &mut Surface, text: &str, size_px: f32, x: f32, y: f32, color: Rgb) {
        if text.is_empty() || !valid_size(size_px) {
            return;
        }
        let layout = self.layout(text, size_px);
        let ctx = surface.context();
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((f64::from(x), f64::from(y))));
        ctx.set_paint(paint(color));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }
}

/// Deterministic face with fixed advances and box glyphs.
///
/// Narrow characters advance half the font size, wide (CJK, pictographic) characters the full
/// size. Used by tests and by previews when no font file is available.
#[derive(Clone, Copy, Debug)]
pub struct FixedFace {
    pub narrow_ratio: f32,
    pub ascent_ratio: f32,
    pub descent_ratio: f32,
}

impl Default for FixedFace {
    fn default() -> Self {
        Self {
            narrow_ratio: 0.5,
            ascent_ratio: 0.8,
            descent_ratio: 0.2,
        }
    }
}

impl FixedFace {
    fn char_advance(&self, c: char, size_px: f32) -> f32 {
        if is_wide(c) {
            size_px
        } else {
            size_px * self.narrow_ratio
        }
    }
}

impl Typeface for FixedFace {
    fn advance(&mut self, text: &str, size_px: f32) -> f32 {
        text.chars().map(|c| self.char_advance(c, size_px)).sum()
    }

    fn metrics(&mut self, size_px: f32) -> LineMetrics {
        LineMetrics {
            ascent: size_px * self.ascent_ratio,
            descent: size_px * self.descent_ratio,
        }
    }

    fn draw(&mut self, surface: &mut Surface, text: &str, size_px: f32, x: f32, y: f32, color: Rgb) {
        let top = f64::from(y + size_px * (self.ascent_ratio - 0.6).max(0.0));
        let bottom = f64::from(y + size_px * self.ascent_ratio);
        let mut cx = x;
        for c in text.chars() {
            let adv = self.char_advance(c, size_px);
            if !c.is_whitespace() {
                surface.fill_rect(
                    f64::from(cx + 1.0),
                    top,
                    f64::from(cx + adv - 1.0).max(f64::from(cx + 1.0)),
                    bottom,
                    color,
                );
            }
            cx += adv;
        }
    }
}

/// Text face plus an optional pictographic face sharing its baseline.
pub struct FontSet {
    text: Box<dyn Typeface>,
    pictographic: Option<Box<dyn Typeface>>,
}

impl FontSet {
    pub fn new(text: Box<dyn Typeface>, pictographic: Option<Box<dyn Typeface>>) -> Self {
        Self { text, pictographic }
    }

    /// Fixed-advance faces for headless rendering.
    pub fn fixed() -> Self {
        Self::new(Box::new(FixedFace::default()), None)
    }

    pub fn from_paths(text: &Path, pictographic: Option<&Path>) -> SpecterResult<Self> {
        let text_face = FontFace::from_path(text)?;
        let pictographic = match pictographic {
            Some(p) => Some(Box::new(FontFace::from_path(p)?) as Box<dyn Typeface>),
            None => None,
        };
        Ok(Self::new(Box::new(text_face), pictographic))
    }

    fn face_for(&mut self, pictographic: bool) -> &mut dyn Typeface {
        match (&mut self.pictographic, pictographic) {
            (Some(face), true) => face.as_mut(),
            _ => self.text.as_mut(),
        }
    }
}

impl Typeface for FontSet {
    fn advance(&mut self, text: &str, size_px: f32) -> f32 {
        split_runs(text)
            .into_iter()
            .map(|run| self.face_for(run.pictographic).advance(run.text, size_px))
            .sum()
    }

    fn metrics(&mut self, size_px: f32) -> LineMetrics {
        self.text.metrics(size_px)
    }

    fn draw(&mut self, surface: &mut Surface, text: &str, size_px: f32, x: f32, y: f32, color: Rgb) {
        let baseline = y + self.text.metrics(size_px).ascent;
        let mut cx = x;
        for run in split_runs(text) {
            let face = self.face_for(run.pictographic);
            let top = baseline - face.metrics(size_px).ascent;
            face.draw(surface, run.text, size_px, cx, top, color);
            cx += face.advance(run.text, size_px);
        }
    }
}

/// Maximal stretch of text drawn with one face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphRun<'a> {
    pub text: &'a str,
    pub pictographic: bool,
}

/// Split text into alternating ordinary/pictographic runs.
///
/// Zero-width joiners, variation selectors and skin-tone modifiers stay with the run they follow.
pub fn split_runs(text: &str) -> Vec<GlyphRun<'_>> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;
    for (i, c) in text.char_indices() {
        let kind = if is_joiner(c) {
            current.unwrap_or(false)
        } else {
            is_pictographic(c)
        };
        match current {
            Some(k) if k != kind => {
                runs.push(GlyphRun {
                    text: &text[start..i],
                    pictographic: k,
                });
                start = i;
                current = Some(kind);
            }
            None => current = Some(kind),
            _ => {}
        }
    }
    if let Some(k) = current {
        runs.push(GlyphRun {
            text: &text[start..],
            pictographic: k,
        });
    }
    runs
}

pub fn is_pictographic(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1F000..=0x1FAFF | 0x2600..=0x27BF | 0x2B50..=0x2B55 | 0x2300..=0x23FF
    )
}

fn is_joiner(c: char) -> bool {
    matches!(u32::from(c), 0x200D | 0xFE0E | 0xFE0F | 0x1F3FB..=0x1F3FF)
}

/// Characters laid out as standalone wrapping units (no word spaces in their scripts).
pub fn is_cjk(c: char) -> bool {
    matches!(
        u32::from(c),
        0x3040..=0x30FF | 0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xAC00..=0xD7AF | 0xF900..=0xFAFF
            | 0xFF00..=0xFFEF | 0x3000..=0x303F
    )
}

fn is_wide(c: char) -> bool {
    is_cjk(c) || is_pictographic(c)
}

fn valid_size(size_px: f32) -> bool {
    size_px.is_finite() && size_px > 0.0
}

#[cfg(test)]
#[path = "../../tests/unit/text/typeface.rs"]
mod tests;
