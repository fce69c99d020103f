use image::RgbaImage;

use crate::foundation::error::{SpecterError, SpecterResult};

#[derive(Clone, Debug, PartialEq, Eq)]
struct CacheKey {
    epoch: u64,
    first: usize,
    line_count: usize,
    line_height: u32,
    /// Visible lines concatenated.
    text: String,
}

/// Rasterized run of consecutive wrapped lines.
#[derive(Clone, Debug)]
pub struct LineTile {
    /// Index of the first line in the wrapped text.
    pub first: usize,
    pub lines: Vec<String>,
    pub line_height: u32,
    /// `lines.len() * line_height` pixels tall, first line at the top.
    pub image: RgbaImage,
}

impl LineTile {
    /// Vertical position of the tile inside the body at `scroll_offset`.
    pub fn body_y(&self, scroll_offset: u32) -> i64 {
        self.first as i64 * i64::from(self.line_height) - i64::from(scroll_offset)
    }
}

/// Single-entry cache of the visible-line raster, owned by the body renderer.
///
/// The entry is replaced wholesale when the visible line set changes or a new message starts.
#[derive(Debug, Default)]
pub struct LineCache {
    entry: Option<(CacheKey, LineTile)>,
    hits: u64,
    misses: u64,
}

impl LineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the tile for `lines`, rasterizing with `render` on a miss.
    pub fn get_or_render<F>(
        &mut self,
        epoch: u64,
        first: usize,
        lines: &[String],
        line_height: u32,
        render: F,
    ) -> SpecterResult<&LineTile>
    where
        F: FnOnce(&[String]) -> SpecterResult<RgbaImage>,
    {
        let key = CacheKey {
            epoch,
            first,
            line_count: lines.len(),
            line_height,
            text: lines.concat(),
        };
        if let Some((cached, _)) = &self.entry
            && cached.epoch != epoch
        {
            tracing::debug!(epoch, "new message, dropping line cache");
            self.entry = None;
        }
        let hit = self.entry.as_ref().is_some_and(|(k, _)| *k == key);
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
            tracing::debug!(first, lines = lines.len(), "line cache miss");
            let image = render(lines)?;
            let tile = LineTile {
                first,
                lines: lines.to_vec(),
                line_height,
                image,
            };
            self.entry = Some((key, tile));
        }
        match &self.entry {
            Some((_, tile)) => Ok(tile),
            None => Err(SpecterError::validation("line cache entry missing after render")),
        }
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Lines held by the current entry.
    pub fn visible_lines(&self) -> &[String] {
        self.entry
            .as_ref()
            .map(|(_, tile)| tile.lines.as_slice())
            .unwrap_or(&[])
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/line_cache.rs"]
mod tests;
