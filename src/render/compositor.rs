use std::sync::Arc;

use crate::codec::encode_tile;
use crate::display::state::DisplayState;
use crate::foundation::core::{PanelSize, Rgb, TileRect};
use crate::foundation::error::{SpecterError, SpecterResult};
use crate::render::body::{BodyMetrics, BodyStyle, ScrollRenderer};
use crate::render::header::{HeaderComposer, HeaderStyle};
use crate::render::fullscreen::ImageCache;
use crate::text::typeface::FontSet;

/// Packed RGB565 bytes for one panel rectangle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackedTile {
    pub rect: TileRect,
    pub bytes: Arc<[u8]>,
}

/// What one tick puts on the panel.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    /// Whole panel in one color.
    Fill(Rgb),
    /// Full-panel image.
    Image(PackedTile),
    /// Header strip above the scroll body.
    Layout {
        header: PackedTile,
        body: PackedTile,
        metrics: BodyMetrics,
    },
    /// Nothing new to show (image failed to decode); the panel keeps its previous content.
    Unchanged,
}

/// Turns [`DisplayState`] snapshots into packed tiles.
///
/// Precedence: solid fill, then image, then header and body.
pub struct Compositor {
    panel: PanelSize,
    fonts: FontSet,
    header: HeaderComposer,
    body: ScrollRenderer,
    images: ImageCache,
}

impl Compositor {
    pub fn new(panel: PanelSize, fonts: FontSet, header: HeaderStyle, body: BodyStyle) -> SpecterResult<Self> {
        if header.height == 0 || header.height >= panel.height {
            return Err(SpecterError::validation(format!(
                "header height {} must be within panel height {}",
                header.height, panel.height
            )));
        }
        let body_height = panel.height - header.height;
        Ok(Self {
            header: HeaderComposer::new(panel.width, header)?,
            body: ScrollRenderer::new(panel.width, body_height, body),
            images: ImageCache::new(panel),
            panel,
            fonts,
        })
    }

    pub fn panel(&self) -> PanelSize {
        self.panel
    }

    pub fn body(&self) -> &ScrollRenderer {
        &self.body
    }

    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    pub fn compose(&mut self, state: &DisplayState) -> SpecterResult<Frame> {
        if let Some(color) = state.fill {
            return Ok(Frame::Fill(color));
        }
        if let Some(path) = state.active_image() {
            return Ok(match self.images.load(path) {
                Some(bytes) => Frame::Image(PackedTile {
                    rect: self.panel.full_rect(),
                    bytes,
                }),
                None => Frame::Unchanged,
            });
        }
        self.images.clear();

        let header_height = self.header.height();
        let header = encode_tile(self.header.render(&mut self.fonts, state));
        let metrics = self.body.render(&mut self.fonts, state)?;
        let body = encode_tile(self.body.image());
        Ok(Frame::Layout {
            header: PackedTile {
                rect: TileRect::new(0, 0, self.panel.width, header_height),
                bytes: header.into(),
            },
            body: PackedTile {
                rect: TileRect::new(0, header_height, self.panel.width, self.body.height()),
                bytes: body.into(),
            },
            metrics,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
