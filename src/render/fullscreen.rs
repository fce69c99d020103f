use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};

use crate::codec::encode_tile;
use crate::foundation::core::PanelSize;
use crate::foundation::error::{SpecterError, SpecterResult};

/// Decode an image file into RGBA.
pub fn decode_image(path: &Path) -> SpecterResult<DynamicImage> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read image '{}'", path.display()))
        .map_err(|e| SpecterError::decode(format!("{e:#}")))?;
    image::load_from_memory(&bytes)
        .map_err(|e| SpecterError::decode(format!("image '{}': {e}", path.display())))
}

/// Center-crop `img` to the panel aspect ratio, then resize to the exact panel size.
///
/// Sources wider than the panel lose columns on both sides, taller ones lose rows.
pub fn fit_to_panel(img: &DynamicImage, panel: PanelSize) -> RgbaImage {
    let (w, h) = (img.width().max(1), img.height().max(1));
    let panel_ratio = panel.aspect_ratio();
    let img_ratio = f64::from(w) / f64::from(h);
    let cropped = if img_ratio > panel_ratio {
        let new_w = ((f64::from(h) * panel_ratio) as u32).clamp(1, w);
        img.crop_imm((w - new_w) / 2, 0, new_w, h)
    } else {
        let new_h = ((f64::from(w) / panel_ratio) as u32).clamp(1, h);
        img.crop_imm(0, (h - new_h) / 2, w, new_h)
    };
    image::imageops::resize(
        &cropped.to_rgba8(),
        panel.width,
        panel.height,
        FilterType::Lanczos3,
    )
}

/// Stretch `img` to the panel without cropping (boot logo).
pub fn stretch_to_panel(img: &DynamicImage, panel: PanelSize) -> RgbaImage {
    image::imageops::resize(&img.to_rgba8(), panel.width, panel.height, FilterType::Lanczos3)
}

/// Packed full-panel pixels for the most recent image path.
///
/// A path that failed to decode is remembered and not retried until a different path is shown.
#[derive(Debug)]
pub struct ImageCache {
    panel: PanelSize,
    current: Option<(PathBuf, Arc<[u8]>)>,
    failed: Option<PathBuf>,
    decodes: u64,
}

impl ImageCache {
    pub fn new(panel: PanelSize) -> Self {
        Self {
            panel,
            current: None,
            failed: None,
            decodes: 0,
        }
    }

    /// Packed pixels for `path`, or `None` when it cannot be decoded.
    pub fn load(&mut self, path: &Path) -> Option<Arc<[u8]>> {
        if let Some((p, bytes)) = &self.current
            && p == path
        {
            return Some(Arc::clone(bytes));
        }
        if self.failed.as_deref() == Some(path) {
            return None;
        }
        self.decodes += 1;
        match decode_image(path) {
            Ok(img) => {
                let packed: Arc<[u8]> = encode_tile(&fit_to_panel(&img, self.panel)).into();
                tracing::debug!(path = %path.display(), "decoded full-screen image");
                self.failed = None;
                self.current = Some((path.to_path_buf(), Arc::clone(&packed)));
                Some(packed)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "image decode failed, keeping previous frame");
                self.failed = Some(path.to_path_buf());
                None
            }
        }
    }

    /// Forget the cached bitmap (the image was cleared from the display).
    pub fn clear(&mut self) {
        self.current = None;
        self.failed = None;
    }

    /// Number of decode attempts so far.
    pub fn decodes(&self) -> u64 {
        self.decodes
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/fullscreen.rs"]
mod tests;
