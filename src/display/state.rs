use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use crate::foundation::core::Rgb;

/// Everything the frame loop needs to draw one frame.
///
/// Records are immutable once published; writers build a new record and swap it in.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayState {
    pub status: String,
    pub glyph: String,
    pub body_text: Option<String>,
    pub scroll_offset: u32,
    pub scroll_speed: u32,
    pub battery_level: Option<u8>,
    pub battery_color: Option<Rgb>,
    pub image_path: Option<PathBuf>,
    /// Solid full-panel color. Takes precedence over the image and the header/body layout.
    pub fill: Option<Rgb>,
    /// Bumped on every non-continuation body text update.
    pub message_epoch: u64,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            status: "Hello".to_string(),
            glyph: "😄".to_string(),
            body_text: Some("Waiting for message...".to_string()),
            scroll_offset: 0,
            scroll_speed: 6,
            battery_level: Some(100),
            battery_color: Some(Rgb::new(0x55, 0xFF, 0x00)),
            image_path: None,
            fill: None,
            message_epoch: 0,
        }
    }
}

impl DisplayState {
    /// Image path to show, if any. Empty paths count as unset.
    pub fn active_image(&self) -> Option<&std::path::Path> {
        self.image_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// Apply a patch, producing the next record.
    ///
    /// Body text that does not extend the current text starts a new message: the scroll offset
    /// returns to zero and the epoch advances.
    pub fn apply(&self, update: &DisplayUpdate) -> DisplayState {
        let mut next = self.clone();
        if let Some(status) = &update.status {
            next.status = status.clone();
        }
        if let Some(glyph) = &update.glyph {
            next.glyph = glyph.clone();
        }
        if let Some(text) = &update.body_text {
            let continuation = match (&self.body_text, text) {
                (Some(old), Some(new)) => new.starts_with(old.as_str()),
                (None, None) => true,
                _ => false,
            };
            if !continuation {
                next.scroll_offset = 0;
                next.message_epoch = self.message_epoch.wrapping_add(1);
            }
            next.body_text = text.clone();
        }
        if let Some(offset) = update.scroll_offset {
            next.scroll_offset = offset;
        }
        if let Some(speed) = update.scroll_speed {
            next.scroll_speed = speed;
        }
        if let Some(level) = update.battery_level {
            next.battery_level = level.map(|l| l.min(100));
        }
        if let Some(color) = update.battery_color {
            next.battery_color = color;
        }
        if let Some(path) = &update.image_path {
            next.image_path = path.clone();
        }
        if let Some(fill) = update.fill {
            next.fill = fill;
        }
        next
    }
}

/// Partial update of a [`DisplayState`]. `None` keeps a field, `Some` replaces it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayUpdate {
    pub status: Option<String>,
    pub glyph: Option<String>,
    pub body_text: Option<Option<String>>,
    pub scroll_offset: Option<u32>,
    pub scroll_speed: Option<u32>,
    pub battery_level: Option<Option<u8>>,
    pub battery_color: Option<Option<Rgb>>,
    pub image_path: Option<Option<PathBuf>>,
    pub fill: Option<Option<Rgb>>,
}

impl DisplayUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn glyph(mut self, glyph: impl Into<String>) -> Self {
        self.glyph = Some(glyph.into());
        self
    }

    pub fn body_text(mut self, text: impl Into<String>) -> Self {
        self.body_text = Some(Some(text.into()));
        self
    }

    pub fn clear_body_text(mut self) -> Self {
        self.body_text = Some(None);
        self
    }

    pub fn scroll_offset(mut self, offset: u32) -> Self {
        self.scroll_offset = Some(offset);
        self
    }

    pub fn scroll_speed(mut self, speed: u32) -> Self {
        self.scroll_speed = Some(speed);
        self
    }

    pub fn battery(mut self, level: u8, color: Rgb) -> Self {
        self.battery_level = Some(Some(level));
        self.battery_color = Some(Some(color));
        self
    }

    pub fn image(mut self, path: impl Into<PathBuf>) -> Self {
        self.image_path = Some(Some(path.into()));
        self
    }

    pub fn clear_image(mut self) -> Self {
        self.image_path = Some(None);
        self
    }

    pub fn fill(mut self, color: Rgb) -> Self {
        self.fill = Some(Some(color));
        self
    }

    pub fn clear_fill(mut self) -> Self {
        self.fill = Some(None);
        self
    }
}

/// Display record shared between the controller (writer) and the frame loop (reader).
#[derive(Clone, Debug, Default)]
pub struct SharedDisplay {
    inner: Arc<RwLock<Arc<DisplayState>>>,
}

impl SharedDisplay {
    pub fn new(state: DisplayState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(state))),
        }
    }

    /// Consistent view of the whole record.
    pub fn snapshot(&self) -> Arc<DisplayState> {
        Arc::clone(&self.inner.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Apply `update` as one swap and return the published record.
    pub fn update(&self, update: &DisplayUpdate) -> Arc<DisplayState> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let next = Arc::new(guard.apply(update));
        *guard = Arc::clone(&next);
        next
    }

    /// Store an autoscroll result computed from a snapshot taken at `epoch`.
    ///
    /// Returns `false`, leaving the record alone, when a new message arrived in between.
    pub fn advance_scroll(&self, epoch: u64, offset: u32) -> bool {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if guard.message_epoch != epoch {
            return false;
        }
        if guard.scroll_offset != offset {
            let mut next = (**guard).clone();
            next.scroll_offset = offset;
            *guard = Arc::new(next);
        }
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/display/state.rs"]
mod tests;
