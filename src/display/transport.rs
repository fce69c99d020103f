use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::RgbaImage;

use crate::codec::decode_tile;
use crate::foundation::core::{PanelSize, TileRect};
use crate::foundation::error::{SpecterError, SpecterResult};

/// Display driver seen by the frame loop.
///
/// Pixel data is packed RGB565, big-endian, row-major.
pub trait DisplayTransport {
    fn size(&self) -> PanelSize;
    fn set_backlight(&mut self, percent: u8) -> SpecterResult<()>;
    fn fill_rect(&mut self, rect: TileRect, color: u16) -> SpecterResult<()>;
    fn push_tile(&mut self, rect: TileRect, packed: &[u8]) -> SpecterResult<()>;
    /// Backlight off and hardware handed back. Further writes fail.
    fn release(&mut self) -> SpecterResult<()>;
}

fn check_tile(panel: PanelSize, rect: TileRect, len: usize) -> SpecterResult<()> {
    rect.validate(panel)
        .map_err(|e| SpecterError::transport(e.to_string()))?;
    if len != rect.byte_len() {
        return Err(SpecterError::transport(format!(
            "tile {}x{} needs {} bytes, got {len}",
            rect.width,
            rect.height,
            rect.byte_len()
        )));
    }
    Ok(())
}

/// One recorded transport call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportOp {
    Backlight(u8),
    Fill { rect: TileRect, color: u16 },
    Tile { rect: TileRect, len: usize },
    Release,
}

/// In-memory panel that records every call.
#[derive(Debug)]
pub struct MemoryTransport {
    size: PanelSize,
    panel: Vec<u8>,
    ops: Vec<TransportOp>,
    backlight: u8,
    released: bool,
    fail_writes: bool,
}

impl MemoryTransport {
    pub fn new(size: PanelSize) -> Self {
        Self {
            size,
            panel: vec![0; size.pixel_count() * 2],
            ops: Vec::new(),
            backlight: 0,
            released: false,
            fail_writes: false,
        }
    }

    pub fn ops(&self) -> &[TransportOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    pub fn backlight(&self) -> u8 {
        self.backlight
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Make every later pixel write fail, as a disconnected panel would.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Packed big-endian panel contents.
    pub fn packed(&self) -> &[u8] {
        &self.panel
    }

    pub fn pixel(&self, x: u32, y: u32) -> u16 {
        let i = ((y * self.size.width + x) * 2) as usize;
        u16::from_be_bytes([self.panel[i], self.panel[i + 1]])
    }

    pub fn to_image(&self) -> SpecterResult<RgbaImage> {
        decode_tile(&self.panel, self.size.width, self.size.height)
    }

    fn writable(&self) -> SpecterResult<()> {
        if self.released {
            return Err(SpecterError::transport("transport already released"));
        }
        if self.fail_writes {
            return Err(SpecterError::transport("simulated panel write failure"));
        }
        Ok(())
    }

    fn blit(&mut self, rect: TileRect, row_bytes: impl Fn(usize) -> Vec<u8>) {
        let stride = (self.size.width * 2) as usize;
        for row in 0..rect.height as usize {
            let start = (rect.y as usize + row) * stride + rect.x as usize * 2;
            let src = row_bytes(row);
            self.panel[start..start + src.len()].copy_from_slice(&src);
        }
    }
}

impl DisplayTransport for MemoryTransport {
    fn size(&self) -> PanelSize {
        self.size
    }

    fn set_backlight(&mut self, percent: u8) -> SpecterResult<()> {
        if self.released {
            return Err(SpecterError::transport("transport already released"));
        }
        self.backlight = percent.min(100);
        self.ops.push(TransportOp::Backlight(self.backlight));
        Ok(())
    }

    fn fill_rect(&mut self, rect: TileRect, color: u16) -> SpecterResult<()> {
        self.writable()?;
        check_tile(self.size, rect, rect.byte_len())?;
        let row: Vec<u8> = color
            .to_be_bytes()
            .iter()
            .copied()
            .cycle()
            .take(rect.width as usize * 2)
            .collect();
        self.blit(rect, |_| row.clone());
        self.ops.push(TransportOp::Fill { rect, color });
        Ok(())
    }

    fn push_tile(&mut self, rect: TileRect, packed: &[u8]) -> SpecterResult<()> {
        self.writable()?;
        check_tile(self.size, rect, packed.len())?;
        let row_len = rect.width as usize * 2;
        self.blit(rect, |row| packed[row * row_len..(row + 1) * row_len].to_vec());
        self.ops.push(TransportOp::Tile {
            rect,
            len: packed.len(),
        });
        Ok(())
    }

    fn release(&mut self) -> SpecterResult<()> {
        if self.released {
            return Ok(());
        }
        self.backlight = 0;
        self.released = true;
        self.ops.push(TransportOp::Release);
        Ok(())
    }
}

/// Framebuffer device settings.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FramebufferConfig {
    pub device: PathBuf,
    /// Bytes per framebuffer row; `None` means tightly packed (`width * 2`).
    pub line_length: Option<u32>,
    /// Write pixels little-endian, as most Linux RGB565 framebuffers expect.
    pub swap_bytes: bool,
    /// sysfs brightness file, e.g. `/sys/class/backlight/<dev>/brightness`.
    pub backlight: Option<PathBuf>,
}

impl Default for FramebufferConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/fb1"),
            line_length: None,
            swap_bytes: true,
            backlight: None,
        }
    }
}

/// Linux framebuffer device driven with row-wise seeks.
#[derive(Debug)]
pub struct FramebufferTransport {
    size: PanelSize,
    file: Option<File>,
    line_length: u64,
    swap_bytes: bool,
    backlight: Option<Backlight>,
}

#[derive(Debug)]
struct Backlight {
    path: PathBuf,
    max: u32,
}

impl Backlight {
    fn open(path: &Path) -> Self {
        let max = path
            .parent()
            .map(|dir| dir.join("max_brightness"))
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(100);
        Self {
            path: path.to_path_buf(),
            max,
        }
    }

    fn set(&self, percent: u8) -> SpecterResult<()> {
        let value = u32::from(percent.min(100)) * self.max / 100;
        std::fs::write(&self.path, value.to_string())
            .with_context(|| format!("failed to write backlight '{}'", self.path.display()))
            .map_err(|e| SpecterError::transport(format!("{e:#}")))
    }
}

impl FramebufferTransport {
    pub fn open(size: PanelSize, cfg: &FramebufferConfig) -> SpecterResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&cfg.device)
            .with_context(|| format!("failed to open framebuffer '{}'", cfg.device.display()))
            .map_err(|e| SpecterError::transport(format!("{e:#}")))?;
        let line_length = cfg.line_length.unwrap_or(size.width * 2);
        if line_length < size.width * 2 {
            return Err(SpecterError::validation(format!(
                "framebuffer line length {line_length} is shorter than one panel row"
            )));
        }
        tracing::info!(device = %cfg.device.display(), width = size.width, height = size.height, "opened framebuffer");
        Ok(Self {
            size,
            file: Some(file),
            line_length: u64::from(line_length),
            swap_bytes: cfg.swap_bytes,
            backlight: cfg.backlight.as_deref().map(Backlight::open),
        })
    }

    fn write_rows(&mut self, rect: TileRect, row_bytes: impl Fn(usize) -> Vec<u8>) -> SpecterResult<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| SpecterError::transport("framebuffer already released"))?;
        for row in 0..rect.height as usize {
            let offset = (u64::from(rect.y) + row as u64) * self.line_length + u64::from(rect.x) * 2;
            let mut bytes = row_bytes(row);
            if self.swap_bytes {
                for px in bytes.chunks_exact_mut(2) {
                    px.swap(0, 1);
                }
            }
            file.seek(SeekFrom::Start(offset))
                .and_then(|_| file.write_all(&bytes))
                .map_err(|e| SpecterError::transport(format!("framebuffer write failed: {e}")))?;
        }
        file.flush()
            .map_err(|e| SpecterError::transport(format!("framebuffer flush failed: {e}")))
    }
}

impl DisplayTransport for FramebufferTransport {
    fn size(&self) -> PanelSize {
        self.size
    }

    fn set_backlight(&mut self, percent: u8) -> SpecterResult<()> {
        match &self.backlight {
            Some(b) => b.set(percent),
            None => {
                tracing::debug!(percent, "no backlight control configured");
                Ok(())
            }
        }
    }

    fn fill_rect(&mut self, rect: TileRect, color: u16) -> SpecterResult<()> {
        check_tile(self.size, rect, rect.byte_len())?;
        let row: Vec<u8> = color
            .to_be_bytes()
            .iter()
            .copied()
            .cycle()
            .take(rect.width as usize * 2)
            .collect();
        self.write_rows(rect, |_| row.clone())
    }

    fn push_tile(&mut self, rect: TileRect, packed: &[u8]) -> SpecterResult<()> {
        check_tile(self.size, rect, packed.len())?;
        let row_len = rect.width as usize * 2;
        self.write_rows(rect, |row| packed[row * row_len..(row + 1) * row_len].to_vec())
    }

    fn release(&mut self) -> SpecterResult<()> {
        if self.file.is_none() {
            return Ok(());
        }
        let blank = self.fill_rect(self.size.full_rect(), 0);
        let backlight = self.set_backlight(0);
        self.file = None;
        tracing::info!("display released");
        blank.and(backlight)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/display/transport.rs"]
mod tests;
