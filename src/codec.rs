//! RGB565 pixel codec.
//!
//! The panel takes 16 bits per pixel: red in the high 5 bits, green in the middle 6, blue in the
//! low 5, each pixel sent big-endian in row-major order. Reducing channel precision is lossy.

use image::RgbaImage;

use crate::foundation::core::Rgb;
use crate::foundation::error::{SpecterError, SpecterResult};

/// Pack one RGB triple by truncating each channel to 5/6/5 bits.
pub fn pack_rgb565(r: u8, g: u8, b: u8) -> u16 {
    ((u16::from(r) & 0xF8) << 8) | ((u16::from(g) & 0xFC) << 3) | (u16::from(b) >> 3)
}

/// Expand a packed pixel back to 8 bits per channel by bit replication.
pub fn unpack_rgb565(px: u16) -> Rgb {
    let r5 = ((px >> 11) & 0x1F) as u8;
    let g6 = ((px >> 5) & 0x3F) as u8;
    let b5 = (px & 0x1F) as u8;
    Rgb::new(
        (r5 << 3) | (r5 >> 2),
        (g6 << 2) | (g6 >> 4),
        (b5 << 3) | (b5 >> 2),
    )
}

pub fn pack_color(c: Rgb) -> u16 {
    pack_rgb565(c.r, c.g, c.b)
}

/// Encode a straight-alpha RGBA tile; translucent pixels are flattened over black.
pub fn encode_tile(tile: &RgbaImage) -> Vec<u8> {
    let mut out = Vec::with_capacity(tile.as_raw().len() / 2);
    encode_rgba8_into(&mut out, tile.as_raw());
    out
}

/// Append packed big-endian pixels for a row-major straight-alpha RGBA8 buffer.
pub fn encode_rgba8_into(dst: &mut Vec<u8>, rgba: &[u8]) {
    for px in rgba.chunks_exact(4) {
        let a = u16::from(px[3]);
        let packed = if a == 255 {
            pack_rgb565(px[0], px[1], px[2])
        } else {
            pack_rgb565(
                mul_div255(u16::from(px[0]), a),
                mul_div255(u16::from(px[1]), a),
                mul_div255(u16::from(px[2]), a),
            )
        };
        dst.extend_from_slice(&packed.to_be_bytes());
    }
}

/// Packed bytes for `pixel_count` pixels of one color.
pub fn encode_solid(color: Rgb, pixel_count: usize) -> Vec<u8> {
    let be = pack_color(color).to_be_bytes();
    let mut out = Vec::with_capacity(pixel_count * 2);
    for _ in 0..pixel_count {
        out.extend_from_slice(&be);
    }
    out
}

/// Decode packed big-endian bytes into an opaque RGBA image (used for previews and tests).
pub fn decode_tile(packed: &[u8], width: u32, height: u32) -> SpecterResult<RgbaImage> {
    let expected = (width as usize) * (height as usize) * 2;
    if packed.len() != expected {
        return Err(SpecterError::validation(format!(
            "packed tile is {} bytes, expected {expected} for {width}x{height}",
            packed.len()
        )));
    }
    let mut rgba = Vec::with_capacity(expected * 2);
    for px in packed.chunks_exact(2) {
        let c = unpack_rgb565(u16::from_be_bytes([px[0], px[1]]));
        rgba.extend_from_slice(&c.to_rgba8());
    }
    RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| SpecterError::validation("decoded tile buffer size mismatch"))
}

/// `x * y / 255`, rounded. Both inputs are channel-scale values (`0..=255`).
pub(crate) fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../tests/unit/codec.rs"]
mod tests;
