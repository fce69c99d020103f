//! Scroll window arithmetic for the text body.
//!
//! Lines have a uniform height `h`. Line `i` is visible at offset `s` in a body `b` pixels tall
//! iff `(i+1)*h >= s` and `i*h - s <= b`.

use std::ops::Range;

/// Indices of the lines visible at `offset`.
pub fn visible_range(line_count: usize, line_height: u32, offset: u32, body_height: u32) -> Range<usize> {
    if line_count == 0 || line_height == 0 {
        return 0..0;
    }
    let h = u64::from(line_height);
    let s = u64::from(offset);
    let first = s.div_ceil(h).saturating_sub(1);
    let last = (s + u64::from(body_height)) / h;
    let start = usize::try_from(first).unwrap_or(usize::MAX).min(line_count);
    let end = usize::try_from(last.saturating_add(1))
        .unwrap_or(usize::MAX)
        .min(line_count);
    start..end.max(start)
}

/// Largest offset autoscroll will reach: `(line_count + 1) * h - body_height`, floored at zero.
pub fn max_scroll(line_count: usize, line_height: u32, body_height: u32) -> u32 {
    let total = (line_count as u64 + 1) * u64::from(line_height);
    u32::try_from(total.saturating_sub(u64::from(body_height))).unwrap_or(u32::MAX)
}

/// Offset for the next tick. Advances by `speed` until `max_scroll`, never past it, never wrapping.
pub fn next_offset(offset: u32, speed: u32, line_count: usize, line_height: u32, body_height: u32) -> u32 {
    let max = max_scroll(line_count, line_height, body_height);
    if speed > 0 && offset < max {
        offset.saturating_add(speed).min(max)
    } else {
        offset
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/scroll.rs"]
mod tests;
