use unicode_segmentation::UnicodeSegmentation;

use crate::text::typeface::{Typeface, is_cjk};

/// Greedily wrap `text` into lines no wider than `max_width` pixels.
///
/// Words are the wrapping unit, except CJK characters which wrap individually. `\n` forces a
/// break, a unit wider than a whole line is split between characters, and trailing whitespace
/// does not count against the width. Breaks only fall on grapheme cluster boundaries, so combining
/// marks and joined emoji stay with their base. Empty text yields no lines.
pub fn wrap_text(face: &mut dyn Typeface, text: &str, size_px: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    if text.is_empty() {
        return lines;
    }
    for paragraph in text.split('\n') {
        let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);
        let mut line = String::new();
        for unit in units(paragraph) {
            let mut candidate = line.clone();
            candidate.push_str(unit);
            if face.advance(candidate.trim_end(), size_px) <= max_width {
                line = candidate;
                continue;
            }
            if !line.trim().is_empty() {
                lines.push(line.trim_end().to_string());
            }
            line.clear();
            if face.advance(unit.trim_end(), size_px) <= max_width {
                line.push_str(unit);
                continue;
            }
            for grapheme in unit.graphemes(true) {
                let mut candidate = line.clone();
                candidate.push_str(grapheme);
                if line.is_empty() || face.advance(candidate.trim_end(), size_px) <= max_width {
                    line = candidate;
                } else {
                    lines.push(line.trim_end().to_string());
                    line = grapheme.to_string();
                }
            }
        }
        lines.push(line.trim_end().to_string());
    }
    lines
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Piece {
    Word,
    Space,
    Cjk,
}

/// Word-boundary segments of `paragraph` with their byte offsets. CJK segments are broken
/// further into grapheme clusters.
fn pieces(paragraph: &str) -> Vec<(usize, Piece)> {
    let mut out = Vec::new();
    for (i, segment) in paragraph.split_word_bound_indices() {
        if segment.chars().all(char::is_whitespace) {
            out.push((i, Piece::Space));
        } else if segment.starts_with(is_cjk) {
            out.extend(segment.grapheme_indices(true).map(|(j, _)| (i + j, Piece::Cjk)));
        } else {
            out.push((i, Piece::Word));
        }
    }
    out
}

/// Split a paragraph into wrapping units, each carrying its trailing whitespace.
fn units(paragraph: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut prev: Option<Piece> = None;
    for (i, piece) in pieces(paragraph) {
        if let Some(p) = prev {
            let boundary =
                piece != Piece::Space && (p == Piece::Space || piece == Piece::Cjk || p == Piece::Cjk);
            if boundary {
                out.push(&paragraph[start..i]);
                start = i;
            }
        }
        prev = Some(piece);
    }
    if start < paragraph.len() {
        out.push(&paragraph[start..]);
    }
    out
}

#[derive(Clone, Debug, PartialEq)]
struct LayoutKey {
    text: String,
    size_bits: u32,
    width_bits: u32,
}

/// Memoised wrapping for the scroll body.
///
/// Lines are recomputed only when the text, font size or available width change, or after
/// [`TextLayout::invalidate`] (font swapped).
#[derive(Debug, Default)]
pub struct TextLayout {
    key: Option<LayoutKey>,
    lines: Vec<String>,
    recomputes: u64,
}

impl TextLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&mut self, face: &mut dyn Typeface, text: &str, size_px: f32, max_width: f32) -> &[String] {
        let hit = self.key.as_ref().is_some_and(|k| {
            k.text == text && k.size_bits == size_px.to_bits() && k.width_bits == max_width.to_bits()
        });
        if !hit {
            self.lines = wrap_text(face, text, size_px, max_width);
            self.key = Some(LayoutKey {
                text: text.to_string(),
                size_bits: size_px.to_bits(),
                width_bits: max_width.to_bits(),
            });
            self.recomputes += 1;
            tracing::debug!(lines = self.lines.len(), "rewrapped body text");
        }
        &self.lines
    }

    pub fn invalidate(&mut self) {
        self.key = None;
    }

    /// Number of times wrapping actually ran.
    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/wrap.rs"]
mod tests;
