//! Font measurement, glyph drawing and line wrapping.

pub mod typeface;
pub mod wrap;

pub use typeface::{FixedFace, FontFace, FontSet, GlyphRun, LineMetrics, Typeface, split_runs};
pub use wrap::{TextLayout, wrap_text};
