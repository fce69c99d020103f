//! Frame composition: header strip, scrolling body, full-screen images.

pub mod battery;
pub mod body;
pub mod compositor;
pub mod fullscreen;
pub mod header;
pub mod line_cache;
pub mod scroll;
pub mod surface;

pub use battery::{BatteryGauge, BatteryStyle, label_color};
pub use body::{BodyMetrics, BodyStyle, ScrollRenderer};
pub use compositor::{Compositor, Frame, PackedTile};
pub use fullscreen::{ImageCache, decode_image, fit_to_panel, stretch_to_panel};
pub use header::{HeaderComposer, HeaderStyle};
pub use line_cache::{LineCache, LineTile};
pub use surface::Surface;
