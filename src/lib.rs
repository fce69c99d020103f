#![forbid(unsafe_code)]

pub mod capture;
pub mod codec;
pub mod config;
pub mod display;
mod foundation;
pub mod logging;
pub mod render;
pub mod shutdown;
pub mod text;

pub use capture::{CaptureMachine, CaptureState, TogglePolicy};
pub use config::Config;
pub use display::{DisplayState, DisplayTransport, DisplayUpdate, FrameLoop, SharedDisplay};
pub use foundation::core::{Fps, PanelSize, Rgb, TileRect};
pub use foundation::error::{SpecterError, SpecterResult};
pub use render::{Compositor, Frame};
