//! Panel side: shared state, transports, the frame loop and input.

pub mod boot;
pub mod button;
pub mod frame_loop;
pub mod state;
pub mod transport;

pub use boot::{BootVideo, play_boot_video, show_logo};
pub use button::{ButtonEvent, EdgeDetector, GpioButtonConfig, spawn_gpio_button, spawn_line_button};
pub use frame_loop::{FrameLoop, FrameStats};
pub use state::{DisplayState, DisplayUpdate, SharedDisplay};
pub use transport::{
    DisplayTransport, FramebufferConfig, FramebufferTransport, MemoryTransport, TransportOp,
};
