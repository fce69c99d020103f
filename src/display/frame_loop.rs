use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::codec::pack_color;
use crate::display::state::SharedDisplay;
use crate::display::transport::DisplayTransport;
use crate::foundation::core::Fps;
use crate::foundation::error::SpecterResult;
use crate::render::compositor::{Compositor, Frame};
use crate::render::scroll::next_offset;

/// Counters reported when the loop stops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frames: u64,
    /// Ticks that left the panel untouched.
    pub unchanged: u64,
    /// Ticks that took longer than the frame interval.
    pub overruns: u64,
}

/// Fixed-rate renderer: snapshot the shared state, compose, push, advance autoscroll.
///
/// Only reads [`SharedDisplay`], except for storing the autoscroll offset, which is dropped if a
/// new message was published during the tick.
pub struct FrameLoop<T: DisplayTransport> {
    compositor: Compositor,
    transport: T,
    display: SharedDisplay,
    interval: Duration,
    stats: FrameStats,
}

impl<T: DisplayTransport> FrameLoop<T> {
    pub fn new(compositor: Compositor, transport: T, display: SharedDisplay, fps: Fps) -> Self {
        Self {
            compositor,
            transport,
            display,
            interval: fps.frame_duration(),
            stats: FrameStats::default(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Render one frame. Only transport and validation failures are returned.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn tick(&mut self) -> SpecterResult<()> {
        let state = self.display.snapshot();
        let frame = match self.compositor.compose(&state) {
            Ok(frame) => frame,
            Err(e) if !e.is_fatal() => {
                tracing::warn!(error = %e, "frame composition failed, keeping previous frame");
                Frame::Unchanged
            }
            Err(e) => return Err(e),
        };

        match frame {
            Frame::Fill(color) => {
                let rect = self.transport.size().full_rect();
                self.transport.fill_rect(rect, pack_color(color))?;
            }
            Frame::Image(tile) => self.transport.push_tile(tile.rect, &tile.bytes)?,
            Frame::Layout {
                header,
                body,
                metrics,
            } => {
                self.transport.push_tile(header.rect, &header.bytes)?;
                self.transport.push_tile(body.rect, &body.bytes)?;
                let next = next_offset(
                    state.scroll_offset,
                    state.scroll_speed,
                    metrics.line_count,
                    metrics.line_height,
                    metrics.body_height,
                );
                if next != state.scroll_offset
                    && !self.display.advance_scroll(state.message_epoch, next)
                {
                    tracing::debug!("new message arrived mid-tick, autoscroll dropped");
                }
            }
            Frame::Unchanged => self.stats.unchanged += 1,
        }
        self.stats.frames += 1;
        Ok(())
    }

    /// Tick at the configured rate until `stop` is set.
    pub fn run(&mut self, stop: &AtomicBool) -> SpecterResult<FrameStats> {
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "frame loop started");
        while !stop.load(Ordering::Relaxed) {
            let started = Instant::now();
            self.tick()?;
            let elapsed = started.elapsed();
            match self.interval.checked_sub(elapsed) {
                Some(rest) => std::thread::sleep(rest),
                None => self.stats.overruns += 1,
            }
        }
        tracing::info!(frames = self.stats.frames, overruns = self.stats.overruns, "frame loop stopped");
        Ok(self.stats)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/display/frame_loop.rs"]
mod tests;
