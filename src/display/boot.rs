use std::io::Read as _;
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::codec::encode_tile;
use crate::display::transport::DisplayTransport;
use crate::foundation::core::PanelSize;
use crate::foundation::error::{SpecterError, SpecterResult};
use crate::render::fullscreen::{decode_image, stretch_to_panel};

/// Show the logo full-screen at full brightness for `hold`, then settle at `backlight`.
///
/// A missing or unreadable logo is logged and skipped.
pub fn show_logo<T: DisplayTransport + ?Sized>(
    transport: &mut T,
    logo: Option<&Path>,
    hold: Duration,
    backlight: u8,
) -> SpecterResult<()> {
    if let Some(path) = logo {
        match decode_image(path) {
            Ok(img) => {
                let panel = transport.size();
                let packed = encode_tile(&stretch_to_panel(&img, panel));
                transport.set_backlight(100)?;
                transport.push_tile(panel.full_rect(), &packed)?;
                tracing::info!(path = %path.display(), "boot logo shown");
                std::thread::sleep(hold);
            }
            Err(e) => tracing::warn!(error = %e, "boot logo skipped"),
        }
    }
    transport.set_backlight(backlight)
}

pub fn is_program_on_path(program: &str) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Video decoded by the system `ffmpeg` into raw big-endian RGB565 panel frames.
pub struct BootVideo {
    child: Child,
    stdout: Option<ChildStdout>,
    frame: Vec<u8>,
}

impl BootVideo {
    pub fn spawn(ffmpeg: &str, path: &Path, panel: PanelSize) -> SpecterResult<Self> {
        let mut child = Command::new(ffmpeg)
            .args(["-loglevel", "error", "-i"])
            .arg(path)
            .args([
                "-an",
                "-vf",
                &format!("scale={}:{}", panel.width, panel.height),
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgb565be",
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| SpecterError::process(format!("failed to spawn {ffmpeg}: {e}")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SpecterError::process("failed to open ffmpeg stdout"))?;
        Ok(Self {
            child,
            stdout: Some(stdout),
            frame: vec![0; panel.pixel_count() * 2],
        })
    }

    /// Next packed frame, or `None` at end of stream.
    pub fn next_frame(&mut self) -> SpecterResult<Option<&[u8]>> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };
        match stdout.read_exact(&mut self.frame) {
            Ok(()) => Ok(Some(&self.frame)),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                self.stdout = None;
                Ok(None)
            }
            Err(e) => Err(SpecterError::process(format!("failed to read video frame: {e}"))),
        }
    }

    /// Stop decoding and reap the process.
    pub fn finish(mut self) -> SpecterResult<()> {
        drop(self.stdout.take());
        if matches!(self.child.try_wait(), Ok(None)) {
            let _ = self.child.kill();
        }
        self.child
            .wait()
            .map(|_| ())
            .map_err(|e| SpecterError::process(format!("failed to reap ffmpeg: {e}")))
    }
}

/// Play `path` once on the panel at `fps`. Returns the number of frames shown.
///
/// Process failures are returned as recoverable errors; transport failures are fatal.
pub fn play_boot_video<T: DisplayTransport + ?Sized>(
    transport: &mut T,
    ffmpeg: &str,
    path: &Path,
    frame_interval: Duration,
    stop: &AtomicBool,
) -> SpecterResult<u64> {
    if !is_program_on_path(ffmpeg) {
        tracing::warn!(ffmpeg, "ffmpeg not found, boot video skipped");
        return Ok(0);
    }
    let panel = transport.size();
    let mut video = BootVideo::spawn(ffmpeg, path, panel)?;
    let mut shown = 0u64;
    let result = loop {
        if stop.load(Ordering::Relaxed) {
            break Ok(());
        }
        let started = std::time::Instant::now();
        match video.next_frame() {
            Ok(Some(frame)) => {
                if let Err(e) = transport.push_tile(panel.full_rect(), frame) {
                    break Err(e);
                }
                shown += 1;
            }
            Ok(None) => break Ok(()),
            Err(e) => break Err(e),
        }
        if let Some(rest) = frame_interval.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }
    };
    video.finish()?;
    result?;
    tracing::info!(frames = shown, "boot video finished");
    Ok(shown)
}

#[cfg(test)]
#[path = "../../tests/unit/display/boot.rs"]
mod tests;
