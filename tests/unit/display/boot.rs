use super::*;
use crate::display::transport::{MemoryTransport, TransportOp};

fn panel() -> PanelSize {
    PanelSize::new(12, 14).unwrap()
}

#[test]
fn logo_is_shown_bright_then_dimmed() {
    let dir = std::env::temp_dir().join(format!("specter_boot_logo_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let logo = dir.join("logo.png");
    image::RgbaImage::from_pixel(30, 30, image::Rgba([255, 0, 0, 255]))
        .save(&logo)
        .unwrap();

    let mut t = MemoryTransport::new(panel());
    show_logo(&mut t, Some(&logo), Duration::ZERO, 50).unwrap();
    assert_eq!(
        t.ops(),
        &[
            TransportOp::Backlight(100),
            TransportOp::Tile {
                rect: panel().full_rect(),
                len: panel().pixel_count() * 2
            },
            TransportOp::Backlight(50),
        ]
    );
    assert_eq!(t.pixel(6, 7), 0xF800);
}

#[test]
fn unreadable_logo_only_sets_backlight() {
    let mut t = MemoryTransport::new(panel());
    show_logo(&mut t, Some(Path::new("/nonexistent/logo.png")), Duration::ZERO, 40).unwrap();
    assert_eq!(t.ops(), &[TransportOp::Backlight(40)]);

    let mut t = MemoryTransport::new(panel());
    show_logo(&mut t, None, Duration::ZERO, 40).unwrap();
    assert_eq!(t.backlight(), 40);
}

#[test]
fn missing_ffmpeg_skips_video() {
    let mut t = MemoryTransport::new(panel());
    let stop = AtomicBool::new(false);
    let shown = play_boot_video(
        &mut t,
        "specter-test-no-such-ffmpeg",
        Path::new("boot.mp4"),
        Duration::from_millis(33),
        &stop,
    )
    .unwrap();
    assert_eq!(shown, 0);
    assert!(t.ops().is_empty());
}
