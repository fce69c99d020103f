use super::*;

fn with_text(text: &str) -> SharedDisplay {
    let shared = SharedDisplay::default();
    shared.update(&DisplayUpdate::new().body_text(text));
    shared
}

#[test]
fn defaults_match_idle_screen() {
    let s = DisplayState::default();
    assert_eq!(s.status, "Hello");
    assert_eq!(s.body_text.as_deref(), Some("Waiting for message..."));
    assert_eq!(s.scroll_speed, 6);
    assert_eq!(s.battery_level, Some(100));
    assert!(s.active_image().is_none());
}

#[test]
fn new_message_resets_scroll() {
    let shared = with_text("Hello");
    let epoch = shared.snapshot().message_epoch;
    assert!(shared.advance_scroll(epoch, 40));
    let next = shared.update(&DisplayUpdate::new().body_text("Goodbye"));
    assert_eq!(next.scroll_offset, 0);
    assert_eq!(next.message_epoch, epoch + 1);
}

#[test]
fn continuation_preserves_scroll() {
    let shared = with_text("Hello");
    let epoch = shared.snapshot().message_epoch;
    assert!(shared.advance_scroll(epoch, 40));
    let next = shared.update(&DisplayUpdate::new().body_text("Hello there"));
    assert_eq!(next.scroll_offset, 40);
    assert_eq!(next.message_epoch, epoch);
    assert_eq!(next.body_text.as_deref(), Some("Hello there"));
}

#[test]
fn unset_fields_are_kept() {
    let shared = with_text("Hello");
    let next = shared.update(&DisplayUpdate::new().status("Listening"));
    assert_eq!(next.status, "Listening");
    assert_eq!(next.body_text.as_deref(), Some("Hello"));
    assert_eq!(next.glyph, "😄");
}

#[test]
fn stale_autoscroll_is_dropped() {
    let shared = with_text("first");
    let stale = shared.snapshot().message_epoch;
    shared.update(&DisplayUpdate::new().body_text("second"));
    assert!(!shared.advance_scroll(stale, 12));
    assert_eq!(shared.snapshot().scroll_offset, 0);
}

#[test]
fn image_and_fill_can_be_cleared() {
    let shared = SharedDisplay::default();
    shared.update(&DisplayUpdate::new().image("img/rec.png").fill(Rgb::RED));
    let s = shared.snapshot();
    assert_eq!(s.active_image(), Some(std::path::Path::new("img/rec.png")));
    assert_eq!(s.fill, Some(Rgb::RED));

    let s = shared.update(&DisplayUpdate::new().clear_image().clear_fill());
    assert!(s.active_image().is_none());
    assert!(s.fill.is_none());

    let s = shared.update(&DisplayUpdate::new().image(""));
    assert!(s.active_image().is_none());
}

#[test]
fn snapshots_are_not_affected_by_later_updates() {
    let shared = with_text("Hello");
    let before = shared.snapshot();
    shared.update(&DisplayUpdate::new().status("Busy").body_text("Other"));
    assert_eq!(before.status, "Hello");
    assert_eq!(before.body_text.as_deref(), Some("Hello"));
}
