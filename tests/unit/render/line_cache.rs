use super::*;

fn lines(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn blank(lines: &[String]) -> SpecterResult<RgbaImage> {
    Ok(RgbaImage::new(4, 10 * lines.len().max(1) as u32))
}

#[test]
fn same_visible_lines_hit() {
    let mut cache = LineCache::new();
    let l = lines(&["alpha", "beta"]);
    cache.get_or_render(0, 0, &l, 10, blank).unwrap();
    cache.get_or_render(0, 0, &l, 10, blank).unwrap();
    assert_eq!(cache.misses(), 1);
    assert_eq!(cache.hits(), 1);
    assert_eq!(cache.visible_lines(), l.as_slice());
}

#[test]
fn changed_window_or_epoch_misses() {
    let mut cache = LineCache::new();
    cache.get_or_render(0, 0, &lines(&["a", "b"]), 10, blank).unwrap();
    cache.get_or_render(0, 1, &lines(&["b", "c"]), 10, blank).unwrap();
    cache.get_or_render(1, 1, &lines(&["b", "c"]), 10, blank).unwrap();
    assert_eq!(cache.misses(), 3);
    assert_eq!(cache.hits(), 0);
}

#[test]
fn render_failure_leaves_no_entry() {
    let mut cache = LineCache::new();
    let err = cache
        .get_or_render(0, 0, &lines(&["a"]), 10, |_| Err(SpecterError::decode("boom")))
        .err()
        .unwrap();
    assert!(matches!(err, SpecterError::Decode(_)));
    assert!(cache.visible_lines().is_empty());
}

#[test]
fn tile_position_follows_scroll() {
    let mut cache = LineCache::new();
    let tile = cache.get_or_render(0, 3, &lines(&["x"]), 20, blank).unwrap();
    assert_eq!(tile.body_y(0), 60);
    assert_eq!(tile.body_y(70), -10);
}
