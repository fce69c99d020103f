use super::*;
use crate::display::state::DisplayUpdate;
use crate::render::scroll::visible_range;
use crate::text::typeface::FixedFace;
use crate::text::wrap::wrap_text;

fn state(text: &str, offset: u32) -> DisplayState {
    DisplayState::default().apply(&DisplayUpdate::new().body_text(text).scroll_offset(offset))
}

fn long_text() -> String {
    (0..40).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ")
}

#[test]
fn first_line_sits_at_the_margin() {
    let mut body = ScrollRenderer::new(240, 182, BodyStyle::default());
    let mut face = FixedFace::default();
    let m = body.render(&mut face, &state("Hello", 0)).unwrap();
    assert_eq!(m.line_count, 1);
    assert_eq!(m.line_height, 20);
    assert_eq!(body.image().get_pixel(15, 10).0, [255, 255, 255, 255]);
    assert_eq!(body.image().get_pixel(5, 10).0, [0, 0, 0, 255]);
}

#[test]
fn offset_shifts_the_cached_tile_up() {
    let mut body = ScrollRenderer::new(240, 182, BodyStyle::default());
    let mut face = FixedFace::default();
    body.render(&mut face, &state("Hello", 10)).unwrap();
    assert_eq!(body.image().get_pixel(15, 3).0, [255, 255, 255, 255]);
    assert_eq!(body.image().get_pixel(15, 10).0, [0, 0, 0, 255]);
}

#[test]
fn rerender_without_changes_is_byte_identical() {
    let mut body = ScrollRenderer::new(240, 182, BodyStyle::default());
    let mut face = FixedFace::default();
    let s = state(&long_text(), 30);
    body.render(&mut face, &s).unwrap();
    let first = body.image().clone();
    body.render(&mut face, &s).unwrap();
    assert_eq!(first.as_raw(), body.image().as_raw());
    assert_eq!(body.cache().misses(), 1);
    assert_eq!(body.cache().hits(), 1);
}

#[test]
fn cache_holds_exactly_the_visible_window() {
    let text = long_text();
    let mut face = FixedFace::default();
    let wrapped = wrap_text(&mut face, &text, 20.0, 220.0);
    let mut body = ScrollRenderer::new(240, 182, BodyStyle::default());
    let m = body.render(&mut face, &state(&text, 0)).unwrap();
    let max = crate::render::scroll::max_scroll(m.line_count, m.line_height, 182);
    for offset in (0..=max).step_by(7) {
        body.render(&mut face, &state(&text, offset)).unwrap();
        let range = visible_range(wrapped.len(), 20, offset, 182);
        assert_eq!(body.cache().visible_lines(), &wrapped[range]);
    }
}

#[test]
fn empty_body_is_background_only() {
    let mut body = ScrollRenderer::new(240, 182, BodyStyle::default());
    let mut face = FixedFace::default();
    let mut s = DisplayState::default();
    s.body_text = None;
    let m = body.render(&mut face, &s).unwrap();
    assert_eq!(m.line_count, 0);
    assert!(body.image().pixels().all(|p| p.0 == [0, 0, 0, 255]));
}

mod unicode_window {
    use super::*;
    use crate::render::scroll::max_scroll;
    use proptest::prelude::*;
    use unicode_segmentation::UnicodeSegmentation;

    const BODY_TEXT: &str = "([a-zA-Z0-9.,!?]|[\u{00C0}-\u{024F}]|[\u{0370}-\u{03FF}]|[\u{0400}-\u{04FF}]\
        |[\u{3040}-\u{309F}]|[\u{4E00}-\u{4E80}]|[\u{AC00}-\u{AC40}]|[\u{1F600}-\u{1F64F}]\
        |\u{0301}|\u{0308}|\u{3099}|\u{200D}|\u{FE0F}|\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}| |\n){0,120}";

    fn visible_graphemes(s: &str) -> Vec<&str> {
        s.graphemes(true).filter(|g| !g.chars().all(char::is_whitespace)).collect()
    }

    proptest! {
        #[test]
        fn cache_window_matches_wrapped_lines_for_any_text(
            text in BODY_TEXT,
            permille in 0u32..=1000,
        ) {
            let mut face = FixedFace::default();
            let wrapped = wrap_text(&mut face, &text, 20.0, 220.0);

            let kept: Vec<&str> = wrapped.iter().flat_map(|l| visible_graphemes(l)).collect();
            prop_assert_eq!(kept, visible_graphemes(&text), "a line break split a grapheme");

            let max = max_scroll(wrapped.len(), 20, 182);
            let offset = (u64::from(max) * u64::from(permille) / 1000) as u32;
            let mut body = ScrollRenderer::new(240, 182, BodyStyle::default());
            let m = body.render(&mut face, &state(&text, offset)).unwrap();
            prop_assert_eq!(m.line_count, wrapped.len());

            let range = visible_range(wrapped.len(), 20, offset, 182);
            prop_assert_eq!(body.cache().visible_lines(), &wrapped[range]);
        }
    }
}
