use super::*;
use crate::text::typeface::FixedFace;
use proptest::prelude::*;

fn wrap(text: &str, max_width: f32) -> Vec<String> {
    let mut face = FixedFace::default();
    wrap_text(&mut face, text, 20.0, max_width)
}

#[test]
fn packs_words_greedily() {
    assert_eq!(wrap("hello world foo", 100.0), vec!["hello", "world foo"]);
    assert_eq!(wrap("one two", 1000.0), vec!["one two"]);
}

#[test]
fn empty_text_has_no_lines() {
    assert!(wrap("", 100.0).is_empty());
}

#[test]
fn newlines_force_breaks_and_keep_blank_lines() {
    assert_eq!(wrap("a\nb", 100.0), vec!["a", "b"]);
    assert_eq!(wrap("a\r\n\r\nb", 100.0), vec!["a", "", "b"]);
}

#[test]
fn overlong_words_split_between_characters() {
    assert_eq!(wrap("abcdefghijklmno", 100.0), vec!["abcdefghij", "klmno"]);
    assert_eq!(wrap("ab abcdefghijklmno", 100.0), vec!["ab", "abcdefghij", "klmno"]);
}

#[test]
fn cjk_wraps_per_character() {
    assert_eq!(wrap("中文中文中文", 100.0), vec!["中文中文中", "文"]);
    assert_eq!(wrap("ok 中文", 60.0), vec!["ok 中", "文"]);
}

#[test]
fn combining_marks_stay_with_their_base() {
    let accented = "e\u{301}".repeat(6);
    let lines = wrap(&accented, 90.0);
    assert_eq!(lines, vec!["e\u{301}".repeat(4), "e\u{301}".repeat(2)]);
}

#[test]
fn joined_emoji_never_split() {
    let family = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}";
    let lines = wrap(&format!("ab{family}"), 60.0);
    assert_eq!(lines, vec!["ab".to_string(), family.to_string()]);
}

#[test]
fn cjk_units_keep_trailing_marks() {
    assert_eq!(units("中\u{3099}x"), vec!["中\u{3099}", "x"]);
    assert_eq!(units("ok 中文"), vec!["ok ", "中", "文"]);
    assert_eq!(units("hello, world"), vec!["hello, ", "world"]);
}

#[test]
fn layout_memoises_until_inputs_change() {
    let mut face = FixedFace::default();
    let mut layout = TextLayout::new();
    let first = layout.lines(&mut face, "hello world foo", 20.0, 100.0).to_vec();
    let again = layout.lines(&mut face, "hello world foo", 20.0, 100.0).to_vec();
    assert_eq!(first, again);
    assert_eq!(layout.recomputes(), 1);

    let wider = layout.lines(&mut face, "hello world foo", 20.0, 200.0).to_vec();
    assert_eq!(wider, vec!["hello world foo"]);
    assert_eq!(layout.recomputes(), 2);

    layout.invalidate();
    let _ = layout.lines(&mut face, "hello world foo", 20.0, 200.0);
    assert_eq!(layout.recomputes(), 3);
}

proptest! {
    #[test]
    fn wrapped_lines_fit_and_keep_every_character(
        text in "[a-z]{1,14}( [a-z]{1,14}){0,12}",
        max_chars in 1u32..20,
    ) {
        let max_width = max_chars as f32 * 10.0;
        let mut face = FixedFace::default();
        let lines = wrap_text(&mut face, &text, 20.0, max_width);
        for line in &lines {
            prop_assert!(face.advance(line, 20.0) <= max_width, "line {line:?} overflows");
        }
        let kept: String = lines.concat().chars().filter(|c| !c.is_whitespace()).collect();
        let original: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        prop_assert_eq!(kept, original);
    }
}
