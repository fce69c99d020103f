use super::*;

#[test]
fn fixed_face_advances_by_character_class() {
    let mut face = FixedFace::default();
    assert_eq!(face.advance("abcd", 20.0), 40.0);
    assert_eq!(face.advance("中文", 20.0), 40.0);
    assert_eq!(face.advance("", 20.0), 0.0);
    let m = face.metrics(20.0);
    assert_eq!(m.ascent, 16.0);
    assert_eq!(m.descent, 4.0);
    assert_eq!(m.line_height_px(), 20);
}

#[test]
fn runs_split_on_pictographs_and_keep_joiners() {
    let runs = split_runs("hi 😄 there");
    assert_eq!(
        runs,
        vec![
            GlyphRun { text: "hi ", pictographic: false },
            GlyphRun { text: "😄", pictographic: true },
            GlyphRun { text: " there", pictographic: false },
        ]
    );

    let family = split_runs("👩\u{200D}💻!");
    assert_eq!(family.len(), 2);
    assert_eq!(family[0].text, "👩\u{200D}💻");
    assert!(family[0].pictographic);

    assert!(split_runs("").is_empty());
}

#[test]
fn font_set_measures_pictographs_with_their_face() {
    let wide = FixedFace {
        narrow_ratio: 2.0,
        ascent_ratio: 0.9,
        descent_ratio: 0.1,
    };
    let mut set = FontSet::new(Box::new(FixedFace::default()), Some(Box::new(wide)));
    assert_eq!(set.advance("ab😄", 20.0), 40.0);
    assert_eq!(set.advance("ab", 20.0), 20.0);
    assert_eq!(set.metrics(20.0).ascent, 16.0);

    let mut plain = FontSet::fixed();
    assert_eq!(plain.advance("ab😄", 20.0), 40.0);
}

#[test]
fn fixed_face_draws_boxes_and_skips_spaces() {
    let mut surface = Surface::new(40, 20).unwrap();
    let mut face = FixedFace::default();
    face.draw(&mut surface, "a b", 20.0, 0.0, 0.0, Rgb::WHITE);
    let img = surface.render_over(Rgb::BLACK);
    assert_eq!(img.get_pixel(5, 10).0, [255, 255, 255, 255]);
    assert_eq!(img.get_pixel(15, 10).0, [0, 0, 0, 255]);
    assert_eq!(img.get_pixel(25, 10).0, [255, 255, 255, 255]);
}

#[test]
fn invalid_font_bytes_are_a_decode_error() {
    let err = FontFace::from_bytes(vec![0, 1, 2, 3]).err().unwrap();
    assert!(matches!(err, SpecterError::Decode(_)));
    assert!(!err.is_fatal());
}
