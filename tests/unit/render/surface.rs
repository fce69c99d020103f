use super::*;

#[test]
fn filled_rect_lands_over_background() {
    let mut s = Surface::new(8, 8).unwrap();
    s.fill_rect(2.0, 2.0, 6.0, 6.0, Rgb::RED);
    let img = s.render_over(Rgb::BLACK);
    assert_eq!(img.dimensions(), (8, 8));
    assert_eq!(img.get_pixel(3, 3).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
    assert_eq!(img.get_pixel(7, 7).0, [0, 0, 0, 255]);
}

#[test]
fn render_clears_pending_commands() {
    let mut s = Surface::new(4, 4).unwrap();
    s.fill_rect(0.0, 0.0, 4.0, 4.0, Rgb::WHITE);
    let _ = s.render_over(Rgb::BLACK);
    let second = s.render_over(Rgb::BLUE);
    assert!(second.pixels().all(|p| p.0 == [0, 0, 255, 255]));
}

#[test]
fn zero_sized_surface_is_rejected() {
    assert!(Surface::new(0, 4).is_err());
    assert!(Surface::new(70_000, 4).is_err());
}
