use super::*;

#[test]
fn parses_hex_forms() {
    assert_eq!(parse_css_color("#ff0000"), Some(Color::rgba(1.0, 0.0, 0.0, 1.0)));
    assert_eq!(parse_css_color("#f00"), Some(Color::rgba(1.0, 0.0, 0.0, 1.0)));
    let c = parse_css_color("#0000ff80").unwrap();
    assert!((c.b - 1.0).abs() < 1e-9);
    assert!((c.a - (128.0 / 255.0)).abs() < 1e-9);
    assert_eq!(parse_css_color("#12345"), None);
}

#[test]
fn parses_functional_forms() {
    assert_eq!(
        parse_css_color("rgba(0,0,0,0)"),
        Some(Color::TRANSPARENT)
    );
    assert_eq!(
        parse_css_color("rgba(0, 0, 0, 0)"),
        Some(Color::TRANSPARENT)
    );
    let c = parse_css_color("rgb(255, 128, 0)").unwrap();
    assert_eq!(c.to_rgba8_premul().to_array(), [255, 128, 0, 255]);

    let red = parse_css_color("hsl(0, 100%, 50%)").unwrap();
    assert!((red.r - 1.0).abs() < 1e-9);
    assert!(red.g.abs() < 1e-9);
    assert_eq!(parse_css_color("rgb(1,2)"), None);
}

#[test]
fn parses_named_colors() {
    assert_eq!(parse_css_color("red"), Some(Color::rgba(1.0, 0.0, 0.0, 1.0)));
    assert_eq!(parse_css_color("Blue"), Some(Color::rgba(0.0, 0.0, 1.0, 1.0)));
    assert_eq!(parse_css_color("transparent"), Some(Color::TRANSPARENT));
    assert_eq!(parse_css_color("not-a-color"), None);
}

#[test]
fn css_serialization_matches_canvas_read_back() {
    assert_eq!(Color::BLACK.to_css(), "#000000");
    assert_eq!(Color::from_rgb8(255, 0, 0, 1.0).to_css(), "#ff0000");
    assert_eq!(Color::TRANSPARENT.to_css(), "rgba(0, 0, 0, 0)");
}

#[test]
fn premultiplies_on_conversion() {
    let c = Color::rgba(1.0, 0.5, 0.0, 0.5);
    assert_eq!(c.to_rgba8_premul().to_array(), [128, 64, 0, 128]);
}
