use super::*;

#[test]
fn number_convert_handles_percent_and_keywords() {
    assert_eq!(number_convert("50%", 200.0), 100.0);
    assert_eq!(number_convert("right", 200.0), 200.0);
    assert_eq!(number_convert("bottom", 80.0), 80.0);
    assert_eq!(number_convert("center", 200.0), 100.0);
    assert_eq!(number_convert("bogus", 200.0), 0.0);
    assert_eq!(number_convert("left", 200.0), 0.0);
}

#[test]
fn parse_float_prefix_is_lenient() {
    assert_eq!(parse_float_prefix("12.5%"), Some(12.5));
    assert_eq!(parse_float_prefix("  -3px"), Some(-3.0));
    assert_eq!(parse_float_prefix(".5"), Some(0.5));
    assert_eq!(parse_float_prefix("1e2%"), Some(100.0));
    assert_eq!(parse_float_prefix("abc"), None);
    assert_eq!(parse_float_prefix("-"), None);
}

#[test]
fn length_parse_and_json_forms_agree() {
    assert_eq!(Length::parse("25%"), Length::Percent(25.0));
    assert_eq!(Length::parse("center"), Length::Keyword(Keyword::Center));
    assert_eq!(Length::parse("nope"), Length::ZERO);

    let v = serde_json::json!("40%");
    assert_eq!(Length::from_value(&v), Some(Length::Percent(40.0)));
    assert_eq!(Length::Percent(40.0).to_value(), v);
    assert_eq!(
        Length::from_value(&serde_json::json!(7.0)),
        Some(Length::Pixels(7.0))
    );
    assert_eq!(Length::from_value(&serde_json::json!(true)), None);
}

#[test]
fn length_delta_mixes_into_percent() {
    assert_eq!(
        Length::Pixels(10.0).add_delta(Length::Pixels(5.0)),
        Length::Pixels(15.0)
    );
    assert_eq!(
        Length::Percent(10.0).add_delta(Length::Pixels(5.0)),
        Length::Percent(15.0)
    );
    assert_eq!(
        Length::Keyword(Keyword::Center).add_delta(Length::Percent(10.0)),
        Length::Percent(60.0)
    );
}

#[test]
fn length_resolve_coerces_non_finite() {
    assert_eq!(Length::Percent(50.0).resolve(f64::NAN), 0.0);
    assert_eq!(Length::Pixels(f64::INFINITY).resolve(10.0), 0.0);
}

#[test]
fn cached_vector_hides_stale_values() {
    let mut c = CachedVector::stale();
    assert_eq!(c.get(), None);
    c.store(Vec2::new(3.0, 4.0));
    assert_eq!(c.get(), Some(Vec2::new(3.0, 4.0)));
    c.invalidate();
    assert_eq!(c.get(), None);
    assert_eq!(c.raw(), Vec2::new(3.0, 4.0));
}

#[test]
fn image_data_pixel_and_unpremultiply() {
    let img = ImageData {
        name: "t".to_owned(),
        width: 2,
        height: 1,
        data: vec![255, 0, 0, 255, 64, 0, 0, 128],
    };
    assert_eq!(img.pixel(0, 0), Some([255, 0, 0, 255]));
    assert_eq!(img.pixel(2, 0), None);

    let rgba = img.to_rgba_image().unwrap();
    let p = rgba.get_pixel(1, 0);
    assert_eq!(p.0[3], 128);
    assert!((i32::from(p.0[0]) - 128).abs() <= 1);
}
