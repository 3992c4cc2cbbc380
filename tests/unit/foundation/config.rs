use super::*;

#[test]
fn defaults_match_canvas_conventions() {
    let cfg = SceneConfig::default();
    assert_eq!(cfg.default_pad_width, 300.0);
    assert_eq!(cfg.default_pad_height, 150.0);
    assert_eq!(cfg.drag_order_boost, 9999.0);
    assert_eq!(cfg.loader_timeout_ms, 30_000);
}

#[test]
fn partial_json_fills_in_defaults() {
    let cfg = SceneConfig::from_json_str(r#"{"default_pad_width": 640, "pool": {"max_retained": 4}}"#)
        .unwrap();
    assert_eq!(cfg.default_pad_width, 640.0);
    assert_eq!(cfg.default_pad_height, 150.0);
    assert_eq!(cfg.pool.max_retained, 4);
}

#[test]
fn invalid_dimensions_are_rejected() {
    let err = SceneConfig::from_json_str(r#"{"default_pad_height": 0}"#).unwrap_err();
    assert!(matches!(err, ScrawlError::Validation(_)));
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = SceneConfig::from_json_str("{ nope").unwrap_err();
    assert!(matches!(err, ScrawlError::Serde(_)));
}
