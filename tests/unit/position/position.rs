use super::reference::{DimensionInputs, DimensionRule, reference_dimensions};
use super::*;
use serde_json::json;

fn set(p: &mut Position, key: &str, v: Value) -> Ripples {
    let mut r = Ripples::new();
    assert!(p.set_key(key, &v, &mut r));
    r
}

#[test]
fn defaults_are_neutral() {
    let p = Position::default();
    assert_eq!(p.start(), Coord::px(0.0, 0.0));
    assert_eq!(p.scale(), 1.0);
    assert_eq!(p.mouse_index(), "mouse");
    assert!(p.pivot().is_none());
    assert!(!p.current_start().is_fresh());
    assert!(!p.current_handle().is_fresh());
}

#[test]
fn handle_keywords_resolve_and_negate() {
    let mut p = Position::default();
    set(&mut p, "handle", json!({"x": "center", "y": "50%"}));
    p.update_current_handle(ReferenceDims::new(40.0, 20.0, false));
    assert_eq!(p.current_handle().get(), Some(Vec2::new(-20.0, -10.0)));
}

#[test]
fn centered_frames_measure_keywords_from_the_middle() {
    let mut p = Position::default();
    set(&mut p, "handleX", json!("center"));
    set(&mut p, "handleY", json!("bottom"));
    p.update_current_handle(ReferenceDims::new(40.0, 40.0, true));
    assert_eq!(p.current_handle().get(), Some(Vec2::new(0.0, -20.0)));
}

#[test]
fn relative_handles_scale_but_pixels_do_not() {
    let mut p = Position::default();
    set(&mut p, "handleX", json!("50%"));
    set(&mut p, "handleY", json!(5));
    set(&mut p, "scale", json!(2));
    p.update_current_handle(ReferenceDims::new(10.0, 10.0, false));
    assert_eq!(p.current_handle().get(), Some(Vec2::new(-10.0, -5.0)));
}

#[test]
fn mutations_invalidate_the_matching_cache() {
    let mut p = Position::default();
    p.update_current_handle(ReferenceDims::new(10.0, 10.0, false));
    p.update_current_start(Some(ReferenceDims::new(10.0, 10.0, false)));
    assert!(p.current_start().is_fresh());
    assert!(p.current_handle().is_fresh());

    let r = set(&mut p, "startX", json!(3));
    assert_eq!(r.as_slice(), &[Ripple::Start]);
    assert!(!p.current_start().is_fresh());
    assert!(p.current_handle().is_fresh());

    for key in ["scale", "width", "height", "handleY"] {
        p.update_current_handle(ReferenceDims::new(10.0, 10.0, false));
        set(&mut p, key, json!(2));
        assert!(!p.current_handle().is_fresh(), "{key} must invalidate the handle");
    }
}

#[test]
fn start_waits_for_a_reference() {
    let mut p = Position::default();
    set(&mut p, "start", json!({"x": "50%", "y": 7}));
    p.update_current_start(None);
    assert!(!p.current_start().is_fresh());

    p.update_current_start(Some(ReferenceDims::new(200.0, 100.0, false)));
    assert_eq!(p.current_start().get(), Some(Vec2::new(100.0, 7.0)));
}

#[test]
fn non_finite_starts_retry_next_time() {
    let mut p = Position::default();
    set(&mut p, "startX", json!("50%"));
    p.update_current_start(Some(ReferenceDims::new(f64::NAN, 10.0, false)));
    assert!(!p.current_start().is_fresh());
    assert_eq!(p.current_start().raw(), Vec2::ZERO);

    p.update_current_start(Some(ReferenceDims::new(10.0, 10.0, false)));
    assert_eq!(p.current_start().get(), Some(Vec2::new(5.0, 0.0)));
}

#[test]
fn latest_inputs_always_win_after_resolve() {
    let mut p = Position::default();
    let dims = ReferenceDims::new(100.0, 100.0, false);
    for (i, x) in [10.0, 20.0, 30.0].into_iter().enumerate() {
        set(&mut p, "startX", json!(x));
        if i % 2 == 0 {
            set(&mut p, "startY", json!(format!("{}%", x)));
        }
        p.update_current_start(Some(dims));
    }
    assert_eq!(p.current_start().get(), Some(Vec2::new(30.0, 30.0)));
}

#[test]
fn pointer_following_is_cumulative_delta() {
    let mut p = Position::default();
    set(&mut p, "start", json!({"x": 5, "y": 5}));
    p.update_current_start(Some(ReferenceDims::new(100.0, 100.0, false)));

    p.follow_pointer(Vec2::new(50.0, 50.0));
    assert_eq!(p.current_start().raw(), Vec2::new(5.0, 5.0));
    p.follow_pointer(Vec2::new(60.0, 45.0));
    p.follow_pointer(Vec2::new(70.0, 40.0));
    assert_eq!(p.current_start().raw(), Vec2::new(25.0, -5.0));
}

#[test]
fn locks_freeze_pivoted_axes() {
    let mut p = Position::default();
    set(&mut p, "lockY", json!(true));
    p.update_current_start(Some(ReferenceDims::new(10.0, 10.0, false)));
    p.follow_target(Vec2::new(8.0, 9.0));
    assert_eq!(p.current_start().raw(), Vec2::new(8.0, 0.0));
}

#[test]
fn pivot_reassignment_drops_the_cached_kind() {
    let mut p = Position::default();
    p.current_pivot = Some(PivotKind::Pointer);
    let r = set(&mut p, "pivot", json!("other"));
    assert_eq!(r.as_slice(), &[Ripple::Pivot]);
    assert!(p.current_pivot().is_none());
    set(&mut p, "pivot", Value::Null);
    assert!(p.pivot().is_none());
}

#[test]
fn delta_keys_add() {
    let mut p = Position::default();
    let mut r = Ripples::new();
    p.delta_key("startX", &json!(4), &mut r);
    p.delta_key("startX", &json!(4), &mut r);
    p.delta_key("handleX", &json!("10%"), &mut r);
    p.delta_key("roll", &json!(15), &mut r);
    assert_eq!(p.start().x, Length::Pixels(8.0));
    assert_eq!(p.handle().x, Length::Percent(10.0));
    assert_eq!(p.roll(), 15.0);
}

#[test]
fn unknown_keys_are_not_position_keys() {
    let mut p = Position::default();
    let mut r = Ripples::new();
    assert!(!p.set_key("fillStyle", &json!("red"), &mut r));
    assert!(p.get_key("fillStyle").is_none());
}

#[test]
fn stamp_transform_rotates_about_start() {
    let mut p = Position::default();
    set(&mut p, "start", json!({"x": 10, "y": 20}));
    set(&mut p, "roll", json!(90));
    p.update_current_start(Some(ReferenceDims::new(1.0, 1.0, false)));
    let pt = p.stamp_transform() * kurbo::Point::new(1.0, 0.0);
    assert!((pt.x - 10.0).abs() < 1e-6);
    assert!((pt.y - 21.0).abs() < 1e-6);
}

#[test]
fn dimension_rules_extract_per_type() {
    let inputs = DimensionInputs {
        width: 40.0,
        height: 20.0,
        local_width: 80.0,
        local_height: 40.0,
        scale: 2.0,
        radius: 15.0,
        is_line: true,
    };
    assert_eq!(
        reference_dimensions(DimensionRule::Pad, &inputs),
        ReferenceDims::new(80.0, 40.0, false)
    );
    assert_eq!(
        reference_dimensions(DimensionRule::Cell, &inputs),
        ReferenceDims::new(40.0, 20.0, false)
    );
    assert_eq!(
        reference_dimensions(DimensionRule::Block, &inputs),
        ReferenceDims::new(40.0, 20.0, false)
    );
    assert_eq!(
        reference_dimensions(DimensionRule::Wheel, &inputs),
        ReferenceDims::new(30.0, 30.0, true)
    );
    assert_eq!(
        reference_dimensions(DimensionRule::Shape, &inputs),
        ReferenceDims::new(40.0, 20.0, false)
    );
    assert_eq!(
        reference_dimensions(DimensionRule::Unregistered, &inputs),
        ReferenceDims::default()
    );
}

#[test]
fn block_rule_survives_zero_scale() {
    let inputs = DimensionInputs {
        local_width: 10.0,
        scale: 0.0,
        ..DimensionInputs::default()
    };
    let d = reference_dimensions(DimensionRule::Block, &inputs);
    assert_eq!(d.w, 0.0);
    assert_eq!(d.h, 0.0);
}

#[test]
fn pivot_classification_order() {
    let yes = |_: &str| true;
    let no = |_: &str| false;
    assert_eq!(PivotKind::classify("mouse", yes, yes, yes), PivotKind::Pointer);
    assert_eq!(
        PivotKind::classify("p", yes, yes, yes),
        PivotKind::Point("p".to_owned())
    );
    assert_eq!(
        PivotKind::classify("e", no, yes, yes),
        PivotKind::Entity("e".to_owned())
    );
    assert_eq!(
        PivotKind::classify("pad", no, no, yes),
        PivotKind::Element("pad".to_owned())
    );
    assert_eq!(PivotKind::classify("x", no, no, no), PivotKind::Unresolved);
    assert!(!PivotKind::Unresolved.is_settled());
}
