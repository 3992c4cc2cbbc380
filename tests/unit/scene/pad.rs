use super::*;
use serde_json::json;

fn pad() -> Pad {
    let mut p = Pad::new("p".to_owned(), 400.0, 200.0);
    p.display = "p".to_owned();
    p.base = "p_base".to_owned();
    p.current = "p_base".to_owned();
    p.add_cell("p");
    p.add_cell("p_base");
    p
}

fn attrs(v: serde_json::Value) -> AttrMap {
    v.as_object().cloned().unwrap_or_default()
}

#[test]
fn adding_a_cell_flags_both_orderings() {
    let mut p = pad();
    p.resort_compile = false;
    p.resort_show = false;
    assert!(p.add_cell("overlay"));
    assert!(!p.add_cell("overlay"));
    assert_eq!(p.cells(), ["p", "p_base", "overlay"]);
    assert_eq!(p.cells_compile_order().last().map(String::as_str), Some("overlay"));
    assert_eq!(p.cells_show_order().last().map(String::as_str), Some("overlay"));
    assert!(p.resort_compile && p.resort_show);
}

#[test]
fn removing_current_falls_back_to_base() {
    let mut p = pad();
    p.add_cell("overlay");
    p.set(&attrs(json!({ "current": "overlay" })));
    assert_eq!(p.current(), "overlay");
    assert!(p.remove_cell("overlay"));
    assert_eq!(p.current(), "p_base");
    assert!(!p.contains("overlay"));
    assert!(!p.remove_cell("overlay"));
}

#[test]
fn removing_base_repoints_base_and_current() {
    let mut p = pad();
    p.remove_cell("p_base");
    assert_eq!(p.current(), "p");
    assert_eq!(p.base(), "p");
    assert_eq!(p.display(), "p");
}

#[test]
fn removing_display_falls_back_to_current() {
    let mut p = pad();
    p.remove_cell("p");
    assert_eq!(p.display(), "p_base");
    assert_eq!(p.base(), "p_base");
}

#[test]
fn current_must_name_a_member() {
    let mut p = pad();
    p.set(&attrs(json!({ "current": "stranger" })));
    assert_eq!(p.current(), "p_base");
}

#[test]
fn dimensions_must_be_positive() {
    let mut p = pad();
    assert!(p.set(&attrs(json!({ "width": -3 }))).is_empty());
    assert!(p.set(&attrs(json!({ "height": 0 }))).is_empty());
    let ripples = p.set_delta(&attrs(json!({ "width": 100 })));
    assert!(ripples.contains(&Ripple::Dimensions));
    assert_eq!(p.width(), 500.0);
}

#[test]
fn frame_removes_the_pad_scale() {
    let mut p = pad();
    assert_eq!(p.frame(), (400.0, 200.0));
    let ripples = p.set(&attrs(json!({ "scale": 2 })));
    assert!(ripples.contains(&Ripple::Dimensions));
    assert_eq!(p.frame(), (200.0, 100.0));
    p.set(&attrs(json!({ "scale": 0 })));
    assert_eq!(p.frame(), (400.0, 200.0));
}

#[test]
fn roles_follow_display_and_base() {
    let mut p = pad();
    p.add_cell("overlay");
    assert_eq!(p.role_of("p"), ReferenceRole::DisplayOf("p".to_owned()));
    assert_eq!(p.role_of("p_base"), ReferenceRole::BaseOf("p".to_owned()));
    assert_eq!(
        p.role_of("overlay"),
        ReferenceRole::WorkingSurfaceOf("p".to_owned())
    );
}

#[test]
fn pointers_are_kept_per_index() {
    let mut p = pad();
    p.set_pointer("mouse", Vec2::new(3.0, 4.0));
    p.set_pointer("touch1", Vec2::new(9.0, 9.0));
    assert_eq!(p.pointer("mouse"), Some(Vec2::new(3.0, 4.0)));
    assert_eq!(p.pointer("touch1"), Some(Vec2::new(9.0, 9.0)));
    assert_eq!(p.pointer("touch2"), None);
}

#[test]
fn reference_dims_are_the_pad_size() {
    let p = pad();
    let dims = p.reference_dims();
    assert_eq!((dims.w, dims.h, dims.centered), (400.0, 200.0, false));
}
