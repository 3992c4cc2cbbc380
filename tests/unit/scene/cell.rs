use super::*;
use crate::paint::cpu::CpuEngine;
use serde_json::json;

fn cell(name: &str, w: u32, h: u32) -> Cell {
    let engine = CpuEngine::new(w, h).unwrap();
    Cell::new(
        name.to_owned(),
        name.to_owned(),
        Length::Pixels(f64::from(w)),
        Length::Pixels(f64::from(h)),
        Box::new(engine),
    )
}

fn attrs(v: serde_json::Value) -> AttrMap {
    v.as_object().cloned().unwrap_or_default()
}

const RED: [u8; 4] = [255, 0, 0, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

#[test]
fn new_cells_take_their_size_from_the_engine() {
    let c = cell("c", 40, 30);
    assert_eq!((c.actual_width(), c.actual_height()), (40.0, 30.0));
    assert_eq!(c.get("copyWidth"), Some(json!(40.0)));
    assert_eq!(c.get("pasteHeight"), Some(json!(30.0)));
    assert_eq!(c.get("backgroundColor"), Some(json!(CLEAR_STYLE)));
    assert!(c.is_cleared() && c.is_compiled() && c.is_shown());
}

#[test]
fn percentage_sizes_resolve_against_the_frame() {
    let mut c = cell("c", 10, 10);
    let ripples = c.set(&attrs(json!({ "actualWidth": "50%", "actualHeight": "25%" })));
    assert!(ripples.contains(&Ripple::Dimensions));

    assert!(c.resolve_actual(Some((400.0, 200.0))));
    assert_eq!((c.actual_width, c.actual_height), (200.0, 50.0));
    c.apply_dimensions().unwrap();
    assert_eq!((c.engine().width(), c.engine().height()), (200, 50));
    assert!(!c.dimensions_dirty);
}

#[test]
fn relative_sizes_without_a_frame_keep_the_current_size() {
    let mut c = cell("c", 12, 8);
    c.set(&attrs(json!({ "actualWidth": "50%" })));
    c.resolve_actual(None);
    assert_eq!(c.actual_width, 12.0);
}

#[test]
fn zero_width_is_ignored() {
    let mut c = cell("c", 12, 8);
    let ripples = c.set(&attrs(json!({ "width": 0 })));
    assert!(ripples.is_empty());
    assert_eq!(c.declared_width, Length::Pixels(12.0));
}

#[test]
fn unified_width_moves_copy_and_paste_sizes_too() {
    let mut c = cell("c", 12, 8);
    let ripples = c.set(&attrs(json!({ "width": 30 })));
    assert!(ripples.contains(&Ripple::Dimensions));
    assert!(ripples.contains(&Ripple::Copy));
    assert_eq!(c.copy_width, Length::Pixels(30.0));
    assert_eq!(c.paste_width, Length::Pixels(30.0));
}

#[test]
fn unknown_keys_are_silently_ignored() {
    let mut c = cell("c", 4, 4);
    let before = c.snapshot();
    let ripples = c.set(&attrs(json!({ "sparkle": true })));
    assert!(ripples.is_empty());
    assert_eq!(c.snapshot(), before);
}

#[test]
fn clear_refills_an_opaque_background() {
    let mut c = cell("c", 8, 8);
    c.set(&attrs(json!({ "backgroundColor": "red" })));
    c.clear().unwrap();
    assert_eq!(c.pixel(3, 3), Some(RED));
    assert_eq!(c.tracker().fill_style, "red");
}

#[test]
fn clear_with_a_transparent_background_erases() {
    let mut c = cell("c", 8, 8);
    c.set(&attrs(json!({ "backgroundColor": "red" })));
    c.clear().unwrap();
    c.set(&attrs(json!({ "backgroundColor": "transparent" })));
    c.clear().unwrap();
    assert_eq!(c.pixel(3, 3), Some(CLEAR));
}

#[test]
fn copy_region_is_clamped_inside_the_bitmap() {
    let mut c = cell("c", 100, 50);
    c.set(&attrs(json!({ "copyX": 90, "copyWidth": 30, "copyY": -5, "copyHeight": 500 })));
    let r = c.prepare_copy();
    assert_eq!((r.x, r.width), (70.0, 30.0));
    assert_eq!((r.y, r.height), (0.0, 50.0));
}

#[test]
fn copy_region_is_cached_until_a_copy_attribute_changes() {
    let mut c = cell("c", 100, 50);
    let first = c.prepare_copy();
    assert_eq!(c.copy_data(), Some(first));
    c.set(&attrs(json!({ "copyX": 10, "copyWidth": 50 })));
    assert_eq!(c.copy_data(), None);
    assert_eq!((c.prepare_copy().x, c.prepare_copy().width), (10.0, 50.0));

    // A full-width region cannot shift right.
    c.set(&attrs(json!({ "copyWidth": 100 })));
    assert_eq!(c.prepare_copy().x, 0.0);
}

#[test]
fn paste_region_follows_start_and_scaled_size() {
    let mut c = cell("c", 100, 50);
    c.set(&attrs(json!({ "pasteX": "10%", "pasteY": 4.6, "pasteWidth": "50%", "scale": 2 })));
    let r = c.prepare_paste(Some(ReferenceDims::new(200.0, 100.0, false)), (200.0, 100.0));
    assert_eq!((r.x, r.y), (20.0, 4.0));
    assert_eq!(r.width, 200.0);
    assert_eq!(r.height, 100.0);
}

#[test]
fn paste_cache_is_dropped_when_the_start_moves() {
    let mut c = cell("c", 10, 10);
    let reference = Some(ReferenceDims::new(10.0, 10.0, false));
    c.prepare_paste(reference, (10.0, 10.0));
    assert!(c.paste_data().is_some());
    c.set(&attrs(json!({ "pasteX": 3 })));
    assert!(c.paste_data().is_none());
    assert_eq!(c.prepare_paste(reference, (10.0, 10.0)).x, 3.0);
}

#[test]
fn copy_cell_to_self_pastes_at_the_start() {
    let mut src = cell("src", 10, 10);
    src.set(&attrs(json!({ "backgroundColor": "red", "paste": { "x": 5, "y": 5 } })));
    src.clear().unwrap();
    let mut dst = cell("dst", 20, 20);
    dst.clear().unwrap();

    dst.copy_cell_to_self(&mut src, Some(ReferenceDims::new(20.0, 20.0, false)), (20.0, 20.0));
    assert_eq!(dst.pixel(7, 7), Some(RED));
    assert_eq!(dst.pixel(14, 14), Some(RED));
    assert_eq!(dst.pixel(2, 2), Some(CLEAR));
    assert_eq!(dst.pixel(16, 16), Some(CLEAR));
}

#[test]
fn copy_cell_to_self_syncs_source_alpha_into_the_destination() {
    let mut src = cell("src", 4, 4);
    src.set(&attrs(json!({ "globalAlpha": 0.5 })));
    let mut dst = cell("dst", 4, 4);
    dst.copy_cell_to_self(&mut src, None, (4.0, 4.0));
    assert_eq!(dst.tracker().global_alpha, 0.5);
    assert_eq!(dst.engine().state().global_alpha, 0.5);
}

#[test]
fn image_data_is_labelled_after_the_cell() {
    let c = cell("board", 3, 2);
    let data = c.image_data();
    assert_eq!(data.name, "board_imageData");
    assert_eq!((data.width, data.height), (3, 2));
    assert_eq!(data.data.len(), 3 * 2 * 4);
    assert_eq!(c.pixel(3, 0), None);
}

#[test]
fn clear_shape_helpers_keep_engine_and_tracker_in_step() {
    let mut c = cell("c", 4, 4);
    let mut wanted = PaintState::default();
    wanted.shadow_offset_x = 3.0;
    wanted.shadow_blur = 2.0;
    c.restore_shadow(&wanted);
    assert_eq!(c.tracker().shadow_offset_x, 3.0);
    assert_eq!(c.engine().state().shadow_blur, 2.0);

    c.clear_shadow();
    assert_eq!(c.tracker().shadow_offset_x, 0.0);
    assert_eq!(c.engine().state().shadow_offset_x, 0.0);

    c.set_to_clear_shape();
    assert_eq!(c.tracker().fill_style, CLEAR_STYLE);
    assert!(matches!(c.engine().state().fill, Paint::Solid(col) if col.is_transparent()));
}

#[test]
fn delta_sizes_add_to_the_declared_size() {
    let mut c = cell("c", 10, 10);
    c.set_delta(&attrs(json!({ "width": 5, "compileOrder": 2 })));
    assert_eq!(c.declared_width, Length::Pixels(15.0));
    assert_eq!(c.compile_order(), 2.0);
}

#[test]
fn snapshot_carries_declared_size_not_actual() {
    let mut c = cell("c", 10, 10);
    c.set(&attrs(json!({ "actualWidth": "50%" })));
    let snap = c.snapshot();
    assert_eq!(snap.get("actualWidth"), Some(&json!("50%")));
    assert!(!snap.contains_key("name"));
    assert!(!snap.contains_key("width"));
}
