use super::*;
use crate::attr::{AttrMap, Attributes};
use crate::foundation::core::{BezPath, Rect};
use crate::foundation::error::ScrawlResult;
use crate::paint::engine::{EngineState, SurfaceImage};
use serde_json::json;

#[derive(Default)]
struct RecordingEngine {
    state: EngineState,
    writes: Vec<StateWrite>,
    dash: bool,
}

impl PaintEngine for RecordingEngine {
    fn width(&self) -> u32 {
        1
    }
    fn height(&self) -> u32 {
        1
    }
    fn resize(&mut self, _w: u32, _h: u32) -> ScrawlResult<()> {
        self.state = EngineState::default();
        Ok(())
    }
    fn state(&self) -> &EngineState {
        &self.state
    }
    fn write(&mut self, write: StateWrite) {
        self.state.apply(write.clone());
        self.writes.push(write);
    }
    fn supports_line_dash(&self) -> bool {
        self.dash
    }
    fn set_transform(&mut self, transform: crate::foundation::core::Affine) {
        self.state.transform = transform;
    }
    fn fill_path(&mut self, _path: &BezPath) {}
    fn stroke_path(&mut self, _path: &BezPath) {}
    fn clear_rect(&mut self, _rect: Rect) {}
    fn clip(&mut self, _path: &BezPath) {}
    fn reset_clip(&mut self) {}
    fn draw_image(&mut self, _src: &SurfaceImage<'_>, _copy: Rect, _paste: Rect) {}
    fn image(&self) -> SurfaceImage<'_> {
        SurfaceImage {
            width: 1,
            height: 1,
            data: &[0, 0, 0, 0],
        }
    }
}

struct Forcing(&'static str);

impl DesignLookup for Forcing {
    fn forces_update(&self, name: &str) -> bool {
        name == self.0
    }
}

fn tracker(v: serde_json::Value) -> PaintState {
    let mut s = PaintState::default();
    let m: AttrMap = v.as_object().cloned().unwrap_or_default();
    s.set(&m);
    s
}

fn diff(entity: &PaintState, surface: &PaintState, d: DrawableInfo) -> ChangeSet {
    let mut out = ChangeSet::default();
    entity.get_changes(&d, surface, &(), &mut out);
    out
}

#[test]
fn identical_trackers_produce_no_changes() {
    let a = tracker(json!({ "fillStyle": "red", "lineWidth": 3, "lineDash": [2, 2], "font": "12px serif" }));
    let text = DrawableInfo { is_text: true, ..DrawableInfo::default() };
    assert!(diff(&a, &a.clone(), text).is_empty());
}

#[test]
fn only_differing_keys_are_reported() {
    let a = tracker(json!({ "fillStyle": "red", "globalAlpha": 0.5 }));
    let b = PaintState::default();
    let c = diff(&a, &b, DrawableInfo::default());
    assert_eq!(c.keys(), vec!["globalAlpha", "fillStyle"]);
    assert_eq!(c.get(PaintKey::FillStyle), Some(&PaintChange::FillStyle("red".to_owned())));
}

#[test]
fn line_attributes_are_ignored_while_both_widths_are_zero() {
    let a = tracker(json!({ "lineCap": "round", "lineDash": [4] }));
    let c = diff(&a, &PaintState::default(), DrawableInfo::default());
    assert!(c.is_empty());
}

#[test]
fn line_width_follows_drawable_scale_when_outlines_scale() {
    let a = tracker(json!({ "lineWidth": 2 }));
    let scaled = DrawableInfo { scale: 3.0, ..DrawableInfo::default() };
    let c = diff(&a, &PaintState::default(), scaled);
    assert_eq!(c.get(PaintKey::LineWidth), Some(&PaintChange::LineWidth(6.0)));

    let fixed = DrawableInfo { scale: 3.0, scale_outline: false, is_text: false };
    let c = diff(&a, &PaintState::default(), fixed);
    assert_eq!(c.get(PaintKey::LineWidth), Some(&PaintChange::LineWidth(2.0)));
}

#[test]
fn zero_entity_width_scales_as_one_against_a_stroked_surface() {
    let surface = tracker(json!({ "lineWidth": 4 }));
    let c = diff(&PaintState::default(), &surface, DrawableInfo { scale: 2.0, ..DrawableInfo::default() });
    assert_eq!(c.get(PaintKey::LineWidth), Some(&PaintChange::LineWidth(2.0)));
}

#[test]
fn dash_arrays_compare_by_length_then_elements() {
    let surface = tracker(json!({ "lineWidth": 1, "lineDash": [4, 2] }));
    let same = tracker(json!({ "lineWidth": 1, "lineDash": [4, 2] }));
    let longer = tracker(json!({ "lineWidth": 1, "lineDash": [4, 2, 1] }));
    let other = tracker(json!({ "lineWidth": 1, "lineDash": [4, 3] }));
    let d = DrawableInfo::default();
    assert!(!diff(&same, &surface, d).contains(PaintKey::LineDash));
    assert!(diff(&longer, &surface, d).contains(PaintKey::LineDash));
    assert!(diff(&other, &surface, d).contains(PaintKey::LineDash));
}

#[test]
fn text_attributes_only_matter_for_text_drawables() {
    let a = tracker(json!({ "font": "20px serif", "textAlign": "center" }));
    assert!(diff(&a, &PaintState::default(), DrawableInfo::default()).is_empty());
    let text = DrawableInfo { is_text: true, ..DrawableInfo::default() };
    assert_eq!(diff(&a, &PaintState::default(), text).keys(), vec!["font", "textAlign"]);
}

#[test]
fn forcing_designs_are_reported_even_when_names_match() {
    let a = tracker(json!({ "fillStyle": "sunset" }));
    let mut out = ChangeSet::default();
    a.get_changes(&DrawableInfo::default(), &a.clone(), &Forcing("sunset"), &mut out);
    assert_eq!(out.keys(), vec!["fillStyle"]);
    a.get_changes(&DrawableInfo::default(), &a.clone(), &Forcing("other"), &mut out);
    assert!(out.is_empty());
}

#[test]
fn applying_changes_makes_the_mirror_match_and_writes_the_engine() {
    let a = tracker(json!({ "fillStyle": "#00ff00", "lineWidth": 2, "lineJoin": "bevel", "shadowBlur": 4 }));
    let mut mirror = PaintState::default();
    let mut engine = RecordingEngine { dash: true, ..RecordingEngine::default() };
    let c = diff(&a, &mirror, DrawableInfo::default());
    mirror.apply_changes(&c, &mut engine, &mut ());

    assert_eq!(mirror.fill_style, "#00ff00");
    assert_eq!(mirror.line_width, 2.0);
    assert_eq!(mirror.line_join, LineJoin::Bevel);
    assert_eq!(mirror.shadow_blur, 4.0);
    assert_eq!(engine.writes.len(), c.len());
    assert_eq!(engine.state.fill, Paint::Solid(Color::from_rgb8(0, 255, 0, 1.0)));
    assert!(diff(&a, &mirror, DrawableInfo::default()).is_empty());
}

#[test]
fn dash_changes_are_skipped_on_engines_without_dash_support() {
    let a = tracker(json!({ "lineWidth": 1, "lineDash": [3, 3] }));
    let mut mirror = tracker(json!({ "lineWidth": 1 }));
    let mut engine = RecordingEngine::default();
    let c = diff(&a, &mirror, DrawableInfo::default());
    mirror.apply_changes(&c, &mut engine, &mut ());
    assert!(mirror.line_dash.is_empty());
    assert!(engine.state.line_dash.is_empty());
}

#[test]
fn design_styles_resolve_through_the_resolver() {
    struct Named;
    impl StyleResolver for Named {
        fn resolve_design(&mut self, name: &str) -> Option<Paint> {
            (name == "sky").then_some(Paint::Solid(Color::WHITE))
        }
    }
    let a = tracker(json!({ "strokeStyle": "sky" }));
    let mut mirror = PaintState::default();
    let mut engine = RecordingEngine::default();
    let c = diff(&a, &mirror, DrawableInfo::default());
    mirror.apply_changes(&c, &mut engine, &mut Named);
    assert_eq!(engine.state.stroke, Paint::Solid(Color::WHITE));
    assert_eq!(mirror.stroke_style, "sky");
}

#[test]
fn unparsable_styles_keep_the_engine_value() {
    let a = tracker(json!({ "fillStyle": "not-a-color" }));
    let mut mirror = PaintState::default();
    let mut engine = RecordingEngine::default();
    let c = diff(&a, &mirror, DrawableInfo::default());
    mirror.apply_changes(&c, &mut engine, &mut ());
    assert!(engine.writes.is_empty());
    assert_eq!(engine.state.fill, Paint::Solid(Color::BLACK));
}
