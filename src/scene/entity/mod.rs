//! Drawables: positioned, styled geometry with a uniform stamp protocol.

pub(crate) mod block;
pub(crate) mod shape;
pub(crate) mod wheel;

use std::collections::HashMap;

use kurbo::Shape as _;

use crate::attr::{
    AttrMap, Attributes, Ripple, Ripples, Value, boolean, delta_num, num, push_ripple, text,
};
use crate::design::{Design, DesignFrame};
use crate::foundation::core::{BezPath, Coord, Point, Rect, Vec2};
use crate::foundation::pool::Pool;
use crate::paint::changes::{ChangeSet, DrawableInfo};
use crate::paint::color::Color;
use crate::paint::engine::{Paint, StateWrite};
use crate::paint::state::{CompositeOp, PaintState};
use crate::position::Position;
use crate::position::pivot::PivotKind;
use crate::position::reference::{DimensionInputs, DimensionRule};
use crate::scene::capability::{Drawable, Nameable, PaintStateOwning, Positionable};
use crate::scene::cell::Cell;

pub use block::Block;
pub use shape::Shape;
pub use wheel::Wheel;

/// How an entity paints its outline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DrawMethod {
    /// Stroke only.
    Draw,
    /// Fill only.
    #[default]
    Fill,
    /// Stroke, then fill without shadow.
    DrawFill,
    /// Fill, then stroke without shadow.
    FillDraw,
    /// Stroke, then fill, shadow on both.
    FloatOver,
    /// Fill, then stroke, shadow on both.
    SinkInto,
    /// Erase the outline.
    Clear,
    /// Paint the outline in the surface's background color.
    ClearWithBackground,
    /// Restrict later painting to the outline.
    Clip,
    /// Synchronize paint state only.
    None,
}

impl DrawMethod {
    /// Parse a method name.
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "draw" => Self::Draw,
            "fill" => Self::Fill,
            "drawFill" => Self::DrawFill,
            "fillDraw" => Self::FillDraw,
            "floatOver" => Self::FloatOver,
            "sinkInto" => Self::SinkInto,
            "clear" => Self::Clear,
            "clearWithBackground" => Self::ClearWithBackground,
            "clip" => Self::Clip,
            "none" => Self::None,
            _ => return None,
        })
    }

    /// Method name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draw => "draw",
            Self::Fill => "fill",
            Self::DrawFill => "drawFill",
            Self::FillDraw => "fillDraw",
            Self::FloatOver => "floatOver",
            Self::SinkInto => "sinkInto",
            Self::Clear => "clear",
            Self::ClearWithBackground => "clearWithBackground",
            Self::Clip => "clip",
            Self::None => "none",
        }
    }
}

/// Geometry behind one entity kind.
pub(crate) trait Geometry {
    /// Kind label, also the fallback name.
    fn label(&self) -> &'static str;

    fn dimension_rule(&self) -> DimensionRule;

    fn dimension_inputs(&self, position: &Position) -> DimensionInputs;

    /// Recompute values that depend on the target surface. Returns `true` on change.
    fn fit_to_cell(&mut self, position: &Position, cell_width: f64, cell_height: f64) -> bool;

    /// Outline in stamp coordinates, offset by the current handle.
    fn outline(&self, position: &Position) -> BezPath;

    /// Scaled width and height.
    fn local_size(&self, position: &Position) -> (f64, f64);

    /// From the current handle to the top-left of the scaled box.
    fn box_offset(&self, position: &Position) -> Vec2;

    /// Containment test for a point already in stamp coordinates.
    fn hit_local(&self, position: &Position, local: Point) -> bool {
        self.outline(position).contains(local)
    }

    /// Rectangle erased by the clear method, for kinds that erase with a rectangle.
    fn clear_rect(&self, _position: &Position) -> Option<Rect> {
        None
    }

    fn get_key(&self, key: &str) -> Option<Value>;

    /// Returns `false` for keys the kind does not own.
    fn set_key(&mut self, key: &str, v: &Value, delta: bool, ripples: &mut Ripples) -> bool;

    fn snapshot_into(&self, out: &mut AttrMap);
}

/// The concrete geometry of an entity.
#[derive(Clone, Debug, PartialEq)]
pub enum EntityKind {
    /// Rectangle.
    Block(Block),
    /// Circle or arc.
    Wheel(Wheel),
    /// SVG path.
    Shape(Shape),
}

impl EntityKind {
    fn geometry(&self) -> &dyn Geometry {
        match self {
            Self::Block(b) => b,
            Self::Wheel(w) => w,
            Self::Shape(s) => s,
        }
    }

    fn geometry_mut(&mut self) -> &mut dyn Geometry {
        match self {
            Self::Block(b) => b,
            Self::Wheel(w) => w,
            Self::Shape(s) => s,
        }
    }

    /// Kind label: `Block`, `Wheel` or `Shape`.
    pub fn label(&self) -> &'static str {
        self.geometry().label()
    }
}

/// A positioned, styled drawable.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub(crate) name: String,
    pub(crate) tracker_name: String,
    pub(crate) position: Position,
    pub(crate) kind: EntityKind,
    pub(crate) method: DrawMethod,
    pub(crate) order: f64,
    pub(crate) visibility: bool,
    pub(crate) scale_outline: bool,
    pub(crate) fast_stamp: bool,
    pub(crate) group: String,
    pub(crate) tracker: PaintState,
    // Pivot in effect before a pickup.
    pub(crate) drag_pivot: Option<Option<String>>,
}

impl Entity {
    pub(crate) fn new(name: String, tracker_name: String, kind: EntityKind) -> Self {
        Self {
            name,
            tracker_name,
            position: Position::default(),
            kind,
            method: DrawMethod::Fill,
            order: 0.0,
            visibility: true,
            scale_outline: true,
            fast_stamp: false,
            group: String::new(),
            tracker: PaintState::default(),
            drag_pivot: None,
        }
    }

    /// Geometry.
    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// Draw method.
    pub fn method(&self) -> DrawMethod {
        self.method
    }

    /// Draw order within a group.
    pub fn order(&self) -> f64 {
        self.order
    }

    /// Whether the entity stamps.
    pub fn visibility(&self) -> bool {
        self.visibility
    }

    /// Primary group.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Intended paint state.
    pub fn tracker(&self) -> &PaintState {
        &self.tracker
    }

    /// Name the tracker is registered under.
    pub fn tracker_name(&self) -> &str {
        &self.tracker_name
    }

    /// Whether a pickup is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag_pivot.is_some()
    }

    /// Refit surface-relative geometry; a change invalidates the handle.
    pub(crate) fn fit_to_cell(&mut self, cell_width: f64, cell_height: f64) {
        if self
            .kind
            .geometry_mut()
            .fit_to_cell(&self.position, cell_width, cell_height)
        {
            self.position.invalidate_handle();
        }
    }

    pub(crate) fn design_frame(&self) -> DesignFrame {
        let g = self.kind.geometry();
        let (local_width, local_height) = g.local_size(&self.position);
        DesignFrame {
            handle: self.position.current_handle.raw(),
            box_offset: g.box_offset(&self.position),
            local_width,
            local_height,
            ..DesignFrame::default()
        }
    }

    /// Map a point from unscaled local geometry (path coordinates) to surface coordinates.
    pub(crate) fn local_to_surface(&self, local: Vec2) -> Vec2 {
        let p = local * self.position.scale + self.position.current_handle.raw();
        (self.position.stamp_transform() * p.to_point()).to_vec2()
    }

    /// Run the draw method against `cell`.
    pub(crate) fn draw(
        &self,
        cell: &mut Cell,
        designs: &HashMap<String, Design>,
        changes: &mut Pool<ChangeSet>,
    ) {
        if !self.fast_stamp {
            cell.set_engine(
                &self.tracker,
                &self.drawable_info(),
                self.design_frame(),
                designs,
                changes,
            );
        }
        if self.method == DrawMethod::None {
            return;
        }
        let path = self.outline();
        cell.engine.set_transform(self.position.stamp_transform());
        let shadow = self.tracker.has_shadow();
        match self.method {
            DrawMethod::Draw => cell.engine.stroke_path(&path),
            DrawMethod::Fill => cell.engine.fill_path(&path),
            DrawMethod::DrawFill | DrawMethod::FillDraw => {
                let stroke_first = self.method == DrawMethod::DrawFill;
                if stroke_first {
                    cell.engine.stroke_path(&path);
                } else {
                    cell.engine.fill_path(&path);
                }
                if shadow {
                    cell.clear_shadow();
                }
                if stroke_first {
                    cell.engine.fill_path(&path);
                } else {
                    cell.engine.stroke_path(&path);
                }
                if shadow {
                    cell.restore_shadow(&self.tracker);
                }
            }
            DrawMethod::FloatOver => {
                cell.engine.stroke_path(&path);
                cell.engine.fill_path(&path);
            }
            DrawMethod::SinkInto => {
                cell.engine.fill_path(&path);
                cell.engine.stroke_path(&path);
            }
            DrawMethod::Clear => self.clear_outline(cell, &path),
            DrawMethod::ClearWithBackground => {
                let bg = Color::parse(&cell.background_color).unwrap_or(Color::TRANSPARENT);
                let saved = cell.engine.state().clone();
                cell.engine.write(StateWrite::Composite(CompositeOp::SourceOver));
                cell.engine.write(StateWrite::Fill(Paint::Solid(bg)));
                cell.engine.write(StateWrite::Stroke(Paint::Solid(bg)));
                cell.engine.write(StateWrite::GlobalAlpha(1.0));
                cell.engine.stroke_path(&path);
                cell.engine.fill_path(&path);
                cell.engine.write(StateWrite::Fill(saved.fill));
                cell.engine.write(StateWrite::Stroke(saved.stroke));
                cell.engine.write(StateWrite::GlobalAlpha(saved.global_alpha));
                cell.engine.write(StateWrite::Composite(saved.composite));
            }
            DrawMethod::Clip => cell.engine.clip(&path),
            DrawMethod::None => {}
        }
    }

    fn clear_outline(&self, cell: &mut Cell, path: &BezPath) {
        if let Some(rect) = self.kind.geometry().clear_rect(&self.position) {
            cell.set_to_clear_shape();
            cell.engine.clear_rect(rect);
            return;
        }
        let saved_fill = cell.engine.state().fill.clone();
        let saved_op = cell.engine.state().composite;
        cell.engine
            .write(StateWrite::Composite(CompositeOp::DestinationOut));
        cell.engine.write(StateWrite::Fill(Paint::Solid(Color::BLACK)));
        cell.engine.fill_path(path);
        cell.engine.write(StateWrite::Fill(saved_fill));
        cell.engine.write(StateWrite::Composite(saved_op));
    }

    /// Start a drag: the pointer becomes the pivot and the entity rises above its group.
    pub(crate) fn pickup(&mut self, pointer: Vec2, mouse_index: &str, boost: f64) {
        if self.drag_pivot.is_none() {
            self.drag_pivot = Some(self.position.pivot.clone());
            self.order += boost;
        }
        mouse_index.clone_into(&mut self.position.mouse_index);
        self.position
            .set_pivot(Some(PivotKind::POINTER_KEYWORD.to_owned()));
        self.position.pointer_anchor = Some(pointer);
    }

    /// End a drag: the resolved position becomes the start and the prior pivot returns.
    ///
    /// Returns `false` if no drag was in progress.
    pub(crate) fn drop_entity(&mut self, boost: f64) -> bool {
        let Some(pivot) = self.drag_pivot.take() else {
            return false;
        };
        self.position.set_pivot(pivot);
        self.order = (self.order - boost).max(0.0);
        PivotKind::POINTER_KEYWORD.clone_into(&mut self.position.mouse_index);
        let at = self.position.current_start.raw();
        self.position.start = Coord::px(at.x, at.y);
        self.position.invalidate_start();
        self.position.invalidate_handle();
        self.position.pointer_anchor = None;
        true
    }

    fn set_one(&mut self, key: &str, v: &Value, delta: bool, ripples: &mut Ripples) {
        match key {
            "order" => {
                let next = if delta {
                    delta_num(self.order, v)
                } else {
                    num(v)
                };
                if let Some(o) = next {
                    self.order = o;
                    push_ripple(ripples, Ripple::Order);
                }
            }
            "method" => match text(v).and_then(DrawMethod::parse) {
                Some(m) => self.method = m,
                None => tracing::debug!(entity = %self.name, "unsupported draw method ignored"),
            },
            "visibility" | "scaleOutline" | "fastStamp" => {
                if let Some(b) = boolean(v) {
                    match key {
                        "visibility" => self.visibility = b,
                        "scaleOutline" => self.scale_outline = b,
                        _ => self.fast_stamp = b,
                    }
                }
            }
            "group" => {
                if let Some(g) = text(v)
                    && g != self.group
                {
                    self.group = g.to_owned();
                    push_ripple(ripples, Ripple::Group);
                }
            }
            _ if PaintState::is_context_key(key) => {
                if delta {
                    self.tracker.delta_one(key, v);
                } else {
                    self.tracker.set_one(key, v);
                }
            }
            _ => {
                if self.kind.geometry_mut().set_key(key, v, delta, ripples) {
                    self.position.invalidate_handle();
                    push_ripple(ripples, Ripple::Geometry);
                } else if delta {
                    self.position.delta_key(key, v, ripples);
                } else {
                    self.position.set_key(key, v, ripples);
                }
            }
        }
    }

    fn absorb(&mut self, ripples: &Ripples) {
        if ripples.contains(&Ripple::Pivot) {
            self.position.pointer_anchor = None;
        }
    }
}

impl Attributes for Entity {
    fn get(&self, key: &str) -> Option<Value> {
        let v = match key {
            "name" => Value::String(self.name.clone()),
            "type" => Value::String(self.kind.label().to_owned()),
            "order" => serde_json::json!(self.order),
            "method" => Value::String(self.method.as_str().to_owned()),
            "visibility" => Value::Bool(self.visibility),
            "scaleOutline" => Value::Bool(self.scale_outline),
            "fastStamp" => Value::Bool(self.fast_stamp),
            "group" => Value::String(self.group.clone()),
            _ if PaintState::is_context_key(key) => return self.tracker.get(key),
            _ => {
                return self
                    .kind
                    .geometry()
                    .get_key(key)
                    .or_else(|| self.position.get_key(key));
            }
        };
        Some(v)
    }

    fn set(&mut self, items: &AttrMap) -> Ripples {
        let mut ripples = Ripples::new();
        for (k, v) in items {
            self.set_one(k, v, false, &mut ripples);
        }
        self.absorb(&ripples);
        ripples
    }

    fn set_delta(&mut self, items: &AttrMap) -> Ripples {
        let mut ripples = Ripples::new();
        for (k, v) in items {
            self.set_one(k, v, true, &mut ripples);
        }
        self.absorb(&ripples);
        ripples
    }

    fn snapshot(&self) -> AttrMap {
        let mut out = self.tracker.snapshot();
        self.position.snapshot_into(&mut out);
        self.kind.geometry().snapshot_into(&mut out);
        for key in [
            "order",
            "method",
            "visibility",
            "scaleOutline",
            "fastStamp",
            "group",
        ] {
            if let Some(v) = self.get(key) {
                out.insert(key.to_owned(), v);
            }
        }
        out
    }
}

impl Nameable for Entity {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Positionable for Entity {
    fn position(&self) -> &Position {
        &self.position
    }

    fn position_mut(&mut self) -> &mut Position {
        &mut self.position
    }

    fn dimension_rule(&self) -> DimensionRule {
        self.kind.geometry().dimension_rule()
    }

    fn dimension_inputs(&self) -> DimensionInputs {
        self.kind.geometry().dimension_inputs(&self.position)
    }
}

impl PaintStateOwning for Entity {
    fn paint_state(&self) -> &PaintState {
        &self.tracker
    }

    fn paint_state_mut(&mut self) -> &mut PaintState {
        &mut self.tracker
    }
}

impl Drawable for Entity {
    fn drawable_info(&self) -> DrawableInfo {
        DrawableInfo {
            scale: self.position.scale,
            scale_outline: self.scale_outline,
            is_text: false,
        }
    }

    fn outline(&self) -> BezPath {
        self.kind.geometry().outline(&self.position)
    }

    fn check_hit(&self, point: Point) -> bool {
        let local = self.position.stamp_transform().inverse() * point;
        self.kind.geometry().hit_local(&self.position, local)
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/scene/entity.rs"]
mod tests;
