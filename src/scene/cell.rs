//! Paint surfaces and the copy/paste step that composites one surface onto another.

use std::collections::HashMap;

use crate::attr::{
    AttrMap, Attributes, Ripple, Ripples, Value, assign_coord, boolean, delta_coord,
    delta_length, delta_num, length, num, push_ripple, text,
};
use crate::design::{Design, DesignFrame};
use crate::foundation::core::{Affine, Coord, ImageData, Length, Rect, Vec2};
use crate::foundation::error::ScrawlResult;
use crate::foundation::pool::Pool;
use crate::paint::changes::{ChangeSet, DesignLookup, DrawableInfo, StyleResolver};
use crate::paint::color::Color;
use crate::paint::engine::{Paint, PaintEngine, StateWrite};
use crate::paint::state::{CompositeOp, PaintState};
use crate::position::reference::{DimensionInputs, DimensionRule, ReferenceDims};
use crate::position::{Position, rotation_about};
use crate::scene::capability::{Nameable, PaintStateOwning, Positionable};

/// Style written by [`Cell::set_to_clear_shape`].
pub const CLEAR_STYLE: &str = "rgba(0, 0, 0, 0)";

/// What a surface's paste geometry resolves against. Fixed when the surface joins a pad.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ReferenceRole {
    /// Not attached to a pad; the raw start is used.
    #[default]
    Standalone,
    /// The pad's visible surface; references the pad itself.
    DisplayOf(String),
    /// The pad's aggregating surface; references the display surface.
    BaseOf(String),
    /// Any other surface of the pad; references the display surface.
    WorkingSurfaceOf(String),
}

impl ReferenceRole {
    /// Owning pad, if attached.
    pub fn pad(&self) -> Option<&str> {
        match self {
            Self::Standalone => None,
            Self::DisplayOf(p) | Self::BaseOf(p) | Self::WorkingSurfaceOf(p) => Some(p),
        }
    }
}

/// Whole-pixel region of a surface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Region {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width, at least 1.
    pub width: f64,
    /// Height, at least 1.
    pub height: f64,
}

impl Region {
    /// As a kurbo rectangle.
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// One paint surface with its mirrored paint state and compositing geometry.
pub struct Cell {
    pub(crate) name: String,
    pub(crate) position: Position,
    pub(crate) copy: Coord,
    pub(crate) copy_width: Length,
    pub(crate) copy_height: Length,
    pub(crate) paste_width: Length,
    pub(crate) paste_height: Length,
    pub(crate) declared_width: Length,
    pub(crate) declared_height: Length,
    pub(crate) actual_width: f64,
    pub(crate) actual_height: f64,
    pub(crate) global_alpha: f64,
    pub(crate) global_composite_operation: CompositeOp,
    pub(crate) background_color: String,
    pub(crate) rendered: bool,
    pub(crate) cleared: bool,
    pub(crate) compiled: bool,
    pub(crate) shown: bool,
    pub(crate) compile_order: f64,
    pub(crate) show_order: f64,
    pub(crate) groups: Vec<String>,
    pub(crate) role: ReferenceRole,
    pub(crate) copy_data: Option<Region>,
    pub(crate) paste_data: Option<Region>,
    pub(crate) dimensions_dirty: bool,
    pub(crate) dirty_starts: bool,
    pub(crate) dirty_handles: bool,
    pub(crate) sort_groups: bool,
    pub(crate) engine: Box<dyn PaintEngine>,
    pub(crate) tracker: PaintState,
    pub(crate) tracker_name: String,
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cell")
            .field("name", &self.name)
            .field("actual_width", &self.actual_width)
            .field("actual_height", &self.actual_height)
            .field("role", &self.role)
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}

impl Cell {
    /// Wrap `engine`. Copy and paste sizes start out equal to the declared size.
    pub(crate) fn new(
        name: String,
        tracker_name: String,
        width: Length,
        height: Length,
        engine: Box<dyn PaintEngine>,
    ) -> Self {
        let tracker = PaintState::from_engine(engine.state());
        Self {
            name,
            position: Position::default(),
            copy: Coord::default(),
            copy_width: width,
            copy_height: height,
            paste_width: width,
            paste_height: height,
            declared_width: width,
            declared_height: height,
            actual_width: f64::from(engine.width()),
            actual_height: f64::from(engine.height()),
            global_alpha: 1.0,
            global_composite_operation: CompositeOp::SourceOver,
            background_color: CLEAR_STYLE.to_owned(),
            rendered: true,
            cleared: true,
            compiled: true,
            shown: true,
            compile_order: 0.0,
            show_order: 0.0,
            groups: Vec::new(),
            role: ReferenceRole::Standalone,
            copy_data: None,
            paste_data: None,
            dimensions_dirty: false,
            dirty_starts: true,
            dirty_handles: true,
            sort_groups: true,
            engine,
            tracker,
            tracker_name,
        }
    }

    /// Bitmap width.
    pub fn actual_width(&self) -> f64 {
        self.actual_width
    }

    /// Bitmap height.
    pub fn actual_height(&self) -> f64 {
        self.actual_height
    }

    /// Group names in compile order.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Reference role within its pad.
    pub fn role(&self) -> &ReferenceRole {
        &self.role
    }

    /// Tracker mirroring the engine.
    pub fn tracker(&self) -> &PaintState {
        &self.tracker
    }

    /// Name the tracker is registered under.
    pub fn tracker_name(&self) -> &str {
        &self.tracker_name
    }

    /// Compile order key.
    pub fn compile_order(&self) -> f64 {
        self.compile_order
    }

    /// Show order key.
    pub fn show_order(&self) -> f64 {
        self.show_order
    }

    /// The engine.
    pub fn engine(&self) -> &dyn PaintEngine {
        self.engine.as_ref()
    }

    /// Last copy region computed for a show pass.
    pub fn copy_data(&self) -> Option<Region> {
        self.copy_data
    }

    /// Last paste region computed for a show pass.
    pub fn paste_data(&self) -> Option<Region> {
        self.paste_data
    }

    pub(crate) fn is_cleared(&self) -> bool {
        self.rendered && self.cleared
    }

    pub(crate) fn is_compiled(&self) -> bool {
        self.rendered && self.compiled
    }

    pub(crate) fn is_shown(&self) -> bool {
        self.rendered && self.shown
    }

    /// Recompute the actual size from the declared size. Relative sizes need `frame`.
    ///
    /// Returns `true` when the size changed; the bitmap is reallocated on the next clear or
    /// compile.
    pub(crate) fn resolve_actual(&mut self, frame: Option<(f64, f64)>) -> bool {
        let axis = |l: Length, reference: Option<f64>, current: f64| match l {
            Length::Pixels(v) => v,
            rel => reference.map_or(current, |r| rel.resolve(r)),
        };
        let w = axis(self.declared_width, frame.map(|f| f.0), self.actual_width);
        let h = axis(self.declared_height, frame.map(|f| f.1), self.actual_height);
        let w = if w.is_finite() { w.round().max(1.0) } else { 1.0 };
        let h = if h.is_finite() { h.round().max(1.0) } else { 1.0 };
        if w == self.actual_width && h == self.actual_height && !self.dimensions_dirty {
            return false;
        }
        self.actual_width = w;
        self.actual_height = h;
        self.dimensions_dirty = true;
        self.dirty_starts = true;
        self.dirty_handles = true;
        self.copy_data = None;
        self.paste_data = None;
        self.position.invalidate_handle();
        true
    }

    /// Reallocate the bitmap if its size is flagged stale, then re-mirror the tracker.
    pub(crate) fn apply_dimensions(&mut self) -> ScrawlResult<()> {
        if !self.dimensions_dirty {
            return Ok(());
        }
        self.engine
            .resize(self.actual_width as u32, self.actual_height as u32)?;
        self.actual_width = f64::from(self.engine.width());
        self.actual_height = f64::from(self.engine.height());
        self.tracker.mirror_engine(self.engine.state());
        self.dimensions_dirty = false;
        tracing::debug!(
            cell = %self.name,
            width = self.actual_width,
            height = self.actual_height,
            "surface resized"
        );
        Ok(())
    }

    /// Erase the bitmap and refill the background. Drops the transform and any clip.
    pub(crate) fn clear(&mut self) -> ScrawlResult<()> {
        self.apply_dimensions()?;
        self.engine.set_transform(Affine::IDENTITY);
        self.engine.reset_clip();
        let full = Rect::new(0.0, 0.0, self.actual_width, self.actual_height);
        self.engine.clear_rect(full);
        if let Some(bg) = Color::parse(&self.background_color).filter(|c| !c.is_transparent()) {
            self.engine.write(StateWrite::Fill(Paint::Solid(bg)));
            self.tracker.fill_style.clone_from(&self.background_color);
            self.engine.fill_rect(full);
        }
        Ok(())
    }

    /// Bring the engine to `wanted`, writing only the attributes that differ.
    pub(crate) fn set_engine(
        &mut self,
        wanted: &PaintState,
        drawable: &DrawableInfo,
        frame: DesignFrame,
        designs: &HashMap<String, Design>,
        pool: &mut Pool<ChangeSet>,
    ) {
        let frame = DesignFrame {
            cell_width: self.actual_width,
            cell_height: self.actual_height,
            ..frame
        };
        pool.with_pooled(|changes| {
            wanted.get_changes(drawable, &self.tracker, &DesignTable(designs), changes);
            if changes.is_empty() {
                return;
            }
            tracing::trace!(cell = %self.name, changes = changes.len(), "applying paint changes");
            let mut painter = DesignPainter { designs, frame };
            self.tracker
                .apply_changes(changes, self.engine.as_mut(), &mut painter);
        });
    }

    /// Zero the shadow geometry on engine and tracker together.
    pub(crate) fn clear_shadow(&mut self) {
        self.engine.write(StateWrite::ShadowOffsetX(0.0));
        self.engine.write(StateWrite::ShadowOffsetY(0.0));
        self.engine.write(StateWrite::ShadowBlur(0.0));
        self.tracker.shadow_offset_x = 0.0;
        self.tracker.shadow_offset_y = 0.0;
        self.tracker.shadow_blur = 0.0;
    }

    /// Put back the shadow geometry of `wanted`.
    pub(crate) fn restore_shadow(&mut self, wanted: &PaintState) {
        self.engine
            .write(StateWrite::ShadowOffsetX(wanted.shadow_offset_x));
        self.engine
            .write(StateWrite::ShadowOffsetY(wanted.shadow_offset_y));
        self.engine.write(StateWrite::ShadowBlur(wanted.shadow_blur));
        self.tracker.shadow_offset_x = wanted.shadow_offset_x;
        self.tracker.shadow_offset_y = wanted.shadow_offset_y;
        self.tracker.shadow_blur = wanted.shadow_blur;
    }

    /// Make fill, stroke and shadow transparent.
    pub(crate) fn set_to_clear_shape(&mut self) {
        let clear = Paint::Solid(Color::TRANSPARENT);
        self.engine.write(StateWrite::Fill(clear.clone()));
        self.engine.write(StateWrite::Stroke(clear));
        self.engine.write(StateWrite::ShadowColor(Color::TRANSPARENT));
        CLEAR_STYLE.clone_into(&mut self.tracker.fill_style);
        CLEAR_STYLE.clone_into(&mut self.tracker.stroke_style);
        CLEAR_STYLE.clone_into(&mut self.tracker.shadow_color);
    }

    /// Source region: clamped inside the bitmap, floored.
    pub(crate) fn prepare_copy(&mut self) -> Region {
        if let Some(r) = self.copy_data {
            return r;
        }
        let (aw, ah) = (self.actual_width, self.actual_height);
        let axis = |pos: Length, size: Length, dim: f64| {
            let mut p = pos.resolve(dim).clamp(0.0, (dim - 1.0).max(0.0));
            let s = size.resolve(dim).clamp(1.0, dim.max(1.0));
            if p + s > dim {
                p = (dim - s).max(0.0);
            }
            (p.floor(), s.floor())
        };
        let (x, width) = axis(self.copy.x, self.copy_width, aw);
        let (y, height) = axis(self.copy.y, self.copy_height, ah);
        let r = Region {
            x,
            y,
            width,
            height,
        };
        self.copy_data = Some(r);
        r
    }

    /// Destination region: the resolved start and the scaled paste size, floored.
    ///
    /// `size_frame` is what relative paste sizes resolve against.
    pub(crate) fn prepare_paste(
        &mut self,
        reference: Option<ReferenceDims>,
        size_frame: (f64, f64),
    ) -> Region {
        if let Some(r) = self.paste_data
            && self.position.pivot.is_none()
            && self.position.current_start.is_fresh()
        {
            return r;
        }
        self.refresh_start(reference);
        let start = self.position.current_start.raw();
        let scale = self.position.scale;
        let size = |l: Length, dim: f64| (l.resolve(dim) * scale).max(1.0).floor();
        let r = Region {
            x: start.x.floor(),
            y: start.y.floor(),
            width: size(self.paste_width, size_frame.0),
            height: size(self.paste_height, size_frame.1),
        };
        self.paste_data = Some(r);
        r
    }

    /// Composite `src` onto this surface.
    ///
    /// The source's alpha and compositing mode are pushed into this engine first; the copy is
    /// rotated and flipped about the paste position and offset by the source's handle.
    pub(crate) fn copy_cell_to_self(
        &mut self,
        src: &mut Cell,
        reference: Option<ReferenceDims>,
        size_frame: (f64, f64),
    ) {
        if src.global_alpha != self.tracker.global_alpha {
            self.engine.write(StateWrite::GlobalAlpha(src.global_alpha));
            self.tracker.global_alpha = src.global_alpha;
        }
        if src.global_composite_operation != self.tracker.global_composite_operation {
            self.engine
                .write(StateWrite::Composite(src.global_composite_operation));
            self.tracker.global_composite_operation = src.global_composite_operation;
        }
        src.refresh_handle();
        let copy = src.prepare_copy();
        let paste = src.prepare_paste(reference, size_frame);
        let offset = src.position.current_handle.raw();
        let p = &src.position;
        self.engine.set_transform(rotation_about(
            Vec2::new(paste.x, paste.y),
            p.roll,
            p.flip_reverse,
            p.flip_upend,
        ));
        let image = src.engine.image();
        self.engine.draw_image(
            &image,
            copy.to_rect(),
            Rect::new(
                offset.x,
                offset.y,
                offset.x + paste.width,
                offset.y + paste.height,
            ),
        );
    }

    /// Capture `width × height` pixels at `(x, y)`, labelled `<cell>_imageData`.
    pub fn get_image_data(&self, x: i64, y: i64, width: u32, height: u32) -> ImageData {
        let mut data = self.engine.get_image_data(x, y, width, height);
        data.name = format!("{}_imageData", self.name);
        data
    }

    /// The whole bitmap.
    pub fn image_data(&self) -> ImageData {
        self.get_image_data(0, 0, self.engine.width(), self.engine.height())
    }

    /// Premultiplied RGBA at `(x, y)`, or `None` outside the bitmap.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let img = self.engine.image();
        (x < img.width && y < img.height).then(|| img.pixel(i64::from(x), i64::from(y)))
    }

    fn absorb(&mut self, ripples: &Ripples) {
        for r in ripples {
            match r {
                Ripple::Start | Ripple::Handle | Ripple::Paste | Ripple::Pivot => {
                    self.paste_data = None;
                }
                Ripple::Copy => self.copy_data = None,
                Ripple::Dimensions => {
                    self.copy_data = None;
                    self.paste_data = None;
                    self.dimensions_dirty = true;
                }
                _ => {}
            }
        }
    }

    fn set_one(&mut self, key: &str, v: &Value, ripples: &mut Ripples) {
        match key {
            "paste" => {
                self.position.set_key("start", v, ripples);
            }
            "pasteX" => {
                self.position.set_key("startX", v, ripples);
            }
            "pasteY" => {
                self.position.set_key("startY", v, ripples);
            }
            "copy" => {
                if assign_coord(&mut self.copy, v) {
                    push_ripple(ripples, Ripple::Copy);
                }
            }
            "copyX" | "copyY" | "copyWidth" | "copyHeight" => {
                if let Some(l) = length(v) {
                    match key {
                        "copyX" => self.copy.x = l,
                        "copyY" => self.copy.y = l,
                        "copyWidth" => self.copy_width = l,
                        _ => self.copy_height = l,
                    }
                    push_ripple(ripples, Ripple::Copy);
                }
            }
            "pasteWidth" | "pasteHeight" => {
                if let Some(l) = length(v) {
                    if key == "pasteWidth" {
                        self.paste_width = l;
                    } else {
                        self.paste_height = l;
                    }
                    push_ripple(ripples, Ripple::Paste);
                }
            }
            "actualWidth" | "actualHeight" => {
                if let Some(l) = length(v) {
                    if key == "actualWidth" {
                        self.declared_width = l;
                    } else {
                        self.declared_height = l;
                    }
                    push_ripple(ripples, Ripple::Dimensions);
                }
            }
            "width" | "height" => {
                // A zero or missing size leaves everything as it was.
                let Some(l) = length(v).filter(|l| *l != Length::ZERO) else {
                    return;
                };
                if key == "width" {
                    self.declared_width = l;
                    self.copy_width = l;
                    self.paste_width = l;
                } else {
                    self.declared_height = l;
                    self.copy_height = l;
                    self.paste_height = l;
                }
                push_ripple(ripples, Ripple::Dimensions);
                push_ripple(ripples, Ripple::Copy);
                push_ripple(ripples, Ripple::Paste);
            }
            "globalAlpha" => {
                if let Some(a) = num(v) {
                    self.global_alpha = a.clamp(0.0, 1.0);
                }
            }
            "globalCompositeOperation" => {
                if let Some(op) = text(v).and_then(CompositeOp::parse) {
                    self.global_composite_operation = op;
                }
            }
            "backgroundColor" => {
                if let Some(s) = text(v) {
                    self.background_color = s.to_owned();
                }
            }
            "rendered" | "cleared" | "compiled" | "shown" => {
                if let Some(b) = boolean(v) {
                    match key {
                        "rendered" => self.rendered = b,
                        "cleared" => self.cleared = b,
                        "compiled" => self.compiled = b,
                        _ => self.shown = b,
                    }
                }
            }
            "compileOrder" => {
                if let Some(o) = num(v) {
                    self.compile_order = o;
                    push_ripple(ripples, Ripple::CompileOrder);
                }
            }
            "showOrder" => {
                if let Some(o) = num(v) {
                    self.show_order = o;
                    push_ripple(ripples, Ripple::ShowOrder);
                }
            }
            _ => {
                self.position.set_key(key, v, ripples);
            }
        }
    }

    fn delta_one(&mut self, key: &str, v: &Value, ripples: &mut Ripples) {
        match key {
            "paste" => {
                self.position.delta_key("start", v, ripples);
            }
            "pasteX" => {
                self.position.delta_key("startX", v, ripples);
            }
            "pasteY" => {
                self.position.delta_key("startY", v, ripples);
            }
            "copy" => {
                if delta_coord(&mut self.copy, v) {
                    push_ripple(ripples, Ripple::Copy);
                }
            }
            "copyX" | "copyY" | "copyWidth" | "copyHeight" => {
                let slot = match key {
                    "copyX" => &mut self.copy.x,
                    "copyY" => &mut self.copy.y,
                    "copyWidth" => &mut self.copy_width,
                    _ => &mut self.copy_height,
                };
                if let Some(l) = delta_length(*slot, v) {
                    *slot = l;
                    push_ripple(ripples, Ripple::Copy);
                }
            }
            "pasteWidth" | "pasteHeight" => {
                let slot = if key == "pasteWidth" {
                    &mut self.paste_width
                } else {
                    &mut self.paste_height
                };
                if let Some(l) = delta_length(*slot, v) {
                    *slot = l;
                    push_ripple(ripples, Ripple::Paste);
                }
            }
            "actualWidth" | "actualHeight" | "width" | "height" => {
                let current = if matches!(key, "actualWidth" | "width") {
                    self.declared_width
                } else {
                    self.declared_height
                };
                if let Some(l) = delta_length(current, v) {
                    self.set_one(key, &l.to_value(), ripples);
                }
            }
            "globalAlpha" => {
                if let Some(a) = delta_num(self.global_alpha, v) {
                    self.global_alpha = a.clamp(0.0, 1.0);
                }
            }
            "compileOrder" => {
                if let Some(o) = delta_num(self.compile_order, v) {
                    self.compile_order = o;
                    push_ripple(ripples, Ripple::CompileOrder);
                }
            }
            "showOrder" => {
                if let Some(o) = delta_num(self.show_order, v) {
                    self.show_order = o;
                    push_ripple(ripples, Ripple::ShowOrder);
                }
            }
            "globalCompositeOperation" | "backgroundColor" | "rendered" | "cleared"
            | "compiled" | "shown" => self.set_one(key, v, ripples),
            _ => {
                self.position.delta_key(key, v, ripples);
            }
        }
    }
}

impl Attributes for Cell {
    fn get(&self, key: &str) -> Option<Value> {
        let v = match key {
            "name" => Value::String(self.name.clone()),
            "paste" => self.position.start.to_value(),
            "pasteX" => self.position.start.x.to_value(),
            "pasteY" => self.position.start.y.to_value(),
            "copy" => self.copy.to_value(),
            "copyX" => self.copy.x.to_value(),
            "copyY" => self.copy.y.to_value(),
            "copyWidth" => self.copy_width.to_value(),
            "copyHeight" => self.copy_height.to_value(),
            "pasteWidth" => self.paste_width.to_value(),
            "pasteHeight" => self.paste_height.to_value(),
            "actualWidth" | "width" => serde_json::json!(self.actual_width),
            "actualHeight" | "height" => serde_json::json!(self.actual_height),
            "globalAlpha" => serde_json::json!(self.global_alpha),
            "globalCompositeOperation" => {
                Value::String(self.global_composite_operation.as_str().to_owned())
            }
            "backgroundColor" => Value::String(self.background_color.clone()),
            "rendered" => Value::Bool(self.rendered),
            "cleared" => Value::Bool(self.cleared),
            "compiled" => Value::Bool(self.compiled),
            "shown" => Value::Bool(self.shown),
            "compileOrder" => serde_json::json!(self.compile_order),
            "showOrder" => serde_json::json!(self.show_order),
            "groups" => serde_json::json!(self.groups),
            _ => return self.position.get_key(key),
        };
        Some(v)
    }

    fn set(&mut self, items: &AttrMap) -> Ripples {
        let mut ripples = Ripples::new();
        for (k, v) in items {
            self.set_one(k, v, &mut ripples);
        }
        self.absorb(&ripples);
        ripples
    }

    fn set_delta(&mut self, items: &AttrMap) -> Ripples {
        let mut ripples = Ripples::new();
        for (k, v) in items {
            self.delta_one(k, v, &mut ripples);
        }
        self.absorb(&ripples);
        ripples
    }

    fn snapshot(&self) -> AttrMap {
        let mut out = AttrMap::new();
        self.position.snapshot_into(&mut out);
        // Surfaces size themselves through the declared size, not the position's.
        out.remove("width");
        out.remove("height");
        for key in [
            "copy",
            "copyWidth",
            "copyHeight",
            "pasteWidth",
            "pasteHeight",
            "globalAlpha",
            "globalCompositeOperation",
            "backgroundColor",
            "rendered",
            "cleared",
            "compiled",
            "shown",
            "compileOrder",
            "showOrder",
        ] {
            if let Some(v) = self.get(key) {
                out.insert(key.to_owned(), v);
            }
        }
        out.insert("actualWidth".to_owned(), self.declared_width.to_value());
        out.insert("actualHeight".to_owned(), self.declared_height.to_value());
        out
    }
}

impl Nameable for Cell {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Positionable for Cell {
    fn position(&self) -> &Position {
        &self.position
    }

    fn position_mut(&mut self) -> &mut Position {
        &mut self.position
    }

    fn dimension_rule(&self) -> DimensionRule {
        DimensionRule::Cell
    }

    fn dimension_inputs(&self) -> DimensionInputs {
        DimensionInputs {
            width: self.actual_width,
            height: self.actual_height,
            scale: self.position.scale,
            ..DimensionInputs::default()
        }
    }
}

impl PaintStateOwning for Cell {
    fn paint_state(&self) -> &PaintState {
        &self.tracker
    }

    fn paint_state_mut(&mut self) -> &mut PaintState {
        &mut self.tracker
    }
}

struct DesignTable<'a>(&'a HashMap<String, Design>);

impl DesignLookup for DesignTable<'_> {
    fn forces_update(&self, name: &str) -> bool {
        self.0.get(name).is_some_and(Design::forces_update)
    }
}

struct DesignPainter<'a> {
    designs: &'a HashMap<String, Design>,
    frame: DesignFrame,
}

impl StyleResolver for DesignPainter<'_> {
    fn resolve_design(&mut self, name: &str) -> Option<Paint> {
        self.designs.get(name).map(|d| d.resolve(&self.frame))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/cell.rs"]
mod tests;
