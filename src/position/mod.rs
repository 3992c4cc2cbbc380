//! Coordinate resolution: symbolic start/handle values to absolute pixels, cached until an
//! input changes.

pub(crate) mod pivot;
pub(crate) mod reference;

use crate::attr::{
    AttrMap, Ripple, Ripples, Value, assign_coord, boolean, delta_coord, delta_length, delta_num,
    length, num, push_ripple, text,
};
use crate::foundation::core::{Affine, CachedVector, Coord, Length, Vec2};
use crate::foundation::math::DEG_TO_RAD;
use pivot::PivotKind;
use reference::ReferenceDims;

/// Position state shared by every positioned object.
#[derive(Clone, Debug, PartialEq)]
pub struct Position {
    pub(crate) start: Coord,
    pub(crate) handle: Coord,
    pub(crate) scale: f64,
    pub(crate) roll: f64,
    pub(crate) flip_reverse: bool,
    pub(crate) flip_upend: bool,
    pub(crate) lock_x: bool,
    pub(crate) lock_y: bool,
    pub(crate) pivot: Option<String>,
    pub(crate) mouse_index: String,
    pub(crate) width: Length,
    pub(crate) height: Length,

    pub(crate) current_start: CachedVector,
    pub(crate) current_handle: CachedVector,
    pub(crate) current_pivot: Option<PivotKind>,
    // Pointer position at the previous pivot resolution.
    pub(crate) pointer_anchor: Option<Vec2>,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            start: Coord::default(),
            handle: Coord::default(),
            scale: 1.0,
            roll: 0.0,
            flip_reverse: false,
            flip_upend: false,
            lock_x: false,
            lock_y: false,
            pivot: None,
            mouse_index: PivotKind::POINTER_KEYWORD.to_owned(),
            width: Length::ZERO,
            height: Length::ZERO,
            current_start: CachedVector::stale(),
            current_handle: CachedVector::stale(),
            current_pivot: None,
            pointer_anchor: None,
        }
    }
}

impl Position {
    /// Symbolic start.
    pub fn start(&self) -> Coord {
        self.start
    }

    /// Symbolic handle.
    pub fn handle(&self) -> Coord {
        self.handle
    }

    /// Scale factor.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Rotation in degrees.
    pub fn roll(&self) -> f64 {
        self.roll
    }

    /// Horizontal mirror flag.
    pub fn flip_reverse(&self) -> bool {
        self.flip_reverse
    }

    /// Vertical mirror flag.
    pub fn flip_upend(&self) -> bool {
        self.flip_upend
    }

    /// Pivot target name.
    pub fn pivot(&self) -> Option<&str> {
        self.pivot.as_deref()
    }

    /// Pointer index followed by pointer pivots.
    pub fn mouse_index(&self) -> &str {
        &self.mouse_index
    }

    /// Declared width.
    pub fn width(&self) -> Length {
        self.width
    }

    /// Declared height.
    pub fn height(&self) -> Length {
        self.height
    }

    /// Resolved start cache.
    pub fn current_start(&self) -> &CachedVector {
        &self.current_start
    }

    /// Resolved handle cache (already negated).
    pub fn current_handle(&self) -> &CachedVector {
        &self.current_handle
    }

    /// Cached pivot classification.
    pub fn current_pivot(&self) -> Option<&PivotKind> {
        self.current_pivot.as_ref()
    }

    pub(crate) fn invalidate_start(&mut self) {
        self.current_start.invalidate();
    }

    pub(crate) fn invalidate_handle(&mut self) {
        self.current_handle.invalidate();
    }

    pub(crate) fn get_key(&self, key: &str) -> Option<Value> {
        let v = match key {
            "start" => self.start.to_value(),
            "startX" => self.start.x.to_value(),
            "startY" => self.start.y.to_value(),
            "handle" => self.handle.to_value(),
            "handleX" => self.handle.x.to_value(),
            "handleY" => self.handle.y.to_value(),
            "scale" => serde_json::json!(self.scale),
            "roll" => serde_json::json!(self.roll),
            "flipReverse" => Value::Bool(self.flip_reverse),
            "flipUpend" => Value::Bool(self.flip_upend),
            "lockX" => Value::Bool(self.lock_x),
            "lockY" => Value::Bool(self.lock_y),
            "pivot" => self
                .pivot
                .as_ref()
                .map_or(Value::Null, |p| Value::String(p.clone())),
            "mouseIndex" => Value::String(self.mouse_index.clone()),
            "width" => self.width.to_value(),
            "height" => self.height.to_value(),
            _ => return None,
        };
        Some(v)
    }

    /// Apply one position key. Returns `false` when `key` is not a position key.
    pub(crate) fn set_key(&mut self, key: &str, v: &Value, ripples: &mut Ripples) -> bool {
        match key {
            "start" => {
                if assign_coord(&mut self.start, v) {
                    self.start_changed(ripples);
                }
            }
            "startX" => {
                if let Some(l) = length(v) {
                    self.start.x = l;
                    self.start_changed(ripples);
                }
            }
            "startY" => {
                if let Some(l) = length(v) {
                    self.start.y = l;
                    self.start_changed(ripples);
                }
            }
            "handle" => {
                if assign_coord(&mut self.handle, v) {
                    self.handle_changed(ripples);
                }
            }
            "handleX" => {
                if let Some(l) = length(v) {
                    self.handle.x = l;
                    self.handle_changed(ripples);
                }
            }
            "handleY" => {
                if let Some(l) = length(v) {
                    self.handle.y = l;
                    self.handle_changed(ripples);
                }
            }
            "scale" => {
                if let Some(s) = num(v) {
                    self.scale = s;
                    self.handle_changed(ripples);
                }
            }
            "width" => {
                if let Some(l) = length(v) {
                    self.width = l;
                    self.handle_changed(ripples);
                }
            }
            "height" => {
                if let Some(l) = length(v) {
                    self.height = l;
                    self.handle_changed(ripples);
                }
            }
            "roll" => {
                if let Some(r) = num(v) {
                    self.roll = r;
                }
            }
            "flipReverse" => {
                if let Some(b) = boolean(v) {
                    self.flip_reverse = b;
                }
            }
            "flipUpend" => {
                if let Some(b) = boolean(v) {
                    self.flip_upend = b;
                }
            }
            "lockX" => {
                if let Some(b) = boolean(v) {
                    self.lock_x = b;
                }
            }
            "lockY" => {
                if let Some(b) = boolean(v) {
                    self.lock_y = b;
                }
            }
            "pivot" => {
                self.set_pivot(text(v).map(str::to_owned));
                push_ripple(ripples, Ripple::Pivot);
            }
            "mouseIndex" => {
                if let Some(s) = text(v) {
                    self.mouse_index = s.to_owned();
                }
            }
            _ => return false,
        }
        true
    }

    /// Additive form of [`Position::set_key`].
    pub(crate) fn delta_key(&mut self, key: &str, v: &Value, ripples: &mut Ripples) -> bool {
        match key {
            "start" => {
                if delta_coord(&mut self.start, v) {
                    self.start_changed(ripples);
                }
            }
            "startX" => {
                if let Some(l) = delta_length(self.start.x, v) {
                    self.start.x = l;
                    self.start_changed(ripples);
                }
            }
            "startY" => {
                if let Some(l) = delta_length(self.start.y, v) {
                    self.start.y = l;
                    self.start_changed(ripples);
                }
            }
            "handle" => {
                if delta_coord(&mut self.handle, v) {
                    self.handle_changed(ripples);
                }
            }
            "handleX" => {
                if let Some(l) = delta_length(self.handle.x, v) {
                    self.handle.x = l;
                    self.handle_changed(ripples);
                }
            }
            "handleY" => {
                if let Some(l) = delta_length(self.handle.y, v) {
                    self.handle.y = l;
                    self.handle_changed(ripples);
                }
            }
            "scale" => {
                if let Some(s) = delta_num(self.scale, v) {
                    self.scale = s;
                    self.handle_changed(ripples);
                }
            }
            "width" => {
                if let Some(l) = delta_length(self.width, v) {
                    self.width = l;
                    self.handle_changed(ripples);
                }
            }
            "height" => {
                if let Some(l) = delta_length(self.height, v) {
                    self.height = l;
                    self.handle_changed(ripples);
                }
            }
            "roll" => {
                if let Some(r) = delta_num(self.roll, v) {
                    self.roll = r;
                }
            }
            // Non-numeric keys fall back to plain assignment.
            _ => return self.set_key(key, v, ripples),
        }
        true
    }

    pub(crate) fn snapshot_into(&self, map: &mut AttrMap) {
        for key in [
            "start",
            "handle",
            "scale",
            "roll",
            "flipReverse",
            "flipUpend",
            "lockX",
            "lockY",
            "pivot",
            "mouseIndex",
            "width",
            "height",
        ] {
            if let Some(v) = self.get_key(key) {
                map.insert(key.to_owned(), v);
            }
        }
    }

    fn start_changed(&mut self, ripples: &mut Ripples) {
        self.current_start.invalidate();
        push_ripple(ripples, Ripple::Start);
    }

    fn handle_changed(&mut self, ripples: &mut Ripples) {
        self.current_handle.invalidate();
        push_ripple(ripples, Ripple::Handle);
    }

    /// Reassign the pivot; the cached classification is dropped.
    pub(crate) fn set_pivot(&mut self, pivot: Option<String>) {
        self.pivot = pivot;
        self.current_pivot = None;
    }

    /// Recompute the handle cache if stale.
    ///
    /// Relative values resolve against `dims`; keyword values on centered frames are measured
    /// from the center; relative results scale with the object. The cache holds the negated
    /// offset.
    pub fn update_current_handle(&mut self, dims: ReferenceDims) {
        if self.current_handle.is_fresh() {
            return;
        }
        let axis = |l: Length, dim: f64, scale: f64| -> f64 {
            match l {
                Length::Pixels(v) => v,
                _ => {
                    let mut v = l.resolve(dim);
                    if dims.centered && l.is_keyword() {
                        v -= dim / 2.0;
                    }
                    v * scale
                }
            }
        };
        let x = axis(self.handle.x, dims.w, self.scale);
        let y = axis(self.handle.y, dims.h, self.scale);
        let x = if x.is_finite() { -x } else { 0.0 };
        let y = if y.is_finite() { -y } else { 0.0 };
        // Avoid storing negative zero so snapshots stay tidy.
        self.current_handle.store(Vec2::new(x + 0.0, y + 0.0));
    }

    /// Recompute the start cache if stale and a reference frame is available.
    ///
    /// A missing reference leaves the cache stale. A non-finite result writes the origin but
    /// keeps the cache stale so the next stamp retries.
    pub fn update_current_start(&mut self, reference: Option<ReferenceDims>) {
        if self.current_start.is_fresh() {
            return;
        }
        let Some(r) = reference else {
            return;
        };
        let x = match self.start.x {
            Length::Pixels(v) => v,
            l => l.resolve(r.w),
        };
        let y = match self.start.y {
            Length::Pixels(v) => v,
            l => l.resolve(r.h),
        };
        if !(x.is_finite() && y.is_finite() && r.w.is_finite() && r.h.is_finite()) {
            self.current_start.write_raw(Vec2::ZERO);
            return;
        }
        self.current_start.store(Vec2::new(x, y));
    }

    /// Rotation/flip transform about the resolved start.
    pub fn stamp_transform(&self) -> Affine {
        let origin = self.current_start.raw();
        rotation_about(origin, self.roll, self.flip_reverse, self.flip_upend)
    }

    /// Pointer pivot: move by the pointer's change since the previous resolution.
    ///
    /// The first resolution only records the anchor, so the object never snaps to the pointer.
    pub(crate) fn follow_pointer(&mut self, pointer: Vec2) {
        let Some(anchor) = self.pointer_anchor else {
            self.pointer_anchor = Some(pointer);
            return;
        };
        let mut cs = self.current_start.raw();
        if !self.lock_x {
            cs.x += pointer.x - anchor.x;
        }
        if !self.lock_y {
            cs.y += pointer.y - anchor.y;
        }
        self.current_start.write_raw(cs);
        self.pointer_anchor = Some(pointer);
    }

    /// Point or entity pivot: take the target position on every unlocked axis.
    pub(crate) fn follow_target(&mut self, target: Vec2) {
        let mut cs = self.current_start.raw();
        if !self.lock_x {
            cs.x = target.x;
        }
        if !self.lock_y {
            cs.y = target.y;
        }
        self.current_start.write_raw(cs);
    }
}

/// Canvas-style `setTransform(cos·r, sin·r, -sin·u, cos·u, x, y)` with `r`/`u` the flips.
pub(crate) fn rotation_about(origin: Vec2, roll_deg: f64, reverse: bool, upend: bool) -> Affine {
    let rev = if reverse { -1.0 } else { 1.0 };
    let up = if upend { -1.0 } else { 1.0 };
    let (sin, cos) = (roll_deg * DEG_TO_RAD).sin_cos();
    Affine::new([cos * rev, sin * rev, -sin * up, cos * up, origin.x, origin.y])
}

#[cfg(test)]
#[path = "../../tests/unit/position/position.rs"]
mod tests;
