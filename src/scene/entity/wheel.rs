use std::f64::consts::TAU;

use kurbo::{Arc, PathEl};

use crate::attr::{AttrMap, Ripples, Value, boolean, delta_length, delta_num, length, num};
use crate::foundation::core::{BezPath, Length, Point, Vec2};
use crate::foundation::math::DEG_TO_RAD;
use crate::position::Position;
use crate::position::reference::{DimensionInputs, DimensionRule};
use crate::scene::entity::Geometry;

/// Circle or arc centered on the current handle.
#[derive(Clone, Debug, PartialEq)]
pub struct Wheel {
    pub(crate) radius: Length,
    resolved_radius: f64,
    pub(crate) start_angle: f64,
    pub(crate) end_angle: f64,
    pub(crate) clockwise: bool,
    pub(crate) closed: bool,
    pub(crate) include_center: bool,
    pub(crate) check_hit_using_radius: bool,
    pub(crate) check_hit_radius: f64,
}

impl Default for Wheel {
    fn default() -> Self {
        Self {
            radius: Length::Pixels(5.0),
            resolved_radius: 5.0,
            start_angle: 0.0,
            end_angle: 360.0,
            clockwise: false,
            closed: true,
            include_center: false,
            check_hit_using_radius: true,
            check_hit_radius: 0.0,
        }
    }
}

impl Wheel {
    /// Radius in pixels, before scaling, as of the last fit.
    pub fn resolved_radius(&self) -> f64 {
        self.resolved_radius
    }

    /// Sweep in radians the way a canvas `arc` call measures it.
    ///
    /// `clockwise` is handed to the arc as its anticlockwise argument.
    fn sweep(&self) -> f64 {
        let (s, e) = (self.start_angle * DEG_TO_RAD, self.end_angle * DEG_TO_RAD);
        if self.clockwise {
            let d = s - e;
            if d >= TAU { -TAU } else { -d.rem_euclid(TAU) }
        } else {
            let d = e - s;
            if d >= TAU { TAU } else { d.rem_euclid(TAU) }
        }
    }

    fn center(position: &Position) -> Point {
        position.current_handle.raw().to_point()
    }
}

impl Geometry for Wheel {
    fn label(&self) -> &'static str {
        "Wheel"
    }

    fn dimension_rule(&self) -> DimensionRule {
        DimensionRule::Wheel
    }

    fn dimension_inputs(&self, position: &Position) -> DimensionInputs {
        DimensionInputs {
            radius: self.resolved_radius,
            scale: position.scale,
            ..DimensionInputs::default()
        }
    }

    fn fit_to_cell(&mut self, _position: &Position, cell_width: f64, _cell_height: f64) -> bool {
        let r = self.radius.resolve(cell_width);
        let r = if r.is_finite() { r.max(0.0) } else { 0.0 };
        if r == self.resolved_radius {
            return false;
        }
        self.resolved_radius = r;
        true
    }

    fn outline(&self, position: &Position) -> BezPath {
        let r = self.resolved_radius * position.scale;
        let center = Self::center(position);
        let start = self.start_angle * DEG_TO_RAD;
        let arc = Arc::new(center, Vec2::new(r, r), start, self.sweep(), 0.0);
        let first = center + Vec2::new(r * start.cos(), r * start.sin());

        let mut path = BezPath::new();
        if self.include_center {
            path.move_to(center);
            path.line_to(first);
        } else {
            path.move_to(first);
        }
        arc.to_cubic_beziers(0.1, |p1, p2, p| {
            path.push(PathEl::CurveTo(p1, p2, p));
        });
        if self.closed || self.include_center {
            path.close_path();
        }
        path
    }

    fn local_size(&self, position: &Position) -> (f64, f64) {
        let d = self.resolved_radius * 2.0 * position.scale;
        (d, d)
    }

    fn box_offset(&self, position: &Position) -> Vec2 {
        let r = self.resolved_radius * position.scale;
        Vec2::new(r, r)
    }

    fn hit_local(&self, position: &Position, local: Point) -> bool {
        if !self.check_hit_using_radius {
            return kurbo::Shape::contains(&self.outline(position), local);
        }
        let r = if self.check_hit_radius > 0.0 {
            self.check_hit_radius
        } else {
            self.resolved_radius * position.scale
        };
        (local - Self::center(position)).hypot() <= r
    }

    fn get_key(&self, key: &str) -> Option<Value> {
        let v = match key {
            "radius" => self.radius.to_value(),
            "startAngle" => serde_json::json!(self.start_angle),
            "endAngle" => serde_json::json!(self.end_angle),
            "clockwise" => Value::Bool(self.clockwise),
            "closed" => Value::Bool(self.closed),
            "includeCenter" => Value::Bool(self.include_center),
            "checkHitUsingRadius" => Value::Bool(self.check_hit_using_radius),
            "checkHitRadius" => serde_json::json!(self.check_hit_radius),
            _ => return None,
        };
        Some(v)
    }

    fn set_key(&mut self, key: &str, v: &Value, delta: bool, _ripples: &mut Ripples) -> bool {
        let number = |current: f64| if delta { delta_num(current, v) } else { num(v) };
        match key {
            "radius" => {
                let next = if delta {
                    delta_length(self.radius, v)
                } else {
                    length(v)
                };
                if let Some(l) = next {
                    self.radius = l;
                    if let Length::Pixels(r) = l {
                        self.resolved_radius = r.max(0.0);
                    }
                }
            }
            "startAngle" => {
                if let Some(a) = number(self.start_angle) {
                    self.start_angle = a;
                }
            }
            "endAngle" => {
                if let Some(a) = number(self.end_angle) {
                    self.end_angle = a;
                }
            }
            "checkHitRadius" => {
                if let Some(r) = number(self.check_hit_radius) {
                    self.check_hit_radius = r.max(0.0);
                }
            }
            "clockwise" | "closed" | "includeCenter" | "checkHitUsingRadius" => {
                if let Some(b) = boolean(v) {
                    match key {
                        "clockwise" => self.clockwise = b,
                        "closed" => self.closed = b,
                        "includeCenter" => self.include_center = b,
                        _ => self.check_hit_using_radius = b,
                    }
                }
            }
            _ => return false,
        }
        true
    }

    fn snapshot_into(&self, out: &mut AttrMap) {
        for key in [
            "radius",
            "startAngle",
            "endAngle",
            "clockwise",
            "closed",
            "includeCenter",
            "checkHitUsingRadius",
            "checkHitRadius",
        ] {
            if let Some(v) = self.get_key(key) {
                out.insert(key.to_owned(), v);
            }
        }
    }
}
