use kurbo::Shape as _;

use crate::attr::{AttrMap, Ripples, Value, boolean, text};
use crate::foundation::core::{Affine, BezPath, Point, Rect, Vec2};
use crate::position::Position;
use crate::position::reference::{DimensionInputs, DimensionRule};
use crate::scene::entity::Geometry;

/// Outline from SVG path data, drawn in its own coordinates relative to the start.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Shape {
    d: String,
    path: BezPath,
    bounds: Rect,
    pub(crate) is_line: bool,
}

impl Shape {
    /// SVG path data.
    pub fn d(&self) -> &str {
        &self.d
    }

    /// Parsed path in its own coordinates.
    pub fn path(&self) -> &BezPath {
        &self.path
    }

    /// Whether the path is treated as an open line.
    pub fn is_line(&self) -> bool {
        self.is_line
    }

    /// Replace the path data. Unparsable data leaves an empty path.
    pub(crate) fn set_d(&mut self, d: &str) {
        d.clone_into(&mut self.d);
        self.path = match BezPath::from_svg(d) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "unparsable path data");
                BezPath::new()
            }
        };
        self.bounds = if self.path.elements().is_empty() {
            Rect::ZERO
        } else {
            self.path.bounding_box()
        };
    }

    fn placement(position: &Position) -> Affine {
        Affine::translate(position.current_handle.raw()) * Affine::scale(position.scale)
    }
}

impl Geometry for Shape {
    fn label(&self) -> &'static str {
        "Shape"
    }

    fn dimension_rule(&self) -> DimensionRule {
        DimensionRule::Shape
    }

    fn dimension_inputs(&self, position: &Position) -> DimensionInputs {
        DimensionInputs {
            width: self.bounds.width(),
            height: self.bounds.height(),
            scale: position.scale,
            is_line: self.is_line,
            ..DimensionInputs::default()
        }
    }

    fn fit_to_cell(&mut self, _position: &Position, _cell_width: f64, _cell_height: f64) -> bool {
        false
    }

    fn outline(&self, position: &Position) -> BezPath {
        Self::placement(position) * self.path.clone()
    }

    fn local_size(&self, position: &Position) -> (f64, f64) {
        (
            self.bounds.width() * position.scale,
            self.bounds.height() * position.scale,
        )
    }

    fn box_offset(&self, position: &Position) -> Vec2 {
        -self.bounds.origin().to_vec2() * position.scale
    }

    fn hit_local(&self, position: &Position, local: Point) -> bool {
        let unplaced = Self::placement(position).inverse() * local;
        self.path.contains(unplaced)
    }

    fn get_key(&self, key: &str) -> Option<Value> {
        match key {
            "d" => Some(Value::String(self.d.clone())),
            "isLine" => Some(Value::Bool(self.is_line)),
            _ => None,
        }
    }

    fn set_key(&mut self, key: &str, v: &Value, _delta: bool, _ripples: &mut Ripples) -> bool {
        match key {
            "d" => {
                if let Some(d) = text(v) {
                    self.set_d(d);
                }
            }
            "isLine" => {
                if let Some(b) = boolean(v) {
                    self.is_line = b;
                }
            }
            _ => return false,
        }
        true
    }

    fn snapshot_into(&self, out: &mut AttrMap) {
        out.insert("d".to_owned(), Value::String(self.d.clone()));
        out.insert("isLine".to_owned(), Value::Bool(self.is_line));
    }
}
