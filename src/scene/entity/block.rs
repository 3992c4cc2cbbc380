use kurbo::Shape as _;

use crate::attr::{AttrMap, Ripples, Value};
use crate::foundation::core::{BezPath, Rect, Vec2};
use crate::position::Position;
use crate::position::reference::{DimensionInputs, DimensionRule};
use crate::scene::entity::Geometry;

/// Rectangle sized by the position's `width`/`height`; relative sizes follow the cell.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Block {
    local_width: f64,
    local_height: f64,
}

impl Block {
    /// Scaled width as of the last fit.
    pub fn local_width(&self) -> f64 {
        self.local_width
    }

    /// Scaled height as of the last fit.
    pub fn local_height(&self) -> f64 {
        self.local_height
    }

    fn rect(&self, position: &Position) -> Rect {
        let h = position.current_handle.raw();
        Rect::new(h.x, h.y, h.x + self.local_width, h.y + self.local_height)
    }
}

impl Geometry for Block {
    fn label(&self) -> &'static str {
        "Block"
    }

    fn dimension_rule(&self) -> DimensionRule {
        DimensionRule::Block
    }

    fn dimension_inputs(&self, position: &Position) -> DimensionInputs {
        DimensionInputs {
            local_width: self.local_width,
            local_height: self.local_height,
            scale: position.scale,
            ..DimensionInputs::default()
        }
    }

    fn fit_to_cell(&mut self, position: &Position, cell_width: f64, cell_height: f64) -> bool {
        let w = position.width.resolve(cell_width) * position.scale;
        let h = position.height.resolve(cell_height) * position.scale;
        let w = if w.is_finite() { w } else { 0.0 };
        let h = if h.is_finite() { h } else { 0.0 };
        if w == self.local_width && h == self.local_height {
            return false;
        }
        self.local_width = w;
        self.local_height = h;
        true
    }

    fn outline(&self, position: &Position) -> BezPath {
        self.rect(position).to_path(0.1)
    }

    fn local_size(&self, _position: &Position) -> (f64, f64) {
        (self.local_width, self.local_height)
    }

    fn box_offset(&self, _position: &Position) -> Vec2 {
        Vec2::ZERO
    }

    fn hit_local(&self, position: &Position, local: kurbo::Point) -> bool {
        self.rect(position).contains(local)
    }

    fn clear_rect(&self, position: &Position) -> Option<Rect> {
        Some(self.rect(position))
    }

    fn get_key(&self, _key: &str) -> Option<Value> {
        None
    }

    fn set_key(&mut self, _key: &str, _v: &Value, _delta: bool, _ripples: &mut Ripples) -> bool {
        false
    }

    fn snapshot_into(&self, _out: &mut AttrMap) {}
}
