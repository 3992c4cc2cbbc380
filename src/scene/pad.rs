use std::collections::HashMap;

use crate::attr::{
    AttrMap, Attributes, Ripple, Ripples, Value, delta_num, num, push_ripple, text,
};
use crate::foundation::core::Vec2;
use crate::position::Position;
use crate::position::reference::{DimensionInputs, DimensionRule};
use crate::scene::capability::{Nameable, Positionable};
use crate::scene::cell::ReferenceRole;

/// Controller of one visible surface and its working surfaces.
#[derive(Clone, Debug)]
pub struct Pad {
    pub(crate) name: String,
    pub(crate) position: Position,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) display: String,
    pub(crate) base: String,
    pub(crate) current: String,
    pub(crate) cells: Vec<String>,
    pub(crate) cells_compile_order: Vec<String>,
    pub(crate) cells_show_order: Vec<String>,
    pub(crate) resort_compile: bool,
    pub(crate) resort_show: bool,
    pub(crate) mice: HashMap<String, Vec2>,
}

impl Pad {
    pub(crate) fn new(name: String, width: f64, height: f64) -> Self {
        Self {
            name,
            position: Position::default(),
            width,
            height,
            display: String::new(),
            base: String::new(),
            current: String::new(),
            cells: Vec::new(),
            cells_compile_order: Vec::new(),
            cells_show_order: Vec::new(),
            resort_compile: false,
            resort_show: false,
            mice: HashMap::new(),
        }
    }

    /// Display width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Display height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// The visible surface.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// The aggregating surface.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The surface new groups default to.
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Surfaces in creation order.
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Surfaces in compile order, as of the last sort.
    pub fn cells_compile_order(&self) -> &[String] {
        &self.cells_compile_order
    }

    /// Surfaces in show order, as of the last sort.
    pub fn cells_show_order(&self) -> &[String] {
        &self.cells_show_order
    }

    /// Last pointer position recorded under `index`.
    pub fn pointer(&self, index: &str) -> Option<Vec2> {
        self.mice.get(index).copied()
    }

    pub(crate) fn set_pointer(&mut self, index: &str, at: Vec2) {
        self.mice.insert(index.to_owned(), at);
    }

    /// What relative surface sizes resolve against: the display size with scale removed.
    pub(crate) fn frame(&self) -> (f64, f64) {
        let s = self.position.scale;
        let s = if s == 0.0 || !s.is_finite() { 1.0 } else { s };
        (self.width / s, self.height / s)
    }

    pub(crate) fn contains(&self, cell: &str) -> bool {
        self.cells.iter().any(|c| c == cell)
    }

    /// Reference role of a member surface.
    pub(crate) fn role_of(&self, cell: &str) -> ReferenceRole {
        if cell == self.display {
            ReferenceRole::DisplayOf(self.name.clone())
        } else if cell == self.base {
            ReferenceRole::BaseOf(self.name.clone())
        } else {
            ReferenceRole::WorkingSurfaceOf(self.name.clone())
        }
    }

    /// Append to every ordering and flag both for resort. Returns `false` if already present.
    pub(crate) fn add_cell(&mut self, cell: &str) -> bool {
        if self.contains(cell) {
            return false;
        }
        self.cells.push(cell.to_owned());
        self.cells_compile_order.push(cell.to_owned());
        self.cells_show_order.push(cell.to_owned());
        self.resort_compile = true;
        self.resort_show = true;
        true
    }

    /// Drop from every ordering, repointing display, base and current if they named it.
    ///
    /// Returns `false` if the surface was not a member.
    pub(crate) fn remove_cell(&mut self, cell: &str) -> bool {
        if !self.contains(cell) {
            return false;
        }
        self.cells.retain(|c| c != cell);
        self.cells_compile_order.retain(|c| c != cell);
        self.cells_show_order.retain(|c| c != cell);
        let first = self.cells.first().cloned().unwrap_or_default();
        if self.current == cell {
            self.current = if self.base != cell {
                self.base.clone()
            } else {
                first.clone()
            };
        }
        if self.display == cell {
            self.display = self.current.clone();
        }
        if self.base == cell {
            self.base = self.current.clone();
        }
        true
    }

    fn set_one(&mut self, key: &str, v: &Value, delta: bool, ripples: &mut Ripples) {
        match key {
            "width" | "height" => {
                let current = if key == "width" { self.width } else { self.height };
                let next = if delta { delta_num(current, v) } else { num(v) };
                let Some(n) = next.filter(|n| n.is_finite() && *n > 0.0) else {
                    return;
                };
                if key == "width" {
                    self.width = n;
                } else {
                    self.height = n;
                }
                self.position.invalidate_handle();
                push_ripple(ripples, Ripple::Dimensions);
            }
            "current" => {
                if let Some(c) = text(v)
                    && self.contains(c)
                {
                    self.current = c.to_owned();
                }
            }
            "scale" => {
                let applied = if delta {
                    self.position.delta_key(key, v, ripples)
                } else {
                    self.position.set_key(key, v, ripples)
                };
                if applied {
                    push_ripple(ripples, Ripple::Dimensions);
                }
            }
            _ => {
                if delta {
                    self.position.delta_key(key, v, ripples);
                } else {
                    self.position.set_key(key, v, ripples);
                }
            }
        }
    }
}

impl Attributes for Pad {
    fn get(&self, key: &str) -> Option<Value> {
        let v = match key {
            "name" => Value::String(self.name.clone()),
            "width" => serde_json::json!(self.width),
            "height" => serde_json::json!(self.height),
            "display" => Value::String(self.display.clone()),
            "base" => Value::String(self.base.clone()),
            "current" => Value::String(self.current.clone()),
            "cells" => serde_json::json!(self.cells),
            _ => return self.position.get_key(key),
        };
        Some(v)
    }

    fn set(&mut self, items: &AttrMap) -> Ripples {
        let mut ripples = Ripples::new();
        for (k, v) in items {
            self.set_one(k, v, false, &mut ripples);
        }
        ripples
    }

    fn set_delta(&mut self, items: &AttrMap) -> Ripples {
        let mut ripples = Ripples::new();
        for (k, v) in items {
            self.set_one(k, v, true, &mut ripples);
        }
        ripples
    }

    fn snapshot(&self) -> AttrMap {
        let mut out = AttrMap::new();
        self.position.snapshot_into(&mut out);
        out.insert("width".to_owned(), serde_json::json!(self.width));
        out.insert("height".to_owned(), serde_json::json!(self.height));
        out
    }
}

impl Nameable for Pad {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Positionable for Pad {
    fn position(&self) -> &Position {
        &self.position
    }

    fn position_mut(&mut self) -> &mut Position {
        &mut self.position
    }

    fn dimension_rule(&self) -> DimensionRule {
        DimensionRule::Pad
    }

    fn dimension_inputs(&self) -> DimensionInputs {
        DimensionInputs {
            local_width: self.width,
            local_height: self.height,
            scale: self.position.scale,
            ..DimensionInputs::default()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/pad.rs"]
mod tests;
