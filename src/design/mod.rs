//! Gradient paint designs referenced by name from style attributes.

use crate::attr::{
    AttrMap, Attributes, Ripples, Value, boolean, delta_length, length, num, text,
};
use crate::foundation::core::{Length, Point, Vec2};
use crate::paint::color::Color;
use crate::paint::engine::{Gradient, GradientShape, GradientSpace, GradientStop, Paint};

/// Gradient geometry family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesignKind {
    /// Linear gradient.
    Linear,
    /// Two-circle radial gradient.
    Radial,
}

/// Coordinate frame a design's geometry is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockTo {
    /// Surface pixels; percentages against the cell's actual size.
    Cell,
    /// The drawing entity's box; percentages against its scaled size.
    Entity,
}

impl LockTo {
    fn parse(v: &Value) -> Option<Self> {
        match v {
            Value::String(s) if s == "cell" => Some(Self::Cell),
            Value::String(s) if s == "entity" => Some(Self::Entity),
            Value::Bool(true) => Some(Self::Entity),
            Value::Bool(false) => Some(Self::Cell),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Cell => "cell",
            Self::Entity => "entity",
        }
    }
}

/// One color stop as declared.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColorStop {
    /// CSS color.
    pub color: String,
    /// Position along the gradient.
    pub stop: f64,
}

/// Geometry the design resolves against for one stamp.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DesignFrame {
    /// Target cell actual width.
    pub cell_width: f64,
    /// Target cell actual height.
    pub cell_height: f64,
    /// Entity current handle (already negated and scaled).
    pub handle: Vec2,
    /// Offset from the handle to the entity box's top-left corner, for centered entities.
    pub box_offset: Vec2,
    /// Entity scaled width.
    pub local_width: f64,
    /// Entity scaled height.
    pub local_height: f64,
}

/// A named gradient.
#[derive(Clone, Debug, PartialEq)]
pub struct Design {
    pub(crate) name: String,
    pub(crate) kind: DesignKind,
    pub(crate) color: Vec<ColorStop>,
    pub(crate) lock_to: LockTo,
    pub(crate) auto_update: bool,
    pub(crate) cell: String,
    pub(crate) start_x: Length,
    pub(crate) start_y: Length,
    pub(crate) end_x: Length,
    pub(crate) end_y: Length,
    pub(crate) start_radius: Length,
    pub(crate) end_radius: Length,
}

impl Design {
    /// A design with default geometry: black to white across the frame's width.
    pub fn new(name: impl Into<String>, kind: DesignKind) -> Self {
        Self {
            name: name.into(),
            kind,
            color: vec![
                ColorStop {
                    color: "black".to_owned(),
                    stop: 0.0,
                },
                ColorStop {
                    color: "white".to_owned(),
                    stop: 0.999999,
                },
            ],
            lock_to: LockTo::Cell,
            auto_update: false,
            cell: String::new(),
            start_x: Length::ZERO,
            start_y: Length::ZERO,
            end_x: Length::Percent(100.0),
            end_y: Length::ZERO,
            start_radius: Length::ZERO,
            end_radius: Length::ZERO,
        }
    }

    /// Registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Geometry family.
    pub fn kind(&self) -> DesignKind {
        self.kind
    }

    /// Coordinate lock.
    pub fn lock_to(&self) -> LockTo {
        self.lock_to
    }

    /// Whether the design re-resolves on every stamp.
    pub fn auto_update(&self) -> bool {
        self.auto_update
    }

    /// Default cell name.
    pub fn cell(&self) -> &str {
        &self.cell
    }

    /// Whether a style using this design must be re-applied even when unchanged.
    pub fn forces_update(&self) -> bool {
        self.auto_update || self.lock_to != LockTo::Cell
    }

    fn stops(&self) -> Vec<GradientStop> {
        let mut stops: Vec<GradientStop> = self
            .color
            .iter()
            .filter_map(|s| match Color::parse(&s.color) {
                Some(color) => Some(GradientStop {
                    offset: if s.stop.is_finite() {
                        s.stop.clamp(0.0, 1.0)
                    } else {
                        0.0
                    },
                    color,
                }),
                None => {
                    tracing::warn!(design = %self.name, color = %s.color, "unparsable color stop");
                    None
                }
            })
            .collect();
        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        stops
    }

    /// Build the engine paint for `frame`.
    pub fn resolve(&self, frame: &DesignFrame) -> Paint {
        let (origin, w, h, space) = match self.lock_to {
            LockTo::Cell => (
                Vec2::ZERO,
                frame.cell_width,
                frame.cell_height,
                GradientSpace::Device,
            ),
            LockTo::Entity => (
                frame.handle - frame.box_offset,
                frame.local_width,
                frame.local_height,
                GradientSpace::User,
            ),
        };
        let start = Point::new(
            origin.x + self.start_x.resolve(w),
            origin.y + self.start_y.resolve(h),
        );
        let end = Point::new(
            origin.x + self.end_x.resolve(w),
            origin.y + self.end_y.resolve(h),
        );
        let shape = match self.kind {
            DesignKind::Linear => GradientShape::Linear { start, end },
            DesignKind::Radial => GradientShape::Radial {
                start,
                start_radius: self.start_radius.resolve(w),
                end,
                end_radius: self.end_radius.resolve(w),
            },
        };
        Paint::Gradient(Gradient {
            shape,
            stops: self.stops(),
            space,
        })
    }

    fn set_one(&mut self, key: &str, v: &Value) -> bool {
        match key {
            "color" => match serde_json::from_value::<Vec<ColorStop>>(v.clone()) {
                Ok(stops) => self.color = stops,
                Err(e) => tracing::warn!(design = %self.name, error = %e, "ignored color stops"),
            },
            "lockTo" => {
                if let Some(l) = LockTo::parse(v) {
                    self.lock_to = l;
                }
            }
            "autoUpdate" => {
                if let Some(b) = boolean(v) {
                    self.auto_update = b;
                }
            }
            "cell" => {
                if let Some(s) = text(v) {
                    self.cell = s.to_owned();
                }
            }
            "startX" => assign(&mut self.start_x, v),
            "startY" => assign(&mut self.start_y, v),
            "endX" => assign(&mut self.end_x, v),
            "endY" => assign(&mut self.end_y, v),
            "startRadius" => assign(&mut self.start_radius, v),
            "endRadius" => assign(&mut self.end_radius, v),
            "start" | "end" => {
                let Some(obj) = v.as_object() else {
                    return false;
                };
                let (x, y, r) = if key == "start" {
                    ("startX", "startY", "startRadius")
                } else {
                    ("endX", "endY", "endRadius")
                };
                for (part, flat) in [("x", x), ("y", y), ("r", r)] {
                    if let Some(pv) = obj.get(part) {
                        self.set_one(flat, pv);
                    }
                }
            }
            _ => return false,
        }
        true
    }

    fn delta_one(&mut self, key: &str, v: &Value) {
        let slot = match key {
            "startX" => &mut self.start_x,
            "startY" => &mut self.start_y,
            "endX" => &mut self.end_x,
            "endY" => &mut self.end_y,
            "startRadius" => &mut self.start_radius,
            "endRadius" => &mut self.end_radius,
            _ => {
                self.set_one(key, v);
                return;
            }
        };
        if let Some(l) = delta_length(*slot, v) {
            *slot = l;
        }
    }
}

fn assign(slot: &mut Length, v: &Value) {
    if let Some(l) = length(v) {
        *slot = l;
    } else if let Some(n) = num(v) {
        *slot = Length::Pixels(n);
    }
}

impl Attributes for Design {
    fn get(&self, key: &str) -> Option<Value> {
        let v = match key {
            "name" => Value::String(self.name.clone()),
            "type" => Value::String(
                match self.kind {
                    DesignKind::Linear => "Gradient",
                    DesignKind::Radial => "RadialGradient",
                }
                .to_owned(),
            ),
            "color" => serde_json::to_value(&self.color).unwrap_or(Value::Null),
            "lockTo" => Value::String(self.lock_to.as_str().to_owned()),
            "autoUpdate" => Value::Bool(self.auto_update),
            "cell" => Value::String(self.cell.clone()),
            "startX" => self.start_x.to_value(),
            "startY" => self.start_y.to_value(),
            "endX" => self.end_x.to_value(),
            "endY" => self.end_y.to_value(),
            "startRadius" if self.kind == DesignKind::Radial => self.start_radius.to_value(),
            "endRadius" if self.kind == DesignKind::Radial => self.end_radius.to_value(),
            _ => return None,
        };
        Some(v)
    }

    fn set(&mut self, items: &AttrMap) -> Ripples {
        for (k, v) in items {
            if matches!(k.as_str(), "startRadius" | "endRadius") && self.kind != DesignKind::Radial
            {
                continue;
            }
            self.set_one(k, v);
        }
        Ripples::new()
    }

    fn set_delta(&mut self, items: &AttrMap) -> Ripples {
        for (k, v) in items {
            self.delta_one(k, v);
        }
        Ripples::new()
    }

    fn snapshot(&self) -> AttrMap {
        let mut out = AttrMap::new();
        for key in [
            "name",
            "color",
            "lockTo",
            "autoUpdate",
            "cell",
            "startX",
            "startY",
            "endX",
            "endY",
            "startRadius",
            "endRadius",
        ] {
            if let Some(v) = self.get(key) {
                out.insert(key.to_owned(), v);
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/design/design.rs"]
mod tests;
