use crate::attr::{AttrMap, Attributes, Ripples, Value, num, text};
use crate::paint::engine::EngineState;

macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $spelling:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $spelling)]
                $variant,
            )+
        }

        impl $name {
            /// Parse the canvas spelling.
            pub fn parse(s: &str) -> Option<Self> {
                match s.trim() {
                    $($spelling => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Canvas spelling.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $spelling,)+
                }
            }
        }
    };
}

keyword_enum! {
    /// Porter-Duff compositing mode.
    CompositeOp {
        /// Source over destination.
        SourceOver => "source-over",
        /// Source where destination exists, destination elsewhere.
        SourceAtop => "source-atop",
        /// Source where destination exists, transparent elsewhere.
        SourceIn => "source-in",
        /// Source where destination is absent.
        SourceOut => "source-out",
        /// Destination over source.
        DestinationOver => "destination-over",
        /// Destination where source exists, source elsewhere.
        DestinationAtop => "destination-atop",
        /// Destination where source exists.
        DestinationIn => "destination-in",
        /// Destination where source is absent.
        DestinationOut => "destination-out",
        /// Additive.
        Lighter => "lighter",
        /// Source replaces destination.
        Copy => "copy",
        /// Exclusive or.
        Xor => "xor",
    }
}

keyword_enum! {
    /// Stroke end cap.
    LineCap {
        /// Flat, flush with the end point.
        Butt => "butt",
        /// Semicircular.
        Round => "round",
        /// Square, extending half the line width.
        Square => "square",
    }
}

keyword_enum! {
    /// Stroke corner join.
    LineJoin {
        /// Sharp corner, limited by the miter limit.
        Miter => "miter",
        /// Rounded corner.
        Round => "round",
        /// Cut corner.
        Bevel => "bevel",
    }
}

keyword_enum! {
    /// Horizontal text alignment.
    TextAlign {
        /// Direction-dependent start.
        Start => "start",
        /// Direction-dependent end.
        End => "end",
        /// Left edge.
        Left => "left",
        /// Right edge.
        Right => "right",
        /// Centered.
        Center => "center",
    }
}

keyword_enum! {
    /// Text baseline.
    TextBaseline {
        /// Alphabetic baseline.
        Alphabetic => "alphabetic",
        /// Top of the em square.
        Top => "top",
        /// Hanging baseline.
        Hanging => "hanging",
        /// Middle of the em square.
        Middle => "middle",
        /// Ideographic baseline.
        Ideographic => "ideographic",
        /// Bottom of the em square.
        Bottom => "bottom",
    }
}

impl Default for CompositeOp {
    fn default() -> Self {
        Self::SourceOver
    }
}

/// One complete paint configuration.
///
/// An entity's tracker holds what it wants to paint with; a cell's tracker mirrors what its
/// engine currently has applied.
#[derive(Clone, Debug, PartialEq)]
pub struct PaintState {
    /// Fill color string or design name.
    pub fill_style: String,
    /// Stroke color string or design name.
    pub stroke_style: String,
    /// Global alpha in 0..1.
    pub global_alpha: f64,
    /// Compositing mode.
    pub global_composite_operation: CompositeOp,
    /// Stroke width.
    pub line_width: f64,
    /// Stroke end cap.
    pub line_cap: LineCap,
    /// Stroke corner join.
    pub line_join: LineJoin,
    /// Dash pattern; empty for solid lines.
    pub line_dash: Vec<f64>,
    /// Dash phase.
    pub line_dash_offset: f64,
    /// Miter limit.
    pub miter_limit: f64,
    /// Shadow x offset.
    pub shadow_offset_x: f64,
    /// Shadow y offset.
    pub shadow_offset_y: f64,
    /// Shadow blur.
    pub shadow_blur: f64,
    /// Shadow color string or design name.
    pub shadow_color: String,
    /// CSS font shorthand.
    pub font: String,
    /// Horizontal text alignment.
    pub text_align: TextAlign,
    /// Text baseline.
    pub text_baseline: TextBaseline,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            fill_style: "#000000".to_owned(),
            stroke_style: "#000000".to_owned(),
            global_alpha: 1.0,
            global_composite_operation: CompositeOp::SourceOver,
            line_width: 0.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            line_dash: Vec::new(),
            line_dash_offset: 0.0,
            miter_limit: 10.0,
            shadow_offset_x: 0.0,
            shadow_offset_y: 0.0,
            shadow_blur: 0.0,
            shadow_color: "rgba(0,0,0,0)".to_owned(),
            font: "10pt sans-serif".to_owned(),
            text_align: TextAlign::Start,
            text_baseline: TextBaseline::Alphabetic,
        }
    }
}

/// Attribute keys owned by a paint-state tracker.
pub const CONTEXT_KEYS: &[&str] = &[
    "fillStyle",
    "strokeStyle",
    "globalAlpha",
    "globalCompositeOperation",
    "lineWidth",
    "lineCap",
    "lineJoin",
    "lineDash",
    "lineDashOffset",
    "miterLimit",
    "shadowOffsetX",
    "shadowOffsetY",
    "shadowBlur",
    "shadowColor",
    "font",
    "textAlign",
    "textBaseline",
];

impl PaintState {
    /// Whether `key` belongs to the tracker.
    pub fn is_context_key(key: &str) -> bool {
        CONTEXT_KEYS.contains(&key)
    }

    /// Whether any shadow geometry is set.
    pub fn has_shadow(&self) -> bool {
        self.shadow_offset_x != 0.0 || self.shadow_offset_y != 0.0 || self.shadow_blur != 0.0
    }

    /// Re-mirror from an engine's live state.
    pub fn mirror_engine(&mut self, engine: &EngineState) {
        self.fill_style = engine.fill.css_label();
        self.stroke_style = engine.stroke.css_label();
        self.global_alpha = engine.global_alpha;
        self.global_composite_operation = engine.composite;
        self.line_width = engine.line_width;
        self.line_cap = engine.line_cap;
        self.line_join = engine.line_join;
        self.line_dash = engine.line_dash.clone();
        self.line_dash_offset = engine.line_dash_offset;
        self.miter_limit = engine.miter_limit;
        self.shadow_offset_x = engine.shadow_offset_x;
        self.shadow_offset_y = engine.shadow_offset_y;
        self.shadow_blur = engine.shadow_blur;
        self.shadow_color = engine.shadow_color.to_css();
        self.font = engine.font.clone();
        self.text_align = engine.text_align;
        self.text_baseline = engine.text_baseline;
    }

    /// Build a tracker mirroring `engine`.
    pub fn from_engine(engine: &EngineState) -> Self {
        let mut s = Self::default();
        s.mirror_engine(engine);
        s
    }

    pub(crate) fn set_one(&mut self, key: &str, v: &Value) {
        match key {
            "fillStyle" => {
                if let Some(s) = text(v) {
                    self.fill_style = s.to_owned();
                }
            }
            "strokeStyle" => {
                if let Some(s) = text(v) {
                    self.stroke_style = s.to_owned();
                }
            }
            "shadowColor" => {
                if let Some(s) = text(v) {
                    self.shadow_color = s.to_owned();
                }
            }
            "font" => {
                if let Some(s) = text(v) {
                    self.font = s.to_owned();
                }
            }
            "globalAlpha" => {
                if let Some(a) = num(v) {
                    self.global_alpha = a;
                }
            }
            "globalCompositeOperation" => {
                if let Some(op) = text(v).and_then(CompositeOp::parse) {
                    self.global_composite_operation = op;
                }
            }
            "lineWidth" => {
                if let Some(w) = num(v) {
                    self.line_width = w;
                }
            }
            "lineCap" => {
                if let Some(c) = text(v).and_then(LineCap::parse) {
                    self.line_cap = c;
                }
            }
            "lineJoin" => {
                if let Some(j) = text(v).and_then(LineJoin::parse) {
                    self.line_join = j;
                }
            }
            "lineDash" => {
                if let Some(arr) = v.as_array() {
                    self.line_dash = arr.iter().filter_map(num).collect();
                }
            }
            "lineDashOffset" => {
                if let Some(o) = num(v) {
                    self.line_dash_offset = o;
                }
            }
            "miterLimit" => {
                if let Some(m) = num(v) {
                    self.miter_limit = m;
                }
            }
            "shadowOffsetX" => {
                if let Some(o) = num(v) {
                    self.shadow_offset_x = o;
                }
            }
            "shadowOffsetY" => {
                if let Some(o) = num(v) {
                    self.shadow_offset_y = o;
                }
            }
            "shadowBlur" => {
                if let Some(b) = num(v) {
                    self.shadow_blur = b;
                }
            }
            "textAlign" => {
                if let Some(a) = text(v).and_then(TextAlign::parse) {
                    self.text_align = a;
                }
            }
            "textBaseline" => {
                if let Some(b) = text(v).and_then(TextBaseline::parse) {
                    self.text_baseline = b;
                }
            }
            _ => {}
        }
    }

    pub(crate) fn delta_one(&mut self, key: &str, v: &Value) {
        let Some(d) = num(v) else {
            // Non-numeric deltas assign.
            self.set_one(key, v);
            return;
        };
        match key {
            "lineWidth" => self.line_width = (self.line_width + d).max(0.0),
            "globalAlpha" => {
                let a = self.global_alpha + d;
                self.global_alpha = if (0.0..=1.0).contains(&a) {
                    a
                } else if a > 0.5 {
                    1.0
                } else {
                    0.0
                };
            }
            "lineDashOffset" => self.line_dash_offset += d,
            "miterLimit" => self.miter_limit += d,
            "shadowOffsetX" => self.shadow_offset_x += d,
            "shadowOffsetY" => self.shadow_offset_y += d,
            "shadowBlur" => self.shadow_blur += d,
            _ => self.set_one(key, v),
        }
    }
}

impl Attributes for PaintState {
    fn get(&self, key: &str) -> Option<Value> {
        let v = match key {
            "fillStyle" => Value::String(self.fill_style.clone()),
            "strokeStyle" => Value::String(self.stroke_style.clone()),
            "globalAlpha" => serde_json::json!(self.global_alpha),
            "globalCompositeOperation" => {
                Value::String(self.global_composite_operation.as_str().to_owned())
            }
            "lineWidth" => serde_json::json!(self.line_width),
            "lineCap" => Value::String(self.line_cap.as_str().to_owned()),
            "lineJoin" => Value::String(self.line_join.as_str().to_owned()),
            "lineDash" => serde_json::json!(self.line_dash),
            "lineDashOffset" => serde_json::json!(self.line_dash_offset),
            "miterLimit" => serde_json::json!(self.miter_limit),
            "shadowOffsetX" => serde_json::json!(self.shadow_offset_x),
            "shadowOffsetY" => serde_json::json!(self.shadow_offset_y),
            "shadowBlur" => serde_json::json!(self.shadow_blur),
            "shadowColor" => Value::String(self.shadow_color.clone()),
            "font" => Value::String(self.font.clone()),
            "textAlign" => Value::String(self.text_align.as_str().to_owned()),
            "textBaseline" => Value::String(self.text_baseline.as_str().to_owned()),
            _ => return None,
        };
        Some(v)
    }

    fn set(&mut self, items: &AttrMap) -> Ripples {
        for (k, v) in items {
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
        for key in CONTEXT_KEYS {
            if let Some(v) = self.get(key) {
                out.insert((*key).to_owned(), v);
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paint/state.rs"]
mod tests;
