use crate::foundation::core::{Affine, BezPath, ImageData, Point, Rect};
use crate::foundation::error::ScrawlResult;
use crate::paint::color::Color;
use crate::paint::state::{CompositeOp, LineCap, LineJoin, TextAlign, TextBaseline};
use kurbo::Shape;

/// Color stop of a gradient paint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient, 0..1.
    pub offset: f64,
    /// Stop color.
    pub color: Color,
}

/// Coordinate space gradient geometry is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GradientSpace {
    /// The drawing transform in effect at paint time applies.
    User,
    /// Surface pixels; the drawing transform is ignored.
    Device,
}

/// Resolved gradient geometry.
#[derive(Clone, Debug, PartialEq)]
pub enum GradientShape {
    /// Linear from `start` to `end`.
    Linear {
        /// Offset 0 point.
        start: Point,
        /// Offset 1 point.
        end: Point,
    },
    /// Two-circle radial.
    Radial {
        /// Start circle center.
        start: Point,
        /// Start circle radius.
        start_radius: f64,
        /// End circle center.
        end: Point,
        /// End circle radius.
        end_radius: f64,
    },
}

/// A gradient ready to paint.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    /// Geometry.
    pub shape: GradientShape,
    /// Stops sorted by offset.
    pub stops: Vec<GradientStop>,
    /// Geometry space.
    pub space: GradientSpace,
}

impl Gradient {
    /// Gradient parameter at a point, clamped to 0..1.
    pub fn offset_at(&self, p: Point) -> f64 {
        let t = match &self.shape {
            GradientShape::Linear { start, end } => {
                let d = *end - *start;
                let len2 = d.hypot2();
                if len2 <= f64::EPSILON {
                    0.0
                } else {
                    (p - *start).dot(d) / len2
                }
            }
            GradientShape::Radial {
                start,
                start_radius,
                end,
                end_radius,
            } => {
                // Concentric approximation; exact for the common shared-center case.
                let center = start.lerp(*end, 0.5);
                let span = end_radius - start_radius;
                if span.abs() <= f64::EPSILON {
                    0.0
                } else {
                    ((p - center).hypot() - start_radius) / span
                }
            }
        };
        if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 }
    }

    /// Interpolated premultiplied color at `t`.
    pub fn premul_at(&self, t: f64) -> [f32; 4] {
        let Some(first) = self.stops.first() else {
            return [0.0; 4];
        };
        if t <= first.offset {
            return first.color.premul_f32();
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.offset {
                let span = b.offset - a.offset;
                let f = if span <= f64::EPSILON {
                    1.0
                } else {
                    ((t - a.offset) / span) as f32
                };
                let (ca, cb) = (a.color.premul_f32(), b.color.premul_f32());
                return std::array::from_fn(|i| ca[i] + (cb[i] - ca[i]) * f);
            }
        }
        self.stops
            .last()
            .map(|s| s.color.premul_f32())
            .unwrap_or([0.0; 4])
    }
}

/// What fills and strokes paint with.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    /// Flat color.
    Solid(Color),
    /// Gradient.
    Gradient(Gradient),
}

impl Default for Paint {
    fn default() -> Self {
        Self::Solid(Color::BLACK)
    }
}

impl Paint {
    /// CSS label as a canvas reports it; gradients report as opaque black.
    pub fn css_label(&self) -> String {
        match self {
            Self::Solid(c) => c.to_css(),
            Self::Gradient(_) => Color::BLACK.to_css(),
        }
    }
}

/// The full live state of an engine, canvas defaults on creation and after every resize.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineState {
    /// Fill paint.
    pub fill: Paint,
    /// Stroke paint.
    pub stroke: Paint,
    /// Global alpha.
    pub global_alpha: f64,
    /// Compositing mode.
    pub composite: CompositeOp,
    /// Stroke width.
    pub line_width: f64,
    /// Stroke end cap.
    pub line_cap: LineCap,
    /// Stroke corner join.
    pub line_join: LineJoin,
    /// Dash pattern.
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
    /// Shadow color.
    pub shadow_color: Color,
    /// Font shorthand.
    pub font: String,
    /// Text alignment.
    pub text_align: TextAlign,
    /// Text baseline.
    pub text_baseline: TextBaseline,
    /// Current drawing transform.
    pub transform: Affine,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            fill: Paint::default(),
            stroke: Paint::default(),
            global_alpha: 1.0,
            composite: CompositeOp::SourceOver,
            line_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            line_dash: Vec::new(),
            line_dash_offset: 0.0,
            miter_limit: 10.0,
            shadow_offset_x: 0.0,
            shadow_offset_y: 0.0,
            shadow_blur: 0.0,
            shadow_color: Color::TRANSPARENT,
            font: "10px sans-serif".to_owned(),
            text_align: TextAlign::Start,
            text_baseline: TextBaseline::Alphabetic,
            transform: Affine::IDENTITY,
        }
    }
}

/// One paint-state write.
#[derive(Clone, Debug, PartialEq)]
pub enum StateWrite {
    /// Fill paint.
    Fill(Paint),
    /// Stroke paint.
    Stroke(Paint),
    /// Shadow color.
    ShadowColor(Color),
    /// Global alpha.
    GlobalAlpha(f64),
    /// Compositing mode.
    Composite(CompositeOp),
    /// Stroke width.
    LineWidth(f64),
    /// Stroke end cap.
    LineCap(LineCap),
    /// Stroke corner join.
    LineJoin(LineJoin),
    /// Dash pattern.
    LineDash(Vec<f64>),
    /// Dash phase.
    LineDashOffset(f64),
    /// Miter limit.
    MiterLimit(f64),
    /// Shadow x offset.
    ShadowOffsetX(f64),
    /// Shadow y offset.
    ShadowOffsetY(f64),
    /// Shadow blur.
    ShadowBlur(f64),
    /// Font shorthand.
    Font(String),
    /// Text alignment.
    TextAlign(TextAlign),
    /// Text baseline.
    TextBaseline(TextBaseline),
}

impl EngineState {
    /// Apply one write.
    pub fn apply(&mut self, write: StateWrite) {
        match write {
            StateWrite::Fill(p) => self.fill = p,
            StateWrite::Stroke(p) => self.stroke = p,
            StateWrite::ShadowColor(c) => self.shadow_color = c,
            StateWrite::GlobalAlpha(a) => self.global_alpha = a,
            StateWrite::Composite(op) => self.composite = op,
            StateWrite::LineWidth(w) => self.line_width = w,
            StateWrite::LineCap(c) => self.line_cap = c,
            StateWrite::LineJoin(j) => self.line_join = j,
            StateWrite::LineDash(d) => self.line_dash = d,
            StateWrite::LineDashOffset(o) => self.line_dash_offset = o,
            StateWrite::MiterLimit(m) => self.miter_limit = m,
            StateWrite::ShadowOffsetX(o) => self.shadow_offset_x = o,
            StateWrite::ShadowOffsetY(o) => self.shadow_offset_y = o,
            StateWrite::ShadowBlur(b) => self.shadow_blur = b,
            StateWrite::Font(f) => self.font = f,
            StateWrite::TextAlign(a) => self.text_align = a,
            StateWrite::TextBaseline(b) => self.text_baseline = b,
        }
    }
}

/// Borrowed view of an engine's pixels, premultiplied RGBA8.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceImage<'a> {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major bytes.
    pub data: &'a [u8],
}

impl SurfaceImage<'_> {
    /// Pixel at `(x, y)`; transparent out of bounds.
    pub fn pixel(&self, x: i64, y: i64) -> [u8; 4] {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return [0; 4];
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        match self.data.get(idx..idx + 4) {
            Some(px) => [px[0], px[1], px[2], px[3]],
            None => [0; 4],
        }
    }
}

/// A stateful 2D paint surface.
///
/// The scene only ever reaches pixels through this trait: it writes paint state, sets the
/// transform, issues geometry and copies regions between engines.
pub trait PaintEngine {
    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Reallocate the bitmap. Pixels clear and all state returns to canvas defaults.
    fn resize(&mut self, width: u32, height: u32) -> ScrawlResult<()>;

    /// Live state.
    fn state(&self) -> &EngineState;

    /// Apply one paint-state write.
    fn write(&mut self, write: StateWrite);

    /// Whether dash patterns are honored.
    fn supports_line_dash(&self) -> bool {
        true
    }

    /// Replace the drawing transform.
    fn set_transform(&mut self, transform: Affine);

    /// Fill `path` with the fill paint.
    fn fill_path(&mut self, path: &BezPath);

    /// Stroke `path` with the stroke paint and line attributes.
    fn stroke_path(&mut self, path: &BezPath);

    /// Fill a rectangle.
    fn fill_rect(&mut self, rect: Rect) {
        self.fill_path(&rect.to_path(0.1));
    }

    /// Stroke a rectangle.
    fn stroke_rect(&mut self, rect: Rect) {
        self.stroke_path(&rect.to_path(0.1));
    }

    /// Make a (transformed, clipped) rectangle transparent.
    fn clear_rect(&mut self, rect: Rect);

    /// Intersect the clip region with `path`.
    fn clip(&mut self, path: &BezPath);

    /// Drop the clip region.
    fn reset_clip(&mut self);

    /// Copy `copy` (source pixels) into `paste` (user space) under the current transform,
    /// alpha and compositing mode.
    fn draw_image(&mut self, src: &SurfaceImage<'_>, copy: Rect, paste: Rect);

    /// Borrow the pixels.
    fn image(&self) -> SurfaceImage<'_>;

    /// Copy a pixel region; out-of-bounds pixels read as transparent.
    fn get_image_data(&self, x: i64, y: i64, width: u32, height: u32) -> ImageData {
        let img = self.image();
        let mut data = Vec::with_capacity((width as usize) * (height as usize) * 4);
        for row in 0..i64::from(height) {
            for col in 0..i64::from(width) {
                data.extend_from_slice(&img.pixel(x + col, y + row));
            }
        }
        ImageData {
            name: String::new(),
            width,
            height,
            data,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paint/engine.rs"]
mod tests;
