use crate::foundation::pool::Poolable;
use crate::paint::color::Color;
use crate::paint::engine::{Paint, PaintEngine, StateWrite};
use crate::paint::state::{CompositeOp, LineCap, LineJoin, PaintState, TextAlign, TextBaseline};

/// One tracker attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PaintKey {
    /// `fillStyle`.
    FillStyle,
    /// `strokeStyle`.
    StrokeStyle,
    /// `shadowColor`.
    ShadowColor,
    /// `globalAlpha`.
    GlobalAlpha,
    /// `globalCompositeOperation`.
    GlobalCompositeOperation,
    /// `lineWidth`.
    LineWidth,
    /// `lineCap`.
    LineCap,
    /// `lineJoin`.
    LineJoin,
    /// `lineDash`.
    LineDash,
    /// `lineDashOffset`.
    LineDashOffset,
    /// `miterLimit`.
    MiterLimit,
    /// `shadowOffsetX`.
    ShadowOffsetX,
    /// `shadowOffsetY`.
    ShadowOffsetY,
    /// `shadowBlur`.
    ShadowBlur,
    /// `font`.
    Font,
    /// `textAlign`.
    TextAlign,
    /// `textBaseline`.
    TextBaseline,
}

impl PaintKey {
    /// Attribute spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FillStyle => "fillStyle",
            Self::StrokeStyle => "strokeStyle",
            Self::ShadowColor => "shadowColor",
            Self::GlobalAlpha => "globalAlpha",
            Self::GlobalCompositeOperation => "globalCompositeOperation",
            Self::LineWidth => "lineWidth",
            Self::LineCap => "lineCap",
            Self::LineJoin => "lineJoin",
            Self::LineDash => "lineDash",
            Self::LineDashOffset => "lineDashOffset",
            Self::MiterLimit => "miterLimit",
            Self::ShadowOffsetX => "shadowOffsetX",
            Self::ShadowOffsetY => "shadowOffsetY",
            Self::ShadowBlur => "shadowBlur",
            Self::Font => "font",
            Self::TextAlign => "textAlign",
            Self::TextBaseline => "textBaseline",
        }
    }
}

/// A differing attribute and the value the drawable wants.
#[derive(Clone, Debug, PartialEq)]
pub enum PaintChange {
    /// Fill color or design name.
    FillStyle(String),
    /// Stroke color or design name.
    StrokeStyle(String),
    /// Shadow color.
    ShadowColor(String),
    /// Global alpha.
    GlobalAlpha(f64),
    /// Compositing mode.
    GlobalCompositeOperation(CompositeOp),
    /// Stroke width, already outline-scaled.
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

impl PaintChange {
    /// Which attribute this change writes.
    pub fn key(&self) -> PaintKey {
        match self {
            Self::FillStyle(_) => PaintKey::FillStyle,
            Self::StrokeStyle(_) => PaintKey::StrokeStyle,
            Self::ShadowColor(_) => PaintKey::ShadowColor,
            Self::GlobalAlpha(_) => PaintKey::GlobalAlpha,
            Self::GlobalCompositeOperation(_) => PaintKey::GlobalCompositeOperation,
            Self::LineWidth(_) => PaintKey::LineWidth,
            Self::LineCap(_) => PaintKey::LineCap,
            Self::LineJoin(_) => PaintKey::LineJoin,
            Self::LineDash(_) => PaintKey::LineDash,
            Self::LineDashOffset(_) => PaintKey::LineDashOffset,
            Self::MiterLimit(_) => PaintKey::MiterLimit,
            Self::ShadowOffsetX(_) => PaintKey::ShadowOffsetX,
            Self::ShadowOffsetY(_) => PaintKey::ShadowOffsetY,
            Self::ShadowBlur(_) => PaintKey::ShadowBlur,
            Self::Font(_) => PaintKey::Font,
            Self::TextAlign(_) => PaintKey::TextAlign,
            Self::TextBaseline(_) => PaintKey::TextBaseline,
        }
    }
}

/// Ordered change list produced by [`PaintState::get_changes`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<PaintChange>,
}

impl Poolable for ChangeSet {
    fn reset(&mut self) {
        self.changes.clear();
    }
}

impl ChangeSet {
    /// Number of changed attributes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Whether nothing differs.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Changes in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &PaintChange> {
        self.changes.iter()
    }

    /// Whether `key` is part of the set.
    pub fn contains(&self, key: PaintKey) -> bool {
        self.changes.iter().any(|c| c.key() == key)
    }

    /// The change for `key`, if any.
    pub fn get(&self, key: PaintKey) -> Option<&PaintChange> {
        self.changes.iter().find(|c| c.key() == key)
    }

    /// Attribute names in evaluation order.
    pub fn keys(&self) -> Vec<&'static str> {
        self.changes.iter().map(|c| c.key().as_str()).collect()
    }

    fn push(&mut self, change: PaintChange) {
        self.changes.push(change);
    }

    /// Empty the set.
    pub fn clear(&mut self) {
        self.changes.clear();
    }
}

/// What the diff needs to know about the drawable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawableInfo {
    /// Drawable scale.
    pub scale: f64,
    /// Whether stroke width follows scale.
    pub scale_outline: bool,
    /// Whether text attributes matter.
    pub is_text: bool,
}

impl Default for DrawableInfo {
    fn default() -> Self {
        Self {
            scale: 1.0,
            scale_outline: true,
            is_text: false,
        }
    }
}

/// Lookup of paint designs by style name, consulted while diffing.
pub trait DesignLookup {
    /// `true` when `name` is a design that must be re-applied even if the style name is
    /// unchanged: it auto-updates, or it is not locked to the surface.
    fn forces_update(&self, name: &str) -> bool;
}

impl DesignLookup for () {
    fn forces_update(&self, _name: &str) -> bool {
        false
    }
}

/// Resolution of style names into engine paint while applying.
pub trait StyleResolver {
    /// Paint for a design named `name`, refreshed against the current drawable and surface;
    /// `None` when `name` is not a design.
    fn resolve_design(&mut self, name: &str) -> Option<Paint>;
}

impl StyleResolver for () {
    fn resolve_design(&mut self, _name: &str) -> Option<Paint> {
        None
    }
}

fn dash_differs(a: &[f64], b: &[f64]) -> bool {
    if a.is_empty() && b.is_empty() {
        return false;
    }
    a.len() != b.len() || a.iter().zip(b).any(|(x, y)| x != y)
}

impl PaintState {
    /// Compute what `surface` must change to paint like `self`.
    ///
    /// Core attributes are always compared. Line attributes are compared only when either
    /// side has a non-zero line width. Style names that are forcing designs are reported even
    /// when equal. Text attributes are compared for text drawables only.
    pub fn get_changes(
        &self,
        drawable: &DrawableInfo,
        surface: &PaintState,
        designs: &dyn DesignLookup,
        out: &mut ChangeSet,
    ) {
        out.clear();

        if self.global_alpha != surface.global_alpha {
            out.push(PaintChange::GlobalAlpha(self.global_alpha));
        }
        if self.global_composite_operation != surface.global_composite_operation {
            out.push(PaintChange::GlobalCompositeOperation(
                self.global_composite_operation,
            ));
        }
        if self.shadow_offset_x != surface.shadow_offset_x {
            out.push(PaintChange::ShadowOffsetX(self.shadow_offset_x));
        }
        if self.shadow_offset_y != surface.shadow_offset_y {
            out.push(PaintChange::ShadowOffsetY(self.shadow_offset_y));
        }
        if self.shadow_blur != surface.shadow_blur {
            out.push(PaintChange::ShadowBlur(self.shadow_blur));
        }

        if self.line_width != 0.0 || surface.line_width != 0.0 {
            let width = if drawable.scale_outline {
                let w = if self.line_width == 0.0 { 1.0 } else { self.line_width };
                let s = if drawable.scale == 0.0 || drawable.scale.is_nan() {
                    1.0
                } else {
                    drawable.scale
                };
                w * s
            } else {
                self.line_width
            };
            if width != surface.line_width {
                out.push(PaintChange::LineWidth(width));
            }
            if self.line_cap != surface.line_cap {
                out.push(PaintChange::LineCap(self.line_cap));
            }
            if self.line_join != surface.line_join {
                out.push(PaintChange::LineJoin(self.line_join));
            }
            if dash_differs(&self.line_dash, &surface.line_dash) {
                out.push(PaintChange::LineDash(self.line_dash.clone()));
            }
            if self.line_dash_offset != surface.line_dash_offset {
                out.push(PaintChange::LineDashOffset(self.line_dash_offset));
            }
            if self.miter_limit != surface.miter_limit {
                out.push(PaintChange::MiterLimit(self.miter_limit));
            }
        }

        let styles = [
            (&self.fill_style, &surface.fill_style, PaintKey::FillStyle),
            (&self.stroke_style, &surface.stroke_style, PaintKey::StrokeStyle),
            (&self.shadow_color, &surface.shadow_color, PaintKey::ShadowColor),
        ];
        for (mine, theirs, key) in styles {
            if mine != theirs || designs.forces_update(mine) {
                let v = mine.clone();
                out.push(match key {
                    PaintKey::FillStyle => PaintChange::FillStyle(v),
                    PaintKey::StrokeStyle => PaintChange::StrokeStyle(v),
                    _ => PaintChange::ShadowColor(v),
                });
            }
        }

        if drawable.is_text {
            if self.font != surface.font {
                out.push(PaintChange::Font(self.font.clone()));
            }
            if self.text_align != surface.text_align {
                out.push(PaintChange::TextAlign(self.text_align));
            }
            if self.text_baseline != surface.text_baseline {
                out.push(PaintChange::TextBaseline(self.text_baseline));
            }
        }
    }

    /// Write `changes` onto `engine` and mirror them into `self`.
    ///
    /// Style names resolve through `styles` first and then as CSS colors; an unparsable
    /// color leaves the engine value in place. Dash patterns are skipped on engines without
    /// dash support so the mirror never claims a pattern the engine lacks.
    pub fn apply_changes(
        &mut self,
        changes: &ChangeSet,
        engine: &mut dyn PaintEngine,
        styles: &mut dyn StyleResolver,
    ) {
        for change in changes.iter() {
            match change {
                PaintChange::FillStyle(name) => {
                    if let Some(p) = style_paint(name, styles) {
                        engine.write(StateWrite::Fill(p));
                    }
                    self.fill_style.clone_from(name);
                }
                PaintChange::StrokeStyle(name) => {
                    if let Some(p) = style_paint(name, styles) {
                        engine.write(StateWrite::Stroke(p));
                    }
                    self.stroke_style.clone_from(name);
                }
                PaintChange::ShadowColor(name) => {
                    match Color::parse(name) {
                        Some(c) => engine.write(StateWrite::ShadowColor(c)),
                        None => tracing::warn!(color = %name, "unparsable shadow color"),
                    }
                    self.shadow_color.clone_from(name);
                }
                PaintChange::GlobalAlpha(a) => {
                    engine.write(StateWrite::GlobalAlpha(*a));
                    self.global_alpha = *a;
                }
                PaintChange::GlobalCompositeOperation(op) => {
                    engine.write(StateWrite::Composite(*op));
                    self.global_composite_operation = *op;
                }
                PaintChange::LineWidth(w) => {
                    engine.write(StateWrite::LineWidth(*w));
                    self.line_width = *w;
                }
                PaintChange::LineCap(c) => {
                    engine.write(StateWrite::LineCap(*c));
                    self.line_cap = *c;
                }
                PaintChange::LineJoin(j) => {
                    engine.write(StateWrite::LineJoin(*j));
                    self.line_join = *j;
                }
                PaintChange::LineDash(d) => {
                    if engine.supports_line_dash() {
                        engine.write(StateWrite::LineDash(d.clone()));
                        self.line_dash.clone_from(d);
                    }
                }
                PaintChange::LineDashOffset(o) => {
                    engine.write(StateWrite::LineDashOffset(*o));
                    self.line_dash_offset = *o;
                }
                PaintChange::MiterLimit(m) => {
                    engine.write(StateWrite::MiterLimit(*m));
                    self.miter_limit = *m;
                }
                PaintChange::ShadowOffsetX(o) => {
                    engine.write(StateWrite::ShadowOffsetX(*o));
                    self.shadow_offset_x = *o;
                }
                PaintChange::ShadowOffsetY(o) => {
                    engine.write(StateWrite::ShadowOffsetY(*o));
                    self.shadow_offset_y = *o;
                }
                PaintChange::ShadowBlur(b) => {
                    engine.write(StateWrite::ShadowBlur(*b));
                    self.shadow_blur = *b;
                }
                PaintChange::Font(f) => {
                    engine.write(StateWrite::Font(f.clone()));
                    self.font.clone_from(f);
                }
                PaintChange::TextAlign(a) => {
                    engine.write(StateWrite::TextAlign(*a));
                    self.text_align = *a;
                }
                PaintChange::TextBaseline(b) => {
                    engine.write(StateWrite::TextBaseline(*b));
                    self.text_baseline = *b;
                }
            }
        }
    }
}

fn style_paint(name: &str, styles: &mut dyn StyleResolver) -> Option<Paint> {
    if let Some(p) = styles.resolve_design(name) {
        return Some(p);
    }
    match Color::parse(name) {
        Some(c) => Some(Paint::Solid(c)),
        None => {
            tracing::warn!(style = %name, "unparsable style");
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paint/changes.rs"]
mod tests;
