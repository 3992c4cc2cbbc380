use crate::foundation::math::finite_or_zero;

/// Reference frame used to resolve relative coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ReferenceDims {
    /// Reference width.
    pub w: f64,
    /// Reference height.
    pub h: f64,
    /// Keyword handles are measured from the shape's center rather than its corner.
    pub centered: bool,
}

impl ReferenceDims {
    /// Build a frame.
    pub fn new(w: f64, h: f64, centered: bool) -> Self {
        Self { w, h, centered }
    }
}

/// Which extraction rule yields an object's reference dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DimensionRule {
    /// Controllers: display size.
    Pad,
    /// Surfaces: actual bitmap size.
    Cell,
    /// Rectangles: local size with scale removed.
    Block,
    /// Circles: diameter, centered.
    Wheel,
    /// Paths: outline bounds, centered unless the path is an open line.
    Shape,
    /// No registered rule; resolves to the zero frame.
    Unregistered,
}

/// Raw measurements an object hands to [`reference_dimensions`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DimensionInputs {
    /// Declared or actual width.
    pub width: f64,
    /// Declared or actual height.
    pub height: f64,
    /// Width after local scaling.
    pub local_width: f64,
    /// Height after local scaling.
    pub local_height: f64,
    /// Object scale.
    pub scale: f64,
    /// Resolved radius.
    pub radius: f64,
    /// Open path flag.
    pub is_line: bool,
}

/// Apply `rule` to `inputs`. Non-finite results coerce to 0.
pub fn reference_dimensions(rule: DimensionRule, inputs: &DimensionInputs) -> ReferenceDims {
    let dims = match rule {
        DimensionRule::Pad => ReferenceDims::new(inputs.local_width, inputs.local_height, false),
        DimensionRule::Cell => ReferenceDims::new(inputs.width, inputs.height, false),
        DimensionRule::Block => ReferenceDims::new(
            inputs.local_width / inputs.scale,
            inputs.local_height / inputs.scale,
            false,
        ),
        DimensionRule::Wheel => {
            ReferenceDims::new(inputs.radius * 2.0, inputs.radius * 2.0, true)
        }
        DimensionRule::Shape => ReferenceDims::new(inputs.width, inputs.height, !inputs.is_line),
        DimensionRule::Unregistered => {
            tracing::warn!("no reference-dimension rule registered; using the zero frame");
            ReferenceDims::default()
        }
    };
    ReferenceDims {
        w: finite_or_zero(dims.w),
        h: finite_or_zero(dims.h),
        centered: dims.centered,
    }
}
