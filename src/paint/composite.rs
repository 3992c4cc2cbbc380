use crate::paint::state::CompositeOp;

/// Premultiplied RGBA in 0..1.
pub(crate) type PremulF32 = [f32; 4];

impl CompositeOp {
    /// Porter-Duff factors `(Fa, Fb)` for source alpha `sa` over destination alpha `da`.
    pub(crate) fn factors(self, sa: f32, da: f32) -> (f32, f32) {
        match self {
            Self::SourceOver => (1.0, 1.0 - sa),
            Self::SourceIn => (da, 0.0),
            Self::SourceOut => (1.0 - da, 0.0),
            Self::SourceAtop => (da, 1.0 - sa),
            Self::DestinationOver => (1.0 - da, 1.0),
            Self::DestinationIn => (0.0, sa),
            Self::DestinationOut => (0.0, 1.0 - sa),
            Self::DestinationAtop => (1.0 - da, sa),
            Self::Lighter => (1.0, 1.0),
            Self::Copy => (1.0, 0.0),
            Self::Xor => (1.0 - da, 1.0 - sa),
        }
    }

    /// Whether the mode alters destination pixels outside the source shape.
    pub(crate) fn is_unbounded(self) -> bool {
        matches!(
            self,
            Self::SourceIn | Self::SourceOut | Self::DestinationIn | Self::DestinationAtop | Self::Copy
        )
    }
}

pub(crate) fn unpack(px: &[u8]) -> PremulF32 {
    [
        f32::from(px[0]) / 255.0,
        f32::from(px[1]) / 255.0,
        f32::from(px[2]) / 255.0,
        f32::from(px[3]) / 255.0,
    ]
}

pub(crate) fn pack(c: PremulF32, out: &mut [u8]) {
    let a = c[3].clamp(0.0, 1.0);
    out[3] = (a * 255.0).round() as u8;
    for i in 0..3 {
        // Keep channels premultiplied-valid.
        out[i] = (c[i].clamp(0.0, a) * 255.0).round() as u8;
    }
}

/// Composite `src` onto `dst` with `op`, then blend the result into `dst` by `clip`.
pub(crate) fn composite(op: CompositeOp, src: PremulF32, dst: PremulF32, clip: f32) -> PremulF32 {
    let (fa, fb) = op.factors(src[3], dst[3]);
    let mut out = [0.0f32; 4];
    for i in 0..4 {
        let v = (src[i] * fa + dst[i] * fb).min(1.0);
        out[i] = dst[i] + (v - dst[i]) * clip;
    }
    out
}

/// Scale premultiplied color by a coverage/alpha factor.
pub(crate) fn scale(c: PremulF32, k: f32) -> PremulF32 {
    [c[0] * k, c[1] * k, c[2] * k, c[3] * k]
}

#[cfg(test)]
#[path = "../../tests/unit/paint/composite.rs"]
mod tests;
