use std::collections::HashMap;

use crate::foundation::core::{Affine, BezPath};
use crate::foundation::error::{ScrawlError, ScrawlResult};

/// Limits for retained scratch pixmaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScratchOpts {
    /// Maximum bytes retained across all sizes.
    pub max_pool_bytes: usize,
    /// Maximum pixmaps retained per size.
    pub max_per_size: usize,
}

impl Default for ScratchOpts {
    fn default() -> Self {
        Self {
            max_pool_bytes: 64 * 1024 * 1024,
            max_per_size: 4,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
/// Scratch pool counters.
pub struct ScratchStats {
    /// Pixmaps currently idle.
    pub retained: usize,
    /// Bytes currently idle.
    pub retained_bytes: usize,
    /// Pixmaps allocated because none of the size was idle.
    pub allocated: u64,
    /// Releases dropped by a cap.
    pub dropped_on_release: u64,
}

fn byte_len(w: u16, h: u16) -> usize {
    usize::from(w).saturating_mul(usize::from(h)).saturating_mul(4)
}

/// Bounded pixmap free-list keyed by size.
pub(crate) struct ScratchPool {
    opts: ScratchOpts,
    stats: ScratchStats,
    by_size: HashMap<(u16, u16), Vec<vello_cpu::Pixmap>>,
}

impl ScratchPool {
    pub(crate) fn new(opts: ScratchOpts) -> Self {
        Self {
            opts,
            stats: ScratchStats::default(),
            by_size: HashMap::new(),
        }
    }

    pub(crate) fn stats(&self) -> ScratchStats {
        self.stats.clone()
    }

    /// A transparent pixmap of the given size.
    pub(crate) fn borrow(&mut self, w: u16, h: u16) -> vello_cpu::Pixmap {
        if let Some(mut p) = self.by_size.get_mut(&(w, h)).and_then(Vec::pop) {
            self.stats.retained = self.stats.retained.saturating_sub(1);
            self.stats.retained_bytes = self.stats.retained_bytes.saturating_sub(byte_len(w, h));
            p.data_as_u8_slice_mut().fill(0);
            return p;
        }
        self.stats.allocated = self.stats.allocated.saturating_add(1);
        vello_cpu::Pixmap::new(w, h)
    }

    pub(crate) fn release(&mut self, w: u16, h: u16, pixmap: vello_cpu::Pixmap) {
        let bytes = byte_len(w, h);
        if self.opts.max_per_size == 0
            || self.stats.retained_bytes.saturating_add(bytes) > self.opts.max_pool_bytes
        {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }
        let bucket = self.by_size.entry((w, h)).or_default();
        if bucket.len() >= self.opts.max_per_size {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }
        bucket.push(pixmap);
        self.stats.retained = self.stats.retained.saturating_add(1);
        self.stats.retained_bytes = self.stats.retained_bytes.saturating_add(bytes);
    }
}

/// Path coverage rasterizer shared by CPU engines.
///
/// Holds one reusable render context plus the scratch pixmaps coverage is rendered into.
pub struct CpuRasterizer {
    ctx: Option<((u16, u16), vello_cpu::RenderContext)>,
    pool: ScratchPool,
}

impl Default for CpuRasterizer {
    fn default() -> Self {
        Self::new(ScratchOpts::default())
    }
}

impl CpuRasterizer {
    /// Empty rasterizer.
    pub fn new(opts: ScratchOpts) -> Self {
        Self {
            ctx: None,
            pool: ScratchPool::new(opts),
        }
    }

    /// Scratch pool counters.
    pub fn stats(&self) -> ScratchStats {
        self.pool.stats()
    }

    /// Nonzero-winding coverage of `path` under `transform`, one byte per pixel.
    pub fn coverage(
        &mut self,
        width: u32,
        height: u32,
        transform: Affine,
        path: &BezPath,
    ) -> ScrawlResult<Vec<u8>> {
        let (w, h) = surface_dims(width, height)?;
        let mut ctx = match self.ctx.take() {
            Some((dims, ctx)) if dims == (w, h) => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();
        ctx.set_transform(affine_to_cpu(transform));
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
        ctx.fill_path(&bezpath_to_cpu(path));
        ctx.flush();

        let mut pixmap = self.pool.borrow(w, h);
        ctx.render_to_pixmap(&mut pixmap);
        let mask: Vec<u8> = pixmap
            .data_as_u8_slice()
            .chunks_exact(4)
            .map(|px| px[3])
            .collect();
        self.pool.release(w, h, pixmap);
        self.ctx = Some(((w, h), ctx));
        Ok(mask)
    }
}

/// Pixmap dimensions, at least one pixel on each axis.
pub(crate) fn surface_dims(width: u32, height: u32) -> ScrawlResult<(u16, u16)> {
    let w: u16 = width
        .max(1)
        .try_into()
        .map_err(|_| ScrawlError::render("surface width exceeds u16"))?;
    let h: u16 = height
        .max(1)
        .try_into()
        .map_err(|_| ScrawlError::render("surface height exceeds u16"))?;
    Ok((w, h))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/paint/scratch.rs"]
mod tests;
