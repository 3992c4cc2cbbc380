use std::cell::RefCell;
use std::rc::Rc;

use kurbo::Shape;

use crate::foundation::core::{Affine, BezPath, Point, Rect};
use crate::foundation::error::ScrawlResult;
use crate::paint::blur::{blur_alpha_mask, shift_mask};
use crate::paint::composite::{PremulF32, composite, pack, scale, unpack};
use crate::paint::engine::{
    EngineState, GradientSpace, Paint, PaintEngine, StateWrite, SurfaceImage,
};
use crate::paint::scratch::{CpuRasterizer, surface_dims};
use crate::paint::state::{LineCap, LineJoin};

const STROKE_TOLERANCE: f64 = 0.1;

/// Software paint engine over a premultiplied RGBA8 buffer.
///
/// Path coverage comes from `vello_cpu`; shading, compositing, clipping and shadows run on
/// the buffer directly so every canvas compositing mode is available.
pub struct CpuEngine {
    width: u32,
    height: u32,
    data: Vec<u8>,
    state: EngineState,
    clip: Option<Vec<u8>>,
    raster: Rc<RefCell<CpuRasterizer>>,
}

impl std::fmt::Debug for CpuEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuEngine")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("clipped", &self.clip.is_some())
            .finish_non_exhaustive()
    }
}

impl CpuEngine {
    /// Engine with its own rasterizer.
    pub fn new(width: u32, height: u32) -> ScrawlResult<Self> {
        Self::with_rasterizer(width, height, Rc::new(RefCell::new(CpuRasterizer::default())))
    }

    /// Engine sharing `raster` with other engines.
    pub fn with_rasterizer(
        width: u32,
        height: u32,
        raster: Rc<RefCell<CpuRasterizer>>,
    ) -> ScrawlResult<Self> {
        let (w, h) = surface_dims(width, height)?;
        let (w, h) = (u32::from(w), u32::from(h));
        Ok(Self {
            width: w,
            height: h,
            data: vec![0; (w as usize) * (h as usize) * 4],
            state: EngineState::default(),
            clip: None,
            raster,
        })
    }

    fn coverage(&self, path: &BezPath) -> Option<Vec<u8>> {
        let result = self.raster.borrow_mut().coverage(
            self.width,
            self.height,
            self.state.transform,
            path,
        );
        match result {
            Ok(mask) => Some(mask),
            Err(e) => {
                tracing::warn!(error = %e, "coverage rasterization failed");
                None
            }
        }
    }

    fn stroke_outline(&self, path: &BezPath) -> BezPath {
        let s = &self.state;
        let cap = match s.line_cap {
            LineCap::Butt => kurbo::Cap::Butt,
            LineCap::Round => kurbo::Cap::Round,
            LineCap::Square => kurbo::Cap::Square,
        };
        let join = match s.line_join {
            LineJoin::Miter => kurbo::Join::Miter,
            LineJoin::Round => kurbo::Join::Round,
            LineJoin::Bevel => kurbo::Join::Bevel,
        };
        let mut style = kurbo::Stroke::new(s.line_width)
            .with_caps(cap)
            .with_join(join)
            .with_miter_limit(s.miter_limit);
        // An odd-length pattern repeats to even length; a pattern of zeros is solid.
        if !s.line_dash.is_empty() && s.line_dash.iter().any(|d| *d > 0.0) {
            let mut dashes = s.line_dash.clone();
            if dashes.len() % 2 == 1 {
                dashes.extend_from_within(..);
            }
            style = style.with_dashes(s.line_dash_offset, dashes);
        }
        kurbo::stroke(
            path.iter(),
            &style,
            &kurbo::StrokeOpts::default(),
            STROKE_TOLERANCE,
        )
    }

    fn paint_mask(&mut self, mask: &[u8], paint: &Paint) {
        let shadow = self.state.shadow_color;
        let has_geometry = self.state.shadow_offset_x != 0.0
            || self.state.shadow_offset_y != 0.0
            || self.state.shadow_blur > 0.0;
        if !shadow.is_transparent()
            && has_geometry
            && let Some(shadow_mask) = self.shadow_mask(mask)
        {
            let color = shadow.premul_f32();
            self.composite_mask(&shadow_mask, |_, _| color);
        }

        match paint {
            Paint::Solid(c) => {
                let color = c.premul_f32();
                self.composite_mask(mask, |_, _| color);
            }
            Paint::Gradient(g) => {
                let to_paint = match g.space {
                    GradientSpace::Device => Affine::IDENTITY,
                    GradientSpace::User => self.state.transform.inverse(),
                };
                let g = g.clone();
                self.composite_mask(mask, move |x, y| {
                    let p = to_paint * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                    g.premul_at(g.offset_at(p))
                });
            }
        }
    }

    fn shadow_mask(&self, mask: &[u8]) -> Option<Vec<u8>> {
        let dx = self.state.shadow_offset_x.round() as i64;
        let dy = self.state.shadow_offset_y.round() as i64;
        let shifted = shift_mask(mask, self.width, self.height, dx, dy);
        let sigma = (self.state.shadow_blur / 2.0) as f32;
        if sigma <= 0.0 {
            return Some(shifted);
        }
        match blur_alpha_mask(&shifted, self.width, self.height, sigma) {
            Ok(m) => Some(m),
            Err(e) => {
                tracing::warn!(error = %e, "shadow blur failed");
                None
            }
        }
    }

    fn composite_mask(&mut self, mask: &[u8], shade: impl Fn(u32, u32) -> PremulF32) {
        let op = self.state.composite;
        let alpha = self.state.global_alpha.clamp(0.0, 1.0) as f32;
        let unbounded = op.is_unbounded();
        let w = self.width as usize;
        for (i, m) in mask.iter().enumerate() {
            if *m == 0 && !unbounded {
                continue;
            }
            let clip = match &self.clip {
                Some(c) => f32::from(c[i]) / 255.0,
                None => 1.0,
            };
            if clip <= 0.0 {
                continue;
            }
            let cov = f32::from(*m) / 255.0 * alpha;
            let src = if cov > 0.0 {
                scale(shade((i % w) as u32, (i / w) as u32), cov)
            } else {
                [0.0; 4]
            };
            let px = &mut self.data[i * 4..i * 4 + 4];
            let out = composite(op, src, unpack(px), clip);
            pack(out, px);
        }
    }

    fn is_axis_aligned_identity(&self) -> bool {
        self.state.transform == Affine::IDENTITY && self.clip.is_none()
    }
}

impl PaintEngine for CpuEngine {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) -> ScrawlResult<()> {
        let (w, h) = surface_dims(width, height)?;
        self.width = u32::from(w);
        self.height = u32::from(h);
        self.data = vec![0; (self.width as usize) * (self.height as usize) * 4];
        self.state = EngineState::default();
        self.clip = None;
        Ok(())
    }

    fn state(&self) -> &EngineState {
        &self.state
    }

    fn write(&mut self, write: StateWrite) {
        self.state.apply(write);
    }

    fn set_transform(&mut self, transform: Affine) {
        self.state.transform = transform;
    }

    fn fill_path(&mut self, path: &BezPath) {
        if let Some(mask) = self.coverage(path) {
            let paint = self.state.fill.clone();
            self.paint_mask(&mask, &paint);
        }
    }

    fn stroke_path(&mut self, path: &BezPath) {
        if self.state.line_width.is_nan() || self.state.line_width <= 0.0 {
            return;
        }
        let outline = self.stroke_outline(path);
        if let Some(mask) = self.coverage(&outline) {
            let paint = self.state.stroke.clone();
            self.paint_mask(&mask, &paint);
        }
    }

    fn clear_rect(&mut self, rect: Rect) {
        if self.is_axis_aligned_identity() {
            let r = rect.abs();
            let x0 = r.x0.round().clamp(0.0, f64::from(self.width)) as usize;
            let x1 = r.x1.round().clamp(0.0, f64::from(self.width)) as usize;
            let y0 = r.y0.round().clamp(0.0, f64::from(self.height)) as usize;
            let y1 = r.y1.round().clamp(0.0, f64::from(self.height)) as usize;
            let w = self.width as usize;
            for y in y0..y1 {
                self.data[(y * w + x0) * 4..(y * w + x1) * 4].fill(0);
            }
            return;
        }
        let Some(mask) = self.coverage(&rect.to_path(STROKE_TOLERANCE)) else {
            return;
        };
        for (i, m) in mask.iter().enumerate() {
            let clip = self.clip.as_ref().map_or(255, |c| c[i]);
            let k = 1.0 - (f32::from(*m) / 255.0) * (f32::from(clip) / 255.0);
            if k >= 1.0 {
                continue;
            }
            let px = &mut self.data[i * 4..i * 4 + 4];
            pack(scale(unpack(px), k), px);
        }
    }

    fn clip(&mut self, path: &BezPath) {
        let Some(mask) = self.coverage(path) else {
            return;
        };
        self.clip = Some(match self.clip.take() {
            None => mask,
            Some(prev) => prev
                .iter()
                .zip(&mask)
                .map(|(a, b)| ((u16::from(*a) * u16::from(*b) + 127) / 255) as u8)
                .collect(),
        });
    }

    fn reset_clip(&mut self) {
        self.clip = None;
    }

    fn draw_image(&mut self, src: &SurfaceImage<'_>, copy: Rect, paste: Rect) {
        if copy.width() <= 0.0 || copy.height() <= 0.0 || paste.width() <= 0.0 || paste.height() <= 0.0
        {
            return;
        }
        let Some(mask) = self.coverage(&paste.to_path(STROKE_TOLERANCE)) else {
            return;
        };
        let to_user = self.state.transform.inverse();
        let sx = copy.width() / paste.width();
        let sy = copy.height() / paste.height();
        let sample = move |x: u32, y: u32| -> PremulF32 {
            let u = to_user * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            let px = copy.x0 + (u.x - paste.x0) * sx;
            let py = copy.y0 + (u.y - paste.y0) * sy;
            if !px.is_finite() || !py.is_finite() {
                return [0.0; 4];
            }
            let (cx, cy) = (px.floor() as i64, py.floor() as i64);
            if (cx as f64) < copy.x0.floor() || (cy as f64) < copy.y0.floor() {
                return [0.0; 4];
            }
            unpack(&src.pixel(cx, cy))
        };
        self.composite_mask(&mask, sample);
    }

    fn image(&self) -> SurfaceImage<'_> {
        SurfaceImage {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paint/cpu.rs"]
mod tests;
