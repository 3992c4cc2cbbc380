use super::*;
use crate::paint::color::Color;
use crate::paint::engine::{Gradient, GradientShape, GradientStop};
use crate::paint::state::CompositeOp;

const RED: [u8; 4] = [255, 0, 0, 255];

fn engine(w: u32, h: u32) -> CpuEngine {
    CpuEngine::new(w, h).unwrap()
}

fn px(e: &CpuEngine, x: i64, y: i64) -> [u8; 4] {
    e.image().pixel(x, y)
}

fn solid(e: &mut CpuEngine, c: Color) {
    e.write(StateWrite::Fill(Paint::Solid(c)));
}

fn red() -> Color {
    Color::from_rgb8(255, 0, 0, 1.0)
}

fn fill_all(e: &mut CpuEngine, c: Color) {
    solid(e, c);
    let r = Rect::new(0.0, 0.0, f64::from(e.width()), f64::from(e.height()));
    e.fill_rect(r);
}

#[test]
fn fill_rect_paints_inside_only() {
    let mut e = engine(8, 8);
    solid(&mut e, red());
    e.fill_rect(Rect::new(2.0, 2.0, 6.0, 6.0));
    assert_eq!(px(&e, 3, 3), RED);
    assert_eq!(px(&e, 0, 0), [0; 4]);
    assert_eq!(px(&e, 7, 7), [0; 4]);
}

#[test]
fn fill_follows_the_transform() {
    let mut e = engine(10, 10);
    solid(&mut e, red());
    e.set_transform(Affine::translate((5.0, 5.0)));
    e.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0));
    assert_eq!(px(&e, 6, 6), RED);
    assert_eq!(px(&e, 1, 1), [0; 4]);
}

#[test]
fn global_alpha_scales_coverage() {
    let mut e = engine(4, 4);
    e.write(StateWrite::GlobalAlpha(0.5));
    fill_all(&mut e, red());
    assert_eq!(px(&e, 1, 1), [128, 0, 0, 128]);
}

#[test]
fn stroke_covers_the_line_width() {
    let mut e = engine(10, 10);
    e.write(StateWrite::LineWidth(2.0));
    e.write(StateWrite::Stroke(Paint::Solid(red())));
    let mut line = BezPath::new();
    line.move_to((0.0, 5.0));
    line.line_to((10.0, 5.0));
    e.stroke_path(&line);
    assert_eq!(px(&e, 5, 4), RED);
    assert_eq!(px(&e, 5, 5), RED);
    assert_eq!(px(&e, 5, 8), [0; 4]);
}

#[test]
fn dashed_strokes_leave_gaps() {
    let mut e = engine(10, 10);
    e.write(StateWrite::LineWidth(2.0));
    e.write(StateWrite::LineDash(vec![2.0, 2.0]));
    e.write(StateWrite::Stroke(Paint::Solid(red())));
    let mut line = BezPath::new();
    line.move_to((0.0, 5.0));
    line.line_to((10.0, 5.0));
    e.stroke_path(&line);
    assert_eq!(px(&e, 0, 4)[3], 255);
    assert!(px(&e, 2, 4)[3] < 10);
    assert_eq!(px(&e, 4, 4)[3], 255);
}

#[test]
fn zero_width_strokes_draw_nothing() {
    let mut e = engine(4, 4);
    e.write(StateWrite::LineWidth(0.0));
    e.stroke_rect(Rect::new(0.0, 0.0, 4.0, 4.0));
    assert!(e.image().data.iter().all(|v| *v == 0));
}

#[test]
fn destination_out_erases() {
    let mut e = engine(4, 4);
    fill_all(&mut e, red());
    e.write(StateWrite::Composite(CompositeOp::DestinationOut));
    fill_all(&mut e, Color::BLACK);
    assert_eq!(px(&e, 2, 2), [0; 4]);
}

#[test]
fn unbounded_modes_clear_outside_the_shape() {
    let mut e = engine(8, 8);
    fill_all(&mut e, red());
    e.write(StateWrite::Composite(CompositeOp::SourceIn));
    solid(&mut e, Color::from_rgb8(0, 0, 255, 1.0));
    e.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0));
    assert_eq!(px(&e, 1, 1), [0, 0, 255, 255]);
    assert_eq!(px(&e, 6, 6), [0; 4]);
}

#[test]
fn clip_restricts_painting_until_reset() {
    let mut e = engine(8, 8);
    e.clip(&Rect::new(0.0, 0.0, 4.0, 4.0).to_path(0.1));
    fill_all(&mut e, red());
    assert_eq!(px(&e, 1, 1), RED);
    assert_eq!(px(&e, 6, 6), [0; 4]);

    e.reset_clip();
    fill_all(&mut e, red());
    assert_eq!(px(&e, 6, 6), RED);
}

#[test]
fn nested_clips_intersect() {
    let mut e = engine(8, 8);
    e.clip(&Rect::new(0.0, 0.0, 6.0, 6.0).to_path(0.1));
    e.clip(&Rect::new(2.0, 2.0, 8.0, 8.0).to_path(0.1));
    fill_all(&mut e, red());
    assert_eq!(px(&e, 0, 0), [0; 4]);
    assert_eq!(px(&e, 3, 3), RED);
    assert_eq!(px(&e, 7, 7), [0; 4]);
}

#[test]
fn clear_rect_ignores_compositing_state() {
    let mut e = engine(8, 8);
    fill_all(&mut e, red());
    e.write(StateWrite::Composite(CompositeOp::Lighter));
    e.clear_rect(Rect::new(0.0, 0.0, 4.0, 4.0));
    assert_eq!(px(&e, 2, 2), [0; 4]);
    assert_eq!(px(&e, 6, 6), RED);
}

#[test]
fn clear_rect_follows_the_transform() {
    let mut e = engine(8, 8);
    fill_all(&mut e, red());
    e.set_transform(Affine::translate((4.0, 4.0)));
    e.clear_rect(Rect::new(0.0, 0.0, 2.0, 2.0));
    assert_eq!(px(&e, 5, 5), [0; 4]);
    assert_eq!(px(&e, 2, 2), RED);
}

#[test]
fn draw_image_copies_and_scales_regions() {
    let mut src = engine(4, 4);
    fill_all(&mut src, red());

    let mut dst = engine(8, 8);
    dst.draw_image(
        &src.image(),
        Rect::new(0.0, 0.0, 4.0, 4.0),
        Rect::new(4.0, 4.0, 8.0, 8.0),
    );
    assert_eq!(px(&dst, 5, 5), RED);
    assert_eq!(px(&dst, 1, 1), [0; 4]);

    let mut scaled = engine(8, 8);
    scaled.draw_image(
        &src.image(),
        Rect::new(0.0, 0.0, 4.0, 4.0),
        Rect::new(0.0, 0.0, 8.0, 8.0),
    );
    assert_eq!(px(&scaled, 7, 7), RED);
}

#[test]
fn empty_regions_draw_nothing() {
    let mut src = engine(2, 2);
    fill_all(&mut src, red());
    let mut dst = engine(2, 2);
    dst.draw_image(&src.image(), Rect::new(0.0, 0.0, 0.0, 2.0), Rect::new(0.0, 0.0, 2.0, 2.0));
    assert_eq!(px(&dst, 0, 0), [0; 4]);
}

#[test]
fn shadows_paint_offset_behind_the_shape() {
    let mut e = engine(8, 8);
    e.write(StateWrite::ShadowColor(Color::BLACK));
    e.write(StateWrite::ShadowOffsetX(3.0));
    solid(&mut e, Color::WHITE);
    e.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0));
    assert_eq!(px(&e, 1, 1), [255, 255, 255, 255]);
    assert_eq!(px(&e, 3, 1), [0, 0, 0, 255]);
    assert_eq!(px(&e, 2, 1), [0; 4]);
}

#[test]
fn transparent_shadow_color_draws_no_shadow() {
    let mut e = engine(8, 8);
    e.write(StateWrite::ShadowOffsetX(3.0));
    solid(&mut e, Color::WHITE);
    e.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0));
    assert_eq!(px(&e, 3, 1), [0; 4]);
}

#[test]
fn device_gradients_shade_by_pixel_position() {
    let mut e = engine(8, 1);
    e.write(StateWrite::Fill(Paint::Gradient(Gradient {
        shape: GradientShape::Linear {
            start: Point::new(0.0, 0.0),
            end: Point::new(8.0, 0.0),
        },
        stops: vec![
            GradientStop { offset: 0.0, color: Color::BLACK },
            GradientStop { offset: 1.0, color: Color::WHITE },
        ],
        space: GradientSpace::Device,
    })));
    e.fill_rect(Rect::new(0.0, 0.0, 8.0, 1.0));
    assert!(px(&e, 0, 0)[0] < px(&e, 7, 0)[0]);
    assert_eq!(px(&e, 4, 0)[3], 255);
}

#[test]
fn resize_clears_pixels_and_state() {
    let mut e = engine(4, 4);
    e.write(StateWrite::LineWidth(7.0));
    fill_all(&mut e, red());
    e.resize(6, 3).unwrap();
    assert_eq!((e.width(), e.height()), (6, 3));
    assert_eq!(e.state(), &EngineState::default());
    assert!(e.image().data.iter().all(|v| *v == 0));
}

#[test]
fn engines_can_share_a_rasterizer() {
    let raster = Rc::new(RefCell::new(CpuRasterizer::default()));
    let mut a = CpuEngine::with_rasterizer(4, 4, raster.clone()).unwrap();
    let mut b = CpuEngine::with_rasterizer(4, 4, raster.clone()).unwrap();
    fill_all(&mut a, red());
    fill_all(&mut b, red());
    assert_eq!(px(&a, 0, 0), RED);
    assert_eq!(px(&b, 3, 3), RED);
    assert_eq!(raster.borrow().stats().allocated, 1);
}
