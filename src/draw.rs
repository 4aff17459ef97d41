//! The primitive library: stateless drawing operations that read the canvas
//! geometry, sample their own parameters from the process-wide RNG, and
//! mutate the canvas in place.
//!
//! Out-of-canvas coordinates are allowed everywhere and simply clip; none of
//! these operations fail.

use std::f64::consts::{FRAC_PI_2, TAU};

use kurbo::{BezPath, Rect};
use rand::Rng;

use crate::blur_cpu;
use crate::canvas::Canvas;
use crate::color::Rgb8;
use crate::weighted::pick;

/// Side counts for the regular polygon; 60 sides approximates a circle.
static POLYGON_SIDES: [(u32, f64); 7] = [
    (3, 0.22),
    (4, 0.13),
    (5, 0.13),
    (7, 0.13),
    (8, 0.13),
    (12, 0.13),
    (60, 0.13),
];

static CURVE_ANCHORS: [(CurveAnchor, f64); 3] = [
    (CurveAnchor::UpperRight, 0.25),
    (CurveAnchor::LowerLeft, 0.25),
    (CurveAnchor::Middle, 0.5),
];

/// Where a curve-illusion fan is anchored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurveAnchor {
    UpperRight,
    LowerLeft,
    Middle,
}

/// Caller-facing knobs for [`line`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineOpts {
    /// Stroke width in pixels.
    pub width: f64,
    /// One continuous polyline, or independent two-point segments.
    pub continuous: bool,
}

impl Default for LineOpts {
    fn default() -> Self {
        Self {
            width: 1.0,
            continuous: true,
        }
    }
}

/// Caller-facing knobs for [`points`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointsOpts {
    /// Exact number of points; random 1-30 when unset.
    pub count: Option<u32>,
    /// Confine all points to a random third-of-canvas sub-rectangle.
    pub confined: bool,
}

/// A named primitive invocation, as committed through a drawing session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Primitive {
    VerticalLines,
    HorizontalLines,
    DiagonalLines,
    RegularPolygon,
    ArtisticPolygon,
    Line { width: f64, continuous: bool },
    Arc { filled: bool },
    Ellipse,
    Points { confined: bool },
    CurveIllusion,
    Background,
    Smooth { random_blur: bool },
}

impl Primitive {
    /// Mutation label, used as the persisted-snapshot filename key.
    pub fn label(&self) -> &'static str {
        match self {
            Primitive::VerticalLines => "vertical",
            Primitive::HorizontalLines => "horizontal",
            Primitive::DiagonalLines => "diagonal",
            Primitive::RegularPolygon => "polygon",
            Primitive::ArtisticPolygon => "freeform",
            Primitive::Line { .. } => "line",
            Primitive::Arc { .. } => "arc",
            Primitive::Ellipse => "ellipse",
            Primitive::Points { .. } => "points",
            Primitive::CurveIllusion => "curve",
            Primitive::Background => "background",
            Primitive::Smooth { .. } => "smooth",
        }
    }

    pub fn apply(&self, canvas: &mut Canvas) {
        match *self {
            Primitive::VerticalLines => vertical_lines(canvas),
            Primitive::HorizontalLines => horizontal_lines(canvas),
            Primitive::DiagonalLines => diagonal_lines(canvas),
            Primitive::RegularPolygon => regular_polygon(canvas),
            Primitive::ArtisticPolygon => artistic_polygon(canvas),
            Primitive::Line { width, continuous } => line(canvas, LineOpts { width, continuous }),
            Primitive::Arc { filled } => arc(canvas, filled),
            Primitive::Ellipse => ellipse(canvas),
            Primitive::Points { confined } => points(
                canvas,
                PointsOpts {
                    count: None,
                    confined,
                },
            ),
            Primitive::CurveIllusion => curve_illusion(canvas, None),
            Primitive::Background => alter_background(canvas),
            Primitive::Smooth { random_blur } => smooth(canvas, random_blur),
        }
    }
}

/// Parallel vertical segments spanning the full height: 1-2 groups anchored
/// at one random x offset, each group with fresh spacing and count.
pub fn vertical_lines(canvas: &mut Canvas) {
    let mut rng = rand::rng();
    let h = canvas.height() as f64;
    let x0 = rng.random_range(0..canvas.width()) as f64;
    let color = canvas.background().sample(&mut rng, true);

    let groups = rng.random_range(1..3);
    for _ in 0..groups {
        let spacing = rng.random_range(5..20) as f64;
        let count = rng.random_range(7..25);
        let mut path = BezPath::new();
        for i in 0..count {
            let x = x0 + f64::from(i) * spacing;
            path.move_to((x, 0.0));
            path.line_to((x, h));
        }
        canvas.stroke_path(&path, 1.0, color);
    }
}

/// Parallel horizontal segments spanning the full width.
pub fn horizontal_lines(canvas: &mut Canvas) {
    let mut rng = rand::rng();
    let w = canvas.width() as f64;
    let y_top = ((canvas.height() as f64) * 0.8) as u32;
    let y0 = rng.random_range(0..y_top.max(1)) as f64;
    let color = canvas.background().sample(&mut rng, true);

    let groups = rng.random_range(1..3);
    for _ in 0..groups {
        let spacing = rng.random_range(5..20) as f64;
        let count = rng.random_range(7..25);
        let mut path = BezPath::new();
        for i in 0..count {
            let y = y0 + f64::from(i) * spacing;
            path.move_to((0.0, y));
            path.line_to((w, y));
        }
        canvas.stroke_path(&path, 1.0, color);
    }
}

/// 45-degree-equivalent parallel segments, anchored either left-of-center or
/// right-of-center; each line runs from the top edge down to the left edge.
pub fn diagonal_lines(canvas: &mut Canvas) {
    let mut rng = rand::rng();
    let w = canvas.width() as f64;
    let x0 = if rng.random_bool(0.5) {
        rng.random_range((-0.2 * w) as i32..(0.5 * w) as i32)
    } else {
        rng.random_range((0.8 * w) as i32..(1.6 * w) as i32)
    };
    let color = canvas.background().sample(&mut rng, true);

    let groups = rng.random_range(1..3);
    for _ in 0..groups {
        let spacing = rng.random_range(5..20);
        let count = rng.random_range(10..40);
        let mut path = BezPath::new();
        for i in 0..count {
            let reach = f64::from(x0 + i * spacing);
            path.move_to((reach, 0.0));
            path.line_to((0.0, reach));
        }
        canvas.stroke_path(&path, 1.0, color);
    }
}

/// A filled regular polygon centered on the x midline, y centered or offset
/// by an eighth of the height, with an optional black outline.
pub fn regular_polygon(canvas: &mut Canvas) {
    let mut rng = rand::rng();
    let w = canvas.width() as f64;
    let h = canvas.height() as f64;
    let color = canvas.background().sample(&mut rng, true);

    let cx = w / 2.0;
    let cy = match rng.random_range(0..3) {
        0 => h / 2.0,
        1 => h / 2.0 + h / 8.0,
        _ => h / 2.0 - h / 8.0,
    };
    let radius = rng.random_range(50..150) as f64;
    let sides = *pick(&mut rng, &POLYGON_SIDES);

    let mut vertices = Vec::with_capacity(sides as usize);
    for i in 0..sides {
        let angle = -FRAC_PI_2 + TAU * f64::from(i) / f64::from(sides);
        vertices.push((cx + radius * angle.cos(), cy + radius * angle.sin()));
    }
    let path = polygon_path(&vertices);
    canvas.fill_path(&path, color);
    if rng.random_bool(0.5) {
        canvas.stroke_path(&path, 1.0, Rgb8::new(0, 0, 0));
    }
}

/// A 100-vertex irregular polygon: the first vertex lands in the central 80%
/// of the canvas, the rest in a box around it that snaps to the canvas edges
/// when the anchor is close to them.
pub fn artistic_polygon(canvas: &mut Canvas) {
    let mut rng = rand::rng();
    let w = canvas.width() as f64;
    let h = canvas.height() as f64;
    let color = canvas.background().sample(&mut rng, true);

    let ax = rng.random_range((0.1 * w) as u32..((0.9 * w) as u32).max(1)) as f64;
    let ay = rng.random_range((0.1 * h) as u32..((0.9 * h) as u32).max(1)) as f64;

    let (x_lo, x_hi) = if ax <= w / 4.0 {
        (0.0, w / 3.0)
    } else if ax >= w - w / 3.0 {
        (w - w / 3.0, w)
    } else {
        (ax - w / 4.0, ax + w / 4.0)
    };
    let (y_lo, y_hi) = if ay <= h / 4.0 {
        (0.0, h / 2.0)
    } else if ay >= h - h / 4.0 {
        (h - h / 2.0, h)
    } else {
        (ay - h / 4.0, ay + h / 4.0)
    };

    let mut vertices = vec![(ax, ay)];
    for _ in 0..99 {
        vertices.push((
            rng.random_range(x_lo..x_hi),
            rng.random_range(y_lo..y_hi),
        ));
    }
    canvas.fill_path(&polygon_path(&vertices), color);
}

/// One continuous polyline through 2-5 random points, or 1-2 independent
/// two-point segments, at the caller's width.
pub fn line(canvas: &mut Canvas, opts: LineOpts) {
    let mut rng = rand::rng();
    let color = canvas.background().sample(&mut rng, true);

    if opts.continuous {
        let count = rng.random_range(2..6);
        let mut path = BezPath::new();
        path.move_to(random_point(canvas, &mut rng));
        for _ in 1..count {
            path.line_to(random_point(canvas, &mut rng));
        }
        canvas.stroke_path(&path, opts.width, color);
    } else {
        let segments = rng.random_range(1..3);
        for _ in 0..segments {
            let mut path = BezPath::new();
            path.move_to(random_point(canvas, &mut rng));
            path.line_to(random_point(canvas, &mut rng));
            canvas.stroke_path(&path, opts.width, color);
        }
    }
}

/// An elliptical arc in a random bounding box whose second corner lies to the
/// lower-right of the first; filled closes the chord, otherwise only the
/// outline is stroked.
pub fn arc(canvas: &mut Canvas, filled: bool) {
    let mut rng = rand::rng();
    let color = canvas.background().sample(&mut rng, true);

    let x1 = rng.random_range(0..canvas.width());
    let y1 = rng.random_range(0..canvas.height());
    let x2 = rng.random_range(x1..canvas.width());
    let y2 = rng.random_range(y1..canvas.height());

    let start = f64::from(rng.random_range(0..180)).to_radians();
    let sweep = f64::from(rng.random_range(50..200)).to_radians();

    let (x1, y1, x2, y2) = (f64::from(x1), f64::from(y1), f64::from(x2), f64::from(y2));
    let segment = kurbo::Arc::new(
        ((x1 + x2) / 2.0, (y1 + y2) / 2.0),
        ((x2 - x1) / 2.0, (y2 - y1) / 2.0),
        start,
        sweep,
        0.0,
    );
    let mut path = BezPath::new();
    for el in kurbo::Shape::path_elements(&segment, 0.1) {
        path.push(el);
    }

    if filled {
        path.close_path();
        canvas.fill_path(&path, color);
    } else {
        canvas.stroke_path(&path, 1.0, color);
    }
}

/// A filled ellipse anchored at a random point, extending toward the lower
/// right by at most a third of the mean canvas dimension per axis.
pub fn ellipse(canvas: &mut Canvas) {
    let mut rng = rand::rng();
    let color = canvas.background().sample(&mut rng, true);

    let max_len = ((canvas.width() + canvas.height()) / 6).max(1);
    let x1 = rng.random_range(0..canvas.width()) as f64;
    let y1 = rng.random_range(0..canvas.height()) as f64;
    let dx = rng.random_range(0..max_len) as f64;
    let dy = rng.random_range(0..max_len) as f64;

    let shape = kurbo::Ellipse::new(
        (x1 + dx / 2.0, y1 + dy / 2.0),
        (dx / 2.0, dy / 2.0),
        0.0,
    );
    canvas.fill_shape(&shape, color);
}

/// Single-pixel dots, anywhere on the canvas or confined to a random
/// third-of-canvas sub-rectangle.
pub fn points(canvas: &mut Canvas, opts: PointsOpts) {
    let mut rng = rand::rng();
    let color = canvas.background().sample(&mut rng, true);
    let count = opts.count.unwrap_or_else(|| rng.random_range(1..30));

    let (w, h) = (canvas.width(), canvas.height());
    let (x_range, y_range) = if opts.confined {
        let x_min = rng.random_range(0..(w - w / 4).max(1));
        let y_min = rng.random_range(0..(h - h / 4).max(1));
        (
            x_min..(x_min + (w / 3).max(1)),
            y_min..(y_min + (h / 3).max(1)),
        )
    } else {
        (0..w, 0..h)
    };

    let mut dots = Vec::with_capacity(count as usize);
    for _ in 0..count {
        dots.push((
            rng.random_range(x_range.clone()) as f64,
            rng.random_range(y_range.clone()) as f64,
        ));
    }
    canvas.fill_dots(&dots, color);
}

/// A fan of lines whose endpoints advance by a constant per-axis offset,
/// approximating a curved edge.
pub fn curve_illusion(canvas: &mut Canvas, anchor: Option<CurveAnchor>) {
    let mut rng = rand::rng();
    let anchor = anchor.unwrap_or_else(|| *pick(&mut rng, &CURVE_ANCHORS));
    let color = canvas.background().sample(&mut rng, true);
    let w = canvas.width() as f64;
    let h = canvas.height() as f64;

    let mut path = BezPath::new();
    match anchor {
        CurveAnchor::UpperRight => {
            let x1 = rng.random_range(0..((0.6 * w) as u32).max(1)) as f64;
            let spacing = rng.random_range(10..25) as f64;
            for i in 0..70 {
                let step = f64::from(i) * spacing;
                path.move_to((x1 + step, 0.0));
                path.line_to((w, step));
            }
        }
        CurveAnchor::LowerLeft => {
            let x1 = rng.random_range((0.3 * w) as u32..(w as u32).max(1)) as f64;
            let spacing = rng.random_range(10..25) as f64;
            for i in 0..70 {
                let step = f64::from(i) * spacing;
                path.move_to((x1 - step, h));
                path.line_to((0.0, h - step));
            }
        }
        CurveAnchor::Middle => {
            let x1 = rng.random_range(w as u32..(1.4 * w) as u32) as f64;
            let y1 = rng.random_range((0.8 * h) as u32..(1.2 * h) as u32) as f64;
            let x2 = f64::from(rng.random_range((-0.3 * w) as i32..0));
            let y2 = h - x1;
            let spacing = rng.random_range(10..20) as f64;
            let count = rng.random_range(10..30);
            for i in 0..count {
                let step = f64::from(i) * spacing;
                path.move_to((x1 + step, y1));
                path.line_to((x2, y2 + step));
            }
        }
    }
    canvas.stroke_path(&path, 1.0, color);
}

/// Repaint part of the visible background: 1-2 passes of either an edge
/// rectangle or an ellipse bulging from one edge, with a 1-in-8 no-op pass.
/// A second pass only picks rectangles; stacked bulges degrade visually.
pub fn alter_background(canvas: &mut Canvas) {
    let mut rng = rand::rng();
    let w = canvas.width() as f64;
    let h = canvas.height() as f64;

    let passes = rng.random_range(1..3);
    for pass in 0..passes {
        let contrast = rng.random_bool(0.5);
        let color = canvas.background().sample(&mut rng, contrast);
        let option = if pass == 0 {
            rng.random_range(1..9)
        } else {
            rng.random_range(1..4)
        };
        match option {
            // Top third.
            1 => canvas.fill_rect(Rect::new(0.0, 0.0, w, h / 3.0), color),
            // Top half.
            2 => canvas.fill_rect(Rect::new(0.0, 0.0, w, h / 2.0), color),
            // Left half.
            3 => canvas.fill_rect(Rect::new(0.0, 0.0, w / 2.0, h), color),
            // Bulge hanging from the top edge.
            4 => fill_edge_bulge(canvas, 0.0, -0.6 * h, w, 0.6 * h, color),
            // Bottom edge.
            5 => fill_edge_bulge(canvas, 0.0, 0.4 * h, w, 1.6 * h, color),
            // Left edge.
            6 => fill_edge_bulge(canvas, -0.33 * w, 0.0, 0.33 * w, h, color),
            // Right edge.
            7 => fill_edge_bulge(canvas, 0.66 * w, 0.0, 1.33 * w, h, color),
            _ => {}
        }
    }
}

/// Smoothing pass plus blur; the blur factor is a random small-integer ratio
/// or a fixed mild value.
pub fn smooth(canvas: &mut Canvas, random_blur: bool) {
    let mut rng = rand::rng();
    let factor = if random_blur {
        rng.random_range(1..4) as f32 / rng.random_range(1..6) as f32
    } else {
        0.5
    };
    let (w, h) = (canvas.width(), canvas.height());
    blur_cpu::smooth_and_blur(canvas.surface_mut(), w, h, factor);
}

fn polygon_path(vertices: &[(f64, f64)]) -> BezPath {
    let mut path = BezPath::new();
    let mut iter = vertices.iter();
    if let Some(&(x, y)) = iter.next() {
        path.move_to((x, y));
    }
    for &(x, y) in iter {
        path.line_to((x, y));
    }
    path.close_path();
    path
}

fn random_point<R: Rng + ?Sized>(canvas: &Canvas, rng: &mut R) -> (f64, f64) {
    (
        rng.random_range(0..canvas.width()) as f64,
        rng.random_range(0..canvas.height()) as f64,
    )
}

/// Fill an ellipse from a bounding box that hangs partly off-canvas; the
/// visible part is the bulge.
fn fill_edge_bulge(canvas: &mut Canvas, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgb8) {
    let shape = kurbo::Ellipse::new(
        ((x0 + x1) / 2.0, (y0 + y1) / 2.0),
        ((x1 - x0) / 2.0, (y1 - y0) / 2.0),
        0.0,
    );
    canvas.fill_shape(&shape, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Background;

    fn all_primitives() -> Vec<Primitive> {
        vec![
            Primitive::VerticalLines,
            Primitive::HorizontalLines,
            Primitive::DiagonalLines,
            Primitive::RegularPolygon,
            Primitive::ArtisticPolygon,
            Primitive::Line {
                width: 3.0,
                continuous: true,
            },
            Primitive::Line {
                width: 1.0,
                continuous: false,
            },
            Primitive::Arc { filled: true },
            Primitive::Arc { filled: false },
            Primitive::Ellipse,
            Primitive::Points { confined: true },
            Primitive::Points { confined: false },
            Primitive::CurveIllusion,
            Primitive::Background,
            Primitive::Smooth { random_blur: true },
            Primitive::Smooth { random_blur: false },
        ]
    }

    #[test]
    fn every_primitive_preserves_canvas_size() {
        for primitive in all_primitives() {
            let mut canvas = Canvas::new(Background::Light, 160, 120).unwrap();
            primitive.apply(&mut canvas);
            assert_eq!(
                (canvas.width(), canvas.height()),
                (160, 120),
                "{primitive:?} changed the canvas size"
            );
            assert_eq!(canvas.surface().len(), 160 * 120 * 4);
        }
    }

    #[test]
    fn visible_primitives_change_pixels_on_white() {
        // Contrast colors on white are in [50,100) per channel, so any
        // on-canvas geometry must move some pixel away from pure white.
        let visible = [
            Primitive::VerticalLines,
            Primitive::HorizontalLines,
            Primitive::RegularPolygon,
            Primitive::ArtisticPolygon,
            Primitive::Line {
                width: 2.0,
                continuous: true,
            },
            Primitive::Points { confined: false },
        ];
        for primitive in visible {
            let mut canvas = Canvas::new(Background::White, 200, 160).unwrap();
            primitive.apply(&mut canvas);
            let changed = canvas
                .surface()
                .chunks_exact(4)
                .any(|px| px[0] != 255 || px[1] != 255 || px[2] != 255);
            assert!(changed, "{primitive:?} left the canvas untouched");
        }
    }

    #[test]
    fn labels_are_distinct_per_operation_kind() {
        let labels: Vec<&str> = all_primitives().iter().map(|p| p.label()).collect();
        assert!(labels.contains(&"background"));
        assert!(labels.contains(&"vertical"));
        assert!(labels.contains(&"smooth"));
    }

    #[test]
    fn polygon_path_closes() {
        let path = polygon_path(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        assert!(matches!(
            path.elements().last(),
            Some(kurbo::PathEl::ClosePath)
        ));
    }
}
