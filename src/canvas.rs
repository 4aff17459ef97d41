use std::io::Cursor;

use anyhow::Context as _;
use kurbo::Shape as _;

use crate::color::{Background, Rgb8};
use crate::error::{ArtgenError, ArtgenResult};

/// Tolerance for flattening curves into path elements and for stroke
/// expansion, in pixels.
const PATH_TOLERANCE: f64 = 0.1;

/// The mutable raster surface every primitive draws onto.
///
/// The surface is opaque RGBA8 (alpha is 255 everywhere by construction) and
/// its dimensions are fixed for the canvas lifetime. The background category
/// is fixed at creation and only determines future color sampling; the
/// visible background pixels may be overwritten by later operations.
#[derive(Debug)]
pub struct Canvas {
    background: Background,
    pixmap: vello_cpu::Pixmap,
}

impl Canvas {
    /// Create a canvas filled with the background category's base color.
    ///
    /// `Light`/`Dark` fills are sampled once here and never resampled. Fails
    /// with `InvalidConfiguration` when a dimension is zero or exceeds the
    /// rasterizer's `u16` limit.
    pub fn new(background: Background, width: u32, height: u32) -> ArtgenResult<Self> {
        let (w, h) = checked_dims(width, height)?;

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        let fill = background.base_rgb(&mut rand::rng());
        for px in pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&[fill.r, fill.g, fill.b, 255]);
        }

        Ok(Self { background, pixmap })
    }

    pub fn width(&self) -> u32 {
        u32::from(self.pixmap.width())
    }

    pub fn height(&self) -> u32 {
        u32::from(self.pixmap.height())
    }

    pub fn background(&self) -> Background {
        self.background
    }

    /// Deep copy of the pixel surface, independently restorable later.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            width: self.width(),
            height: self.height(),
            data: self.pixmap.data_as_u8_slice().to_vec(),
        }
    }

    /// Replace the pixel surface with a snapshot of the same canvas.
    pub fn restore(&mut self, snapshot: &Snapshot) -> ArtgenResult<()> {
        if snapshot.width != self.width() || snapshot.height != self.height() {
            return Err(ArtgenError::invalid_configuration(format!(
                "snapshot is {}x{} but canvas is {}x{}",
                snapshot.width,
                snapshot.height,
                self.width(),
                self.height()
            )));
        }
        self.pixmap
            .data_as_u8_slice_mut()
            .copy_from_slice(&snapshot.data);
        Ok(())
    }

    /// Read one pixel. Panics when `(x, y)` is outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Rgb8 {
        assert!(x < self.width() && y < self.height(), "pixel out of bounds");
        let idx = ((y * self.width() + x) as usize) * 4;
        let data = self.pixmap.data_as_u8_slice();
        Rgb8::new(data[idx], data[idx + 1], data[idx + 2])
    }

    /// Encode the surface as JPEG bytes.
    pub fn to_jpeg(&self) -> ArtgenResult<Vec<u8>> {
        encode_jpeg(self.pixmap.data_as_u8_slice(), self.width(), self.height())
    }

    /// Record fills into a fresh render context, rasterize them onto a
    /// transparent scratch layer, and composite the layer over the surface.
    ///
    /// `vello_cpu` renders into a fresh buffer, so accumulation over prior
    /// content needs the render-then-over dance rather than rendering into
    /// the owned pixmap directly.
    fn paint<F: FnOnce(&mut vello_cpu::RenderContext)>(&mut self, record: F) {
        let (w, h) = (self.pixmap.width(), self.pixmap.height());
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        record(&mut ctx);
        ctx.flush();

        let mut layer = vello_cpu::Pixmap::new(w, h);
        layer.data_as_u8_slice_mut().fill(0);
        ctx.render_to_pixmap(&mut layer);

        over_in_place(self.pixmap.data_as_u8_slice_mut(), layer.data_as_u8_slice());
    }

    pub(crate) fn fill_path(&mut self, path: &kurbo::BezPath, color: Rgb8) {
        let cpu_path = bezpath_to_cpu(path);
        self.paint(|ctx| {
            ctx.set_paint(paint_color(color));
            ctx.fill_path(&cpu_path);
        });
    }

    /// Stroke by expanding the outline with kurbo and filling the result;
    /// the rasterizer itself only ever fills.
    pub(crate) fn stroke_path(&mut self, path: &kurbo::BezPath, width: f64, color: Rgb8) {
        let style = kurbo::Stroke::new(width)
            .with_join(kurbo::Join::Round)
            .with_caps(kurbo::Cap::Round);
        let outline = kurbo::stroke(
            path.elements().iter().copied(),
            &style,
            &kurbo::StrokeOpts::default(),
            PATH_TOLERANCE,
        );
        self.fill_path(&outline, color);
    }

    pub(crate) fn fill_rect(&mut self, rect: kurbo::Rect, color: Rgb8) {
        self.paint(|ctx| {
            ctx.set_paint(paint_color(color));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                rect.x0, rect.y0, rect.x1, rect.y1,
            ));
        });
    }

    /// Fill many 1x1 rects in one rasterization pass.
    pub(crate) fn fill_dots(&mut self, dots: &[(f64, f64)], color: Rgb8) {
        self.paint(|ctx| {
            ctx.set_paint(paint_color(color));
            for &(x, y) in dots {
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(x, y, x + 1.0, y + 1.0));
            }
        });
    }

    /// Convert a `Shape` to a filled path on the canvas.
    pub(crate) fn fill_shape(&mut self, shape: &impl kurbo::Shape, color: Rgb8) {
        let mut path = kurbo::BezPath::new();
        for el in shape.path_elements(PATH_TOLERANCE) {
            path.push(el);
        }
        self.fill_path(&path, color);
    }

    pub(crate) fn surface(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub(crate) fn surface_mut(&mut self) -> &mut [u8] {
        self.pixmap.data_as_u8_slice_mut()
    }
}

/// Deep copy of a canvas surface at one point in time. Equality is
/// pixel-for-pixel.
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Snapshot {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub(crate) fn to_jpeg(&self) -> ArtgenResult<Vec<u8>> {
        encode_jpeg(&self.data, self.width, self.height)
    }
}

fn checked_dims(width: u32, height: u32) -> ArtgenResult<(u16, u16)> {
    if width == 0 || height == 0 {
        return Err(ArtgenError::invalid_configuration(format!(
            "canvas dimensions must be positive (got {width}x{height})"
        )));
    }
    let w: u16 = width.try_into().map_err(|_| {
        ArtgenError::invalid_configuration(format!("canvas width exceeds u16: {width}"))
    })?;
    let h: u16 = height.try_into().map_err(|_| {
        ArtgenError::invalid_configuration(format!("canvas height exceeds u16: {height}"))
    })?;
    Ok((w, h))
}

fn paint_color(color: Rgb8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(color.r, color.g, color.b, 255)
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

/// Source-over for premultiplied RGBA8, `src` over `dst` in place.
fn over_in_place(dst: &mut [u8], src: &[u8]) {
    debug_assert_eq!(dst.len(), src.len());
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = u16::from(s[3]);
        if sa == 0 {
            continue;
        }
        if sa == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - sa;
        for c in 0..4 {
            d[c] = s[c].saturating_add(mul_div255(u16::from(d[c]), inv));
        }
    }
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn encode_jpeg(rgba_premul: &[u8], width: u32, height: u32) -> ArtgenResult<Vec<u8>> {
    // The surface is opaque, so premultiplied RGBA is plain RGB plus a
    // constant alpha byte to drop.
    let rgb: Vec<u8> = rgba_premul
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();
    let img = image::RgbImage::from_raw(width, height, rgb)
        .context("raster buffer does not match canvas dimensions")?;

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
        .context("encode jpeg")?;
    Ok(buf)
}
