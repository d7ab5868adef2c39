use crate::mask::geometry::{Point, Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeMode {
    SourceOver,
    Xor,
}

/// Drawing surface the mask paints on.
///
/// Implementations sit on top of the page, do not intercept pointer input and
/// are positioned in document coordinates.
pub trait MaskSurface {
    fn size(&self) -> Size;
    /// Resizing discards the current contents.
    fn resize(&mut self, size: Size);
    fn move_to(&mut self, offset: Point);
    fn clear_rect(&mut self, rect: Rect);
    fn fill_rect(&mut self, rect: Rect, color: Rgba, alpha: f64, mode: CompositeMode);
}

/// Software surface backed by an RGBA byte buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaSurface {
    width: u32,
    height: u32,
    offset: Point,
    pixels: Vec<u8>,
}

impl RgbaSurface {
    pub fn new(size: Size, offset: Point) -> Self {
        let (width, height) = pixel_dimensions(size);
        Self {
            width,
            height,
            offset,
            pixels: vec![0u8; (width as usize) * (height as usize) * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let idx = ((y * self.width + x) * 4) as usize;
        Rgba {
            r: self.pixels[idx],
            g: self.pixels[idx + 1],
            b: self.pixels[idx + 2],
            a: self.pixels[idx + 3],
        }
    }

    /// Number of fully transparent pixels.
    pub fn transparent_pixel_count(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|px| px[3] == 0).count()
    }

    fn span(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        let x0 = clamp_edge(rect.x, self.width);
        let y0 = clamp_edge(rect.y, self.height);
        let x1 = clamp_edge(rect.right(), self.width);
        let y1 = clamp_edge(rect.bottom(), self.height);
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }

    fn for_each_in(&mut self, rect: Rect, mut f: impl FnMut(&mut [u8])) {
        let Some((x0, y0, x1, y1)) = self.span(rect) else {
            return;
        };
        let stride = self.width as usize * 4;
        for y in y0 as usize..y1 as usize {
            let row = &mut self.pixels[y * stride..(y + 1) * stride];
            for px in row[x0 as usize * 4..x1 as usize * 4].chunks_exact_mut(4) {
                f(px);
            }
        }
    }
}

impl MaskSurface for RgbaSurface {
    fn size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }

    fn resize(&mut self, size: Size) {
        let (width, height) = pixel_dimensions(size);
        self.width = width;
        self.height = height;
        self.pixels = vec![0u8; (width as usize) * (height as usize) * 4];
    }

    fn move_to(&mut self, offset: Point) {
        self.offset = offset;
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.for_each_in(rect, |px| px.copy_from_slice(&[0, 0, 0, 0]));
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba, alpha: f64, mode: CompositeMode) {
        let alpha = alpha.clamp(0.0, 1.0);
        self.for_each_in(rect, |px| {
            let dst = Rgba::rgba(px[0], px[1], px[2], px[3]);
            let out = composite_pixel(dst, color, alpha, mode);
            px.copy_from_slice(&[out.r, out.g, out.b, out.a]);
        });
    }
}

fn pixel_dimensions(size: Size) -> (u32, u32) {
    let dim = |v: f64| if v.is_finite() { v.max(0.0).round() as u32 } else { 0 };
    (dim(size.width), dim(size.height))
}

fn clamp_edge(value: f64, limit: u32) -> u32 {
    if !value.is_finite() {
        return if value > 0.0 { limit } else { 0 };
    }
    value.round().clamp(0.0, limit as f64) as u32
}

/// Porter-Duff compositing of `top` (scaled by `alpha`) onto `bottom`.
fn composite_pixel(bottom: Rgba, top: Rgba, alpha: f64, mode: CompositeMode) -> Rgba {
    let sa = top.a as f64 / 255.0 * alpha;
    let da = bottom.a as f64 / 255.0;

    let (fs, fd) = match mode {
        CompositeMode::SourceOver => (1.0, 1.0 - sa),
        CompositeMode::Xor => (1.0 - da, 1.0 - sa),
    };
    let out_a = sa * fs + da * fd;
    if out_a <= f64::EPSILON {
        return Rgba::TRANSPARENT;
    }

    let blend = |s: u8, d: u8| -> u8 {
        ((s as f64 * sa * fs + d as f64 * da * fd) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8
    };

    Rgba {
        r: blend(top.r, bottom.r),
        g: blend(top.g, bottom.g),
        b: blend(top.b, bottom.b),
        a: (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    }
}
