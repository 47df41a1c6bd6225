//=========================================================================
// Software Canvas
//=========================================================================
//
// In-memory RGBA framebuffer implementing `RenderSurface`.
//
// Drawing is done by inverse mapping: for every device pixel inside the
// transformed bounding box of a primitive, the pixel center is mapped back
// into user space and tested against the primitive. Images are sampled
// nearest-neighbor and composited source-over with straight alpha.
//
//=========================================================================

//=== External Dependencies ===============================================

use image::{Rgba, RgbaImage};

//=== Internal Dependencies ===============================================

use super::{Color, Image, RenderSurface};
use crate::core::types::Rect;

//=== Affine ==============================================================

/// 2D affine transform in canvas order: `(a, b, c, d, e, f)` maps
/// `(x, y)` to `(a*x + c*y + e, b*x + d*y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Affine {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Affine {
    const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += self.a * tx + self.c * ty;
        self.f += self.b * tx + self.d * ty;
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.a *= sx;
        self.b *= sx;
        self.c *= sy;
        self.d *= sy;
    }

    fn rotate(&mut self, radians: f32) {
        let (sin, cos) = radians.sin_cos();
        let Affine { a, b, c, d, .. } = *self;
        self.a = a * cos + c * sin;
        self.b = b * cos + d * sin;
        self.c = c * cos - a * sin;
        self.d = d * cos - b * sin;
    }

    /// Device → user mapping, or `None` for a degenerate transform.
    fn inverse(&self) -> Option<Affine> {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() < f32::EPSILON {
            return None;
        }
        let inv = 1.0 / det;
        Some(Affine {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            e: (self.c * self.f - self.d * self.e) * inv,
            f: (self.b * self.e - self.a * self.f) * inv,
        })
    }
}

//=== DrawState ===========================================================

#[derive(Debug, Clone, Copy)]
struct DrawState {
    transform: Affine,
    alpha: f32,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            alpha: 1.0,
        }
    }
}

//=== SoftwareCanvas ======================================================

pub struct SoftwareCanvas {
    frame: RgbaImage,
    state: DrawState,
    stack: Vec<DrawState>,
}

impl SoftwareCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            frame: RgbaImage::new(width, height),
            state: DrawState::default(),
            stack: Vec::new(),
        }
    }

    /// The current framebuffer contents.
    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        if x < self.frame.width() && y < self.frame.height() {
            Some(*self.frame.get_pixel(x, y))
        } else {
            None
        }
    }

    //--- Rasterization ----------------------------------------------------

    /// Visits every device pixel whose center falls inside `rect` under the
    /// current transform, passing the pixel and the user-space point.
    fn raster<F>(&mut self, rect: Rect, mut visit: F)
    where
        F: FnMut(&mut Rgba<u8>, f32, f32),
    {
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return;
        }
        let transform = self.state.transform;
        let Some(inverse) = transform.inverse() else {
            return;
        };

        let corners = [
            transform.apply(rect.x, rect.y),
            transform.apply(rect.right(), rect.y),
            transform.apply(rect.x, rect.bottom()),
            transform.apply(rect.right(), rect.bottom()),
        ];
        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        for (x, y) in corners {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        let (w, h) = (self.frame.width() as f32, self.frame.height() as f32);
        let x0 = min_x.floor().clamp(0.0, w) as u32;
        let y0 = min_y.floor().clamp(0.0, h) as u32;
        let x1 = max_x.ceil().clamp(0.0, w) as u32;
        let y1 = max_y.ceil().clamp(0.0, h) as u32;

        for py in y0..y1 {
            for px in x0..x1 {
                let (ux, uy) = inverse.apply(px as f32 + 0.5, py as f32 + 0.5);
                if ux >= rect.x && ux < rect.right() && uy >= rect.y && uy < rect.bottom() {
                    visit(self.frame.get_pixel_mut(px, py), ux, uy);
                }
            }
        }
    }
}

//=== Compositing =========================================================

/// Source-over blend with straight alpha; `alpha` scales the source.
fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>, alpha: f32) {
    let sa = (src[3] as f32 / 255.0) * alpha;
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let sc = src[i] as f32;
        let dc = dst[i] as f32;
        out[i] = ((sc * sa + dc * da * (1.0 - sa)) / out_a).round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    *dst = Rgba(out);
}

//=== RenderSurface Impl ==================================================

impl RenderSurface for SoftwareCanvas {
    fn size(&self) -> (u32, u32) {
        self.frame.dimensions()
    }

    fn framebuffer(&self) -> Option<&RgbaImage> {
        Some(&self.frame)
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.frame = RgbaImage::new(width, height);
        self.state = DrawState::default();
        self.stack.clear();
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        // Unbalanced restore is ignored, matching canvas behavior.
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.state.transform.translate(x, y);
    }

    fn rotate(&mut self, radians: f32) {
        self.state.transform.rotate(radians);
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.state.transform.scale(sx, sy);
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        if alpha.is_finite() {
            self.state.alpha = alpha.clamp(0.0, 1.0);
        }
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.raster(rect, |pixel, _, _| *pixel = Rgba([0, 0, 0, 0]));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let alpha = self.state.alpha;
        self.raster(rect, |pixel, _, _| blend(pixel, color, alpha));
    }

    fn draw_image(&mut self, image: &Image, src: Rect, dest: Rect) {
        if src.width <= 0.0 || src.height <= 0.0 || image.width() == 0 || image.height() == 0 {
            return;
        }
        let alpha = self.state.alpha;
        let pixels = image.pixels();
        let max_x = (image.width() - 1) as f32;
        let max_y = (image.height() - 1) as f32;
        let min_x = src.x.max(0.0).min(max_x);
        let min_y = src.y.max(0.0).min(max_y);

        self.raster(dest, |pixel, ux, uy| {
            let u = (ux - dest.x) / dest.width;
            let v = (uy - dest.y) / dest.height;
            let sx = (src.x + u * src.width).floor().clamp(min_x, max_x);
            let sy = (src.y + v * src.height).floor().clamp(min_y, max_y);
            blend(pixel, *pixels.get_pixel(sx as u32, sy as u32), alpha);
        });
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
