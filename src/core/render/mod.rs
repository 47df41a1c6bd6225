//=========================================================================
// Render Surface
//=========================================================================
//
// The drawing boundary between the runtime and whatever actually puts
// pixels on screen.
//
// The operation set mirrors a 2D canvas context: a transform stack
// (save/restore, translate, rotate, scale), a global alpha, sub-rectangle
// image blits, solid fills and clears. Coordinates are logical pixels.
//
// Implementations:
//   SoftwareCanvas    in-memory RGBA framebuffer (headless, tests, copied
//                     to a window by the platform presenter)
//
//=========================================================================

//=== Module Declarations =================================================

mod canvas;

//=== External Dependencies ===============================================

use std::fmt;
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::types::Rect;

//=== Public API ==========================================================

pub use canvas::SoftwareCanvas;

/// Straight-alpha RGBA color used by fills.
pub type Color = Rgba<u8>;

//=== SurfaceError ========================================================

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("drawing context unavailable: {0}")]
    ContextUnavailable(String),

    #[error("failed to present frame: {0}")]
    Present(String),
}

//=== Image ===============================================================

/// Decoded RGBA bitmap, cheap to clone and share between sprites.
#[derive(Clone, PartialEq)]
pub struct Image(Arc<RgbaImage>);

impl Image {
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self(Arc::new(pixels))
    }

    /// Decodes an encoded image (PNG) into RGBA.
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let decoded = image::load_from_memory(bytes)?;
        Ok(Self::from_rgba(decoded.to_rgba8()))
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.0
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Image({}x{})", self.width(), self.height())
    }
}

//=== RenderSurface =======================================================

/// Canvas-like 2D drawing target owned by exactly one engine.
pub trait RenderSurface {
    /// Obtains the drawing context. Called once when the engine is built;
    /// an error here aborts construction.
    fn acquire_context(&mut self) -> Result<(), SurfaceError> {
        Ok(())
    }

    /// Backing store size in pixels.
    fn size(&self) -> (u32, u32);

    /// Resizes the backing store. Content and drawing state may be reset.
    fn set_size(&mut self, width: u32, height: u32);

    //--- State Stack ------------------------------------------------------

    fn save(&mut self);
    fn restore(&mut self);

    //--- Transform --------------------------------------------------------

    fn translate(&mut self, x: f32, y: f32);
    /// Clockwise rotation in radians (y axis points down).
    fn rotate(&mut self, radians: f32);
    fn scale(&mut self, sx: f32, sy: f32);

    fn set_global_alpha(&mut self, alpha: f32);

    //--- Drawing ----------------------------------------------------------

    /// Sets every pixel under `rect` to transparent.
    fn clear_rect(&mut self, rect: Rect);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Blits the `src` sub-rectangle of `image` into `dest`, scaling to fit.
    fn draw_image(&mut self, image: &Image, src: Rect, dest: Rect);

    /// Hands the finished frame to the display. Default is a no-op.
    fn present(&mut self) -> Result<(), SurfaceError> {
        Ok(())
    }

    /// In-memory pixels a window host can copy to screen, for surfaces
    /// that keep one.
    fn framebuffer(&self) -> Option<&RgbaImage> {
        None
    }
}

//=========================================================================
// Tests
//=========================================================================
