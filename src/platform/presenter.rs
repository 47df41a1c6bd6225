//=========================================================================
// Window Presenter
//
// Puts a software framebuffer on screen through `pixels`.
//
// The pixel buffer keeps the game's logical size; `pixels` scales it to
// the window's physical surface. The RGBA layout of `SoftwareCanvas`
// matches the buffer's default texture format, so presenting is a copy.
//
//=========================================================================

use std::sync::Arc;

use image::RgbaImage;
use log::*;
use pixels::{Pixels, SurfaceTexture};
use winit::window::Window;

//=== WindowPresenter =====================================================

pub struct WindowPresenter {
    pixels: Pixels<'static>,
    window: Arc<Window>,
    buffer_size: (u32, u32),
}

impl WindowPresenter {
    /// Creates a `width`x`height` pixel buffer bound to `window`.
    pub fn new(window: Arc<Window>, width: u32, height: u32) -> Result<Self, pixels::Error> {
        let surface = window.inner_size();
        let texture = SurfaceTexture::new(surface.width, surface.height, Arc::clone(&window));
        let pixels = Pixels::new(width, height, texture)?;

        info!(
            target: "platform",
            "Presenter ready: {}x{} buffer on {}x{} surface",
            width, height, surface.width, surface.height
        );
        Ok(Self {
            pixels,
            window,
            buffer_size: (width, height),
        })
    }

    /// Follows a new logical game size and the window's current surface.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), pixels::Error> {
        let surface = self.window.inner_size();
        if surface.width > 0 && surface.height > 0 {
            self.pixels.resize_surface(surface.width, surface.height)?;
        }
        if width > 0 && height > 0 && (width, height) != self.buffer_size {
            self.pixels.resize_buffer(width, height)?;
            self.buffer_size = (width, height);
        }
        Ok(())
    }

    /// Copies `frame` into the pixel buffer and draws it.
    pub fn present(&mut self, frame: &RgbaImage) -> Result<(), pixels::Error> {
        let surface = self.window.inner_size();
        if surface.width == 0 || surface.height == 0 {
            return Ok(());
        }
        blit(frame, self.pixels.frame_mut(), self.buffer_size.0);
        self.pixels.render()
    }
}

//=== Blit ================================================================
//
// The frame and buffer can disagree for one redraw around a resize. Rows
// and columns outside the overlap are cleared.
//

pub(crate) fn blit(frame: &RgbaImage, target: &mut [u8], target_width: u32) {
    target.fill(0);
    if target_width == 0 {
        return;
    }

    let target_stride = target_width as usize * 4;
    let frame_stride = frame.width() as usize * 4;
    let row_bytes = target_stride.min(frame_stride);

    for (dst, src) in target
        .chunks_exact_mut(target_stride)
        .zip(frame.as_raw().chunks_exact(frame_stride.max(1)))
    {
        dst[..row_bytes].copy_from_slice(&src[..row_bytes]);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checker() -> RgbaImage {
        RgbaImage::from_fn(2, 2, |x, y| Rgba([x as u8 * 100, y as u8 * 100, 7, 255]))
    }

    #[test]
    fn matching_sizes_copy_every_byte() {
        let frame = checker();
        let mut target = vec![0xAA; 2 * 2 * 4];
        blit(&frame, &mut target, 2);
        assert_eq!(target, frame.as_raw().as_slice());
    }

    #[test]
    fn larger_target_keeps_overlap_and_clears_the_rest() {
        let frame = checker();
        let mut target = vec![0xAA; 3 * 3 * 4];
        blit(&frame, &mut target, 3);

        assert_eq!(&target[0..8], &frame.as_raw()[0..8]);
        assert_eq!(&target[8..12], &[0, 0, 0, 0]);
        assert_eq!(&target[12..20], &frame.as_raw()[8..16]);
        assert!(target[24..].iter().all(|b| *b == 0));
    }

    #[test]
    fn smaller_target_takes_the_top_left_corner() {
        let frame = checker();
        let mut target = vec![0; 4];
        blit(&frame, &mut target, 1);
        assert_eq!(&target[..], &frame.get_pixel(0, 0).0);
    }

    #[test]
    fn empty_frame_clears_target() {
        let frame = RgbaImage::new(0, 0);
        let mut target = vec![9; 8];
        blit(&frame, &mut target, 2);
        assert!(target.iter().all(|b| *b == 0));
    }
}
