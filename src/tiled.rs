//! Owned tiled scanout surface

use log::trace;

use crate::blit::swizzling_blit;
use crate::display::PixelBuffer;
use crate::swizzle::TileLayout;

/// A framebuffer stored in the hardware's swizzled tile layout
///
/// `width` and `height` are the logical (linear) extent. The backing store
/// covers whole tile rows as required by the layout.
pub struct TiledSurface {
    pixels: Vec<u32>,
    width: u32,
    height: u32,
    layout: TileLayout,
}

impl TiledSurface {
    pub fn new(width: u32, height: u32, layout: TileLayout) -> Self {
        Self {
            pixels: vec![0; layout.surface_len(width, height)],
            width,
            height,
            layout,
        }
    }

    #[inline]
    pub fn layout(&self) -> &TileLayout {
        &self.layout
    }

    /// Swizzle `src` into the surface with its top-left corner at (x, y)
    ///
    /// The rectangle is clamped to the logical extent first, so this is the
    /// safe entry point around [`swizzling_blit`].
    pub fn blit(&mut self, src: &PixelBuffer, x: u32, y: u32, blend: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let w = src.width().min(self.width - x);
        let h = src.height().min(self.height - y);
        if w == 0 || h == 0 {
            return;
        }

        if w == src.width() {
            let len = w as usize * h as usize;
            swizzling_blit(&mut self.pixels, &src.pixels()[..len], w, h, x, y, blend, &self.layout);
        } else {
            trace!("cropping {}x{} source to {}x{}", src.width(), src.height(), w, h);
            let mut cropped = Vec::with_capacity(w as usize * h as usize);
            for row in 0..h {
                cropped.extend_from_slice(&src.row(row)[..w as usize]);
            }
            swizzling_blit(&mut self.pixels, &cropped, w, h, x, y, blend, &self.layout);
        }
    }

    /// Read a pixel at linear (x, y)
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(self.layout.offset(x, y)).copied()
    }

    /// Unswizzle the visible area into a linear buffer
    ///
    /// Copies min(width, height) of both buffers.
    pub fn detile_into(&self, dst: &mut PixelBuffer) {
        let w = dst.width().min(self.width);
        let h = dst.height().min(self.height);
        let stride = dst.width() as usize;
        let out = dst.pixels_mut();
        for y in 0..h {
            let line = &mut out[y as usize * stride..y as usize * stride + w as usize];
            for (x, px) in line.iter_mut().enumerate() {
                *px = self.pixels[self.layout.offset(x as u32, y)];
            }
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::pack_abgr;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| pack_abgr(x as u8, y as u8, (x ^ y) as u8, 0xFF)))
            .collect();
        PixelBuffer::from_pixels(width, height, pixels).unwrap()
    }

    #[test]
    fn test_surface_size_covers_tile_rows() {
        let surface = TiledSurface::new(1280, 720, TileLayout::SWITCH);
        assert_eq!(surface.as_slice().len(), 6 * 1280 * 128);
    }

    #[test]
    fn test_roundtrip_full_frame() {
        let src = gradient(1280, 720);
        let mut surface = TiledSurface::new(1280, 720, TileLayout::SWITCH);
        surface.blit(&src, 0, 0, false);

        let mut back = PixelBuffer::with_size(1280, 720);
        surface.detile_into(&mut back);
        assert_eq!(back, src);
    }

    #[test]
    fn test_roundtrip_with_offset() {
        let src = gradient(100, 200);
        let mut surface = TiledSurface::new(1280, 720, TileLayout::SWITCH);
        surface.blit(&src, 37, 90, false);

        for y in 0..200 {
            for x in 0..100 {
                assert_eq!(surface.pixel(37 + x, 90 + y), src.get_pixel(x as i32, y as i32));
            }
        }
        assert_eq!(surface.pixel(36, 90), Some(0));
    }

    #[test]
    fn test_blit_crops_to_surface() {
        let src = gradient(64, 64);
        let mut surface = TiledSurface::new(100, 100, TileLayout::SWITCH);
        surface.blit(&src, 80, 90, false);

        assert_eq!(surface.pixel(80, 90), src.get_pixel(0, 0));
        assert_eq!(surface.pixel(99, 99), src.get_pixel(19, 9));
        assert_eq!(surface.pixel(100, 99), None);

        // Nothing leaks into columns past the logical width
        let layout = *surface.layout();
        for y in 90..100 {
            for x in 100..120 {
                assert_eq!(surface.as_slice()[layout.offset(x, y)], 0);
            }
        }
    }

    #[test]
    fn test_blit_outside_surface_is_noop() {
        let src = gradient(8, 8);
        let mut surface = TiledSurface::new(64, 64, TileLayout::SWITCH);
        surface.blit(&src, 64, 0, false);
        surface.blit(&src, 0, 64, false);
        assert!(surface.as_slice().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_keyed_overlay_over_base() {
        let base = gradient(32, 32);
        let mut overlay = PixelBuffer::with_size(32, 32);
        overlay.fill_rect(8, 8, 4, 4, pack_abgr(200, 100, 50, 255));

        let mut surface = TiledSurface::new(32, 32, TileLayout::SWITCH);
        surface.blit(&base, 0, 0, false);
        surface.blit(&overlay, 0, 0, true);

        assert_eq!(surface.pixel(0, 0), base.get_pixel(0, 0));
        assert_eq!(surface.pixel(9, 9), Some(pack_abgr(200, 100, 50, 0)));
        assert_eq!(surface.pixel(12, 12), base.get_pixel(12, 12));
    }
}
