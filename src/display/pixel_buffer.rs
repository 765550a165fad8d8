// ============================================================================
// Pixel Packing
// ============================================================================

/// Pack channels into an ABGR pixel (R in the low byte, A in the high byte)
#[inline]
pub const fn pack_abgr(r: u8, g: u8, b: u8, a: u8) -> u32 {
    u32::from_le_bytes([r, g, b, a])
}

/// Split an ABGR pixel into (r, g, b, a)
#[inline]
pub const fn unpack_abgr(pixel: u32) -> (u8, u8, u8, u8) {
    let [r, g, b, a] = pixel.to_le_bytes();
    (r, g, b, a)
}

/// Alpha byte of an ABGR pixel
#[inline]
pub const fn alpha_of(pixel: u32) -> u8 {
    (pixel >> 24) as u8
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// Linear ABGR8888 pixel buffer, row-major with stride = width
///
/// Frames, menu textures and overlays are composed here before being
/// swizzled into a [`TiledSurface`](crate::tiled::TiledSurface).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: Vec<u32>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Create a zeroed (fully transparent) buffer
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Wrap existing pixels. Returns None if the length does not match.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            pixels,
            width,
            height,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check if coordinates are within bounds
    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Fill every pixel with the same value
    pub fn clear(&mut self, pixel: u32) {
        self.pixels.fill(pixel);
    }

    /// Set a single pixel (bounds checked)
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, pixel: u32) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            self.pixels[idx] = pixel;
        }
    }

    /// Read a single pixel, None if out of bounds
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u32> {
        if self.in_bounds(x, y) {
            Some(self.pixels[self.pixel_index(x as u32, y as u32)])
        } else {
            None
        }
    }

    /// Fill a rectangle, clipped to the buffer
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, pixel: u32) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w as i32).min(self.width as i32);
        let y1 = (y + h as i32).min(self.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        for row in y0..y1 {
            let start = self.pixel_index(x0 as u32, row as u32);
            let end = start + (x1 - x0) as usize;
            self.pixels[start..end].fill(pixel);
        }
    }

    /// Draw a one pixel rectangle outline
    pub fn draw_rect(&mut self, x: i32, y: i32, w: u32, h: u32, pixel: u32) {
        if w == 0 || h == 0 {
            return;
        }
        self.fill_rect(x, y, w, 1, pixel);
        self.fill_rect(x, y + h as i32 - 1, w, 1, pixel);
        self.fill_rect(x, y, 1, h, pixel);
        self.fill_rect(x + w as i32 - 1, y, 1, h, pixel);
    }

    /// Copy contents from another buffer (must be same size)
    pub fn copy_from(&mut self, src: &PixelBuffer) {
        if self.pixels.len() == src.pixels.len() {
            self.pixels.copy_from_slice(&src.pixels);
        }
    }

    /// One row of pixels
    #[inline]
    pub fn row(&self, y: u32) -> &[u32] {
        let start = self.pixel_index(0, y);
        &self.pixels[start..start + self.width as usize]
    }

    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Raw bytes for SDL texture upload
    pub fn as_bytes(&self) -> &[u8] {
        // Safety: u32 has no padding and any byte pattern is a valid u8; the
        // byte slice covers exactly the same allocation as `pixels`.
        unsafe {
            std::slice::from_raw_parts(
                self.pixels.as_ptr().cast::<u8>(),
                self.pixels.len() * std::mem::size_of::<u32>(),
            )
        }
    }
}
