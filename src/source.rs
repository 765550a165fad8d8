//! Synthetic frame producers standing in for an emulator core

use crate::display::{pack_abgr, PixelBuffer};
use crate::util::make_palette;

/// Something that renders emulated frames into a caller-sized buffer
pub trait FrameSource {
    /// Advance by `dt` seconds
    fn update(&mut self, dt: f32);

    /// Render the current frame
    fn render(&self, frame: &mut PixelBuffer);

    fn name(&self) -> &str;
}

/// Classic demoscene plasma
pub struct Plasma {
    time: f32,
    palette: Vec<u32>,
    sin_table: Vec<f32>,
}

impl Plasma {
    pub fn new() -> Self {
        // Pre-compute sine table for speed
        let sin_table: Vec<f32> = (0..256)
            .map(|i| (i as f32 * std::f32::consts::TAU / 256.0).sin())
            .collect();

        Self {
            time: 0.0,
            palette: make_palette(256)
                .into_iter()
                .map(|(r, g, b)| pack_abgr(r, g, b, 255))
                .collect(),
            sin_table,
        }
    }

    #[inline]
    fn fast_sin(&self, x: f32) -> f32 {
        let idx = ((x * 40.74) as i32 & 255) as usize;
        self.sin_table[idx]
    }
}

impl Default for Plasma {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for Plasma {
    fn update(&mut self, dt: f32) {
        self.time += dt;
    }

    fn render(&self, frame: &mut PixelBuffer) {
        let width = frame.width() as usize;
        let t = self.time;

        for (i, px) in frame.pixels_mut().iter_mut().enumerate() {
            let fx = (i % width) as f32;
            let fy = (i / width) as f32;

            let v1 = self.fast_sin(fx * 0.04 + t);
            let v2 = self.fast_sin(fy * 0.06 + t * 0.5);
            let v3 = self.fast_sin((fx + fy) * 0.04 + t * 0.7);
            let v4 = self.fast_sin(((fx * fx + fy * fy).sqrt() * 0.06) + t);

            let v = (v1 + v2 + v3 + v4 + 4.0) / 8.0; // Normalize to 0-1
            let idx = ((v * 255.0) as usize).min(255);
            *px = self.palette[idx];
        }
    }

    fn name(&self) -> &str {
        "Plasma"
    }
}

// SMPTE color bar colors (75% intensity)
const BARS: [(u8, u8, u8); 7] = [
    (191, 191, 191),
    (191, 191, 0),
    (0, 191, 191),
    (0, 191, 0),
    (191, 0, 191),
    (191, 0, 0),
    (0, 0, 191),
];

/// Static color bars with a rolling scanline, useful for checking the swizzle
/// by eye: any addressing mistake breaks the vertical bar edges.
pub struct ColorBars {
    time: f32,
}

impl ColorBars {
    pub fn new() -> Self {
        Self { time: 0.0 }
    }
}

impl Default for ColorBars {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for ColorBars {
    fn update(&mut self, dt: f32) {
        self.time += dt;
    }

    fn render(&self, frame: &mut PixelBuffer) {
        let width = frame.width();
        let height = frame.height();
        let bar_w = (width / BARS.len() as u32).max(1);

        for (i, &(r, g, b)) in BARS.iter().enumerate() {
            let x = i as u32 * bar_w;
            let w = if i == BARS.len() - 1 { width.saturating_sub(x) } else { bar_w };
            frame.fill_rect(x as i32, 0, w, height, pack_abgr(r, g, b, 255));
        }

        if height > 0 {
            let scan_y = (self.time * 60.0) as u32 % height;
            frame.fill_rect(0, scan_y as i32, width, 2, pack_abgr(255, 255, 255, 255));
        }
    }

    fn name(&self) -> &str {
        "Color Bars"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::alpha_of;

    #[test]
    fn test_plasma_fills_opaque() {
        let mut plasma = Plasma::new();
        plasma.update(0.5);
        let mut frame = PixelBuffer::with_size(32, 16);
        plasma.render(&mut frame);
        assert!(frame.pixels().iter().all(|&p| alpha_of(p) == 255));
    }

    #[test]
    fn test_color_bars_edges() {
        let bars = ColorBars::new();
        let mut frame = PixelBuffer::with_size(70, 10);
        bars.render(&mut frame);
        assert_eq!(frame.get_pixel(0, 5), Some(pack_abgr(191, 191, 191, 255)));
        assert_eq!(frame.get_pixel(10, 5), Some(pack_abgr(191, 191, 0, 255)));
        assert_eq!(frame.get_pixel(69, 5), Some(pack_abgr(0, 0, 191, 255)));
        // Scanline at the top when time is zero
        assert_eq!(frame.get_pixel(35, 0), Some(pack_abgr(255, 255, 255, 255)));
    }
}
