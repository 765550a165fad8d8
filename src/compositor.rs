//! Frame composition ahead of the swizzle
//!
//! Owns the full-resolution linear scratch images (game image, menu image,
//! background) and decides which of them get swizzled into the scanout
//! surface each frame.

use log::{debug, info};

use crate::display::PixelBuffer;
use crate::tiled::TiledSurface;

/// Only every Nth frame is presented while fast-forwarding
const FAST_FORWARD_INTERVAL: u64 = 4;

/// Placement of the emulated frame inside the full-resolution image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub full_width: u32,
    pub full_height: u32,
}

impl Viewport {
    /// A `width` x `height` viewport centred in the full extent
    pub fn centered(full_width: u32, full_height: u32, width: u32, height: u32) -> Self {
        let width = width.min(full_width);
        let height = height.min(full_height);
        Self {
            x: (full_width - width) / 2,
            y: (full_height - height) / 2,
            width,
            height,
            full_width,
            full_height,
        }
    }

    /// Keep the viewport inside the full extent
    pub fn clamp(self) -> Self {
        let width = self.width.min(self.full_width);
        let height = self.height.min(self.full_height);
        Self {
            x: self.x.min(self.full_width - width),
            y: self.y.min(self.full_height - height),
            width,
            height,
            ..self
        }
    }
}

/// Nearest-neighbour scale of `src` into the `dst_w` x `dst_h` rectangle at
/// (`dst_x`, `dst_y`)
fn scale_point(src: &PixelBuffer, dst: &mut PixelBuffer, dst_x: u32, dst_y: u32, dst_w: u32, dst_h: u32) {
    if src.width() == 0 || src.height() == 0 || dst_w == 0 || dst_h == 0 {
        return;
    }
    let stride = dst.width() as usize;
    let out = dst.pixels_mut();
    for dy in 0..dst_h {
        let sy = (u64::from(dy) * u64::from(src.height()) / u64::from(dst_h)) as u32;
        let src_row = src.row(sy);
        let start = (dst_y + dy) as usize * stride + dst_x as usize;
        for (dx, px) in out[start..start + dst_w as usize].iter_mut().enumerate() {
            let sx = (dx as u64 * u64::from(src.width()) / u64::from(dst_w)) as usize;
            *px = src_row[sx];
        }
    }
}

/// Largest whole-number scale factor that fits `w` x `h` into the full extent
pub fn integer_scale(full_width: u32, full_height: u32, w: u32, h: u32) -> u32 {
    if w == 0 || h == 0 {
        return 1;
    }
    (full_width / w).min(full_height / h).max(1)
}

/// Builds each presented frame from the game image, an optional menu and an
/// optional keyed overlay
pub struct FrameCompositor {
    viewport: Viewport,
    image: PixelBuffer,
    menu_image: PixelBuffer,
    background: PixelBuffer,
    overlay: Option<PixelBuffer>,
    menu_enabled: bool,
    fast_forward: bool,
    needs_clear: bool,
}

impl FrameCompositor {
    pub fn new(full_width: u32, full_height: u32) -> Self {
        Self {
            viewport: Viewport::centered(full_width, full_height, full_width, full_height),
            image: PixelBuffer::with_size(full_width, full_height),
            menu_image: PixelBuffer::with_size(full_width, full_height),
            background: PixelBuffer::with_size(full_width, full_height),
            overlay: None,
            menu_enabled: false,
            fast_forward: false,
            needs_clear: true,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Replace the viewport; the game image is cleared before the next frame
    pub fn set_viewport(&mut self, viewport: Viewport) {
        let viewport = Viewport {
            full_width: self.image.width(),
            full_height: self.image.height(),
            ..viewport
        }
        .clamp();
        if viewport != self.viewport {
            info!(
                "viewport {}x{} at ({}, {}) in {}x{}",
                viewport.width,
                viewport.height,
                viewport.x,
                viewport.y,
                viewport.full_width,
                viewport.full_height
            );
        }
        self.viewport = viewport;
        self.needs_clear = true;
    }

    /// Scale an emulated frame into the viewport
    pub fn submit_frame(&mut self, frame: &PixelBuffer) {
        if frame.width() == 0 || frame.height() == 0 {
            return;
        }
        if self.needs_clear {
            self.image.clear(0);
            self.needs_clear = false;
        }
        let vp = self.viewport;
        scale_point(frame, &mut self.image, vp.x, vp.y, vp.width, vp.height);
    }

    /// Image shown behind the menu, stretched to the full extent
    pub fn set_background(&mut self, background: &PixelBuffer) {
        let full_w = self.background.width();
        let full_h = self.background.height();
        if background.width() == full_w && background.height() == full_h {
            self.background.copy_from(background);
            return;
        }
        self.background.clear(0);
        scale_point(background, &mut self.background, 0, 0, full_w, full_h);
    }

    /// Show (or hide with None) a menu texture, integer-scaled and centred
    pub fn set_menu_texture(&mut self, texture: Option<&PixelBuffer>) {
        let Some(texture) = texture else {
            self.menu_enabled = false;
            return;
        };
        let full_w = self.menu_image.width();
        let full_h = self.menu_image.height();
        let sf = integer_scale(full_w, full_h, texture.width(), texture.height());
        let tgt_w = (texture.width() * sf).min(full_w);
        let tgt_h = (texture.height() * sf).min(full_h);
        debug!(
            "menu texture {}x{} scaled x{} to {}x{}",
            texture.width(),
            texture.height(),
            sf,
            tgt_w,
            tgt_h
        );

        self.menu_image.clear(0);
        scale_point(
            texture,
            &mut self.menu_image,
            (full_w - tgt_w) / 2,
            (full_h - tgt_h) / 2,
            tgt_w,
            tgt_h,
        );
        self.menu_enabled = true;
    }

    pub fn menu_enabled(&self) -> bool {
        self.menu_enabled
    }

    /// Full-screen overlay keyed over the game image
    pub fn set_overlay(&mut self, overlay: Option<PixelBuffer>) {
        self.overlay = overlay;
    }

    /// Mutable access to the overlay for drawing on-screen text or widgets
    pub fn overlay_mut(&mut self) -> Option<&mut PixelBuffer> {
        self.overlay.as_mut()
    }

    pub fn set_fast_forward(&mut self, enabled: bool) {
        self.fast_forward = enabled;
    }

    pub fn fast_forward(&self) -> bool {
        self.fast_forward
    }

    /// Whether frame `frame_count` will be shown
    ///
    /// Callers check this before scaling a frame in so skipped frames cost
    /// nothing while fast-forwarding.
    pub fn should_present(&self, frame_count: u64) -> bool {
        !self.fast_forward || frame_count % FAST_FORWARD_INTERVAL == 0
    }

    /// Swizzle the current frame into `surface`
    ///
    /// Returns false when the frame is skipped by fast-forward.
    pub fn present(&self, frame_count: u64, surface: &mut TiledSurface) -> bool {
        if !self.should_present(frame_count) {
            return false;
        }

        if self.menu_enabled {
            surface.blit(&self.background, 0, 0, false);
            surface.blit(&self.menu_image, 0, 0, true);
        } else {
            surface.blit(&self.image, 0, 0, false);
            if let Some(overlay) = &self.overlay {
                surface.blit(overlay, 0, 0, true);
            }
        }
        true
    }
}
