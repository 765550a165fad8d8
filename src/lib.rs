//! Swizzled framebuffer presentation for block-tiled console displays.
//!
//! Frames are composed in linear [`PixelBuffer`]s, then written into a
//! [`TiledSurface`] through the hardware's bit-interleaved address layout by
//! [`swizzling_blit`].

pub mod blit;
pub mod compositor;
pub mod config;
pub mod display;
pub mod logger;
pub mod source;
pub mod swizzle;
pub mod tiled;
pub mod util;

pub use blit::{key_pixel, swizzling_blit};
pub use compositor::{FrameCompositor, Viewport};
pub use config::VideoConfig;
pub use display::PixelBuffer;
pub use swizzle::{pdep, pext, TileLayout};
pub use tiled::TiledSurface;
