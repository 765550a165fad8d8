//! Address swizzling for block-tiled framebuffers
//!
//! The console GPU stores its scanout buffer in tiles whose interior is
//! bit-interleaved: the low bits of a pixel address are split between the X
//! and Y coordinate according to a fixed mask. Everything here works on
//! pixel indices, not bytes.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Parallel bit deposit
///
/// Scatters the low bits of `value` into the set bits of `mask`, lowest
/// first. Bits clear in `mask` are always zero in the result.
#[inline]
pub fn pdep(mask: u32, value: u32) -> u32 {
    let mut out = 0;
    let mut value = value;
    let mut remaining = mask;
    while remaining != 0 {
        let bit = remaining & remaining.wrapping_neg();
        if value & 1 != 0 {
            out |= bit;
        }
        value >>= 1;
        remaining &= remaining - 1;
    }
    out
}

/// Parallel bit extract, the inverse of [`pdep`]
///
/// Gathers the bits of `value` selected by `mask` into the low bits of the
/// result.
#[inline]
pub fn pext(mask: u32, value: u32) -> u32 {
    let mut out = 0;
    let mut shift = 0;
    let mut remaining = mask;
    while remaining != 0 {
        let bit = remaining & remaining.wrapping_neg();
        if value & bit != 0 {
            out |= 1 << shift;
        }
        shift += 1;
        remaining &= remaining - 1;
    }
    out
}

// ============================================================================
// Tile Layout
// ============================================================================

/// Describes one hardware tiling scheme
///
/// `y_mask` selects the address bits fed by the Y coordinate; every other
/// bit belongs to X. Tiles are `1 << popcount(y_mask)` rows tall and rows of
/// tiles are laid out across `padded_width` pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayout {
    pub y_mask: u32,
    pub tile_height: u32,
    pub padded_width: u32,
}

impl TileLayout {
    /// Scanout layout of the Switch display (1280 wide, 128-row tiles)
    pub const SWITCH: Self = Self {
        y_mask: 0x7B4,
        tile_height: 128,
        padded_width: 128 * 10,
    };

    #[inline]
    pub fn swizzle_x(&self, v: u32) -> u32 {
        pdep(!self.y_mask, v)
    }

    #[inline]
    pub fn swizzle_y(&self, v: u32) -> u32 {
        pdep(self.y_mask, v)
    }

    /// Address bits driven by X
    #[inline]
    pub fn x_mask(&self) -> u32 {
        self.swizzle_x(!0)
    }

    /// Address bits driven by Y
    #[inline]
    pub fn y_mask(&self) -> u32 {
        self.swizzle_y(!0)
    }

    /// Distance between the first pixels of two consecutive tile rows
    #[inline]
    pub fn row_increment(&self) -> u32 {
        self.swizzle_x(self.padded_width)
    }

    /// Width of a single tile in pixels: the X bits below the highest Y bit
    pub fn tile_width(&self) -> u32 {
        if self.y_mask == 0 {
            return 1;
        }
        let top = 31 - self.y_mask.leading_zeros();
        let below = if top == 31 {
            u32::MAX
        } else {
            (1u32 << (top + 1)) - 1
        };
        1 << (!self.y_mask & below).count_ones()
    }

    /// Tiled offset of linear pixel `(x, y)`
    ///
    /// Computed directly from the swizzle, without the incremental walk the
    /// blitter uses. Both must agree for every in-range coordinate.
    #[inline]
    pub fn offset(&self, x: u32, y: u32) -> usize {
        let row = (y / self.tile_height) as usize;
        self.swizzle_x(x) as usize
            + self.row_increment() as usize * row
            + self.swizzle_y(y % self.tile_height) as usize
    }

    /// Linear coordinate stored at tiled `offset`
    ///
    /// Only meaningful for offsets produced by [`TileLayout::offset`] with
    /// `x < padded_width`.
    pub fn coords(&self, offset: usize) -> (u32, u32) {
        let incr = self.row_increment().max(1) as usize;
        let row = (offset / incr) as u32;
        let local = (offset % incr) as u32;
        let x = pext(!self.y_mask, local);
        let y = row * self.tile_height + pext(self.y_mask, local);
        (x, y)
    }

    /// Pixels a tiled buffer needs so that every `(x, y)` below
    /// `(width, height)` is addressable
    pub fn surface_len(&self, width: u32, height: u32) -> usize {
        if width == 0 || height == 0 {
            return 0;
        }
        let tile_rows = height.div_ceil(self.tile_height) as usize;
        let by_rows = tile_rows * self.row_increment() as usize;
        by_rows.max(self.offset(width - 1, height - 1) + 1)
    }

    /// Reject layouts the incremental walk cannot traverse
    pub fn validate(&self) -> Result<()> {
        if self.y_mask == 0 {
            bail!("tile layout has an empty y mask");
        }
        if self.y_mask.count_ones() >= 31 {
            bail!("tile layout y mask {:#x} leaves no room for x", self.y_mask);
        }
        let rows = 1u32 << self.y_mask.count_ones();
        if self.tile_height != rows {
            bail!(
                "tile height {} does not match y mask {:#x} ({} rows)",
                self.tile_height,
                self.y_mask,
                rows
            );
        }
        let tile_width = self.tile_width();
        if self.padded_width == 0 || self.padded_width % tile_width != 0 {
            bail!(
                "padded width {} is not a multiple of the tile width {}",
                self.padded_width,
                tile_width
            );
        }
        Ok(())
    }
}

impl Default for TileLayout {
    fn default() -> Self {
        Self::SWITCH
    }
}
