//! Linear-to-tiled blitter
//!
//! Walks the destination in swizzled address space with masked decrements
//! instead of recomputing the swizzle for every pixel.

use crate::swizzle::TileLayout;

/// Alpha byte of an ABGR pixel
const ALPHA_MASK: u32 = 0xFF00_0000;

/// Binary color key used when blending
///
/// Any non-zero source alpha draws the source RGB with the alpha byte
/// cleared; zero alpha keeps the destination. There is no partial
/// transparency.
#[inline]
pub fn key_pixel(src: u32, dst: u32) -> u32 {
    if src & ALPHA_MASK != 0 {
        src & !ALPHA_MASK
    } else {
        dst
    }
}

/// Copy a `width` x `height` linear image into a tiled buffer at
/// `(origin_x, origin_y)`
///
/// `src` is read once in raster order. With `blend` set, pixels are combined
/// through [`key_pixel`].
///
/// No range checks are made up front. The caller clamps the rectangle to the
/// surface and sizes `dest` with [`TileLayout::surface_len`]; an address past
/// the end of `dest` panics on the slice index.
pub fn swizzling_blit(
    dest: &mut [u32],
    src: &[u32],
    width: u32,
    height: u32,
    origin_x: u32,
    origin_y: u32,
    blend: bool,
    layout: &TileLayout,
) {
    debug_assert!(src.len() >= width as usize * height as usize);

    let x_mask = layout.x_mask();
    let y_mask = layout.y_mask();
    let incr_y = layout.row_increment();

    let mut offs_x0 = layout
        .swizzle_x(origin_x)
        .wrapping_add(incr_y.wrapping_mul(origin_y / layout.tile_height));
    let mut offs_y = layout.swizzle_y(origin_y);

    let mut pixels = src.iter().copied();
    for _ in 0..height {
        let mut offs_x = offs_x0;
        let line = offs_y as usize;

        for pixel in pixels.by_ref().take(width as usize) {
            let idx = line + offs_x as usize;
            dest[idx] = if blend {
                key_pixel(pixel, dest[idx])
            } else {
                pixel
            };
            offs_x = offs_x.wrapping_sub(x_mask) & x_mask;
        }

        offs_y = offs_y.wrapping_sub(y_mask) & y_mask;
        if offs_y == 0 {
            // wrapped into the next tile row
            offs_x0 = offs_x0.wrapping_add(incr_y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Interleave the bits of x and y one address bit at a time
    fn interleave(layout: &TileLayout, x: u32, y: u32) -> usize {
        let (mut x, mut y) = (x, y);
        let mut addr = 0usize;
        for bit in 0..32 {
            let from_y = layout.y_mask & (1 << bit) != 0;
            let source = if from_y { &mut y } else { &mut x };
            addr |= ((*source & 1) as usize) << bit;
            *source >>= 1;
        }
        addr
    }

    /// Single 16x128 tile per tile row
    fn one_tile_layout() -> TileLayout {
        TileLayout {
            padded_width: 16,
            ..TileLayout::SWITCH
        }
    }

    fn pattern(width: u32, height: u32) -> Vec<u32> {
        (0..width * height).map(|i| 0xFF00_0000 | (i + 1)).collect()
    }

    #[test]
    fn test_key_pixel() {
        assert_eq!(key_pixel(0xFF11_2233, 0x0044_5566), 0x0011_2233);
        assert_eq!(key_pixel(0x0111_2233, 0x0044_5566), 0x0011_2233);
        assert_eq!(key_pixel(0x0011_2233, 0xAA44_5566), 0xAA44_5566);
    }

    #[test]
    fn test_4x4_matches_bit_interleave() {
        let layout = one_tile_layout();
        let src: Vec<u32> = [
            0xFF000050, 0xFF000080, 0xFF000040, 0xFF000088, 0xFF000011, 0xFF000012, 0xFF000013,
            0xFF000014, 0xFF000021, 0xFF000022, 0xFF000023, 0xFF000024, 0xFF000031, 0xFF000032,
            0xFF000033, 0xFF000034,
        ]
        .to_vec();
        let mut dest = vec![0u32; 2048];

        swizzling_blit(&mut dest, &src, 4, 4, 0, 0, false, &layout);

        for y in 0..4 {
            for x in 0..4 {
                let addr = interleave(&layout, x, y);
                assert_eq!(addr, layout.offset(x, y));
                assert_eq!(dest[addr], src[(y * 4 + x) as usize], "pixel ({}, {})", x, y);
            }
        }
        assert_eq!(dest.iter().filter(|&&p| p != 0).count(), 16);
    }

    #[test]
    fn test_walk_matches_reference_offset_at_origin() {
        let layout = TileLayout::SWITCH;
        let (w, h, ox, oy) = (40, 20, 9, 120);
        let src = pattern(w, h);
        let mut dest = vec![0u32; layout.surface_len(ox + w, oy + h)];

        swizzling_blit(&mut dest, &src, w, h, ox, oy, false, &layout);

        for y in 0..h {
            for x in 0..w {
                let addr = layout.offset(ox + x, oy + y);
                assert_eq!(dest[addr], src[(y * w + x) as usize]);
            }
        }
    }

    #[test]
    fn test_wrap_into_next_tile_row_once() {
        let layout = TileLayout::SWITCH;
        let (w, h) = (2, 130);
        let src = pattern(w, h);
        let row_incr = layout.row_increment() as usize;
        let mut dest = vec![0u32; 3 * row_incr];

        swizzling_blit(&mut dest, &src, w, h, 0, 0, false, &layout);

        // Rows 0..128 stay in the first tile row
        for y in 0..128 {
            for x in 0..w {
                let addr = layout.offset(x, y);
                assert!(addr < row_incr);
                assert_eq!(dest[addr], src[(y * w + x) as usize]);
            }
        }
        // Rows 128 and 129 land at the start of the second tile row
        for y in 128..130 {
            for x in 0..w {
                let addr = row_incr + layout.swizzle_x(x) as usize + layout.swizzle_y(y - 128) as usize;
                assert_eq!(dest[addr], src[(y * w + x) as usize]);
            }
        }
        let second = dest[row_incr..2 * row_incr].iter().filter(|&&p| p != 0).count();
        assert_eq!(second, 4);
        assert!(dest[2 * row_incr..].iter().all(|&p| p == 0));
    }

    #[test]
    fn test_origin_in_later_tile_row() {
        let layout = TileLayout::SWITCH;
        let src = pattern(3, 3);
        let mut dest = vec![0u32; layout.surface_len(1280, 400)];

        swizzling_blit(&mut dest, &src, 3, 3, 1200, 300, false, &layout);

        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(dest[layout.offset(1200 + x, 300 + y)], src[(y * 3 + x) as usize]);
            }
        }
    }

    #[test]
    fn test_reblit_is_idempotent() {
        let layout = TileLayout::SWITCH;
        let src = pattern(64, 64);
        let mut once = vec![0u32; layout.surface_len(64, 64)];
        swizzling_blit(&mut once, &src, 64, 64, 0, 0, false, &layout);
        let mut twice = once.clone();
        swizzling_blit(&mut twice, &src, 64, 64, 0, 0, false, &layout);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_blend_transparent_source_leaves_destination() {
        let layout = TileLayout::SWITCH;
        let len = layout.surface_len(32, 32);
        let before: Vec<u32> = (0..len as u32).map(|i| i.wrapping_mul(2654435761)).collect();
        let mut dest = before.clone();
        let src: Vec<u32> = (0..32 * 32).map(|i| i & 0x00FF_FFFF).collect();

        swizzling_blit(&mut dest, &src, 32, 32, 0, 0, true, &layout);

        assert_eq!(dest, before);
    }

    #[test]
    fn test_blend_opaque_source_matches_copy_without_alpha() {
        let layout = TileLayout::SWITCH;
        let len = layout.surface_len(32, 32);
        let src: Vec<u32> = (0..32 * 32).map(|i| 0x0100_0000 | (i * 0x0001_0203)).collect();

        let mut copied = vec![0x1234_5678; len];
        swizzling_blit(&mut copied, &src, 32, 32, 0, 0, false, &layout);
        let mut blended = vec![0x1234_5678; len];
        swizzling_blit(&mut blended, &src, 32, 32, 0, 0, true, &layout);

        for (c, b) in copied.iter().zip(&blended) {
            assert_eq!(c & 0x00FF_FFFF, *b & 0x00FF_FFFF);
        }
        for y in 0..32 {
            for x in 0..32 {
                assert_eq!(blended[layout.offset(x, y)] & 0xFF00_0000, 0);
            }
        }
    }

    #[test]
    #[should_panic]
    fn test_undersized_destination_panics() {
        let layout = TileLayout::SWITCH;
        let src = pattern(16, 16);
        let mut dest = vec![0u32; 16];
        swizzling_blit(&mut dest, &src, 16, 16, 0, 0, false, &layout);
    }
}
