//! Region masking: exclude dynamic areas from comparison.
//!
//! Masked pixels are zeroed on all four channels, so two masked rasters agree
//! on every masked pixel and the differ never flags them. The number of
//! previously opaque pixels cleared is what the comparator subtracts from the
//! relevant-pixel count.

use crate::options::ComparisonOptions;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in device pixels.
///
/// Used both for the bounding box (compare only inside) and for ignore
/// regions (never compare inside).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    /// Left edge
    pub left: u32,
    /// Top edge
    pub top: u32,
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}

impl Region {
    /// Create a new region
    #[must_use]
    pub const fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// All four fields zero; an unset bounding box.
    #[must_use]
    pub const fn is_unset(&self) -> bool {
        self.left == 0 && self.top == 0 && self.width == 0 && self.height == 0
    }

    /// Exclusive right edge
    #[must_use]
    pub const fn right(&self) -> u64 {
        self.left as u64 + self.width as u64
    }

    /// Exclusive bottom edge
    #[must_use]
    pub const fn bottom(&self) -> u64 {
        self.top as u64 + self.height as u64
    }

    /// Area in pixels
    #[must_use]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Check if a point is within this region
    #[must_use]
    pub const fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.left
            && (px as u64) < self.right()
            && py >= self.top
            && (py as u64) < self.bottom()
    }
}

/// Zero every pixel in `[x0, x1) x [y0, y1)` and count the ones that were opaque.
///
/// Coordinates are clamped to the raster and each axis is min/max normalized,
/// so callers may pass corners in either order or partly out of range.
/// Returns how many pixels had alpha > 0 before clearing.
pub fn clear_rect(raster: &mut RgbaImage, x0: i64, y0: i64, x1: i64, y1: i64) -> u64 {
    let width = i64::from(raster.width());
    let height = i64::from(raster.height());

    let (xa, xb) = (x0.clamp(0, width), x1.clamp(0, width));
    let (ya, yb) = (y0.clamp(0, height), y1.clamp(0, height));
    let (left, right) = (xa.min(xb) as usize, xa.max(xb) as usize);
    let (top, bottom) = (ya.min(yb) as usize, ya.max(yb) as usize);

    if left == right || top == bottom {
        return 0;
    }

    let stride = width as usize * 4;
    let buf: &mut [u8] = raster;
    let mut cleared = 0u64;

    for y in top..bottom {
        let row = &mut buf[y * stride + left * 4..y * stride + right * 4];
        for px in row.chunks_exact_mut(4) {
            if px[3] > 0 {
                cleared += 1;
            }
            px.fill(0);
        }
    }

    cleared
}

/// Clear a [`Region`] through [`clear_rect`].
pub fn clear_region(raster: &mut RgbaImage, region: &Region) -> u64 {
    clear_rect(
        raster,
        i64::from(region.left),
        i64::from(region.top),
        region.right() as i64,
        region.bottom() as i64,
    )
}

/// Clear everything outside `bounds`.
///
/// The complement is covered by four rectangles that never overlap:
/// a full-height strip left of the box, then top, bottom and right strips
/// starting at the box's left edge.
pub fn clear_outside(raster: &mut RgbaImage, bounds: &Region) -> u64 {
    let w = i64::from(raster.width());
    let h = i64::from(raster.height());
    let left = i64::from(bounds.left);
    let top = i64::from(bounds.top);
    let right = bounds.right() as i64;
    let bottom = bounds.bottom() as i64;

    clear_rect(raster, 0, 0, left, h)
        + clear_rect(raster, left, 0, w, top)
        + clear_rect(raster, left, bottom, w, h)
        + clear_rect(raster, right, top, w, bottom)
}

/// Apply the comparison's bounding box and ignore regions to `raster`.
///
/// Returns the total number of opaque pixels cleared, i.e. the pixels
/// excluded from the relevant set.
pub fn apply_mask(raster: &mut RgbaImage, options: &ComparisonOptions) -> u64 {
    let mut cleared = 0;

    if !options.bounding_box.is_unset() {
        cleared += clear_outside(raster, &options.bounding_box);
    }

    for region in &options.ignore_regions {
        cleared += clear_region(raster, region);
    }

    cleared
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use image::Rgba;

    fn opaque(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]))
    }

    fn transparent_count(img: &RgbaImage) -> usize {
        img.pixels().filter(|p| p.0 == [0, 0, 0, 0]).count()
    }

    mod clear_rect_tests {
        use super::*;

        #[test]
        fn test_clears_and_counts_opaque_pixels() {
            let mut img = RgbaImage::from_pixel(4, 4, Rgba([200, 100, 50, 255]));
            let cleared = clear_rect(&mut img, 1, 1, 3, 3);
            assert_eq!(cleared, 4);
            assert_eq!(img.get_pixel(1, 1).0, [0, 0, 0, 0]);
            assert_eq!(img.get_pixel(2, 2).0, [0, 0, 0, 0]);
            assert_eq!(img.get_pixel(0, 0).0, [200, 100, 50, 255]);
            assert_eq!(img.get_pixel(3, 3).0, [200, 100, 50, 255]);
        }

        #[test]
        fn test_reversed_corners_are_normalized() {
            let mut a = opaque(5, 5);
            let mut b = opaque(5, 5);
            assert_eq!(clear_rect(&mut a, 1, 1, 4, 3), 6);
            assert_eq!(clear_rect(&mut b, 4, 3, 1, 1), 6);
            assert_eq!(a, b);
        }

        #[test]
        fn test_out_of_range_is_clamped() {
            let mut img = opaque(3, 3);
            let cleared = clear_rect(&mut img, -10, -10, 100, 100);
            assert_eq!(cleared, 9);
            assert_eq!(transparent_count(&img), 9);
        }

        #[test]
        fn test_entirely_outside_is_noop() {
            let mut img = opaque(3, 3);
            assert_eq!(clear_rect(&mut img, 5, 5, 9, 9), 0);
            assert_eq!(transparent_count(&img), 0);
        }

        #[test]
        fn test_zero_width_is_noop() {
            let mut img = opaque(3, 3);
            assert_eq!(clear_rect(&mut img, 1, 0, 1, 3), 0);
            assert_eq!(clear_rect(&mut img, 0, 2, 3, 2), 0);
            assert_eq!(transparent_count(&img), 0);
        }

        #[test]
        fn test_transparent_pixels_are_cleared_but_not_counted() {
            let mut img = opaque(2, 1);
            img.put_pixel(0, 0, Rgba([9, 9, 9, 0]));
            assert_eq!(clear_rect(&mut img, 0, 0, 2, 1), 1);
            assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 0]);
        }

        #[test]
        fn test_second_clear_counts_zero() {
            let mut img = opaque(6, 6);
            assert_eq!(clear_rect(&mut img, 0, 0, 3, 3), 9);
            assert_eq!(clear_rect(&mut img, 0, 0, 3, 3), 0);
        }
    }

    mod apply_mask_tests {
        use super::*;

        fn options(bounds: Region, ignore: Vec<Region>) -> ComparisonOptions {
            ComparisonOptions {
                bounding_box: bounds,
                ignore_regions: ignore,
                ..ComparisonOptions::default()
            }
        }

        #[test]
        fn test_unset_bounds_and_no_ignores_clears_nothing() {
            let mut img = opaque(10, 10);
            assert_eq!(apply_mask(&mut img, &ComparisonOptions::default()), 0);
            assert_eq!(transparent_count(&img), 0);
        }

        #[test]
        fn test_left_half_bounds_excludes_right_half() {
            let mut img = opaque(10, 10);
            let cleared = apply_mask(&mut img, &options(Region::new(0, 0, 5, 10), vec![]));
            assert_eq!(cleared, 50);
            assert_eq!(img.get_pixel(4, 9).0[3], 255);
            assert_eq!(img.get_pixel(5, 0).0[3], 0);
        }

        #[test]
        fn test_centered_bounds_keeps_only_box() {
            let mut img = opaque(10, 8);
            let bounds = Region::new(2, 3, 4, 2);
            let cleared = apply_mask(&mut img, &options(bounds, vec![]));
            assert_eq!(cleared + bounds.area(), 80);
            for (x, y, px) in img.enumerate_pixels() {
                assert_eq!(px.0[3] == 255, bounds.contains(x, y), "pixel {x},{y}");
            }
        }

        #[test]
        fn test_bounds_past_raster_edge() {
            let mut img = opaque(10, 10);
            let cleared = apply_mask(&mut img, &options(Region::new(6, 6, 20, 20), vec![]));
            assert_eq!(cleared, 100 - 16);
        }

        #[test]
        fn test_overlapping_ignores_count_once() {
            let mut img = opaque(10, 10);
            let cleared = apply_mask(
                &mut img,
                &options(
                    Region::default(),
                    vec![Region::new(0, 0, 4, 4), Region::new(2, 2, 4, 4)],
                ),
            );
            assert_eq!(cleared, 16 + 16 - 4);
            assert_eq!(transparent_count(&img), 28);
        }

        #[test]
        fn test_ignore_inside_excluded_bounds_area_adds_nothing() {
            let mut img = opaque(10, 10);
            let cleared = apply_mask(
                &mut img,
                &options(Region::new(0, 0, 5, 10), vec![Region::new(6, 0, 2, 2)]),
            );
            assert_eq!(cleared, 50);
        }

        #[test]
        fn test_ignore_within_bounds_accumulates() {
            let mut img = opaque(10, 10);
            let cleared = apply_mask(
                &mut img,
                &options(Region::new(0, 0, 5, 10), vec![Region::new(0, 0, 2, 5)]),
            );
            assert_eq!(cleared, 60);
        }
    }

    mod region_tests {
        use super::*;

        #[test]
        fn test_region_unset() {
            assert!(Region::default().is_unset());
            assert!(!Region::new(0, 0, 0, 1).is_unset());
            assert!(!Region::new(3, 0, 0, 0).is_unset());
        }

        #[test]
        fn test_region_contains_edges() {
            let r = Region::new(10, 10, 5, 5);
            assert!(r.contains(10, 10));
            assert!(r.contains(14, 14));
            assert!(!r.contains(15, 10));
            assert!(!r.contains(9, 12));
        }

        #[test]
        fn test_region_edges_do_not_overflow() {
            let r = Region::new(u32::MAX, u32::MAX, u32::MAX, 1);
            assert_eq!(r.right(), u64::from(u32::MAX) * 2);
            assert_eq!(r.bottom(), u64::from(u32::MAX) + 1);
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_clear_is_idempotent(
                x0 in -5i64..25, y0 in -5i64..25,
                x1 in -5i64..25, y1 in -5i64..25,
            ) {
                let mut img = opaque(16, 12);
                let first = clear_rect(&mut img, x0, y0, x1, y1);
                prop_assert_eq!(first as usize, transparent_count(&img));

                let snapshot = img.clone();
                prop_assert_eq!(clear_rect(&mut img, x0, y0, x1, y1), 0);
                prop_assert_eq!(img, snapshot);
            }

            #[test]
            fn prop_bounds_conserve_area(
                w in 1u32..32, h in 1u32..32,
                l in 0u32..1000, t in 0u32..1000,
                bw in 0u32..1000, bh in 0u32..1000,
            ) {
                let left = l % w;
                let top = t % h;
                let bounds = Region::new(left, top, 1 + bw % (w - left), 1 + bh % (h - top));

                let mut img = opaque(w, h);
                let cleared = clear_outside(&mut img, &bounds);
                prop_assert_eq!(cleared + bounds.area(), u64::from(w) * u64::from(h));
                prop_assert_eq!(transparent_count(&img) as u64, cleared);
            }
        }
    }
}
