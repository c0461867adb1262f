//! Perceptual per-pixel diff (pixelmatch algorithm).
//!
//! Pixels are compared in YIQ space (Kotsarenko & Ramos, "Measuring perceived
//! color difference using YIQ NTSC transmission color space in mobile
//! applications"), and pixels that look like anti-aliasing artifacts can be
//! left out of the mismatch count (Vysniauskas, "Anti-aliased Pixel and
//! Intensity Slope Detector", 2009).
//!
//! Semi-transparent pixels are blended over white before comparison, so two
//! fully cleared (all-zero) pixels always compare equal.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// 8-bit RGB color
pub type Rgb = [u8; 3];

/// Maximum possible value of the YIQ delta metric.
const MAX_YIQ_DELTA: f64 = 35215.0;

/// Parameters of the pixel differ.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiffArgs {
    /// Matching threshold (0 to 1); smaller is more sensitive
    pub threshold: f64,
    /// Opacity of the faded original image in the diff output
    pub alpha: f64,
    /// Count anti-aliased pixels as differences
    pub include_anti_aliasing: bool,
    /// Draw the diff over a transparent background
    pub diff_mask: bool,
    /// Color of anti-aliased pixels in the diff output
    pub anti_alias_color: Rgb,
    /// Color of differing pixels in the diff output
    pub diff_color: Rgb,
    /// Color of pixels that got darker in the second image, if set
    pub diff_color_alt: Option<Rgb>,
}

impl Default for DiffArgs {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            alpha: 0.1,
            include_anti_aliasing: false,
            diff_mask: false,
            anti_alias_color: [255, 255, 0],
            diff_color: [255, 0, 0],
            diff_color_alt: None,
        }
    }
}

impl DiffArgs {
    /// Set the matching threshold
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Count anti-aliased pixels as differences
    #[must_use]
    pub const fn with_anti_aliasing(mut self, include: bool) -> Self {
        self.include_anti_aliasing = include;
        self
    }

    /// Draw only the differences, on a transparent background
    #[must_use]
    pub const fn with_diff_mask(mut self, diff_mask: bool) -> Self {
        self.diff_mask = diff_mask;
        self
    }
}

/// Compare two equally sized rasters.
///
/// Returns the number of differing pixels and the diff raster. The caller
/// guarantees equal dimensions.
pub fn pixel_diff(img1: &RgbaImage, img2: &RgbaImage, args: &DiffArgs) -> (u64, RgbaImage) {
    debug_assert_eq!(img1.dimensions(), img2.dimensions());

    let (width, height) = img1.dimensions();
    let mut output = RgbaImage::new(width, height);

    if img1.as_raw() == img2.as_raw() {
        if !args.diff_mask {
            for (src, dst) in img1.pixels().zip(output.pixels_mut()) {
                *dst = gray_pixel(*src, args.alpha);
            }
        }
        return (0, output);
    }

    let max_delta = MAX_YIQ_DELTA * args.threshold * args.threshold;
    let mut diff = 0u64;

    for y in 0..height {
        for x in 0..width {
            let pixel1 = *img1.get_pixel(x, y);
            let pixel2 = *img2.get_pixel(x, y);
            let delta = color_delta(pixel1, pixel2, false);

            if delta.abs() > max_delta {
                if !args.include_anti_aliasing
                    && (antialiased(img1, x, y, img2) || antialiased(img2, x, y, img1))
                {
                    // anti-aliasing is drawn but never counted, and never part of a mask
                    if !args.diff_mask {
                        output.put_pixel(x, y, solid(args.anti_alias_color));
                    }
                } else {
                    let color = if delta < 0.0 {
                        args.diff_color_alt.unwrap_or(args.diff_color)
                    } else {
                        args.diff_color
                    };
                    output.put_pixel(x, y, solid(color));
                    diff += 1;
                }
            } else if !args.diff_mask {
                output.put_pixel(x, y, gray_pixel(pixel1, args.alpha));
            }
        }
    }

    (diff, output)
}

fn solid([r, g, b]: Rgb) -> Rgba<u8> {
    Rgba([r, g, b, 255])
}

fn gray_pixel(Rgba([r, g, b, a]): Rgba<u8>, alpha: f64) -> Rgba<u8> {
    let val = blend(rgb2y(f64::from(r), f64::from(g), f64::from(b)), alpha * f64::from(a) / 255.0);
    let val = val.clamp(0.0, 255.0) as u8;
    Rgba([val, val, val, 255])
}

/// Bounds of the 3x3 neighbourhood around `(x, y)`, clipped to the raster.
fn neighbourhood(x: u32, y: u32, width: u32, height: u32) -> (u32, u32, u32, u32) {
    (
        x.saturating_sub(1),
        y.saturating_sub(1),
        (x + 1).min(width - 1),
        (y + 1).min(height - 1),
    )
}

const fn on_edge(x: u32, y: u32, width: u32, height: u32) -> bool {
    x == 0 || y == 0 || x == width - 1 || y == height - 1
}

/// Whether the pixel at `(x, y)` in `img1` is likely part of anti-aliasing.
fn antialiased(img1: &RgbaImage, x: u32, y: u32, img2: &RgbaImage) -> bool {
    let (width, height) = img1.dimensions();
    let (x0, y0, x1, y1) = neighbourhood(x, y, width, height);

    let mut zeroes: u8 = u8::from(on_edge(x, y, width, height));
    let mut min = 0.0;
    let mut max = 0.0;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (0, 0, 0, 0);

    let center = *img1.get_pixel(x, y);

    for adjacent_x in x0..=x1 {
        for adjacent_y in y0..=y1 {
            if adjacent_x == x && adjacent_y == y {
                continue;
            }

            // brightness delta between the center pixel and the adjacent one
            let delta = color_delta(center, *img1.get_pixel(adjacent_x, adjacent_y), true);

            if delta == 0.0 {
                zeroes += 1;
                // more than 2 equal siblings: definitely not anti-aliasing
                if zeroes > 2 {
                    return false;
                }
            } else if delta < min {
                min = delta;
                min_x = adjacent_x;
                min_y = adjacent_y;
            } else if delta > max {
                max = delta;
                max_x = adjacent_x;
                max_y = adjacent_y;
            }
        }
    }

    // anti-aliasing needs both a darker and a brighter sibling
    if min == 0.0 || max == 0.0 {
        return false;
    }

    // the darkest or brightest sibling sits in a flat area in both images
    (has_many_siblings(img1, min_x, min_y) && has_many_siblings(img2, min_x, min_y))
        || (has_many_siblings(img1, max_x, max_y) && has_many_siblings(img2, max_x, max_y))
}

/// Whether the pixel has 3+ adjacent pixels of the same color.
fn has_many_siblings(img: &RgbaImage, x: u32, y: u32) -> bool {
    let (width, height) = img.dimensions();
    let (x0, y0, x1, y1) = neighbourhood(x, y, width, height);

    let mut zeroes: u8 = u8::from(on_edge(x, y, width, height));
    let center = img.get_pixel(x, y);

    for adjacent_x in x0..=x1 {
        for adjacent_y in y0..=y1 {
            if adjacent_x == x && adjacent_y == y {
                continue;
            }

            if img.get_pixel(adjacent_x, adjacent_y) == center {
                zeroes += 1;
            }

            if zeroes > 2 {
                return true;
            }
        }
    }

    false
}

/// Perceived color difference in YIQ space.
///
/// The sign encodes direction: negative when the first pixel is brighter.
fn color_delta(pixel1: Rgba<u8>, pixel2: Rgba<u8>, y_only: bool) -> f64 {
    if pixel1 == pixel2 {
        return 0.0;
    }

    let (r1, g1, b1) = blend_white(pixel1);
    let (r2, g2, b2) = blend_white(pixel2);

    let y1 = rgb2y(r1, g1, b1);
    let y2 = rgb2y(r2, g2, b2);
    let y = y1 - y2;

    if y_only {
        return y;
    }

    let i = rgb2i(r1, g1, b1) - rgb2i(r2, g2, b2);
    let q = rgb2q(r1, g1, b1) - rgb2q(r2, g2, b2);

    let delta = 0.5053 * y * y + 0.299 * i * i + 0.1957 * q * q;

    if y1 > y2 {
        -delta
    } else {
        delta
    }
}

fn blend_white(Rgba([r, g, b, a]): Rgba<u8>) -> (f64, f64, f64) {
    let (r, g, b) = (f64::from(r), f64::from(g), f64::from(b));
    if a < 255 {
        let a = f64::from(a) / 255.0;
        (blend(r, a), blend(g, a), blend(b, a))
    } else {
        (r, g, b)
    }
}

/// Blend a semi-transparent channel with white.
fn blend(c: f64, a: f64) -> f64 {
    255.0 + (c - 255.0) * a
}

fn rgb2y(r: f64, g: f64, b: f64) -> f64 {
    r * 0.29889531 + g * 0.58662247 + b * 0.11448223
}

fn rgb2i(r: f64, g: f64, b: f64) -> f64 {
    r * 0.59597799 - g * 0.27417610 - b * 0.32180189
}

fn rgb2q(r: f64, g: f64, b: f64) -> f64 {
    r * 0.21147017 - g * 0.52261711 + b * 0.31114694
}
