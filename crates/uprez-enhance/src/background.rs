// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Foreground extraction: dark content on light paper.

use image::{GrayImage, Luma};
use tracing::{debug, instrument};

use crate::raster::{MASK_OFF, MASK_ON, Mask, RasterBuffer};
use crate::segment::morphology::{close_square, otsu_threshold};

/// Otsu-threshold the luminance (inverted, so ink is set) and close it
/// twice with a 3×3 square to knit broken strokes.
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn foreground_mask(image: &RasterBuffer) -> Mask {
    let gray = image.luminance();
    let threshold = otsu_threshold(&gray);

    let binary = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let on = gray.get_pixel(x, y).0[0] <= threshold;
        Luma([if on { MASK_ON } else { MASK_OFF }])
    });

    let closed = close_square(&close_square(&binary, 1), 1);
    let mask = Mask::from_gray(closed);
    debug!(threshold, foreground = mask.count(), "Foreground extracted");
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn ink_is_foreground() {
        let img = RgbImage::from_fn(40, 40, |x, y| {
            if (10..30).contains(&x) && (18..22).contains(&y) {
                Rgb([15, 15, 15])
            } else {
                Rgb([235, 235, 235])
            }
        });
        let mask = foreground_mask(&RasterBuffer::from_rgb(img));
        assert!(mask.is_set(20, 20));
        assert!(!mask.is_set(2, 2));
    }

    #[test]
    fn closing_fills_one_pixel_gaps() {
        let img = RgbImage::from_fn(30, 12, |x, y| {
            if (5..25).contains(&x) && (4..8).contains(&y) && x != 15 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let mask = foreground_mask(&RasterBuffer::from_rgb(img));
        assert!(mask.is_set(15, 5));
    }
}
