// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// 3×3 sharpening, used to recover some stroke contrast when text falls
// back to plain resampling.

use image::{Rgb, RgbImage};
use tracing::{debug, instrument};

use crate::raster::RasterBuffer;

/// Centre weight; each of the eight neighbours weighs −1, so the kernel
/// sums to 1 and flat regions are unchanged.
const CENTRE_WEIGHT: i32 = 9;

/// Sharpen every channel with a 3×3 unsharp kernel. Edge pixels sample
/// their nearest in-bounds neighbour.
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn sharpen(image: &RasterBuffer) -> RasterBuffer {
    let src = image.as_rgb();
    let (width, height) = src.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let sample = |x: i64, y: i64| {
        let cx = x.clamp(0, width as i64 - 1) as u32;
        let cy = y.clamp(0, height as i64 - 1) as u32;
        src.get_pixel(cx, cy).0
    };

    let out = RgbImage::from_fn(width, height, |x, y| {
        let (x, y) = (x as i64, y as i64);
        let mut acc = [0i32; 3];
        for dy in -1..=1 {
            for dx in -1..=1 {
                let weight = if dx == 0 && dy == 0 { CENTRE_WEIGHT } else { -1 };
                let p = sample(x + dx, y + dy);
                for c in 0..3 {
                    acc[c] += weight * p[c] as i32;
                }
            }
        }
        Rgb(acc.map(|v| v.clamp(0, 255) as u8))
    });

    debug!("Sharpened");
    RasterBuffer::from_rgb(out)
}
