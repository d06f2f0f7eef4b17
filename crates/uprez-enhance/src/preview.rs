// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Visual aids for checking a classification or a result before committing
// to it.

use image::{Rgb, RgbImage};
use uprez_core::InterpolationMethod;
use uprez_core::error::{Result, UprezError};

use crate::raster::RasterBuffer;
use crate::segment::SegmentedMasks;

/// Tint for text pixels.
pub const TEXT_TINT: [u8; 3] = [255, 0, 0];
/// Tint for pictorial pixels.
pub const PICTORIAL_TINT: [u8; 3] = [0, 255, 0];
/// Tint opacity out of 255.
pub const TINT_ALPHA: u8 = 64;

/// Blend red over text pixels and green over pictorial pixels.
pub fn overlay_masks(
    image: &RasterBuffer,
    masks: &SegmentedMasks,
) -> Result<RasterBuffer> {
    let dims = image.dimensions();
    masks.text.ensure_matches(dims)?;
    masks.pictorial.ensure_matches(dims)?;

    let out = RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let base = image.pixel(x, y);
        let tinted = if masks.text.is_set(x, y) {
            blend(base, TEXT_TINT)
        } else if masks.pictorial.is_set(x, y) {
            blend(base, PICTORIAL_TINT)
        } else {
            base
        };
        Rgb(tinted)
    });
    Ok(RasterBuffer::from_rgb(out))
}

fn blend(base: [u8; 3], tint: [u8; 3]) -> [u8; 3] {
    let a = TINT_ALPHA as u32;
    let mut out = [0u8; 3];
    for c in 0..3 {
        out[c] = ((base[c] as u32 * (255 - a) + tint[c] as u32 * a + 127) / 255) as u8;
    }
    out
}

/// Side-by-side check: columns left of `ratio * width` come from the
/// original, the rest from `enhanced` resampled to the original's size.
pub fn split_comparison(
    original: &RasterBuffer,
    enhanced: &RasterBuffer,
    ratio: f32,
    interpolation: InterpolationMethod,
) -> Result<RasterBuffer> {
    if !(0.0..=1.0).contains(&ratio) {
        return Err(UprezError::InvalidInput(format!(
            "split ratio {ratio} outside 0..=1"
        )));
    }
    let (width, height) = original.dimensions();
    let after = enhanced.resample(width, height, interpolation);
    let split = (width as f32 * ratio).round() as u32;

    let out = RgbImage::from_fn(width, height, |x, y| {
        if x < split {
            Rgb(original.pixel(x, y))
        } else {
            Rgb(after.pixel(x, y))
        }
    });
    Ok(RasterBuffer::from_rgb(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Mask;

    #[test]
    fn overlay_tints_each_class() {
        let image = RasterBuffer::filled(4, 1, [255, 255, 255]);
        let masks = SegmentedMasks {
            text: Mask::from_fn(4, 1, |x, _| x == 0),
            pictorial: Mask::from_fn(4, 1, |x, _| x == 1),
        };
        let out = overlay_masks(&image, &masks).unwrap();
        assert_eq!(out.pixel(0, 0), [255, 191, 191]);
        assert_eq!(out.pixel(1, 0), [191, 255, 191]);
        assert_eq!(out.pixel(3, 0), [255, 255, 255]);
    }

    #[test]
    fn split_takes_left_from_original() {
        let original = RasterBuffer::filled(10, 4, [0, 0, 0]);
        let enhanced = RasterBuffer::filled(20, 8, [255, 255, 255]);
        let out = split_comparison(&original, &enhanced, 0.3, InterpolationMethod::Nearest).unwrap();
        assert_eq!(out.dimensions(), (10, 4));
        assert_eq!(out.pixel(2, 0), [0, 0, 0]);
        assert_eq!(out.pixel(3, 0), [255, 255, 255]);
    }

    #[test]
    fn split_ratio_is_checked() {
        let image = RasterBuffer::new(2, 2);
        assert!(split_comparison(&image, &image, 1.5, InterpolationMethod::Lanczos).is_err());
    }
}
