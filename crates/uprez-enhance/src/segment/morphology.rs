// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Binary-image primitives shared by segmentation, refinement, and
// foreground extraction: Gaussian adaptive and Otsu thresholds, square closing and
// dilation, and connected-component size filtering.

use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology;
use imageproc::region_labelling::{Connectivity, connected_components};

use crate::raster::{MASK_OFF, MASK_ON};

// -- Thresholding -------------------------------------------------------------

/// Inverted Gaussian adaptive threshold.
///
/// A pixel is set when it is no brighter than the Gaussian-weighted mean of
/// its `(2 * block_radius + 1)²` neighbourhood minus `offset`, so dark
/// strokes on light paper come out white.
pub fn adaptive_threshold_inv(gray: &GrayImage, block_radius: u32, offset: i32) -> GrayImage {
    if is_degenerate(gray) {
        return gray.clone();
    }
    let local_mean = gaussian_blur_f32(gray, block_sigma(block_radius));

    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let threshold = local_mean.get_pixel(x, y).0[0] as i32 - offset;
        let value = gray.get_pixel(x, y).0[0] as i32;
        Luma([if value <= threshold { MASK_ON } else { MASK_OFF }])
    })
}

/// Standard deviation of the Gaussian window for a `(2r + 1)`-wide block:
/// `0.3 * ((k - 1) / 2 - 1) + 0.8`, which is 2.0 for an 11×11 block.
fn block_sigma(block_radius: u32) -> f32 {
    0.3 * (block_radius as f32 - 1.0) + 0.8
}

/// Otsu's global threshold: the level maximising between-class variance.
pub fn otsu_threshold(gray: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total_pixels = gray.width() as u64 * gray.height() as u64;
    if total_pixels == 0 {
        return 128;
    }

    let sum_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum();

    let mut sum_background: f64 = 0.0;
    let mut weight_background: u64 = 0;
    let mut max_variance: f64 = 0.0;
    let mut best_threshold: u8 = 0;

    for (t, &count) in histogram.iter().enumerate() {
        weight_background += count;
        if weight_background == 0 {
            continue;
        }
        let weight_foreground = total_pixels - weight_background;
        if weight_foreground == 0 {
            break;
        }

        sum_background += t as f64 * count as f64;
        let mean_background = sum_background / weight_background as f64;
        let mean_foreground = (sum_total - sum_background) / weight_foreground as f64;

        let between_variance = weight_background as f64
            * weight_foreground as f64
            * (mean_background - mean_foreground).powi(2);

        if between_variance > max_variance {
            max_variance = between_variance;
            best_threshold = t as u8;
        }
    }

    best_threshold
}

// -- Morphology ---------------------------------------------------------------

/// Closing with a `(2r + 1)²` square structuring element.
pub fn close_square(mask: &GrayImage, radius: u8) -> GrayImage {
    if radius == 0 || is_degenerate(mask) {
        return mask.clone();
    }
    morphology::close(mask, Norm::LInf, radius)
}

/// Dilation with a `(2r + 1)²` square structuring element.
pub fn dilate_square(mask: &GrayImage, radius: u8) -> GrayImage {
    if radius == 0 || is_degenerate(mask) {
        return mask.clone();
    }
    morphology::dilate(mask, Norm::LInf, radius)
}

/// Per-pixel OR of two same-sized binary images.
pub fn union(a: &GrayImage, b: &GrayImage) -> GrayImage {
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        let on = a.get_pixel(x, y).0[0] != MASK_OFF || b.get_pixel(x, y).0[0] != MASK_OFF;
        Luma([if on { MASK_ON } else { MASK_OFF }])
    })
}

// -- Connected components -----------------------------------------------------

/// Clear 8-connected components with fewer than `min_size` pixels.
///
/// Returns the filtered image and the number of components removed.
pub fn remove_small_components(mask: GrayImage, min_size: u32) -> (GrayImage, usize) {
    if min_size <= 1 || is_degenerate(&mask) {
        return (mask, 0);
    }

    let labels = connected_components(&mask, Connectivity::Eight, Luma([MASK_OFF]));
    let label_count = labels.pixels().map(|p| p.0[0]).max().unwrap_or(0) as usize;
    if label_count == 0 {
        return (mask, 0);
    }

    let mut areas = vec![0u32; label_count + 1];
    for p in labels.pixels() {
        areas[p.0[0] as usize] += 1;
    }

    let removed = areas
        .iter()
        .skip(1)
        .filter(|&&area| area > 0 && area < min_size)
        .count();

    let mut out = mask;
    for (pixel, label) in out.pixels_mut().zip(labels.pixels()) {
        let label = label.0[0] as usize;
        if label != 0 && areas[label] < min_size {
            pixel.0[0] = MASK_OFF;
        }
    }

    (out, removed)
}

fn is_degenerate(image: &GrayImage) -> bool {
    image.width() == 0 || image.height() == 0
}
