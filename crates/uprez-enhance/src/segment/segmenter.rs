// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Region segmentation: classifies every pixel of a page as text,
// pictorial, or neither.

use image::{GrayImage, Luma};
use imageproc::contours::{BorderType, Contour, find_contours};
use imageproc::drawing::draw_polygon_mut;
use imageproc::edges::canny;
use imageproc::point::Point;
use rayon::prelude::*;
use tracing::{debug, info, instrument};
use uprez_core::InterpolationMethod;
use uprez_core::config::SegmentationConfig;

use super::SegmentedMasks;
use super::morphology::{
    adaptive_threshold_inv, close_square, dilate_square, remove_small_components, union,
};
use crate::raster::resample::resize_gray;
use crate::raster::{MASK_ON, Mask, RasterBuffer};

/// Detection passes on images smaller than this (per side) are skipped.
const MIN_DETECTION_SIDE: u32 = 3;

/// Splits a page into a text mask and a pictorial mask.
///
/// ## Text
///
/// For each configured scale the luminance is resampled, binarized with an
/// inverted adaptive threshold, OR-ed with a Canny edge map, closed with a
/// 3×3 square, stripped of tiny components, and resampled back. The
/// per-scale masks are united and closed again with a 5×5 square.
///
/// ## Pictorial
///
/// Canny edges of the full-resolution luminance are dilated and their
/// outermost contours traced. A contour enclosing more than the minimum
/// area whose `perimeter / sqrt(area)` stays below the complexity threshold
/// is filled. Pixels above the saturation threshold are always pictorial.
///
/// Text wins on overlap: the returned masks are disjoint.
#[derive(Debug, Clone, Default)]
pub struct RegionSegmenter {
    config: SegmentationConfig,
}

impl RegionSegmenter {
    pub fn new(config: SegmentationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Classify `image`. Never fails; empty masks are a valid outcome.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn segment(&self, image: &RasterBuffer) -> SegmentedMasks {
        let (width, height) = image.dimensions();
        if image.is_empty() {
            return SegmentedMasks::empty(width, height);
        }

        let gray = image.luminance();

        let (text, pictorial) = if self.config.parallel {
            rayon::join(
                || self.detect_text(&gray),
                || self.detect_pictorial(image, &gray),
            )
        } else {
            (self.detect_text(&gray), self.detect_pictorial(image, &gray))
        };

        // Text takes precedence on overlap.
        let pictorial = clear_where(pictorial, &text);

        let masks = SegmentedMasks {
            text: Mask::from_gray(text),
            pictorial: Mask::from_gray(pictorial),
        };
        info!(
            text_pixels = masks.text.count(),
            pictorial_pixels = masks.pictorial.count(),
            "Segmentation complete"
        );
        masks
    }

    // -- Text -----------------------------------------------------------------

    /// Multi-scale text detection over a luminance image.
    pub fn detect_text(&self, gray: &GrayImage) -> GrayImage {
        let (width, height) = gray.dimensions();

        let per_scale: Vec<GrayImage> = if self.config.parallel {
            self.config
                .text_scales
                .par_iter()
                .map(|&scale| self.detect_text_at_scale(gray, scale))
                .collect()
        } else {
            self.config
                .text_scales
                .iter()
                .map(|&scale| self.detect_text_at_scale(gray, scale))
                .collect()
        };

        let combined = per_scale
            .iter()
            .fold(GrayImage::new(width, height), |acc, mask| union(&acc, mask));

        let closed = close_square(&combined, self.config.final_close_radius);
        debug!("Text detection complete");
        closed
    }

    fn detect_text_at_scale(&self, gray: &GrayImage, scale: f32) -> GrayImage {
        let (width, height) = gray.dimensions();
        let scaled_w = ((width as f32 * scale).round() as u32).max(1);
        let scaled_h = ((height as f32 * scale).round() as u32).max(1);

        if scaled_w < MIN_DETECTION_SIDE || scaled_h < MIN_DETECTION_SIDE {
            debug!(scale, scaled_w, scaled_h, "Scale too small for detection; skipping");
            return GrayImage::new(width, height);
        }

        let resized = if (scaled_w, scaled_h) == (width, height) {
            gray.clone()
        } else {
            resize_gray(gray, scaled_w, scaled_h, InterpolationMethod::Bilinear)
        };

        let binary = adaptive_threshold_inv(
            &resized,
            self.config.adaptive_block_radius,
            self.config.adaptive_offset,
        );
        let edges = canny(&resized, self.config.canny_low, self.config.canny_high);
        let combined = union(&binary, &edges);
        let connected = close_square(&combined, self.config.scale_close_radius);
        let (denoised, removed) =
            remove_small_components(connected, self.config.min_text_component);
        debug!(scale, removed, "Per-scale text pass complete");

        if (scaled_w, scaled_h) == (width, height) {
            denoised
        } else {
            resize_gray(&denoised, width, height, InterpolationMethod::Bilinear)
        }
    }

    // -- Pictorial ------------------------------------------------------------

    /// Contour-shape and saturation based pictorial detection.
    pub fn detect_pictorial(&self, image: &RasterBuffer, gray: &GrayImage) -> GrayImage {
        let (width, height) = gray.dimensions();
        let mut mask = GrayImage::new(width, height);

        if width >= MIN_DETECTION_SIDE && height >= MIN_DETECTION_SIDE {
            let edges = canny(gray, self.config.canny_low, self.config.canny_high);
            let dilated = dilate_square(&edges, self.config.pictorial_dilate_radius);
            let contours = find_contours::<i32>(&dilated);

            let mut accepted = 0usize;
            for contour in contours.iter().filter(|c| is_external(c)) {
                if let Some(polygon) = self.accept_contour(contour) {
                    draw_polygon_mut(&mut mask, &polygon, Luma([MASK_ON]));
                    accepted += 1;
                }
            }
            debug!(
                contours = contours.len(),
                accepted, "Pictorial contours classified"
            );
        }

        let threshold = self.config.saturation_threshold;
        let saturation = image.saturation();
        for (pixel, sat) in mask.pixels_mut().zip(saturation.pixels()) {
            if sat.0[0] > threshold {
                pixel.0[0] = MASK_ON;
            }
        }

        mask
    }

    /// The fillable polygon of a contour that looks like a picture block.
    fn accept_contour(&self, contour: &Contour<i32>) -> Option<Vec<Point<i32>>> {
        let mut points = contour.points.clone();
        while points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if points.len() < 3 {
            return None;
        }

        let area = polygon_area(&points);
        if area <= self.config.min_pictorial_area {
            return None;
        }
        let complexity = polygon_perimeter(&points) / area.sqrt();
        if complexity >= self.config.complexity_threshold {
            debug!(area, complexity, "Contour too complex for a picture block");
            return None;
        }
        Some(points)
    }
}

/// Outermost borders only: outer borders with no enclosing contour.
fn is_external(contour: &Contour<i32>) -> bool {
    contour.border_type == BorderType::Outer && contour.parent.is_none()
}

/// Clear every pixel of `mask` that is set in `other`.
fn clear_where(mut mask: GrayImage, other: &GrayImage) -> GrayImage {
    for (pixel, o) in mask.pixels_mut().zip(other.pixels()) {
        if o.0[0] != 0 {
            pixel.0[0] = 0;
        }
    }
    mask
}

/// Polygon area by the shoelace formula. Vertices may be CW or CCW.
pub(crate) fn polygon_area(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    let mut twice_area = 0.0f64;
    for i in 0..n {
        let j = (i + 1) % n;
        twice_area += points[i].x as f64 * points[j].y as f64;
        twice_area -= points[j].x as f64 * points[i].y as f64;
    }
    twice_area.abs() / 2.0
}

/// Length of the closed polyline through `points`.
pub(crate) fn polygon_perimeter(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            let dx = (b.x - a.x) as f64;
            let dy = (b.y - a.y) as f64;
            (dx * dx + dy * dy).sqrt()
        })
        .sum()
}
