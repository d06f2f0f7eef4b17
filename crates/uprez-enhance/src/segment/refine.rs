// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Mask refinement: saturation override and small-region cleanup.

use image::GrayImage;
use tracing::{debug, instrument};
use uprez_core::config::RefineConfig;
use uprez_core::error::Result;

use super::SegmentedMasks;
use super::morphology::remove_small_components;
use crate::raster::{Mask, RasterBuffer};

/// Post-processes segmenter output.
///
/// 1. Saturated pixels are forced pictorial and cleared from text.
/// 2. Pictorial pixels overlapping text are cleared.
/// 3. Text components under `min_text_component` pixels are dropped.
/// 4. Pictorial components under `min_pictorial_component` pixels are dropped.
///
/// Refining an already-refined pair returns it unchanged.
#[derive(Debug, Clone)]
pub struct MaskRefiner {
    config: RefineConfig,
    saturation_threshold: u8,
}

impl Default for MaskRefiner {
    fn default() -> Self {
        Self::new(RefineConfig::default(), 100)
    }
}

impl MaskRefiner {
    pub fn new(config: RefineConfig, saturation_threshold: u8) -> Self {
        Self {
            config,
            saturation_threshold,
        }
    }

    #[instrument(skip_all, fields(width = original.width(), height = original.height()))]
    pub fn refine(
        &self,
        masks: SegmentedMasks,
        original: &RasterBuffer,
    ) -> Result<SegmentedMasks> {
        let dims = original.dimensions();
        masks.text.ensure_matches(dims)?;
        masks.pictorial.ensure_matches(dims)?;

        let saturated = self.saturated(original);
        let pictorial = masks.pictorial.union(&saturated)?;
        let text = masks.text.subtract(&saturated)?;
        let pictorial = pictorial.subtract(&text)?;

        let (text, text_removed) =
            remove_small_components(text.into_gray(), self.config.min_text_component);
        let (pictorial, pictorial_removed) =
            remove_small_components(pictorial.into_gray(), self.config.min_pictorial_component);
        debug!(
            saturated = saturated.count(),
            text_removed, pictorial_removed, "Masks refined"
        );

        Ok(SegmentedMasks {
            text: Mask::from_gray(text),
            pictorial: Mask::from_gray(pictorial),
        })
    }

    fn saturated(&self, original: &RasterBuffer) -> Mask {
        let saturation: GrayImage = original.saturation();
        let threshold = self.saturation_threshold;
        Mask::from_fn(original.width(), original.height(), |x, y| {
            saturation.get_pixel(x, y).0[0] > threshold
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn page_with_noise() -> (SegmentedMasks, RasterBuffer) {
        let mut img = RgbImage::from_pixel(80, 80, Rgb([255, 255, 255]));
        // Saturated block in the lower right.
        for y in 50..80 {
            for x in 50..80 {
                img.put_pixel(x, y, Rgb([30, 60, 220]));
            }
        }
        // A stray saturated speck, too small to survive.
        img.put_pixel(5, 75, Rgb([250, 0, 0]));

        let text = Mask::from_fn(80, 80, |x, y| {
            // A real text block, a 2-pixel speck, and text bleeding into the
            // saturated block.
            ((10..40).contains(&x) && (10..20).contains(&y))
                || (x == 70 && (2..4).contains(&y))
                || ((55..60).contains(&x) && (55..60).contains(&y))
        });
        let pictorial = Mask::from_fn(80, 80, |x, y| (60..64).contains(&x) && (5..8).contains(&y));
        (SegmentedMasks { text, pictorial }, RasterBuffer::from_rgb(img))
    }

    #[test]
    fn saturation_overrides_text() {
        let (masks, original) = page_with_noise();
        let refined = MaskRefiner::default().refine(masks, &original).unwrap();
        assert!(!refined.text.is_set(57, 57));
        assert!(refined.pictorial.is_set(57, 57));
        assert!(refined.pictorial.is_set(70, 70));
    }

    #[test]
    fn small_regions_are_removed() {
        let (masks, original) = page_with_noise();
        let refined = MaskRefiner::default().refine(masks, &original).unwrap();
        assert!(!refined.text.is_set(70, 2), "2-pixel text speck should go");
        assert!(refined.text.is_set(20, 15), "300-pixel text block should stay");
        assert!(!refined.pictorial.is_set(61, 6), "12-pixel pictorial blob should go");
        assert!(!refined.pictorial.is_set(5, 75), "saturated speck should go");
    }

    #[test]
    fn refine_is_idempotent() {
        let (masks, original) = page_with_noise();
        let refiner = MaskRefiner::default();
        let once = refiner.refine(masks, &original).unwrap();
        let twice = refiner.refine(once.clone(), &original).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn refined_masks_are_disjoint() {
        let original = RasterBuffer::filled(30, 30, [200, 40, 40]);
        let masks = SegmentedMasks {
            text: Mask::full(30, 30),
            pictorial: Mask::full(30, 30),
        };
        let refined = MaskRefiner::default().refine(masks, &original).unwrap();
        assert!(refined.is_disjoint());
        assert!(refined.text.is_clear());
        assert_eq!(refined.pictorial.count(), 900);
    }

    #[test]
    fn mismatched_sizes_are_rejected() {
        let masks = SegmentedMasks::empty(10, 10);
        let original = RasterBuffer::new(12, 10);
        assert!(MaskRefiner::default().refine(masks, &original).is_err());
    }
}
