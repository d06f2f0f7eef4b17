// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pictorial module: fixed-factor upsampling of photo/graphic regions and
// reconciliation to the exact target scale.

use tracing::{debug, info, instrument};
use uprez_core::error::{Result, UprezError};
use uprez_core::{DensityPair, InterpolationMethod, scale_length};

use crate::raster::{Mask, RasterBuffer};

#[cfg(feature = "superres")]
pub mod rten;

#[cfg(feature = "superres")]
pub use self::rten::RtenUpsampler;

/// Upscale factor of the bundled super-resolution model.
pub const DEFAULT_FACTOR: u32 = 4;

/// Kernel for the `scale / factor` reconciliation step.
const RECONCILE_FILTER: InterpolationMethod = InterpolationMethod::Lanczos;

/// A fixed-factor image upscaler.
///
/// Built once and shared across runs. A failure here aborts the run: there
/// is no numeric substitute for a learned model's output.
pub trait Upsampler: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// The integer factor every output dimension is multiplied by.
    fn scale_factor(&self) -> u32;

    fn upsample(&self, image: &RasterBuffer) -> Result<RasterBuffer>;
}

/// Plain resampling at a fixed factor, standing in for a learned model.
#[derive(Debug, Clone, Copy)]
pub struct ResampleUpsampler {
    factor: u32,
    method: InterpolationMethod,
}

impl Default for ResampleUpsampler {
    fn default() -> Self {
        Self::new(DEFAULT_FACTOR)
    }
}

impl ResampleUpsampler {
    pub fn new(factor: u32) -> Self {
        Self::with_method(factor, InterpolationMethod::Lanczos)
    }

    pub fn with_method(factor: u32, method: InterpolationMethod) -> Self {
        Self {
            factor: factor.max(1),
            method,
        }
    }
}

impl Upsampler for ResampleUpsampler {
    fn name(&self) -> &str {
        "resample"
    }

    fn scale_factor(&self) -> u32 {
        self.factor
    }

    fn upsample(&self, image: &RasterBuffer) -> Result<RasterBuffer> {
        let width = image.width().checked_mul(self.factor);
        let height = image.height().checked_mul(self.factor);
        match (width, height) {
            (Some(w), Some(h)) => Ok(image.resample(w, h, self.method)),
            _ => Err(UprezError::SuperResolution(format!(
                "{}x{} cannot be upsampled {}x without overflow",
                image.width(),
                image.height(),
                self.factor
            ))),
        }
    }
}

/// Upscales the pictorial region of a page.
///
/// The masked crop goes through the upsampler at its fixed factor `f`; when
/// the requested scale `s` differs from `f`, the result is resampled by
/// `s / f` with a Lanczos kernel so that each side ends at
/// `floor(side * f * s / f)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PictorialUpscaler;

impl PictorialUpscaler {
    #[instrument(skip_all, fields(
        width = image.width(),
        height = image.height(),
        scale = density.scale_factor(),
        backend = upsampler.name(),
    ))]
    pub fn upscale(
        &self,
        image: &RasterBuffer,
        pictorial_mask: &Mask,
        density: DensityPair,
        upsampler: &dyn Upsampler,
    ) -> Result<RasterBuffer> {
        let crop = image.masked(pictorial_mask)?;
        let factor = upsampler.scale_factor().max(1);
        let scale = density.scale_factor();

        if pictorial_mask.is_clear() {
            let w = density.scale_length(image.width());
            let h = density.scale_length(image.height());
            debug!(w, h, "Pictorial mask empty; passing through a blank layer");
            return Ok(RasterBuffer::new(w, h));
        }

        let upsampled = upsampler.upsample(&crop)?;
        debug!(
            up_width = upsampled.width(),
            up_height = upsampled.height(),
            factor,
            "Upsampled pictorial crop"
        );

        if (scale - factor as f64).abs() < f64::EPSILON {
            info!("Pictorial layer ready at model factor");
            return Ok(upsampled);
        }

        let (w, h) = reconcile_size(upsampled.width(), upsampled.height(), scale, factor);
        info!(w, h, "Reconciling pictorial layer to target scale");
        Ok(upsampled.resample(w, h, RECONCILE_FILTER))
    }
}

/// Size after rescaling an `f`-times upsampled buffer by `scale / f`.
fn reconcile_size(width: u32, height: u32, scale: f64, factor: u32) -> (u32, u32) {
    let ratio = scale / factor as f64;
    (scale_length(width, ratio), scale_length(height, ratio))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingUpsampler;

    impl Upsampler for FailingUpsampler {
        fn name(&self) -> &str {
            "failing"
        }

        fn scale_factor(&self) -> u32 {
            4
        }

        fn upsample(&self, _image: &RasterBuffer) -> Result<RasterBuffer> {
            Err(UprezError::SuperResolution("model exploded".into()))
        }
    }

    fn photo() -> (RasterBuffer, Mask) {
        let raster = RasterBuffer::filled(30, 20, [200, 60, 60]);
        (raster, Mask::full(30, 20))
    }

    #[test]
    fn unit_scale_keeps_original_size() {
        let (image, mask) = photo();
        let density = DensityPair::new(300, 300).unwrap();
        let layer = PictorialUpscaler
            .upscale(
                &image,
                &mask,
                density,
                &ResampleUpsampler::default(),
            )
            .unwrap();
        assert_eq!(layer.dimensions(), (30, 20));
    }

    #[test]
    fn model_factor_is_used_directly() {
        let (image, mask) = photo();
        let density = DensityPair::new(75, 300).unwrap();
        let upsampler = ResampleUpsampler::with_method(4, InterpolationMethod::Nearest);
        let layer = PictorialUpscaler
            .upscale(&image, &mask, density, &upsampler)
            .unwrap();
        assert_eq!(layer.dimensions(), (120, 80));
        assert_eq!(layer.pixel(60, 40), [200, 60, 60]);
    }

    #[test]
    fn fractional_scale_is_reconciled() {
        let (image, mask) = photo();
        let density = DensityPair::new(200, 300).unwrap();
        let layer = PictorialUpscaler
            .upscale(
                &image,
                &mask,
                density,
                &ResampleUpsampler::default(),
            )
            .unwrap();
        assert_eq!(layer.dimensions(), (45, 30));
    }

    #[test]
    fn empty_mask_passes_through_blank() {
        let (image, _) = photo();
        let density = DensityPair::new(72, 144).unwrap();
        let layer = PictorialUpscaler
            .upscale(
                &image,
                &Mask::new(30, 20),
                density,
                &FailingUpsampler,
            )
            .unwrap();
        assert_eq!(layer.dimensions(), (60, 40));
        assert!(layer.is_all_black());
    }

    #[test]
    fn upsampler_failure_is_fatal() {
        let (image, mask) = photo();
        let density = DensityPair::new(72, 144).unwrap();
        let err = PictorialUpscaler
            .upscale(&image, &mask, density, &FailingUpsampler)
            .unwrap_err();
        assert!(matches!(err, UprezError::SuperResolution(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn outside_mask_stays_black() {
        let image = RasterBuffer::filled(10, 10, [250, 250, 250]);
        let mask = Mask::from_fn(10, 10, |x, _| x < 5);
        let density = DensityPair::new(100, 100).unwrap();
        let upsampler = ResampleUpsampler::with_method(2, InterpolationMethod::Nearest);
        let layer = PictorialUpscaler
            .upscale(&image, &mask, density, &upsampler)
            .unwrap();
        assert_eq!(layer.dimensions(), (10, 10));
        assert_eq!(layer.pixel(9, 5), [0, 0, 0]);
        assert!(layer.pixel(0, 5).iter().all(|&c| c >= 249));
    }

    #[test]
    fn reconciliation_uses_lanczos() {
        let image = RasterBuffer::from_rgb(image::RgbImage::from_fn(16, 16, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgb([255, 255, 255])
            } else {
                image::Rgb([0, 0, 0])
            }
        }));
        let mask = Mask::full(16, 16);
        let density = DensityPair::new(300, 450).unwrap();
        let upsampler = ResampleUpsampler::default();

        let layer = PictorialUpscaler
            .upscale(&image, &mask, density, &upsampler)
            .unwrap();

        let upsampled = upsampler.upsample(&image.masked(&mask).unwrap()).unwrap();
        let expected = upsampled.resample(24, 24, InterpolationMethod::Lanczos);
        assert_eq!(layer.dimensions(), (24, 24));
        assert_eq!(layer, expected);
    }

    #[test]
    fn empty_mask_layer_matches_target_size() {
        let image = RasterBuffer::new(33, 17);
        let density = DensityPair::new(300, 450).unwrap();
        let layer = PictorialUpscaler
            .upscale(&image, &Mask::new(33, 17), density, &FailingUpsampler)
            .unwrap();
        assert_eq!(
            layer.dimensions(),
            (density.scale_length(33), density.scale_length(17))
        );
    }
}
