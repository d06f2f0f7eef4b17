// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Compositing of the text and pictorial layers into one bi-level page.

use tracing::{debug, instrument, warn};
use uprez_core::InterpolationMethod;
use uprez_core::config::ComposeConfig;

use crate::raster::RasterBuffer;

/// Output of [`Compositor::compose`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composite {
    pub image: RasterBuffer,
    /// Every channel of every pixel is 255; usually means nothing was
    /// detected or reconstructed. Reported, never corrected.
    pub uniform_white: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Compositor {
    config: ComposeConfig,
}

impl Compositor {
    pub fn new(config: ComposeConfig) -> Self {
        Self { config }
    }

    /// Merge the layers and binarize.
    ///
    /// 1. The pictorial layer is resampled to the text layer's size if they
    ///    differ.
    /// 2. Channels are added with saturation at 255.
    /// 3. Each channel at or above the threshold becomes 255, the rest 0.
    #[instrument(skip_all, fields(
        text = ?text_layer.dimensions(),
        pictorial = ?pictorial_layer.dimensions(),
    ))]
    pub fn compose(
        &self,
        text_layer: &RasterBuffer,
        pictorial_layer: &RasterBuffer,
        interpolation: InterpolationMethod,
    ) -> Composite {
        let (width, height) = text_layer.dimensions();
        let pictorial = if pictorial_layer.dimensions() != (width, height) {
            debug!(width, height, "Resampling pictorial layer to text layer size");
            pictorial_layer.resample(width, height, interpolation)
        } else {
            pictorial_layer.clone()
        };

        let threshold = self.config.binarize_threshold;
        let mut out = pictorial.into_rgb();
        for (dst, src) in out.pixels_mut().zip(text_layer.as_rgb().pixels()) {
            for c in 0..3 {
                let sum = dst.0[c].saturating_add(src.0[c]);
                dst.0[c] = if sum >= threshold { 255 } else { 0 };
            }
        }

        let image = RasterBuffer::from_rgb(out);
        let uniform_white = image.is_all_white();
        if uniform_white {
            warn!("Composited image is uniformly white");
        }
        Composite {
            image,
            uniform_white,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn gradient(w: u32, h: u32) -> RasterBuffer {
        RasterBuffer::from_rgb(RgbImage::from_fn(w, h, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) * 3 % 256) as u8])
        }))
    }

    #[test]
    fn output_is_binary() {
        let out = Compositor::default().compose(
            &gradient(40, 30),
            &gradient(40, 30),
            InterpolationMethod::Lanczos,
        );
        assert!(out.image.as_rgb().as_raw().iter().all(|&v| v == 0 || v == 255));
    }

    #[test]
    fn pictorial_layer_is_matched_to_text_size() {
        let out = Compositor::default().compose(
            &RasterBuffer::new(50, 40),
            &RasterBuffer::filled(49, 41, [200, 10, 130]),
            InterpolationMethod::Nearest,
        );
        assert_eq!(out.image.dimensions(), (50, 40));
        assert_eq!(out.image.pixel(25, 20), [255, 0, 255]);
    }

    #[test]
    fn threshold_is_inclusive_and_sums_saturate() {
        let text = RasterBuffer::filled(2, 2, [100, 27, 200]);
        let pictorial = RasterBuffer::filled(2, 2, [28, 100, 200]);
        let out = Compositor::default().compose(&text, &pictorial, InterpolationMethod::Lanczos);
        // 128 → white, 127 → black, 400 clamps to 255 → white.
        assert_eq!(out.image.pixel(0, 0), [255, 0, 255]);
        assert!(!out.uniform_white);
    }

    #[test]
    fn uniform_white_is_flagged() {
        let out = Compositor::default().compose(
            &RasterBuffer::filled(4, 4, [200, 200, 200]),
            &RasterBuffer::new(4, 4),
            InterpolationMethod::Lanczos,
        );
        assert!(out.uniform_white);
    }
}
