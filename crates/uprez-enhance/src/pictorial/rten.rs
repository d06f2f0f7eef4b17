// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Learned super-resolution through `rten`.
//
// Only compiled with the `superres` feature. The model is an EDSR-style
// network converted to `.rten`: one NCHW f32 input with RGB values in
// 0..=255, one NCHW output `factor` times larger on each side.

use std::path::Path;

use rten::Model;
use rten_tensor::NdTensor;
use rten_tensor::prelude::*;
use tracing::{debug, info, instrument};
use uprez_core::error::{Result, UprezError};

use super::Upsampler;
use crate::raster::RasterBuffer;

pub struct RtenUpsampler {
    model: Model,
    factor: u32,
}

impl RtenUpsampler {
    /// Load a model that upsamples by `factor`.
    #[instrument(skip_all, fields(path = %path.as_ref().display(), factor))]
    pub fn load(path: impl AsRef<Path>, factor: u32) -> Result<Self> {
        let path = path.as_ref();
        if factor == 0 {
            return Err(UprezError::SuperResolution("model factor must be at least 1".into()));
        }
        if !path.exists() {
            return Err(UprezError::SuperResolution(format!(
                "super-resolution model not found at {}",
                path.display()
            )));
        }
        let model = Model::load_file(path).map_err(|err| {
            UprezError::SuperResolution(format!(
                "failed to load super-resolution model from {}: {}",
                path.display(),
                err
            ))
        })?;
        info!("Super-resolution model loaded");
        Ok(Self { model, factor })
    }
}

impl Upsampler for RtenUpsampler {
    fn name(&self) -> &str {
        "rten"
    }

    fn scale_factor(&self) -> u32 {
        self.factor
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn upsample(&self, image: &RasterBuffer) -> Result<RasterBuffer> {
        let rgb = image.as_rgb();
        let (width, height) = (rgb.width() as usize, rgb.height() as usize);

        let input = NdTensor::from_fn([1, 3, height, width], |[_, c, y, x]| {
            rgb.get_pixel(x as u32, y as u32).0[c] as f32
        });

        let output: NdTensor<f32, 4> = self
            .model
            .run_one(input.view().into(), None)
            .map_err(|err| UprezError::SuperResolution(format!("inference failed: {err}")))?
            .try_into()
            .map_err(|err| {
                UprezError::SuperResolution(format!("unexpected model output: {err}"))
            })?;

        let [batch, channels, out_h, out_w] = output.shape();
        if batch != 1 || channels != 3 {
            return Err(UprezError::SuperResolution(format!(
                "model produced a {batch}x{channels} batch; expected 1x3"
            )));
        }
        let expected = (width * self.factor as usize, height * self.factor as usize);
        if (out_w, out_h) != expected {
            return Err(UprezError::SuperResolution(format!(
                "model produced {out_w}x{out_h}; expected {}x{} at factor {}",
                expected.0, expected.1, self.factor
            )));
        }
        debug!(out_w, out_h, "Inference complete");

        let mut data = Vec::with_capacity(out_w * out_h * 3);
        for y in 0..out_h {
            for x in 0..out_w {
                for c in 0..3 {
                    data.push(output[[0, c, y, x]].round().clamp(0.0, 255.0) as u8);
                }
            }
        }
        RasterBuffer::from_raw(out_w as u32, out_h as u32, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_model_is_reported() {
        let err = RtenUpsampler::load("/nonexistent/uprez/edsr.rten", 4)
            .err()
            .unwrap();
        assert!(matches!(err, UprezError::SuperResolution(_)));
    }

    #[test]
    fn zero_factor_is_rejected() {
        assert!(RtenUpsampler::load("/nonexistent/uprez/edsr.rten", 0).is_err());
    }
}
