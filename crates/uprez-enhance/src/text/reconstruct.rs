// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text reconstruction: re-typesets recognized tokens on a high-resolution
// canvas instead of upscaling glyph pixels.

use image::{Rgb, RgbImage};
use tracing::{debug, info, instrument, warn};
use uprez_core::config::TextConfig;
use uprez_core::error::Result;
use uprez_core::{DensityPair, InterpolationMethod, OcrToken};

use super::glyph::GlyphRenderer;
use crate::raster::{Mask, RasterBuffer};
use crate::sharpen::sharpen;

const GLYPH_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Kernel for the resample fallback, independent of the caller's method.
const FALLBACK_FILTER: InterpolationMethod = InterpolationMethod::Lanczos;

/// How the text layer was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOutcome {
    /// Tokens were typeset onto the canvas.
    Rendered { tokens_rendered: usize, font_size: u32 },
    /// Nothing was drawn; the masked crop was resampled instead.
    ResampledFallback,
}

/// A reconstructed text layer at target resolution.
#[derive(Debug, Clone)]
pub struct TextLayer {
    pub image: RasterBuffer,
    pub outcome: TextOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct TextReconstructor {
    config: TextConfig,
}

impl TextReconstructor {
    pub fn new(config: TextConfig) -> Self {
        Self { config }
    }

    /// Median height of the renderable tokens, or the configured default
    /// when none qualify. An even count averages the middle pair and
    /// truncates.
    pub fn estimate_font_size(&self, tokens: &[OcrToken]) -> u32 {
        let mut heights: Vec<u32> = tokens
            .iter()
            .filter(|t| t.is_renderable(self.config.min_confidence))
            .map(|t| t.height)
            .collect();
        if heights.is_empty() {
            return self.config.default_font_size;
        }
        heights.sort_unstable();
        let mid = heights.len() / 2;
        if heights.len() % 2 == 1 {
            heights[mid]
        } else {
            ((heights[mid - 1] as u64 + heights[mid] as u64) / 2) as u32
        }
    }

    /// Mask `image` to the text region and reconstruct it at the target
    /// density.
    pub fn reconstruct(
        &self,
        image: &RasterBuffer,
        text_mask: &Mask,
        tokens: &[OcrToken],
        density: DensityPair,
        renderer: &dyn GlyphRenderer,
    ) -> Result<TextLayer> {
        let crop = image.masked(text_mask)?;
        Ok(self.reconstruct_crop(&crop, tokens, density, renderer))
    }

    /// Reconstruct from an already-masked crop.
    #[instrument(skip_all, fields(
        width = crop.width(),
        height = crop.height(),
        tokens = tokens.len(),
        scale = density.scale_factor(),
    ))]
    pub fn reconstruct_crop(
        &self,
        crop: &RasterBuffer,
        tokens: &[OcrToken],
        density: DensityPair,
        renderer: &dyn GlyphRenderer,
    ) -> TextLayer {
        let scale = density.scale_factor();
        let target_w = density.scale_length(crop.width());
        let target_h = density.scale_length(crop.height());

        let estimated = self.estimate_font_size(tokens);
        let font_size = scale_coordinate(estimated, scale).max(self.config.min_font_size);
        debug!(estimated, font_size, "Font size chosen");

        let mut canvas = RgbImage::new(target_w, target_h);
        let mut rendered = 0usize;
        for token in tokens
            .iter()
            .filter(|t| t.is_renderable(self.config.min_confidence))
        {
            let x = scale_coordinate(token.x, scale);
            let y = scale_coordinate(token.y, scale);
            renderer.render_text(
                &mut canvas,
                clamp_i32(x),
                clamp_i32(y),
                font_size as f32,
                &token.text,
                GLYPH_COLOR,
            );
            rendered += 1;
        }

        let canvas = RasterBuffer::from_rgb(canvas);
        if !canvas.is_all_black() {
            info!(rendered, font_size, "Text layer typeset");
            return TextLayer {
                image: canvas,
                outcome: TextOutcome::Rendered {
                    tokens_rendered: rendered,
                    font_size,
                },
            };
        }

        warn!(
            candidates = tokens.len(),
            rendered, "Nothing typeset; resampling the masked text crop"
        );
        let mut fallback = crop.resample(target_w, target_h, FALLBACK_FILTER);
        if self.config.sharpen_fallback {
            fallback = sharpen(&fallback);
        }
        TextLayer {
            image: fallback,
            outcome: TextOutcome::ResampledFallback,
        }
    }
}

fn scale_coordinate(value: u32, scale: f64) -> u32 {
    (value as f64 * scale + 1e-9).floor() as u32
}

fn clamp_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::text::glyph::{FontRenderer, FontSource};

    #[derive(Debug, Clone, PartialEq)]
    struct Call {
        x: i32,
        y: i32,
        size: f32,
        text: String,
    }

    /// Records calls and stamps a small block so the canvas is not black.
    struct RecordingRenderer {
        calls: Mutex<Vec<Call>>,
        source: FontSource,
    }

    impl RecordingRenderer {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                source: FontSource::Builtin,
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl GlyphRenderer for RecordingRenderer {
        fn render_text(
            &self,
            canvas: &mut RgbImage,
            x: i32,
            y: i32,
            size: f32,
            text: &str,
            color: Rgb<u8>,
        ) {
            self.calls.lock().unwrap().push(Call {
                x,
                y,
                size,
                text: text.to_string(),
            });
            for dy in 0..4 {
                for dx in 0..4 {
                    let (px, py) = (x as u32 + dx, y as u32 + dy);
                    if px < canvas.width() && py < canvas.height() {
                        canvas.put_pixel(px, py, color);
                    }
                }
            }
        }

        fn font_source(&self) -> &FontSource {
            &self.source
        }
    }

    fn page() -> (RasterBuffer, Mask) {
        let img = RgbImage::from_fn(80, 40, |x, y| {
            if (10..60).contains(&x) && (10..30).contains(&y) {
                Rgb([30, 30, 30])
            } else {
                Rgb([240, 240, 240])
            }
        });
        let mask = Mask::from_fn(80, 40, |x, y| (8..62).contains(&x) && (8..32).contains(&y));
        (RasterBuffer::from_rgb(img), mask)
    }

    #[test]
    fn median_font_size() {
        let r = TextReconstructor::default();
        let tokens = vec![
            OcrToken::new(0, 0, 10, 10, "a", 90.0),
            OcrToken::new(0, 0, 10, 30, "b", 90.0),
            OcrToken::new(0, 0, 10, 200, "header", 90.0),
            OcrToken::new(0, 0, 10, 500, "noise", 10.0),
        ];
        assert_eq!(r.estimate_font_size(&tokens), 30);

        let even = vec![
            OcrToken::new(0, 0, 10, 11, "a", 90.0),
            OcrToken::new(0, 0, 10, 14, "b", 90.0),
        ];
        assert_eq!(r.estimate_font_size(&even), 12);
        assert_eq!(r.estimate_font_size(&[]), 12);
    }

    #[test]
    fn single_token_is_scaled_into_place() {
        let (image, mask) = page();
        let renderer = RecordingRenderer::new();
        let tokens = vec![OcrToken::new(10, 10, 50, 20, "Hi", 90.0)];
        let density = DensityPair::new(150, 300).unwrap();

        let layer = TextReconstructor::default()
            .reconstruct(
                &image,
                &mask,
                &tokens,
                density,
                &renderer,
            )
            .unwrap();

        assert_eq!(layer.image.dimensions(), (160, 80));
        assert_eq!(
            layer.outcome,
            TextOutcome::Rendered {
                tokens_rendered: 1,
                font_size: 40
            }
        );
        let calls = renderer.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!((calls[0].x, calls[0].y), (20, 20));
        assert!(calls[0].size >= 12.0);
        assert_eq!(calls[0].text, "Hi");
    }

    #[test]
    fn font_size_is_floored() {
        let (image, mask) = page();
        let renderer = RecordingRenderer::new();
        let tokens = vec![OcrToken::new(10, 10, 20, 4, "tiny", 75.0)];
        let density = DensityPair::new(300, 300).unwrap();
        TextReconstructor::default()
            .reconstruct(&image, &mask, &tokens, density, &renderer)
            .unwrap();
        assert_eq!(renderer.calls()[0].size, 12.0);
    }

    #[test]
    fn low_confidence_tokens_fall_back_to_resampled_crop() {
        let (image, mask) = page();
        let renderer = RecordingRenderer::new();
        let tokens = vec![
            OcrToken::new(10, 10, 50, 20, "Hi", 60.0),
            OcrToken::new(20, 12, 30, 10, "there", 12.5),
            OcrToken::new(20, 12, 30, 10, "   ", 99.0),
        ];
        let density = DensityPair::new(100, 200).unwrap();

        let layer = TextReconstructor::default()
            .reconstruct(
                &image,
                &mask,
                &tokens,
                density,
                &renderer,
            )
            .unwrap();

        assert!(renderer.calls().is_empty());
        assert_eq!(layer.outcome, TextOutcome::ResampledFallback);
        let expected = image
            .masked(&mask)
            .unwrap()
            .resample(160, 80, InterpolationMethod::Lanczos);
        assert_eq!(layer.image, expected);
    }

    #[test]
    fn no_tokens_with_sharpening() {
        let (image, mask) = page();
        let config = TextConfig {
            sharpen_fallback: true,
            ..TextConfig::default()
        };
        let density = DensityPair::new(100, 100).unwrap();
        let layer = TextReconstructor::new(config)
            .reconstruct(
                &image,
                &mask,
                &[],
                density,
                &FontRenderer::builtin(),
            )
            .unwrap();
        assert_eq!(layer.outcome, TextOutcome::ResampledFallback);
        assert_eq!(layer.image, sharpen(&image.masked(&mask).unwrap()));
    }

    #[test]
    fn mask_size_mismatch_is_rejected() {
        let (image, _) = page();
        let density = DensityPair::new(72, 144).unwrap();
        let result = TextReconstructor::default().reconstruct(
            &image,
            &Mask::new(10, 10),
            &[],
            density,
            &FontRenderer::builtin(),
        );
        assert!(result.is_err());
    }
}
