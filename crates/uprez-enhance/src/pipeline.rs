// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Enhancement pipeline: segment, refine, reconstruct text and upscale
// pictures side by side, then composite.

use std::fmt;

use serde::Serialize;
use tracing::{info, instrument, warn};
use uprez_core::error::{Result, UprezError};
use uprez_core::{DensityPair, EnhanceConfig, InterpolationMethod};

use crate::compose::Compositor;
use crate::pictorial::{PictorialUpscaler, ResampleUpsampler, Upsampler};
use crate::raster::{Mask, RasterBuffer};
use crate::recognize::{NullRecognizer, TextRecognizer};
use crate::segment::{MaskRefiner, RegionSegmenter, SegmentedMasks};
use crate::text::{FontRenderer, GlyphRenderer, TextLayer, TextOutcome, TextReconstructor};

/// A degradation that did not stop the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnhanceWarning {
    /// The recognizer failed; text was reconstructed as if it found nothing.
    RecognizerFailed { message: String },
    /// No token was typeset; the text layer is a resampled crop.
    TextFallback,
    /// Tokens were typeset with the built-in bitmap font.
    FontFallback,
    EmptyTextMask,
    EmptyPictorialMask,
    /// The composited page is uniformly white.
    UniformWhite,
}

impl fmt::Display for EnhanceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RecognizerFailed { message } => {
                write!(f, "text recognition failed ({message}); text was resampled")
            }
            Self::TextFallback => f.write_str("no text could be typeset; text was resampled"),
            Self::FontFallback => f.write_str("no outline font found; used the built-in font"),
            Self::EmptyTextMask => f.write_str("no text regions detected"),
            Self::EmptyPictorialMask => f.write_str("no pictorial regions detected"),
            Self::UniformWhite => f.write_str("the result is uniformly white"),
        }
    }
}

/// The composited page, its density tag, and what went sideways.
#[derive(Debug, Clone)]
pub struct EnhancementResult {
    pub image: RasterBuffer,
    pub dpi: u32,
    pub text_outcome: TextOutcome,
    pub warnings: Vec<EnhanceWarning>,
}

impl EnhancementResult {
    pub fn has_warning(&self, warning: &EnhanceWarning) -> bool {
        self.warnings.contains(warning)
    }
}

/// Owns every stage plus the external backends, which are built once and
/// reused across pages.
pub struct EnhancementPipeline {
    config: EnhanceConfig,
    segmenter: RegionSegmenter,
    refiner: MaskRefiner,
    reconstructor: TextReconstructor,
    compositor: Compositor,
    upsampler: Box<dyn Upsampler>,
    recognizer: Box<dyn TextRecognizer>,
    renderer: Box<dyn GlyphRenderer>,
}

impl EnhancementPipeline {
    /// Build a pipeline from a validated configuration.
    ///
    /// The upsampler is the learned model at `superres.model_path` when the
    /// `superres` feature is enabled, otherwise a fixed-factor resampler.
    /// No recognizer is attached; see [`Self::with_recognizer`].
    pub fn new(config: EnhanceConfig) -> Result<Self> {
        config.validate()?;
        let upsampler = default_upsampler(&config)?;
        let renderer = FontRenderer::load(config.text.font_path.as_deref());

        Ok(Self {
            segmenter: RegionSegmenter::new(config.segmentation.clone()),
            refiner: MaskRefiner::new(
                config.refine.clone(),
                config.segmentation.saturation_threshold,
            ),
            reconstructor: TextReconstructor::new(config.text.clone()),
            compositor: Compositor::new(config.compose.clone()),
            upsampler,
            recognizer: Box::new(NullRecognizer),
            renderer: Box::new(renderer),
            config,
        })
    }

    pub fn with_upsampler(mut self, upsampler: Box<dyn Upsampler>) -> Self {
        self.upsampler = upsampler;
        self
    }

    pub fn with_recognizer(mut self, recognizer: Box<dyn TextRecognizer>) -> Self {
        self.recognizer = recognizer;
        self
    }

    pub fn with_renderer(mut self, renderer: Box<dyn GlyphRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn config(&self) -> &EnhanceConfig {
        &self.config
    }

    /// Classify and refine, for callers that want to inspect the masks
    /// before enhancing.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn segment(&self, image: &RasterBuffer) -> Result<SegmentedMasks> {
        let masks = self.segmenter.segment(image);
        self.refiner.refine(masks, image)
    }

    /// Segment `image` and enhance it from `original_dpi` to `target_dpi`.
    ///
    /// `interpolation` drives layer alignment in the compositor. The text
    /// fallback and pictorial reconciliation always resample with Lanczos.
    pub fn enhance(
        &self,
        image: &RasterBuffer,
        original_dpi: u32,
        target_dpi: u32,
        interpolation: InterpolationMethod,
    ) -> Result<EnhancementResult> {
        ensure_not_empty(image)?;
        self.config.density.check(original_dpi, target_dpi)?;
        let masks = self.segment(image)?;
        self.enhance_with_masks(image, &masks, original_dpi, target_dpi, interpolation)
    }

    /// Enhance with masks the caller already holds, typically from
    /// [`Self::segment`]. Nothing is re-segmented.
    #[instrument(skip(self, image, masks), fields(width = image.width(), height = image.height()))]
    pub fn enhance_with_masks(
        &self,
        image: &RasterBuffer,
        masks: &SegmentedMasks,
        original_dpi: u32,
        target_dpi: u32,
        interpolation: InterpolationMethod,
    ) -> Result<EnhancementResult> {
        ensure_not_empty(image)?;
        let density = self.config.density.check(original_dpi, target_dpi)?;
        masks.text.ensure_matches(image.dimensions())?;
        masks.pictorial.ensure_matches(image.dimensions())?;

        let mut warnings = Vec::new();
        if masks.text.is_clear() {
            warnings.push(EnhanceWarning::EmptyTextMask);
        }
        if masks.pictorial.is_clear() {
            warnings.push(EnhanceWarning::EmptyPictorialMask);
        }

        let text_branch = || self.text_layer(image, &masks.text, density);
        let pictorial_branch = || {
            PictorialUpscaler.upscale(image, &masks.pictorial, density, self.upsampler.as_ref())
        };
        let (text, pictorial) = if self.config.segmentation.parallel {
            rayon::join(text_branch, pictorial_branch)
        } else {
            (text_branch(), pictorial_branch())
        };

        let (text, text_warnings) = text?;
        warnings.extend(text_warnings);
        let pictorial = pictorial?;

        let composite = self
            .compositor
            .compose(&text.image, &pictorial, interpolation);
        if composite.uniform_white {
            warnings.push(EnhanceWarning::UniformWhite);
        }

        info!(
            width = composite.image.width(),
            height = composite.image.height(),
            dpi = density.target_dpi(),
            warnings = warnings.len(),
            "Enhancement complete"
        );
        Ok(EnhancementResult {
            image: composite.image,
            dpi: density.target_dpi(),
            text_outcome: text.outcome,
            warnings,
        })
    }

    /// Recognize and reconstruct. Recognizer failures degrade to the
    /// zero-token path.
    fn text_layer(
        &self,
        image: &RasterBuffer,
        text_mask: &Mask,
        density: DensityPair,
    ) -> Result<(TextLayer, Vec<EnhanceWarning>)> {
        let mut warnings = Vec::new();
        let crop = image.masked(text_mask)?;

        let tokens = match self.recognizer.recognize(&crop) {
            Ok(tokens) => tokens,
            Err(err) => {
                warn!(
                    recognizer = self.recognizer.name(),
                    error = %err,
                    "Recognition failed; continuing without tokens"
                );
                warnings.push(EnhanceWarning::RecognizerFailed {
                    message: err.to_string(),
                });
                Vec::new()
            }
        };

        let layer =
            self.reconstructor
                .reconstruct_crop(&crop, &tokens, density, self.renderer.as_ref());
        match layer.outcome {
            TextOutcome::ResampledFallback => warnings.push(EnhanceWarning::TextFallback),
            TextOutcome::Rendered { .. } if self.renderer.font_source().is_builtin() => {
                warnings.push(EnhanceWarning::FontFallback)
            }
            TextOutcome::Rendered { .. } => {}
        }
        Ok((layer, warnings))
    }
}

fn ensure_not_empty(image: &RasterBuffer) -> Result<()> {
    if image.is_empty() {
        return Err(UprezError::InvalidInput(format!(
            "{}x{} raster has no pixels",
            image.width(),
            image.height()
        )));
    }
    Ok(())
}

#[cfg(feature = "superres")]
fn default_upsampler(config: &EnhanceConfig) -> Result<Box<dyn Upsampler>> {
    match &config.superres.model_path {
        Some(path) => Ok(Box::new(crate::pictorial::RtenUpsampler::load(
            path,
            config.superres.factor,
        )?)),
        None => Ok(Box::new(ResampleUpsampler::new(config.superres.factor))),
    }
}

#[cfg(not(feature = "superres"))]
fn default_upsampler(config: &EnhanceConfig) -> Result<Box<dyn Upsampler>> {
    if let Some(path) = &config.superres.model_path {
        warn!(
            path = %path.display(),
            "Built without the superres feature; ignoring model and resampling instead"
        );
    }
    Ok(Box::new(ResampleUpsampler::new(config.superres.factor)))
}
