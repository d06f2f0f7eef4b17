// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration. Every classification constant is tunable here;
// the defaults are the values the segmenter was tuned with.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, UprezError};
use crate::types::{DEFAULT_DPI, DensityPair};

/// Complete configuration for one enhancement pipeline instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceConfig {
    pub segmentation: SegmentationConfig,
    pub refine: RefineConfig,
    pub text: TextConfig,
    pub compose: ComposeConfig,
    pub density: DensityConfig,
    pub superres: SuperResConfig,
}

/// Region segmentation thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Resampling factors for multi-scale text detection.
    pub text_scales: Vec<f32>,
    /// Half-size of the adaptive threshold window (5 → 11×11).
    pub adaptive_block_radius: u32,
    /// Offset subtracted from the local mean.
    pub adaptive_offset: i32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Closing radius applied per scale (1 → 3×3).
    pub scale_close_radius: u8,
    /// Closing radius applied after the per-scale union (2 → 5×5).
    pub final_close_radius: u8,
    /// Components smaller than this (pixels, at detection scale) are dropped.
    pub min_text_component: u32,
    /// Dilation radius joining edge fragments before contour extraction.
    pub pictorial_dilate_radius: u8,
    /// Contours must enclose more than this many square pixels.
    pub min_pictorial_area: f64,
    /// `perimeter / sqrt(area)` must fall below this to count as pictorial.
    pub complexity_threshold: f64,
    /// HSV saturation (0..=255) above which a pixel is pictorial.
    pub saturation_threshold: u8,
    /// Run the per-scale passes, and the text and pictorial branches of
    /// enhancement, on the rayon pool.
    pub parallel: bool,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            text_scales: vec![0.5, 1.0, 1.5],
            adaptive_block_radius: 5,
            adaptive_offset: 2,
            canny_low: 100.0,
            canny_high: 200.0,
            scale_close_radius: 1,
            final_close_radius: 2,
            min_text_component: 10,
            pictorial_dilate_radius: 4,
            min_pictorial_area: 1000.0,
            complexity_threshold: 15.0,
            saturation_threshold: 100,
            parallel: true,
        }
    }
}

/// Mask refinement thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineConfig {
    pub min_text_component: u32,
    pub min_pictorial_component: u32,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            min_text_component: 50,
            min_pictorial_component: 100,
        }
    }
}

/// Text reconstruction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Tokens must score strictly above this to be rendered.
    pub min_confidence: f32,
    /// Floor for the scaled font size, in pixels.
    pub min_font_size: u32,
    /// Font size assumed when no token qualifies for estimation.
    pub default_font_size: u32,
    /// Preferred TrueType/OpenType font. System fonts and the built-in
    /// bitmap font are tried after it.
    pub font_path: Option<PathBuf>,
    /// Sharpen the text layer when the resample fallback fires.
    pub sharpen_fallback: bool,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            min_confidence: 60.0,
            min_font_size: 12,
            default_font_size: 12,
            font_path: None,
            sharpen_fallback: false,
        }
    }
}

/// Compositing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Channel values at or above this become 255, the rest 0.
    pub binarize_threshold: u8,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            binarize_threshold: 128,
        }
    }
}

/// Accepted density window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityConfig {
    pub min_target_dpi: u32,
    pub max_target_dpi: u32,
    /// Density assumed when the source container has none.
    pub default_dpi: u32,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            min_target_dpi: 72,
            max_target_dpi: 2400,
            default_dpi: DEFAULT_DPI,
        }
    }
}

impl DensityConfig {
    /// Build a [`DensityPair`] and check the target against the window.
    pub fn check(&self, original_dpi: u32, target_dpi: u32) -> Result<DensityPair> {
        let pair = DensityPair::new(original_dpi, target_dpi)?;
        if !(self.min_target_dpi..=self.max_target_dpi).contains(&target_dpi) {
            return Err(UprezError::InvalidDensity(format!(
                "target density {target_dpi} outside allowed range {}..={}",
                self.min_target_dpi, self.max_target_dpi
            )));
        }
        Ok(pair)
    }
}

/// Super-resolution model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuperResConfig {
    /// Path to a learned model. Without one, a fixed-factor resampler
    /// stands in.
    pub model_path: Option<PathBuf>,
    /// Integer factor the model upsamples by.
    pub factor: u32,
}

impl Default for SuperResConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            factor: 4,
        }
    }
}

impl EnhanceConfig {
    /// Load a configuration from a JSON file. Missing keys take defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Reject settings that would make a stage meaningless.
    pub fn validate(&self) -> Result<()> {
        let seg = &self.segmentation;
        if seg.text_scales.is_empty() {
            return Err(UprezError::Config("text_scales must not be empty".into()));
        }
        if let Some(bad) = seg.text_scales.iter().find(|s| !(**s > 0.0 && s.is_finite())) {
            return Err(UprezError::Config(format!(
                "text scale {bad} must be a positive finite number"
            )));
        }
        if seg.canny_low > seg.canny_high {
            return Err(UprezError::Config(format!(
                "canny_low ({}) exceeds canny_high ({})",
                seg.canny_low, seg.canny_high
            )));
        }
        if self.superres.factor == 0 {
            return Err(UprezError::Config("superres.factor must be at least 1".into()));
        }
        let density = &self.density;
        if density.default_dpi == 0 || density.min_target_dpi > density.max_target_dpi {
            return Err(UprezError::Config(format!(
                "density window {}..={} (default {}) is empty or invalid",
                density.min_target_dpi, density.max_target_dpi, density.default_dpi
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_constants() {
        let config = EnhanceConfig::default();
        assert_eq!(config.segmentation.text_scales, vec![0.5, 1.0, 1.5]);
        assert_eq!(config.segmentation.saturation_threshold, 100);
        assert_eq!(config.segmentation.complexity_threshold, 15.0);
        assert_eq!(config.refine.min_text_component, 50);
        assert_eq!(config.refine.min_pictorial_component, 100);
        assert_eq!(config.text.min_confidence, 60.0);
        assert_eq!(config.superres.factor, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn density_window_is_enforced() {
        let density = DensityConfig::default();
        assert!(density.check(150, 300).is_ok());
        assert!(density.check(150, 71).is_err());
        assert!(density.check(150, 2401).is_err());
        assert!(density.check(0, 300).is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: EnhanceConfig =
            serde_json::from_str(r#"{ "segmentation": { "saturation_threshold": 80 } }"#).unwrap();
        assert_eq!(config.segmentation.saturation_threshold, 80);
        assert_eq!(config.segmentation.complexity_threshold, 15.0);
        assert_eq!(config.compose.binarize_threshold, 128);
    }

    #[test]
    fn validate_rejects_empty_scales() {
        let mut config = EnhanceConfig::default();
        config.segmentation.text_scales.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_canny() {
        let mut config = EnhanceConfig::default();
        config.segmentation.canny_low = 250.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uprez.json");
        let mut config = EnhanceConfig::default();
        config.text.min_confidence = 75.0;
        config.save(&path).unwrap();
        let loaded = EnhanceConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
