// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Uprez enhancement pipeline.

use serde::{Deserialize, Serialize};

use crate::error::UprezError;

/// Density assumed when a container carries no resolution metadata.
pub const DEFAULT_DPI: u32 = 72;

/// Source and target pixel densities for one enhancement run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DensityPair {
    original_dpi: u32,
    target_dpi: u32,
}

impl DensityPair {
    /// Build a density pair, rejecting zero densities.
    ///
    /// Range checks against the configured target window live in
    /// [`crate::config::DensityConfig::check`].
    pub fn new(original_dpi: u32, target_dpi: u32) -> Result<Self, UprezError> {
        if original_dpi == 0 {
            return Err(UprezError::InvalidDensity(
                "original density must be positive".into(),
            ));
        }
        if target_dpi == 0 {
            return Err(UprezError::InvalidDensity(
                "target density must be positive".into(),
            ));
        }
        Ok(Self {
            original_dpi,
            target_dpi,
        })
    }

    pub fn original_dpi(&self) -> u32 {
        self.original_dpi
    }

    pub fn target_dpi(&self) -> u32 {
        self.target_dpi
    }

    /// `target / original`, possibly non-integer.
    pub fn scale_factor(&self) -> f64 {
        self.target_dpi as f64 / self.original_dpi as f64
    }

    /// Scale a pixel length by the density ratio, truncating toward zero.
    ///
    /// Never returns 0 for a non-zero input so that downstream buffers stay
    /// allocatable.
    pub fn scale_length(&self, length: u32) -> u32 {
        scale_length(length, self.scale_factor())
    }
}

/// Truncating scale with a small tolerance so that exact products such as
/// `100 * 1.44` are not lost to floating-point error.
pub fn scale_length(length: u32, factor: f64) -> u32 {
    if length == 0 {
        return 0;
    }
    let scaled = (length as f64 * factor + 1e-9).floor();
    (scaled as u32).max(1)
}

/// A recognized word or phrase with its source geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrToken {
    /// Left edge in original-image pixels.
    pub x: u32,
    /// Top edge in original-image pixels.
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Recognized text, possibly empty.
    pub text: String,
    /// Recognition confidence in `[0, 100]`.
    pub confidence: f32,
}

impl OcrToken {
    pub fn new(
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        text: impl Into<String>,
        confidence: f32,
    ) -> Self {
        Self {
            x,
            y,
            width,
            height,
            text: text.into(),
            confidence: confidence.clamp(0.0, 100.0),
        }
    }

    /// Whether the token carries something worth rendering at the given
    /// confidence threshold (strictly greater than, non-blank text).
    pub fn is_renderable(&self, min_confidence: f32) -> bool {
        self.confidence > min_confidence && !self.text.trim().is_empty()
    }
}

/// Resampling kernel for caller-selected resize steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMethod {
    Nearest,
    Bilinear,
    Bicubic,
    #[default]
    Lanczos,
}

impl InterpolationMethod {
    pub const ALL: [InterpolationMethod; 4] = [
        InterpolationMethod::Nearest,
        InterpolationMethod::Bilinear,
        InterpolationMethod::Bicubic,
        InterpolationMethod::Lanczos,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            InterpolationMethod::Nearest => "nearest",
            InterpolationMethod::Bilinear => "bilinear",
            InterpolationMethod::Bicubic => "bicubic",
            InterpolationMethod::Lanczos => "lanczos",
        }
    }
}

impl std::fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for InterpolationMethod {
    type Err = UprezError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        InterpolationMethod::ALL
            .into_iter()
            .find(|method| method.name() == lowered)
            .ok_or_else(|| {
                UprezError::InvalidInput(format!(
                    "unknown interpolation method '{s}' (expected nearest, bilinear, bicubic, or lanczos)"
                ))
            })
    }
}
