// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Uprez.

use thiserror::Error;

/// Top-level error type for all Uprez operations.
#[derive(Debug, Error)]
pub enum UprezError {
    // -- Input errors --
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid density: {0}")]
    InvalidDensity(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- External engines --
    #[error("OCR failed: {0}")]
    OcrError(String),

    #[error("super-resolution failed: {0}")]
    SuperResolution(String),

    #[error("font loading failed: {0}")]
    FontError(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl UprezError {
    /// Whether this error aborts an enhancement run.
    ///
    /// Recognition and font failures degrade to documented fallbacks; all
    /// other errors leave no safe way to produce output.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, UprezError::OcrError(_) | UprezError::FontError(_))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, UprezError>;
