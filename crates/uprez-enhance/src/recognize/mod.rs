// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text recognition backends.
//
// The pipeline only needs token geometry, text, and a confidence score; the
// engine that produces them is pluggable.

use uprez_core::OcrToken;
use uprez_core::error::Result;

use crate::raster::RasterBuffer;

#[cfg(feature = "ocr")]
pub mod ocrs;

#[cfg(feature = "ocr")]
pub use self::ocrs::{OcrConfig, OcrsRecognizer};

/// Produces OCR tokens for a (masked) page.
///
/// Token order carries no meaning. An `Err` is not fatal to a run: the
/// pipeline treats it as "no tokens" and reports a warning.
pub trait TextRecognizer: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    fn recognize(&self, image: &RasterBuffer) -> Result<Vec<OcrToken>>;
}

/// A recognizer that never finds anything, so text reconstruction always
/// takes the resample path. Used when no OCR models are configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRecognizer;

impl TextRecognizer for NullRecognizer {
    fn name(&self) -> &str {
        "none"
    }

    fn recognize(&self, _image: &RasterBuffer) -> Result<Vec<OcrToken>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_recognizer_finds_nothing() {
        let tokens = NullRecognizer.recognize(&RasterBuffer::new(10, 10)).unwrap();
        assert!(tokens.is_empty());
        assert_eq!(NullRecognizer.name(), "none");
    }
}
