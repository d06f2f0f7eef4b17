// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// uprez-enhance: Resolution enhancement for scanned pages.
//
// Classifies each page into text and pictorial regions, re-typesets the text
// from OCR tokens, upscales the pictures with a fixed-factor super-resolution
// backend, and composites both into a bi-level page at the target density.

pub mod background;
pub mod compose;
pub mod pictorial;
pub mod pipeline;
pub mod preview;
pub mod raster;
pub mod recognize;
pub mod segment;
pub mod sharpen;
pub mod text;

// Re-export the primary types so callers can use `uprez_enhance::EnhancementPipeline` etc.
pub use compose::{Composite, Compositor};
pub use pictorial::{PictorialUpscaler, ResampleUpsampler, Upsampler};
pub use pipeline::{EnhanceWarning, EnhancementPipeline, EnhancementResult};
pub use raster::{Mask, RasterBuffer};
pub use recognize::{NullRecognizer, TextRecognizer};
pub use segment::{MaskRefiner, RegionSegmenter, SegmentedMasks};
pub use text::{FontRenderer, FontSource, GlyphRenderer, TextOutcome, TextReconstructor};

#[cfg(feature = "ocr")]
pub use recognize::{OcrConfig, OcrsRecognizer};

#[cfg(feature = "superres")]
pub use pictorial::RtenUpsampler;
