// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Word-level OCR backed by `ocrs`, a pure-Rust engine running its
// detection and recognition networks through `rten`.
//
// # Feature Gate
//
// Only compiled with the `ocr` feature:
//
// ```toml
// uprez-enhance = { path = "crates/uprez-enhance", features = ["ocr"] }
// ```
//
// # Models
//
// Two model files are required, `text-detection.rten` and
// `text-recognition.rten`. Running `ocrs-cli` once downloads them to
// `$XDG_CACHE_HOME/ocrs` (typically `~/.cache/ocrs`), which is also the
// default lookup directory here.
//
// `ocrs` and `rten` must be built in release mode; debug builds are one to
// two orders of magnitude slower.

use std::path::{Path, PathBuf};

use ocrs::{ImageSource, OcrEngine, OcrEngineParams, TextItem};
use rten::Model;
use rten_imageproc::Rect;
use tracing::{debug, info, instrument};
use uprez_core::OcrToken;
use uprez_core::error::{Result, UprezError};

use super::TextRecognizer;
use crate::raster::RasterBuffer;

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// `ocrs` reports no per-word score; recognized words count as certain.
const WORD_CONFIDENCE: f32 = 100.0;

fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Locations of the two `ocrs` model files.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub detection_model_path: PathBuf,
    pub recognition_model_path: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrConfig {
    /// Expect both well-known model files inside `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (role, path) in [
            ("detection", &self.detection_model_path),
            ("recognition", &self.recognition_model_path),
        ] {
            if !path.exists() {
                return Err(UprezError::OcrError(format!(
                    "{role} model not found at {}; run `ocrs-cli` once to download models",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// [`TextRecognizer`] producing one token per recognized word.
pub struct OcrsRecognizer {
    engine: OcrEngine,
}

impl OcrsRecognizer {
    /// Load both models. This is the expensive step; build once and reuse.
    #[instrument(skip_all, fields(
        detection = %config.detection_model_path.display(),
        recognition = %config.recognition_model_path.display(),
    ))]
    pub fn new(config: OcrConfig) -> Result<Self> {
        config.validate()?;

        let load = |role: &str, path: &Path| {
            info!(role, "Loading OCR model");
            Model::load_file(path).map_err(|err| {
                UprezError::OcrError(format!(
                    "failed to load {role} model from {}: {}",
                    path.display(),
                    err
                ))
            })
        };
        let detection_model = load("detection", &config.detection_model_path)?;
        let recognition_model = load("recognition", &config.recognition_model_path)?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| UprezError::OcrError(format!("failed to initialise OCR engine: {err}")))?;

        info!("OCR engine ready");
        Ok(Self { engine })
    }

    pub fn from_model_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::new(OcrConfig::from_dir(dir))
    }
}

impl TextRecognizer for OcrsRecognizer {
    fn name(&self) -> &str {
        "ocrs"
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn recognize(&self, image: &RasterBuffer) -> Result<Vec<OcrToken>> {
        let rgb = image.as_rgb();
        let source = ImageSource::from_bytes(rgb.as_raw(), rgb.dimensions()).map_err(|err| {
            UprezError::OcrError(format!(
                "failed to create image source ({}x{}): {}",
                rgb.width(),
                rgb.height(),
                err
            ))
        })?;

        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| UprezError::OcrError(format!("OCR preprocessing failed: {err}")))?;

        let word_rects = self
            .engine
            .detect_words(&input)
            .map_err(|err| UprezError::OcrError(format!("word detection failed: {err}")))?;
        let line_rects = self.engine.find_text_lines(&input, &word_rects);
        let lines = self
            .engine
            .recognize_text(&input, &line_rects)
            .map_err(|err| UprezError::OcrError(format!("line recognition failed: {err}")))?;
        debug!(
            words = word_rects.len(),
            lines = line_rects.len(),
            "OCR detection complete"
        );

        let mut tokens = Vec::new();
        for line in lines.iter().flatten() {
            for word in line.words() {
                let text: String = word.chars().iter().map(|c| c.char).collect();
                if text.trim().is_empty() {
                    continue;
                }
                tokens.push(token_from_rect(word.bounding_rect(), text));
            }
        }

        info!(tokens = tokens.len(), "OCR recognition complete");
        Ok(tokens)
    }
}

/// Clamp an engine rectangle, which may poke past the page edge, into
/// non-negative pixel geometry.
fn token_from_rect(rect: Rect, text: String) -> OcrToken {
    let left = rect.left().max(0);
    let top = rect.top().max(0);
    let right = rect.right().max(left);
    let bottom = rect.bottom().max(top);
    OcrToken::new(
        left as u32,
        top as u32,
        (right - left) as u32,
        (bottom - top) as u32,
        text,
        WORD_CONFIDENCE,
    )
}
