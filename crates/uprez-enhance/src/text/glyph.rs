// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Glyph rendering: outline fonts through `ab_glyph`, with a built-in bitmap
// font that is always available.

use std::fmt;
use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use tracing::{debug, info, warn};
use uprez_core::error::{Result, UprezError};

use super::bitmap_font;

/// Outline fonts tried when no preferred font loads.
const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Draws a string onto a canvas.
pub trait GlyphRenderer: Send + Sync {
    /// Render `text` with its top-left corner at (`x`, `y`) and a glyph
    /// height of `size` pixels. Drawing outside the canvas is clipped.
    fn render_text(
        &self,
        canvas: &mut RgbImage,
        x: i32,
        y: i32,
        size: f32,
        text: &str,
        color: Rgb<u8>,
    );

    /// Where the glyphs come from.
    fn font_source(&self) -> &FontSource;
}

/// The font a renderer ended up with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    TrueType(PathBuf),
    Builtin,
}

impl FontSource {
    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin)
    }
}

impl fmt::Display for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TrueType(path) => write!(f, "{}", path.display()),
            Self::Builtin => f.write_str("built-in 5x7 bitmap"),
        }
    }
}

/// Production renderer. Loading never fails; the worst case is the
/// bitmap font.
pub struct FontRenderer {
    font: Option<FontVec>,
    source: FontSource,
}

impl fmt::Debug for FontRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontRenderer")
            .field("source", &self.source)
            .finish()
    }
}

impl Default for FontRenderer {
    fn default() -> Self {
        Self::load(None)
    }
}

impl FontRenderer {
    /// Try `preferred`, then the usual system locations, then fall back to
    /// the built-in font.
    pub fn load(preferred: Option<&Path>) -> Self {
        if let Some(path) = preferred {
            match Self::from_file(path) {
                Ok(renderer) => return renderer,
                Err(err) => warn!(error = %err, "Preferred font unavailable; searching system fonts"),
            }
        }

        for candidate in SYSTEM_FONT_PATHS {
            if let Ok(renderer) = Self::from_file(Path::new(candidate)) {
                return renderer;
            }
        }

        debug!("No outline font found; using built-in bitmap font");
        Self::builtin()
    }

    /// A renderer that only uses the built-in font.
    pub fn builtin() -> Self {
        Self {
            font: None,
            source: FontSource::Builtin,
        }
    }

    /// Load exactly one outline font file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|err| {
            UprezError::FontError(format!("cannot read {}: {}", path.display(), err))
        })?;
        let font = FontVec::try_from_vec(data).map_err(|_| {
            UprezError::FontError(format!("{} is not a parseable font", path.display()))
        })?;
        info!(path = %path.display(), "Loaded font");
        Ok(Self {
            font: Some(font),
            source: FontSource::TrueType(path.to_path_buf()),
        })
    }
}

impl GlyphRenderer for FontRenderer {
    fn render_text(
        &self,
        canvas: &mut RgbImage,
        x: i32,
        y: i32,
        size: f32,
        text: &str,
        color: Rgb<u8>,
    ) {
        match &self.font {
            Some(font) => draw_text_mut(canvas, color, x, y, PxScale::from(size), font, text),
            None => bitmap_font::draw_text(canvas, x, y, size, text, color),
        }
    }

    fn font_source(&self) -> &FontSource {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_preferred_font_still_renders() {
        let renderer = FontRenderer::load(Some(Path::new("/nonexistent/uprez/font.ttf")));
        let mut canvas = RgbImage::new(120, 60);
        renderer.render_text(&mut canvas, 5, 5, 24.0, "Hello", Rgb([255, 255, 255]));
        assert!(canvas.pixels().any(|p| p.0[0] > 0));
    }

    #[test]
    fn garbage_font_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();
        let err = FontRenderer::from_file(&path).unwrap_err();
        assert!(matches!(err, UprezError::FontError(_)));
        let renderer = FontRenderer::load(Some(&path));
        assert_ne!(renderer.font_source(), &FontSource::TrueType(path));
    }

    #[test]
    fn builtin_renderer_reports_source() {
        let renderer = FontRenderer::builtin();
        assert!(renderer.font_source().is_builtin());
        let mut canvas = RgbImage::new(60, 20);
        renderer.render_text(&mut canvas, 0, 0, 12.0, "ok", Rgb([255, 255, 255]));
        assert!(canvas.pixels().any(|p| p.0 == [255, 255, 255]));
    }
}
