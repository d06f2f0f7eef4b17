// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text module: glyph rendering and high-resolution text reconstruction.

mod bitmap_font;
pub mod glyph;
pub mod reconstruct;

pub use glyph::{FontRenderer, FontSource, GlyphRenderer};
pub use reconstruct::{TextLayer, TextOutcome, TextReconstructor};
