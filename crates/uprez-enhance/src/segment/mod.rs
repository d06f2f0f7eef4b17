// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Segmentation module: text/pictorial masks and their refinement.

pub mod morphology;
pub mod refine;
pub mod segmenter;

pub use refine::MaskRefiner;
pub use segmenter::RegionSegmenter;

use crate::raster::Mask;

/// The two classification masks of one page. Both match the page size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedMasks {
    pub text: Mask,
    pub pictorial: Mask,
}

impl SegmentedMasks {
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            text: Mask::new(width, height),
            pictorial: Mask::new(width, height),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.text.dimensions()
    }

    /// True when no pixel is classified as both text and pictorial.
    pub fn is_disjoint(&self) -> bool {
        self.text.is_disjoint(&self.pictorial)
    }
}
