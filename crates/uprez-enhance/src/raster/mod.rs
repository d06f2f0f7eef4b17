// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster module: page buffers, binary masks, resampling, and container I/O.

pub mod buffer;
pub mod io;
pub mod resample;

pub use buffer::{MASK_OFF, MASK_ON, Mask, RasterBuffer};
