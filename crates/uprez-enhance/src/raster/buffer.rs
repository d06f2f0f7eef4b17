// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory page representation: an interleaved 3-channel byte raster and
// the binary masks derived from it.

use image::{GrayImage, Luma, Rgb, RgbImage};
use uprez_core::InterpolationMethod;
use uprez_core::error::{Result, UprezError};

use super::resample;

/// Mask value for a set pixel.
pub const MASK_ON: u8 = 255;
/// Mask value for a clear pixel.
pub const MASK_OFF: u8 = 0;

/// An H×W×3 byte raster, row-major with no padding.
///
/// Stages hand buffers to each other by value; the pipeline only ever
/// borrows the original page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    pixels: RgbImage,
}

impl RasterBuffer {
    // -- Construction ---------------------------------------------------------

    /// An all-black buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbImage::new(width, height),
        }
    }

    /// A buffer filled with one colour.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        Self {
            pixels: RgbImage::from_pixel(width, height, Rgb(rgb)),
        }
    }

    pub fn from_rgb(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    /// Wrap raw interleaved RGB bytes. The length must be exactly
    /// `width * height * 3`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let len = data.len();
        let expected = width as usize * height as usize * 3;
        if len != expected {
            return Err(UprezError::InvalidInput(format!(
                "{len} bytes do not form a {width}x{height} RGB raster ({expected} expected)"
            )));
        }
        RgbImage::from_raw(width, height, data)
            .map(Self::from_rgb)
            .ok_or_else(|| UprezError::InvalidInput(format!("{width}x{height} raster overflows")))
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn as_rgb_mut(&mut self) -> &mut RgbImage {
        &mut self.pixels
    }

    pub fn into_rgb(self) -> RgbImage {
        self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.pixels.get_pixel(x, y).0
    }

    // -- Derived channels -----------------------------------------------------

    /// Single-channel luminance.
    pub fn luminance(&self) -> GrayImage {
        image::imageops::grayscale(&self.pixels)
    }

    /// HSV saturation scaled to 0..=255 (`255 * (max - min) / max`).
    pub fn saturation(&self) -> GrayImage {
        let (width, height) = self.dimensions();
        GrayImage::from_fn(width, height, |x, y| {
            Luma([pixel_saturation(self.pixels.get_pixel(x, y).0)])
        })
    }

    // -- Whole-buffer predicates ----------------------------------------------

    /// True when every channel of every pixel is 0.
    pub fn is_all_black(&self) -> bool {
        self.pixels.as_raw().iter().all(|&v| v == 0)
    }

    /// True when every channel of every pixel is 255.
    pub fn is_all_white(&self) -> bool {
        self.pixels.as_raw().iter().all(|&v| v == 255)
    }

    // -- Transformations ------------------------------------------------------

    /// Copy of this buffer with every pixel outside `mask` zeroed.
    pub fn masked(&self, mask: &Mask) -> Result<Self> {
        mask.ensure_matches(self.dimensions())?;
        let mut out = self.pixels.clone();
        for (pixel, m) in out.pixels_mut().zip(mask.as_gray().pixels()) {
            if m.0[0] == MASK_OFF {
                *pixel = Rgb([0, 0, 0]);
            }
        }
        Ok(Self { pixels: out })
    }

    /// Resample to exactly `width` × `height`.
    pub fn resample(&self, width: u32, height: u32, method: InterpolationMethod) -> Self {
        if self.dimensions() == (width, height) {
            return self.clone();
        }
        Self {
            pixels: resample::resize_rgb(&self.pixels, width, height, method),
        }
    }
}

/// HSV saturation of one RGB pixel on a 0..=255 scale.
pub fn pixel_saturation([r, g, b]: [u8; 3]) -> u8 {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max == 0 {
        return 0;
    }
    ((255.0 * (max - min) as f32) / max as f32).round() as u8
}

/// An H×W binary mask whose values are restricted to {0, 255}.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    pixels: GrayImage,
}

impl Mask {
    /// An all-clear mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: GrayImage::new(width, height),
        }
    }

    /// An all-set mask.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            pixels: GrayImage::from_pixel(width, height, Luma([MASK_ON])),
        }
    }

    /// Wrap a grayscale image, treating any non-zero value as set.
    pub fn from_gray(gray: GrayImage) -> Self {
        let mut pixels = gray;
        for p in pixels.pixels_mut() {
            if p.0[0] != MASK_OFF {
                p.0[0] = MASK_ON;
            }
        }
        Self { pixels }
    }

    /// Build a mask from a per-pixel predicate.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        Self {
            pixels: GrayImage::from_fn(width, height, |x, y| {
                Luma([if f(x, y) { MASK_ON } else { MASK_OFF }])
            }),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.pixels
    }

    pub fn into_gray(self) -> GrayImage {
        self.pixels
    }

    /// Three-channel copy for saving or display: set pixels white.
    pub fn to_raster(&self) -> RasterBuffer {
        RasterBuffer::from_rgb(image::DynamicImage::ImageLuma8(self.pixels.clone()).to_rgb8())
    }

    pub fn is_set(&self, x: u32, y: u32) -> bool {
        self.pixels.get_pixel(x, y).0[0] == MASK_ON
    }

    pub fn set(&mut self, x: u32, y: u32, on: bool) {
        self.pixels
            .put_pixel(x, y, Luma([if on { MASK_ON } else { MASK_OFF }]));
    }

    /// Number of set pixels.
    pub fn count(&self) -> usize {
        self.pixels.as_raw().iter().filter(|&&v| v == MASK_ON).count()
    }

    pub fn is_clear(&self) -> bool {
        self.pixels.as_raw().iter().all(|&v| v == MASK_OFF)
    }

    /// Per-pixel union.
    pub fn union(mut self, other: &Mask) -> Result<Self> {
        other.ensure_matches(self.dimensions())?;
        let data: &mut [u8] = &mut self.pixels;
        for (a, b) in data.iter_mut().zip(other.pixels.as_raw()) {
            *a = (*a).max(*b);
        }
        Ok(self)
    }

    /// Clear every pixel set in `other`.
    pub fn subtract(mut self, other: &Mask) -> Result<Self> {
        other.ensure_matches(self.dimensions())?;
        let data: &mut [u8] = &mut self.pixels;
        for (a, b) in data.iter_mut().zip(other.pixels.as_raw()) {
            if *b == MASK_ON {
                *a = MASK_OFF;
            }
        }
        Ok(self)
    }

    /// True when no pixel is set in both masks.
    pub fn is_disjoint(&self, other: &Mask) -> bool {
        self.dimensions() == other.dimensions()
            && self
                .pixels
                .as_raw()
                .iter()
                .zip(other.pixels.as_raw())
                .all(|(a, b)| !(*a == MASK_ON && *b == MASK_ON))
    }

    pub(crate) fn ensure_matches(&self, (width, height): (u32, u32)) -> Result<()> {
        if self.dimensions() != (width, height) {
            return Err(UprezError::InvalidInput(format!(
                "mask is {}x{} but raster is {width}x{height}",
                self.width(),
                self.height()
            )));
        }
        Ok(())
    }
}
