// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Resampling kernels keyed by `InterpolationMethod`.

use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};
use uprez_core::InterpolationMethod;

/// The `image` filter backing an interpolation method.
pub fn filter_for(method: InterpolationMethod) -> FilterType {
    match method {
        InterpolationMethod::Nearest => FilterType::Nearest,
        InterpolationMethod::Bilinear => FilterType::Triangle,
        InterpolationMethod::Bicubic => FilterType::CatmullRom,
        InterpolationMethod::Lanczos => FilterType::Lanczos3,
    }
}

/// Resize an RGB image to exactly `width` × `height`.
pub fn resize_rgb(
    image: &RgbImage,
    width: u32,
    height: u32,
    method: InterpolationMethod,
) -> RgbImage {
    if width == 0 || height == 0 || image.width() == 0 || image.height() == 0 {
        return RgbImage::new(width, height);
    }
    imageops::resize(image, width, height, filter_for(method))
}

/// Resize a grayscale image to exactly `width` × `height`.
pub fn resize_gray(
    image: &GrayImage,
    width: u32,
    height: u32,
    method: InterpolationMethod,
) -> GrayImage {
    if width == 0 || height == 0 || image.width() == 0 || image.height() == 0 {
        return GrayImage::new(width, height);
    }
    imageops::resize(image, width, height, filter_for(method))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn methods_map_to_distinct_kernels() {
        let filters: Vec<FilterType> = InterpolationMethod::ALL.into_iter().map(filter_for).collect();
        assert_eq!(
            filters,
            vec![
                FilterType::Nearest,
                FilterType::Triangle,
                FilterType::CatmullRom,
                FilterType::Lanczos3,
            ]
        );
    }

    #[test]
    fn nearest_upscale_replicates_pixels() {
        let img = RgbImage::from_fn(2, 1, |x, _| if x == 0 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) });
        let out = resize_rgb(&img, 4, 2, InterpolationMethod::Nearest);
        assert_eq!(out.dimensions(), (4, 2));
        assert_eq!(out.get_pixel(0, 1).0, [0, 0, 0]);
        assert_eq!(out.get_pixel(3, 0).0, [255, 255, 255]);
    }

    #[test]
    fn zero_target_yields_empty() {
        let img = GrayImage::new(4, 4);
        assert_eq!(resize_gray(&img, 0, 3, InterpolationMethod::Lanczos).dimensions(), (0, 3));
    }
}
