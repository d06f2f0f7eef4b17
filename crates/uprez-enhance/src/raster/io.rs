// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster container I/O with pixel-density metadata.
//
// Pixels are decoded through `image`; density is read from and written to
// the container directly because `image` does not surface it:
//
// - TIFF: `XResolution` + `ResolutionUnit` tags (`tiff` crate)
// - PNG: `pHYs` chunk (`png` crate)
// - JPEG: JFIF APP0 density fields

use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::Path;

use image::ImageFormat;
use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use tracing::{debug, info, instrument, warn};
use uprez_core::DEFAULT_DPI;
use uprez_core::error::{Result, UprezError};

use super::buffer::RasterBuffer;

const METRES_PER_INCH: f64 = 0.0254;
const CM_PER_INCH: f64 = 2.54;
const JPEG_QUALITY: u8 = 95;

/// Load a page and its density, defaulting to 72 DPI when the container
/// carries none.
pub fn load(path: impl AsRef<Path>) -> Result<(RasterBuffer, u32)> {
    load_with_default(path, DEFAULT_DPI)
}

/// Load a page and its density, using `default_dpi` when the container
/// carries none.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_with_default(
    path: impl AsRef<Path>,
    default_dpi: u32,
) -> Result<(RasterBuffer, u32)> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(UprezError::InvalidInput(format!(
            "source raster {} not found",
            path.display()
        )));
    }

    let decoded = image::open(path).map_err(|err| {
        UprezError::ImageError(format!("failed to open {}: {}", path.display(), err))
    })?;
    let raster = RasterBuffer::from_rgb(decoded.to_rgb8());
    if raster.is_empty() {
        return Err(UprezError::InvalidInput(format!(
            "{} has zero width or height",
            path.display()
        )));
    }

    let dpi = read_density(path).unwrap_or_else(|| {
        debug!(default_dpi, "No density metadata; using default");
        default_dpi
    });

    info!(
        width = raster.width(),
        height = raster.height(),
        dpi,
        "Raster loaded"
    );
    Ok((raster, dpi))
}

/// Save a raster tagged with `dpi`. The container is chosen from the
/// file extension.
#[instrument(skip(raster), fields(path = %path.as_ref().display(), width = raster.width(), height = raster.height()))]
pub fn save(raster: &RasterBuffer, path: impl AsRef<Path>, dpi: u32) -> Result<()> {
    let path = path.as_ref();
    if dpi == 0 {
        return Err(UprezError::InvalidDensity("cannot tag output with 0 DPI".into()));
    }

    match ImageFormat::from_path(path).ok() {
        Some(ImageFormat::Tiff) => save_tiff(raster, path, dpi)?,
        Some(ImageFormat::Png) => save_png(raster, path, dpi)?,
        Some(ImageFormat::Jpeg) => save_jpeg(raster, path, dpi)?,
        other => {
            warn!(format = ?other, "Container has no density support here; writing without DPI");
            raster.as_rgb().save(path).map_err(|err| {
                UprezError::ImageError(format!(
                    "failed to save image to {}: {}",
                    path.display(),
                    err
                ))
            })?;
        }
    }

    info!(dpi, "Raster saved");
    Ok(())
}

/// Density recorded in the container, if any.
pub fn read_density(path: &Path) -> Option<u32> {
    let dpi = match ImageFormat::from_path(path).ok()? {
        ImageFormat::Tiff => read_tiff_density(path),
        ImageFormat::Png => read_png_density(path),
        ImageFormat::Jpeg => read_jpeg_density(path),
        _ => None,
    };
    dpi.filter(|d| *d > 0)
}

// -- TIFF ---------------------------------------------------------------------

fn read_tiff_density(path: &Path) -> Option<u32> {
    use tiff::decoder::Decoder;
    use tiff::decoder::ifd::Value;
    use tiff::tags::Tag;

    let file = File::open(path).ok()?;
    let mut decoder = Decoder::new(BufReader::new(file)).ok()?;

    let per_unit = match decoder.find_tag(Tag::XResolution).ok()?? {
        Value::Rational(n, d) if d != 0 => n as f64 / d as f64,
        Value::Short(v) => v as f64,
        Value::Unsigned(v) => v as f64,
        other => {
            debug!(?other, "Unexpected XResolution encoding");
            return None;
        }
    };

    // ResolutionUnit: 1 = none, 2 = inch (default), 3 = centimetre.
    let unit = decoder
        .find_tag(Tag::ResolutionUnit)
        .ok()
        .flatten()
        .and_then(|v| v.into_u32().ok())
        .unwrap_or(2);

    match unit {
        2 => Some(per_unit.round() as u32),
        3 => Some((per_unit * CM_PER_INCH).round() as u32),
        _ => None,
    }
}

fn save_tiff(raster: &RasterBuffer, path: &Path, dpi: u32) -> Result<()> {
    use tiff::encoder::{Rational, TiffEncoder, colortype};
    use tiff::tags::ResolutionUnit;

    let tiff_err = |err: tiff::TiffError| {
        UprezError::ImageError(format!("TIFF encoding of {} failed: {}", path.display(), err))
    };

    let file = BufWriter::new(File::create(path)?);
    let mut encoder = TiffEncoder::new(file).map_err(tiff_err)?;
    let (width, height) = raster.dimensions();
    let mut image = encoder
        .new_image::<colortype::RGB8>(width, height)
        .map_err(tiff_err)?;
    image.resolution(ResolutionUnit::Inch, Rational { n: dpi, d: 1 });
    image.write_data(raster.as_rgb().as_raw()).map_err(tiff_err)?;
    Ok(())
}

// -- PNG ----------------------------------------------------------------------

fn read_png_density(path: &Path) -> Option<u32> {
    let file = File::open(path).ok()?;
    let reader = png::Decoder::new(BufReader::new(file)).read_info().ok()?;
    let dims = reader.info().pixel_dims?;
    match dims.unit {
        png::Unit::Meter => Some((dims.xppu as f64 * METRES_PER_INCH).round() as u32),
        png::Unit::Unspecified => None,
    }
}

fn save_png(raster: &RasterBuffer, path: &Path, dpi: u32) -> Result<()> {
    let png_err = |err: png::EncodingError| {
        UprezError::ImageError(format!("PNG encoding of {} failed: {}", path.display(), err))
    };

    let (width, height) = raster.dimensions();
    let ppm = (dpi as f64 / METRES_PER_INCH).round() as u32;

    let file = BufWriter::new(File::create(path)?);
    let mut encoder = png::Encoder::new(file, width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_pixel_dims(Some(png::PixelDimensions {
        xppu: ppm,
        yppu: ppm,
        unit: png::Unit::Meter,
    }));
    let mut writer = encoder.write_header().map_err(png_err)?;
    writer
        .write_image_data(raster.as_rgb().as_raw())
        .map_err(png_err)?;
    writer.finish().map_err(png_err)?;
    Ok(())
}

// -- JPEG ---------------------------------------------------------------------

fn read_jpeg_density(path: &Path) -> Option<u32> {
    let mut header = [0u8; 64];
    let mut file = File::open(path).ok()?;
    let read = file.read(&mut header).ok()?;
    parse_jfif_density(&header[..read])
}

/// Extract the X density from a JFIF APP0 segment at the start of a JPEG.
fn parse_jfif_density(bytes: &[u8]) -> Option<u32> {
    // SOI, APP0 marker, 2-byte length, "JFIF\0", version (2), units, Xdensity (2).
    if bytes.len() < 16 || bytes[0..4] != [0xFF, 0xD8, 0xFF, 0xE0] || &bytes[6..11] != b"JFIF\0" {
        return None;
    }
    let units = bytes[13];
    let x_density = u16::from_be_bytes([bytes[14], bytes[15]]) as f64;
    match units {
        1 => Some(x_density.round() as u32),
        2 => Some((x_density * CM_PER_INCH).round() as u32),
        _ => None,
    }
}

fn save_jpeg(raster: &RasterBuffer, path: &Path, dpi: u32) -> Result<()> {
    let density = u16::try_from(dpi).map_err(|_| {
        UprezError::InvalidDensity(format!("{dpi} DPI exceeds the JFIF density field"))
    })?;

    let mut file = BufWriter::new(File::create(path)?);
    let mut encoder = JpegEncoder::new_with_quality(&mut file, JPEG_QUALITY);
    encoder.set_pixel_density(PixelDensity::dpi(density));
    encoder.encode_image(raster.as_rgb()).map_err(|err| {
        UprezError::ImageError(format!("JPEG encoding of {} failed: {}", path.display(), err))
    })?;
    Ok(())
}
