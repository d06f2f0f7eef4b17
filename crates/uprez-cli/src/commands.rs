// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommand handlers.

use std::path::Path;

use tracing::{info, warn};
use uprez_core::EnhanceConfig;
use uprez_core::error::{Result, UprezError};
use uprez_enhance::raster::io;
use uprez_enhance::{EnhancementPipeline, background, preview};

use crate::{EnhanceArgs, SegmentArgs};

/// Split point of the `--comparison` image.
const COMPARISON_SPLIT: f32 = 0.5;

fn load_config(path: Option<&Path>) -> Result<EnhanceConfig> {
    match path {
        Some(path) => EnhanceConfig::load(path),
        None => Ok(EnhanceConfig::default()),
    }
}

pub fn enhance(args: EnhanceArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if args.font.is_some() {
        config.text.font_path = args.font.clone();
    }
    if args.sr_model.is_some() {
        config.superres.model_path = args.sr_model.clone();
    }

    let (image, container_dpi) = io::load_with_default(&args.input, config.density.default_dpi)?;
    let source_dpi = args.source_dpi.unwrap_or(container_dpi);

    let pipeline = EnhancementPipeline::new(config)?;
    let pipeline = match args.ocr_models.as_deref() {
        Some(dir) => attach_recognizer(pipeline, dir),
        None => pipeline,
    };

    let result = pipeline.enhance(&image, source_dpi, args.target_dpi, args.interpolation)?;
    io::save(&result.image, &args.output, result.dpi)?;

    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }
    println!(
        "{} -> {} ({}x{} at {} DPI)",
        args.input.display(),
        args.output.display(),
        result.image.width(),
        result.image.height(),
        result.dpi
    );

    if let Some(path) = &args.comparison {
        let side_by_side = preview::split_comparison(
            &image,
            &result.image,
            COMPARISON_SPLIT,
            args.interpolation,
        )?;
        io::save(&side_by_side, path, source_dpi)?;
        info!(path = %path.display(), "Comparison written");
    }
    Ok(())
}

#[cfg(feature = "ocr")]
fn attach_recognizer(pipeline: EnhancementPipeline, dir: &Path) -> EnhancementPipeline {
    match uprez_enhance::OcrsRecognizer::from_model_dir(dir) {
        Ok(recognizer) => pipeline.with_recognizer(Box::new(recognizer)),
        Err(err) => {
            eprintln!("{}", uprez_core::human_errors::humanize_error(&err));
            warn!(error = %err, "Continuing without OCR");
            pipeline
        }
    }
}

#[cfg(not(feature = "ocr"))]
fn attach_recognizer(pipeline: EnhancementPipeline, dir: &Path) -> EnhancementPipeline {
    warn!(
        dir = %dir.display(),
        "Built without the ocr feature; text will be resampled"
    );
    pipeline
}

pub fn segment(args: SegmentArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let (image, dpi) = io::load_with_default(&args.input, config.density.default_dpi)?;
    let pipeline = EnhancementPipeline::new(config)?;

    let masks = pipeline.segment(&image)?;
    let foreground = background::foreground_mask(&image);
    let overlay = preview::overlay_masks(&image, &masks)?;

    std::fs::create_dir_all(&args.out_dir)?;
    let outputs = [
        ("text_mask.png", masks.text.to_raster()),
        ("image_mask.png", masks.pictorial.to_raster()),
        ("foreground_mask.png", foreground.to_raster()),
        ("overlay.png", overlay),
    ];
    for (name, raster) in &outputs {
        io::save(raster, args.out_dir.join(name), dpi)?;
    }

    println!(
        "text: {} px, pictorial: {} px, foreground: {} px -> {}",
        masks.text.count(),
        masks.pictorial.count(),
        foreground.count(),
        args.out_dir.display()
    );
    Ok(())
}

pub fn info(input: &Path) -> Result<()> {
    let (image, dpi) = io::load(input)?;
    let origin = if io::read_density(input).is_some() {
        "from file"
    } else {
        "default"
    };
    println!(
        "{}: {}x{} px, {} DPI ({})",
        input.display(),
        image.width(),
        image.height(),
        dpi,
        origin
    );
    Ok(())
}

pub fn print_config() -> Result<()> {
    let json = serde_json::to_string_pretty(&EnhanceConfig::default())?;
    println!("{json}");
    Ok(())
}
