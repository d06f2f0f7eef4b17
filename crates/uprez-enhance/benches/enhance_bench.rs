// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for segmentation and full enhancement on a synthetic
// page: three rows of dark "words" plus a saturated photo block.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{Rgb, RgbImage};

use uprez_core::{EnhanceConfig, InterpolationMethod};
use uprez_enhance::{EnhancementPipeline, RasterBuffer, RegionSegmenter};

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

fn synthetic_page() -> RasterBuffer {
    let (width, height) = (320u32, 240u32);
    let mut img = RgbImage::from_pixel(width, height, Rgb([250, 250, 250]));

    for line in 0..3 {
        let y0 = 20 + line * 24;
        for word in 0..8 {
            let x0 = 16 + word * 36;
            for y in y0..y0 + 10 {
                for x in x0..x0 + 26 {
                    if (x * 3 + y) % 5 != 0 {
                        img.put_pixel(x, y, Rgb([25, 25, 25]));
                    }
                }
            }
        }
    }

    for y in 120..220 {
        for x in 60..260 {
            img.put_pixel(x, y, Rgb([(x % 200) as u8 + 40, 90, 200 - (y % 100) as u8]));
        }
    }

    RasterBuffer::from_rgb(img)
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_segmentation(c: &mut Criterion) {
    let page = synthetic_page();
    let segmenter = RegionSegmenter::default();

    c.bench_function("segment (320x240)", |b| {
        b.iter(|| black_box(segmenter.segment(black_box(&page))));
    });
}

fn bench_enhancement(c: &mut Criterion) {
    let page = synthetic_page();
    let pipeline = match EnhancementPipeline::new(EnhanceConfig::default()) {
        Ok(pipeline) => pipeline,
        Err(err) => panic!("default configuration must build a pipeline: {err}"),
    };

    let mut group = c.benchmark_group("enhance (320x240)");
    group.sample_size(10);
    for (label, original, target) in [("2x", 150, 300), ("1.5x", 200, 300)] {
        group.bench_function(label, |b| {
            b.iter(|| {
                let result =
                    pipeline.enhance(black_box(&page), original, target, InterpolationMethod::Lanczos);
                black_box(result.map(|r| r.image))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_segmentation, bench_enhancement);
criterion_main!(benches);
