//! Performance benchmarks for feature extraction

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{GrayImage, Luma};
use imageproc::drawing::draw_filled_circle_mut;
use neurovox::config::{SpiralConfig, VoiceConfig};
use neurovox::features::spiral::ImageFeatureExtractor;
use neurovox::features::voice::{AudioClip, AudioFeatureExtractor};
use neurovox::features::FeatureExtractor;

fn bench_voice_extraction(c: &mut Criterion) {
    // Synthetic 3 second phonation at 22.05 kHz
    let sr = 22050;
    let samples: Vec<f32> = (0..sr * 3)
        .map(|i| {
            let phase = i as f32 * 150.0 * 2.0 * std::f32::consts::PI / sr as f32;
            0.5 * phase.sin() + 0.2 * (2.0 * phase).sin()
        })
        .collect();
    let clip = AudioClip::new(samples, sr as u32);
    let extractor = AudioFeatureExtractor::new(VoiceConfig::default());

    c.bench_function("voice_features_3s", |b| {
        b.iter(|| {
            let _ = extractor.extract(black_box(&clip));
        });
    });
}

fn bench_spiral_extraction(c: &mut Criterion) {
    let mut drawing = GrayImage::from_pixel(512, 512, Luma([255]));
    for i in 0..1500 {
        let theta = i as f32 / 1500.0 * 6.0 * std::f32::consts::PI;
        let r = 10.0 + theta * 11.0;
        let x = 256.0 + r * theta.cos();
        let y = 256.0 + r * theta.sin();
        draw_filled_circle_mut(&mut drawing, (x as i32, y as i32), 2, Luma([0]));
    }
    let extractor = ImageFeatureExtractor::new(SpiralConfig::default());

    c.bench_function("spiral_features_512px", |b| {
        b.iter(|| {
            let _ = extractor.extract(black_box(&drawing));
        });
    });
}

criterion_group!(benches, bench_voice_extraction, bench_spiral_extraction);
criterion_main!(benches);
