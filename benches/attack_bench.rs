//! Performance benchmarks for attack estimation

use attack_time::calibration::{separation_score, sweep, Corpus, ParameterGrid};
use attack_time::features::spectrogram::build_spectrogram;
use attack_time::{AttackConfig, AttackEstimator, Waveform, YinEstimator};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Plucked-style note: short noisy transient into a decaying 440 Hz tone
fn synthetic_note(seconds: f32, sample_rate: u32) -> Vec<f32> {
    let n = (sample_rate as f32 * seconds) as usize;
    let mut state: u32 = 0x2545_f491;
    (0..n)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let noise = (state as f32 / u32::MAX as f32 - 0.5) * (-t * 60.0).exp();
            let tone = (2.0 * std::f32::consts::PI * 440.0 * t).sin() * (-t * 2.0).exp();
            0.5 * tone + 0.3 * noise
        })
        .collect()
}

fn bench_estimate(c: &mut Criterion) {
    let waveform = Waveform::new(synthetic_note(2.0, 44100), 44100).unwrap();
    let estimator = AttackEstimator::new(AttackConfig::default()).unwrap();

    c.bench_function("estimate_attack_2s", |b| {
        b.iter(|| {
            let _ = estimator.estimate(black_box(&waveform));
        });
    });
}

fn bench_spectrogram(c: &mut Criterion) {
    let samples = synthetic_note(2.0, 44100);
    let config = AttackConfig::default();

    c.bench_function("mel_spectrogram_2s", |b| {
        b.iter(|| {
            let _ = build_spectrogram(black_box(&samples), 44100, &config);
        });
    });
}

fn bench_sweep(c: &mut Criterion) {
    let config = AttackConfig::default();
    let good = vec![("good".to_string(), Waveform::new(synthetic_note(1.0, 22050), 22050).unwrap())];
    let bad = vec![("bad".to_string(), Waveform::new(synthetic_note(1.0, 22050), 22050).unwrap())];
    let corpus = Corpus::from_waveforms(good, bad, &config).unwrap();
    let grid = ParameterGrid {
        onset_energy_ratios: vec![0.3],
        peak_energy_thresholds: vec![0.4, 0.5],
        rolling_windows: vec![15, 30],
        peak_counts: vec![5],
    };
    let pitch = YinEstimator::default();

    let mut group = c.benchmark_group("calibration");
    group.sample_size(10);
    group.bench_function("sweep_4_points", |b| {
        b.iter(|| {
            let _ = sweep(black_box(&corpus), &grid, &pitch);
        });
    });
    group.bench_function("separation_score", |b| {
        let good: Vec<f64> = (0..100).map(|i| 40.0 + (i % 10) as f64).collect();
        let bad: Vec<f64> = (0..100).map(|i| 70.0 + (i % 13) as f64).collect();
        b.iter(|| separation_score(black_box(&good), black_box(&bad)));
    });
    group.finish();
}

criterion_group!(benches, bench_estimate, bench_spectrogram, bench_sweep);
criterion_main!(benches);
