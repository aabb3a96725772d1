use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use envelope_monitor::{
    ArrayEnvelopeChecker, ArrayEnvelopeConfig, EnvelopeChecker, EnvelopeConfig,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

fn bench_envelope(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);

    let mut group = c.benchmark_group("envelope_check");

    group.bench_function("scalar/check+update", |b| {
        let cfg = EnvelopeConfig::percent(5.0, 5.0).with_violation_timeout(1.0);
        let xs: Vec<f64> = (0..4096).map(|_| rng.random_range(90.0..110.0)).collect();
        let mut checker = EnvelopeChecker::new(cfg);
        checker.set_reference(100.0);
        b.iter(|| {
            for &x in &xs {
                black_box(checker.check(x));
                black_box(checker.update(0.001));
            }
        })
    });

    for n in [256usize, 4096] {
        // A smooth reference curve with small noise and occasional spikes.
        let curve: Vec<f64> = (0..n)
            .map(|i| 50.0 + 10.0 * (i as f64 / 32.0).sin())
            .collect();
        let sample: Vec<f64> = curve
            .iter()
            .enumerate()
            .map(|(i, &r)| {
                let spike = if i % 97 == 0 { 10.0 } else { 0.0 };
                r + rng.random_range(-0.5_f64..0.5) + spike
            })
            .collect();
        let cfg = ArrayEnvelopeConfig::new(
            EnvelopeConfig::percent(5.0, 5.0).with_min_margin(0.5),
            0.05,
        );

        group.bench_with_input(BenchmarkId::new("array/check", n), &n, |b, &_n| {
            let mut reference = curve.clone();
            let mut checker = ArrayEnvelopeChecker::new(cfg);
            checker.bind_reference_buffer(&mut reference);
            b.iter(|| black_box(checker.check(black_box(&sample))))
        });

        group.bench_with_input(BenchmarkId::new("array/failed_bins", n), &n, |b, &_n| {
            let mut reference = curve.clone();
            let mut checker = ArrayEnvelopeChecker::new(cfg);
            checker.bind_reference_buffer(&mut reference);
            b.iter(|| black_box(checker.failed_bin_indices(black_box(&sample))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_envelope);
criterion_main!(benches);
