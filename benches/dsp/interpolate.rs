//! Benchmarks for fractional sample reads.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_sampler::dsp::{linear, playback_rate};

use crate::BLOCK_SIZES;

pub fn bench_interpolate(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/interpolate");
    let data: Vec<f32> = (0..48_000).map(|i| (i as f32 * 0.01).sin()).collect();

    for &size in BLOCK_SIZES {
        let mut output = vec![0.0f32; size];

        for (label, note) in [("unity", 60u8), ("fifth_up", 67), ("octave_down", 48)] {
            let rate = playback_rate(note, 0.0);
            group.bench_with_input(BenchmarkId::new(label, size), &size, |b, _| {
                b.iter(|| {
                    let mut position = 0.0f64;
                    for out in output.iter_mut() {
                        *out = linear(black_box(&data[..]), position).unwrap_or(0.0);
                        position += rate;
                    }
                })
            });
        }
    }

    group.finish();
}
