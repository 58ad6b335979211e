//! Benchmarks for a single sounding voice.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};
use saavy_sampler::{
    sample::tone::sine_tone,
    synth::{params::ParamSnapshot, voice::Voice},
    SampleBuffer,
};

use crate::BLOCK_SIZES;

pub fn bench_voice(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voice");
    let mono = Arc::new(sine_tone(48_000, 220.0, 10.0, 0.5));
    let stereo = Arc::new(SampleBuffer::from_channels(
        vec![mono.channel(0).to_vec(), mono.channel(0).to_vec()],
        48_000,
    ));

    for &size in BLOCK_SIZES {
        let mut out = vec![vec![0.0f32; size]; 2];

        for (label, sample, note) in [
            ("mono_unity", &mono, 60u8),
            ("mono_pitched", &mono, 63),
            ("stereo_pitched", &stereo, 55),
        ] {
            let mut voice = Voice::new();
            voice.set_parameters(ParamSnapshot {
                volume: 0.8,
                tuning: 0.0,
            });

            group.bench_with_input(BenchmarkId::new(label, size), &size, |b, _| {
                b.iter(|| {
                    if voice.is_idle() {
                        voice.start(note, 0.8, 0, Some(sample), 1);
                    }
                    voice.render(black_box(&mut out), 0, size);
                })
            });
        }
    }

    group.finish();
}
