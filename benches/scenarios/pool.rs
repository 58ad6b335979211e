//! Benchmarks for a full voice pool.
//!
//! Every voice is kept busy so the numbers reflect worst-case polyphony.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};
use saavy_sampler::{
    io::midi::TimedMidi,
    sample::{tone::sine_tone, BufferHotSwap},
    synth::{
        message::NoteEvent,
        params::Parameters,
        poly::{VoicePool, VoiceStealing},
        queue::NoteEventQueue,
        sound::Sound,
    },
    DEFAULT_POLYPHONY,
};

use crate::BLOCK_SIZES;

pub fn bench_pool(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/pool");
    let slot = Arc::new(BufferHotSwap::with_buffer(Arc::new(sine_tone(
        48_000, 220.0, 10.0, 0.5,
    ))));

    for &size in BLOCK_SIZES {
        let mut out = vec![vec![0.0f32; size]; 2];
        let (mut tx, rx) = NoteEventQueue::new(64);
        let mut pool = VoicePool::new(
            DEFAULT_POLYPHONY,
            vec![Sound::new(Arc::clone(&slot))],
            Arc::new(Parameters::default()),
            rx,
            VoiceStealing::Oldest,
        );

        group.bench_with_input(BenchmarkId::new("full_polyphony", size), &size, |b, _| {
            b.iter(|| {
                for note in 0..DEFAULT_POLYPHONY - pool.active_voices() {
                    tx.try_enqueue(NoteEvent::note_on(48 + note as u8, 100));
                }
                pool.process(black_box(&mut out), &[], size);
            })
        });

        // Host MIDI splits the block at every event.
        let midi: Vec<TimedMidi> = (0..8)
            .map(|i| TimedMidi::note_on(i * size / 8, 60 + i as u8, 100))
            .collect();
        group.bench_with_input(BenchmarkId::new("split_block", size), &size, |b, _| {
            b.iter(|| pool.process(black_box(&mut out), black_box(&midi), size))
        });
    }

    group.finish();
}
