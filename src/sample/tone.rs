//! Generated test tones.
//!
//! Useful as a stand-in sample so the instrument makes a sound before any
//! file has been loaded, and as a known signal in tests.

use std::f32::consts::TAU;

use super::buffer::SampleBuffer;

pub const FALLBACK_TONE_SAMPLE_RATE: u32 = 44_100;
pub const FALLBACK_TONE_FREQUENCY: f32 = 440.0;
pub const FALLBACK_TONE_AMPLITUDE: f32 = 0.5;

/// Mono sine wave of `seconds` length.
pub fn sine_tone(sample_rate: u32, frequency: f32, seconds: f32, amplitude: f32) -> SampleBuffer {
    let frames = (sample_rate as f32 * seconds.max(0.0)) as usize;
    let samples = (0..frames)
        .map(|i| (TAU * frequency * i as f32 / sample_rate as f32).sin() * amplitude)
        .collect();

    SampleBuffer::from_channels(vec![samples], sample_rate)
}

/// One second of A4 at half amplitude.
pub fn fallback_tone() -> SampleBuffer {
    sine_tone(
        FALLBACK_TONE_SAMPLE_RATE,
        FALLBACK_TONE_FREQUENCY,
        1.0,
        FALLBACK_TONE_AMPLITUDE,
    )
    .with_name("Sine A4")
}
