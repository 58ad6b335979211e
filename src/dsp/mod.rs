//! Low-level DSP primitives used by the voices.
//!
//! These functions are allocation-free and realtime-safe. They stay focused on
//! the sample-reading math so the voice layer can handle state and lifecycle.

/// Fractional sample reading with linear interpolation.
pub mod interpolate;
/// MIDI note to playback-rate conversion.
pub mod pitch;

pub use interpolate::linear;
pub use pitch::playback_rate;
