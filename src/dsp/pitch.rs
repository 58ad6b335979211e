//! Note number to playback-rate conversion.

use crate::ROOT_NOTE;

/// Semitones per octave in twelve-tone equal temperament.
const SEMITONES_PER_OCTAVE: f64 = 12.0;

/// Playback rate for `note` with an extra `tuning` offset in semitones.
///
/// `rate = 2^((note - 60 + tuning) / 12)`. The root note with zero tuning is
/// exactly 1.0, each octave doubles or halves the rate.
#[inline]
pub fn playback_rate(note: u8, tuning_semitones: f32) -> f64 {
    let offset = f64::from(note) - f64::from(ROOT_NOTE) + f64::from(tuning_semitones);
    (offset / SEMITONES_PER_OCTAVE).exp2()
}
