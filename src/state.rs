//! Values that survive a save/restore cycle.
//!
//! Only the two automatable parameters are persisted. The loaded sample is
//! not part of the saved state.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::synth::params::{TUNING_MAX, TUNING_MIN, VOLUME_MAX, VOLUME_MIN};

pub const DEFAULT_VOLUME: f32 = 0.75;
pub const DEFAULT_TUNING: f32 = 0.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerState {
    /// Linear output volume, `[0, 1]`.
    pub volume: f32,
    /// Tuning offset in semitones, `[-12, 12]`.
    pub tuning: f32,
}

impl SamplerState {
    /// Pull both values into range. NaN falls back to the default.
    pub fn clamped(self) -> Self {
        let volume = if self.volume.is_nan() {
            DEFAULT_VOLUME
        } else {
            self.volume.clamp(VOLUME_MIN, VOLUME_MAX)
        };
        let tuning = if self.tuning.is_nan() {
            DEFAULT_TUNING
        } else {
            self.tuning.clamp(TUNING_MIN, TUNING_MAX)
        };
        Self { volume, tuning }
    }
}

impl Default for SamplerState {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            tuning: DEFAULT_TUNING,
        }
    }
}
