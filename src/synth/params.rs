use std::sync::atomic::Ordering;

use atomic_float::AtomicF32;

use crate::state::SamplerState;

pub const VOLUME_MIN: f32 = 0.0;
pub const VOLUME_MAX: f32 = 1.0;
pub const TUNING_MIN: f32 = -12.0;
pub const TUNING_MAX: f32 = 12.0;

/// Host-automatable controls shared between producers and the audio thread.
///
/// Each value is an independent atomic scalar: last writer wins, and the
/// audio thread reads a fresh copy at the start of every block. There is no
/// smoothing across block boundaries.
#[derive(Debug)]
pub struct Parameters {
    volume: AtomicF32,
    tuning: AtomicF32,
}

/// One block's view of [`Parameters`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    pub volume: f32,
    pub tuning: f32,
}

impl Parameters {
    pub fn new(state: SamplerState) -> Self {
        let state = state.clamped();
        Self {
            volume: AtomicF32::new(state.volume),
            tuning: AtomicF32::new(state.tuning),
        }
    }

    /// Set linear output volume, clamped to `[0, 1]`. NaN is ignored.
    pub fn set_volume(&self, volume: f32) {
        if !volume.is_nan() {
            self.volume
                .store(volume.clamp(VOLUME_MIN, VOLUME_MAX), Ordering::Relaxed);
        }
    }

    /// Set tuning in semitones, clamped to `[-12, 12]`. NaN is ignored.
    pub fn set_tuning(&self, semitones: f32) {
        if !semitones.is_nan() {
            self.tuning
                .store(semitones.clamp(TUNING_MIN, TUNING_MAX), Ordering::Relaxed);
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume.load(Ordering::Relaxed)
    }

    pub fn tuning(&self) -> f32 {
        self.tuning.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            volume: self.volume(),
            tuning: self.tuning(),
        }
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self::new(SamplerState::default())
    }
}
