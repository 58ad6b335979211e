use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    sample::loader::DEFAULT_RETIRE_INTERVAL, state::SamplerState, synth::poly::VoiceStealing,
    DEFAULT_POLYPHONY, NOTE_QUEUE_CAPACITY,
};

use super::EngineError;

/// Construction-time settings for a [`SamplerEngine`](super::SamplerEngine).
///
/// Nothing here can change once the engine is running; the voice pool and
/// note queue are sized from it up front.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Number of voices.
    pub polyphony: usize,
    /// Note queue slots, rounded up to a power of two.
    pub queue_capacity: usize,
    /// Channels the host renders.
    pub output_channels: usize,
    pub stealing: VoiceStealing,
    /// Publish a built-in sine so notes sound before any file is loaded.
    pub fallback_tone: bool,
    /// Volume and tuning to start from.
    pub initial_state: SamplerState,
    /// How often the loader thread releases replaced samples.
    pub retire_interval: Duration,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn polyphony(mut self, voices: usize) -> Self {
        self.polyphony = voices;
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn output_channels(mut self, channels: usize) -> Self {
        self.output_channels = channels;
        self
    }

    pub fn stealing(mut self, stealing: VoiceStealing) -> Self {
        self.stealing = stealing;
        self
    }

    pub fn fallback_tone(mut self, enabled: bool) -> Self {
        self.fallback_tone = enabled;
        self
    }

    pub fn initial_state(mut self, state: SamplerState) -> Self {
        self.initial_state = state;
        self
    }

    pub fn retire_interval(mut self, interval: Duration) -> Self {
        self.retire_interval = interval;
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.polyphony == 0 {
            return Err(EngineError::InvalidConfig("polyphony must be at least 1"));
        }
        if self.queue_capacity == 0 {
            return Err(EngineError::InvalidConfig(
                "note queue capacity must be at least 1",
            ));
        }
        if self.output_channels == 0 {
            return Err(EngineError::InvalidConfig(
                "at least one output channel is required",
            ));
        }
        if self.retire_interval.is_zero() {
            return Err(EngineError::InvalidConfig(
                "retire interval must be non-zero",
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            polyphony: DEFAULT_POLYPHONY,
            queue_capacity: NOTE_QUEUE_CAPACITY,
            output_channels: 2,
            stealing: VoiceStealing::Oldest,
            fallback_tone: false,
            initial_state: SamplerState::default(),
            retire_interval: DEFAULT_RETIRE_INTERVAL,
        }
    }
}
