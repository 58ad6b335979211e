use std::sync::Arc;

use crate::{
    dsp::{interpolate::lerp, pitch::playback_rate},
    sample::SampleBuffer,
    synth::{params::ParamSnapshot, sound::Sound},
    ROOT_NOTE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Idle,   // Available for allocation
    Active, // Playing a sample
}

/// One-shot sample player for a single note.
///
/// The sample is captured at note-on and kept for the life of the note, so
/// publishing a new sample never changes a note that is already sounding.
/// Every output channel reads the same playback position; the channel index
/// only picks which row of the sample to read.
#[derive(Debug)]
pub struct Voice {
    state: VoiceState,
    note: u8,
    channel: u8,
    age: u64,
    velocity_gain: f32,
    volume: f32,
    tuning: f32,
    position: f64,
    rate: f64,
    sample: Option<Arc<SampleBuffer>>,
}

impl Voice {
    pub fn new() -> Self {
        Self {
            state: VoiceState::Idle,
            note: ROOT_NOTE,
            channel: 0,
            age: 0,
            velocity_gain: 1.0,
            volume: crate::state::DEFAULT_VOLUME,
            tuning: crate::state::DEFAULT_TUNING,
            position: 0.0,
            rate: 1.0,
            sample: None,
        }
    }

    /// This engine has a single sound kind, so any sound is playable.
    pub fn can_play(&self, _sound: &Sound) -> bool {
        true
    }

    /// Push this block's parameter values.
    ///
    /// Volume applies to the next render. Tuning only affects the rate of
    /// notes started after this call.
    pub fn set_parameters(&mut self, params: ParamSnapshot) {
        self.volume = params.volume;
        self.tuning = params.tuning;
    }

    /// Start playing `sample` at the pitch of `note`.
    ///
    /// `velocity` is already normalized to `[0, 1]`. Without a playable
    /// sample the voice stays idle and `false` is returned.
    pub fn start(
        &mut self,
        note: u8,
        velocity: f32,
        channel: u8,
        sample: Option<&Arc<SampleBuffer>>,
        age: u64,
    ) -> bool {
        let sample = match sample {
            Some(sample) if sample.frame_count() >= 2 && sample.channel_count() > 0 => sample,
            _ => {
                self.stop();
                return false;
            }
        };

        self.state = VoiceState::Active;
        self.note = note;
        self.channel = channel;
        self.age = age;
        self.velocity_gain = velocity.clamp(0.0, 1.0);
        self.position = 0.0;
        self.rate = playback_rate(note, self.tuning);
        self.sample = Some(Arc::clone(sample));
        true
    }

    /// Immediate cut, no release tail.
    pub fn stop(&mut self) {
        self.state = VoiceState::Idle;
        self.sample = None;
    }

    /// Mix `num_samples` frames into `out` starting at `start`.
    ///
    /// Additive: existing content of `out` is kept. Frames beyond the
    /// shortest output channel are not touched. When the sample runs out the
    /// voice goes idle and writes nothing further.
    pub fn render<C: AsMut<[f32]>>(&mut self, out: &mut [C], start: usize, num_samples: usize) {
        if self.state == VoiceState::Idle {
            return;
        }

        let available = out
            .iter_mut()
            .map(|channel| channel.as_mut().len())
            .min()
            .unwrap_or(usize::MAX)
            .saturating_sub(start);
        let frames = num_samples.min(available);

        let Some(sample) = self.sample.as_deref() else {
            self.stop();
            return;
        };

        let length = sample.frame_count();
        let last_channel = sample.channel_count().saturating_sub(1);
        let gain = self.volume * self.velocity_gain;
        let rate = self.rate;
        let mut position = self.position;
        let mut finished = false;

        for i in 0..frames {
            let index = position as usize;
            if index + 1 >= length {
                finished = true;
                break;
            }

            let frac = (position - index as f64) as f32;
            for (channel, output) in out.iter_mut().enumerate() {
                let data = sample.channel(channel.min(last_channel));
                output.as_mut()[start + i] += lerp(data[index], data[index + 1], frac) * gain;
            }

            position += rate;
        }

        // Nothing left to read: free the voice now instead of next block.
        if position as usize + 1 >= length {
            finished = true;
        }

        self.position = position;
        if finished {
            self.stop();
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == VoiceState::Idle
    }

    pub fn is_active(&self) -> bool {
        self.state == VoiceState::Active
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn playback_rate(&self) -> f64 {
        self.rate
    }

    pub fn velocity_gain(&self) -> f32 {
        self.velocity_gain
    }

    /// The sample captured at note-on, if sounding.
    pub fn sample(&self) -> Option<&Arc<SampleBuffer>> {
        self.sample.as_ref()
    }
}

impl Default for Voice {
    fn default() -> Self {
        Self::new()
    }
}
