//! Engine facade: the audio-thread half and the producer-side handle.
//!
//! [`SamplerEngine::new`] builds both halves from one [`EngineConfig`]. The
//! engine moves into the host's audio callback and only ever renders. The
//! [`SamplerHandle`] stays with the UI/control thread and feeds it notes,
//! parameters and samples without touching the audio thread directly.

pub mod config;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    io::{midi::TimedMidi, AudioOutput},
    sample::{
        loader::{BackgroundLoader, LoadError, LoadTask},
        tone::fallback_tone,
        BufferHotSwap, SampleBuffer, SampleInfo,
    },
    state::SamplerState,
    synth::{
        message::NoteEvent,
        params::Parameters,
        poly::VoicePool,
        queue::{NoteEventQueue, NoteSender},
        sound::Sound,
    },
};

pub use config::EngineConfig;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(&'static str),
    #[error(transparent)]
    Loader(#[from] LoadError),
}

/// Audio-thread half. Never allocates, locks or fails while rendering.
#[derive(Debug)]
pub struct SamplerEngine {
    pool: VoicePool,
    output_channels: usize,
}

impl SamplerEngine {
    pub fn new(config: EngineConfig) -> Result<(Self, SamplerHandle), EngineError> {
        config.validate()?;

        let slot = Arc::new(BufferHotSwap::new());
        if config.fallback_tone {
            slot.publish(Arc::new(fallback_tone()));
        }

        let params = Arc::new(Parameters::new(config.initial_state));
        let (notes, rx) = NoteEventQueue::new(config.queue_capacity);
        let loader = BackgroundLoader::spawn(Arc::clone(&slot), config.retire_interval)?;

        let pool = VoicePool::new(
            config.polyphony,
            vec![Sound::new(Arc::clone(&slot))],
            Arc::clone(&params),
            rx,
            config.stealing,
        );

        info!(
            polyphony = config.polyphony,
            queue_capacity = notes.capacity(),
            output_channels = config.output_channels,
            stealing = ?config.stealing,
            fallback_tone = config.fallback_tone,
            "sampler engine ready"
        );

        let engine = Self {
            pool,
            output_channels: config.output_channels,
        };
        let handle = SamplerHandle {
            notes,
            params,
            slot,
            loader,
            dropped_events: 0,
        };
        Ok((engine, handle))
    }

    /// Render `num_samples` frames into `out`, replacing its contents.
    ///
    /// `midi` is the host's input for this block, ordered by offset. Notes
    /// injected through the handle are applied first, at frame 0.
    pub fn render<C: AsMut<[f32]>>(&mut self, out: &mut [C], midi: &[TimedMidi], num_samples: usize) {
        for channel in out.iter_mut() {
            let channel = channel.as_mut();
            let end = num_samples.min(channel.len());
            channel[..end].fill(0.0);
        }
        self.pool.process(out, midi, num_samples);
    }

    /// Render a whole [`AudioOutput`].
    pub fn process_block(&mut self, midi: &[TimedMidi], output: &mut AudioOutput) {
        let frames = output.frames();
        self.render(&mut output.buffers, midi, frames);
    }

    pub fn active_voices(&self) -> usize {
        self.pool.active_voices()
    }

    pub fn output_channels(&self) -> usize {
        self.output_channels
    }

    pub fn pool(&self) -> &VoicePool {
        &self.pool
    }
}

/// Producer-side control surface.
///
/// Owns the single sending half of the note queue, so note injection needs
/// `&mut self`. Parameter writes go through shared atomics and can come from
/// any thread holding [`parameters`](Self::parameters).
pub struct SamplerHandle {
    notes: NoteSender,
    params: Arc<Parameters>,
    slot: Arc<BufferHotSwap>,
    loader: BackgroundLoader,
    dropped_events: u64,
}

impl SamplerHandle {
    /// Queue a note-on. Returns `false` if the queue was full and the event
    /// was dropped.
    pub fn note_on(&mut self, note: u8, velocity: u8) -> bool {
        self.send(NoteEvent::note_on(note, velocity))
    }

    pub fn note_off(&mut self, note: u8) -> bool {
        self.send(NoteEvent::note_off(note))
    }

    pub fn send(&mut self, event: NoteEvent) -> bool {
        if self.notes.try_enqueue(event) {
            return true;
        }

        self.dropped_events += 1;
        warn!(
            ?event,
            dropped_total = self.dropped_events,
            "note queue full, dropping event"
        );
        false
    }

    pub fn set_volume(&self, volume: f32) {
        self.params.set_volume(volume);
    }

    pub fn set_tuning(&self, semitones: f32) {
        self.params.set_tuning(semitones);
    }

    pub fn volume(&self) -> f32 {
        self.params.volume()
    }

    pub fn tuning(&self) -> f32 {
        self.params.tuning()
    }

    /// Shared parameters, for a host automation thread.
    pub fn parameters(&self) -> Arc<Parameters> {
        Arc::clone(&self.params)
    }

    /// Decode `path` in the background and swap it in when ready.
    pub fn request_load(&self, path: impl Into<PathBuf>) -> LoadTask {
        self.loader.load(path)
    }

    /// Swap in an already decoded buffer.
    pub fn load_buffer(&self, buffer: SampleBuffer) -> LoadTask {
        self.loader.publish(buffer)
    }

    /// What is loaded right now. `None` when no sample has been published.
    pub fn current_sample(&self) -> Option<SampleInfo> {
        self.slot.info()
    }

    pub fn state(&self) -> SamplerState {
        SamplerState {
            volume: self.params.volume(),
            tuning: self.params.tuning(),
        }
    }

    pub fn restore_state(&self, state: SamplerState) {
        let state = state.clamped();
        debug!(volume = state.volume, tuning = state.tuning, "restoring sampler state");
        self.params.set_volume(state.volume);
        self.params.set_tuning(state.tuning);
    }

    /// Events lost to a full queue since the handle was created.
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events
    }

    /// True once the engine half has been dropped.
    pub fn is_engine_gone(&self) -> bool {
        self.notes.is_abandoned()
    }
}

impl std::fmt::Debug for SamplerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SamplerHandle")
            .field("notes", &self.notes)
            .field("state", &self.state())
            .field("current_sample", &self.current_sample().map(|s| s.name))
            .field("dropped_events", &self.dropped_events)
            .finish()
    }
}
