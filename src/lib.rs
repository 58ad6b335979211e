pub mod dsp; // Interpolation and pitch math
pub mod engine; // Engine facade and producer handle
pub mod io; // Host MIDI and output buffers
pub mod sample; // Sample storage, hot-swap and background loading
pub mod state; // Persisted parameter state
pub mod synth; // Voices, polyphony and the note queue

pub use engine::{config::EngineConfig, EngineError, SamplerEngine, SamplerHandle};
pub use sample::{LoadError, LoadTask, SampleBuffer, SampleInfo};
pub use state::SamplerState;
pub use synth::{message::NoteEvent, poly::VoiceStealing};

pub const MAX_BLOCK_SIZE: usize = 2048;
/// Note that plays a sample at its recorded pitch.
pub const ROOT_NOTE: u8 = 60;
pub const DEFAULT_POLYPHONY: usize = 16;
pub const NOTE_QUEUE_CAPACITY: usize = 128;
