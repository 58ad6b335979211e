// Purpose: Voice management, polyphony, note transport
// This layer sits above the sample store and the dsp helpers

pub mod message;
pub mod params;
pub mod poly;
pub mod queue;
pub mod sound;
pub mod voice;
