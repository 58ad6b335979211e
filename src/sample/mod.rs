// Purpose: decoded sample storage and the non-realtime side that feeds it

pub mod buffer;
pub mod loader;
pub mod swap;
pub mod tone;

pub use buffer::{SampleBuffer, SampleInfo};
pub use loader::{decode_file, BackgroundLoader, LoadError, LoadTask};
pub use swap::{BufferHotSwap, RetiredBuffers};
