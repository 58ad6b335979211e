//! Real-world scenario benchmarks.
//!
//! These model actual playback: one voice reading a long sample, and a full
//! pool of voices mixed into a stereo block.

mod pool;
mod voice;

pub use pool::bench_pool;
pub use voice::bench_voice;
