//! Lock-free hand-off of sample data to the audio thread.
//!
//! A background thread publishes a freshly decoded [`SampleBuffer`] into a
//! [`BufferHotSwap`]; the audio thread picks it up with a single atomic load.
//! Replaced buffers are never dropped by the publisher straight away. They
//! are parked in [`RetiredBuffers`] until nothing else holds them, which keeps
//! both the use-after-free window and the "last reference dropped on the
//! audio thread" deallocation off the realtime path.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::debug;

use super::buffer::{SampleBuffer, SampleInfo};

/// Single shared slot holding the current sample, if any.
#[derive(Debug, Default)]
pub struct BufferHotSwap {
    current: ArcSwapOption<SampleBuffer>,
}

impl BufferHotSwap {
    pub fn new() -> Self {
        Self {
            current: ArcSwapOption::empty(),
        }
    }

    pub fn with_buffer(buffer: Arc<SampleBuffer>) -> Self {
        Self {
            current: ArcSwapOption::new(Some(buffer)),
        }
    }

    /// The buffer visible right now.
    ///
    /// Realtime-safe: one acquire load plus a reference-count increment, no
    /// allocation and no lock. A call racing with [`publish`](Self::publish)
    /// observes either the old or the new buffer, never anything in between.
    #[inline]
    pub fn current(&self) -> Option<Arc<SampleBuffer>> {
        self.current.load_full()
    }

    /// Install `buffer` as current and hand back the one it replaced.
    ///
    /// Publishers must be serialized among themselves. The returned buffer
    /// may still be in use by a voice and should go to
    /// [`RetiredBuffers::retire`] rather than being dropped.
    pub fn publish(&self, buffer: Arc<SampleBuffer>) -> Option<Arc<SampleBuffer>> {
        self.current.swap(Some(buffer))
    }

    /// Remove the current buffer, leaving the slot empty.
    pub fn clear(&self) -> Option<Arc<SampleBuffer>> {
        self.current.swap(None)
    }

    /// Status for the UI layer.
    pub fn info(&self) -> Option<SampleInfo> {
        let guard = self.current.load();
        guard.as_deref().map(SampleBuffer::info)
    }
}

/// Buffers that have been replaced but may still be referenced elsewhere.
///
/// Owned by the publishing thread. A retired buffer is released once this
/// list holds its only remaining reference, i.e. no voice snapshot, slot or
/// status reader can reach it any more.
#[derive(Debug, Default)]
pub struct RetiredBuffers {
    pending: Vec<Arc<SampleBuffer>>,
}

impl RetiredBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retire(&mut self, buffer: Option<Arc<SampleBuffer>>) {
        if let Some(buffer) = buffer {
            debug!(name = buffer.name(), "retiring sample buffer");
            self.pending.push(buffer);
        }
    }

    /// Drop every retired buffer nobody else references. Returns how many
    /// were released.
    pub fn collect(&mut self) -> usize {
        let before = self.pending.len();
        self.pending.retain(|buffer| Arc::strong_count(buffer) > 1);
        let released = before - self.pending.len();
        if released > 0 {
            debug!(
                released,
                still_pending = self.pending.len(),
                "released retired sample buffers"
            );
        }
        released
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
