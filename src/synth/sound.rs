use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::sample::{BufferHotSwap, SampleBuffer};

use super::message::NoteEvent;

/// Channel mask matching all sixteen MIDI channels.
pub const ALL_CHANNELS: u16 = u16::MAX;

/// Something a voice can play: a sample slot plus the notes and channels it
/// answers to.
///
/// A `Sound` holds no playback state, so any number of voices can play the
/// same one at once.
#[derive(Debug, Clone)]
pub struct Sound {
    notes: RangeInclusive<u8>,
    channels: u16,
    slot: Arc<BufferHotSwap>,
}

impl Sound {
    /// A sound answering to every note on every channel.
    pub fn new(slot: Arc<BufferHotSwap>) -> Self {
        Self {
            notes: 0..=127,
            channels: ALL_CHANNELS,
            slot,
        }
    }

    pub fn with_note_range(mut self, notes: RangeInclusive<u8>) -> Self {
        self.notes = notes;
        self
    }

    /// Restrict to the zero-based channels whose bits are set in `mask`.
    pub fn with_channel_mask(mut self, mask: u16) -> Self {
        self.channels = mask;
        self
    }

    pub fn applies_to_note(&self, note: u8) -> bool {
        self.notes.contains(&note)
    }

    pub fn applies_to_channel(&self, channel: u8) -> bool {
        channel < 16 && self.channels & (1 << channel) != 0
    }

    pub fn applies_to(&self, event: &NoteEvent) -> bool {
        self.applies_to_note(event.note) && self.applies_to_channel(event.channel)
    }

    /// The sample this sound would play right now.
    #[inline]
    pub fn current(&self) -> Option<Arc<SampleBuffer>> {
        self.slot.current()
    }

    pub fn slot(&self) -> &Arc<BufferHotSwap> {
        &self.slot
    }
}
