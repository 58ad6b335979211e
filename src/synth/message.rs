/// Whether a note starts or stops.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NoteKind {
    NoteOn,
    NoteOff,
}

/// A note event travelling from a producer thread to the audio thread.
///
/// `note` and `velocity` are MIDI-ranged (0..=127). `channel` is zero-based.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NoteEvent {
    pub kind: NoteKind,
    pub note: u8,
    pub velocity: u8,
    pub channel: u8,
}

impl NoteEvent {
    pub fn note_on(note: u8, velocity: u8) -> Self {
        Self {
            kind: NoteKind::NoteOn,
            note: note.min(127),
            velocity: velocity.min(127),
            channel: 0,
        }
    }

    pub fn note_off(note: u8) -> Self {
        Self {
            kind: NoteKind::NoteOff,
            note: note.min(127),
            velocity: 0,
            channel: 0,
        }
    }

    pub fn on_channel(mut self, channel: u8) -> Self {
        self.channel = channel.min(15);
        self
    }

    /// Velocity scaled to `[0, 1]`.
    #[inline]
    pub fn gain(&self) -> f32 {
        f32::from(self.velocity) / 127.0
    }
}
