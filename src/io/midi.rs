#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

/// A host MIDI event positioned `offset` frames into the current block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedMidi {
    pub offset: usize,
    pub event: MidiEvent,
}

impl TimedMidi {
    pub fn new(offset: usize, event: MidiEvent) -> Self {
        Self { offset, event }
    }

    pub fn note_on(offset: usize, key: u8, velocity: u8) -> Self {
        Self::new(
            offset,
            MidiEvent::NoteOn {
                channel: 0,
                key,
                velocity,
            },
        )
    }

    pub fn note_off(offset: usize, key: u8) -> Self {
        Self::new(
            offset,
            MidiEvent::NoteOff {
                channel: 0,
                key,
                velocity: 0,
            },
        )
    }
}
