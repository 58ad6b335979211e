use crate::{
    io::midi::MidiEvent,
    synth::message::{NoteEvent, NoteKind},
};

/// Controller numbers that silence everything.
const CC_ALL_SOUND_OFF: u8 = 120;
const CC_ALL_NOTES_OFF: u8 = 123;

/// What a host MIDI event asks the voice pool to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiCommand {
    Note(NoteEvent),
    AllNotesOff,
}

/// Translate host MIDI into pool commands.
///
/// Note-on with velocity 0 is a note-off. Messages the sampler has no use
/// for (pitch bend, program change, other controllers) yield `None`.
pub fn midi_to_command(midi: MidiEvent) -> Option<MidiCommand> {
    match midi {
        MidiEvent::NoteOn {
            channel,
            key,
            velocity: 0,
        }
        | MidiEvent::NoteOff { channel, key, .. } => Some(MidiCommand::Note(NoteEvent {
            kind: NoteKind::NoteOff,
            note: key.min(127),
            velocity: 0,
            channel: channel.min(15),
        })),
        MidiEvent::NoteOn {
            channel,
            key,
            velocity,
        } => Some(MidiCommand::Note(NoteEvent {
            kind: NoteKind::NoteOn,
            note: key.min(127),
            velocity: velocity.min(127),
            channel: channel.min(15),
        })),
        MidiEvent::ControlChange { controller, .. }
            if controller == CC_ALL_NOTES_OFF || controller == CC_ALL_SOUND_OFF =>
        {
            Some(MidiCommand::AllNotesOff)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_on_and_off() {
        let on = midi_to_command(MidiEvent::NoteOn {
            channel: 2,
            key: 64,
            velocity: 90,
        });
        assert_eq!(on, Some(MidiCommand::Note(NoteEvent::note_on(64, 90).on_channel(2))));

        let off = midi_to_command(MidiEvent::NoteOff {
            channel: 2,
            key: 64,
            velocity: 40,
        });
        assert_eq!(off, Some(MidiCommand::Note(NoteEvent::note_off(64).on_channel(2))));
    }

    #[test]
    fn zero_velocity_note_on_is_note_off() {
        let cmd = midi_to_command(MidiEvent::NoteOn {
            channel: 0,
            key: 60,
            velocity: 0,
        });
        assert_eq!(cmd, Some(MidiCommand::Note(NoteEvent::note_off(60))));
    }

    #[test]
    fn panic_controllers_silence_everything() {
        for controller in [120, 123] {
            let cmd = midi_to_command(MidiEvent::ControlChange {
                channel: 0,
                controller,
                value: 0,
            });
            assert_eq!(cmd, Some(MidiCommand::AllNotesOff));
        }
    }

    #[test]
    fn unrelated_messages_are_ignored() {
        assert_eq!(
            midi_to_command(MidiEvent::ControlChange {
                channel: 0,
                controller: 1,
                value: 64
            }),
            None
        );
        assert_eq!(
            midi_to_command(MidiEvent::PitchBend {
                channel: 0,
                value: 100
            }),
            None
        );
        assert_eq!(
            midi_to_command(MidiEvent::ProgramChange {
                channel: 0,
                program: 3
            }),
            None
        );
    }
}
