use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    io::{
        converter::{midi_to_command, MidiCommand},
        midi::TimedMidi,
    },
    sample::SampleBuffer,
    synth::{
        message::{NoteEvent, NoteKind},
        params::Parameters,
        queue::NoteReceiver,
        sound::Sound,
        voice::Voice,
    },
};

/// What happens to a note-on when every voice is busy.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceStealing {
    /// Cut the voice whose note started longest ago. Ties cannot happen:
    /// every note-on gets a fresh, strictly increasing age.
    #[default]
    Oldest,
    /// Drop the new note and leave the sounding ones alone.
    Disabled,
}

/// Fixed set of voices driven from the audio thread.
///
/// Everything is allocated in [`new`](Self::new); `process` never allocates,
/// locks or fails. A note that cannot be played (no sample, no matching
/// sound, no voice) is simply silent.
pub struct VoicePool {
    voices: Vec<Voice>,
    sounds: Vec<Sound>,
    snapshots: Vec<Option<Arc<SampleBuffer>>>,
    params: Arc<Parameters>,
    rx: NoteReceiver,
    stealing: VoiceStealing,
    note_counter: u64,
}

impl VoicePool {
    pub fn new(
        polyphony: usize,
        sounds: Vec<Sound>,
        params: Arc<Parameters>,
        rx: NoteReceiver,
        stealing: VoiceStealing,
    ) -> Self {
        let voices = (0..polyphony).map(|_| Voice::new()).collect();
        let snapshots = vec![None; sounds.len()];

        Self {
            voices,
            sounds,
            snapshots,
            params,
            rx,
            stealing,
            note_counter: 0,
        }
    }

    /// Render one block of `num_samples` frames, mixing into `out`.
    ///
    /// Order of work:
    /// 1. read parameters and each sound's current sample once,
    /// 2. dispatch every queued note event (at frame 0),
    /// 3. walk `midi` in order, rendering up to each event's offset before
    ///    applying it,
    /// 4. render the remainder of the block.
    pub fn process<C: AsMut<[f32]>>(&mut self, out: &mut [C], midi: &[TimedMidi], num_samples: usize) {
        let num_samples = out
            .iter_mut()
            .map(|channel| channel.as_mut().len())
            .min()
            .map_or(num_samples, |frames| frames.min(num_samples));

        self.begin_block();

        let ready = self.rx.pending();
        for _ in 0..ready {
            match self.rx.pop() {
                Some(event) => self.handle_event(event),
                None => break,
            }
        }

        let mut cursor = 0;
        for timed in midi {
            let offset = timed.offset.min(num_samples).max(cursor);
            if offset > cursor {
                self.render(out, cursor, offset - cursor);
                cursor = offset;
            }

            match midi_to_command(timed.event) {
                Some(MidiCommand::Note(event)) => self.handle_event(event),
                Some(MidiCommand::AllNotesOff) => self.all_notes_off(),
                None => {}
            }
        }

        if cursor < num_samples {
            self.render(out, cursor, num_samples - cursor);
        }
    }

    /// Pull fresh parameters and sample snapshots for the coming block.
    pub fn begin_block(&mut self) {
        let params = self.params.snapshot();
        for voice in &mut self.voices {
            voice.set_parameters(params);
        }

        for (snapshot, sound) in self.snapshots.iter_mut().zip(&self.sounds) {
            *snapshot = sound.current();
        }
    }

    pub fn handle_event(&mut self, event: NoteEvent) {
        match event.kind {
            NoteKind::NoteOn => self.note_on(event),
            NoteKind::NoteOff => self.note_off(event.note),
        }
    }

    /// Start `event` on one voice per applicable sound.
    pub fn note_on(&mut self, event: NoteEvent) {
        for sound_idx in 0..self.sounds.len() {
            if !self.sounds[sound_idx].applies_to(&event) {
                continue;
            }

            // Nothing to play: don't take (or steal) a voice for silence.
            let playable = self.snapshots[sound_idx]
                .as_ref()
                .is_some_and(|sample| sample.frame_count() >= 2);
            if !playable {
                continue;
            }

            let Some(voice_idx) = self.allocate_voice(&self.sounds[sound_idx]) else {
                continue;
            };

            self.note_counter += 1;
            self.voices[voice_idx].start(
                event.note,
                event.gain(),
                event.channel,
                self.snapshots[sound_idx].as_ref(),
                self.note_counter,
            );
        }
    }

    /// Cut every active voice playing `note`.
    pub fn note_off(&mut self, note: u8) {
        for voice in &mut self.voices {
            if voice.is_active() && voice.note() == note {
                voice.stop();
            }
        }
    }

    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            voice.stop();
        }
    }

    /// Mix every active voice into `out[start..start + num_samples]`.
    pub fn render<C: AsMut<[f32]>>(&mut self, out: &mut [C], start: usize, num_samples: usize) {
        for voice in &mut self.voices {
            if voice.is_active() {
                voice.render(out, start, num_samples);
            }
        }
    }

    fn allocate_voice(&self, sound: &Sound) -> Option<usize> {
        // First pass: find an idle voice
        let free_idx = self
            .voices
            .iter()
            .position(|v| v.is_idle() && v.can_play(sound));
        if free_idx.is_some() {
            return free_idx;
        }

        // Second pass: steal the oldest note
        match self.stealing {
            VoiceStealing::Oldest => self
                .voices
                .iter()
                .enumerate()
                .filter(|(_, v)| v.can_play(sound))
                .min_by_key(|(_, v)| v.age())
                .map(|(idx, _)| idx),
            VoiceStealing::Disabled => None,
        }
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    pub fn polyphony(&self) -> usize {
        self.voices.len()
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn sounds(&self) -> &[Sound] {
        &self.sounds
    }

    pub fn stealing(&self) -> VoiceStealing {
        self.stealing
    }
}

impl std::fmt::Debug for VoicePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoicePool")
            .field("polyphony", &self.voices.len())
            .field("active_voices", &self.active_voices())
            .field("sounds", &self.sounds.len())
            .field("stealing", &self.stealing)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        io::midi::MidiEvent,
        sample::BufferHotSwap,
        synth::queue::{NoteEventQueue, NoteSender},
    };

    fn pool_with(
        polyphony: usize,
        frames: usize,
        stealing: VoiceStealing,
    ) -> (VoicePool, NoteSender, Arc<Parameters>, Arc<BufferHotSwap>) {
        let slot = Arc::new(BufferHotSwap::new());
        if frames > 0 {
            slot.publish(Arc::new(SampleBuffer::from_channels(
                vec![vec![1.0; frames]],
                44_100,
            )));
        }
        let params = Arc::new(Parameters::default());
        params.set_volume(1.0);
        let (tx, rx) = NoteEventQueue::new(64);
        let pool = VoicePool::new(
            polyphony,
            vec![Sound::new(Arc::clone(&slot))],
            Arc::clone(&params),
            rx,
            stealing,
        );
        (pool, tx, params, slot)
    }

    fn block(frames: usize) -> Vec<Vec<f32>> {
        vec![vec![0.0; frames]; 2]
    }

    #[test]
    fn queued_notes_start_voices() {
        let (mut pool, mut tx, _, _) = pool_with(4, 1_000, VoiceStealing::Oldest);
        tx.try_enqueue(NoteEvent::note_on(60, 127));
        tx.try_enqueue(NoteEvent::note_on(64, 127));

        let mut out = block(16);
        pool.process(&mut out, &[], 16);

        assert_eq!(pool.active_voices(), 2);
        assert!(out[0].iter().all(|&s| s == 2.0));
        assert_eq!(out[0], out[1]);
    }

    #[test]
    fn no_sample_means_no_voice() {
        let (mut pool, mut tx, _, _) = pool_with(4, 0, VoiceStealing::Oldest);
        tx.try_enqueue(NoteEvent::note_on(60, 100));

        let mut out = block(16);
        pool.process(&mut out, &[], 16);

        assert_eq!(pool.active_voices(), 0);
        assert!(out.iter().flatten().all(|&s| s == 0.0));
    }

    #[test]
    fn note_off_cuts_every_matching_voice() {
        let (mut pool, mut tx, _, _) = pool_with(4, 1_000, VoiceStealing::Oldest);
        tx.try_enqueue(NoteEvent::note_on(60, 100));
        tx.try_enqueue(NoteEvent::note_on(60, 100));
        tx.try_enqueue(NoteEvent::note_on(62, 100));
        pool.process(&mut block(8), &[], 8);
        assert_eq!(pool.active_voices(), 3);

        tx.try_enqueue(NoteEvent::note_off(60));
        pool.process(&mut block(8), &[], 8);
        assert_eq!(pool.active_voices(), 1);
        assert_eq!(pool.voices().iter().find(|v| v.is_active()).unwrap().note(), 62);
    }

    #[test]
    fn steals_oldest_when_full() {
        let (mut pool, mut tx, _, _) = pool_with(2, 1_000, VoiceStealing::Oldest);
        for note in [60, 62, 64] {
            tx.try_enqueue(NoteEvent::note_on(note, 100));
        }
        pool.process(&mut block(8), &[], 8);

        let mut notes: Vec<u8> = pool.voices().iter().map(Voice::note).collect();
        notes.sort_unstable();
        assert_eq!(notes, vec![62, 64]);
    }

    #[test]
    fn disabled_stealing_drops_new_note() {
        let (mut pool, mut tx, _, _) = pool_with(2, 1_000, VoiceStealing::Disabled);
        for note in [60, 62, 64] {
            tx.try_enqueue(NoteEvent::note_on(note, 100));
        }
        pool.process(&mut block(8), &[], 8);

        let mut notes: Vec<u8> = pool.voices().iter().map(Voice::note).collect();
        notes.sort_unstable();
        assert_eq!(notes, vec![60, 62]);
    }

    #[test]
    fn host_midi_is_sample_accurate() {
        let (mut pool, _tx, _, _) = pool_with(4, 1_000, VoiceStealing::Oldest);
        let midi = [TimedMidi::note_on(4, 60, 127), TimedMidi::note_off(6, 60)];

        let mut out = block(8);
        pool.process(&mut out, &midi, 8);

        assert_eq!(out[0], vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0]);
        assert_eq!(pool.active_voices(), 0);
    }

    #[test]
    fn out_of_range_offsets_are_clamped() {
        let (mut pool, _tx, _, _) = pool_with(4, 1_000, VoiceStealing::Oldest);
        let midi = [TimedMidi::note_on(3, 60, 127), TimedMidi::note_on(1, 62, 127), TimedMidi::note_on(99, 64, 127)];

        let mut out = block(4);
        pool.process(&mut out, &midi, 4);

        // The out-of-order event plays from the cursor, the late one is queued
        // for the end of the block and renders nothing yet.
        assert_eq!(out[0], vec![0.0, 0.0, 0.0, 2.0]);
        assert_eq!(pool.active_voices(), 3);
    }

    #[test]
    fn all_notes_off_controller() {
        let (mut pool, mut tx, _, _) = pool_with(4, 1_000, VoiceStealing::Oldest);
        tx.try_enqueue(NoteEvent::note_on(60, 100));
        tx.try_enqueue(NoteEvent::note_on(67, 100));
        let midi = [TimedMidi::new(
            2,
            MidiEvent::ControlChange {
                channel: 0,
                controller: 123,
                value: 0,
            },
        )];

        let mut out = block(4);
        pool.process(&mut out, &midi, 4);
        assert_eq!(pool.active_voices(), 0);
        assert_eq!(out[0][3], 0.0);
    }

    #[test]
    fn volume_is_read_each_block() {
        let (mut pool, mut tx, params, _) = pool_with(1, 1_000, VoiceStealing::Oldest);
        tx.try_enqueue(NoteEvent::note_on(60, 127));

        let mut out = block(2);
        pool.process(&mut out, &[], 2);
        assert_eq!(out[0], vec![1.0, 1.0]);

        params.set_volume(0.5);
        let mut out = block(2);
        pool.process(&mut out, &[], 2);
        assert_eq!(out[0], vec![0.5, 0.5]);
    }

    #[test]
    fn tuning_applies_to_new_notes_only() {
        let (mut pool, mut tx, params, _) = pool_with(2, 1_000, VoiceStealing::Oldest);
        tx.try_enqueue(NoteEvent::note_on(60, 127));
        pool.process(&mut block(2), &[], 2);

        params.set_tuning(12.0);
        tx.try_enqueue(NoteEvent::note_on(60, 127));
        pool.process(&mut block(2), &[], 2);

        let mut rates: Vec<f64> = pool.voices().iter().map(Voice::playback_rate).collect();
        rates.sort_by(f64::total_cmp);
        assert_eq!(rates, vec![1.0, 2.0]);
    }

    #[test]
    fn sound_filters_apply() {
        let slot = Arc::new(BufferHotSwap::new());
        slot.publish(Arc::new(SampleBuffer::from_channels(vec![vec![1.0; 100]], 44_100)));
        let (mut tx, rx) = NoteEventQueue::new(8);
        let mut pool = VoicePool::new(
            4,
            vec![Sound::new(slot).with_note_range(36..=40)],
            Arc::new(Parameters::default()),
            rx,
            VoiceStealing::Oldest,
        );

        tx.try_enqueue(NoteEvent::note_on(60, 100));
        tx.try_enqueue(NoteEvent::note_on(38, 100));
        pool.process(&mut block(4), &[], 4);

        assert_eq!(pool.active_voices(), 1);
        assert_eq!(pool.voices()[0].note(), 38);
    }
}
