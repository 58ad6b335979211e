//! Bounded single-producer/single-consumer note queue.
//!
//! A thin typed layer over `rtrb`, whose ring keeps independently advanced
//! atomic read and write cursors: the producer writes a slot and then
//! publishes its cursor with release ordering, the consumer loads that cursor
//! with acquire ordering before reading the slot. Neither side ever locks,
//! blocks or allocates after construction.

use rtrb::{Consumer, Producer, PushError, RingBuffer};

use super::message::NoteEvent;

/// Factory for the two halves of a note queue.
pub struct NoteEventQueue;

impl NoteEventQueue {
    /// Create a queue holding at least `capacity` events.
    ///
    /// Capacity is rounded up to the next power of two (minimum 1).
    #[allow(clippy::new_ret_no_self)]
    pub fn new(capacity: usize) -> (NoteSender, NoteReceiver) {
        let capacity = capacity.max(1).next_power_of_two();
        let (producer, consumer) = RingBuffer::new(capacity);
        (NoteSender { producer }, NoteReceiver { consumer })
    }
}

/// Producer half. Owned by exactly one non-realtime thread.
pub struct NoteSender {
    producer: Producer<NoteEvent>,
}

impl NoteSender {
    /// Enqueue `event`, or return `false` and drop it when the queue is full.
    pub fn try_enqueue(&mut self, event: NoteEvent) -> bool {
        match self.producer.push(event) {
            Ok(()) => true,
            Err(PushError::Full(_)) => false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.producer.buffer().capacity()
    }

    /// Free slots right now.
    pub fn free_slots(&self) -> usize {
        self.producer.slots()
    }

    /// True once the receiving half has been dropped.
    pub fn is_abandoned(&self) -> bool {
        self.producer.is_abandoned()
    }
}

/// Consumer half. Owned by the audio thread.
pub struct NoteReceiver {
    consumer: Consumer<NoteEvent>,
}

impl NoteReceiver {
    /// Remove and yield every event that was ready when the drain started,
    /// oldest first.
    ///
    /// Events pushed while the drain is in progress are left for the next
    /// call, so a busy producer cannot keep the audio thread in this loop.
    pub fn drain_ready(&mut self) -> impl Iterator<Item = NoteEvent> + '_ {
        let ready = self.consumer.slots();
        let consumer = &mut self.consumer;
        (0..ready).map_while(move |_| consumer.pop().ok())
    }

    /// Take the oldest event, if any.
    #[inline]
    pub fn pop(&mut self) -> Option<NoteEvent> {
        self.consumer.pop().ok()
    }

    pub fn pending(&self) -> usize {
        self.consumer.slots()
    }

    pub fn capacity(&self) -> usize {
        self.consumer.buffer().capacity()
    }
}

impl std::fmt::Debug for NoteSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteSender")
            .field("capacity", &self.capacity())
            .field("free_slots", &self.free_slots())
            .finish()
    }
}

impl std::fmt::Debug for NoteReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteReceiver")
            .field("capacity", &self.capacity())
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn capacity_rounds_up_to_power_of_two() {
        let (tx, rx) = NoteEventQueue::new(100);
        assert_eq!(tx.capacity(), 128);
        assert_eq!(rx.capacity(), 128);

        let (tx, _rx) = NoteEventQueue::new(0);
        assert_eq!(tx.capacity(), 1);
    }

    #[test]
    fn preserves_fifo_order() {
        let (mut tx, mut rx) = NoteEventQueue::new(8);
        for note in 60..68 {
            assert!(tx.try_enqueue(NoteEvent::note_on(note, 100)));
        }

        let notes: Vec<u8> = rx.drain_ready().map(|e| e.note).collect();
        assert_eq!(notes, (60..68).collect::<Vec<_>>());
        assert_eq!(rx.drain_ready().count(), 0);
    }

    #[test]
    fn full_queue_rejects_without_corrupting() {
        let (mut tx, mut rx) = NoteEventQueue::new(4);
        for note in 0..4 {
            assert!(tx.try_enqueue(NoteEvent::note_on(note, 1)));
        }
        assert!(!tx.try_enqueue(NoteEvent::note_on(99, 1)));
        assert!(!tx.try_enqueue(NoteEvent::note_off(98)));
        assert_eq!(tx.free_slots(), 0);

        let drained: Vec<NoteEvent> = rx.drain_ready().collect();
        assert_eq!(
            drained,
            (0..4).map(|n| NoteEvent::note_on(n, 1)).collect::<Vec<_>>()
        );

        // Space is reusable after the drain.
        assert!(tx.try_enqueue(NoteEvent::note_off(5)));
        assert_eq!(rx.drain_ready().next(), Some(NoteEvent::note_off(5)));
    }

    #[test]
    fn partial_drain_leaves_rest_queued() {
        let (mut tx, mut rx) = NoteEventQueue::new(8);
        for note in 0..5 {
            tx.try_enqueue(NoteEvent::note_on(note, 1));
        }

        let first_two: Vec<u8> = rx.drain_ready().take(2).map(|e| e.note).collect();
        assert_eq!(first_two, vec![0, 1]);
        assert_eq!(rx.pending(), 3);
    }

    #[test]
    fn detects_abandoned_consumer() {
        let (tx, rx) = NoteEventQueue::new(2);
        assert!(!tx.is_abandoned());
        drop(rx);
        assert!(tx.is_abandoned());
    }

    #[test]
    fn cross_thread_order_is_preserved() {
        let (mut tx, mut rx) = NoteEventQueue::new(16);
        let total = 10_000u32;

        let producer = thread::spawn(move || {
            let mut sent = 0u32;
            while sent < total {
                let event = NoteEvent::note_on((sent % 128) as u8, (sent % 127) as u8);
                if tx.try_enqueue(event) {
                    sent += 1;
                } else {
                    thread::yield_now();
                }
            }
        });

        let mut received = 0u32;
        while received < total {
            for event in rx.drain_ready() {
                assert_eq!(event.note, (received % 128) as u8);
                assert_eq!(event.velocity, (received % 127) as u8);
                received += 1;
            }
            thread::yield_now();
        }

        producer.join().unwrap();
    }
}
