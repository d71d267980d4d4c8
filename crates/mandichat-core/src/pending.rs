//! FIFO holding area for messages composed while offline.
//!
//! Message ids are enqueued only while the connectivity signal is false
//! and taken out exactly once when it flips back to true. The queue holds
//! ids, not message bodies — the store owns the records.
//!
//! Deliberately unbounded and unpersisted: the simulated model has no
//! failure branch, so capacity limits, TTLs, and retry backoff do not
//! apply here.

use std::collections::VecDeque;

use mandichat_types::MessageId;

// ---------------------------------------------------------------------------
// PendingQueue
// ---------------------------------------------------------------------------

/// FIFO queue of message ids awaiting transmission.
#[derive(Debug, Default)]
pub struct PendingQueue {
    ids: VecDeque<MessageId>,
}

impl PendingQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a message composed while offline.
    pub fn enqueue(&mut self, id: MessageId) {
        self.ids.push_back(id);
    }

    /// Drains the queue, returning the queued ids in FIFO order.
    ///
    /// The queue is empty afterwards, which is what makes a drain
    /// exactly-once: a second call returns nothing until new messages
    /// are enqueued.
    pub fn take_all(&mut self) -> Vec<MessageId> {
        self.ids.drain(..).collect()
    }

    /// Whether the given id is currently queued.
    pub fn contains(&self, id: MessageId) -> bool {
        self.ids.contains(&id)
    }

    /// Number of queued ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_all_is_fifo() {
        let mut queue = PendingQueue::new();
        queue.enqueue(MessageId::new(3));
        queue.enqueue(MessageId::new(1));
        queue.enqueue(MessageId::new(2));

        let drained: Vec<u64> = queue.take_all().iter().map(|id| id.as_u64()).collect();
        assert_eq!(drained, vec![3, 1, 2], "drain must preserve enqueue order");
    }

    #[test]
    fn take_all_drains_exactly_once() {
        let mut queue = PendingQueue::new();
        queue.enqueue(MessageId::new(1));

        assert_eq!(queue.take_all().len(), 1);
        assert!(queue.is_empty());
        assert!(queue.take_all().is_empty(), "second drain must be empty");
    }

    #[test]
    fn contains_tracks_membership() {
        let mut queue = PendingQueue::new();
        queue.enqueue(MessageId::new(7));

        assert!(queue.contains(MessageId::new(7)));
        assert!(!queue.contains(MessageId::new(8)));

        queue.take_all();
        assert!(!queue.contains(MessageId::new(7)));
    }

    #[test]
    fn enqueue_after_drain_starts_fresh() {
        let mut queue = PendingQueue::new();
        queue.enqueue(MessageId::new(1));
        queue.take_all();

        queue.enqueue(MessageId::new(2));
        let drained: Vec<u64> = queue.take_all().iter().map(|id| id.as_u64()).collect();
        assert_eq!(drained, vec![2], "only post-drain enqueues are drained");
    }
}
