//! Insertion-ordered message store for one conversation.
//!
//! The store is owned exclusively by the session event loop and mutated
//! from that single task only, so no locking is needed. A port to a
//! multi-threaded environment would have to add explicit synchronization
//! around the store.

use mandichat_types::{DeliveryStatus, MessageId, ParticipantId, Timestamp};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// One chat message.
///
/// `id`, `sender`, `text`, and `timestamp` are immutable after creation;
/// only `status` changes, and only forward through the lifecycle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier within the conversation.
    pub id: MessageId,
    /// Originating party.
    pub sender: ParticipantId,
    /// Message body. Opaque — the only validation is non-emptiness,
    /// applied at composition time by the session.
    pub text: String,
    /// Creation time.
    pub timestamp: Timestamp,
    /// Current delivery lifecycle state.
    pub status: DeliveryStatus,
}

// ---------------------------------------------------------------------------
// MessageStore
// ---------------------------------------------------------------------------

/// Ordered sequence of messages, append-only from the caller's
/// perspective; only `status` is mutated in place.
#[derive(Debug, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message at the end. Never fails.
    ///
    /// Ids are allocated monotonically by the session, so duplicates
    /// cannot occur through the public API; a duplicate here would be a
    /// logic bug upstream.
    pub fn append(&mut self, message: Message) {
        debug_assert!(
            !self.messages.iter().any(|m| m.id == message.id),
            "duplicate message id {}",
            message.id,
        );
        self.messages.push(message);
    }

    /// Advances the status of the message with the given id.
    ///
    /// Returns `true` if a change was applied. A missing id is a benign
    /// race (e.g. the conversation was reset) and is a silent no-op, as
    /// is a transition that would regress or skip a lifecycle stage.
    pub fn update_status(&mut self, id: MessageId, status: DeliveryStatus) -> bool {
        let Some(message) = self.messages.iter_mut().find(|m| m.id == id) else {
            return false;
        };

        if !message.status.can_advance_to(status) {
            return false;
        }

        message.status = status;
        true
    }

    /// Returns the message with the given id, if present.
    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Returns a cloned, insertion-ordered view for the presentation
    /// layer.
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    /// Number of messages in the conversation.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the conversation is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use mandichat_types::Result;

    fn message(raw_id: u64, sender: &str, status: DeliveryStatus) -> Result<Message> {
        Ok(Message {
            id: MessageId::new(raw_id),
            sender: ParticipantId::new(sender)?,
            text: format!("text-{raw_id}"),
            timestamp: Timestamp::now(),
            status,
        })
    }

    #[test]
    fn append_preserves_insertion_order() -> Result<()> {
        let mut store = MessageStore::new();
        store.append(message(1, "buyer", DeliveryStatus::Sending)?);
        store.append(message(2, "seller", DeliveryStatus::Read)?);
        store.append(message(3, "buyer", DeliveryStatus::Pending)?);

        let ids: Vec<u64> = store.snapshot().iter().map(|m| m.id.as_u64()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        Ok(())
    }

    #[test]
    fn order_survives_out_of_order_completion() -> Result<()> {
        let mut store = MessageStore::new();
        store.append(message(1, "buyer", DeliveryStatus::Sending)?);
        store.append(message(2, "buyer", DeliveryStatus::Sending)?);

        // Message 2 completes its lifecycle before message 1 moves.
        assert!(store.update_status(MessageId::new(2), DeliveryStatus::Sent));
        assert!(store.update_status(MessageId::new(2), DeliveryStatus::Delivered));
        assert!(store.update_status(MessageId::new(2), DeliveryStatus::Read));
        assert!(store.update_status(MessageId::new(1), DeliveryStatus::Sent));

        let ids: Vec<u64> = store.snapshot().iter().map(|m| m.id.as_u64()).collect();
        assert_eq!(ids, vec![1, 2], "completion order must not reorder the store");
        Ok(())
    }

    #[test]
    fn update_missing_id_is_noop() -> Result<()> {
        let mut store = MessageStore::new();
        store.append(message(1, "buyer", DeliveryStatus::Sending)?);

        assert!(!store.update_status(MessageId::new(99), DeliveryStatus::Sent));
        assert_eq!(store.get(MessageId::new(1)).map(|m| m.status), Some(DeliveryStatus::Sending));
        Ok(())
    }

    #[test]
    fn status_never_regresses() -> Result<()> {
        let mut store = MessageStore::new();
        store.append(message(1, "buyer", DeliveryStatus::Sending)?);

        assert!(store.update_status(MessageId::new(1), DeliveryStatus::Sent));
        assert!(!store.update_status(MessageId::new(1), DeliveryStatus::Sending));
        assert_eq!(store.get(MessageId::new(1)).map(|m| m.status), Some(DeliveryStatus::Sent));
        Ok(())
    }

    #[test]
    fn status_never_skips_a_stage() -> Result<()> {
        let mut store = MessageStore::new();
        store.append(message(1, "buyer", DeliveryStatus::Sending)?);

        assert!(!store.update_status(MessageId::new(1), DeliveryStatus::Delivered));
        assert_eq!(store.get(MessageId::new(1)).map(|m| m.status), Some(DeliveryStatus::Sending));
        Ok(())
    }

    #[test]
    fn counterparty_message_never_transitions() -> Result<()> {
        let mut store = MessageStore::new();
        store.append(message(1, "seller", DeliveryStatus::Read)?);

        // Read is terminal — every attempted transition is a no-op.
        for status in [
            DeliveryStatus::Pending,
            DeliveryStatus::Sending,
            DeliveryStatus::Sent,
            DeliveryStatus::Delivered,
        ] {
            assert!(!store.update_status(MessageId::new(1), status));
        }
        Ok(())
    }

    #[test]
    fn drain_shortcut_pending_to_sent() -> Result<()> {
        let mut store = MessageStore::new();
        store.append(message(1, "buyer", DeliveryStatus::Pending)?);

        assert!(store.update_status(MessageId::new(1), DeliveryStatus::Sent));
        Ok(())
    }
}
