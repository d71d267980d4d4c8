//! Core shared types for the Mandichat conversation simulator.
//!
//! This crate defines all fundamental types used across the workspace.
//! No other crate should define shared types — everything lives here.

pub mod config;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// MessageId
// ---------------------------------------------------------------------------

/// Opaque message identifier, allocated monotonically at composition time.
///
/// Uniqueness within one conversation is the only invariant. The numeric
/// value carries no meaning beyond allocation order and must not be used
/// for display ordering — the message store preserves insertion order
/// independently.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct MessageId(u64);

impl MessageId {
    /// Creates a `MessageId` from a raw counter value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw counter value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for MessageId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

impl FromStr for MessageId {
    type Err = ChatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let raw = s
            .strip_prefix("msg-")
            .ok_or_else(|| ChatError::InvalidMessage {
                reason: format!("message id must start with 'msg-': {s}"),
            })?;
        let value = raw.parse::<u64>().map_err(|e| ChatError::InvalidMessage {
            reason: format!("invalid message id counter: {e}"),
        })?;
        Ok(Self(value))
    }
}

// ---------------------------------------------------------------------------
// ParticipantId
// ---------------------------------------------------------------------------

/// Identifies one party in a conversation (e.g. `buyer-44`, `seller-32`).
///
/// Immutable after creation. The only validation is non-emptiness — the
/// simulator treats identities as opaque labels.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Creates a participant id.
    ///
    /// # Errors
    ///
    /// [`ChatError::InvalidMessage`] if the label is empty or whitespace.
    pub fn new(label: impl Into<String>) -> Result<Self> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(ChatError::InvalidMessage {
                reason: "participant id must not be empty".into(),
            });
        }
        Ok(Self(label))
    }

    /// Returns the label as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ParticipantId {
    type Err = ChatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// UTC timestamp in ISO 8601 format.
///
/// All timestamps use UTC so that ordering is deterministic regardless of
/// the host timezone. Construction from a fixed `DateTime` is provided so
/// tests can inject known instants.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a `Timestamp` representing the current UTC time.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a `Timestamp` from a `DateTime<Utc>`.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl FromStr for Timestamp {
    type Err = ChatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| ChatError::ConfigError {
                reason: format!("invalid ISO 8601 timestamp: {e}"),
            })?
            .with_timezone(&Utc);
        Ok(Self(dt))
    }
}

// ---------------------------------------------------------------------------
// DeliveryStatus
// ---------------------------------------------------------------------------

/// Per-message delivery lifecycle state.
///
/// Locally composed messages advance strictly forward:
///
/// ```text
/// pending ──▶ sending ──▶ sent ──▶ delivered ──▶ read
/// ```
///
/// `pending` is the offline entry point; `sending` the online one. A
/// message from the counterparty is created already `read` and never
/// transitions. There is no failure state — the simulated network is
/// assumed reliable.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Composed while offline, waiting in the pending queue.
    Pending,
    /// Handed to the (simulated) transport.
    Sending,
    /// Accepted by the transport.
    Sent,
    /// Arrived at the counterparty.
    Delivered,
    /// Seen by the counterparty. Terminal.
    Read,
}

impl DeliveryStatus {
    /// Position of this status in the lifecycle order.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Sending => 1,
            Self::Sent => 2,
            Self::Delivered => 3,
            Self::Read => 4,
        }
    }

    /// Whether a transition from `self` to `next` is a legal forward step.
    ///
    /// Only single forward steps are legal, with one exception: a queued
    /// `pending` message jumps directly to `sent` when the pending queue
    /// drains (the drain path skips the transient `sending` stage).
    pub fn can_advance_to(&self, next: DeliveryStatus) -> bool {
        if *self == Self::Pending && next == Self::Sent {
            return true;
        }
        next.rank() == self.rank() + 1
    }

    /// Whether this is the terminal lifecycle state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Read)
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Sending => write!(f, "sending"),
            Self::Sent => write!(f, "sent"),
            Self::Delivered => write!(f, "delivered"),
            Self::Read => write!(f, "read"),
        }
    }
}

impl FromStr for DeliveryStatus {
    type Err = ChatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "sending" => Ok(Self::Sending),
            "sent" => Ok(Self::Sent),
            "delivered" => Ok(Self::Delivered),
            "read" => Ok(Self::Read),
            other => Err(ChatError::InvalidMessage {
                reason: format!("unknown delivery status: {other}"),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// ChatEvent
// ---------------------------------------------------------------------------

/// Events emitted by the chat session to UI / CLI consumers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ChatEvent {
    /// A message was appended to the conversation.
    MessageAppended {
        /// Identifier of the new message.
        id: MessageId,
        /// Originating party.
        sender: ParticipantId,
    },
    /// A locally-sent message advanced through its lifecycle.
    StatusChanged {
        /// The message whose status changed.
        id: MessageId,
        /// The new status.
        status: DeliveryStatus,
    },
    /// The counterparty started composing a response.
    TypingStarted {
        /// The composing party.
        participant: ParticipantId,
    },
    /// The counterparty stopped composing.
    TypingStopped {
        /// The party that stopped composing.
        participant: ParticipantId,
    },
    /// The connectivity signal changed.
    ConnectivityChanged {
        /// New online/offline value.
        online: bool,
    },
    /// The pending queue was drained after a reconnect.
    QueueDrained {
        /// Number of messages flushed from the queue.
        count: usize,
    },
    /// An offer was accepted by the (simulated) marketplace backend.
    OfferSubmitted {
        /// Offer amount in the listing currency.
        amount: f64,
    },
}

// ---------------------------------------------------------------------------
// ChatError
// ---------------------------------------------------------------------------

/// Central error type for the Mandichat workspace.
///
/// Deliberately small: the simulated delivery model has no failure branch
/// (no dropped messages, no retries), so errors only cover input
/// validation and session lifecycle misuse.
#[derive(Debug, Error)]
pub enum ChatError {
    /// A message is malformed (empty text, bad id, unknown status).
    #[error("invalid message: {reason}")]
    InvalidMessage {
        /// Human-readable description of the validation failure.
        reason: String,
    },

    /// An offer violates the allowed price band.
    #[error("invalid offer: {reason}")]
    InvalidOffer {
        /// Human-readable description of the offer rejection.
        reason: String,
    },

    /// The operation requires connectivity but the signal is offline.
    #[error("offline: {reason}")]
    Offline {
        /// What was attempted while offline.
        reason: String,
    },

    /// The session is shut down or its channels are closed.
    #[error("session closed: {reason}")]
    SessionClosed {
        /// Human-readable description of the lifecycle misuse.
        reason: String,
    },

    /// A configuration value is invalid.
    #[error("config error: {reason}")]
    ConfigError {
        /// Human-readable description of the configuration problem.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Result alias
// ---------------------------------------------------------------------------

/// Convenience result type using [`ChatError`].
pub type Result<T> = std::result::Result<T, ChatError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_id_roundtrip() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let id = MessageId::new(42);
        let displayed = id.to_string();
        assert_eq!(displayed, "msg-42");
        let parsed: MessageId = displayed.parse()?;
        assert_eq!(id, parsed);
        Ok(())
    }

    #[test]
    fn message_id_rejects_bad_prefix() {
        let result: std::result::Result<MessageId, _> = "message-1".parse();
        assert!(result.is_err());
    }

    #[test]
    fn message_id_rejects_non_numeric() {
        let result: std::result::Result<MessageId, _> = "msg-abc".parse();
        assert!(result.is_err());
    }

    #[test]
    fn participant_id_rejects_empty() {
        assert!(ParticipantId::new("").is_err());
        assert!(ParticipantId::new("   ").is_err());
    }

    #[test]
    fn participant_id_roundtrip() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let pid = ParticipantId::new("seller-32")?;
        let parsed: ParticipantId = pid.to_string().parse()?;
        assert_eq!(pid, parsed);
        Ok(())
    }

    #[test]
    fn timestamp_roundtrip() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let ts = Timestamp::now();
        let parsed: Timestamp = ts.to_string().parse()?;
        assert_eq!(ts.as_datetime(), parsed.as_datetime());
        Ok(())
    }

    #[test]
    fn status_display_matches_wire_names() {
        assert_eq!(DeliveryStatus::Pending.to_string(), "pending");
        assert_eq!(DeliveryStatus::Sending.to_string(), "sending");
        assert_eq!(DeliveryStatus::Sent.to_string(), "sent");
        assert_eq!(DeliveryStatus::Delivered.to_string(), "delivered");
        assert_eq!(DeliveryStatus::Read.to_string(), "read");
    }

    #[test]
    fn status_parse_roundtrip() -> std::result::Result<(), Box<dyn std::error::Error>> {
        for s in ["pending", "sending", "sent", "delivered", "read"] {
            let status: DeliveryStatus = s.parse()?;
            assert_eq!(status.to_string(), s);
        }
        Ok(())
    }

    #[test]
    fn status_lifecycle_is_strictly_forward() {
        use DeliveryStatus::*;
        assert!(Pending.can_advance_to(Sending));
        assert!(Sending.can_advance_to(Sent));
        assert!(Sent.can_advance_to(Delivered));
        assert!(Delivered.can_advance_to(Read));

        // No regression.
        assert!(!Sent.can_advance_to(Sending));
        assert!(!Read.can_advance_to(Delivered));
        // No skipping (except the drain shortcut).
        assert!(!Sending.can_advance_to(Delivered));
        assert!(!Sent.can_advance_to(Read));
    }

    #[test]
    fn drain_shortcut_is_legal() {
        assert!(DeliveryStatus::Pending.can_advance_to(DeliveryStatus::Sent));
    }

    #[test]
    fn read_is_terminal() {
        assert!(DeliveryStatus::Read.is_terminal());
        assert!(!DeliveryStatus::Delivered.is_terminal());
    }

    #[test]
    fn status_serde_uses_lowercase() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string(&DeliveryStatus::Delivered)?;
        assert_eq!(json, "\"delivered\"");
        let parsed: DeliveryStatus = serde_json::from_str(&json)?;
        assert_eq!(parsed, DeliveryStatus::Delivered);
        Ok(())
    }

    #[test]
    fn error_display_includes_reason() {
        let err = ChatError::InvalidOffer {
            reason: "below minimum".into(),
        };
        assert!(err.to_string().contains("below minimum"));
    }
}
