//! Commands and status types for external → session communication.
//!
//! [`ChatCommand`] is the bounded-channel message type that the
//! presentation layer (CLI, tests) uses to drive the session. Each
//! command that produces a result carries a `tokio::sync::oneshot::Sender`
//! for the reply.
//!
//! All commands are processed sequentially inside the event loop, so the
//! store and queue are never touched concurrently.

use mandichat_types::{MessageId, Result};
use tokio::sync::oneshot;

use crate::session::SessionState;
use crate::store::Message;

// ---------------------------------------------------------------------------
// ChatCommand
// ---------------------------------------------------------------------------

/// Commands accepted by the session event loop.
pub enum ChatCommand {
    /// Compose and submit an outbound message.
    ///
    /// Online: appended as `sending` with delivery timers armed.
    /// Offline: appended as `pending` and registered in the pending
    /// queue.
    SendMessage {
        /// Message body. Empty/whitespace text is rejected.
        text: String,
        /// Reply channel. Returns the allocated [`MessageId`] on
        /// success.
        reply: oneshot::Sender<Result<MessageId>>,
    },

    /// Submit a price offer for the listing.
    ///
    /// Rejected while offline and when the amount falls outside the
    /// configured band. On acceptance, `OfferSubmitted` is emitted after
    /// the simulated round-trip delay.
    SubmitOffer {
        /// Offer amount in the listing currency.
        amount: f64,
        /// Optional note to the seller.
        note: Option<String>,
        /// Reply channel. `Ok(())` means the offer was accepted for
        /// submission.
        reply: oneshot::Sender<Result<()>>,
    },

    /// Fetch the ordered message snapshot.
    ListMessages {
        /// Reply channel for the snapshot.
        reply: oneshot::Sender<Vec<Message>>,
    },

    /// Query the current session status.
    GetStatus {
        /// Reply channel for the status snapshot.
        reply: oneshot::Sender<SessionStatus>,
    },

    /// Initiate graceful shutdown. The event loop aborts every armed
    /// timer and exits; await the `JoinHandle` returned by
    /// `ChatSession::start` to confirm completion.
    Shutdown,
}

// Manual Debug because oneshot::Sender does not implement Debug.
impl std::fmt::Debug for ChatCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SendMessage { text, .. } => f
                .debug_struct("SendMessage")
                .field("text_len", &text.len())
                .finish_non_exhaustive(),
            Self::SubmitOffer { amount, .. } => f
                .debug_struct("SubmitOffer")
                .field("amount", amount)
                .finish_non_exhaustive(),
            Self::ListMessages { .. } => f.write_str("ListMessages"),
            Self::GetStatus { .. } => f.write_str("GetStatus"),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// Snapshot of the session's current state.
///
/// Returned by [`ChatCommand::GetStatus`]. All fields are copied from
/// the runtime so the reply is self-contained.
#[derive(Clone, Copy, Debug)]
pub struct SessionStatus {
    /// Current lifecycle state.
    pub state: SessionState,
    /// Last known connectivity value.
    pub online: bool,
    /// Number of messages in the conversation.
    pub message_count: usize,
    /// Number of messages waiting in the pending queue.
    pub pending_count: usize,
}
