//! Mandichat core — the message delivery lifecycle simulator.
//!
//! Models how a locally composed chat message moves through
//! `pending → sending → sent → delivered → read` under a simulated
//! connectivity signal, with FIFO offline queuing drained on reconnect.
//!
//! The public entry point is [`session::ChatSession`]: construct it, call
//! `start()`, and drive it through the channel-based command API
//! ([`command::ChatCommand`]). State changes are reported as
//! [`mandichat_types::ChatEvent`]s.
//!
//! There is no real transport, persistence, or authentication anywhere in
//! this crate — delivery is timer-driven and assumed always successful
//! once online. That is a deliberate property of the simulated model, not
//! an omission.

pub mod command;
pub mod connectivity;
pub mod delivery;
mod event_loop;
pub mod offer;
pub mod pending;
pub mod responder;
pub mod session;
pub mod store;

pub use command::{ChatCommand, SessionStatus};
pub use connectivity::ConnectivitySignal;
pub use offer::OfferBand;
pub use responder::{CannedResponder, ResponseStrategy, ScriptedResponder};
pub use session::{ChatSession, SessionState};
pub use store::{Message, MessageStore};
