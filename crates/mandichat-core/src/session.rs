//! Chat session lifecycle.
//!
//! The [`ChatSession`] is the public entry point for the simulator. It
//! owns all subsystems and exposes a channel-based API for external
//! consumers (CLI, tests).
//!
//! # State machine
//!
//! ```text
//! Initializing ──start()──▶ Running ──shutdown()──▶ ShuttingDown ──▶ (dropped)
//! ```
//!
//! Double-start and shutdown-before-start are rejected with
//! `ChatError::SessionClosed`.

use mandichat_types::config::ChatConfig;
use mandichat_types::{ChatError, ChatEvent, MessageId, ParticipantId, Result};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::command::ChatCommand;
use crate::connectivity::ConnectivitySignal;
use crate::delivery::DeliverySchedule;
use crate::event_loop;
use crate::offer::OfferBand;
use crate::pending::PendingQueue;
use crate::responder::ResponseStrategy;
use crate::store::MessageStore;

// ---------------------------------------------------------------------------
// Channel buffer sizes
// ---------------------------------------------------------------------------

/// Bounded command channel capacity. Small buffer — callers await
/// backpressure if the event loop is busy.
const COMMAND_CHANNEL_SIZE: usize = 64;

/// Bounded event channel capacity. Larger buffer to absorb bursts of
/// status transitions without blocking the event loop.
const EVENT_CHANNEL_SIZE: usize = 256;

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Lifecycle state of the session.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionState {
    /// Components created, event loop not started.
    Initializing,
    /// Event loop is active.
    Running,
    /// Graceful shutdown in progress.
    ShuttingDown,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initializing => write!(f, "initializing"),
            Self::Running => write!(f, "running"),
            Self::ShuttingDown => write!(f, "shutting_down"),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionRuntime (internal)
// ---------------------------------------------------------------------------

/// Owned runtime state moved into the event loop task.
///
/// The store, queue, and responder are owned here and touched only from
/// the event loop task — no locks required.
pub(crate) struct SessionRuntime {
    pub local: ParticipantId,
    pub peer: ParticipantId,
    pub greeting: Option<String>,
    pub config: ChatConfig,
    pub schedule: DeliverySchedule,
    pub offer_band: OfferBand,
    pub responder: Box<dyn ResponseStrategy>,
    pub store: MessageStore,
    pub queue: PendingQueue,
    pub connectivity_rx: watch::Receiver<bool>,
    pub event_tx: mpsc::Sender<ChatEvent>,
    pub command_rx: mpsc::Receiver<ChatCommand>,
    pub shutdown_rx: watch::Receiver<bool>,
    next_id: u64,
}

impl SessionRuntime {
    /// Allocates the next monotonic message id.
    pub(crate) fn allocate_id(&mut self) -> MessageId {
        let id = MessageId::new(self.next_id);
        self.next_id += 1;
        id
    }
}

// ---------------------------------------------------------------------------
// ChatSession
// ---------------------------------------------------------------------------

/// One product-detail conversation between a local user and a
/// counterparty, driven by a tokio event loop.
///
/// After construction via [`ChatSession::new`], call
/// [`ChatSession::start`] to spawn the event loop, then interact through
/// the channels:
///
/// - Send [`ChatCommand`]s via [`ChatSession::command_sender`].
/// - Receive [`ChatEvent`]s via [`ChatSession::take_event_receiver`].
/// - Shut down via [`ChatCommand::Shutdown`] or
///   [`ChatSession::shutdown`].
pub struct ChatSession {
    /// Current lifecycle state.
    state: SessionState,

    /// Components to be moved into the event loop. `None` after
    /// `start()` has been called.
    runtime: Option<SessionRuntime>,

    /// Sender for commands to the event loop.
    command_tx: mpsc::Sender<ChatCommand>,

    /// Receiver for events from the event loop.
    /// `None` after taken by the consumer.
    event_rx: Option<mpsc::Receiver<ChatEvent>>,

    /// Signals the event loop to shut down.
    shutdown_tx: watch::Sender<bool>,
}

impl ChatSession {
    /// Creates a new session.
    ///
    /// # Parameters
    ///
    /// - `local` — the composing user.
    /// - `peer` — the counterparty (seller).
    /// - `list_price` — the listing price the offer band derives from.
    /// - `greeting` — optional counterparty greeting appended shortly
    ///   after start.
    /// - `config` — timings and offer ratios.
    /// - `responder` — counterparty auto-response strategy.
    /// - `connectivity` — the host connectivity signal to subscribe to.
    ///
    /// # Errors
    ///
    /// - `ChatError::ConfigError` if the configuration is invalid.
    /// - `ChatError::InvalidOffer` if the listing price is not positive.
    pub fn new(
        local: ParticipantId,
        peer: ParticipantId,
        list_price: f64,
        greeting: Option<String>,
        config: ChatConfig,
        responder: Box<dyn ResponseStrategy>,
        connectivity: &ConnectivitySignal,
    ) -> Result<Self> {
        config.validate()?;
        let offer_band = OfferBand::for_listing(&config, list_price)?;
        let schedule = DeliverySchedule::from_config(&config);

        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let runtime = SessionRuntime {
            local,
            peer,
            greeting,
            config,
            schedule,
            offer_band,
            responder,
            store: MessageStore::new(),
            queue: PendingQueue::new(),
            connectivity_rx: connectivity.subscribe(),
            event_tx,
            command_rx,
            shutdown_rx,
            next_id: 1,
        };

        Ok(Self {
            state: SessionState::Initializing,
            runtime: Some(runtime),
            command_tx,
            event_rx: Some(event_rx),
            shutdown_tx,
        })
    }

    /// Starts the event loop in a new tokio task.
    ///
    /// Transitions `Initializing → Running`. Returns the `JoinHandle`
    /// that resolves when the event loop exits (after shutdown).
    ///
    /// # Errors
    ///
    /// `ChatError::SessionClosed` if the session is not in
    /// `Initializing` state (prevents double-start).
    pub fn start(&mut self) -> Result<JoinHandle<()>> {
        if self.state != SessionState::Initializing {
            return Err(ChatError::SessionClosed {
                reason: format!(
                    "cannot start session in state '{}'; expected 'initializing'",
                    self.state,
                ),
            });
        }

        let runtime = self.runtime.take().ok_or_else(|| ChatError::SessionClosed {
            reason: "runtime already consumed (double start?)".into(),
        })?;

        let handle = tokio::spawn(event_loop::run_event_loop(runtime));
        self.state = SessionState::Running;

        Ok(handle)
    }

    /// Initiates graceful shutdown.
    ///
    /// Signals the event loop to exit; every armed delivery timer is
    /// aborted. Await the `JoinHandle` returned by
    /// [`start`](Self::start) to wait for completion. Idempotent once
    /// running.
    ///
    /// # Errors
    ///
    /// `ChatError::SessionClosed` if the session was never started.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.state == SessionState::Initializing {
            return Err(ChatError::SessionClosed {
                reason: "cannot shutdown a session that has not been started".into(),
            });
        }

        if self.state == SessionState::ShuttingDown {
            return Ok(());
        }

        self.state = SessionState::ShuttingDown;
        let _ = self.shutdown_tx.send(true);
        Ok(())
    }

    /// Returns a cloneable sender for submitting commands.
    pub fn command_sender(&self) -> mpsc::Sender<ChatCommand> {
        self.command_tx.clone()
    }

    /// Takes the event receiver (can only be taken once).
    pub fn take_event_receiver(&mut self) -> Option<mpsc::Receiver<ChatEvent>> {
        self.event_rx.take()
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
