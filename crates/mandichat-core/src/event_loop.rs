//! Main event loop driving the conversation simulation.
//!
//! [`run_event_loop`] is spawned as a tokio task by
//! [`ChatSession::start`](crate::session::ChatSession::start). It uses
//! `tokio::select!` to multiplex:
//!
//! 1. **Timer steps** — per-message delivery stages, the typing delay,
//!    the greeting, and offer round-trips, all armed as tasks in a
//!    [`JoinSet`].
//! 2. **Commands** — `SendMessage`, `SubmitOffer`, queries, `Shutdown`.
//! 3. **Connectivity watch** — online/offline wakeups; any wakeup that
//!    finds the signal online with a non-empty queue triggers the drain.
//! 4. **Shutdown signal** — graceful exit via `watch` channel.
//!
//! The `JoinSet` is owned by the loop, so exiting (for any reason)
//! aborts every armed timer: no status transition can fire after the
//! session is torn down.
//!
//! # Drain flap policy
//!
//! A reconnect drains the FIFO snapshot taken at the flip. The drain is
//! *let-finish*: if the signal flaps offline and back mid-drain, the
//! snapshot's steps still run to completion, and only messages queued
//! after the snapshot wait for the next reconnect. Combined with the
//! single `take_all()`, no message is ever drained twice or skipped.

use std::time::Duration;

use mandichat_types::{ChatEvent, DeliveryStatus, MessageId, Timestamp};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::command::{ChatCommand, SessionStatus};
use crate::delivery::DeliverySchedule;
use crate::session::{SessionRuntime, SessionState};
use crate::store::Message;

// ---------------------------------------------------------------------------
// LoopStep
// ---------------------------------------------------------------------------

/// A deferred action produced by an armed timer.
enum LoopStep {
    /// Advance a message to its next delivery stage.
    Advance { id: MessageId, to: DeliveryStatus },
    /// The counterparty finished "typing" and may respond.
    ResponseReady { prompt: String },
    /// Append the counterparty's initial greeting.
    Greeting { text: String },
    /// The simulated backend accepted an offer.
    OfferResolved { amount: f64 },
}

/// Arms a timer that yields `step` after `delay`.
fn arm(timers: &mut JoinSet<LoopStep>, delay: Duration, step: LoopStep) {
    timers.spawn(async move {
        tokio::time::sleep(delay).await;
        step
    });
}

// ---------------------------------------------------------------------------
// Event loop entry point
// ---------------------------------------------------------------------------

/// Runs the session event loop until shutdown is signalled.
pub(crate) async fn run_event_loop(mut rt: SessionRuntime) {
    tracing::info!(local = %rt.local, peer = %rt.peer, "chat session started");

    let mut timers: JoinSet<LoopStep> = JoinSet::new();
    let mut online = *rt.connectivity_rx.borrow();
    let mut typing_armed = false;
    let mut connectivity_alive = true;

    if let Some(text) = rt.greeting.take() {
        let delay = Duration::from_millis(rt.config.greeting_delay_ms);
        arm(&mut timers, delay, LoopStep::Greeting { text });
    }

    loop {
        tokio::select! {
            // ---------------------------------------------------------------
            // 1. Apply a fired timer step.
            // ---------------------------------------------------------------
            Some(joined) = timers.join_next() => {
                match joined {
                    Ok(step) => {
                        apply_step(&mut rt, &mut timers, &mut typing_armed, step).await;
                    }
                    Err(e) if e.is_panic() => {
                        tracing::error!(%e, "timer task panicked");
                    }
                    Err(_) => {}
                }
            }

            // ---------------------------------------------------------------
            // 2. Process a command from the presentation layer.
            // ---------------------------------------------------------------
            cmd = rt.command_rx.recv() => {
                match cmd {
                    Some(cmd) => {
                        let should_exit =
                            handle_command(&mut rt, &mut timers, &mut typing_armed, cmd).await;
                        if should_exit {
                            tracing::info!("shutdown command received -- exiting event loop");
                            break;
                        }
                    }
                    None => {
                        tracing::info!("command channel closed -- exiting event loop");
                        break;
                    }
                }
            }

            // ---------------------------------------------------------------
            // 3. Observe connectivity wakeups; drain on reconnect.
            // ---------------------------------------------------------------
            changed = rt.connectivity_rx.changed(), if connectivity_alive => {
                match changed {
                    Ok(()) => {
                        let now_online = *rt.connectivity_rx.borrow();
                        if now_online != online {
                            online = now_online;
                            tracing::info!(online, "connectivity changed");
                            emit(&rt.event_tx, ChatEvent::ConnectivityChanged {
                                online: now_online,
                            }).await;
                        }
                        // The send path reads the live watch value, so a
                        // message can be queued during an offline window
                        // whose opening and closing edges coalesce into
                        // one wakeup. The drain therefore keys on the
                        // live value and the queue, not on whether this
                        // loop observed a flip.
                        if now_online {
                            drain_pending(&mut rt, &mut timers).await;
                        }
                    }
                    Err(_) => {
                        // Signal owner dropped; keep the last known value.
                        connectivity_alive = false;
                        tracing::debug!("connectivity signal dropped");
                    }
                }
            }

            // ---------------------------------------------------------------
            // 4. Shutdown signal via watch channel.
            // ---------------------------------------------------------------
            _ = rt.shutdown_rx.changed() => {
                if *rt.shutdown_rx.borrow() {
                    tracing::info!("shutdown signal received -- exiting event loop");
                    break;
                }
            }
        }
    }

    // Dropping the JoinSet aborts every armed timer; abort explicitly so
    // the intent is visible.
    timers.abort_all();

    tracing::info!(
        messages = rt.store.len(),
        pending = rt.queue.len(),
        "chat session exited"
    );
}

// ---------------------------------------------------------------------------
// Timer step handler
// ---------------------------------------------------------------------------

/// Applies a fired timer step to the runtime state.
async fn apply_step(
    rt: &mut SessionRuntime,
    timers: &mut JoinSet<LoopStep>,
    typing_armed: &mut bool,
    step: LoopStep,
) {
    match step {
        LoopStep::Advance { id, to } => {
            if rt.store.update_status(id, to) {
                tracing::debug!(%id, status = %to, "delivery stage applied");
                emit(&rt.event_tx, ChatEvent::StatusChanged { id, status: to }).await;

                // Arm the next stage only after this one is applied, so
                // per-message ordering is strict.
                if let Some(next) = DeliverySchedule::next_stage(to) {
                    let delay = rt.schedule.delay_to(next);
                    arm(timers, delay, LoopStep::Advance { id, to: next });
                }
            } else {
                // Missing id or illegal transition: benign, ignore.
                tracing::debug!(%id, status = %to, "stale delivery step ignored");
            }
        }

        LoopStep::ResponseReady { prompt } => {
            *typing_armed = false;
            let peer = rt.peer.clone();
            emit(&rt.event_tx, ChatEvent::TypingStopped { participant: peer }).await;

            if let Some(text) = rt.responder.pick(&prompt) {
                append_counterparty(rt, text).await;
            }
        }

        LoopStep::Greeting { text } => {
            append_counterparty(rt, text).await;
        }

        LoopStep::OfferResolved { amount } => {
            tracing::info!(amount, "offer accepted by simulated backend");
            emit(&rt.event_tx, ChatEvent::OfferSubmitted { amount }).await;
        }
    }
}

/// Appends a counterparty message.
///
/// Counterparty messages are created already in the terminal `read`
/// state and never transition.
async fn append_counterparty(rt: &mut SessionRuntime, text: String) {
    let id = rt.allocate_id();
    let sender = rt.peer.clone();

    rt.store.append(Message {
        id,
        sender: sender.clone(),
        text,
        timestamp: Timestamp::now(),
        status: DeliveryStatus::Read,
    });

    tracing::debug!(%id, %sender, "counterparty message appended");
    emit(&rt.event_tx, ChatEvent::MessageAppended { id, sender }).await;
}

// ---------------------------------------------------------------------------
// Command handler
// ---------------------------------------------------------------------------

/// Processes a single command. Returns `true` on `Shutdown`.
async fn handle_command(
    rt: &mut SessionRuntime,
    timers: &mut JoinSet<LoopStep>,
    typing_armed: &mut bool,
    cmd: ChatCommand,
) -> bool {
    match cmd {
        ChatCommand::SendMessage { text, reply } => {
            let result = handle_send_message(rt, timers, typing_armed, text).await;
            let _ = reply.send(result);
            false
        }

        ChatCommand::SubmitOffer { amount, note, reply } => {
            let result = handle_submit_offer(rt, timers, amount, note.as_deref());
            let _ = reply.send(result);
            false
        }

        ChatCommand::ListMessages { reply } => {
            let _ = reply.send(rt.store.snapshot());
            false
        }

        ChatCommand::GetStatus { reply } => {
            let status = SessionStatus {
                state: SessionState::Running,
                online: *rt.connectivity_rx.borrow(),
                message_count: rt.store.len(),
                pending_count: rt.queue.len(),
            };
            let _ = reply.send(status);
            false
        }

        ChatCommand::Shutdown => true,
    }
}

/// Handles message composition: validate → append → arm timers.
async fn handle_send_message(
    rt: &mut SessionRuntime,
    timers: &mut JoinSet<LoopStep>,
    typing_armed: &mut bool,
    text: String,
) -> mandichat_types::Result<MessageId> {
    if text.trim().is_empty() {
        return Err(mandichat_types::ChatError::InvalidMessage {
            reason: "message text must not be empty".into(),
        });
    }

    let online = *rt.connectivity_rx.borrow();
    let id = rt.allocate_id();
    let sender = rt.local.clone();

    let initial = if online {
        DeliveryStatus::Sending
    } else {
        DeliveryStatus::Pending
    };

    rt.store.append(Message {
        id,
        sender: sender.clone(),
        text: text.clone(),
        timestamp: Timestamp::now(),
        status: initial,
    });

    tracing::info!(%id, status = %initial, "outbound message appended");
    emit(&rt.event_tx, ChatEvent::MessageAppended { id, sender }).await;

    if online {
        // Arm the first delivery stage; later stages chain from it.
        let delay = rt.schedule.delay_to(DeliveryStatus::Sent);
        arm(timers, delay, LoopStep::Advance { id, to: DeliveryStatus::Sent });

        // Counterparty starts "typing". One response per burst: a timer
        // already in flight absorbs further local messages.
        if rt.config.auto_respond && !*typing_armed {
            *typing_armed = true;
            let peer = rt.peer.clone();
            emit(&rt.event_tx, ChatEvent::TypingStarted { participant: peer }).await;

            let delay = Duration::from_millis(rt.config.typing_delay_ms);
            arm(timers, delay, LoopStep::ResponseReady { prompt: text });
        }
    } else {
        // No timers while offline: the message waits for the drain.
        rt.queue.enqueue(id);
        tracing::debug!(%id, queued = rt.queue.len(), "message queued while offline");
    }

    Ok(id)
}

/// Handles offer submission: connectivity gate → band check → arm the
/// simulated round-trip.
fn handle_submit_offer(
    rt: &mut SessionRuntime,
    timers: &mut JoinSet<LoopStep>,
    amount: f64,
    note: Option<&str>,
) -> mandichat_types::Result<()> {
    if !*rt.connectivity_rx.borrow() {
        return Err(mandichat_types::ChatError::Offline {
            reason: "offer submission requires connectivity".into(),
        });
    }

    rt.offer_band.validate(amount)?;

    tracing::info!(
        amount,
        note = note.unwrap_or(""),
        "offer submitted"
    );

    let delay = Duration::from_millis(rt.config.offer_submit_delay_ms);
    arm(timers, delay, LoopStep::OfferResolved { amount });
    Ok(())
}

// ---------------------------------------------------------------------------
// Queue drain
// ---------------------------------------------------------------------------

/// Drains the pending queue. No-op when nothing is queued.
async fn drain_pending(rt: &mut SessionRuntime, timers: &mut JoinSet<LoopStep>) {
    let drained = rt.queue.take_all();
    if drained.is_empty() {
        return;
    }

    tracing::info!(count = drained.len(), "draining pending queue");

    // Walk the FIFO snapshot with fixed spacing between sends. Each
    // message jumps pending → sent, then continues through delivered
    // and read on the normal schedule.
    let spacing = Duration::from_millis(rt.config.drain_interval_ms);
    for (position, id) in drained.iter().enumerate() {
        arm(
            timers,
            spacing * position as u32,
            LoopStep::Advance { id: *id, to: DeliveryStatus::Sent },
        );
    }

    emit(&rt.event_tx, ChatEvent::QueueDrained { count: drained.len() }).await;
}

// ---------------------------------------------------------------------------
// Event emission
// ---------------------------------------------------------------------------

/// Sends an event to the consumer, ignoring a dropped receiver.
async fn emit(tx: &mpsc::Sender<ChatEvent>, event: ChatEvent) {
    if tx.send(event).await.is_err() {
        tracing::debug!("event receiver dropped");
    }
}
