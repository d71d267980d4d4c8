//! Scripted demo conversation.
//!
//! Plays a fixed buyer/seller exchange end to end: greeting, a question
//! with the auto-response, an offline window with queued messages, the
//! reconnect drain, and an offer submission.

use std::time::Duration;

use mandichat_core::{ChatCommand, ChatSession, ConnectivitySignal, Message};
use mandichat_types::{ChatEvent, ParticipantId};
use tokio::sync::mpsc;

use crate::output;
use crate::GlobalOpts;

pub async fn run(opts: &GlobalOpts) -> std::result::Result<(), String> {
    let buyer = ParticipantId::new(&opts.buyer).map_err(|e| e.to_string())?;
    let seller = ParticipantId::new(&opts.seller).map_err(|e| e.to_string())?;

    let connectivity = ConnectivitySignal::new(!opts.offline_start);
    let mut session = ChatSession::new(
        buyer,
        seller,
        opts.price,
        opts.greeting.clone(),
        opts.config.clone(),
        Box::new(opts.responder()),
        &connectivity,
    )
    .map_err(|e| e.to_string())?;

    let tx = session.command_sender();
    let event_rx = session
        .take_event_receiver()
        .ok_or_else(|| "event receiver already taken".to_string())?;
    let handle = session.start().map_err(|e| e.to_string())?;

    // Render events in the background while the script drives the
    // conversation.
    let printer = tokio::spawn(print_events(
        event_rx,
        tx.clone(),
        opts.buyer.clone(),
        opts.json,
    ));

    let cfg = &opts.config;
    let full_lifecycle = Duration::from_millis(
        cfg.sending_to_sent_ms + cfg.sent_to_delivered_ms + cfg.delivered_to_read_ms,
    );

    if !opts.json {
        println!();
        output::print_note("scripted demo: question, offline window, reconnect, offer");
        println!();
    }

    // Greeting lands, then the opening question.
    tokio::time::sleep(Duration::from_millis(cfg.greeting_delay_ms * 2)).await;
    send(&tx, "Hi! Are these seeds certified organic?").await?;
    tokio::time::sleep(Duration::from_millis(cfg.typing_delay_ms)).await;
    tokio::time::sleep(full_lifecycle).await;

    // Drop the connection mid-conversation.
    connectivity.set_online(false);
    tokio::time::sleep(Duration::from_millis(200)).await;
    send(&tx, "What is the minimum order quantity?").await?;
    send(&tx, "And do you deliver to Pune?").await?;
    tokio::time::sleep(Duration::from_millis(500)).await;

    // Reconnect: the queue drains and both messages complete.
    connectivity.set_online(true);
    tokio::time::sleep(Duration::from_millis(cfg.drain_interval_ms * 2)).await;
    tokio::time::sleep(full_lifecycle).await;

    // Close with an offer at the suggested starting point.
    let amount = opts.price * cfg.offer_default_ratio;
    let (reply, reply_rx) = tokio::sync::oneshot::channel();
    tx.send(ChatCommand::SubmitOffer {
        amount,
        note: Some("Interested in a bulk order.".to_string()),
        reply,
    })
    .await
    .map_err(|e| e.to_string())?;
    reply_rx
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())?;
    tokio::time::sleep(Duration::from_millis(cfg.offer_submit_delay_ms * 2)).await;

    // Final transcript.
    if !opts.json {
        println!();
        output::print_note("final transcript:");
        for msg in list(&tx).await? {
            output::print_message(&msg, &opts.buyer);
        }
    }

    session.shutdown().map_err(|e| e.to_string())?;
    handle.await.map_err(|e| e.to_string())?;
    printer.await.map_err(|e| e.to_string())?;

    Ok(())
}

async fn send(tx: &mpsc::Sender<ChatCommand>, text: &str) -> std::result::Result<(), String> {
    let (reply, reply_rx) = tokio::sync::oneshot::channel();
    tx.send(ChatCommand::SendMessage {
        text: text.to_string(),
        reply,
    })
    .await
    .map_err(|e| e.to_string())?;
    reply_rx
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())?;
    Ok(())
}

async fn list(tx: &mpsc::Sender<ChatCommand>) -> std::result::Result<Vec<Message>, String> {
    let (reply, reply_rx) = tokio::sync::oneshot::channel();
    tx.send(ChatCommand::ListMessages { reply })
        .await
        .map_err(|e| e.to_string())?;
    reply_rx.await.map_err(|e| e.to_string())
}

/// Renders the event stream until the session closes.
async fn print_events(
    mut rx: mpsc::Receiver<ChatEvent>,
    tx: mpsc::Sender<ChatCommand>,
    local: String,
    json: bool,
) {
    while let Some(event) = rx.recv().await {
        if json {
            output::print_event_json(&event);
            continue;
        }
        match event {
            ChatEvent::MessageAppended { id, .. } => {
                // The event carries only the id; fetch the body.
                if let Ok(messages) = list(&tx).await {
                    if let Some(msg) = messages.iter().find(|m| m.id == id) {
                        output::print_message(msg, &local);
                    }
                }
            }
            ChatEvent::StatusChanged { id, status } => {
                output::print_status_change(&id.to_string(), status);
            }
            ChatEvent::TypingStarted { participant } => {
                output::print_typing(participant.as_str(), true);
            }
            ChatEvent::TypingStopped { .. } => {}
            ChatEvent::ConnectivityChanged { online } => {
                output::print_connectivity(online);
            }
            ChatEvent::QueueDrained { count } => {
                output::print_drain(count);
            }
            ChatEvent::OfferSubmitted { amount } => {
                output::print_offer(amount);
            }
        }
    }
}
