//! Interactive REPL chat mode.
//!
//! Plain input lines are sent as messages; slash commands control the
//! simulation:
//!
//! - `/offline` and `/online` toggle the connectivity signal.
//! - `/offer <amount>` submits a price offer.
//! - `/messages` prints the transcript, `/status` the session status.
//! - `/quit` exits (Ctrl+C also exits cleanly).

use colored::Colorize;
use mandichat_core::{
    ChatCommand, ChatSession, ConnectivitySignal, Message, SessionStatus,
};
use mandichat_types::{ChatEvent, ParticipantId};
use tokio::io::{AsyncBufReadExt, BufReader};
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

    if !opts.json {
        print_banner(opts);
    }

    let printer = tokio::spawn(print_events(
        event_rx,
        tx.clone(),
        opts.buyer.clone(),
        opts.json,
    ));

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        // Read a line — race with Ctrl+C.
        let line = tokio::select! {
            result = lines.next_line() => {
                match result {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        output::print_error(&format!("failed to read input: {e}"), opts.json);
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\n{}", "Exiting chat.".dimmed());
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with('/') {
            match handle_slash_command(trimmed, &tx, &connectivity, opts).await {
                SlashResult::Continue => continue,
                SlashResult::Quit => break,
            }
        }

        // Plain text: send as a message.
        let (reply, reply_rx) = tokio::sync::oneshot::channel();
        if tx
            .send(ChatCommand::SendMessage {
                text: trimmed.to_string(),
                reply,
            })
            .await
            .is_err()
        {
            output::print_error("session closed", opts.json);
            break;
        }
        match reply_rx.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => output::print_error(&e.to_string(), opts.json),
            Err(_) => {
                output::print_error("session closed", opts.json);
                break;
            }
        }
    }

    session.shutdown().map_err(|e| e.to_string())?;
    handle.await.map_err(|e| e.to_string())?;
    printer.await.map_err(|e| e.to_string())?;

    Ok(())
}

enum SlashResult {
    Continue,
    Quit,
}

async fn handle_slash_command(
    input: &str,
    tx: &mpsc::Sender<ChatCommand>,
    connectivity: &ConnectivitySignal,
    opts: &GlobalOpts,
) -> SlashResult {
    let mut parts = input.split_whitespace();
    let command = parts.next().unwrap_or("");

    match command {
        "/quit" | "/exit" => return SlashResult::Quit,

        "/offline" => {
            connectivity.set_online(false);
        }

        "/online" => {
            connectivity.set_online(true);
        }

        "/offer" => {
            let amount = match parts.next().map(str::parse::<f64>) {
                Some(Ok(v)) => v,
                _ => {
                    let suggested = opts.price * opts.config.offer_default_ratio;
                    output::print_error(
                        &format!("usage: /offer <amount> (suggested: {suggested:.0})"),
                        opts.json,
                    );
                    return SlashResult::Continue;
                }
            };
            let (reply, reply_rx) = tokio::sync::oneshot::channel();
            if tx
                .send(ChatCommand::SubmitOffer {
                    amount,
                    note: None,
                    reply,
                })
                .await
                .is_err()
            {
                return SlashResult::Quit;
            }
            match reply_rx.await {
                Ok(Ok(())) => output::print_note("offer accepted for submission"),
                Ok(Err(e)) => output::print_error(&e.to_string(), opts.json),
                Err(_) => return SlashResult::Quit,
            }
        }

        "/messages" => {
            if let Ok(messages) = list(tx).await {
                if messages.is_empty() {
                    output::print_note("(no messages yet)");
                }
                for msg in &messages {
                    output::print_message(msg, &opts.buyer);
                }
            }
        }

        "/status" => {
            if let Ok(status) = session_status(tx).await {
                print_status(&status);
            }
        }

        "/help" => print_help(),

        other => {
            output::print_error(&format!("unknown command: {other} (try /help)"), opts.json);
        }
    }

    SlashResult::Continue
}

async fn list(tx: &mpsc::Sender<ChatCommand>) -> std::result::Result<Vec<Message>, String> {
    let (reply, reply_rx) = tokio::sync::oneshot::channel();
    tx.send(ChatCommand::ListMessages { reply })
        .await
        .map_err(|e| e.to_string())?;
    reply_rx.await.map_err(|e| e.to_string())
}

async fn session_status(
    tx: &mpsc::Sender<ChatCommand>,
) -> std::result::Result<SessionStatus, String> {
    let (reply, reply_rx) = tokio::sync::oneshot::channel();
    tx.send(ChatCommand::GetStatus { reply })
        .await
        .map_err(|e| e.to_string())?;
    reply_rx.await.map_err(|e| e.to_string())
}

fn print_status(status: &SessionStatus) {
    println!("  state:    {}", status.state.to_string().bold());
    println!(
        "  network:  {}",
        if status.online {
            "online".green().to_string()
        } else {
            "offline".red().to_string()
        }
    );
    println!("  messages: {}", status.message_count);
    println!("  pending:  {}", status.pending_count);
}

fn print_banner(opts: &GlobalOpts) {
    println!();
    println!("{}", "╔══════════════════════════════════════╗".bright_cyan());
    println!("{}", "║        Mandichat Interactive         ║".bright_cyan());
    println!("{}", "╚══════════════════════════════════════╝".bright_cyan());
    println!("  You:     {}", opts.buyer.green());
    println!("  Seller:  {}", opts.seller.cyan());
    println!("  Listing: {}", format!("₹{:.0}", opts.price).bold());
    println!();
    print_help();
    println!();
}

fn print_help() {
    println!(
        "Commands: {} {} {} {} {} {}",
        "/offline".bold(),
        "/online".bold(),
        "/offer <amount>".bold(),
        "/messages".bold(),
        "/status".bold(),
        "/quit".bold(),
    );
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
            ChatEvent::MessageAppended { id, sender } => {
                // Local sends are already echoed by the prompt line;
                // render only counterparty messages.
                if sender.as_str() == local {
                    continue;
                }
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
