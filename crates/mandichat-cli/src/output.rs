//! Terminal rendering for conversation output.
//!
//! Human mode renders delivery statuses as the tick marks familiar
//! from messaging apps: a clock while queued, one gray tick for sent,
//! two gray ticks for delivered, two blue ticks for read. JSON mode
//! emits one event per line with no ANSI escapes.

use colored::Colorize;
use mandichat_core::Message;
use mandichat_types::{ChatEvent, DeliveryStatus};

/// Prints an event as a JSON line.
pub fn print_event_json(event: &ChatEvent) {
    match serde_json::to_string(event) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("{{\"error\":\"json serialization failed: {e}\"}}"),
    }
}

/// Tick-mark glyph for a delivery status.
pub fn status_glyph(status: DeliveryStatus) -> String {
    match status {
        DeliveryStatus::Pending => "⏱".yellow().to_string(),
        DeliveryStatus::Sending => "○".dimmed().to_string(),
        DeliveryStatus::Sent => "✓".dimmed().to_string(),
        DeliveryStatus::Delivered => "✓✓".dimmed().to_string(),
        DeliveryStatus::Read => "✓✓".blue().to_string(),
    }
}

/// Prints one message line. Local messages carry the status glyph,
/// counterparty messages do not.
pub fn print_message(msg: &Message, local: &str) {
    if msg.sender.as_str() == local {
        println!(
            "  {} {} {}",
            format!("{}:", msg.sender).green().bold(),
            msg.text,
            status_glyph(msg.status),
        );
    } else {
        println!(
            "  {} {}",
            format!("{}:", msg.sender).cyan().bold(),
            msg.text,
        );
    }
}

/// Prints a status transition notice.
pub fn print_status_change(id: &str, status: DeliveryStatus) {
    println!(
        "  {} {} is now {} {}",
        "·".dimmed(),
        id.dimmed(),
        status.to_string().bold(),
        status_glyph(status),
    );
}

/// Prints a connectivity banner.
pub fn print_connectivity(online: bool) {
    if online {
        println!("  {}", "-- back online --".green());
    } else {
        println!("  {}", "-- connection lost, messages will be queued --".red());
    }
}

/// Prints a typing indicator line.
pub fn print_typing(participant: &str, active: bool) {
    if active {
        println!("  {}", format!("{participant} is typing...").italic().dimmed());
    }
}

/// Prints a queue drain notice.
pub fn print_drain(count: usize) {
    println!(
        "  {}",
        format!("-- sending {count} queued message(s) --").yellow()
    );
}

/// Prints an accepted-offer notice.
pub fn print_offer(amount: f64) {
    println!(
        "  {} offer of {} submitted to the seller",
        "✓".green().bold(),
        format!("₹{amount:.0}").bold(),
    );
}

/// Prints an informational note.
pub fn print_note(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Prints an error message.
pub fn print_error(msg: &str, json_mode: bool) {
    if json_mode {
        let obj = serde_json::json!({ "error": msg });
        eprintln!("{obj}");
    } else {
        eprintln!("{} {}", "error:".red().bold(), msg);
    }
}
