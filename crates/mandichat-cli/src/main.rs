//! Mandichat CLI front end.
//!
//! Drives a simulated marketplace conversation from the terminal. Two
//! modes:
//!
//! - `demo` plays a scripted buyer/seller exchange including an offline
//!   window and an offer, then exits.
//! - `chat` is an interactive REPL with slash commands to toggle
//!   connectivity and submit offers.

mod demo;
mod interactive;
mod output;

use clap::{Parser, Subcommand};
use mandichat_types::config::ChatConfig;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Mandichat — marketplace chat delivery simulator.
#[derive(Parser)]
#[command(name = "mandichat", version, about)]
struct Cli {
    /// Listing price the offer band derives from.
    #[arg(long, global = true, default_value = "1000")]
    price: f64,

    /// Local participant label.
    #[arg(long, global = true, default_value = "buyer-44")]
    buyer: String,

    /// Counterparty participant label.
    #[arg(long, global = true, default_value = "seller-32")]
    seller: String,

    /// Compress all simulated delays by this factor (e.g. 10 makes the
    /// 1000ms stages take 100ms).
    #[arg(long, global = true, default_value = "1")]
    speedup: u64,

    /// Skip the seller greeting.
    #[arg(long, global = true)]
    no_greeting: bool,

    /// Seed the seller's response picker for reproducible transcripts.
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Start with the connection down.
    #[arg(long, global = true)]
    offline_start: bool,

    /// Emit events as JSON lines (no colors, machine-readable).
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a scripted conversation and exit.
    Demo,
    /// Interactive chat mode (REPL).
    Chat,
}

// ---------------------------------------------------------------------------
// Global options passed to mode handlers
// ---------------------------------------------------------------------------

/// Shared options threaded into mode handlers.
pub struct GlobalOpts {
    pub price: f64,
    pub buyer: String,
    pub seller: String,
    pub config: ChatConfig,
    pub greeting: Option<String>,
    pub seed: Option<u64>,
    pub offline_start: bool,
    pub json: bool,
}

impl GlobalOpts {
    /// Builds the seller response strategy, seeded when requested.
    pub fn responder(&self) -> mandichat_core::CannedResponder {
        match self.seed {
            Some(seed) => mandichat_core::CannedResponder::with_seed(seed),
            None => mandichat_core::CannedResponder::new(),
        }
    }
}

const DEFAULT_GREETING: &str =
    "Hello! Thanks for your interest in my organic rice seeds. How can I help you?";

fn scaled_config(speedup: u64) -> ChatConfig {
    let factor = speedup.max(1);
    let base = ChatConfig::default();
    ChatConfig {
        sending_to_sent_ms: (base.sending_to_sent_ms / factor).max(1),
        sent_to_delivered_ms: (base.sent_to_delivered_ms / factor).max(1),
        delivered_to_read_ms: (base.delivered_to_read_ms / factor).max(1),
        typing_delay_ms: (base.typing_delay_ms / factor).max(1),
        drain_interval_ms: (base.drain_interval_ms / factor).max(1),
        greeting_delay_ms: (base.greeting_delay_ms / factor).max(1),
        offer_submit_delay_ms: (base.offer_submit_delay_ms / factor).max(1),
        ..base
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    // Tracing / logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let opts = GlobalOpts {
        price: cli.price,
        buyer: cli.buyer,
        seller: cli.seller,
        config: scaled_config(cli.speedup),
        greeting: (!cli.no_greeting).then(|| DEFAULT_GREETING.to_string()),
        seed: cli.seed,
        offline_start: cli.offline_start,
        json: cli.json,
    };

    let result = match cli.command {
        Commands::Demo => demo::run(&opts).await,
        Commands::Chat => interactive::run(&opts).await,
    };

    if let Err(e) = result {
        output::print_error(&e, cli.json);
        std::process::exit(1);
    }
}
