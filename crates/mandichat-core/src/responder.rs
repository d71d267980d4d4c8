//! Pluggable counterparty auto-response strategies.
//!
//! The simulated seller replies to local messages after a typing delay.
//! Response selection is behind a trait so the core stays deterministic
//! in tests: the production strategy picks pseudo-randomly from a canned
//! set, the test strategy replays a script.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ---------------------------------------------------------------------------
// ResponseStrategy
// ---------------------------------------------------------------------------

/// Chooses the counterparty's reply to a local message.
///
/// Returning `None` suppresses the reply. The prompt is the text of the
/// local message that triggered the response; strategies may ignore it.
pub trait ResponseStrategy: Send {
    /// Picks a response to `prompt`.
    fn pick(&mut self, prompt: &str) -> Option<String>;
}

// ---------------------------------------------------------------------------
// CannedResponder
// ---------------------------------------------------------------------------

/// Stock seller responses for the simulated marketplace conversation.
pub const CANNED_RESPONSES: [&str; 5] = [
    "Yes, these are premium quality organic rice seeds. They have a germination rate of over 95%.",
    "The seeds are certified organic and perfect for sustainable farming.",
    "I can offer a small discount if you're buying in bulk. How many bags are you interested in?",
    "Would you like to schedule a time to visit and see the seeds in person?",
    "I can arrange delivery to your location if you're interested.",
];

/// Pseudo-random pick from [`CANNED_RESPONSES`].
pub struct CannedResponder {
    rng: StdRng,
}

impl CannedResponder {
    /// Creates a responder seeded from the OS entropy source.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a responder with a fixed seed for deterministic output.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for CannedResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseStrategy for CannedResponder {
    fn pick(&mut self, _prompt: &str) -> Option<String> {
        let index = self.rng.gen_range(0..CANNED_RESPONSES.len());
        Some(CANNED_RESPONSES[index].to_string())
    }
}

// ---------------------------------------------------------------------------
// ScriptedResponder
// ---------------------------------------------------------------------------

/// Replays a fixed sequence of responses, then goes silent.
///
/// Used by tests and the CLI demo to keep transcripts reproducible.
#[derive(Debug, Default)]
pub struct ScriptedResponder {
    script: VecDeque<String>,
}

impl ScriptedResponder {
    /// Creates a responder that replays `lines` in order.
    pub fn new(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            script: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl ResponseStrategy for ScriptedResponder {
    fn pick(&mut self, _prompt: &str) -> Option<String> {
        self.script.pop_front()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canned_pick_is_from_the_fixed_set() {
        let mut responder = CannedResponder::with_seed(7);
        for _ in 0..20 {
            let reply = responder.pick("any").expect("always replies");
            assert!(CANNED_RESPONSES.contains(&reply.as_str()));
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = CannedResponder::with_seed(42);
        let mut b = CannedResponder::with_seed(42);
        for _ in 0..10 {
            assert_eq!(a.pick("x"), b.pick("x"));
        }
    }

    #[test]
    fn scripted_replays_in_order_then_stops() {
        let mut responder = ScriptedResponder::new(["first", "second"]);
        assert_eq!(responder.pick("a").as_deref(), Some("first"));
        assert_eq!(responder.pick("b").as_deref(), Some("second"));
        assert_eq!(responder.pick("c"), None);
    }
}
