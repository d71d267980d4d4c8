//! Simulated online/offline connectivity signal.
//!
//! Mirrors the host environment's network-status notifications as a
//! single boolean behind a `tokio::sync::watch` channel. The session
//! event loop subscribes to the channel; everything else reads the last
//! known value synchronously.

use tokio::sync::watch;

// ---------------------------------------------------------------------------
// ConnectivitySignal
// ---------------------------------------------------------------------------

/// Boolean connectivity flag with change notification.
///
/// [`set_online`](Self::set_online) is the **only** write path — it is
/// called when the host environment reports an online/offline change.
/// No operation in this crate sets the flag on its own.
///
/// Reads never fail and always reflect the last reported value.
pub struct ConnectivitySignal {
    tx: watch::Sender<bool>,
}

impl ConnectivitySignal {
    /// Creates a signal with the given initial value.
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        Self { tx }
    }

    /// Records a connectivity change reported by the environment.
    ///
    /// Subscribers are only woken when the value actually changes.
    pub fn set_online(&self, online: bool) {
        self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
    }

    /// Returns the last known connectivity value.
    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Returns a receiver that observes connectivity changes.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for ConnectivitySignal {
    /// Defaults to online.
    fn default() -> Self {
        Self::new(true)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflects_last_reported_value() {
        let signal = ConnectivitySignal::new(true);
        assert!(signal.is_online());

        signal.set_online(false);
        assert!(!signal.is_online());

        signal.set_online(true);
        assert!(signal.is_online());
    }

    #[tokio::test]
    async fn subscriber_sees_transition() {
        let signal = ConnectivitySignal::new(false);
        let mut rx = signal.subscribe();

        signal.set_online(true);
        rx.changed().await.expect("signal alive");
        assert!(*rx.borrow());
    }

    #[tokio::test]
    async fn redundant_set_does_not_wake_subscribers() {
        let signal = ConnectivitySignal::new(true);
        let mut rx = signal.subscribe();

        signal.set_online(true);
        assert!(
            !rx.has_changed().expect("signal alive"),
            "same-value set must not notify"
        );
    }
}
