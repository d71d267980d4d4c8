//! Per-message delivery progression rules.
//!
//! The online path is
//!
//! ```text
//! sending --(sending_to_sent)--> sent --(sent_to_delivered)--> delivered
//!         --(delivered_to_read)--> read
//! ```
//!
//! Each stage's timer is armed only after the previous stage has been
//! applied to the store, so per-message ordering is strict. Transitions
//! for different messages interleave freely.
//!
//! The schedule is pure data — the session event loop owns the actual
//! timers (and aborts them on teardown).

use std::time::Duration;

use mandichat_types::config::ChatConfig;
use mandichat_types::DeliveryStatus;

// ---------------------------------------------------------------------------
// DeliverySchedule
// ---------------------------------------------------------------------------

/// Stage delays derived from [`ChatConfig`].
#[derive(Clone, Copy, Debug)]
pub struct DeliverySchedule {
    sending_to_sent: Duration,
    sent_to_delivered: Duration,
    delivered_to_read: Duration,
}

impl DeliverySchedule {
    /// Builds the schedule from configuration.
    pub fn from_config(config: &ChatConfig) -> Self {
        Self {
            sending_to_sent: Duration::from_millis(config.sending_to_sent_ms),
            sent_to_delivered: Duration::from_millis(config.sent_to_delivered_ms),
            delivered_to_read: Duration::from_millis(config.delivered_to_read_ms),
        }
    }

    /// The stage that follows an applied status, if any.
    ///
    /// `Pending` has no timer-driven successor: a pending message moves
    /// only via the queue drain. `Read` is terminal.
    pub fn next_stage(applied: DeliveryStatus) -> Option<DeliveryStatus> {
        match applied {
            DeliveryStatus::Pending => None,
            DeliveryStatus::Sending => Some(DeliveryStatus::Sent),
            DeliveryStatus::Sent => Some(DeliveryStatus::Delivered),
            DeliveryStatus::Delivered => Some(DeliveryStatus::Read),
            DeliveryStatus::Read => None,
        }
    }

    /// Delay before the given target stage fires.
    pub fn delay_to(&self, next: DeliveryStatus) -> Duration {
        match next {
            DeliveryStatus::Sent => self.sending_to_sent,
            DeliveryStatus::Delivered => self.sent_to_delivered,
            DeliveryStatus::Read => self.delivered_to_read,
            // Pending/Sending are entry states, never timer targets.
            DeliveryStatus::Pending | DeliveryStatus::Sending => Duration::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progression_covers_the_online_path() {
        let mut stage = DeliveryStatus::Sending;
        let mut seen = vec![stage];
        while let Some(next) = DeliverySchedule::next_stage(stage) {
            seen.push(next);
            stage = next;
        }
        assert_eq!(
            seen,
            vec![
                DeliveryStatus::Sending,
                DeliveryStatus::Sent,
                DeliveryStatus::Delivered,
                DeliveryStatus::Read,
            ],
        );
    }

    #[test]
    fn pending_has_no_timer_successor() {
        assert_eq!(DeliverySchedule::next_stage(DeliveryStatus::Pending), None);
    }

    #[test]
    fn read_is_final() {
        assert_eq!(DeliverySchedule::next_stage(DeliveryStatus::Read), None);
    }

    #[test]
    fn delays_follow_config() {
        let config = ChatConfig::default();
        let schedule = DeliverySchedule::from_config(&config);

        assert_eq!(schedule.delay_to(DeliveryStatus::Sent), Duration::from_millis(1_000));
        assert_eq!(schedule.delay_to(DeliveryStatus::Delivered), Duration::from_millis(1_000));
        assert_eq!(schedule.delay_to(DeliveryStatus::Read), Duration::from_millis(2_000));
    }
}
