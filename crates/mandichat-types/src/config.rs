//! Session configuration with sensible defaults.
//!
//! All operational parameters of the simulator are centralized here.
//! The default delays reproduce the pacing of a real messaging app.

use serde::{Deserialize, Serialize};

use crate::{ChatError, Result};

/// Chat session configuration.
///
/// Every value is configurable; the defaults are the stock timings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Delay before a `sending` message becomes `sent`, in milliseconds.
    pub sending_to_sent_ms: u64,

    /// Delay before a `sent` message becomes `delivered`, in milliseconds.
    pub sent_to_delivered_ms: u64,

    /// Delay before a `delivered` message becomes `read`, in milliseconds.
    pub delivered_to_read_ms: u64,

    /// How long the counterparty "types" before its auto-response
    /// appears, in milliseconds.
    pub typing_delay_ms: u64,

    /// Spacing between messages flushed from the pending queue during a
    /// drain, in milliseconds.
    pub drain_interval_ms: u64,

    /// Delay before the counterparty's initial greeting is appended
    /// after session start, in milliseconds.
    pub greeting_delay_ms: u64,

    /// Whether the counterparty auto-responds to local messages.
    pub auto_respond: bool,

    // ----- Offer settings --------------------------------------------------

    /// Lowest acceptable offer as a fraction of the listing price.
    pub offer_min_ratio: f64,

    /// Highest acceptable offer as a fraction of the listing price.
    pub offer_max_ratio: f64,

    /// Starting offer suggested to the buyer, as a fraction of the
    /// listing price.
    pub offer_default_ratio: f64,

    /// Simulated round-trip for an offer submission, in milliseconds.
    pub offer_submit_delay_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            sending_to_sent_ms: 1_000,
            sent_to_delivered_ms: 1_000,
            delivered_to_read_ms: 2_000,
            typing_delay_ms: 3_000,
            drain_interval_ms: 500,
            greeting_delay_ms: 1_000,
            auto_respond: true,
            offer_min_ratio: 0.70,
            offer_max_ratio: 1.10,
            offer_default_ratio: 0.90,
            offer_submit_delay_ms: 1_500,
        }
    }
}

impl ChatConfig {
    /// Validates all configuration values.
    ///
    /// Returns an error if any delay is zero or the offer band is
    /// degenerate.
    pub fn validate(&self) -> Result<()> {
        if self.sending_to_sent_ms == 0 {
            return Err(ChatError::ConfigError {
                reason: "sending_to_sent_ms must be greater than 0".into(),
            });
        }

        if self.sent_to_delivered_ms == 0 {
            return Err(ChatError::ConfigError {
                reason: "sent_to_delivered_ms must be greater than 0".into(),
            });
        }

        if self.delivered_to_read_ms == 0 {
            return Err(ChatError::ConfigError {
                reason: "delivered_to_read_ms must be greater than 0".into(),
            });
        }

        if self.typing_delay_ms == 0 {
            return Err(ChatError::ConfigError {
                reason: "typing_delay_ms must be greater than 0".into(),
            });
        }

        if self.drain_interval_ms == 0 {
            return Err(ChatError::ConfigError {
                reason: "drain_interval_ms must be greater than 0".into(),
            });
        }

        if self.offer_min_ratio <= 0.0 {
            return Err(ChatError::ConfigError {
                reason: "offer_min_ratio must be positive".into(),
            });
        }

        if self.offer_max_ratio <= self.offer_min_ratio {
            return Err(ChatError::ConfigError {
                reason: "offer_max_ratio must exceed offer_min_ratio".into(),
            });
        }

        if self.offer_default_ratio < self.offer_min_ratio
            || self.offer_default_ratio > self.offer_max_ratio
        {
            return Err(ChatError::ConfigError {
                reason: "offer_default_ratio must lie within the offer band".into(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ChatConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_values_match_stock_timings() {
        let config = ChatConfig::default();
        assert_eq!(config.sending_to_sent_ms, 1_000);
        assert_eq!(config.sent_to_delivered_ms, 1_000);
        assert_eq!(config.delivered_to_read_ms, 2_000);
        assert_eq!(config.typing_delay_ms, 3_000);
        assert_eq!(config.drain_interval_ms, 500);
        assert_eq!(config.greeting_delay_ms, 1_000);
        assert!(config.auto_respond);
        assert_eq!(config.offer_min_ratio, 0.70);
        assert_eq!(config.offer_max_ratio, 1.10);
        assert_eq!(config.offer_default_ratio, 0.90);
        assert_eq!(config.offer_submit_delay_ms, 1_500);
    }

    #[test]
    fn zero_delay_rejected() {
        let config = ChatConfig {
            sending_to_sent_ms: 0,
            ..ChatConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ChatConfig {
            drain_interval_ms: 0,
            ..ChatConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn inverted_offer_band_rejected() {
        let config = ChatConfig {
            offer_min_ratio: 1.2,
            offer_max_ratio: 1.1,
            ..ChatConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_ratio_outside_band_rejected() {
        let config = ChatConfig {
            offer_default_ratio: 1.5,
            ..ChatConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_serde_roundtrip() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let config = ChatConfig::default();
        let json = serde_json::to_string(&config)?;
        let parsed: ChatConfig = serde_json::from_str(&json)?;
        assert_eq!(config.sending_to_sent_ms, parsed.sending_to_sent_ms);
        assert_eq!(config.typing_delay_ms, parsed.typing_delay_ms);
        assert_eq!(config.offer_min_ratio, parsed.offer_min_ratio);
        Ok(())
    }
}
