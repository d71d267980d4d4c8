//! Offer validation for the negotiation flow.
//!
//! Buyers can counter the listing price within a configured band
//! (70%–110% of the listed price by default, with 90% as the suggested
//! starting point). Submission itself is handled by the session: it is
//! rejected while offline and otherwise resolves after a simulated
//! round-trip delay.

use mandichat_types::config::ChatConfig;
use mandichat_types::{ChatError, Result};

// ---------------------------------------------------------------------------
// OfferBand
// ---------------------------------------------------------------------------

/// Absolute offer bounds for one listing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OfferBand {
    list_price: f64,
    min: f64,
    max: f64,
    default_amount: f64,
}

impl OfferBand {
    /// Derives the band for a listing from configuration ratios.
    ///
    /// # Errors
    ///
    /// [`ChatError::InvalidOffer`] if the listing price is not positive
    /// and finite.
    pub fn for_listing(config: &ChatConfig, list_price: f64) -> Result<Self> {
        if !list_price.is_finite() || list_price <= 0.0 {
            return Err(ChatError::InvalidOffer {
                reason: format!("listing price must be positive, got {list_price}"),
            });
        }

        Ok(Self {
            list_price,
            min: list_price * config.offer_min_ratio,
            max: list_price * config.offer_max_ratio,
            default_amount: list_price * config.offer_default_ratio,
        })
    }

    /// The suggested starting offer.
    pub fn default_amount(&self) -> f64 {
        self.default_amount
    }

    /// Lowest acceptable offer.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Highest acceptable offer.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// The offer as a percentage of the listing price, rounded to whole
    /// percent (for display).
    pub fn percentage_of_price(&self, amount: f64) -> i64 {
        ((amount / self.list_price) * 100.0).round() as i64
    }

    /// Validates an offer amount against the band.
    ///
    /// # Errors
    ///
    /// [`ChatError::InvalidOffer`] if the amount is non-finite or
    /// outside `[min, max]`.
    pub fn validate(&self, amount: f64) -> Result<()> {
        if !amount.is_finite() {
            return Err(ChatError::InvalidOffer {
                reason: format!("offer amount must be a finite number, got {amount}"),
            });
        }

        if amount < self.min {
            return Err(ChatError::InvalidOffer {
                reason: format!(
                    "offer {:.0} below minimum {:.0} ({}% of listing price)",
                    amount,
                    self.min,
                    self.percentage_of_price(self.min),
                ),
            });
        }

        if amount > self.max {
            return Err(ChatError::InvalidOffer {
                reason: format!(
                    "offer {:.0} above maximum {:.0} ({}% of listing price)",
                    amount,
                    self.max,
                    self.percentage_of_price(self.max),
                ),
            });
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
