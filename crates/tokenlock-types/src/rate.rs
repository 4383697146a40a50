//! Rate records: transfer limits and fixed-point conversion rates.

use serde::{Deserialize, Serialize};

use crate::constants::KEY_SEPARATOR;
use crate::{Amount, Result, Token, TokenlockError};

/// Identifies the rate applying to one kind of deal over a token pair,
/// e.g. `("buyToken", "FIAT", "USD")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct RateKey {
    pub deal_type: String,
    pub base: Token,
    pub quote: Token,
}

impl RateKey {
    #[must_use]
    pub fn new(deal_type: impl Into<String>, base: impl Into<Token>, quote: impl Into<Token>) -> Self {
        Self {
            deal_type: deal_type.into(),
            base: base.into(),
            quote: quote.into(),
        }
    }

    /// Check every component can be embedded in a ledger key.
    pub fn validate(&self) -> Result<()> {
        let bad_deal = self.deal_type.is_empty() || self.deal_type.contains(KEY_SEPARATOR);
        if bad_deal || !self.base.validate_shape() || !self.quote.validate_shape() {
            return Err(TokenlockError::InvalidRate {
                reason: format!(
                    "malformed rate key {}/{}/{}",
                    self.deal_type, self.base, self.quote
                ),
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for RateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}/{}", self.deal_type, self.base, self.quote)
    }
}

/// Limits and fixed-point rate for a token pair.
///
/// `price = amount * rate / 10^rate_decimals`, truncated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRecord {
    /// Smallest accepted amount (inclusive).
    pub min: Amount,
    /// Largest accepted amount (inclusive); zero means unbounded.
    pub max: Amount,
    /// Fixed-point numerator.
    pub rate: Amount,
    /// Scale exponent of `rate`.
    pub rate_decimals: u32,
}

impl RateRecord {
    #[must_use]
    pub fn new(min: Amount, max: Amount, rate: Amount, rate_decimals: u32) -> Self {
        Self {
            min,
            max,
            rate,
            rate_decimals,
        }
    }

    /// `max == 0` is the sentinel for "no upper bound".
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.max.is_zero()
    }

    /// Reject records that could never accept any amount. Any
    /// `rate_decimals` is valid; a scale beyond the product just prices to 0.
    ///
    /// # Errors
    /// Returns [`TokenlockError::InvalidRate`].
    pub fn validate(&self) -> Result<()> {
        if !self.is_unbounded() && self.max < self.min {
            return Err(TokenlockError::InvalidRate {
                reason: format!("max {} below min {}", self.max, self.min),
            });
        }
        Ok(())
    }
}
