//! Limit checks and fixed-point price calculation.
//!
//! ## Rounding contract
//!
//! ```text
//! price = floor(amount * rate / 10^rate_decimals)
//! ```
//!
//! All operands are non-negative, so truncation toward zero and floor are
//! the same operation. The fractional remainder is **dropped, never
//! rounded**. Which party the dropped remainder favors is decided by the
//! business rule calling this module, not here.

use num_bigint::BigUint;
use num_traits::Zero;
use tokenlock_types::{Amount, RateRecord, Result, TokenlockError};

/// `true` iff `min <= amount` and (`max == 0` or `amount <= max`).
#[must_use]
pub fn in_limit(amount: &Amount, min: &Amount, max: &Amount) -> bool {
    amount >= min && (max.is_zero() || amount <= max)
}

/// `floor(amount * rate / 10^rate_decimals)`.
#[must_use]
pub fn calc_price(amount: &Amount, rate: &Amount, rate_decimals: u32) -> Amount {
    calc_price_with_remainder(amount, rate, rate_decimals).0
}

/// Like [`calc_price`], also returning the dropped remainder
/// `amount * rate mod 10^rate_decimals`, still at the `10^rate_decimals` scale.
#[must_use]
pub fn calc_price_with_remainder(amount: &Amount, rate: &Amount, rate_decimals: u32) -> (Amount, Amount) {
    let product = amount.as_biguint() * rate.as_biguint();
    if product.is_zero() {
        return (Amount::zero(), Amount::zero());
    }
    // 10^rate_decimals already exceeds the product: skip building a huge power.
    if u64::from(rate_decimals) > decimal_digits_upper_bound(&product) {
        return (Amount::zero(), Amount::from_biguint(product));
    }
    let scale = BigUint::from(10u32).pow(rate_decimals);
    let price = &product / &scale;
    let remainder = &product % &scale;
    (Amount::from_biguint(price), Amount::from_biguint(remainder))
}

/// Upper bound on the number of decimal digits of `n` (`n > 0`):
/// `floor(bits * 0.30103) + 1`, where 0.30103 > log10(2).
fn decimal_digits_upper_bound(n: &BigUint) -> u64 {
    n.bits().saturating_mul(30_103) / 100_000 + 1
}

/// Limit checking and pricing against one [`RateRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiter {
    rate: RateRecord,
}

impl RateLimiter {
    /// # Errors
    /// Returns [`TokenlockError::InvalidRate`] if the record is inconsistent.
    pub fn new(rate: RateRecord) -> Result<Self> {
        rate.validate()?;
        Ok(Self { rate })
    }

    #[must_use]
    pub fn record(&self) -> &RateRecord {
        &self.rate
    }

    #[must_use]
    pub fn in_limit(&self, amount: &Amount) -> bool {
        in_limit(amount, &self.rate.min, &self.rate.max)
    }

    /// # Errors
    /// Returns [`TokenlockError::LimitExceeded`] when `amount` is outside the window.
    pub fn check_limit(&self, amount: &Amount) -> Result<()> {
        if self.in_limit(amount) {
            return Ok(());
        }
        tracing::warn!(
            amount = %amount,
            min = %self.rate.min,
            max = %self.rate.max,
            "Amount outside rate limit"
        );
        Err(TokenlockError::LimitExceeded {
            amount: amount.clone(),
            min: self.rate.min.clone(),
            max: self.rate.max.clone(),
        })
    }

    /// Price `amount` at this record's rate with an explicit scale.
    #[must_use]
    pub fn calc_price(&self, amount: &Amount, rate_decimals: u32) -> Amount {
        calc_price(amount, &self.rate.rate, rate_decimals)
    }

    /// Price `amount` at this record's own `rate_decimals`.
    #[must_use]
    pub fn price(&self, amount: &Amount) -> Amount {
        self.calc_price(amount, self.rate.rate_decimals)
    }

    #[must_use]
    pub fn price_with_remainder(&self, amount: &Amount) -> (Amount, Amount) {
        calc_price_with_remainder(amount, &self.rate.rate, self.rate.rate_decimals)
    }
}
