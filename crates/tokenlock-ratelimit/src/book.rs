//! Rate storage through the ledger port.

use tokenlock_ledger::{
    codec::{decode_rate, encode_rate},
    keys::rate_key,
    LockLedger,
};
use tokenlock_types::{RateKey, RateRecord, Result, TokenlockError};

use crate::RateLimiter;

/// Reads and writes [`RateRecord`]s keyed by [`RateKey`].
pub struct RateBook<L: LockLedger> {
    ledger: L,
}

impl<L: LockLedger> RateBook<L> {
    pub fn new(ledger: L) -> Self {
        Self { ledger }
    }

    /// Store (or replace) the rate for `key`.
    pub fn set_rate(&mut self, key: &RateKey, rate: &RateRecord) -> Result<()> {
        key.validate()?;
        rate.validate()?;
        self.ledger.put(&rate_key(key), encode_rate(rate)?)?;
        tracing::info!(
            rate_key = %key,
            min = %rate.min,
            max = %rate.max,
            rate = %rate.rate,
            rate_decimals = rate.rate_decimals,
            "Rate set"
        );
        Ok(())
    }

    pub fn get_rate(&self, key: &RateKey) -> Result<Option<RateRecord>> {
        key.validate()?;
        self.ledger
            .get(&rate_key(key))?
            .map(|bytes| decode_rate(&bytes))
            .transpose()
    }

    pub fn delete_rate(&mut self, key: &RateKey) -> Result<()> {
        key.validate()?;
        self.ledger.delete(&rate_key(key))
    }

    /// A limiter for `key`.
    ///
    /// # Errors
    /// Returns [`TokenlockError::InvalidRate`] if no rate is stored for `key`.
    pub fn limiter(&self, key: &RateKey) -> Result<RateLimiter> {
        let rate = self
            .get_rate(key)?
            .ok_or_else(|| TokenlockError::InvalidRate {
                reason: format!("no rate configured for {key}"),
            })?;
        RateLimiter::new(rate)
    }

    pub fn into_inner(self) -> L {
        self.ledger
    }
}
