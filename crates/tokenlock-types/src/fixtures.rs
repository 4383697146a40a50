//! Test fixtures. **Never use in production.**

use chrono::{DateTime, TimeZone, Utc};

use crate::{Address, LockConfig, LockKind, TxContext};

/// Token registered for token-balance locks in [`test_config`].
pub const TEST_TOKEN: &str = "FIAT";

/// Token registered for allowed-balance locks in [`test_config`].
pub const TEST_ALLOWED_TOKEN: &str = "USDT";

/// Deterministic well-formed address derived from a seed byte.
#[must_use]
pub fn test_address(seed: u8) -> Address {
    Address::new(bs58::encode([seed; 32]).into_string())
}

/// Config knowing [`TEST_TOKEN`] and [`TEST_ALLOWED_TOKEN`].
#[must_use]
pub fn test_config() -> LockConfig {
    LockConfig::default()
        .with_token(LockKind::TokenBalance, TEST_TOKEN)
        .with_token(LockKind::AllowedBalance, TEST_ALLOWED_TOKEN)
}

/// Fixed timestamp so events compare equal across runs.
#[must_use]
pub fn test_timestamp() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0)
        .single()
        .unwrap_or_default()
}

#[must_use]
pub fn test_tx(tx_id: &str) -> TxContext {
    TxContext::new(tx_id, test_timestamp())
}
