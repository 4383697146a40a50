//! Identifiers used throughout TokenLock.
//!
//! Every identifier is a string newtype supplied by the host ledger or the
//! caller. None is generated locally: replicas must derive identical ids
//! from identical transactions, so randomness is never an option here.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{KEY_SEPARATOR, MAX_LOCK_ID_LEN, MAX_TOKEN_LEN};
use crate::{Result, TokenlockError};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// LockId
// ---------------------------------------------------------------------------

string_id!(
    /// Identifier of a lock, unique within its [`crate::LockKind`] namespace.
    /// Defaults to the id of the transaction that created the lock.
    LockId
);

impl LockId {
    /// Check that the id can be embedded in a ledger key.
    ///
    /// # Errors
    /// Returns [`TokenlockError::InvalidLockId`] for empty, oversized, or
    /// separator/control-character-bearing ids.
    pub fn validate(&self) -> Result<()> {
        let reason = if self.0.is_empty() {
            Some("empty id".to_string())
        } else if self.0.len() > MAX_LOCK_ID_LEN {
            Some(format!("longer than {MAX_LOCK_ID_LEN} bytes"))
        } else if self.0.contains(KEY_SEPARATOR) {
            Some(format!("contains reserved separator {KEY_SEPARATOR:?}"))
        } else if self.0.chars().any(char::is_control) {
            Some("contains control characters".to_string())
        } else {
            None
        };
        match reason {
            Some(reason) => Err(TokenlockError::InvalidLockId {
                id: self.0.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

impl From<TxId> for LockId {
    fn from(tx: TxId) -> Self {
        Self(tx.0)
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

string_id!(
    /// Ledger address of a lock owner (base58 text). Well-formedness is
    /// checked against [`crate::AddressRules`].
    Address
);

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

string_id!(
    /// Token ticker, e.g. `"FIAT"` or `"USDT"`.
    Token
);

impl Token {
    /// Structural check only; whether the token is known is a config question.
    pub fn validate_shape(&self) -> bool {
        !self.0.is_empty()
            && self.0.len() <= MAX_TOKEN_LEN
            && !self.0.contains(KEY_SEPARATOR)
            && !self.0.chars().any(char::is_control)
    }
}

// ---------------------------------------------------------------------------
// TxId / TxContext
// ---------------------------------------------------------------------------

string_id!(
    /// Identifier of the host ledger transaction invoking the core.
    TxId
);

/// What the host ledger tells the core about the invoking transaction.
///
/// The timestamp is the transaction's proposal timestamp, identical on
/// every replica, never the local clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxContext {
    pub tx_id: TxId,
    pub timestamp: DateTime<Utc>,
}

impl TxContext {
    #[must_use]
    pub fn new(tx_id: impl Into<TxId>, timestamp: DateTime<Utc>) -> Self {
        Self {
            tx_id: tx_id.into(),
            timestamp,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
