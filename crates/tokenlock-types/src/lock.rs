//! # Lock: the cross-ledger balance reservation
//!
//! A lock reserves part of an owner's balance on this ledger while the
//! matching credit happens on another one. It is released in one or more
//! unlock steps until nothing is left.
//!
//! ## State Machine
//!
//! ```text
//!            partial unlock
//!            ┌──────────┐
//!            ▼          │
//!   create ┌────────┐───┘   unlock of the   ┌───────────┐
//!  ───────▶│ ACTIVE ├──────────────────────▶│ COMPLETED │
//!          └────────┘   remaining amount    └───────────┘
//! ```
//!
//! The state is never stored: it is derived from `current_amount`, the
//! single source of truth.

use serde::{Deserialize, Serialize};

use crate::{Address, Amount, LockId, Token};

/// Which balance a lock reserves. Each kind has its own key namespace, so
/// the same id string may be used once per kind without collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LockKind {
    /// The ledger's own token balance.
    TokenBalance,
    /// A balance of an external token allowed on this ledger.
    AllowedBalance,
}

impl LockKind {
    pub const ALL: [Self; 2] = [Self::TokenBalance, Self::AllowedBalance];

    /// Key namespace component.
    #[must_use]
    pub fn namespace(self) -> &'static str {
        match self {
            Self::TokenBalance => "token",
            Self::AllowedBalance => "allowed",
        }
    }
}

impl std::fmt::Display for LockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TokenBalance => write!(f, "TOKEN_BALANCE"),
            Self::AllowedBalance => write!(f, "ALLOWED_BALANCE"),
        }
    }
}

/// Lifecycle state of a lock, derived from its current amount.
///
/// Transitions are **monotonic**:
/// - `Active → Active` (partial unlock)
/// - `Active → Completed` (remaining amount released)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockState {
    /// Some amount is still reserved.
    Active,
    /// Nothing is reserved any more. **Terminal.**
    Completed,
}

impl LockState {
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(self, Self::Active) && matches!(target, Self::Active | Self::Completed)
    }
}

impl std::fmt::Display for LockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// A balance lock as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    pub kind: LockKind,
    pub id: LockId,
    pub owner: Address,
    pub token: Token,
    /// Amount reserved at creation. Never changes.
    pub init_amount: Amount,
    /// Amount still reserved. Only decreases.
    pub current_amount: Amount,
    pub reason: String,
    /// Document hash references, opaque to the core.
    pub docs: Vec<String>,
    /// Caller metadata, opaque to the core.
    #[serde(with = "hex_bytes")]
    pub payload: Vec<u8>,
}

impl LockRecord {
    /// `true` once the whole amount has been released.
    #[must_use]
    pub fn complete_operation(&self) -> bool {
        self.current_amount.is_zero()
    }

    #[must_use]
    pub fn state(&self) -> LockState {
        if self.complete_operation() {
            LockState::Completed
        } else {
            LockState::Active
        }
    }

    /// Amount released so far.
    #[must_use]
    pub fn released_amount(&self) -> Amount {
        self.init_amount
            .checked_sub(&self.current_amount)
            .unwrap_or_default()
    }

    /// Whether a creation request with these parameters names this same lock.
    #[must_use]
    pub fn same_parameters(&self, owner: &Address, token: &Token, amount: &Amount) -> bool {
        &self.owner == owner && &self.token == token && &self.init_amount == amount
    }
}

pub(crate) mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_lock(current: u64) -> LockRecord {
        LockRecord {
            kind: LockKind::TokenBalance,
            id: LockId::from("L1"),
            owner: Address::from("owner"),
            token: Token::from("FIAT"),
            init_amount: Amount::from(100u64),
            current_amount: Amount::from(current),
            reason: "bridge".into(),
            docs: vec!["doc-1".into()],
            payload: vec![0xde, 0xad],
        }
    }

    #[test]
    fn state_transitions_valid() {
        assert!(LockState::Active.can_transition_to(LockState::Active));
        assert!(LockState::Active.can_transition_to(LockState::Completed));
    }

    #[test]
    fn completed_is_terminal() {
        assert!(!LockState::Completed.can_transition_to(LockState::Active));
        assert!(!LockState::Completed.can_transition_to(LockState::Completed));
    }

    #[test]
    fn complete_operation_derived_from_current_amount() {
        assert!(!make_lock(1).complete_operation());
        assert_eq!(make_lock(1).state(), LockState::Active);
        assert!(make_lock(0).complete_operation());
        assert_eq!(make_lock(0).state(), LockState::Completed);
    }

    #[test]
    fn released_amount() {
        assert_eq!(make_lock(60).released_amount(), Amount::from(40u64));
        assert_eq!(make_lock(100).released_amount(), Amount::zero());
    }

    #[test]
    fn same_parameters_ignores_metadata() {
        let lock = make_lock(100);
        assert!(lock.same_parameters(
            &Address::from("owner"),
            &Token::from("FIAT"),
            &Amount::from(100u64)
        ));
        assert!(!lock.same_parameters(
            &Address::from("owner"),
            &Token::from("USDT"),
            &Amount::from(100u64)
        ));
        assert!(!lock.same_parameters(
            &Address::from("owner"),
            &Token::from("FIAT"),
            &Amount::from(99u64)
        ));
    }

    #[test]
    fn namespaces_distinct() {
        assert_ne!(
            LockKind::TokenBalance.namespace(),
            LockKind::AllowedBalance.namespace()
        );
    }

    #[test]
    fn serde_roundtrip() {
        let lock = make_lock(60);
        let json = serde_json::to_string(&lock).unwrap();
        assert!(json.contains("\"payload\":\"dead\""));
        assert!(json.contains("\"TOKEN_BALANCE\""));
        let back: LockRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(lock, back);
    }
}
