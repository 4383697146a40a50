//! Lock lifecycle events consumed by the cross-channel orchestrator.
//!
//! One event per successful state transition. Consumers rely on event order
//! within a transaction and on `complete_operation` to detect full
//! settlement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, Amount, LockId, LockKind, LockRecord, Token, TxId};

/// What happened to the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockEventType {
    /// A lock was created; `amount_delta` is the reserved amount.
    Locked,
    /// Part or all of a lock was released; `amount_delta` is the released amount.
    Unlocked,
}

impl std::fmt::Display for LockEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Locked => write!(f, "LOCKED"),
            Self::Unlocked => write!(f, "UNLOCKED"),
        }
    }
}

/// An event emitted by the lock manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockEvent {
    pub event_type: LockEventType,
    pub lock_kind: LockKind,
    /// Position of this event within its transaction, starting at 0.
    pub sequence: u64,
    pub tx_id: TxId,
    pub timestamp: DateTime<Utc>,
    pub id: LockId,
    pub owner: Address,
    pub token: Token,
    pub amount_delta: Amount,
    pub reason: String,
    pub docs: Vec<String>,
    #[serde(with = "crate::lock::hex_bytes")]
    pub payload: Vec<u8>,
    /// Convenience copy of `current_amount == 0` after the transition.
    pub complete_operation: bool,
}

impl LockEvent {
    /// Build an event from the lock record as it stands *after* the transition.
    #[must_use]
    pub fn from_record(
        event_type: LockEventType,
        record: &LockRecord,
        amount_delta: Amount,
        sequence: u64,
        tx_id: TxId,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            event_type,
            lock_kind: record.kind,
            sequence,
            tx_id,
            timestamp,
            id: record.id.clone(),
            owner: record.owner.clone(),
            token: record.token.clone(),
            amount_delta,
            reason: record.reason.clone(),
            docs: record.docs.clone(),
            payload: record.payload.clone(),
            complete_operation: record.complete_operation(),
        }
    }
}
