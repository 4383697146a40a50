//! Error types for TokenLock.
//!
//! All errors use the `TL_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Validation errors (malformed amount, address, token, id, rate)
//! - 2xx: Limit errors
//! - 3xx: Lock lifecycle errors
//! - 4xx: Balance errors
//! - 9xx: Storage / internal errors

use thiserror::Error;

use crate::{Amount, LockId, LockKind};

/// Central error enum for all TokenLock operations.
#[derive(Debug, Error)]
pub enum TokenlockError {
    // =================================================================
    // Validation Errors (1xx)
    // =================================================================
    /// The amount is malformed, zero where a positive value is required,
    /// or otherwise outside the valid domain.
    #[error("TL_ERR_100: Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// The owner address is not a well-formed ledger address.
    #[error("TL_ERR_101: Invalid owner address {address:?}: {reason}")]
    InvalidOwner { address: String, reason: String },

    /// The token is not registered for this lock kind.
    #[error("TL_ERR_102: Unknown token {token:?} for {kind} locks")]
    UnknownToken { kind: LockKind, token: String },

    /// The lock identifier is empty, too long, or contains a reserved character.
    #[error("TL_ERR_103: Invalid lock id {id:?}: {reason}")]
    InvalidLockId { id: String, reason: String },

    /// The rate record is inconsistent (e.g. `max < min`).
    #[error("TL_ERR_104: Invalid rate: {reason}")]
    InvalidRate { reason: String },

    /// The request metadata exceeds configured bounds (reason length, docs count).
    #[error("TL_ERR_105: Invalid request: {reason}")]
    InvalidRequest { reason: String },

    // =================================================================
    // Limit Errors (2xx)
    // =================================================================
    /// The amount is outside the `[min, max]` window of the rate record.
    #[error("TL_ERR_200: Amount {amount} outside limit [{min}, {max}] (max 0 = unbounded)")]
    LimitExceeded {
        amount: Amount,
        min: Amount,
        max: Amount,
    },

    // =================================================================
    // Lock Lifecycle Errors (3xx)
    // =================================================================
    /// The id is taken: by a lock with different owner, token or amount,
    /// or by a pruned lock whose id stays reserved.
    #[error("TL_ERR_300: Lock {id} in {kind} namespace {}", duplicate_detail(.pruned))]
    DuplicateLock {
        kind: LockKind,
        id: LockId,
        /// `true` when the id belongs to a pruned lock.
        pruned: bool,
    },

    /// No lock with this id exists.
    #[error("TL_ERR_301: Lock {id} not found in {kind} namespace")]
    NotFound { kind: LockKind, id: LockId },

    /// The lock has been fully released and is terminal.
    #[error("TL_ERR_302: Lock {id} is already completed")]
    AlreadyCompleted { id: LockId },

    /// The unlock amount exceeds the amount still locked.
    #[error("TL_ERR_303: Insufficient locked amount on {id}: requested {requested}, locked {locked}")]
    InsufficientLockedAmount {
        id: LockId,
        requested: Amount,
        locked: Amount,
    },

    /// Pruning was requested on a lock that still holds value.
    #[error("TL_ERR_304: Lock {id} is still active ({locked} locked)")]
    LockStillActive { id: LockId, locked: Amount },

    // =================================================================
    // Balance Errors (4xx)
    // =================================================================
    /// Not enough available balance to reserve or debit.
    #[error("TL_ERR_400: Insufficient available balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    // =================================================================
    // Storage / Internal (9xx)
    // =================================================================
    /// A stored integer encoding is corrupt. Indicates a storage invariant
    /// violation; never expected while this crate is the sole writer.
    #[error("TL_ERR_900: Arithmetic error: {0}")]
    ArithmeticError(String),

    /// Serialization / deserialization error.
    #[error("TL_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("TL_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// The ledger port failed.
    #[error("TL_ERR_903: Storage error: {0}")]
    Storage(String),
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn duplicate_detail(pruned: &bool) -> &'static str {
    if *pruned {
        "was pruned; its id cannot be reused"
    } else {
        "already exists with different parameters"
    }
}

impl TokenlockError {
    /// Whether this error signals corrupted state rather than a rejected request.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ArithmeticError(_) | Self::Storage(_))
    }

    /// Whether this error is a request validation failure (1xx).
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount { .. }
                | Self::InvalidOwner { .. }
                | Self::UnknownToken { .. }
                | Self::InvalidLockId { .. }
                | Self::InvalidRate { .. }
                | Self::InvalidRequest { .. }
        )
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, TokenlockError>;

impl From<serde_json::Error> for TokenlockError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
