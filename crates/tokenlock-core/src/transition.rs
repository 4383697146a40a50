//! Pure validation of lock state transitions.
//!
//! Nothing here touches the ledger. The manager loads the stored entry,
//! asks this module what the transition would be, and only then stages
//! writes. A rejected transition therefore never leaves partial state.

use tokenlock_ledger::LockEntry;
use tokenlock_types::{
    Address, Amount, LockId, LockKind, LockRecord, LockState, Result, Token, TokenlockError,
};

/// What creating a lock with a given id amounts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// No lock with this id exists: create it.
    Fresh,
    /// The same lock was already created: return it, write and emit nothing.
    Replay(LockRecord),
}

/// Decide whether `id` may be created with these parameters.
///
/// # Errors
/// Returns [`TokenlockError::DuplicateLock`] if the id is taken by a lock
/// with different owner, token or amount, or by a pruned lock.
pub fn validate_create(
    existing: Option<LockEntry>,
    kind: LockKind,
    id: &LockId,
    owner: &Address,
    token: &Token,
    amount: &Amount,
) -> Result<CreateOutcome> {
    match existing {
        None => Ok(CreateOutcome::Fresh),
        Some(LockEntry::Live(record)) if record.same_parameters(owner, token, amount) => {
            Ok(CreateOutcome::Replay(record))
        }
        Some(LockEntry::Live(_)) => Err(TokenlockError::DuplicateLock {
            kind,
            id: id.clone(),
            pruned: false,
        }),
        Some(LockEntry::Pruned { .. }) => Err(TokenlockError::DuplicateLock {
            kind,
            id: id.clone(),
            pruned: true,
        }),
    }
}

/// The effect of a valid unlock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockTransition {
    pub from: LockState,
    pub to: LockState,
    /// `current_amount` after the unlock.
    pub remaining: Amount,
}

/// Validate releasing `amount` from `record`.
///
/// # Errors
/// - `AlreadyCompleted` if the lock is terminal (checked first)
/// - `InvalidAmount` if `amount` is zero
/// - `InsufficientLockedAmount` if `amount > current_amount`
pub fn validate_unlock(record: &LockRecord, amount: &Amount) -> Result<UnlockTransition> {
    let from = record.state();
    if from == LockState::Completed {
        return Err(TokenlockError::AlreadyCompleted {
            id: record.id.clone(),
        });
    }
    if amount.is_zero() {
        return Err(TokenlockError::InvalidAmount {
            reason: "unlock amount must be positive".to_string(),
        });
    }
    let remaining = record.current_amount.checked_sub(amount).ok_or_else(|| {
        TokenlockError::InsufficientLockedAmount {
            id: record.id.clone(),
            requested: amount.clone(),
            locked: record.current_amount.clone(),
        }
    })?;
    let to = if remaining.is_zero() {
        LockState::Completed
    } else {
        LockState::Active
    };
    debug_assert!(from.can_transition_to(to));
    Ok(UnlockTransition {
        from,
        to,
        remaining,
    })
}
