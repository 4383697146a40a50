//! The lock manager: every lock operation the host transaction can invoke.
//!
//! Each public operation follows the same shape:
//!
//! 1. validate the request and load the stored entry
//! 2. decide the transition (see [`crate::transition`])
//! 3. stage lock, index and balance writes into one [`WriteBatch`]
//! 4. apply the batch, then emit the event
//!
//! Any error before step 4 returns with nothing written and nothing emitted.

use tokenlock_ledger::{codec, keys, LockEntry, LockLedger, WriteBatch};
use tokenlock_ratelimit::RateLimiter;
use tokenlock_types::{
    Address, Amount, LockConfig, LockEvent, LockEventType, LockId, LockKind, LockRecord,
    LockState, Result, Token, TokenlockError, TxContext,
};

use crate::balance::BalanceBook;
use crate::events::EventEmitter;
use crate::request::{LockRequest, NewLock, UnlockRequest};
use crate::transition::{validate_create, validate_unlock, CreateOutcome};

/// Lock operations for one host transaction.
///
/// Owns (or mutably borrows, via `&mut L`) the ledger port for the
/// transaction's lifetime and collects the transaction's events.
pub struct LockManager<'c, L: LockLedger> {
    ledger: L,
    config: &'c LockConfig,
    tx: TxContext,
    emitter: EventEmitter,
}

fn rejected(op: &'static str, err: TokenlockError) -> TokenlockError {
    tracing::warn!(op, error = %err, "Lock operation rejected");
    err
}

impl<'c, L: LockLedger> LockManager<'c, L> {
    pub fn new(ledger: L, config: &'c LockConfig, tx: TxContext) -> Self {
        Self {
            ledger,
            config,
            emitter: EventEmitter::new(tx.clone()),
            tx,
        }
    }

    #[must_use]
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    #[must_use]
    pub fn tx(&self) -> &TxContext {
        &self.tx
    }

    // =================================================================
    // Creation
    // =================================================================

    /// Reserve `new.amount` of the owner's available balance under a new lock.
    ///
    /// Re-creating a lock with identical owner, token and amount returns
    /// the stored record and emits nothing.
    ///
    /// # Errors
    /// `InvalidOwner`, `InvalidAmount`, `UnknownToken`, `InvalidLockId`,
    /// `InvalidRequest`, `DuplicateLock`, `InsufficientBalance`.
    pub fn create_lock(&mut self, kind: LockKind, new: NewLock) -> Result<LockRecord> {
        self.try_create(kind, new)
            .map_err(|e| rejected("create_lock", e))
    }

    /// [`Self::create_lock`] gated by a rate window.
    ///
    /// # Errors
    /// `LimitExceeded` when `new.amount` is outside the limiter's window,
    /// otherwise as [`Self::create_lock`].
    pub fn create_lock_within_limit(
        &mut self,
        kind: LockKind,
        new: NewLock,
        limiter: &RateLimiter,
    ) -> Result<LockRecord> {
        limiter
            .check_limit(&new.amount)
            .map_err(|e| rejected("create_lock_within_limit", e))?;
        self.create_lock(kind, new)
    }

    /// Parse a host request and create the lock.
    ///
    /// # Errors
    /// `InvalidAmount` for a malformed amount string, otherwise as
    /// [`Self::create_lock`].
    pub fn submit_lock(&mut self, request: LockRequest) -> Result<LockRecord> {
        let (kind, new) = request.parse().map_err(|e| rejected("submit_lock", e))?;
        self.create_lock(kind, new)
    }

    fn validate_new(&self, kind: LockKind, new: &NewLock) -> Result<LockId> {
        self.config.address.validate(&new.owner)?;
        if new.amount.is_zero() {
            return Err(TokenlockError::InvalidAmount {
                reason: "lock amount must be positive".to_string(),
            });
        }
        self.config.check_token(kind, &new.token)?;

        let id = new
            .id
            .clone()
            .unwrap_or_else(|| LockId::from(self.tx.tx_id.clone()));
        id.validate()?;

        if new.reason.len() > self.config.max_reason_len {
            return Err(TokenlockError::InvalidRequest {
                reason: format!(
                    "reason is {} bytes, limit {}",
                    new.reason.len(),
                    self.config.max_reason_len
                ),
            });
        }
        if new.docs.len() > self.config.max_docs {
            return Err(TokenlockError::InvalidRequest {
                reason: format!(
                    "{} document references, limit {}",
                    new.docs.len(),
                    self.config.max_docs
                ),
            });
        }
        Ok(id)
    }

    fn try_create(&mut self, kind: LockKind, new: NewLock) -> Result<LockRecord> {
        let id = self.validate_new(kind, &new)?;
        let existing = self.load(kind, &id)?;

        match validate_create(existing, kind, &id, &new.owner, &new.token, &new.amount)? {
            CreateOutcome::Replay(record) => {
                tracing::debug!(
                    kind = %kind,
                    lock_id = %record.id,
                    "Idempotent lock replay, nothing written"
                );
                Ok(record)
            }
            CreateOutcome::Fresh => {
                let record = LockRecord {
                    kind,
                    id,
                    owner: new.owner,
                    token: new.token,
                    init_amount: new.amount.clone(),
                    current_amount: new.amount,
                    reason: new.reason,
                    docs: new.docs,
                    payload: new.payload,
                };

                let mut batch = WriteBatch::new();
                BalanceBook::new(&self.ledger, &mut batch).reserve(
                    kind,
                    &record.owner,
                    &record.token,
                    &record.init_amount,
                )?;
                batch.put(keys::lock_key(kind, &record.id), codec::encode_lock(&record)?);
                batch.put(
                    keys::owner_index_key(kind, &record.owner, &record.id),
                    Vec::new(),
                );
                self.ledger.write_batch(batch)?;

                self.emitter
                    .emit(LockEventType::Locked, &record, record.init_amount.clone());
                tracing::info!(
                    kind = %kind,
                    lock_id = %record.id,
                    owner = %record.owner,
                    token = %record.token,
                    amount = %record.init_amount,
                    "Lock created"
                );
                Ok(record)
            }
        }
    }

    // =================================================================
    // Release
    // =================================================================

    /// Release `amount` of an active lock back to the owner's available balance.
    ///
    /// # Errors
    /// `NotFound`, `AlreadyCompleted`, `InvalidAmount` (zero),
    /// `InsufficientLockedAmount`.
    pub fn partial_unlock(
        &mut self,
        kind: LockKind,
        id: &LockId,
        amount: &Amount,
    ) -> Result<(LockRecord, LockEvent)> {
        self.try_unlock(kind, id, Some(amount))
            .map_err(|e| rejected("partial_unlock", e))
    }

    /// Release everything still locked.
    ///
    /// # Errors
    /// `NotFound`, `AlreadyCompleted`.
    pub fn full_unlock(&mut self, kind: LockKind, id: &LockId) -> Result<(LockRecord, LockEvent)> {
        self.try_unlock(kind, id, None)
            .map_err(|e| rejected("full_unlock", e))
    }

    /// Parse a host request and unlock. No amount means a full unlock.
    ///
    /// # Errors
    /// `InvalidAmount` for a malformed amount string, otherwise as
    /// [`Self::partial_unlock`].
    pub fn submit_unlock(&mut self, request: UnlockRequest) -> Result<(LockRecord, LockEvent)> {
        let (kind, id, amount) = request.parse().map_err(|e| rejected("submit_unlock", e))?;
        match amount {
            Some(amount) => self.partial_unlock(kind, &id, &amount),
            None => self.full_unlock(kind, &id),
        }
    }

    fn try_unlock(
        &mut self,
        kind: LockKind,
        id: &LockId,
        amount: Option<&Amount>,
    ) -> Result<(LockRecord, LockEvent)> {
        id.validate()?;
        let mut record = match self.load(kind, id)? {
            Some(LockEntry::Live(record)) => record,
            // The body is gone but the id stays reserved: the lock completed.
            Some(LockEntry::Pruned { .. }) => {
                return Err(TokenlockError::AlreadyCompleted { id: id.clone() });
            }
            None => {
                return Err(TokenlockError::NotFound {
                    kind,
                    id: id.clone(),
                });
            }
        };

        let amount = amount.cloned().unwrap_or_else(|| record.current_amount.clone());
        let transition = validate_unlock(&record, &amount)?;
        record.current_amount = transition.remaining;
        let prune = transition.to == LockState::Completed && !self.config.retain_completed;

        let mut batch = WriteBatch::new();
        BalanceBook::new(&self.ledger, &mut batch).release(
            kind,
            &record.owner,
            &record.token,
            &amount,
        )?;
        if prune {
            stage_prune(&mut batch, &record)?;
        } else {
            batch.put(keys::lock_key(kind, &record.id), codec::encode_lock(&record)?);
        }
        self.ledger.write_batch(batch)?;

        let event = self
            .emitter
            .emit(LockEventType::Unlocked, &record, amount.clone());

        if transition.to == LockState::Completed {
            tracing::info!(
                kind = %kind,
                lock_id = %record.id,
                released = %amount,
                pruned = prune,
                "Lock fully released"
            );
        } else {
            tracing::debug!(
                kind = %kind,
                lock_id = %record.id,
                released = %amount,
                remaining = %record.current_amount,
                "Lock partially released"
            );
        }
        Ok((record, event))
    }

    // =================================================================
    // Queries
    // =================================================================

    /// # Errors
    /// `NotFound` if no live lock has this id, including pruned locks.
    pub fn get_lock(&self, kind: LockKind, id: &LockId) -> Result<LockRecord> {
        id.validate()?;
        match self.load(kind, id)? {
            Some(LockEntry::Live(record)) => Ok(record),
            Some(LockEntry::Pruned { .. }) | None => Err(TokenlockError::NotFound {
                kind,
                id: id.clone(),
            }),
        }
    }

    /// Every live lock of `owner` in `kind`, in id order.
    pub fn list_locks(&self, kind: LockKind, owner: &Address) -> Result<Vec<LockRecord>> {
        self.config.address.validate(owner)?;
        let mut records = Vec::new();
        for (key, _) in self.ledger.scan_prefix(&keys::owner_index_prefix(kind, owner))? {
            let Some(id) = keys::lock_id_from_index_key(&key) else {
                continue;
            };
            if let Some(LockEntry::Live(record)) = self.load(kind, &id)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    pub fn available_balance(&self, kind: LockKind, owner: &Address, token: &Token) -> Result<Amount> {
        let mut batch = WriteBatch::new();
        BalanceBook::new(&self.ledger, &mut batch).available(kind, owner, token)
    }

    pub fn locked_balance(&self, kind: LockKind, owner: &Address, token: &Token) -> Result<Amount> {
        let mut batch = WriteBatch::new();
        BalanceBook::new(&self.ledger, &mut batch).locked(kind, owner, token)
    }

    // =================================================================
    // Issuance
    // =================================================================

    /// Increase an owner's available balance.
    ///
    /// # Errors
    /// `InvalidOwner`, `UnknownToken`.
    pub fn credit(
        &mut self,
        kind: LockKind,
        owner: &Address,
        token: &Token,
        amount: &Amount,
    ) -> Result<()> {
        self.config.address.validate(owner)?;
        self.config.check_token(kind, token)?;
        let mut batch = WriteBatch::new();
        BalanceBook::new(&self.ledger, &mut batch).credit(kind, owner, token, amount)?;
        self.ledger.write_batch(batch)?;
        tracing::debug!(kind = %kind, owner = %owner, token = %token, amount = %amount, "Balance credited");
        Ok(())
    }

    /// Decrease an owner's available balance.
    ///
    /// # Errors
    /// `InvalidOwner`, `UnknownToken`, `InsufficientBalance`.
    pub fn debit(
        &mut self,
        kind: LockKind,
        owner: &Address,
        token: &Token,
        amount: &Amount,
    ) -> Result<()> {
        self.config.address.validate(owner)?;
        self.config.check_token(kind, token)?;
        let mut batch = WriteBatch::new();
        BalanceBook::new(&self.ledger, &mut batch)
            .debit(kind, owner, token, amount)
            .map_err(|e| rejected("debit", e))?;
        self.ledger.write_batch(batch)?;
        tracing::debug!(kind = %kind, owner = %owner, token = %token, amount = %amount, "Balance debited");
        Ok(())
    }

    // =================================================================
    // Retention
    // =================================================================

    /// Replace a completed lock with a tombstone and drop its index entry.
    /// Pruning an already pruned lock is a no-op.
    ///
    /// # Errors
    /// `NotFound` for unknown ids, `LockStillActive` if value is still locked.
    pub fn prune_completed(&mut self, kind: LockKind, id: &LockId) -> Result<()> {
        self.try_prune(kind, id)
            .map_err(|e| rejected("prune_completed", e))
    }

    fn try_prune(&mut self, kind: LockKind, id: &LockId) -> Result<()> {
        id.validate()?;
        let record = match self.load(kind, id)? {
            Some(LockEntry::Live(record)) => record,
            Some(LockEntry::Pruned { .. }) => return Ok(()),
            None => {
                return Err(TokenlockError::NotFound {
                    kind,
                    id: id.clone(),
                });
            }
        };
        if record.state() == LockState::Active {
            return Err(TokenlockError::LockStillActive {
                id: record.id,
                locked: record.current_amount,
            });
        }

        let mut batch = WriteBatch::new();
        stage_prune(&mut batch, &record)?;
        self.ledger.write_batch(batch)?;
        tracing::warn!(kind = %kind, lock_id = %record.id, "Completed lock pruned");
        Ok(())
    }

    // =================================================================
    // Events
    // =================================================================

    #[must_use]
    pub fn events(&self) -> &[LockEvent] {
        self.emitter.events()
    }

    /// Digest of the events emitted so far and not yet drained.
    #[must_use]
    pub fn event_digest(&self) -> [u8; 32] {
        self.emitter.digest()
    }

    pub fn drain_events(&mut self) -> Vec<LockEvent> {
        self.emitter.drain()
    }

    /// End the transaction: give back the ledger and the undrained events.
    pub fn finish(self) -> (L, Vec<LockEvent>) {
        tracing::debug!(
            tx_id = %self.tx.tx_id,
            events = self.emitter.len(),
            event_root = hex::encode(self.emitter.digest()),
            "Lock transaction finished"
        );
        (self.ledger, self.emitter.into_events())
    }

    fn load(&self, kind: LockKind, id: &LockId) -> Result<Option<LockEntry>> {
        self.ledger
            .get(&keys::lock_key(kind, id))?
            .map(|bytes| codec::decode_lock(&bytes))
            .transpose()
    }
}

fn stage_prune(batch: &mut WriteBatch, record: &LockRecord) -> Result<()> {
    batch.put(
        keys::lock_key(record.kind, &record.id),
        codec::encode_tombstone(record.kind, &record.id)?,
    );
    batch.delete(keys::owner_index_key(record.kind, &record.owner, &record.id));
    Ok(())
}

#[cfg(test)]
mod tests {
    use tokenlock_ledger::MemoryLedger;
    use tokenlock_types::fixtures::{test_address, test_config, test_tx, TEST_ALLOWED_TOKEN, TEST_TOKEN};

    use super::*;

    fn fiat() -> Token {
        Token::from(TEST_TOKEN)
    }

    fn funded_manager<'c>(
        ledger: &'c mut MemoryLedger,
        config: &'c LockConfig,
    ) -> LockManager<'c, &'c mut MemoryLedger> {
        let mut mgr = LockManager::new(ledger, config, test_tx("tx-1"));
        mgr.credit(LockKind::TokenBalance, &test_address(1), &fiat(), &Amount::from(1_000u64))
            .unwrap();
        mgr
    }

    fn lock_100(id: &str) -> NewLock {
        NewLock::new(test_address(1), fiat(), Amount::from(100u64)).with_id(id)
    }

    #[test]
    fn create_then_get() {
        let config = test_config();
        let mut ledger = MemoryLedger::new();
        let mut mgr = funded_manager(&mut ledger, &config);

        let created = mgr
            .create_lock(LockKind::TokenBalance, lock_100("L1").with_reason("bridge"))
            .unwrap();
        assert_eq!(created.state(), LockState::Active);
        assert_eq!(created.reason, "bridge");

        let fetched = mgr.get_lock(LockKind::TokenBalance, &LockId::from("L1")).unwrap();
        assert_eq!(fetched, created);
        assert_eq!(mgr.events().len(), 1);
        assert_eq!(mgr.events()[0].event_type, LockEventType::Locked);
        assert_eq!(mgr.events()[0].amount_delta, Amount::from(100u64));
    }

    #[test]
    fn id_defaults_to_tx_id() {
        let config = test_config();
        let mut ledger = MemoryLedger::new();
        let mut mgr = funded_manager(&mut ledger, &config);
        let record = mgr
            .create_lock(
                LockKind::TokenBalance,
                NewLock::new(test_address(1), fiat(), Amount::from(5u64)),
            )
            .unwrap();
        assert_eq!(record.id, LockId::from("tx-1"));
    }

    #[test]
    fn validation_failures() {
        let config = test_config();
        let mut ledger = MemoryLedger::new();
        let mut mgr = funded_manager(&mut ledger, &config);

        let zero = NewLock::new(test_address(1), fiat(), Amount::zero()).with_id("Z");
        assert!(matches!(
            mgr.create_lock(LockKind::TokenBalance, zero).unwrap_err(),
            TokenlockError::InvalidAmount { .. }
        ));

        let bad_owner = NewLock::new(Address::from("not base58 0OIl"), fiat(), Amount::from(1u64));
        assert!(matches!(
            mgr.create_lock(LockKind::TokenBalance, bad_owner).unwrap_err(),
            TokenlockError::InvalidOwner { .. }
        ));

        // USDT is only registered for allowed-balance locks.
        let wrong_ns = NewLock::new(test_address(1), Token::from(TEST_ALLOWED_TOKEN), Amount::from(1u64));
        assert!(matches!(
            mgr.create_lock(LockKind::TokenBalance, wrong_ns).unwrap_err(),
            TokenlockError::UnknownToken { .. }
        ));

        let bad_id = lock_100("a/b");
        assert!(matches!(
            mgr.create_lock(LockKind::TokenBalance, bad_id).unwrap_err(),
            TokenlockError::InvalidLockId { .. }
        ));

        let long_reason = lock_100("R").with_reason("x".repeat(config.max_reason_len + 1));
        assert!(matches!(
            mgr.create_lock(LockKind::TokenBalance, long_reason).unwrap_err(),
            TokenlockError::InvalidRequest { .. }
        ));

        assert!(mgr.events().is_empty());
    }

    #[test]
    fn create_needs_available_balance() {
        let config = test_config();
        let mut ledger = MemoryLedger::new();
        let mut mgr = LockManager::new(&mut ledger, &config, test_tx("tx-1"));
        let err = mgr.create_lock(LockKind::TokenBalance, lock_100("L1")).unwrap_err();
        assert!(matches!(err, TokenlockError::InsufficientBalance { .. }));
        assert!(mgr.events().is_empty());
        let (ledger, _) = mgr.finish();
        assert!(ledger.is_empty());
    }

    #[test]
    fn unlock_unknown_lock() {
        let config = test_config();
        let mut ledger = MemoryLedger::new();
        let mut mgr = funded_manager(&mut ledger, &config);
        let err = mgr
            .partial_unlock(LockKind::TokenBalance, &LockId::from("nope"), &Amount::from(1u64))
            .unwrap_err();
        assert!(matches!(err, TokenlockError::NotFound { .. }));
    }

    #[test]
    fn full_unlock_releases_remaining() {
        let config = test_config();
        let mut ledger = MemoryLedger::new();
        let mut mgr = funded_manager(&mut ledger, &config);
        let id = LockId::from("L1");
        mgr.create_lock(LockKind::TokenBalance, lock_100("L1")).unwrap();
        mgr.partial_unlock(LockKind::TokenBalance, &id, &Amount::from(30u64))
            .unwrap();

        let (record, event) = mgr.full_unlock(LockKind::TokenBalance, &id).unwrap();
        assert_eq!(record.state(), LockState::Completed);
        assert_eq!(event.amount_delta, Amount::from(70u64));
        assert!(event.complete_operation);
        assert_eq!(
            mgr.available_balance(LockKind::TokenBalance, &test_address(1), &fiat())
                .unwrap(),
            Amount::from(1_000u64)
        );
        assert!(mgr
            .locked_balance(LockKind::TokenBalance, &test_address(1), &fiat())
            .unwrap()
            .is_zero());
    }

    #[test]
    fn prune_lifecycle() {
        let config = test_config();
        let mut ledger = MemoryLedger::new();
        let mut mgr = funded_manager(&mut ledger, &config);
        let id = LockId::from("L1");
        mgr.create_lock(LockKind::TokenBalance, lock_100("L1")).unwrap();

        let err = mgr.prune_completed(LockKind::TokenBalance, &id).unwrap_err();
        assert!(matches!(err, TokenlockError::LockStillActive { .. }));

        mgr.full_unlock(LockKind::TokenBalance, &id).unwrap();
        mgr.prune_completed(LockKind::TokenBalance, &id).unwrap();
        // Idempotent.
        mgr.prune_completed(LockKind::TokenBalance, &id).unwrap();

        assert!(matches!(
            mgr.get_lock(LockKind::TokenBalance, &id).unwrap_err(),
            TokenlockError::NotFound { .. }
        ));
        // Identical re-create: the id is reserved, not mismatched.
        let err = mgr.create_lock(LockKind::TokenBalance, lock_100("L1")).unwrap_err();
        assert!(matches!(err, TokenlockError::DuplicateLock { pruned: true, .. }));
        assert!(err.to_string().contains("pruned"), "Got: {err}");
        assert!(!err.to_string().contains("different parameters"));
        assert!(matches!(
            mgr.full_unlock(LockKind::TokenBalance, &id).unwrap_err(),
            TokenlockError::AlreadyCompleted { .. }
        ));
        assert!(mgr
            .list_locks(LockKind::TokenBalance, &test_address(1))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn auto_prune_when_not_retaining() {
        let mut config = test_config();
        config.retain_completed = false;
        let mut ledger = MemoryLedger::new();
        let mut mgr = funded_manager(&mut ledger, &config);
        let id = LockId::from("L1");
        mgr.create_lock(LockKind::TokenBalance, lock_100("L1")).unwrap();
        let (record, _) = mgr.full_unlock(LockKind::TokenBalance, &id).unwrap();
        assert!(record.complete_operation());
        assert!(matches!(
            mgr.get_lock(LockKind::TokenBalance, &id).unwrap_err(),
            TokenlockError::NotFound { .. }
        ));
    }

    #[test]
    fn prune_unknown_is_not_found() {
        let config = test_config();
        let mut ledger = MemoryLedger::new();
        let mut mgr = funded_manager(&mut ledger, &config);
        let err = mgr
            .prune_completed(LockKind::TokenBalance, &LockId::from("ghost"))
            .unwrap_err();
        assert!(matches!(err, TokenlockError::NotFound { .. }));
    }

    #[test]
    fn list_locks_in_id_order() {
        let config = test_config();
        let mut ledger = MemoryLedger::new();
        let mut mgr = funded_manager(&mut ledger, &config);
        for id in ["L3", "L1", "L2"] {
            mgr.create_lock(LockKind::TokenBalance, lock_100(id)).unwrap();
        }
        let ids: Vec<_> = mgr
            .list_locks(LockKind::TokenBalance, &test_address(1))
            .unwrap()
            .into_iter()
            .map(|r| r.id.to_string())
            .collect();
        assert_eq!(ids, vec!["L1", "L2", "L3"]);
        assert!(mgr
            .list_locks(LockKind::TokenBalance, &test_address(2))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn debit_cannot_overdraw() {
        let config = test_config();
        let mut ledger = MemoryLedger::new();
        let mut mgr = funded_manager(&mut ledger, &config);
        let owner = test_address(1);
        let err = mgr
            .debit(LockKind::TokenBalance, &owner, &fiat(), &Amount::from(1_001u64))
            .unwrap_err();
        assert!(matches!(err, TokenlockError::InsufficientBalance { .. }));
        mgr.debit(LockKind::TokenBalance, &owner, &fiat(), &Amount::from(1_000u64))
            .unwrap();
        assert!(mgr
            .available_balance(LockKind::TokenBalance, &owner, &fiat())
            .unwrap()
            .is_zero());
    }
}
