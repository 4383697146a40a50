//! Available/locked balance accounting per (kind, owner, token).
//!
//! A [`BalanceBook`] reads through the ledger port and stages every
//! mutation into the caller's [`WriteBatch`]. Reads see staged values, so
//! several moves within one call compose. Nothing is written until the
//! caller applies the batch.

use tokenlock_ledger::{
    codec,
    keys::{self, BalanceSlot},
    LockLedger, WriteBatch,
};
use tokenlock_types::{Address, Amount, LockKind, Result, Token, TokenlockError};

/// Balance view for one call.
pub struct BalanceBook<'b, L: LockLedger + ?Sized> {
    ledger: &'b L,
    batch: &'b mut WriteBatch,
}

impl<'b, L: LockLedger + ?Sized> BalanceBook<'b, L> {
    pub fn new(ledger: &'b L, batch: &'b mut WriteBatch) -> Self {
        Self { ledger, batch }
    }

    fn read(&self, key: &str) -> Result<Amount> {
        match self.batch.staged(key) {
            Some(Some(bytes)) => codec::decode_amount(bytes),
            Some(None) => Ok(Amount::zero()),
            None => match self.ledger.get(key)? {
                Some(bytes) => codec::decode_amount(&bytes),
                None => Ok(Amount::zero()),
            },
        }
    }

    fn stage(&mut self, key: String, amount: &Amount) {
        if amount.is_zero() {
            self.batch.delete(key);
        } else {
            self.batch.put(key, codec::encode_amount(amount));
        }
    }

    /// Spendable balance.
    pub fn available(&self, kind: LockKind, owner: &Address, token: &Token) -> Result<Amount> {
        self.read(&keys::balance_key(kind, BalanceSlot::Available, owner, token))
    }

    /// Balance reserved by active locks.
    pub fn locked(&self, kind: LockKind, owner: &Address, token: &Token) -> Result<Amount> {
        self.read(&keys::balance_key(kind, BalanceSlot::Locked, owner, token))
    }

    /// Increase available balance.
    pub fn credit(
        &mut self,
        kind: LockKind,
        owner: &Address,
        token: &Token,
        amount: &Amount,
    ) -> Result<()> {
        let key = keys::balance_key(kind, BalanceSlot::Available, owner, token);
        let next = &self.read(&key)? + amount;
        self.stage(key, &next);
        Ok(())
    }

    /// Decrease available balance.
    ///
    /// # Errors
    /// Returns `InsufficientBalance` if available < amount.
    pub fn debit(
        &mut self,
        kind: LockKind,
        owner: &Address,
        token: &Token,
        amount: &Amount,
    ) -> Result<()> {
        let key = keys::balance_key(kind, BalanceSlot::Available, owner, token);
        let available = self.read(&key)?;
        let next = available
            .checked_sub(amount)
            .ok_or_else(|| TokenlockError::InsufficientBalance {
                needed: amount.clone(),
                available: available.clone(),
            })?;
        self.stage(key, &next);
        Ok(())
    }

    /// Move funds available → locked. Used when a lock is created.
    ///
    /// # Errors
    /// Returns `InsufficientBalance` if available < amount.
    pub fn reserve(
        &mut self,
        kind: LockKind,
        owner: &Address,
        token: &Token,
        amount: &Amount,
    ) -> Result<()> {
        self.debit(kind, owner, token, amount)?;
        let key = keys::balance_key(kind, BalanceSlot::Locked, owner, token);
        let next = &self.read(&key)? + amount;
        self.stage(key, &next);
        Ok(())
    }

    /// Move funds locked → available. Used on every unlock.
    ///
    /// # Errors
    /// Returns `ArithmeticError` if the locked balance is below `amount`;
    /// the lock records and the locked balance disagree.
    pub fn release(
        &mut self,
        kind: LockKind,
        owner: &Address,
        token: &Token,
        amount: &Amount,
    ) -> Result<()> {
        let key = keys::balance_key(kind, BalanceSlot::Locked, owner, token);
        let locked = self.read(&key)?;
        let next = locked.checked_sub(amount).ok_or_else(|| {
            TokenlockError::ArithmeticError(format!(
                "locked balance {locked} of {owner}/{token} below release of {amount}"
            ))
        })?;
        self.stage(key, &next);
        self.credit(kind, owner, token, amount)
    }
}

#[cfg(test)]
mod tests {
    use tokenlock_ledger::MemoryLedger;
    use tokenlock_types::fixtures::{test_address, TEST_TOKEN};

    use super::*;

    fn token() -> Token {
        Token::from(TEST_TOKEN)
    }

    fn funded(amount: u64) -> MemoryLedger {
        let mut ledger = MemoryLedger::new();
        let mut batch = WriteBatch::new();
        BalanceBook::new(&ledger, &mut batch)
            .credit(LockKind::TokenBalance, &test_address(1), &token(), &Amount::from(amount))
            .unwrap();
        ledger.write_batch(batch).unwrap();
        ledger
    }

    #[test]
    fn credit_then_read() {
        let ledger = funded(500);
        let mut batch = WriteBatch::new();
        let book = BalanceBook::new(&ledger, &mut batch);
        let owner = test_address(1);
        assert_eq!(
            book.available(LockKind::TokenBalance, &owner, &token()).unwrap(),
            Amount::from(500u64)
        );
        assert!(book.locked(LockKind::TokenBalance, &owner, &token()).unwrap().is_zero());
        // Other namespace untouched.
        assert!(book
            .available(LockKind::AllowedBalance, &owner, &token())
            .unwrap()
            .is_zero());
    }

    #[test]
    fn reserve_and_release_conserve_total() {
        let ledger = funded(500);
        let owner = test_address(1);
        let mut batch = WriteBatch::new();
        let mut book = BalanceBook::new(&ledger, &mut batch);

        book.reserve(LockKind::TokenBalance, &owner, &token(), &Amount::from(300u64))
            .unwrap();
        assert_eq!(
            book.available(LockKind::TokenBalance, &owner, &token()).unwrap(),
            Amount::from(200u64)
        );
        assert_eq!(
            book.locked(LockKind::TokenBalance, &owner, &token()).unwrap(),
            Amount::from(300u64)
        );

        book.release(LockKind::TokenBalance, &owner, &token(), &Amount::from(100u64))
            .unwrap();
        let available = book.available(LockKind::TokenBalance, &owner, &token()).unwrap();
        let locked = book.locked(LockKind::TokenBalance, &owner, &token()).unwrap();
        assert_eq!(available, Amount::from(300u64));
        assert_eq!(locked, Amount::from(200u64));
        assert_eq!(&available + &locked, Amount::from(500u64));
    }

    #[test]
    fn reserve_beyond_available_fails() {
        let ledger = funded(50);
        let mut batch = WriteBatch::new();
        let mut book = BalanceBook::new(&ledger, &mut batch);
        let err = book
            .reserve(LockKind::TokenBalance, &test_address(1), &token(), &Amount::from(51u64))
            .unwrap_err();
        assert!(matches!(err, TokenlockError::InsufficientBalance { .. }));
        assert!(batch.is_empty());
    }

    #[test]
    fn release_beyond_locked_is_arithmetic_error() {
        let ledger = funded(50);
        let mut batch = WriteBatch::new();
        let mut book = BalanceBook::new(&ledger, &mut batch);
        let err = book
            .release(LockKind::TokenBalance, &test_address(1), &token(), &Amount::from(1u64))
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn nothing_written_before_batch_applied() {
        let ledger = funded(500);
        let before = ledger.clone();
        let mut batch = WriteBatch::new();
        BalanceBook::new(&ledger, &mut batch)
            .reserve(LockKind::TokenBalance, &test_address(1), &token(), &Amount::from(10u64))
            .unwrap();
        assert_eq!(ledger, before);
        assert!(!batch.is_empty());
    }

    #[test]
    fn emptied_balance_is_deleted() {
        let mut ledger = funded(10);
        let mut batch = WriteBatch::new();
        BalanceBook::new(&ledger, &mut batch)
            .debit(LockKind::TokenBalance, &test_address(1), &token(), &Amount::from(10u64))
            .unwrap();
        ledger.write_batch(batch).unwrap();
        assert!(ledger.is_empty());
    }
}
