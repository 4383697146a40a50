//! Request types at the transaction-function boundary.
//!
//! Hosts hand amounts over as decimal strings. They are parsed into
//! [`Amount`] here, once, before any business logic runs.

use tokenlock_types::{Address, Amount, LockId, LockKind, Result, Token};

/// A lock request as received from the host: amount still a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockRequest {
    pub kind: LockKind,
    /// Defaults to the invoking transaction id when `None` or empty.
    pub id: Option<String>,
    pub owner: String,
    pub token: String,
    pub amount: String,
    pub reason: String,
    pub docs: Vec<String>,
    pub payload: Vec<u8>,
}

impl LockRequest {
    /// Parse into a typed [`NewLock`].
    ///
    /// # Errors
    /// Returns `InvalidAmount` if `amount` is not a plain base-10 integer.
    pub fn parse(self) -> Result<(LockKind, NewLock)> {
        let amount: Amount = self.amount.parse()?;
        Ok((
            self.kind,
            NewLock {
                id: self.id.filter(|id| !id.is_empty()).map(LockId::new),
                owner: Address::new(self.owner),
                token: Token::new(self.token),
                amount,
                reason: self.reason,
                docs: self.docs,
                payload: self.payload,
            },
        ))
    }
}

/// An unlock request as received from the host.
///
/// `amount: None` releases everything still locked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockRequest {
    pub kind: LockKind,
    pub id: String,
    pub amount: Option<String>,
}

impl UnlockRequest {
    pub fn parse(self) -> Result<(LockKind, LockId, Option<Amount>)> {
        let amount = self
            .amount
            .as_deref()
            .map(str::parse::<Amount>)
            .transpose()?;
        Ok((self.kind, LockId::new(self.id), amount))
    }
}

/// Typed parameters of a new lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLock {
    pub id: Option<LockId>,
    pub owner: Address,
    pub token: Token,
    pub amount: Amount,
    pub reason: String,
    pub docs: Vec<String>,
    pub payload: Vec<u8>,
}

impl NewLock {
    /// A lock with no id, reason, docs or payload.
    #[must_use]
    pub fn new(owner: Address, token: Token, amount: Amount) -> Self {
        Self {
            id: None,
            owner,
            token,
            amount,
            reason: String::new(),
            docs: Vec::new(),
            payload: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<LockId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    #[must_use]
    pub fn with_docs(mut self, docs: Vec<String>) -> Self {
        self.docs = docs;
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }
}

#[cfg(test)]
mod tests {
    use tokenlock_types::TokenlockError;

    use super::*;

    fn request(amount: &str) -> LockRequest {
        LockRequest {
            kind: LockKind::TokenBalance,
            id: Some("L1".into()),
            owner: "owner".into(),
            token: "FIAT".into(),
            amount: amount.into(),
            reason: "bridge".into(),
            docs: vec!["h".into()],
            payload: vec![1],
        }
    }

    #[test]
    fn parse_lock_request() {
        let (kind, lock) = request("1000000000000000000000").parse().unwrap();
        assert_eq!(kind, LockKind::TokenBalance);
        assert_eq!(lock.id, Some(LockId::from("L1")));
        assert_eq!(lock.amount.to_string(), "1000000000000000000000");
        assert_eq!(lock.docs, vec!["h".to_string()]);
    }

    #[test]
    fn empty_id_means_default() {
        let mut req = request("1");
        req.id = Some(String::new());
        assert_eq!(req.parse().unwrap().1.id, None);
    }

    #[test]
    fn negative_amount_rejected_at_boundary() {
        let err = request("-100").parse().unwrap_err();
        assert!(matches!(err, TokenlockError::InvalidAmount { .. }));
    }

    #[test]
    fn parse_unlock_request() {
        let req = UnlockRequest {
            kind: LockKind::AllowedBalance,
            id: "L1".into(),
            amount: Some("40".into()),
        };
        let (kind, id, amount) = req.parse().unwrap();
        assert_eq!(kind, LockKind::AllowedBalance);
        assert_eq!(id, LockId::from("L1"));
        assert_eq!(amount, Some(Amount::from(40u64)));

        let full = UnlockRequest {
            kind: LockKind::AllowedBalance,
            id: "L1".into(),
            amount: None,
        };
        assert_eq!(full.parse().unwrap().2, None);
    }

    #[test]
    fn malformed_unlock_amount() {
        let req = UnlockRequest {
            kind: LockKind::TokenBalance,
            id: "L1".into(),
            amount: Some("4.0".into()),
        };
        assert!(req.parse().is_err());
    }
}
