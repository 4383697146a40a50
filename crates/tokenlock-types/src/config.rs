//! Configuration for a TokenLock deployment on one ledger.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{constants, Address, LockKind, Result, Token, TokenlockError};

/// Per-ledger lock configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Tokens that may be locked as token balance (the ledger's own tokens).
    pub token_balance_tokens: BTreeSet<Token>,
    /// External tokens that may be locked as allowed balance.
    pub allowed_balance_tokens: BTreeSet<Token>,
    /// Owner address format.
    pub address: AddressRules,
    /// Maximum length of a lock reason in bytes.
    pub max_reason_len: usize,
    /// Maximum number of document references per lock.
    pub max_docs: usize,
    /// Keep completed locks for audit. When `false`, a lock is pruned as
    /// soon as it is fully released.
    pub retain_completed: bool,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            token_balance_tokens: BTreeSet::new(),
            allowed_balance_tokens: BTreeSet::new(),
            address: AddressRules::default(),
            max_reason_len: constants::DEFAULT_MAX_REASON_LEN,
            max_docs: constants::DEFAULT_MAX_DOCS,
            retain_completed: true,
        }
    }
}

impl LockConfig {
    /// Load from a JSON document. Missing fields take their defaults.
    ///
    /// # Errors
    /// Returns [`TokenlockError::Configuration`] on malformed JSON or an
    /// inconsistent configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|e| TokenlockError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Register a token for the given lock kind.
    #[must_use]
    pub fn with_token(mut self, kind: LockKind, token: impl Into<Token>) -> Self {
        self.tokens_mut(kind).insert(token.into());
        self
    }

    #[must_use]
    pub fn tokens(&self, kind: LockKind) -> &BTreeSet<Token> {
        match kind {
            LockKind::TokenBalance => &self.token_balance_tokens,
            LockKind::AllowedBalance => &self.allowed_balance_tokens,
        }
    }

    fn tokens_mut(&mut self, kind: LockKind) -> &mut BTreeSet<Token> {
        match kind {
            LockKind::TokenBalance => &mut self.token_balance_tokens,
            LockKind::AllowedBalance => &mut self.allowed_balance_tokens,
        }
    }

    /// # Errors
    /// Returns [`TokenlockError::UnknownToken`] if `token` is not registered for `kind`.
    pub fn check_token(&self, kind: LockKind, token: &Token) -> Result<()> {
        if self.tokens(kind).contains(token) {
            Ok(())
        } else {
            Err(TokenlockError::UnknownToken {
                kind,
                token: token.to_string(),
            })
        }
    }

    /// Sanity-check the configuration itself.
    ///
    /// # Errors
    /// Returns [`TokenlockError::Configuration`].
    pub fn validate(&self) -> Result<()> {
        for kind in LockKind::ALL {
            if let Some(bad) = self.tokens(kind).iter().find(|t| !t.validate_shape()) {
                return Err(TokenlockError::Configuration(format!(
                    "malformed {kind} token {bad:?}"
                )));
            }
        }
        if self.address.decoded_len == 0 {
            return Err(TokenlockError::Configuration(
                "address.decoded_len must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Owner address format: base58 text decoding to a fixed number of bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressRules {
    pub decoded_len: usize,
}

impl Default for AddressRules {
    fn default() -> Self {
        Self {
            decoded_len: constants::DEFAULT_ADDRESS_LEN,
        }
    }
}

impl AddressRules {
    /// # Errors
    /// Returns [`TokenlockError::InvalidOwner`] if the address is not base58
    /// or decodes to the wrong length.
    pub fn validate(&self, address: &Address) -> Result<()> {
        let invalid = |reason: String| TokenlockError::InvalidOwner {
            address: address.to_string(),
            reason,
        };
        if address.as_str().is_empty() {
            return Err(invalid("empty address".to_string()));
        }
        let bytes = bs58::decode(address.as_str())
            .into_vec()
            .map_err(|e| invalid(e.to_string()))?;
        if bytes.len() != self.decoded_len {
            return Err(invalid(format!(
                "decodes to {} bytes, expected {}",
                bytes.len(),
                self.decoded_len
            )));
        }
        Ok(())
    }
}
