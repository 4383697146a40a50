//! Ledger key layout.
//!
//! ```text
//! lock/<namespace>/<id>                            lock record or tombstone
//! owner/<namespace>/<owner>/<id>                   owner index (empty value)
//! balance/<namespace>/<slot>/<owner>/<token>       available | locked balance
//! rate/<deal_type>/<base>/<quote>                  rate record
//! ```
//!
//! `<namespace>` is [`LockKind::namespace`]. Components are validated by
//! their owning types before they get here and never contain `/`.

use tokenlock_types::{constants::KEY_SEPARATOR, Address, LockId, LockKind, RateKey, Token};

const LOCK_ROOT: &str = "lock";
const OWNER_ROOT: &str = "owner";
const BALANCE_ROOT: &str = "balance";
const RATE_ROOT: &str = "rate";

/// Which half of an owner's balance a key refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BalanceSlot {
    Available,
    Locked,
}

impl BalanceSlot {
    fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Locked => "locked",
        }
    }
}

fn join(parts: &[&str]) -> String {
    debug_assert!(
        parts.iter().all(|p| !p.contains(KEY_SEPARATOR)),
        "key component contains separator: {parts:?}"
    );
    parts.join("/")
}

#[must_use]
pub fn lock_key(kind: LockKind, id: &LockId) -> String {
    join(&[LOCK_ROOT, kind.namespace(), id.as_str()])
}

/// Prefix of every lock record of one kind.
#[must_use]
pub fn lock_prefix(kind: LockKind) -> String {
    let mut prefix = join(&[LOCK_ROOT, kind.namespace()]);
    prefix.push(KEY_SEPARATOR);
    prefix
}

#[must_use]
pub fn owner_index_key(kind: LockKind, owner: &Address, id: &LockId) -> String {
    join(&[OWNER_ROOT, kind.namespace(), owner.as_str(), id.as_str()])
}

/// Prefix of every owner-index entry of `owner` for one kind.
#[must_use]
pub fn owner_index_prefix(kind: LockKind, owner: &Address) -> String {
    let mut prefix = join(&[OWNER_ROOT, kind.namespace(), owner.as_str()]);
    prefix.push(KEY_SEPARATOR);
    prefix
}

/// Recover the lock id from an owner-index key.
#[must_use]
pub fn lock_id_from_index_key(key: &str) -> Option<LockId> {
    key.rsplit(KEY_SEPARATOR).next().filter(|s| !s.is_empty()).map(LockId::from)
}

#[must_use]
pub fn balance_key(kind: LockKind, slot: BalanceSlot, owner: &Address, token: &Token) -> String {
    join(&[
        BALANCE_ROOT,
        kind.namespace(),
        slot.as_str(),
        owner.as_str(),
        token.as_str(),
    ])
}

#[must_use]
pub fn rate_key(key: &RateKey) -> String {
    join(&[
        RATE_ROOT,
        &key.deal_type,
        key.base.as_str(),
        key.quote.as_str(),
    ])
}
