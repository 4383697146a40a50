//! # tokenlock-ledger
//!
//! The **state-port** between TokenLock and the host ledger.
//!
//! The host transaction environment owns the real key/value store; this
//! crate defines only what the core needs from it and how records look
//! once they get there:
//!
//! 1. **LockLedger**: `get` / `put` / `delete` / `scan_prefix`, scoped to the
//!    enclosing transaction
//! 2. **Keys**: namespaced key builders so token-balance and allowed-balance
//!    locks never collide
//! 3. **Codec**: schema-versioned records with stable field identifiers;
//!    amounts as canonical big-endian bytes
//! 4. **MemoryLedger**: in-memory implementation for tests and tooling
//! 5. **TxScope**: write-buffer overlay with all-or-nothing commit
//!
//! ```text
//! LockManager → TxScope (buffered writes) → LockLedger (host store)
//!                    └── commit() / drop
//! ```

pub mod codec;
pub mod keys;
pub mod memory;
pub mod port;
pub mod scope;

pub use codec::LockEntry;
pub use memory::MemoryLedger;
pub use port::{BatchOp, LockLedger, WriteBatch};
pub use scope::TxScope;
