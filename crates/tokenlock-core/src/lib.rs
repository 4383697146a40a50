//! # tokenlock-core
//!
//! **Lock lifecycle**: creation, partial and full release, lookup and
//! pruning of balance locks, with one ordered event per state transition.
//!
//! ## Architecture
//!
//! 1. **LockManager**: entry points called by the host transaction function
//! 2. **transition**: pure validation of create/unlock against the stored state
//! 3. **BalanceBook**: available/locked balances moved by every transition
//! 4. **EventEmitter**: ordered `Locked`/`Unlocked` events plus a digest
//!
//! ## Call Flow
//!
//! ```text
//! host tx → LockManager.create_lock() → transition::validate_create()
//!         → BalanceBook.reserve() → WriteBatch → LockLedger
//!         → EventEmitter.emit(Locked)
//! ```
//!
//! A call either stages and applies all of its writes and emits its event,
//! or returns an error having written nothing.

pub mod balance;
pub mod events;
pub mod manager;
pub mod request;
pub mod transition;

pub use balance::BalanceBook;
pub use events::{compute_event_root, verify_event_root, EventEmitter};
pub use manager::LockManager;
pub use request::{LockRequest, NewLock, UnlockRequest};
pub use transition::{CreateOutcome, UnlockTransition};
