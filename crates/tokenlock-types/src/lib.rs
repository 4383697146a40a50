//! # tokenlock-types
//!
//! Shared types, errors, and configuration for **TokenLock**.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`LockId`], [`Address`], [`Token`], [`TxId`], [`TxContext`]
//! - **Amounts**: [`Amount`], an arbitrary-precision unsigned integer
//! - **Lock model**: [`LockRecord`], [`LockKind`], [`LockState`]
//! - **Rate model**: [`RateRecord`], [`RateKey`]
//! - **Events**: [`LockEvent`], [`LockEventType`]
//! - **Configuration**: [`LockConfig`], [`AddressRules`]
//! - **Errors**: [`TokenlockError`] with `TL_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod amount;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod lock;
pub mod rate;

#[cfg(any(test, feature = "test-helpers"))]
pub mod fixtures;

// Re-export all primary types at crate root for ergonomic imports:
//   use tokenlock_types::{Amount, LockRecord, LockKind, ...};

pub use amount::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use lock::*;
pub use rate::*;

// Constants are accessed via `tokenlock_types::constants::FOO`
// (not re-exported to avoid name collisions).
