//! System-wide constants for TokenLock.

/// Current schema version of persisted lock and rate records.
pub const SCHEMA_VERSION: u16 = 1;

/// Maximum length of a lock identifier in bytes.
pub const MAX_LOCK_ID_LEN: usize = 128;

/// Maximum length of a token ticker in bytes.
pub const MAX_TOKEN_LEN: usize = 32;

/// Default maximum length of a lock reason.
pub const DEFAULT_MAX_REASON_LEN: usize = 1024;

/// Default maximum number of document references per lock.
pub const DEFAULT_MAX_DOCS: usize = 64;

/// Decoded byte length of a ledger address (base58 of a 32-byte hash).
pub const DEFAULT_ADDRESS_LEN: usize = 32;

/// Separator between key components in the ledger namespace.
pub const KEY_SEPARATOR: char = '/';

/// Domain tag mixed into event log digests.
pub const EVENT_DIGEST_DOMAIN: &[u8] = b"tokenlock:event_root:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
