//! # tokenlock-ratelimit
//!
//! **Pure** limit checking and price calculation for transfer and swap
//! logic, plus storage of the rate records they read.
//!
//! - **Exact arithmetic**: arbitrary-precision integers end to end, never
//!   floating point, so every replica computes the same price
//! - **Explicit rounding**: prices are truncated toward zero (see
//!   [`calc_price`]); the dropped remainder is available through
//!   [`calc_price_with_remainder`]
//! - **No side effects** in [`RateLimiter`]; [`RateBook`] is the only part
//!   touching the ledger

pub mod book;
pub mod limiter;

pub use book::RateBook;
pub use limiter::{calc_price, calc_price_with_remainder, in_limit, RateLimiter};
