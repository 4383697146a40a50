//! Arbitrary-precision token amounts.
//!
//! [`Amount`] is an unsigned big integer: negative values are not
//! representable, so the non-negativity invariants of locks hold by
//! construction. Business logic works with `Amount` values only; raw
//! big-endian bytes appear exclusively at the storage edge through
//! [`Amount::to_be_bytes`] / [`Amount::from_be_bytes`].
//!
//! The wire/JSON form is a base-10 string (`"1000000000000000000"`), so
//! amounts beyond `u64` survive every serde format without loss.

use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Result, TokenlockError};

/// Exact non-negative integer amount of a token, in base units.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(BigUint);

impl Amount {
    /// The zero amount.
    #[must_use]
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Wrap an existing big integer.
    #[must_use]
    pub fn from_biguint(value: BigUint) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    #[must_use]
    pub fn into_biguint(self) -> BigUint {
        self.0
    }

    /// `self - rhs`, or `None` if the result would be negative.
    #[must_use]
    pub fn checked_sub(&self, rhs: &Self) -> Option<Self> {
        if self.0 >= rhs.0 {
            Some(Self(&self.0 - &rhs.0))
        } else {
            None
        }
    }

    /// Canonical big-endian encoding: minimal length, no leading zero byte.
    /// Zero encodes as the empty byte string.
    #[must_use]
    pub fn to_be_bytes(&self) -> Vec<u8> {
        if self.0.is_zero() {
            Vec::new()
        } else {
            self.0.to_bytes_be()
        }
    }

    /// Decode a canonical big-endian encoding.
    ///
    /// # Errors
    /// Returns [`TokenlockError::ArithmeticError`] if the bytes carry a
    /// leading zero byte. Only a foreign or corrupted writer produces that.
    pub fn from_be_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.first() == Some(&0) {
            return Err(TokenlockError::ArithmeticError(format!(
                "non-canonical amount encoding: leading zero byte in {} byte value",
                bytes.len()
            )));
        }
        Ok(Self(BigUint::from_bytes_be(bytes)))
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<BigUint> for Amount {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

/// Parses a plain base-10 integer. No sign, whitespace, separators or
/// fractional part is accepted.
impl FromStr for Amount {
    type Err = TokenlockError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(TokenlockError::InvalidAmount {
                reason: "empty amount string".to_string(),
            });
        }
        if let Some(bad) = s.chars().find(|c| !c.is_ascii_digit()) {
            return Err(TokenlockError::InvalidAmount {
                reason: format!("unexpected character {bad:?} in amount {s:?}"),
            });
        }
        BigUint::parse_bytes(s.as_bytes(), 10)
            .map(Self)
            .ok_or_else(|| TokenlockError::InvalidAmount {
                reason: format!("cannot parse amount {s:?}"),
            })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add<&Amount> for &Amount {
    type Output = Amount;

    fn add(self, rhs: &Amount) -> Amount {
        Amount(&self.0 + &rhs.0)
    }
}

impl AddAssign<&Amount> for Amount {
    fn add_assign(&mut self, rhs: &Amount) {
        self.0 += &rhs.0;
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_str_radix(10))
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
