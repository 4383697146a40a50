//! Persisted record encoding.
//!
//! Records are JSON objects whose keys are stable numeric field identifiers
//! plus a schema version under `"v"`. New optional fields get new
//! identifiers and `#[serde(default)]`, so records written by an older
//! version keep decoding and older readers skip fields they don't know.
//! Identifiers are never reused.
//!
//! Amounts are stored as canonical big-endian bytes, hex encoded. This is
//! the only place where raw integer bytes exist; everything above works on
//! [`Amount`].

use serde::{Deserialize, Serialize};
use tokenlock_types::{
    constants::SCHEMA_VERSION, Address, Amount, LockId, LockKind, LockRecord, RateRecord, Result,
    Token, TokenlockError,
};

/// What a lock key holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockEntry {
    Live(LockRecord),
    /// A completed lock whose body was pruned. The id stays reserved.
    Pruned { kind: LockKind, id: LockId },
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredLock {
    #[serde(rename = "v")]
    version: u16,
    #[serde(rename = "1")]
    kind: LockKind,
    #[serde(rename = "2")]
    id: String,
    #[serde(rename = "3", default, skip_serializing_if = "Option::is_none")]
    owner: Option<String>,
    #[serde(rename = "4", default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(rename = "5", default, skip_serializing_if = "Option::is_none")]
    init_amount: Option<String>,
    #[serde(rename = "6", default, skip_serializing_if = "Option::is_none")]
    current_amount: Option<String>,
    #[serde(rename = "7", default)]
    reason: String,
    #[serde(rename = "8", default)]
    docs: Vec<String>,
    #[serde(rename = "9", default)]
    payload: String,
    #[serde(rename = "10", default, skip_serializing_if = "std::ops::Not::not")]
    pruned: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredRate {
    #[serde(rename = "v")]
    version: u16,
    #[serde(rename = "1")]
    min: String,
    #[serde(rename = "2")]
    max: String,
    #[serde(rename = "3")]
    rate: String,
    #[serde(rename = "4", default)]
    rate_decimals: u32,
}

fn check_version(version: u16) -> Result<()> {
    if version == 0 || version > SCHEMA_VERSION {
        return Err(TokenlockError::Serialization(format!(
            "unsupported schema version {version} (supported 1..={SCHEMA_VERSION})"
        )));
    }
    Ok(())
}

fn amount_to_hex(amount: &Amount) -> String {
    hex::encode(amount.to_be_bytes())
}

fn amount_from_hex(field: &str, s: &str) -> Result<Amount> {
    let bytes = hex::decode(s)
        .map_err(|e| TokenlockError::ArithmeticError(format!("field {field}: {e}")))?;
    Amount::from_be_bytes(&bytes)
}

fn required<T>(field: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| TokenlockError::Serialization(format!("missing field {field}")))
}

/// Raw balance value: canonical big-endian bytes, no envelope.
#[must_use]
pub fn encode_amount(amount: &Amount) -> Vec<u8> {
    amount.to_be_bytes()
}

pub fn decode_amount(bytes: &[u8]) -> Result<Amount> {
    Amount::from_be_bytes(bytes)
}

pub fn encode_lock(record: &LockRecord) -> Result<Vec<u8>> {
    let stored = StoredLock {
        version: SCHEMA_VERSION,
        kind: record.kind,
        id: record.id.to_string(),
        owner: Some(record.owner.to_string()),
        token: Some(record.token.to_string()),
        init_amount: Some(amount_to_hex(&record.init_amount)),
        current_amount: Some(amount_to_hex(&record.current_amount)),
        reason: record.reason.clone(),
        docs: record.docs.clone(),
        payload: hex::encode(&record.payload),
        pruned: false,
    };
    Ok(serde_json::to_vec(&stored)?)
}

pub fn encode_tombstone(kind: LockKind, id: &LockId) -> Result<Vec<u8>> {
    let stored = StoredLock {
        version: SCHEMA_VERSION,
        kind,
        id: id.to_string(),
        owner: None,
        token: None,
        init_amount: None,
        current_amount: None,
        reason: String::new(),
        docs: Vec::new(),
        payload: String::new(),
        pruned: true,
    };
    Ok(serde_json::to_vec(&stored)?)
}

/// Decode a lock key's value.
///
/// # Errors
/// - `Serialization` for malformed JSON, unknown schema versions or missing fields
/// - `ArithmeticError` for corrupt amount bytes or `current_amount > init_amount`
pub fn decode_lock(bytes: &[u8]) -> Result<LockEntry> {
    let stored: StoredLock = serde_json::from_slice(bytes)?;
    check_version(stored.version)?;

    let id = LockId::new(stored.id);
    if stored.pruned {
        return Ok(LockEntry::Pruned {
            kind: stored.kind,
            id,
        });
    }

    let init_amount = amount_from_hex("5", &required("5", stored.init_amount)?)?;
    let current_amount = amount_from_hex("6", &required("6", stored.current_amount)?)?;
    if current_amount > init_amount {
        return Err(TokenlockError::ArithmeticError(format!(
            "lock {id}: current amount {current_amount} exceeds initial amount {init_amount}"
        )));
    }
    let payload = hex::decode(&stored.payload)
        .map_err(|e| TokenlockError::Serialization(format!("field 9: {e}")))?;

    Ok(LockEntry::Live(LockRecord {
        kind: stored.kind,
        id,
        owner: Address::new(required("3", stored.owner)?),
        token: Token::new(required("4", stored.token)?),
        init_amount,
        current_amount,
        reason: stored.reason,
        docs: stored.docs,
        payload,
    }))
}

pub fn encode_rate(rate: &RateRecord) -> Result<Vec<u8>> {
    let stored = StoredRate {
        version: SCHEMA_VERSION,
        min: amount_to_hex(&rate.min),
        max: amount_to_hex(&rate.max),
        rate: amount_to_hex(&rate.rate),
        rate_decimals: rate.rate_decimals,
    };
    Ok(serde_json::to_vec(&stored)?)
}

pub fn decode_rate(bytes: &[u8]) -> Result<RateRecord> {
    let stored: StoredRate = serde_json::from_slice(bytes)?;
    check_version(stored.version)?;
    Ok(RateRecord {
        min: amount_from_hex("1", &stored.min)?,
        max: amount_from_hex("2", &stored.max)?,
        rate: amount_from_hex("3", &stored.rate)?,
        rate_decimals: stored.rate_decimals,
    })
}
