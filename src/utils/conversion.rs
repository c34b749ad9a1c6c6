//! Address and numeric conversions.
//!
//! Subgraphs serialise `BigDecimal`/`BigInt` fields as JSON strings while
//! REST APIs mix strings, numbers and `null`. Everything funnels through
//! [`parse_decimal`] so a malformed value degrades to `None` instead of an error.

use alloy::primitives::Address;
use bigdecimal::BigDecimal;
use num_traits::ToPrimitive;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

// ============================================
// Addresses
// ============================================

/// EIP-55 checksummed form of an address, `None` for empty or invalid input.
pub fn to_checksum(address: &str) -> Option<String> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return None;
    }
    Address::from_str(trimmed)
        .ok()
        .map(|parsed| parsed.to_checksum(None))
}

/// Lowercase form used for subgraph entity ids.
pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

/// Case-insensitive address comparison.
#[inline]
pub fn same_address(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

// ============================================
// Numbers
// ============================================

/// Parse a decimal string (e.g. a subgraph `BigDecimal`) into a finite f64.
///
/// Goes through BigDecimal so very long mantissas are rounded once instead of
/// being rejected by `f64::from_str`.
pub fn parse_decimal(value: &str) -> Option<f64> {
    let big = BigDecimal::from_str(value.trim()).ok()?;
    let result = big.to_f64()?;

    if result.is_finite() {
        Some(result)
    } else {
        None
    }
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
}

fn value_to_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

// ============================================
// Serde helpers
// ============================================

/// Deserialize a string-or-number field into `Option<f64>`.
///
/// Use with `#[serde(default, deserialize_with = "de_opt_decimal")]`.
pub fn de_opt_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_f64))
}

/// Like [`de_opt_decimal`] but missing or malformed values become `0.0`.
pub fn de_decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(de_opt_decimal(deserializer)?.unwrap_or(0.0))
}

/// Deserialize a string-or-number integer field (timestamps, counts).
pub fn de_opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_u64))
}
