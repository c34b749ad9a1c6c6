use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::{de_decimal, de_opt_u64, parse_decimal, same_address};

/// Envelope of Etherscan-compatible APIs; `result` is an array on success
/// and an error string otherwise.
#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransferDirection {
    Incoming,
    Outgoing,
}

/// ERC-20 transfer from the `account/tokentx` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransfer {
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default, deserialize_with = "de_decimal")]
    pub value: f64,
    #[serde(default, rename = "timeStamp", deserialize_with = "de_opt_u64")]
    pub time_stamp: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub token_decimal: Option<u64>,
    #[serde(default)]
    pub contract_address: String,
    #[serde(default)]
    pub token_symbol: Option<String>,
}

/// Decimals assumed when the explorer does not report them.
const DEFAULT_DECIMALS: u64 = 18;

/// Raw token units to a decimal-adjusted amount.
pub fn scale_raw(value: f64, decimals: Option<u64>) -> f64 {
    let decimals = decimals.unwrap_or(DEFAULT_DECIMALS).min(36) as i32;
    value / 10f64.powi(decimals)
}

impl TokenTransfer {
    /// Decimal-adjusted amount. Decimals default to 18 when not reported.
    pub fn amount(&self) -> f64 {
        scale_raw(self.value, self.token_decimal)
    }

    /// Direction relative to `account`, `None` if it is not a party.
    pub fn direction(&self, account: &str) -> Option<TransferDirection> {
        if same_address(&self.to, account) {
            Some(TransferDirection::Incoming)
        } else if same_address(&self.from, account) {
            Some(TransferDirection::Outgoing)
        } else {
            None
        }
    }
}

impl ExplorerResponse {
    /// Transfers in `result`, empty when the API returned an error string.
    pub fn transfers(&self) -> Vec<TokenTransfer> {
        match &self.result {
            Value::Array(_) => serde_json::from_value(self.result.clone()).unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Raw `tokenbalance` result, `None` on an API error.
    pub fn raw_balance(&self) -> Option<f64> {
        match (&self.result, self.status.as_str()) {
            (Value::String(raw), "1") => parse_decimal(raw),
            _ => None,
        }
    }
}
