use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{de_opt_decimal, de_opt_u64};

use super::PairRef;

/// Token entity as the exchange subgraph reports it at one block.
///
/// Every numeric field is optional: BSC deployments omit `txCount`, and
/// historical queries for young tokens return no record at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub decimals: Option<u64>,
    /// Price in the chain's reference currency (`derivedETH` / `derivedBNB`)
    #[serde(
        default,
        rename = "derivedETH",
        alias = "derivedBNB",
        deserialize_with = "de_opt_decimal"
    )]
    pub derived_native: Option<f64>,
    #[serde(default, rename = "derivedUSD", deserialize_with = "de_opt_decimal")]
    pub derived_usd: Option<f64>,
    #[serde(default, rename = "tradeVolume", deserialize_with = "de_opt_decimal")]
    pub trade_volume: Option<f64>,
    #[serde(default, rename = "tradeVolumeUSD", deserialize_with = "de_opt_decimal")]
    pub trade_volume_usd: Option<f64>,
    #[serde(default, rename = "untrackedVolumeUSD", deserialize_with = "de_opt_decimal")]
    pub untracked_volume_usd: Option<f64>,
    #[serde(default, rename = "totalLiquidity", deserialize_with = "de_opt_decimal")]
    pub total_liquidity: Option<f64>,
    #[serde(default, rename = "txCount", deserialize_with = "de_opt_decimal")]
    pub tx_count: Option<f64>,
}

/// Result of one token query: the token plus the pairs it sits in as
/// token0 (`pairs0`) and as token1 (`pairs1`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TokenQueryResult {
    #[serde(default)]
    pub tokens: Vec<TokenRecord>,
    #[serde(default)]
    pub pairs0: Option<Vec<PairRef>>,
    #[serde(default)]
    pub pairs1: Option<Vec<PairRef>>,
}

impl TokenQueryResult {
    pub fn token(&self) -> Option<&TokenRecord> {
        self.tokens.first()
    }
}

/// Enriched token view model built from the current, -24h and -48h records.
///
/// Immutable: each poll produces a new snapshot instead of patching the old one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenSnapshot {
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub decimals: Option<u64>,

    // Price
    pub price_usd: f64,
    pub price_change_usd: f64,

    // Liquidity
    pub total_liquidity_usd: f64,
    pub liquidity_change_usd: f64,

    // Volume
    pub one_day_volume_usd: f64,
    pub volume_change_usd: f64,
    pub one_day_volume_ut: f64,
    pub volume_change_ut: f64,
    /// Only set for tokens with no record 24h ago
    pub one_day_volume_native: Option<f64>,

    // Activity
    pub tx_count: f64,
    pub one_day_txns: f64,
    pub txn_change: f64,

    pub pairs: Vec<PairRef>,
    pub fetched_at: DateTime<Utc>,
}

impl TokenSnapshot {
    /// True when the token had no record 24h ago.
    pub fn is_new(&self) -> bool {
        self.one_day_volume_native.is_some()
    }
}
