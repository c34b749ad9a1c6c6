use serde::{Deserialize, Serialize};

use crate::utils::{de_decimal, de_opt_u64};

use super::PairToken;

/// Transaction sub-object of a swap/mint/burn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionRef {
    pub id: String,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub timestamp: Option<u64>,
}

/// Pair sub-object of a swap. Some queries omit the pair id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwapPair {
    #[serde(default)]
    pub id: Option<String>,
    pub token0: PairToken,
    pub token1: PairToken,
}

/// Swap entity as returned by the subgraph.
///
/// `pair` and `transaction` are optional because partial records do occur;
/// the aggregator drops them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSwap {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub transaction: Option<TransactionRef>,
    #[serde(default)]
    pub pair: Option<SwapPair>,
    #[serde(default, deserialize_with = "de_decimal")]
    pub amount0_in: f64,
    #[serde(default, deserialize_with = "de_decimal")]
    pub amount0_out: f64,
    #[serde(default, deserialize_with = "de_decimal")]
    pub amount1_in: f64,
    #[serde(default, deserialize_with = "de_decimal")]
    pub amount1_out: f64,
    #[serde(default, rename = "amountUSD", deserialize_with = "de_decimal")]
    pub amount_usd: f64,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub timestamp: Option<u64>,
}

impl RawSwap {
    /// Hash of the transaction that emitted this swap.
    pub fn tx_id(&self) -> Option<&str> {
        self.transaction.as_ref().map(|t| t.id.as_str())
    }

    /// Transaction timestamp, falling back to the swap's own timestamp.
    pub fn tx_timestamp(&self) -> u64 {
        self.transaction
            .as_ref()
            .and_then(|t| t.timestamp)
            .or(self.timestamp)
            .unwrap_or(0)
    }

    /// Both `pair` and `transaction` are present.
    pub fn is_complete(&self) -> bool {
        self.pair.is_some() && self.transaction.is_some()
    }
}

/// Mint or burn entity from the transactions queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLiquidityEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub transaction: Option<TransactionRef>,
    #[serde(default)]
    pub pair: Option<SwapPair>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default, deserialize_with = "de_decimal")]
    pub liquidity: f64,
    #[serde(default, deserialize_with = "de_decimal")]
    pub amount0: f64,
    #[serde(default, deserialize_with = "de_decimal")]
    pub amount1: f64,
    #[serde(default, rename = "amountUSD", deserialize_with = "de_decimal")]
    pub amount_usd: f64,
}

impl RawLiquidityEvent {
    pub fn tx_id(&self) -> Option<&str> {
        self.transaction.as_ref().map(|t| t.id.as_str())
    }
}

/// `{ mints, burns, swaps }` selection shared by the account and pair queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionsResult {
    #[serde(default)]
    pub mints: Vec<RawLiquidityEvent>,
    #[serde(default)]
    pub burns: Vec<RawLiquidityEvent>,
    #[serde(default)]
    pub swaps: Vec<RawSwap>,
}

/// One side of a classified swap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenLeg {
    pub symbol: String,
    pub amount: f64,
}

/// Swap after de-duplication and direction classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwapEvent {
    pub hash: String,
    pub pair_id: Option<String>,
    pub timestamp: u64,
    /// Token whose net flow (in - out) on the pool is negative
    pub sold: Option<TokenLeg>,
    /// The opposite token of the pair
    pub bought: Option<TokenLeg>,
    pub amount_usd: f64,
    pub from: String,
    pub to: String,
    pub sender: String,
    /// Trader the swap is attributed to
    pub account: String,
    /// Number of aggregated swaps attributed to the same account
    pub count: usize,
}

impl SwapEvent {
    /// The pool handed out the wrapped native token, i.e. the trader sold.
    pub fn is_sell(&self, wrapped_symbol: &str) -> bool {
        self.sold
            .as_ref()
            .map(|leg| leg.symbol == wrapped_symbol)
            .unwrap_or(false)
    }
}
