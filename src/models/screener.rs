use serde::{Deserialize, Serialize};

use crate::utils::{parse_decimal, NOT_AVAILABLE};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenerToken {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TxnCounts {
    #[serde(default)]
    pub buys: u64,
    #[serde(default)]
    pub sells: u64,
}

/// Rolling windows Dexscreener reports for counts, volume and price change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenerWindows<T> {
    #[serde(default)]
    pub m5: Option<T>,
    #[serde(default)]
    pub h1: Option<T>,
    #[serde(default)]
    pub h6: Option<T>,
    #[serde(default)]
    pub h24: Option<T>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenerLiquidity {
    #[serde(default)]
    pub usd: Option<f64>,
    #[serde(default)]
    pub base: Option<f64>,
    #[serde(default)]
    pub quote: Option<f64>,
}

/// Pair payload of the Dexscreener `latest/dex` endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenerPair {
    #[serde(default)]
    pub chain_id: String,
    #[serde(default)]
    pub dex_id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub pair_address: String,
    #[serde(default)]
    pub base_token: ScreenerToken,
    #[serde(default)]
    pub quote_token: ScreenerToken,
    #[serde(default)]
    pub price_native: Option<String>,
    #[serde(default)]
    pub price_usd: Option<String>,
    #[serde(default)]
    pub txns: Option<ScreenerWindows<TxnCounts>>,
    #[serde(default)]
    pub volume: Option<ScreenerWindows<f64>>,
    #[serde(default)]
    pub price_change: Option<ScreenerWindows<f64>>,
    #[serde(default)]
    pub liquidity: Option<ScreenerLiquidity>,
    #[serde(default)]
    pub fdv: Option<f64>,
    #[serde(default)]
    pub pair_created_at: Option<u64>,
}

impl ScreenerPair {
    pub fn price_usd_value(&self) -> Option<f64> {
        self.price_usd.as_deref().and_then(parse_decimal)
    }

    /// USD price as reported, or "Not available".
    pub fn display_price(&self) -> String {
        self.price_usd
            .clone()
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    pub fn price_change_24h(&self) -> f64 {
        self.price_change
            .as_ref()
            .and_then(|w| w.h24)
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }
}

/// Response of `latest/dex/tokens/{addresses}` and `latest/dex/pairs/...`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScreenerTokensResponse {
    #[serde(default)]
    pub pairs: Option<Vec<ScreenerPair>>,
    #[serde(default)]
    pub pair: Option<ScreenerPair>,
}

impl ScreenerTokensResponse {
    /// `pair` when present, otherwise the first entry of `pairs`.
    pub fn into_first(self) -> Option<ScreenerPair> {
        match self.pair {
            Some(pair) => Some(pair),
            None => self.pairs.and_then(|pairs| pairs.into_iter().next()),
        }
    }

    pub fn into_pairs(self) -> Vec<ScreenerPair> {
        self.pairs.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_pair_prefers_single_pair_field() {
        let response: ScreenerTokensResponse = serde_json::from_str(
            r#"{"pairs":[{"pairAddress":"0xa","baseToken":{"symbol":"A"}}],"pair":{"pairAddress":"0xb"}}"#,
        )
        .unwrap();
        assert_eq!(response.into_first().map(|p| p.pair_address), Some("0xb".to_string()));

        let response: ScreenerTokensResponse =
            serde_json::from_str(r#"{"pairs":[{"pairAddress":"0xa","priceChange":{"h24":-3.5}}]}"#)
                .unwrap();
        let first = response.into_first().unwrap();
        assert_eq!(first.price_change_24h(), -3.5);
        assert_eq!(first.display_price(), "Not available");
    }

    #[test]
    fn test_empty_response_has_no_pair() {
        let response: ScreenerTokensResponse = serde_json::from_str(r#"{"pairs":null}"#).unwrap();
        assert!(response.into_first().is_none());
    }
}
