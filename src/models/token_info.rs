use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::utils::{de_opt_decimal, de_opt_u64, NOT_AVAILABLE};

/// `price` block of an Ethplorer token info response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceInfo {
    #[serde(default, deserialize_with = "de_opt_decimal")]
    pub rate: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_decimal")]
    pub diff: Option<f64>,
    #[serde(default, rename = "diff7d", deserialize_with = "de_opt_decimal")]
    pub diff_7d: Option<f64>,
    #[serde(default, rename = "diff30d", deserialize_with = "de_opt_decimal")]
    pub diff_30d: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_decimal")]
    pub market_cap_usd: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_decimal")]
    pub available_supply: Option<f64>,
    #[serde(default, rename = "volume24h", deserialize_with = "de_opt_decimal")]
    pub volume_24h: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub ts: Option<u64>,
}

/// Ethplorer reports an unpriced token as `"price": false`.
fn de_price<'de, D>(deserializer: D) -> Result<Option<PriceInfo>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(object @ Value::Object(_)) => serde_json::from_value(object).ok(),
        _ => None,
    })
}

/// Token info from the Ethplorer `getTokenInfo` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub decimals: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_decimal")]
    pub total_supply: Option<f64>,
    #[serde(default, deserialize_with = "de_price")]
    pub price: Option<PriceInfo>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub holders_count: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub transfers_count: Option<u64>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl TokenInfo {
    /// Holder count only, for chains where just that number is known.
    pub fn with_holders(address: impl Into<String>, holders_count: u64) -> Self {
        Self {
            address: address.into(),
            holders_count: Some(holders_count),
            ..Default::default()
        }
    }

    pub fn price_rate(&self) -> Option<f64> {
        self.price.as_ref().and_then(|p| p.rate)
    }

    pub fn display_holders(&self) -> String {
        self.holders_count
            .map(|count| count.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}
