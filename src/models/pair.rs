use serde::{Deserialize, Serialize};

use crate::utils::de_opt_u64;

/// Token side of a pair as returned inside pair/swap sub-selections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairToken {
    pub id: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub decimals: Option<u64>,
}

/// Pair the token participates in (`pairs0`/`pairs1` of the token query).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub token0: Option<PairToken>,
    #[serde(default)]
    pub token1: Option<PairToken>,
}

impl PairRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}
