//! Per-chain strategy table.
//!
//! Everything that differs between deployments (reference currency, router
//! addresses, LP fee, explorer, screener slug) lives in one [`ChainProfile`]
//! resolved once per request instead of branching on chain id inline.

use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;

use crate::utils::normalize_address;

/// Currency the subgraph prices tokens in (`derivedETH` / `derivedBNB`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceCurrency {
    Eth,
    Bnb,
}

impl ReferenceCurrency {
    /// Native label shown for native currencies ("ETH", "BNB").
    pub fn label(&self) -> &'static str {
        match self {
            ReferenceCurrency::Eth => "ETH",
            ReferenceCurrency::Bnb => "BNB",
        }
    }

    /// Symbol of the wrapped native token ("WETH", "WBNB").
    pub fn wrapped_symbol(&self) -> &'static str {
        match self {
            ReferenceCurrency::Eth => "WETH",
            ReferenceCurrency::Bnb => "WBNB",
        }
    }

    /// Field of the subgraph `Bundle` entity holding the USD price.
    pub fn bundle_price_field(&self) -> &'static str {
        match self {
            ReferenceCurrency::Eth => "ethPrice",
            ReferenceCurrency::Bnb => "bnbPrice",
        }
    }
}

/// Etherscan-compatible API family serving a chain's transfer history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExplorerApi {
    Etherscan,
    BscScan,
}

/// Static facts about one supported chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainProfile {
    pub chain_id: u64,
    pub name: &'static str,
    pub reference: ReferenceCurrency,
    pub wrapped_native: &'static str,
    /// Routers a user's sell swaps are sent to
    pub sell_routers: &'static [&'static str],
    /// Liquidity provider fee per hop, in basis points
    pub lp_fee_bps: u32,
    pub explorer_host: &'static str,
    /// `None` where no explorer API is configured
    pub explorer_api: Option<ExplorerApi>,
    /// Ethplorer indexes the chain (holder counts)
    pub ethplorer: bool,
    pub screener_network: &'static str,
    pub project_token: Option<&'static str>,
    pub project_pair: Option<&'static str>,
}

pub static MAINNET: ChainProfile = ChainProfile {
    chain_id: 1,
    name: "Ethereum",
    reference: ReferenceCurrency::Eth,
    wrapped_native: "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
    sell_routers: &[
        "0x7a250d5630b4cf539739df2c5dacb4c659f2488d",
        "0x25553828f22bdd19a20e4f12f052903cb474a335",
    ],
    lp_fee_bps: 30,
    explorer_host: "etherscan.io",
    explorer_api: Some(ExplorerApi::Etherscan),
    ethplorer: true,
    screener_network: "ethereum",
    project_token: Some("0x005d1123878fc55fbd56b54c73963b234a64af3c"),
    project_pair: Some("0xac6776d1c8d455ad282c76eb4c2ade2b07170104"),
};

pub static BSC: ChainProfile = ChainProfile {
    chain_id: 56,
    name: "BNB Smart Chain",
    reference: ReferenceCurrency::Bnb,
    wrapped_native: "0xbb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c",
    sell_routers: &["0x10ed43c718714eb63d5aa57b78b54704e256024e"],
    lp_fee_bps: 25,
    explorer_host: "bscscan.com",
    explorer_api: Some(ExplorerApi::BscScan),
    ethplorer: false,
    screener_network: "bsc",
    project_token: Some("0xc3afde95b6eb9ba8553cdaea6645d45fb3a7faf5"),
    project_pair: Some("0x89e8c0ead11b783055282c9acebbaf2fe95d1180"),
};

pub static ARBITRUM: ChainProfile = ChainProfile {
    chain_id: 42161,
    name: "Arbitrum One",
    reference: ReferenceCurrency::Eth,
    wrapped_native: "0x82af49447d8a07e3bd95bd0d56f35241523fbab1",
    sell_routers: &[],
    lp_fee_bps: 30,
    explorer_host: "arbiscan.io",
    explorer_api: None,
    ethplorer: false,
    screener_network: "arbitrum",
    project_token: None,
    project_pair: None,
};

static PROFILES: [&ChainProfile; 3] = [&MAINNET, &BSC, &ARBITRUM];

impl ChainProfile {
    /// Looks up a chain. A missing chain id (no wallet connected) means mainnet.
    pub fn resolve(chain_id: Option<u64>) -> Option<&'static ChainProfile> {
        match chain_id {
            None => Some(&MAINNET),
            Some(id) => PROFILES.iter().copied().find(|p| p.chain_id == id),
        }
    }

    pub fn all() -> impl Iterator<Item = &'static ChainProfile> {
        PROFILES.iter().copied()
    }

    pub fn is_wrapped_native(&self, token: &str) -> bool {
        self.wrapped_native.eq_ignore_ascii_case(token.trim())
    }

    /// Router and pair contracts that sit between a trader and the pool.
    pub fn infrastructure(&self) -> impl Iterator<Item = &'static str> {
        self.sell_routers
            .iter()
            .copied()
            .chain(self.project_pair)
    }

}

static ALL_INFRASTRUCTURE: Lazy<FxHashSet<String>> = Lazy::new(|| {
    ChainProfile::all()
        .flat_map(|p| p.infrastructure())
        .map(normalize_address)
        .collect()
});

/// Addresses that never represent the trader in a swap's `to` field.
#[derive(Debug, Clone)]
pub struct KnownAddresses {
    addresses: FxHashSet<String>,
}

impl KnownAddresses {
    /// Routers and project pairs of every supported chain.
    pub fn all() -> Self {
        Self {
            addresses: ALL_INFRASTRUCTURE.clone(),
        }
    }

    pub fn from_addresses<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            addresses: addresses
                .into_iter()
                .map(|a| normalize_address(a.as_ref()))
                .collect(),
        }
    }

    pub fn contains(&self, address: &str) -> bool {
        self.addresses.contains(&normalize_address(address))
    }
}

impl Default for KnownAddresses {
    fn default() -> Self {
        Self::all()
    }
}
