//! Data access.
//!
//! Aggregation code depends on the [`SubgraphSource`] and [`MarketSource`]
//! traits rather than on concrete clients, so tests substitute in-memory
//! doubles and the binary plugs in the HTTP clients.

mod graphql;
mod queries;
mod rest;
mod subgraph;

#[cfg(test)]
pub(crate) mod mock;

use std::future::Future;

use anyhow::Result;

use crate::{
    chains::ChainProfile,
    models::{BlockRef, RawSwap, ScreenerPair, TokenInfo, TokenQueryResult, TokenTransfer, TransactionsResult},
};

pub use graphql::GraphqlClient;
pub use rest::RestClient;
pub use subgraph::SubgraphClient;

/// Exchange and blocks subgraphs of the supported chains.
pub trait SubgraphSource: Send + Sync {
    /// Token record and its pairs at `block`, or the latest state when `None`.
    fn token(
        &self,
        chain: &ChainProfile,
        address: &str,
        block: Option<u64>,
    ) -> impl Future<Output = Result<TokenQueryResult>> + Send;

    /// USD price of the chain's reference currency.
    fn reference_price(
        &self,
        chain: &ChainProfile,
        block: Option<u64>,
    ) -> impl Future<Output = Result<Option<f64>>> + Send;

    /// First block produced after `timestamp` (within ten minutes).
    fn block_at(
        &self,
        chain: &ChainProfile,
        timestamp: i64,
    ) -> impl Future<Output = Result<Option<BlockRef>>> + Send;

    fn pair_transactions(
        &self,
        chain: &ChainProfile,
        pairs: &[String],
    ) -> impl Future<Output = Result<TransactionsResult>> + Send;

    fn account_transactions(
        &self,
        chain: &ChainProfile,
        account: &str,
    ) -> impl Future<Output = Result<TransactionsResult>> + Send;

    /// Swaps the account routed through the chain's sell routers.
    fn account_sells(
        &self,
        chain: &ChainProfile,
        account: &str,
    ) -> impl Future<Output = Result<Vec<RawSwap>>> + Send;
}

/// REST market data: Dexscreener, Ethplorer and Etherscan-compatible explorers.
pub trait MarketSource: Send + Sync {
    /// Most relevant Dexscreener pair of a token.
    fn screener_token(&self, address: &str) -> impl Future<Output = Result<Option<ScreenerPair>>> + Send;

    /// Every Dexscreener pair of the given tokens.
    fn screener_tokens(&self, addresses: &[String]) -> impl Future<Output = Result<Vec<ScreenerPair>>> + Send;

    fn screener_pair(
        &self,
        chain: &ChainProfile,
        pair: &str,
    ) -> impl Future<Output = Result<Option<ScreenerPair>>> + Send;

    /// Token info with holder count. `None` where no provider covers the chain.
    fn token_info(
        &self,
        chain: &ChainProfile,
        address: &str,
    ) -> impl Future<Output = Result<Option<TokenInfo>>> + Send;

    /// Raw (undivided) balance of `contract` held by `account`. `None` where
    /// no explorer covers the chain or the explorer returned an error.
    fn token_balance(
        &self,
        chain: &ChainProfile,
        contract: &str,
        account: &str,
    ) -> impl Future<Output = Result<Option<f64>>> + Send;

    /// ERC-20 transfers of `contract` involving `account`, oldest first.
    fn token_transfers(
        &self,
        chain: &ChainProfile,
        contract: &str,
        account: &str,
    ) -> impl Future<Output = Result<Vec<TokenTransfer>>> + Send;
}
