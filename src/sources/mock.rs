//! In-memory sources for tests.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use anyhow::{bail, Result};
use rustc_hash::FxHashMap;

use crate::{
    chains::ChainProfile,
    models::{BlockRef, RawSwap, ScreenerPair, TokenInfo, TokenQueryResult, TokenTransfer, TransactionsResult},
};

use super::{MarketSource, SubgraphSource};

#[derive(Default)]
pub struct MockSubgraph {
    tokens: FxHashMap<(String, Option<u64>), TokenQueryResult>,
    prices: FxHashMap<Option<u64>, f64>,
    block: Option<BlockRef>,
    pair_transactions: TransactionsResult,
    account_transactions: TransactionsResult,
    sells: Vec<RawSwap>,
    fail: bool,
    pub calls: Arc<AtomicUsize>,
}

impl MockSubgraph {
    pub fn with_token(mut self, address: &str, block: Option<u64>, result: TokenQueryResult) -> Self {
        self.tokens.insert((address.to_lowercase(), block), result);
        self
    }

    pub fn with_price(mut self, block: Option<u64>, price: f64) -> Self {
        self.prices.insert(block, price);
        self
    }

    pub fn with_block(mut self, block: BlockRef) -> Self {
        self.block = Some(block);
        self
    }

    pub fn with_account_transactions(mut self, result: TransactionsResult) -> Self {
        self.account_transactions = result;
        self
    }

    pub fn with_sells(mut self, sells: Vec<RawSwap>) -> Self {
        self.sells = sells;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    async fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            bail!("subgraph unavailable");
        }
        Ok(())
    }
}

impl SubgraphSource for MockSubgraph {
    async fn token(&self, _chain: &ChainProfile, address: &str, block: Option<u64>) -> Result<TokenQueryResult> {
        self.enter().await?;
        Ok(self
            .tokens
            .get(&(address.to_lowercase(), block))
            .cloned()
            .unwrap_or_default())
    }

    async fn reference_price(&self, _chain: &ChainProfile, block: Option<u64>) -> Result<Option<f64>> {
        self.enter().await?;
        Ok(self.prices.get(&block).copied())
    }

    async fn block_at(&self, _chain: &ChainProfile, _timestamp: i64) -> Result<Option<BlockRef>> {
        self.enter().await?;
        Ok(self.block)
    }

    async fn pair_transactions(&self, _chain: &ChainProfile, _pairs: &[String]) -> Result<TransactionsResult> {
        self.enter().await?;
        Ok(self.pair_transactions.clone())
    }

    async fn account_transactions(&self, _chain: &ChainProfile, _account: &str) -> Result<TransactionsResult> {
        self.enter().await?;
        Ok(self.account_transactions.clone())
    }

    async fn account_sells(&self, _chain: &ChainProfile, _account: &str) -> Result<Vec<RawSwap>> {
        self.enter().await?;
        Ok(self.sells.clone())
    }
}

#[derive(Default)]
pub struct MockMarket {
    pub pair: Option<ScreenerPair>,
    pub pairs: Vec<ScreenerPair>,
    pub info: Option<TokenInfo>,
    pub transfers: Vec<TokenTransfer>,
    pub balance: Option<f64>,
    pub calls: Arc<AtomicUsize>,
}

impl MarketSource for MockMarket {
    async fn screener_token(&self, _address: &str) -> Result<Option<ScreenerPair>> {
        Ok(self.pair.clone())
    }

    async fn screener_tokens(&self, _addresses: &[String]) -> Result<Vec<ScreenerPair>> {
        Ok(self.pairs.clone())
    }

    async fn screener_pair(&self, _chain: &ChainProfile, _pair: &str) -> Result<Option<ScreenerPair>> {
        Ok(self.pair.clone())
    }

    async fn token_info(&self, _chain: &ChainProfile, _address: &str) -> Result<Option<TokenInfo>> {
        Ok(self.info.clone())
    }

    async fn token_balance(&self, _chain: &ChainProfile, _contract: &str, _account: &str) -> Result<Option<f64>> {
        Ok(self.balance)
    }

    async fn token_transfers(
        &self,
        _chain: &ChainProfile,
        _contract: &str,
        _account: &str,
    ) -> Result<Vec<TokenTransfer>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.transfers.clone())
    }
}
