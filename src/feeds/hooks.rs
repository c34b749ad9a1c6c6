//! Typed feeds for each view of the frontend.
//!
//! Every constructor builds a [`Feed`], starts it and hands it back. The
//! sources are shared behind `Arc` and each tick clones what it needs, so a
//! slow upstream never blocks another feed.

use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::{watch, OnceCell};
use tokio_util::sync::CancellationToken;

use crate::{
    analytics::{
        aggregate_swaps, classify_swaps, fetch_reference_prices, fetch_token_snapshot,
        holder_gains, reflection_summary, trader_summary, HolderContext, HolderGains,
        ReferencePrices, ReflectionSummary, TraderSummary,
    },
    chains::{ChainProfile, KnownAddresses},
    models::{
        scale_raw, RawSwap, ScreenerPair, SwapEvent, TokenInfo, TokenSnapshot, TransactionsResult,
    },
    sources::{MarketSource, SubgraphSource},
};

use super::{
    feed::Feed,
    state::{FeedState, Merge},
};

/// Token snapshot, refreshed every tick.
///
/// The reference prices are fetched once, on the first tick where both the
/// current and the -24h price are available, and reused afterwards.
pub fn token_data_feed<S>(
    source: Arc<S>,
    chain: &'static ChainProfile,
    address: String,
    interval: Duration,
    parent: &CancellationToken,
) -> Feed<TokenSnapshot>
where
    S: SubgraphSource + 'static,
{
    let feed = Feed::new(format!("token:{}", address), interval, parent);
    let prices: Arc<OnceCell<ReferencePrices>> = Arc::new(OnceCell::new());

    feed.start(move || {
        let source = source.clone();
        let prices = prices.clone();
        let address = address.clone();
        async move {
            let prices = *prices
                .get_or_try_init(|| async {
                    let fetched = fetch_reference_prices(&*source, chain, Utc::now()).await;
                    if fetched.is_ready() {
                        Ok(fetched)
                    } else {
                        Err(anyhow!("{} price not available yet", chain.reference.label()))
                    }
                })
                .await?;

            fetch_token_snapshot(&*source, chain, &address, prices, None)
                .await?
                .ok_or_else(|| anyhow!("Token {} is not indexed on {}", address, chain.name))
        }
    });

    feed
}

/// Swaps the account routed through the sell routers.
pub fn user_sells_feed<S>(
    source: Arc<S>,
    chain: &'static ChainProfile,
    account: String,
    interval: Duration,
    parent: &CancellationToken,
) -> Feed<Vec<RawSwap>>
where
    S: SubgraphSource + 'static,
{
    let feed = Feed::new(format!("sells:{}", account), interval, parent);

    feed.start(move || {
        let source = source.clone();
        let account = account.clone();
        async move { source.account_sells(chain, &account).await }
    });

    feed
}

/// Account activity: aggregated swaps, their classification and totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserTransactions {
    /// Mints, burns and the de-duplicated swap list
    pub transactions: TransactionsResult,
    pub events: Vec<SwapEvent>,
    pub summary: TraderSummary,
}

impl Merge for UserTransactions {
    fn merge(&self, incoming: &Self) -> Self {
        incoming.clone()
    }
}

/// Builds the account view from the general query and the latest sells.
pub fn user_transactions(
    general: TransactionsResult,
    sells: &[RawSwap],
    chain: &ChainProfile,
    account: &str,
    known: &KnownAddresses,
) -> UserTransactions {
    let swaps = aggregate_swaps(sells, &general.swaps);
    let events = classify_swaps(&swaps, known);
    let summary = trader_summary(&events, account, chain.reference.wrapped_symbol());

    UserTransactions {
        transactions: TransactionsResult { swaps, ..general },
        events,
        summary,
    }
}

/// Account activity on the faster interval, combined with whatever the
/// slower sells feed last published.
pub fn user_transactions_feed<S>(
    source: Arc<S>,
    chain: &'static ChainProfile,
    account: String,
    sells: watch::Receiver<FeedState<Vec<RawSwap>>>,
    known: KnownAddresses,
    interval: Duration,
    parent: &CancellationToken,
) -> Feed<UserTransactions>
where
    S: SubgraphSource + 'static,
{
    let feed = Feed::new(format!("transactions:{}", account), interval, parent);
    let known = Arc::new(known);

    feed.start(move || {
        let source = source.clone();
        let account = account.clone();
        let known = known.clone();
        let sells = sells.borrow().data.clone().unwrap_or_default();
        async move {
            let general = source.account_transactions(chain, &account).await?;
            Ok(user_transactions(general, &sells, chain, &account, &known))
        }
    });

    feed
}

/// Reflection totals of one holder for one token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HolderReflections {
    /// Decimal-adjusted balance
    pub balance: f64,
    pub reflections: ReflectionSummary,
    /// `None` for an empty balance
    pub gains: Option<HolderGains>,
}

impl Merge for HolderReflections {
    fn merge(&self, incoming: &Self) -> Self {
        incoming.clone()
    }
}

/// Reflections earned by `account` on `token`, traded on `pair`.
///
/// Each tick polls the explorer for transfers and the current balance and
/// joins them with the swaps the transactions feed last published.
#[allow(clippy::too_many_arguments)]
pub fn holder_gains_feed<M>(
    market: Arc<M>,
    chain: &'static ChainProfile,
    account: String,
    token: String,
    pair: String,
    transactions: watch::Receiver<FeedState<UserTransactions>>,
    interval: Duration,
    parent: &CancellationToken,
) -> Feed<HolderReflections>
where
    M: MarketSource + 'static,
{
    let feed = Feed::new(format!("gains:{}:{}", account, token), interval, parent);

    feed.start(move || {
        let market = market.clone();
        let account = account.clone();
        let token = token.clone();
        let pair = pair.clone();
        let swaps = transactions
            .borrow()
            .data
            .as_ref()
            .map(|data| data.transactions.swaps.clone());
        async move {
            let swaps = swaps.context("Account transactions not loaded yet")?;

            let (transfers, raw_balance) = futures::try_join!(
                market.token_transfers(chain, &token, &account),
                market.token_balance(chain, &token, &account),
            )?;

            let decimals = transfers.iter().find_map(|t| t.token_decimal);
            let balance = scale_raw(raw_balance.unwrap_or_default(), decimals);

            let ctx = HolderContext {
                account: &account,
                token: &token,
                wrapped_native: chain.wrapped_native,
                pair: &pair,
            };

            Ok(HolderReflections {
                balance,
                reflections: reflection_summary(&swaps, &token, chain.wrapped_native, balance),
                gains: holder_gains(&swaps, &transfers, ctx, balance),
            })
        }
    });

    feed
}

/// Latest transactions across a token's pairs, merged into what is already known.
pub fn pair_transactions_feed<S>(
    source: Arc<S>,
    chain: &'static ChainProfile,
    pairs: Vec<String>,
    interval: Duration,
    parent: &CancellationToken,
) -> Feed<TransactionsResult>
where
    S: SubgraphSource + 'static,
{
    let feed = Feed::new(format!("pairs:{}", pairs.join(",")), interval, parent);
    let pairs = Arc::new(pairs);

    feed.start_merging(move || {
        let source = source.clone();
        let pairs = pairs.clone();
        async move { source.pair_transactions(chain, &pairs).await }
    });

    feed
}

/// Dexscreener pair of a token.
pub fn screener_feed<M>(
    market: Arc<M>,
    address: String,
    interval: Duration,
    parent: &CancellationToken,
) -> Feed<ScreenerPair>
where
    M: MarketSource + 'static,
{
    let feed = Feed::new(format!("screener:{}", address), interval, parent);

    feed.start(move || {
        let market = market.clone();
        let address = address.clone();
        async move {
            market
                .screener_token(&address)
                .await?
                .with_context(|| format!("Dexscreener has no pair for {}", address))
        }
    });

    feed
}

/// Token info with holder count.
pub fn holders_feed<M>(
    market: Arc<M>,
    chain: &'static ChainProfile,
    address: String,
    interval: Duration,
    parent: &CancellationToken,
) -> Feed<TokenInfo>
where
    M: MarketSource + 'static,
{
    let feed = Feed::new(format!("holders:{}", address), interval, parent);

    feed.start(move || {
        let market = market.clone();
        let address = address.clone();
        async move {
            market
                .token_info(chain, &address)
                .await?
                .with_context(|| format!("No holder data for {} on {}", address, chain.name))
        }
    });

    feed
}
