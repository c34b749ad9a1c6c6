//! Token data mapping.
//!
//! Combines three token query results (now, -24h, -48h) into one
//! [`TokenSnapshot`]. Inputs are borrowed and never modified, so cached query
//! results can be reused across poll ticks.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, error};

use crate::{
    chains::ChainProfile,
    models::{BlockEvent, BlockSlot, BlockState, PairRef, TokenQueryResult, TokenRecord, TokenSnapshot},
    sources::SubgraphSource,
    utils::{delta_timestamps, finite_or_zero, normalize_address, positive_finite},
};

use super::percent::{percent_change, two_day_percent_change};

/// USD price of the chain's reference currency now and 24h ago.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReferencePrices {
    pub current: f64,
    pub one_day: f64,
    /// Percent change between the two
    pub change: f64,
}

impl ReferencePrices {
    pub fn new(current: f64, one_day: f64) -> Self {
        Self {
            current,
            one_day,
            change: percent_change(current, one_day),
        }
    }

    /// Both prices are known and usable for USD conversion.
    pub fn is_ready(&self) -> bool {
        positive_finite(self.current).is_some() && positive_finite(self.one_day).is_some()
    }
}

/// Concatenates the pairs a token is token0 of with the pairs it is token1 of.
pub fn merge_pairs(pairs0: Option<&[PairRef]>, pairs1: Option<&[PairRef]>) -> Vec<PairRef> {
    pairs0
        .unwrap_or_default()
        .iter()
        .chain(pairs1.unwrap_or_default())
        .cloned()
        .collect()
}

/// Value of `field` on `record`, NaN when either is missing.
fn field(record: Option<&TokenRecord>, field: fn(&TokenRecord) -> Option<f64>) -> f64 {
    record.and_then(field).unwrap_or(f64::NAN)
}

/// Builds the enriched snapshot.
///
/// Returns `None` when the current query has no token record. A missing
/// -24h record marks a new token: its one-day volume and transaction count
/// are the cumulative values instead of deltas.
pub fn map_token_data(
    current: &TokenQueryResult,
    one_day: Option<&TokenQueryResult>,
    two_day: Option<&TokenQueryResult>,
    prices: ReferencePrices,
    fetched_at: DateTime<Utc>,
) -> Option<TokenSnapshot> {
    let data = current.token()?;
    let prior = one_day.and_then(TokenQueryResult::token);
    let older = two_day.and_then(TokenQueryResult::token);
    let now = Some(data);

    let (one_day_volume_usd, volume_change_usd) = two_day_percent_change(
        field(now, |t| t.trade_volume_usd),
        field(prior, |t| t.trade_volume_usd),
        field(older, |t| t.trade_volume_usd),
    );

    let (one_day_volume_ut, volume_change_ut) = two_day_percent_change(
        field(now, |t| t.untracked_volume_usd),
        field(prior, |t| t.untracked_volume_usd),
        field(older, |t| t.untracked_volume_usd),
    );

    let (one_day_txns, txn_change) = two_day_percent_change(
        field(now, |t| t.tx_count),
        field(prior, |t| t.tx_count),
        field(older, |t| t.tx_count),
    );

    let derived = field(now, |t| t.derived_native);
    let current_price = derived * prices.current;
    let prior_price = prior
        .and_then(|t| t.derived_native)
        .map(|d| d * prices.one_day)
        .unwrap_or(0.0);
    let price_change_usd = percent_change(current_price, prior_price);

    let current_liquidity_usd = field(now, |t| t.total_liquidity) * prices.current * derived;
    let old_liquidity_usd =
        field(prior, |t| t.total_liquidity) * prices.one_day * field(prior, |t| t.derived_native);
    let liquidity_change_usd = percent_change(current_liquidity_usd, old_liquidity_usd);

    // BSC subgraphs may lag on derivedBNB but carry derivedUSD
    let price_usd = positive_finite(current_price)
        .or_else(|| data.derived_usd.and_then(positive_finite))
        .unwrap_or(0.0);

    let mut snapshot = TokenSnapshot {
        address: data.id.clone(),
        symbol: data.symbol.clone().unwrap_or_default(),
        name: data.name.clone().unwrap_or_default(),
        decimals: data.decimals,
        price_usd,
        price_change_usd: finite_or_zero(price_change_usd),
        total_liquidity_usd: finite_or_zero(current_liquidity_usd),
        liquidity_change_usd: finite_or_zero(liquidity_change_usd),
        one_day_volume_usd: finite_or_zero(one_day_volume_usd),
        volume_change_usd: finite_or_zero(volume_change_usd),
        one_day_volume_ut: finite_or_zero(one_day_volume_ut),
        volume_change_ut: finite_or_zero(volume_change_ut),
        one_day_volume_native: None,
        tx_count: finite_or_zero(field(now, |t| t.tx_count)),
        one_day_txns: finite_or_zero(one_day_txns),
        txn_change: finite_or_zero(txn_change),
        pairs: merge_pairs(current.pairs0.as_deref(), current.pairs1.as_deref()),
        fetched_at,
    };

    if prior.is_none() {
        snapshot.one_day_volume_usd = finite_or_zero(field(now, |t| t.trade_volume_usd));
        snapshot.one_day_volume_native =
            Some(finite_or_zero(field(now, |t| t.trade_volume) * derived));
        snapshot.one_day_txns = snapshot.tx_count;
    }

    Some(snapshot)
}

/// Current and -24h reference price. Failures degrade to zeros.
pub async fn fetch_reference_prices<S: SubgraphSource>(
    source: &S,
    chain: &ChainProfile,
    now: DateTime<Utc>,
) -> ReferencePrices {
    let result: Result<ReferencePrices> = async {
        let deltas = delta_timestamps(now);
        let block = source.block_at(chain, deltas.one_day).await?;

        let current = source.reference_price(chain, None).await?.unwrap_or(0.0);
        let one_day = match block {
            Some(block) => source
                .reference_price(chain, Some(block.number))
                .await?
                .unwrap_or(0.0),
            None => 0.0,
        };

        Ok(ReferencePrices::new(current, one_day))
    }
    .await;

    match result {
        Ok(prices) => prices,
        Err(e) => {
            error!(
                "Failed to fetch {} price on {}: {:#}",
                chain.reference.label(),
                chain.name,
                e
            );
            ReferencePrices::default()
        },
    }
}

/// Resolves the blocks closest to 24h and 48h before `now`.
pub async fn resolve_historical_blocks<S: SubgraphSource>(
    source: &S,
    chain: &ChainProfile,
    now: DateTime<Utc>,
) -> Result<BlockState> {
    let deltas = delta_timestamps(now);

    let (one_day, two_day) = futures::try_join!(
        source.block_at(chain, deltas.one_day),
        source.block_at(chain, deltas.two_days)
    )?;

    let mut state = BlockState::default();
    if let Some(block) = one_day {
        state = state.reduce(BlockEvent::Set(BlockSlot::OneDay, block));
    }
    if let Some(block) = two_day {
        state = state.reduce(BlockEvent::Set(BlockSlot::TwoDay, block));
    }
    Ok(state)
}

/// Fetches the three token records concurrently and maps them.
///
/// `blocks` pins the -24h/-48h queries; when `None` they are resolved from
/// the current time.
pub async fn fetch_token_snapshot<S: SubgraphSource>(
    source: &S,
    chain: &ChainProfile,
    address: &str,
    prices: ReferencePrices,
    blocks: Option<(u64, u64)>,
) -> Result<Option<TokenSnapshot>> {
    let address = normalize_address(address);
    let now = Utc::now();

    let (one_day_block, two_day_block) = match blocks {
        Some(blocks) => blocks,
        None => resolve_historical_blocks(source, chain, now)
            .await?
            .historical()
            .context("No blocks found for the -24h/-48h timestamps")?,
    };

    debug!(
        "Fetching token {} on {} (blocks {} / {})",
        address, chain.name, one_day_block, two_day_block
    );

    let (current, one_day, two_day) = futures::try_join!(
        source.token(chain, &address, None),
        source.token(chain, &address, Some(one_day_block)),
        source.token(chain, &address, Some(two_day_block))
    )
    .with_context(|| format!("Failed to fetch token data for {}", address))?;

    Ok(map_token_data(
        &current,
        Some(&one_day),
        Some(&two_day),
        prices,
        now,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{chains::MAINNET, models::BlockRef, sources::mock::MockSubgraph};

    fn record(volume_usd: f64, derived: f64, liquidity: f64, tx_count: f64) -> TokenRecord {
        TokenRecord {
            id: "0xtoken".to_string(),
            symbol: Some("KIBA".to_string()),
            name: Some("Kiba Inu".to_string()),
            decimals: Some(9),
            derived_native: Some(derived),
            trade_volume: Some(volume_usd / 2.0),
            trade_volume_usd: Some(volume_usd),
            untracked_volume_usd: Some(volume_usd),
            total_liquidity: Some(liquidity),
            tx_count: Some(tx_count),
            derived_usd: None,
        }
    }

    fn result(token: Option<TokenRecord>) -> TokenQueryResult {
        TokenQueryResult {
            tokens: token.into_iter().collect(),
            pairs0: None,
            pairs1: None,
        }
    }

    #[test]
    fn test_three_day_volume_scenario() {
        let current = result(Some(record(1000.0, 0.001, 5000.0, 50.0)));
        let one_day = result(Some(record(800.0, 0.001, 5000.0, 40.0)));
        let two_day = result(Some(record(600.0, 0.001, 5000.0, 30.0)));

        let snapshot = map_token_data(
            &current,
            Some(&one_day),
            Some(&two_day),
            ReferencePrices::new(2000.0, 2000.0),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(snapshot.one_day_volume_usd, 200.0);
        assert!(snapshot.volume_change_usd.is_finite());
        assert_eq!(snapshot.one_day_txns, 10.0);
        assert_eq!(snapshot.price_usd, 2.0);
        assert_eq!(snapshot.total_liquidity_usd, 10_000.0);
        assert_eq!(snapshot.price_change_usd, 0.0);
        assert!(!snapshot.is_new());
    }

    #[test]
    fn test_new_token_uses_cumulative_volume() {
        let current = result(Some(record(1234.0, 0.002, 100.0, 17.0)));
        let empty = result(None);

        let snapshot = map_token_data(
            &current,
            Some(&empty),
            Some(&empty),
            ReferencePrices::new(1000.0, 900.0),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(snapshot.one_day_volume_usd, 1234.0);
        assert_eq!(snapshot.one_day_txns, 17.0);
        assert_eq!(snapshot.one_day_volume_native, Some(617.0 * 0.002));
        assert_eq!(snapshot.price_change_usd, 0.0);
        assert_eq!(snapshot.liquidity_change_usd, 0.0);
        assert!(snapshot.one_day_volume_ut.is_finite());
        assert!(snapshot.is_new());
    }

    #[test]
    fn test_price_and_liquidity_change() {
        let current = result(Some(record(1000.0, 0.002, 100.0, 5.0)));
        let one_day = result(Some(record(900.0, 0.001, 100.0, 4.0)));

        let snapshot = map_token_data(
            &current,
            Some(&one_day),
            None,
            ReferencePrices::new(1000.0, 1000.0),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(snapshot.price_change_usd, 100.0);
        assert_eq!(snapshot.liquidity_change_usd, 100.0);
        // no -48h record: delta kept, percent falls back to 0
        assert_eq!(snapshot.one_day_volume_usd, 100.0);
        assert_eq!(snapshot.volume_change_usd, 0.0);
    }

    #[test]
    fn test_missing_current_record() {
        assert!(map_token_data(
            &result(None),
            None,
            None,
            ReferencePrices::default(),
            Utc::now()
        )
        .is_none());
    }

    #[test]
    fn test_derived_usd_fallback_and_missing_tx_count() {
        let mut token = record(10.0, 0.0, 0.0, 0.0);
        token.derived_native = None;
        token.tx_count = None;
        token.derived_usd = Some(0.5);

        let snapshot = map_token_data(
            &result(Some(token.clone())),
            Some(&result(Some(token))),
            None,
            ReferencePrices::new(300.0, 300.0),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(snapshot.price_usd, 0.5);
        assert_eq!(snapshot.tx_count, 0.0);
        assert_eq!(snapshot.one_day_txns, 0.0);
        assert_eq!(snapshot.total_liquidity_usd, 0.0);
    }

    #[test]
    fn test_merge_pairs_handles_absent_side() {
        let a = vec![PairRef::new("0x1")];
        let b = vec![PairRef::new("0x2"), PairRef::new("0x3")];
        assert_eq!(merge_pairs(Some(&a), Some(&b)).len(), 3);
        assert_eq!(merge_pairs(None, Some(&b)).len(), 2);
        assert_eq!(merge_pairs(Some(&a), None)[0].id, "0x1");
        assert!(merge_pairs(None, None).is_empty());
    }

    #[tokio::test]
    async fn test_fetch_token_snapshot_with_pinned_blocks() {
        let source = MockSubgraph::default()
            .with_token("0xtoken", None, result(Some(record(1000.0, 0.001, 10.0, 50.0))))
            .with_token("0xtoken", Some(10), result(Some(record(800.0, 0.001, 10.0, 40.0))))
            .with_token("0xtoken", Some(5), result(Some(record(600.0, 0.001, 10.0, 30.0))));

        let snapshot = fetch_token_snapshot(
            &source,
            &MAINNET,
            "0xTOKEN",
            ReferencePrices::new(1000.0, 1000.0),
            Some((10, 5)),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(snapshot.one_day_volume_usd, 200.0);
        assert_eq!(snapshot.price_usd, 1.0);
    }

    #[tokio::test]
    async fn test_fetch_reference_prices_degrades_to_zero() {
        let source = MockSubgraph::default().failing();
        let prices = fetch_reference_prices(&source, &MAINNET, Utc::now()).await;
        assert_eq!(prices, ReferencePrices::default());
        assert!(!prices.is_ready());

        let source = MockSubgraph::default()
            .with_block(BlockRef::new(42, 0))
            .with_price(None, 2000.0)
            .with_price(Some(42), 1600.0);
        let prices = fetch_reference_prices(&source, &MAINNET, Utc::now()).await;
        assert_eq!(prices.current, 2000.0);
        assert_eq!(prices.one_day, 1600.0);
        assert_eq!(prices.change, 25.0);
    }
}
