//! Swap aggregation and classification.
//!
//! A user's swap history comes from two queries (sells routed through the
//! router, and swaps sent straight to the user). They overlap, and some
//! records come back without their pair or transaction sub-object.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::{
    chains::KnownAddresses,
    models::{PairToken, RawLiquidityEvent, RawSwap, SwapEvent, TokenLeg, TransactionsResult},
    utils::{normalize_address, same_address},
};

/// Unions `sells` and `general`, keeps the first record per transaction id,
/// drops incomplete records and sorts by timestamp descending.
///
/// Sells come first, so a transaction present in both lists keeps its sell
/// record. The sort is stable.
pub fn aggregate_swaps(sells: &[RawSwap], general: &[RawSwap]) -> Vec<RawSwap> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();

    let mut unique: Vec<RawSwap> = sells
        .iter()
        .chain(general)
        .filter(|swap| swap.is_complete())
        .filter(|swap| swap.tx_id().map(|id| seen.insert(id)).unwrap_or(false))
        .cloned()
        .collect();

    unique.sort_by(|a, b| b.tx_timestamp().cmp(&a.tx_timestamp()));
    unique
}

/// Merges a later page into an existing list: the incoming records first,
/// then every previous record whose transaction is not in `incoming`.
pub fn merge_by_transaction<T, F>(previous: &[T], incoming: &[T], tx_id: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> Option<&str>,
{
    let incoming_ids: FxHashSet<&str> = incoming.iter().filter_map(&tx_id).collect();

    incoming
        .iter()
        .chain(
            previous
                .iter()
                .filter(|item| tx_id(*item).map_or(true, |id| !incoming_ids.contains(id))),
        )
        .cloned()
        .collect()
}

pub fn merge_more(previous: &[RawSwap], incoming: &[RawSwap]) -> Vec<RawSwap> {
    merge_by_transaction(previous, incoming, RawSwap::tx_id)
}

/// Applies [`merge_more`] to every list of a transactions result.
pub fn merge_transactions(
    previous: &TransactionsResult,
    incoming: &TransactionsResult,
) -> TransactionsResult {
    TransactionsResult {
        mints: merge_by_transaction(&previous.mints, &incoming.mints, RawLiquidityEvent::tx_id),
        burns: merge_by_transaction(&previous.burns, &incoming.burns, RawLiquidityEvent::tx_id),
        swaps: merge_more(&previous.swaps, &incoming.swaps),
    }
}

/// Trader a swap is attributed to: `from` when `to` is a router or pair,
/// `to` otherwise.
pub fn attributed_account<'a>(swap: &'a RawSwap, known: &KnownAddresses) -> &'a str {
    if known.contains(&swap.to) {
        &swap.from
    } else {
        &swap.to
    }
}

fn leg(token: &PairToken, net: f64) -> TokenLeg {
    TokenLeg {
        symbol: token.symbol.clone(),
        amount: net.abs(),
    }
}

/// Sold and bought legs from the pool's perspective.
///
/// The token with negative net flow (in - out) left the pool. token0 is
/// checked first; when neither side is negative both legs are `None`.
fn classify_legs(swap: &RawSwap) -> (Option<TokenLeg>, Option<TokenLeg>) {
    let Some(pair) = swap.pair.as_ref() else {
        return (None, None);
    };

    let net0 = swap.amount0_in - swap.amount0_out;
    let net1 = swap.amount1_in - swap.amount1_out;

    if net0 < 0.0 {
        (Some(leg(&pair.token0, net0)), Some(leg(&pair.token1, net1)))
    } else if net1 < 0.0 {
        (Some(leg(&pair.token1, net1)), Some(leg(&pair.token0, net0)))
    } else {
        (None, None)
    }
}

/// Classifies every complete swap and counts swaps per attributed account.
///
/// `count` is taken over the whole input list, so it reflects the number of
/// swaps the same trader has in this page.
pub fn classify_swaps(swaps: &[RawSwap], known: &KnownAddresses) -> Vec<SwapEvent> {
    let complete: Vec<(&RawSwap, String)> = swaps
        .iter()
        .filter(|swap| swap.is_complete())
        .map(|swap| (swap, attributed_account(swap, known).to_string()))
        .collect();

    let mut counts: FxHashMap<String, usize> = FxHashMap::default();
    for (_, account) in &complete {
        *counts.entry(normalize_address(account)).or_default() += 1;
    }

    complete
        .into_iter()
        .filter_map(|(swap, account)| {
            let hash = swap.tx_id()?.to_string();
            let (sold, bought) = classify_legs(swap);
            let count = counts
                .get(&normalize_address(&account))
                .copied()
                .unwrap_or(0);

            Some(SwapEvent {
                hash,
                pair_id: swap.pair.as_ref().and_then(|p| p.id.clone()),
                timestamp: swap.tx_timestamp(),
                sold,
                bought,
                amount_usd: swap.amount_usd,
                from: swap.from.clone(),
                to: swap.to.clone(),
                sender: swap.sender.clone(),
                account,
                count,
            })
        })
        .collect()
}

/// Events attributed to `account`.
pub fn filter_by_account(events: &[SwapEvent], account: &str) -> Vec<SwapEvent> {
    events
        .iter()
        .filter(|event| same_address(&event.account, account))
        .cloned()
        .collect()
}

/// Buy/sell totals of one trader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TraderSummary {
    pub buys: usize,
    pub sells: usize,
    pub bought_usd: f64,
    pub sold_usd: f64,
}

impl TraderSummary {
    pub fn total(&self) -> usize {
        self.buys + self.sells
    }

    /// Sold minus bought, in USD.
    pub fn net_usd(&self) -> f64 {
        self.sold_usd - self.bought_usd
    }
}

/// Summarises the events attributed to `account`.
///
/// A swap counts as a sell when the pool handed out the wrapped native token.
pub fn trader_summary(events: &[SwapEvent], account: &str, wrapped_symbol: &str) -> TraderSummary {
    events
        .iter()
        .filter(|event| same_address(&event.account, account))
        .fold(TraderSummary::default(), |mut summary, event| {
            if event.is_sell(wrapped_symbol) {
                summary.sells += 1;
                summary.sold_usd += event.amount_usd;
            } else {
                summary.buys += 1;
                summary.bought_usd += event.amount_usd;
            }
            summary
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SwapPair, TransactionRef};

    const ROUTER: &str = "0x7a250d5630b4cf539739df2c5dacb4c659f2488d";
    const ALICE: &str = "0x00000000000000000000000000000000000a11ce";
    const BOB: &str = "0x0000000000000000000000000000000000000b0b";

    fn token(symbol: &str) -> PairToken {
        PairToken {
            id: format!("0x{}", symbol.to_lowercase()),
            symbol: symbol.to_string(),
            ..Default::default()
        }
    }

    fn swap(hash: &str, timestamp: u64) -> RawSwap {
        RawSwap {
            id: Some(format!("{}-0", hash)),
            transaction: Some(TransactionRef {
                id: hash.to_string(),
                timestamp: Some(timestamp),
            }),
            pair: Some(SwapPair {
                id: Some("0xpair".to_string()),
                token0: token("KIBA"),
                token1: token("WETH"),
            }),
            to: ALICE.to_string(),
            from: ALICE.to_string(),
            timestamp: Some(timestamp),
            ..Default::default()
        }
    }

    #[test]
    fn test_aggregate_dedupes_and_sorts() {
        let mut shared = swap("0xb", 20);
        shared.amount_usd = 1.0;
        let sells = vec![swap("0xa", 10), shared.clone(), swap("0xc", 30)];

        let mut general_shared = swap("0xb", 20);
        general_shared.amount_usd = 2.0;
        let general = vec![general_shared, swap("0xd", 25)];

        let result = aggregate_swaps(&sells, &general);

        // 3 + 2 - 1 shared transaction
        assert_eq!(result.len(), 4);
        let ids: Vec<&str> = result.iter().filter_map(RawSwap::tx_id).collect();
        assert_eq!(ids, vec!["0xc", "0xd", "0xb", "0xa"]);
        assert!(result
            .windows(2)
            .all(|w| w[0].tx_timestamp() >= w[1].tx_timestamp()));
        // the sell record wins
        let b = result.iter().find(|s| s.tx_id() == Some("0xb")).unwrap();
        assert_eq!(b.amount_usd, 1.0);
    }

    #[test]
    fn test_aggregate_drops_incomplete_records() {
        let mut no_pair = swap("0xe", 5);
        no_pair.pair = None;
        let mut no_tx = swap("0xf", 6);
        no_tx.transaction = None;

        let result = aggregate_swaps(&[no_pair], &[no_tx, swap("0xg", 7)]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].tx_id(), Some("0xg"));
    }

    #[test]
    fn test_aggregate_orders_by_transaction_timestamp() {
        let mut late = swap("0xlate", 30);
        late.timestamp = Some(1);
        let mut early = swap("0xearly", 20);
        early.timestamp = Some(50);
        let mut untimed = swap("0xuntimed", 0);
        untimed.transaction.as_mut().unwrap().timestamp = None;
        untimed.timestamp = Some(25);

        let result = aggregate_swaps(&[early, late], &[untimed]);
        let ids: Vec<&str> = result.iter().filter_map(RawSwap::tx_id).collect();
        assert_eq!(ids, vec!["0xlate", "0xuntimed", "0xearly"]);
    }

    #[test]
    fn test_equal_timestamps_keep_input_order() {
        let result = aggregate_swaps(&[swap("0x1", 5), swap("0x2", 5)], &[swap("0x3", 5)]);
        let ids: Vec<&str> = result.iter().filter_map(RawSwap::tx_id).collect();
        assert_eq!(ids, vec!["0x1", "0x2", "0x3"]);
    }

    #[test]
    fn test_classify_sold_leg_and_attribution() {
        // pool received WETH and paid out KIBA: net0 < 0
        let mut buy = swap("0x1", 10);
        buy.amount0_out = 1000.0;
        buy.amount1_in = 0.5;
        buy.amount_usd = 900.0;

        // routed sell: `to` is the router, the trader is `from`
        let mut sell = swap("0x2", 11);
        sell.amount0_in = 1000.0;
        sell.amount1_out = 0.4;
        sell.amount_usd = 700.0;
        sell.to = ROUTER.to_string();
        sell.from = ALICE.to_string();

        let mut other = swap("0x3", 12);
        other.to = BOB.to_string();
        other.amount0_out = 1.0;

        let events = classify_swaps(&[buy, sell, other], &KnownAddresses::all());
        assert_eq!(events.len(), 3);

        assert_eq!(events[0].sold.as_ref().unwrap().symbol, "KIBA");
        assert_eq!(events[0].sold.as_ref().unwrap().amount, 1000.0);
        assert_eq!(events[0].bought.as_ref().unwrap().symbol, "WETH");
        assert!(!events[0].is_sell("WETH"));

        assert_eq!(events[1].sold.as_ref().unwrap().symbol, "WETH");
        assert_eq!(events[1].account, ALICE);
        assert!(events[1].is_sell("WETH"));

        assert_eq!(events[0].count, 2);
        assert_eq!(events[1].count, 2);
        assert_eq!(events[2].count, 1);

        let summary = trader_summary(&events, ALICE, "WETH");
        assert_eq!(summary.buys, 1);
        assert_eq!(summary.sells, 1);
        assert_eq!(summary.bought_usd, 900.0);
        assert_eq!(summary.net_usd(), -200.0);
        assert_eq!(summary.total(), 2);

        assert_eq!(filter_by_account(&events, &ALICE.to_uppercase()).len(), 2);
    }

    #[test]
    fn test_no_negative_leg_is_unclassified() {
        let events = classify_swaps(&[swap("0x1", 1)], &KnownAddresses::all());
        assert!(events[0].sold.is_none());
        assert!(events[0].bought.is_none());
    }

    #[test]
    fn test_merge_more_prefers_incoming() {
        let mut updated = swap("0x2", 20);
        updated.amount_usd = 5.0;

        let merged = merge_more(&[swap("0x1", 10), swap("0x2", 20)], &[updated, swap("0x3", 30)]);
        let ids: Vec<&str> = merged.iter().filter_map(RawSwap::tx_id).collect();
        assert_eq!(ids, vec!["0x2", "0x3", "0x1"]);
        assert_eq!(merged[0].amount_usd, 5.0);

        let previous = TransactionsResult {
            swaps: vec![swap("0x1", 10)],
            ..Default::default()
        };
        let merged = merge_transactions(&previous, &TransactionsResult::default());
        assert_eq!(merged.swaps.len(), 1);
    }
}
