//! Reflection gains for holders of fee-on-transfer tokens.
//!
//! Reflection tokens grow a holder's balance without a transfer. What a
//! holder gained is whatever the balance holds beyond what was bought
//! (and, for [`holder_gains`], what was sent in by other wallets).

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::{
    models::{RawSwap, TokenTransfer, TransferDirection},
    utils::same_address,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ReflectionSummary {
    pub total_bought: f64,
    pub total_sold: f64,
    pub total_gained: f64,
}

fn pair_tokens(swap: &RawSwap) -> Option<(&str, &str)> {
    swap.pair
        .as_ref()
        .map(|pair| (pair.token0.id.as_str(), pair.token1.id.as_str()))
}

/// Swaps on a pool made of exactly `token` and the wrapped native token.
fn token_native_swaps<'a>(
    swaps: &'a [RawSwap],
    token: &'a str,
    wrapped_native: &'a str,
) -> impl Iterator<Item = &'a RawSwap> + 'a {
    let in_pool = move |id: &str| same_address(id, token) || same_address(id, wrapped_native);
    swaps.iter().filter(move |swap| {
        pair_tokens(swap)
            .map(|(token0, token1)| in_pool(token0) && in_pool(token1))
            .unwrap_or(false)
    })
}

/// Reflections earned on `token` given the account's swaps and current balance.
///
/// Buys are swaps whose token0 is `token`, sells those whose token0 is the
/// wrapped native token.
pub fn reflection_summary(
    swaps: &[RawSwap],
    token: &str,
    wrapped_native: &str,
    balance: f64,
) -> ReflectionSummary {
    let (total_bought, total_sold) = token_native_swaps(swaps, token, wrapped_native).fold(
        (0.0, 0.0),
        |(bought, sold), swap| match pair_tokens(swap) {
            Some((token0, _)) if same_address(token0, token) => (bought + swap.amount0_in, sold),
            Some((token0, _)) if same_address(token0, wrapped_native) => {
                (bought, sold + swap.amount0_out)
            },
            _ => (bought, sold),
        },
    );

    ReflectionSummary {
        total_bought,
        total_sold,
        total_gained: balance.trunc() - total_bought - total_sold,
    }
}

/// Addresses that identify the holder and the project pool.
#[derive(Debug, Clone, Copy)]
pub struct HolderContext<'a> {
    pub account: &'a str,
    pub token: &'a str,
    pub wrapped_native: &'a str,
    pub pair: &'a str,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HolderGains {
    pub total_bought: f64,
    pub total_sold: f64,
    /// Tokens received from wallets other than the pool
    pub airdropped: f64,
    pub total_gained: f64,
}

/// Reflections earned by a holder, net of airdrops and buys.
///
/// Transfers to or from the pool are ignored, and swaps whose transaction
/// also appears as a plain transfer are not counted twice. Returns `None`
/// for an empty balance.
pub fn holder_gains(
    swaps: &[RawSwap],
    transfers: &[TokenTransfer],
    ctx: HolderContext<'_>,
    balance: f64,
) -> Option<HolderGains> {
    let balance = balance.trunc();
    if balance <= 0.0 {
        return None;
    }

    let wallet_transfers: Vec<&TokenTransfer> = transfers
        .iter()
        .filter(|t| match t.direction(ctx.account) {
            Some(TransferDirection::Incoming) => !same_address(&t.from, ctx.pair),
            Some(TransferDirection::Outgoing) => !same_address(&t.to, ctx.pair),
            None => false,
        })
        .collect();

    let airdropped: f64 = wallet_transfers
        .iter()
        .filter(|t| t.direction(ctx.account) == Some(TransferDirection::Incoming))
        .map(|t| t.amount())
        .sum();

    let transfer_hashes: FxHashSet<&str> = wallet_transfers.iter().map(|t| t.hash.as_str()).collect();

    let (total_bought, total_sold) = token_native_swaps(swaps, ctx.token, ctx.wrapped_native)
        .filter(|swap| {
            swap.tx_id()
                .map_or(true, |hash| !transfer_hashes.contains(hash))
        })
        .fold((0.0, 0.0), |(bought, sold), swap| {
            let bought = if swap.amount1_out > 0.0 {
                bought + swap.amount0_in
            } else {
                bought
            };
            let sold = if swap.amount1_in > 0.0 {
                sold + swap.amount0_out - swap.amount0_in
            } else {
                sold
            };
            (bought, sold)
        });

    Some(HolderGains {
        total_bought,
        total_sold,
        airdropped,
        total_gained: balance - airdropped - total_bought,
    })
}
