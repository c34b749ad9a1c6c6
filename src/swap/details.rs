//! Advanced swap details shown under the swap form.

use serde::Serialize;

use crate::chains::ChainProfile;

use super::{
    fraction::{Fraction, Percent},
    trade::{CurrencyAmount, Trade, TradeType},
};

/// LP fee applied when the chain has no entry in the strategy table.
const DEFAULT_LP_FEE_BPS: u32 = 30;

/// Price impacts below this are shown as `<0.01%`.
const PRICE_IMPACT_FLOOR_BPS: u32 = 1;

/// Share of the input left after one hop's LP fee (`1 - fee`).
pub fn fraction_after_fee(chain: Option<&ChainProfile>) -> Percent {
    let bps = chain.map(|c| c.lp_fee_bps).unwrap_or(DEFAULT_LP_FEE_BPS);
    Percent::one_hundred().subtract(&Percent::from_bps(bps))
}

/// LP fee compounded over every hop: `1 - fraction_after_fee ^ hops`.
pub fn realized_lp_fee_percent(trade: &Trade, fraction_after_fee: &Percent) -> Percent {
    let remaining = (0..trade.hops()).fold(Fraction::one(), |acc, _| {
        acc.multiply(fraction_after_fee.fraction())
    });
    Percent::from_fraction(Fraction::one().subtract(&remaining))
}

/// Price impact net of LP fees plus the fee itself in input currency units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub price_impact_without_fee: Percent,
    pub realized_lp_fee: CurrencyAmount,
}

pub fn trade_price_breakdown(trade: &Trade, fraction_after_fee: &Percent) -> PriceBreakdown {
    let realized = realized_lp_fee_percent(trade, fraction_after_fee);

    let fee_amount = realized
        .fraction()
        .multiply(&Fraction::from_integer(trade.input_amount.raw.clone()))
        .quotient();

    PriceBreakdown {
        price_impact_without_fee: trade.price_impact.subtract(&realized),
        realized_lp_fee: CurrencyAmount::from_raw(trade.input_amount.currency.clone(), fee_amount),
    }
}

/// Rendered swap details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapDetails {
    /// "Minimum received" or "Maximum sent"
    pub received_title: String,
    pub received: String,
    pub received_symbol: String,
    pub price_impact: String,
    pub fee: String,
    pub route: String,
    pub slippage: String,
}

/// `<0.01%` below one basis point, `-x.xx%` otherwise.
pub fn format_price_impact(price_impact: &Percent) -> String {
    if price_impact.less_than(&Percent::from_bps(PRICE_IMPACT_FLOOR_BPS)) {
        "<0.01%".to_string()
    } else {
        format!("{}%", price_impact.negate().to_fixed(2))
    }
}

/// Formats `trade` for a chain (`None` means no chain context) with a
/// slippage tolerance in basis points.
pub fn format_swap_details(trade: &Trade, chain_id: Option<u64>, slippage_bps: u32) -> SwapDetails {
    let chain = ChainProfile::resolve(chain_id);
    let slippage = Percent::from_bps(slippage_bps);

    let breakdown = trade_price_breakdown(trade, &fraction_after_fee(chain));

    let (received_title, received_amount) = match trade.trade_type {
        TradeType::ExactInput => ("Minimum received", trade.minimum_amount_out(&slippage)),
        TradeType::ExactOutput => ("Maximum sent", trade.maximum_amount_in(&slippage)),
    };

    let received_symbol = received_amount.currency.symbol(chain);

    SwapDetails {
        received_title: received_title.to_string(),
        received: received_amount.to_significant(4),
        received_symbol: if received_symbol.is_empty() {
            "--".to_string()
        } else {
            received_symbol
        },
        price_impact: format_price_impact(&breakdown.price_impact_without_fee),
        fee: format!(
            "{} {}",
            breakdown.realized_lp_fee.to_significant(6),
            trade.input_amount.currency.wrapped_symbol(chain)
        ),
        route: trade.route(),
        slippage: format!("{}%", slippage.to_fixed(2)),
    }
}
