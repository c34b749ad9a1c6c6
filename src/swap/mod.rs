//! Swap detail formatting over an already-routed trade.

mod details;
mod fraction;
mod trade;

pub use details::{
    format_price_impact, format_swap_details, fraction_after_fee, realized_lp_fee_percent,
    trade_price_breakdown, PriceBreakdown, SwapDetails,
};
pub use fraction::{Fraction, Percent};
pub use trade::{Currency, CurrencyAmount, Token, Trade, TradeType};
