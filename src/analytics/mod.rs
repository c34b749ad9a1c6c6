//! Pure aggregation over indexer and market data.
//!
//! Nothing in here performs I/O except the `fetch_*` helpers of
//! [`token_mapper`], which take the data source as a generic parameter.

pub mod movers;
pub mod percent;
pub mod reflections;
pub mod token_mapper;
pub mod transactions;

pub use movers::{rank_movers, Mover, Pin};
pub use percent::{percent_change, two_day_percent_change};
pub use reflections::{holder_gains, reflection_summary, HolderContext, HolderGains, ReflectionSummary};
pub use token_mapper::{
    fetch_reference_prices, fetch_token_snapshot, map_token_data, merge_pairs,
    resolve_historical_blocks, ReferencePrices,
};
pub use transactions::{
    aggregate_swaps, attributed_account, classify_swaps, filter_by_account, merge_by_transaction,
    merge_more, merge_transactions, trader_summary, TraderSummary,
};
