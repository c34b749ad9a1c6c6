//! Polling feeds.
//!
//! Each feed owns a [`Poller`] and publishes [`FeedState`] snapshots on a
//! `tokio::sync::watch` channel; consumers subscribe instead of sharing
//! mutable state.

mod feed;
mod hooks;
mod poller;
mod state;

pub use feed::Feed;
pub use hooks::{
    holder_gains_feed, holders_feed, pair_transactions_feed, screener_feed, token_data_feed,
    user_sells_feed, user_transactions, user_transactions_feed, HolderReflections,
    UserTransactions,
};
pub use poller::Poller;
pub use state::{FeedEvent, FeedState, Merge};
