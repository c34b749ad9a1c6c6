//! Feed state and its reducer.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    analytics::{merge_more, merge_transactions},
    models::{RawSwap, ScreenerPair, TokenInfo, TokenSnapshot, TransactionsResult},
};

/// Combines a previous value with a newer one.
///
/// Lists merge additively (new entries first, duplicates by transaction id
/// dropped); single snapshots are replaced.
pub trait Merge {
    fn merge(&self, incoming: &Self) -> Self;
}

impl Merge for Vec<RawSwap> {
    fn merge(&self, incoming: &Self) -> Self {
        merge_more(self, incoming)
    }
}

impl Merge for TransactionsResult {
    fn merge(&self, incoming: &Self) -> Self {
        merge_transactions(self, incoming)
    }
}

macro_rules! replace_on_merge {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Merge for $ty {
                fn merge(&self, incoming: &Self) -> Self {
                    incoming.clone()
                }
            }
        )*
    };
}

replace_on_merge!(TokenSnapshot, ScreenerPair, TokenInfo);

/// Transition applied to a [`FeedState`].
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent<T> {
    /// A fetch started and nothing has been loaded yet
    Loading,
    /// Replace the data
    Set(T),
    /// Merge into the data
    Update(T),
    /// A fetch failed; the data is kept
    Failed(String),
}

/// Latest data of one feed plus its fetch status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub last_fetched: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl<T> Default for FeedState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            last_fetched: None,
            last_error: None,
        }
    }
}

impl<T: Merge + Clone> FeedState<T> {
    /// Returns the state after `event`; `self` is left untouched.
    pub fn reduce(&self, event: FeedEvent<T>) -> Self {
        match event {
            FeedEvent::Loading => Self {
                loading: true,
                ..self.clone()
            },
            FeedEvent::Set(data) => Self {
                data: Some(data),
                loading: false,
                last_fetched: Some(Utc::now()),
                last_error: None,
            },
            FeedEvent::Update(incoming) => Self {
                data: Some(match &self.data {
                    Some(previous) => previous.merge(&incoming),
                    None => incoming,
                }),
                loading: false,
                last_fetched: Some(Utc::now()),
                last_error: None,
            },
            FeedEvent::Failed(error) => Self {
                loading: false,
                last_error: Some(error),
                ..self.clone()
            },
        }
    }
}

impl<T> FeedState<T> {
    pub fn is_ready(&self) -> bool {
        self.data.is_some()
    }
}
