pub mod analytics;
pub mod chains;
pub mod config;
pub mod feeds;
pub mod history;
pub mod models;
pub mod sources;
pub mod swap;
pub mod utils;

pub use chains::{ChainProfile, KnownAddresses};
pub use config::Settings;
pub use feeds::{Feed, FeedState, Poller};
pub use sources::{MarketSource, RestClient, SubgraphClient, SubgraphSource};
