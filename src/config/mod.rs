mod config;

pub use config::{
    ApiSettings, NetworkSettings, PollingSettings, Settings, SubgraphEndpoints, SubgraphSettings,
    WatchSettings,
};
