use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, ConfigError, File};
use serde::Deserialize;
use url::Url;

/// Chain the feeds run against when no chain id is supplied.
#[derive(Debug, Deserialize, Clone)]
pub struct NetworkSettings {
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
}

fn default_chain_id() -> u64 {
    1
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            chain_id: default_chain_id(),
        }
    }
}

/// Exchange and blocks subgraph of one chain.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SubgraphEndpoints {
    pub chain_id: u64,
    pub exchange_url: String,
    pub blocks_url: String,
}

/// The Graph endpoints.
///
/// The blocks subgraph maps timestamps to block numbers, which pin the
/// -24h/-48h queries against the exchange subgraph.
#[derive(Debug, Deserialize, Clone)]
pub struct SubgraphSettings {
    #[serde(default = "default_subgraph_endpoints")]
    pub endpoints: Vec<SubgraphEndpoints>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_subgraph_endpoints() -> Vec<SubgraphEndpoints> {
    vec![
        SubgraphEndpoints {
            chain_id: 1,
            exchange_url: "https://api.thegraph.com/subgraphs/name/ianlapham/uniswapv2".to_string(),
            blocks_url: "https://api.thegraph.com/subgraphs/name/blocklytics/ethereum-blocks"
                .to_string(),
        },
        SubgraphEndpoints {
            chain_id: 56,
            exchange_url: "https://api.thegraph.com/subgraphs/name/vmatskiv/pancakeswap-v2"
                .to_string(),
            blocks_url: "https://api.thegraph.com/subgraphs/name/pancakeswap/blocks".to_string(),
        },
    ]
}

fn default_request_timeout_secs() -> u64 {
    15
}

impl Default for SubgraphSettings {
    fn default() -> Self {
        Self {
            endpoints: default_subgraph_endpoints(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl SubgraphSettings {
    pub fn endpoints_for(&self, chain_id: u64) -> Option<&SubgraphEndpoints> {
        self.endpoints.iter().find(|e| e.chain_id == chain_id)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// REST market data APIs (Dexscreener, Ethplorer, Etherscan/BscScan).
#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    #[serde(default = "default_dexscreener_url")]
    pub dexscreener_url: String,
    #[serde(default = "default_ethplorer_url")]
    pub ethplorer_url: String,
    #[serde(default = "default_ethplorer_api_key")]
    pub ethplorer_api_key: String,
    #[serde(default = "default_etherscan_url")]
    pub etherscan_url: String,
    #[serde(default = "default_bscscan_url")]
    pub bscscan_url: String,
    #[serde(default)]
    pub etherscan_api_key: Option<String>,
    #[serde(default)]
    pub bscscan_api_key: Option<String>,
}

fn default_dexscreener_url() -> String {
    "https://api.dexscreener.com".to_string()
}

fn default_ethplorer_url() -> String {
    "https://api.ethplorer.io".to_string()
}

fn default_ethplorer_api_key() -> String {
    "freekey".to_string()
}

fn default_etherscan_url() -> String {
    "https://api.etherscan.io/api".to_string()
}

fn default_bscscan_url() -> String {
    "https://api.bscscan.com/api".to_string()
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            dexscreener_url: default_dexscreener_url(),
            ethplorer_url: default_ethplorer_url(),
            ethplorer_api_key: default_ethplorer_api_key(),
            etherscan_url: default_etherscan_url(),
            bscscan_url: default_bscscan_url(),
            etherscan_api_key: None,
            bscscan_api_key: None,
        }
    }
}

/// Poll intervals in milliseconds, one per feed.
#[derive(Debug, Deserialize, Clone)]
pub struct PollingSettings {
    #[serde(default = "default_token_data_ms")]
    pub token_data_ms: u64,
    #[serde(default = "default_fast_poll_ms")]
    pub user_transactions_ms: u64,
    #[serde(default = "default_user_sells_ms")]
    pub user_sells_ms: u64,
    #[serde(default = "default_fast_poll_ms")]
    pub pair_transactions_ms: u64,
    #[serde(default = "default_fast_poll_ms")]
    pub screener_ms: u64,
    #[serde(default = "default_token_data_ms")]
    pub holders_ms: u64,
    #[serde(default = "default_user_sells_ms")]
    pub holder_gains_ms: u64,
}

fn default_token_data_ms() -> u64 {
    30_000
}

fn default_fast_poll_ms() -> u64 {
    15_000
}

fn default_user_sells_ms() -> u64 {
    60_000
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            token_data_ms: default_token_data_ms(),
            user_transactions_ms: default_fast_poll_ms(),
            user_sells_ms: default_user_sells_ms(),
            pair_transactions_ms: default_fast_poll_ms(),
            screener_ms: default_fast_poll_ms(),
            holders_ms: default_token_data_ms(),
            holder_gains_ms: default_user_sells_ms(),
        }
    }
}

impl PollingSettings {
    fn intervals(&self) -> [(&'static str, u64); 7] {
        [
            ("token_data_ms", self.token_data_ms),
            ("user_transactions_ms", self.user_transactions_ms),
            ("user_sells_ms", self.user_sells_ms),
            ("pair_transactions_ms", self.pair_transactions_ms),
            ("screener_ms", self.screener_ms),
            ("holders_ms", self.holders_ms),
            ("holder_gains_ms", self.holder_gains_ms),
        ]
    }
}

/// What the binary follows.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct WatchSettings {
    #[serde(default)]
    pub tokens: Vec<String>,
    #[serde(default)]
    pub accounts: Vec<String>,
    #[serde(default)]
    pub pairs: Vec<String>,
}

/// Root application configuration.
///
/// Loaded from `config.yaml` at startup. Every section is optional and
/// falls back to the public endpoints and the frontend's poll intervals.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub network: NetworkSettings,
    #[serde(default)]
    pub subgraph: SubgraphSettings,
    #[serde(default)]
    pub apis: ApiSettings,
    #[serde(default)]
    pub polling: PollingSettings,
    #[serde(default)]
    pub watch: WatchSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("config"))
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }

    /// Every endpoint must be a valid URL and every interval non-zero.
    pub fn validate(&self) -> Result<()> {
        let urls = self
            .subgraph
            .endpoints
            .iter()
            .flat_map(|e| [e.exchange_url.as_str(), e.blocks_url.as_str()])
            .chain([
                self.apis.dexscreener_url.as_str(),
                self.apis.ethplorer_url.as_str(),
                self.apis.etherscan_url.as_str(),
                self.apis.bscscan_url.as_str(),
            ]);

        for url in urls {
            Url::parse(url).with_context(|| format!("Invalid endpoint URL: {}", url))?;
        }

        for (name, value) in self.polling.intervals() {
            if value == 0 {
                bail!("polling.{} must be greater than zero", name);
            }
        }

        if self.subgraph.endpoints_for(self.network.chain_id).is_none() {
            bail!(
                "No subgraph endpoints configured for chain {}",
                self.network.chain_id
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_yaml(yaml: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert_eq!(settings.network.chain_id, 1);
        assert_eq!(settings.polling.user_sells_ms, 60_000);
        assert!(settings.subgraph.endpoints_for(56).is_some());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = from_yaml(
            "network:\n  chain_id: 56\npolling:\n  token_data_ms: 5000\nwatch:\n  tokens:\n    - \"0xabc\"\n",
        );
        assert_eq!(settings.network.chain_id, 56);
        assert_eq!(settings.polling.token_data_ms, 5_000);
        assert_eq!(settings.polling.screener_ms, 15_000);
        assert_eq!(settings.polling.holder_gains_ms, 60_000);
        assert_eq!(settings.watch.tokens, vec!["0xabc".to_string()]);
        assert_eq!(settings.apis.ethplorer_api_key, "freekey");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut settings = Settings::default();
        settings.polling.holders_ms = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.apis.dexscreener_url = "not a url".to_string();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.network.chain_id = 137;
        assert!(settings.validate().is_err());
    }
}
