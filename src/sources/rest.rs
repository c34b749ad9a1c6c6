use anyhow::{Context, Result};
use log::warn;
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    chains::{ChainProfile, ExplorerApi},
    config::ApiSettings,
    models::{ExplorerResponse, ScreenerPair, ScreenerTokensResponse, TokenInfo, TokenTransfer},
    utils::normalize_address,
};

use super::{graphql::GraphqlClient, MarketSource};

/// Explorer message for an account with no matching transfers.
const NO_TRANSACTIONS: &str = "No transactions found";

/// Page size of the explorer `tokentx` endpoint.
const TRANSFER_PAGE_SIZE: &str = "10000";

/// [`MarketSource`] over the public REST APIs.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    settings: ApiSettings,
}

impl RestClient {
    pub fn new(http: reqwest::Client, settings: ApiSettings) -> Self {
        Self { http, settings }
    }

    pub fn from_settings(settings: &ApiSettings, timeout: std::time::Duration) -> Result<Self> {
        Ok(Self::new(GraphqlClient::http_client(timeout)?, settings.clone()))
    }

    fn endpoint(base: &str, path: &str) -> Result<Url> {
        let joined = format!("{}/{}", base.trim_end_matches('/'), path);
        Url::parse(&joined).with_context(|| format!("Invalid API URL: {}", joined))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, query: &[(&str, &str)]) -> Result<T> {
        self.http
            .get(url.clone())
            .query(query)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url.path()))?
            .error_for_status()
            .with_context(|| format!("{} returned an error status", url.path()))?
            .json()
            .await
            .with_context(|| format!("Failed to decode response of {}", url.path()))
    }

    /// Explorer base URL and API key for a chain, `None` when unsupported.
    fn explorer(&self, chain: &ChainProfile) -> Option<(&str, Option<&str>)> {
        chain.explorer_api.map(|api| match api {
            ExplorerApi::Etherscan => (
                self.settings.etherscan_url.as_str(),
                self.settings.etherscan_api_key.as_deref(),
            ),
            ExplorerApi::BscScan => (
                self.settings.bscscan_url.as_str(),
                self.settings.bscscan_api_key.as_deref(),
            ),
        })
    }
}

impl RestClient {
    /// `module=account` call of the chain's explorer. `None` when the chain
    /// has no explorer API; API-level errors are logged and returned as is.
    async fn explorer_account_query(
        &self,
        chain: &ChainProfile,
        action: &str,
        contract: &str,
        account: &str,
        extra: &[(&str, &str)],
    ) -> Result<Option<ExplorerResponse>> {
        let Some((base, api_key)) = self.explorer(chain) else {
            return Ok(None);
        };

        let url = Url::parse(base).with_context(|| format!("Invalid explorer URL: {}", base))?;
        let contract = normalize_address(contract);
        let account = normalize_address(account);

        let mut query = vec![
            ("module", "account"),
            ("action", action),
            ("contractaddress", contract.as_str()),
            ("address", account.as_str()),
        ];
        query.extend_from_slice(extra);
        if let Some(key) = api_key {
            query.push(("apikey", key));
        }

        let response: ExplorerResponse = self.get_json(url, &query).await?;
        if response.status != "1" && response.message != NO_TRANSACTIONS {
            warn!(
                "{} {} for {}: {} ({})",
                chain.explorer_host, action, account, response.message, response.result
            );
        }

        Ok(Some(response))
    }
}

impl MarketSource for RestClient {
    async fn screener_token(&self, address: &str) -> Result<Option<ScreenerPair>> {
        let url = Self::endpoint(
            &self.settings.dexscreener_url,
            &format!("latest/dex/tokens/{}", normalize_address(address)),
        )?;
        let response: ScreenerTokensResponse = self.get_json(url, &[]).await?;
        Ok(response.into_first())
    }

    async fn screener_tokens(&self, addresses: &[String]) -> Result<Vec<ScreenerPair>> {
        if addresses.is_empty() {
            return Ok(Vec::new());
        }

        let joined = addresses
            .iter()
            .map(|address| normalize_address(address))
            .collect::<Vec<_>>()
            .join(",");
        let url = Self::endpoint(
            &self.settings.dexscreener_url,
            &format!("latest/dex/tokens/{}", joined),
        )?;
        let response: ScreenerTokensResponse = self.get_json(url, &[]).await?;
        Ok(response.into_pairs())
    }

    async fn screener_pair(&self, chain: &ChainProfile, pair: &str) -> Result<Option<ScreenerPair>> {
        let url = Self::endpoint(
            &self.settings.dexscreener_url,
            &format!(
                "latest/dex/pairs/{}/{}",
                chain.screener_network,
                normalize_address(pair)
            ),
        )?;
        let response: ScreenerTokensResponse = self.get_json(url, &[]).await?;
        Ok(response.into_first())
    }

    async fn token_info(&self, chain: &ChainProfile, address: &str) -> Result<Option<TokenInfo>> {
        if !chain.ethplorer {
            return Ok(None);
        }

        let url = Self::endpoint(
            &self.settings.ethplorer_url,
            &format!("getTokenInfo/{}", normalize_address(address)),
        )?;
        let info: TokenInfo = self
            .get_json(url, &[("apiKey", self.settings.ethplorer_api_key.as_str())])
            .await?;
        Ok(Some(info))
    }

    async fn token_transfers(
        &self,
        chain: &ChainProfile,
        contract: &str,
        account: &str,
    ) -> Result<Vec<TokenTransfer>> {
        let query = [
            ("page", "1"),
            ("offset", TRANSFER_PAGE_SIZE),
            ("startblock", "0"),
            ("endblock", "999999999"),
            ("sort", "asc"),
        ];
        let response = self
            .explorer_account_query(chain, "tokentx", contract, account, &query)
            .await?;
        Ok(response.map(|r| r.transfers()).unwrap_or_default())
    }

    async fn token_balance(
        &self,
        chain: &ChainProfile,
        contract: &str,
        account: &str,
    ) -> Result<Option<f64>> {
        let response = self
            .explorer_account_query(chain, "tokenbalance", contract, account, &[("tag", "latest")])
            .await?;
        Ok(response.and_then(|r| r.raw_balance()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::{ARBITRUM, BSC, MAINNET};

    #[test]
    fn test_endpoint_join() {
        let url = RestClient::endpoint("https://api.dexscreener.com/", "latest/dex/tokens/0xabc").unwrap();
        assert_eq!(url.as_str(), "https://api.dexscreener.com/latest/dex/tokens/0xabc");
    }

    #[tokio::test]
    async fn test_unsupported_chains_short_circuit() {
        let client = RestClient::new(reqwest::Client::new(), ApiSettings::default());
        assert!(client.token_info(&BSC, "0xabc").await.unwrap().is_none());
        assert!(client
            .token_transfers(&ARBITRUM, "0xabc", "0xdef")
            .await
            .unwrap()
            .is_empty());
        assert!(client.screener_tokens(&[]).await.unwrap().is_empty());
        assert!(client
            .token_balance(&ARBITRUM, "0xabc", "0xdef")
            .await
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_explorer_follows_chain_table() {
        let settings = ApiSettings {
            bscscan_api_key: Some("key".to_string()),
            ..ApiSettings::default()
        };
        let client = RestClient::new(reqwest::Client::new(), settings);

        assert_eq!(
            client.explorer(&MAINNET),
            Some(("https://api.etherscan.io/api", None))
        );
        assert_eq!(
            client.explorer(&BSC),
            Some(("https://api.bscscan.com/api", Some("key")))
        );
        assert_eq!(client.explorer(&ARBITRUM), None);
    }
}
