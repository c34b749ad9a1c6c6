use std::{hash::Hash, time::Duration};

use anyhow::{Context, Result};
use log::{debug, warn};
use moka::future::Cache;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::json;

use crate::{
    chains::{ChainProfile, ReferenceCurrency},
    config::SubgraphSettings,
    models::{BlockRef, RawSwap, TokenQueryResult, TransactionsResult},
    utils::{de_opt_decimal, de_opt_u64, normalize_address, to_checksum},
};

use super::{graphql::GraphqlClient, queries, SubgraphSource};

/// Window after the requested timestamp searched for a block.
const BLOCK_WINDOW_SECS: i64 = 600;

/// Historical state never changes, so pinned results live for a day.
const HISTORICAL_TTL: Duration = Duration::from_secs(24 * 3600);

const CACHE_CAPACITY: u64 = 10_000;

#[derive(Debug, Deserialize)]
struct BundleRecord {
    #[serde(default, alias = "ethPrice", alias = "bnbPrice", deserialize_with = "de_opt_decimal")]
    price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct BundlesResult {
    #[serde(default)]
    bundles: Vec<BundleRecord>,
}

#[derive(Debug, Deserialize)]
struct BlockRecord {
    #[serde(default, deserialize_with = "de_opt_u64")]
    number: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    timestamp: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct BlocksResult {
    #[serde(default)]
    blocks: Vec<BlockRecord>,
}

#[derive(Debug, Deserialize)]
struct SwapsResult {
    #[serde(default)]
    swaps: Vec<RawSwap>,
}

fn historical_cache<K, V>() -> Cache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    Cache::builder()
        .max_capacity(CACHE_CAPACITY)
        .time_to_live(HISTORICAL_TTL)
        .build()
}

#[derive(Clone)]
struct ChainClients {
    exchange: GraphqlClient,
    blocks: GraphqlClient,
}

/// [`SubgraphSource`] backed by The Graph.
///
/// Block-pinned queries and block lookups are served cache-first; queries
/// against the latest state always hit the network.
#[derive(Clone)]
pub struct SubgraphClient {
    chains: FxHashMap<u64, ChainClients>,
    tokens: Cache<(u64, String, u64), TokenQueryResult>,
    prices: Cache<(u64, u64), f64>,
    blocks: Cache<(u64, i64), BlockRef>,
}

impl SubgraphClient {
    pub fn new(settings: &SubgraphSettings) -> Result<Self> {
        let http = GraphqlClient::http_client(settings.request_timeout())?;

        let mut chains = FxHashMap::default();
        for endpoints in &settings.endpoints {
            let clients = ChainClients {
                exchange: GraphqlClient::new(http.clone(), &endpoints.exchange_url)?,
                blocks: GraphqlClient::new(http.clone(), &endpoints.blocks_url)?,
            };
            chains.insert(endpoints.chain_id, clients);
        }

        Ok(Self {
            chains,
            tokens: historical_cache(),
            prices: historical_cache(),
            blocks: historical_cache(),
        })
    }

    fn clients(&self, chain: &ChainProfile) -> Result<&ChainClients> {
        self.chains
            .get(&chain.chain_id)
            .with_context(|| format!("No subgraph configured for {}", chain.name))
    }

    /// Entity id form of an address (lowercase), rejecting malformed input.
    fn entity_id(address: &str) -> Result<String> {
        to_checksum(address).with_context(|| format!("Invalid address: {}", address))?;
        Ok(normalize_address(address))
    }

    /// Account variable: checksummed for `Bytes` filters, lowercase for
    /// the `String` filters of the BSC subgraph.
    fn account_variable(chain: &ChainProfile, account: &str) -> Result<String> {
        let checksummed =
            to_checksum(account).with_context(|| format!("Invalid account: {}", account))?;
        Ok(match chain.reference {
            ReferenceCurrency::Eth => checksummed,
            ReferenceCurrency::Bnb => normalize_address(account),
        })
    }
}

impl SubgraphSource for SubgraphClient {
    async fn token(
        &self,
        chain: &ChainProfile,
        address: &str,
        block: Option<u64>,
    ) -> Result<TokenQueryResult> {
        let id = Self::entity_id(address)?;
        let key = block.map(|number| (chain.chain_id, id.clone(), number));

        if let Some(key) = &key {
            if let Some(cached) = self.tokens.get(key).await {
                return Ok(cached);
            }
        }

        let query = queries::token_query(chain.reference, &id, block);
        let result: TokenQueryResult = self
            .clients(chain)?
            .exchange
            .query(&query, json!({}))
            .await
            .with_context(|| format!("Token query for {} failed", id))?;

        if let Some(key) = key {
            self.tokens.insert(key, result.clone()).await;
        }

        Ok(result)
    }

    async fn reference_price(&self, chain: &ChainProfile, block: Option<u64>) -> Result<Option<f64>> {
        if let Some(number) = block {
            if let Some(price) = self.prices.get(&(chain.chain_id, number)).await {
                return Ok(Some(price));
            }
        }

        let query = queries::bundle_query(chain.reference, block);
        let result: BundlesResult = self
            .clients(chain)?
            .exchange
            .query(&query, json!({}))
            .await
            .with_context(|| format!("{} price query failed", chain.reference.label()))?;

        let price = result.bundles.first().and_then(|b| b.price);

        if let (Some(number), Some(price)) = (block, price) {
            self.prices.insert((chain.chain_id, number), price).await;
        }

        Ok(price)
    }

    async fn block_at(&self, chain: &ChainProfile, timestamp: i64) -> Result<Option<BlockRef>> {
        let key = (chain.chain_id, timestamp);
        if let Some(block) = self.blocks.get(&key).await {
            return Ok(Some(block));
        }

        let variables = json!({
            "timestampFrom": timestamp,
            "timestampTo": timestamp + BLOCK_WINDOW_SECS,
        });

        let result: BlocksResult = self
            .clients(chain)?
            .blocks
            .query(queries::BLOCK_QUERY, variables)
            .await
            .with_context(|| format!("Block lookup at {} failed", timestamp))?;

        let block = result.blocks.first().and_then(|record| {
            Some(BlockRef::new(record.number?, record.timestamp.unwrap_or_default()))
        });

        match block {
            Some(block) => {
                debug!("{}: timestamp {} -> block {}", chain.name, timestamp, block.number);
                self.blocks.insert(key, block).await;
            },
            None => warn!("{}: no block found after timestamp {}", chain.name, timestamp),
        }

        Ok(block)
    }

    async fn pair_transactions(&self, chain: &ChainProfile, pairs: &[String]) -> Result<TransactionsResult> {
        let pairs = pairs
            .iter()
            .map(|pair| Self::entity_id(pair))
            .collect::<Result<Vec<_>>>()?;

        self.clients(chain)?
            .exchange
            .query(&queries::pair_transactions_query(), json!({ "allPairs": pairs }))
            .await
            .context("Pair transactions query failed")
    }

    async fn account_transactions(&self, chain: &ChainProfile, account: &str) -> Result<TransactionsResult> {
        let user = Self::account_variable(chain, account)?;

        self.clients(chain)?
            .exchange
            .query(
                &queries::account_transactions_query(chain.reference),
                json!({ "user": user }),
            )
            .await
            .with_context(|| format!("Transactions query for {} failed", account))
    }

    async fn account_sells(&self, chain: &ChainProfile, account: &str) -> Result<Vec<RawSwap>> {
        let user = Self::account_variable(chain, account)?;

        let result: SwapsResult = self
            .clients(chain)?
            .exchange
            .query(
                &queries::account_sells_query(chain.sell_routers),
                json!({ "user": user }),
            )
            .await
            .with_context(|| format!("Sells query for {} failed", account))?;

        Ok(result.swaps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::{BSC, MAINNET};

    #[test]
    fn test_bundle_record_reads_either_currency() {
        let eth: BundlesResult =
            serde_json::from_str(r#"{"bundles":[{"id":"1","ethPrice":"1834.52"}]}"#).unwrap();
        assert_eq!(eth.bundles[0].price, Some(1834.52));

        let bnb: BundlesResult =
            serde_json::from_str(r#"{"bundles":[{"id":"1","bnbPrice":"301.2"}]}"#).unwrap();
        assert_eq!(bnb.bundles[0].price, Some(301.2));
    }

    #[test]
    fn test_account_variable_per_chain() {
        let account = "0x7a250d5630b4cf539739df2c5dacb4c659f2488d";
        assert_eq!(
            SubgraphClient::account_variable(&MAINNET, account).unwrap(),
            "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D"
        );
        assert_eq!(SubgraphClient::account_variable(&BSC, account).unwrap(), account);
        assert!(SubgraphClient::account_variable(&MAINNET, "0x123").is_err());
    }

    #[tokio::test]
    async fn test_unconfigured_chain_fails() {
        let settings = SubgraphSettings {
            endpoints: vec![],
            request_timeout_secs: 1,
        };
        let client = SubgraphClient::new(&settings).unwrap();
        let result = client.reference_price(&MAINNET, None).await;
        assert!(result.is_err());
    }
}
