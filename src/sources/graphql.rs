use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use url::Url;

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: &'a Value,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

/// Minimal GraphQL-over-HTTP client for one subgraph endpoint.
#[derive(Clone)]
pub struct GraphqlClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl GraphqlClient {
    pub fn new(http: reqwest::Client, endpoint: &str) -> Result<Self> {
        let endpoint =
            Url::parse(endpoint).with_context(|| format!("Invalid subgraph URL: {}", endpoint))?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Builds the shared HTTP client used by every subgraph endpoint.
    pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")
    }

    /// POSTs `{query, variables}` and decodes `data`.
    ///
    /// A non-empty `errors` array fails the request even when partial data
    /// came back.
    pub async fn query<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&GraphqlRequest {
                query,
                variables: &variables,
            })
            .send()
            .await
            .with_context(|| format!("Subgraph request to {} failed", self.endpoint))?
            .error_for_status()
            .with_context(|| format!("Subgraph {} returned an error status", self.endpoint))?;

        let body: GraphqlResponse<T> = response
            .json()
            .await
            .context("Failed to decode subgraph response")?;

        decode(body)
    }
}

fn decode<T>(body: GraphqlResponse<T>) -> Result<T> {
    if !body.errors.is_empty() {
        let messages: Vec<&str> = body.errors.iter().map(|e| e.message.as_str()).collect();
        bail!("Subgraph query failed: {}", messages.join("; "));
    }

    body.data.ok_or_else(|| anyhow!("Subgraph response has no data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Bundle {
        id: String,
    }

    #[test]
    fn test_decode_errors_win_over_data() {
        let body: GraphqlResponse<Bundle> = serde_json::from_str(
            r#"{"data":{"id":"1"},"errors":[{"message":"indexing error"},{"message":"bad block"}]}"#,
        )
        .unwrap();
        let err = decode(body).unwrap_err();
        assert!(err.to_string().contains("indexing error; bad block"));
    }

    #[test]
    fn test_decode_data() {
        let body: GraphqlResponse<Bundle> = serde_json::from_str(r#"{"data":{"id":"1"}}"#).unwrap();
        assert_eq!(decode(body).unwrap(), Bundle { id: "1".to_string() });

        let body: GraphqlResponse<Bundle> = serde_json::from_str(r#"{"data":null}"#).unwrap();
        assert!(decode(body).is_err());
    }

    #[test]
    fn test_rejects_invalid_endpoint() {
        let http = reqwest::Client::new();
        assert!(GraphqlClient::new(http.clone(), "nope").is_err());
        assert!(GraphqlClient::new(http, "https://api.thegraph.com/subgraphs/name/x/y").is_ok());
    }
}
