//! Thin GraphQL subgraph client

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use arb_core::{PriceFeedError, PriceFeedResult};

#[derive(Debug, Serialize)]
struct GraphQuery<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct GraphResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphErrorEntry {
    message: String,
}

/// One subgraph endpoint, queried via HTTP POST
#[derive(Debug, Clone)]
pub struct SubgraphClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl SubgraphClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            api_key: None,
        }
    }

    /// Attach the market-data API key as a bearer token.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue one query and deserialize the `data` payload.
    pub async fn query<T: DeserializeOwned>(&self, query: &str) -> PriceFeedResult<T> {
        debug!(url = %self.url, "issuing subgraph query");

        let mut request = self.http.post(&self.url).json(&GraphQuery { query });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PriceFeedError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PriceFeedError::Fetch(format!(
                "subgraph returned HTTP {status}"
            )));
        }

        let body: GraphResponse<T> = response
            .json()
            .await
            .map_err(|e| PriceFeedError::Fetch(e.to_string()))?;

        if let Some(err) = body.errors.first() {
            return Err(PriceFeedError::Fetch(err.message.clone()));
        }

        body.data
            .ok_or_else(|| PriceFeedError::Fetch("subgraph response had no data".to_string()))
    }
}
