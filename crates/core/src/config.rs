//! Startup configuration
//!
//! All configuration is read once at startup into an immutable [`Config`]
//! that is passed by reference into each component constructor. Lists of
//! interchangeable API keys are narrowed to a single choice at load time,
//! picked uniformly at random; the choice never rotates during the
//! process's lifetime.

use alloy_primitives::Address;
use rand::seq::SliceRandom;
use std::time::Duration;

use crate::ConfigError;

pub const DEFAULT_POOL_A_SUBGRAPH_URL: &str =
    "https://api.thegraph.com/subgraphs/name/ianlapham/uniswap-v3-arbitrum";
pub const DEFAULT_PAIR_B_SUBGRAPH_URL: &str =
    "https://api.thegraph.com/subgraphs/name/sushiswap/arbitrum-exchange";
pub const DEFAULT_EXPLORER_API_URL: &str = "https://api.arbiscan.io/api";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Immutable process configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Signing credential (hex private key)
    pub private_key: String,
    /// Chain RPC endpoint
    pub rpc_url: String,
    /// Flash-loan contract address
    pub contract_address: Address,
    /// Block-explorer API key selected at startup
    pub explorer_api_key: String,
    /// Market-data API key selected at startup
    pub graph_api_key: String,
    /// Venue-A pool address (also the flash-loan borrow pair)
    pub pool_a: Address,
    /// Venue-B pair address
    pub pair_b: Address,
    /// Base asset address (the asset being priced)
    pub base_token: Address,
    /// Quote asset address (the asset prices are denominated in)
    pub quote_token: Address,
    pub pool_a_subgraph_url: String,
    pub pair_b_subgraph_url: String,
    pub explorer_api_url: String,
    /// Delay between the end of one cycle and the start of the next
    pub poll_interval: Duration,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn load<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let private_key = require(&lookup, "PRIVATE_KEY")?;
        let rpc_url = require(&lookup, "RPC_URL")?;
        let contract_address = require_address(&lookup, "CONTRACT_ADDRESS")?;

        let explorer_api_key = pick_key(require_keys(&lookup, "EXPLORER_API_KEYS")?)
            .ok_or(ConfigError::MissingVar("EXPLORER_API_KEYS"))?;
        let graph_api_key = pick_key(require_keys(&lookup, "GRAPH_API_KEYS")?)
            .ok_or(ConfigError::MissingVar("GRAPH_API_KEYS"))?;

        let pool_a = require_address(&lookup, "POOL_A_ADDRESS")?;
        let pair_b = require_address(&lookup, "PAIR_B_ADDRESS")?;

        let base_token = require_address(&lookup, "BASE_TOKEN")?;
        let quote_token = require_address(&lookup, "QUOTE_TOKEN")?;

        let pool_a_subgraph_url = lookup("POOL_A_SUBGRAPH_URL")
            .unwrap_or_else(|| DEFAULT_POOL_A_SUBGRAPH_URL.to_string());
        let pair_b_subgraph_url = lookup("PAIR_B_SUBGRAPH_URL")
            .unwrap_or_else(|| DEFAULT_PAIR_B_SUBGRAPH_URL.to_string());
        let explorer_api_url =
            lookup("EXPLORER_API_URL").unwrap_or_else(|| DEFAULT_EXPLORER_API_URL.to_string());

        let poll_interval_secs = match lookup("POLL_INTERVAL_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::InvalidVar {
                var: "POLL_INTERVAL_SECS",
                reason: e.to_string(),
            })?,
            None => DEFAULT_POLL_INTERVAL_SECS,
        };

        Ok(Self {
            private_key,
            rpc_url,
            contract_address,
            explorer_api_key,
            graph_api_key,
            pool_a,
            pair_b,
            base_token,
            quote_token,
            pool_a_subgraph_url,
            pair_b_subgraph_url,
            explorer_api_url,
            poll_interval: Duration::from_secs(poll_interval_secs),
        })
    }

    /// Venue-A pool identifier, lowercase-normalized for subgraph queries.
    pub fn pool_a_id(&self) -> String {
        format!("{:#x}", self.pool_a)
    }

    /// Venue-B pair identifier, lowercase-normalized for subgraph queries.
    pub fn pair_b_id(&self) -> String {
        format!("{:#x}", self.pair_b)
    }
}

fn require<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::MissingVar(var)),
    }
}

/// Parse a comma-separated, non-empty key list.
fn require_keys<F>(lookup: &F, var: &'static str) -> Result<Vec<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = require(lookup, var)?;
    let keys: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect();

    if keys.is_empty() {
        return Err(ConfigError::MissingVar(var));
    }

    Ok(keys)
}

fn pick_key(keys: Vec<String>) -> Option<String> {
    keys.choose(&mut rand::thread_rng()).cloned()
}

fn require_address<F>(lookup: &F, var: &'static str) -> Result<Address, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = require(lookup, var)?;
    raw.parse::<Address>()
        .map_err(|e| ConfigError::InvalidVar {
            var,
            reason: e.to_string(),
        })
}
