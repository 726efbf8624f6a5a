//! Error types

use thiserror::Error;

use crate::PriceSource;

/// Core error types
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("price from {source} must be positive and finite, got {value}")]
    InvalidPrice { source: PriceSource, value: f64 },
}

/// Startup configuration errors (fatal: the process exits with code 1)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {var}: {reason}")]
    InvalidVar { var: &'static str, reason: String },
}

/// Price feed errors (non-fatal: the cycle is skipped)
#[derive(Debug, Error)]
pub enum PriceFeedError {
    #[error("price query failed: {0}")]
    Fetch(String),

    #[error("no data returned for identifier {0}")]
    NotFound(String),

    #[error("unexpected token order in pair {pair}: token0={token0} token1={token1}")]
    TokenOrder {
        pair: String,
        token0: String,
        token1: String,
    },

    #[error(transparent)]
    InvalidPrice(#[from] CoreError),
}

/// Execution errors (non-fatal at the process level)
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    #[error("invalid RPC endpoint: {0}")]
    Endpoint(String),

    #[error("flash swap submission failed: {0}")]
    Submission(String),

    #[error("transaction {hash} confirmation wait failed: {reason}")]
    NotMined { hash: String, reason: String },

    #[error("status query failed: {0}")]
    StatusFetch(String),
}

/// Result type aliases
pub type CoreResult<T> = Result<T, CoreError>;
pub type PriceFeedResult<T> = Result<T, PriceFeedError>;
pub type ExecResult<T> = Result<T, ExecutionError>;
