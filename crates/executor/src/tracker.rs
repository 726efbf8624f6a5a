//! Transaction status corroboration via a block-explorer API
//!
//! One point-in-time query per submitted transaction, issued after the
//! chain client has already awaited the receipt. The explorer's indexed
//! view is an independent second opinion, not the primary confirmation
//! signal.

use alloy_primitives::TxHash;
use serde::Deserialize;
use tracing::debug;

use arb_core::{ExecResult, ExecutionError, TxStatus};

/// Status lookup seam for scheduler tests.
#[async_trait::async_trait]
pub trait StatusProbe: Send + Sync {
    async fn check(&self, hash: TxHash) -> ExecResult<TxStatus>;
}

/// Explorer response envelope for `gettxreceiptstatus`
#[derive(Debug, Deserialize)]
struct ReceiptStatusResponse {
    status: String,
    #[serde(default)]
    message: String,
}

/// Map the explorer's envelope status code.
///
/// The API reports "1" for an indexed, successful receipt and "0" while the
/// transaction is not (yet) indexed; it does not distinguish a still-pending
/// transaction from a failed one.
fn status_from_code(code: &str) -> TxStatus {
    match code {
        "1" => TxStatus::Confirmed,
        "0" => TxStatus::Pending,
        _ => TxStatus::Unknown,
    }
}

/// Block-explorer status client
#[derive(Debug, Clone)]
pub struct StatusTracker {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl StatusTracker {
    pub fn new(http: reqwest::Client, api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }

    /// One status query, no polling loop.
    pub async fn check(&self, hash: TxHash) -> ExecResult<TxStatus> {
        let tx_hash = format!("{hash:#x}");

        let response = self
            .http
            .get(&self.api_url)
            .query(&[
                ("module", "transaction"),
                ("action", "gettxreceiptstatus"),
                ("txhash", tx_hash.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ExecutionError::StatusFetch(e.to_string()))?;

        let body: ReceiptStatusResponse = response
            .json()
            .await
            .map_err(|e| ExecutionError::StatusFetch(e.to_string()))?;

        let status = status_from_code(&body.status);
        debug!(%tx_hash, code = %body.status, message = %body.message, %status, "explorer status");

        Ok(status)
    }
}

#[async_trait::async_trait]
impl StatusProbe for StatusTracker {
    async fn check(&self, hash: TxHash) -> ExecResult<TxStatus> {
        StatusTracker::check(self, hash).await
    }
}
