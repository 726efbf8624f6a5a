//! Flash-swap submission against the on-chain contract

use alloy::network::EthereumWallet;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy_primitives::Address;
use tracing::info;

use arb_core::{
    ExecResult, ExecutionError, FlashLoanRequest, TokenAmount, TransactionRecord, TxStatus,
};

sol! {
    #[sol(rpc)]
    interface IFlashSwap {
        function startFlashSwap(
            address pair,
            uint256 amount0Out,
            uint256 amount1Out,
            bytes calldata data
        ) external;
    }
}

/// Fixed flash-loan sizing: 2000 units of the quote asset at 6 decimals,
/// regardless of the detected spread magnitude.
pub const BORROW_AMOUNT_QUOTE: f64 = 2000.0;
pub const QUOTE_TOKEN_DECIMALS: u8 = 6;

pub fn fixed_borrow_amount() -> TokenAmount {
    TokenAmount::from_human(BORROW_AMOUNT_QUOTE, QUOTE_TOKEN_DECIMALS)
}

/// Submits flash-loan requests, behind a trait so the scheduler can be
/// tested with a mock executor.
#[async_trait::async_trait]
pub trait FlashExecutor: Send + Sync {
    async fn execute(&self, req: FlashLoanRequest) -> ExecResult<TransactionRecord>;
}

/// Signing client for the flash-swap contract
#[derive(Debug)]
pub struct FlashSwapClient {
    contract: IFlashSwap::IFlashSwapInstance<DynProvider>,
}

impl FlashSwapClient {
    /// Build a wallet-backed HTTP provider and bind the contract.
    pub fn connect(
        rpc_url: &str,
        private_key: &str,
        contract_address: Address,
    ) -> ExecResult<Self> {
        let signer = private_key
            .parse::<PrivateKeySigner>()
            .map_err(|e| ExecutionError::InvalidKey(e.to_string()))?;

        let url = rpc_url
            .parse::<reqwest::Url>()
            .map_err(|e| ExecutionError::Endpoint(e.to_string()))?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();

        Ok(Self {
            contract: IFlashSwap::new(contract_address, provider),
        })
    }

    /// Submit one flash swap and block (within the async flow) until the
    /// transaction is mined.
    pub async fn execute(&self, req: FlashLoanRequest) -> ExecResult<TransactionRecord> {
        info!(
            pair = %req.pair,
            amount0_out = %req.amount0_out,
            amount1_out = %req.amount1_out,
            "initiating flash swap"
        );

        let pending = self
            .contract
            .startFlashSwap(req.pair, req.amount0_out, req.amount1_out, req.data)
            .send()
            .await
            .map_err(|e| ExecutionError::Submission(e.to_string()))?;

        let hash = *pending.tx_hash();
        info!(%hash, "flash swap submitted");

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ExecutionError::NotMined {
                hash: format!("{hash:#x}"),
                reason: e.to_string(),
            })?;

        let status = if receipt.status() {
            TxStatus::Confirmed
        } else {
            TxStatus::Failed
        };
        info!(%hash, %status, "flash swap mined");

        Ok(TransactionRecord::new(hash, status))
    }
}

#[async_trait::async_trait]
impl FlashExecutor for FlashSwapClient {
    async fn execute(&self, req: FlashLoanRequest) -> ExecResult<TransactionRecord> {
        FlashSwapClient::execute(self, req).await
    }
}
