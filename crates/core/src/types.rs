//! Core type definitions

use alloy_primitives::{Address, Bytes, TxHash, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CoreError, CoreResult};

/// How a venue's spot price was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// Concentrated-liquidity pool publishing a Q64.96 square-root price
    PoolSqrtPrice,
    /// Constant-product pair priced from its token reserves
    ReserveRatio,
}

impl PriceSource {
    pub fn name(&self) -> &'static str {
        match self {
            PriceSource::PoolSqrtPrice => "pool-sqrt-price",
            PriceSource::ReserveRatio => "reserve-ratio",
        }
    }
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::error::Error for PriceSource {}

/// Normalized spot price: base token denominated in the quote token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub source: PriceSource,
    pub value: f64,
    pub base_token: Address,
    pub quote_token: Address,
    pub fetched_at_ms: u64,
}

impl PricePoint {
    /// Build a price point, rejecting non-finite or non-positive values.
    pub fn new(
        source: PriceSource,
        value: f64,
        base_token: Address,
        quote_token: Address,
    ) -> CoreResult<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(CoreError::InvalidPrice { source, value });
        }

        Ok(Self {
            source,
            value,
            base_token,
            quote_token,
            fetched_at_ms: chrono::Utc::now().timestamp_millis() as u64,
        })
    }
}

/// Per-cycle arbitrage decision
///
/// Derived solely from price ordering between the two venues; there is no
/// minimum-spread or profitability threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    /// No favorable spread this cycle
    None,
    /// Venue A is cheaper: borrow against venue A, unwind on venue B
    BuyVenueASellVenueB,
}

impl Signal {
    pub fn is_actionable(&self) -> bool {
        matches!(self, Signal::BuyVenueASellVenueB)
    }
}

/// Token amount with proper decimal handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    pub raw: U256,
    pub decimals: u8,
}

impl TokenAmount {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    pub fn from_human(amount: f64, decimals: u8) -> Self {
        let multiplier = 10u64.pow(decimals as u32);
        let raw = U256::from((amount * multiplier as f64) as u128);
        Self { raw, decimals }
    }

    pub fn to_human(&self) -> f64 {
        let divisor = 10u64.pow(self.decimals as u32) as f64;
        let raw_f64: f64 = self.raw.to_string().parse().unwrap_or(0.0);
        raw_f64 / divisor
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }
}

/// Flash-loan invocation parameters
///
/// Immutable once constructed; ownership moves into the submission call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashLoanRequest {
    pub pair: Address,
    pub amount0_out: U256,
    pub amount1_out: U256,
    pub data: Bytes,
}

impl FlashLoanRequest {
    /// Borrow `amount` of token0 from `pair`, nothing of token1, with an
    /// empty callback payload.
    pub fn borrow_token0(pair: Address, amount: U256) -> Self {
        Self {
            pair,
            amount0_out: amount,
            amount1_out: U256::ZERO,
            data: Bytes::new(),
        }
    }
}

/// Confirmation state of a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Confirmed,
    Failed,
    Unknown,
}

impl TxStatus {
    pub fn name(&self) -> &'static str {
        match self {
            TxStatus::Pending => "pending",
            TxStatus::Confirmed => "confirmed",
            TxStatus::Failed => "failed",
            TxStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A submitted flash-swap transaction and its last observed status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub hash: TxHash,
    pub status: TxStatus,
}

impl TransactionRecord {
    pub fn new(hash: TxHash, status: TxStatus) -> Self {
        Self { hash, status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_point_rejects_bad_values() {
        let base = Address::repeat_byte(1);
        let quote = Address::repeat_byte(2);

        assert!(PricePoint::new(PriceSource::PoolSqrtPrice, 3000.0, base, quote).is_ok());
        assert!(PricePoint::new(PriceSource::PoolSqrtPrice, 0.0, base, quote).is_err());
        assert!(PricePoint::new(PriceSource::ReserveRatio, -1.0, base, quote).is_err());
        assert!(PricePoint::new(PriceSource::ReserveRatio, f64::NAN, base, quote).is_err());
        assert!(PricePoint::new(PriceSource::ReserveRatio, f64::INFINITY, base, quote).is_err());
    }

    #[test]
    fn test_token_amount_conversion() {
        // USDC with 6 decimals
        let amount = TokenAmount::from_human(2000.0, 6);
        assert_eq!(amount.raw, U256::from(2_000_000_000u64));
        assert!((amount.to_human() - 2000.0).abs() < 0.0001);

        // ETH with 18 decimals
        let eth = TokenAmount::from_human(1.5, 18);
        assert!((eth.to_human() - 1.5).abs() < 0.0001);
    }

    #[test]
    fn test_borrow_request_shape() {
        let pair = Address::repeat_byte(3);
        let req = FlashLoanRequest::borrow_token0(pair, U256::from(2_000_000_000u64));

        assert_eq!(req.pair, pair);
        assert_eq!(req.amount0_out, U256::from(2_000_000_000u64));
        assert_eq!(req.amount1_out, U256::ZERO);
        assert!(req.data.is_empty());
    }

    #[test]
    fn test_signal_actionable() {
        assert!(!Signal::None.is_actionable());
        assert!(Signal::BuyVenueASellVenueB.is_actionable());
    }
}
