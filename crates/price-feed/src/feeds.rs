//! Venue price feeds
//!
//! Raw pool/pair state is deserialized straight from the subgraph response,
//! normalized into one [`PricePoint`], and dropped. Failures are reported to
//! the caller, which treats them as "no signal this cycle"; the next
//! scheduled cycle is the only retry mechanism.

use alloy_primitives::Address;
use serde::Deserialize;
use tracing::debug;

use arb_core::{PriceFeedError, PriceFeedResult, PricePoint, PriceSource};

use crate::SubgraphClient;

/// One venue's normalized spot price, behind a trait so the scheduler can
/// be driven by mock feeds in tests.
#[async_trait::async_trait]
pub trait PriceFeed: Send + Sync {
    /// Fetch fresh venue state and derive one price point.
    async fn spot_price(&self) -> PriceFeedResult<PricePoint>;

    fn source(&self) -> PriceSource;
}

/// Q64.96 square-root-price identity: price = sqrtPriceX96^2 / 2^192.
///
/// The 192 exponent is exact (2 x 96); any other scale silently misprices
/// the pool.
pub fn price_from_sqrt_x96(sqrt_price_x96: f64) -> f64 {
    (sqrt_price_x96 * sqrt_price_x96) / 2f64.powi(192)
}

// ─── Venue A: concentrated-liquidity pool ───────────────────────────────────

#[derive(Debug, Deserialize)]
struct PoolEnvelope {
    pool: Option<PoolState>,
}

#[derive(Debug, Deserialize)]
struct PoolState {
    id: String,
    token0: PoolToken,
    token1: PoolToken,
    #[serde(rename = "sqrtPriceX96")]
    sqrt_price_x96: String,
}

#[derive(Debug, Deserialize)]
struct PoolToken {
    symbol: String,
}

/// Venue-A adapter: concentrated-liquidity pool priced from its
/// square-root-price encoding.
pub struct PoolPriceFeed {
    client: SubgraphClient,
    pool_id: String,
    base_token: Address,
    quote_token: Address,
}

impl PoolPriceFeed {
    pub fn new(
        client: SubgraphClient,
        pool_id: &str,
        base_token: Address,
        quote_token: Address,
    ) -> Self {
        Self {
            client,
            // Subgraph ids are lowercase hex
            pool_id: pool_id.to_lowercase(),
            base_token,
            quote_token,
        }
    }

    fn query_text(&self) -> String {
        format!(
            r#"{{
    pool(id: "{}") {{
        id
        token0 {{ id symbol }}
        token1 {{ id symbol }}
        sqrtPriceX96
    }}
}}"#,
            self.pool_id
        )
    }
}

#[async_trait::async_trait]
impl PriceFeed for PoolPriceFeed {
    async fn spot_price(&self) -> PriceFeedResult<PricePoint> {
        let envelope: PoolEnvelope = self.client.query(&self.query_text()).await?;
        let pool = envelope
            .pool
            .ok_or_else(|| PriceFeedError::NotFound(self.pool_id.clone()))?;

        let sqrt_price: f64 = pool.sqrt_price_x96.parse().map_err(|_| {
            PriceFeedError::Fetch(format!(
                "unparsable sqrtPriceX96 {:?} for pool {}",
                pool.sqrt_price_x96, pool.id
            ))
        })?;

        let value = price_from_sqrt_x96(sqrt_price);
        debug!(
            pool = %pool.id,
            token0 = %pool.token0.symbol,
            token1 = %pool.token1.symbol,
            price = value,
            "pool spot price"
        );

        Ok(PricePoint::new(
            PriceSource::PoolSqrtPrice,
            value,
            self.base_token,
            self.quote_token,
        )?)
    }

    fn source(&self) -> PriceSource {
        PriceSource::PoolSqrtPrice
    }
}

// ─── Venue B: constant-product reserve pair ─────────────────────────────────

#[derive(Debug, Deserialize)]
struct PairEnvelope {
    pair: Option<PairState>,
}

#[derive(Debug, Deserialize)]
struct PairState {
    id: String,
    token0: PairToken,
    token1: PairToken,
    reserve0: String,
    reserve1: String,
}

#[derive(Debug, Deserialize)]
struct PairToken {
    id: String,
    symbol: String,
    decimals: String,
}

impl PairToken {
    fn address(&self) -> PriceFeedResult<Address> {
        self.id
            .parse::<Address>()
            .map_err(|_| PriceFeedError::Fetch(format!("invalid token address {:?}", self.id)))
    }

    fn decimals(&self) -> PriceFeedResult<i32> {
        self.decimals
            .parse::<i32>()
            .map_err(|_| PriceFeedError::Fetch(format!("invalid decimals {:?}", self.decimals)))
    }
}

/// Derive the base-in-quote price from a reserve pair.
///
/// Reserves are adjusted by each token's decimal precision; the ratio is
/// oriented by matching the pair's token identities against the configured
/// quote/base assets. Any other pairing is a data inconsistency, not a
/// guessing opportunity.
fn pair_spot_price(
    pair: &PairState,
    base_token: Address,
    quote_token: Address,
) -> PriceFeedResult<f64> {
    let token0 = pair.token0.address()?;
    let token1 = pair.token1.address()?;

    let reserve0: f64 = pair
        .reserve0
        .parse()
        .map_err(|_| PriceFeedError::Fetch(format!("invalid reserve0 {:?}", pair.reserve0)))?;
    let reserve1: f64 = pair
        .reserve1
        .parse()
        .map_err(|_| PriceFeedError::Fetch(format!("invalid reserve1 {:?}", pair.reserve1)))?;

    let adjusted0 = reserve0 / 10f64.powi(pair.token0.decimals()?);
    let adjusted1 = reserve1 / 10f64.powi(pair.token1.decimals()?);

    if token0 == quote_token && token1 == base_token {
        Ok(adjusted0 / adjusted1)
    } else if token0 == base_token && token1 == quote_token {
        Ok(adjusted1 / adjusted0)
    } else {
        Err(PriceFeedError::TokenOrder {
            pair: pair.id.clone(),
            token0: pair.token0.id.clone(),
            token1: pair.token1.id.clone(),
        })
    }
}

/// Venue-B adapter: constant-product pair priced from decimal-adjusted
/// reserves.
pub struct PairPriceFeed {
    client: SubgraphClient,
    pair_id: String,
    base_token: Address,
    quote_token: Address,
}

impl PairPriceFeed {
    pub fn new(
        client: SubgraphClient,
        pair_id: &str,
        base_token: Address,
        quote_token: Address,
    ) -> Self {
        Self {
            client,
            pair_id: pair_id.to_lowercase(),
            base_token,
            quote_token,
        }
    }

    fn query_text(&self) -> String {
        format!(
            r#"{{
    pair(id: "{}") {{
        id
        token0 {{ id symbol decimals }}
        token1 {{ id symbol decimals }}
        reserve0
        reserve1
    }}
}}"#,
            self.pair_id
        )
    }
}

#[async_trait::async_trait]
impl PriceFeed for PairPriceFeed {
    async fn spot_price(&self) -> PriceFeedResult<PricePoint> {
        let envelope: PairEnvelope = self.client.query(&self.query_text()).await?;
        let pair = envelope
            .pair
            .ok_or_else(|| PriceFeedError::NotFound(self.pair_id.clone()))?;

        let value = pair_spot_price(&pair, self.base_token, self.quote_token)?;
        debug!(
            pair = %pair.id,
            token0 = %pair.token0.symbol,
            token1 = %pair.token1.symbol,
            price = value,
            "pair spot price"
        );

        Ok(PricePoint::new(
            PriceSource::ReserveRatio,
            value,
            self.base_token,
            self.quote_token,
        )?)
    }

    fn source(&self) -> PriceSource {
        PriceSource::ReserveRatio
    }
}
