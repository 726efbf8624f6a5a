//! Price source adapters for the two market-data backends
//!
//! Each venue is queried through a GraphQL subgraph and normalized into a
//! common [`arb_core::PricePoint`]:
//! - Concentrated-liquidity pools publish a Q64.96 square-root price
//! - Constant-product pairs are priced from decimal-adjusted reserves
//!
//! Pool state is fetched fresh on every cycle and never cached.

pub mod feeds;
pub mod subgraph;

pub use feeds::{price_from_sqrt_x96, PairPriceFeed, PoolPriceFeed, PriceFeed};
pub use subgraph::SubgraphClient;
