//! On-chain flash-swap execution and confirmation tracking
//!
//! - [`FlashSwapClient`] submits one `startFlashSwap` call per triggered
//!   cycle and awaits the receipt before returning.
//! - [`StatusTracker`] corroborates the confirmation through a
//!   block-explorer API after the receipt wait has already resolved.

pub mod flash;
pub mod tracker;

pub use flash::{fixed_borrow_amount, FlashExecutor, FlashSwapClient};
pub use tracker::{StatusProbe, StatusTracker};
