//! Core types and utilities for the flash-loan arbitrage bot
//!
//! This crate provides shared types used across all components:
//! - Normalized price points and arbitrage signals
//! - Flash-loan requests and transaction records
//! - Startup configuration
//! - Error taxonomy

pub mod types;
pub mod config;
pub mod errors;

pub use types::*;
pub use config::*;
pub use errors::*;
