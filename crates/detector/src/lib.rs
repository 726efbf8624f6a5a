//! Opportunity detection
//!
//! Compares two normalized price points for the same pair orientation and
//! emits a per-cycle [`Signal`].

pub mod detector;

pub use detector::OpportunityDetector;
