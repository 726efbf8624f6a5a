//! Cross-venue spread detection

use tracing::{debug, info};

use arb_core::{PricePoint, Signal};

/// Pure comparison of two venue prices.
///
/// Policy: a strict `venue_a < venue_b` means buy on the cheaper venue A and
/// sell on venue B. There is no minimum-spread, fee, or gas threshold, and
/// equal prices never trigger. The caller is responsible for supplying both
/// prices in the same base/quote orientation.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpportunityDetector;

impl OpportunityDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, venue_a: &PricePoint, venue_b: &PricePoint) -> Signal {
        let spread = venue_b.value - venue_a.value;

        if venue_a.value < venue_b.value {
            info!(
                venue_a = venue_a.value,
                venue_b = venue_b.value,
                spread,
                "arbitrage opportunity: buy on venue A, sell on venue B"
            );
            Signal::BuyVenueASellVenueB
        } else {
            debug!(
                venue_a = venue_a.value,
                venue_b = venue_b.value,
                spread,
                "no favorable spread"
            );
            Signal::None
        }
    }
}
