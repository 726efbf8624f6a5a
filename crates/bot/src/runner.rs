//! Fixed-cadence scheduler loop
//!
//! One cycle runs the full chain to completion before the next delay is
//! armed: fetch both venue prices, compare, and on a favorable spread
//! submit one flash swap and corroborate its confirmation. The delay is
//! measured from the end of the previous cycle, so cycles cannot overlap
//! and submission order equals detection order.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use tokio::sync::oneshot;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use arb_core::{FlashLoanRequest, PriceFeedError, TransactionRecord};
use arb_detector::OpportunityDetector;
use arb_executor::{fixed_borrow_amount, FlashExecutor, StatusProbe};
use arb_price_feed::PriceFeed;

/// Outcome of one scheduler cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A price fetch failed; nothing was compared
    NoData,
    /// Both prices compared, no favorable spread
    NoOpportunity,
    /// One flash swap was submitted and mined
    Executed(TransactionRecord),
    /// The flash swap submission was rejected; the loop continues
    SubmissionFailed,
}

pub struct CycleRunner {
    venue_a: Arc<dyn PriceFeed>,
    venue_b: Arc<dyn PriceFeed>,
    detector: OpportunityDetector,
    executor: Arc<dyn FlashExecutor>,
    tracker: Arc<dyn StatusProbe>,
    /// Venue-A pool the flash loan is borrowed against
    flash_pair: Address,
    interval: Duration,
}

impl CycleRunner {
    pub fn new(
        venue_a: Arc<dyn PriceFeed>,
        venue_b: Arc<dyn PriceFeed>,
        detector: OpportunityDetector,
        executor: Arc<dyn FlashExecutor>,
        tracker: Arc<dyn StatusProbe>,
        flash_pair: Address,
        interval: Duration,
    ) -> Self {
        Self {
            venue_a,
            venue_b,
            detector,
            executor,
            tracker,
            flash_pair,
            interval,
        }
    }

    /// Run cycles until shutdown is signalled.
    ///
    /// The shutdown receiver is observed only between cycles; an in-flight
    /// cycle always runs to completion.
    pub async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        info!(
            interval_secs = self.interval.as_secs(),
            "starting arbitrage loop"
        );

        loop {
            let outcome = self.run_cycle().await;
            debug!(?outcome, "cycle complete");

            tokio::select! {
                _ = sleep(self.interval) => {}
                _ = &mut shutdown => {
                    info!("shutdown requested, stopping loop");
                    break;
                }
            }
        }
    }

    /// One full cycle of the detection and execution chain.
    pub async fn run_cycle(&self) -> CycleOutcome {
        info!("checking for arbitrage opportunities");

        let venue_a = match self.venue_a.spot_price().await {
            Ok(point) => point,
            Err(e) => return skip_cycle(e),
        };
        let venue_b = match self.venue_b.spot_price().await {
            Ok(point) => point,
            Err(e) => return skip_cycle(e),
        };

        info!(
            venue_a = venue_a.value,
            venue_b = venue_b.value,
            "venue prices"
        );

        if !self.detector.evaluate(&venue_a, &venue_b).is_actionable() {
            return CycleOutcome::NoOpportunity;
        }

        let request = FlashLoanRequest::borrow_token0(self.flash_pair, fixed_borrow_amount().raw);
        let record = match self.executor.execute(request).await {
            Ok(record) => record,
            Err(e) => {
                error!(error = %e, "flash swap failed");
                return CycleOutcome::SubmissionFailed;
            }
        };

        // Second opinion from the explorer's indexed view; the receipt wait
        // above is the primary confirmation signal.
        match self.tracker.check(record.hash).await {
            Ok(status) => info!(hash = %record.hash, %status, "explorer corroboration"),
            Err(e) => error!(error = %e, "status check failed"),
        }

        CycleOutcome::Executed(record)
    }
}

/// Convert a fetch failure into a "no opportunity this cycle" outcome. The
/// next scheduled cycle is the only retry mechanism.
fn skip_cycle(err: PriceFeedError) -> CycleOutcome {
    match &err {
        PriceFeedError::NotFound(_) | PriceFeedError::TokenOrder { .. } => {
            warn!(error = %err, "inconsistent venue data, skipping cycle");
        }
        _ => {
            error!(error = %err, "price fetch failed, skipping cycle");
        }
    }
    CycleOutcome::NoData
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use alloy_primitives::{TxHash, U256};
    use arb_core::{ExecResult, ExecutionError, PriceFeedResult, PricePoint, PriceSource, TxStatus};

    const PAIR: Address = Address::repeat_byte(0x77);

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        Fetch,
        ExecStart,
        ExecEnd,
    }

    type EventLog = Arc<Mutex<Vec<Event>>>;

    struct StaticFeed {
        value: f64,
        source: PriceSource,
        calls: Arc<AtomicUsize>,
        events: Option<EventLog>,
    }

    impl StaticFeed {
        fn new(value: f64, source: PriceSource) -> Self {
            Self {
                value,
                source,
                calls: Arc::new(AtomicUsize::new(0)),
                events: None,
            }
        }

        fn with_events(mut self, events: EventLog) -> Self {
            self.events = Some(events);
            self
        }
    }

    #[async_trait::async_trait]
    impl PriceFeed for StaticFeed {
        async fn spot_price(&self) -> PriceFeedResult<PricePoint> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(events) = &self.events {
                events.lock().unwrap().push(Event::Fetch);
            }
            Ok(PricePoint::new(
                self.source,
                self.value,
                Address::repeat_byte(0xbb),
                Address::repeat_byte(0xcc),
            )?)
        }

        fn source(&self) -> PriceSource {
            self.source
        }
    }

    struct BrokenFeed;

    #[async_trait::async_trait]
    impl PriceFeed for BrokenFeed {
        async fn spot_price(&self) -> PriceFeedResult<PricePoint> {
            Err(PriceFeedError::TokenOrder {
                pair: "0x77".into(),
                token0: "0x01".into(),
                token1: "0x02".into(),
            })
        }

        fn source(&self) -> PriceSource {
            PriceSource::ReserveRatio
        }
    }

    struct MockExecutor {
        calls: Mutex<Vec<FlashLoanRequest>>,
        fail: bool,
        delay: Duration,
        events: Option<EventLog>,
    }

    impl MockExecutor {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail: false,
                delay: Duration::ZERO,
                events: None,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }

        fn slow(delay: Duration, events: EventLog) -> Self {
            Self {
                delay,
                events: Some(events),
                ..Self::new()
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl FlashExecutor for MockExecutor {
        async fn execute(&self, req: FlashLoanRequest) -> ExecResult<TransactionRecord> {
            self.calls.lock().unwrap().push(req);
            if let Some(events) = &self.events {
                events.lock().unwrap().push(Event::ExecStart);
            }
            if !self.delay.is_zero() {
                sleep(self.delay).await;
            }
            if let Some(events) = &self.events {
                events.lock().unwrap().push(Event::ExecEnd);
            }
            if self.fail {
                return Err(ExecutionError::Submission("execution reverted".into()));
            }
            Ok(TransactionRecord::new(
                TxHash::repeat_byte(0xe7),
                TxStatus::Confirmed,
            ))
        }
    }

    struct MockProbe {
        calls: AtomicUsize,
    }

    impl MockProbe {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl StatusProbe for MockProbe {
        async fn check(&self, _hash: TxHash) -> ExecResult<TxStatus> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(TxStatus::Confirmed)
        }
    }

    fn runner(
        venue_a: Arc<dyn PriceFeed>,
        venue_b: Arc<dyn PriceFeed>,
        executor: Arc<dyn FlashExecutor>,
        tracker: Arc<MockProbe>,
    ) -> CycleRunner {
        CycleRunner::new(
            venue_a,
            venue_b,
            OpportunityDetector::new(),
            executor,
            tracker,
            PAIR,
            Duration::from_secs(60),
        )
    }

    #[tokio::test]
    async fn test_cheaper_venue_a_submits_one_flash_swap() {
        let executor = Arc::new(MockExecutor::new());
        let tracker = Arc::new(MockProbe::new());
        let r = runner(
            Arc::new(StaticFeed::new(3000.0, PriceSource::PoolSqrtPrice)),
            Arc::new(StaticFeed::new(3005.0, PriceSource::ReserveRatio)),
            executor.clone(),
            tracker.clone(),
        );

        let outcome = r.run_cycle().await;
        assert!(matches!(outcome, CycleOutcome::Executed(record)
            if record.status == TxStatus::Confirmed));

        let calls = executor.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].pair, PAIR);
        assert_eq!(calls[0].amount0_out, U256::from(2_000_000_000u64));
        assert_eq!(calls[0].amount1_out, U256::ZERO);
        assert!(calls[0].data.is_empty());

        // Corroboration check ran exactly once, after confirmation
        assert_eq!(tracker.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_pricier_venue_a_submits_nothing() {
        let executor = Arc::new(MockExecutor::new());
        let tracker = Arc::new(MockProbe::new());
        let r = runner(
            Arc::new(StaticFeed::new(3005.0, PriceSource::PoolSqrtPrice)),
            Arc::new(StaticFeed::new(3000.0, PriceSource::ReserveRatio)),
            executor.clone(),
            tracker.clone(),
        );

        assert_eq!(r.run_cycle().await, CycleOutcome::NoOpportunity);
        assert_eq!(executor.call_count(), 0);
        assert_eq!(tracker.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_inconsistent_pair_data_skips_cycle() {
        let executor = Arc::new(MockExecutor::new());
        let tracker = Arc::new(MockProbe::new());
        let r = runner(
            Arc::new(StaticFeed::new(3000.0, PriceSource::PoolSqrtPrice)),
            Arc::new(BrokenFeed),
            executor.clone(),
            tracker.clone(),
        );

        assert_eq!(r.run_cycle().await, CycleOutcome::NoData);
        assert_eq!(executor.call_count(), 0);
    }

    #[tokio::test]
    async fn test_submission_failure_does_not_stop_the_loop() {
        let executor = Arc::new(MockExecutor::failing());
        let tracker = Arc::new(MockProbe::new());
        let r = runner(
            Arc::new(StaticFeed::new(3000.0, PriceSource::PoolSqrtPrice)),
            Arc::new(StaticFeed::new(3005.0, PriceSource::ReserveRatio)),
            executor.clone(),
            tracker.clone(),
        );

        assert_eq!(r.run_cycle().await, CycleOutcome::SubmissionFailed);
        // The next cycle still runs and submits again
        assert_eq!(r.run_cycle().await, CycleOutcome::SubmissionFailed);
        assert_eq!(executor.call_count(), 2);
        assert_eq!(tracker.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_flight_across_slow_confirmation() {
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));

        let venue_a = Arc::new(
            StaticFeed::new(3000.0, PriceSource::PoolSqrtPrice).with_events(events.clone()),
        );
        let venue_b = Arc::new(
            StaticFeed::new(3005.0, PriceSource::ReserveRatio).with_events(events.clone()),
        );
        // Confirmation wait far longer than the cycle interval
        let executor = Arc::new(MockExecutor::slow(
            Duration::from_secs(300),
            events.clone(),
        ));
        let tracker = Arc::new(MockProbe::new());

        let r = runner(venue_a.clone(), venue_b, executor.clone(), tracker);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(r.run(shutdown_rx));

        // Two full cycles: 300s execution + 60s delay each
        sleep(Duration::from_secs(700)).await;
        let _ = shutdown_tx.send(());
        handle.await.unwrap();

        // No fetch ever starts while a confirmation wait is outstanding;
        // a timer firing at the fixed interval would have fetched ~12 times.
        let log = events.lock().unwrap();
        assert_eq!(
            *log,
            vec![
                Event::Fetch,
                Event::Fetch,
                Event::ExecStart,
                Event::ExecEnd,
                Event::Fetch,
                Event::Fetch,
                Event::ExecStart,
                Event::ExecEnd,
            ]
        );
        assert_eq!(executor.call_count(), 2);
    }
}
