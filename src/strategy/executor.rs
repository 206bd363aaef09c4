//! Order execution: submits a plan child by child.
//!
//! The executor knows nothing about strategies. It takes a list of
//! [`ChildOrderSpec`] and a [`PacingPolicy`], submits the children strictly in
//! order, and records one [`ChildOutcome`] per attempt. A failed child never
//! stops the ones after it and is never retried.

use crate::exchange::{ChildOrderSpec, VenueGateway};
use crate::strategy::observer::ExecutionObserver;
use crate::strategy::report::{ChildOutcome, StrategyReport};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

/// Delay policy between consecutive child submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacingPolicy {
    /// Submit back-to-back.
    Immediate,
    /// Wait this long after every child except the last.
    FixedInterval(Duration),
}

/// Cooperative stop signal, checked only between child submissions.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    inner: Arc<CancellationInner>,
}

#[derive(Debug, Default)]
struct CancellationInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Submits planned child orders to a venue.
pub struct OrderExecutor<'a> {
    gateway: &'a dyn VenueGateway,
    observer: &'a dyn ExecutionObserver,
    cancellation: Option<CancellationFlag>,
}

impl<'a> OrderExecutor<'a> {
    /// Create a new order executor.
    pub fn new(gateway: &'a dyn VenueGateway, observer: &'a dyn ExecutionObserver) -> Self {
        Self {
            gateway,
            observer,
            cancellation: None,
        }
    }

    /// Stop between children once `flag` is cancelled.
    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationFlag::is_cancelled)
    }

    /// Wait out one pacing interval, returning early on cancellation.
    async fn pause(&self, interval: Duration) {
        match &self.cancellation {
            Some(flag) => {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = flag.cancelled() => {}
                }
            }
            None => tokio::time::sleep(interval).await,
        }
    }

    /// Submit every child of `plan` in order and collect the outcomes.
    pub async fn execute(
        &self,
        strategy: &str,
        plan: Vec<ChildOrderSpec>,
        pacing: PacingPolicy,
    ) -> StrategyReport {
        let started_at = Utc::now();
        let total = plan.len();
        let mut outcomes = Vec::with_capacity(total);
        let mut cancelled = false;

        info!(
            strategy,
            venue = %self.gateway.venue(),
            children = total,
            pacing = ?pacing,
            "Executing plan"
        );

        for (index, order) in plan.into_iter().enumerate() {
            if index > 0 {
                if let PacingPolicy::FixedInterval(interval) = pacing {
                    debug!(
                        next = index + 1,
                        total,
                        "Waiting {:?} before next order",
                        interval
                    );
                    self.pause(interval).await;
                }
            }
            if self.is_cancelled() {
                cancelled = true;
                break;
            }

            let outcome = self.submit_child(index, order).await;
            self.observer.on_child_outcome(&outcome, total);
            outcomes.push(outcome);
        }

        if cancelled {
            warn!(
                strategy,
                sent = outcomes.len(),
                remaining = total - outcomes.len(),
                "Execution cancelled; placed orders remain live"
            );
        }

        let report = StrategyReport {
            strategy: strategy.to_string(),
            planned: total,
            outcomes,
            cancelled,
            started_at,
            finished_at: Utc::now(),
        };
        self.observer.on_report(&report);
        report
    }

    async fn submit_child(&self, index: usize, order: ChildOrderSpec) -> ChildOutcome {
        match self.gateway.submit(&order).await {
            Ok(receipt) => ChildOutcome::Placed {
                index,
                order,
                receipt,
            },
            Err(e) => ChildOutcome::Failed {
                index,
                order,
                error: e.into(),
            },
        }
    }
}
