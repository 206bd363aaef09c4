//! Execution observers.
//!
//! The runner and executor report progress through [`ExecutionObserver`]
//! instead of writing to any sink directly. [`LogObserver`] is the audit
//! trail; [`ConsoleObserver`] prints the human-readable lines.

use crate::exchange::ChildOrderSpec;
use crate::strategy::report::{ChildOutcome, StrategyReport};
use crate::strategy::request::StrategyRequest;
use tracing::{error, info, warn};

/// Receives strategy progress events.
///
/// All methods default to doing nothing.
pub trait ExecutionObserver: Send + Sync {
    /// A request was planned (and, for brackets, validated).
    fn on_plan(&self, _request: &StrategyRequest, _plan: &[ChildOrderSpec]) {}

    /// One child was attempted. `total` is the planned child count.
    fn on_child_outcome(&self, _outcome: &ChildOutcome, _total: usize) {}

    /// The run finished.
    fn on_report(&self, _report: &StrategyReport) {}
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ExecutionObserver for NoopObserver {}

/// Writes one structured `tracing` event per decision and outcome.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ExecutionObserver for LogObserver {
    fn on_plan(&self, request: &StrategyRequest, plan: &[ChildOrderSpec]) {
        info!(
            strategy = request.name(),
            symbol = %request.symbol,
            side = %request.side,
            children = plan.len(),
            "Planned {}",
            request
        );
    }

    fn on_child_outcome(&self, outcome: &ChildOutcome, total: usize) {
        let position = outcome.index() + 1;
        match outcome {
            ChildOutcome::Placed { order, receipt, .. } => info!(
                order_id = receipt.order_id,
                status = ?receipt.status,
                "Order {}/{}: {}",
                position,
                total,
                order
            ),
            ChildOutcome::Failed { order, error, .. } => error!(
                kind = ?error.kind,
                code = ?error.code,
                "Order {}/{} failed: {} ({})",
                position,
                total,
                order,
                error
            ),
        }
    }

    fn on_report(&self, report: &StrategyReport) {
        if report.cancelled {
            warn!("{}", report.summary());
        } else {
            info!("{}", report.summary());
        }
    }
}

/// Prints one line per child and a final summary to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver;

impl ExecutionObserver for ConsoleObserver {
    fn on_plan(&self, request: &StrategyRequest, plan: &[ChildOrderSpec]) {
        println!("Placing {} ({} orders)", request, plan.len());
    }

    fn on_child_outcome(&self, outcome: &ChildOutcome, total: usize) {
        let position = outcome.index() + 1;
        match outcome {
            ChildOutcome::Placed { order, receipt, .. } => println!(
                "✅ Order {}/{} placed: {} (id {})",
                position, total, order, receipt.order_id
            ),
            ChildOutcome::Failed { order, error, .. } => {
                println!("❌ Order {}/{} failed: {} - {}", position, total, order, error)
            }
        }
    }

    fn on_report(&self, report: &StrategyReport) {
        println!("{}", report.summary());
        if report.placed_count() > 0 {
            println!("⚠️  Placed orders stay live on the venue. Monitor them manually.");
        }
    }
}

/// Fans events out to several observers in order.
#[derive(Default)]
pub struct ObserverSet {
    observers: Vec<Box<dyn ExecutionObserver>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, observer: impl ExecutionObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }
}

impl ExecutionObserver for ObserverSet {
    fn on_plan(&self, request: &StrategyRequest, plan: &[ChildOrderSpec]) {
        for observer in &self.observers {
            observer.on_plan(request, plan);
        }
    }

    fn on_child_outcome(&self, outcome: &ChildOutcome, total: usize) {
        for observer in &self.observers {
            observer.on_child_outcome(outcome, total);
        }
    }

    fn on_report(&self, report: &StrategyReport) {
        for observer in &self.observers {
            observer.on_report(report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Counter(Arc<Mutex<Vec<&'static str>>>);

    impl ExecutionObserver for Counter {
        fn on_report(&self, _report: &StrategyReport) {
            self.0.lock().unwrap().push("report");
        }
    }

    #[test]
    fn test_observer_set_fans_out_in_order() {
        let first = Counter::default();
        let second = Counter::default();
        let set = ObserverSet::new()
            .with(first.clone())
            .with(NoopObserver)
            .with(second.clone());

        let report = StrategyReport {
            strategy: "grid".to_string(),
            planned: 0,
            outcomes: Vec::new(),
            cancelled: false,
            started_at: Utc::now(),
            finished_at: Utc::now(),
        };
        set.on_report(&report);

        assert_eq!(*first.0.lock().unwrap(), vec!["report"]);
        assert_eq!(*second.0.lock().unwrap(), vec!["report"]);
    }
}
