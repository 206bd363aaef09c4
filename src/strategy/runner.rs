//! One request in, one report out.

use crate::error::{StrategyError, StrategyResult};
use crate::exchange::{ChildOrderSpec, VenueGateway};
use crate::strategy::bracket::{verify_stop_loss, DEFAULT_STOP_BUFFER};
use crate::strategy::executor::{CancellationFlag, OrderExecutor, PacingPolicy};
use crate::strategy::observer::ExecutionObserver;
use crate::strategy::planner;
use crate::strategy::report::StrategyReport;
use crate::strategy::request::{StrategyKind, StrategyRequest};
use rust_decimal::Decimal;
use tracing::{error, instrument};

/// Runs strategy requests against one venue.
///
/// Planning and bracket validation happen before the first submission, so a
/// request that fails them leaves the venue untouched.
pub struct StrategyRunner<'a> {
    gateway: &'a dyn VenueGateway,
    observer: &'a dyn ExecutionObserver,
    default_buffer: Decimal,
    cancellation: Option<CancellationFlag>,
}

impl<'a> StrategyRunner<'a> {
    pub fn new(gateway: &'a dyn VenueGateway, observer: &'a dyn ExecutionObserver) -> Self {
        Self {
            gateway,
            observer,
            default_buffer: DEFAULT_STOP_BUFFER,
            cancellation: None,
        }
    }

    /// Stop-loss buffer for brackets that do not carry their own.
    pub fn with_default_buffer(mut self, buffer: Decimal) -> Self {
        self.default_buffer = buffer;
        self
    }

    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = Some(flag);
        self
    }

    fn executor(&self) -> OrderExecutor<'a> {
        let executor = OrderExecutor::new(self.gateway, self.observer);
        match &self.cancellation {
            Some(flag) => executor.with_cancellation(flag.clone()),
            None => executor,
        }
    }

    /// Plan, validate and execute `request`.
    #[instrument(skip(self, request), fields(strategy = request.name(), symbol = %request.symbol))]
    pub async fn run(&self, request: &StrategyRequest) -> StrategyResult<StrategyReport> {
        let plan = planner::plan(request).inspect_err(|e| {
            error!(error = %e, "Planning failed");
        })?;

        if let StrategyKind::Bracket(params) = &request.kind {
            verify_stop_loss(
                self.gateway,
                &request.symbol,
                params.stop_loss,
                request.side.opposite(),
                params.buffer.unwrap_or(self.default_buffer),
            )
            .await?;
        }

        self.observer.on_plan(request, &plan);

        Ok(self
            .executor()
            .execute(request.name(), plan, request.pacing())
            .await)
    }

    /// Place one order directly after checking its parameters.
    #[instrument(skip(self, order), fields(symbol = %order.symbol))]
    pub async fn run_single(&self, order: ChildOrderSpec) -> StrategyResult<StrategyReport> {
        order.validate().map_err(|reason| {
            error!(%reason, "Invalid order");
            StrategyError::InvalidParameters(reason)
        })?;

        let label = order.order_type.as_str().to_ascii_lowercase();
        Ok(self
            .executor()
            .execute(&label, vec![order], PacingPolicy::Immediate)
            .await)
    }
}
