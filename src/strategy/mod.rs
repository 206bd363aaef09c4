//! Order strategies.
//!
//! Contains the core logic for:
//! - Planning a request into child orders (grid, TWAP, bracket, stop-limit)
//! - Checking bracket stop-losses against the mark price
//! - Submitting child orders with pacing and per-order failure isolation
//! - Reporting progress to observers

pub mod bracket;
mod executor;
mod observer;
pub mod planner;
mod report;
mod request;
mod runner;

pub use bracket::{validate_stop_loss, verify_stop_loss, DEFAULT_STOP_BUFFER};
pub use executor::{CancellationFlag, OrderExecutor, PacingPolicy};
pub use observer::{ConsoleObserver, ExecutionObserver, LogObserver, NoopObserver, ObserverSet};
pub use planner::plan;
pub use report::{ChildOutcome, StrategyReport};
pub use request::{
    BracketParams, GridParams, StrategyKind, StrategyRequest, TimeWeightedParams,
    TriggeredLimitParams,
};
pub use runner::StrategyRunner;
