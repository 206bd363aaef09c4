//! # Futures Order Bot
//!
//! Splits one trading intent into child orders and submits them to Binance
//! Futures, one order at a time, so a failed order never takes the rest of
//! the batch down with it.
//!
//! ## Architecture
//!
//! - `config`: Configuration management and validation
//! - `error`: Batch-level and per-order error types
//! - `exchange`: Binance REST client, paper venue and the gateway trait
//! - `strategy`: Planning, bracket checks, paced execution and reporting
//! - `utils`: Shared utilities and decimal arithmetic

pub mod config;
pub mod error;
pub mod exchange;
pub mod strategy;
pub mod utils;

pub use config::Config;
pub use error::{ChildSubmissionFailed, StrategyError, VenueError};
