//! Venue-agnostic gateway trait.
//!
//! The strategies only ever talk to a venue through [`VenueGateway`], so the
//! same orchestration runs against Binance, the paper venue, or a test mock.

use crate::error::VenueError;
use crate::exchange::types::{ChildOrderSpec, OrderReceipt};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::fmt;

/// Venue identifier used in logs and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Venue {
    Binance,
    BinanceTestnet,
    Paper,
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Venue::Binance => write!(f, "Binance"),
            Venue::BinanceTestnet => write!(f, "Binance Testnet"),
            Venue::Paper => write!(f, "Paper"),
        }
    }
}

/// Order submission and reference price access for one venue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VenueGateway: Send + Sync {
    /// Returns the venue identifier.
    fn venue(&self) -> Venue;

    /// Submit one fully-formed order.
    async fn submit(&self, order: &ChildOrderSpec) -> Result<OrderReceipt, VenueError>;

    /// Current mark price for `symbol`.
    async fn reference_price(&self, symbol: &str) -> Result<Decimal, VenueError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_venue_display() {
        assert_eq!(Venue::Binance.to_string(), "Binance");
        assert_eq!(Venue::BinanceTestnet.to_string(), "Binance Testnet");
        assert_eq!(Venue::Paper.to_string(), "Paper");
    }
}
