//! Strategy requests: one caller intent, tagged by strategy kind.

use crate::error::{StrategyError, StrategyResult};
use crate::exchange::{OrderSide, WorkingType};
use crate::strategy::executor::PacingPolicy;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Limit orders spread evenly across `[price_low, price_high)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridParams {
    pub quantity_per_level: Decimal,
    pub price_low: Decimal,
    pub price_high: Decimal,
    pub levels: u32,
}

/// Equal market orders paced by a fixed interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeWeightedParams {
    pub total_quantity: Decimal,
    pub chunks: u32,
    pub interval_secs: u64,
}

/// Take-profit and stop-loss exits for an open position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BracketParams {
    pub quantity: Decimal,
    pub take_profit: Decimal,
    pub stop_loss: Decimal,
    /// Minimum stop distance from the mark price; the configured default when `None`
    pub buffer: Option<Decimal>,
}

/// A single stop-limit order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggeredLimitParams {
    pub quantity: Decimal,
    pub limit_price: Decimal,
    pub trigger_price: Decimal,
    pub working_type: WorkingType,
}

/// The four supported strategies, each with its own parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyKind {
    Grid(GridParams),
    TimeWeighted(TimeWeightedParams),
    Bracket(BracketParams),
    TriggeredLimit(TriggeredLimitParams),
}

impl StrategyKind {
    /// Short name used in logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Grid(_) => "grid",
            StrategyKind::TimeWeighted(_) => "twap",
            StrategyKind::Bracket(_) => "bracket",
            StrategyKind::TriggeredLimit(_) => "stop-limit",
        }
    }

    /// How the planned children are paced on submission.
    pub fn pacing(&self) -> PacingPolicy {
        match self {
            StrategyKind::TimeWeighted(p) => {
                PacingPolicy::FixedInterval(Duration::from_secs(p.interval_secs))
            }
            _ => PacingPolicy::Immediate,
        }
    }
}

/// A caller's trading intent. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyRequest {
    pub symbol: String,
    /// Position direction: the side of the entries, or of the position a
    /// bracket protects
    pub side: OrderSide,
    pub kind: StrategyKind,
}

impl StrategyRequest {
    pub fn new(symbol: impl Into<String>, side: OrderSide, kind: StrategyKind) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            kind,
        }
    }

    /// Build a request from raw caller input.
    ///
    /// The symbol is upper-cased; the side must be `BUY` or `SELL` in any case.
    pub fn from_input(symbol: &str, side: &str, kind: StrategyKind) -> StrategyResult<Self> {
        let symbol = symbol.trim().to_ascii_uppercase();
        if symbol.is_empty() {
            return Err(StrategyError::InvalidParameters(
                "symbol must not be empty".to_string(),
            ));
        }
        let side = side.parse::<OrderSide>().map_err(StrategyError::InvalidParameters)?;
        Ok(Self::new(symbol, side, kind))
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn pacing(&self) -> PacingPolicy {
        self.kind.pacing()
    }
}

impl fmt::Display for StrategyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            StrategyKind::Grid(p) => write!(
                f,
                "grid {} {}: {} x {} levels in [{}, {})",
                self.side, self.symbol, p.quantity_per_level, p.levels, p.price_low, p.price_high
            ),
            StrategyKind::TimeWeighted(p) => write!(
                f,
                "twap {} {}: {} in {} chunks every {}s",
                self.side, self.symbol, p.total_quantity, p.chunks, p.interval_secs
            ),
            StrategyKind::Bracket(p) => write!(
                f,
                "bracket for {} {} position: {} TP {} SL {}",
                self.side, self.symbol, p.quantity, p.take_profit, p.stop_loss
            ),
            StrategyKind::TriggeredLimit(p) => write!(
                f,
                "stop-limit {} {}: {} @ {} trigger {} on {}",
                self.side,
                self.symbol,
                p.quantity,
                p.limit_price,
                p.trigger_price,
                p.working_type
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn twap(interval_secs: u64) -> StrategyKind {
        StrategyKind::TimeWeighted(TimeWeightedParams {
            total_quantity: dec!(1),
            chunks: 4,
            interval_secs,
        })
    }

    #[test]
    fn test_from_input_normalizes_symbol_and_side() {
        let request = StrategyRequest::from_input(" btcusdt ", "sell", twap(10)).unwrap();
        assert_eq!(request.symbol, "BTCUSDT");
        assert_eq!(request.side, OrderSide::Sell);
        assert_eq!(request.name(), "twap");
    }

    #[test]
    fn test_from_input_rejects_unknown_side() {
        let err = StrategyRequest::from_input("BTCUSDT", "LONG", twap(10)).unwrap_err();
        assert!(matches!(err, StrategyError::InvalidParameters(_)));

        let err = StrategyRequest::from_input("  ", "BUY", twap(10)).unwrap_err();
        assert!(matches!(err, StrategyError::InvalidParameters(_)));
    }

    #[test]
    fn test_only_time_weighted_is_paced() {
        assert_eq!(
            twap(10).pacing(),
            PacingPolicy::FixedInterval(Duration::from_secs(10))
        );

        let grid = StrategyKind::Grid(GridParams {
            quantity_per_level: dec!(0.01),
            price_low: dec!(100),
            price_high: dec!(200),
            levels: 5,
        });
        assert_eq!(grid.pacing(), PacingPolicy::Immediate);
    }

    #[test]
    fn test_display() {
        let request = StrategyRequest::new("BTCUSDT", OrderSide::Buy, twap(30));
        assert_eq!(
            request.to_string(),
            "twap BUY BTCUSDT: 1 in 4 chunks every 30s"
        );
    }
}
