//! Strategy planning: request in, child orders out.
//!
//! Planning is pure and deterministic. Every parameter is validated before
//! the first child is built, so a request either yields its complete plan or
//! an `InvalidParameters` error and nothing else.

use crate::error::{StrategyError, StrategyResult};
use crate::exchange::{ChildOrderSpec, WorkingType};
use crate::strategy::request::{
    BracketParams, GridParams, StrategyKind, StrategyRequest, TimeWeightedParams,
    TriggeredLimitParams,
};
use crate::utils::decimal::{require_positive, require_positive_count, round_price, round_quantity};
use rust_decimal::Decimal;

/// Turn a request into its ordered child orders.
pub fn plan(request: &StrategyRequest) -> StrategyResult<Vec<ChildOrderSpec>> {
    if request.symbol.trim().is_empty() {
        return Err(StrategyError::InvalidParameters(
            "symbol must not be empty".to_string(),
        ));
    }

    match &request.kind {
        StrategyKind::Grid(params) => plan_grid(request, params),
        StrategyKind::TimeWeighted(params) => plan_time_weighted(request, params),
        StrategyKind::Bracket(params) => plan_bracket(request, params),
        StrategyKind::TriggeredLimit(params) => plan_triggered_limit(request, params),
    }
}

/// Grid levels: `round(low + i * step, 2)` for `i` in `0..levels`.
///
/// `price_high` itself is never a level. Levels that collide after rounding
/// are kept as-is.
fn plan_grid(request: &StrategyRequest, p: &GridParams) -> StrategyResult<Vec<ChildOrderSpec>> {
    require_positive("quantity", p.quantity_per_level)?;
    require_positive("min_price", p.price_low)?;
    require_positive("max_price", p.price_high)?;
    require_positive_count("grids", u64::from(p.levels))?;

    if p.price_low >= p.price_high {
        return Err(StrategyError::InvalidParameters(format!(
            "min_price ({}) must be less than max_price ({})",
            p.price_low, p.price_high
        )));
    }

    let step = (p.price_high - p.price_low) / Decimal::from(p.levels);

    Ok((0..p.levels)
        .map(|i| {
            let price = round_price(p.price_low + Decimal::from(i) * step);
            ChildOrderSpec::limit(&request.symbol, request.side, p.quantity_per_level, price)
        })
        .collect())
}

/// Equal market chunks of `round(total / chunks, 6)`.
fn plan_time_weighted(
    request: &StrategyRequest,
    p: &TimeWeightedParams,
) -> StrategyResult<Vec<ChildOrderSpec>> {
    require_positive("total_quantity", p.total_quantity)?;
    require_positive_count("chunks", u64::from(p.chunks))?;
    require_positive_count("interval", p.interval_secs)?;

    let chunk_quantity = round_quantity(p.total_quantity / Decimal::from(p.chunks));
    if chunk_quantity.is_zero() {
        return Err(StrategyError::InvalidParameters(format!(
            "total_quantity {} split into {} chunks rounds to zero per chunk",
            p.total_quantity, p.chunks
        )));
    }

    Ok((0..p.chunks)
        .map(|_| ChildOrderSpec::market(&request.symbol, request.side, chunk_quantity))
        .collect())
}

/// Take-profit limit and stop-market exits on the opposite side.
///
/// Both legs are placed independently; neither cancels the other.
fn plan_bracket(
    request: &StrategyRequest,
    p: &BracketParams,
) -> StrategyResult<Vec<ChildOrderSpec>> {
    require_positive("quantity", p.quantity)?;
    require_positive("take_profit_price", p.take_profit)?;
    require_positive("stop_loss_price", p.stop_loss)?;
    if let Some(buffer) = p.buffer {
        if buffer < Decimal::ZERO {
            return Err(StrategyError::InvalidParameters(format!(
                "buffer must not be negative, got {}",
                buffer
            )));
        }
    }

    let exit_side = request.side.opposite();
    Ok(vec![
        ChildOrderSpec::limit(&request.symbol, exit_side, p.quantity, p.take_profit),
        ChildOrderSpec::stop_trigger(
            &request.symbol,
            exit_side,
            p.quantity,
            p.stop_loss,
            WorkingType::MarkPrice,
        ),
    ])
}

fn plan_triggered_limit(
    request: &StrategyRequest,
    p: &TriggeredLimitParams,
) -> StrategyResult<Vec<ChildOrderSpec>> {
    require_positive("quantity", p.quantity)?;
    require_positive("price", p.limit_price)?;
    require_positive("stop_price", p.trigger_price)?;

    Ok(vec![ChildOrderSpec::stop_trigger_limit(
        &request.symbol,
        request.side,
        p.quantity,
        p.limit_price,
        p.trigger_price,
        p.working_type,
    )])
}
