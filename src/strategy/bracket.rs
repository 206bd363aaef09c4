//! Stop-loss safety check for bracket exits.
//!
//! A stop that is already through the market (or within `buffer` of it)
//! would trigger on arrival or be refused by the venue, so brackets are
//! checked against a fresh mark price before anything is sent.

use crate::error::{StrategyError, StrategyResult};
use crate::exchange::{OrderSide, VenueGateway};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{info, warn};

/// Minimum stop distance from the mark price when none is configured.
pub const DEFAULT_STOP_BUFFER: Decimal = dec!(50);

/// Check `stop_loss` against `reference_price`.
///
/// A sell-side exit protects a long and needs `stop_loss < reference - buffer`.
/// A buy-side exit protects a short and needs `stop_loss > reference + buffer`.
pub fn validate_stop_loss(
    reference_price: Decimal,
    stop_loss: Decimal,
    exit_side: OrderSide,
    buffer: Decimal,
) -> StrategyResult<()> {
    match exit_side {
        OrderSide::Sell => {
            let ceiling = reference_price
                .checked_sub(buffer)
                .ok_or_else(|| buffer_out_of_range(reference_price, buffer))?;
            if stop_loss >= ceiling {
                return Err(StrategyError::Rejected(format!(
                    "stop-loss {} is too close to or above the mark price {}; \
                     it must be below {} (buffer {})",
                    stop_loss, reference_price, ceiling, buffer
                )));
            }
        }
        OrderSide::Buy => {
            let floor = reference_price
                .checked_add(buffer)
                .ok_or_else(|| buffer_out_of_range(reference_price, buffer))?;
            if stop_loss <= floor {
                return Err(StrategyError::Rejected(format!(
                    "stop-loss {} is too close to or below the mark price {}; \
                     it must be above {} (buffer {})",
                    stop_loss, reference_price, floor, buffer
                )));
            }
        }
    }
    Ok(())
}

fn buffer_out_of_range(reference_price: Decimal, buffer: Decimal) -> StrategyError {
    StrategyError::InvalidParameters(format!(
        "buffer {} is out of range for mark price {}",
        buffer, reference_price
    ))
}

/// Fetch the mark price for `symbol` and validate the stop against it.
///
/// Returns the reference price used. A failed lookup is
/// `ReferenceUnavailable`; nothing is submitted in either failure case.
pub async fn verify_stop_loss(
    gateway: &dyn VenueGateway,
    symbol: &str,
    stop_loss: Decimal,
    exit_side: OrderSide,
    buffer: Decimal,
) -> StrategyResult<Decimal> {
    let reference_price = gateway.reference_price(symbol).await.map_err(|e| {
        warn!(%symbol, error = %e, "Failed to fetch mark price");
        StrategyError::ReferenceUnavailable(e)
    })?;

    if let Err(e) = validate_stop_loss(reference_price, stop_loss, exit_side, buffer) {
        warn!(%symbol, %reference_price, %stop_loss, %buffer, "Bracket rejected");
        return Err(e);
    }

    info!(
        %symbol,
        %reference_price,
        %stop_loss,
        %buffer,
        exit_side = %exit_side,
        "Stop-loss clears the mark price"
    );
    Ok(reference_price)
}
