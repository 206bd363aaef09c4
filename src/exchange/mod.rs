//! Venue gateways.
//!
//! ## Binance
//! Signed REST access to USDⓈ-M Futures for:
//! - Order placement (limit, market, stop-market, stop-limit)
//! - Mark price lookups
//!
//! ## Paper
//! An in-memory venue with the same interface, used for dry runs and tests.

mod client;
pub mod mock;
mod traits;
mod types;

pub use client::BinanceClient;
pub use mock::PaperVenue;
pub use traits::{Venue, VenueGateway};
pub use types::*;

#[cfg(test)]
pub use traits::MockVenueGateway;
