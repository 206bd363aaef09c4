//! Paper venue for dry runs and tests.
//!
//! Accepts every valid order as `NEW` without matching it, serves mark
//! prices from an in-memory table, and can be scripted to fail specific
//! submissions or to delay each call.

use super::traits::{Venue, VenueGateway};
use super::types::*;
use crate::error::VenueError;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Submission log and scripted behaviour of the paper venue.
#[derive(Debug, Default)]
pub struct PaperVenueState {
    /// Every order received, in arrival order, including failed ones
    pub submitted: Vec<ChildOrderSpec>,
    /// Submission attempt index -> error returned for that attempt
    pub scripted_failures: HashMap<usize, VenueError>,
    /// Per-attempt latency; attempts past the end use `default_latency`
    pub latencies: Vec<Duration>,
    pub default_latency: Duration,
    /// Error returned by every reference price query, if set
    pub price_failure: Option<VenueError>,
}

/// In-memory venue that never touches the network.
pub struct PaperVenue {
    state: Arc<RwLock<PaperVenueState>>,
    order_id_counter: AtomicU64,
    mark_prices: Arc<RwLock<HashMap<String, Decimal>>>,
}

impl Default for PaperVenue {
    fn default() -> Self {
        Self::new()
    }
}

impl PaperVenue {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(PaperVenueState::default())),
            order_id_counter: AtomicU64::new(1),
            mark_prices: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Set the mark price served for `symbol`.
    pub async fn set_mark_price(&self, symbol: &str, price: Decimal) {
        self.mark_prices
            .write()
            .await
            .insert(symbol.to_string(), price);
    }

    /// Make the `attempt`-th submission (0-based) fail with `error`.
    pub async fn fail_submission(&self, attempt: usize, error: VenueError) {
        self.state
            .write()
            .await
            .scripted_failures
            .insert(attempt, error);
    }

    /// Make every reference price query fail with `error`.
    pub async fn fail_reference_price(&self, error: VenueError) {
        self.state.write().await.price_failure = Some(error);
    }

    /// Delay each submission by the matching entry of `latencies`.
    pub async fn set_latencies(&self, latencies: Vec<Duration>) {
        self.state.write().await.latencies = latencies;
    }

    pub async fn set_default_latency(&self, latency: Duration) {
        self.state.write().await.default_latency = latency;
    }

    /// Orders received so far, in arrival order.
    pub async fn submitted_orders(&self) -> Vec<ChildOrderSpec> {
        self.state.read().await.submitted.clone()
    }

    pub async fn submission_count(&self) -> usize {
        self.state.read().await.submitted.len()
    }

    fn next_order_id(&self) -> i64 {
        self.order_id_counter.fetch_add(1, Ordering::SeqCst) as i64
    }
}

#[async_trait]
impl VenueGateway for PaperVenue {
    fn venue(&self) -> Venue {
        Venue::Paper
    }

    async fn submit(&self, order: &ChildOrderSpec) -> Result<OrderReceipt, VenueError> {
        let (attempt, latency, scripted) = {
            let mut state = self.state.write().await;
            let attempt = state.submitted.len();
            state.submitted.push(order.clone());
            let latency = state
                .latencies
                .get(attempt)
                .copied()
                .unwrap_or(state.default_latency);
            (attempt, latency, state.scripted_failures.remove(&attempt))
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if let Some(err) = scripted {
            debug!(attempt, error = %err, "Paper venue failing scripted submission");
            return Err(err);
        }

        // Mirror the venue's own parameter checks.
        order.validate().map_err(|message| VenueError::Api {
            code: -1102,
            message,
        })?;

        let order_id = self.next_order_id();
        info!(order_id, "📝 [PAPER] Accepted {}", order);

        Ok(OrderReceipt {
            order_id,
            client_order_id: format!("paper-{}", order_id),
            symbol: order.symbol.clone(),
            side: order.side,
            order_type: order.order_type,
            status: OrderStatus::New,
            quantity: order.quantity,
            price: order.price,
            trigger_price: order.trigger_price,
            updated_at: Utc::now(),
        })
    }

    async fn reference_price(&self, symbol: &str) -> Result<Decimal, VenueError> {
        if let Some(err) = self.state.read().await.price_failure.clone() {
            return Err(err);
        }

        self.mark_prices
            .read()
            .await
            .get(symbol)
            .copied()
            .ok_or_else(|| VenueError::Api {
                code: -1121,
                message: format!("Invalid symbol {}", symbol),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_accepts_valid_orders_with_sequential_ids() {
        let venue = PaperVenue::new();
        let order = ChildOrderSpec::limit("BTCUSDT", OrderSide::Buy, dec!(0.01), dec!(100));

        let first = venue.submit(&order).await.unwrap();
        let second = venue.submit(&order).await.unwrap();

        assert_eq!(first.order_id, 1);
        assert_eq!(second.order_id, 2);
        assert_eq!(first.status, OrderStatus::New);
        assert_eq!(first.price, Some(dec!(100)));
        assert_eq!(venue.submission_count().await, 2);
    }

    #[tokio::test]
    async fn test_scripted_failure_hits_only_that_attempt() {
        let venue = PaperVenue::new();
        venue
            .fail_submission(1, VenueError::Transport("connection reset".into()))
            .await;
        let order = ChildOrderSpec::market("BTCUSDT", OrderSide::Sell, dec!(0.5));

        assert!(venue.submit(&order).await.is_ok());
        assert_eq!(
            venue.submit(&order).await.unwrap_err(),
            VenueError::Transport("connection reset".into())
        );
        assert!(venue.submit(&order).await.is_ok());
        assert_eq!(venue.submission_count().await, 3);
    }

    #[tokio::test]
    async fn test_invalid_order_is_rejected_like_the_venue() {
        let venue = PaperVenue::new();
        let order = ChildOrderSpec::market("BTCUSDT", OrderSide::Sell, dec!(0));

        match venue.submit(&order).await {
            Err(VenueError::Api { code, .. }) => assert_eq!(code, -1102),
            other => panic!("expected API rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_reference_price_lookup() {
        let venue = PaperVenue::new();
        venue.set_mark_price("BTCUSDT", dec!(43000)).await;

        assert_eq!(venue.reference_price("BTCUSDT").await.unwrap(), dec!(43000));
        assert!(venue.reference_price("ETHUSDT").await.is_err());

        venue
            .fail_reference_price(VenueError::Transport("down".into()))
            .await;
        assert!(venue.reference_price("BTCUSDT").await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_applied_per_attempt() {
        let venue = PaperVenue::new();
        venue
            .set_latencies(vec![Duration::from_millis(300), Duration::from_millis(10)])
            .await;
        let order = ChildOrderSpec::market("BTCUSDT", OrderSide::Buy, dec!(1));

        let start = tokio::time::Instant::now();
        venue.submit(&order).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(300));

        let start = tokio::time::Instant::now();
        venue.submit(&order).await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(300));
    }
}
