//! Binance Futures REST API client.

use crate::config::BinanceConfig;
use crate::error::VenueError;
use crate::exchange::traits::{Venue, VenueGateway};
use crate::exchange::types::*;
use anyhow::{Context, Result};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::{Client, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, instrument, warn};

const FUTURES_BASE_URL: &str = "https://fapi.binance.com";
const FUTURES_TESTNET_URL: &str = "https://testnet.binancefuture.com";

/// Binance USDⓈ-M Futures client.
pub struct BinanceClient {
    http: Client,
    api_key: String,
    secret_key: String,
    base_url: String,
    recv_window_ms: u64,
    venue: Venue,
}

impl BinanceClient {
    /// Create a new Binance client from configuration.
    pub fn new(config: &BinanceConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = match &config.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None if config.testnet => FUTURES_TESTNET_URL.to_string(),
            None => FUTURES_BASE_URL.to_string(),
        };

        let venue = if config.testnet {
            Venue::BinanceTestnet
        } else {
            Venue::Binance
        };

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            secret_key: config.secret_key.clone(),
            base_url,
            recv_window_ms: config.recv_window_ms,
            venue,
        })
    }

    /// Generate HMAC-SHA256 signature for authenticated requests.
    fn sign(&self, query_string: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.secret_key.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(query_string.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Get current timestamp in milliseconds.
    fn timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }

    /// Build the `/fapi/v1/order` parameter list for an order (unsigned).
    fn order_params(order: &ChildOrderSpec) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("symbol", order.symbol.clone()),
            ("side", order.side.as_str().to_string()),
            ("type", order.order_type.as_str().to_string()),
            ("quantity", order.quantity.normalize().to_string()),
        ];

        if let Some(price) = order.price {
            params.push(("price", price.normalize().to_string()));
        }

        if let Some(trigger) = order.trigger_price {
            params.push(("stopPrice", trigger.normalize().to_string()));
        }

        // Market orders take no time in force on Binance Futures.
        if order.order_type != OrderType::Market {
            params.push(("timeInForce", order.time_in_force.as_str().to_string()));
        }

        if let Some(working_type) = order.working_type {
            params.push(("workingType", working_type.as_str().to_string()));
        }

        params
    }

    /// Turn a response into `T`, or into a venue error for non-2xx statuses.
    async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, VenueError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(err) => VenueError::Api {
                    code: err.code,
                    message: err.msg,
                },
                Err(_) => VenueError::Transport(format!("HTTP {}: {}", status, body)),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| VenueError::Decode(format!("{} in body {}", e, body)))
    }

    /// Get the mark price snapshot for a symbol.
    #[instrument(skip(self))]
    pub async fn get_mark_price(&self, symbol: &str) -> Result<MarkPrice, VenueError> {
        let url = format!(
            "{}/fapi/v1/premiumIndex?symbol={}",
            self.base_url,
            urlencoding::encode(symbol)
        );
        let response = self.http.get(&url).send().await?;
        Self::parse_response(response).await
    }

    /// Place a new futures order.
    #[instrument(skip(self, order), fields(symbol = %order.symbol, side = %order.side, order_type = %order.order_type))]
    pub async fn place_futures_order(
        &self,
        order: &ChildOrderSpec,
    ) -> Result<OrderResponse, VenueError> {
        let mut params = Self::order_params(order);
        params.push(("recvWindow", self.recv_window_ms.to_string()));
        params.push(("timestamp", Self::timestamp().to_string()));

        let query_string: String = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let signature = self.sign(&query_string);
        let url = format!(
            "{}/fapi/v1/order?{}&signature={}",
            self.base_url, query_string, signature
        );

        debug!("Placing futures order: {}", order);

        let response = self
            .http
            .post(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await?;

        let result = Self::parse_response(response).await;
        if let Err(e) = &result {
            warn!(error = %e, "Futures order not accepted");
        }
        result
    }
}

#[async_trait]
impl VenueGateway for BinanceClient {
    fn venue(&self) -> Venue {
        self.venue
    }

    async fn submit(&self, order: &ChildOrderSpec) -> Result<OrderReceipt, VenueError> {
        self.place_futures_order(order).await.map(OrderReceipt::from)
    }

    async fn reference_price(&self, symbol: &str) -> Result<Decimal, VenueError> {
        self.get_mark_price(symbol).await.map(|p| p.mark_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_client() -> BinanceClient {
        let config = BinanceConfig {
            api_key: "key".to_string(),
            secret_key: "secret".to_string(),
            ..BinanceConfig::default()
        };
        BinanceClient::new(&config).unwrap()
    }

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_testnet_selected_by_default() {
        let client = test_client();
        assert_eq!(client.base_url, FUTURES_TESTNET_URL);
        assert_eq!(client.venue(), Venue::BinanceTestnet);
    }

    #[test]
    fn test_sign_matches_reference_vector() {
        // Example from the Binance API documentation.
        let config = BinanceConfig {
            secret_key: "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j"
                .to_string(),
            ..BinanceConfig::default()
        };
        let client = BinanceClient::new(&config).unwrap();
        let query = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";
        assert_eq!(
            client.sign(query),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn test_market_params_have_no_time_in_force() {
        let order = ChildOrderSpec::market("BTCUSDT", OrderSide::Buy, dec!(0.250000));
        let params = BinanceClient::order_params(&order);

        assert_eq!(param(&params, "type"), Some("MARKET"));
        assert_eq!(param(&params, "quantity"), Some("0.25"));
        assert_eq!(param(&params, "timeInForce"), None);
        assert_eq!(param(&params, "price"), None);
    }

    #[test]
    fn test_stop_market_params() {
        let order = ChildOrderSpec::stop_trigger(
            "BTCUSDT",
            OrderSide::Sell,
            dec!(0.01),
            dec!(41000),
            WorkingType::MarkPrice,
        );
        let params = BinanceClient::order_params(&order);

        assert_eq!(param(&params, "type"), Some("STOP_MARKET"));
        assert_eq!(param(&params, "stopPrice"), Some("41000"));
        assert_eq!(param(&params, "timeInForce"), Some("GTC"));
        assert_eq!(param(&params, "workingType"), Some("MARK_PRICE"));
        assert_eq!(param(&params, "price"), None);
    }

    #[test]
    fn test_stop_limit_params() {
        let order = ChildOrderSpec::stop_trigger_limit(
            "ETHUSDT",
            OrderSide::Buy,
            dec!(1),
            dec!(2500.50),
            dec!(2490),
            WorkingType::ContractPrice,
        );
        let params = BinanceClient::order_params(&order);

        assert_eq!(param(&params, "type"), Some("STOP"));
        assert_eq!(param(&params, "price"), Some("2500.5"));
        assert_eq!(param(&params, "stopPrice"), Some("2490"));
        assert_eq!(param(&params, "workingType"), Some("CONTRACT_PRICE"));
    }
}
