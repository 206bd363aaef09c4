//! Binance client against a mocked REST endpoint.

use futures_order_bot::config::BinanceConfig;
use futures_order_bot::error::{FailureKind, VenueError};
use futures_order_bot::exchange::{
    BinanceClient, ChildOrderSpec, OrderSide, OrderStatus, OrderType, VenueGateway, WorkingType,
};
use futures_order_bot::strategy::{
    GridParams, NoopObserver, StrategyKind, StrategyRequest, StrategyRunner,
};
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> BinanceClient {
    let config = BinanceConfig {
        api_key: "test-key".to_string(),
        secret_key: "test-secret".to_string(),
        base_url: Some(server.uri()),
        ..BinanceConfig::default()
    };
    BinanceClient::new(&config).unwrap()
}

fn order_body(order_type: &str, price: &str, stop_price: &str) -> serde_json::Value {
    json!({
        "orderId": 283194212,
        "symbol": "BTCUSDT",
        "status": "NEW",
        "clientOrderId": "testOrder",
        "price": price,
        "avgPrice": "0.00000",
        "origQty": "0.010",
        "executedQty": "0",
        "stopPrice": stop_price,
        "side": "SELL",
        "type": order_type,
        "timeInForce": "GTC",
        "workingType": "MARK_PRICE",
        "updateTime": 1700000000000i64
    })
}

#[tokio::test]
async fn test_limit_order_is_signed_and_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fapi/v1/order"))
        .and(header("X-MBX-APIKEY", "test-key"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("side", "SELL"))
        .and(query_param("type", "LIMIT"))
        .and(query_param("price", "45000"))
        .and(query_param("timeInForce", "GTC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_body("LIMIT", "45000", "0")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let order = ChildOrderSpec::limit("BTCUSDT", OrderSide::Sell, dec!(0.01), dec!(45000));
    let receipt = client.submit(&order).await.unwrap();

    assert_eq!(receipt.order_id, 283194212);
    assert_eq!(receipt.status, OrderStatus::New);
    assert_eq!(receipt.order_type, OrderType::Limit);
    assert_eq!(receipt.price, Some(dec!(45000)));
    assert_eq!(receipt.trigger_price, None);

    let requests = server.received_requests().await.unwrap();
    let query = requests[0].url.query().unwrap();
    assert!(query.contains("timestamp="));
    assert!(query.contains("recvWindow=5000"));
    assert!(query.contains("&signature="));
}

#[tokio::test]
async fn test_stop_market_sends_trigger_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fapi/v1/order"))
        .and(query_param("type", "STOP_MARKET"))
        .and(query_param("stopPrice", "41000"))
        .and(query_param("workingType", "MARK_PRICE"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(order_body("STOP_MARKET", "0", "41000")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let order = ChildOrderSpec::stop_trigger(
        "BTCUSDT",
        OrderSide::Sell,
        dec!(0.01),
        dec!(41000),
        WorkingType::MarkPrice,
    );
    let receipt = client.submit(&order).await.unwrap();

    assert_eq!(receipt.order_type, OrderType::StopTrigger);
    assert_eq!(receipt.price, None);
    assert_eq!(receipt.trigger_price, Some(dec!(41000)));
}

#[tokio::test]
async fn test_api_rejection_maps_to_venue_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fapi/v1/order"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": -2019,
            "msg": "Margin is insufficient."
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let order = ChildOrderSpec::market("BTCUSDT", OrderSide::Buy, dec!(100));
    let err = client.submit(&order).await.unwrap_err();

    assert_eq!(
        err,
        VenueError::Api {
            code: -2019,
            message: "Margin is insufficient.".to_string()
        }
    );
}

#[tokio::test]
async fn test_non_json_error_is_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fapi/v1/order"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let order = ChildOrderSpec::market("BTCUSDT", OrderSide::Buy, dec!(1));

    assert!(matches!(
        client.submit(&order).await,
        Err(VenueError::Transport(_))
    ));
}

#[tokio::test]
async fn test_mark_price_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fapi/v1/premiumIndex"))
        .and(query_param("symbol", "BTCUSDT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "symbol": "BTCUSDT",
            "markPrice": "43012.50000000",
            "indexPrice": "43010.11000000",
            "lastFundingRate": "0.00010000",
            "time": 1700000000000i64
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(
        client.reference_price("BTCUSDT").await.unwrap(),
        dec!(43012.5)
    );
}

#[tokio::test]
async fn test_malformed_mark_price_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fapi/v1/premiumIndex"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "symbol": "BTCUSDT" })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(matches!(
        client.reference_price("BTCUSDT").await,
        Err(VenueError::Decode(_))
    ));
}

#[tokio::test]
async fn test_grid_level_rejection_is_isolated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fapi/v1/order"))
        .and(query_param("price", "140"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": -4016,
            "msg": "Limit price can't be higher than 139."
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/fapi/v1/order"))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_body("LIMIT", "100", "0")))
        .expect(4)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let runner = StrategyRunner::new(&client, &NoopObserver);
    let request = StrategyRequest::new(
        "BTCUSDT",
        OrderSide::Buy,
        StrategyKind::Grid(GridParams {
            quantity_per_level: dec!(0.01),
            price_low: dec!(100),
            price_high: dec!(200),
            levels: 5,
        }),
    );

    let report = runner.run(&request).await.unwrap();

    assert_eq!(report.outcomes.len(), 5);
    assert_eq!(report.failed_count(), 1);
    let failure = report.outcomes[2].error().unwrap();
    assert_eq!(failure.kind, FailureKind::Rejected);
    assert_eq!(failure.code, Some(-4016));
}
