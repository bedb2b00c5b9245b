mod common;

use coinwatch::{CoinId, MarketApi, MarketClient, MarketConfig, MarketError};

use crate::common::{FakeApi, MALFORMED, MISSING};

fn client(api: &FakeApi) -> MarketClient {
    MarketClient::new(MarketConfig {
        base_url: api.base_url.clone(),
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_list_coins_in_api_order() {
    let api = common::spawn(150).await;
    let coins = client(&api).list_coins().await.unwrap();

    assert_eq!(coins.len(), 150);
    assert_eq!(coins[0].id.as_str(), "c1-coin");
    assert_eq!(coins[149].name, "Coin 150");
    assert_eq!(coins[41].rank, 42);
    assert_eq!(coins[0].kind, "coin");
}

#[tokio::test]
async fn test_info_and_tickers() {
    let api = common::spawn(1).await;
    let client = client(&api);
    let id = CoinId::from("btc-bitcoin");

    let info = client.coin_info(&id).await.unwrap();
    assert_eq!(info.name, "Bitcoin");
    assert_eq!(info.rank, 1);
    assert_eq!(info.description, "Peer-to-peer electronic cash.");

    let tickers = client.coin_tickers(&id).await.unwrap();
    assert_eq!(tickers.usd().price, 1234.5678);
    assert_eq!(tickers.max_supply, 21_000_000.0);
    assert_eq!(tickers.usd().ath_date.as_deref(), Some("2024-03-14T07:10:36Z"));
    assert_eq!(tickers.usd().percent_changes()[8], ("1y", 120.3));
}

#[tokio::test]
async fn test_history_sends_window() {
    let api = common::spawn(1).await;
    let points = client(&api)
        .coin_history(&CoinId::from("btc-bitcoin"))
        .await
        .unwrap();

    assert_eq!(points.len(), 14);
    assert_eq!(points[0].open, 99.0);
    assert_eq!(points[13].close, 113.0);
    assert_eq!(points[0].volume, Some(1000.0));

    let queries = api.history_queries();
    assert_eq!(queries.len(), 1);
    let start: i64 = queries[0]["start"].parse().unwrap();
    let end: i64 = queries[0]["end"].parse().unwrap();
    assert_eq!(end - start, 14 * 86_400);
}

#[tokio::test]
async fn test_history_without_window() {
    let api = common::spawn(1).await;
    let client = MarketClient::new(MarketConfig {
        base_url: api.base_url.clone(),
        history_days: 0,
        ..Default::default()
    })
    .unwrap();

    client.coin_history(&CoinId::from("btc-bitcoin")).await.unwrap();
    assert!(api.history_queries()[0].is_empty());
}

#[tokio::test]
async fn test_id_is_percent_encoded() {
    let api = common::spawn(1).await;
    let info = client(&api)
        .coin_info(&CoinId::from("odd coin/x"))
        .await
        .unwrap();

    // The server saw one path segment and decoded it back.
    assert_eq!(info.id.as_str(), "odd coin/x");
}

#[tokio::test]
async fn test_status_failure_is_network_error() {
    let api = common::spawn(1).await;
    let err = client(&api)
        .coin_tickers(&CoinId::from(MISSING))
        .await
        .unwrap_err();

    match &err {
        MarketError::Network {
            url,
            status,
            message,
        } => {
            assert!(url.ends_with("/v1/cryptocurrency/missing-coin/quotes"));
            assert_eq!(*status, Some(404));
            assert!(message.contains("id not found"));
        }
        other => panic!("expected network error, got {:?}", other),
    }
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let api = common::spawn(1).await;
    let err = client(&api)
        .coin_info(&CoinId::from(MALFORMED))
        .await
        .unwrap_err();

    assert!(matches!(err, MarketError::Decode { .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_unreachable_server_is_retryable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = MarketClient::new(MarketConfig {
        base_url: format!("http://{}", addr),
        request_timeout_ms: 2_000,
        ..Default::default()
    })
    .unwrap();

    let err = client.list_coins().await.unwrap_err();
    assert!(matches!(err, MarketError::Network { status: None, .. }));
    assert!(err.is_retryable());
}
