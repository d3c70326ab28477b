use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::AgentError;
use crypto_expert::{CoinGeckoClient, MarketQuery, Platform};

fn client_for(server: &MockServer) -> CoinGeckoClient {
    CoinGeckoClient::with_base_url(server.uri()).unwrap()
}

#[tokio::test]
async fn categories_parse_and_keyword_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/categories/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"category_id": "decentralized-finance-defi", "name": "DeFi"},
            {"category_id": "layer-1", "name": "Layer 1 (L1)"},
            {"category_id": "meme-token", "name": "Meme"}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let all = client.categories(None).await.unwrap();
    assert_eq!(all.len(), 3);

    let filtered = client
        .categories(Some(&["DEFI".to_string()]))
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].category_id, "decentralized-finance-defi");
}

#[tokio::test]
async fn non_2xx_status_is_an_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/categories/list"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Throttled"))
        .mount(&server)
        .await;

    let err = client_for(&server).categories(None).await.unwrap_err();
    assert!(matches!(err, AgentError::Upstream(_)));
    assert!(err.to_string().contains("429"));
}

#[tokio::test]
async fn non_json_body_is_an_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/categories/list"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).categories(None).await.unwrap_err();
    assert!(matches!(err, AgentError::Upstream(_)));
}

#[tokio::test]
async fn markets_send_only_set_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .and(query_param("vs_currency", "usd"))
        .and(query_param("ids", "bitcoin,ethereum"))
        .and(query_param_is_missing("names"))
        .and(query_param_is_missing("category"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "bitcoin"}, {"id": "ethereum"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let query = MarketQuery {
        ids: Some("bitcoin,ethereum".to_string()),
        ..Default::default()
    };
    let coins = client_for(&server).markets(&query).await.unwrap();
    assert_eq!(coins.len(), 2);
}

#[tokio::test]
async fn markets_by_category_pins_top_30_by_market_cap() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .and(query_param("vs_currency", "usd"))
        .and(query_param("category", "decentralized-finance-defi"))
        .and(query_param("order", "market_cap_desc"))
        .and(query_param("per_page", "30"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "lido-dao", "market_cap": 2_000_000_000u64},
            {"id": "aave", "market_cap": 1_500_000_000u64}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let coins = client_for(&server)
        .markets_by_category("usd", "decentralized-finance-defi")
        .await
        .unwrap();
    assert_eq!(coins.len(), 2);
    assert_eq!(coins[0]["id"], "lido-dao");
}

#[tokio::test]
async fn coins_on_platform_keeps_only_truthy_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/list"))
        .and(query_param("include_platform", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "usd-coin",
                "symbol": "usdc",
                "name": "USDC",
                "platforms": {"ethereum": "0xa0b86991", "base": "0x833589fc"}
            },
            {
                "id": "wrapped-avax",
                "symbol": "wavax",
                "name": "Wrapped AVAX",
                "platforms": {"avalanche": "0xb31f66aa"}
            },
            {
                "id": "bitcoin",
                "symbol": "btc",
                "name": "Bitcoin",
                "platforms": {}
            },
            {
                "id": "degen-base",
                "symbol": "degen",
                "name": "Degen",
                "platforms": {"base": ""}
            }
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let on_base = client.coins_on_platform(Platform::Base).await.unwrap();
    assert_eq!(on_base.len(), 1);
    assert_eq!(on_base[0].id, "usd-coin");

    let on_avalanche = client.coins_on_platform(Platform::Avalanche).await.unwrap();
    assert_eq!(on_avalanche.len(), 1);
    assert_eq!(on_avalanche[0].id, "wrapped-avax");

    let on_solana = client.coins_on_platform(Platform::Solana).await.unwrap();
    assert!(on_solana.is_empty());
}

#[tokio::test]
async fn identical_market_calls_yield_identical_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "bitcoin"}, {"id": "ethereum"}, {"id": "solana"}
        ])))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let first = client.markets_by_category("usd", "layer-1").await.unwrap();
    let second = client.markets_by_category("usd", "layer-1").await.unwrap();
    assert_eq!(first, second);
}
