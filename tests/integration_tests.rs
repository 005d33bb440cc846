use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use swap_router_core::aggregator::AdapterRegistry;
use swap_router_core::api::{self, AppState, NoopPublisher};
use swap_router_core::asset::AssetId;
use swap_router_core::cache::RouteCache;
use swap_router_core::config::RuntimeConfig;
use swap_router_core::derivation::Deriver;
use swap_router_core::error::CoreResult;
use swap_router_core::graph::AssetGraph;
use swap_router_core::lifecycle::QuoteStore;
use swap_router_core::price::PriceOracle;
use swap_router_core::providers::{ProviderAdapter, ProviderId};
use swap_router_core::types::{RouteEdge, StepQuote};
use swap_router_core::units::BaseUnits;
use tower::ServiceExt;

const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

struct EchoAdapter(ProviderId);

#[async_trait]
impl ProviderAdapter for EchoAdapter {
    fn id(&self) -> ProviderId {
        self.0
    }

    async fn list_pairs(&self) -> CoreResult<Vec<RouteEdge>> {
        Ok(vec![RouteEdge::new(
            self.0,
            AssetId::new("eip155:1/slip44:60"),
            AssetId::new("eip155:1/erc20:0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"),
        )])
    }

    async fn quote_step(
        &self,
        _edge: &RouteEdge,
        sell_base_unit: &BaseUnits,
        _user_address: &str,
        _receive_address: &str,
    ) -> CoreResult<StepQuote> {
        Ok(StepQuote {
            success: true,
            sell_base_unit: sell_base_unit.clone(),
            expected_buy_base_unit: sell_base_unit.clone(),
            fee_usd: 2.0,
            slippage_percent: 0.3,
            estimated_time_seconds: 15,
            error: None,
        })
    }
}

struct FlatOracle;

#[async_trait]
impl PriceOracle for FlatOracle {
    async fn usd_price(&self, _asset: &AssetId) -> CoreResult<f64> {
        Ok(1.0)
    }
}

async fn test_app() -> Arc<AppState> {
    let deriver = Deriver::from_mnemonic(TEST_MNEMONIC, "").unwrap();
    let store = Arc::new(QuoteStore::new(deriver, 0));
    let graph = Arc::new(AssetGraph::new());

    let mut adapters: AdapterRegistry = HashMap::new();
    adapters.insert(ProviderId::CowSwap, Arc::new(EchoAdapter(ProviderId::CowSwap)));
    let dyn_adapters: Vec<Arc<dyn ProviderAdapter>> = adapters.values().cloned().collect();
    graph.rebuild(&dyn_adapters).await;

    Arc::new(AppState {
        store,
        graph,
        cache: Arc::new(RouteCache::new()),
        adapters,
        oracle: Arc::new(FlatOracle),
        runtime: RuntimeConfig::default(),
        publisher: Arc::new(NoopPublisher),
    })
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = api::router(test_app().await);
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_quote_then_get_round_trips_through_the_store() {
    let app = api::router(test_app().await);

    let body = serde_json::json!({
        "sellAssetId": "eip155:1/slip44:60",
        "buyAssetId": "bip122:000000000019d6689c085ae165831e93/slip44:0",
        "sellAmountCryptoBaseUnit": "1000000000000000000",
        "receiveAddress": "bc1receiveraddress",
        "swapperName": "thorchain",
        "expectedBuyAmountCryptoBaseUnit": "4000000",
    });

    let create_response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/quotes")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(create_response.status(), StatusCode::CREATED);

    let created = body_json(create_response).await;
    assert_eq!(created["status"], "ACTIVE");
    let quote_id = created["quoteId"].as_str().unwrap().to_string();
    assert!(!created["depositAddress"].as_str().unwrap().is_empty());

    let get_response = app
        .oneshot(
            Request::builder()
                .uri(format!("/quotes/{quote_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(get_response.status(), StatusCode::OK);
    let fetched = body_json(get_response).await;
    assert_eq!(fetched["quoteId"], quote_id);
}

#[tokio::test]
async fn create_quote_rejects_unknown_swapper_name() {
    let app = api::router(test_app().await);
    let body = serde_json::json!({
        "sellAssetId": "eip155:1/slip44:60",
        "buyAssetId": "bip122:000000000019d6689c085ae165831e93/slip44:0",
        "sellAmountCryptoBaseUnit": "1000000000000000000",
        "receiveAddress": "bc1receiveraddress",
        "swapperName": "not-a-real-provider",
        "expectedBuyAmountCryptoBaseUnit": "4000000",
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/quotes")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_quote_for_unknown_id_returns_not_found() {
    let app = api::router(test_app().await);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/quotes/does-not-exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn multi_step_quote_returns_a_priced_route_for_a_reachable_pair() {
    let app = api::router(test_app().await);
    let body = serde_json::json!({
        "sellAssetId": "eip155:1/slip44:60",
        "buyAssetId": "eip155:1/erc20:0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
        "sellAmountCryptoBaseUnit": "1000000000000000000",
        "userAddress": "0xuser",
        "receiveAddress": "0xreceiver",
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/swaps/multi-step-quote")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = body_json(response).await;
    assert_eq!(parsed["success"], true);
    assert_eq!(parsed["route"]["totalSteps"], 1);
}

#[tokio::test]
async fn multi_step_quote_reports_failure_for_unreachable_pair() {
    let app = api::router(test_app().await);
    let body = serde_json::json!({
        "sellAssetId": "eip155:1/slip44:60",
        "buyAssetId": "solana:5eykt4uszjbj8jq9gqjx7mn8vkbdq9gs/slip44:501",
        "sellAmountCryptoBaseUnit": "1000000000000000000",
        "userAddress": "0xuser",
        "receiveAddress": "someaddress",
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/swaps/multi-step-quote")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = body_json(response).await;
    assert_eq!(parsed["success"], false);
    assert!(parsed["error"].is_string());
}
