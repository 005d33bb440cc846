//! HTTP/API boundary: typed `axum` routers over a shared `AppState`.
//! Handlers only translate DTOs; all domain logic lives in `pathfinder`,
//! `aggregator`, `lifecycle`.

pub mod dto;

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::aggregator::{self, AdapterRegistry};
use crate::cache::{keys, RouteCache};
use crate::config::RuntimeConfig;
use crate::error::CoreError;
use crate::graph::AssetGraph;
use crate::lifecycle::{CreateQuoteRequest, QuoteStore};
use crate::pathfinder;
use crate::price::PriceOracle;
use crate::providers::classifier::ProviderClassifier;
use crate::providers::{parse_swapper_name, ProviderId};
use crate::types::{MultiStepRoute, PathConstraints};

use dto::{CreateQuoteBody, ErrorResponse, HealthResponse, MultiStepQuoteBody, MultiStepQuoteResponse, QuoteDto};

/// Server-pushed `swapUpdate` notifications. The concrete push-notification
/// client is an external collaborator; this trait is the seam, with a
/// no-op default so the service runs standalone.
#[async_trait]
pub trait SwapUpdatePublisher: Send + Sync {
    async fn publish(&self, quote_id: &str, status: &str);
}

pub struct NoopPublisher;

#[async_trait]
impl SwapUpdatePublisher for NoopPublisher {
    async fn publish(&self, _quote_id: &str, _status: &str) {}
}

pub struct AppState {
    pub store: Arc<QuoteStore>,
    pub graph: Arc<AssetGraph>,
    pub cache: Arc<RouteCache>,
    pub adapters: AdapterRegistry,
    pub oracle: Arc<dyn PriceOracle>,
    pub runtime: RuntimeConfig,
    pub publisher: Arc<dyn SwapUpdatePublisher>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/quotes", post(create_quote))
        .route("/quotes/{quote_id}", get(get_quote))
        .route("/swaps/multi-step-quote", post(multi_step_quote))
        .route("/ws", get(websocket_handler))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

fn error_response(status: StatusCode, error: impl ToString) -> Response {
    (status, Json(ErrorResponse { error: error.to_string() })).into_response()
}

fn core_error_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::Validation(_)
        | CoreError::ProviderDisallowed(_)
        | CoreError::MaxHopsExceeded { .. }
        | CoreError::MaxCrossChainExceeded { .. } => StatusCode::BAD_REQUEST,
        CoreError::InvalidState(_) => StatusCode::BAD_REQUEST,
        CoreError::AssetUnknown(_) | CoreError::UnsupportedAssetOrChain(_) | CoreError::NoRoute { .. } => {
            StatusCode::NOT_FOUND
        }
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

async fn create_quote(State(state): State<Arc<AppState>>, Json(body): Json<CreateQuoteBody>) -> Response {
    let provider = match parse_swapper_name(&body.swapper_name) {
        Ok(p) => p,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, err),
    };

    let request = CreateQuoteRequest {
        sell_aid: body.sell_asset_id,
        buy_aid: body.buy_asset_id,
        sell_amount_base_unit: body.sell_amount_crypto_base_unit,
        expected_buy_amount_base_unit: body.expected_buy_amount_crypto_base_unit,
        receive_address: body.receive_address,
        provider,
    };

    match state.store.create(request) {
        Ok(quote) => (StatusCode::CREATED, Json(QuoteDto::from(quote))).into_response(),
        Err(err) => error_response(core_error_status(&err), err),
    }
}

async fn get_quote(State(state): State<Arc<AppState>>, Path(quote_id): Path<String>) -> Response {
    match state.store.get(&quote_id) {
        Some(quote) => Json(QuoteDto::from(quote)).into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("no such quote {quote_id}")),
    }
}

async fn multi_step_quote(State(state): State<Arc<AppState>>, Json(body): Json<MultiStepQuoteBody>) -> Response {
    let expires_at = chrono::Utc::now() + chrono::Duration::seconds(30);

    let constraints = PathConstraints {
        max_hops: body.max_hops.unwrap_or(state.runtime.default_max_hops),
        max_cross_chain_hops: body.max_cross_chain_hops.unwrap_or(state.runtime.default_max_cross_chain_hops),
        allowed_providers: None,
        excluded_providers: ProviderId::ALL
            .into_iter()
            .filter(|p| ProviderClassifier::is_excluded(*p))
            .collect(),
        excluded_edges: Vec::new(),
    };

    let cache_key = keys::quote(&body.sell_asset_id, &body.buy_asset_id, &body.sell_amount_crypto_base_unit);
    if let Some(cached) = state.cache.get::<MultiStepRoute>(&cache_key) {
        return Json(MultiStepQuoteResponse {
            success: true,
            route: Some(cached),
            alternative_routes: None,
            expires_at,
            error: None,
        })
        .into_response();
    }

    let snapshot = state.graph.current().await;
    let path = match pathfinder::find_path(&snapshot, &body.sell_asset_id, &body.buy_asset_id, &constraints) {
        Ok(p) => p,
        Err(err) => {
            return Json(MultiStepQuoteResponse {
                success: false,
                route: None,
                alternative_routes: None,
                expires_at,
                error: Some(err.to_string()),
            })
            .into_response()
        }
    };

    let steps = match aggregator::quote_path(
        &state.adapters,
        &path,
        body.sell_amount_crypto_base_unit.clone(),
        &body.user_address,
        &body.receive_address,
    )
    .await
    {
        Ok(steps) => steps,
        Err(err) => {
            return Json(MultiStepQuoteResponse {
                success: false,
                route: None,
                alternative_routes: None,
                expires_at,
                error: Some(err.to_string()),
            })
            .into_response()
        }
    };

    let sell_usd_value = estimate_sell_usd_value(&*state.oracle, &body).await;
    let route = aggregator::aggregate(steps, &*state.oracle, sell_usd_value).await;
    state.cache.set(cache_key, &route, Some(state.runtime.default_cache_ttl));

    // Alternative-route discovery failures never fail the primary response.
    let alternatives = build_alternatives(&state, &snapshot, &body, &constraints).await;

    Json(MultiStepQuoteResponse {
        success: true,
        route: Some(route),
        alternative_routes: Some(alternatives),
        expires_at,
        error: None,
    })
    .into_response()
}

async fn estimate_sell_usd_value(oracle: &dyn PriceOracle, body: &MultiStepQuoteBody) -> f64 {
    let decimals = crate::asset::resolve_precision(&body.sell_asset_id);
    let decimal_amount = body.sell_amount_crypto_base_unit.to_decimal(decimals);
    match oracle.usd_price(&body.sell_asset_id).await {
        Ok(price) => price * decimal_amount,
        Err(_) => 0.0,
    }
}

async fn build_alternatives(
    state: &AppState,
    snapshot: &crate::graph::GraphSnapshot,
    body: &MultiStepQuoteBody,
    constraints: &PathConstraints,
) -> Vec<MultiStepRoute> {
    const MAX_ALTERNATIVES: usize = 3;
    let paths = pathfinder::find_alternatives(snapshot, &body.sell_asset_id, &body.buy_asset_id, constraints, MAX_ALTERNATIVES + 1);

    let mut routes = Vec::new();
    for path in paths.into_iter().skip(1).take(MAX_ALTERNATIVES) {
        let attempt = aggregator::quote_path(
            &state.adapters,
            &path,
            body.sell_amount_crypto_base_unit.clone(),
            &body.user_address,
            &body.receive_address,
        )
        .await;
        if let Ok(steps) = attempt {
            let sell_usd_value = estimate_sell_usd_value(&*state.oracle, body).await;
            routes.push(aggregator::aggregate(steps, &*state.oracle, sell_usd_value).await);
        }
    }
    routes
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum ClientMessage {
    Authenticate { #[allow(dead_code)] user_id: String },
    GetSwaps { limit: Option<usize> },
}

async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Minimal `authenticate`/`getSwaps` request-response loop; `swapUpdate`
/// pushes are the `SwapUpdatePublisher`'s responsibility and are not driven
/// from this handler, since the concrete push client is out of scope.
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    while let Some(Ok(msg)) = socket.recv().await {
        let Message::Text(text) = msg else { continue };
        let Ok(parsed) = serde_json::from_str::<ClientMessage>(&text) else { continue };

        match parsed {
            ClientMessage::Authenticate { .. } => {
                let _ = socket.send(Message::Text(r#"{"type":"authenticated"}"#.to_string().into())).await;
            }
            ClientMessage::GetSwaps { limit } => {
                let mut active = state.store.list_active();
                if let Some(limit) = limit {
                    active.truncate(limit);
                }
                let dtos: Vec<QuoteDto> = active.into_iter().map(QuoteDto::from).collect();
                if let Ok(payload) = serde_json::to_string(&dtos) {
                    let _ = socket.send(Message::Text(payload.into())).await;
                }
            }
        }
    }
}
