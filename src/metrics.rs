//! Counters, gauges and histograms for the routing and send-swap engines,
//! exported via Prometheus.
//!
//! Uses the `metrics` + `metrics-exporter-prometheus` recorder-based
//! `counter!`/`gauge!`/`histogram!` macros rather than a handle struct
//! threaded through every component that reports.

use std::net::SocketAddr;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub const ROUTE_REQUESTS_TOTAL: &str = "swap_router_route_requests_total";
pub const ROUTE_REQUESTS_FAILED: &str = "swap_router_route_requests_failed_total";
pub const QUOTE_DURATION_SECONDS: &str = "swap_router_quote_duration_seconds";
pub const GRAPH_REBUILD_DURATION_SECONDS: &str = "swap_router_graph_rebuild_duration_seconds";
pub const GRAPH_ASSET_COUNT: &str = "swap_router_graph_asset_count";
pub const GRAPH_EDGE_COUNT: &str = "swap_router_graph_edge_count";
pub const CACHE_HITS_TOTAL: &str = "swap_router_cache_hits_total";
pub const CACHE_MISSES_TOTAL: &str = "swap_router_cache_misses_total";
pub const DEPOSITS_DETECTED_TOTAL: &str = "swap_router_deposits_detected_total";
pub const ACTIVE_QUOTES: &str = "swap_router_active_quotes";
pub const PROVIDER_QUOTE_FAILURES_TOTAL: &str = "swap_router_provider_quote_failures_total";

/// Installs the Prometheus recorder and binds its scrape endpoint. Called
/// once, before anything else in the process reports a metric.
pub fn install(listen_addr: SocketAddr) -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .with_http_listener(listen_addr)
        .install_recorder()?;
    Ok(handle)
}

pub fn record_route_request(provider_count: usize) {
    metrics::counter!(ROUTE_REQUESTS_TOTAL).increment(1);
    metrics::gauge!("swap_router_route_request_provider_count").set(provider_count as f64);
}

pub fn record_route_failure() {
    metrics::counter!(ROUTE_REQUESTS_FAILED).increment(1);
}

pub fn record_quote_duration(seconds: f64) {
    metrics::histogram!(QUOTE_DURATION_SECONDS).record(seconds);
}

pub fn record_graph_rebuild(seconds: f64, asset_count: usize, edge_count: usize) {
    metrics::histogram!(GRAPH_REBUILD_DURATION_SECONDS).record(seconds);
    metrics::gauge!(GRAPH_ASSET_COUNT).set(asset_count as f64);
    metrics::gauge!(GRAPH_EDGE_COUNT).set(edge_count as f64);
}

pub fn record_cache_stats(hits: u64, misses: u64) {
    metrics::counter!(CACHE_HITS_TOTAL).absolute(hits);
    metrics::counter!(CACHE_MISSES_TOTAL).absolute(misses);
}

pub fn record_deposit_detected() {
    metrics::counter!(DEPOSITS_DETECTED_TOTAL).increment(1);
}

pub fn record_active_quotes(count: usize) {
    metrics::gauge!(ACTIVE_QUOTES).set(count as f64);
}

pub fn record_provider_quote_failure(provider: crate::providers::ProviderId) {
    metrics::counter!(PROVIDER_QUOTE_FAILURES_TOTAL, "provider" => format!("{provider:?}")).increment(1);
}
