use metrics_exporter_prometheus::PrometheusBuilder;
use swap_router_core::metrics::{
    record_active_quotes, record_cache_stats, record_deposit_detected, record_graph_rebuild,
    record_provider_quote_failure, record_quote_duration, record_route_failure, record_route_request,
    ACTIVE_QUOTES, CACHE_HITS_TOTAL, DEPOSITS_DETECTED_TOTAL, GRAPH_ASSET_COUNT,
    PROVIDER_QUOTE_FAILURES_TOTAL, QUOTE_DURATION_SECONDS, ROUTE_REQUESTS_FAILED, ROUTE_REQUESTS_TOTAL,
};
use swap_router_core::providers::ProviderId;

// A single test installs the process-global recorder (only one recorder may
// ever be installed) and exercises every recording function against it.
#[test]
fn every_recording_function_surfaces_in_the_prometheus_render() {
    let handle = PrometheusBuilder::new().install_recorder().expect("install a recorder for the test");

    record_route_request(3);
    record_route_failure();
    record_quote_duration(0.25);
    record_graph_rebuild(1.5, 42, 108);
    record_cache_stats(10, 2);
    record_deposit_detected();
    record_active_quotes(7);
    record_provider_quote_failure(ProviderId::Thorchain);

    let rendered = handle.render();
    for metric in [
        ROUTE_REQUESTS_TOTAL,
        ROUTE_REQUESTS_FAILED,
        QUOTE_DURATION_SECONDS,
        GRAPH_ASSET_COUNT,
        CACHE_HITS_TOTAL,
        DEPOSITS_DETECTED_TOTAL,
        ACTIVE_QUOTES,
        PROVIDER_QUOTE_FAILURES_TOTAL,
    ] {
        assert!(rendered.contains(metric), "expected {metric} in rendered output:\n{rendered}");
    }
}
