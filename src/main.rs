use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use swap_router_core::aggregator::AdapterRegistry;
use swap_router_core::api::{self, AppState, NoopPublisher};
use swap_router_core::cache::RouteCache;
use swap_router_core::config::{AppConfig, RuntimeConfig};
use swap_router_core::derivation::Deriver;
use swap_router_core::graph::AssetGraph;
use swap_router_core::lifecycle::QuoteStore;
use swap_router_core::metrics as app_metrics;
use swap_router_core::monitor::DepositMonitor;
use swap_router_core::price::{CachedPriceOracle, PriceOracle};
use swap_router_core::providers::bebop::BebopAdapter;
use swap_router_core::providers::butterswap::ButterSwapAdapter;
use swap_router_core::providers::chainflip::ChainflipAdapter;
use swap_router_core::providers::cowswap::CowSwapAdapter;
use swap_router_core::providers::jupiter::JupiterAdapter;
use swap_router_core::providers::mayachain::MayachainAdapter;
use swap_router_core::providers::nearintents::NearIntentsAdapter;
use swap_router_core::providers::portals::PortalsAdapter;
use swap_router_core::providers::relay::RelayAdapter;
use swap_router_core::providers::thorchain::ThorchainAdapter;
use swap_router_core::providers::zrx::ZrxAdapter;
use swap_router_core::providers::ProviderAdapter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = AppConfig::from_env()?;
    let runtime_config = RuntimeConfig::default();

    let deriver = Deriver::from_mnemonic(&config.mnemonic, &config.wallet_passphrase)?;
    deriver.liveness_check()?;
    info!("deposit-address derivation liveness check passed");

    let metrics_addr = format!("127.0.0.1:{}", config.port + 1000).parse()?;
    let _metrics_handle = app_metrics::install(metrics_addr)?;

    let cache = Arc::new(RouteCache::new());
    let graph = Arc::new(AssetGraph::new());
    let store = Arc::new(QuoteStore::new(deriver, runtime_config.quote_account_index));
    let oracle: Arc<dyn PriceOracle> = Arc::new(CachedPriceOracle::new(StubOracle, cache.clone()));

    let adapters = build_adapter_registry(&config);
    let dyn_adapters: Vec<Arc<dyn ProviderAdapter>> = adapters.values().cloned().collect();

    let initial = graph.rebuild(&dyn_adapters).await;
    info!(assets = initial.asset_count, edges = initial.edge_count, "initial graph build complete");

    let state = Arc::new(AppState {
        store: store.clone(),
        graph: graph.clone(),
        cache: cache.clone(),
        adapters,
        oracle,
        runtime: runtime_config,
        publisher: Arc::new(NoopPublisher),
    });

    let mut set = JoinSet::new();
    spawn_graph_rebuild_task(&mut set, graph.clone(), dyn_adapters, runtime_config.graph_rebuild_interval);
    spawn_cache_eviction_task(&mut set, cache.clone(), runtime_config.cache_eviction_interval);
    spawn_deposit_monitor_task(&mut set, store.clone());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(port = config.port, "listening");
    let app = api::router(state);
    set.spawn(async move {
        axum::serve(listener, app).await.map_err(anyhow::Error::from)
    });

    while let Some(result) = set.join_next().await {
        match result {
            Ok(Ok(())) => continue,
            Ok(Err(err)) => error!(error = %err, "background task returned an error"),
            Err(join_err) => warn!(error = %join_err, "background task panicked"),
        }
    }

    Ok(())
}

fn build_adapter_registry(config: &AppConfig) -> AdapterRegistry {
    let mut adapters: AdapterRegistry = HashMap::new();
    adapters.insert(
        swap_router_core::providers::ProviderId::Thorchain,
        Arc::new(ThorchainAdapter::new(config.thorchain_node_url.clone())),
    );
    adapters.insert(
        swap_router_core::providers::ProviderId::Mayachain,
        Arc::new(MayachainAdapter::new(config.mayachain_node_url.clone())),
    );
    adapters.insert(
        swap_router_core::providers::ProviderId::Chainflip,
        Arc::new(ChainflipAdapter::new(config.chainflip_api_url.clone(), config.chainflip_api_key.clone())),
    );
    adapters.insert(
        swap_router_core::providers::ProviderId::CowSwap,
        Arc::new(CowSwapAdapter::new(config.cowswap_base_url.clone())),
    );
    adapters.insert(
        swap_router_core::providers::ProviderId::Zrx,
        Arc::new(ZrxAdapter::new(config.zrx_base_url.clone())),
    );
    adapters.insert(
        swap_router_core::providers::ProviderId::Relay,
        Arc::new(RelayAdapter::new(config.relay_api_url.clone())),
    );
    adapters.insert(
        swap_router_core::providers::ProviderId::Portals,
        Arc::new(PortalsAdapter::new(config.portals_base_url.clone())),
    );
    adapters.insert(
        swap_router_core::providers::ProviderId::Jupiter,
        Arc::new(JupiterAdapter::new(config.jupiter_api_url.clone())),
    );
    adapters.insert(
        swap_router_core::providers::ProviderId::NearIntents,
        Arc::new(NearIntentsAdapter::new("https://solver-relay.near-intents.org")),
    );
    adapters.insert(
        swap_router_core::providers::ProviderId::ButterSwap,
        Arc::new(ButterSwapAdapter::new("https://router-api.butterswap.io")),
    );
    adapters.insert(
        swap_router_core::providers::ProviderId::Bebop,
        Arc::new(BebopAdapter::new("https://api.bebop.xyz")),
    );
    adapters
}

fn spawn_graph_rebuild_task(
    set: &mut JoinSet<Result<()>>,
    graph: Arc<AssetGraph>,
    adapters: Vec<Arc<dyn ProviderAdapter>>,
    interval: std::time::Duration,
) {
    set.spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let start = std::time::Instant::now();
            let summary = graph.rebuild(&adapters).await;
            app_metrics::record_graph_rebuild(start.elapsed().as_secs_f64(), summary.asset_count, summary.edge_count);
            if summary.failed_providers > 0 {
                warn!(failed = summary.failed_providers, "graph rebuild had provider failures");
            }
        }
    });
}

fn spawn_cache_eviction_task(set: &mut JoinSet<Result<()>>, cache: Arc<RouteCache>, interval: std::time::Duration) {
    set.spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let evicted = cache.evict_expired();
            let stats = cache.stats();
            app_metrics::record_cache_stats(stats.hits, stats.misses);
            if evicted > 0 {
                info!(evicted, "cache eviction sweep complete");
            }
        }
    });
}

fn spawn_deposit_monitor_task(set: &mut JoinSet<Result<()>>, store: Arc<QuoteStore>) {
    set.spawn(async move {
        let monitor = Arc::new(DepositMonitor::new(store, Arc::new(NullIndexer)));
        monitor.run_forever().await;
        Ok(())
    });
}

/// Placeholder USD price source used until a concrete feed is wired in via
/// configuration; the Price Oracle's concrete backend is an external
/// collaborator.
struct StubOracle;

#[async_trait::async_trait]
impl PriceOracle for StubOracle {
    async fn usd_price(&self, _asset: &swap_router_core::asset::AssetId) -> swap_router_core::error::CoreResult<f64> {
        Err(swap_router_core::error::CoreError::Network {
            provider: swap_router_core::providers::ProviderId::Thorchain,
            message: "no price feed configured".to_string(),
        })
    }
}

/// Placeholder blockchain indexer; the concrete indexer is an external
/// collaborator and is wired in by deployment configuration.
struct NullIndexer;

#[async_trait::async_trait]
impl swap_router_core::monitor::DepositIndexer for NullIndexer {
    async fn find_deposit(
        &self,
        _chain_id: &str,
        _deposit_address: &str,
        _minimum_amount_base_unit: &swap_router_core::units::BaseUnits,
    ) -> swap_router_core::error::CoreResult<Option<swap_router_core::monitor::ObservedDeposit>> {
        Ok(None)
    }
}
