use std::sync::Arc;

use async_trait::async_trait;
use criterion::{criterion_group, criterion_main, Criterion};
use swap_router_core::asset::AssetId;
use swap_router_core::error::CoreResult;
use swap_router_core::graph::AssetGraph;
use swap_router_core::pathfinder::{find_alternatives, find_path};
use swap_router_core::providers::{ProviderAdapter, ProviderId};
use swap_router_core::types::{PathConstraints, RouteEdge, StepQuote};
use swap_router_core::units::BaseUnits;

struct ChainAdapter {
    id: ProviderId,
    edges: Vec<RouteEdge>,
}

#[async_trait]
impl ProviderAdapter for ChainAdapter {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn list_pairs(&self) -> CoreResult<Vec<RouteEdge>> {
        Ok(self.edges.clone())
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
            fee_usd: 0.0,
            slippage_percent: 0.0,
            estimated_time_seconds: 0,
            error: None,
        })
    }
}

/// Builds a 50-asset same-chain backbone plus a handful of cross-chain
/// shortcuts, representative of the graph's fan-out at steady state.
fn synthetic_graph() -> Arc<AssetGraph> {
    const ASSET_COUNT: usize = 50;
    let evm_asset = |i: usize| AssetId::new(format!("eip155:1/erc20:0x{i:040x}"));
    let btc_asset = |i: usize| AssetId::new(format!("bip122:000000000019d6689c085ae165831e93/slip44:{i}"));

    let mut backbone = Vec::new();
    for i in 0..ASSET_COUNT - 1 {
        backbone.push(RouteEdge::new(ProviderId::CowSwap, evm_asset(i), evm_asset(i + 1)));
    }

    let mut bridges = Vec::new();
    for i in (0..ASSET_COUNT).step_by(7) {
        bridges.push(RouteEdge::new(ProviderId::Thorchain, evm_asset(i), btc_asset(i)));
    }

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let graph = Arc::new(AssetGraph::new());
    let adapters: Vec<Arc<dyn ProviderAdapter>> = vec![
        Arc::new(ChainAdapter { id: ProviderId::CowSwap, edges: backbone }),
        Arc::new(ChainAdapter { id: ProviderId::Thorchain, edges: bridges }),
    ];
    runtime.block_on(graph.rebuild(&adapters));
    graph
}

fn bench_find_path(c: &mut Criterion) {
    let graph = synthetic_graph();
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let snapshot = runtime.block_on(graph.current());
    let sell = AssetId::new("eip155:1/erc20:0x0000000000000000000000000000000000000000");
    let buy = AssetId::new("eip155:1/erc20:0x0000000000000000000000000000000000000003");
    let constraints = PathConstraints::defaults();

    c.bench_function("find_path_within_hop_budget", |b| {
        b.iter(|| find_path(&snapshot, &sell, &buy, &constraints))
    });
}

fn bench_find_alternatives(c: &mut Criterion) {
    let graph = synthetic_graph();
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let snapshot = runtime.block_on(graph.current());
    let sell = AssetId::new("eip155:1/erc20:0x0000000000000000000000000000000000000000");
    let buy = AssetId::new("eip155:1/erc20:0x0000000000000000000000000000000000000003");
    let constraints = PathConstraints::defaults();

    c.bench_function("find_alternatives_three_routes", |b| {
        b.iter(|| find_alternatives(&snapshot, &sell, &buy, &constraints, 3))
    });
}

criterion_group!(benches, bench_find_path, bench_find_alternatives);
criterion_main!(benches);
