use std::sync::Arc;

use async_trait::async_trait;
use swap_router_core::asset::AssetId;
use swap_router_core::error::CoreResult;
use swap_router_core::graph::AssetGraph;
use swap_router_core::pathfinder::{find_alternatives, find_path};
use swap_router_core::providers::{ProviderAdapter, ProviderId};
use swap_router_core::types::{PathConstraints, RouteEdge, StepQuote};
use swap_router_core::units::BaseUnits;
use test_log::test;

struct StaticAdapter {
    id: ProviderId,
    edges: Vec<RouteEdge>,
}

#[async_trait]
impl ProviderAdapter for StaticAdapter {
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
            fee_usd: 0.1,
            slippage_percent: 0.1,
            estimated_time_seconds: 10,
            error: None,
        })
    }
}

fn eth() -> AssetId {
    AssetId::new("eip155:1/slip44:60")
}
fn usdc() -> AssetId {
    AssetId::new("eip155:1/erc20:0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48")
}
fn wbtc() -> AssetId {
    AssetId::new("eip155:1/erc20:0x2260fac5e5542a773aa44fbcfedf7c193bc2c599")
}
fn btc() -> AssetId {
    AssetId::new("bip122:000000000019d6689c085ae165831e93/slip44:0")
}

async fn build_graph() -> Arc<AssetGraph> {
    let graph = Arc::new(AssetGraph::new());
    let direct = Arc::new(StaticAdapter {
        id: ProviderId::CowSwap,
        edges: vec![
            RouteEdge::new(ProviderId::CowSwap, eth(), usdc()),
            RouteEdge::new(ProviderId::Zrx, usdc(), wbtc()),
        ],
    });
    let bridge = Arc::new(StaticAdapter {
        id: ProviderId::Thorchain,
        edges: vec![RouteEdge::new(ProviderId::Thorchain, eth(), btc())],
    });
    let adapters: Vec<Arc<dyn ProviderAdapter>> = vec![direct, bridge];
    graph.rebuild(&adapters).await;
    graph
}

#[test(tokio::test)]
async fn direct_cross_chain_edge_wins_over_longer_same_chain_path() {
    let graph = build_graph().await;
    let snapshot = graph.current().await;
    let constraints = PathConstraints::defaults();

    let path = find_path(&snapshot, &eth(), &btc(), &constraints).expect("path should exist");
    assert_eq!(path.hop_count(), 1);
    assert!(path.is_simple());
}

#[test(tokio::test)]
async fn multi_hop_same_chain_path_is_found_and_respects_hop_limit() {
    let graph = build_graph().await;
    let snapshot = graph.current().await;
    let constraints = PathConstraints::defaults();

    let path = find_path(&snapshot, &eth(), &wbtc(), &constraints).expect("path should exist");
    assert_eq!(path.hop_count(), 2);
    assert!(path.hop_count() <= constraints.max_hops);
    assert!(path.is_simple());
}

#[test(tokio::test)]
async fn max_hops_of_zero_rejects_every_route() {
    let graph = build_graph().await;
    let snapshot = graph.current().await;
    let mut constraints = PathConstraints::defaults();
    constraints.max_hops = 0;

    assert!(find_path(&snapshot, &eth(), &wbtc(), &constraints).is_err());
}

#[test(tokio::test)]
async fn unreachable_pair_returns_no_path() {
    let graph = build_graph().await;
    let snapshot = graph.current().await;
    let constraints = PathConstraints::defaults();

    let unrelated = AssetId::new("solana:5eykt4uszjbj8jq9gqjx7mn8vkbdq9gs/slip44:501");
    assert!(find_path(&snapshot, &unrelated, &wbtc(), &constraints).is_err());
}

#[test(tokio::test)]
async fn alternatives_are_deduplicated_and_all_simple() {
    let graph = build_graph().await;
    let snapshot = graph.current().await;
    let constraints = PathConstraints::defaults();

    let alternatives = find_alternatives(&snapshot, &eth(), &wbtc(), &constraints, 4);
    assert!(!alternatives.is_empty());

    let mut seen = std::collections::HashSet::new();
    for path in &alternatives {
        assert!(path.is_simple());
        assert!(seen.insert(path.signature()));
    }
}

#[test(tokio::test)]
async fn graph_rebuild_is_resilient_to_a_failing_provider() {
    struct FailingAdapter;

    #[async_trait]
    impl ProviderAdapter for FailingAdapter {
        fn id(&self) -> ProviderId {
            ProviderId::Relay
        }

        async fn list_pairs(&self) -> CoreResult<Vec<RouteEdge>> {
            Err(swap_router_core::error::CoreError::Network {
                provider: ProviderId::Relay,
                message: "unreachable".to_string(),
            })
        }

        async fn quote_step(
            &self,
            _edge: &RouteEdge,
            sell_base_unit: &BaseUnits,
            _user_address: &str,
            _receive_address: &str,
        ) -> CoreResult<StepQuote> {
            Ok(StepQuote::failure(sell_base_unit.clone(), "unreachable"))
        }
    }

    let graph = Arc::new(AssetGraph::new());
    let healthy = Arc::new(StaticAdapter {
        id: ProviderId::CowSwap,
        edges: vec![RouteEdge::new(ProviderId::CowSwap, eth(), usdc())],
    });
    let failing = Arc::new(FailingAdapter);
    let adapters: Vec<Arc<dyn ProviderAdapter>> = vec![healthy, failing];

    let summary = graph.rebuild(&adapters).await;
    assert_eq!(summary.failed_providers, 1);
    assert_eq!(summary.edge_count, 1);

    let snapshot = graph.current().await;
    let constraints = PathConstraints::defaults();
    assert!(find_path(&snapshot, &eth(), &usdc(), &constraints).is_ok());
}
