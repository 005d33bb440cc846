//! An adjacency-list view over every provider's declared pairs, rebuilt
//! periodically from `list_pairs()` and swapped in atomically.
//!
//! Holds a periodically-refreshed snapshot behind `Arc<RwLock<..>>` so
//! readers never block on a rebuild.

use std::collections::HashMap as StdHashMap;
use std::sync::Arc;

use hashbrown::HashMap;
use tokio::sync::RwLock;

use crate::asset::AssetId;
use crate::providers::ProviderAdapter;
use crate::types::RouteEdge;

/// Immutable snapshot of the asset graph: adjacency from a sell asset to
/// every edge departing it, deduped by (sell, buy, provider).
#[derive(Debug, Default)]
pub struct GraphSnapshot {
    adjacency: HashMap<AssetId, Vec<RouteEdge>>,
    edge_count: usize,
}

impl GraphSnapshot {
    pub(crate) fn build(edges: Vec<RouteEdge>) -> Self {
        let mut adjacency: HashMap<AssetId, Vec<RouteEdge>> = HashMap::new();
        let mut seen = StdHashMap::new();
        let mut edge_count = 0;
        for edge in edges {
            let key = edge.identity();
            if seen.insert(key, ()).is_some() {
                continue;
            }
            adjacency.entry(edge.sell_aid.clone()).or_default().push(edge);
            edge_count += 1;
        }
        Self { adjacency, edge_count }
    }

    pub fn neighbors(&self, asset: &AssetId) -> &[RouteEdge] {
        self.adjacency.get(asset).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn has_asset(&self, asset: &AssetId) -> bool {
        self.adjacency.contains_key(asset)
    }

    pub fn asset_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}

/// Owns the current snapshot behind a lock and knows how to rebuild it from
/// a set of provider adapters.
pub struct AssetGraph {
    snapshot: RwLock<Arc<GraphSnapshot>>,
}

impl Default for AssetGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetGraph {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(GraphSnapshot::default())),
        }
    }

    pub async fn current(&self) -> Arc<GraphSnapshot> {
        self.snapshot.read().await.clone()
    }

    /// Calls `list_pairs()` on every adapter, concurrently, and swaps in a
    /// fresh snapshot built from whichever providers succeeded. A failing
    /// provider is logged and skipped rather than aborting the whole
    /// rebuild: providers are independent, one outage must not blank the
    /// graph.
    pub async fn rebuild(&self, providers: &[Arc<dyn ProviderAdapter>]) -> RebuildSummary {
        let futures = providers.iter().map(|p| async move {
            let id = p.id();
            match p.list_pairs().await {
                Ok(edges) => Some(edges),
                Err(err) => {
                    tracing::warn!(provider = ?id, error = %err, "provider list_pairs failed during graph rebuild");
                    None
                }
            }
        });
        let results = futures::future::join_all(futures).await;

        let failed_providers = results.iter().filter(|r| r.is_none()).count();
        let mut all_edges = Vec::new();
        for edges in results.into_iter().flatten() {
            all_edges.extend(edges);
        }

        let snapshot = GraphSnapshot::build(all_edges);
        let summary = RebuildSummary {
            asset_count: snapshot.asset_count(),
            edge_count: snapshot.edge_count(),
            failed_providers,
        };

        *self.snapshot.write().await = Arc::new(snapshot);
        summary
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebuildSummary {
    pub asset_count: usize,
    pub edge_count: usize,
    pub failed_providers: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderId;

    fn edge(provider: ProviderId, sell: &str, buy: &str) -> RouteEdge {
        RouteEdge::new(provider, AssetId::new(sell), AssetId::new(buy))
    }

    #[test]
    fn build_dedupes_identical_edges() {
        let e = edge(ProviderId::CowSwap, "eip155:1/slip44:60", "eip155:1/erc20:0xaa");
        let snapshot = GraphSnapshot::build(vec![e.clone(), e]);
        assert_eq!(snapshot.edge_count(), 1);
        assert_eq!(snapshot.asset_count(), 1);
    }

    #[test]
    fn neighbors_returns_empty_slice_for_unknown_asset() {
        let snapshot = GraphSnapshot::default();
        assert!(snapshot.neighbors(&AssetId::new("eip155:1/slip44:60")).is_empty());
    }

    #[tokio::test]
    async fn rebuild_swaps_in_new_snapshot() {
        let graph = AssetGraph::new();
        assert_eq!(graph.current().await.edge_count(), 0);

        struct StubAdapter(Vec<RouteEdge>);
        #[async_trait::async_trait]
        impl ProviderAdapter for StubAdapter {
            fn id(&self) -> ProviderId {
                ProviderId::CowSwap
            }
            async fn list_pairs(&self) -> crate::error::CoreResult<Vec<RouteEdge>> {
                Ok(self.0.clone())
            }
            async fn quote_step(
                &self,
                edge: &RouteEdge,
                sell_base_unit: &crate::units::BaseUnits,
                _user_address: &str,
                _receive_address: &str,
            ) -> crate::error::CoreResult<crate::types::StepQuote> {
                Ok(crate::types::StepQuote::failure(sell_base_unit.clone(), "stub"))
            }
        }

        let e = edge(ProviderId::CowSwap, "eip155:1/slip44:60", "eip155:1/erc20:0xaa");
        let providers: Vec<Arc<dyn ProviderAdapter>> = vec![Arc::new(StubAdapter(vec![e]))];
        let summary = graph.rebuild(&providers).await;
        assert_eq!(summary.edge_count, 1);
        assert_eq!(summary.failed_providers, 0);
        assert_eq!(graph.current().await.edge_count(), 1);
    }
}
