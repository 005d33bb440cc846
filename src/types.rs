//! Shared domain types used across the graph, pathfinder, aggregator and
//! provider adapters: route edges, found paths, and quotes.

use serde::{Deserialize, Serialize};

use crate::asset::AssetId;
use crate::providers::ProviderId;
use crate::units::BaseUnits;

/// A directed edge in the asset graph: one provider's support for swapping
/// `sell_aid` into `buy_aid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEdge {
    pub provider: ProviderId,
    pub sell_aid: AssetId,
    pub buy_aid: AssetId,
    pub sell_chain_id: String,
    pub buy_chain_id: String,
}

impl RouteEdge {
    pub fn new(provider: ProviderId, sell_aid: AssetId, buy_aid: AssetId) -> Self {
        let sell_chain_id = sell_aid.chain_id().to_string();
        let buy_chain_id = buy_aid.chain_id().to_string();
        Self {
            provider,
            sell_aid,
            buy_aid,
            sell_chain_id,
            buy_chain_id,
        }
    }

    pub fn is_cross_chain(&self) -> bool {
        self.sell_chain_id != self.buy_chain_id
    }

    /// Identity triple used for edge dedup in the graph.
    pub fn identity(&self) -> (AssetId, AssetId, ProviderId) {
        (self.sell_aid.clone(), self.buy_aid.clone(), self.provider)
    }
}

/// A simple path through the asset graph: `assetIds[0..n]`, `edges[0..n-1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoundPath {
    pub asset_ids: Vec<AssetId>,
    pub edges: Vec<RouteEdge>,
}

impl FoundPath {
    pub fn hop_count(&self) -> usize {
        self.edges.len()
    }

    pub fn cross_chain_hop_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_cross_chain()).count()
    }

    /// Uniqueness signature for `findAlternatives` dedup: asset sequence
    /// concatenated with provider sequence.
    pub fn signature(&self) -> String {
        let assets = self
            .asset_ids
            .iter()
            .map(|a| a.as_str())
            .collect::<Vec<_>>()
            .join(">");
        let providers = self
            .edges
            .iter()
            .map(|e| format!("{:?}", e.provider))
            .collect::<Vec<_>>()
            .join(">");
        format!("{assets}|{providers}")
    }

    /// Postcondition check: no repeated asset in the sequence.
    pub fn is_simple(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.asset_ids.iter().all(|a| seen.insert(a))
    }
}

/// User-supplied routing constraints.
#[derive(Debug, Clone, Default)]
pub struct PathConstraints {
    pub max_hops: usize,
    pub max_cross_chain_hops: usize,
    pub allowed_providers: Option<Vec<ProviderId>>,
    pub excluded_providers: Vec<ProviderId>,
    /// Specific `(sell, buy, provider)` edges blocked regardless of the
    /// provider-level allow/exclude lists. Used by `find_alternatives` to
    /// rule out one edge of a prior best path without disqualifying every
    /// other edge that provider serves.
    pub excluded_edges: Vec<(AssetId, AssetId, ProviderId)>,
}

impl PathConstraints {
    pub fn defaults() -> Self {
        Self {
            max_hops: 4,
            max_cross_chain_hops: 2,
            allowed_providers: None,
            excluded_providers: Vec::new(),
            excluded_edges: Vec::new(),
        }
    }

    pub fn allows(&self, provider: ProviderId) -> bool {
        if self.excluded_providers.contains(&provider) {
            return false;
        }
        match &self.allowed_providers {
            Some(allowed) => allowed.contains(&provider),
            None => true,
        }
    }

    /// Combines the provider-level allow/exclude filter with the specific
    /// edge exclusion list.
    pub fn permits(&self, edge: &RouteEdge) -> bool {
        if !self.allows(edge.provider) {
            return false;
        }
        !self
            .excluded_edges
            .iter()
            .any(|(sell, buy, provider)| sell == &edge.sell_aid && buy == &edge.buy_aid && *provider == edge.provider)
    }

    /// Cache key component, with sorted provider lists for determinism.
    pub fn cache_suffix(&self) -> String {
        let mut suffix = format!("h{}:x{}", self.max_hops, self.max_cross_chain_hops);
        if let Some(allowed) = &self.allowed_providers {
            let mut sorted: Vec<String> = allowed.iter().map(|p| format!("{p:?}")).collect();
            sorted.sort();
            suffix.push_str(&format!(":a{}", sorted.join(",")));
        }
        if !self.excluded_providers.is_empty() {
            let mut sorted: Vec<String> = self
                .excluded_providers
                .iter()
                .map(|p| format!("{p:?}"))
                .collect();
            sorted.sort();
            suffix.push_str(&format!(":e{}", sorted.join(",")));
        }
        suffix
    }
}

/// Result of executing one provider's step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepQuote {
    pub success: bool,
    pub sell_base_unit: BaseUnits,
    pub expected_buy_base_unit: BaseUnits,
    pub fee_usd: f64,
    pub slippage_percent: f64,
    pub estimated_time_seconds: u64,
    pub error: Option<String>,
}

impl StepQuote {
    pub fn failure(sell_base_unit: BaseUnits, error: impl Into<String>) -> Self {
        Self {
            success: false,
            sell_base_unit,
            expected_buy_base_unit: BaseUnits::zero(),
            fee_usd: 0.0,
            slippage_percent: 0.0,
            estimated_time_seconds: 0,
            error: Some(error.into()),
        }
    }
}

/// One realized hop in a composed route, holding the edge it traversed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStep {
    pub edge: RouteEdge,
    pub quote: StepQuote,
}

/// The aggregated, multi-step route returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiStepRoute {
    pub total_steps: usize,
    pub estimated_output_base_unit: BaseUnits,
    pub estimated_output_precision: String,
    pub total_fees_usd: f64,
    pub total_slippage_percent: f64,
    pub estimated_time_seconds: u64,
    pub steps: Vec<RouteStep>,
    pub price_impact_percent: Option<f64>,
}

/// Provider classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderType {
    Direct,
    ServiceCustody,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(provider: ProviderId, sell: &str, buy: &str) -> RouteEdge {
        RouteEdge::new(provider, AssetId::new(sell), AssetId::new(buy))
    }

    #[test]
    fn cross_chain_detection() {
        let same = edge(ProviderId::CowSwap, "eip155:1/slip44:60", "eip155:1/erc20:0xaa");
        assert!(!same.is_cross_chain());

        let cross = edge(ProviderId::Thorchain, "eip155:1/slip44:60", "bip122:000/slip44:0");
        assert!(cross.is_cross_chain());
    }

    #[test]
    fn path_invariants_hold() {
        let e1 = edge(ProviderId::CowSwap, "eip155:1/slip44:60", "eip155:1/erc20:0xaa");
        let e2 = edge(ProviderId::Zrx, "eip155:1/erc20:0xaa", "eip155:1/erc20:0xbb");
        let path = FoundPath {
            asset_ids: vec![
                AssetId::new("eip155:1/slip44:60"),
                AssetId::new("eip155:1/erc20:0xaa"),
                AssetId::new("eip155:1/erc20:0xbb"),
            ],
            edges: vec![e1, e2],
        };
        assert_eq!(path.hop_count(), 2);
        assert_eq!(path.cross_chain_hop_count(), 0);
        assert!(path.is_simple());
    }
}
