//! Shortest-path search over the asset graph under hop and cross-chain
//! constraints.
//!
//! A priority-queue search rather than plain DFS, weighted by hop count and
//! cross-chain-hop count since edge cost (the actual exchange rate) is
//! unknown until a provider is queried for a quote.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::asset::AssetId;
use crate::error::{CoreError, CoreResult};
use crate::graph::GraphSnapshot;
use crate::types::{FoundPath, PathConstraints, RouteEdge};

/// Per-hop weight: 1 for a same-chain hop, 3 for a cross-chain one. Same-chain
/// routes of equal hop count are preferred over cross-chain ones, but the gap
/// is small enough that the formula's ties (e.g. one cross-chain hop costs
/// the same as three same-chain hops) actually occur and are broken by
/// stable insertion order, not eliminated by an arbitrarily large penalty.
const BASE_WEIGHT: u32 = 1;
const CROSS_CHAIN_PENALTY: u32 = 2;

fn edge_weight(edge: &RouteEdge) -> u32 {
    BASE_WEIGHT + if edge.is_cross_chain() { CROSS_CHAIN_PENALTY } else { 0 }
}

#[derive(Debug, Clone)]
struct Visit {
    asset: AssetId,
    cost: u32,
    hops: usize,
    cross_chain_hops: usize,
    path_edges: Vec<RouteEdge>,
}

impl PartialEq for Visit {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost
    }
}
impl Eq for Visit {}
impl Ord for Visit {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap via BinaryHeap (which is max-heap by default).
        other.cost.cmp(&self.cost)
    }
}
impl PartialOrd for Visit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Finds the lowest-cost simple path from `sell` to `buy` that satisfies
/// `constraints`. On failure, diagnoses *why* no such path exists by
/// re-running the search with each constraint relaxed in turn, so callers
/// get a specific error (hop limit, cross-chain limit, provider exclusion)
/// rather than an undifferentiated "no route" for every failure.
pub fn find_path(
    graph: &GraphSnapshot,
    sell: &AssetId,
    buy: &AssetId,
    constraints: &PathConstraints,
) -> CoreResult<FoundPath> {
    if sell == buy {
        return Err(CoreError::NoRoute { from: sell.clone(), to: buy.clone() });
    }
    if !graph.has_asset(sell) {
        return Err(CoreError::AssetUnknown(sell.clone()));
    }

    if let Some(path) = search(graph, sell, buy, constraints) {
        return Ok(path);
    }

    let mut relaxed_hops = constraints.clone();
    relaxed_hops.max_hops = usize::MAX;
    if let Some(path) = search(graph, sell, buy, &relaxed_hops) {
        return Err(CoreError::MaxHopsExceeded { actual: path.hop_count(), max: constraints.max_hops });
    }

    let mut relaxed_cross_chain = constraints.clone();
    relaxed_cross_chain.max_cross_chain_hops = usize::MAX;
    if let Some(path) = search(graph, sell, buy, &relaxed_cross_chain) {
        return Err(CoreError::MaxCrossChainExceeded {
            actual: path.cross_chain_hop_count(),
            max: constraints.max_cross_chain_hops,
        });
    }

    let mut relaxed_providers = constraints.clone();
    relaxed_providers.allowed_providers = None;
    relaxed_providers.excluded_providers = Vec::new();
    if let Some(path) = search(graph, sell, buy, &relaxed_providers) {
        if let Some(edge) = path.edges.iter().find(|e| !constraints.allows(e.provider)) {
            return Err(CoreError::ProviderDisallowed(edge.provider));
        }
    }

    Err(CoreError::NoRoute { from: sell.clone(), to: buy.clone() })
}

/// The actual search, with no error diagnosis: `None` just means this
/// particular set of constraints admits no path.
fn search(graph: &GraphSnapshot, sell: &AssetId, buy: &AssetId, constraints: &PathConstraints) -> Option<FoundPath> {
    // Fast path: a single direct edge satisfying the constraints and
    // allow/exclude filter avoids the full search entirely.
    if let Some(direct) = graph.neighbors(sell).iter().find(|e| &e.buy_aid == buy && constraints.permits(e)) {
        let cross_chain_hops = usize::from(direct.is_cross_chain());
        if cross_chain_hops <= constraints.max_cross_chain_hops {
            return Some(FoundPath {
                asset_ids: vec![sell.clone(), buy.clone()],
                edges: vec![direct.clone()],
            });
        }
    }

    let mut best_cost: HashMap<AssetId, u32> = HashMap::new();
    let mut heap = BinaryHeap::new();
    heap.push(Visit {
        asset: sell.clone(),
        cost: 0,
        hops: 0,
        cross_chain_hops: 0,
        path_edges: Vec::new(),
    });
    best_cost.insert(sell.clone(), 0);

    while let Some(current) = heap.pop() {
        if &current.asset == buy {
            return finish(sell.clone(), current.path_edges);
        }

        if current.hops >= constraints.max_hops {
            continue;
        }

        for edge in graph.neighbors(&current.asset) {
            if !constraints.permits(edge) {
                continue;
            }
            if current.path_edges.iter().any(|e| e.sell_aid == edge.buy_aid || e.buy_aid == edge.buy_aid) {
                continue; // keep paths simple: no revisiting an asset
            }

            let is_cross_chain = edge.is_cross_chain();
            let next_cross_chain_hops = current.cross_chain_hops + usize::from(is_cross_chain);
            if next_cross_chain_hops > constraints.max_cross_chain_hops {
                continue;
            }

            let next_cost = current.cost + edge_weight(edge);

            let better = best_cost
                .get(&edge.buy_aid)
                .map(|&known| next_cost < known)
                .unwrap_or(true);
            if !better {
                continue;
            }
            best_cost.insert(edge.buy_aid.clone(), next_cost);

            let mut next_edges = current.path_edges.clone();
            next_edges.push(edge.clone());
            heap.push(Visit {
                asset: edge.buy_aid.clone(),
                cost: next_cost,
                hops: current.hops + 1,
                cross_chain_hops: next_cross_chain_hops,
                path_edges: next_edges,
            });
        }
    }

    None
}

fn finish(sell: AssetId, edges: Vec<RouteEdge>) -> Option<FoundPath> {
    let mut asset_ids = vec![sell];
    for edge in &edges {
        asset_ids.push(edge.buy_aid.clone());
    }
    let path = FoundPath { asset_ids, edges };
    // Post-validation guards against a search bug ever surfacing a cyclic
    // or constraint-violating path to a caller.
    debug_assert!(path.is_simple());
    Some(path)
}

/// Finds up to `max_alternatives` distinct paths (by asset+provider
/// signature), searching again with each prior path's first edge excluded
/// so the search diversifies rather than re-finding the same route. Only
/// that one `(sell, buy, provider)` edge is blocked each round, not the
/// whole provider, so an unrelated edge served by the same provider stays
/// eligible for later alternatives.
pub fn find_alternatives(
    graph: &GraphSnapshot,
    sell: &AssetId,
    buy: &AssetId,
    constraints: &PathConstraints,
    max_alternatives: usize,
) -> Vec<FoundPath> {
    let mut found = Vec::new();
    let mut seen_signatures = std::collections::HashSet::new();
    let mut excluded_edges = constraints.excluded_edges.clone();

    while found.len() < max_alternatives {
        let mut attempt = constraints.clone();
        attempt.excluded_edges = excluded_edges.clone();

        let Ok(path) = find_path(graph, sell, buy, &attempt) else {
            break;
        };

        let signature = path.signature();
        if seen_signatures.insert(signature) {
            found.push(path.clone());
        }

        let Some(first_edge) = path.edges.first() else {
            break;
        };
        let key = (first_edge.sell_aid.clone(), first_edge.buy_aid.clone(), first_edge.provider);
        if excluded_edges.contains(&key) {
            break; // search space exhausted, avoid looping forever
        }
        excluded_edges.push(key);
    }

    found
}
