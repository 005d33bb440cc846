//! Turns a `FoundPath` into a priced `MultiStepRoute` by quoting each hop
//! in sequence, chaining output into input.
//!
//! Generalized from walking on-chain pool reserves to walking off-chain
//! provider HTTP quotes, each of which can independently fail.

use std::collections::HashMap;
use std::sync::Arc;

use crate::asset::resolve_precision;
use crate::error::{CoreError, CoreResult};
use crate::price::PriceOracle;
use crate::providers::{ProviderAdapter, ProviderId};
use crate::types::{FoundPath, MultiStepRoute, RouteStep};
use crate::units::BaseUnits;

pub type AdapterRegistry = HashMap<ProviderId, Arc<dyn ProviderAdapter>>;

/// Quotes every hop of `path` in order, feeding each hop's output as the
/// next hop's input. Stops at the first failing hop and surfaces
/// `CoreError::QuoteFailed` naming its index, rather than returning a
/// partially-priced route.
pub async fn quote_path(
    adapters: &AdapterRegistry,
    path: &FoundPath,
    sell_base_unit: BaseUnits,
    user_address: &str,
    receive_address: &str,
) -> CoreResult<Vec<RouteStep>> {
    let mut steps = Vec::with_capacity(path.edges.len());
    let mut running_amount = sell_base_unit;

    for (hop, edge) in path.edges.iter().enumerate() {
        let adapter = adapters.get(&edge.provider).ok_or_else(|| CoreError::QuoteFailed {
            hop,
            reason: format!("no adapter registered for provider {:?}", edge.provider),
        })?;

        let quote = adapter
            .quote_step(edge, &running_amount, user_address, receive_address)
            .await?;

        if !quote.success {
            return Err(CoreError::QuoteFailed {
                hop,
                reason: quote.error.clone().unwrap_or_else(|| "unknown failure".to_string()),
            });
        }

        running_amount = quote.expected_buy_base_unit.clone();
        steps.push(RouteStep { edge: edge.clone(), quote });
    }

    Ok(steps)
}

/// Aggregates quoted steps into the totals a caller sees: summed fees,
/// compounded slippage, the bottleneck ETA, and price impact.
///
/// Slippage compounds as a sum of per-hop slippage rather than a geometric
/// compounding of `(1 - slippage)` factors: a three-hop route at 1% each
/// reports 3%, not ~2.97%. Both are defensible; the sum is simpler to reason
/// about for a user setting a tolerance and is what downstream alerting
/// assumes, so it is picked here and is always `>= max(step_slippages)`.
pub async fn aggregate(
    steps: Vec<RouteStep>,
    oracle: &dyn PriceOracle,
    sell_usd_value: f64,
) -> MultiStepRoute {
    let total_steps = steps.len();
    let total_fees_usd: f64 = steps.iter().map(|s| s.quote.fee_usd).sum();
    let total_slippage_percent: f64 = steps.iter().map(|s| s.quote.slippage_percent).sum();
    let estimated_time_seconds: u64 = steps.iter().map(|s| s.quote.estimated_time_seconds).sum();

    let estimated_output_base_unit = steps
        .last()
        .map(|s| s.quote.expected_buy_base_unit.clone())
        .unwrap_or_else(BaseUnits::zero);

    let estimated_output_precision = steps
        .last()
        .map(|s| resolve_precision(&s.edge.buy_aid).to_string())
        .unwrap_or_default();

    let price_impact_percent = match steps.last() {
        Some(last) => {
            let decimals = resolve_precision(&last.edge.buy_aid);
            let buy_amount_decimal = last.quote.expected_buy_base_unit.to_decimal(decimals);
            crate::price::price_impact_percent(
                oracle,
                &steps[0].edge.sell_aid,
                sell_usd_value,
                &last.edge.buy_aid,
                buy_amount_decimal,
            )
            .await
        }
        None => None,
    };

    MultiStepRoute {
        total_steps,
        estimated_output_base_unit,
        estimated_output_precision,
        total_fees_usd,
        total_slippage_percent,
        estimated_time_seconds,
        steps,
        price_impact_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetId;
    use crate::types::{RouteEdge, StepQuote};
    use async_trait::async_trait;

    struct StubOracle;
    #[async_trait]
    impl PriceOracle for StubOracle {
        async fn usd_price(&self, _asset: &AssetId) -> CoreResult<f64> {
            Ok(1.0)
        }
    }

    fn step(sell: &str, buy: &str, out: u64) -> RouteStep {
        let edge = RouteEdge::new(ProviderId::CowSwap, AssetId::new(sell), AssetId::new(buy));
        let quote = StepQuote {
            success: true,
            sell_base_unit: BaseUnits::from_u64(100),
            expected_buy_base_unit: BaseUnits::from_u64(out),
            fee_usd: 1.5,
            slippage_percent: 0.5,
            estimated_time_seconds: 30,
            error: None,
        };
        RouteStep { edge, quote }
    }

    #[tokio::test]
    async fn aggregate_sums_fees_and_slippage() {
        let steps = vec![step("eip155:1/slip44:60", "eip155:1/erc20:0xaa", 90), step("eip155:1/erc20:0xaa", "eip155:1/erc20:0xbb", 80)];
        let route = aggregate(steps, &StubOracle, 100.0).await;
        assert_eq!(route.total_steps, 2);
        assert!((route.total_fees_usd - 3.0).abs() < 1e-9);
        assert!((route.total_slippage_percent - 1.0).abs() < 1e-9);
        assert!(route.total_slippage_percent >= 0.5); // compounded sum dominates any single hop
    }

    #[tokio::test]
    async fn price_impact_ignores_gas_overhead_of_service_custody_hops() {
        let edge = RouteEdge::new(ProviderId::Thorchain, AssetId::new("eip155:1/slip44:60"), AssetId::new("eip155:1/erc20:0xaa"));
        let quote = StepQuote {
            success: true,
            sell_base_unit: BaseUnits::from_u64(100),
            expected_buy_base_unit: BaseUnits::from_u64(100),
            fee_usd: 0.0,
            slippage_percent: 0.0,
            estimated_time_seconds: 600,
            error: None,
        };
        let steps = vec![RouteStep { edge, quote }];
        let route = aggregate(steps, &StubOracle, 100.0).await;
        let impact = route.price_impact_percent.unwrap();
        assert!(impact.abs() < 1e-9, "gas overhead must not be folded into price impact, got {impact}");
    }

    #[tokio::test]
    async fn quote_path_fails_fast_on_missing_adapter() {
        let edge = RouteEdge::new(ProviderId::CowSwap, AssetId::new("a"), AssetId::new("b"));
        let path = FoundPath {
            asset_ids: vec![AssetId::new("a"), AssetId::new("b")],
            edges: vec![edge],
        };
        let adapters = AdapterRegistry::new();
        let err = quote_path(&adapters, &path, BaseUnits::from_u64(1), "user", "recv")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::QuoteFailed { hop: 0, .. }));
    }
}
