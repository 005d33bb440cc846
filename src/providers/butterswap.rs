//! ButterSwap catalog adapter: service-custody cross-chain swaps. Like
//! `nearintents.rs`, its public wire shape isn't formally documented; this
//! follows the same mesh-plus-POST-quote convention.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::asset::AssetId;
use crate::error::{CoreError, CoreResult};
use crate::providers::{estimated_time_seconds, timeout_for, ProviderAdapter, ProviderId};
use crate::types::{RouteEdge, StepQuote};
use crate::units::BaseUnits;

fn declared_assets() -> Vec<AssetId> {
    vec![
        AssetId::new("eip155:1/slip44:60"),
        AssetId::new("eip155:56/slip44:60"),
        AssetId::new("bip122:000000000019d6689c085ae165831e93/slip44:0"),
    ]
}

#[derive(Debug, Serialize)]
struct ButterQuoteRequest<'a> {
    #[serde(rename = "fromToken")]
    from_token: &'a str,
    #[serde(rename = "toToken")]
    to_token: &'a str,
    #[serde(rename = "fromAmount")]
    from_amount: String,
}

#[derive(Debug, Deserialize)]
struct ButterQuoteResponse {
    #[serde(rename = "toAmount")]
    to_amount: String,
}

pub struct ButterSwapAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl ButterSwapAdapter {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn assert_known(aid: &AssetId) -> CoreResult<()> {
        declared_assets()
            .iter()
            .any(|a| a == aid)
            .then_some(())
            .ok_or_else(|| CoreError::UnsupportedAssetOrChain(format!("butterswap does not support asset {aid}")))
    }
}

#[async_trait]
impl ProviderAdapter for ButterSwapAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::ButterSwap
    }

    async fn list_pairs(&self) -> CoreResult<Vec<RouteEdge>> {
        let assets = declared_assets();
        let mut edges = Vec::new();
        for (i, a) in assets.iter().enumerate() {
            for (j, b) in assets.iter().enumerate() {
                if i == j {
                    continue;
                }
                edges.push(RouteEdge::new(ProviderId::ButterSwap, a.clone(), b.clone()));
            }
        }
        Ok(edges)
    }

    async fn quote_step(
        &self,
        edge: &RouteEdge,
        sell_base_unit: &BaseUnits,
        _user_address: &str,
        _receive_address: &str,
    ) -> CoreResult<StepQuote> {
        Self::assert_known(&edge.sell_aid)?;
        Self::assert_known(&edge.buy_aid)?;

        let body = ButterQuoteRequest {
            from_token: edge.sell_aid.as_str(),
            to_token: edge.buy_aid.as_str(),
            from_amount: sell_base_unit.to_string(),
        };

        let resp = self
            .client
            .post(format!("{}/route/quote", self.base_url))
            .json(&body)
            .timeout(timeout_for(ProviderId::ButterSwap))
            .send()
            .await;

        let resp = match resp {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                return Ok(StepQuote::failure(
                    sell_base_unit.clone(),
                    format!("butterswap quote returned status {}", r.status()),
                ))
            }
            Err(e) => return Ok(StepQuote::failure(sell_base_unit.clone(), e.to_string())),
        };

        let parsed: ButterQuoteResponse = match resp.json().await {
            Ok(p) => p,
            Err(e) => return Ok(StepQuote::failure(sell_base_unit.clone(), e.to_string())),
        };

        let expected_buy = match parsed.to_amount.parse::<BaseUnits>() {
            Ok(v) if !v.is_zero() => v,
            _ => return Ok(StepQuote::failure(sell_base_unit.clone(), "butterswap quote returned zero toAmount")),
        };

        Ok(StepQuote {
            success: true,
            sell_base_unit: sell_base_unit.clone(),
            expected_buy_base_unit: expected_buy,
            fee_usd: 0.0,
            slippage_percent: 0.0,
            estimated_time_seconds: estimated_time_seconds(ProviderId::ButterSwap, edge.is_cross_chain()),
            error: None,
        })
    }
}
