//! NEAR Intents catalog adapter: service-custody solver network. No
//! upstream contract pins an exact wire shape for this provider; this
//! adapter follows the same mesh-plus-POST-quote convention as
//! Relay/Chainflip since NEAR Intents quotes are also solved off an intent
//! rather than an on-chain pool.

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
        AssetId::new("solana:5eykt4uszjbj8jq9gqjx7mn8vkbdq9gs/slip44:501"),
        AssetId::new("cosmos:cosmoshub-4/slip44:118"),
    ]
}

#[derive(Debug, Serialize)]
struct IntentQuoteRequest<'a> {
    #[serde(rename = "assetIn")]
    asset_in: &'a str,
    #[serde(rename = "assetOut")]
    asset_out: &'a str,
    #[serde(rename = "amountIn")]
    amount_in: String,
}

#[derive(Debug, Deserialize)]
struct IntentQuoteResponse {
    #[serde(rename = "amountOut")]
    amount_out: String,
}

pub struct NearIntentsAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl NearIntentsAdapter {
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
            .ok_or_else(|| CoreError::UnsupportedAssetOrChain(format!("near intents does not support asset {aid}")))
    }
}

#[async_trait]
impl ProviderAdapter for NearIntentsAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::NearIntents
    }

    async fn list_pairs(&self) -> CoreResult<Vec<RouteEdge>> {
        let assets = declared_assets();
        let mut edges = Vec::new();
        for (i, a) in assets.iter().enumerate() {
            for (j, b) in assets.iter().enumerate() {
                if i == j {
                    continue;
                }
                edges.push(RouteEdge::new(ProviderId::NearIntents, a.clone(), b.clone()));
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

        let body = IntentQuoteRequest {
            asset_in: edge.sell_aid.as_str(),
            asset_out: edge.buy_aid.as_str(),
            amount_in: sell_base_unit.to_string(),
        };

        let resp = self
            .client
            .post(format!("{}/intents/quote", self.base_url))
            .json(&body)
            .timeout(timeout_for(ProviderId::NearIntents))
            .send()
            .await;

        let resp = match resp {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                return Ok(StepQuote::failure(
                    sell_base_unit.clone(),
                    format!("near intents quote returned status {}", r.status()),
                ))
            }
            Err(e) => return Ok(StepQuote::failure(sell_base_unit.clone(), e.to_string())),
        };

        let parsed: IntentQuoteResponse = match resp.json().await {
            Ok(p) => p,
            Err(e) => return Ok(StepQuote::failure(sell_base_unit.clone(), e.to_string())),
        };

        let expected_buy = match parsed.amount_out.parse::<BaseUnits>() {
            Ok(v) if !v.is_zero() => v,
            _ => return Ok(StepQuote::failure(sell_base_unit.clone(), "near intents quote returned zero amountOut")),
        };

        Ok(StepQuote {
            success: true,
            sell_base_unit: sell_base_unit.clone(),
            expected_buy_base_unit: expected_buy,
            fee_usd: 0.0,
            slippage_percent: 0.0,
            estimated_time_seconds: estimated_time_seconds(ProviderId::NearIntents, edge.is_cross_chain()),
            error: None,
        })
    }
}
