//! Portals catalog adapter: same-chain EVM mesh, `GET /v2/portal`.

use async_trait::async_trait;
use serde::Deserialize;

use crate::asset::AssetId;
use crate::error::{CoreError, CoreResult};
use crate::providers::{estimated_time_seconds, timeout_for, ProviderAdapter, ProviderId};
use crate::types::{RouteEdge, StepQuote};
use crate::units::BaseUnits;

fn supported_chains() -> &'static [(&'static str, &'static str)] {
    &[("eip155:1", "ethereum"), ("eip155:137", "polygon")]
}

fn tokens_for(chain_id: &str) -> Vec<AssetId> {
    match chain_id {
        "eip155:1" => vec![
            AssetId::new("eip155:1/slip44:60"),
            AssetId::new("eip155:1/erc20:0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"),
        ],
        _ => Vec::new(),
    }
}

#[derive(Debug, Deserialize)]
struct PortalResponse {
    #[serde(rename = "outputAmount")]
    output_amount: String,
}

pub struct PortalsAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl PortalsAdapter {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn token_param(aid: &AssetId) -> CoreResult<String> {
        let chain = match aid.chain_id() {
            "eip155:1" => "ethereum",
            "eip155:137" => "polygon",
            other => {
                return Err(CoreError::UnsupportedAssetOrChain(format!(
                    "portals does not serve chain {other}"
                )))
            }
        };
        let token = aid
            .asset_reference()
            .and_then(|r| r.strip_prefix("erc20:"))
            .map(|s| s.to_string())
            .or_else(|| {
                (aid.asset_reference() == Some("slip44:60"))
                    .then(|| "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE".to_string())
            })
            .ok_or_else(|| CoreError::UnsupportedAssetOrChain(format!("portals cannot map asset {aid}")))?;
        Ok(format!("{chain}:{token}"))
    }
}

#[async_trait]
impl ProviderAdapter for PortalsAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Portals
    }

    async fn list_pairs(&self) -> CoreResult<Vec<RouteEdge>> {
        let mut edges = Vec::new();
        for (chain_id, _) in supported_chains() {
            let tokens = tokens_for(chain_id);
            for (i, a) in tokens.iter().enumerate() {
                for (j, b) in tokens.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    edges.push(RouteEdge::new(ProviderId::Portals, a.clone(), b.clone()));
                }
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
        let input_token = Self::token_param(&edge.sell_aid)?;
        let output_token = Self::token_param(&edge.buy_aid)?;

        let url = format!(
            "{}/v2/portal?inputToken={}&outputToken={}&inputAmount={}&slippageTolerancePercentage=1",
            self.base_url, input_token, output_token, sell_base_unit
        );

        let resp = self
            .client
            .get(&url)
            .timeout(timeout_for(ProviderId::Portals))
            .send()
            .await;

        let resp = match resp {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                return Ok(StepQuote::failure(
                    sell_base_unit.clone(),
                    format!("portals quote returned status {}", r.status()),
                ))
            }
            Err(e) => return Ok(StepQuote::failure(sell_base_unit.clone(), e.to_string())),
        };

        let parsed: PortalResponse = match resp.json().await {
            Ok(p) => p,
            Err(e) => return Ok(StepQuote::failure(sell_base_unit.clone(), e.to_string())),
        };

        let expected_buy = match parsed.output_amount.parse::<BaseUnits>() {
            Ok(v) if !v.is_zero() => v,
            _ => return Ok(StepQuote::failure(sell_base_unit.clone(), "portals quote returned zero outputAmount")),
        };

        Ok(StepQuote {
            success: true,
            sell_base_unit: sell_base_unit.clone(),
            expected_buy_base_unit: expected_buy,
            fee_usd: 0.0,
            slippage_percent: 1.0,
            estimated_time_seconds: estimated_time_seconds(ProviderId::Portals, edge.is_cross_chain()),
            error: None,
        })
    }
}
