//! 0x catalog adapter: same-chain EVM mesh, `GET /swap/v1/quote`.

use async_trait::async_trait;
use serde::Deserialize;

use crate::asset::AssetId;
use crate::error::{CoreError, CoreResult};
use crate::providers::{estimated_time_seconds, timeout_for, ProviderAdapter, ProviderId};
use crate::types::{RouteEdge, StepQuote};
use crate::units::BaseUnits;

fn supported_chains() -> &'static [&'static str] {
    &["eip155:1", "eip155:137", "eip155:42161"]
}

fn tokens_for(chain_id: &str) -> Vec<AssetId> {
    match chain_id {
        "eip155:1" => vec![
            AssetId::new("eip155:1/slip44:60"),
            AssetId::new("eip155:1/erc20:0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"),
            AssetId::new("eip155:1/erc20:0xdac17f958d2ee523a2206206994597c13d831ec7"),
        ],
        _ => Vec::new(),
    }
}

#[derive(Debug, Deserialize)]
struct SwapQuoteResponse {
    #[serde(rename = "buyAmount")]
    buy_amount: String,
}

pub struct ZrxAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl ZrxAdapter {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn contract_address(aid: &AssetId) -> CoreResult<String> {
        aid.asset_reference()
            .and_then(|r| r.strip_prefix("erc20:"))
            .map(|s| s.to_string())
            .or_else(|| {
                (aid.asset_reference() == Some("slip44:60"))
                    .then(|| "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE".to_string())
            })
            .ok_or_else(|| CoreError::UnsupportedAssetOrChain(format!("0x cannot map asset {aid}")))
    }
}

#[async_trait]
impl ProviderAdapter for ZrxAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Zrx
    }

    async fn list_pairs(&self) -> CoreResult<Vec<RouteEdge>> {
        let mut edges = Vec::new();
        for chain_id in supported_chains() {
            let tokens = tokens_for(chain_id);
            for (i, a) in tokens.iter().enumerate() {
                for (j, b) in tokens.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    edges.push(RouteEdge::new(ProviderId::Zrx, a.clone(), b.clone()));
                }
            }
        }
        Ok(edges)
    }

    async fn quote_step(
        &self,
        edge: &RouteEdge,
        sell_base_unit: &BaseUnits,
        user_address: &str,
        _receive_address: &str,
    ) -> CoreResult<StepQuote> {
        let sell_token = Self::contract_address(&edge.sell_aid)?;
        let buy_token = Self::contract_address(&edge.buy_aid)?;

        let url = format!(
            "{}/swap/v1/quote?sellToken={}&buyToken={}&sellAmount={}&takerAddress={}",
            self.base_url, sell_token, buy_token, sell_base_unit, user_address
        );

        let resp = self
            .client
            .get(&url)
            .timeout(timeout_for(ProviderId::Zrx))
            .send()
            .await;

        let resp = match resp {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                return Ok(StepQuote::failure(
                    sell_base_unit.clone(),
                    format!("0x quote returned status {}", r.status()),
                ))
            }
            Err(e) => return Ok(StepQuote::failure(sell_base_unit.clone(), e.to_string())),
        };

        let parsed: SwapQuoteResponse = match resp.json().await {
            Ok(p) => p,
            Err(e) => return Ok(StepQuote::failure(sell_base_unit.clone(), e.to_string())),
        };

        let expected_buy = match parsed.buy_amount.parse::<BaseUnits>() {
            Ok(v) if !v.is_zero() => v,
            _ => return Ok(StepQuote::failure(sell_base_unit.clone(), "0x quote returned zero buyAmount")),
        };

        Ok(StepQuote {
            success: true,
            sell_base_unit: sell_base_unit.clone(),
            expected_buy_base_unit: expected_buy,
            fee_usd: 0.0,
            slippage_percent: 0.0,
            estimated_time_seconds: estimated_time_seconds(ProviderId::Zrx, edge.is_cross_chain()),
            error: None,
        })
    }
}
