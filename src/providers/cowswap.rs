//! CowSwap catalog adapter: same-chain EVM mesh, quoting via the full
//! ERC-20 order-quote body, with typed request/response structs and a
//! per-call `reqwest::Client`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::asset::AssetId;
use crate::error::{CoreError, CoreResult};
use crate::providers::{estimated_time_seconds, timeout_for, ProviderAdapter, ProviderId};
use crate::types::{RouteEdge, StepQuote};
use crate::units::BaseUnits;

/// EVM chains CowSwap serves, mapped to its `network` URL segment.
fn supported_chains() -> &'static [(&'static str, &'static str)] {
    &[("eip155:1", "mainnet"), ("eip155:100", "xdai"), ("eip155:42161", "arbitrum_one")]
}

/// A handful of per-chain tokens advertised for the mesh catalog. A real
/// deployment would pull this from CowSwap's token list API; kept static
/// here since token discovery is not part of this spec's scope.
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

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderQuoteRequest<'a> {
    sell_token: &'a str,
    buy_token: &'a str,
    receiver: &'a str,
    sell_amount_before_fee: String,
    kind: &'static str,
    from: &'a str,
}

#[derive(Debug, Deserialize)]
struct OrderQuoteResponse {
    quote: OrderQuoteInner,
}

#[derive(Debug, Deserialize)]
struct OrderQuoteInner {
    #[serde(rename = "buyAmount")]
    buy_amount: String,
    #[serde(default, rename = "feeAmount")]
    fee_amount: Option<String>,
}

pub struct CowSwapAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl CowSwapAdapter {
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
            .ok_or_else(|| CoreError::UnsupportedAssetOrChain(format!("cowswap cannot map asset {aid}")))
    }

    fn network_segment(chain_id: &str) -> CoreResult<&'static str> {
        supported_chains()
            .iter()
            .find(|(c, _)| *c == chain_id)
            .map(|(_, n)| *n)
            .ok_or_else(|| CoreError::UnsupportedAssetOrChain(format!("cowswap does not serve chain {chain_id}")))
    }
}

#[async_trait]
impl ProviderAdapter for CowSwapAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::CowSwap
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
                    edges.push(RouteEdge::new(ProviderId::CowSwap, a.clone(), b.clone()));
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
        receive_address: &str,
    ) -> CoreResult<StepQuote> {
        let network = Self::network_segment(&edge.sell_chain_id)?;
        let sell_token = Self::contract_address(&edge.sell_aid)?;
        let buy_token = Self::contract_address(&edge.buy_aid)?;

        let body = OrderQuoteRequest {
            sell_token: &sell_token,
            buy_token: &buy_token,
            receiver: receive_address,
            sell_amount_before_fee: sell_base_unit.to_string(),
            kind: "sell",
            from: user_address,
        };

        let url = format!("{}/{}/api/v1/quote", self.base_url, network);
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .timeout(timeout_for(ProviderId::CowSwap))
            .send()
            .await;

        let resp = match resp {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                return Ok(StepQuote::failure(
                    sell_base_unit.clone(),
                    format!("cowswap quote returned status {}", r.status()),
                ))
            }
            Err(e) => return Ok(StepQuote::failure(sell_base_unit.clone(), e.to_string())),
        };

        let parsed: OrderQuoteResponse = match resp.json().await {
            Ok(p) => p,
            Err(e) => return Ok(StepQuote::failure(sell_base_unit.clone(), e.to_string())),
        };

        let expected_buy = match parsed.quote.buy_amount.parse::<BaseUnits>() {
            Ok(v) if !v.is_zero() => v,
            _ => return Ok(StepQuote::failure(sell_base_unit.clone(), "cowswap quote returned zero buyAmount")),
        };

        let fee_usd = parsed
            .quote
            .fee_amount
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(0.0);

        Ok(StepQuote {
            success: true,
            sell_base_unit: sell_base_unit.clone(),
            expected_buy_base_unit: expected_buy,
            fee_usd,
            slippage_percent: 0.0,
            estimated_time_seconds: estimated_time_seconds(ProviderId::CowSwap, edge.is_cross_chain()),
            error: None,
        })
    }
}
