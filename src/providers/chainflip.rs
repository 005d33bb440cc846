//! Chainflip catalog adapter: a mesh (all-pairs) adapter over a declared
//! asset set, quoting via a broker `POST /quote`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::asset::AssetId;
use crate::error::{CoreError, CoreResult};
use crate::providers::{estimated_time_seconds, timeout_for, ProviderAdapter, ProviderId};
use crate::types::{RouteEdge, StepQuote};
use crate::units::BaseUnits;

#[derive(Debug, Clone)]
struct ChainflipAsset {
    aid: AssetId,
    chain: &'static str,
    asset: &'static str,
}

fn declared_assets() -> Vec<ChainflipAsset> {
    vec![
        ChainflipAsset {
            aid: AssetId::new("eip155:1/slip44:60"),
            chain: "Ethereum",
            asset: "ETH",
        },
        ChainflipAsset {
            aid: AssetId::new("eip155:1/erc20:0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"),
            chain: "Ethereum",
            asset: "USDC",
        },
        ChainflipAsset {
            aid: AssetId::new("bip122:000000000019d6689c085ae165831e93/slip44:0"),
            chain: "Bitcoin",
            asset: "BTC",
        },
        ChainflipAsset {
            aid: AssetId::new("polkadot:91b171bb158e2d3848fa23a9f1c25182/slip44:354"),
            chain: "Polkadot",
            asset: "DOT",
        },
        ChainflipAsset {
            aid: AssetId::new("solana:5eykt4uszjbj8jq9gqjx7mn8vkbdq9gs/slip44:501"),
            chain: "Solana",
            asset: "SOL",
        },
    ]
}

#[derive(Debug, Serialize)]
struct QuoteRequest<'a> {
    #[serde(rename = "srcAsset")]
    src_asset: &'a str,
    #[serde(rename = "srcChain")]
    src_chain: &'a str,
    #[serde(rename = "destAsset")]
    dest_asset: &'a str,
    #[serde(rename = "destChain")]
    dest_chain: &'a str,
    amount: String,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(default, rename = "egressAmount")]
    egress_amount: Option<String>,
    #[serde(default, rename = "estimatedOutput")]
    estimated_output: Option<String>,
}

pub struct ChainflipAdapter {
    client: reqwest::Client,
    broker_url: String,
    api_key: Option<String>,
}

impl ChainflipAdapter {
    pub fn new(broker_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            broker_url: broker_url.into(),
            api_key,
        }
    }

    fn find_asset(&self, aid: &AssetId) -> CoreResult<ChainflipAsset> {
        declared_assets()
            .into_iter()
            .find(|a| &a.aid == aid)
            .ok_or_else(|| CoreError::UnsupportedAssetOrChain(format!("chainflip does not support asset {aid}")))
    }
}

#[async_trait]
impl ProviderAdapter for ChainflipAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Chainflip
    }

    async fn list_pairs(&self) -> CoreResult<Vec<RouteEdge>> {
        let assets = declared_assets();
        let mut edges = Vec::new();
        for (i, a) in assets.iter().enumerate() {
            for (j, b) in assets.iter().enumerate() {
                if i == j {
                    continue;
                }
                edges.push(RouteEdge::new(ProviderId::Chainflip, a.aid.clone(), b.aid.clone()));
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
        let src = self.find_asset(&edge.sell_aid)?;
        let dst = self.find_asset(&edge.buy_aid)?;

        let body = QuoteRequest {
            src_asset: src.asset,
            src_chain: src.chain,
            dest_asset: dst.asset,
            dest_chain: dst.chain,
            amount: sell_base_unit.to_string(),
        };

        let mut request = self
            .client
            .post(format!("{}/quote", self.broker_url))
            .json(&body)
            .timeout(timeout_for(ProviderId::Chainflip));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp = match request.send().await {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                return Ok(StepQuote::failure(
                    sell_base_unit.clone(),
                    format!("chainflip quote returned status {}", r.status()),
                ))
            }
            Err(e) => return Ok(StepQuote::failure(sell_base_unit.clone(), e.to_string())),
        };

        let parsed: QuoteResponse = match resp.json().await {
            Ok(p) => p,
            Err(e) => return Ok(StepQuote::failure(sell_base_unit.clone(), e.to_string())),
        };

        let raw_output = parsed.egress_amount.or(parsed.estimated_output);
        let expected_buy = match raw_output.and_then(|v| v.parse::<BaseUnits>().ok()) {
            Some(v) if !v.is_zero() => v,
            _ => return Ok(StepQuote::failure(sell_base_unit.clone(), "chainflip quote missing output amount")),
        };

        Ok(StepQuote {
            success: true,
            sell_base_unit: sell_base_unit.clone(),
            expected_buy_base_unit: expected_buy,
            fee_usd: 0.0,
            slippage_percent: 0.0,
            estimated_time_seconds: estimated_time_seconds(ProviderId::Chainflip, edge.is_cross_chain()),
            error: None,
        })
    }
}
