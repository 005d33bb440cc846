//! Jupiter catalog adapter: Solana-local mesh, `GET /v6/quote`.
//!
//! Native SOL (`solana:.../slip44:501`) maps to the wrapped-SOL mint below
//! for Jupiter's quote API, which only speaks mint addresses. Whether the
//! user-facing payment side should ever see the unwrapped native asset is
//! left unresolved upstream; kept as documented behavior rather than
//! silently assumed.

use async_trait::async_trait;
use serde::Deserialize;

use crate::asset::AssetId;
use crate::error::{CoreError, CoreResult};
use crate::providers::{estimated_time_seconds, timeout_for, ProviderAdapter, ProviderId};
use crate::types::{RouteEdge, StepQuote};
use crate::units::BaseUnits;

const SOLANA_CHAIN_ID: &str = "solana:5eykt4uszjbj8jq9gqjx7mn8vkbdq9gs";
const NATIVE_SOL_MINT: &str = "So11111111111111111111111111111111111111112";

fn declared_mints() -> Vec<AssetId> {
    vec![
        AssetId::new(format!("{SOLANA_CHAIN_ID}/slip44:501")),
        AssetId::new(format!(
            "{SOLANA_CHAIN_ID}/spl:epjfwdd5aufqssqem2qn1xzybapc8g4weggkzwytdt1v"
        )),
    ]
}

#[derive(Debug, Deserialize)]
struct JupiterQuoteResponse {
    #[serde(rename = "outAmount")]
    out_amount: String,
    #[serde(default, rename = "slippageBps")]
    slippage_bps: Option<u64>,
}

pub struct JupiterAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl JupiterAdapter {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn mint_address(aid: &AssetId) -> CoreResult<String> {
        if aid.chain_id() != SOLANA_CHAIN_ID {
            return Err(CoreError::UnsupportedAssetOrChain(format!(
                "jupiter is solana-only, got chain {}",
                aid.chain_id()
            )));
        }
        match aid.asset_reference() {
            Some("slip44:501") => Ok(NATIVE_SOL_MINT.to_string()),
            Some(r) => r
                .strip_prefix("spl:")
                .map(|s| s.to_string())
                .ok_or_else(|| CoreError::UnsupportedAssetOrChain(format!("jupiter cannot map asset {aid}"))),
            None => Err(CoreError::UnsupportedAssetOrChain(format!("jupiter cannot map asset {aid}"))),
        }
    }
}

#[async_trait]
impl ProviderAdapter for JupiterAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Jupiter
    }

    async fn list_pairs(&self) -> CoreResult<Vec<RouteEdge>> {
        let mints = declared_mints();
        let mut edges = Vec::new();
        for (i, a) in mints.iter().enumerate() {
            for (j, b) in mints.iter().enumerate() {
                if i == j {
                    continue;
                }
                edges.push(RouteEdge::new(ProviderId::Jupiter, a.clone(), b.clone()));
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
        let input_mint = Self::mint_address(&edge.sell_aid)?;
        let output_mint = Self::mint_address(&edge.buy_aid)?;

        let url = format!(
            "{}/v6/quote?inputMint={}&outputMint={}&amount={}&slippageBps=50",
            self.base_url, input_mint, output_mint, sell_base_unit
        );

        let resp = self
            .client
            .get(&url)
            .timeout(timeout_for(ProviderId::Jupiter))
            .send()
            .await;

        let resp = match resp {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                return Ok(StepQuote::failure(
                    sell_base_unit.clone(),
                    format!("jupiter quote returned status {}", r.status()),
                ))
            }
            Err(e) => return Ok(StepQuote::failure(sell_base_unit.clone(), e.to_string())),
        };

        let parsed: JupiterQuoteResponse = match resp.json().await {
            Ok(p) => p,
            Err(e) => return Ok(StepQuote::failure(sell_base_unit.clone(), e.to_string())),
        };

        let expected_buy = match parsed.out_amount.parse::<BaseUnits>() {
            Ok(v) if !v.is_zero() => v,
            _ => return Ok(StepQuote::failure(sell_base_unit.clone(), "jupiter quote returned zero outAmount")),
        };

        Ok(StepQuote {
            success: true,
            sell_base_unit: sell_base_unit.clone(),
            expected_buy_base_unit: expected_buy,
            fee_usd: 0.0,
            slippage_percent: parsed.slippage_bps.unwrap_or(0) as f64 / 100.0,
            estimated_time_seconds: estimated_time_seconds(ProviderId::Jupiter, edge.is_cross_chain()),
            error: None,
        })
    }
}
