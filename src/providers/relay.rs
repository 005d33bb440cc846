//! Relay catalog adapter: cross-chain native-asset mesh, `POST /quote`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::asset::AssetId;
use crate::error::{CoreError, CoreResult};
use crate::providers::{estimated_time_seconds, timeout_for, ProviderAdapter, ProviderId};
use crate::types::{RouteEdge, StepQuote};
use crate::units::BaseUnits;

#[derive(Debug, Clone)]
struct RelayNative {
    aid: AssetId,
    chain_numeric_id: u64,
    currency: &'static str,
}

fn declared_natives() -> Vec<RelayNative> {
    vec![
        RelayNative { aid: AssetId::new("eip155:1/slip44:60"), chain_numeric_id: 1, currency: "eth" },
        RelayNative { aid: AssetId::new("eip155:137/slip44:966"), chain_numeric_id: 137, currency: "matic" },
        RelayNative { aid: AssetId::new("eip155:42161/slip44:60"), chain_numeric_id: 42161, currency: "eth" },
        RelayNative { aid: AssetId::new("eip155:10/slip44:60"), chain_numeric_id: 10, currency: "eth" },
    ]
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteRequest<'a> {
    user: &'a str,
    origin_chain_id: u64,
    destination_chain_id: u64,
    origin_currency: &'a str,
    destination_currency: &'a str,
    amount: String,
    recipient: &'a str,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    details: QuoteDetails,
    #[serde(default)]
    fees: Option<QuoteFees>,
}

#[derive(Debug, Deserialize)]
struct QuoteDetails {
    #[serde(rename = "currencyOut")]
    currency_out: CurrencyAmount,
}

#[derive(Debug, Deserialize)]
struct CurrencyAmount {
    amount: String,
}

#[derive(Debug, Deserialize)]
struct QuoteFees {
    #[serde(default)]
    relayer: Option<RelayerFee>,
}

#[derive(Debug, Deserialize)]
struct RelayerFee {
    #[serde(default)]
    usd: Option<String>,
}

pub struct RelayAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl RelayAdapter {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn find(&self, aid: &AssetId) -> CoreResult<RelayNative> {
        declared_natives()
            .into_iter()
            .find(|n| &n.aid == aid)
            .ok_or_else(|| CoreError::UnsupportedAssetOrChain(format!("relay does not support native asset {aid}")))
    }
}

#[async_trait]
impl ProviderAdapter for RelayAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Relay
    }

    async fn list_pairs(&self) -> CoreResult<Vec<RouteEdge>> {
        let natives = declared_natives();
        let mut edges = Vec::new();
        for (i, a) in natives.iter().enumerate() {
            for (j, b) in natives.iter().enumerate() {
                if i == j {
                    continue;
                }
                edges.push(RouteEdge::new(ProviderId::Relay, a.aid.clone(), b.aid.clone()));
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
        let origin = self.find(&edge.sell_aid)?;
        let destination = self.find(&edge.buy_aid)?;

        let body = QuoteRequest {
            user: user_address,
            origin_chain_id: origin.chain_numeric_id,
            destination_chain_id: destination.chain_numeric_id,
            origin_currency: origin.currency,
            destination_currency: destination.currency,
            amount: sell_base_unit.to_string(),
            recipient: receive_address,
        };

        let resp = self
            .client
            .post(format!("{}/quote", self.base_url))
            .json(&body)
            .timeout(timeout_for(ProviderId::Relay))
            .send()
            .await;

        let resp = match resp {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                return Ok(StepQuote::failure(
                    sell_base_unit.clone(),
                    format!("relay quote returned status {}", r.status()),
                ))
            }
            Err(e) => return Ok(StepQuote::failure(sell_base_unit.clone(), e.to_string())),
        };

        let parsed: QuoteResponse = match resp.json().await {
            Ok(p) => p,
            Err(e) => return Ok(StepQuote::failure(sell_base_unit.clone(), e.to_string())),
        };

        let expected_buy = match parsed.details.currency_out.amount.parse::<BaseUnits>() {
            Ok(v) if !v.is_zero() => v,
            _ => return Ok(StepQuote::failure(sell_base_unit.clone(), "relay quote returned zero output")),
        };

        let fee_usd = parsed
            .fees
            .and_then(|f| f.relayer)
            .and_then(|r| r.usd)
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(0.0);

        Ok(StepQuote {
            success: true,
            sell_base_unit: sell_base_unit.clone(),
            expected_buy_base_unit: expected_buy,
            fee_usd,
            slippage_percent: 0.0,
            estimated_time_seconds: estimated_time_seconds(ProviderId::Relay, edge.is_cross_chain()),
            error: None,
        })
    }
}
