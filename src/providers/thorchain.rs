//! Thorchain catalog adapter: pool-based listing plus the documented quote
//! endpoint.
//!
//! A thin struct wrapping a client plus one method per remote read, the
//! same shape used across the other per-protocol adapters in this module,
//! adapted here to an HTTP-only provider.

use async_trait::async_trait;
use serde::Deserialize;

use crate::asset::AssetId;
use crate::error::{CoreError, CoreResult};
use crate::providers::{estimated_time_seconds, timeout_for, ProviderAdapter, ProviderId};
use crate::types::{RouteEdge, StepQuote};
use crate::units::BaseUnits;

const NATIVE_CHAIN_ID: &str = "cosmos:thorchain-1";

#[derive(Debug, Deserialize)]
struct Pool {
    asset: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    expected_amount_out: String,
    #[serde(default)]
    slippage_bps: Option<u64>,
    #[serde(default)]
    fees: Option<QuoteFees>,
}

#[derive(Debug, Deserialize)]
struct QuoteFees {
    #[serde(default)]
    affiliate: Option<String>,
    #[serde(default)]
    outbound: Option<String>,
    #[serde(default)]
    liquidity: Option<String>,
}

pub struct ThorchainAdapter {
    client: reqwest::Client,
    node_url: String,
}

impl ThorchainAdapter {
    pub fn new(node_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            node_url: node_url.into(),
        }
    }

    /// Translates `chain.ASSET` pool notation into an AID. Thorchain pool
    /// assets look like `ETH.ETH` or `ETH.USDC-0XA0B8...`.
    fn pool_asset_to_aid(pool_asset: &str) -> Option<AssetId> {
        let (chain, symbol) = pool_asset.split_once('.')?;
        let chain_id = match chain {
            "THOR" => "cosmos:thorchain-1".to_string(),
            "BTC" => "bip122:000000000019d6689c085ae165831e93".to_string(),
            "ETH" => "eip155:1".to_string(),
            "BNB" => "eip155:56".to_string(),
            "AVAX" => "eip155:43114".to_string(),
            other => format!("thorchain-asset:{other}"),
        };
        if let Some((asset_symbol, contract)) = symbol.split_once('-') {
            let _ = asset_symbol;
            Some(AssetId::new(format!("{chain_id}/erc20:{}", contract.to_ascii_lowercase())))
        } else {
            Some(AssetId::new(format!("{chain_id}/slip44:native:{symbol}")))
        }
    }

    fn aid_to_thorchain_notation(aid: &AssetId) -> CoreResult<String> {
        // Deterministic, reversible inverse of `pool_asset_to_aid` for the
        // subset of chains this adapter advertises.
        match aid.chain_id() {
            "eip155:1" => Ok(format!(
                "ETH.{}",
                aid.asset_reference().unwrap_or_default().to_ascii_uppercase()
            )),
            "bip122:000000000019d6689c085ae165831e93" => Ok("BTC.BTC".to_string()),
            "cosmos:thorchain-1" => Ok("THOR.RUNE".to_string()),
            other => Err(CoreError::UnsupportedAssetOrChain(format!(
                "thorchain cannot map asset {aid} on chain {other}"
            ))),
        }
    }
}

#[async_trait]
impl ProviderAdapter for ThorchainAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Thorchain
    }

    async fn list_pairs(&self) -> CoreResult<Vec<RouteEdge>> {
        let url = format!("{}/thorchain/pools", self.node_url);
        let resp = self
            .client
            .get(&url)
            .timeout(timeout_for(ProviderId::Thorchain))
            .send()
            .await
            .map_err(|e| CoreError::Network {
                provider: ProviderId::Thorchain,
                message: e.to_string(),
            })?;

        let pools: Vec<Pool> = resp.json().await.map_err(|e| CoreError::Network {
            provider: ProviderId::Thorchain,
            message: e.to_string(),
        })?;

        let native = AssetId::new(format!("{NATIVE_CHAIN_ID}/slip44:931"));
        let mut edges = Vec::new();
        for pool in pools.into_iter().filter(|p| p.status == "Available") {
            if let Some(pool_aid) = Self::pool_asset_to_aid(&pool.asset) {
                edges.push(RouteEdge::new(ProviderId::Thorchain, native.clone(), pool_aid.clone()));
                edges.push(RouteEdge::new(ProviderId::Thorchain, pool_aid, native.clone()));
            }
        }
        Ok(edges)
    }

    async fn quote_step(
        &self,
        edge: &RouteEdge,
        sell_base_unit: &BaseUnits,
        _user_address: &str,
        receive_address: &str,
    ) -> CoreResult<StepQuote> {
        let from_asset = Self::aid_to_thorchain_notation(&edge.sell_aid)?;
        let to_asset = Self::aid_to_thorchain_notation(&edge.buy_aid)?;

        let url = format!(
            "{}/thorchain/quote/swap?from_asset={}&to_asset={}&amount={}&destination={}",
            self.node_url, from_asset, to_asset, sell_base_unit, receive_address
        );

        let resp = self
            .client
            .get(&url)
            .timeout(timeout_for(ProviderId::Thorchain))
            .send()
            .await;

        let resp = match resp {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                return Ok(StepQuote::failure(
                    sell_base_unit.clone(),
                    format!("thorchain quote returned status {}", r.status()),
                ))
            }
            Err(e) => return Ok(StepQuote::failure(sell_base_unit.clone(), e.to_string())),
        };

        let parsed: QuoteResponse = match resp.json().await {
            Ok(p) => p,
            Err(e) => return Ok(StepQuote::failure(sell_base_unit.clone(), e.to_string())),
        };

        let expected_buy = parsed
            .expected_amount_out
            .parse::<BaseUnits>()
            .map_err(|e| CoreError::Network {
                provider: ProviderId::Thorchain,
                message: e,
            })?;

        if expected_buy.is_zero() {
            return Ok(StepQuote::failure(
                sell_base_unit.clone(),
                "thorchain quote returned zero output",
            ));
        }

        let fee_usd = parsed
            .fees
            .as_ref()
            .and_then(|f| f.outbound.as_deref())
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(0.0);
        let slippage_percent = parsed.slippage_bps.unwrap_or(0) as f64 / 100.0;

        Ok(StepQuote {
            success: true,
            sell_base_unit: sell_base_unit.clone(),
            expected_buy_base_unit: expected_buy,
            fee_usd,
            slippage_percent,
            estimated_time_seconds: estimated_time_seconds(ProviderId::Thorchain, edge.is_cross_chain()),
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_asset_parses_native() {
        let aid = ThorchainAdapter::pool_asset_to_aid("ETH.ETH").unwrap();
        assert_eq!(aid.chain_id(), "eip155:1");
    }

    #[test]
    fn pool_asset_parses_token() {
        let aid = ThorchainAdapter::pool_asset_to_aid("ETH.USDC-0XA0B86991C6218B36C1D19D4A2E9EB0CE3606EB48").unwrap();
        assert!(aid.as_str().contains("erc20:0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"));
    }
}
