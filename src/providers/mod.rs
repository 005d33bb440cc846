//! Provider registry: the closed enumeration of supported swap providers,
//! their classification (C7), and the `ProviderAdapter` trait each concrete
//! adapter implements (C2).
//!
//! A closed enum plus a static map from identifier to capability, rather
//! than a runtime switch on strings.

pub mod bebop;
pub mod butterswap;
pub mod chainflip;
pub mod classifier;
pub mod cowswap;
pub mod jupiter;
pub mod mayachain;
pub mod nearintents;
pub mod portals;
pub mod relay;
pub mod thorchain;
pub mod zrx;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::asset::AssetId;
use crate::error::CoreResult;
use crate::types::{RouteEdge, StepQuote};

/// Closed enumeration of supported swap providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderId {
    Thorchain,
    Mayachain,
    Chainflip,
    CowSwap,
    Zrx,
    Relay,
    Portals,
    Jupiter,
    NearIntents,
    ButterSwap,
    Bebop,
}

impl ProviderId {
    pub const ALL: [ProviderId; 11] = [
        ProviderId::Thorchain,
        ProviderId::Mayachain,
        ProviderId::Chainflip,
        ProviderId::CowSwap,
        ProviderId::Zrx,
        ProviderId::Relay,
        ProviderId::Portals,
        ProviderId::Jupiter,
        ProviderId::NearIntents,
        ProviderId::ButterSwap,
        ProviderId::Bebop,
    ];
}

/// Per-request deadline for a provider's HTTP call.
pub fn timeout_for(provider: ProviderId) -> Duration {
    match provider {
        ProviderId::CowSwap => Duration::from_secs(15),
        _ => Duration::from_secs(10),
    }
}

/// Provider-typed cross-chain/same-chain step time estimate.
pub fn estimated_time_seconds(provider: ProviderId, is_cross_chain: bool) -> u64 {
    match provider {
        ProviderId::Thorchain | ProviderId::Mayachain => {
            if is_cross_chain {
                1200
            } else {
                60
            }
        }
        ProviderId::Chainflip => 600,
        ProviderId::Relay => 600,
        ProviderId::CowSwap => 120,
        ProviderId::Zrx => 60,
        ProviderId::Portals => 60,
        ProviderId::Jupiter => 30,
        ProviderId::NearIntents => 300,
        ProviderId::ButterSwap => 600,
        ProviderId::Bebop => 60,
    }
}

/// The two operations every catalog adapter implements.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Returns the provider's current set of supported ordered pairs.
    async fn list_pairs(&self) -> CoreResult<Vec<RouteEdge>>;

    /// Performs one HTTP call to quote a single hop.
    async fn quote_step(
        &self,
        edge: &RouteEdge,
        sell_base_unit: &crate::units::BaseUnits,
        user_address: &str,
        receive_address: &str,
    ) -> CoreResult<StepQuote>;
}

/// Parses the `swapperName` field of a create-quote request into a
/// `ProviderId`. Matching is case-insensitive.
pub fn parse_swapper_name(name: &str) -> Result<ProviderId, String> {
    match name.to_ascii_lowercase().as_str() {
        "thorchain" => Ok(ProviderId::Thorchain),
        "mayachain" => Ok(ProviderId::Mayachain),
        "chainflip" => Ok(ProviderId::Chainflip),
        "cowswap" | "cow" => Ok(ProviderId::CowSwap),
        "zrx" | "0x" => Ok(ProviderId::Zrx),
        "relay" => Ok(ProviderId::Relay),
        "portals" => Ok(ProviderId::Portals),
        "jupiter" => Ok(ProviderId::Jupiter),
        "nearintents" | "near-intents" => Ok(ProviderId::NearIntents),
        "butterswap" => Ok(ProviderId::ButterSwap),
        "bebop" => Ok(ProviderId::Bebop),
        other => Err(format!("unknown swapper name '{other}'")),
    }
}

/// Translates an abstract AID into the provider-specific asset notation.
/// Adapters call this and reject unmappable AIDs with a deterministic
/// error.
pub trait AssetNotation {
    fn to_provider_notation(&self, aid: &AssetId) -> CoreResult<String>;
}
