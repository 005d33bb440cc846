//! Static direct/service-custody provider registry and the allow/exclude
//! filtering every routing and send-swap operation runs through.
//!
//! Keeps a static registry of known providers and treats anything outside
//! it as unsupported, classified direct/service-custody rather than by
//! contract-address lookup.

use hashbrown::HashMap;

use crate::providers::ProviderId;
use crate::types::ProviderType;

/// Static classification record for one provider.
#[derive(Debug, Clone, Copy)]
pub struct ProviderClass {
    pub provider_type: ProviderType,
    pub supports_destination_address: bool,
    pub description: &'static str,
}

fn registry() -> HashMap<ProviderId, ProviderClass> {
    let mut m = HashMap::new();
    m.insert(
        ProviderId::Thorchain,
        ProviderClass {
            provider_type: ProviderType::Direct,
            supports_destination_address: true,
            description: "Thorchain native cross-chain liquidity pools",
        },
    );
    m.insert(
        ProviderId::Mayachain,
        ProviderClass {
            provider_type: ProviderType::Direct,
            supports_destination_address: true,
            description: "Mayachain native cross-chain liquidity pools",
        },
    );
    m.insert(
        ProviderId::Chainflip,
        ProviderClass {
            provider_type: ProviderType::Direct,
            supports_destination_address: true,
            description: "Chainflip broker-quoted cross-chain swaps",
        },
    );
    m.insert(
        ProviderId::CowSwap,
        ProviderClass {
            provider_type: ProviderType::Direct,
            supports_destination_address: true,
            description: "CoW Protocol batch-auction EVM swaps",
        },
    );
    m.insert(
        ProviderId::Zrx,
        ProviderClass {
            provider_type: ProviderType::Direct,
            supports_destination_address: true,
            description: "0x same-chain EVM DEX aggregation",
        },
    );
    m.insert(
        ProviderId::Relay,
        ProviderClass {
            provider_type: ProviderType::Direct,
            supports_destination_address: true,
            description: "Relay cross-chain native-asset transfers",
        },
    );
    m.insert(
        ProviderId::Portals,
        ProviderClass {
            provider_type: ProviderType::Direct,
            supports_destination_address: true,
            description: "Portals same-chain EVM portal swaps",
        },
    );
    m.insert(
        ProviderId::Jupiter,
        ProviderClass {
            provider_type: ProviderType::Direct,
            supports_destination_address: true,
            description: "Jupiter Solana-local DEX aggregation",
        },
    );
    m.insert(
        ProviderId::NearIntents,
        ProviderClass {
            provider_type: ProviderType::ServiceCustody,
            supports_destination_address: true,
            description: "NEAR intents solver network, service-custodied",
        },
    );
    m.insert(
        ProviderId::ButterSwap,
        ProviderClass {
            provider_type: ProviderType::ServiceCustody,
            supports_destination_address: true,
            description: "ButterSwap service-custody cross-chain swaps",
        },
    );
    m.insert(
        ProviderId::Bebop,
        ProviderClass {
            provider_type: ProviderType::ServiceCustody,
            supports_destination_address: true,
            description: "Bebop service-custody RFQ swaps",
        },
    );
    m
}

/// The classification for an unknown provider: service-custody with no
/// destination-address support, which excludes it everywhere.
const UNKNOWN_CLASS: ProviderClass = ProviderClass {
    provider_type: ProviderType::ServiceCustody,
    supports_destination_address: false,
    description: "unrecognized provider",
};

pub struct ProviderClassifier;

impl ProviderClassifier {
    pub fn classify(provider: ProviderId) -> ProviderClass {
        match registry().get(&provider) {
            Some(class) => *class,
            None => {
                tracing::warn!(?provider, "unknown provider defaulted to service-custody/excluded");
                UNKNOWN_CLASS
            }
        }
    }

    pub fn type_of(provider: ProviderId) -> ProviderType {
        Self::classify(provider).provider_type
    }

    pub fn is_excluded(provider: ProviderId) -> bool {
        !Self::classify(provider).supports_destination_address
    }

    pub fn filter_valid(providers: &[ProviderId]) -> Vec<ProviderId> {
        providers
            .iter()
            .copied()
            .filter(|p| !Self::is_excluded(*p))
            .collect()
    }

    /// Validates a provider for a send-swap quote request.
    pub fn validate_for_quote(provider: ProviderId) -> Result<(), String> {
        if Self::is_excluded(provider) {
            return Err(format!(
                "provider {provider:?} does not support destination addresses and is excluded"
            ));
        }
        Ok(())
    }
}
