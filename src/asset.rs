//! Asset identifiers (AIDs) and the precision table used to convert between
//! base units and decimal amounts.
//!
//! Generalized from a bare EVM contract-address table to chain-namespaced
//! AIDs that also cover UTXO, Cosmos and Solana assets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical asset identifier: `<chain-namespace>:<chain-reference>/<asset-namespace>:<asset-reference>`.
///
/// Two AIDs are equal iff byte-equal; no normalization happens here, by
/// design — producers are responsible for emitting the canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The chain identifier is everything before the first `/`.
    pub fn chain_id(&self) -> &str {
        self.0.split_once('/').map(|(c, _)| c).unwrap_or(&self.0)
    }

    /// The asset-namespace:asset-reference suffix, if present.
    pub fn asset_reference(&self) -> Option<&str> {
        self.0.split_once('/').map(|(_, a)| a)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AssetId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Decimal precision default when no pattern matches.
pub const DEFAULT_PRECISION: u8 = 18;

/// Known stablecoin contract references (asset-reference suffix, lowercased)
/// that override the chain-family default to 6 decimals.
const KNOWN_STABLECOIN_REFERENCES: &[&str] = &[
    "erc20:0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", // USDC (mainnet)
    "erc20:0xdac17f958d2ee523a2206206994597c13d831ec7", // USDT (mainnet)
    "erc20:0x2791bca1f2de4661ed88a30c99a7a9449aa84174", // USDC.e (polygon)
];

/// Resolves the decimal precision for an AID using a deterministic table:
/// known stablecoins override to 6, UTXO natives to 8, Solana native to 9,
/// Cosmos family to 6, default 18.
pub fn resolve_precision(aid: &AssetId) -> u8 {
    let lowered = aid.as_str().to_ascii_lowercase();

    if KNOWN_STABLECOIN_REFERENCES
        .iter()
        .any(|reference| lowered.ends_with(reference))
    {
        return 6;
    }

    match chain_family(aid.chain_id()) {
        ChainFamily::Utxo => 8,
        ChainFamily::Solana => 9,
        ChainFamily::Cosmos => 6,
        ChainFamily::Evm => DEFAULT_PRECISION,
        ChainFamily::Unknown => DEFAULT_PRECISION,
    }
}

/// Chain family, derived from the CAIP-2-style namespace prefix of a
/// `chainId`. Drives both precision resolution and deposit-address
/// derivation scheme selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainFamily {
    Evm,
    Utxo,
    Cosmos,
    Solana,
    Unknown,
}

pub fn chain_family(chain_id: &str) -> ChainFamily {
    if chain_id.starts_with("eip155:") {
        ChainFamily::Evm
    } else if chain_id.starts_with("bip122:") {
        ChainFamily::Utxo
    } else if chain_id.starts_with("cosmos:") {
        ChainFamily::Cosmos
    } else if chain_id.starts_with("solana:") || chain_id.starts_with("slip44:501") {
        ChainFamily::Solana
    } else {
        ChainFamily::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_id_is_prefix_before_slash() {
        let aid = AssetId::new("eip155:1/erc20:0xdeadbeef");
        assert_eq!(aid.chain_id(), "eip155:1");
        assert_eq!(aid.asset_reference(), Some("erc20:0xdeadbeef"));
    }

    #[test]
    fn precision_defaults_and_overrides() {
        let evm_native = AssetId::new("eip155:1/slip44:60");
        assert_eq!(resolve_precision(&evm_native), 18);

        let usdc = AssetId::new("eip155:1/erc20:0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
        assert_eq!(resolve_precision(&usdc), 6);

        let btc = AssetId::new("bip122:000000000019d6689c085ae165831e93/slip44:0");
        assert_eq!(resolve_precision(&btc), 8);

        let sol = AssetId::new("solana:5eykt4usz8n8aolzpnuztz1pm5szgxszgxsz/slip44:501");
        assert_eq!(resolve_precision(&sol), 9);

        let atom = AssetId::new("cosmos:cosmoshub-4/slip44:118");
        assert_eq!(resolve_precision(&atom), 6);
    }

    #[test]
    fn equality_is_byte_equal() {
        let a = AssetId::new("eip155:1/slip44:60");
        let b = AssetId::new("EIP155:1/slip44:60");
        assert_ne!(a, b);
    }
}
