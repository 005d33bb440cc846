//! BIP32/44/84 deposit-address derivation for secp256k1 chains, SLIP-0010
//! ed25519 for Solana, all from a single seed acquired once at startup from
//! configuration.

pub mod cosmos;
pub mod evm;
pub mod solana;
pub mod utxo;

use bip39::{Language, Mnemonic, Seed};

use crate::asset::{chain_family, ChainFamily};
use crate::error::{CoreError, CoreResult};

/// Holds the BIP39 seed bytes derived once at startup and dispatches
/// derivation requests to the per-family scheme.
pub struct Deriver {
    seed: Vec<u8>,
}

impl Deriver {
    pub fn from_mnemonic(phrase: &str, passphrase: &str) -> CoreResult<Self> {
        let mnemonic = Mnemonic::from_phrase(phrase, Language::English)
            .map_err(|e| CoreError::Validation(format!("invalid mnemonic: {e}")))?;
        let seed = Seed::new(&mnemonic, passphrase);
        Ok(Self { seed: seed.as_bytes().to_vec() })
    }

    #[cfg(test)]
    pub fn from_raw_seed(seed: Vec<u8>) -> Self {
        Self { seed }
    }

    /// Derives the deposit address for `chainId` at `(account, index)`
    ///. `account` is fixed per deployment; `index` is the
    /// per-quote monotonically increasing value the lifecycle manager
    /// allocates at quote creation.
    pub fn derive(&self, chain_id: &str, account: u32, index: u32) -> CoreResult<String> {
        match chain_family(chain_id) {
            ChainFamily::Evm => evm::derive_address(&self.seed, account, index),
            ChainFamily::Utxo => utxo::derive_address(&self.seed, chain_id, account, index),
            ChainFamily::Cosmos => cosmos::derive_address(&self.seed, chain_id, account, index),
            ChainFamily::Solana => solana::derive_address(&self.seed, chain_id, account, index),
            ChainFamily::Unknown => Err(CoreError::UnsupportedAssetOrChain(format!(
                "no derivation scheme for chain {chain_id}"
            ))),
        }
    }

    /// Startup liveness check: derives one address per family at index 0 so
    /// a misconfigured seed or crate mismatch surfaces before serving
    /// traffic, rather than on the first real quote.
    pub fn liveness_check(&self) -> CoreResult<()> {
        self.derive("eip155:1", 0, 0)?;
        self.derive("bip122:000000000019d6689c085ae165831e93", 0, 0)?;
        self.derive("cosmos:cosmoshub-4", 0, 0)?;
        self.derive("solana:5eykt4uszjbj8jq9gqjx7mn8vkbdq9gs", 0, 0)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn liveness_check_passes_for_a_valid_seed() {
        let deriver = Deriver::from_raw_seed(vec![1u8; 64]);
        assert!(deriver.liveness_check().is_ok());
    }

    #[test]
    fn unknown_chain_family_is_rejected() {
        let deriver = Deriver::from_raw_seed(vec![1u8; 64]);
        assert!(deriver.derive("unknownchain:1", 0, 0).is_err());
    }
}
