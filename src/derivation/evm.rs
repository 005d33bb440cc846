//! EVM-family address derivation: `m/44'/60'/account'/0/index`, shared by
//! every EVM chain` across
//! ETH, AVAX, BSC, POLYGON, OPTIMISM, ARBITRUM, BASE, GNOSIS).

use std::str::FromStr;

use bitcoin::bip32::{DerivationPath, Xpriv};
use bitcoin::secp256k1::Secp256k1;
use bitcoin::Network;
use sha3::{Digest, Keccak256};

use crate::error::{CoreError, CoreResult};

pub fn derive_address(seed: &[u8], account: u32, index: u32) -> CoreResult<String> {
    let path = DerivationPath::from_str(&format!("m/44'/60'/{account}'/0/{index}"))
        .map_err(|e| CoreError::UnsupportedAssetOrChain(format!("bad EVM derivation path: {e}")))?;
    let secp = Secp256k1::new();
    let master = Xpriv::new_master(Network::Bitcoin, seed)
        .map_err(|e| CoreError::UnsupportedAssetOrChain(format!("invalid seed: {e}")))?;
    let child = master
        .derive_priv(&secp, &path)
        .map_err(|e| CoreError::UnsupportedAssetOrChain(format!("EVM derivation failed: {e}")))?;

    let pubkey = child.to_priv().inner.public_key(&secp);
    let uncompressed = pubkey.serialize_uncompressed();
    let hash = Keccak256::digest(&uncompressed[1..]);
    Ok(format!("0x{}", hex::encode(&hash[12..])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_deterministic_address_for_same_index() {
        let seed = [7u8; 32];
        let a = derive_address(&seed, 0, 0).unwrap();
        let b = derive_address(&seed, 0, 0).unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with("0x"));
        assert_eq!(a.len(), 42);
    }

    #[test]
    fn distinct_indices_yield_distinct_addresses() {
        let seed = [7u8; 32];
        let a = derive_address(&seed, 0, 0).unwrap();
        let b = derive_address(&seed, 0, 1).unwrap();
        assert_ne!(a, b);
    }
}
