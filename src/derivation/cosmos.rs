//! Cosmos-family address derivation: `m/44'/118'/account'/0/index`, bech32
//! encoded with the chain's human-readable prefix.

use std::str::FromStr;

use bech32::ToBase32;
use bitcoin::bip32::{DerivationPath, Xpriv};
use bitcoin::secp256k1::Secp256k1;
use bitcoin::Network;
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::error::{CoreError, CoreResult};

fn hrp_for(chain_id: &str) -> CoreResult<&'static str> {
    match chain_id {
        "cosmos:cosmoshub-4" => Ok("cosmos"),
        "cosmos:osmosis-1" => Ok("osmo"),
        other => Err(CoreError::UnsupportedAssetOrChain(format!(
            "no cosmos bech32 prefix for chain {other}"
        ))),
    }
}

pub fn derive_address(seed: &[u8], chain_id: &str, account: u32, index: u32) -> CoreResult<String> {
    let hrp = hrp_for(chain_id)?;
    let path = DerivationPath::from_str(&format!("m/44'/118'/{account}'/0/{index}"))
        .map_err(|e| CoreError::UnsupportedAssetOrChain(format!("bad cosmos derivation path: {e}")))?;

    let secp = Secp256k1::new();
    let master = Xpriv::new_master(Network::Bitcoin, seed)
        .map_err(|e| CoreError::UnsupportedAssetOrChain(format!("invalid seed: {e}")))?;
    let child = master
        .derive_priv(&secp, &path)
        .map_err(|e| CoreError::UnsupportedAssetOrChain(format!("cosmos derivation failed: {e}")))?;

    let pubkey = bitcoin::PublicKey::from_private_key(&secp, &child.to_priv());
    let sha = Sha256::digest(pubkey.to_bytes());
    let ripemd = Ripemd160::digest(sha);

    bech32::encode(hrp, ripemd.to_base32(), bech32::Variant::Bech32)
        .map_err(|e| CoreError::UnsupportedAssetOrChain(format!("bech32 encode failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosmoshub_address_has_cosmos_prefix() {
        let seed = [9u8; 32];
        let addr = derive_address(&seed, "cosmos:cosmoshub-4", 0, 0).unwrap();
        assert!(addr.starts_with("cosmos1"));
    }

    #[test]
    fn osmosis_address_has_osmo_prefix() {
        let seed = [9u8; 32];
        let addr = derive_address(&seed, "cosmos:osmosis-1", 0, 0).unwrap();
        assert!(addr.starts_with("osmo1"));
    }
}
