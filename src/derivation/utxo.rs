//! UTXO-family address derivation: native segwit (`m/84'/c'/a'/0/i`) for
//! BTC/LTC, legacy (`m/44'/c'/a'/0/i`) for DOGE/BCH.

use std::str::FromStr;

use bech32::ToBase32;
use bitcoin::bip32::{DerivationPath, Xpriv};
use bitcoin::secp256k1::Secp256k1;
use bitcoin::Network;
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy)]
enum Scheme {
    NativeSegwit { hrp: &'static str },
    Legacy { version_byte: u8 },
}

struct CoinConfig {
    coin_type: u32,
    scheme: Scheme,
}

fn coin_config(chain_id: &str) -> CoreResult<CoinConfig> {
    match chain_id {
        "bip122:000000000019d6689c085ae165831e93" => Ok(CoinConfig {
            coin_type: 0,
            scheme: Scheme::NativeSegwit { hrp: "bc" },
        }),
        "bip122:12a765e31ffd4059bada1e25190f6e98" => Ok(CoinConfig {
            coin_type: 2,
            scheme: Scheme::NativeSegwit { hrp: "ltc" },
        }),
        "bip122:1a91e3dace36e2be3bf030a65679fe82" => Ok(CoinConfig {
            coin_type: 3,
            scheme: Scheme::Legacy { version_byte: 0x1e },
        }),
        "bip122:000000000000000000651ef99cb9fcbe" => Ok(CoinConfig {
            coin_type: 145,
            scheme: Scheme::Legacy { version_byte: 0x00 },
        }),
        other => Err(CoreError::UnsupportedAssetOrChain(format!(
            "no UTXO derivation scheme for chain {other}"
        ))),
    }
}

pub fn derive_address(seed: &[u8], chain_id: &str, account: u32, index: u32) -> CoreResult<String> {
    let coin = coin_config(chain_id)?;
    let purpose = match coin.scheme {
        Scheme::NativeSegwit { .. } => 84,
        Scheme::Legacy { .. } => 44,
    };
    let path = DerivationPath::from_str(&format!(
        "m/{purpose}'/{}'/{account}'/0/{index}",
        coin.coin_type
    ))
    .map_err(|e| CoreError::UnsupportedAssetOrChain(format!("bad UTXO derivation path: {e}")))?;

    let secp = Secp256k1::new();
    let master = Xpriv::new_master(Network::Bitcoin, seed)
        .map_err(|e| CoreError::UnsupportedAssetOrChain(format!("invalid seed: {e}")))?;
    let child = master
        .derive_priv(&secp, &path)
        .map_err(|e| CoreError::UnsupportedAssetOrChain(format!("UTXO derivation failed: {e}")))?;

    let pubkey = bitcoin::PublicKey::from_private_key(&secp, &child.to_priv());
    let pubkey_hash = hash160(&pubkey.to_bytes());

    match coin.scheme {
        Scheme::NativeSegwit { hrp } => encode_segwit(hrp, &pubkey_hash),
        Scheme::Legacy { version_byte } => Ok(encode_base58check(version_byte, &pubkey_hash)),
    }
}

fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(data);
    let ripemd = Ripemd160::digest(sha);
    let mut out = [0u8; 20];
    out.copy_from_slice(&ripemd);
    out
}

fn encode_segwit(hrp: &str, pubkey_hash: &[u8; 20]) -> CoreResult<String> {
    let mut data = vec![bech32::u5::try_from_u8(0).expect("witness version 0 fits in 5 bits")];
    data.extend(pubkey_hash.to_base32());
    bech32::encode(hrp, data, bech32::Variant::Bech32)
        .map_err(|e| CoreError::UnsupportedAssetOrChain(format!("bech32 encode failed: {e}")))
}

fn encode_base58check(version: u8, payload: &[u8; 20]) -> String {
    let mut data = Vec::with_capacity(25);
    data.push(version);
    data.extend_from_slice(payload);
    let checksum = Sha256::digest(Sha256::digest(&data));
    data.extend_from_slice(&checksum[0..4]);
    bs58::encode(data).into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn btc_address_is_bech32_native_segwit() {
        let seed = [3u8; 32];
        let addr = derive_address(&seed, "bip122:000000000019d6689c085ae165831e93", 0, 0).unwrap();
        assert!(addr.starts_with("bc1"));
    }

    #[test]
    fn doge_address_is_base58() {
        let seed = [3u8; 32];
        let addr = derive_address(&seed, "bip122:1a91e3dace36e2be3bf030a65679fe82", 0, 0).unwrap();
        assert!(!addr.starts_with("bc1"));
        assert!(!addr.is_empty());
    }

    #[test]
    fn unknown_chain_is_rejected() {
        let seed = [3u8; 32];
        assert!(derive_address(&seed, "bip122:deadbeef", 0, 0).is_err());
    }
}
