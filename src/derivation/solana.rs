//! Solana address derivation via SLIP-0010 ed25519, which (unlike
//! secp256k1 BIP32) only supports hardened child keys — every path segment
//! here is hardened.

use ed25519_dalek::SigningKey;
use hmac::{Hmac, Mac};
use sha2::Sha512;

use crate::error::{CoreError, CoreResult};

type HmacSha512 = Hmac<Sha512>;

const SOLANA_CHAIN_ID: &str = "solana:5eykt4uszjbj8jq9gqjx7mn8vkbdq9gs";

fn harden(index: u32) -> u32 {
    index | 0x8000_0000
}

fn master_key(seed: &[u8]) -> CoreResult<([u8; 32], [u8; 32])> {
    let mut mac = HmacSha512::new_from_slice(b"ed25519 seed")
        .map_err(|e| CoreError::UnsupportedAssetOrChain(format!("hmac init failed: {e}")))?;
    mac.update(seed);
    split(mac.finalize().into_bytes().as_slice())
}

fn derive_child(key: [u8; 32], chain_code: [u8; 32], index: u32) -> CoreResult<([u8; 32], [u8; 32])> {
    let mut mac = HmacSha512::new_from_slice(&chain_code)
        .map_err(|e| CoreError::UnsupportedAssetOrChain(format!("hmac init failed: {e}")))?;
    mac.update(&[0u8]);
    mac.update(&key);
    mac.update(&harden(index).to_be_bytes());
    split(mac.finalize().into_bytes().as_slice())
}

fn split(bytes: &[u8]) -> CoreResult<([u8; 32], [u8; 32])> {
    if bytes.len() != 64 {
        return Err(CoreError::UnsupportedAssetOrChain("malformed SLIP-0010 hmac output".to_string()));
    }
    let mut key = [0u8; 32];
    let mut chain_code = [0u8; 32];
    key.copy_from_slice(&bytes[0..32]);
    chain_code.copy_from_slice(&bytes[32..64]);
    Ok((key, chain_code))
}

/// Derives the address at `m/44'/501'/account'/0'` (all segments hardened).
pub fn derive_address(seed: &[u8], chain_id: &str, account: u32, index: u32) -> CoreResult<String> {
    if chain_id != SOLANA_CHAIN_ID {
        return Err(CoreError::UnsupportedAssetOrChain(format!(
            "solana derivation requested for non-solana chain {chain_id}"
        )));
    }

    let (mut key, mut chain_code) = master_key(seed)?;
    for segment in [44, 501, account, 0, index] {
        let (next_key, next_chain_code) = derive_child(key, chain_code, segment)?;
        key = next_key;
        chain_code = next_chain_code;
    }

    let signing_key = SigningKey::from_bytes(&key);
    Ok(bs58::encode(signing_key.verifying_key().to_bytes()).into_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_deterministic_base58_address() {
        let seed = [5u8; 32];
        let a = derive_address(&seed, SOLANA_CHAIN_ID, 0, 0).unwrap();
        let b = derive_address(&seed, SOLANA_CHAIN_ID, 0, 0).unwrap();
        assert_eq!(a, b);
        assert!(bs58::decode(&a).into_vec().is_ok());
    }

    #[test]
    fn rejects_non_solana_chain() {
        let seed = [5u8; 32];
        assert!(derive_address(&seed, "eip155:1", 0, 0).is_err());
    }
}
