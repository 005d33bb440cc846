//! A static per-chain gas cost table used to net out network fees before
//! price-impact scoring.
//!
//! Generalized from a single-chain gas constant to a per-chain table keyed
//! by `chainId`, and from `u64` wei to `BigUint` base units so high-decimal
//! assets don't silently truncate.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::types::ProviderType;
use crate::units::BaseUnits;

/// One chain's gas overhead entry: a flat native-asset base cost plus a
/// volatility multiplier in `[1.0, 1.3]` applied on top of it to absorb
/// fee-market spikes without re-querying a live gas oracle per quote.
struct GasEntry {
    chain_id: &'static str,
    base_overhead_base_units: u64,
    volatility_multiplier: f64,
}

const GAS_TABLE: &[GasEntry] = &[
    GasEntry { chain_id: "eip155:1", base_overhead_base_units: 21_000 * 30_000_000_000, volatility_multiplier: 1.15 },
    GasEntry { chain_id: "eip155:137", base_overhead_base_units: 21_000 * 100_000_000_000, volatility_multiplier: 1.3 },
    GasEntry { chain_id: "eip155:42161", base_overhead_base_units: 21_000 * 100_000_000, volatility_multiplier: 1.1 },
    GasEntry { chain_id: "eip155:10", base_overhead_base_units: 21_000 * 100_000_000, volatility_multiplier: 1.1 },
    GasEntry { chain_id: "eip155:56", base_overhead_base_units: 21_000 * 3_000_000_000, volatility_multiplier: 1.1 },
    GasEntry { chain_id: "eip155:43114", base_overhead_base_units: 21_000 * 25_000_000_000, volatility_multiplier: 1.2 },
    GasEntry { chain_id: "bip122:000000000019d6689c085ae165831e93", base_overhead_base_units: 5_000, volatility_multiplier: 1.3 },
    GasEntry { chain_id: "bip122:12a765e31ffd4059bada1e25190f6e98", base_overhead_base_units: 1_000, volatility_multiplier: 1.3 },
    GasEntry { chain_id: "bip122:1a91e3dace36e2be3bf030a65679fe82", base_overhead_base_units: 1_000, volatility_multiplier: 1.3 },
    GasEntry { chain_id: "bip122:000000000000000000651ef99cb9fcbe", base_overhead_base_units: 1_000, volatility_multiplier: 1.3 },
    GasEntry { chain_id: "cosmos:cosmoshub-4", base_overhead_base_units: 5_000, volatility_multiplier: 1.0 },
    GasEntry { chain_id: "cosmos:osmosis-1", base_overhead_base_units: 5_000, volatility_multiplier: 1.0 },
    GasEntry { chain_id: "cosmos:thorchain-1", base_overhead_base_units: 2_000_000, volatility_multiplier: 1.0 },
    GasEntry { chain_id: "cosmos:mayachain-mainnet-v1", base_overhead_base_units: 2_000_000, volatility_multiplier: 1.0 },
    GasEntry { chain_id: "solana:5eykt4uszjbj8jq9gqjx7mn8vkbdq9gs", base_overhead_base_units: 5_000, volatility_multiplier: 1.0 },
];

/// Conservative default for a `chainId` with no table entry: 0.005
/// ETH-equivalent base units at a high volatility multiplier, so an unknown
/// chain is never treated as free to traverse.
const UNKNOWN_BASE_OVERHEAD_BASE_UNITS: u64 = 5_000_000_000_000_000; // 0.005 ETH-equivalent
const UNKNOWN_VOLATILITY_MULTIPLIER: f64 = 1.25;

fn lookup(chain_id: &str) -> (BigUint, f64) {
    match GAS_TABLE.iter().find(|entry| entry.chain_id == chain_id) {
        Some(entry) => (BigUint::from(entry.base_overhead_base_units), entry.volatility_multiplier),
        None => {
            tracing::warn!(chain_id, "no gas overhead entry for chain, using conservative default");
            (BigUint::from(UNKNOWN_BASE_OVERHEAD_BASE_UNITS), UNKNOWN_VOLATILITY_MULTIPLIER)
        }
    }
}

/// Applies a volatility multiplier to a base overhead using only integer
/// arithmetic: `floor(base * round(multiplier * 100)) / 100`. The multiplier
/// is rounded to whole basis points before use so the entire computation
/// stays in `BigUint`, with no float carried into the result.
fn apply_multiplier(base: &BigUint, multiplier: f64) -> BigUint {
    let multiplier_pct = BigUint::from((multiplier * 100.0).round() as u64);
    (base * multiplier_pct) / BigUint::from(100_u64)
}

/// Gas overhead charged for one hop, expressed in the hop's sell-chain
/// native units. `ProviderType::Direct` quotes already net out gas, so
/// DIRECT hops contribute zero additional overhead; only `ServiceCustody`
/// hops add the chain's base overhead, scaled by its volatility multiplier.
pub fn hop_overhead(provider_type: ProviderType, chain_id: &str) -> BaseUnits {
    match provider_type {
        ProviderType::Direct => BaseUnits::zero(),
        ProviderType::ServiceCustody => {
            let (base, multiplier) = lookup(chain_id);
            BaseUnits::from(apply_multiplier(&base, multiplier))
        }
    }
}

/// Sums overhead across every hop in a route, keyed by each hop's sell-chain.
pub fn total_overhead<'a>(hops: impl Iterator<Item = (ProviderType, &'a str)>) -> BaseUnits {
    let mut total = BigUint::zero();
    for (provider_type, chain_id) in hops {
        total += hop_overhead(provider_type, chain_id).as_biguint().clone();
    }
    BaseUnits::from(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_provider_has_zero_overhead() {
        let overhead = hop_overhead(ProviderType::Direct, "eip155:1");
        assert!(overhead.is_zero());
    }

    #[test]
    fn service_custody_evm_hop_has_nonzero_overhead() {
        let overhead = hop_overhead(ProviderType::ServiceCustody, "eip155:1");
        assert!(!overhead.is_zero());
    }

    #[test]
    fn volatility_multiplier_scales_the_base_overhead() {
        let base = BigUint::from(1_000_000_u64);
        let scaled = apply_multiplier(&base, 1.3);
        assert_eq!(scaled, BigUint::from(1_300_000_u64));
    }

    #[test]
    fn unknown_chain_gets_a_nonzero_conservative_default() {
        let overhead = hop_overhead(ProviderType::ServiceCustody, "eip155:999999");
        assert!(!overhead.is_zero());
        let expected = apply_multiplier(&BigUint::from(UNKNOWN_BASE_OVERHEAD_BASE_UNITS), UNKNOWN_VOLATILITY_MULTIPLIER);
        assert_eq!(overhead.as_biguint(), &expected);
    }

    #[test]
    fn total_overhead_sums_across_hops() {
        let hops = vec![
            (ProviderType::ServiceCustody, "eip155:1"),
            (ProviderType::ServiceCustody, "bip122:000000000019d6689c085ae165831e93"),
            (ProviderType::Direct, "eip155:1"),
        ];
        let single = hop_overhead(ProviderType::ServiceCustody, "eip155:1").as_biguint().clone();
        let total = total_overhead(hops.into_iter());
        assert!(total.as_biguint() > &single);
    }
}
