//! Base-unit amounts: arbitrary-precision integers that survive a round trip
//! through decimal-string persistence without the truncation a
//! bare `u64`/`u128` would risk on 18-decimal EVM assets stacked with large
//! supplies.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BaseUnits(BigUint);

impl BaseUnits {
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn from_u64(v: u64) -> Self {
        Self(BigUint::from(v))
    }

    /// Converts to a decimal `f64` given the asset's number of decimals.
    /// Used only for display/impact estimation; never for exact chaining.
    pub fn to_decimal(&self, decimals: u8) -> f64 {
        let value = self.0.to_f64().unwrap_or(f64::MAX);
        value / 10f64.powi(decimals as i32)
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }
}

impl fmt::Display for BaseUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BaseUnits {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigUint::from_str(s)
            .map(Self)
            .map_err(|e| format!("invalid base-unit amount '{s}': {e}"))
    }
}

impl From<BigUint> for BaseUnits {
    fn from(v: BigUint) -> Self {
        Self(v)
    }
}

impl Serialize for BaseUnits {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for BaseUnits {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BaseUnits::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_string() {
        let amount = BaseUnits::from_str("2000000000").unwrap();
        assert_eq!(amount.to_string(), "2000000000");
    }

    #[test]
    fn decimal_conversion() {
        let amount = BaseUnits::from_str("1990000000").unwrap();
        assert!((amount.to_decimal(6) - 1990.0).abs() < 1e-6);
    }

    #[test]
    fn zero_is_zero() {
        assert!(BaseUnits::zero().is_zero());
        assert!(!BaseUnits::from_u64(1).is_zero());
    }
}
