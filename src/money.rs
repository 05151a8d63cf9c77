//! Fixed-point purchase amount with 2 decimal places precision.
//!
//! Uses `rust_decimal` internally with scale enforcement so amounts are
//! stored and printed the same way regardless of how they were written.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A monetary amount that maintains exactly 2 decimal places.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use card_gate::Money;
///
/// let price = Money::from_str("45000").unwrap();
/// assert_eq!(price.to_string(), "45000.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Money(Decimal);

impl Money {
    /// The number of decimal places to maintain.
    pub const SCALE: u32 = 2;

    /// Zero value.
    pub const ZERO: Self = Money(Decimal::ZERO);

    /// Creates a new `Money` from a `Decimal`, normalizing to 2 decimal places.
    pub fn new(value: Decimal) -> Self {
        let mut normalized = value.round_dp(Self::SCALE);
        normalized.rescale(Self::SCALE);
        Money(normalized)
    }

    /// Creates an amount from whole minor units (kopecks, cents).
    pub fn from_minor(units: i64) -> Self {
        Money::new(Decimal::new(units, Self::SCALE))
    }

    /// Returns `true` if the amount is strictly negative.
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s.trim())?;
        Ok(Money::new(decimal))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Money::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_normalizes_scale() {
        assert_eq!(Money::from_str("45000").unwrap().to_string(), "45000.00");
        assert_eq!(Money::from_str("1.5").unwrap().to_string(), "1.50");
        assert_eq!(Money::from_str("  2.25  ").unwrap().to_string(), "2.25");
    }

    #[test]
    fn test_extra_precision_is_rounded() {
        assert_eq!(Money::from_str("1.005").unwrap().to_string(), "1.00");
        assert_eq!(Money::from_str("1.015").unwrap().to_string(), "1.02");
    }

    #[test]
    fn test_from_minor_units() {
        assert_eq!(Money::from_minor(4_500_000).to_string(), "45000.00");
        assert_eq!(Money::from_minor(7), Money::from_str("0.07").unwrap());
    }

    #[test]
    fn test_negative_detection() {
        assert!(Money::from_str("-1").unwrap().is_negative());
        assert!(!Money::ZERO.is_negative());
        assert!(!Money::from_str("-0.00").unwrap().is_negative());
    }
}
