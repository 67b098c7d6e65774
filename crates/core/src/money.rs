//! Currency amounts with two-decimal precision.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

const MINOR_PER_MAJOR: i64 = 100;

/// Largest magnitude accepted from user input, in minor units.
///
/// Keeps every balance comfortably inside `i64` after repeated credits.
const MAX_INPUT_MINOR: i64 = 1_000_000_000_000_000;

/// Amount of money stored as an integer count of minor units (paise/cents).
///
/// Arithmetic is exact; only conversion from user input rounds.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    pub const fn from_major(major: i64) -> Self {
        Self(major * MINOR_PER_MAJOR)
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Convert a floating point amount, rounding half away from zero to the
    /// nearest minor unit.
    pub fn from_f64(value: f64) -> DomainResult<Self> {
        if !value.is_finite() {
            return Err(DomainError::validation("amount must be a finite number"));
        }

        let minor = (value * MINOR_PER_MAJOR as f64).round();
        if minor.abs() > MAX_INPUT_MINOR as f64 {
            return Err(DomainError::validation("amount is out of range"));
        }

        Ok(Self(minor as i64))
    }

    /// Parse a user-entered amount such as `"250"`, `" 99.5 "` or `"1e3"`.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("amount is empty"));
        }

        let value: f64 = trimmed
            .parse()
            .map_err(|_| DomainError::validation(format!("'{trimmed}' is not a number")))?;

        Self::from_f64(value)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per = MINOR_PER_MAJOR as u64;
        write!(f, "{sign}{}.{:02}", abs / per, abs % per)
    }
}

impl core::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        Money(iter.map(|m| m.0).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_whole_and_fractional_amounts() {
        assert_eq!(Money::parse("100").unwrap(), Money::from_major(100));
        assert_eq!(Money::parse(" 42.5 ").unwrap(), Money::from_minor(4250));
        assert_eq!(Money::parse("5000.75").unwrap(), Money::from_minor(500_075));
        assert_eq!(Money::parse("-5").unwrap(), Money::from_minor(-500));
    }

    #[test]
    fn rounds_to_two_decimals_half_away_from_zero() {
        assert_eq!(Money::parse("0.125").unwrap(), Money::from_minor(13));
        assert_eq!(Money::parse("0.001").unwrap(), Money::ZERO);
    }

    #[test]
    fn rejects_non_numbers_and_non_finite_values() {
        for input in ["", "   ", "abc", "12abc", "NaN", "inf", "-inf"] {
            assert!(Money::parse(input).is_err(), "accepted {input:?}");
        }
        assert!(Money::from_f64(f64::NAN).is_err());
        assert!(Money::from_f64(1e300).is_err());
    }

    #[test]
    fn displays_with_two_decimals() {
        assert_eq!(Money::from_minor(500_075).to_string(), "5000.75");
        assert_eq!(Money::from_major(100).to_string(), "100.00");
        assert_eq!(Money::from_minor(5).to_string(), "0.05");
        assert_eq!(Money::from_minor(-1250).to_string(), "-12.50");
    }

    #[test]
    fn serializes_as_minor_units() {
        let json = serde_json::to_string(&Money::from_minor(1999)).unwrap();
        assert_eq!(json, "1999");
    }

    proptest! {
        /// Property: displaying then parsing any amount yields the same amount.
        #[test]
        fn display_parses_back(minor in -MAX_INPUT_MINOR / 1000..MAX_INPUT_MINOR / 1000) {
            let money = Money::from_minor(minor);
            prop_assert_eq!(Money::parse(&money.to_string()).unwrap(), money);
        }
    }
}
