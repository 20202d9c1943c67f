//! Money value object (integer cents).
//!
//! Prices arrive from forms as decimal strings ("3.50") or from stored documents
//! as JSON numbers (3.5). Internally everything is whole cents so totals never
//! drift.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Amount in the smallest currency unit (cents). Never negative.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(u64);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> u64 {
        self.0
    }

    /// Parse user input such as `"3.5"`, `"3.50"`, `"12"` or `".99"`.
    ///
    /// A third decimal rounds half-up; further digits are ignored.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let s = input.trim();
        if s.is_empty() {
            return Err(DomainError::validation("price is required"));
        }
        if s.starts_with('-') {
            return Err(DomainError::validation("price cannot be negative"));
        }
        let s = s.strip_prefix('+').unwrap_or(s);

        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
        let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !is_digits(whole) || !is_digits(frac) {
            return Err(DomainError::validation(format!("invalid price '{input}'")));
        }

        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| DomainError::validation(format!("price '{input}' is too large")))?
        };

        let mut digits = frac.bytes().map(|b| u64::from(b - b'0'));
        let tenths = digits.next().unwrap_or(0);
        let hundredths = digits.next().unwrap_or(0);
        let round_up = u64::from(digits.next().is_some_and(|d| d >= 5));

        whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(tenths * 10 + hundredths + round_up))
            .map(Money)
            .ok_or_else(|| DomainError::validation(format!("price '{input}' is too large")))
    }

    /// Convert a floating point amount (as stored by document databases).
    pub fn from_f64(amount: f64) -> DomainResult<Self> {
        if !amount.is_finite() {
            return Err(DomainError::validation("price must be a finite number"));
        }
        if amount < 0.0 {
            return Err(DomainError::validation("price cannot be negative"));
        }
        let cents = (amount * 100.0).round();
        if cents > u64::MAX as f64 {
            return Err(DomainError::validation("price is too large"));
        }
        Ok(Money(cents as u64))
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// `self * quantity`, or `None` on overflow.
    pub fn checked_mul(self, quantity: u32) -> Option<Money> {
        self.0.checked_mul(u64::from(quantity)).map(Money)
    }

    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl core::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Money::saturating_add)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Money::from_f64(n),
            Raw::Text(s) => Money::parse(&s),
        }
        .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_common_price_inputs() {
        assert_eq!(Money::parse("3.50").unwrap().cents(), 350);
        assert_eq!(Money::parse("3.5").unwrap().cents(), 350);
        assert_eq!(Money::parse(" 12 ").unwrap().cents(), 1200);
        assert_eq!(Money::parse(".99").unwrap().cents(), 99);
        assert_eq!(Money::parse("4.").unwrap().cents(), 400);
        assert_eq!(Money::parse("0").unwrap(), Money::ZERO);
    }

    #[test]
    fn third_decimal_rounds_half_up() {
        assert_eq!(Money::parse("1.005").unwrap().cents(), 101);
        assert_eq!(Money::parse("1.004").unwrap().cents(), 100);
        assert_eq!(Money::parse("1.0049").unwrap().cents(), 100);
    }

    #[test]
    fn rejects_empty_negative_and_garbage() {
        assert!(matches!(Money::parse(""), Err(DomainError::Validation(_))));
        assert!(matches!(Money::parse("   "), Err(DomainError::Validation(_))));
        assert!(matches!(Money::parse("-1"), Err(DomainError::Validation(_))));
        assert!(matches!(Money::parse("abc"), Err(DomainError::Validation(_))));
        assert!(matches!(Money::parse("1.2.3"), Err(DomainError::Validation(_))));
        assert!(matches!(Money::parse("."), Err(DomainError::Validation(_))));
        assert!(matches!(Money::parse("1e3"), Err(DomainError::Validation(_))));
    }

    #[test]
    fn float_conversion_survives_binary_rounding() {
        assert_eq!(Money::from_f64(8.99).unwrap().cents(), 899);
        assert_eq!(Money::from_f64(4.25).unwrap().cents(), 425);
        assert!(Money::from_f64(-0.01).is_err());
        assert!(Money::from_f64(f64::NAN).is_err());
    }

    #[test]
    fn displays_with_two_decimals() {
        assert_eq!(Money::from_cents(350).to_string(), "$3.50");
        assert_eq!(Money::from_cents(7).to_string(), "$0.07");
    }

    #[test]
    fn json_accepts_numbers_and_strings() {
        let n: Money = serde_json::from_str("3.5").unwrap();
        let s: Money = serde_json::from_str("\"3.50\"").unwrap();
        assert_eq!(n, s);
        assert_eq!(serde_json::to_string(&Money::from_cents(899)).unwrap(), "8.99");
    }

    #[test]
    fn sum_adds_cents() {
        let total: Money = [350, 899, 425].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 1674);
    }

    proptest! {
        #[test]
        fn formatted_cents_parse_back_exactly(cents in 0u64..10_000_000_000) {
            let text = format!("{}.{:02}", cents / 100, cents % 100);
            prop_assert_eq!(Money::parse(&text).unwrap().cents(), cents);
        }
    }
}
