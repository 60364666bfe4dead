//! Money type
//!
//! All monetary amounts in the platform are fixed-point decimals with exactly
//! four fractional digits, carried as strings on the wire and as NUMERIC(20,4)
//! in PostgreSQL. All arithmetic MUST go through this module.
//!
//! ## Design Principles
//! 1. No floating point anywhere: rounding drift would break the ledger's
//!    double-entry invariant.
//! 2. Explicit Error Handling: no silent truncation on parse.
//! 3. Amounts are non-negative; direction is carried by entry type or
//!    from/to fields, never by sign.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of fractional digits every amount carries.
pub const SCALE: u32 = 4;

/// A non-negative fixed-point monetary amount with scale 4.
///
/// Internal value is private to force construction through the audited
/// parse/arithmetic paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(transparent)]
pub struct Money(Decimal);

/// Money conversion and arithmetic errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("invalid amount format: {0}")]
    InvalidFormat(String),

    #[error("precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("amount must not be negative")]
    NegativeAmount,

    #[error("result would be negative")]
    NegativeResult,

    #[error("amount too large, would overflow")]
    Overflow,
}

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Parses a decimal string into a `Money` value.
    ///
    /// Accepts `^\d+(\.\d{1,4})?$`: plain digits, optionally a dot and one to
    /// four fractional digits. Signs, exponents, group separators, a bare dot
    /// and empty whole/fractional parts are all rejected.
    ///
    /// Zero is accepted here (balances may be zero); use [`Money::parse_positive`]
    /// for transfer amounts.
    pub fn parse(input: &str) -> Result<Money, MoneyError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(MoneyError::InvalidFormat("empty string".into()));
        }
        if input.starts_with('-') {
            return Err(MoneyError::NegativeAmount);
        }
        if input.starts_with('+') {
            return Err(MoneyError::InvalidFormat("explicit sign".into()));
        }

        let (whole, frac) = match input.split_once('.') {
            None => (input, ""),
            Some((w, f)) => {
                if w.is_empty() {
                    return Err(MoneyError::InvalidFormat(
                        "missing leading zero (use 0.5 instead of .5)".into(),
                    ));
                }
                if f.is_empty() {
                    return Err(MoneyError::InvalidFormat(
                        "missing fractional part (use 5.0 instead of 5.)".into(),
                    ));
                }
                if f.contains('.') {
                    return Err(MoneyError::InvalidFormat("multiple decimal points".into()));
                }
                (w, f)
            }
        };

        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MoneyError::InvalidFormat(format!(
                "invalid character in amount: {input}"
            )));
        }

        if frac.len() > SCALE as usize {
            return Err(MoneyError::PrecisionOverflow {
                provided: frac.len() as u32,
                max: SCALE,
            });
        }

        let mut value = Decimal::from_str(input).map_err(|_| MoneyError::Overflow)?;
        value.rescale(SCALE);
        Ok(Money(value))
    }

    /// Parses a transfer amount: same grammar as [`Money::parse`] but zero is
    /// rejected.
    pub fn parse_positive(input: &str) -> Result<Money, MoneyError> {
        let amount = Money::parse(input)?;
        if amount.is_zero() {
            return Err(MoneyError::ZeroAmount);
        }
        Ok(amount)
    }

    /// Converts an already-validated decimal, truncating anything beyond four
    /// fractional digits.
    pub fn from_decimal(value: Decimal) -> Result<Money, MoneyError> {
        if value.is_sign_negative() {
            return Err(MoneyError::NegativeAmount);
        }
        let mut truncated = value.trunc_with_scale(SCALE);
        truncated.rescale(SCALE);
        Ok(Money(truncated))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Addition, failing on overflow.
    pub fn checked_add(self, other: Money) -> Result<Money, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or(MoneyError::Overflow)
    }

    /// Subtraction, failing if the result would be negative. This is the form
    /// used by the balance engines, which never let a balance go below zero.
    pub fn checked_sub(self, other: Money) -> Result<Money, MoneyError> {
        if self.0 < other.0 {
            return Err(MoneyError::NegativeResult);
        }
        Ok(Money(self.0 - other.0))
    }

    /// Subtraction clamped at zero. The ledger records observations and never
    /// refuses, so its running balance uses this permissive form.
    pub fn saturating_sub(self, other: Money) -> Money {
        if self.0 <= other.0 {
            Money::ZERO
        } else {
            Money(self.0 - other.0)
        }
    }
}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Money {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut value = self.0;
        value.rescale(SCALE);
        write!(f, "{value}")
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

// Wire format is always the 4-decimal string ("50.0000"), matching the
// NUMERIC(20,4) columns and the event payloads.
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Money::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl utoipa::PartialSchema for Money {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        <String as utoipa::PartialSchema>::schema()
    }
}

impl utoipa::ToSchema for Money {
    fn name() -> std::borrow::Cow<'static, str> {
        std::borrow::Cow::Borrowed("Money")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_valid_amounts() {
        assert_eq!(Money::parse("50.00").unwrap().to_string(), "50.0000");
        assert_eq!(Money::parse("0.0001").unwrap().to_string(), "0.0001");
        assert_eq!(Money::parse("100").unwrap().to_string(), "100.0000");
        assert_eq!(Money::parse("001.23").unwrap().to_string(), "1.2300");
        assert_eq!(Money::parse("0").unwrap(), Money::ZERO);
    }

    #[test]
    fn parse_rejects_invalid_formats() {
        let cases = [
            "",         // empty
            "1,000.00", // commas
            "1.2.3",    // multiple dots
            "1. 23",    // inner space
            "+1.23",    // explicit plus
            "-1.23",    // negative
            "1e2",      // scientific notation
            "0x12",     // hex
            ".",        // bare dot
            ".5",       // missing leading zero
            "5.",       // missing fractional part
            "abc",
        ];
        for case in cases {
            assert!(Money::parse(case).is_err(), "should reject {case:?}");
        }
    }

    #[test]
    fn parse_rejects_excess_precision() {
        assert!(Money::parse("1.2345").is_ok());
        let err = Money::parse("1.23456").unwrap_err();
        assert_eq!(
            err,
            MoneyError::PrecisionOverflow {
                provided: 5,
                max: 4
            }
        );
    }

    #[test]
    fn parse_positive_rejects_zero_representations() {
        for zero in ["0", "0.0", "0.00", "0.000", "0.0000"] {
            assert_eq!(Money::parse_positive(zero), Err(MoneyError::ZeroAmount));
        }
        assert!(Money::parse_positive("0.0001").is_ok());
    }

    #[test]
    fn arithmetic_respects_non_negative_invariant() {
        let a = Money::parse("500.0000").unwrap();
        let b = Money::parse("50.00").unwrap();

        assert_eq!(a.checked_sub(b).unwrap().to_string(), "450.0000");
        assert_eq!(b.checked_add(a).unwrap().to_string(), "550.0000");
        assert_eq!(b.checked_sub(a), Err(MoneyError::NegativeResult));
        assert_eq!(b.saturating_sub(a), Money::ZERO);
    }

    #[test]
    fn display_always_carries_four_decimals() {
        assert_eq!(Money::parse("1.5").unwrap().to_string(), "1.5000");
        assert_eq!(Money::ZERO.to_string(), "0.0000");
    }

    #[test]
    fn comparisons_ignore_scale() {
        assert_eq!(
            Money::parse("1.5").unwrap(),
            Money::parse("1.5000").unwrap()
        );
        assert!(Money::parse("2").unwrap() > Money::parse("1.9999").unwrap());
    }

    #[test]
    fn serde_roundtrip_is_string_based() {
        let amount = Money::parse("42.5").unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"42.5000\"");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
        assert!(serde_json::from_str::<Money>("\"-1.0\"").is_err());
    }

    #[test]
    fn from_decimal_truncates_extra_digits() {
        use rust_decimal_macros::dec;
        assert_eq!(
            Money::from_decimal(dec!(1.23456)).unwrap().to_string(),
            "1.2345"
        );
        assert!(Money::from_decimal(dec!(-1)).is_err());
    }
}
