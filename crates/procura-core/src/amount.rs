//! # Amount Module
//!
//! Provides the `Amount` type for peso values stored on contracts and
//! obligation requests.
//!
//! ## Why Integer Centavos?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Splitting ₱100.00 into labor / material / equipment (1 : 1 : 1)        │
//! │                                                                         │
//! │  Floating point:  33.333... × 3  → rounding drifts, parts ≠ total       │
//! │                                                                         │
//! │  Integer centavos: 10000 / 3 = 3333 (+ remainder 1)                     │
//! │    labor 3333, material 3333, equipment 3334  → sums to 10000           │
//! │    The remainder is placed explicitly, never lost                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use procura_core::amount::Amount;
//!
//! let budget = Amount::parse("₱1,234.5").unwrap();
//! assert_eq!(budget.centavos(), 123_450);
//! assert_eq!(budget.to_plain_string(), "1234.50");
//! assert_eq!(budget.to_string(), "1,234.50");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use ts_rs::TS;

use crate::currency::{amount_to_words, format_number};
use crate::error::{CoreError, CoreResult, ValidationError, ValidationResult};

// =============================================================================
// Amount Type
// =============================================================================

/// A peso amount in centavos.
///
/// Stored as an INTEGER column by procura-db; rendered for humans through
/// [`Display`](fmt::Display) (grouped) or [`Amount::to_plain_string`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Amount(i64);

impl Amount {
    /// Creates an amount from centavos.
    #[inline]
    pub const fn from_centavos(centavos: i64) -> Self {
        Amount(centavos)
    }

    /// Creates an amount from whole pesos.
    #[inline]
    pub const fn from_pesos(pesos: i64) -> Self {
        Amount(pesos * 100)
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn centavos(&self) -> i64 {
        self.0
    }

    /// Returns the whole-peso portion.
    #[inline]
    pub const fn pesos(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavo portion (always 0-99).
    #[inline]
    pub const fn centavos_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns a zero amount.
    #[inline]
    pub const fn zero() -> Self {
        Amount(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Parses a user-entered amount.
    ///
    /// ## Accepted Input
    /// ```text
    /// "1234"        → 123400
    /// "1234.5"      → 123450
    /// "₱1,234.50"   → 123450
    /// " 1234.50 "   → 123450
    /// ```
    ///
    /// ## Rejected Input
    /// Empty strings, negative values, more than two fractional digits,
    /// anything else that is not a digit, `,` or one `.`.
    pub fn parse(input: &str) -> ValidationResult<Self> {
        const FIELD: &str = "amount";

        let trimmed = input.trim();
        let trimmed = trimmed
            .strip_prefix('₱')
            .or_else(|| trimmed.strip_prefix("PHP"))
            .unwrap_or(trimmed)
            .trim_start();

        if trimmed.is_empty() {
            return Err(ValidationError::required(FIELD));
        }
        if trimmed.starts_with('-') {
            return Err(ValidationError::Negative {
                field: FIELD.to_string(),
            });
        }

        let (integer, fraction) = match trimmed.split_once('.') {
            Some((integer, fraction)) => (integer, fraction),
            None => (trimmed, ""),
        };

        let integer: String = integer.chars().filter(|c| *c != ',').collect();
        if integer.is_empty() && fraction.is_empty() {
            return Err(ValidationError::invalid_format(FIELD, "no digits"));
        }
        if !integer.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ValidationError::invalid_format(
                FIELD,
                format!("'{}' is not a number", input.trim()),
            ));
        }
        if fraction.len() > 2 {
            return Err(ValidationError::invalid_format(
                FIELD,
                "at most two decimal places",
            ));
        }

        let too_large = || ValidationError::invalid_format(FIELD, "value is too large");

        let pesos: i64 = if integer.is_empty() {
            0
        } else {
            integer.parse().map_err(|_| too_large())?
        };
        let centavos: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| too_large())? * 10,
            _ => fraction.parse().map_err(|_| too_large())?,
        };

        pesos
            .checked_mul(100)
            .and_then(|c| c.checked_add(centavos))
            .map(Amount)
            .ok_or_else(too_large)
    }

    /// Renders as `<pesos>.<cc>` with no grouping, e.g. `"1234.50"`.
    ///
    /// This is the form fed to
    /// [`amount_to_words`](crate::currency::amount_to_words) when a document
    /// needs a phrase for a stored amount.
    pub fn to_plain_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.pesos().abs(), self.centavos_part())
    }

    /// The amount as a peso phrase.
    ///
    /// Whole amounts read "... Pesos Only"; anything with centavos reads
    /// "... Pesos & cc/100".
    pub fn to_words(&self) -> String {
        if self.centavos_part() == 0 {
            amount_to_words(&self.pesos().to_string())
        } else {
            amount_to_words(&self.to_plain_string())
        }
    }

    /// Splits the amount in proportion to `weights`.
    ///
    /// ## Algorithm
    /// 1. Each part gets `floor(amount × weight / total_weight)` centavos
    /// 2. The centavos lost to flooring go to the LAST non-zero weight
    ///
    /// The returned parts always sum to `self`, and zero weights always get
    /// zero.
    ///
    /// ## Example
    /// ```rust
    /// use procura_core::amount::Amount;
    ///
    /// let parts = Amount::from_centavos(10_000).allocate(&[1, 1, 1]).unwrap();
    /// let centavos: Vec<i64> = parts.iter().map(|a| a.centavos()).collect();
    /// assert_eq!(centavos, vec![3333, 3333, 3334]);
    /// ```
    ///
    /// ## Errors
    /// [`CoreError::InvalidAllocation`] when there are no weights or they sum
    /// to zero.
    pub fn allocate(&self, weights: &[u64]) -> CoreResult<Vec<Amount>> {
        let total: u128 = weights.iter().map(|w| *w as u128).sum();
        if total == 0 {
            return Err(CoreError::InvalidAllocation {
                reason: "weights must not all be zero".to_string(),
            });
        }

        // i128 keeps amount × weight from overflowing
        let mut parts: Vec<Amount> = weights
            .iter()
            .map(|w| {
                let share = self.0 as i128 * *w as i128 / total as i128;
                Amount(share as i64)
            })
            .collect();

        let assigned: i64 = parts.iter().map(|p| p.0).sum();
        let remainder = self.0 - assigned;
        if let Some(last) = weights.iter().rposition(|w| *w > 0) {
            parts[last].0 += remainder;
        }

        Ok(parts)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Grouped display, e.g. `1,234,567.00`.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_number(&self.to_plain_string()))
    }
}

impl Default for Amount {
    fn default() -> Self {
        Amount::zero()
    }
}

impl Add for Amount {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Amount(self.0 + other.0)
    }
}

impl Sub for Amount {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Amount(self.0 - other.0)
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::zero(), Add::add)
    }
}

impl std::str::FromStr for Amount {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amount::parse(s)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts() {
        let amount = Amount::from_centavos(123_450);
        assert_eq!(amount.pesos(), 1234);
        assert_eq!(amount.centavos_part(), 50);
        assert_eq!(Amount::from_pesos(5).centavos(), 500);
    }

    #[test]
    fn test_parse_accepts_common_forms() {
        assert_eq!(Amount::parse("1234").unwrap().centavos(), 123_400);
        assert_eq!(Amount::parse("1234.5").unwrap().centavos(), 123_450);
        assert_eq!(Amount::parse("1,234.50").unwrap().centavos(), 123_450);
        assert_eq!(Amount::parse("₱ 1,234.05").unwrap().centavos(), 123_405);
        assert_eq!(Amount::parse("PHP1000").unwrap().centavos(), 100_000);
        assert_eq!(Amount::parse(".75").unwrap().centavos(), 75);
        assert_eq!(Amount::parse("12.").unwrap().centavos(), 1200);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            Amount::parse("  "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            Amount::parse("-5"),
            Err(ValidationError::Negative { .. })
        ));
        assert!(Amount::parse("12.345").is_err());
        assert!(Amount::parse("12a").is_err());
        assert!(Amount::parse("1.2.3").is_err());
        assert!(Amount::parse(".").is_err());
        assert!(Amount::parse("99999999999999999999").is_err());
    }

    #[test]
    fn test_display_and_plain() {
        let amount = Amount::from_centavos(123_456_700);
        assert_eq!(amount.to_string(), "1,234,567.00");
        assert_eq!(amount.to_plain_string(), "1234567.00");
        assert_eq!(Amount::from_centavos(5).to_plain_string(), "0.05");
    }

    #[test]
    fn test_to_words() {
        assert_eq!(
            Amount::from_pesos(1234).to_words(),
            "One Thousand Two Hundred Thirty Four Pesos Only"
        );
        assert_eq!(
            Amount::from_centavos(123_450).to_words(),
            "One Thousand Two Hundred Thirty Four Pesos & 50/100"
        );
        assert_eq!(Amount::from_centavos(5).to_words(), "Zero Pesos & 05/100");
    }

    #[test]
    fn test_allocate_sums_to_total() {
        let total = Amount::from_centavos(1_000_001);
        let parts = total.allocate(&[50, 30, 20]).unwrap();
        assert_eq!(parts.iter().copied().sum::<Amount>(), total);
        assert_eq!(parts[0].centavos(), 500_000);
        assert_eq!(parts[1].centavos(), 300_000);
        assert_eq!(parts[2].centavos(), 200_001);
    }

    #[test]
    fn test_allocate_remainder_skips_trailing_zero_weight() {
        let parts = Amount::from_centavos(10_000).allocate(&[1, 2, 0]).unwrap();
        assert_eq!(parts[0].centavos(), 3333);
        assert_eq!(parts[1].centavos(), 6667);
        assert_eq!(parts[2].centavos(), 0);
    }

    #[test]
    fn test_allocate_zero_weights_is_error() {
        let result = Amount::from_centavos(100).allocate(&[0, 0, 0]);
        assert!(matches!(result, Err(CoreError::InvalidAllocation { .. })));
        assert!(Amount::from_centavos(100).allocate(&[]).is_err());
    }
}
