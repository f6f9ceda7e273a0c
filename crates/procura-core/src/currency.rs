//! # Currency Formatter
//!
//! Legal-style peso phrases and grouped amount strings for documents.
//!
//! ```text
//!   "1234.50"  ──► amount_to_words ──► "One Thousand Two Hundred Thirty Four Pesos & 50/100"
//!   "1234"     ──► amount_to_words ──► "One Thousand Two Hundred Thirty Four Pesos Only"
//!   "1234567"  ──► format_number   ──► "1,234,567.00"
//! ```
//!
//! Both functions are total: any input string produces a phrase. The amount
//! strings come straight from form fields, so they are not required to be
//! valid [`Amount`](crate::amount::Amount)s.

use crate::words::number_to_words;

/// Builds the legal amount phrase for a peso amount string.
///
/// ## Rules
/// - Split on the first `.`
/// - Integer part: every non-digit character is dropped, then parsed
/// - Empty or unparseable integer parts (and zero) read as "Zero"
/// - A non-empty fraction is emitted verbatim as `& <cents>/100`
/// - No fraction (or an empty one, as in `"1234."`) gives `Pesos Only`
///
/// ## Example
/// ```rust
/// use procura_core::currency::amount_to_words;
///
/// assert_eq!(amount_to_words("1,000.05"), "One Thousand Pesos & 05/100");
/// assert_eq!(amount_to_words("0"), "Zero Pesos Only");
/// ```
pub fn amount_to_words(amount: &str) -> String {
    let mut parts = amount.split('.');
    let pesos = parts.next().unwrap_or_default();
    let cents = parts.next().unwrap_or_default();

    let digits: String = pesos.chars().filter(char::is_ascii_digit).collect();
    let words = digits
        .parse::<u64>()
        .map(number_to_words)
        .unwrap_or_default();
    let words = if words.is_empty() { "Zero".to_string() } else { words };

    if cents.is_empty() {
        format!("{} Pesos Only", words)
    } else {
        format!("{} Pesos & {}/100", words, cents)
    }
}

/// Groups the integer part of an amount string with commas.
///
/// Appends `.00` when the input has no decimal point. Only the integer part
/// is grouped; the fraction is kept as typed.
///
/// ## Example
/// ```rust
/// use procura_core::currency::format_number;
///
/// assert_eq!(format_number("1234567"), "1,234,567.00");
/// assert_eq!(format_number("1234.5"), "1,234.5");
/// ```
pub fn format_number(amount: &str) -> String {
    let amount = amount.trim();
    let (integer, fraction) = match amount.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (amount, "00"),
    };

    format!("{}.{}", group_thousands(integer), fraction)
}

/// Inserts a comma before every run of three trailing digits.
///
/// A leading sign or currency symbol is kept in front of the grouped digits.
fn group_thousands(integer: &str) -> String {
    let digit_start = integer
        .char_indices()
        .find(|(_, c)| c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(integer.len());
    let (prefix, digits) = integer.split_at(digit_start);

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return integer.to_string();
    }

    let mut grouped = String::with_capacity(integer.len() + digits.len() / 3);
    grouped.push_str(prefix);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrase_with_cents() {
        assert_eq!(
            amount_to_words("1234.50"),
            "One Thousand Two Hundred Thirty Four Pesos & 50/100"
        );
    }

    #[test]
    fn test_phrase_without_cents() {
        assert_eq!(
            amount_to_words("1234"),
            "One Thousand Two Hundred Thirty Four Pesos Only"
        );
    }

    #[test]
    fn test_zero_and_garbage_read_as_zero() {
        assert_eq!(amount_to_words("0"), "Zero Pesos Only");
        assert_eq!(amount_to_words(""), "Zero Pesos Only");
        assert_eq!(amount_to_words("abc"), "Zero Pesos Only");
        assert_eq!(amount_to_words("0.75"), "Zero Pesos & 75/100");
    }

    #[test]
    fn test_separators_are_stripped() {
        assert_eq!(
            amount_to_words("₱1,500,000.00"),
            "One Million Five Hundred Thousand Pesos & 00/100"
        );
    }

    #[test]
    fn test_empty_fraction_counts_as_absent() {
        assert_eq!(amount_to_words("20."), "Twenty Pesos Only");
    }

    #[test]
    fn test_trillion_degenerates_to_zero() {
        assert_eq!(amount_to_words("1000000000000"), "Zero Pesos Only");
    }

    #[test]
    fn test_deterministic() {
        let a = amount_to_words("98765.43");
        let b = amount_to_words("98765.43");
        assert_eq!(a, b);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number("1234567"), "1,234,567.00");
        assert_eq!(format_number("1234.5"), "1,234.5");
        assert_eq!(format_number("999"), "999.00");
        assert_eq!(format_number("1000.25"), "1,000.25");
        assert_eq!(format_number("-1234"), "-1,234.00");
        assert_eq!(format_number(""), ".00");
    }
}
