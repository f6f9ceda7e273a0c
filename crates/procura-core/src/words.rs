//! # Amount-to-Words Module
//!
//! Converts non-negative integers into English words for legal amount text
//! on certificates and obligation requests.
//!
//! ## Band Decomposition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 1,234,567  →  English words                             │
//! │                                                                         │
//! │  BANDS (largest first)                                                  │
//! │  ─────────────────────                                                  │
//! │  1,000,000,000  Billion   1,234,567 < band → skip                       │
//! │      1,000,000  Million   head = 1        tail = 234,567                │
//! │          1,000  Thousand  head = 234      tail = 567                    │
//! │            100  Hundred   head = 5        tail = 67                     │
//! │             <100          Sixty Seven (tens word + ones word)           │
//! │                                                                         │
//! │  "One Million Two Hundred Thirty Four Thousand Five Hundred Sixty Seven"│
//! │                                                                         │
//! │  A zero tail never adds a clause: 1000 → "One Thousand"                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Domain
//! Defined for `0 ..= 999_999_999_999`. Zero yields the empty string (the
//! currency formatter substitutes "Zero"). Values at or above [`WORDS_LIMIT`]
//! also yield the empty string; no "Trillion" band exists.
//!
//! Recursion depth is bounded: each band divides by at least 100, so a
//! twelve-digit input recurses at most five levels.

// =============================================================================
// Numeral Lexicon
// =============================================================================

/// Words for 0 through 19. Index 0 is intentionally empty.
const ONES: [&str; 20] = [
    "",
    "One",
    "Two",
    "Three",
    "Four",
    "Five",
    "Six",
    "Seven",
    "Eight",
    "Nine",
    "Ten",
    "Eleven",
    "Twelve",
    "Thirteen",
    "Fourteen",
    "Fifteen",
    "Sixteen",
    "Seventeen",
    "Eighteen",
    "Nineteen",
];

/// Words for the tens multiples, indexed by the tens digit.
const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

/// Magnitude bands, largest first: (divisor, scale word).
const BANDS: [(u64, &str); 4] = [
    (1_000_000_000, "Billion"),
    (1_000_000, "Million"),
    (1_000, "Thousand"),
    (100, "Hundred"),
];

/// First value the converter does not name (one trillion).
pub const WORDS_LIMIT: u64 = 1_000_000_000_000;

// =============================================================================
// Converter
// =============================================================================

/// Converts a non-negative integer to English words.
///
/// ## Example
/// ```rust
/// use procura_core::words::number_to_words;
///
/// assert_eq!(number_to_words(21), "Twenty One");
/// assert_eq!(number_to_words(1_500_000), "One Million Five Hundred Thousand");
/// assert_eq!(number_to_words(0), "");
/// ```
pub fn number_to_words(n: u64) -> String {
    if n >= WORDS_LIMIT {
        return String::new();
    }

    if n < 20 {
        return ONES[n as usize].to_string();
    }

    if n < 100 {
        let tens = TENS[(n / 10) as usize];
        return match n % 10 {
            0 => tens.to_string(),
            ones => format!("{} {}", tens, ONES[ones as usize]),
        };
    }

    // n >= 100 always matches a band, the smallest being Hundred
    let (divisor, scale) = BANDS
        .iter()
        .copied()
        .find(|(divisor, _)| n >= *divisor)
        .unwrap_or(BANDS[BANDS.len() - 1]);

    let head = number_to_words(n / divisor);
    match n % divisor {
        0 => format!("{} {}", head, scale),
        tail => format!("{} {} {}", head, scale, number_to_words(tail)),
    }
}

/// Returns true when `n` is inside the range the converter names.
#[inline]
pub const fn in_words_range(n: u64) -> bool {
    n < WORDS_LIMIT
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_empty() {
        assert_eq!(number_to_words(0), "");
    }

    #[test]
    fn test_ones_and_teens() {
        assert_eq!(number_to_words(1), "One");
        assert_eq!(number_to_words(13), "Thirteen");
        assert_eq!(number_to_words(19), "Nineteen");
    }

    #[test]
    fn test_tens() {
        assert_eq!(number_to_words(20), "Twenty");
        assert_eq!(number_to_words(21), "Twenty One");
        assert_eq!(number_to_words(99), "Ninety Nine");
    }

    #[test]
    fn test_hundreds() {
        assert_eq!(number_to_words(100), "One Hundred");
        assert_eq!(number_to_words(105), "One Hundred Five");
        assert_eq!(number_to_words(999), "Nine Hundred Ninety Nine");
    }

    #[test]
    fn test_thousands_and_up() {
        assert_eq!(number_to_words(1000), "One Thousand");
        assert_eq!(number_to_words(1234), "One Thousand Two Hundred Thirty Four");
        assert_eq!(number_to_words(1_500_000), "One Million Five Hundred Thousand");
        assert_eq!(
            number_to_words(2_000_000_001),
            "Two Billion One"
        );
        assert_eq!(
            number_to_words(999_999_999_999),
            "Nine Hundred Ninety Nine Billion Nine Hundred Ninety Nine Million \
             Nine Hundred Ninety Nine Thousand Nine Hundred Ninety Nine"
        );
    }

    /// Exact thresholds must not leave a connector for the absent lower band.
    #[test]
    fn test_band_thresholds_have_no_stray_words() {
        let cases = [
            (20, "Twenty"),
            (100, "One Hundred"),
            (1_000, "One Thousand"),
            (1_000_000, "One Million"),
            (1_000_000_000, "One Billion"),
        ];
        for (n, expected) in cases {
            let words = number_to_words(n);
            assert_eq!(words, expected);
            assert!(!words.contains("Zero"));
            assert!(!words.ends_with(' '));
            assert!(!words.contains("  "));
        }
    }

    #[test]
    fn test_at_or_above_trillion_is_empty() {
        assert_eq!(number_to_words(WORDS_LIMIT), "");
        assert_eq!(number_to_words(u64::MAX), "");
        assert!(!in_words_range(WORDS_LIMIT));
        assert!(in_words_range(WORDS_LIMIT - 1));
    }

    #[test]
    fn test_deterministic() {
        let first = number_to_words(987_654_321);
        for _ in 0..3 {
            assert_eq!(number_to_words(987_654_321), first);
        }
    }
}
