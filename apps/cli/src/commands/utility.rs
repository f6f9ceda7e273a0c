//! # Utility Commands
//!
//! Stand-alone conversions that need no database or session.

use serde::Serialize;
use tracing::{debug, warn};

use procura_core::words::in_words_range;
use procura_core::{amount_to_words, format_number};

/// Result of `procura words`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountWords {
    pub input: String,
    pub words: String,
    pub formatted: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Spells out an amount the way documents print it.
///
/// Integer parts of one trillion or more still produce a phrase, but it does
/// not read correctly; the result carries a warning instead of failing.
pub fn amount_words(amount: &str) -> AmountWords {
    debug!(input = %amount, "amount_words command");

    let pesos = amount.split('.').next().unwrap_or_default();
    let digits: String = pesos.chars().filter(char::is_ascii_digit).collect();
    // Digit strings that overflow u64 are out of range too
    let out_of_range = !digits.is_empty() && !digits.parse::<u64>().is_ok_and(in_words_range);

    let warning = out_of_range.then(|| {
        warn!(input = %amount, "Amount is outside the range that can be spelled out");
        "amounts of one trillion pesos or more cannot be spelled out correctly".to_string()
    });

    AmountWords {
        input: amount.to_string(),
        words: amount_to_words(amount),
        formatted: format_number(amount),
        warning,
    }
}

/// Groups an amount string with commas.
pub fn format_amount(amount: &str) -> String {
    format_number(amount)
}
