//! # procura-core: Pure Business Logic for Procura
//!
//! This crate is the **heart** of Procura. It holds the amount-to-words
//! converter, the currency and date formatters, the domain types and the
//! validation rules, all as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Procura Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   apps/cli (commands)                           │   │
//! │  │   contract create ─ doc bond ─ import contracts ─ words         │   │
//! │  └───────────────┬──────────────────────────────┬──────────────────┘   │
//! │                  │                              │                       │
//! │  ┌───────────────▼──────────────┐  ┌────────────▼─────────────────┐    │
//! │  │  procura-db (SQLite repos)   │  │ procura-docs (.docx render)  │    │
//! │  └───────────────┬──────────────┘  └────────────┬─────────────────┘    │
//! │                  │                              │                       │
//! │  ┌───────────────▼──────────────────────────────▼─────────────────┐    │
//! │  │               ★ procura-core (THIS CRATE) ★                    │    │
//! │  │                                                                │    │
//! │  │  ┌────────┐ ┌──────────┐ ┌────────┐ ┌───────┐ ┌────────────┐  │    │
//! │  │  │ words  │ │ currency │ │ amount │ │ dates │ │ types /    │  │    │
//! │  │  │ bands  │ │ Pesos &  │ │centavos│ │ PH    │ │ validation │  │    │
//! │  │  └────────┘ └──────────┘ └────────┘ └───────┘ └────────────┘  │    │
//! │  │                                                                │    │
//! │  │   NO I/O • NO DATABASE • NO FILES • PURE FUNCTIONS             │    │
//! │  └────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`words`] - Numeral lexicon and the band-recursive converter
//! - [`currency`] - Legal peso phrases and grouped amounts
//! - [`amount`] - `Amount` in integer centavos, parsing, allocation
//! - [`dates`] - Long dates, ordinals, spreadsheet serials, holidays
//! - [`types`] - Domain types (Contract, Contractor, ContractStatus, ...)
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use procura_core::currency::amount_to_words;
//!
//! assert_eq!(
//!     amount_to_words("1234.50"),
//!     "One Thousand Two Hundred Thirty Four Pesos & 50/100"
//! );
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod amount;
pub mod currency;
pub mod dates;
pub mod error;
pub mod types;
pub mod validation;
pub mod words;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use amount::Amount;
pub use currency::{amount_to_words, format_number};
pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;
pub use words::number_to_words;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Category whose strike documents are signed by the goods end-user.
///
/// Every other category (Infrastructure, Consultancy) uses the
/// infrastructure end-user.
pub const GOODS_CATEGORY: &str = "Goods and Services";

/// Procurement categories offered on the three-strike form.
pub const STRIKE_CATEGORIES: [&str; 3] = ["Infrastructure", GOODS_CATEGORY, "Consultancy"];

/// Bond types offered on the bond certification form.
pub const BOND_TYPES: [&str; 5] = [
    "PERFORMANCE BOND",
    "CONTRACTOR'S ALL RISK POLICY",
    "ADVANCE PAYMENT BOND",
    "RETENTION BOND",
    "WARRANTY BOND",
];

/// Certificate types offered on the PIO memo form.
pub const PIO_CERT_TYPES: [&str; 4] = [
    "Invitation to Bid",
    "Notice of Award",
    "Notice to Proceed",
    "Request for Quotation",
];

/// Number of contracts shown on each dashboard list.
pub const DASHBOARD_RECENT_LIMIT: u32 = 10;
