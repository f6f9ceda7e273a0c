//! # Validation Module
//!
//! Input validation for contracts, contractors and document requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI / form parsing                                            │
//! │  ├── Type validation (dates, amounts, enums)                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Command (Rust)                                                │
//! │  └── THIS MODULE: business rule validation                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL constraints                                               │
//! │  └── UNIQUE (contract_id, contractor email)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::{Bidder, ContractorInput, NewBatch};

pub use crate::error::ValidationResult;

/// Longest accepted contract ID.
pub const MAX_CONTRACT_ID_LEN: usize = 50;

/// Longest accepted project or contractor name.
pub const MAX_NAME_LEN: usize = 1000;

// =============================================================================
// Helpers
// =============================================================================

fn required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

fn max_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.trim().chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

// =============================================================================
// Contract Validators
// =============================================================================

/// Validates a contract ID.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Must not contain path separators (IDs become part of file names)
///
/// ## Example
/// ```rust
/// use procura_core::validation::validate_contract_id;
///
/// assert!(validate_contract_id("24ID0001").is_ok());
/// assert!(validate_contract_id("").is_err());
/// assert!(validate_contract_id("24/ID").is_err());
/// ```
pub fn validate_contract_id(contract_id: &str) -> ValidationResult<()> {
    required("contract_id", contract_id)?;
    max_len("contract_id", contract_id, MAX_CONTRACT_ID_LEN)?;

    if contract_id.contains(['/', '\\']) {
        return Err(ValidationError::invalid_format(
            "contract_id",
            "must not contain '/' or '\\'",
        ));
    }
    Ok(())
}

/// Validates a project name.
pub fn validate_project_name(name: &str) -> ValidationResult<()> {
    required("project_name", name)?;
    max_len("project_name", name, MAX_NAME_LEN)
}

/// Normalises a year cell and validates it.
///
/// Spreadsheets hand years over as numbers, so `"2024.0"` becomes `"2024"`.
///
/// ## Rules
/// - Four digits
/// - Between 2000 and 2100
pub fn normalize_year(year: &str) -> ValidationResult<String> {
    let year = year.trim();
    required("year", year)?;

    let whole = match year.split_once('.') {
        Some((whole, fraction)) if fraction.chars().all(|c| c == '0') => whole,
        _ => year,
    };

    let value: i64 = whole
        .parse()
        .map_err(|_| ValidationError::invalid_format("year", "must be a four-digit year"))?;

    if !(2000..=2100).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: "year".to_string(),
            min: 2000,
            max: 2100,
        });
    }

    Ok(value.to_string())
}

/// Validates a new batch before insertion.
///
/// ## Rules
/// - Batch number and year are required (year per [`normalize_year`])
/// - At least one contract
/// - Every contract has a valid ID and project name
/// - No contract ID appears twice in the batch
pub fn validate_new_batch(batch: &NewBatch) -> ValidationResult<()> {
    required("batch", &batch.batch)?;
    normalize_year(&batch.year)?;

    if batch.contracts.is_empty() {
        return Err(ValidationError::required("contracts"));
    }

    let mut seen = HashSet::new();
    for contract in &batch.contracts {
        validate_contract_id(&contract.contract_id)?;
        validate_project_name(&contract.project_name)?;

        if !seen.insert(contract.contract_id.trim()) {
            return Err(ValidationError::Duplicate {
                field: "contract_id".to_string(),
                value: contract.contract_id.trim().to_string(),
            });
        }
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Returns
/// The trimmed query string (empty is allowed).
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();
    max_len("query", query, 100)?;
    Ok(query.to_string())
}

// =============================================================================
// Contractor Validators
// =============================================================================

/// Validates contractor fields.
///
/// ## Rules
/// - Name and address are required
/// - Email, when present, must look like `local@domain`
pub fn validate_contractor(input: &ContractorInput) -> ValidationResult<()> {
    required("name", &input.name)?;
    max_len("name", &input.name, MAX_NAME_LEN)?;
    required("address", &input.address)?;

    if let Some(email) = &input.email {
        validate_email(email)?;
    }
    Ok(())
}

/// Minimal email shape check: one `@` with text on both sides.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(ValidationError::invalid_format(
            "email",
            "must look like name@domain",
        )),
    }
}

// =============================================================================
// Document Validators
// =============================================================================

/// Validates the bidder list of a three-strike request.
pub fn validate_bidders(bidders: &[Bidder]) -> ValidationResult<()> {
    if bidders.is_empty() {
        return Err(ValidationError::required("bidders"));
    }
    for bidder in bidders {
        required("bidder name", &bidder.name)?;
        if bidder.name.contains(['/', '\\']) {
            return Err(ValidationError::invalid_format(
                "bidder name",
                "must not contain '/' or '\\'",
            ));
        }
    }
    Ok(())
}

/// Validates that every named field of a document request is filled in.
///
/// Mirrors the "all inputs complete" rule of the document forms.
pub fn validate_complete(fields: &[(&str, &str)]) -> ValidationResult<()> {
    for (field, value) in fields {
        required(field, value)?;
    }
    Ok(())
}

/// Validates that `value` is one of the offered choices.
pub fn validate_choice(field: &str, value: &str, allowed: &[&str]) -> ValidationResult<()> {
    if allowed.contains(&value.trim()) {
        return Ok(());
    }
    Err(ValidationError::NotAllowed {
        field: field.to_string(),
        allowed: allowed.iter().map(|a| a.to_string()).collect(),
    })
}

/// Validates text that becomes part of an output file name.
pub fn validate_file_component(field: &str, value: &str) -> ValidationResult<()> {
    required(field, value)?;
    if value.contains(['/', '\\']) {
        return Err(ValidationError::invalid_format(
            field,
            "must not contain '/' or '\\'",
        ));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewContract;
    use chrono::NaiveDate;

    fn batch(ids: &[&str]) -> NewBatch {
        let d = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        NewBatch {
            batch: "1".to_string(),
            year: "2024".to_string(),
            posting: d,
            pre_bid: d,
            bidding: d,
            contracts: ids
                .iter()
                .map(|id| NewContract {
                    contract_id: id.to_string(),
                    project_name: format!("Project {}", id),
                })
                .collect(),
        }
    }

    #[test]
    fn test_validate_contract_id() {
        assert!(validate_contract_id("24ID0001").is_ok());
        assert!(validate_contract_id("   ").is_err());
        assert!(validate_contract_id(&"X".repeat(51)).is_err());
        assert!(validate_contract_id("a\\b").is_err());
    }

    #[test]
    fn test_normalize_year() {
        assert_eq!(normalize_year("2024").unwrap(), "2024");
        assert_eq!(normalize_year("2024.0").unwrap(), "2024");
        assert!(matches!(
            normalize_year("1999"),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(normalize_year("twenty").is_err());
        assert!(normalize_year("").is_err());
    }

    #[test]
    fn test_validate_new_batch() {
        assert!(validate_new_batch(&batch(&["24ID0001", "24ID0002"])).is_ok());
        assert!(validate_new_batch(&batch(&[])).is_err());
        assert!(matches!(
            validate_new_batch(&batch(&["24ID0001", "24ID0001"])),
            Err(ValidationError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_validate_contractor() {
        let mut input = ContractorInput {
            name: "ACME".to_string(),
            address: "Tacloban".to_string(),
            ..Default::default()
        };
        assert!(validate_contractor(&input).is_ok());

        input.email = Some("acme.example.com".to_string());
        assert!(validate_contractor(&input).is_err());

        input.email = Some("acme@example.com".to_string());
        assert!(validate_contractor(&input).is_ok());

        input.address = String::new();
        assert!(validate_contractor(&input).is_err());
    }

    #[test]
    fn test_validate_bidders() {
        assert!(validate_bidders(&[]).is_err());
        let bidder = Bidder {
            name: "ACME".to_string(),
            address: "Tacloban".to_string(),
            tel_no: String::new(),
            phil_reg: String::new(),
        };
        assert!(validate_bidders(&[bidder]).is_ok());
    }

    #[test]
    fn test_validate_complete() {
        assert!(validate_complete(&[("a", "x"), ("b", "y")]).is_ok());
        let err = validate_complete(&[("a", "x"), ("location", " ")]).unwrap_err();
        assert_eq!(err.to_string(), "location is required");
    }

    #[test]
    fn test_validate_choice() {
        assert!(validate_choice("bond type", "WARRANTY BOND", &crate::BOND_TYPES).is_ok());
        assert!(matches!(
            validate_choice("bond type", "SURETY", &crate::BOND_TYPES),
            Err(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_validate_file_component() {
        assert!(validate_file_component("contractor", "ACME Builders").is_ok());
        assert!(validate_file_component("contractor", "A/B Corp").is_err());
        assert!(validate_file_component("contractor", "").is_err());
    }
}
