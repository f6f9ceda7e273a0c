//! # Domain Errors
//!
//! Two layers. `ValidationError` rejects a single bad field (an empty
//! contract ID, a malformed date, a negative amount) before anything is
//! stored. `CoreError` covers rules that need the whole record: a status
//! the milestones don't support, a document dated on a holiday, a bond
//! amount that can't be split.
//!
//! ```text
//!  ValidationError ──► CoreError ──► DbError / DocError ──► ApiError
//!      (field)          (record)        (storage/docs)        (CLI)
//! ```
//!
//! Amount-to-words and peso formatting are total functions and have no
//! variants here.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

#[derive(Debug, Error)]
pub enum CoreError {
    /// No contract with this ID in the selected register.
    #[error("Contract not found: {0}")]
    ContractNotFound(String),

    /// No contractor with this name in the directory.
    #[error("Contractor not found: {0}")]
    ContractorNotFound(String),

    /// Requested status contradicts the contract's milestones.
    ///
    /// ```text
    /// contract 24ID0001 (no NOA date)
    ///      │
    ///      ▼
    /// set status → awarded
    ///      │
    ///      ▼
    /// InvalidStatusTransition { reason: "awarded requires a NOA date" }
    /// ```
    #[error("Contract {contract_id} cannot become {to}: {reason}")]
    InvalidStatusTransition {
        contract_id: String,
        to: String,
        reason: String,
    },

    /// A document date falls on a weekend or a listed holiday.
    #[error("{field} ({date}) is not a working day: {reason}")]
    NotAWorkingDay {
        field: String,
        date: String,
        reason: String,
    },

    /// A bond or obligation amount cannot be split as requested.
    #[error("Cannot allocate amount: {reason}")]
    InvalidAllocation { reason: String },

    /// A single field failed its check.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// One field failed a check. `field` is the column name the user typed or
/// the CSV header it came from.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Unparseable amount, date, or bidder spec.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Status, bond type, or setting key outside its fixed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// The same contract ID twice in one batch.
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::InvalidFormat`].
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
pub type ValidationResult<T> = Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidStatusTransition {
            contract_id: "24ID0001".to_string(),
            to: "awarded".to_string(),
            reason: "awarded requires a NOA date".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Contract 24ID0001 cannot become awarded: awarded requires a NOA date"
        );
    }

    #[test]
    fn test_holiday_message_names_the_field() {
        let err = CoreError::NotAWorkingDay {
            field: "bid_receipt_date".to_string(),
            date: "2024-12-25".to_string(),
            reason: "Christmas Day".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "bid_receipt_date (2024-12-25) is not a working day: Christmas Day"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("contract_id");
        assert_eq!(err.to_string(), "contract_id is required");

        let err = ValidationError::TooLong {
            field: "project_name".to_string(),
            max: 500,
        };
        assert_eq!(err.to_string(), "project_name must be at most 500 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("batch").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
