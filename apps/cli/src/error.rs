//! # Command Errors
//!
//! Every command function returns `Result<T, ApiError>`. Lower-layer errors
//! are folded into one of a few codes, and each code picks the process exit
//! status:
//!
//! | code                                 | exit |
//! |--------------------------------------|------|
//! | `VALIDATION_ERROR`, `BUSINESS_LOGIC` | 2    |
//! | `NOT_FOUND`                          | 3    |
//! | `UNAUTHORIZED`                       | 4    |
//! | anything else                        | 1    |
//!
//! ```text
//! $ procura contract status 24ID0001 awarded
//! error [BUSINESS_LOGIC]: Contract 24ID0001 cannot become awarded: awarded requires a NOA date
//! $ echo $?
//! 2
//! ```
//!
//! With `--json` the same error is printed as `{"code": ..., "message": ...}`.
//! SQLite detail never reaches the user; it goes to the log at `error` level.

use serde::Serialize;

use procura_core::{CoreError, ValidationError};
use procura_db::DbError;
use procura_docs::DocError;

use crate::state::ConfigError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub code: ErrorCode,

    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    DatabaseError,
    /// Status change or document date refused by a contract rule.
    BusinessLogic,

    /// Template missing, malformed or unreadable
    DocumentError,

    /// Import or export file could not be read or written
    TransferError,

    /// No active session, or wrong credentials
    Unauthorized,
    ConfigError,
    Internal,
}

impl ErrorCode {
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorCode::ValidationError | ErrorCode::BusinessLogic => 2,
            ErrorCode::NotFound => 3,
            ErrorCode::Unauthorized => 4,
            _ => 1,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    pub fn transfer(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::TransferError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!(error = %e, "query failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!(%message, "foreign key violation");
                ApiError::new(ErrorCode::ValidationError, "Contract references an unknown record")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database is busy, try again")
            }
            DbError::Domain(e) => ApiError::from(e),
            DbError::Internal(e) => {
                tracing::error!(error = %e, "internal database error");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ContractNotFound(id) => ApiError::not_found("Contract", &id),
            CoreError::ContractorNotFound(name) => ApiError::not_found("Contractor", &name),
            e @ CoreError::InvalidStatusTransition { .. } => {
                ApiError::new(ErrorCode::BusinessLogic, e.to_string())
            }
            e @ CoreError::NotAWorkingDay { .. } => {
                ApiError::new(ErrorCode::BusinessLogic, e.to_string())
            }
            e @ CoreError::InvalidAllocation { .. } => ApiError::validation(e.to_string()),
            CoreError::Validation(e) => ApiError::from(e),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<DocError> for ApiError {
    fn from(err: DocError) -> Self {
        match err {
            DocError::Domain(e) => ApiError::from(e),
            e @ (DocError::TemplateSyntax { .. } | DocError::TemplateNotFound(_)) => {
                ApiError::new(ErrorCode::DocumentError, e.to_string())
            }
            DocError::Package(e) => {
                tracing::error!(error = %e, "template package unreadable");
                ApiError::new(ErrorCode::DocumentError, "Template is not a valid .docx file")
            }
            DocError::Io(e) => ApiError::new(ErrorCode::DocumentError, e.to_string()),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<csv::Error> for ApiError {
    fn from(err: csv::Error) -> Self {
        ApiError::transfer(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::internal(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_code_and_message() {
        let err = ApiError::not_found("Contract", "24ID0001");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Contract not found: 24ID0001");
    }

    #[test]
    fn test_domain_errors_keep_their_category() {
        let err: ApiError = DbError::Domain(CoreError::ContractNotFound("X".into())).into();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err: ApiError = DocError::Domain(CoreError::Validation(ValidationError::required(
            "contract ID",
        )))
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "contract ID is required");

        let err: ApiError = DbError::duplicate("contract_id", "24ID0001").into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "contract_id '24ID0001' already exists");
    }

    #[test]
    fn test_sql_detail_is_not_shown() {
        let err: ApiError = DbError::QueryFailed("no such column: nao".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("nao"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ErrorCode::Unauthorized.exit_code(), 4);
        assert_eq!(ErrorCode::NotFound.exit_code(), 3);
        assert_eq!(ErrorCode::DatabaseError.exit_code(), 1);
    }
}
