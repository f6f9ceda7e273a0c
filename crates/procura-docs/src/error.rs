//! # Document Error Types
//!
//! ```text
//! ValidationError / CoreError ──┐
//! zip::ZipError ────────────────┼──► DocError ──► ApiError (cli)
//! std::io::Error ───────────────┘
//! ```

use std::path::PathBuf;

use procura_core::{CoreError, ValidationError};
use thiserror::Error;

/// Document generation errors.
#[derive(Debug, Error)]
pub enum DocError {
    /// A template has a malformed tag or unbalanced section.
    #[error("Template syntax error at byte {position}: {message}")]
    TemplateSyntax { position: usize, message: String },

    /// The template file does not exist in the template directory.
    #[error("Template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    /// The template is not a readable .docx package.
    #[error("Invalid document package: {0}")]
    Package(#[from] zip::result::ZipError),

    /// Reading a template or writing an output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The request failed a domain rule (incomplete fields, weekend date...).
    #[error(transparent)]
    Domain(#[from] CoreError),
}

impl DocError {
    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        DocError::TemplateSyntax {
            position,
            message: message.into(),
        }
    }
}

impl From<ValidationError> for DocError {
    fn from(err: ValidationError) -> Self {
        DocError::Domain(CoreError::Validation(err))
    }
}

/// Result type for document operations.
pub type DocResult<T> = Result<T, DocError>;
