// ============================================================================
// domain/error.rs - DOMAIN INVARIANT VIOLATIONS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// Only invariant violations live here. Business-rule verdicts such as
/// "subtotal is still associated" are outcome enums, not errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors (400-level equivalent)
    // ========================================================================
    #[error("Invalid cell position '{position}': expected column letters followed by a row number")]
    InvalidPosition { position: String },

    #[error("Invalid percentage {value}: must be a finite number >= 0")]
    InvalidPercentage { value: f64 },

    #[error("Invalid name '{name}'")]
    InvalidName { name: String },

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Unknown variable attribute: {0}")]
    UnknownAttribute(String),

    // ========================================================================
    // Constraint Violations
    // ========================================================================
    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidPosition { position } => vec![
                format!("'{}' is not a spreadsheet cell reference", position),
                "Use uppercase column letters and a row starting at 1".into(),
                "Examples: A1, F30, AB100".into(),
            ],
            Self::InvalidPercentage { value } => vec![
                format!("{} cannot be used as a percentage", value),
                "Use a non-negative value; mark discounts with --discount instead".into(),
            ],
            Self::InvalidName { name } => vec![
                format!("Name '{}' was rejected", name),
                "Names must not be blank, start or end with spaces, or contain control characters".into(),
            ],
            Self::UnknownAttribute(attr) => vec![
                format!("'{}' is not a document field", attr),
                "Run: tally variable add --help to see the accepted attributes".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidPattern { .. } => ErrorCategory::Internal,
            _ => ErrorCategory::Validation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Internal,
}
