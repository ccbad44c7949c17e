//! Application layer errors.
//!
//! These errors represent failures in orchestration and storage, not business
//! verdicts. Verdicts are `SubtotalRemovalState` / `TemplateValidationState`.

use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// The storage collaborator could not be reached or returned garbage.
    #[error("Storage unavailable: {reason}")]
    StorageUnavailable { reason: String },

    /// Store access failed (lock poisoned, etc.).
    #[error("Catalog store error")]
    StoreLockError,

    /// A subtotal with this code is already registered.
    #[error("Subtotal {code} already exists")]
    DuplicateCode { code: u32 },

    /// A template or variable with this name is already registered.
    #[error("{kind} '{name}' already exists")]
    DuplicateName { kind: &'static str, name: String },

    /// A template binding points at something that does not exist.
    #[error("Cell {position} is bound to unknown {target}")]
    UnknownBindingTarget { position: String, target: String },

    /// The subtotal exists but has been retired.
    #[error("Subtotal {code} has been removed")]
    InactiveSubtotal { code: u32 },

    /// A looked-up record does not exist.
    #[error("{kind} '{key}' not found")]
    NotFound { kind: &'static str, key: String },

    /// Validation failed (application-level, not domain).
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl ApplicationError {
    pub fn storage(reason: impl Into<String>) -> Self {
        Self::StorageUnavailable {
            reason: reason.into(),
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::StorageUnavailable { reason } => vec![
                format!("Cannot reach storage: {}", reason),
                "Check the --store path and its permissions, then try again".into(),
            ],
            Self::StoreLockError => vec![
                "The catalog is locked".into(),
                "Try again in a moment".into(),
            ],
            Self::DuplicateCode { code } => vec![
                format!("Code {} is taken", code),
                "Run: tally subtotal list --all to see used codes".into(),
            ],
            Self::DuplicateName { kind, name } => vec![
                format!("A {} named '{}' is already registered", kind, name),
                "Choose a different name".into(),
            ],
            Self::UnknownBindingTarget { target, .. } => vec![
                format!("Register the {} before importing the template", target),
                "Run: tally variable list / tally subtotal list".into(),
            ],
            Self::InactiveSubtotal { code } => vec![
                format!("Subtotal {} was removed and cannot be used for new bindings", code),
                "Pick an active subtotal: tally subtotal list".into(),
            ],
            Self::NotFound { kind, .. } => vec![format!("Check the {} identifier", kind)],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::StorageUnavailable { .. } | Self::StoreLockError => ErrorCategory::Internal,
            Self::DuplicateCode { .. } | Self::DuplicateName { .. } => ErrorCategory::Conflict,
            Self::UnknownBindingTarget { .. } | Self::InactiveSubtotal { .. } => {
                ErrorCategory::Validation
            }
            Self::ValidationFailed(_) => ErrorCategory::Validation,
            Self::NotFound { .. } => ErrorCategory::NotFound,
        }
    }
}
