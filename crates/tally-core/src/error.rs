//! Crate-wide error type.
//!
//! Business verdicts (`SubtotalRemovalState`, `TemplateValidationState`) are
//! never errors; a `TallyError` always means something went wrong: a broken
//! invariant, a refused write, or a store that could not be reached.

use std::fmt::Display;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::{DomainError, ErrorCategory as DomainCategory};

/// Every failure surfaced by `tally-core` and its adapters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TallyError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Application error: {0}")]
    Application(#[from] ApplicationError),

    /// Bad settings or input files outside the catalog (e.g. manifests).
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A state the code should never reach.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Coarse classification used for exit codes and styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Conflict,
    NotFound,
    Configuration,
    Internal,
}

impl From<DomainCategory> for ErrorCategory {
    fn from(category: DomainCategory) -> Self {
        match category {
            DomainCategory::Validation => Self::Validation,
            DomainCategory::Internal => Self::Internal,
        }
    }
}

impl TallyError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => e.category().into(),
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Hints for the person at the terminal.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { .. } => vec![
                "Check the file named in the message".into(),
                "Show the active settings: tally config list".into(),
            ],
            Self::Internal { .. } => vec!["Re-run with -vv and include the log in a bug report".into()],
        }
    }

    /// Storage faults may clear up on their own; everything else will fail
    /// the same way again. Nothing in this crate retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Application(
                ApplicationError::StorageUnavailable { .. } | ApplicationError::StoreLockError
            )
        )
    }
}

pub type TallyResult<T> = Result<T, TallyError>;

/// Attach what was being attempted to a foreign error, turning it into a
/// storage fault.
///
/// ```
/// use tally_core::error::{Context as _, TallyError};
///
/// let res: Result<(), std::io::Error> = Err(std::io::Error::other("disk full"));
/// let err = res.storage_context(|| "write catalog").unwrap_err();
/// assert!(err.is_retryable());
/// assert!(err.to_string().contains("write catalog"));
/// ```
pub trait Context<T> {
    fn storage_context<F, S>(self, what: F) -> TallyResult<T>
    where
        F: FnOnce() -> S,
        S: Display;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error,
{
    fn storage_context<F, S>(self, what: F) -> TallyResult<T>
    where
        F: FnOnce() -> S,
        S: Display,
    {
        self.map_err(|e| ApplicationError::storage(format!("failed to {}: {e}", what())).into())
    }
}
