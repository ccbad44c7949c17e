//! Comprehensive error handling for Tally CLI.
//!
//! Provides structured errors with:
//! - User-friendly messages
//! - Actionable suggestions
//! - Exit code mapping
//!
//! Removal and validation verdicts other than success also end up here, so
//! that scripts can branch on the exit code.

use std::error::Error;

use owo_colors::{OwoColorize, Style};
use thiserror::Error;

use tally_core::{
    domain::{SubtotalRemovalState, TemplateValidationState},
    error::TallyError,
};

// Re-export so callers only need `use crate::error::*`.
pub use tally_core::error::ErrorCategory as CoreCategory;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Comprehensive CLI error types.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input (validation failed).
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A looked-up record does not exist.
    #[error("{kind} '{key}' not found")]
    NotFound { kind: &'static str, key: String },

    /// The removal resolver kept the subtotal.
    #[error("Subtotal {code} was not removed: {outcome}")]
    RemovalRejected {
        code: u32,
        outcome: SubtotalRemovalState,
    },

    /// A template failed validation.
    #[error("Template '{name}' is not valid: {outcome}")]
    TemplateRejected {
        name: String,
        outcome: TemplateValidationState,
    },

    /// A conditional update lost against a newer version.
    #[error("Subtotal {code} changed since version {expected}")]
    StaleVersion { code: u32, expected: u64 },

    /// A cell position failed the grammar check.
    #[error("Invalid cell position '{position}'")]
    InvalidPosition { position: String },

    // ── Config errors ──────────────────────────────────────────────────────
    /// A configuration file could not be read, parsed, or written.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ── Core errors ────────────────────────────────────────────────────────
    /// An error propagated from `tally-core` or the adapters.
    #[error("{0}")]
    Core(#[from] TallyError),

    // ── System errors ──────────────────────────────────────────────────────
    /// An I/O operation failed.
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Operation cancelled by user.
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl CliError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidInput { message, .. } => vec![
                format!("Check your input: {}", message),
                "Use --help for usage information".into(),
            ],

            Self::NotFound { kind, .. } => match *kind {
                "Template" => vec!["List registered templates: tally template list".into()],
                "Variable" => vec!["List registered variables: tally variable list".into()],
                _ => vec!["List subtotals: tally subtotal list --all".into()],
            },

            Self::RemovalRejected { code, outcome } => match outcome {
                SubtotalRemovalState::AssociatedWithVariable => vec![
                    format!("Subtotal {code} is still used by a variable or template cell"),
                    "Unbind it from every template and variable first".into(),
                ],
                SubtotalRemovalState::NotUpdated => vec![
                    format!("Subtotal {code} changed since you read it"),
                    format!("Check the current version: tally subtotal show {code}"),
                    "Retry with --expect-version set to that version".into(),
                ],
                SubtotalRemovalState::NotFound => vec![
                    format!("No subtotal has code {code}"),
                    "List subtotals: tally subtotal list --all".into(),
                ],
                SubtotalRemovalState::Removed => vec![],
            },

            Self::TemplateRejected { outcome, .. } => match outcome {
                TemplateValidationState::InvalidName => vec![
                    "Template names must be non-empty".into(),
                    "No leading or trailing whitespace, no control characters".into(),
                    "Raise validation.max_name_length if the name is too long".into(),
                ],
                TemplateValidationState::InvalidFile => vec![
                    "The spreadsheet must be a .xlsx, .ods or .xls file".into(),
                    "Check the `file` entry of template.toml".into(),
                ],
                TemplateValidationState::Valid => vec![],
            },

            Self::StaleVersion { code, .. } => vec![
                format!("Check the current version: tally subtotal show {code}"),
                "Retry with --expect-version set to that version".into(),
            ],

            Self::InvalidPosition { .. } => vec![
                "Positions are uppercase column letters followed by a row number".into(),
                "Rows start at 1. Examples: A1, F30, AB100".into(),
            ],

            Self::ConfigError { message, .. } => vec![
                format!("Configuration issue: {}", message),
                "Check your config file: tally config path".into(),
                "Use 'tally init' to create a default config".into(),
            ],

            Self::Core(core_err) => core_err.suggestions(),

            Self::IoError { message, .. } => vec![
                format!("I/O operation failed: {}", message),
                "Check file permissions".into(),
                "Ensure the parent directory exists".into(),
            ],

            Self::Cancelled => vec![
                "Operation was cancelled".into(),
                "No changes were made".into(),
            ],
        }
    }

    /// Get the error category for styling and exit codes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } => ErrorCategory::UserError,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::RemovalRejected {
                outcome: SubtotalRemovalState::NotFound,
                ..
            } => ErrorCategory::NotFound,
            Self::RemovalRejected { .. } => ErrorCategory::UserError,
            Self::TemplateRejected { .. } => ErrorCategory::UserError,
            Self::StaleVersion { .. } => ErrorCategory::UserError,
            Self::InvalidPosition { .. } => ErrorCategory::UserError,
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::Core(core) => match core.category() {
                CoreCategory::Validation | CoreCategory::Conflict => ErrorCategory::UserError,
                CoreCategory::NotFound => ErrorCategory::NotFound,
                CoreCategory::Configuration => ErrorCategory::Configuration,
                CoreCategory::Internal => ErrorCategory::Internal,
            },
            Self::IoError { .. } => ErrorCategory::Internal,
            Self::Cancelled => ErrorCategory::UserError,
        }
    }

    /// Exit code to pass to the OS.
    ///
    /// | Category      | Code |
    /// |---------------|------|
    /// | User error    |  2   |
    /// | Not found     |  3   |
    /// | Configuration |  4   |
    /// | Internal      |  1   |
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::UserError => 2,
            ErrorCategory::NotFound => 3,
            ErrorCategory::Configuration => 4,
            ErrorCategory::Internal => 1,
        }
    }

    /// Message, optional cause chain and suggestions, ready for stderr.
    ///
    /// `color` switches ANSI styling; the text is identical either way.
    pub fn render(&self, verbose: bool, color: bool) -> String {
        let paint = |text: &str, style: Style| -> String {
            if color {
                text.style(style).to_string()
            } else {
                text.to_owned()
            }
        };
        let red = Style::new().red();

        let mut out = format!(
            "\n{} {}\n",
            paint("Error:", red.bold()),
            paint(&self.to_string(), red)
        );

        if verbose {
            let mut cause = self.source();
            while let Some(err) = cause {
                let line = format!("Caused by: {err}");
                out.push_str(&format!("  {}\n", paint(&line, Style::new().dimmed())));
                cause = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str(&format!(
                "\n{}\n",
                paint("Suggestions:", Style::new().yellow().bold())
            ));
            for s in &suggestions {
                out.push_str(&format!("  {s}\n"));
            }
        }

        if !verbose {
            out.push_str(&format!(
                "\n{}\n",
                paint("Use -v / --verbose for more details.", Style::new().dimmed())
            ));
        }

        out
    }

    /// Emit a tracing event at the severity of the category.
    pub fn log(&self) {
        let category = self.category();
        match category {
            ErrorCategory::UserError | ErrorCategory::NotFound => {
                tracing::warn!(?category, error = %self, "Command failed");
            }
            ErrorCategory::Configuration | ErrorCategory::Internal => {
                tracing::error!(?category, error = %self, "Command failed");
            }
        }
        if let Some(cause) = self.source() {
            tracing::debug!(%cause, "Underlying error");
        }
    }
}

/// Error categories for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// User input error (validation, invalid arguments).
    UserError,
    /// Resource not found.
    NotFound,
    /// Configuration error.
    Configuration,
    /// Internal/system error.
    Internal,
}

// ── IntoCli trait ─────────────────────────────────────────────────────────────

/// Extension trait to convert foreign error types into [`CliError`] at
/// call-sites with a descriptive context message.
///
/// There is no blanket impl; it would overlap with the concrete ones.
pub trait IntoCli<T> {
    /// Convert to `CliResult` attaching a human-readable context message.
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IntoCli<T> for Result<T, std::io::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CliError::IoError {
            message: f().into(),
            source: e,
        })
    }
}

impl<T> IntoCli<T> for Result<T, toml::ser::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CliError::ConfigError {
            message: f().into(),
            source: Some(Box::new(e)),
        })
    }
}
