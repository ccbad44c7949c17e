//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the engine needs from storage. The
//! `tally-adapters` crate provides implementations. Every method returns
//! `TallyResult`: an `Err` is a collaborator fault (storage unreachable,
//! malformed record), never a business verdict.

use crate::domain::{Subtotal, SubtotalCode, Template, Variable, VersionToken};
use crate::error::TallyResult;

/// Port for subtotal persistence.
///
/// Implemented by:
/// - `tally_adapters::catalog::InMemoryCatalog` (tests, embedding)
/// - `tally_adapters::catalog::JsonFileCatalog` (CLI)
///
/// ## Consistency contract
///
/// `soft_delete` and `update_subtotal` are compare-and-swap writes keyed on
/// the version token. Implementations must also advance a subtotal's version
/// whenever a new variable or template binding starts referencing it, so a
/// removal decided before that association cannot commit after it. The
/// registration itself must refuse a missing or deleted subtotal in the same
/// atomic step as the write.
pub trait SubtotalStore: Send + Sync {
    /// Look up a subtotal, including soft-deleted ones.
    fn find_by_code(&self, code: SubtotalCode) -> TallyResult<Option<Subtotal>>;

    /// Persist a new subtotal and return it as stored (with its version).
    ///
    /// Fails with `DuplicateCode` if the code is taken, deleted or not.
    fn insert_subtotal(&self, subtotal: Subtotal) -> TallyResult<Subtotal>;

    /// Replace a subtotal's fields if its stored version equals `expected`.
    ///
    /// Returns `false` on version mismatch or when the code is unknown.
    fn update_subtotal(&self, subtotal: Subtotal, expected: VersionToken) -> TallyResult<bool>;

    /// Mark a subtotal deleted if its stored version equals `expected`.
    ///
    /// Returns `false` on version mismatch or when the code is unknown.
    fn soft_delete(&self, code: SubtotalCode, expected: VersionToken) -> TallyResult<bool>;

    /// Codes of subtotals that are not deleted, ascending.
    fn list_active_codes(&self) -> TallyResult<Vec<SubtotalCode>>;

    /// Every subtotal, deleted ones included, ascending by code.
    fn list_subtotals(&self) -> TallyResult<Vec<Subtotal>>;
}

/// Port answering whether anything still refers to a subtotal.
pub trait VariableAssociationIndex: Send + Sync {
    /// `true` if any persisted variable attribute or template binding points
    /// at `code`.
    fn is_subtotal_referenced(&self, code: SubtotalCode) -> TallyResult<bool>;
}

/// Port for template persistence.
pub trait TemplateStore: Send + Sync {
    /// Persist a template. Fails with `DuplicateName` if the name is taken,
    /// `UnknownBindingTarget` or `InactiveSubtotal` if a cell is bound to a
    /// subtotal that is missing or deleted at write time.
    fn register_template(&self, template: Template) -> TallyResult<()>;

    fn find_template(&self, name: &str) -> TallyResult<Option<Template>>;

    /// Registered template names, sorted.
    fn template_names(&self) -> TallyResult<Vec<String>>;
}

/// Port for variable persistence.
pub trait VariableStore: Send + Sync {
    /// Persist a variable. Fails with `DuplicateName` if the name is taken,
    /// `NotFound` or `InactiveSubtotal` if its subtotal is missing or deleted
    /// at write time.
    fn register_variable(&self, variable: Variable) -> TallyResult<()>;

    fn find_variable(&self, name: &str) -> TallyResult<Option<Variable>>;

    /// Registered variable names, sorted.
    fn variable_names(&self) -> TallyResult<Vec<String>>;
}
