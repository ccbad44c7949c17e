//! In-memory catalog implementing every storage port.

use std::sync::{Arc, RwLock};

use tally_core::{
    application::{
        ApplicationError,
        ports::{SubtotalStore, TemplateStore, VariableAssociationIndex, VariableStore},
    },
    domain::{Subtotal, SubtotalCode, Template, Variable, VersionToken},
    error::TallyResult,
};
use tracing::trace;

use super::CatalogState;

/// Thread-safe in-memory catalog.
///
/// Clones share the same state, so one handle can be boxed into each service.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    inner: Arc<RwLock<CatalogState>>,
}

impl InMemoryCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog over existing state.
    pub fn from_state(state: CatalogState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> TallyResult<CatalogState> {
        self.read(CatalogState::clone)
    }

    pub(crate) fn read<T>(&self, f: impl FnOnce(&CatalogState) -> T) -> TallyResult<T> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(f(&inner))
    }

    /// Apply `change` to a copy of the state, hand the result to `persist`
    /// when it differs, and only then make it current.
    pub(crate) fn commit<T>(
        &self,
        change: impl FnOnce(&mut CatalogState) -> Result<T, ApplicationError>,
        persist: impl FnOnce(&CatalogState) -> TallyResult<()>,
    ) -> TallyResult<T> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        let mut next = inner.clone();
        let out = change(&mut next)?;
        if next != *inner {
            persist(&next)?;
            *inner = next;
        } else {
            trace!("catalog unchanged");
        }
        Ok(out)
    }

    fn write<T>(
        &self,
        change: impl FnOnce(&mut CatalogState) -> Result<T, ApplicationError>,
    ) -> TallyResult<T> {
        self.commit(change, |_| Ok(()))
    }
}

impl SubtotalStore for InMemoryCatalog {
    fn find_by_code(&self, code: SubtotalCode) -> TallyResult<Option<Subtotal>> {
        self.read(|s| s.subtotal(code).cloned())
    }

    fn insert_subtotal(&self, subtotal: Subtotal) -> TallyResult<Subtotal> {
        self.write(|s| s.insert_subtotal(subtotal))
    }

    fn update_subtotal(&self, subtotal: Subtotal, expected: VersionToken) -> TallyResult<bool> {
        self.write(|s| Ok(s.update_subtotal(subtotal, expected)))
    }

    fn soft_delete(&self, code: SubtotalCode, expected: VersionToken) -> TallyResult<bool> {
        self.write(|s| Ok(s.soft_delete(code, expected)))
    }

    fn list_active_codes(&self) -> TallyResult<Vec<SubtotalCode>> {
        self.read(CatalogState::active_codes)
    }

    fn list_subtotals(&self) -> TallyResult<Vec<Subtotal>> {
        self.read(|s| s.subtotals().cloned().collect())
    }
}

impl VariableAssociationIndex for InMemoryCatalog {
    fn is_subtotal_referenced(&self, code: SubtotalCode) -> TallyResult<bool> {
        self.read(|s| s.is_referenced(code))
    }
}

impl TemplateStore for InMemoryCatalog {
    fn register_template(&self, template: Template) -> TallyResult<()> {
        self.write(|s| s.register_template(template))
    }

    fn find_template(&self, name: &str) -> TallyResult<Option<Template>> {
        self.read(|s| s.template(name).cloned())
    }

    fn template_names(&self) -> TallyResult<Vec<String>> {
        self.read(CatalogState::template_names)
    }
}

impl VariableStore for InMemoryCatalog {
    fn register_variable(&self, variable: Variable) -> TallyResult<()> {
        self.write(|s| s.register_variable(variable))
    }

    fn find_variable(&self, name: &str) -> TallyResult<Option<Variable>> {
        self.read(|s| s.variable(name).cloned())
    }

    fn variable_names(&self) -> TallyResult<Vec<String>> {
        self.read(CatalogState::variable_names)
    }
}
