//! The catalog's data and the write rules every adapter shares.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use tally_core::{
    application::ApplicationError,
    domain::{BindingTarget, Subtotal, SubtotalCode, Template, Variable, VersionToken},
};

/// Subtotals, variables and templates held together.
///
/// Write rules:
/// - new subtotals are stored at [`VersionToken::INITIAL`];
/// - every accepted update or soft-delete advances the version;
/// - a variable or template may only reference existing, active subtotals;
///   the check runs here, inside the same write as the association, so a
///   removal cannot slip in between;
/// - registering a variable or template that references a subtotal advances
///   that subtotal's version too, so a removal decided against the old
///   version fails its compare-and-swap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "CatalogDocument", into = "CatalogDocument")]
pub struct CatalogState {
    subtotals: BTreeMap<SubtotalCode, Subtotal>,
    variables: BTreeMap<String, Variable>,
    templates: BTreeMap<String, Template>,
}

impl CatalogState {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Subtotals ──────────────────────────────────────────────────────────

    pub fn subtotal(&self, code: SubtotalCode) -> Option<&Subtotal> {
        self.subtotals.get(&code)
    }

    pub fn subtotals(&self) -> impl Iterator<Item = &Subtotal> {
        self.subtotals.values()
    }

    pub fn active_codes(&self) -> Vec<SubtotalCode> {
        self.subtotals
            .values()
            .filter(|s| s.is_active())
            .map(Subtotal::code)
            .collect()
    }

    pub fn insert_subtotal(&mut self, subtotal: Subtotal) -> Result<Subtotal, ApplicationError> {
        let code = subtotal.code();
        if self.subtotals.contains_key(&code) {
            return Err(ApplicationError::DuplicateCode { code: code.get() });
        }

        let stored = subtotal.with_version(VersionToken::INITIAL);
        self.subtotals.insert(code, stored.clone());
        Ok(stored)
    }

    /// Compare-and-swap update. Deleted records are never revived.
    pub fn update_subtotal(&mut self, subtotal: Subtotal, expected: VersionToken) -> bool {
        let Some(current) = self.subtotals.get_mut(&subtotal.code()) else {
            return false;
        };
        if current.version() != expected || current.is_deleted() {
            return false;
        }

        *current = subtotal.with_version(expected.next());
        true
    }

    /// Compare-and-swap soft delete.
    pub fn soft_delete(&mut self, code: SubtotalCode, expected: VersionToken) -> bool {
        let Some(current) = self.subtotals.get_mut(&code) else {
            return false;
        };
        if current.version() != expected {
            return false;
        }

        *current = current
            .clone()
            .into_deleted()
            .with_version(expected.next());
        true
    }

    pub fn is_referenced(&self, code: SubtotalCode) -> bool {
        self.variables.values().any(|v| v.references_subtotal(code))
            || self.templates.values().any(|t| t.references_subtotal(code))
    }

    /// `Ok` only for a stored, active subtotal.
    fn check_target(
        &self,
        code: SubtotalCode,
        missing: impl FnOnce() -> ApplicationError,
    ) -> Result<(), ApplicationError> {
        match self.subtotals.get(&code) {
            None => Err(missing()),
            Some(s) if s.is_deleted() => Err(ApplicationError::InactiveSubtotal { code: code.get() }),
            Some(_) => Ok(()),
        }
    }

    fn touch(&mut self, code: SubtotalCode) {
        if let Some(current) = self.subtotals.get_mut(&code) {
            let next = current.version().next();
            *current = current.clone().with_version(next);
        }
    }

    // ── Variables ──────────────────────────────────────────────────────────

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn variable_names(&self) -> Vec<String> {
        self.variables.keys().cloned().collect()
    }

    pub fn register_variable(&mut self, variable: Variable) -> Result<(), ApplicationError> {
        if self.variables.contains_key(variable.name()) {
            return Err(ApplicationError::DuplicateName {
                kind: "Variable",
                name: variable.name().to_string(),
            });
        }

        if let Some(code) = variable.attribute().subtotal() {
            self.check_target(code, || ApplicationError::NotFound {
                kind: "Subtotal",
                key: code.to_string(),
            })?;
            self.touch(code);
        }
        self.variables.insert(variable.name().to_string(), variable);
        Ok(())
    }

    // ── Templates ──────────────────────────────────────────────────────────

    pub fn template(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn template_names(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }

    pub fn register_template(&mut self, template: Template) -> Result<(), ApplicationError> {
        if self.templates.contains_key(template.name()) {
            return Err(ApplicationError::DuplicateName {
                kind: "Template",
                name: template.name().to_string(),
            });
        }

        let mut referenced = BTreeSet::new();
        for binding in template.cell_bindings() {
            if let BindingTarget::Subtotal(code) = binding.target() {
                self.check_target(*code, || ApplicationError::UnknownBindingTarget {
                    position: binding.position().to_string(),
                    target: binding.target().to_string(),
                })?;
                referenced.insert(*code);
            }
        }
        for code in referenced {
            self.touch(code);
        }

        self.templates.insert(template.name().to_string(), template);
        Ok(())
    }
}

/// On-disk shape: plain lists, ordered by key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    subtotals: Vec<Subtotal>,
    #[serde(default)]
    variables: Vec<Variable>,
    #[serde(default)]
    templates: Vec<Template>,
}

impl From<CatalogDocument> for CatalogState {
    fn from(doc: CatalogDocument) -> Self {
        Self {
            subtotals: doc.subtotals.into_iter().map(|s| (s.code(), s)).collect(),
            variables: doc
                .variables
                .into_iter()
                .map(|v| (v.name().to_string(), v))
                .collect(),
            templates: doc
                .templates
                .into_iter()
                .map(|t| (t.name().to_string(), t))
                .collect(),
        }
    }
}

impl From<CatalogState> for CatalogDocument {
    fn from(state: CatalogState) -> Self {
        Self {
            subtotals: state.subtotals.into_values().collect(),
            variables: state.variables.into_values().collect(),
            templates: state.templates.into_values().collect(),
        }
    }
}
