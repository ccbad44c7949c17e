//! Subtotal Service - subtotal management operations.
//!
//! Registration, conditional updates, listing and application of subtotals.
//! Removal is delegated to [`SubtotalRemovalResolver`].

use tracing::{info, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{SubtotalStore, VariableAssociationIndex},
        services::SubtotalRemovalResolver,
    },
    domain::{Subtotal, SubtotalCode, SubtotalRemovalState, VersionToken},
    error::TallyResult,
};

/// Service for subtotal operations.
pub struct SubtotalService {
    resolver: SubtotalRemovalResolver,
}

impl SubtotalService {
    /// Create a new subtotal service.
    pub fn new(
        store: Box<dyn SubtotalStore>,
        associations: Box<dyn VariableAssociationIndex>,
    ) -> Self {
        Self {
            resolver: SubtotalRemovalResolver::new(store, associations),
        }
    }

    fn store(&self) -> &dyn SubtotalStore {
        self.resolver.store()
    }

    /// Get a subtotal by code, deleted ones included.
    pub fn get(&self, code: SubtotalCode) -> TallyResult<Option<Subtotal>> {
        self.store().find_by_code(code)
    }

    /// Register a new subtotal.
    #[instrument(skip_all, fields(code = %subtotal.code()))]
    pub fn register(&self, subtotal: Subtotal) -> TallyResult<Subtotal> {
        let stored = self.store().insert_subtotal(subtotal)?;
        info!(name = %stored.name(), "Subtotal registered");
        Ok(stored)
    }

    /// Replace a subtotal's fields if the caller's snapshot is current.
    ///
    /// Returns `false` when the stored version moved on. Removed subtotals
    /// cannot be edited.
    #[instrument(skip_all, fields(code = %subtotal.code(), expected = %expected))]
    pub fn update(&self, subtotal: Subtotal, expected: VersionToken) -> TallyResult<bool> {
        let code = subtotal.code();
        let current = self
            .store()
            .find_by_code(code)?
            .ok_or_else(|| ApplicationError::NotFound {
                kind: "Subtotal",
                key: code.to_string(),
            })?;

        if current.is_deleted() {
            return Err(ApplicationError::InactiveSubtotal { code: code.get() }.into());
        }

        let updated = self.store().update_subtotal(subtotal, expected)?;
        if updated {
            info!("Subtotal updated");
        }
        Ok(updated)
    }

    /// Try to remove a subtotal; see [`SubtotalRemovalResolver`].
    pub fn remove(
        &self,
        code: SubtotalCode,
        expected: VersionToken,
    ) -> TallyResult<SubtotalRemovalState> {
        self.resolver.resolve_removal(code, expected)
    }

    pub fn resolver(&self) -> &SubtotalRemovalResolver {
        &self.resolver
    }

    /// Codes still offered for new bindings.
    pub fn active_codes(&self) -> TallyResult<Vec<SubtotalCode>> {
        self.store().list_active_codes()
    }

    /// All subtotals; removed ones only when `include_deleted`.
    pub fn list(&self, include_deleted: bool) -> TallyResult<Vec<Subtotal>> {
        let all = self.store().list_subtotals()?;
        Ok(all
            .into_iter()
            .filter(|s| include_deleted || s.is_active())
            .collect())
    }

    /// Apply an active subtotal to `amount`.
    pub fn apply(&self, code: SubtotalCode, amount: f64) -> TallyResult<f64> {
        let subtotal = self
            .store()
            .find_by_code(code)?
            .ok_or_else(|| ApplicationError::NotFound {
                kind: "Subtotal",
                key: code.to_string(),
            })?;

        if subtotal.is_deleted() {
            return Err(ApplicationError::InactiveSubtotal { code: code.get() }.into());
        }

        Ok(subtotal.apply(amount))
    }
}
