//! Subtotal Removal Resolver - the removal state machine.
//!
//! Decides whether a subtotal may be retired, given the caller's snapshot and
//! the current association graph. Gates run in a fixed order and the first
//! failing gate wins:
//!
//! 1. **Existence** - unknown code → `NotFound`
//! 2. **Staleness** - caller's version differs from stored → `NotUpdated`
//! 3. **Association** - referenced by a variable or binding → `AssociatedWithVariable`
//! 4. **Removal** - conditional soft-delete → `Removed`
//!
//! Verdicts are returned as values. Only port faults surface as `Err`.

use tracing::{debug, info, instrument, warn};

use crate::{
    application::ports::{SubtotalStore, VariableAssociationIndex},
    domain::{Subtotal, SubtotalCode, SubtotalRemovalState, VersionToken},
    error::TallyResult,
};

/// Resolves subtotal removal requests against the storage ports.
pub struct SubtotalRemovalResolver {
    store: Box<dyn SubtotalStore>,
    associations: Box<dyn VariableAssociationIndex>,
}

impl SubtotalRemovalResolver {
    pub fn new(
        store: Box<dyn SubtotalStore>,
        associations: Box<dyn VariableAssociationIndex>,
    ) -> Self {
        Self {
            store,
            associations,
        }
    }

    /// Try to remove the subtotal `code`, as seen by a caller at `expected`.
    #[instrument(skip(self), fields(code = %code, expected = %expected))]
    pub fn resolve_removal(
        &self,
        code: SubtotalCode,
        expected: VersionToken,
    ) -> TallyResult<SubtotalRemovalState> {
        self.resolve(code, expected, None)
    }

    /// Try to remove the subtotal the caller holds.
    ///
    /// Stricter staleness gate than [`Self::resolve_removal`]: every field of
    /// the snapshot must match the stored record, not only the version.
    #[instrument(skip_all, fields(code = %snapshot.code(), expected = %snapshot.version()))]
    pub fn resolve_removal_of(&self, snapshot: &Subtotal) -> TallyResult<SubtotalRemovalState> {
        self.resolve(snapshot.code(), snapshot.version(), Some(snapshot))
    }

    pub(crate) fn store(&self) -> &dyn SubtotalStore {
        self.store.as_ref()
    }

    fn resolve(
        &self,
        code: SubtotalCode,
        expected: VersionToken,
        snapshot: Option<&Subtotal>,
    ) -> TallyResult<SubtotalRemovalState> {
        // 1. Existence
        let Some(current) = self.store.find_by_code(code)? else {
            debug!("Subtotal not found");
            return Ok(SubtotalRemovalState::NotFound);
        };

        // 2. Staleness
        let stale = current.version() != expected || snapshot.is_some_and(|s| *s != current);
        if stale {
            debug!(stored = %current.version(), "Caller snapshot is stale");
            return Ok(SubtotalRemovalState::NotUpdated);
        }

        // 3. Association
        if self.associations.is_subtotal_referenced(code)? {
            debug!("Subtotal still referenced");
            return Ok(SubtotalRemovalState::AssociatedWithVariable);
        }

        // 4. Removal
        if current.is_deleted() {
            debug!("Subtotal already removed");
            return Ok(SubtotalRemovalState::Removed);
        }

        if self.store.soft_delete(code, expected)? {
            info!(name = %current.name(), "Subtotal removed");
            Ok(SubtotalRemovalState::Removed)
        } else {
            warn!("Subtotal changed between check and write");
            Ok(SubtotalRemovalState::NotUpdated)
        }
    }
}

#[cfg(test)]
mod tests {
    use mockall::{mock, predicate::eq};

    use super::*;
    use crate::application::ApplicationError;

    mock! {
        Store {}
        impl SubtotalStore for Store {
            fn find_by_code(&self, code: SubtotalCode) -> TallyResult<Option<Subtotal>>;
            fn insert_subtotal(&self, subtotal: Subtotal) -> TallyResult<Subtotal>;
            fn update_subtotal(&self, subtotal: Subtotal, expected: VersionToken) -> TallyResult<bool>;
            fn soft_delete(&self, code: SubtotalCode, expected: VersionToken) -> TallyResult<bool>;
            fn list_active_codes(&self) -> TallyResult<Vec<SubtotalCode>>;
            fn list_subtotals(&self) -> TallyResult<Vec<Subtotal>>;
        }
    }

    mock! {
        Index {}
        impl VariableAssociationIndex for Index {
            fn is_subtotal_referenced(&self, code: SubtotalCode) -> TallyResult<bool>;
        }
    }

    const VAT: SubtotalCode = SubtotalCode::new(7);

    fn vat_at(version: u64) -> Subtotal {
        Subtotal::builder(VAT)
            .name("VAT")
            .percentage(21.0)
            .build()
            .unwrap()
            .with_version(VersionToken::new(version))
    }

    fn resolver(store: MockStore, index: MockIndex) -> SubtotalRemovalResolver {
        SubtotalRemovalResolver::new(Box::new(store), Box::new(index))
    }

    #[test]
    fn not_found_skips_remaining_gates() {
        let mut store = MockStore::new();
        store.expect_find_by_code().returning(|_| Ok(None));
        store.expect_soft_delete().never();
        let mut index = MockIndex::new();
        index.expect_is_subtotal_referenced().never();

        let outcome = resolver(store, index)
            .resolve_removal(VAT, VersionToken::INITIAL)
            .unwrap();
        assert_eq!(outcome, SubtotalRemovalState::NotFound);
    }

    #[test]
    fn stale_version_wins_over_association() {
        let mut store = MockStore::new();
        store.expect_find_by_code().returning(|_| Ok(Some(vat_at(2))));
        store.expect_soft_delete().never();
        let mut index = MockIndex::new();
        index.expect_is_subtotal_referenced().never();

        let outcome = resolver(store, index)
            .resolve_removal(VAT, VersionToken::new(1))
            .unwrap();
        assert_eq!(outcome, SubtotalRemovalState::NotUpdated);
    }

    #[test]
    fn snapshot_with_changed_fields_is_stale() {
        let mut store = MockStore::new();
        store.expect_find_by_code().returning(|_| Ok(Some(vat_at(0))));
        store.expect_soft_delete().never();
        let index = MockIndex::new();

        let cached = Subtotal::builder(VAT)
            .name("VAT")
            .percentage(10.0)
            .build()
            .unwrap();
        let outcome = resolver(store, index).resolve_removal_of(&cached).unwrap();
        assert_eq!(outcome, SubtotalRemovalState::NotUpdated);
    }

    #[test]
    fn associated_subtotal_is_not_written() {
        let mut store = MockStore::new();
        store.expect_find_by_code().returning(|_| Ok(Some(vat_at(0))));
        store.expect_soft_delete().never();
        let mut index = MockIndex::new();
        index
            .expect_is_subtotal_referenced()
            .with(eq(VAT))
            .returning(|_| Ok(true));

        let outcome = resolver(store, index)
            .resolve_removal(VAT, VersionToken::INITIAL)
            .unwrap();
        assert_eq!(outcome, SubtotalRemovalState::AssociatedWithVariable);
    }

    #[test]
    fn removal_writes_with_callers_token() {
        let mut store = MockStore::new();
        store.expect_find_by_code().returning(|_| Ok(Some(vat_at(3))));
        store
            .expect_soft_delete()
            .with(eq(VAT), eq(VersionToken::new(3)))
            .times(1)
            .returning(|_, _| Ok(true));
        let mut index = MockIndex::new();
        index.expect_is_subtotal_referenced().returning(|_| Ok(false));

        let outcome = resolver(store, index)
            .resolve_removal(VAT, VersionToken::new(3))
            .unwrap();
        assert_eq!(outcome, SubtotalRemovalState::Removed);
    }

    #[test]
    fn lost_compare_and_swap_reports_not_updated() {
        let mut store = MockStore::new();
        store.expect_find_by_code().returning(|_| Ok(Some(vat_at(0))));
        store.expect_soft_delete().returning(|_, _| Ok(false));
        let mut index = MockIndex::new();
        index.expect_is_subtotal_referenced().returning(|_| Ok(false));

        let outcome = resolver(store, index)
            .resolve_removal(VAT, VersionToken::INITIAL)
            .unwrap();
        assert_eq!(outcome, SubtotalRemovalState::NotUpdated);
    }

    #[test]
    fn already_deleted_is_removed_without_second_write() {
        let mut store = MockStore::new();
        store
            .expect_find_by_code()
            .returning(|_| Ok(Some(vat_at(1).into_deleted())));
        store.expect_soft_delete().never();
        let mut index = MockIndex::new();
        index.expect_is_subtotal_referenced().returning(|_| Ok(false));

        let outcome = resolver(store, index)
            .resolve_removal(VAT, VersionToken::new(1))
            .unwrap();
        assert_eq!(outcome, SubtotalRemovalState::Removed);
    }

    #[test]
    fn storage_faults_propagate() {
        let mut store = MockStore::new();
        store
            .expect_find_by_code()
            .returning(|_| Err(ApplicationError::storage("connection refused").into()));
        let index = MockIndex::new();

        let err = resolver(store, index)
            .resolve_removal(VAT, VersionToken::INITIAL)
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn index_faults_propagate() {
        let mut store = MockStore::new();
        store.expect_find_by_code().returning(|_| Ok(Some(vat_at(0))));
        store.expect_soft_delete().never();
        let mut index = MockIndex::new();
        index
            .expect_is_subtotal_referenced()
            .returning(|_| Err(ApplicationError::storage("index offline").into()));

        assert!(
            resolver(store, index)
                .resolve_removal(VAT, VersionToken::INITIAL)
                .is_err()
        );
    }
}
