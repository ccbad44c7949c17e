//! Integration tests for tally-core.
//!
//! The services run against `Catalog`, a map-backed double implementing every
//! port, so the engine is exercised end to end without the adapters crate.
//! Like the real adapters it refuses associations to missing or deleted
//! subtotals and bumps a subtotal's version whenever something new references
//! it, so tokens read before an association go stale.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use tally_core::{
    application::{ApplicationError, SubtotalService, TemplateService, VariableService},
    domain::TemplateValidator,
    error::TallyError,
    prelude::*,
};

const XLSX: &[u8] = b"PK\x03\x04\x14\x00\x06\x00\x08\x00";

#[derive(Default)]
struct State {
    subtotals: BTreeMap<SubtotalCode, Subtotal>,
    variables: BTreeMap<String, Variable>,
    templates: BTreeMap<String, Template>,
}

impl State {
    /// Check that `code` may be referenced, then advance its version.
    fn associate(
        &mut self,
        code: SubtotalCode,
        missing: impl FnOnce() -> ApplicationError,
    ) -> TallyResult<()> {
        let current = self.subtotals.get(&code).ok_or_else(missing)?;
        if current.is_deleted() {
            return Err(ApplicationError::InactiveSubtotal { code: code.get() }.into());
        }
        let bumped = current.clone().with_version(current.version().next());
        self.subtotals.insert(code, bumped);
        Ok(())
    }
}

#[derive(Clone, Default)]
struct Catalog(Arc<Mutex<State>>);

impl Catalog {
    fn version_of(&self, code: u32) -> VersionToken {
        self.find_by_code(SubtotalCode::new(code))
            .unwrap()
            .unwrap()
            .version()
    }
}

impl SubtotalStore for Catalog {
    fn find_by_code(&self, code: SubtotalCode) -> TallyResult<Option<Subtotal>> {
        Ok(self.0.lock().unwrap().subtotals.get(&code).cloned())
    }

    fn insert_subtotal(&self, subtotal: Subtotal) -> TallyResult<Subtotal> {
        let mut state = self.0.lock().unwrap();
        if state.subtotals.contains_key(&subtotal.code()) {
            return Err(ApplicationError::DuplicateCode {
                code: subtotal.code().get(),
            }
            .into());
        }
        state.subtotals.insert(subtotal.code(), subtotal.clone());
        Ok(subtotal)
    }

    fn update_subtotal(&self, subtotal: Subtotal, expected: VersionToken) -> TallyResult<bool> {
        let mut state = self.0.lock().unwrap();
        match state.subtotals.get_mut(&subtotal.code()) {
            Some(current) if current.version() == expected => {
                *current = subtotal.with_version(expected.next());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn soft_delete(&self, code: SubtotalCode, expected: VersionToken) -> TallyResult<bool> {
        let mut state = self.0.lock().unwrap();
        match state.subtotals.remove(&code) {
            Some(current) if current.version() == expected => {
                state
                    .subtotals
                    .insert(code, current.into_deleted().with_version(expected.next()));
                Ok(true)
            }
            Some(current) => {
                state.subtotals.insert(code, current);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    fn list_active_codes(&self) -> TallyResult<Vec<SubtotalCode>> {
        let state = self.0.lock().unwrap();
        Ok(state
            .subtotals
            .values()
            .filter(|s| s.is_active())
            .map(Subtotal::code)
            .collect())
    }

    fn list_subtotals(&self) -> TallyResult<Vec<Subtotal>> {
        Ok(self.0.lock().unwrap().subtotals.values().cloned().collect())
    }
}

impl VariableAssociationIndex for Catalog {
    fn is_subtotal_referenced(&self, code: SubtotalCode) -> TallyResult<bool> {
        let state = self.0.lock().unwrap();
        Ok(state.variables.values().any(|v| v.references_subtotal(code))
            || state.templates.values().any(|t| t.references_subtotal(code)))
    }
}

impl TemplateStore for Catalog {
    fn register_template(&self, template: Template) -> TallyResult<()> {
        let mut state = self.0.lock().unwrap();
        let mut codes: Vec<SubtotalCode> = Vec::new();
        for binding in template.cell_bindings() {
            if let BindingTarget::Subtotal(code) = binding.target() {
                if !codes.contains(code) {
                    state.associate(*code, || ApplicationError::UnknownBindingTarget {
                        position: binding.position().to_string(),
                        target: binding.target().to_string(),
                    })?;
                    codes.push(*code);
                }
            }
        }
        state
            .templates
            .insert(template.name().to_string(), template);
        Ok(())
    }

    fn find_template(&self, name: &str) -> TallyResult<Option<Template>> {
        Ok(self.0.lock().unwrap().templates.get(name).cloned())
    }

    fn template_names(&self) -> TallyResult<Vec<String>> {
        Ok(self.0.lock().unwrap().templates.keys().cloned().collect())
    }
}

impl VariableStore for Catalog {
    fn register_variable(&self, variable: Variable) -> TallyResult<()> {
        let mut state = self.0.lock().unwrap();
        if let Some(code) = variable.attribute().subtotal() {
            state.associate(code, || ApplicationError::NotFound {
                kind: "Subtotal",
                key: code.to_string(),
            })?;
        }
        state
            .variables
            .insert(variable.name().to_string(), variable);
        Ok(())
    }

    fn find_variable(&self, name: &str) -> TallyResult<Option<Variable>> {
        Ok(self.0.lock().unwrap().variables.get(name).cloned())
    }

    fn variable_names(&self) -> TallyResult<Vec<String>> {
        Ok(self.0.lock().unwrap().variables.keys().cloned().collect())
    }
}

struct Services {
    subtotals: SubtotalService,
    variables: VariableService,
    templates: TemplateService,
}

fn services(catalog: &Catalog) -> Services {
    Services {
        subtotals: SubtotalService::new(Box::new(catalog.clone()), Box::new(catalog.clone())),
        variables: VariableService::new(Box::new(catalog.clone()), Box::new(catalog.clone())),
        templates: TemplateService::new(
            Box::new(catalog.clone()),
            Box::new(catalog.clone()),
            Box::new(catalog.clone()),
        ),
    }
}

fn subtotal(code: u32, name: &str, pct: f64, discount: bool) -> Subtotal {
    Subtotal::builder(code)
        .name(name)
        .percentage(pct)
        .discount(discount)
        .build()
        .unwrap()
}

fn sheet() -> SpreadsheetFile {
    SpreadsheetFile::new("invoice.xlsx", XLSX.to_vec())
}

// ============================================================================
// Removal scenarios
// ============================================================================

#[test]
fn unreferenced_vat_is_removed_but_still_resolvable() {
    let catalog = Catalog::default();
    let s = services(&catalog);
    let vat = s.subtotals.register(subtotal(7, "VAT", 21.0, false)).unwrap();

    let outcome = s.subtotals.remove(SubtotalCode::new(7), vat.version()).unwrap();
    assert_eq!(outcome, SubtotalRemovalState::Removed);

    let stored = catalog.find_by_code(SubtotalCode::new(7)).unwrap().unwrap();
    assert!(stored.is_deleted());
    assert!(
        !catalog
            .list_active_codes()
            .unwrap()
            .contains(&SubtotalCode::new(7))
    );
}

#[test]
fn subtotal_bound_through_variable_in_template_is_kept() {
    let catalog = Catalog::default();
    let s = services(&catalog);
    let discount = s
        .subtotals
        .register(subtotal(9, "Discount", 5.0, true))
        .unwrap();
    s.variables
        .register(
            Variable::builder(
                "TOTAL_DISCOUNT",
                VariableAttribute::Subtotal(SubtotalCode::new(9)),
            )
            .build(),
        )
        .unwrap();
    let template = Template::builder()
        .name("Invoice-A4")
        .spreadsheet_file(sheet())
        .try_bind("F31", BindingTarget::variable("TOTAL_DISCOUNT"))
        .unwrap()
        .build();
    assert_eq!(
        s.templates.register(template).unwrap(),
        TemplateValidationState::Valid
    );

    // The token read at registration predates the association.
    assert_eq!(
        s.subtotals
            .remove(SubtotalCode::new(9), discount.version())
            .unwrap(),
        SubtotalRemovalState::NotUpdated
    );
    let outcome = s
        .subtotals
        .remove(SubtotalCode::new(9), catalog.version_of(9))
        .unwrap();
    assert_eq!(outcome, SubtotalRemovalState::AssociatedWithVariable);
    assert!(
        !catalog
            .find_by_code(SubtotalCode::new(9))
            .unwrap()
            .unwrap()
            .is_deleted()
    );
}

#[test]
fn direct_template_binding_also_blocks_removal() {
    let catalog = Catalog::default();
    let s = services(&catalog);
    let vat = s.subtotals.register(subtotal(7, "VAT", 21.0, false)).unwrap();
    let template = Template::builder()
        .name("Delivery note")
        .spreadsheet_file(sheet())
        .try_bind("F30", BindingTarget::Subtotal(SubtotalCode::new(7)))
        .unwrap()
        .build();
    s.templates.register(template).unwrap();
    assert_eq!(catalog.version_of(7), vat.version().next());

    assert_eq!(
        s.subtotals
            .remove(SubtotalCode::new(7), catalog.version_of(7))
            .unwrap(),
        SubtotalRemovalState::AssociatedWithVariable
    );
}

#[test]
fn missing_subtotal_is_not_found_even_if_referenced() {
    let catalog = Catalog::default();
    // A dangling variable planted behind the port, which would refuse it.
    catalog.0.lock().unwrap().variables.insert(
        "GHOST".into(),
        Variable::builder("GHOST", VariableAttribute::Subtotal(SubtotalCode::new(4))).build(),
    );
    let s = services(&catalog);

    assert_eq!(
        s.subtotals
            .remove(SubtotalCode::new(4), VersionToken::INITIAL)
            .unwrap(),
        SubtotalRemovalState::NotFound
    );
}

#[test]
fn stale_and_associated_reports_not_updated() {
    let catalog = Catalog::default();
    let s = services(&catalog);
    let original = s.subtotals.register(subtotal(9, "Discount", 5.0, true)).unwrap();
    s.variables
        .register(
            Variable::builder(
                "TOTAL_DISCOUNT",
                VariableAttribute::Subtotal(SubtotalCode::new(9)),
            )
            .build(),
        )
        .unwrap();

    let associated = catalog.version_of(9);

    // Someone else changes the percentage.
    let edited = subtotal(9, "Discount", 7.5, true);
    assert!(s.subtotals.update(edited, associated).unwrap());

    for stale in [original.version(), associated] {
        assert_eq!(
            s.subtotals
                .remove(SubtotalCode::new(9), stale)
                .unwrap(),
            SubtotalRemovalState::NotUpdated
        );
    }
}

#[test]
fn removal_is_deterministic_for_a_fixed_snapshot() {
    let catalog = Catalog::default();
    let s = services(&catalog);
    s.subtotals.register(subtotal(3, "Levy", 1.0, false)).unwrap();
    catalog
        .register_variable(
            Variable::builder("LEVY", VariableAttribute::Subtotal(SubtotalCode::new(3))).build(),
        )
        .unwrap();

    let first = s
        .subtotals
        .remove(SubtotalCode::new(3), VersionToken::new(1))
        .unwrap();
    let second = s
        .subtotals
        .remove(SubtotalCode::new(3), VersionToken::new(1))
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(first, SubtotalRemovalState::AssociatedWithVariable);
}

#[test]
fn resolver_compares_the_whole_snapshot() {
    let catalog = Catalog::default();
    let s = services(&catalog);
    let stored = s.subtotals.register(subtotal(7, "VAT", 21.0, false)).unwrap();

    let cached = subtotal(7, "VAT", 18.0, false);
    assert_eq!(
        s.subtotals.resolver().resolve_removal_of(&cached).unwrap(),
        SubtotalRemovalState::NotUpdated
    );
    assert_eq!(
        s.subtotals.resolver().resolve_removal_of(&stored).unwrap(),
        SubtotalRemovalState::Removed
    );
}

// ============================================================================
// Subtotal management
// ============================================================================

#[test]
fn removed_subtotals_cannot_be_updated_or_applied() {
    let catalog = Catalog::default();
    let s = services(&catalog);
    s.subtotals.register(subtotal(7, "VAT", 21.0, false)).unwrap();
    s.subtotals
        .remove(SubtotalCode::new(7), VersionToken::INITIAL)
        .unwrap();

    let err = s
        .subtotals
        .update(subtotal(7, "VAT", 10.0, false), VersionToken::new(1))
        .unwrap_err();
    assert!(matches!(
        err,
        TallyError::Application(ApplicationError::InactiveSubtotal { code: 7 })
    ));
    assert!(s.subtotals.apply(SubtotalCode::new(7), 100.0).is_err());
}

#[test]
fn list_hides_removed_unless_asked() {
    let catalog = Catalog::default();
    let s = services(&catalog);
    s.subtotals.register(subtotal(1, "A", 1.0, false)).unwrap();
    s.subtotals.register(subtotal(2, "B", 2.0, false)).unwrap();
    s.subtotals
        .remove(SubtotalCode::new(1), VersionToken::INITIAL)
        .unwrap();

    assert_eq!(s.subtotals.list(false).unwrap().len(), 1);
    assert_eq!(s.subtotals.list(true).unwrap().len(), 2);
    assert_eq!(s.subtotals.active_codes().unwrap(), [SubtotalCode::new(2)]);
}

#[test]
fn apply_uses_sign_from_discount_flag() {
    let catalog = Catalog::default();
    let s = services(&catalog);
    s.subtotals.register(subtotal(7, "VAT", 21.0, false)).unwrap();
    s.subtotals.register(subtotal(9, "Discount", 10.0, true)).unwrap();

    assert_eq!(s.subtotals.apply(SubtotalCode::new(7), 100.0).unwrap(), 121.0);
    assert_eq!(s.subtotals.apply(SubtotalCode::new(9), 100.0).unwrap(), 90.0);
}

// ============================================================================
// Template and variable registration
// ============================================================================

#[test]
fn invalid_templates_are_reported_and_not_stored() {
    let catalog = Catalog::default();
    let s = services(&catalog);

    let unnamed = Template::builder().spreadsheet_file(sheet()).build();
    assert_eq!(
        s.templates.register(unnamed).unwrap(),
        TemplateValidationState::InvalidName
    );

    let csv = Template::builder()
        .name("Invoice-A4")
        .spreadsheet_file(SpreadsheetFile::new("invoice.csv", b"a,b\n".to_vec()))
        .build();
    assert_eq!(
        s.templates.register(csv).unwrap(),
        TemplateValidationState::InvalidFile
    );

    assert!(s.templates.names().unwrap().is_empty());
}

#[test]
fn template_binding_to_unknown_variable_is_rejected() {
    let catalog = Catalog::default();
    let s = services(&catalog);
    let template = Template::builder()
        .name("Invoice-A4")
        .spreadsheet_file(sheet())
        .try_bind("B4", BindingTarget::variable("CLIENT_NAME"))
        .unwrap()
        .build();

    let err = s.templates.register(template).unwrap_err();
    assert!(matches!(
        err,
        TallyError::Application(ApplicationError::UnknownBindingTarget { ref position, .. })
            if position == "B4"
    ));
}

#[test]
fn template_binding_to_removed_subtotal_is_rejected() {
    let catalog = Catalog::default();
    let s = services(&catalog);
    s.subtotals.register(subtotal(7, "VAT", 21.0, false)).unwrap();
    s.subtotals
        .remove(SubtotalCode::new(7), VersionToken::INITIAL)
        .unwrap();

    let template = Template::builder()
        .name("Invoice-A4")
        .spreadsheet_file(sheet())
        .try_bind("F30", BindingTarget::Subtotal(SubtotalCode::new(7)))
        .unwrap()
        .build();
    assert!(s.templates.register(template.clone()).is_err());

    // The store refuses it too when reached directly.
    assert_eq!(
        catalog.register_template(template).unwrap_err(),
        TallyError::Application(ApplicationError::InactiveSubtotal { code: 7 })
    );
    assert!(s.templates.names().unwrap().is_empty());
}

#[test]
fn validate_named_reads_from_store() {
    let catalog = Catalog::default();
    let s = services(&catalog);
    s.templates
        .register(
            Template::builder()
                .name("Invoice-A4")
                .spreadsheet_file(sheet())
                .build(),
        )
        .unwrap();

    assert_eq!(
        s.templates.validate_named("Invoice-A4").unwrap(),
        Some(TemplateValidationState::Valid)
    );
    assert_eq!(s.templates.validate_named("missing").unwrap(), None);

    let strict = TemplateService::new(
        Box::new(catalog.clone()),
        Box::new(catalog.clone()),
        Box::new(catalog.clone()),
    )
    .with_validator(TemplateValidator::new(NameValidator::new(4)));
    assert_eq!(
        strict.validate_named("Invoice-A4").unwrap(),
        Some(TemplateValidationState::InvalidName)
    );
}

#[test]
fn variable_names_are_validated() {
    let catalog = Catalog::default();
    let s = services(&catalog);
    let err = s
        .variables
        .register(Variable::builder(" BAD", VariableAttribute::ClientName).build())
        .unwrap_err();
    assert!(matches!(err, TallyError::Domain(_)));
}

#[test]
fn variable_bound_to_missing_subtotal_is_rejected() {
    let catalog = Catalog::default();
    let s = services(&catalog);
    let err = s
        .variables
        .register(
            Variable::builder("VAT_AMOUNT", VariableAttribute::Subtotal(SubtotalCode::new(7)))
                .build(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        TallyError::Application(ApplicationError::NotFound { .. })
    ));
    assert!(s.variables.names().unwrap().is_empty());
}
