//! Variable Service - variable registration and lookup.

use tracing::{info, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{SubtotalStore, VariableStore},
    },
    domain::{DomainError, NameValidator, Variable},
    error::TallyResult,
};

/// Service for variable operations.
pub struct VariableService {
    variables: Box<dyn VariableStore>,
    subtotals: Box<dyn SubtotalStore>,
    names: NameValidator,
}

impl VariableService {
    pub fn new(variables: Box<dyn VariableStore>, subtotals: Box<dyn SubtotalStore>) -> Self {
        Self {
            variables,
            subtotals,
            names: NameValidator::default(),
        }
    }

    pub fn with_name_validator(mut self, names: NameValidator) -> Self {
        self.names = names;
        self
    }

    /// Register a variable.
    ///
    /// The name must be valid, and a subtotal-bound variable must point at an
    /// existing, active subtotal.
    #[instrument(skip_all, fields(variable = %variable.name()))]
    pub fn register(&self, variable: Variable) -> TallyResult<()> {
        if !self.names.is_valid(variable.name()) {
            return Err(DomainError::InvalidName {
                name: variable.name().to_string(),
            }
            .into());
        }

        if let Some(code) = variable.attribute().subtotal() {
            match self.subtotals.find_by_code(code)? {
                None => {
                    return Err(ApplicationError::NotFound {
                        kind: "Subtotal",
                        key: code.to_string(),
                    }
                    .into());
                }
                Some(s) if s.is_deleted() => {
                    return Err(ApplicationError::InactiveSubtotal { code: code.get() }.into());
                }
                Some(_) => {}
            }
        }

        self.variables.register_variable(variable)?;
        info!("Variable registered");
        Ok(())
    }

    pub fn get(&self, name: &str) -> TallyResult<Option<Variable>> {
        self.variables.find_variable(name)
    }

    pub fn names(&self) -> TallyResult<Vec<String>> {
        self.variables.variable_names()
    }
}
