//! Template Service - template validation and registration.
//!
//! Validation is pure and delegates to [`TemplateValidator`]. Registration
//! additionally checks that every binding points at something that exists.

use tracing::{debug, info, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{SubtotalStore, TemplateStore, VariableStore},
    },
    domain::{BindingTarget, Template, TemplateValidationState, TemplateValidator},
    error::TallyResult,
};

/// Service for template operations.
pub struct TemplateService {
    templates: Box<dyn TemplateStore>,
    variables: Box<dyn VariableStore>,
    subtotals: Box<dyn SubtotalStore>,
    validator: TemplateValidator,
}

impl TemplateService {
    /// Create a new template service with the default validator.
    pub fn new(
        templates: Box<dyn TemplateStore>,
        variables: Box<dyn VariableStore>,
        subtotals: Box<dyn SubtotalStore>,
    ) -> Self {
        Self {
            templates,
            variables,
            subtotals,
            validator: TemplateValidator::default(),
        }
    }

    /// Use a differently configured validator (e.g. another name bound).
    pub fn with_validator(mut self, validator: TemplateValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Validate a template without touching storage.
    pub fn validate(&self, template: &Template) -> TemplateValidationState {
        self.validator.is_valid(template)
    }

    /// Validate a stored template; `None` if no template has that name.
    pub fn validate_named(&self, name: &str) -> TallyResult<Option<TemplateValidationState>> {
        Ok(self
            .templates
            .find_template(name)?
            .map(|t| self.validator.is_valid(&t)))
    }

    /// Validate and persist a template.
    ///
    /// A non-`Valid` verdict is returned as-is and nothing is stored. A
    /// binding to an unknown variable, or to a missing or removed subtotal,
    /// is an error.
    #[instrument(skip_all, fields(template = %template.name()))]
    pub fn register(&self, template: Template) -> TallyResult<TemplateValidationState> {
        let state = self.validator.is_valid(&template);
        if !state.is_valid() {
            debug!(%state, "Template rejected");
            return Ok(state);
        }

        self.check_bindings(&template)?;
        self.templates.register_template(template)?;

        info!("Template registered");
        Ok(state)
    }

    pub fn get(&self, name: &str) -> TallyResult<Option<Template>> {
        self.templates.find_template(name)
    }

    /// List all template names.
    pub fn names(&self) -> TallyResult<Vec<String>> {
        self.templates.template_names()
    }

    fn check_bindings(&self, template: &Template) -> TallyResult<()> {
        for binding in template.cell_bindings() {
            match binding.target() {
                BindingTarget::Variable(name) => {
                    if self.variables.find_variable(name)?.is_none() {
                        return Err(ApplicationError::UnknownBindingTarget {
                            position: binding.position().to_string(),
                            target: binding.target().to_string(),
                        }
                        .into());
                    }
                }
                BindingTarget::Subtotal(code) => match self.subtotals.find_by_code(*code)? {
                    None => {
                        return Err(ApplicationError::UnknownBindingTarget {
                            position: binding.position().to_string(),
                            target: binding.target().to_string(),
                        }
                        .into());
                    }
                    Some(s) if s.is_deleted() => {
                        return Err(ApplicationError::InactiveSubtotal { code: code.get() }.into());
                    }
                    Some(_) => {}
                },
            }
        }
        Ok(())
    }
}
