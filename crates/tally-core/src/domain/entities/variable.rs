use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{SubtotalCode, VariableAttribute};

/// A named placeholder bound to one document field.
///
/// Variables are owned independently of templates; templates only refer to
/// them by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    name: String,
    #[serde(default)]
    description: String,
    attribute: VariableAttribute,
}

impl Variable {
    pub fn builder(name: impl Into<String>, attribute: VariableAttribute) -> VariableBuilder {
        VariableBuilder {
            name: name.into(),
            description: String::new(),
            attribute,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn attribute(&self) -> VariableAttribute {
        self.attribute
    }

    pub fn references_subtotal(&self, code: SubtotalCode) -> bool {
        self.attribute.references(code)
    }
}

/// Builder for [`Variable`]. `description` defaults to empty.
#[derive(Debug, Clone)]
pub struct VariableBuilder {
    name: String,
    description: String,
    attribute: VariableAttribute,
}

impl VariableBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn build(self) -> Variable {
        Variable {
            name: self.name,
            description: self.description,
            attribute: self.attribute,
        }
    }
}
