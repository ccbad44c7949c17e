use serde::{Deserialize, Serialize};

/// A box or crate goods are weighed in. Its tare is subtracted per unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    code: u32,
    name: String,
    tare: f64,
}

impl Container {
    pub fn builder(code: u32) -> ContainerBuilder {
        ContainerBuilder {
            code,
            name: String::new(),
            tare: 0.0,
        }
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Empty weight of one container.
    pub fn tare(&self) -> f64 {
        self.tare
    }
}

/// Builder for [`Container`]. Defaults: empty name, `tare = 0`.
#[derive(Debug, Clone)]
pub struct ContainerBuilder {
    code: u32,
    name: String,
    tare: f64,
}

impl ContainerBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn tare(mut self, tare: f64) -> Self {
        self.tare = tare;
        self
    }

    pub fn build(self) -> Container {
        Container {
            code: self.code,
            name: self.name,
            tare: self.tare,
        }
    }
}
