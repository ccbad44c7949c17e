use serde::{Deserialize, Serialize};

/// A sellable item referenced by weighings and document lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    code: u32,
    name: String,
    unit_price: f64,
}

impl Product {
    pub fn builder(code: u32) -> ProductBuilder {
        ProductBuilder {
            code,
            name: String::new(),
            unit_price: 0.0,
        }
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }
}

/// Builder for [`Product`]. Defaults: empty name, `unit_price = 0`.
#[derive(Debug, Clone)]
pub struct ProductBuilder {
    code: u32,
    name: String,
    unit_price: f64,
}

impl ProductBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn unit_price(mut self, unit_price: f64) -> Self {
        self.unit_price = unit_price;
        self
    }

    pub fn build(self) -> Product {
        Product {
            code: self.code,
            name: self.name,
            unit_price: self.unit_price,
        }
    }
}
