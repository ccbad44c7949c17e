//! Weighings: a recorded weight of some units of a product in containers.
//!
//! Weighings are assembled from partially filled forms, so the product and
//! container references are optional at construction. Business validation
//! downstream decides whether a weighing without them is acceptable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{container::Container, product::Product};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weighing {
    code: u32,
    product: Option<Product>,
    container: Option<Container>,
    qty: u32,
    weight: f64,
    weighed_at: Option<DateTime<Utc>>,
}

impl Weighing {
    pub fn builder(code: u32) -> WeighingBuilder {
        WeighingBuilder {
            code,
            ..WeighingBuilder::default()
        }
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn product(&self) -> Option<&Product> {
        self.product.as_ref()
    }

    /// The box the goods were weighed in, if recorded.
    pub fn container(&self) -> Option<&Container> {
        self.container.as_ref()
    }

    /// Number of containers on the scale.
    pub fn qty(&self) -> u32 {
        self.qty
    }

    /// Gross weight read from the scale.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn weighed_at(&self) -> Option<DateTime<Utc>> {
        self.weighed_at
    }

    /// Gross weight minus the tare of every container, never below zero.
    ///
    /// Without a container the gross weight is returned unchanged.
    pub fn net_weight(&self) -> f64 {
        let tare = self
            .container
            .as_ref()
            .map_or(0.0, |c| c.tare() * f64::from(self.qty));
        (self.weight - tare).max(0.0)
    }

    /// Net weight priced at the product's unit price; `None` without a product.
    pub fn amount(&self) -> Option<f64> {
        self.product
            .as_ref()
            .map(|p| self.net_weight() * p.unit_price())
    }
}

/// Builder for [`Weighing`].
///
/// Defaults: `qty = 0`, `weight = 0`, no product, no container, no timestamp.
#[derive(Debug, Clone, Default)]
pub struct WeighingBuilder {
    code: u32,
    product: Option<Product>,
    container: Option<Container>,
    qty: u32,
    weight: f64,
    weighed_at: Option<DateTime<Utc>>,
}

impl WeighingBuilder {
    pub fn product(mut self, product: Product) -> Self {
        self.product = Some(product);
        self
    }

    pub fn container(mut self, container: Container) -> Self {
        self.container = Some(container);
        self
    }

    pub fn qty(mut self, qty: u32) -> Self {
        self.qty = qty;
        self
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn weighed_at(mut self, at: DateTime<Utc>) -> Self {
        self.weighed_at = Some(at);
        self
    }

    pub fn build(self) -> Weighing {
        Weighing {
            code: self.code,
            product: self.product,
            container: self.container,
            qty: self.qty,
            weight: self.weight,
            weighed_at: self.weighed_at,
        }
    }
}
