//! Subtotals: named percentage adjustments (taxes, discounts, surcharges).

use serde::{Deserialize, Serialize};

use crate::domain::{
    error::DomainError,
    value_objects::{SubtotalCode, VersionToken},
};

/// A percentage adjustment applied to a document total.
///
/// Invariant: `percentage` is finite and `>= 0`. The sign of application
/// comes from `is_discount`, never from the percentage.
///
/// Subtotals are soft-deleted: `is_deleted` marks logical removal and the
/// record stays resolvable so already-issued documents keep rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SubtotalRecord")]
pub struct Subtotal {
    code: SubtotalCode,
    name: String,
    percentage: f64,
    is_discount: bool,
    is_deleted: bool,
    version: VersionToken,
}

/// Stored shape of a [`Subtotal`]; goes through the builder on load.
#[derive(Deserialize)]
struct SubtotalRecord {
    code: SubtotalCode,
    name: String,
    percentage: f64,
    is_discount: bool,
    #[serde(default)]
    is_deleted: bool,
    #[serde(default)]
    version: VersionToken,
}

impl TryFrom<SubtotalRecord> for Subtotal {
    type Error = DomainError;

    fn try_from(record: SubtotalRecord) -> Result<Self, Self::Error> {
        let subtotal = Subtotal::builder(record.code)
            .name(record.name)
            .percentage(record.percentage)
            .discount(record.is_discount)
            .build()?
            .with_version(record.version);
        Ok(if record.is_deleted {
            subtotal.into_deleted()
        } else {
            subtotal
        })
    }
}

impl Subtotal {
    pub fn builder(code: impl Into<SubtotalCode>) -> SubtotalBuilder {
        SubtotalBuilder::new(code.into())
    }

    pub fn code(&self) -> SubtotalCode {
        self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    pub fn is_discount(&self) -> bool {
        self.is_discount
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }

    pub fn version(&self) -> VersionToken {
        self.version
    }

    /// Signed adjustment this subtotal contributes for `amount`.
    pub fn adjustment(&self, amount: f64) -> f64 {
        let magnitude = amount * self.percentage / 100.0;
        if self.is_discount { -magnitude } else { magnitude }
    }

    /// `amount` after applying this subtotal.
    pub fn apply(&self, amount: f64) -> f64 {
        amount + self.adjustment(amount)
    }

    /// Same record at another stored version. Used by stores when persisting.
    #[must_use]
    pub fn with_version(self, version: VersionToken) -> Self {
        Self { version, ..self }
    }

    /// The logically removed form of this record.
    #[must_use]
    pub fn into_deleted(self) -> Self {
        Self {
            is_deleted: true,
            ..self
        }
    }
}

/// Builder for [`Subtotal`].
///
/// Defaults: empty name, `percentage = 0`, `is_discount = false`, active,
/// initial version.
#[derive(Debug, Clone)]
pub struct SubtotalBuilder {
    code: SubtotalCode,
    name: String,
    percentage: f64,
    is_discount: bool,
}

impl SubtotalBuilder {
    fn new(code: SubtotalCode) -> Self {
        Self {
            code,
            name: String::new(),
            percentage: 0.0,
            is_discount: false,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn percentage(mut self, percentage: f64) -> Self {
        self.percentage = percentage;
        self
    }

    pub fn discount(mut self, is_discount: bool) -> Self {
        self.is_discount = is_discount;
        self
    }

    pub fn build(self) -> Result<Subtotal, DomainError> {
        if !self.percentage.is_finite() || self.percentage < 0.0 {
            return Err(DomainError::InvalidPercentage {
                value: self.percentage,
            });
        }

        Ok(Subtotal {
            code: self.code,
            name: self.name,
            percentage: self.percentage,
            is_discount: self.is_discount,
            is_deleted: false,
            version: VersionToken::INITIAL,
        })
    }
}

impl From<&Subtotal> for SubtotalBuilder {
    /// Start an edited copy of an existing subtotal.
    fn from(subtotal: &Subtotal) -> Self {
        Self {
            code: subtotal.code,
            name: subtotal.name.clone(),
            percentage: subtotal.percentage,
            is_discount: subtotal.is_discount,
        }
    }
}
