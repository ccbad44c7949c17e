//! Domain value objects: codes, version tokens, cell positions, variable
//! attributes, and the two outcome enums returned by the engine.
//!
//! # Design
//!
//! These are pure value types with equality-by-value and no identity. The
//! outcome enums (`TemplateValidationState`, `SubtotalRemovalState`) are the
//! engine's answers to callers; they are returned, never raised.

use crate::domain::{error::DomainError, validation::PositionValidator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── SubtotalCode ──────────────────────────────────────────────────────────────

/// Identifier of a subtotal, as shown on documents and used by bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubtotalCode(u32);

impl SubtotalCode {
    pub const fn new(code: u32) -> Self {
        Self(code)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for SubtotalCode {
    fn from(code: u32) -> Self {
        Self(code)
    }
}

impl fmt::Display for SubtotalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubtotalCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| DomainError::MissingRequiredField { field: "code" })
    }
}

// ── VersionToken ──────────────────────────────────────────────────────────────

/// Staleness token of a persisted record.
///
/// Bumped by the store on every persisted change. A writer that presents an
/// older token than the stored one is working from a stale snapshot.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VersionToken(u64);

impl VersionToken {
    pub const INITIAL: Self = Self(0);

    pub const fn new(version: u64) -> Self {
        Self(version)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// The token that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

// ── CellPosition ──────────────────────────────────────────────────────────────

/// A spreadsheet cell reference such as `B4` or `AB100`.
///
/// Invariant: always matches the position grammar. Enforced at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellPosition(String);

impl CellPosition {
    pub fn parse(position: impl Into<String>) -> Result<Self, DomainError> {
        let position = position.into();
        if PositionValidator::shared().is_valid(position.as_str()) {
            Ok(Self(position))
        } else {
            Err(DomainError::InvalidPosition { position })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Column letters of the reference (`"AB"` for `"AB100"`).
    pub fn column(&self) -> &str {
        let split = self
            .0
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(self.0.len());
        &self.0[..split]
    }

    /// One-based row number of the reference, `None` when it overflows `u32`.
    pub fn row(&self) -> Option<u32> {
        self.0[self.column().len()..].parse().ok()
    }
}

impl TryFrom<String> for CellPosition {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CellPosition> for String {
    fn from(position: CellPosition) -> Self {
        position.0
    }
}

impl fmt::Display for CellPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── VariableAttribute ─────────────────────────────────────────────────────────

/// The document field a variable binds to.
///
/// `Subtotal` is the only attribute carrying a reference: the variable renders
/// the amount of that subtotal, which associates the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariableAttribute {
    DocumentNumber,
    DocumentDate,
    ClientName,
    ClientTaxId,
    ClientAddress,
    ProductCode,
    ProductName,
    Quantity,
    Weight,
    NetWeight,
    UnitPrice,
    LineTotal,
    TaxableBase,
    Subtotal(SubtotalCode),
    GrandTotal,
}

impl VariableAttribute {
    /// Every attribute name accepted by [`FromStr`], for help output.
    pub const NAMES: &'static [&'static str] = &[
        "document-number",
        "document-date",
        "client-name",
        "client-tax-id",
        "client-address",
        "product-code",
        "product-name",
        "quantity",
        "weight",
        "net-weight",
        "unit-price",
        "line-total",
        "taxable-base",
        "subtotal:<code>",
        "grand-total",
    ];

    /// The subtotal this attribute renders, if any.
    pub const fn subtotal(&self) -> Option<SubtotalCode> {
        match self {
            Self::Subtotal(code) => Some(*code),
            _ => None,
        }
    }

    pub const fn references(&self, code: SubtotalCode) -> bool {
        matches!(self, Self::Subtotal(c) if c.0 == code.0)
    }
}

impl fmt::Display for VariableAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DocumentNumber => "document-number",
            Self::DocumentDate => "document-date",
            Self::ClientName => "client-name",
            Self::ClientTaxId => "client-tax-id",
            Self::ClientAddress => "client-address",
            Self::ProductCode => "product-code",
            Self::ProductName => "product-name",
            Self::Quantity => "quantity",
            Self::Weight => "weight",
            Self::NetWeight => "net-weight",
            Self::UnitPrice => "unit-price",
            Self::LineTotal => "line-total",
            Self::TaxableBase => "taxable-base",
            Self::Subtotal(code) => return write!(f, "subtotal:{code}"),
            Self::GrandTotal => "grand-total",
        };
        f.write_str(name)
    }
}

impl FromStr for VariableAttribute {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        if let Some(code) = normalized.strip_prefix("subtotal:") {
            return code
                .parse::<u32>()
                .map(|c| Self::Subtotal(SubtotalCode(c)))
                .map_err(|_| DomainError::UnknownAttribute(s.to_string()));
        }
        match normalized.as_str() {
            "document-number" => Ok(Self::DocumentNumber),
            "document-date" => Ok(Self::DocumentDate),
            "client-name" => Ok(Self::ClientName),
            "client-tax-id" => Ok(Self::ClientTaxId),
            "client-address" => Ok(Self::ClientAddress),
            "product-code" => Ok(Self::ProductCode),
            "product-name" => Ok(Self::ProductName),
            "quantity" | "qty" => Ok(Self::Quantity),
            "weight" => Ok(Self::Weight),
            "net-weight" => Ok(Self::NetWeight),
            "unit-price" | "price" => Ok(Self::UnitPrice),
            "line-total" => Ok(Self::LineTotal),
            "taxable-base" => Ok(Self::TaxableBase),
            "grand-total" | "total" => Ok(Self::GrandTotal),
            _ => Err(DomainError::UnknownAttribute(s.to_string())),
        }
    }
}

// ── Outcomes ──────────────────────────────────────────────────────────────────

/// Verdict of template validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateValidationState {
    Valid,
    InvalidName,
    InvalidFile,
}

impl TemplateValidationState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "VALID",
            Self::InvalidName => "INVALID_NAME",
            Self::InvalidFile => "INVALID_FILE",
        }
    }

    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl fmt::Display for TemplateValidationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of asking to remove a subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubtotalRemovalState {
    Removed,
    AssociatedWithVariable,
    NotUpdated,
    NotFound,
}

impl SubtotalRemovalState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Removed => "REMOVED",
            Self::AssociatedWithVariable => "ASSOCIATED_WITH_VARIABLE",
            Self::NotUpdated => "NOT_UPDATED",
            Self::NotFound => "NOT_FOUND",
        }
    }

    pub const fn is_removed(&self) -> bool {
        matches!(self, Self::Removed)
    }
}

impl fmt::Display for SubtotalRemovalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
