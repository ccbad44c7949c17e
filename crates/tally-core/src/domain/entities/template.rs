//! Template aggregate: a spreadsheet layout whose cells are bound to
//! variables and subtotals.
//!
//! ## Structure
//!
//! ```text
//! Template (Aggregate Root)
//! ├── name                  - validated by NameValidator
//! ├── SpreadsheetFile       - binary payload (xlsx/ods/xls)
//! └── Vec<CellBinding>      - ordered (position, target) pairs
//!      ├── CellPosition     - "B4", "AB100"
//!      └── BindingTarget    - Variable(name) | Subtotal(code)
//! ```
//!
//! Templates are built once through [`TemplateBuilder`] and never mutated.
//! Construction is deliberately tolerant: a missing name or file produces an
//! empty value that [`TemplateValidator`](crate::domain::TemplateValidator)
//! then reports, rather than a construction error.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::{
    error::DomainError,
    value_objects::{CellPosition, SubtotalCode},
};

// ── SpreadsheetFile ───────────────────────────────────────────────────────────

/// Container formats a template file may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    /// ZIP container: Office Open XML (`.xlsx`) or OpenDocument (`.ods`).
    Zip,
    /// OLE2 compound document: legacy Excel (`.xls`).
    Ole2,
}

impl SpreadsheetFormat {
    const ZIP_SIGNATURE: &'static [u8] = b"PK\x03\x04";
    const OLE2_SIGNATURE: &'static [u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

    /// Identify the container by its leading signature.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(Self::ZIP_SIGNATURE) {
            Some(Self::Zip)
        } else if bytes.starts_with(Self::OLE2_SIGNATURE) {
            Some(Self::Ole2)
        } else {
            None
        }
    }
}

impl fmt::Display for SpreadsheetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zip => f.write_str("zip (xlsx/ods)"),
            Self::Ole2 => f.write_str("ole2 (xls)"),
        }
    }
}

/// The binary spreadsheet a template renders into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadsheetFile {
    file_name: String,
    #[serde(serialize_with = "encode_bytes", deserialize_with = "decode_bytes")]
    bytes: Vec<u8>,
}

impl SpreadsheetFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Supported container format, or `None` if empty or unrecognised.
    pub fn format(&self) -> Option<SpreadsheetFormat> {
        SpreadsheetFormat::detect(&self.bytes)
    }
}

fn encode_bytes<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(bytes))
}

fn decode_bytes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    STANDARD
        .decode(encoded.as_bytes())
        .map_err(serde::de::Error::custom)
}

// ── Bindings ──────────────────────────────────────────────────────────────────

/// What a template cell is populated from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingTarget {
    Variable(String),
    Subtotal(SubtotalCode),
}

impl BindingTarget {
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    pub fn references_subtotal(&self, code: SubtotalCode) -> bool {
        matches!(self, Self::Subtotal(c) if *c == code)
    }
}

impl fmt::Display for BindingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(name) => write!(f, "variable '{name}'"),
            Self::Subtotal(code) => write!(f, "subtotal {code}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellBinding {
    position: CellPosition,
    target: BindingTarget,
}

impl CellBinding {
    pub fn new(position: CellPosition, target: BindingTarget) -> Self {
        Self { position, target }
    }

    pub fn position(&self) -> &CellPosition {
        &self.position
    }

    pub fn target(&self) -> &BindingTarget {
        &self.target
    }
}

// ── Template ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    name: String,
    spreadsheet_file: SpreadsheetFile,
    cell_bindings: Vec<CellBinding>,
}

impl Template {
    pub fn builder() -> TemplateBuilder {
        TemplateBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spreadsheet_file(&self) -> &SpreadsheetFile {
        &self.spreadsheet_file
    }

    pub fn cell_bindings(&self) -> &[CellBinding] {
        &self.cell_bindings
    }

    /// Whether any cell of this template is bound directly to `code`.
    pub fn references_subtotal(&self, code: SubtotalCode) -> bool {
        self.cell_bindings
            .iter()
            .any(|b| b.target.references_subtotal(code))
    }

    /// Names of the variables this template binds, in binding order.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.cell_bindings.iter().filter_map(|b| match &b.target {
            BindingTarget::Variable(name) => Some(name.as_str()),
            BindingTarget::Subtotal(_) => None,
        })
    }
}

/// Builder for [`Template`].
///
/// Defaults: empty name, empty spreadsheet file, no bindings.
#[derive(Debug, Default)]
pub struct TemplateBuilder {
    name: Option<String>,
    spreadsheet_file: Option<SpreadsheetFile>,
    cell_bindings: Vec<CellBinding>,
}

impl TemplateBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn spreadsheet_file(mut self, file: SpreadsheetFile) -> Self {
        self.spreadsheet_file = Some(file);
        self
    }

    pub fn bind(mut self, binding: CellBinding) -> Self {
        self.cell_bindings.push(binding);
        self
    }

    /// Bind a cell given as text; fails if the position is malformed.
    pub fn try_bind(
        self,
        position: impl Into<String>,
        target: BindingTarget,
    ) -> Result<Self, DomainError> {
        let position = CellPosition::parse(position)?;
        Ok(self.bind(CellBinding::new(position, target)))
    }

    pub fn build(self) -> Template {
        Template {
            name: self.name.unwrap_or_default(),
            spreadsheet_file: self.spreadsheet_file.unwrap_or_default(),
            cell_bindings: self.cell_bindings,
        }
    }
}
