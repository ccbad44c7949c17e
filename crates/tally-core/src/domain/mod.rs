// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Tally.
//!
//! This module contains pure business logic. All storage concerns are handled
//! via ports (traits) defined in the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or database calls
//! - **Immutable entities**: built once through builders, read via accessors
//! - **Outcomes are values**: validation and removal verdicts are enums
//!
// Public API - what the world sees
pub mod entities;
pub mod error;
pub mod value_objects;

mod validation;

// Re-exports for convenience
pub use entities::{
    BindingTarget, CellBinding, Container, ContainerBuilder, Password, Product, ProductBuilder,
    SpreadsheetFile, SpreadsheetFormat, Subtotal, SubtotalBuilder, Template, TemplateBuilder,
    Variable, VariableBuilder, Weighing, WeighingBuilder,
};

pub use error::{DomainError, ErrorCategory};

pub use value_objects::{
    CellPosition, SubtotalCode, SubtotalRemovalState, TemplateValidationState, VariableAttribute,
    VersionToken,
};

pub use validation::{
    DEFAULT_MAX_NAME_LENGTH, NameValidator, PositionValidator, RegexMatcher, TemplateValidator,
};
