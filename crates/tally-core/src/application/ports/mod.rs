//! Storage collaborators the services depend on.
//!
//! Every write that can race takes the caller's [`VersionToken`] and returns
//! `false` instead of an error when the stored token has moved on.
//!
//! [`VersionToken`]: crate::domain::VersionToken

pub mod output;

pub use output::{SubtotalStore, TemplateStore, VariableAssociationIndex, VariableStore};
