//! Infrastructure adapters for Tally.
//!
//! This crate implements the ports defined in `tally_core::application::ports`.
//! It contains all storage and filesystem I/O.

pub mod catalog;
pub mod manifest_loader;

// Re-export commonly used adapters
pub use catalog::{CatalogState, InMemoryCatalog, JsonFileCatalog};
pub use manifest_loader::{ManifestError, ManifestLoader};
