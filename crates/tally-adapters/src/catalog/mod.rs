//! Catalog adapters: one shared state behind all four storage ports.
//!
//! Both adapters keep subtotals, variables and templates together so that
//! associating a subtotal and retiring it are decided under one lock.

mod json_file;
mod memory;
mod state;

pub use json_file::JsonFileCatalog;
pub use memory::InMemoryCatalog;
pub use state::CatalogState;
