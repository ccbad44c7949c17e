//! Use cases on top of the domain: registering templates and variables,
//! editing subtotals and deciding whether a subtotal may be removed.
//!
//! Nothing here touches a disk. Services talk to storage through the traits
//! in [`ports`].

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::{SubtotalStore, TemplateStore, VariableAssociationIndex, VariableStore};
pub use services::{SubtotalRemovalResolver, SubtotalService, TemplateService, VariableService};
