//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish use cases
//! like "may this subtotal be removed?" or "register this template".

pub mod subtotal_removal;
pub mod subtotal_service;
pub mod template_service;
pub mod variable_service;

pub use subtotal_removal::SubtotalRemovalResolver;
pub use subtotal_service::SubtotalService;
pub use template_service::TemplateService;
pub use variable_service::VariableService;
