//! Rules deciding which document templates, variables and subtotals may
//! reference one another, and when a subtotal may be retired.
//!
//! `domain` holds the entities and pure validators. `application` holds the
//! services, the removal resolver and the storage ports they need; adapters
//! for those ports live in `tally-adapters`.
//!
//! ```text
//!  tally-cli ──▶ services ──▶ ports ◀── tally-adapters
//!                   │
//!                   ▼
//!                 domain
//! ```
//!
//! Removing a subtotal never fails with an error for business reasons; the
//! outcome is a [`SubtotalRemovalState`](domain::SubtotalRemovalState):
//!
//! ```rust,ignore
//! use tally_core::prelude::*;
//!
//! let service = SubtotalService::new(Box::new(catalog.clone()), Box::new(catalog));
//! match service.remove(SubtotalCode::new(7), VersionToken::INITIAL)? {
//!     SubtotalRemovalState::Removed => println!("retired"),
//!     other => println!("kept: {other}"),
//! }
//! ```

pub mod application;
pub mod domain;
pub mod error;

/// Everything an adapter or front end usually needs in one import.
pub mod prelude {
    pub use crate::application::{
        SubtotalRemovalResolver, SubtotalService, TemplateService, VariableService,
        ports::{SubtotalStore, TemplateStore, VariableAssociationIndex, VariableStore},
    };
    pub use crate::domain::{
        BindingTarget, CellPosition, NameValidator, PositionValidator, SpreadsheetFile, Subtotal,
        SubtotalCode, SubtotalRemovalState, Template, TemplateValidationState, TemplateValidator,
        Variable, VariableAttribute, VersionToken,
    };
    pub use crate::error::{TallyError, TallyResult};
}
