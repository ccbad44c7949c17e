pub mod container;
pub mod password;
pub mod product;
pub mod subtotal;
pub mod template;
pub mod variable;
pub mod weighing;

pub use container::{Container, ContainerBuilder};
pub use password::Password;
pub use product::{Product, ProductBuilder};
pub use subtotal::{Subtotal, SubtotalBuilder};
pub use template::{
    BindingTarget, CellBinding, SpreadsheetFile, SpreadsheetFormat, Template, TemplateBuilder,
};
pub use variable::{Variable, VariableBuilder};
pub use weighing::{Weighing, WeighingBuilder};
