//! Command handlers.
//!
//! Each handler translates CLI arguments into service calls and renders the
//! result. No business logic lives here.

pub mod completions;
pub mod config;
pub mod init;
pub mod subtotal;
pub mod template;
pub mod variable;

use tracing::debug;

use tally_adapters::JsonFileCatalog;
use tally_core::{
    application::{SubtotalService, TemplateService, VariableService},
    domain::{NameValidator, TemplateValidator},
};

use crate::{cli::GlobalArgs, config::AppConfig, error::CliResult};

/// Services wired to the catalog selected by `--store` / `storage.path`.
pub struct Catalog {
    pub subtotals: SubtotalService,
    pub variables: VariableService,
    pub templates: TemplateService,
}

impl Catalog {
    pub fn open(global: &GlobalArgs, config: &AppConfig) -> CliResult<Self> {
        let path = config.store_path(global.store.as_deref());
        debug!(store = %path.display(), "Opening catalog");

        let store = JsonFileCatalog::open(path)?;
        let names = NameValidator::new(config.validation.max_name_length);

        Ok(Self {
            subtotals: SubtotalService::new(Box::new(store.clone()), Box::new(store.clone())),
            variables: VariableService::new(Box::new(store.clone()), Box::new(store.clone()))
                .with_name_validator(names.clone()),
            templates: TemplateService::new(
                Box::new(store.clone()),
                Box::new(store.clone()),
                Box::new(store),
            )
            .with_validator(TemplateValidator::new(names)),
        })
    }
}

/// Ask the user to confirm a destructive action.
#[cfg(feature = "interactive")]
pub(crate) fn confirm(prompt: &str) -> CliResult<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| crate::error::CliError::IoError {
            message: "failed to read confirmation input".into(),
            source: std::io::Error::other(e),
        })
}

/// Ask the user to confirm a destructive action.
#[cfg(not(feature = "interactive"))]
pub(crate) fn confirm(prompt: &str) -> CliResult<bool> {
    use std::io::{self, Write};

    use crate::error::IntoCli;

    print!("{prompt} [y/N] ");
    io::stdout()
        .flush()
        .with_cli_context(|| "failed to flush stdout")?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .with_cli_context(|| "failed to read confirmation input")?;

    let input = input.trim().to_ascii_lowercase();
    Ok(input == "y" || input == "yes")
}
