//! `tally init`: write a default configuration and an empty catalog.

use std::path::Path;

use tally_adapters::{CatalogState, JsonFileCatalog};

use crate::{
    cli::{GlobalArgs, InitArgs},
    config::AppConfig,
    error::{CliResult, IntoCli},
    output::OutputManager,
};

/// Create the config file (unless present) and the catalog file (if missing).
pub fn execute(
    args: InitArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    output.info("Initialising tally...")?;

    let config_path = global.config.clone().unwrap_or_else(AppConfig::config_path);
    write_config(&config_path, args.force, &output)?;

    let store_path = config.store_path(global.store.as_deref());
    create_catalog(store_path, &output)?;

    Ok(())
}

fn write_config(path: &Path, force: bool, output: &OutputManager) -> CliResult<()> {
    if path.exists() && !force {
        output.warning(&format!(
            "Config already exists at {}  (use --force to overwrite)",
            path.display(),
        ))?;
        return Ok(());
    }

    let toml = toml::to_string_pretty(&AppConfig::default())
        .with_cli_context(|| "Failed to serialise default config")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_cli_context(|| {
            format!("Failed to create config directory '{}'", parent.display())
        })?;
    }

    std::fs::write(path, toml)
        .with_cli_context(|| format!("Failed to write config to '{}'", path.display()))?;

    output.success(&format!("Configuration created at {}", path.display()))?;
    Ok(())
}

fn create_catalog(path: &Path, output: &OutputManager) -> CliResult<()> {
    if path.exists() {
        output.info(&format!("Catalog already present at {}", path.display()))?;
        return Ok(());
    }

    JsonFileCatalog::open(path)?.save(&CatalogState::new())?;

    output.success(&format!("Empty catalog created at {}", path.display()))?;
    Ok(())
}
