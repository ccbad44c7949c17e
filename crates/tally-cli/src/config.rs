//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables, `TALLY__<SECTION>__<KEY>`
//!    (e.g. `TALLY__VALIDATION__MAX_NAME_LENGTH=80`)
//! 3. Config file (`--config`, else the platform config directory)
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use tally_core::domain::DEFAULT_MAX_NAME_LENGTH;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the catalog lives.
    pub storage: StorageConfig,
    /// Validation knobs.
    pub validation: ValidationConfig,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Longest accepted template or variable name, in characters.
    pub max_name_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                path: Self::default_store_path(),
            },
            validation: ValidationConfig {
                max_name_length: DEFAULT_MAX_NAME_LENGTH,
            },
            output: OutputConfig {
                no_color: false,
                format: "auto".into(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the file, then `TALLY__*` vars.
    ///
    /// An explicitly given `config_file` must exist; the default location is
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let defaults =
            Config::try_from(&Self::default()).context("Failed to build default configuration")?;

        let (path, required) = match config_file {
            Some(p) => (p.clone(), true),
            None => (Self::config_path(), false),
        };

        Config::builder()
            .add_source(defaults)
            .add_source(File::from(path.as_path()).format(FileFormat::Toml).required(required))
            .add_source(
                Environment::with_prefix("TALLY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from '{}'", path.display()))?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.tally.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "tally", "tally")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".tally.toml"))
    }

    /// Default catalog location in the platform data directory.
    pub fn default_store_path() -> PathBuf {
        directories::ProjectDirs::from("com", "tally", "tally")
            .map(|d| d.data_dir().join("catalog.json"))
            .unwrap_or_else(|| PathBuf::from(".tally").join("catalog.json"))
    }

    /// Catalog path after applying the `--store` override.
    pub fn store_path<'a>(&'a self, cli_override: Option<&'a Path>) -> &'a Path {
        cli_override.unwrap_or(&self.storage.path)
    }
}
