//! Filesystem-based template manifest loader.
//!
//! Discovers `template.toml` manifests in a directory tree and turns each
//! into a domain [`Template`], reading the spreadsheet the manifest names.
//!
//! # Directory layout expected
//!
//! ```text
//! templates/
//! ├── invoice-a4/
//! │   ├── template.toml        ← manifest (required)
//! │   └── invoice.xlsx         ← spreadsheet named by `file`
//! └── delivery-note/
//!     ├── template.toml
//!     └── note.xls
//! ```
//!
//! # `template.toml` format
//!
//! ```toml
//! [template]
//! name = "Invoice-A4"
//! file = "invoice.xlsx"        # relative to the manifest
//!
//! [[bindings]]
//! position = "B4"
//! variable = "CLIENT_NAME"
//!
//! [[bindings]]
//! position = "F30"
//! subtotal = 7
//! ```
//!
//! The loader only parses. Name and file checks are left to
//! `TemplateValidator`, binding targets to `TemplateService::register`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use tally_core::{
    domain::{BindingTarget, DomainError, SpreadsheetFile, SubtotalCode, Template},
    error::TallyError,
};

pub const MANIFEST_FILE: &str = "template.toml";

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("templates directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("missing template.toml in '{}'", .0.display())]
    MissingManifest(PathBuf),

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("binding at {position} must name exactly one of `variable` or `subtotal`")]
    AmbiguousBinding { position: String },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<ManifestError> for TallyError {
    fn from(e: ManifestError) -> Self {
        match e {
            ManifestError::Domain(inner) => TallyError::Domain(inner),
            other => TallyError::Configuration {
                message: other.to_string(),
            },
        }
    }
}

// ── Manifest types ────────────────────────────────────────────────────────────

/// Deserialised representation of a `template.toml` file.
#[derive(Debug, Deserialize, Clone)]
pub struct TemplateManifest {
    pub template: TemplateSection,
    #[serde(default)]
    pub bindings: Vec<BindingEntry>,
}

/// `[template]` section.
#[derive(Debug, Deserialize, Clone)]
pub struct TemplateSection {
    /// Display name, e.g. `"Invoice-A4"`. Missing means unnamed.
    #[serde(default)]
    pub name: String,
    /// Spreadsheet path relative to the manifest.
    pub file: String,
}

/// One entry under `[[bindings]]`.
#[derive(Debug, Deserialize, Clone)]
pub struct BindingEntry {
    pub position: String,
    pub variable: Option<String>,
    pub subtotal: Option<u32>,
}

impl BindingEntry {
    fn target(&self) -> Result<BindingTarget, ManifestError> {
        match (&self.variable, self.subtotal) {
            (Some(name), None) => Ok(BindingTarget::variable(name.clone())),
            (None, Some(code)) => Ok(BindingTarget::Subtotal(SubtotalCode::new(code))),
            _ => Err(ManifestError::AmbiguousBinding {
                position: self.position.clone(),
            }),
        }
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Loads [`Template`]s from a directory tree of `template.toml` manifests.
///
/// Every directory below `root` holding a manifest is one template; `root`
/// itself may be a single template directory. Manifests that fail to load
/// emit a `WARN` log and are skipped.
pub struct ManifestLoader {
    root: PathBuf,
}

impl ManifestLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Load every template found under the root.
    ///
    /// # Errors
    ///
    /// Only a missing root is an error; broken manifests are skipped.
    #[instrument(skip(self), fields(dir = %self.root.display()))]
    pub fn load_all(&self) -> Result<Vec<Template>, ManifestError> {
        if !self.root.is_dir() {
            return Err(ManifestError::MissingDirectory(self.root.clone()));
        }

        let mut templates = Vec::new();

        let manifests = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && entry.file_name() == MANIFEST_FILE);

        for entry in manifests {
            let Some(dir) = entry.path().parent() else {
                continue;
            };

            match load_dir(dir) {
                Ok(template) => {
                    debug!(template = %template.name(), "loaded template");
                    templates.push(template);
                }
                Err(e) => {
                    warn!(
                        dir = %dir.display(),
                        error = %e,
                        "skipping template directory due to load error"
                    );
                }
            }
        }

        debug!(count = templates.len(), "finished loading templates");
        Ok(templates)
    }
}

/// Load the single template whose manifest sits in `dir`.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn load_dir(dir: &Path) -> Result<Template, ManifestError> {
    let manifest_path = dir.join(MANIFEST_FILE);
    if !manifest_path.is_file() {
        return Err(ManifestError::MissingManifest(dir.to_path_buf()));
    }

    let raw = fs::read_to_string(&manifest_path).map_err(|source| ManifestError::Io {
        path: manifest_path.clone(),
        source,
    })?;
    let manifest: TemplateManifest =
        toml::from_str(&raw).map_err(|source| ManifestError::Parse {
            path: manifest_path.clone(),
            source,
        })?;

    let file_path = dir.join(&manifest.template.file);
    let bytes = fs::read(&file_path).map_err(|source| ManifestError::Io {
        path: file_path.clone(),
        source,
    })?;
    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| manifest.template.file.clone());

    let mut builder = Template::builder()
        .name(manifest.template.name)
        .spreadsheet_file(SpreadsheetFile::new(file_name, bytes));

    for binding in &manifest.bindings {
        builder = builder.try_bind(binding.position.as_str(), binding.target()?)?;
    }

    Ok(builder.build())
}
