//! JSON-file catalog: the in-memory catalog, persisted after every write.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tally_core::{
    application::{
        ApplicationError,
        ports::{SubtotalStore, TemplateStore, VariableAssociationIndex, VariableStore},
    },
    domain::{Subtotal, SubtotalCode, Template, Variable, VersionToken},
    error::{Context as _, TallyResult},
};
use tracing::{debug, instrument};

use super::{CatalogState, InMemoryCatalog};

/// Catalog stored as one JSON document.
///
/// The file is read once on [`open`](Self::open). Each write goes to a
/// sibling temp file which then replaces the document, so a crash never
/// leaves a half-written catalog behind. The in-memory state only changes
/// after the file was written.
#[derive(Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
    memory: InMemoryCatalog,
}

impl JsonFileCatalog {
    /// Open the catalog at `path`. A missing file is an empty catalog.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> TallyResult<Self> {
        let path = path.as_ref().to_path_buf();

        let state = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str::<CatalogState>(&raw)
                .storage_context(|| format!("parse catalog '{}'", path.display()))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("catalog file missing, starting empty");
                CatalogState::new()
            }
            Err(e) => {
                return Err(e).storage_context(|| format!("read '{}'", path.display()));
            }
        };

        Ok(Self {
            path,
            memory: InMemoryCatalog::from_state(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `state` to disk unconditionally, e.g. to create a fresh file.
    pub fn save(&self, state: &CatalogState) -> TallyResult<()> {
        write_atomically(&self.path, state)
    }

    fn write<T>(
        &self,
        change: impl FnOnce(&mut CatalogState) -> Result<T, ApplicationError>,
    ) -> TallyResult<T> {
        self.memory
            .commit(change, |next| write_atomically(&self.path, next))
    }
}

fn write_atomically(path: &Path, state: &CatalogState) -> TallyResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .storage_context(|| format!("create directory '{}'", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(state).storage_context(|| "encode catalog")?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, json).storage_context(|| format!("write '{}'", tmp.display()))?;
    fs::rename(&tmp, path).storage_context(|| format!("replace '{}'", path.display()))?;

    debug!(path = %path.display(), "catalog saved");
    Ok(())
}

impl SubtotalStore for JsonFileCatalog {
    fn find_by_code(&self, code: SubtotalCode) -> TallyResult<Option<Subtotal>> {
        self.memory.find_by_code(code)
    }

    fn insert_subtotal(&self, subtotal: Subtotal) -> TallyResult<Subtotal> {
        self.write(|s| s.insert_subtotal(subtotal))
    }

    fn update_subtotal(&self, subtotal: Subtotal, expected: VersionToken) -> TallyResult<bool> {
        self.write(|s| Ok(s.update_subtotal(subtotal, expected)))
    }

    fn soft_delete(&self, code: SubtotalCode, expected: VersionToken) -> TallyResult<bool> {
        self.write(|s| Ok(s.soft_delete(code, expected)))
    }

    fn list_active_codes(&self) -> TallyResult<Vec<SubtotalCode>> {
        self.memory.list_active_codes()
    }

    fn list_subtotals(&self) -> TallyResult<Vec<Subtotal>> {
        self.memory.list_subtotals()
    }
}

impl VariableAssociationIndex for JsonFileCatalog {
    fn is_subtotal_referenced(&self, code: SubtotalCode) -> TallyResult<bool> {
        self.memory.is_subtotal_referenced(code)
    }
}

impl TemplateStore for JsonFileCatalog {
    fn register_template(&self, template: Template) -> TallyResult<()> {
        self.write(|s| s.register_template(template))
    }

    fn find_template(&self, name: &str) -> TallyResult<Option<Template>> {
        self.memory.find_template(name)
    }

    fn template_names(&self) -> TallyResult<Vec<String>> {
        self.memory.template_names()
    }
}

impl VariableStore for JsonFileCatalog {
    fn register_variable(&self, variable: Variable) -> TallyResult<()> {
        self.write(|s| s.register_variable(variable))
    }

    fn find_variable(&self, name: &str) -> TallyResult<Option<Variable>> {
        self.memory.find_variable(name)
    }

    fn variable_names(&self) -> TallyResult<Vec<String>> {
        self.memory.variable_names()
    }
}
