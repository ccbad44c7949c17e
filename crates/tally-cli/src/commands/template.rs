//! `tally template`: list, validate and import templates.

use std::path::Path;

use serde::Serialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use tally_adapters::ManifestLoader;
use tally_core::{
    domain::{PositionValidator, Template, TemplateValidationState},
    error::TallyError,
};

use crate::{
    cli::{GlobalArgs, TemplateCommands},
    commands::Catalog,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

pub fn execute(
    cmd: TemplateCommands,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    // Position checks need no catalog.
    if let TemplateCommands::CheckPosition { position } = &cmd {
        return check_position(position, &output);
    }

    let catalog = Catalog::open(&global, &config)?;

    match cmd {
        TemplateCommands::List => list(&catalog, &output),
        TemplateCommands::Validate { name } => validate(&catalog, &name, &output),
        TemplateCommands::Import { dir } => import(&catalog, &dir, &output),
        TemplateCommands::CheckPosition { .. } => Ok(()),
    }
}

/// Listing row; the spreadsheet payload itself is never printed.
#[derive(Debug, Serialize)]
struct TemplateSummary {
    name: String,
    file: String,
    format: Option<String>,
    size: usize,
    bindings: Vec<(String, String)>,
}

impl From<&Template> for TemplateSummary {
    fn from(t: &Template) -> Self {
        let file = t.spreadsheet_file();
        Self {
            name: t.name().to_owned(),
            file: file.file_name().to_owned(),
            format: file.format().map(|f| f.to_string()),
            size: file.len(),
            bindings: t
                .cell_bindings()
                .iter()
                .map(|b| (b.position().to_string(), b.target().to_string()))
                .collect(),
        }
    }
}

fn list(catalog: &Catalog, output: &OutputManager) -> CliResult<()> {
    let mut rows = Vec::new();
    for name in catalog.templates.names()? {
        if let Some(t) = catalog.templates.get(&name)? {
            rows.push(TemplateSummary::from(&t));
        }
    }

    if output.is_json() {
        output.json(&rows)?;
        return Ok(());
    }

    if rows.is_empty() {
        output.info("No templates registered")?;
        return Ok(());
    }

    output.header("Templates:")?;
    for row in &rows {
        output.print(&format!(
            "  {:<24} {:<24} {} binding(s)",
            row.name,
            row.file,
            row.bindings.len()
        ))?;
        for (position, target) in &row.bindings {
            output.print(&format!("      {position:<6} -> {target}"))?;
        }
    }
    Ok(())
}

#[instrument(skip(catalog, output))]
fn validate(catalog: &Catalog, name: &str, output: &OutputManager) -> CliResult<()> {
    let state = catalog
        .templates
        .validate_named(name)?
        .ok_or_else(|| CliError::NotFound {
            kind: "Template",
            key: name.to_owned(),
        })?;

    if output.is_json() {
        output.json(&json!({ "name": name, "outcome": state }))?;
    }

    if state.is_valid() {
        if !output.is_json() {
            output.success(&format!("Template '{name}' is {state}"))?;
        }
        Ok(())
    } else {
        Err(CliError::TemplateRejected {
            name: name.to_owned(),
            outcome: state,
        })
    }
}

/// Register every manifest under `dir`. Rejected templates are reported and
/// the first rejection becomes the command's error after the rest are tried.
#[instrument(skip(catalog, output), fields(dir = %dir.display()))]
fn import(catalog: &Catalog, dir: &Path, output: &OutputManager) -> CliResult<()> {
    let templates = ManifestLoader::new(dir)
        .load_all()
        .map_err(TallyError::from)?;

    if templates.is_empty() {
        output.warning(&format!("No template manifests found in {}", dir.display()))?;
        return Ok(());
    }

    let mut results = Vec::with_capacity(templates.len());
    let mut first_rejection: Option<(String, TemplateValidationState)> = None;

    for template in templates {
        let name = template.name().to_owned();
        let state = catalog.templates.register(template)?;

        if state.is_valid() {
            info!(template = %name, "Imported");
            if !output.is_json() {
                output.success(&format!("Imported '{name}'"))?;
            }
        } else {
            warn!(template = %name, %state, "Rejected");
            if !output.is_json() {
                output.error(&format!("Rejected '{name}': {state}"))?;
            }
            first_rejection.get_or_insert((name.clone(), state));
        }
        results.push(json!({ "name": name, "outcome": state }));
    }

    if output.is_json() {
        output.json(&results)?;
    }

    match first_rejection {
        Some((name, outcome)) => Err(CliError::TemplateRejected { name, outcome }),
        None => Ok(()),
    }
}

fn check_position(position: &str, output: &OutputManager) -> CliResult<()> {
    let valid = PositionValidator::shared().is_valid(position);

    if output.is_json() {
        output.json(&json!({ "position": position, "valid": valid }))?;
    } else if valid {
        output.success(&format!("'{position}' is a valid cell position"))?;
    }

    if valid {
        Ok(())
    } else {
        Err(CliError::InvalidPosition {
            position: position.to_owned(),
        })
    }
}
