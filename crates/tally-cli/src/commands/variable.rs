//! `tally variable`: register and list variables.

use tracing::instrument;

use tally_core::{
    domain::{SubtotalCode, Variable, VariableAttribute},
    error::TallyError,
};

use crate::{
    cli::{GlobalArgs, VariableAddArgs, VariableCommands},
    commands::Catalog,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

pub fn execute(
    cmd: VariableCommands,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let catalog = Catalog::open(&global, &config)?;

    match cmd {
        VariableCommands::List => list(&catalog, &output),
        VariableCommands::Add(args) => add(&catalog, args, &output),
    }
}

fn list(catalog: &Catalog, output: &OutputManager) -> CliResult<()> {
    let mut variables = Vec::new();
    for name in catalog.variables.names()? {
        if let Some(v) = catalog.variables.get(&name)? {
            variables.push(v);
        }
    }

    if output.is_json() {
        output.json(&variables)?;
        return Ok(());
    }

    if variables.is_empty() {
        output.info("No variables registered")?;
        return Ok(());
    }

    output.header("Variables:")?;
    for v in &variables {
        let line = if v.description().is_empty() {
            format!("  {:<24} {}", v.name(), v.attribute())
        } else {
            format!("  {:<24} {:<20} {}", v.name(), v.attribute(), v.description())
        };
        output.print(&line)?;
    }
    Ok(())
}

#[instrument(skip_all, fields(name = %args.name))]
fn add(catalog: &Catalog, args: VariableAddArgs, output: &OutputManager) -> CliResult<()> {
    let attribute = parse_attribute(&args.attribute, args.subtotal)?;

    let mut builder = Variable::builder(&args.name, attribute);
    if let Some(description) = args.description {
        builder = builder.description(description);
    }
    let variable = builder.build();

    catalog.variables.register(variable.clone())?;

    if output.is_json() {
        output.json(&variable)?;
    } else {
        output.success(&format!("Added variable {} ({attribute})", variable.name()))?;
    }
    Ok(())
}

/// Resolve `ATTRIBUTE [--subtotal CODE]` into a [`VariableAttribute`].
///
/// `subtotal --subtotal 7` and `subtotal:7` are equivalent.
fn parse_attribute(raw: &str, subtotal: Option<u32>) -> CliResult<VariableAttribute> {
    let bare_subtotal = raw.trim().eq_ignore_ascii_case("subtotal");

    let attribute = match (bare_subtotal, subtotal) {
        (true, Some(code)) => VariableAttribute::Subtotal(SubtotalCode::new(code)),
        (true, None) => {
            return Err(CliError::InvalidInput {
                message: "attribute 'subtotal' needs --subtotal <CODE>".into(),
                source: None,
            });
        }
        (false, _) => raw.parse::<VariableAttribute>().map_err(|e| CliError::InvalidInput {
            message: format!(
                "unknown attribute '{raw}', expected one of: {}",
                VariableAttribute::NAMES.join(", ")
            ),
            source: Some(Box::new(TallyError::from(e))),
        })?,
    };

    if let Some(code) = subtotal {
        if attribute.subtotal() != Some(SubtotalCode::new(code)) {
            return Err(CliError::InvalidInput {
                message: format!("--subtotal {code} does not match attribute '{attribute}'"),
                source: None,
            });
        }
    }

    Ok(attribute)
}
