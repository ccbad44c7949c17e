//! `tally subtotal`: subtotal management and removal.

use std::io::IsTerminal as _;

use serde_json::json;
use tracing::{debug, instrument};

use tally_core::domain::{
    Subtotal, SubtotalBuilder, SubtotalCode, SubtotalRemovalState, VersionToken,
};

use crate::{
    cli::{
        GlobalArgs, SubtotalAddArgs, SubtotalApplyArgs, SubtotalCommands, SubtotalRemoveArgs,
        SubtotalUpdateArgs,
    },
    commands::{Catalog, confirm},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Dispatch to the correct subtotal subcommand.
pub fn execute(
    cmd: SubtotalCommands,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let catalog = Catalog::open(&global, &config)?;

    match cmd {
        SubtotalCommands::List(args) => list(&catalog, args.all, &output),
        SubtotalCommands::Show(args) => show(&catalog, args.code, &output),
        SubtotalCommands::Add(args) => add(&catalog, args, &output),
        SubtotalCommands::Update(args) => update(&catalog, args, &output),
        SubtotalCommands::Remove(args) => remove(&catalog, args, &global, &output),
        SubtotalCommands::Apply(args) => apply(&catalog, args, &output),
    }
}

fn list(catalog: &Catalog, all: bool, output: &OutputManager) -> CliResult<()> {
    let subtotals = catalog.subtotals.list(all)?;

    if output.is_json() {
        output.json(&subtotals)?;
        return Ok(());
    }

    if subtotals.is_empty() {
        output.info("No subtotals registered")?;
        return Ok(());
    }

    output.header("Subtotals:")?;
    for s in &subtotals {
        output.print(&format!("  {}", describe(s)))?;
    }
    Ok(())
}

fn show(catalog: &Catalog, code: u32, output: &OutputManager) -> CliResult<()> {
    let subtotal = find(catalog, code)?;

    if output.is_json() {
        output.json(&subtotal)?;
        return Ok(());
    }

    output.header(&format!("Subtotal {}", subtotal.code()))?;
    output.print(&format!("  Name:       {}", subtotal.name()))?;
    output.print(&format!("  Percentage: {}%", subtotal.percentage()))?;
    output.print(&format!("  Kind:       {}", kind(&subtotal)))?;
    output.print(&format!(
        "  Status:     {}",
        if subtotal.is_deleted() { "removed" } else { "active" }
    ))?;
    output.print(&format!("  Version:    {}", subtotal.version().get()))?;
    Ok(())
}

#[instrument(skip_all, fields(code = args.code))]
fn add(catalog: &Catalog, args: SubtotalAddArgs, output: &OutputManager) -> CliResult<()> {
    let subtotal = Subtotal::builder(args.code)
        .name(args.name)
        .percentage(args.percentage)
        .discount(args.discount)
        .build()
        .map_err(tally_core::error::TallyError::from)?;

    let stored = catalog.subtotals.register(subtotal)?;

    if output.is_json() {
        output.json(&stored)?;
    } else {
        output.success(&format!("Added {}", describe(&stored)))?;
    }
    Ok(())
}

#[instrument(skip_all, fields(code = args.code, expected = args.expect_version))]
fn update(catalog: &Catalog, args: SubtotalUpdateArgs, output: &OutputManager) -> CliResult<()> {
    let current = find(catalog, args.code)?;

    let mut builder = SubtotalBuilder::from(&current);
    if let Some(name) = args.name {
        builder = builder.name(name);
    }
    if let Some(percentage) = args.percentage {
        builder = builder.percentage(percentage);
    }
    if let Some(discount) = args.discount {
        builder = builder.discount(discount);
    }
    let edited = builder.build().map_err(tally_core::error::TallyError::from)?;

    let expected = VersionToken::new(args.expect_version);
    if !catalog.subtotals.update(edited, expected)? {
        return Err(CliError::StaleVersion {
            code: args.code,
            expected: args.expect_version,
        });
    }

    let stored = find(catalog, args.code)?;
    if output.is_json() {
        output.json(&stored)?;
    } else {
        output.success(&format!("Updated {}", describe(&stored)))?;
    }
    Ok(())
}

#[instrument(skip_all, fields(code = args.code, expected = args.expect_version))]
fn remove(
    catalog: &Catalog,
    args: SubtotalRemoveArgs,
    global: &GlobalArgs,
    output: &OutputManager,
) -> CliResult<()> {
    let interactive = std::io::stdin().is_terminal() && !output.is_json();
    let ask = !args.yes && !global.quiet && interactive;
    if ask && !confirm(&format!("Remove subtotal {}?", args.code))? {
        return Err(CliError::Cancelled);
    }

    let code = SubtotalCode::new(args.code);
    let outcome = catalog
        .subtotals
        .remove(code, VersionToken::new(args.expect_version))?;
    debug!(%outcome, "Removal resolved");

    if output.is_json() {
        output.json(&json!({ "code": args.code, "outcome": outcome }))?;
    }

    match outcome {
        SubtotalRemovalState::Removed => {
            if !output.is_json() {
                output.success(&format!("Subtotal {code} removed ({outcome})"))?;
            }
            Ok(())
        }
        outcome => Err(CliError::RemovalRejected {
            code: args.code,
            outcome,
        }),
    }
}

fn apply(catalog: &Catalog, args: SubtotalApplyArgs, output: &OutputManager) -> CliResult<()> {
    let code = SubtotalCode::new(args.code);
    let result = catalog.subtotals.apply(code, args.amount)?;

    if output.is_json() {
        output.json(&json!({ "code": args.code, "amount": args.amount, "result": result }))?;
    } else {
        // Plain number so the value can be piped.
        output.print(&format!("{result}"))?;
    }
    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn find(catalog: &Catalog, code: u32) -> CliResult<Subtotal> {
    catalog
        .subtotals
        .get(SubtotalCode::new(code))?
        .ok_or_else(|| CliError::NotFound {
            kind: "Subtotal",
            key: code.to_string(),
        })
}

fn kind(s: &Subtotal) -> &'static str {
    if s.is_discount() { "discount" } else { "surcharge" }
}

fn describe(s: &Subtotal) -> String {
    let mut line = format!(
        "{:>4}  {:<20} {:>6}%  {:<9} v{}",
        s.code().get(),
        s.name(),
        s.percentage(),
        kind(s),
        s.version().get()
    );
    if s.is_deleted() {
        line.push_str("  (removed)");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_marks_removed() {
        let s = Subtotal::builder(7)
            .name("VAT")
            .percentage(21.0)
            .build()
            .unwrap();
        assert!(!describe(&s).contains("removed"));
        assert!(describe(&s.into_deleted()).contains("(removed)"));
    }

    #[test]
    fn kind_follows_discount_flag() {
        let d = Subtotal::builder(9).discount(true).build().unwrap();
        assert_eq!(kind(&d), "discount");
    }
}
