//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "tally",
    bin_name = "tally",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Keep invoice templates, variables and subtotals consistent",
    long_about = "Tally manages the catalog behind spreadsheet document templates: \
                  which cells bind to which variables, which variables carry which \
                  subtotals, and when a subtotal can safely be retired.",
    after_help = "EXAMPLES:\n\
        \x20 tally subtotal add 7 VAT 21\n\
        \x20 tally subtotal remove 7 --expect-version 0 --yes\n\
        \x20 tally template import ./templates\n\
        \x20 tally template check-position AB100",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage subtotals (taxes, discounts, surcharges).
    #[command(
        subcommand,
        visible_alias = "st",
        about = "Manage subtotals",
        after_help = "EXAMPLES:\n\
            \x20 tally subtotal list --all\n\
            \x20 tally subtotal add 9 \"Early payment\" 5 --discount\n\
            \x20 tally subtotal update 9 --expect-version 0 --percentage 7.5\n\
            \x20 tally subtotal apply 7 100"
    )]
    Subtotal(SubtotalCommands),

    /// Manage variables.
    #[command(
        subcommand,
        visible_alias = "var",
        about = "Manage variables",
        after_help = "EXAMPLES:\n\
            \x20 tally variable add CLIENT_NAME client-name\n\
            \x20 tally variable add TOTAL_DISCOUNT subtotal --subtotal 9"
    )]
    Variable(VariableCommands),

    /// Manage templates.
    #[command(
        subcommand,
        visible_alias = "tpl",
        about = "Manage templates",
        after_help = "EXAMPLES:\n\
            \x20 tally template import ./templates\n\
            \x20 tally template validate Invoice-A4\n\
            \x20 tally template check-position F30"
    )]
    Template(TemplateCommands),

    /// Initialise a Tally configuration file and catalog.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 tally init\n\
            \x20 tally init --force"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 tally completions bash > ~/.local/share/bash-completion/completions/tally\n\
            \x20 tally completions zsh  > ~/.zfunc/_tally\n\
            \x20 tally completions fish > ~/.config/fish/completions/tally.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Tally configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 tally config get storage.path\n\
            \x20 tally config list\n\
            \x20 tally config path"
    )]
    Config(ConfigCommands),
}

// ── subtotal ──────────────────────────────────────────────────────────────────

/// Subcommands for `tally subtotal`.
#[derive(Debug, Subcommand)]
pub enum SubtotalCommands {
    /// List subtotals.
    #[command(visible_alias = "ls")]
    List(SubtotalListArgs),
    /// Show one subtotal, including its version.
    Show(SubtotalCodeArgs),
    /// Register a new subtotal.
    Add(SubtotalAddArgs),
    /// Change a subtotal, if nobody changed it since you read it.
    Update(SubtotalUpdateArgs),
    /// Retire a subtotal that nothing references anymore.
    #[command(visible_alias = "rm")]
    Remove(SubtotalRemoveArgs),
    /// Apply a subtotal to an amount.
    Apply(SubtotalApplyArgs),
}

#[derive(Debug, Args)]
pub struct SubtotalListArgs {
    /// Include removed subtotals.
    #[arg(long = "all", help = "Include removed subtotals")]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct SubtotalCodeArgs {
    #[arg(value_name = "CODE", help = "Subtotal code")]
    pub code: u32,
}

#[derive(Debug, Args)]
pub struct SubtotalAddArgs {
    #[arg(value_name = "CODE", help = "Subtotal code")]
    pub code: u32,

    #[arg(value_name = "NAME", help = "Display name, e.g. VAT")]
    pub name: String,

    #[arg(value_name = "PERCENT", help = "Percentage, e.g. 21 or 7.5")]
    pub percentage: f64,

    /// Subtract instead of add when applied.
    #[arg(long = "discount", help = "Treat as a discount")]
    pub discount: bool,
}

#[derive(Debug, Args)]
pub struct SubtotalUpdateArgs {
    #[arg(value_name = "CODE", help = "Subtotal code")]
    pub code: u32,

    /// Version the caller last saw (`tally subtotal show CODE`).
    #[arg(long = "expect-version", value_name = "N", help = "Version you last saw")]
    pub expect_version: u64,

    #[arg(long = "name", value_name = "NAME", help = "New display name")]
    pub name: Option<String>,

    #[arg(long = "percentage", value_name = "PERCENT", help = "New percentage")]
    pub percentage: Option<f64>,

    #[arg(
        long = "discount",
        value_name = "BOOL",
        action = clap::ArgAction::Set,
        help = "Whether it is a discount (true/false)"
    )]
    pub discount: Option<bool>,
}

#[derive(Debug, Args)]
pub struct SubtotalRemoveArgs {
    #[arg(value_name = "CODE", help = "Subtotal code")]
    pub code: u32,

    #[arg(long = "expect-version", value_name = "N", help = "Version you last saw")]
    pub expect_version: u64,

    /// Skip the confirmation prompt.
    #[arg(short = 'y', long = "yes", help = "Skip confirmation")]
    pub yes: bool,
}

#[derive(Debug, Args)]
pub struct SubtotalApplyArgs {
    #[arg(value_name = "CODE", help = "Subtotal code")]
    pub code: u32,

    #[arg(value_name = "AMOUNT", allow_negative_numbers = true, help = "Amount to adjust")]
    pub amount: f64,
}

// ── variable ──────────────────────────────────────────────────────────────────

/// Subcommands for `tally variable`.
#[derive(Debug, Subcommand)]
pub enum VariableCommands {
    /// List registered variables.
    #[command(visible_alias = "ls")]
    List,
    /// Register a variable.
    Add(VariableAddArgs),
}

#[derive(Debug, Args)]
pub struct VariableAddArgs {
    #[arg(value_name = "NAME", help = "Variable name, e.g. CLIENT_NAME")]
    pub name: String,

    /// Document field, e.g. `client-name`, `grand-total`, `subtotal`.
    #[arg(value_name = "ATTRIBUTE", help = "Document field the variable binds to")]
    pub attribute: String,

    /// Required when ATTRIBUTE is `subtotal`.
    #[arg(long = "subtotal", value_name = "CODE", help = "Subtotal code to render")]
    pub subtotal: Option<u32>,

    #[arg(long = "description", value_name = "TEXT", help = "Free-form description")]
    pub description: Option<String>,
}

// ── template ──────────────────────────────────────────────────────────────────

/// Subcommands for `tally template`.
#[derive(Debug, Subcommand)]
pub enum TemplateCommands {
    /// List registered templates.
    #[command(visible_alias = "ls")]
    List,
    /// Validate a registered template.
    Validate {
        #[arg(value_name = "NAME", help = "Template name")]
        name: String,
    },
    /// Register templates from `template.toml` manifests.
    Import {
        #[arg(value_name = "DIR", help = "Directory holding template manifests")]
        dir: PathBuf,
    },
    /// Check a cell position such as `B4` or `AB100`.
    CheckPosition {
        #[arg(value_name = "POSITION", help = "Cell position")]
        position: String,
    },
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `tally init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `tally completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `tally config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `storage.path`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
