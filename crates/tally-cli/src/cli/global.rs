//! Flags accepted before or after any subcommand.

use std::path::PathBuf;

use clap::{ArgAction, Args, ValueEnum, builder::FalseyValueParser};

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Log more: `-v` info, `-vv` debug (gate decisions, store I/O), `-vvv` trace.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors and requested JSON documents.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Plain symbols, no ANSI colours. Also set by any non-empty `NO_COLOR`
    /// other than `0`, `false`, `no` or `off`.
    #[arg(long, global = true, env = "NO_COLOR", value_parser = FalseyValueParser::new())]
    pub no_color: bool,

    /// Configuration file to load instead of the platform default.
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Catalog file to read and write; overrides `storage.path`.
    #[arg(long, global = true, value_name = "FILE", env = "TALLY_STORE")]
    pub store: Option<PathBuf>,

    /// How results are rendered on stdout. The last occurrence wins.
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Auto,
        overrides_with = "output_format"
    )]
    pub output_format: OutputFormat,

    /// Append log lines to FILE in addition to stderr.
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

/// Rendering of command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `human` on a terminal, `plain` otherwise.
    #[default]
    Auto,
    /// Coloured text with status symbols.
    Human,
    /// Text without colour, for pipes and logs.
    Plain,
    /// One JSON document per command.
    Json,
}
