//! `tally`: keeps spreadsheet document templates, their variables and the
//! subtotals they render consistent with one another.
//!
//! Exit codes:
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! |  0   | Success, including `REMOVED` and `VALID`             |
//! |  1   | Internal or storage failure                          |
//! |  2   | Bad input, rejected removal, rejected template       |
//! |  3   | Unknown subtotal, variable or template (`NOT_FOUND`) |
//! |  4   | Configuration could not be loaded                    |

use std::{io::IsTerminal as _, process::ExitCode};

use clap::Parser;
use tracing::{debug, info, instrument};
use tracing_appender::non_blocking::WorkerGuard;

use crate::{
    cli::{Cli, Commands},
    config::AppConfig,
    error::{CliError, CliResult},
    logging::init_logging,
    output::OutputManager,
};

mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod output;

/// Everything a command needs, produced before dispatch.
struct Session {
    cli: Cli,
    config: AppConfig,
    log_guard: Option<WorkerGuard>,
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let Session {
        cli,
        config,
        log_guard: _log_guard,
    } = match bootstrap() {
        Ok(session) => session,
        Err(code) => return code,
    };

    let output = OutputManager::new(&cli.global, &config);
    let verbose = cli.global.verbose > 0;
    let no_color = cli.global.no_color || config.output.no_color;

    match run(cli, config, output) {
        Ok(()) => {
            info!("Done");
            ExitCode::SUCCESS
        }
        Err(err) => report(err, verbose, no_color),
    }
}

/// Parse arguments, install logging and load configuration, in that order.
/// Failures here happen before a `CliError` can be rendered, so they map
/// straight to an exit code.
fn bootstrap() -> Result<Session, ExitCode> {
    let cli = Cli::try_parse().map_err(|e| {
        let _ = e.print();
        // --help and --version arrive as "errors" printed to stdout.
        if e.use_stderr() {
            ExitCode::from(2)
        } else {
            ExitCode::SUCCESS
        }
    })?;

    let log_guard = init_logging(&cli.global).map_err(|e| {
        eprintln!("Failed to initialise logging: {e:#}");
        ExitCode::from(1)
    })?;
    debug!(global = ?cli.global, "Arguments parsed");

    // `init` may be pointed at a config file it is about to create.
    let config_file = match cli.command {
        Commands::Init(_) => cli.global.config.as_ref().filter(|p| p.exists()),
        _ => cli.global.config.as_ref(),
    };
    let config = AppConfig::load(config_file).map_err(|e| {
        tracing::error!("Failed to load configuration: {e:#}");
        eprintln!("Error: failed to load configuration: {e:#}");
        ExitCode::from(4)
    })?;

    Ok(Session {
        cli,
        config,
        log_guard,
    })
}

#[instrument(skip_all)]
fn run(cli: Cli, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let global = cli.global;
    match cli.command {
        Commands::Subtotal(cmd) => commands::subtotal::execute(cmd, global, config, output),
        Commands::Variable(cmd) => commands::variable::execute(cmd, global, config, output),
        Commands::Template(cmd) => commands::template::execute(cmd, global, config, output),
        Commands::Init(args) => commands::init::execute(args, global, config, output),
        Commands::Config(cmd) => commands::config::execute(cmd, global, config, output),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Log the error, print it to stderr and pick the exit code.
fn report(err: CliError, verbose: bool, no_color: bool) -> ExitCode {
    err.log();

    // stderr survives stdout redirection; colour only when it is a TTY.
    let color = !no_color && std::io::stderr().is_terminal();
    eprint!("{}", err.render(verbose, color));

    ExitCode::from(err.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn clap_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn version_comes_from_cargo() {
        assert_eq!(
            Cli::command().get_version(),
            Some(env!("CARGO_PKG_VERSION"))
        );
    }

    #[test]
    fn every_command_group_is_registered() {
        let cmd = Cli::command();
        let names: Vec<_> = cmd.get_subcommands().map(|c| c.get_name()).collect();
        for expected in ["subtotal", "variable", "template", "init", "config", "completions"] {
            assert!(names.contains(&expected), "missing `{expected}`");
        }
    }

    #[test]
    fn last_output_format_wins() {
        let cli = Cli::try_parse_from([
            "tally",
            "--output-format",
            "plain",
            "--output-format",
            "json",
            "subtotal",
            "list",
        ])
        .unwrap();
        assert_eq!(cli.global.output_format, cli::OutputFormat::Json);
    }

    #[test]
    fn no_color_flag_takes_no_value() {
        let cli = Cli::try_parse_from(["tally", "--no-color", "subtotal", "list"]).unwrap();
        assert!(cli.global.no_color);
    }
}
