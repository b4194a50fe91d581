//! The `verdict` command-line driver.
//!
//! This module is the process driver: it parses arguments, runs the
//! requested operation behind the catch boundary and turns the result into
//! a process exit status. An [`Exit`] raised anywhere ends the run right
//! here, before any summary is printed.

use std::process;
use std::sync::Once;

use clap::Parser;
use miette::{Diagnostic, Report};
use thiserror::Error;

use crate::boundary::{run_phase, silence_interrupt_panics, ExitCode, Phase, Tally};
use crate::cli::args::{Command, RegistryArgs, VerdictArgs};
use crate::config::{ConfigError, DriverConfig};
use crate::errors::Interrupt;
use crate::importer::{importorskip_with, ImportFilter, ImportOrSkip, ModuleLoader};
use crate::raise::{caught, exit_with, ExitOptions};
use crate::signal::{Exit, SourceLocation};

pub mod args;
pub mod output;

/// Everything that can end a driver run early.
#[derive(Debug, Error, Diagnostic)]
enum DriverError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Interrupt(#[from] Interrupt),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to write output")]
    #[diagnostic(code(verdict::io))]
    Io(#[from] std::io::Error),
}

static TRACING_INIT: Once = Once::new();

/// Installs the `tracing` subscriber. The filter comes from `VERDICT_LOG`
/// and defaults to `warn`, so deprecation warnings are always shown.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = EnvFilter::try_from_env("VERDICT_LOG")
            .unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(filter)
            .init();
    });
}

/// The main entry point for the CLI.
pub fn run() {
    let args = VerdictArgs::parse();
    init_tracing();
    silence_interrupt_panics();

    let mut config = DriverConfig::default();
    if args.no_color {
        config.use_colors = false;
    }

    // Dispatch to the appropriate subcommand handler.
    let result = match args.command {
        Command::Probe {
            module,
            min_version,
            reason,
            not_found_only,
            json,
            registry,
        } => {
            config.registry = registry.registry;
            config.json = json;
            let catch = if not_found_only {
                ImportFilter::ModuleNotFound
            } else {
                ImportFilter::AnyImportError
            };
            let request = ImportOrSkip {
                module_name: module,
                min_version,
                reason,
                catch,
            };
            handle_probe(request, &config)
        }
        Command::Modules { registry } => handle_modules(registry, config),
        Command::Exit { reason, code, msg } => handle_exit(ExitOptions {
            reason,
            return_code: code,
            msg,
        }),
    };

    process::exit(finish(result));
}

/// Maps the outcome of a run to the process exit status.
fn finish(result: Result<i32, DriverError>) -> i32 {
    match result {
        Ok(code) => code,
        Err(DriverError::Interrupt(Interrupt::Exit(exit))) => {
            eprintln!("Exit: {}", exit);
            exit.exit_code()
        }
        Err(err @ (DriverError::Interrupt(Interrupt::Usage(_)) | DriverError::Config(_))) => {
            eprintln!("{:?}", Report::new(err));
            ExitCode::UsageError.into()
        }
        Err(err) => {
            eprintln!("{:?}", Report::new(err));
            ExitCode::InternalError.into()
        }
    }
}

/// Handles the `probe` subcommand.
fn handle_probe(request: ImportOrSkip, config: &DriverConfig) -> Result<i32, DriverError> {
    let registry = config.load_registry()?;
    let subject = request.module_name.clone();
    let item = SourceLocation::new(format!("<probe {}>", subject), 1, 1);

    let mut imported = None;
    let verdict = run_phase(Phase::Collect, &item, || {
        imported = Some(importorskip_with(&registry, request)?);
        Ok(())
    })
    .map_err(exit_interrupt)?;

    let mut tally = Tally::new();
    tally.record(&verdict);
    output::print_verdict(&verdict, &subject, config)?;
    if let Some(module) = &imported {
        output::print_module(module, config)?;
    }
    output::print_summary(&tally, config)?;
    Ok(tally.exit_code().into())
}

/// Handles the `modules` subcommand.
fn handle_modules(registry: RegistryArgs, mut config: DriverConfig) -> Result<i32, DriverError> {
    config.registry = registry.registry;
    let registry = config.load_registry()?;
    output::print_module_list(&registry.module_names(), &config)?;
    Ok(ExitCode::Ok.into())
}

/// Handles the `exit` subcommand. The exit request is raised at session
/// level, outside any test phase, and always ends the run.
fn handle_exit(options: ExitOptions) -> Result<i32, DriverError> {
    Err(caught(exit_with(options)).into())
}

fn exit_interrupt(exit: Exit) -> DriverError {
    DriverError::Interrupt(Interrupt::Exit(exit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::UsageError;

    #[test]
    fn test_exit_uses_its_return_code() {
        let err = DriverError::from(Interrupt::from(Exit::new("stop", Some(12))));
        assert_eq!(finish(Err(err)), 12);
    }

    #[test]
    fn test_exit_defaults_to_interrupted() {
        let err = DriverError::from(Interrupt::from(Exit::new("stop", None)));
        assert_eq!(finish(Err(err)), i32::from(ExitCode::Interrupted));
    }

    #[test]
    fn test_usage_error_status() {
        let err = DriverError::from(Interrupt::from(UsageError::new("bad")));
        assert_eq!(finish(Err(err)), i32::from(ExitCode::UsageError));
    }
}
