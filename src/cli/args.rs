//! Defines the command-line arguments and subcommands for the `verdict` driver.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "verdict",
    version,
    about = "Raise and classify test outcome signals from the command line."
)]
pub struct VerdictArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Never colorize output.
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Where the module registry comes from.
#[derive(Debug, Args)]
pub struct RegistryArgs {
    /// YAML manifest describing the loadable modules. Only the builtin
    /// modules are available when omitted.
    #[arg(long, value_name = "FILE")]
    pub registry: Option<PathBuf>,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import a module the way a test module would, skipping on failure.
    Probe {
        /// Dotted name of the module to import.
        #[arg(required = true)]
        module: String,
        /// Skip unless the module's __version__ is at least this.
        #[arg(long, value_name = "VERSION")]
        min_version: Option<String>,
        /// Skip reason to report instead of the import error.
        #[arg(long)]
        reason: Option<String>,
        /// Only skip when the module is missing; other import failures
        /// become errors.
        #[arg(long)]
        not_found_only: bool,
        /// Print the verdict as JSON.
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        registry: RegistryArgs,
    },
    /// List the modules the registry can load.
    Modules {
        #[command(flatten)]
        registry: RegistryArgs,
    },
    /// Request an immediate exit of the run.
    Exit {
        /// Why the run stops.
        #[arg(default_value = "")]
        reason: String,
        /// Status to exit with instead of the interrupted status.
        #[arg(long)]
        code: Option<i32>,
        /// Deprecated spelling of the reason.
        #[arg(long)]
        msg: Option<String>,
    },
}
