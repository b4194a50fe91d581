//! Outcome signals for a test runner.
//!
//! Test code ends the current step with [`skip`], [`fail`], [`xfail`] or
//! [`exit`], or declares a soft dependency with [`importorskip`]. Each of
//! them returns the signal in the `Err` arm, so the usual shape is:
//!
//! ```rust
//! use verdict::{skip, Interrupt};
//!
//! fn test_needs_network(online: bool) -> Result<(), Interrupt> {
//!     if !online {
//!         skip("no network")?;
//!     }
//!     Ok(())
//! }
//!
//! assert!(test_needs_network(false).is_err());
//! ```
//!
//! The engine side catches signals with [`boundary::run_phase`] and gets a
//! [`boundary::Verdict`] back.

pub use crate::boundary::{run_phase, ExitCode, Phase, Tally, Verdict};
pub use crate::errors::{
    ConstructionError, ImportError, ImportErrorKind, Interrupt, InvalidVersion, Raise, UsageError,
};
pub use crate::importer::{
    importorskip, importorskip_with, ImportFilter, ImportOrSkip, Module, ModuleLoader,
    ModuleRegistry,
};
pub use crate::raise::{
    caught, exit, exit_with, fail, fail_with, skip, skip_with, xfail, ExitOptions, FailOptions,
    SkipOptions,
};
pub use crate::signal::{
    Exit, Failed, OutcomeException, SignalKind, Skipped, SourceLocation, XFailed,
};

pub mod boundary;
pub mod cli;
pub mod config;
pub mod deprecated;
pub mod errors;
pub mod importer;
pub mod raise;
pub mod signal;
pub mod version;
