//! Error and interrupt types.
//!
//! [`Interrupt`] is the single type every raising operation returns in its
//! `Err` arm. It keeps the expected outcomes (skip, fail, xfail), the
//! process exit request and the genuine misuse errors apart, so the catch
//! boundary can match on the kind instead of sniffing messages.

use std::convert::Infallible;
use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

use crate::signal::{Exit, Failed, OutcomeException, SignalKind, Skipped, XFailed};

/// Result of an operation that only ever transfers control.
///
/// `Ok` is uninhabited, so `skip("reason")?;` reads as a raise and nothing
/// after it runs.
pub type Raise = Result<Infallible, Interrupt>;

// ============================================================================
// INTERRUPT
// ============================================================================

/// Everything a raise can carry up to the nearest catch boundary.
#[derive(Debug, Error, Diagnostic)]
pub enum Interrupt {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Outcome(#[from] OutcomeException),
    /// Never classified as a test result; the driver terminates on it.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Exit(#[from] Exit),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Usage(#[from] UsageError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Construction(#[from] ConstructionError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Version(#[from] InvalidVersion),
}

impl Interrupt {
    /// Transfers control by unwinding, with `self` as the panic payload.
    ///
    /// For frames that cannot return a `Result`. The catch boundary
    /// recovers the interrupt from the payload; see
    /// [`crate::boundary::run_phase`].
    pub fn raise(self) -> ! {
        std::panic::panic_any(self)
    }

    pub fn as_outcome(&self) -> Option<&OutcomeException> {
        match self {
            Interrupt::Outcome(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn as_exit(&self) -> Option<&Exit> {
        match self {
            Interrupt::Exit(exit) => Some(exit),
            _ => None,
        }
    }

    pub fn is_usage(&self) -> bool {
        matches!(self, Interrupt::Usage(_))
    }
}

impl From<Skipped> for Interrupt {
    fn from(s: Skipped) -> Self {
        Interrupt::Outcome(s.into())
    }
}

impl From<Failed> for Interrupt {
    fn from(f: Failed) -> Self {
        Interrupt::Outcome(f.into())
    }
}

impl From<XFailed> for Interrupt {
    fn from(x: XFailed) -> Self {
        Interrupt::Outcome(x.into())
    }
}

// ============================================================================
// MISUSE ERRORS
// ============================================================================

/// The calling test code is itself invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(verdict::usage))]
pub struct UsageError {
    pub message: String,
}

impl UsageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A signal was built with a message that is not a string.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{kind} expected string as 'msg' parameter, got '{found}' instead.")]
#[diagnostic(code(verdict::construction), help("Perhaps you meant to use a mark?"))]
pub struct ConstructionError {
    pub kind: SignalKind,
    pub found: &'static str,
}

impl ConstructionError {
    pub fn new(kind: SignalKind, found: &'static str) -> Self {
        Self { kind, found }
    }
}

// ============================================================================
// IMPORT ERRORS
// ============================================================================

/// Why a module could not be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportErrorKind {
    /// Nothing is registered under the name (or one of its parents).
    ModuleNotFound,
    /// The module exists but failed while loading.
    Other,
}

impl fmt::Display for ImportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportErrorKind::ModuleNotFound => f.write_str("ModuleNotFoundError"),
            ImportErrorKind::Other => f.write_str("ImportError"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(verdict::import))]
pub struct ImportError {
    pub kind: ImportErrorKind,
    /// Dotted name of the module that failed, which may be a parent of the
    /// one requested.
    pub name: String,
    pub message: String,
}

impl ImportError {
    pub fn not_found(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: ImportErrorKind::ModuleNotFound,
            message: format!("No module named '{}'", name),
            name,
        }
    }

    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: ImportErrorKind::Other,
            name: name.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// VERSION ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("Invalid version: '{0}'")]
#[diagnostic(
    code(verdict::version),
    help("versions look like `1.2.3`, `2.0rc1`, `1.0.post2` or `1!3.0+local`")
)]
pub struct InvalidVersion(pub String);
