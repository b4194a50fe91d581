//! Entry points that end the current test step.
//!
//! Each function builds a signal and returns it in the `Err` arm of a
//! [`Raise`]. The `Ok` arm is uninhabited, so the idiomatic call is
//! `skip("reason")?;` from inside a test body returning
//! `Result<_, Interrupt>`.
//!
//! The `*_with` variants take an options struct that also accepts the
//! deprecated `msg` spelling of `reason`.

use crate::deprecated::resolve_msg_to_reason;
use crate::errors::{Interrupt, Raise, UsageError};
use crate::signal::{Exit, Failed, Skipped, XFailed};

/// Options for [`exit_with`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExitOptions {
    pub reason: String,
    pub return_code: Option<i32>,
    /// Deprecated spelling of `reason`.
    pub msg: Option<String>,
}

/// Options for [`skip_with`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipOptions {
    pub reason: String,
    /// Permit the skip outside a running test, skipping the whole module.
    pub allow_module_level: bool,
    /// Deprecated spelling of `reason`.
    pub msg: Option<String>,
}

/// Options for [`fail_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailOptions {
    pub reason: String,
    pub show_trace: bool,
    /// Deprecated spelling of `reason`.
    pub msg: Option<String>,
}

impl Default for FailOptions {
    fn default() -> Self {
        Self {
            reason: String::new(),
            show_trace: true,
            msg: None,
        }
    }
}

// ============================================================================
// EXIT
// ============================================================================

/// Stops the whole run. The driver terminates without a summary.
pub fn exit(reason: impl Into<String>, return_code: Option<i32>) -> Raise {
    exit_with(ExitOptions {
        reason: reason.into(),
        return_code,
        msg: None,
    })
}

pub fn exit_with(options: ExitOptions) -> Raise {
    if options.reason.is_empty() && options.msg.is_none() {
        return Err(UsageError::new("exit() requires a reason argument").into());
    }
    let reason = resolve_msg_to_reason("exit", &options.reason, options.msg.as_deref())?
        .emit();
    tracing::debug!(reason = %reason, return_code = ?options.return_code, "exit requested");
    Err(Exit::new(reason, options.return_code).into())
}

// ============================================================================
// SKIP / FAIL / XFAIL
// ============================================================================

/// Skips the running test.
#[track_caller]
pub fn skip(reason: impl Into<String>) -> Raise {
    Err(Skipped::with_message(reason).into())
}

#[track_caller]
pub fn skip_with(options: SkipOptions) -> Raise {
    let reason = match resolve_msg_to_reason("skip", &options.reason, options.msg.as_deref()) {
        Ok(resolved) => resolved.emit(),
        Err(err) => return Err(err.into()),
    };
    let skipped = Skipped::with_message(reason)
        .with_allow_module_level(options.allow_module_level);
    Err(skipped.into())
}

/// Fails the running test.
#[track_caller]
pub fn fail(reason: impl Into<String>) -> Raise {
    Err(Failed::with_message(reason).into())
}

#[track_caller]
pub fn fail_with(options: FailOptions) -> Raise {
    let reason = match resolve_msg_to_reason("fail", &options.reason, options.msg.as_deref()) {
        Ok(resolved) => resolved.emit(),
        Err(err) => return Err(err.into()),
    };
    Err(Failed::with_message(reason)
        .with_show_trace(options.show_trace)
        .into())
}

/// Marks the running test as an expected failure. Nothing after the call
/// runs.
#[track_caller]
pub fn xfail(reason: impl Into<String>) -> Raise {
    Err(XFailed::with_message(reason).into())
}

/// Narrows a [`Raise`] to its interrupt. Handy when a caller wants the
/// signal value rather than propagating it.
pub fn caught(raised: Raise) -> Interrupt {
    match raised {
        Ok(never) => match never {},
        Err(interrupt) => interrupt,
    }
}
