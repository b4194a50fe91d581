//! Migration of the deprecated `msg` argument to `reason`.
//!
//! `skip`, `fail` and `exit` all accept the old `msg` spelling alongside
//! `reason`. The rule is the same for each of them, so it lives in one pure
//! function keyed by the caller's name. Emitting the warning is left to the
//! caller; see [`Resolved::emit`].

use std::fmt;

use crate::errors::UsageError;

/// A use of a deprecated argument that still works but should be migrated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecationWarning {
    pub func: &'static str,
    pub message: String,
}

impl DeprecationWarning {
    pub fn keyword_msg_arg(func: &'static str) -> Self {
        Self {
            func,
            message: format!(
                "{func}(msg=...) is now deprecated, use {func}(reason=...) instead",
                func = func
            ),
        }
    }
}

impl fmt::Display for DeprecationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// The reason to use, plus the warning owed to the caller if the old
/// argument was involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub reason: String,
    pub warning: Option<DeprecationWarning>,
}

impl Resolved {
    /// Logs the deprecation warning, if any, and returns the reason.
    pub fn emit(self) -> String {
        if let Some(warning) = &self.warning {
            tracing::warn!(target: "verdict::deprecated", func = warning.func, "{}", warning);
        }
        self.reason
    }
}

/// Folds the deprecated `msg` into `reason` for the function `func_name`.
///
/// Supplying both non-empty is a usage error. Supplying `msg` at all earns
/// a deprecation warning; its value is used when `reason` is empty.
pub fn resolve_msg_to_reason(
    func_name: &'static str,
    reason: &str,
    msg: Option<&str>,
) -> Result<Resolved, UsageError> {
    let Some(msg) = msg else {
        return Ok(Resolved {
            reason: reason.to_string(),
            warning: None,
        });
    };

    if !reason.is_empty() && !msg.is_empty() {
        return Err(UsageError::new(format!(
            "Passing both `reason` and `msg` to {}(...) is not permitted.",
            func_name
        )));
    }

    let reason = if reason.is_empty() { msg } else { reason };
    Ok(Resolved {
        reason: reason.to_string(),
        warning: Some(DeprecationWarning::keyword_msg_arg(func_name)),
    })
}
