//! Outcome signals.
//!
//! A signal is a one-shot value that ends the current test step with a
//! classification attached. [`OutcomeException`] is the closed family of
//! signals that end up as a test result (skipped, failed, expected failure).
//! [`Exit`] stands apart: it is never a test result and is only ever handled
//! by the process driver.
//!
//! Signals are immutable once built. The `with_*` methods consume the value
//! and hand back a new one, so they are only usable before the signal is
//! raised.

use std::fmt;
use std::panic::Location;

use serde::Serialize;
use serde_json::Value;

use crate::errors::ConstructionError;

// ============================================================================
// SOURCE LOCATIONS
// ============================================================================

/// A point in test source code, either where a signal was raised or where
/// the test item that owns it is defined.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// The location of the nearest caller not marked `#[track_caller]`.
    #[track_caller]
    pub fn caller() -> Self {
        Location::caller().into()
    }
}

impl From<&Location<'_>> for SourceLocation {
    fn from(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line(), location.column())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

// ============================================================================
// SIGNAL KINDS
// ============================================================================

/// Discriminant of an outcome signal, used for messages and placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Skipped,
    Failed,
    XFailed,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Skipped => "Skipped",
            SignalKind::Failed => "Failed",
            SignalKind::XFailed => "XFailed",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields shared by every outcome signal.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Payload {
    msg: Option<String>,
    show_trace: bool,
    raised_at: SourceLocation,
}

impl Payload {
    #[track_caller]
    fn new(msg: Option<String>) -> Self {
        Self {
            msg,
            show_trace: true,
            raised_at: SourceLocation::caller(),
        }
    }

    fn render(&self, kind: SignalKind, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.msg {
            Some(msg) => f.write_str(msg),
            None => write!(f, "<{} instance>", kind),
        }
    }
}

/// Reads a dynamically typed message argument.
///
/// Strings and `null` are the only accepted shapes; anything else usually
/// means a mark object was passed where a reason string belongs.
fn message_from_value(
    kind: SignalKind,
    value: &Value,
) -> Result<Option<String>, ConstructionError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        other => Err(ConstructionError::new(kind, value_type_name(other))),
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

// ============================================================================
// SKIPPED
// ============================================================================

/// Stops the current test (or, with `allow_module_level`, the current module)
/// and records it as skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    payload: Payload,
    allow_module_level: bool,
    use_item_location: bool,
}

impl Skipped {
    #[track_caller]
    pub fn new(msg: Option<String>) -> Self {
        Self {
            payload: Payload::new(msg),
            allow_module_level: false,
            use_item_location: false,
        }
    }

    #[track_caller]
    pub fn with_message(msg: impl Into<String>) -> Self {
        Self::new(Some(msg.into()))
    }

    #[track_caller]
    pub fn from_value(msg: &Value) -> Result<Self, ConstructionError> {
        Ok(Self::new(message_from_value(SignalKind::Skipped, msg)?))
    }

    pub fn with_allow_module_level(mut self, allow: bool) -> Self {
        self.allow_module_level = allow;
        self
    }

    /// Report the skip at the owning item's location instead of where it
    /// was raised. Used when the skip comes from framework code on behalf
    /// of the item.
    pub fn with_item_location(mut self, use_item: bool) -> Self {
        self.use_item_location = use_item;
        self
    }

    pub fn with_show_trace(mut self, show: bool) -> Self {
        self.payload.show_trace = show;
        self
    }

    pub fn msg(&self) -> Option<&str> {
        self.payload.msg.as_deref()
    }

    pub fn show_trace(&self) -> bool {
        self.payload.show_trace
    }

    pub fn allow_module_level(&self) -> bool {
        self.allow_module_level
    }

    pub fn use_item_location(&self) -> bool {
        self.use_item_location
    }

    pub fn raised_at(&self) -> &SourceLocation {
        &self.payload.raised_at
    }
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.payload.render(SignalKind::Skipped, f)
    }
}

// ============================================================================
// FAILED / XFAILED
// ============================================================================

/// Explicit failure of the running test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failed {
    payload: Payload,
}

impl Failed {
    #[track_caller]
    pub fn new(msg: Option<String>) -> Self {
        Self {
            payload: Payload::new(msg),
        }
    }

    #[track_caller]
    pub fn with_message(msg: impl Into<String>) -> Self {
        Self::new(Some(msg.into()))
    }

    #[track_caller]
    pub fn from_value(msg: &Value) -> Result<Self, ConstructionError> {
        Ok(Self::new(message_from_value(SignalKind::Failed, msg)?))
    }

    /// When false, the message is the whole failure report and no trace is
    /// attached.
    pub fn with_show_trace(mut self, show: bool) -> Self {
        self.payload.show_trace = show;
        self
    }

    pub fn msg(&self) -> Option<&str> {
        self.payload.msg.as_deref()
    }

    pub fn show_trace(&self) -> bool {
        self.payload.show_trace
    }

    pub fn raised_at(&self) -> &SourceLocation {
        &self.payload.raised_at
    }
}

impl fmt::Display for Failed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.payload.render(SignalKind::Failed, f)
    }
}

/// An expected failure. Every `XFailed` is also a [`Failed`]: it derefs to
/// one, so code that only cares about failures can treat both alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XFailed {
    failed: Failed,
}

impl XFailed {
    #[track_caller]
    pub fn new(msg: Option<String>) -> Self {
        Self {
            failed: Failed::new(msg),
        }
    }

    #[track_caller]
    pub fn with_message(msg: impl Into<String>) -> Self {
        Self::new(Some(msg.into()))
    }

    #[track_caller]
    pub fn from_value(msg: &Value) -> Result<Self, ConstructionError> {
        Ok(Self::new(message_from_value(SignalKind::XFailed, msg)?))
    }

    pub fn as_failed(&self) -> &Failed {
        &self.failed
    }
}

impl std::ops::Deref for XFailed {
    type Target = Failed;

    fn deref(&self) -> &Failed {
        &self.failed
    }
}

impl From<XFailed> for Failed {
    fn from(xfailed: XFailed) -> Self {
        xfailed.failed
    }
}

impl fmt::Display for XFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.failed.payload.render(SignalKind::XFailed, f)
    }
}

// ============================================================================
// OUTCOME EXCEPTION
// ============================================================================

/// The closed family of signals that become a test or collection result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeException {
    Skipped(Skipped),
    Failed(Failed),
    XFailed(XFailed),
}

impl OutcomeException {
    pub fn kind(&self) -> SignalKind {
        match self {
            OutcomeException::Skipped(_) => SignalKind::Skipped,
            OutcomeException::Failed(_) => SignalKind::Failed,
            OutcomeException::XFailed(_) => SignalKind::XFailed,
        }
    }

    pub fn msg(&self) -> Option<&str> {
        match self {
            OutcomeException::Skipped(s) => s.msg(),
            OutcomeException::Failed(f) => f.msg(),
            OutcomeException::XFailed(x) => x.msg(),
        }
    }

    pub fn show_trace(&self) -> bool {
        match self {
            OutcomeException::Skipped(s) => s.show_trace(),
            OutcomeException::Failed(f) => f.show_trace(),
            OutcomeException::XFailed(x) => x.show_trace(),
        }
    }

    pub fn raised_at(&self) -> &SourceLocation {
        match self {
            OutcomeException::Skipped(s) => s.raised_at(),
            OutcomeException::Failed(f) => f.raised_at(),
            OutcomeException::XFailed(x) => x.raised_at(),
        }
    }

    /// Views both plain and expected failures as a [`Failed`].
    pub fn as_failed(&self) -> Option<&Failed> {
        match self {
            OutcomeException::Failed(f) => Some(f),
            OutcomeException::XFailed(x) => Some(x.as_failed()),
            OutcomeException::Skipped(_) => None,
        }
    }

    pub fn as_skipped(&self) -> Option<&Skipped> {
        match self {
            OutcomeException::Skipped(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for OutcomeException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeException::Skipped(s) => fmt::Display::fmt(s, f),
            OutcomeException::Failed(x) => fmt::Display::fmt(x, f),
            OutcomeException::XFailed(x) => fmt::Display::fmt(x, f),
        }
    }
}

impl std::error::Error for OutcomeException {}

impl miette::Diagnostic for OutcomeException {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self {
            OutcomeException::Skipped(_) => "verdict::skipped",
            OutcomeException::Failed(_) => "verdict::failed",
            OutcomeException::XFailed(_) => "verdict::xfailed",
        };
        Some(Box::new(code))
    }
}

impl From<Skipped> for OutcomeException {
    fn from(s: Skipped) -> Self {
        OutcomeException::Skipped(s)
    }
}

impl From<Failed> for OutcomeException {
    fn from(f: Failed) -> Self {
        OutcomeException::Failed(f)
    }
}

impl From<XFailed> for OutcomeException {
    fn from(x: XFailed) -> Self {
        OutcomeException::XFailed(x)
    }
}

// ============================================================================
// EXIT
// ============================================================================

/// Request to terminate the whole run immediately, with no summary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
#[error("{msg}")]
#[diagnostic(code(verdict::exit))]
pub struct Exit {
    pub msg: String,
    pub return_code: Option<i32>,
}

impl Exit {
    pub fn new(msg: impl Into<String>, return_code: Option<i32>) -> Self {
        Self {
            msg: msg.into(),
            return_code,
        }
    }

    /// The status the process driver should terminate with.
    pub fn exit_code(&self) -> i32 {
        self.return_code
            .unwrap_or(crate::boundary::ExitCode::Interrupted as i32)
    }
}

impl Default for Exit {
    fn default() -> Self {
        Self::new("unknown reason", None)
    }
}
