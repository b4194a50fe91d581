//! The execution engine's catch boundary.
//!
//! [`run_phase`] runs one phase of a test item and turns whatever it raised
//! into a [`Verdict`]. It catches interrupts returned through `Err` as well
//! as interrupts (and ordinary panics) that unwind out of the body, so it
//! plays the role of the `(outcome, any other error)` catch clause.
//!
//! [`Exit`] is never classified: it is handed back to the driver, which
//! terminates without a summary.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use serde::Serialize;

use crate::errors::Interrupt;
use crate::signal::{Exit, OutcomeException, SourceLocation};

const MODULE_LEVEL_SKIP_MISUSE: &str = "Using skip outside of a test will skip the entire module. \
If that's your intention, pass `allow_module_level: true`. \
If you want to skip a specific test, raise the skip from inside the test instead.";

// =============================================================================
// CORE TYPES
// =============================================================================

/// The part of an item's life a signal was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Loading the test module, before any test runs.
    Collect,
    Setup,
    Call,
    Teardown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Collect => "collect",
            Phase::Setup => "setup",
            Phase::Call => "call",
            Phase::Teardown => "teardown",
        };
        f.write_str(name)
    }
}

/// Classification of one phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum Verdict {
    Passed,
    Skipped {
        reason: String,
        location: SourceLocation,
    },
    XFailed {
        reason: String,
    },
    Failed {
        message: String,
        show_trace: bool,
    },
    /// Something went wrong outside the test body proper: collection,
    /// setup or teardown.
    Errored {
        message: String,
    },
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Passed => "PASS",
            Verdict::Skipped { .. } => "SKIP",
            Verdict::XFailed { .. } => "XFAIL",
            Verdict::Failed { .. } => "FAIL",
            Verdict::Errored { .. } => "ERROR",
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Verdict::Passed => None,
            Verdict::Skipped { reason, .. } | Verdict::XFailed { reason } => Some(reason.as_str()),
            Verdict::Failed { message, .. } | Verdict::Errored { message } => {
                Some(message.as_str())
            }
        }
    }
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Classifies an interrupt raised during `phase` of the item defined at
/// `item`. Returns `Err` only for [`Exit`].
pub fn classify(
    phase: Phase,
    item: &SourceLocation,
    interrupt: Interrupt,
) -> Result<Verdict, Exit> {
    let outcome = match interrupt {
        Interrupt::Exit(exit) => return Err(exit),
        Interrupt::Outcome(outcome) => outcome,
        other => return Ok(generic_error(phase, other.to_string())),
    };

    let verdict = match (phase, outcome) {
        (Phase::Collect, OutcomeException::Skipped(s)) if !s.allow_module_level() => {
            Verdict::Errored {
                message: MODULE_LEVEL_SKIP_MISUSE.to_string(),
            }
        }
        (_, OutcomeException::Skipped(s)) => {
            let location = if s.use_item_location() {
                item.clone()
            } else {
                s.raised_at().clone()
            };
            Verdict::Skipped {
                reason: s.to_string(),
                location,
            }
        }
        (Phase::Setup | Phase::Call, OutcomeException::XFailed(x)) => Verdict::XFailed {
            reason: x.to_string(),
        },
        (Phase::Call, OutcomeException::Failed(f)) => Verdict::Failed {
            message: f.to_string(),
            show_trace: f.show_trace(),
        },
        (_, other) => Verdict::Errored {
            message: other.to_string(),
        },
    };
    Ok(verdict)
}

fn generic_error(phase: Phase, message: String) -> Verdict {
    match phase {
        Phase::Call => Verdict::Failed {
            message,
            show_trace: true,
        },
        _ => Verdict::Errored { message },
    }
}

/// Runs `body` as `phase` of the item at `item` and classifies the result.
pub fn run_phase<F>(phase: Phase, item: &SourceLocation, body: F) -> Result<Verdict, Exit>
where
    F: FnOnce() -> Result<(), Interrupt>,
{
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(())) => Ok(Verdict::Passed),
        Ok(Err(interrupt)) => classify(phase, item, interrupt),
        Err(payload) => match payload.downcast::<Interrupt>() {
            Ok(interrupt) => classify(phase, item, *interrupt),
            Err(payload) => Ok(generic_error(phase, panic_message(payload.as_ref()))),
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "test panicked with a non-string payload".to_string()
    }
}

static SILENCE_HOOK: Once = Once::new();

/// Stops the default panic hook from printing interrupts raised with
/// [`Interrupt::raise`]. Other panics still reach the previous hook.
pub fn silence_interrupt_panics() {
    SILENCE_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if info.payload().downcast_ref::<Interrupt>().is_none() {
                previous(info);
            }
        }));
    });
}

// =============================================================================
// EXIT STATUS
// =============================================================================

/// Process exit statuses of the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitCode {
    Ok = 0,
    TestsFailed = 1,
    Interrupted = 2,
    InternalError = 3,
    UsageError = 4,
    NoTestsCollected = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

/// Running count of verdicts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub passed: usize,
    pub skipped: usize,
    pub xfailed: usize,
    pub failed: usize,
    pub errored: usize,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, verdict: &Verdict) {
        match verdict {
            Verdict::Passed => self.passed += 1,
            Verdict::Skipped { .. } => self.skipped += 1,
            Verdict::XFailed { .. } => self.xfailed += 1,
            Verdict::Failed { .. } => self.failed += 1,
            Verdict::Errored { .. } => self.errored += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.skipped + self.xfailed + self.failed + self.errored
    }

    /// Expected failures do not count as failures.
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.errored > 0
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.has_failures() {
            ExitCode::TestsFailed
        } else if self.total() == 0 {
            ExitCode::NoTestsCollected
        } else {
            ExitCode::Ok
        }
    }
}
