//! Handles all user-facing output for the CLI.
//!
//! Verdicts are printed as colored status lines or as JSON. Keeping the
//! rendering here gives every subcommand the same look.

use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::boundary::{Tally, Verdict};
use crate::config::DriverConfig;
use crate::importer::Module;

// ============================================================================
// CORE OUTPUT FUNCTIONS
// ============================================================================

fn stdout(config: &DriverConfig) -> StandardStream {
    let choice = if config.use_colors {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

fn verdict_color(verdict: &Verdict) -> Color {
    match verdict {
        Verdict::Passed => Color::Green,
        Verdict::Skipped { .. } | Verdict::XFailed { .. } => Color::Yellow,
        Verdict::Failed { .. } | Verdict::Errored { .. } => Color::Red,
    }
}

/// Prints one verdict line: `LABEL: subject (detail)`.
pub fn print_verdict(verdict: &Verdict, subject: &str, config: &DriverConfig) -> io::Result<()> {
    if config.json {
        let line = serde_json::to_string(verdict)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        println!("{}", line);
        return Ok(());
    }

    let mut out = stdout(config);
    out.set_color(
        ColorSpec::new()
            .set_fg(Some(verdict_color(verdict)))
            .set_bold(true),
    )?;
    write!(out, "{}", verdict.label())?;
    out.reset()?;
    write!(out, ": {}", subject)?;
    match verdict {
        Verdict::Skipped { reason, location } => writeln!(out, " ({}) [{}]", reason, location)?,
        Verdict::Failed {
            message,
            show_trace,
        } => {
            writeln!(out)?;
            writeln!(out, "  {}", message)?;
            if !show_trace {
                writeln!(out, "  (trace suppressed)")?;
            }
        }
        other => match other.detail() {
            Some(detail) => writeln!(out, " ({})", detail)?,
            None => writeln!(out)?,
        },
    }
    Ok(())
}

/// Prints the imported module, when a probe succeeded.
pub fn print_module(module: &Module, config: &DriverConfig) -> io::Result<()> {
    if config.json {
        return Ok(());
    }
    let mut out = stdout(config);
    match module.version() {
        Some(version) => writeln!(out, "  imported {} {}", module.name, version),
        None => writeln!(out, "  imported {}", module.name),
    }
}

pub fn print_module_list(names: &[String], config: &DriverConfig) -> io::Result<()> {
    let mut out = stdout(config);
    for name in names {
        writeln!(out, "{}", name)?;
    }
    Ok(())
}

/// One-line summary in the harness style.
pub fn print_summary(tally: &Tally, config: &DriverConfig) -> io::Result<()> {
    if config.json {
        return Ok(());
    }
    let mut out = stdout(config);
    write!(out, "\nsummary: ")?;
    let parts = [
        ("passed", tally.passed, Color::Green),
        ("skipped", tally.skipped, Color::Yellow),
        ("xfailed", tally.xfailed, Color::Yellow),
        ("failed", tally.failed, Color::Red),
        ("errors", tally.errored, Color::Red),
    ];
    let mut first = true;
    for (label, count, color) in parts {
        if count == 0 {
            continue;
        }
        if !first {
            write!(out, ", ")?;
        }
        first = false;
        out.set_color(ColorSpec::new().set_fg(Some(color)))?;
        write!(out, "{} {}", count, label)?;
        out.reset()?;
    }
    writeln!(out)
}
