//! The catch boundary, driven the way an execution engine would drive it.

use pretty_assertions::assert_eq;
use verdict::boundary::silence_interrupt_panics;
use verdict::{
    exit, fail_with, importorskip, run_phase, skip, skip_with, xfail, ExitCode, FailOptions,
    Interrupt, ModuleRegistry, Phase, SkipOptions, SourceLocation, Tally, Verdict,
};

fn item() -> SourceLocation {
    SourceLocation::new("tests/test_module.rs", 3, 1)
}

#[test]
fn passing_body() {
    let verdict = run_phase(Phase::Call, &item(), || Ok(())).unwrap();
    assert_eq!(verdict, Verdict::Passed);
}

#[test]
fn skip_in_call_reports_raise_location() {
    let line = line!() + 1;
    let verdict = run_phase(Phase::Call, &item(), || {
        skip("later").map(|never| match never {})
    });
    let Ok(Verdict::Skipped { reason, location }) = verdict else {
        panic!("expected a skip");
    };
    assert_eq!(reason, "later");
    assert_eq!(location.line, line);
    assert!(location.file.ends_with("boundary.rs"));
}

#[test]
fn module_level_skip_during_collection() {
    let registry = ModuleRegistry::new();
    let verdict = run_phase(Phase::Collect, &item(), || {
        importorskip(&registry, "numpy")?;
        Ok(())
    })
    .unwrap();
    assert!(matches!(verdict, Verdict::Skipped { .. }));
}

#[test]
fn plain_skip_during_collection_is_rejected() {
    let verdict = run_phase(Phase::Collect, &item(), || {
        skip("too early")?;
        Ok(())
    })
    .unwrap();
    let Verdict::Errored { message } = verdict else {
        panic!("expected a collection error");
    };
    assert!(message.starts_with("Using skip outside of a test"));

    let verdict = run_phase(Phase::Collect, &item(), || {
        skip_with(SkipOptions {
            reason: "whole module".into(),
            allow_module_level: true,
            ..Default::default()
        })?;
        Ok(())
    })
    .unwrap();
    assert!(matches!(verdict, Verdict::Skipped { .. }));
}

#[test]
fn fail_without_trace_is_kept() {
    let verdict = run_phase(Phase::Call, &item(), || {
        fail_with(FailOptions {
            reason: "expected 3 rows, got 2".into(),
            show_trace: false,
            ..Default::default()
        })?;
        Ok(())
    })
    .unwrap();
    assert_eq!(
        verdict,
        Verdict::Failed {
            message: "expected 3 rows, got 2".into(),
            show_trace: false,
        }
    );
}

#[test]
fn xfail_in_setup() {
    let verdict = run_phase(Phase::Setup, &item(), || {
        xfail("fixture is known broken")?;
        Ok(())
    })
    .unwrap();
    assert_eq!(
        verdict,
        Verdict::XFailed {
            reason: "fixture is known broken".into()
        }
    );
}

#[test]
fn exit_escapes_the_boundary() {
    let result = run_phase(Phase::Call, &item(), || {
        exit("abort the run", Some(3))?;
        Ok(())
    });
    let exit = result.unwrap_err();
    assert_eq!(exit.msg, "abort the run");
    assert_eq!(exit.exit_code(), 3);
}

#[test]
fn unwinding_raise_is_recovered() {
    silence_interrupt_panics();

    fn deep_helper() {
        Interrupt::from(verdict::Skipped::with_message("from a helper")).raise();
    }

    let verdict = run_phase(Phase::Call, &item(), || {
        deep_helper();
        Ok(())
    })
    .unwrap();
    assert!(matches!(
        verdict,
        Verdict::Skipped { ref reason, .. } if reason == "from a helper"
    ));
}

#[test]
fn verdict_serializes_with_outcome_tag() {
    let verdict = Verdict::XFailed {
        reason: "bug-123".into(),
    };
    let json = serde_json::to_value(&verdict).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"outcome": "xfailed", "reason": "bug-123"})
    );
}

#[test]
fn tally_drives_the_exit_status() {
    let mut tally = Tally::new();
    for verdict in [
        Verdict::Passed,
        Verdict::XFailed {
            reason: "known".into(),
        },
    ] {
        tally.record(&verdict);
    }
    assert_eq!(tally.total(), 2);
    assert_eq!(tally.exit_code(), ExitCode::Ok);

    tally.record(&Verdict::Failed {
        message: "boom".into(),
        show_trace: true,
    });
    assert_eq!(tally.exit_code(), ExitCode::TestsFailed);
}
