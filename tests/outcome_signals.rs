//! Behaviour of the raising entry points as seen by test code.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use verdict::{
    caught, exit, exit_with, fail, fail_with, skip, skip_with, xfail, ExitOptions, Failed,
    FailOptions, Interrupt, OutcomeException, SkipOptions, Skipped, XFailed,
};

fn outcome(interrupt: Interrupt) -> OutcomeException {
    match interrupt {
        Interrupt::Outcome(outcome) => outcome,
        other => panic!("expected an outcome signal, got {other:?}"),
    }
}

#[test]
fn skip_carries_reason_and_is_not_module_level() {
    let raised = outcome(caught(skip("x")));
    let skipped = raised.as_skipped().expect("skip signal");
    assert_eq!(skipped.msg(), Some("x"));
    assert!(!skipped.allow_module_level());
    assert!(!skipped.use_item_location());
}

#[test]
fn fail_with_no_reason_has_empty_message() {
    let raised = outcome(caught(fail_with(FailOptions::default())));
    let failed = raised.as_failed().expect("fail signal");
    assert_eq!(failed.msg(), Some(""));
    assert_eq!(raised.to_string(), "");
}

#[test]
fn xfail_is_a_failure_for_generic_handlers() {
    let raised = outcome(caught(xfail("bug-123")));
    assert!(matches!(raised, OutcomeException::XFailed(_)));
    assert_eq!(raised.as_failed().and_then(Failed::msg), Some("bug-123"));
}

#[test]
fn nothing_after_a_raise_runs() {
    fn body(trail: &mut Vec<&'static str>) -> Result<(), Interrupt> {
        trail.push("before");
        xfail("known bug")?;
        trail.push("after");
        Ok(())
    }

    let mut trail = Vec::new();
    assert!(body(&mut trail).is_err());
    assert_eq!(trail, vec!["before"]);
}

#[test]
fn exit_without_any_reason_is_usage_error() {
    let err = caught(exit_with(ExitOptions::default()));
    assert!(err.is_usage());
}

#[test]
fn exit_with_reason() {
    let err = caught(exit("done", None));
    let exit = err.as_exit().expect("exit signal");
    assert_eq!(exit.msg, "done");
    assert_eq!(exit.return_code, None);
    assert!(err.as_outcome().is_none());
}

#[test]
fn both_reason_and_msg_names_the_function() {
    let err = caught(skip_with(SkipOptions {
        reason: "a".into(),
        msg: Some("b".into()),
        ..Default::default()
    }));
    assert!(err.is_usage());
    assert!(err.to_string().contains("skip(...)"));

    let err = caught(fail_with(FailOptions {
        reason: "a".into(),
        msg: Some("b".into()),
        ..Default::default()
    }));
    assert!(err.to_string().contains("fail(...)"));
}

#[test]
fn non_string_messages_fail_construction() {
    let values = [
        json!(0),
        json!(-3.25),
        json!(false),
        json!(["reason"]),
        json!({"reason": "x"}),
    ];
    for value in &values {
        assert!(
            Skipped::from_value(value).is_err(),
            "Skipped accepted {value}"
        );
        assert!(
            Failed::from_value(value).is_err(),
            "Failed accepted {value}"
        );
        assert!(
            XFailed::from_value(value).is_err(),
            "XFailed accepted {value}"
        );
    }
}

#[test]
fn string_form_round_trips_the_message() {
    for msg in ["", "plain", "with 'quotes' and\nnewline"] {
        assert_eq!(Skipped::with_message(msg).to_string(), msg);
        assert_eq!(Failed::with_message(msg).to_string(), msg);
        assert_eq!(XFailed::with_message(msg).to_string(), msg);
    }
    assert_eq!(
        Skipped::from_value(&Value::Null).unwrap().to_string(),
        "<Skipped instance>"
    );
    assert_eq!(Failed::new(None).to_string(), "<Failed instance>");
    assert_eq!(XFailed::new(None).to_string(), "<XFailed instance>");
}
