// Regression tests for the `verdict` driver binary.
// Requires: assert_cmd, predicates, tempfile crates in [dev-dependencies]

use std::io::Write;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use tempfile::NamedTempFile;

fn verdict() -> Command {
    let mut cmd = Command::cargo_bin("verdict").unwrap();
    cmd.arg("--no-color");
    cmd
}

fn manifest(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn probe_of_builtin_module_passes() {
    verdict()
        .args(["probe", "math"])
        .assert()
        .success()
        .stdout(contains("PASS: math").and(contains("imported math")));
}

#[test]
fn probe_of_missing_module_is_skipped() {
    verdict()
        .args(["probe", "definitely_not_a_real_module_xyz"])
        .assert()
        .success()
        .stdout(contains("SKIP").and(contains(
            "could not import 'definitely_not_a_real_module_xyz'",
        )));
}

#[test]
fn probe_reports_version_mismatch() {
    verdict()
        .args(["probe", "math", "--min-version", "999.0"])
        .assert()
        .success()
        .stdout(contains(
            "module 'math' has __version__ None, required is: '999.0'",
        ));
}

#[test]
fn probe_keeps_import_warnings_quiet() {
    let file = manifest(
        r#"
modules:
  - name: docutils
    version: "0.18.1"
    warnings: ["docutils is noisy"]
"#,
    );
    verdict()
        .args(["probe", "docutils", "--registry"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(
            contains("PASS: docutils").and(contains("docutils is noisy").not()),
        )
        .stderr(contains("docutils is noisy").not());
}

#[test]
fn probe_uses_registry_manifest() {
    let file = manifest(
        r#"
modules:
  - name: docutils
    version: "0.18.1"
  - name: broken
    error: "No module named 'six'"
"#,
    );
    verdict()
        .args(["probe", "docutils", "--min-version", "0.18", "--registry"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(contains("imported docutils 0.18.1"));

    verdict()
        .args(["probe", "broken", "--not-found-only", "--registry"])
        .arg(file.path())
        .assert()
        .code(1)
        .stdout(contains("ERROR: broken"));
}

#[test]
fn probe_json_output() {
    verdict()
        .args(["probe", "nowhere", "--json"])
        .assert()
        .success()
        .stdout(
            contains("\"outcome\":\"skipped\"")
                .and(contains("\"allow_module_level\"").not()),
        );
}

#[test]
fn bad_manifest_is_a_usage_error() {
    let file = manifest("modules: [ {name: x, verison: 1} ]\n");
    verdict()
        .args(["modules", "--registry"])
        .arg(file.path())
        .assert()
        .code(4)
        .stderr(contains("verdict::config::parse"));
}

#[test]
fn modules_lists_builtins() {
    verdict()
        .arg("modules")
        .assert()
        .success()
        .stdout(contains("math").and(contains("os.path")));
}

#[test]
fn exit_terminates_with_requested_code() {
    verdict()
        .args(["exit", "maintenance window", "--code", "7"])
        .assert()
        .code(7)
        .stderr(contains("Exit: maintenance window"))
        .stdout(contains("summary").not());
}

#[test]
fn exit_defaults_to_interrupted() {
    verdict().args(["exit", "stop"]).assert().code(2);
}

#[test]
fn exit_without_reason_is_usage_error() {
    verdict()
        .arg("exit")
        .assert()
        .code(4)
        .stderr(contains("exit() requires a reason argument"));
}

#[test]
fn exit_with_deprecated_msg_warns() {
    verdict()
        .args(["exit", "--msg", "old spelling"])
        .assert()
        .code(2)
        .stderr(
            contains("Exit: old spelling").and(contains("is now deprecated")),
        );
}
