//! Command-line behavior: exit codes and rendered reports

mod common;

use assert_cmd::Command;
use predicates::prelude::*;

use common::TestFixture;

fn dataassert() -> Command {
    Command::cargo_bin("dataassert").unwrap()
}

fn accounts(fixture: &TestFixture, name: &str, rows: &[[&str; 2]]) -> std::path::PathBuf {
    let mut data = vec![vec!["ACC_ID", "ACC_NAME"]];
    data.extend(rows.iter().map(|r| r.to_vec()));
    fixture.create_csv(name, &data)
}

#[test]
fn test_equal_datasets_exit_zero() {
    let fixture = TestFixture::new();
    let expected = accounts(&fixture, "expected/ACCOUNT.csv", &[["1", "Alice"], ["2", "Bob"]]);
    let actual = accounts(&fixture, "actual/ACCOUNT.csv", &[["2", "Bob"], ["1", "Alice"]]);

    dataassert()
        .arg(&expected)
        .arg(&actual)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("No differences found."));
}

#[test]
fn test_differences_exit_one() {
    let fixture = TestFixture::new();
    let expected = accounts(&fixture, "expected/ACCOUNT.csv", &[["1", "Alice"], ["2", "Bob"]]);
    let actual = accounts(&fixture, "actual/ACCOUNT.csv", &[["2", "Bobby"], ["1", "Alice"]]);

    dataassert()
        .arg(&expected)
        .arg(&actual)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("ACC_NAME"))
        .stdout(predicate::str::contains("Bobby"))
        .stdout(predicate::str::contains("1 difference(s) in 1 of 1 table(s)"));
}

#[test]
fn test_json_report_lists_differences() {
    let fixture = TestFixture::new();
    let expected = accounts(&fixture, "expected/ACCOUNT.csv", &[["1", "Alice"], ["3", "Carol"]]);
    let actual = accounts(&fixture, "actual/ACCOUNT.csv", &[["1", "Alice"]]);

    let output = dataassert()
        .arg(&expected)
        .arg(&actual)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let differences = report["tables"][0]["differences"].as_array().unwrap();
    assert_eq!(differences.len(), 2);
    assert!(differences.iter().all(|d| d["row"] == 1 && d["actual"].is_null()));
}

#[test]
fn test_skip_absent_rows() {
    let fixture = TestFixture::new();
    let expected = accounts(&fixture, "expected/ACCOUNT.csv", &[["1", "Alice"], ["3", "Carol"]]);
    let actual = accounts(&fixture, "actual/ACCOUNT.csv", &[["1", "Alice"]]);

    dataassert()
        .arg(&expected)
        .arg(&actual)
        .arg("--skip-absent")
        .assert()
        .code(0);
}

#[test]
fn test_column_mismatch_reported() {
    let fixture = TestFixture::new();
    let expected = accounts(&fixture, "expected/ACCOUNT.csv", &[["1", "Alice"]]);
    let actual = fixture.create_csv(
        "actual/ACCOUNT.csv",
        &[vec!["ACC_ID", "ACC_NAME", "ACC_EXTRA"], vec!["1", "Alice", "x"]],
    );

    dataassert()
        .arg(&expected)
        .arg(&actual)
        .arg("--fail-fast")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("structural mismatch"))
        .stdout(predicate::str::contains("[ACC_ID, ACC_NAME, ACC_EXTRA]"));
}

#[test]
fn test_table_set_mismatch() {
    let fixture = TestFixture::new();
    accounts(&fixture, "expected/ACCOUNT.csv", &[["1", "Alice"]]);
    fixture.create_csv("actual/CUSTOMER.csv", &[vec!["CUS_ID"], vec!["1"]]);

    dataassert()
        .arg(fixture.root().join("expected"))
        .arg(fixture.root().join("actual"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("table mismatch"));
}

#[test]
fn test_ignore_column_flag() {
    let fixture = TestFixture::new();
    let expected = accounts(&fixture, "expected/ACCOUNT.csv", &[["1", "Alice"]]);
    let actual = accounts(&fixture, "actual/ACCOUNT.csv", &[["1", "Someone"]]);

    dataassert()
        .arg(&expected)
        .arg(&actual)
        .args(["--ignore-column", "ACC_NAME"])
        .assert()
        .code(0);
}

#[test]
fn test_missing_file_exits_two() {
    let fixture = TestFixture::new();
    let expected = accounts(&fixture, "expected/ACCOUNT.csv", &[["1", "Alice"]]);

    dataassert()
        .arg(&expected)
        .arg(fixture.root().join("missing.csv"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to load actual dataset"));
}
