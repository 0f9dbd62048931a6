//! End-to-end comparisons through the library API

mod common;

use common::{account, TestFixture};
use dataassert::config::{Config, RowMatching};
use dataassert::diff::{CollectingHandler, DiffEngine};
use dataassert::model::{CellValue, Column, DataType};
use dataassert::parser::ParserFactory;
use dataassert::{Assertion, Dataset, DiffError, Table};

fn collect(engine: &DiffEngine, expected: &Table, actual: &Table) -> (CollectingHandler, Result<(), DiffError>) {
    let mut handler = CollectingHandler::new();
    let result = engine.assert_tables_equal(expected, actual, Some(&mut handler));
    (handler, result)
}

#[test]
fn test_reordered_rows_are_equal() {
    let expected = account(&[(1, "Alice"), (2, "Bob")]);
    let actual = account(&[(2, "Bob"), (1, "Alice")]);

    let (handler, result) = collect(&DiffEngine::default(), &expected, &actual);
    result.unwrap();
    assert!(handler.is_empty());
}

#[test]
fn test_single_changed_cell() {
    let expected = account(&[(1, "Alice"), (2, "Bob")]);
    let actual = account(&[(2, "Bobby"), (1, "Alice")]);

    let (handler, result) = collect(&DiffEngine::default(), &expected, &actual);
    result.unwrap();

    assert_eq!(handler.differences().len(), 1);
    let difference = &handler.differences()[0];
    assert_eq!(difference.row, 1);
    assert_eq!(difference.actual_row, Some(0));
    assert_eq!(difference.column, "ACC_NAME");
    assert_eq!(difference.expected, CellValue::from("Bob"));
    assert_eq!(difference.actual, Some(CellValue::from("Bobby")));
}

#[test]
fn test_extra_actual_column_is_structural_mismatch() {
    let expected = account(&[(1, "Alice")]);
    let actual = Table::from_rows(
        "ACCOUNT",
        vec![
            Column::new("ACC_ID", DataType::Integer),
            Column::new("ACC_NAME", DataType::String),
            Column::new("ACC_EXTRA", DataType::String),
        ],
        vec![vec![1i64.into(), "Alice".into(), "x".into()]],
    )
    .unwrap();

    let (handler, result) = collect(&DiffEngine::default(), &expected, &actual);

    match result {
        Err(DiffError::ColumnMismatch(mismatch)) => {
            assert_eq!(mismatch.expected_columns, vec!["ACC_ID", "ACC_NAME"]);
            assert_eq!(mismatch.actual_columns, vec!["ACC_ID", "ACC_NAME", "ACC_EXTRA"]);
        }
        other => panic!("expected column mismatch, got {:?}", other),
    }
    assert!(handler.differences().is_empty());
    assert_eq!(handler.column_mismatches().len(), 1);
}

#[test]
fn test_unmatched_key_reports_every_column_as_absent() {
    let expected = account(&[(1, "Alice"), (3, "Carol")]);
    let actual = account(&[(1, "Alice"), (2, "Bob")]);

    let (handler, result) = collect(&DiffEngine::default(), &expected, &actual);
    result.unwrap();

    let differences = handler.differences();
    assert_eq!(differences.len(), 2);
    assert!(differences.iter().all(|d| d.row == 1 && d.actual.is_none()));
    let columns: Vec<_> = differences.iter().map(|d| d.column.as_str()).collect();
    assert_eq!(columns, vec!["ACC_ID", "ACC_NAME"]);
}

#[test]
fn test_unmatched_key_skipped_when_absent_rows_are_skipped() {
    let expected = account(&[(3, "Carol")]);
    let actual = account(&[(1, "Alice")]);
    let engine = DiffEngine::new(&Config::default().with_skip_absent_actual(true));

    let (handler, result) = collect(&engine, &expected, &actual);
    result.unwrap();
    assert!(handler.is_empty());
}

#[test]
fn test_fail_fast_stops_at_first_difference() {
    let expected = account(&[(1, "Alice"), (2, "Bob")]);
    let actual = account(&[(1, "Al"), (2, "Bobby")]);

    let err = DiffEngine::default()
        .assert_tables_equal(&expected, &actual, None)
        .unwrap_err();
    match err {
        DiffError::ValueMismatch(difference) => {
            assert_eq!(difference.row, 0);
            assert_eq!(difference.column, "ACC_NAME");
        }
        other => panic!("expected value mismatch, got {:?}", other),
    }
}

#[test]
fn test_comparison_is_repeatable() {
    let expected = account(&[(1, "Alice"), (2, "Bob")]);
    let actual = account(&[(2, "Bobby"), (1, "Alice")]);
    let engine = DiffEngine::default();

    let first = engine.assert_tables_equal(&expected, &actual, None).unwrap_err();
    let second = engine.assert_tables_equal(&expected, &actual, None).unwrap_err();
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn test_ignored_columns_never_differ() {
    let expected = account(&[(1, "Alice"), (2, "Bob")]);
    let actual = account(&[(1, "Someone"), (2, "Else")]);
    let engine = DiffEngine::new(&Config::default().with_ignore_columns(vec!["ACC_NAME".to_string()]));

    let (handler, result) = collect(&engine, &expected, &actual);
    result.unwrap();
    assert!(handler.is_empty());
}

#[test]
fn test_positional_matching_reports_reordered_rows() {
    let expected = account(&[(1, "Alice"), (2, "Bob")]);
    let actual = account(&[(2, "Bob"), (1, "Alice")]);
    let engine = DiffEngine::new(&Config::default().with_row_matching(RowMatching::Positional));

    let (handler, result) = collect(&engine, &expected, &actual);
    result.unwrap();
    assert_eq!(handler.differences().len(), 4);
}

#[test]
fn test_same_dataset_instance_is_equal() {
    let dataset = Dataset::from_tables([account(&[(1, "Alice")])]).unwrap();
    Assertion::default().assert_equals(&dataset, &dataset).unwrap();
}

#[test]
fn test_csv_directory_against_json_fixture() {
    let fixture = TestFixture::new();
    fixture.create_csv(
        "expected/ACCOUNT.csv",
        &[vec!["ACC_ID", "ACC_NAME"], vec!["1", "Alice"], vec!["2", "Bob"]],
    );
    fixture.create_csv(
        "expected/CUSTOMER.csv",
        &[vec!["CUS_ID", "CUS_NAME"], vec!["10", "Acme"]],
    );
    let actual_path = fixture.create_json(
        "actual.json",
        &serde_json::json!({
            "CUSTOMER": [{"CUS_ID": 10, "CUS_NAME": "Acme"}],
            "ACCOUNT": [
                {"ACC_ID": 2, "ACC_NAME": "Bobby"},
                {"ACC_ID": 1, "ACC_NAME": "Alice"}
            ]
        }),
    );

    let factory = ParserFactory::new();
    let expected = factory.parse(&fixture.root().join("expected")).unwrap();
    let actual = factory.parse(&actual_path).unwrap();

    let outcomes = DiffEngine::default()
        .collect_datasets(&expected, &actual)
        .unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].table, "ACCOUNT");
    assert_eq!(outcomes[0].differences.len(), 1);
    assert_eq!(outcomes[0].differences[0].row, 1);
    assert!(outcomes[1].is_equal());
}

fn collect_files(expected: &std::path::Path, actual: &std::path::Path, config: &Config) -> Vec<dataassert::diff::TableOutcome> {
    let factory = ParserFactory::new();
    DiffEngine::new(config)
        .collect_datasets(&factory.parse(expected).unwrap(), &factory.parse(actual).unwrap())
        .unwrap()
}

#[test]
fn test_value_of_another_inferred_type_is_a_difference() {
    let fixture = TestFixture::new();
    let expected = fixture.create_csv(
        "expected/ACCOUNT.csv",
        &[vec!["ACC_ID", "ACC_NAME"], vec!["1", "Alice"]],
    );
    let actual = fixture.create_csv(
        "actual/ACCOUNT.csv",
        &[vec!["ACC_ID", "ACC_NAME"], vec!["1", "123"]],
    );

    let outcomes = collect_files(&expected, &actual, &Config::default());
    assert!(outcomes[0].failure.is_none());
    assert_eq!(outcomes[0].differences.len(), 1);
    let difference = &outcomes[0].differences[0];
    assert_eq!(difference.column, "ACC_NAME");
    assert_eq!(difference.expected, CellValue::from("Alice"));
    assert_eq!(difference.actual_display(), "123");
}

#[test]
fn test_numeric_text_in_json_equals_csv_number() {
    let fixture = TestFixture::new();
    let expected = fixture.create_csv(
        "ACCOUNT.csv",
        &[vec!["ACC_ID", "ACC_NAME"], vec!["1", "123"]],
    );
    let actual = fixture.create_json(
        "actual.json",
        &serde_json::json!({"ACCOUNT": [{"ACC_ID": 1, "ACC_NAME": "123"}]}),
    );

    let outcomes = collect_files(&expected, &actual, &Config::default());
    assert!(outcomes[0].is_equal());
}

#[test]
fn test_csv_padding_and_leading_zeros_are_compared() {
    let fixture = TestFixture::new();
    let expected = fixture.create_csv(
        "expected/ACCOUNT.csv",
        &[vec!["ACC_ID", "ACC_NAME", "ACC_CODE"], vec!["1", "Bob", "007"]],
    );
    let actual = fixture.create_csv(
        "actual/ACCOUNT.csv",
        &[vec!["ACC_ID", "ACC_NAME", "ACC_CODE"], vec!["1", "\"Bob  \"", "7"]],
    );

    let outcomes = collect_files(&expected, &actual, &Config::default());
    let columns: Vec<_> = outcomes[0]
        .differences
        .iter()
        .map(|d| d.column.as_str())
        .collect();
    assert_eq!(columns, vec!["ACC_CODE", "ACC_NAME"]);

    let outcomes = collect_files(&expected, &actual, &Config::default().with_ignore_whitespace(true));
    let columns: Vec<_> = outcomes[0]
        .differences
        .iter()
        .map(|d| d.column.as_str())
        .collect();
    assert_eq!(columns, vec!["ACC_CODE"]);
}
