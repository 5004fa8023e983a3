//! Unit tests for core value and result types

use crate::{ColumnMeta, QueryResult, Row, Value};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;

fn dml_row() -> Row {
    Row::new(
        vec![
            "plan_handle".to_string(),
            "execution_count".to_string(),
            "query_class".to_string(),
        ],
        vec![
            Value::Bytes(vec![0xde, 0xad]),
            Value::Int64(42),
            Value::String("Reads".to_string()),
        ],
    )
}

#[test]
fn test_value_is_null() {
    assert!(Value::Null.is_null());
    assert!(!Value::Int64(0).is_null());
}

#[test]
fn test_value_as_i64_widens_integers() {
    assert_eq!(Value::Int16(7).as_i64(), Some(7));
    assert_eq!(Value::Int32(7).as_i64(), Some(7));
    assert_eq!(Value::Int64(7).as_i64(), Some(7));
    assert_eq!(Value::String("7".to_string()).as_i64(), Some(7));
    assert_eq!(Value::Float64(7.0).as_i64(), None);
}

#[test]
fn test_value_as_f64_parses_decimal() {
    assert_eq!(Value::Decimal("12.5".to_string()).as_f64(), Some(12.5));
    assert_eq!(Value::Float32(0.5).as_f64(), Some(0.5));
    assert_eq!(Value::Bytes(vec![1]).as_f64(), None);
}

#[test]
fn test_value_as_bytes() {
    assert_eq!(
        Value::Bytes(vec![1, 2, 3]).as_bytes(),
        Some([1u8, 2, 3].as_slice())
    );
    assert_eq!(Value::String("abc".to_string()).as_bytes(), None);
}

#[test]
fn test_value_as_datetime_flattens_utc() {
    let naive = NaiveDate::from_ymd_opt(2026, 3, 1)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap();
    assert_eq!(Value::DateTime(naive).as_datetime(), Some(naive));

    let utc = naive.and_utc();
    assert_eq!(Value::DateTimeUtc(utc).as_datetime(), Some(naive));
    assert_eq!(Value::Int64(1).as_datetime(), None);
}

#[test]
fn test_value_display_renders_bytes_as_hex() {
    assert_eq!(Value::Bytes(vec![0xab, 0x01]).to_string(), "0xab01");
    assert_eq!(Value::Null.to_string(), "NULL");
    assert_eq!(Value::Int64(9).to_string(), "9");
}

#[test]
fn test_row_get_by_name() {
    let row = dml_row();
    assert_eq!(row.get_by_name("execution_count"), Some(&Value::Int64(42)));
    assert_eq!(
        row.get_by_name("query_class"),
        Some(&Value::String("Reads".to_string()))
    );
    assert_eq!(row.get_by_name("missing"), None);
}

#[test]
fn test_row_get_by_index() {
    let row = dml_row();
    assert_eq!(row.get(1), Some(&Value::Int64(42)));
    assert_eq!(row.get(9), None);
}

#[test]
fn test_row_display_pairs_columns_and_values() {
    let row = dml_row();
    assert_eq!(
        row.to_string(),
        "plan_handle=0xdead execution_count=42 query_class=Reads"
    );
}

#[test]
fn test_query_result_empty() {
    let result = QueryResult::empty();
    assert!(!result.has_rows());
    assert_eq!(result.row_count(), 0);
    assert_eq!(result.column_count(), 0);
}

#[test]
fn test_query_result_counts() {
    let mut result = QueryResult::empty();
    result.columns = vec![ColumnMeta {
        name: "connection_count".to_string(),
        data_type: "Int4".to_string(),
        ordinal: 0,
    }];
    result.rows = vec![Row::new(
        vec!["connection_count".to_string()],
        vec![Value::Int32(12)],
    )];

    assert!(result.has_rows());
    assert_eq!(result.row_count(), 1);
    assert_eq!(result.column_count(), 1);
}
