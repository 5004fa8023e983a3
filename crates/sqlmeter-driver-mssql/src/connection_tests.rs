//! Unit tests for tiberius value conversion

use crate::connection::{column_data_to_value, values_to_tiberius_params, MssqlConnectionError};
use pretty_assertions::assert_eq;
use sqlmeter_core::{MeterError, Value};
use std::borrow::Cow;
use tiberius::{ColumnData, ToSql};

#[test]
fn test_null_columns_map_to_null() {
    assert_eq!(column_data_to_value(ColumnData::Bit(None)), Value::Null);
    assert_eq!(column_data_to_value(ColumnData::I64(None)), Value::Null);
    assert_eq!(column_data_to_value(ColumnData::String(None)), Value::Null);
    assert_eq!(column_data_to_value(ColumnData::Binary(None)), Value::Null);
}

#[test]
fn test_integer_columns() {
    assert_eq!(
        column_data_to_value(ColumnData::U8(Some(5))),
        Value::Int16(5)
    );
    assert_eq!(
        column_data_to_value(ColumnData::I16(Some(-3))),
        Value::Int16(-3)
    );
    assert_eq!(
        column_data_to_value(ColumnData::I32(Some(12))),
        Value::Int32(12)
    );
    assert_eq!(
        column_data_to_value(ColumnData::I64(Some(1_000_000))),
        Value::Int64(1_000_000)
    );
}

#[test]
fn test_float_and_bool_columns() {
    assert_eq!(
        column_data_to_value(ColumnData::F64(Some(2.5))),
        Value::Float64(2.5)
    );
    assert_eq!(
        column_data_to_value(ColumnData::Bit(Some(true))),
        Value::Bool(true)
    );
}

#[test]
fn test_string_and_binary_columns() {
    assert_eq!(
        column_data_to_value(ColumnData::String(Some(Cow::Borrowed("Reads")))),
        Value::String("Reads".to_string())
    );
    assert_eq!(
        column_data_to_value(ColumnData::Binary(Some(Cow::Owned(vec![0xab, 0xcd])))),
        Value::Bytes(vec![0xab, 0xcd])
    );
}

#[test]
fn test_param_conversion_preserves_primitive_types() {
    let params = values_to_tiberius_params(&[
        Value::Null,
        Value::Bool(true),
        Value::Int64(99),
        Value::Bytes(vec![1, 2]),
    ]);

    assert!(matches!(params[0].to_sql(), ColumnData::I32(None)));
    assert!(matches!(params[1].to_sql(), ColumnData::Bit(Some(true))));
    assert!(matches!(params[2].to_sql(), ColumnData::I64(Some(99))));
    assert!(matches!(params[3].to_sql(), ColumnData::Binary(Some(_))));
}

#[test]
fn test_param_conversion_stringifies_temporal_values() {
    let date = chrono::NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    let params = values_to_tiberius_params(&[Value::Date(date)]);

    match params[0].to_sql() {
        ColumnData::String(Some(s)) => assert_eq!(s.as_ref(), "2026-03-01"),
        other => panic!("expected string param, got {:?}", other),
    }
}

#[test]
fn test_connection_error_converts_to_driver_error() {
    let err: MeterError = MssqlConnectionError::ConnectionClosed.into();
    assert!(matches!(err, MeterError::Driver(_)));
    assert_eq!(err.to_string(), "Driver error: Connection is closed");
}
