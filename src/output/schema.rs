//! Arrow mapping of table schemas and rows
//!
//! Rows arrive with upstream values mostly untouched; coercion to the
//! column's Arrow type happens here.

use crate::error::{Error, Result};
use crate::extract::Row;
use crate::schema::{SemanticType, TableSchema};
use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int64Array, Int64Builder, ListBuilder, StringArray,
    StringBuilder, TimestampMicrosecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;
use std::sync::Arc;

/// Timezone of every timestamp column
pub const TIMESTAMP_TZ: &str = "UTC";

/// Arrow type of a semantic column type
pub fn arrow_type(semantic_type: SemanticType) -> DataType {
    match semantic_type {
        SemanticType::String | SemanticType::Uuid | SemanticType::Json => DataType::Utf8,
        SemanticType::Int64 => DataType::Int64,
        SemanticType::Float64 => DataType::Float64,
        SemanticType::Bool => DataType::Boolean,
        SemanticType::Timestamp => {
            DataType::Timestamp(TimeUnit::Microsecond, Some(TIMESTAMP_TZ.into()))
        }
        SemanticType::Int64Array => {
            DataType::List(Arc::new(Field::new("item", DataType::Int64, true)))
        }
        SemanticType::StringArray => {
            DataType::List(Arc::new(Field::new("item", DataType::Utf8, true)))
        }
    }
}

/// Arrow schema of a table
///
/// Only the primary key is non-nullable.
pub fn arrow_schema(table: &TableSchema) -> Schema {
    let fields: Vec<Field> = table
        .columns
        .iter()
        .map(|c| Field::new(&c.name, arrow_type(c.semantic_type), !c.is_primary_key))
        .collect();
    Schema::new(fields)
}

/// Convert rows of one table into a RecordBatch
pub fn rows_to_batch(table: &TableSchema, rows: &[Row]) -> Result<RecordBatch> {
    let schema = Arc::new(arrow_schema(table));
    if let Some(row) = rows.iter().find(|r| r.len() != table.columns.len()) {
        return Err(Error::output(format!(
            "row of table {} has {} values, schema has {} columns",
            row.table,
            row.len(),
            table.columns.len()
        )));
    }

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(table.columns.len());
    for (idx, column) in table.columns.iter().enumerate() {
        let values: Vec<Option<&Value>> = rows
            .iter()
            .map(|r| r.values.get(idx).filter(|v| !v.is_null()))
            .collect();
        columns.push(build_array(&values, column.semantic_type));
    }

    RecordBatch::try_new(schema, columns).map_err(|e| {
        Error::output(format!("Failed to create RecordBatch for {}: {e}", table.name))
    })
}

fn build_array(values: &[Option<&Value>], semantic_type: SemanticType) -> ArrayRef {
    match semantic_type {
        SemanticType::String | SemanticType::Uuid | SemanticType::Json => {
            let arr: StringArray = values.iter().map(|v| v.map(as_text)).collect();
            Arc::new(arr)
        }
        SemanticType::Int64 => {
            let arr: Int64Array = values.iter().map(|v| v.and_then(as_i64)).collect();
            Arc::new(arr)
        }
        SemanticType::Float64 => {
            let arr: Float64Array = values.iter().map(|v| v.and_then(as_f64)).collect();
            Arc::new(arr)
        }
        SemanticType::Bool => {
            let arr: BooleanArray = values.iter().map(|v| v.and_then(as_bool)).collect();
            Arc::new(arr)
        }
        SemanticType::Timestamp => {
            let arr: TimestampMicrosecondArray =
                values.iter().map(|v| v.and_then(as_timestamp_micros)).collect();
            Arc::new(arr.with_timezone(TIMESTAMP_TZ))
        }
        SemanticType::Int64Array => {
            let mut builder = ListBuilder::new(Int64Builder::new());
            for value in values {
                match value.map(|v| multi_values(v)) {
                    Some(items) => {
                        for item in items {
                            builder.values().append_option(as_i64(item));
                        }
                        builder.append(true);
                    }
                    None => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
        SemanticType::StringArray => {
            let mut builder = ListBuilder::new(StringBuilder::new());
            for value in values {
                match value.map(|v| multi_values(v)) {
                    Some(items) => {
                        for item in items {
                            builder
                                .values()
                                .append_option((!item.is_null()).then(|| as_text(item)));
                        }
                        builder.append(true);
                    }
                    None => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
    }
}

/// Strings as is, anything else as JSON text
fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        Value::String(s) => match s.as_str() {
            "true" | "True" | "1" => Some(true),
            "false" | "False" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// RFC 3339 timestamps, or naive ones taken as UTC
fn as_timestamp_micros(value: &Value) -> Option<i64> {
    let text = value.as_str()?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.timestamp_micros());
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|ts| ts.and_utc().timestamp_micros())
}

/// Elements of a multi-valued field
///
/// Verbose payloads wrap them as `{"results": [...]}`; a scalar is a
/// single-element list.
fn multi_values(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(obj) => match obj.get("results") {
            Some(Value::Array(items)) => items.iter().collect(),
            _ => vec![value],
        },
        scalar => vec![scalar],
    }
}
