//! Conversion of MySQL result rows into response rows.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use ndc_connector::schema::Row;
use ndc_connector::ConnectorError;
use serde_json::{json, Value};
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row as _, TypeInfo};
use tracing::debug;

use crate::connector::database_error;

/// How a column's values are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Bool,
    Int,
    Uint,
    Float,
    Text,
    DateTime,
    Timestamp,
    Date,
    Time,
    Json,
    Bytes,
}

fn column_kind(type_name: &str) -> ColumnKind {
    match type_name {
        "BOOLEAN" => ColumnKind::Bool,
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => ColumnKind::Int,
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" | "BIT" => ColumnKind::Uint,
        "FLOAT" | "DOUBLE" => ColumnKind::Float,
        "DATETIME" => ColumnKind::DateTime,
        "TIMESTAMP" => ColumnKind::Timestamp,
        "DATE" => ColumnKind::Date,
        "TIME" => ColumnKind::Time,
        "JSON" => ColumnKind::Json,
        "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY" => ColumnKind::Bytes,
        "VARCHAR" | "CHAR" | "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" | "SET"
        | "DECIMAL" => ColumnKind::Text,
        other => {
            debug!("Unknown MySQL type '{}', reading as text", other);
            ColumnKind::Text
        }
    }
}

/// Reads every row, keyed by the select-list aliases.
pub fn rows_to_json(rows: &[MySqlRow], aliases: &[String]) -> Result<Vec<Row>, ConnectorError> {
    rows.iter()
        .map(|row| {
            aliases
                .iter()
                .enumerate()
                .map(|(i, alias)| {
                    let value = column_value(row, i).map_err(database_error)?;
                    Ok((alias.clone(), value))
                })
                .collect()
        })
        .collect()
}

fn column_value(row: &MySqlRow, index: usize) -> Result<Value, sqlx::Error> {
    let column = &row.columns()[index];
    let value = match column_kind(column.type_info().name()) {
        ColumnKind::Bool => json!(row.try_get::<Option<bool>, _>(index)?),
        ColumnKind::Int => json!(row.try_get::<Option<i64>, _>(index)?),
        ColumnKind::Uint => json!(row.try_get::<Option<u64>, _>(index)?),
        ColumnKind::Float => json!(row.try_get::<Option<f64>, _>(index)?),
        ColumnKind::DateTime => json!(row
            .try_get::<Option<NaiveDateTime>, _>(index)?
            .map(|v| v.and_utc().to_rfc3339())),
        ColumnKind::Timestamp => json!(row
            .try_get::<Option<DateTime<Utc>>, _>(index)?
            .map(|v| v.to_rfc3339())),
        ColumnKind::Date => json!(row
            .try_get::<Option<NaiveDate>, _>(index)?
            .map(|v| v.to_string())),
        ColumnKind::Time => json!(row
            .try_get::<Option<NaiveTime>, _>(index)?
            .map(|v| v.to_string())),
        ColumnKind::Json => row
            .try_get::<Option<Value>, _>(index)?
            .unwrap_or(Value::Null),
        ColumnKind::Bytes => json!(row
            .try_get::<Option<Vec<u8>>, _>(index)?
            .map(|v| String::from_utf8_lossy(&v).into_owned())),
        ColumnKind::Text => json!(row.try_get_unchecked::<Option<String>, _>(index)?),
    };
    Ok(value)
}
