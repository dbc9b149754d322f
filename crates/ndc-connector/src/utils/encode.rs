//! Result encoding helpers used by generated `ToMap` code.

use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ConnectorError;

/// Object types returned from functions and procedures.
pub trait ToMap {
    fn to_map(&self) -> Map<String, Value>;
}

/// Custom scalar types; the name is the one published in the schema.
pub trait ScalarName {
    fn scalar_name() -> &'static str;
}

impl<T: ToMap + ?Sized> ToMap for &T {
    fn to_map(&self) -> Map<String, Value> {
        (**self).to_map()
    }
}

/// Encodes a scalar through its `Serialize` impl. `None` becomes null.
pub fn encode_value<T: Serialize + ?Sized>(value: &T) -> Value {
    match serde_json::to_value(value) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("failed to encode value: {}", e);
            Value::Null
        }
    }
}

/// Durations are encoded as integer nanoseconds.
pub fn encode_duration(value: &Duration) -> Value {
    let nanos = u64::try_from(value.as_nanos()).unwrap_or(u64::MAX);
    Value::from(nanos)
}

pub fn encode_nullable_duration(value: &Option<Duration>) -> Value {
    value.as_ref().map_or(Value::Null, encode_duration)
}

pub fn encode_map<T: ToMap>(value: &T) -> Value {
    Value::Object(value.to_map())
}

pub fn encode_maps<T: ToMap>(values: &[T]) -> Value {
    Value::Array(values.iter().map(encode_map).collect())
}

pub fn encode_nullable_map<T: ToMap>(value: &Option<T>) -> Value {
    value.as_ref().map_or(Value::Null, encode_map)
}

pub fn encode_nullable_maps<T: ToMap>(values: &Option<Vec<T>>) -> Value {
    values.as_deref().map_or(Value::Null, encode_maps)
}

/// Rejects a null encoding of a result declared non-nullable.
pub fn check_result(value: Value) -> Result<Value, ConnectorError> {
    if value.is_null() {
        Err(ConnectorError::bad_request("expected not null result", Value::Null))
    } else {
        Ok(value)
    }
}
