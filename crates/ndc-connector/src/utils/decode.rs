//! Typed accessors over JSON argument maps.
//!
//! Generated `FromValue` implementations call the narrowest accessor for each
//! field (`get_int::<i32>`, `get_nullable_string`, ...). The value-level
//! `decode_*` methods are the building blocks; array element decoders are
//! passed as closures so nested shapes compose.

use std::num::IntErrorKind;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

/// A value in an argument map could not be decoded into its Rust type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("{key}: field is required")]
    Required { key: String },

    #[error("{key}: expected {expected}, got {found}")]
    InvalidType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{key}: {value} is out of range for {target}")]
    OutOfRange {
        key: String,
        value: String,
        target: &'static str,
    },

    #[error("{key}: {message}")]
    Invalid { key: String, message: String },
}

impl ValueError {
    pub fn key(&self) -> &str {
        match self {
            ValueError::Required { key }
            | ValueError::InvalidType { key, .. }
            | ValueError::OutOfRange { key, .. }
            | ValueError::Invalid { key, .. } => key,
        }
    }

    /// Prefixes the key with the enclosing field name.
    fn within(self, parent: &str) -> Self {
        let nest = |key: String| format!("{parent}.{key}");
        match self {
            ValueError::Required { key } => ValueError::Required { key: nest(key) },
            ValueError::InvalidType {
                key,
                expected,
                found,
            } => ValueError::InvalidType {
                key: nest(key),
                expected,
                found,
            },
            ValueError::OutOfRange { key, value, target } => ValueError::OutOfRange {
                key: nest(key),
                value,
                target,
            },
            ValueError::Invalid { key, message } => ValueError::Invalid {
                key: nest(key),
                message,
            },
        }
    }
}

/// A string is not one of an enum scalar's values.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid {type_name} value {value:?}; allowed values: {}", .allowed.join(", "))]
pub struct EnumValueError {
    pub type_name: &'static str,
    pub value: String,
    pub allowed: &'static [&'static str],
}

impl EnumValueError {
    pub fn new(type_name: &'static str, value: &str, allowed: &'static [&'static str]) -> Self {
        Self {
            type_name,
            value: value.to_string(),
            allowed,
        }
    }
}

/// Types decodable from an argument object.
pub trait FromValue: Sized {
    fn from_value(decoder: &Decoder, input: &Map<String, Value>) -> Result<Self, ValueError>;
}

/// Signed integer targets of [`Decoder::get_int`].
pub trait IntValue: Sized + Copy {
    const NAME: &'static str;
    fn from_i64(value: i64) -> Option<Self>;
}

/// Unsigned integer targets of [`Decoder::get_uint`].
pub trait UintValue: Sized + Copy {
    const NAME: &'static str;
    fn from_u64(value: u64) -> Option<Self>;
}

/// Floating point targets of [`Decoder::get_float`].
pub trait FloatValue: Sized + Copy {
    const NAME: &'static str;
    fn from_f64(value: f64) -> Option<Self>;
}

macro_rules! impl_int_value {
    ($($t:ty),*) => {
        $(impl IntValue for $t {
            const NAME: &'static str = stringify!($t);
            fn from_i64(value: i64) -> Option<Self> {
                <$t>::try_from(value).ok()
            }
        })*
    };
}

macro_rules! impl_uint_value {
    ($($t:ty),*) => {
        $(impl UintValue for $t {
            const NAME: &'static str = stringify!($t);
            fn from_u64(value: u64) -> Option<Self> {
                <$t>::try_from(value).ok()
            }
        })*
    };
}

impl_int_value!(i8, i16, i32, i64, isize);
impl_uint_value!(u8, u16, u32, u64, usize);

impl FloatValue for f32 {
    const NAME: &'static str = "f32";
    fn from_f64(value: f64) -> Option<Self> {
        if value.is_finite() && value.abs() > f32::MAX as f64 {
            None
        } else {
            Some(value as f32)
        }
    }
}

impl FloatValue for f64 {
    const NAME: &'static str = "f64";
    fn from_f64(value: f64) -> Option<Self> {
        Some(value)
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn invalid_type(key: &str, expected: &'static str, value: &Value) -> ValueError {
    ValueError::InvalidType {
        key: key.to_string(),
        expected,
        found: json_kind(value),
    }
}

fn invalid(key: &str, message: impl std::fmt::Display) -> ValueError {
    ValueError::Invalid {
        key: key.to_string(),
        message: message.to_string(),
    }
}

/// Decoding options threaded through every generated call site.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    numeric_strings: bool,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also accept numbers encoded as JSON strings, e.g. `"42"`.
    pub fn with_numeric_strings(mut self, enabled: bool) -> Self {
        self.numeric_strings = enabled;
        self
    }

    fn required<'a>(input: &'a Map<String, Value>, key: &str) -> Result<&'a Value, ValueError> {
        match input.get(key) {
            None | Some(Value::Null) => Err(ValueError::Required {
                key: key.to_string(),
            }),
            Some(value) => Ok(value),
        }
    }

    fn optional<'a>(input: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
        input.get(key).filter(|v| !v.is_null())
    }

    fn numeric_string<'a>(&self, value: &'a Value) -> Option<&'a str> {
        match value {
            Value::String(s) if self.numeric_strings => Some(s.trim()),
            _ => None,
        }
    }

    pub fn decode_bool(&self, value: &Value, key: &str) -> Result<bool, ValueError> {
        value
            .as_bool()
            .ok_or_else(|| invalid_type(key, "boolean", value))
    }

    pub fn decode_string(&self, value: &Value, key: &str) -> Result<String, ValueError> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| invalid_type(key, "string", value))
    }

    fn decode_i64(&self, value: &Value, key: &str) -> Result<i64, ValueError> {
        if let Some(s) = self.numeric_string(value) {
            return s.parse::<i64>().map_err(|e| invalid(key, e));
        }
        let n = match value {
            Value::Number(n) => n,
            other => return Err(invalid_type(key, "integer", other)),
        };
        if let Some(i) = n.as_i64() {
            return Ok(i);
        }
        if n.as_u64().is_some() {
            return Err(ValueError::OutOfRange {
                key: key.to_string(),
                value: n.to_string(),
                target: "i64",
            });
        }
        match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
                Ok(f as i64)
            }
            _ => Err(invalid(key, format_args!("{n} is not an integer"))),
        }
    }

    fn decode_u64(&self, value: &Value, key: &str) -> Result<u64, ValueError> {
        if let Some(s) = self.numeric_string(value) {
            return s.parse::<u64>().map_err(|e| invalid(key, e));
        }
        let n = match value {
            Value::Number(n) => n,
            other => return Err(invalid_type(key, "unsigned integer", other)),
        };
        if let Some(u) = n.as_u64() {
            return Ok(u);
        }
        if n.as_i64().is_some() {
            return Err(ValueError::OutOfRange {
                key: key.to_string(),
                value: n.to_string(),
                target: "u64",
            });
        }
        match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f >= 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
            _ => Err(invalid(key, format_args!("{n} is not an unsigned integer"))),
        }
    }

    pub fn decode_int<T: IntValue>(&self, value: &Value, key: &str) -> Result<T, ValueError> {
        let raw = self.decode_i64(value, key)?;
        T::from_i64(raw).ok_or_else(|| ValueError::OutOfRange {
            key: key.to_string(),
            value: raw.to_string(),
            target: T::NAME,
        })
    }

    pub fn decode_uint<T: UintValue>(&self, value: &Value, key: &str) -> Result<T, ValueError> {
        let raw = self.decode_u64(value, key)?;
        T::from_u64(raw).ok_or_else(|| ValueError::OutOfRange {
            key: key.to_string(),
            value: raw.to_string(),
            target: T::NAME,
        })
    }

    pub fn decode_float<T: FloatValue>(&self, value: &Value, key: &str) -> Result<T, ValueError> {
        let raw = match self.numeric_string(value) {
            Some(s) => s.parse::<f64>().map_err(|e| invalid(key, e))?,
            None => value
                .as_f64()
                .ok_or_else(|| invalid_type(key, "number", value))?,
        };
        T::from_f64(raw).ok_or_else(|| ValueError::OutOfRange {
            key: key.to_string(),
            value: raw.to_string(),
            target: T::NAME,
        })
    }

    /// Accepts an RFC 3339 string or integer Unix milliseconds.
    pub fn decode_date_time(&self, value: &Value, key: &str) -> Result<DateTime<Utc>, ValueError> {
        match value {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| invalid(key, e)),
            Value::Number(_) => {
                let millis = self.decode_i64(value, key)?;
                Utc.timestamp_millis_opt(millis)
                    .single()
                    .ok_or_else(|| invalid(key, format_args!("{millis} is not a valid timestamp")))
            }
            other => Err(invalid_type(key, "timestamp", other)),
        }
    }

    /// Accepts integer nanoseconds or a duration string such as `1h30m` or
    /// `250ms`.
    pub fn decode_duration(&self, value: &Value, key: &str) -> Result<Duration, ValueError> {
        match value {
            Value::String(s) if !(self.numeric_strings && s.trim().parse::<u64>().is_ok()) => {
                parse_duration(s).map_err(|message| invalid(key, message))
            }
            _ => self.decode_u64(value, key).map(Duration::from_nanos),
        }
    }

    pub fn decode_json(&self, value: &Value, _key: &str) -> Result<Value, ValueError> {
        Ok(value.clone())
    }

    /// Custom scalars decode through their own `Deserialize` impl.
    pub fn decode_scalar<T: DeserializeOwned>(&self, value: &Value, key: &str) -> Result<T, ValueError> {
        serde_json::from_value(value.clone()).map_err(|e| invalid(key, e))
    }

    pub fn decode_object<T: FromValue>(&self, value: &Value, key: &str) -> Result<T, ValueError> {
        self.decode_object_with(value, key, T::from_value)
    }

    /// Decodes an object with `decode_fields`, for shapes that have no
    /// `FromValue` impl. Errors are keyed under `key`.
    pub fn decode_object_with<T, F>(&self, value: &Value, key: &str, decode_fields: F) -> Result<T, ValueError>
    where
        F: FnOnce(&Decoder, &Map<String, Value>) -> Result<T, ValueError>,
    {
        match value {
            Value::Object(map) => decode_fields(self, map).map_err(|e| e.within(key)),
            other => Err(invalid_type(key, "object", other)),
        }
    }

    pub fn decode_array<T, F>(&self, value: &Value, key: &str, decode_item: F) -> Result<Vec<T>, ValueError>
    where
        F: Fn(&Decoder, &Value, &str) -> Result<T, ValueError>,
    {
        let items = value
            .as_array()
            .ok_or_else(|| invalid_type(key, "array", value))?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| decode_item(self, item, &format!("{key}[{i}]")))
            .collect()
    }

    /// Null decodes to `None`; anything else goes through `decode_inner`.
    pub fn decode_nullable<T, F>(&self, value: &Value, key: &str, decode_inner: F) -> Result<Option<T>, ValueError>
    where
        F: Fn(&Decoder, &Value, &str) -> Result<T, ValueError>,
    {
        if value.is_null() {
            Ok(None)
        } else {
            decode_inner(self, value, key).map(Some)
        }
    }

    pub fn get_bool(&self, input: &Map<String, Value>, key: &str) -> Result<bool, ValueError> {
        self.decode_bool(Self::required(input, key)?, key)
    }

    pub fn get_nullable_bool(&self, input: &Map<String, Value>, key: &str) -> Result<Option<bool>, ValueError> {
        Self::optional(input, key)
            .map(|v| self.decode_bool(v, key))
            .transpose()
    }

    pub fn get_string(&self, input: &Map<String, Value>, key: &str) -> Result<String, ValueError> {
        self.decode_string(Self::required(input, key)?, key)
    }

    pub fn get_nullable_string(&self, input: &Map<String, Value>, key: &str) -> Result<Option<String>, ValueError> {
        Self::optional(input, key)
            .map(|v| self.decode_string(v, key))
            .transpose()
    }

    pub fn get_int<T: IntValue>(&self, input: &Map<String, Value>, key: &str) -> Result<T, ValueError> {
        self.decode_int(Self::required(input, key)?, key)
    }

    pub fn get_nullable_int<T: IntValue>(&self, input: &Map<String, Value>, key: &str) -> Result<Option<T>, ValueError> {
        Self::optional(input, key)
            .map(|v| self.decode_int(v, key))
            .transpose()
    }

    pub fn get_uint<T: UintValue>(&self, input: &Map<String, Value>, key: &str) -> Result<T, ValueError> {
        self.decode_uint(Self::required(input, key)?, key)
    }

    pub fn get_nullable_uint<T: UintValue>(&self, input: &Map<String, Value>, key: &str) -> Result<Option<T>, ValueError> {
        Self::optional(input, key)
            .map(|v| self.decode_uint(v, key))
            .transpose()
    }

    pub fn get_float<T: FloatValue>(&self, input: &Map<String, Value>, key: &str) -> Result<T, ValueError> {
        self.decode_float(Self::required(input, key)?, key)
    }

    pub fn get_nullable_float<T: FloatValue>(&self, input: &Map<String, Value>, key: &str) -> Result<Option<T>, ValueError> {
        Self::optional(input, key)
            .map(|v| self.decode_float(v, key))
            .transpose()
    }

    pub fn get_date_time(&self, input: &Map<String, Value>, key: &str) -> Result<DateTime<Utc>, ValueError> {
        self.decode_date_time(Self::required(input, key)?, key)
    }

    pub fn get_nullable_date_time(
        &self,
        input: &Map<String, Value>,
        key: &str,
    ) -> Result<Option<DateTime<Utc>>, ValueError> {
        Self::optional(input, key)
            .map(|v| self.decode_date_time(v, key))
            .transpose()
    }

    pub fn get_duration(&self, input: &Map<String, Value>, key: &str) -> Result<Duration, ValueError> {
        self.decode_duration(Self::required(input, key)?, key)
    }

    pub fn get_nullable_duration(&self, input: &Map<String, Value>, key: &str) -> Result<Option<Duration>, ValueError> {
        Self::optional(input, key)
            .map(|v| self.decode_duration(v, key))
            .transpose()
    }

    /// Any JSON value, including null, as long as the key is present.
    pub fn get_arbitrary_json(&self, input: &Map<String, Value>, key: &str) -> Result<Value, ValueError> {
        input.get(key).cloned().ok_or_else(|| ValueError::Required {
            key: key.to_string(),
        })
    }

    pub fn get_nullable_arbitrary_json(&self, input: &Map<String, Value>, key: &str) -> Result<Option<Value>, ValueError> {
        Ok(Self::optional(input, key).cloned())
    }

    pub fn get_scalar<T: DeserializeOwned>(&self, input: &Map<String, Value>, key: &str) -> Result<T, ValueError> {
        self.decode_scalar(Self::required(input, key)?, key)
    }

    pub fn get_nullable_scalar<T: DeserializeOwned>(
        &self,
        input: &Map<String, Value>,
        key: &str,
    ) -> Result<Option<T>, ValueError> {
        Self::optional(input, key)
            .map(|v| self.decode_scalar(v, key))
            .transpose()
    }

    pub fn get_array<T, F>(&self, input: &Map<String, Value>, key: &str, decode_item: F) -> Result<Vec<T>, ValueError>
    where
        F: Fn(&Decoder, &Value, &str) -> Result<T, ValueError>,
    {
        self.decode_array(Self::required(input, key)?, key, decode_item)
    }

    pub fn get_nullable_array<T, F>(
        &self,
        input: &Map<String, Value>,
        key: &str,
        decode_item: F,
    ) -> Result<Option<Vec<T>>, ValueError>
    where
        F: Fn(&Decoder, &Value, &str) -> Result<T, ValueError>,
    {
        Self::optional(input, key)
            .map(|v| self.decode_array(v, key, &decode_item))
            .transpose()
    }

    pub fn get_object_with<T, F>(&self, input: &Map<String, Value>, key: &str, decode_fields: F) -> Result<T, ValueError>
    where
        F: FnOnce(&Decoder, &Map<String, Value>) -> Result<T, ValueError>,
    {
        self.decode_object_with(Self::required(input, key)?, key, decode_fields)
    }

    pub fn get_nullable_object_with<T, F>(
        &self,
        input: &Map<String, Value>,
        key: &str,
        decode_fields: F,
    ) -> Result<Option<T>, ValueError>
    where
        F: FnOnce(&Decoder, &Map<String, Value>) -> Result<T, ValueError>,
    {
        Self::optional(input, key)
            .map(|v| self.decode_object_with(v, key, decode_fields))
            .transpose()
    }

    pub fn decode_object_value<T: FromValue>(&self, input: &Map<String, Value>, key: &str) -> Result<T, ValueError> {
        self.decode_object(Self::required(input, key)?, key)
    }

    pub fn decode_nullable_object_value<T: FromValue>(
        &self,
        input: &Map<String, Value>,
        key: &str,
    ) -> Result<Option<T>, ValueError> {
        Self::optional(input, key)
            .map(|v| self.decode_object(v, key))
            .transpose()
    }
}

/// Parses a duration such as `1h30m`, `1.5s` or `250ms`. Supported units are
/// `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let trimmed = input.trim();
    if trimmed.starts_with('-') {
        return Err(format!("negative duration {input:?} is not supported"));
    }
    let mut rest = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(format!("invalid duration {input:?}"));
    }

    let overflow = || format!("duration {input:?} overflows");
    let mut total: u128 = 0;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_end == 0 {
            return Err(format!("invalid duration {input:?}"));
        }
        let (number, tail) = rest.split_at(number_end);
        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);

        let scale: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60 * 1_000_000_000,
            "h" => 3_600 * 1_000_000_000,
            "" => return Err(format!("missing unit in duration {input:?}")),
            other => return Err(format!("unknown unit {other:?} in duration {input:?}")),
        };

        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse::<u128>().map_err(|e| match e.kind() {
                IntErrorKind::PosOverflow => overflow(),
                _ => format!("invalid duration {input:?}"),
            })?
        };
        let fraction: f64 = if fraction.is_empty() {
            0.0
        } else {
            format!("0.{fraction}")
                .parse()
                .map_err(|_| format!("invalid duration {input:?}"))?
        };

        let nanos = whole
            .checked_mul(scale)
            .and_then(|n| n.checked_add((fraction * scale as f64).round() as u128))
            .ok_or_else(overflow)?;
        total = total.checked_add(nanos).ok_or_else(overflow)?;
        rest = tail;
    }

    u64::try_from(total)
        .map(Duration::from_nanos)
        .map_err(|_| overflow())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test input must be an object"),
        }
    }

    #[test]
    fn test_get_int_narrows_width() {
        let decoder = Decoder::new();
        let args = input(json!({"small": 12, "big": 300, "float": 3.0, "frac": 1.5}));
        assert_eq!(decoder.get_int::<i8>(&args, "small").unwrap(), 12);
        assert_eq!(decoder.get_int::<i32>(&args, "float").unwrap(), 3);
        assert!(matches!(
            decoder.get_int::<i8>(&args, "big"),
            Err(ValueError::OutOfRange { target: "i8", .. })
        ));
        assert!(decoder.get_int::<i64>(&args, "frac").is_err());
    }

    #[test]
    fn test_get_uint_rejects_negative() {
        let args = input(json!({"n": -1}));
        assert!(matches!(
            Decoder::new().get_uint::<u32>(&args, "n"),
            Err(ValueError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_required_and_nullable() {
        let decoder = Decoder::new();
        let args = input(json!({"present": "x", "null": null}));
        assert_eq!(decoder.get_string(&args, "present").unwrap(), "x");
        assert_eq!(
            decoder.get_string(&args, "missing").unwrap_err(),
            ValueError::Required { key: "missing".to_string() }
        );
        assert!(decoder.get_string(&args, "null").is_err());
        assert_eq!(decoder.get_nullable_string(&args, "null").unwrap(), None);
        assert_eq!(decoder.get_nullable_string(&args, "missing").unwrap(), None);
    }

    #[test]
    fn test_numeric_strings_option() {
        let args = input(json!({"limit": "10"}));
        assert!(Decoder::new().get_float::<f64>(&args, "limit").is_err());
        let lenient = Decoder::new().with_numeric_strings(true);
        assert_eq!(lenient.get_float::<f64>(&args, "limit").unwrap(), 10.0);
        assert_eq!(lenient.get_int::<i16>(&args, "limit").unwrap(), 10);
    }

    #[test]
    fn test_get_float_f32_overflow() {
        let args = input(json!({"x": 1e300}));
        assert!(Decoder::new().get_float::<f32>(&args, "x").is_err());
        assert_eq!(Decoder::new().get_float::<f64>(&args, "x").unwrap(), 1e300);
    }

    #[test]
    fn test_get_date_time() {
        let decoder = Decoder::new();
        let args = input(json!({"at": "2024-01-02T03:04:05Z", "ms": 1_000, "bad": "yesterday"}));
        let at = decoder.get_date_time(&args, "at").unwrap();
        assert_eq!(at.to_rfc3339(), "2024-01-02T03:04:05+00:00");
        assert_eq!(decoder.get_date_time(&args, "ms").unwrap().timestamp(), 1);
        assert!(decoder.get_date_time(&args, "bad").is_err());
    }

    #[test]
    fn test_get_duration() {
        let decoder = Decoder::new();
        let args = input(json!({"nanos": 1_500, "text": "1h30m", "frac": "1.5s", "neg": "-1s"}));
        assert_eq!(decoder.get_duration(&args, "nanos").unwrap(), Duration::from_nanos(1_500));
        assert_eq!(decoder.get_duration(&args, "text").unwrap(), Duration::from_secs(5_400));
        assert_eq!(decoder.get_duration(&args, "frac").unwrap(), Duration::from_millis(1_500));
        assert!(decoder.get_duration(&args, "neg").is_err());
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("3µs").unwrap(), Duration::from_micros(3));
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("5d").is_err());
        assert!(parse_duration("").is_err());
    }

    #[derive(Debug, PartialEq)]
    struct Point {
        lat: f64,
        label: Option<String>,
    }

    fn decode_point(decoder: &Decoder, input: &Map<String, Value>) -> Result<Point, ValueError> {
        Ok(Point {
            lat: decoder.get_float::<f64>(input, "lat")?,
            label: decoder.get_nullable_string(input, "label")?,
        })
    }

    #[test]
    fn test_get_object_with_nests_error_keys() {
        let decoder = Decoder::new();
        let args = input(json!({"point": {"lat": 1.5}, "bad": {"lat": "x"}, "none": null, "list": [{"lat": 2}, 3]}));
        assert_eq!(
            decoder.get_object_with(&args, "point", decode_point).unwrap(),
            Point { lat: 1.5, label: None }
        );
        let err = decoder.get_object_with(&args, "bad", decode_point).unwrap_err();
        assert_eq!(err.key(), "bad.lat");
        assert_eq!(decoder.get_nullable_object_with(&args, "none", decode_point).unwrap(), None);
        assert!(matches!(
            decoder.get_object_with(&args, "missing", decode_point),
            Err(ValueError::Required { .. })
        ));
        let err = decoder
            .get_array(&args, "list", |d, v, k| d.decode_object_with(v, k, decode_point))
            .unwrap_err();
        assert_eq!(err.key(), "list[1]");
    }

    #[test]
    fn test_parse_duration_overflow_is_an_error() {
        let huge = format!("{}h", "9".repeat(38));
        assert_eq!(parse_duration(&huge).unwrap_err(), format!("duration {huge:?} overflows"));
        let too_many_digits = format!("{}ns", "9".repeat(60));
        assert!(parse_duration(&too_many_digits).unwrap_err().ends_with("overflows"));
        let sum = format!("{}h{}h", u64::MAX, u64::MAX);
        assert!(parse_duration(&sum).unwrap_err().ends_with("overflows"));
        assert!(parse_duration("5124095h").is_ok());
    }

    #[test]
    fn test_get_array_reports_element_key() {
        let decoder = Decoder::new();
        let args = input(json!({"names": ["a", 1]}));
        let err = decoder
            .get_array(&args, "names", |d, v, k| d.decode_string(v, k))
            .unwrap_err();
        assert_eq!(err.key(), "names[1]");
    }

    #[test]
    fn test_nullable_array_elements() {
        let decoder = Decoder::new();
        let args = input(json!({"ids": [1, null, 3]}));
        let ids = decoder
            .get_array(&args, "ids", |d, v, k| {
                d.decode_nullable(v, k, |d, v, k| d.decode_int::<i64>(v, k))
            })
            .unwrap();
        assert_eq!(ids, vec![Some(1), None, Some(3)]);
    }

    struct Author {
        name: String,
    }

    impl FromValue for Author {
        fn from_value(decoder: &Decoder, input: &Map<String, Value>) -> Result<Self, ValueError> {
            Ok(Self {
                name: decoder.get_string(input, "name")?,
            })
        }
    }

    #[test]
    fn test_decode_object_value_nests_keys() {
        let decoder = Decoder::new();
        let args = input(json!({"author": {"name": "Ann"}, "broken": {}}));
        let author: Author = decoder.decode_object_value(&args, "author").unwrap();
        assert_eq!(author.name, "Ann");
        let err = decoder.decode_object_value::<Author>(&args, "broken").err().unwrap();
        assert_eq!(err.key(), "broken.name");
        let none: Option<Author> = decoder.decode_nullable_object_value(&args, "missing").unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn test_enum_value_error_lists_allowed_values() {
        let err = EnumValueError::new("SomeEnum", "baz", &["foo", "bar"]);
        assert_eq!(
            err.to_string(),
            r#"invalid SomeEnum value "baz"; allowed values: foo, bar"#
        );
    }

    #[test]
    fn test_arbitrary_json_keeps_null() {
        let decoder = Decoder::new();
        let args = input(json!({"raw": null}));
        assert_eq!(decoder.get_arbitrary_json(&args, "raw").unwrap(), Value::Null);
        assert!(decoder.get_arbitrary_json(&args, "absent").is_err());
        assert_eq!(decoder.get_nullable_arbitrary_json(&args, "raw").unwrap(), None);
    }
}
