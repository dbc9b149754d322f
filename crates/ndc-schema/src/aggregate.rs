//! Aggregates requested alongside or instead of rows.

use serde_json::{Map, Value};

use crate::error::{DecodeError, NarrowingError};
use crate::wire::{tagged, TaggedObject};

wire_enum! {
    pub enum AggregateKind in "Aggregate" {
        StarCount => "star_count",
        SingleColumn => "single_column",
        ColumnCount => "column_count",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggregate {
    /// Counts all matched rows.
    StarCount,
    /// Applies a scalar-specific aggregate function to a column.
    SingleColumn { column: String, function: String },
    /// Counts non-null values of a column, optionally only distinct ones.
    ColumnCount { column: String, distinct: bool },
}

impl Aggregate {
    pub fn kind(&self) -> AggregateKind {
        match self {
            Aggregate::StarCount => AggregateKind::StarCount,
            Aggregate::SingleColumn { .. } => AggregateKind::SingleColumn,
            Aggregate::ColumnCount { .. } => AggregateKind::ColumnCount,
        }
    }

    fn narrowing(&self, expected: AggregateKind) -> NarrowingError {
        NarrowingError {
            entity: "Aggregate",
            expected: expected.as_str(),
            found: self.kind().as_str(),
        }
    }

    pub fn as_star_count(&self) -> Result<(), NarrowingError> {
        match self {
            Aggregate::StarCount => Ok(()),
            _ => Err(self.narrowing(AggregateKind::StarCount)),
        }
    }

    /// Returns the column and the aggregate function name.
    pub fn as_single_column(&self) -> Result<(&str, &str), NarrowingError> {
        match self {
            Aggregate::SingleColumn { column, function } => Ok((column, function)),
            _ => Err(self.narrowing(AggregateKind::SingleColumn)),
        }
    }

    /// Returns the column and the distinct flag.
    pub fn as_column_count(&self) -> Result<(&str, bool), NarrowingError> {
        match self {
            Aggregate::ColumnCount { column, distinct } => Ok((column, *distinct)),
            _ => Err(self.narrowing(AggregateKind::ColumnCount)),
        }
    }

    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let (kind, mut obj) = TaggedObject::parse::<AggregateKind>(value)?;
        Ok(match kind {
            AggregateKind::StarCount => Aggregate::StarCount,
            AggregateKind::SingleColumn => Aggregate::SingleColumn {
                column: obj.string("column")?,
                function: obj.string("function")?,
            },
            AggregateKind::ColumnCount => Aggregate::ColumnCount {
                column: obj.string("column")?,
                distinct: obj.required("distinct")?,
            },
        })
    }

    pub fn encode(&self) -> Map<String, Value> {
        let mut map = tagged(self.kind());
        match self {
            Aggregate::StarCount => {}
            Aggregate::SingleColumn { column, function } => {
                map.insert("column".to_string(), Value::String(column.clone()));
                map.insert("function".to_string(), Value::String(function.clone()));
            }
            Aggregate::ColumnCount { column, distinct } => {
                map.insert("column".to_string(), Value::String(column.clone()));
                map.insert("distinct".to_string(), Value::Bool(*distinct));
            }
        }
        map
    }
}

wire_union!(Aggregate);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_star_count_has_only_discriminant() {
        assert_eq!(
            serde_json::to_value(Aggregate::StarCount).unwrap(),
            json!({"type": "star_count"})
        );
    }

    #[test]
    fn test_column_count_requires_distinct() {
        let err = Aggregate::from_value(json!({"type": "column_count", "column": "id"})).unwrap_err();
        assert_eq!(err.field(), Some("distinct"));
    }

    #[test]
    fn test_single_column_roundtrip() {
        let agg = Aggregate::SingleColumn {
            column: "price".to_string(),
            function: "_max".to_string(),
        };
        let back = Aggregate::decode(&serde_json::to_vec(&agg).unwrap()).unwrap();
        assert_eq!(back, agg);
        assert_eq!(back.as_single_column().unwrap(), ("price", "_max"));
        assert!(back.as_column_count().is_err());
    }
}
