//! Ordering of result rows.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DecodeError, NarrowingError};
use crate::expression::PathElement;
use crate::wire::{tagged, to_value, TaggedObject};

wire_enum! {
    pub enum OrderDirection in "OrderDirection" {
        Asc => "asc",
        Desc => "desc",
    }
}

wire_enum! {
    pub enum OrderByTargetKind in "OrderByTarget" {
        Column => "column",
        SingleColumnAggregate => "single_column_aggregate",
        StarCountAggregate => "star_count_aggregate",
    }
}

/// What a single ordering element sorts by. Every variant carries the
/// relationship path leading to the sorted value; an empty path means the
/// current collection.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderByTarget {
    Column {
        column: String,
        path: Vec<PathElement>,
    },
    SingleColumnAggregate {
        column: String,
        function: String,
        path: Vec<PathElement>,
    },
    StarCountAggregate {
        path: Vec<PathElement>,
    },
}

impl OrderByTarget {
    pub fn column(column: impl Into<String>) -> Self {
        OrderByTarget::Column {
            column: column.into(),
            path: Vec::new(),
        }
    }

    pub fn kind(&self) -> OrderByTargetKind {
        match self {
            OrderByTarget::Column { .. } => OrderByTargetKind::Column,
            OrderByTarget::SingleColumnAggregate { .. } => OrderByTargetKind::SingleColumnAggregate,
            OrderByTarget::StarCountAggregate { .. } => OrderByTargetKind::StarCountAggregate,
        }
    }

    pub fn path(&self) -> &[PathElement] {
        match self {
            OrderByTarget::Column { path, .. }
            | OrderByTarget::SingleColumnAggregate { path, .. }
            | OrderByTarget::StarCountAggregate { path } => path,
        }
    }

    fn narrowing(&self, expected: OrderByTargetKind) -> NarrowingError {
        NarrowingError {
            entity: "OrderByTarget",
            expected: expected.as_str(),
            found: self.kind().as_str(),
        }
    }

    pub fn as_column(&self) -> Result<(&str, &[PathElement]), NarrowingError> {
        match self {
            OrderByTarget::Column { column, path } => Ok((column, path)),
            _ => Err(self.narrowing(OrderByTargetKind::Column)),
        }
    }

    /// Returns the column, the aggregate function and the path.
    pub fn as_single_column_aggregate(
        &self,
    ) -> Result<(&str, &str, &[PathElement]), NarrowingError> {
        match self {
            OrderByTarget::SingleColumnAggregate {
                column,
                function,
                path,
            } => Ok((column, function, path)),
            _ => Err(self.narrowing(OrderByTargetKind::SingleColumnAggregate)),
        }
    }

    pub fn as_star_count_aggregate(&self) -> Result<&[PathElement], NarrowingError> {
        match self {
            OrderByTarget::StarCountAggregate { path } => Ok(path),
            _ => Err(self.narrowing(OrderByTargetKind::StarCountAggregate)),
        }
    }

    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let (kind, mut obj) = TaggedObject::parse::<OrderByTargetKind>(value)?;
        Ok(match kind {
            OrderByTargetKind::Column => OrderByTarget::Column {
                column: obj.string("column")?,
                path: obj.required("path")?,
            },
            OrderByTargetKind::SingleColumnAggregate => OrderByTarget::SingleColumnAggregate {
                column: obj.string("column")?,
                function: obj.string("function")?,
                path: obj.required("path")?,
            },
            OrderByTargetKind::StarCountAggregate => OrderByTarget::StarCountAggregate {
                path: obj.required("path")?,
            },
        })
    }

    pub fn encode(&self) -> Map<String, Value> {
        let mut map = tagged(self.kind());
        match self {
            OrderByTarget::Column { column, .. } => {
                map.insert("column".to_string(), Value::String(column.clone()));
            }
            OrderByTarget::SingleColumnAggregate {
                column, function, ..
            } => {
                map.insert("column".to_string(), Value::String(column.clone()));
                map.insert("function".to_string(), Value::String(function.clone()));
            }
            OrderByTarget::StarCountAggregate { .. } => {}
        }
        map.insert("path".to_string(), to_value(&self.path()));
        map
    }
}

wire_union!(OrderByTarget);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderByElement {
    pub order_direction: OrderDirection,
    pub target: OrderByTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    /// Applied in order; later elements break ties of earlier ones.
    pub elements: Vec<OrderByElement>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_is_required() {
        let err = OrderByTarget::from_value(json!({"type": "column", "column": "id"})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "field path in OrderByTarget is required for column type"
        );
    }

    #[test]
    fn test_order_by_roundtrip() {
        let order_by = OrderBy {
            elements: vec![
                OrderByElement {
                    order_direction: OrderDirection::Desc,
                    target: OrderByTarget::column("published_at"),
                },
                OrderByElement {
                    order_direction: OrderDirection::Asc,
                    target: OrderByTarget::StarCountAggregate { path: vec![] },
                },
            ],
        };
        let json = serde_json::to_value(&order_by).unwrap();
        assert_eq!(
            json["elements"][0],
            json!({
                "order_direction": "desc",
                "target": {"type": "column", "column": "published_at", "path": []}
            })
        );
        let back: OrderBy = serde_json::from_value(json).unwrap();
        assert_eq!(back, order_by);
    }

    #[test]
    fn test_single_column_aggregate_accessor() {
        let target = OrderByTarget::from_value(json!({
            "type": "single_column_aggregate",
            "column": "price",
            "function": "_sum",
            "path": []
        }))
        .unwrap();
        let (column, function, path) = target.as_single_column_aggregate().unwrap();
        assert_eq!((column, function), ("price", "_sum"));
        assert!(path.is_empty());
        assert!(target.as_column().is_err());
    }
}
