//! Field selections and the query body.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::aggregate::Aggregate;
use crate::argument::RelationshipArgument;
use crate::error::{DecodeError, NarrowingError};
use crate::expression::Expression;
use crate::order_by::OrderBy;
use crate::wire::{tagged, to_value, TaggedObject};

wire_enum! {
    pub enum FieldKind in "Field" {
        Column => "column",
        Relationship => "relationship",
    }
}

wire_enum! {
    pub enum NestedFieldKind in "NestedField" {
        Object => "object",
        Array => "array",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnField {
    pub column: String,
    /// Selection applied to a nested object or array column.
    pub fields: Option<NestedField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipField {
    pub query: Box<Query>,
    /// Key into the request's `collection_relationships`.
    pub relationship: String,
    pub arguments: BTreeMap<String, RelationshipArgument>,
}

/// One entry of a field selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Column(ColumnField),
    Relationship(RelationshipField),
}

impl Field {
    pub fn column(column: impl Into<String>) -> Self {
        Field::Column(ColumnField {
            column: column.into(),
            fields: None,
        })
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Column(_) => FieldKind::Column,
            Field::Relationship(_) => FieldKind::Relationship,
        }
    }

    fn narrowing(&self, expected: FieldKind) -> NarrowingError {
        NarrowingError {
            entity: "Field",
            expected: expected.as_str(),
            found: self.kind().as_str(),
        }
    }

    pub fn as_column(&self) -> Result<&ColumnField, NarrowingError> {
        match self {
            Field::Column(f) => Ok(f),
            _ => Err(self.narrowing(FieldKind::Column)),
        }
    }

    pub fn as_relationship(&self) -> Result<&RelationshipField, NarrowingError> {
        match self {
            Field::Relationship(f) => Ok(f),
            _ => Err(self.narrowing(FieldKind::Relationship)),
        }
    }

    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let (kind, mut obj) = TaggedObject::parse::<FieldKind>(value)?;
        Ok(match kind {
            FieldKind::Column => Field::Column(ColumnField {
                column: obj.string("column")?,
                fields: obj.optional("fields")?,
            }),
            FieldKind::Relationship => Field::Relationship(RelationshipField {
                relationship: obj.string("relationship")?,
                query: Box::new(obj.required("query")?),
                arguments: obj.required("arguments")?,
            }),
        })
    }

    pub fn encode(&self) -> Map<String, Value> {
        let mut map = tagged(self.kind());
        match self {
            Field::Column(f) => {
                map.insert("column".to_string(), Value::String(f.column.clone()));
                if let Some(fields) = &f.fields {
                    map.insert("fields".to_string(), Value::Object(fields.encode()));
                }
            }
            Field::Relationship(f) => {
                map.insert("query".to_string(), to_value(&f.query));
                map.insert(
                    "relationship".to_string(),
                    Value::String(f.relationship.clone()),
                );
                map.insert("arguments".to_string(), to_value(&f.arguments));
            }
        }
        map
    }
}

wire_union!(Field);

/// Selection over a nested object or array value.
#[derive(Debug, Clone, PartialEq)]
pub enum NestedField {
    Object(IndexMap<String, Field>),
    /// Applies the inner selection to every element.
    Array(Box<NestedField>),
}

impl NestedField {
    pub fn kind(&self) -> NestedFieldKind {
        match self {
            NestedField::Object(_) => NestedFieldKind::Object,
            NestedField::Array(_) => NestedFieldKind::Array,
        }
    }

    fn narrowing(&self, expected: NestedFieldKind) -> NarrowingError {
        NarrowingError {
            entity: "NestedField",
            expected: expected.as_str(),
            found: self.kind().as_str(),
        }
    }

    pub fn as_object(&self) -> Result<&IndexMap<String, Field>, NarrowingError> {
        match self {
            NestedField::Object(fields) => Ok(fields),
            _ => Err(self.narrowing(NestedFieldKind::Object)),
        }
    }

    pub fn as_array(&self) -> Result<&NestedField, NarrowingError> {
        match self {
            NestedField::Array(inner) => Ok(inner),
            _ => Err(self.narrowing(NestedFieldKind::Array)),
        }
    }

    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let (kind, mut obj) = TaggedObject::parse::<NestedFieldKind>(value)?;
        Ok(match kind {
            NestedFieldKind::Object => NestedField::Object(obj.required("fields")?),
            NestedFieldKind::Array => {
                NestedField::Array(Box::new(obj.nested("fields", NestedField::from_value)?))
            }
        })
    }

    pub fn encode(&self) -> Map<String, Value> {
        let mut map = tagged(self.kind());
        match self {
            NestedField::Object(fields) => {
                map.insert("fields".to_string(), to_value(fields));
            }
            NestedField::Array(inner) => {
                map.insert("fields".to_string(), Value::Object(inner.encode()));
            }
        }
        map
    }
}

wire_union!(NestedField);

/// The body of a query against a collection or function.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregates: Option<IndexMap<String, Aggregate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<IndexMap<String, Field>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<Expression>,
}

impl Query {
    /// True when the caller asked for at least one field.
    pub fn has_fields(&self) -> bool {
        self.fields.as_ref().is_some_and(|f| !f.is_empty())
    }
}
