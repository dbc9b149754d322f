//! Request and response envelopes of the connector endpoints.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::argument::{Argument, RelationshipArgument};
use crate::error::{DecodeError, NarrowingError};
use crate::field::{NestedField, Query};
use crate::wire::{tagged, TaggedObject};

/// One set of variable bindings; the query runs once per set.
pub type VariableSet = BTreeMap<String, Value>;

/// A result row, keyed by the aliases of the field selection.
pub type Row = IndexMap<String, Value>;

wire_enum! {
    pub enum RelationshipType in "RelationshipType" {
        Object => "object",
        Array => "array",
    }
}

wire_enum! {
    pub enum MutationOperationKind in "MutationOperation" {
        Procedure => "procedure",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Source column to target column.
    pub column_mapping: BTreeMap<String, String>,
    pub relationship_type: RelationshipType,
    pub target_collection: String,
    #[serde(default)]
    pub arguments: BTreeMap<String, RelationshipArgument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Collection or function name.
    pub collection: String,
    pub query: Query,
    #[serde(default)]
    pub arguments: BTreeMap<String, Argument>,
    #[serde(default)]
    pub collection_relationships: BTreeMap<String, Relationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Vec<VariableSet>>,
}

impl QueryRequest {
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// A single procedure invocation inside a mutation request.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOperation {
    Procedure {
        name: String,
        /// Raw argument object, decoded later by the procedure's own types.
        arguments: Value,
        fields: Option<NestedField>,
    },
}

impl MutationOperation {
    pub fn kind(&self) -> MutationOperationKind {
        match self {
            MutationOperation::Procedure { .. } => MutationOperationKind::Procedure,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            MutationOperation::Procedure { name, .. } => name,
        }
    }

    /// Returns the name, raw arguments and optional selection.
    pub fn as_procedure(&self) -> Result<(&str, &Value, Option<&NestedField>), NarrowingError> {
        match self {
            MutationOperation::Procedure {
                name,
                arguments,
                fields,
            } => Ok((name, arguments, fields.as_ref())),
        }
    }

    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let (kind, mut obj) = TaggedObject::parse::<MutationOperationKind>(value)?;
        Ok(match kind {
            MutationOperationKind::Procedure => MutationOperation::Procedure {
                name: obj.string("name")?,
                arguments: obj.value("arguments")?,
                fields: match obj.optional::<Value>("fields")? {
                    Some(raw) => Some(NestedField::from_value(raw)?),
                    None => None,
                },
            },
        })
    }

    pub fn encode(&self) -> Map<String, Value> {
        let mut map = tagged(self.kind());
        match self {
            MutationOperation::Procedure {
                name,
                arguments,
                fields,
            } => {
                map.insert("name".to_string(), Value::String(name.clone()));
                map.insert("arguments".to_string(), arguments.clone());
                if let Some(fields) = fields {
                    map.insert("fields".to_string(), Value::Object(fields.encode()));
                }
            }
        }
        map
    }
}

wire_union!(MutationOperation);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRequest {
    pub operations: Vec<MutationOperation>,
    #[serde(default)]
    pub collection_relationships: BTreeMap<String, Relationship>,
}

impl MutationRequest {
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregates: Option<IndexMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Row>>,
}

/// One row set per variable set, in request order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryResponse(pub Vec<RowSet>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MutationOperationResults {
    Procedure { result: Value },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationResponse {
    pub operation_results: Vec<MutationOperationResults>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplainResponse {
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeafCapability {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryCapabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregates: Option<LeafCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<LeafCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explain: Option<LeafCapability>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationCapabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactional: Option<LeafCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explain: Option<LeafCapability>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipCapabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_comparisons: Option<LeafCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by_aggregate: Option<LeafCapability>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    pub query: QueryCapabilities,
    pub mutation: MutationCapabilities,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<RelationshipCapabilities>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilitiesResponse {
    pub version: String,
    pub capabilities: Capabilities,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub details: Value,
}
