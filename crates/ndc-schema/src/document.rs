//! The schema document served from `/schema`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Type;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TypeRepresentation {
    Boolean,
    String,
    Number,
    Integer,
    Json,
    Enum { one_of: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateFunctionDefinition {
    pub result_type: Type,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComparisonOperatorDefinition {
    Equal,
    In,
    Custom { argument_type: Type },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalarType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub representation: Option<TypeRepresentation>,
    pub aggregate_functions: BTreeMap<String, AggregateFunctionDefinition>,
    pub comparison_operators: BTreeMap<String, ComparisonOperatorDefinition>,
    #[serde(default)]
    pub update_operators: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub argument_type: Type,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub arguments: BTreeMap<String, ArgumentInfo>,
    #[serde(rename = "type")]
    pub field_type: Type,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: BTreeMap<String, ObjectField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniquenessConstraint {
    pub unique_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyConstraint {
    pub column_mapping: BTreeMap<String, String>,
    pub foreign_collection: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub arguments: BTreeMap<String, ArgumentInfo>,
    /// Name of the object type of each row.
    #[serde(rename = "type")]
    pub collection_type: String,
    #[serde(default)]
    pub insertable_columns: Option<Vec<String>>,
    #[serde(default)]
    pub updatable_columns: Option<Vec<String>>,
    #[serde(default)]
    pub deletable: bool,
    #[serde(default)]
    pub uniqueness_constraints: BTreeMap<String, UniquenessConstraint>,
    #[serde(default)]
    pub foreign_keys: BTreeMap<String, ForeignKeyConstraint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub arguments: BTreeMap<String, ArgumentInfo>,
    pub result_type: Type,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub arguments: BTreeMap<String, ArgumentInfo>,
    pub result_type: Type,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaResponse {
    pub scalar_types: BTreeMap<String, ScalarType>,
    pub object_types: BTreeMap<String, ObjectType>,
    pub collections: Vec<CollectionInfo>,
    pub functions: Vec<FunctionInfo>,
    pub procedures: Vec<ProcedureInfo>,
}

impl SchemaResponse {
    pub fn collection(&self, name: &str) -> Option<&CollectionInfo> {
        self.collections.iter().find(|c| c.name == name)
    }

    /// The object type describing rows of `collection`.
    pub fn collection_object_type(&self, collection: &str) -> Option<&ObjectType> {
        self.collection(collection)
            .and_then(|c| self.object_types.get(&c.collection_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_document_roundtrip() {
        let doc: SchemaResponse = serde_json::from_value(json!({
            "scalar_types": {
                "Int": {
                    "aggregate_functions": {"_max": {"result_type": {"type": "named", "name": "Int"}}},
                    "comparison_operators": {
                        "_eq": {"type": "equal"},
                        "_gt": {"type": "custom", "argument_type": {"type": "named", "name": "Int"}}
                    },
                    "update_operators": {}
                }
            },
            "object_types": {
                "article": {
                    "description": "An article",
                    "fields": {
                        "id": {"type": {"type": "named", "name": "Int"}},
                        "author_id": {"type": {"type": "nullable", "underlying_type": {"type": "named", "name": "Int"}}}
                    }
                }
            },
            "collections": [{
                "name": "articles",
                "arguments": {},
                "type": "article",
                "deletable": false,
                "uniqueness_constraints": {"ArticleByID": {"unique_columns": ["id"]}},
                "foreign_keys": {}
            }],
            "functions": [],
            "procedures": []
        }))
        .unwrap();

        let article = doc.collection_object_type("articles").unwrap();
        assert!(article.fields["author_id"].field_type.is_nullable());
        assert!(doc.collection_object_type("authors").is_none());

        let back: SchemaResponse =
            serde_json::from_value(serde_json::to_value(&doc).unwrap()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_enum_representation_shape() {
        let repr = TypeRepresentation::Enum {
            one_of: vec!["bar".to_string(), "foo".to_string()],
        };
        assert_eq!(
            serde_json::to_value(&repr).unwrap(),
            json!({"type": "enum", "one_of": ["bar", "foo"]})
        );
    }
}
