//! The `signatures.json` manifest: a declarative description of the
//! operations and types a package exposes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CodegenError;

/// File name of the manifest inside every package directory.
pub const MANIFEST_FILE: &str = "signatures.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Module path of the package, e.g. `crate::functions`. Derived from the
    /// directory when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default)]
    pub functions: Vec<OperationSignature>,
    #[serde(default)]
    pub procedures: Vec<OperationSignature>,
    #[serde(default)]
    pub objects: Vec<ObjectSignature>,
    #[serde(default)]
    pub scalars: Vec<ScalarSignature>,
}

impl Manifest {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn load(path: &Path) -> Result<Self, CodegenError> {
        let raw = std::fs::read_to_string(path).map_err(|e| CodegenError::io(path, e))?;
        Self::parse(&raw).map_err(|source| CodegenError::Manifest {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSignature {
    /// Name of the Rust function, e.g. `function_get_articles`.
    pub origin: String,
    /// Wire name. Defaults to `origin` without its `function_`/`procedure_`
    /// prefix, in lowerCamelCase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<ArgumentsSignature>,
    pub result: TypeDescriptor,
}

impl OperationSignature {
    pub fn wire_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        let bare = self
            .origin
            .strip_prefix("function_")
            .or_else(|| self.origin.strip_prefix("procedure_"))
            .unwrap_or(&self.origin);
        lower_camel_case(bare)
    }
}

/// The struct an operation receives its arguments in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentsSignature {
    pub type_name: String,
    #[serde(default)]
    pub fields: Vec<FieldSignature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSignature {
    /// Rust field name.
    pub name: String,
    /// Wire key. Defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub field_type: TypeDescriptor,
}

impl FieldSignature {
    pub fn wire_key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDescriptor {
    Bool,
    String,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Complex64,
    Complex128,
    Timestamp,
    Duration,
    Json,
    Named {
        name: String,
    },
    Nullable {
        underlying_type: Box<TypeDescriptor>,
    },
    Array {
        element_type: Box<TypeDescriptor>,
    },
    /// An inline object shape whose Rust type lives outside the package.
    Object {
        rust_type: String,
        fields: Vec<FieldSignature>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSignature {
    pub name: String,
    /// Rust type path when it differs from `<package>::<name>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rust_type: Option<String>,
    /// Anonymous objects have no generated impls; they are expanded inline
    /// wherever they are encoded.
    #[serde(default)]
    pub anonymous: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldSignature>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarRepresentation {
    String,
    Number,
    Integer,
    Boolean,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValueSignature {
    /// Rust variant name.
    pub variant: String,
    /// Wire value.
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarSignature {
    /// Rust type name.
    pub name: String,
    /// Name published in the schema. Defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub representation: Option<ScalarRepresentation>,
    /// Non-empty for enum scalars.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<EnumValueSignature>,
}

/// `get_articles` -> `getArticles`.
pub fn lower_camel_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for (i, part) in input.split('_').filter(|p| !p.is_empty()).enumerate() {
        if i == 0 {
            out.push_str(part);
        } else {
            out.push_str(&upper_first(part));
        }
    }
    out
}

/// `getArticles` -> `GetArticles`.
pub fn upper_first(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_name_defaults() {
        let op = |origin: &str| OperationSignature {
            origin: origin.to_string(),
            name: None,
            description: None,
            arguments: None,
            result: TypeDescriptor::String,
        };
        assert_eq!(op("function_get_articles").wire_name(), "getArticles");
        assert_eq!(op("procedure_create_article").wire_name(), "createArticle");
        assert_eq!(op("hello").wire_name(), "hello");

        let mut named = op("function_hello");
        named.name = Some("greet".to_string());
        assert_eq!(named.wire_name(), "greet");
    }

    #[test]
    fn test_parse_manifest() {
        let raw = r#"{
            "functions": [{
                "origin": "function_get_articles",
                "arguments": {"type_name": "GetArticlesArguments", "fields": [
                    {"name": "limit", "key": "Limit", "type": {"kind": "f64"}}
                ]},
                "result": {"kind": "array", "element_type": {"kind": "named", "name": "GetArticlesResult"}}
            }],
            "objects": [{"name": "GetArticlesResult", "fields": [
                {"name": "id", "type": {"kind": "string"}}
            ]}],
            "scalars": [{"name": "SomeEnum", "enum_values": [{"variant": "Foo", "value": "foo"}]}]
        }"#;
        let manifest = Manifest::parse(raw).unwrap();
        assert_eq!(manifest.functions.len(), 1);
        let args = manifest.functions[0].arguments.as_ref().unwrap();
        assert_eq!(args.fields[0].wire_key(), "Limit");
        assert_eq!(args.fields[0].field_type, TypeDescriptor::F64);
        assert!(manifest.procedures.is_empty());
        assert_eq!(manifest.scalars[0].enum_values[0].value, "foo");
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let raw = r#"{"functions": [{"origin": "f", "result": {"kind": "i128"}}]}"#;
        assert!(Manifest::parse(raw).is_err());
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);
        std::fs::write(&path, "{not json").unwrap();
        let err = Manifest::load(&path).unwrap_err();
        assert!(matches!(err, CodegenError::Manifest { .. }));
        assert!(err.to_string().contains("signatures.json"));
    }
}
