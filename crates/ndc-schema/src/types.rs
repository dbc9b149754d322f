//! Wire type expressions: named, nullable and array types.

use serde_json::{Map, Value};

use crate::error::{DecodeError, NarrowingError};
use crate::wire::{tagged, TaggedObject};

wire_enum! {
    /// Discriminant of [`Type`].
    pub enum TypeKind in "Type" {
        Named => "named",
        Nullable => "nullable",
        Array => "array",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedType {
    /// Name of a scalar or object type declared in the schema.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullableType {
    pub underlying_type: Box<Type>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayType {
    pub element_type: Box<Type>,
}

/// Types track the valid representations of values as JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Named(NamedType),
    Nullable(NullableType),
    Array(ArrayType),
}

impl Type {
    pub fn named(name: impl Into<String>) -> Self {
        Type::Named(NamedType { name: name.into() })
    }

    /// Wraps without flattening; `nullable(nullable(t))` stays two levels deep.
    pub fn nullable(underlying_type: Type) -> Self {
        Type::Nullable(NullableType {
            underlying_type: Box::new(underlying_type),
        })
    }

    pub fn array(element_type: Type) -> Self {
        Type::Array(ArrayType {
            element_type: Box::new(element_type),
        })
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            Type::Named(_) => TypeKind::Named,
            Type::Nullable(_) => TypeKind::Nullable,
            Type::Array(_) => TypeKind::Array,
        }
    }

    fn narrowing(&self, expected: TypeKind) -> NarrowingError {
        NarrowingError {
            entity: "Type",
            expected: expected.as_str(),
            found: self.kind().as_str(),
        }
    }

    pub fn as_named(&self) -> Result<&NamedType, NarrowingError> {
        match self {
            Type::Named(t) => Ok(t),
            _ => Err(self.narrowing(TypeKind::Named)),
        }
    }

    pub fn as_nullable(&self) -> Result<&NullableType, NarrowingError> {
        match self {
            Type::Nullable(t) => Ok(t),
            _ => Err(self.narrowing(TypeKind::Nullable)),
        }
    }

    pub fn as_array(&self) -> Result<&ArrayType, NarrowingError> {
        match self {
            Type::Array(t) => Ok(t),
            _ => Err(self.narrowing(TypeKind::Array)),
        }
    }

    /// True when the outermost layer accepts null.
    pub fn is_nullable(&self) -> bool {
        matches!(self, Type::Nullable(_))
    }

    /// Strips every nullable layer.
    pub fn without_nullable(&self) -> &Type {
        match self {
            Type::Nullable(t) => t.underlying_type.without_nullable(),
            other => other,
        }
    }

    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let (kind, mut obj) = TaggedObject::parse::<TypeKind>(value)?;
        Ok(match kind {
            TypeKind::Named => Type::Named(NamedType {
                name: obj.string("name")?,
            }),
            TypeKind::Nullable => Type::Nullable(NullableType {
                underlying_type: Box::new(obj.nested("underlying_type", Type::from_value)?),
            }),
            TypeKind::Array => Type::Array(ArrayType {
                element_type: Box::new(obj.nested("element_type", Type::from_value)?),
            }),
        })
    }

    pub fn encode(&self) -> Map<String, Value> {
        let mut map = tagged(self.kind());
        match self {
            Type::Named(t) => {
                map.insert("name".to_string(), Value::String(t.name.clone()));
            }
            Type::Nullable(t) => {
                map.insert(
                    "underlying_type".to_string(),
                    Value::Object(t.underlying_type.encode()),
                );
            }
            Type::Array(t) => {
                map.insert(
                    "element_type".to_string(),
                    Value::Object(t.element_type.encode()),
                );
            }
        }
        map
    }
}

wire_union!(Type);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_nullable_is_preserved() {
        let ty = Type::nullable(Type::nullable(Type::named("Int")));
        let encoded = serde_json::to_value(&ty).unwrap();
        assert_eq!(
            encoded,
            json!({
                "type": "nullable",
                "underlying_type": {
                    "type": "nullable",
                    "underlying_type": {"type": "named", "name": "Int"}
                }
            })
        );
        let decoded: Type = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, ty);
    }

    #[test]
    fn test_decode_array_of_named() {
        let ty = Type::decode(br#"{"type":"array","element_type":{"type":"named","name":"String"}}"#)
            .unwrap();
        assert_eq!(ty.kind(), TypeKind::Array);
        let inner = ty.as_array().unwrap();
        assert_eq!(inner.element_type.as_named().unwrap().name, "String");
    }

    #[test]
    fn test_extra_keys_are_ignored() {
        let ty = Type::from_value(json!({"type": "named", "name": "Int", "extra": true})).unwrap();
        assert_eq!(ty, Type::named("Int"));
    }

    #[test]
    fn test_missing_discriminant() {
        let err = Type::from_value(json!({"name": "Int"})).unwrap_err();
        assert!(matches!(err, DecodeError::MissingDiscriminant { entity: "Type" }));
    }

    #[test]
    fn test_non_string_discriminant() {
        let err = Type::from_value(json!({"type": 7, "name": "Int"})).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidDiscriminant { found: "number", .. }));
    }

    #[test]
    fn test_unknown_discriminant() {
        let err = Type::from_value(json!({"type": "tuple"})).unwrap_err();
        match err {
            DecodeError::UnknownVariant { found, expected, .. } => {
                assert_eq!(found, "tuple");
                assert_eq!(expected, vec!["named", "nullable", "array"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_variant_field() {
        let err = Type::from_value(json!({"type": "nullable"})).unwrap_err();
        assert_eq!(err.field(), Some("underlying_type"));
    }

    #[test]
    fn test_narrowing_wrong_variant() {
        let err = Type::named("Int").as_array().unwrap_err();
        assert_eq!(err.expected, "array");
        assert_eq!(err.found, "named");
    }

    #[test]
    fn test_without_nullable() {
        let ty = Type::nullable(Type::nullable(Type::array(Type::named("Int"))));
        assert!(ty.is_nullable());
        assert_eq!(ty.without_nullable().kind(), TypeKind::Array);
    }

    #[test]
    fn test_type_kind_parse() {
        assert_eq!("nullable".parse::<TypeKind>().unwrap(), TypeKind::Nullable);
        assert!("Nullable".parse::<TypeKind>().is_err());
        assert_eq!(TypeKind::ALL.len(), 3);
    }
}
