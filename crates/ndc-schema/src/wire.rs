//! Shared decoding machinery for `"type"`-tagged wire objects.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{json_kind, DecodeError};

/// Discriminant enums generated by [`wire_enum!`].
pub trait WireKind: Copy + Sized + 'static {
    const ENTITY: &'static str;
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn from_tag(tag: &str) -> Result<Self, DecodeError> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == tag)
            .ok_or_else(|| DecodeError::UnknownVariant {
                entity: Self::ENTITY,
                found: tag.to_string(),
                expected: Self::ALL.iter().map(|k| k.as_str()).collect(),
            })
    }
}

/// Declares a closed set of string tags with serde, `Display` and `FromStr`
/// support. Unknown tags are rejected with [`DecodeError::UnknownVariant`].
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident in $entity:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $tag:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $crate::wire::WireKind for $name {
            const ENTITY: &'static str = $entity;
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $tag,)+
                }
            }
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                <Self as $crate::wire::WireKind>::as_str(self)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::DecodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <Self as $crate::wire::WireKind>::from_tag(s)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let tag = <String as serde::Deserialize>::deserialize(deserializer)?;
                tag.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Wires a tagged union's `from_value`/`encode` pair into serde and adds the
/// byte-level `decode` entry point.
macro_rules! wire_union {
    ($name:ident) => {
        impl $name {
            /// Decodes a JSON document into this union.
            pub fn decode(bytes: &[u8]) -> Result<Self, $crate::error::DecodeError> {
                let value: serde_json::Value = serde_json::from_slice(bytes)?;
                Self::from_value(value)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serde::Serialize::serialize(&self.encode(), serializer)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;
                Self::from_value(value).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// A JSON object whose discriminant has already been validated. Variant keys
/// are pulled out one at a time; anything left over is ignored.
pub(crate) struct TaggedObject {
    entity: &'static str,
    variant: &'static str,
    fields: Map<String, Value>,
}

impl TaggedObject {
    pub(crate) fn parse<K: WireKind>(value: Value) -> Result<(K, Self), DecodeError> {
        let mut fields = match value {
            Value::Object(map) => map,
            other => {
                return Err(DecodeError::NotAnObject {
                    entity: K::ENTITY,
                    found: json_kind(&other),
                })
            }
        };
        let kind = match fields.remove("type") {
            None => return Err(DecodeError::MissingDiscriminant { entity: K::ENTITY }),
            Some(Value::String(tag)) => K::from_tag(&tag)?,
            Some(other) => {
                return Err(DecodeError::InvalidDiscriminant {
                    entity: K::ENTITY,
                    found: json_kind(&other),
                })
            }
        };
        Ok((
            kind,
            Self {
                entity: K::ENTITY,
                variant: kind.as_str(),
                fields,
            },
        ))
    }

    fn missing(&self, field: &'static str) -> DecodeError {
        DecodeError::MissingField {
            entity: self.entity,
            variant: self.variant,
            field,
        }
    }

    fn invalid(&self, field: &'static str, err: impl std::fmt::Display) -> DecodeError {
        DecodeError::InvalidField {
            entity: self.entity,
            field,
            message: err.to_string(),
        }
    }

    /// The raw value under `key`. Present-but-null is accepted.
    pub(crate) fn value(&mut self, key: &'static str) -> Result<Value, DecodeError> {
        self.fields.remove(key).ok_or_else(|| self.missing(key))
    }

    pub(crate) fn required<T: DeserializeOwned>(&mut self, key: &'static str) -> Result<T, DecodeError> {
        let raw = self.value(key)?;
        serde_json::from_value(raw).map_err(|e| self.invalid(key, e))
    }

    pub(crate) fn string(&mut self, key: &'static str) -> Result<String, DecodeError> {
        match self.value(key)? {
            Value::String(s) => Ok(s),
            other => Err(self.invalid(key, format_args!("expected a string, got {}", json_kind(&other)))),
        }
    }

    /// Absent and null both decode to `None`.
    pub(crate) fn optional<T: DeserializeOwned>(
        &mut self,
        key: &'static str,
    ) -> Result<Option<T>, DecodeError> {
        match self.fields.remove(key) {
            None | Some(Value::Null) => Ok(None),
            Some(raw) => serde_json::from_value(raw)
                .map(Some)
                .map_err(|e| self.invalid(key, e)),
        }
    }

    /// Decodes a nested union, passing its own decode error through unchanged.
    pub(crate) fn nested<T>(
        &mut self,
        key: &'static str,
        decode: impl FnOnce(Value) -> Result<T, DecodeError>,
    ) -> Result<T, DecodeError> {
        let raw = self.value(key)?;
        decode(raw)
    }

    /// Like [`TaggedObject::nested`] for a JSON array of unions.
    pub(crate) fn nested_list<T>(
        &mut self,
        key: &'static str,
        decode: impl Fn(Value) -> Result<T, DecodeError>,
    ) -> Result<Vec<T>, DecodeError> {
        match self.value(key)? {
            Value::Array(items) => items.into_iter().map(decode).collect(),
            other => Err(self.invalid(key, format_args!("expected an array, got {}", json_kind(&other)))),
        }
    }
}

/// Starts an encoded object carrying the discriminant.
pub(crate) fn tagged<K: WireKind>(kind: K) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("type".to_string(), Value::String(kind.as_str().to_string()));
    map
}

pub(crate) fn to_value<T: serde::Serialize>(value: &T) -> Value {
    // Model types only contain maps with string keys, which always serialize.
    serde_json::to_value(value).unwrap_or(Value::Null)
}
