// Code generated by ndc-sdk, DO NOT EDIT.
#![allow(unused_imports, unused_variables)]

use super::*;
use ndc_connector::utils::{self, Decoder, FromValue, ScalarName, ToMap, ValueError};
use serde_json::{Map, Value};

impl FromValue for crate::functions::Author {
    fn from_value(decoder: &Decoder, input: &Map<String, Value>) -> Result<Self, ValueError> {
        Ok(Self {
            created_at: decoder.get_date_time(input, "created_at")?,
            id: decoder.get_int::<i32>(input, "id")?,
            name: decoder.get_string(input, "name")?,
        })
    }
}

impl FromValue for crate::functions::CreateArticleArguments {
    fn from_value(decoder: &Decoder, input: &Map<String, Value>) -> Result<Self, ValueError> {
        Ok(Self {
            author_id: decoder.get_float::<f64>(input, "author_id")?,
        })
    }
}

impl FromValue for crate::functions::CreateAuthorsArguments {
    fn from_value(decoder: &Decoder, input: &Map<String, Value>) -> Result<Self, ValueError> {
        Ok(Self {
            names: decoder.get_array(input, "names", |d, v, k| d.decode_string(v, k))?,
        })
    }
}

impl FromValue for crate::functions::EchoJsonArguments {
    fn from_value(decoder: &Decoder, input: &Map<String, Value>) -> Result<Self, ValueError> {
        Ok(Self {
            value: decoder.get_arbitrary_json(input, "value")?,
        })
    }
}

impl FromValue for crate::functions::FindAuthorArguments {
    fn from_value(decoder: &Decoder, input: &Map<String, Value>) -> Result<Self, ValueError> {
        Ok(Self {
            id: decoder.get_int::<i32>(input, "id")?,
        })
    }
}

impl FromValue for crate::functions::GetArticlesArguments {
    fn from_value(decoder: &Decoder, input: &Map<String, Value>) -> Result<Self, ValueError> {
        Ok(Self {
            limit: decoder.get_float::<f64>(input, "Limit")?,
        })
    }
}

impl FromValue for crate::functions::GetTypesArguments {
    fn from_value(decoder: &Decoder, input: &Map<String, Value>) -> Result<Self, ValueError> {
        Ok(Self {
            author: decoder.decode_object_value::<crate::functions::Author>(input, "Author")?,
            boolean: decoder.get_bool(input, "Bool")?,
            duration: decoder.get_duration(input, "Duration")?,
            enum_ptr: decoder.get_nullable_scalar::<crate::functions::SomeEnum>(input, "EnumPtr")?,
            float32: decoder.get_float::<f32>(input, "Float32")?,
            int32: decoder.get_int::<i32>(input, "Int32")?,
            json: decoder.get_arbitrary_json(input, "JSON")?,
            string_ptr: decoder.get_nullable_string(input, "StringPtr")?,
            tags: decoder.get_array(input, "Tags", |d, v, k| d.decode_string(v, k))?,
            text: decoder.get_scalar::<crate::functions::CommentText>(input, "Text")?,
            time: decoder.get_date_time(input, "Time")?,
            uint8: decoder.get_uint::<u8>(input, "UInt8")?,
        })
    }
}

impl ToMap for crate::functions::Author {
    fn to_map(&self) -> Map<String, Value> {
        let mut result = Map::new();
        result.insert("created_at".to_string(), utils::encode_value(&self.created_at));
        result.insert("id".to_string(), utils::encode_value(&self.id));
        result.insert("name".to_string(), utils::encode_value(&self.name));
        result
    }
}

impl ToMap for crate::functions::CreateArticleResult {
    fn to_map(&self) -> Map<String, Value> {
        let mut result = Map::new();
        result.insert("authors".to_string(), utils::encode_maps(&self.authors));
        result.insert("id".to_string(), utils::encode_value(&self.id));
        result
    }
}

impl ToMap for crate::functions::GetArticlesResult {
    fn to_map(&self) -> Map<String, Value> {
        let mut result = Map::new();
        result.insert("Name".to_string(), utils::encode_value(&self.name));
        result.insert("id".to_string(), utils::encode_value(&self.id));
        result
    }
}

impl ToMap for crate::functions::GetTypesArguments {
    fn to_map(&self) -> Map<String, Value> {
        let mut result = Map::new();
        result.insert("Author".to_string(), utils::encode_map(&self.author));
        result.insert("Bool".to_string(), utils::encode_value(&self.boolean));
        result.insert("Duration".to_string(), utils::encode_duration(&self.duration));
        result.insert("EnumPtr".to_string(), utils::encode_value(&self.enum_ptr));
        result.insert("Float32".to_string(), utils::encode_value(&self.float32));
        result.insert("Int32".to_string(), utils::encode_value(&self.int32));
        result.insert("JSON".to_string(), utils::encode_value(&self.json));
        result.insert("StringPtr".to_string(), utils::encode_value(&self.string_ptr));
        result.insert("Tags".to_string(), utils::encode_value(&self.tags));
        result.insert("Text".to_string(), utils::encode_value(&self.text));
        result.insert("Time".to_string(), utils::encode_value(&self.time));
        result.insert("UInt8".to_string(), utils::encode_value(&self.uint8));
        result
    }
}

impl ScalarName for crate::functions::CommentText {
    fn scalar_name() -> &'static str {
        "CommentString"
    }
}

impl ScalarName for crate::functions::SomeEnum {
    fn scalar_name() -> &'static str {
        "SomeEnum"
    }
}

impl crate::functions::SomeEnum {
    pub const VALUES: [crate::functions::SomeEnum; 2] = [Self::Foo, Self::Bar];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Foo => "foo",
            Self::Bar => "bar",
        }
    }
}

impl std::fmt::Display for crate::functions::SomeEnum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for crate::functions::SomeEnum {
    type Err = utils::EnumValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "foo" => Ok(Self::Foo),
            "bar" => Ok(Self::Bar),
            _ => Err(utils::EnumValueError::new("SomeEnum", s, &["foo", "bar"])),
        }
    }
}

impl serde::Serialize for crate::functions::SomeEnum {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for crate::functions::SomeEnum {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
