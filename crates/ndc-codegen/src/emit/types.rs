//! `types_generated.rs`: marshaling impls for one package.

use std::collections::BTreeMap;

use super::decode::ValueDecoder;
use super::encode::ValueEncoder;
use super::{quote, SourceBuilder, GENERATED_HEADER};
use crate::catalogue::{Catalogue, FieldInfo, ObjectInfo, ScalarInfo};
use crate::error::CodegenError;

/// Renders the marshaling file of `package`: `FromValue` for argument and
/// input object types, `ToMap` for named objects, `ScalarName` (plus the enum
/// impls) for custom scalars.
pub fn render_types(catalogue: &Catalogue, package: &str) -> Result<String, CodegenError> {
    let mut sb = SourceBuilder::new();
    sb.line(GENERATED_HEADER);
    sb.line("#![allow(unused_imports, unused_variables)]");
    sb.blank();
    sb.line("use super::*;");
    sb.line("use ndc_connector::utils::{self, Decoder, FromValue, ScalarName, ToMap, ValueError};");
    sb.line("use serde_json::{Map, Value};");

    for (rust_type, fields) in decode_targets(catalogue, package)? {
        render_from_value(&mut sb, catalogue, rust_type, fields)?;
    }

    let objects = catalogue
        .objects
        .values()
        .filter(|o| o.package == package && !o.is_anonymous);
    for object in objects {
        render_to_map(&mut sb, catalogue, object)?;
    }

    for scalar in catalogue.scalars.values().filter(|s| s.package == package) {
        render_scalar(&mut sb, scalar);
    }

    Ok(sb.finish())
}

/// Types needing a `FromValue` impl, one entry per Rust type. Operations may
/// share an arguments type, and an arguments type may also be an input
/// object; differing field sets for one Rust type fail with `DuplicateType`.
fn decode_targets<'c>(
    catalogue: &'c Catalogue,
    package: &str,
) -> Result<BTreeMap<&'c str, &'c BTreeMap<String, FieldInfo>>, CodegenError> {
    let arguments = catalogue
        .operations()
        .filter(|op| op.package == package)
        .filter_map(|op| op.arguments.as_ref())
        .map(|args| (args.rust_type.as_str(), &args.fields));
    let inputs = catalogue
        .objects
        .values()
        .filter(|o| o.package == package && o.is_input && !o.is_anonymous)
        .map(|o| (o.rust_type.as_str(), &o.fields));

    let mut targets: BTreeMap<&str, &BTreeMap<String, FieldInfo>> = BTreeMap::new();
    for (rust_type, fields) in arguments.chain(inputs) {
        match targets.get(rust_type) {
            Some(existing) if !same_shape(existing, fields) => {
                return Err(CodegenError::DuplicateType(rust_type.to_string()));
            }
            Some(_) => {}
            None => {
                targets.insert(rust_type, fields);
            }
        }
    }
    Ok(targets)
}

/// Descriptions do not affect decoding.
fn same_shape(a: &BTreeMap<String, FieldInfo>, b: &BTreeMap<String, FieldInfo>) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|((ka, fa), (kb, fb))| {
            ka == kb && fa.name == fb.name && fa.ty == fb.ty
        })
}

fn render_from_value(
    sb: &mut SourceBuilder,
    catalogue: &Catalogue,
    rust_type: &str,
    fields: &BTreeMap<String, FieldInfo>,
) -> Result<(), CodegenError> {
    sb.blank();
    sb.open(format!("impl FromValue for {rust_type} {{"));
    sb.open("fn from_value(decoder: &Decoder, input: &Map<String, Value>) -> Result<Self, ValueError> {");
    ValueDecoder::new(catalogue).object_body(sb, "Self", fields, "input", "decoded")?;
    sb.close("}");
    sb.close("}");
    Ok(())
}

fn render_to_map(
    sb: &mut SourceBuilder,
    catalogue: &Catalogue,
    object: &ObjectInfo,
) -> Result<(), CodegenError> {
    sb.blank();
    sb.open(format!("impl ToMap for {} {{", object.rust_type));
    sb.open("fn to_map(&self) -> Map<String, Value> {");
    ValueEncoder::new(catalogue).object_fields(sb, object, "self", "result")?;
    sb.line("result");
    sb.close("}");
    sb.close("}");
    Ok(())
}

fn render_scalar(sb: &mut SourceBuilder, scalar: &ScalarInfo) {
    let ty = &scalar.rust_type;
    sb.blank();
    sb.open(format!("impl ScalarName for {ty} {{"));
    sb.open("fn scalar_name() -> &'static str {");
    sb.line(quote(&scalar.schema_name));
    sb.close("}");
    sb.close("}");

    if !scalar.is_enum() {
        return;
    }

    let allowed = scalar
        .enum_values
        .iter()
        .map(|v| quote(&v.value))
        .collect::<Vec<_>>()
        .join(", ");

    sb.blank();
    sb.open(format!("impl {ty} {{"));
    sb.line(format!(
        "pub const VALUES: [{ty}; {}] = [{}];",
        scalar.enum_values.len(),
        scalar
            .enum_values
            .iter()
            .map(|v| format!("Self::{}", v.variant))
            .collect::<Vec<_>>()
            .join(", ")
    ));
    sb.blank();
    sb.open("pub fn as_str(&self) -> &'static str {");
    sb.open("match self {");
    for v in &scalar.enum_values {
        sb.line(format!("Self::{} => {},", v.variant, quote(&v.value)));
    }
    sb.close("}");
    sb.close("}");
    sb.close("}");

    sb.blank();
    sb.open(format!("impl std::fmt::Display for {ty} {{"));
    sb.open("fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {");
    sb.line("f.write_str(self.as_str())");
    sb.close("}");
    sb.close("}");

    sb.blank();
    sb.open(format!("impl std::str::FromStr for {ty} {{"));
    sb.line("type Err = utils::EnumValueError;");
    sb.blank();
    sb.open("fn from_str(s: &str) -> Result<Self, Self::Err> {");
    sb.open("match s {");
    for v in &scalar.enum_values {
        sb.line(format!("{} => Ok(Self::{}),", quote(&v.value), v.variant));
    }
    sb.line(format!(
        "_ => Err(utils::EnumValueError::new({}, s, &[{allowed}])),",
        quote(&scalar.name)
    ));
    sb.close("}");
    sb.close("}");
    sb.close("}");

    sb.blank();
    sb.open(format!("impl serde::Serialize for {ty} {{"));
    sb.open("fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {");
    sb.line("serializer.serialize_str(self.as_str())");
    sb.close("}");
    sb.close("}");

    sb.blank();
    sb.open(format!("impl<'de> serde::Deserialize<'de> for {ty} {{"));
    sb.open("fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {");
    sb.line("let raw = <String as serde::Deserialize>::deserialize(deserializer)?;");
    sb.line("raw.parse().map_err(serde::de::Error::custom)");
    sb.close("}");
    sb.close("}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::CatalogueBuilder;
    use crate::manifest::Manifest;

    fn catalogue(raw: &str) -> Catalogue {
        let mut builder = CatalogueBuilder::new();
        builder
            .add_manifest("crate::functions", Manifest::parse(raw).unwrap())
            .unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_argument_decoders() {
        let catalogue = catalogue(
            r#"{"functions": [{"origin": "function_get_types",
                "arguments": {"type_name": "GetTypesArguments", "fields": [
                    {"name": "id", "key": "Id", "type": {"kind": "i32"}},
                    {"name": "flag", "key": "Flag", "type": {"kind": "nullable", "underlying_type": {"kind": "bool"}}},
                    {"name": "tags", "key": "Tags", "type": {"kind": "array", "element_type": {"kind": "string"}}},
                    {"name": "ids", "key": "Ids", "type": {"kind": "nullable", "underlying_type":
                        {"kind": "array", "element_type": {"kind": "nullable", "underlying_type": {"kind": "u8"}}}}},
                    {"name": "at", "key": "At", "type": {"kind": "timestamp"}},
                    {"name": "author", "key": "Author", "type": {"kind": "named", "name": "Author"}},
                    {"name": "point", "key": "Point", "type": {"kind": "object", "rust_type": "geo::Point", "fields": []}}
                ]},
                "result": {"kind": "string"}}],
             "objects": [{"name": "Author", "fields": [{"name": "name", "type": {"kind": "string"}}]}]}"#,
        );
        let source = render_types(&catalogue, "crate::functions").unwrap();

        assert!(source.starts_with(GENERATED_HEADER));
        assert!(source.contains("impl FromValue for crate::functions::GetTypesArguments {"));
        assert!(source.contains(r#"id: decoder.get_int::<i32>(input, "Id")?,"#));
        assert!(source.contains(r#"flag: decoder.get_nullable_bool(input, "Flag")?,"#));
        assert!(source.contains(r#"tags: decoder.get_array(input, "Tags", |d, v, k| d.decode_string(v, k))?,"#));
        assert!(source.contains(
            r#"ids: decoder.get_nullable_array(input, "Ids", |d, v, k| d.decode_nullable(v, k, |d, v, k| d.decode_uint::<u8>(v, k)))?,"#
        ));
        assert!(source.contains(r#"at: decoder.get_date_time(input, "At")?,"#));
        assert!(source.contains(
            r#"author: decoder.decode_object_value::<crate::functions::Author>(input, "Author")?,"#
        ));
        assert!(source.contains(r#"point: decoder.get_scalar::<geo::Point>(input, "Point")?,"#));

        // Author is reachable from arguments, so it decodes and encodes.
        assert!(source.contains("impl FromValue for crate::functions::Author {"));
        assert!(source.contains("impl ToMap for crate::functions::Author {"));
        // Anonymous objects never get impls.
        assert!(!source.contains("impl ToMap for geo::Point"));
    }

    #[test]
    fn test_sorted_field_order() {
        let catalogue = catalogue(
            r#"{"procedures": [{"origin": "procedure_create",
                "arguments": {"type_name": "CreateArguments", "fields": [
                    {"name": "zeta", "type": {"kind": "string"}},
                    {"name": "alpha", "type": {"kind": "string"}}
                ]},
                "result": {"kind": "bool"}}]}"#,
        );
        let source = render_types(&catalogue, "crate::functions").unwrap();
        let alpha = source.find("alpha:").unwrap();
        let zeta = source.find("zeta:").unwrap();
        assert!(alpha < zeta);
    }

    #[test]
    fn test_enum_scalar_impls() {
        let catalogue = catalogue(
            r#"{"functions": [{"origin": "function_pick", "result": {"kind": "named", "name": "SomeEnum"}}],
                "scalars": [{"name": "SomeEnum", "enum_values": [
                    {"variant": "Foo", "value": "foo"}, {"variant": "Bar", "value": "bar"}]}]}"#,
        );
        let source = render_types(&catalogue, "crate::functions").unwrap();
        assert!(source.contains("impl ScalarName for crate::functions::SomeEnum {"));
        assert!(source.contains("pub const VALUES: [crate::functions::SomeEnum; 2] = [Self::Foo, Self::Bar];"));
        assert!(source.contains(r#"Self::Foo => "foo","#));
        assert!(source.contains(r#""bar" => Ok(Self::Bar),"#));
        assert!(source.contains(r#"_ => Err(utils::EnumValueError::new("SomeEnum", s, &["foo", "bar"])),"#));
        assert!(source.contains("impl<'de> serde::Deserialize<'de> for crate::functions::SomeEnum {"));
    }

    #[test]
    fn test_complex_argument_is_unsupported() {
        let catalogue = catalogue(
            r#"{"functions": [{"origin": "f",
                "arguments": {"type_name": "FArguments", "fields": [{"name": "c", "type": {"kind": "complex128"}}]},
                "result": {"kind": "string"}}]}"#,
        );
        let err = render_types(&catalogue, "crate::functions").unwrap_err();
        assert!(matches!(err, CodegenError::UnsupportedInput(_)));
    }

    #[test]
    fn test_in_crate_anonymous_argument_decodes_inline() {
        let catalogue = catalogue(
            r#"{"functions": [{"origin": "function_locate",
                "arguments": {"type_name": "LocateArguments", "fields": [
                    {"name": "point", "key": "Point", "type": {"kind": "object", "rust_type": "crate::functions::Point", "fields": [
                        {"name": "lat", "type": {"kind": "f64"}},
                        {"name": "lng", "type": {"kind": "f64"}}
                    ]}}
                ]},
                "result": {"kind": "string"}}]}"#,
        );
        let source = render_types(&catalogue, "crate::functions").unwrap();
        assert!(!source.contains("decode_object_value::<crate::functions::Point>"));
        assert!(!source.contains("impl FromValue for crate::functions::Point"));
        assert!(source.contains(
            "let decoded_point = decoder.get_object_with(input, \"Point\", |decoder, decoded_point_input| {"
        ));
        assert!(source.contains("Ok(crate::functions::Point {"));
        assert!(source.contains("lng: decoder.get_float::<f64>(decoded_point_input, \"lng\")?,"));
        assert!(source.contains("point: decoded_point,"));
    }

    #[test]
    fn test_shared_arguments_type_gets_one_impl() {
        let catalogue = catalogue(
            r#"{"functions": [
                {"origin": "function_a", "arguments": {"type_name": "IdArguments", "fields": [{"name": "id", "type": {"kind": "i32"}}]},
                 "result": {"kind": "string"}},
                {"origin": "function_b", "arguments": {"type_name": "IdArguments", "fields": [{"name": "id", "type": {"kind": "i32"}}]},
                 "result": {"kind": "string"}}
            ]}"#,
        );
        let source = render_types(&catalogue, "crate::functions").unwrap();
        assert_eq!(source.matches("impl FromValue for crate::functions::IdArguments {").count(), 1);
    }

    #[test]
    fn test_arguments_type_that_is_also_an_input_object() {
        let catalogue = catalogue(
            r#"{"functions": [
                {"origin": "function_a", "arguments": {"type_name": "Filter", "fields": [{"name": "name", "type": {"kind": "string"}}]},
                 "result": {"kind": "string"}},
                {"origin": "function_b", "arguments": {"type_name": "BArguments", "fields": [
                    {"name": "filter", "type": {"kind": "named", "name": "Filter"}}]},
                 "result": {"kind": "string"}}
            ],
            "objects": [{"name": "Filter", "fields": [{"name": "name", "type": {"kind": "string"}}]}]}"#,
        );
        let source = render_types(&catalogue, "crate::functions").unwrap();
        assert_eq!(source.matches("impl FromValue for crate::functions::Filter {").count(), 1);
    }

    #[test]
    fn test_conflicting_arguments_types_are_rejected() {
        let catalogue = catalogue(
            r#"{"functions": [
                {"origin": "function_a", "arguments": {"type_name": "IdArguments", "fields": [{"name": "id", "type": {"kind": "i32"}}]},
                 "result": {"kind": "string"}},
                {"origin": "function_b", "arguments": {"type_name": "IdArguments", "fields": [{"name": "id", "type": {"kind": "string"}}]},
                 "result": {"kind": "string"}}
            ]}"#,
        );
        let err = render_types(&catalogue, "crate::functions").unwrap_err();
        assert!(matches!(err, CodegenError::DuplicateType(name) if name == "crate::functions::IdArguments"));
    }

    #[test]
    fn test_other_packages_are_skipped() {
        let catalogue = catalogue(r#"{"functions": [{"origin": "f", "result": {"kind": "string"}}]}"#);
        let source = render_types(&catalogue, "crate::other").unwrap();
        assert!(!source.contains("impl "));
    }
}
