//! Statements that decode argument maps into Rust values.
//!
//! Most fields are a single `Decoder` call. Anonymous objects declared inside
//! the crate have no `FromValue` impl of their own and are expanded inline
//! into nested decode blocks, each bound to a uniquely named local.

use std::collections::BTreeMap;

use super::quote;
use super::SourceBuilder;
use crate::catalogue::{Catalogue, FieldInfo, ObjectInfo, PrimitiveCategory, TypeInfo, TypeShape};
use crate::error::CodegenError;

pub(crate) struct ValueDecoder<'a> {
    catalogue: &'a Catalogue,
    /// Anonymous objects on the current expansion path.
    expanding: Vec<String>,
}

impl<'a> ValueDecoder<'a> {
    pub(crate) fn new(catalogue: &'a Catalogue) -> Self {
        Self {
            catalogue,
            expanding: Vec::new(),
        }
    }

    /// Writes the statements for every field read from the map `input`,
    /// then `Ok(<constructor> { .. })`.
    pub(crate) fn object_body(
        &mut self,
        sb: &mut SourceBuilder,
        constructor: &str,
        fields: &BTreeMap<String, FieldInfo>,
        input: &str,
        var: &str,
    ) -> Result<(), CodegenError> {
        let mut inits = Vec::with_capacity(fields.len());
        for (key, field) in fields {
            let local = format!("{var}_{}", field.name.trim_start_matches("r#"));
            let expr = self.field(sb, &field.ty, input, key, &local)?;
            inits.push(format!("{}: {expr},", field.name));
        }
        sb.open(format!("Ok({constructor} {{"));
        for init in inits {
            sb.line(init);
        }
        sb.close("})");
        Ok(())
    }

    /// Returns the value of the field at `key`, already unwrapped with `?`.
    fn field(
        &mut self,
        sb: &mut SourceBuilder,
        ty: &TypeInfo,
        input: &str,
        key: &str,
        local: &str,
    ) -> Result<String, CodegenError> {
        let quoted = quote(key);
        match &ty.shape {
            TypeShape::Leaf(PrimitiveCategory::Object(name)) if self.needs_inline(ty) => {
                let call = format!("decoder.get_object_with({input}, {quoted}, ");
                self.inline_object(sb, name, &call, local, "})?;")?;
            }
            TypeShape::Nullable(inner) if self.needs_inline(inner) => match &inner.shape {
                TypeShape::Leaf(PrimitiveCategory::Object(name)) => {
                    let call = format!("decoder.get_nullable_object_with({input}, {quoted}, ");
                    self.inline_object(sb, name, &call, local, "})?;")?;
                }
                TypeShape::Array(element) => {
                    let call = format!("decoder.get_nullable_array({input}, {quoted}, ");
                    self.element_closure(sb, element, &call, local, "})?;")?;
                }
                _ => {
                    return Err(CodegenError::UnsupportedInput(format!(
                        "nested nullable type {}",
                        ty.rust_type
                    )))
                }
            },
            TypeShape::Array(element) if self.needs_inline(element) => {
                let call = format!("decoder.get_array({input}, {quoted}, ");
                self.element_closure(sb, element, &call, local, "})?;")?;
            }
            _ => return Ok(format!("{}?", decode_field(ty, input, key)?)),
        }
        Ok(local.to_string())
    }

    /// Writes `let <local> = <call>|decoder, <local>_value, <local>_key| { .. }<end>`
    /// where the closure decodes one element of type `ty`.
    fn element_closure(
        &mut self,
        sb: &mut SourceBuilder,
        ty: &TypeInfo,
        call: &str,
        local: &str,
        end: &str,
    ) -> Result<(), CodegenError> {
        let value = format!("{local}_value");
        let key = format!("{local}_key");
        sb.open(format!("let {local} = {call}|decoder, {value}, {key}| {{"));
        let expr = self.value(sb, ty, &value, &key, &format!("{local}_element"))?;
        sb.line(expr);
        sb.close(end);
        Ok(())
    }

    /// Returns an expression of type `Result<T, ValueError>` decoding the
    /// value `value` keyed `key`.
    fn value(
        &mut self,
        sb: &mut SourceBuilder,
        ty: &TypeInfo,
        value: &str,
        key: &str,
        local: &str,
    ) -> Result<String, CodegenError> {
        match &ty.shape {
            TypeShape::Leaf(PrimitiveCategory::Object(name)) if self.needs_inline(ty) => {
                let call = format!("decoder.decode_object_with({value}, {key}, ");
                self.inline_object(sb, name, &call, local, "});")?;
            }
            TypeShape::Nullable(inner) if self.needs_inline(inner) => {
                let call = format!("decoder.decode_nullable({value}, {key}, ");
                self.element_closure(sb, inner, &call, local, "});")?;
            }
            TypeShape::Array(inner) if self.needs_inline(inner) => {
                let call = format!("decoder.decode_array({value}, {key}, ");
                self.element_closure(sb, inner, &call, local, "});")?;
            }
            _ => return decode_value(ty, value, key),
        }
        Ok(local.to_string())
    }

    fn inline_object(
        &mut self,
        sb: &mut SourceBuilder,
        name: &str,
        call: &str,
        local: &str,
        end: &str,
    ) -> Result<(), CodegenError> {
        if self.expanding.iter().any(|n| n == name) {
            return Err(CodegenError::RecursiveExpansion(name.to_string()));
        }
        let catalogue = self.catalogue;
        let object = lookup(catalogue, name)?;
        let input = format!("{local}_input");
        self.expanding.push(name.to_string());
        sb.open(format!("let {local} = {call}|decoder, {input}| {{"));
        self.object_body(sb, &object.rust_type, &object.fields, &input, local)?;
        sb.close(end);
        self.expanding.pop();
        Ok(())
    }

    /// True when `ty` contains an anonymous object declared in the crate.
    fn needs_inline(&self, ty: &TypeInfo) -> bool {
        match &ty.shape {
            TypeShape::Leaf(PrimitiveCategory::Object(name)) => self
                .catalogue
                .object(name)
                .is_some_and(|o| o.is_anonymous && !is_external(&o.rust_type)),
            TypeShape::Leaf(_) => false,
            TypeShape::Nullable(inner) | TypeShape::Array(inner) => self.needs_inline(inner),
        }
    }
}

fn lookup<'c>(catalogue: &'c Catalogue, name: &str) -> Result<&'c ObjectInfo, CodegenError> {
    catalogue.object(name).ok_or_else(|| CodegenError::UnknownType {
        name: name.to_string(),
        referenced_from: "decoder".to_string(),
    })
}

/// Map-level decode of one field, e.g. `decoder.get_int::<i32>(input, "Id")`.
fn decode_field(ty: &TypeInfo, input: &str, key: &str) -> Result<String, CodegenError> {
    let key = quote(key);
    match &ty.shape {
        TypeShape::Leaf(category) => Ok(format!(
            "decoder.{}({input}, {key})",
            getter(category, &ty.rust_type, false)?
        )),
        TypeShape::Nullable(inner) => match &inner.shape {
            TypeShape::Leaf(category) => Ok(format!(
                "decoder.{}({input}, {key})",
                getter(category, &inner.rust_type, true)?
            )),
            TypeShape::Array(element) => Ok(format!(
                "decoder.get_nullable_array({input}, {key}, {})",
                decode_closure(element)?
            )),
            TypeShape::Nullable(_) => Err(CodegenError::UnsupportedInput(format!(
                "nested nullable type {}",
                ty.rust_type
            ))),
        },
        TypeShape::Array(element) => Ok(format!(
            "decoder.get_array({input}, {key}, {})",
            decode_closure(element)?
        )),
    }
}

/// Value-level decode of `value`, e.g. `decoder.decode_string(v, k)`.
fn decode_value(ty: &TypeInfo, value: &str, key: &str) -> Result<String, CodegenError> {
    match &ty.shape {
        TypeShape::Leaf(category) => Ok(format!(
            "decoder.{}({value}, {key})",
            value_decoder(category, &ty.rust_type)?
        )),
        TypeShape::Nullable(inner) => Ok(format!(
            "decoder.decode_nullable({value}, {key}, {})",
            decode_closure(inner)?
        )),
        TypeShape::Array(inner) => Ok(format!(
            "decoder.decode_array({value}, {key}, {})",
            decode_closure(inner)?
        )),
    }
}

/// Value-level decoder closure for array elements.
fn decode_closure(ty: &TypeInfo) -> Result<String, CodegenError> {
    match &ty.shape {
        TypeShape::Leaf(category) => Ok(format!(
            "|d, v, k| d.{}(v, k)",
            value_decoder(category, &ty.rust_type)?
        )),
        TypeShape::Nullable(inner) => Ok(format!(
            "|d, v, k| d.decode_nullable(v, k, {})",
            decode_closure(inner)?
        )),
        TypeShape::Array(inner) => Ok(format!(
            "|d, v, k| d.decode_array(v, k, {})",
            decode_closure(inner)?
        )),
    }
}

fn getter(category: &PrimitiveCategory, rust_type: &str, nullable: bool) -> Result<String, CodegenError> {
    let prefix = if nullable { "get_nullable_" } else { "get_" };
    let method = match category {
        PrimitiveCategory::Bool => format!("{prefix}bool"),
        PrimitiveCategory::String => format!("{prefix}string"),
        PrimitiveCategory::Int(_) => format!("{prefix}int::<{rust_type}>"),
        PrimitiveCategory::Uint(_) => format!("{prefix}uint::<{rust_type}>"),
        PrimitiveCategory::Float(_) => format!("{prefix}float::<{rust_type}>"),
        PrimitiveCategory::Timestamp => format!("{prefix}date_time"),
        PrimitiveCategory::Duration => format!("{prefix}duration"),
        PrimitiveCategory::Json => format!("{prefix}arbitrary_json"),
        PrimitiveCategory::Complex(bits) => {
            return Err(CodegenError::UnsupportedInput(format!(
                "complex{bits} arguments are not supported"
            )))
        }
        // Custom scalars and objects from other crates go through `Deserialize`.
        PrimitiveCategory::CustomScalar(_) => format!("{prefix}scalar::<{rust_type}>"),
        PrimitiveCategory::Object(_) if is_external(rust_type) => {
            format!("{prefix}scalar::<{rust_type}>")
        }
        PrimitiveCategory::Object(_) if nullable => {
            format!("decode_nullable_object_value::<{rust_type}>")
        }
        PrimitiveCategory::Object(_) => format!("decode_object_value::<{rust_type}>"),
    };
    Ok(method)
}

fn value_decoder(category: &PrimitiveCategory, rust_type: &str) -> Result<String, CodegenError> {
    let method = match category {
        PrimitiveCategory::Bool => "decode_bool".to_string(),
        PrimitiveCategory::String => "decode_string".to_string(),
        PrimitiveCategory::Int(_) => format!("decode_int::<{rust_type}>"),
        PrimitiveCategory::Uint(_) => format!("decode_uint::<{rust_type}>"),
        PrimitiveCategory::Float(_) => format!("decode_float::<{rust_type}>"),
        PrimitiveCategory::Timestamp => "decode_date_time".to_string(),
        PrimitiveCategory::Duration => "decode_duration".to_string(),
        PrimitiveCategory::Json => "decode_json".to_string(),
        PrimitiveCategory::Complex(bits) => {
            return Err(CodegenError::UnsupportedInput(format!(
                "complex{bits} arguments are not supported"
            )))
        }
        PrimitiveCategory::CustomScalar(_) => format!("decode_scalar::<{rust_type}>"),
        PrimitiveCategory::Object(_) if is_external(rust_type) => {
            format!("decode_scalar::<{rust_type}>")
        }
        PrimitiveCategory::Object(_) => format!("decode_object::<{rust_type}>"),
    };
    Ok(method)
}

/// Generated impls only exist for types inside the crate.
fn is_external(rust_type: &str) -> bool {
    !rust_type.starts_with("crate::")
}
