//! Expressions that encode a Rust place into a `serde_json::Value`.
//!
//! Named objects delegate to their `ToMap` impl. Anonymous objects have no
//! impl of their own and are expanded inline, field by field.

use super::{quote, SourceBuilder};
use crate::catalogue::{Catalogue, ObjectInfo, PrimitiveCategory, TypeInfo, TypeShape};
use crate::error::CodegenError;

pub(crate) struct ValueEncoder<'a> {
    catalogue: &'a Catalogue,
    /// Anonymous objects on the current expansion path.
    expanding: Vec<String>,
}

impl<'a> ValueEncoder<'a> {
    pub(crate) fn new(catalogue: &'a Catalogue) -> Self {
        Self {
            catalogue,
            expanding: Vec::new(),
        }
    }

    /// Returns an expression encoding `place`. Statements the expression
    /// depends on are written to `sb` first, using locals prefixed with `var`.
    pub(crate) fn encode(
        &mut self,
        sb: &mut SourceBuilder,
        ty: &TypeInfo,
        place: &str,
        var: &str,
    ) -> Result<String, CodegenError> {
        match &ty.shape {
            TypeShape::Leaf(category) => self.leaf(sb, category, place, var),
            TypeShape::Nullable(inner) => match self.nullable_shortcut(inner, place) {
                Some(expr) => Ok(expr),
                None => self.nullable(sb, inner, place, var),
            },
            TypeShape::Array(inner) => match self.array_shortcut(inner, place) {
                Some(expr) => Ok(expr),
                None => self.array(sb, inner, place, var),
            },
        }
    }

    /// Writes `let mut <var> = Map::new();` followed by one insert per field.
    pub(crate) fn object_fields(
        &mut self,
        sb: &mut SourceBuilder,
        object: &ObjectInfo,
        place: &str,
        var: &str,
    ) -> Result<(), CodegenError> {
        sb.line(format!("let mut {var} = Map::new();"));
        for field in object.fields.values() {
            let field_place = format!("{place}.{}", field.name);
            let field_var = format!("{var}_{}", field.name.trim_start_matches("r#"));
            let expr = self.encode(sb, &field.ty, &field_place, &field_var)?;
            sb.line(format!("{var}.insert({}.to_string(), {expr});", quote(&field.key)));
        }
        Ok(())
    }

    fn leaf(
        &mut self,
        sb: &mut SourceBuilder,
        category: &PrimitiveCategory,
        place: &str,
        var: &str,
    ) -> Result<String, CodegenError> {
        match category {
            PrimitiveCategory::Complex(bits) => Err(CodegenError::UnsupportedInput(format!(
                "complex{bits} values cannot be encoded ({place})"
            ))),
            PrimitiveCategory::Duration => Ok(format!("utils::encode_duration(&{place})")),
            PrimitiveCategory::Object(name) => {
                if self.is_anonymous(name)? {
                    self.expand_object(sb, name, place, var)
                } else {
                    Ok(format!("utils::encode_map(&{place})"))
                }
            }
            _ => Ok(format!("utils::encode_value(&{place})")),
        }
    }

    fn nullable_shortcut(&self, inner: &TypeInfo, place: &str) -> Option<String> {
        match &inner.shape {
            TypeShape::Leaf(PrimitiveCategory::Duration) => {
                Some(format!("utils::encode_nullable_duration(&{place})"))
            }
            TypeShape::Leaf(PrimitiveCategory::Object(name)) if self.is_named(name) => {
                Some(format!("utils::encode_nullable_map(&{place})"))
            }
            TypeShape::Array(element) if self.is_named_object_leaf(element) => {
                Some(format!("utils::encode_nullable_maps(&{place})"))
            }
            _ if serializes_directly(inner) => Some(format!("utils::encode_value(&{place})")),
            _ => None,
        }
    }

    fn array_shortcut(&self, element: &TypeInfo, place: &str) -> Option<String> {
        if self.is_named_object_leaf(element) {
            Some(format!("utils::encode_maps(&{place})"))
        } else if serializes_directly(element) {
            Some(format!("utils::encode_value(&{place})"))
        } else {
            None
        }
    }

    fn nullable(
        &mut self,
        sb: &mut SourceBuilder,
        inner: &TypeInfo,
        place: &str,
        var: &str,
    ) -> Result<String, CodegenError> {
        let binding = format!("{var}_value");
        sb.open(format!("let {var} = match &{place} {{"));
        sb.open(format!("Some({binding}) => {{"));
        let expr = self.encode(sb, inner, &binding, &format!("{var}_some"))?;
        sb.line(expr);
        sb.close("}");
        sb.line("None => Value::Null,");
        sb.close("};");
        Ok(var.to_string())
    }

    fn array(
        &mut self,
        sb: &mut SourceBuilder,
        element: &TypeInfo,
        place: &str,
        var: &str,
    ) -> Result<String, CodegenError> {
        let binding = format!("{var}_item");
        sb.line(format!("let mut {var} = Vec::with_capacity({place}.len());"));
        sb.open(format!("for {binding} in {place}.iter() {{"));
        let expr = self.encode(sb, element, &binding, &format!("{var}_element"))?;
        sb.line(format!("{var}.push({expr});"));
        sb.close("}");
        sb.line(format!("let {var} = Value::Array({var});"));
        Ok(var.to_string())
    }

    fn expand_object(
        &mut self,
        sb: &mut SourceBuilder,
        name: &str,
        place: &str,
        var: &str,
    ) -> Result<String, CodegenError> {
        if self.expanding.iter().any(|n| n == name) {
            return Err(CodegenError::RecursiveExpansion(name.to_string()));
        }
        let catalogue = self.catalogue;
        let object = lookup(catalogue, name)?;
        self.expanding.push(name.to_string());
        self.object_fields(sb, object, place, var)?;
        self.expanding.pop();
        Ok(format!("Value::Object({var})"))
    }

    fn is_anonymous(&self, name: &str) -> Result<bool, CodegenError> {
        Ok(lookup(self.catalogue, name)?.is_anonymous)
    }

    fn is_named(&self, name: &str) -> bool {
        self.catalogue
            .object(name)
            .is_some_and(|object| !object.is_anonymous)
    }

    fn is_named_object_leaf(&self, ty: &TypeInfo) -> bool {
        match &ty.shape {
            TypeShape::Leaf(PrimitiveCategory::Object(name)) => self.is_named(name),
            _ => false,
        }
    }
}

fn lookup<'c>(catalogue: &'c Catalogue, name: &str) -> Result<&'c ObjectInfo, CodegenError> {
    catalogue.object(name).ok_or_else(|| CodegenError::UnknownType {
        name: name.to_string(),
        referenced_from: "encoder".to_string(),
    })
}

/// `Serialize` already produces the wire encoding: no durations, objects or
/// complex numbers anywhere inside.
fn serializes_directly(ty: &TypeInfo) -> bool {
    !matches!(
        ty.category(),
        PrimitiveCategory::Duration | PrimitiveCategory::Object(_) | PrimitiveCategory::Complex(_)
    )
}
