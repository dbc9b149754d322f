//! Signature catalogue: the canonical, sorted registries of operations and
//! types that code synthesis and the schema builder render from.

use std::collections::{BTreeMap, BTreeSet};

use ndc_schema::{Type, TypeRepresentation};

use crate::error::CodegenError;
use crate::manifest::{
    upper_first, FieldSignature, Manifest, ObjectSignature, OperationSignature,
    ScalarRepresentation, ScalarSignature, TypeDescriptor,
};

/// What a leaf type is, independent of its Rust spelling. Widths are in bits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrimitiveCategory {
    Bool,
    String,
    Int(u8),
    Uint(u8),
    Float(u8),
    Complex(u8),
    Timestamp,
    Duration,
    Json,
    CustomScalar(String),
    Object(String),
}

impl PrimitiveCategory {
    /// Schema name of a built-in scalar category.
    pub fn builtin_scalar_name(&self) -> Option<String> {
        match self {
            PrimitiveCategory::Bool => Some("Boolean".to_string()),
            PrimitiveCategory::String => Some("String".to_string()),
            PrimitiveCategory::Int(bits) => Some(format!("Int{bits}")),
            PrimitiveCategory::Uint(bits) => Some(format!("UInt{bits}")),
            PrimitiveCategory::Float(bits) => Some(format!("Float{bits}")),
            PrimitiveCategory::Timestamp => Some("TimestampTZ".to_string()),
            PrimitiveCategory::Duration => Some("Duration".to_string()),
            PrimitiveCategory::Json => Some("JSON".to_string()),
            PrimitiveCategory::Complex(_)
            | PrimitiveCategory::CustomScalar(_)
            | PrimitiveCategory::Object(_) => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, PrimitiveCategory::Object(_))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            PrimitiveCategory::Int(_) | PrimitiveCategory::Uint(_) | PrimitiveCategory::Float(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeShape {
    Leaf(PrimitiveCategory),
    Nullable(Box<TypeInfo>),
    Array(Box<TypeInfo>),
}

/// A canonicalized type: its category, wire type and Rust spelling.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeInfo {
    pub shape: TypeShape,
    pub schema_type: Type,
    pub rust_type: String,
}

impl TypeInfo {
    fn leaf(category: PrimitiveCategory, schema_name: impl Into<String>, rust_type: impl Into<String>) -> Self {
        Self {
            shape: TypeShape::Leaf(category),
            schema_type: Type::named(schema_name),
            rust_type: rust_type.into(),
        }
    }

    /// `Option<Option<T>>` has no wire counterpart; nested nullability collapses.
    fn nullable(inner: TypeInfo) -> Self {
        if inner.is_nullable() {
            return inner;
        }
        Self {
            schema_type: Type::nullable(inner.schema_type.clone()),
            rust_type: format!("Option<{}>", inner.rust_type),
            shape: TypeShape::Nullable(Box::new(inner)),
        }
    }

    fn array(inner: TypeInfo) -> Self {
        Self {
            schema_type: Type::array(inner.schema_type.clone()),
            rust_type: format!("Vec<{}>", inner.rust_type),
            shape: TypeShape::Array(Box::new(inner)),
        }
    }

    /// Category of the innermost leaf.
    pub fn category(&self) -> &PrimitiveCategory {
        match &self.shape {
            TypeShape::Leaf(category) => category,
            TypeShape::Nullable(inner) | TypeShape::Array(inner) => inner.category(),
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self.shape, TypeShape::Nullable(_))
    }

    /// True for `Vec<T>` and `Option<Vec<T>>`.
    pub fn is_array(&self) -> bool {
        match &self.shape {
            TypeShape::Array(_) => true,
            TypeShape::Nullable(inner) => inner.is_array(),
            TypeShape::Leaf(_) => false,
        }
    }

    pub fn is_scalar(&self) -> bool {
        self.category().is_scalar()
    }

    pub fn without_nullable(&self) -> &TypeInfo {
        match &self.shape {
            TypeShape::Nullable(inner) => inner,
            _ => self,
        }
    }

    pub fn object_name(&self) -> Option<&str> {
        match self.category() {
            PrimitiveCategory::Object(name) => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    /// Rust field name.
    pub name: String,
    /// Wire key.
    pub key: String,
    pub description: Option<String>,
    pub ty: TypeInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInfo {
    pub name: String,
    pub rust_type: String,
    pub package: String,
    pub description: Option<String>,
    pub is_anonymous: bool,
    /// Reachable from some operation's arguments; gets a `FromValue` impl.
    pub is_input: bool,
    /// Keyed by wire key.
    pub fields: BTreeMap<String, FieldInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub variant: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarInfo {
    pub name: String,
    pub rust_type: String,
    pub package: String,
    pub schema_name: String,
    pub description: Option<String>,
    pub representation: Option<TypeRepresentation>,
    pub enum_values: Vec<EnumValue>,
}

impl ScalarInfo {
    pub fn is_enum(&self) -> bool {
        !self.enum_values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentsInfo {
    pub type_name: String,
    pub rust_type: String,
    pub fields: BTreeMap<String, FieldInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationInfo {
    /// Wire name.
    pub name: String,
    /// Rust function name.
    pub origin: String,
    pub package: String,
    pub description: Option<String>,
    pub arguments: Option<ArgumentsInfo>,
    pub result: TypeInfo,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalogue {
    pub functions: BTreeMap<String, OperationInfo>,
    pub procedures: BTreeMap<String, OperationInfo>,
    pub objects: BTreeMap<String, ObjectInfo>,
    pub scalars: BTreeMap<String, ScalarInfo>,
    /// Package modules the dispatch code calls into.
    pub imports: BTreeSet<String>,
    /// Every package a manifest was read for.
    pub packages: BTreeSet<String>,
}

impl Catalogue {
    pub fn object(&self, name: &str) -> Option<&ObjectInfo> {
        self.objects.get(name)
    }

    pub fn operations(&self) -> impl Iterator<Item = &OperationInfo> {
        self.functions.values().chain(self.procedures.values())
    }

    /// Every type used by an operation or object field.
    pub fn type_infos(&self) -> Vec<&TypeInfo> {
        let mut types = Vec::new();
        for op in self.operations() {
            types.push(&op.result);
            if let Some(args) = &op.arguments {
                types.extend(args.fields.values().map(|f| &f.ty));
            }
        }
        for object in self.objects.values() {
            types.extend(object.fields.values().map(|f| &f.ty));
        }
        types
    }
}

type Declared<T> = BTreeMap<String, (String, T)>;

/// Collects manifests from one or more packages, then resolves them into a
/// [`Catalogue`].
#[derive(Debug, Default)]
pub struct CatalogueBuilder {
    objects: Declared<ObjectSignature>,
    scalars: Declared<ScalarSignature>,
    functions: Vec<(String, OperationSignature)>,
    procedures: Vec<(String, OperationSignature)>,
    packages: BTreeSet<String>,
}

impl CatalogueBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a package manifest. `package` is the module path its
    /// declarations live in.
    pub fn add_manifest(&mut self, package: &str, manifest: Manifest) -> Result<&mut Self, CodegenError> {
        self.packages.insert(package.to_string());
        for scalar in manifest.scalars {
            if self.objects.contains_key(&scalar.name) {
                return Err(CodegenError::DuplicateType(scalar.name));
            }
            declare(&mut self.scalars, package, scalar.name.clone(), scalar)?;
        }
        for object in manifest.objects {
            if self.scalars.contains_key(&object.name) {
                return Err(CodegenError::DuplicateType(object.name));
            }
            declare(&mut self.objects, package, object.name.clone(), object)?;
        }
        self.functions
            .extend(manifest.functions.into_iter().map(|f| (package.to_string(), f)));
        self.procedures
            .extend(manifest.procedures.into_iter().map(|p| (package.to_string(), p)));
        Ok(self)
    }

    pub fn build(self) -> Result<Catalogue, CodegenError> {
        let mut resolver = Resolver {
            objects: &self.objects,
            scalars: &self.scalars,
            catalogue: Catalogue {
                packages: self.packages.clone(),
                ..Default::default()
            },
        };

        for (package, signature) in &self.functions {
            let info = resolver.operation(package, signature)?;
            insert_operation(&mut resolver.catalogue.functions, info)?;
            resolver.catalogue.imports.insert(package.clone());
        }
        for (package, signature) in &self.procedures {
            let info = resolver.operation(package, signature)?;
            insert_operation(&mut resolver.catalogue.procedures, info)?;
            resolver.catalogue.imports.insert(package.clone());
        }

        let mut catalogue = resolver.catalogue;
        mark_inputs(&mut catalogue);
        Ok(catalogue)
    }
}

/// Identical redeclarations (e.g. the same type listed by two packages) are
/// accepted; the first one wins.
fn declare<T: PartialEq>(
    registry: &mut Declared<T>,
    package: &str,
    name: String,
    signature: T,
) -> Result<(), CodegenError> {
    match registry.get(&name) {
        Some((_, existing)) if *existing != signature => Err(CodegenError::DuplicateType(name)),
        Some(_) => Ok(()),
        None => {
            registry.insert(name, (package.to_string(), signature));
            Ok(())
        }
    }
}

fn insert_operation(
    registry: &mut BTreeMap<String, OperationInfo>,
    info: OperationInfo,
) -> Result<(), CodegenError> {
    if registry.contains_key(&info.name) {
        return Err(CodegenError::DuplicateOperation(info.name));
    }
    registry.insert(info.name.clone(), info);
    Ok(())
}

fn mark_inputs(catalogue: &mut Catalogue) {
    let mut pending: Vec<String> = catalogue
        .operations()
        .filter_map(|op| op.arguments.as_ref())
        .flat_map(|args| args.fields.values())
        .filter_map(|f| f.ty.object_name())
        .map(str::to_string)
        .collect();
    while let Some(name) = pending.pop() {
        let Some(object) = catalogue.objects.get_mut(&name) else {
            continue;
        };
        if object.is_input {
            continue;
        }
        object.is_input = true;
        pending.extend(
            object
                .fields
                .values()
                .filter_map(|f| f.ty.object_name())
                .map(str::to_string),
        );
    }
}

struct Resolver<'a> {
    objects: &'a Declared<ObjectSignature>,
    scalars: &'a Declared<ScalarSignature>,
    catalogue: Catalogue,
}

impl Resolver<'_> {
    fn operation(&mut self, package: &str, signature: &OperationSignature) -> Result<OperationInfo, CodegenError> {
        let name = signature.wire_name();
        let arguments = match &signature.arguments {
            Some(args) => Some(ArgumentsInfo {
                type_name: args.type_name.clone(),
                rust_type: format!("{package}::{}", args.type_name),
                fields: self.fields(package, &args.type_name, &args.fields)?,
            }),
            None => None,
        };
        let owner = format!("{}Result", upper_first(&name));
        let result = self.resolve(package, &signature.result, &owner, "")?;
        Ok(OperationInfo {
            name,
            origin: signature.origin.clone(),
            package: package.to_string(),
            description: signature.description.clone(),
            arguments,
            result,
        })
    }

    fn fields(
        &mut self,
        package: &str,
        owner: &str,
        fields: &[FieldSignature],
    ) -> Result<BTreeMap<String, FieldInfo>, CodegenError> {
        let mut resolved = BTreeMap::new();
        for field in fields {
            let key = field.wire_key().to_string();
            let ty = self.resolve(package, &field.field_type, owner, &key)?;
            let info = FieldInfo {
                name: field.name.clone(),
                key: key.clone(),
                description: field.description.clone(),
                ty,
            };
            if resolved.insert(key.clone(), info).is_some() {
                return Err(CodegenError::UnsupportedInput(format!(
                    "field {key} is declared more than once in {owner}"
                )));
            }
        }
        Ok(resolved)
    }

    fn resolve(
        &mut self,
        package: &str,
        descriptor: &TypeDescriptor,
        owner: &str,
        key: &str,
    ) -> Result<TypeInfo, CodegenError> {
        use PrimitiveCategory as P;
        let info = match descriptor {
            TypeDescriptor::Bool => TypeInfo::leaf(P::Bool, "Boolean", "bool"),
            TypeDescriptor::String => TypeInfo::leaf(P::String, "String", "String"),
            TypeDescriptor::I8 => TypeInfo::leaf(P::Int(8), "Int8", "i8"),
            TypeDescriptor::I16 => TypeInfo::leaf(P::Int(16), "Int16", "i16"),
            TypeDescriptor::I32 => TypeInfo::leaf(P::Int(32), "Int32", "i32"),
            TypeDescriptor::I64 => TypeInfo::leaf(P::Int(64), "Int64", "i64"),
            TypeDescriptor::Isize => TypeInfo::leaf(P::Int(64), "Int64", "isize"),
            TypeDescriptor::U8 => TypeInfo::leaf(P::Uint(8), "UInt8", "u8"),
            TypeDescriptor::U16 => TypeInfo::leaf(P::Uint(16), "UInt16", "u16"),
            TypeDescriptor::U32 => TypeInfo::leaf(P::Uint(32), "UInt32", "u32"),
            TypeDescriptor::U64 => TypeInfo::leaf(P::Uint(64), "UInt64", "u64"),
            TypeDescriptor::Usize => TypeInfo::leaf(P::Uint(64), "UInt64", "usize"),
            TypeDescriptor::F32 => TypeInfo::leaf(P::Float(32), "Float32", "f32"),
            TypeDescriptor::F64 => TypeInfo::leaf(P::Float(64), "Float64", "f64"),
            TypeDescriptor::Complex64 => TypeInfo::leaf(P::Complex(64), "Complex64", "Complex64"),
            TypeDescriptor::Complex128 => {
                TypeInfo::leaf(P::Complex(128), "Complex128", "Complex128")
            }
            TypeDescriptor::Timestamp => TypeInfo::leaf(
                P::Timestamp,
                "TimestampTZ",
                "chrono::DateTime<chrono::Utc>",
            ),
            TypeDescriptor::Duration => {
                TypeInfo::leaf(P::Duration, "Duration", "std::time::Duration")
            }
            TypeDescriptor::Json => TypeInfo::leaf(P::Json, "JSON", "serde_json::Value"),
            TypeDescriptor::Named { name } => self.named(name, owner)?,
            TypeDescriptor::Nullable { underlying_type } => {
                TypeInfo::nullable(self.resolve(package, underlying_type, owner, key)?)
            }
            TypeDescriptor::Array { element_type } => {
                TypeInfo::array(self.resolve(package, element_type, owner, key)?)
            }
            TypeDescriptor::Object { rust_type, fields } => {
                let name = format!("{owner}{}", upper_first(key));
                self.inline_object(package, &name, rust_type, fields)?;
                TypeInfo::leaf(P::Object(name.clone()), name, rust_type.clone())
            }
        };
        Ok(info)
    }

    fn named(&mut self, name: &str, referenced_from: &str) -> Result<TypeInfo, CodegenError> {
        let scalars = self.scalars;
        let objects = self.objects;

        if let Some((package, scalar)) = scalars.get(name) {
            let info = self
                .catalogue
                .scalars
                .entry(name.to_string())
                .or_insert_with(|| scalar_info(package, scalar));
            return Ok(TypeInfo::leaf(
                PrimitiveCategory::CustomScalar(name.to_string()),
                info.schema_name.clone(),
                info.rust_type.clone(),
            ));
        }

        if let Some((package, object)) = objects.get(name) {
            let rust_type = object
                .rust_type
                .clone()
                .unwrap_or_else(|| format!("{package}::{}", object.name));
            if !self.catalogue.objects.contains_key(name) {
                // Placeholder first so self-referencing objects terminate.
                self.catalogue.objects.insert(
                    name.to_string(),
                    ObjectInfo {
                        name: name.to_string(),
                        rust_type: rust_type.clone(),
                        package: package.clone(),
                        description: object.description.clone(),
                        is_anonymous: object.anonymous,
                        is_input: false,
                        fields: BTreeMap::new(),
                    },
                );
                let fields = self.fields(package, name, &object.fields)?;
                if let Some(info) = self.catalogue.objects.get_mut(name) {
                    info.fields = fields;
                }
            }
            return Ok(TypeInfo::leaf(
                PrimitiveCategory::Object(name.to_string()),
                name,
                rust_type,
            ));
        }

        Err(CodegenError::UnknownType {
            name: name.to_string(),
            referenced_from: referenced_from.to_string(),
        })
    }

    fn inline_object(
        &mut self,
        package: &str,
        name: &str,
        rust_type: &str,
        fields: &[FieldSignature],
    ) -> Result<(), CodegenError> {
        if self.objects.contains_key(name) || self.scalars.contains_key(name) {
            return Err(CodegenError::DuplicateType(name.to_string()));
        }
        if let Some(existing) = self.catalogue.objects.get(name) {
            if !existing.is_anonymous || existing.rust_type != rust_type {
                return Err(CodegenError::DuplicateType(name.to_string()));
            }
            return Ok(());
        }
        let fields = self.fields(package, name, fields)?;
        self.catalogue.objects.insert(
            name.to_string(),
            ObjectInfo {
                name: name.to_string(),
                rust_type: rust_type.to_string(),
                package: package.to_string(),
                description: None,
                is_anonymous: true,
                is_input: false,
                fields,
            },
        );
        Ok(())
    }
}

fn scalar_info(package: &str, scalar: &ScalarSignature) -> ScalarInfo {
    let representation = if scalar.enum_values.is_empty() {
        scalar.representation.map(|r| match r {
            ScalarRepresentation::String => TypeRepresentation::String,
            ScalarRepresentation::Number => TypeRepresentation::Number,
            ScalarRepresentation::Integer => TypeRepresentation::Integer,
            ScalarRepresentation::Boolean => TypeRepresentation::Boolean,
            ScalarRepresentation::Json => TypeRepresentation::Json,
        })
    } else {
        Some(TypeRepresentation::Enum {
            one_of: scalar.enum_values.iter().map(|v| v.value.clone()).collect(),
        })
    };
    ScalarInfo {
        name: scalar.name.clone(),
        rust_type: format!("{package}::{}", scalar.name),
        package: package.to_string(),
        schema_name: scalar
            .schema_name
            .clone()
            .unwrap_or_else(|| scalar.name.clone()),
        description: scalar.description.clone(),
        representation,
        enum_values: scalar
            .enum_values
            .iter()
            .map(|v| EnumValue {
                variant: v.variant.clone(),
                value: v.value.clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACKAGE: &str = "crate::functions";

    fn build(raw: &str) -> Result<Catalogue, CodegenError> {
        let mut builder = CatalogueBuilder::new();
        builder.add_manifest(PACKAGE, Manifest::parse(raw).unwrap())?;
        builder.build()
    }

    #[test]
    fn test_operations_and_objects_resolve() {
        let catalogue = build(
            r#"{
            "functions": [{
                "origin": "function_get_articles",
                "arguments": {"type_name": "GetArticlesArguments", "fields": [
                    {"name": "limit", "key": "Limit", "type": {"kind": "f64"}}
                ]},
                "result": {"kind": "array", "element_type": {"kind": "named", "name": "GetArticlesResult"}}
            }],
            "objects": [
                {"name": "GetArticlesResult", "fields": [
                    {"name": "id", "type": {"kind": "string"}},
                    {"name": "name", "key": "Name", "type": {"kind": "string"}}
                ]},
                {"name": "Unused", "fields": []}
            ]
        }"#,
        )
        .unwrap();

        let op = &catalogue.functions["getArticles"];
        assert_eq!(op.origin, "function_get_articles");
        assert!(op.result.is_array());
        assert!(!op.result.is_scalar());
        assert_eq!(op.result.rust_type, "Vec<crate::functions::GetArticlesResult>");
        assert_eq!(
            op.result.schema_type,
            Type::array(Type::named("GetArticlesResult"))
        );
        let args = op.arguments.as_ref().unwrap();
        assert_eq!(args.fields["Limit"].ty.category(), &PrimitiveCategory::Float(64));

        assert_eq!(catalogue.objects.keys().collect::<Vec<_>>(), vec!["GetArticlesResult"]);
        assert!(!catalogue.objects["GetArticlesResult"].is_input);
        assert_eq!(
            catalogue.imports.iter().collect::<Vec<_>>(),
            vec!["crate::functions"]
        );
    }

    #[test]
    fn test_inline_objects_get_synthesized_names() {
        let catalogue = build(
            r#"{
            "functions": [{
                "origin": "function_get_types",
                "arguments": {"type_name": "GetTypesArguments", "fields": [
                    {"name": "object", "key": "Object", "type": {"kind": "object", "rust_type": "geo::Point",
                        "fields": [{"name": "lat", "type": {"kind": "f64"}}]}}
                ]},
                "result": {"kind": "nullable", "underlying_type": {"kind": "object", "rust_type": "geo::Point",
                    "fields": [{"name": "lat", "type": {"kind": "f64"}}]}}
            }]
        }"#,
        )
        .unwrap();

        let arg_object = &catalogue.objects["GetTypesArgumentsObject"];
        assert!(arg_object.is_anonymous);
        assert!(arg_object.is_input);
        assert_eq!(arg_object.rust_type, "geo::Point");

        let result_object = &catalogue.objects["GetTypesResult"];
        assert!(result_object.is_anonymous);
        assert!(!result_object.is_input);
    }

    #[test]
    fn test_input_marking_is_transitive() {
        let catalogue = build(
            r#"{
            "procedures": [{
                "origin": "procedure_create_authors",
                "arguments": {"type_name": "CreateAuthorsArguments", "fields": [
                    {"name": "authors", "type": {"kind": "array", "element_type": {"kind": "named", "name": "Author"}}}
                ]},
                "result": {"kind": "bool"}
            }],
            "objects": [
                {"name": "Author", "fields": [
                    {"name": "address", "type": {"kind": "nullable", "underlying_type": {"kind": "named", "name": "Address"}}},
                    {"name": "manager", "type": {"kind": "nullable", "underlying_type": {"kind": "named", "name": "Author"}}}
                ]},
                {"name": "Address", "fields": [{"name": "city", "type": {"kind": "string"}}]}
            ]
        }"#,
        )
        .unwrap();

        assert_eq!(catalogue.procedures["createAuthors"].name, "createAuthors");
        assert!(catalogue.objects["Author"].is_input);
        assert!(catalogue.objects["Address"].is_input);
        assert_eq!(catalogue.objects["Author"].fields.len(), 2);
    }

    #[test]
    fn test_custom_scalars() {
        let catalogue = build(
            r#"{
            "functions": [{"origin": "function_hello", "result": {"kind": "named", "name": "CommentText"}}],
            "procedures": [{"origin": "procedure_pick", "result": {"kind": "named", "name": "SomeEnum"}}],
            "scalars": [
                {"name": "CommentText", "schema_name": "CommentString", "representation": "string"},
                {"name": "SomeEnum", "enum_values": [{"variant": "Foo", "value": "foo"}, {"variant": "Bar", "value": "bar"}]}
            ]
        }"#,
        )
        .unwrap();

        let hello = &catalogue.functions["hello"];
        assert!(hello.result.is_scalar());
        assert_eq!(hello.result.schema_type, Type::named("CommentString"));
        assert_eq!(
            catalogue.scalars["CommentText"].representation,
            Some(TypeRepresentation::String)
        );
        let some_enum = &catalogue.scalars["SomeEnum"];
        assert!(some_enum.is_enum());
        assert_eq!(
            some_enum.representation,
            Some(TypeRepresentation::Enum {
                one_of: vec!["foo".to_string(), "bar".to_string()]
            })
        );
    }

    #[test]
    fn test_nested_nullable_collapses() {
        let catalogue = build(
            r#"{"functions": [{"origin": "f", "result":
                {"kind": "nullable", "underlying_type": {"kind": "nullable", "underlying_type": {"kind": "i32"}}}}]}"#,
        )
        .unwrap();
        let result = &catalogue.functions["f"].result;
        assert_eq!(result.rust_type, "Option<i32>");
        assert_eq!(result.schema_type, Type::nullable(Type::named("Int32")));
    }

    #[test]
    fn test_unknown_type() {
        let err = build(r#"{"functions": [{"origin": "f", "result": {"kind": "named", "name": "Ghost"}}]}"#)
            .unwrap_err();
        match err {
            CodegenError::UnknownType { name, referenced_from } => {
                assert_eq!(name, "Ghost");
                assert_eq!(referenced_from, "FResult");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_type_with_different_shape() {
        let mut builder = CatalogueBuilder::new();
        let first = Manifest::parse(r#"{"objects": [{"name": "Author", "fields": []}]}"#).unwrap();
        let same = first.clone();
        let different = Manifest::parse(
            r#"{"objects": [{"name": "Author", "fields": [{"name": "id", "type": {"kind": "i32"}}]}]}"#,
        )
        .unwrap();
        builder.add_manifest("crate::a", first).unwrap();
        builder.add_manifest("crate::b", same).unwrap();
        let err = builder.add_manifest("crate::c", different).unwrap_err();
        assert!(matches!(err, CodegenError::DuplicateType(name) if name == "Author"));
    }

    #[test]
    fn test_duplicate_operation() {
        let err = build(
            r#"{"functions": [
                {"origin": "function_hello", "result": {"kind": "string"}},
                {"origin": "hello", "result": {"kind": "string"}}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, CodegenError::DuplicateOperation(name) if name == "hello"));
    }
}
