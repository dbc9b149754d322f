//! Renders a [`Catalogue`] into the schema document served at `/schema`.

use std::collections::BTreeMap;

use ndc_schema::{
    AggregateFunctionDefinition, ArgumentInfo, ComparisonOperatorDefinition, FunctionInfo,
    ObjectField, ObjectType, ProcedureInfo, ScalarType, SchemaResponse, Type, TypeRepresentation,
};

use crate::catalogue::{Catalogue, FieldInfo, OperationInfo, PrimitiveCategory};

pub fn build_schema(catalogue: &Catalogue) -> SchemaResponse {
    let mut scalar_types = BTreeMap::new();
    for ty in catalogue.type_infos() {
        let category = ty.category();
        if let Some(name) = category.builtin_scalar_name() {
            scalar_types
                .entry(name.clone())
                .or_insert_with(|| builtin_scalar(category, &name));
        }
    }
    for scalar in catalogue.scalars.values() {
        scalar_types.insert(
            scalar.schema_name.clone(),
            ScalarType {
                representation: scalar.representation.clone(),
                comparison_operators: equality(),
                ..Default::default()
            },
        );
    }

    let object_types = catalogue
        .objects
        .values()
        .map(|object| {
            let fields = object
                .fields
                .values()
                .map(|field| {
                    (
                        field.key.clone(),
                        ObjectField {
                            description: field.description.clone(),
                            arguments: BTreeMap::new(),
                            field_type: field.ty.schema_type.clone(),
                        },
                    )
                })
                .collect();
            (
                object.name.clone(),
                ObjectType {
                    description: object.description.clone(),
                    fields,
                },
            )
        })
        .collect();

    let functions = catalogue
        .functions
        .values()
        .map(|op| FunctionInfo {
            name: op.name.clone(),
            description: op.description.clone(),
            arguments: arguments(op),
            result_type: op.result.schema_type.clone(),
        })
        .collect();
    let procedures = catalogue
        .procedures
        .values()
        .map(|op| ProcedureInfo {
            name: op.name.clone(),
            description: op.description.clone(),
            arguments: arguments(op),
            result_type: op.result.schema_type.clone(),
        })
        .collect();

    SchemaResponse {
        scalar_types,
        object_types,
        collections: Vec::new(),
        functions,
        procedures,
    }
}

/// Pretty-printed JSON with a trailing newline.
pub fn render_schema(catalogue: &Catalogue) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(&build_schema(catalogue))?;
    out.push('\n');
    Ok(out)
}

fn arguments(op: &OperationInfo) -> BTreeMap<String, ArgumentInfo> {
    op.arguments
        .iter()
        .flat_map(|args| args.fields.values())
        .map(|field: &FieldInfo| {
            (
                field.key.clone(),
                ArgumentInfo {
                    description: field.description.clone(),
                    argument_type: field.ty.schema_type.clone(),
                },
            )
        })
        .collect()
}

fn equality() -> BTreeMap<String, ComparisonOperatorDefinition> {
    BTreeMap::from([("_eq".to_string(), ComparisonOperatorDefinition::Equal)])
}

fn builtin_scalar(category: &PrimitiveCategory, name: &str) -> ScalarType {
    let mut comparison_operators = equality();
    let mut aggregate_functions = BTreeMap::new();

    if category.is_numeric() {
        for op in ["_gt", "_gte", "_lt", "_lte"] {
            comparison_operators.insert(
                op.to_string(),
                ComparisonOperatorDefinition::Custom {
                    argument_type: Type::named(name),
                },
            );
        }
        for agg in ["_min", "_max", "_sum"] {
            aggregate_functions.insert(
                agg.to_string(),
                AggregateFunctionDefinition {
                    result_type: Type::nullable(Type::named(name)),
                },
            );
        }
    }
    if *category == PrimitiveCategory::String {
        comparison_operators.insert(
            "_like".to_string(),
            ComparisonOperatorDefinition::Custom {
                argument_type: Type::named(name),
            },
        );
    }

    let representation = match category {
        PrimitiveCategory::Bool => Some(TypeRepresentation::Boolean),
        PrimitiveCategory::String | PrimitiveCategory::Timestamp => Some(TypeRepresentation::String),
        PrimitiveCategory::Int(_) | PrimitiveCategory::Uint(_) | PrimitiveCategory::Duration => {
            Some(TypeRepresentation::Integer)
        }
        PrimitiveCategory::Float(_) => Some(TypeRepresentation::Number),
        PrimitiveCategory::Json => Some(TypeRepresentation::Json),
        _ => None,
    };

    ScalarType {
        representation,
        aggregate_functions,
        comparison_operators,
        update_operators: BTreeMap::new(),
    }
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

    const MANIFEST: &str = r#"{
        "functions": [{
            "origin": "function_get_articles",
            "description": "Lists articles",
            "arguments": {"type_name": "GetArticlesArguments", "fields": [
                {"name": "limit", "key": "Limit", "type": {"kind": "f64"}}]},
            "result": {"kind": "array", "element_type": {"kind": "named", "name": "GetArticlesResult"}}
        }],
        "procedures": [{
            "origin": "procedure_pick",
            "result": {"kind": "nullable", "underlying_type": {"kind": "named", "name": "SomeEnum"}}
        }],
        "objects": [{"name": "GetArticlesResult", "fields": [
            {"name": "id", "type": {"kind": "string"}},
            {"name": "name", "key": "Name", "type": {"kind": "string"}}
        ]}],
        "scalars": [{"name": "SomeEnum", "enum_values": [{"variant": "Foo", "value": "foo"}]}]
    }"#;

    #[test]
    fn test_scalars_for_used_categories_only() {
        let schema = build_schema(&catalogue(MANIFEST));
        assert_eq!(
            schema.scalar_types.keys().collect::<Vec<_>>(),
            vec!["Float64", "SomeEnum", "String"]
        );

        let float = &schema.scalar_types["Float64"];
        assert_eq!(float.representation, Some(TypeRepresentation::Number));
        assert_eq!(
            float.comparison_operators.keys().collect::<Vec<_>>(),
            vec!["_eq", "_gt", "_gte", "_lt", "_lte"]
        );
        assert_eq!(
            float.aggregate_functions["_sum"].result_type,
            Type::nullable(Type::named("Float64"))
        );

        let string = &schema.scalar_types["String"];
        assert!(string.comparison_operators.contains_key("_like"));
        assert!(string.aggregate_functions.is_empty());

        assert_eq!(
            schema.scalar_types["SomeEnum"].representation,
            Some(TypeRepresentation::Enum {
                one_of: vec!["foo".to_string()]
            })
        );
    }

    #[test]
    fn test_operations_and_objects() {
        let schema = build_schema(&catalogue(MANIFEST));
        assert!(schema.collections.is_empty());

        let function = &schema.functions[0];
        assert_eq!(function.name, "getArticles");
        assert_eq!(function.description.as_deref(), Some("Lists articles"));
        assert_eq!(function.arguments["Limit"].argument_type, Type::named("Float64"));
        assert_eq!(
            function.result_type,
            Type::array(Type::named("GetArticlesResult"))
        );

        assert_eq!(schema.procedures[0].name, "pick");
        assert!(schema.procedures[0].arguments.is_empty());

        let object = &schema.object_types["GetArticlesResult"];
        assert_eq!(object.fields.keys().collect::<Vec<_>>(), vec!["Name", "id"]);
    }

    #[test]
    fn test_render_is_pretty_and_stable() {
        let catalogue = catalogue(MANIFEST);
        let first = render_schema(&catalogue).unwrap();
        assert!(first.starts_with("{\n  \"scalar_types\""));
        assert!(first.ends_with("}\n"));
        assert_eq!(first, render_schema(&catalogue).unwrap());
    }
}
