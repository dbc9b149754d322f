//! Argument and variable resolution shared by every query handler.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use ndc_schema::{Argument, QueryRequest, RowSet, VariableSet};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::ConnectorError;
use crate::utils::decode::{Decoder, FromValue};
use crate::utils::selection::FUNCTION_VALUE_FIELD;

#[derive(Debug, Error, PartialEq)]
#[error("variable {name} is not bound for argument {argument}")]
pub struct UnboundVariable {
    pub argument: String,
    pub name: String,
}

/// The variable sets a query runs against. A request without variables (or
/// with an empty list) runs once with no bindings.
pub fn variable_sets(request: &QueryRequest) -> Vec<VariableSet> {
    match &request.variables {
        Some(sets) if !sets.is_empty() => sets.clone(),
        _ => vec![VariableSet::new()],
    }
}

/// Substitutes variable references with their bound values.
pub fn resolve_argument_variables(
    arguments: &BTreeMap<String, Argument>,
    variables: &VariableSet,
) -> Result<Map<String, Value>, UnboundVariable> {
    let mut resolved = Map::new();
    for (key, argument) in arguments {
        let value = match argument {
            Argument::Literal { value } => value.clone(),
            Argument::Variable { name } => {
                variables
                    .get(name)
                    .cloned()
                    .ok_or_else(|| UnboundVariable {
                        argument: key.clone(),
                        name: name.clone(),
                    })?
            }
        };
        resolved.insert(key.clone(), value);
    }
    Ok(resolved)
}

/// Decodes a raw procedure argument object.
pub fn decode_arguments<T: FromValue>(decoder: &Decoder, raw: &Value) -> Result<T, ConnectorError> {
    match raw {
        Value::Object(map) => T::from_value(decoder, map)
            .map_err(|e| ConnectorError::bad_request_with_cause("failed to decode arguments", e)),
        Value::Null => T::from_value(decoder, &Map::new())
            .map_err(|e| ConnectorError::bad_request_with_cause("failed to decode arguments", e)),
        other => Err(ConnectorError::bad_request_with_cause(
            "failed to decode arguments",
            format_args!("expected an object, got {}", crate::utils::decode::json_kind(other)),
        )),
    }
}

/// Wraps a function result as the single row of a row set.
pub fn function_row_set(result: Value) -> RowSet {
    let mut row = IndexMap::new();
    row.insert(FUNCTION_VALUE_FIELD.to_string(), result);
    RowSet {
        aggregates: None,
        rows: Some(vec![row]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndc_schema::Query;
    use serde_json::json;

    fn request(variables: Option<Vec<VariableSet>>) -> QueryRequest {
        QueryRequest {
            collection: "hello".to_string(),
            query: Query::default(),
            arguments: BTreeMap::new(),
            collection_relationships: BTreeMap::new(),
            variables,
        }
    }

    #[test]
    fn test_variable_sets_default_to_single_empty_binding() {
        assert_eq!(variable_sets(&request(None)), vec![VariableSet::new()]);
        assert_eq!(variable_sets(&request(Some(vec![]))), vec![VariableSet::new()]);

        let mut set = VariableSet::new();
        set.insert("id".to_string(), json!(1));
        assert_eq!(variable_sets(&request(Some(vec![set.clone(), set]))).len(), 2);
    }

    #[test]
    fn test_resolve_argument_variables() {
        let mut arguments = BTreeMap::new();
        arguments.insert("Limit".to_string(), Argument::Variable { name: "limit".to_string() });
        arguments.insert("Name".to_string(), Argument::Literal { value: json!("x") });
        let mut variables = VariableSet::new();
        variables.insert("limit".to_string(), json!(5));

        let resolved = resolve_argument_variables(&arguments, &variables).unwrap();
        assert_eq!(Value::Object(resolved), json!({"Limit": 5, "Name": "x"}));

        let err = resolve_argument_variables(&arguments, &VariableSet::new()).unwrap_err();
        assert_eq!(err.name, "limit");
        assert_eq!(err.argument, "Limit");
    }

    #[test]
    fn test_function_row_set_shape() {
        let row_set = function_row_set(json!([1, 2]));
        assert_eq!(serde_json::to_value(&row_set).unwrap(), json!({"rows": [{"__value": [1, 2]}]}));
    }

    struct Args {
        name: String,
    }

    impl FromValue for Args {
        fn from_value(decoder: &Decoder, input: &Map<String, Value>) -> Result<Self, crate::utils::ValueError> {
            Ok(Self {
                name: decoder.get_string(input, "name")?,
            })
        }
    }

    #[test]
    fn test_decode_arguments() {
        let decoder = Decoder::new();
        let args: Args = decode_arguments(&decoder, &json!({"name": "a"})).unwrap();
        assert_eq!(args.name, "a");
        let err = decode_arguments::<Args>(&decoder, &json!([1])).err().unwrap();
        assert_eq!(err.message(), "failed to decode arguments");
        assert!(decode_arguments::<Args>(&decoder, &json!({})).is_err());
    }
}
