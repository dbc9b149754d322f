//! Projection of encoded results through a field selection.

use indexmap::IndexMap;
use ndc_schema::{Field, NestedField, Query};
use serde_json::{Map, Value};

use crate::error::ConnectorError;

/// Column under which function results are returned.
pub const FUNCTION_VALUE_FIELD: &str = "__value";

/// The selection applied to a function result.
///
/// A `__value` column carries its nested selection. Any other field set is
/// applied to the result itself, so `{"id": .., "Name": ..}` projects each
/// returned object to those keys. No fields means "return as is".
pub fn function_selection(query: &Query) -> Result<Option<NestedField>, ConnectorError> {
    let fields = match &query.fields {
        Some(fields) if !fields.is_empty() => fields,
        _ => return Ok(None),
    };
    match fields.get(FUNCTION_VALUE_FIELD) {
        Some(value_field) => {
            let column = value_field.as_column().map_err(|e| {
                ConnectorError::bad_request_with_cause(
                    format!("the {FUNCTION_VALUE_FIELD} field must be a column"),
                    e,
                )
            })?;
            Ok(column.fields.clone())
        }
        None => Ok(Some(NestedField::Object(fields.clone()))),
    }
}

/// Scalar results accept no selection beyond a bare `__value` column.
pub fn check_scalar_selection(query: &Query) -> Result<(), ConnectorError> {
    let Some(fields) = &query.fields else {
        return Ok(());
    };
    let bare_value_column = |(alias, field): (&String, &Field)| {
        alias == FUNCTION_VALUE_FIELD
            && matches!(field, Field::Column(c) if c.column == FUNCTION_VALUE_FIELD && c.fields.is_none())
    };
    if fields.iter().all(bare_value_column) {
        Ok(())
    } else {
        Err(ConnectorError::bad_request(
            "cannot evaluate selection fields for scalar",
            Value::Null,
        ))
    }
}

/// Narrows a procedure selection to an object selection.
pub fn object_selection(
    fields: Option<&NestedField>,
) -> Result<Option<&IndexMap<String, Field>>, ConnectorError> {
    fields
        .map(|f| {
            f.as_object().map_err(|e| {
                ConnectorError::bad_request_with_cause("the selection field type must be object", e)
            })
        })
        .transpose()
}

/// Narrows a procedure selection to an array selection, returning the
/// selection applied to each element.
pub fn array_selection(fields: Option<&NestedField>) -> Result<Option<&NestedField>, ConnectorError> {
    fields
        .map(|f| {
            f.as_array().map_err(|e| {
                ConnectorError::bad_request_with_cause("the selection field type must be array", e)
            })
        })
        .transpose()
}

fn project_object(
    fields: &IndexMap<String, Field>,
    object: Map<String, Value>,
) -> Result<Value, ConnectorError> {
    let mut projected = Map::with_capacity(fields.len());
    for (alias, field) in fields {
        let column = match field {
            Field::Column(column) => column,
            Field::Relationship(rel) => {
                return Err(ConnectorError::unprocessable_content(
                    format!("relationship field {alias} is not supported on function results"),
                    serde_json::json!({ "relationship": rel.relationship }),
                ))
            }
        };
        // Cloned, since several aliases may select the same column.
        let value = object.get(&column.column).cloned().unwrap_or(Value::Null);
        let value = match &column.fields {
            Some(nested) => eval_nested_field(nested, value)?,
            None => value,
        };
        projected.insert(alias.clone(), value);
    }
    Ok(Value::Object(projected))
}

/// Applies a nested selection to a value. Null passes through unchanged.
pub fn eval_nested_field(selection: &NestedField, value: Value) -> Result<Value, ConnectorError> {
    match (selection, value) {
        (_, Value::Null) => Ok(Value::Null),
        (NestedField::Object(fields), Value::Object(object)) => project_object(fields, object),
        (NestedField::Array(inner), Value::Array(items)) => items
            .into_iter()
            .map(|item| eval_nested_field(inner, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        (NestedField::Object(_), other) => Err(ConnectorError::unprocessable_content(
            "expected an object to apply the object selection",
            serde_json::json!({ "value": other }),
        )),
        (NestedField::Array(_), other) => Err(ConnectorError::unprocessable_content(
            "expected an array to apply the array selection",
            serde_json::json!({ "value": other }),
        )),
    }
}

/// Projects an encoded function result object.
pub fn encode_object_with_column_selection(
    selection: Option<&NestedField>,
    value: Value,
) -> Result<Value, ConnectorError> {
    match selection {
        None => Ok(value),
        Some(selection @ NestedField::Object(_)) => eval_nested_field(selection, value),
        Some(other) => Err(ConnectorError::bad_request(
            "the selection field type must be object",
            serde_json::json!({ "found": other.kind().as_str() }),
        )),
    }
}

/// Projects an encoded function result array. An object selection is
/// applied to every element.
pub fn encode_objects_with_column_selection(
    selection: Option<&NestedField>,
    value: Value,
) -> Result<Value, ConnectorError> {
    match selection {
        None => Ok(value),
        Some(selection @ NestedField::Array(_)) => eval_nested_field(selection, value),
        Some(selection @ NestedField::Object(_)) => {
            let wrapped = NestedField::Array(Box::new(selection.clone()));
            eval_nested_field(&wrapped, value)
        }
    }
}

/// Projects a procedure's object result.
pub fn eval_nested_column_object(
    selection: Option<&IndexMap<String, Field>>,
    value: Value,
) -> Result<Value, ConnectorError> {
    match (selection, value) {
        (None, value) => Ok(value),
        (Some(_), Value::Null) => Ok(Value::Null),
        (Some(fields), Value::Object(object)) => project_object(fields, object),
        (Some(_), other) => Err(ConnectorError::unprocessable_content(
            "expected an object result",
            serde_json::json!({ "value": other }),
        )),
    }
}

/// Projects a procedure's array result element by element.
pub fn eval_nested_column_array(
    selection: Option<&NestedField>,
    value: Value,
) -> Result<Value, ConnectorError> {
    match (selection, value) {
        (None, value) => Ok(value),
        (Some(_), Value::Null) => Ok(Value::Null),
        (Some(inner), Value::Array(items)) => items
            .into_iter()
            .map(|item| eval_nested_field(inner, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        (Some(_), other) => Err(ConnectorError::unprocessable_content(
            "expected an array result",
            serde_json::json!({ "value": other }),
        )),
    }
}
