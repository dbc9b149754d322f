//! Translation of a collection query into parameterized MySQL.
//!
//! Identifiers are checked against the collection's object type and quoted;
//! every value travels as a bound parameter.

use ndc_connector::schema::{
    BinaryArrayComparisonOperator, BinaryComparisonOperator, ComparisonTarget, ComparisonValue,
    Expression, Field, ObjectType, OrderDirection, Query, SchemaResponse, UnaryComparisonOperator,
    VariableSet,
};
use ndc_connector::ConnectorError;
use serde_json::{json, Value};
use sqlx::mysql::MySql;
use sqlx::types::Json;
use sqlx::QueryBuilder;

/// A statement ready to run, plus the aliases of its select list in order.
pub struct SelectStatement {
    pub builder: QueryBuilder<'static, MySql>,
    pub columns: Vec<String>,
    /// Bound values in placeholder order.
    pub params: Vec<Value>,
}

impl SelectStatement {
    pub fn sql(&self) -> &str {
        self.builder.sql()
    }
}

/// Quotes a MySQL identifier.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Builds the SELECT for one variable set. Returns `None` when no fields
/// are requested.
pub fn build_select(
    schema: &SchemaResponse,
    collection: &str,
    query: &Query,
    variables: &VariableSet,
) -> Result<Option<SelectStatement>, ConnectorError> {
    let object_type = schema.collection_object_type(collection).ok_or_else(|| {
        ConnectorError::bad_request(
            format!("unknown collection: {collection}"),
            json!({ "collection": collection }),
        )
    })?;
    if query.aggregates.as_ref().is_some_and(|a| !a.is_empty()) {
        return Err(ConnectorError::not_supported("aggregates are not supported"));
    }
    let Some(fields) = query.fields.as_ref().filter(|f| !f.is_empty()) else {
        return Ok(None);
    };

    let mut translator = Translator {
        object_type,
        variables,
        builder: QueryBuilder::new("SELECT "),
        params: Vec::new(),
    };

    let mut columns = Vec::with_capacity(fields.len());
    for (i, (alias, field)) in fields.iter().enumerate() {
        let column = match field {
            Field::Column(column) if column.fields.is_none() => &column.column,
            Field::Column(column) => {
                return Err(ConnectorError::bad_request(
                    format!("nested selection on column {} is not supported", column.column),
                    Value::Null,
                ))
            }
            Field::Relationship(_) => {
                return Err(ConnectorError::not_supported(format!(
                    "relationship field {alias} is not supported"
                )))
            }
        };
        if i > 0 {
            translator.builder.push(", ");
        }
        translator.push_column(column)?;
        translator.builder.push(" AS ");
        translator.builder.push(quote_identifier(alias));
        columns.push(alias.clone());
    }

    translator.builder.push(" FROM ");
    translator.builder.push(quote_identifier(collection));

    if let Some(predicate) = &query.predicate {
        translator.builder.push(" WHERE ");
        translator.push_expression(predicate)?;
    }

    if let Some(order_by) = query.order_by.as_ref().filter(|o| !o.elements.is_empty()) {
        translator.builder.push(" ORDER BY ");
        for (i, element) in order_by.elements.iter().enumerate() {
            let (column, path) = element.target.as_column()?;
            if !path.is_empty() {
                return Err(ConnectorError::bad_request(
                    "ordering through relationships is not supported",
                    json!({ "column": column }),
                ));
            }
            if i > 0 {
                translator.builder.push(", ");
            }
            translator.push_column(column)?;
            translator.builder.push(match element.order_direction {
                OrderDirection::Asc => " ASC",
                OrderDirection::Desc => " DESC",
            });
        }
    }

    // MySQL has no OFFSET without LIMIT.
    match (query.limit, query.offset) {
        (None, None) => {}
        (limit, offset) => {
            translator.builder.push(" LIMIT ");
            let limit = limit.map_or(u64::MAX, u64::from);
            translator.params.push(json!(limit));
            translator.builder.push_bind(limit);
            if let Some(offset) = offset {
                translator.builder.push(" OFFSET ");
                translator.params.push(json!(offset));
                translator.builder.push_bind(u64::from(offset));
            }
        }
    }

    Ok(Some(SelectStatement {
        builder: translator.builder,
        columns,
        params: translator.params,
    }))
}

struct Translator<'a> {
    object_type: &'a ObjectType,
    variables: &'a VariableSet,
    builder: QueryBuilder<'static, MySql>,
    params: Vec<Value>,
}

impl Translator<'_> {
    fn push_column(&mut self, column: &str) -> Result<(), ConnectorError> {
        if !self.object_type.fields.contains_key(column) {
            return Err(ConnectorError::bad_request(
                format!("unknown column: {column}"),
                json!({ "column": column }),
            ));
        }
        self.builder.push(quote_identifier(column));
        Ok(())
    }

    fn push_target(&mut self, target: &ComparisonTarget) -> Result<(), ConnectorError> {
        if !target.path.is_empty() {
            return Err(ConnectorError::bad_request(
                "comparisons through relationships are not supported",
                json!({ "column": target.name }),
            ));
        }
        self.push_column(&target.name)
    }

    fn push_expression(&mut self, expression: &Expression) -> Result<(), ConnectorError> {
        match expression {
            Expression::And(exprs) => self.push_junction(exprs, " AND ", "TRUE"),
            Expression::Or(exprs) => self.push_junction(exprs, " OR ", "FALSE"),
            Expression::Not(inner) => {
                self.builder.push("NOT (");
                self.push_expression(inner)?;
                self.builder.push(")");
                Ok(())
            }
            Expression::UnaryComparisonOperator(unary) => {
                self.push_target(&unary.column)?;
                match unary.operator {
                    UnaryComparisonOperator::IsNull => self.builder.push(" IS NULL"),
                };
                Ok(())
            }
            Expression::BinaryComparisonOperator(binary) => {
                let operator = match &binary.operator {
                    BinaryComparisonOperator::Equal => "=",
                    BinaryComparisonOperator::Other { name } => match name.as_str() {
                        "_eq" => "=",
                        "_gt" => ">",
                        "_gte" => ">=",
                        "_lt" => "<",
                        "_lte" => "<=",
                        "_like" => "LIKE",
                        "_in" => return self.push_in_value(&binary.column, &binary.value),
                        other => {
                            return Err(ConnectorError::bad_request(
                                format!("unsupported comparison operator: {other}"),
                                json!({ "operator": other }),
                            ))
                        }
                    },
                };
                self.push_target(&binary.column)?;
                self.builder.push(format!(" {operator} "));
                self.push_comparison_value(&binary.value)
            }
            Expression::BinaryArrayComparisonOperator(array) => match array.operator {
                BinaryArrayComparisonOperator::In => {
                    if array.values.is_empty() {
                        self.builder.push("FALSE");
                        return Ok(());
                    }
                    self.push_target(&array.column)?;
                    self.builder.push(" IN (");
                    for (i, value) in array.values.iter().enumerate() {
                        if i > 0 {
                            self.builder.push(", ");
                        }
                        self.push_comparison_value(value)?;
                    }
                    self.builder.push(")");
                    Ok(())
                }
            },
            Expression::Exists(_) => Err(ConnectorError::bad_request(
                "exists predicates are not supported",
                Value::Null,
            )),
        }
    }

    fn push_junction(&mut self, exprs: &[Expression], separator: &str, empty: &str) -> Result<(), ConnectorError> {
        if exprs.is_empty() {
            self.builder.push(empty);
            return Ok(());
        }
        self.builder.push("(");
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.builder.push(separator);
            }
            self.push_expression(expr)?;
        }
        self.builder.push(")");
        Ok(())
    }

    /// `_in` with a single array-valued operand.
    fn push_in_value(&mut self, target: &ComparisonTarget, value: &ComparisonValue) -> Result<(), ConnectorError> {
        let items = match self.resolve(value)? {
            Value::Array(items) => items,
            other => {
                return Err(ConnectorError::bad_request(
                    "the _in operator expects an array value",
                    json!({ "value": other }),
                ))
            }
        };
        if items.is_empty() {
            self.builder.push("FALSE");
            return Ok(());
        }
        self.push_target(target)?;
        self.builder.push(" IN (");
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                self.builder.push(", ");
            }
            self.push_value(item);
        }
        self.builder.push(")");
        Ok(())
    }

    fn push_comparison_value(&mut self, value: &ComparisonValue) -> Result<(), ConnectorError> {
        match value {
            ComparisonValue::Column { column } => self.push_target(column),
            _ => {
                let value = self.resolve(value)?;
                self.push_value(value);
                Ok(())
            }
        }
    }

    fn resolve(&self, value: &ComparisonValue) -> Result<Value, ConnectorError> {
        match value {
            ComparisonValue::Scalar { value } => Ok(value.clone()),
            ComparisonValue::Variable { name } => self.variables.get(name).cloned().ok_or_else(|| {
                ConnectorError::bad_request(
                    format!("variable {name} is not bound"),
                    json!({ "variable": name }),
                )
            }),
            ComparisonValue::Column { column } => Err(ConnectorError::bad_request(
                "a column cannot be used as a value here",
                json!({ "column": column.name }),
            )),
        }
    }

    fn push_value(&mut self, value: Value) {
        self.params.push(value.clone());
        match value {
            Value::Null => self.builder.push_bind(None::<String>),
            Value::Bool(b) => self.builder.push_bind(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    self.builder.push_bind(i)
                } else if let Some(u) = n.as_u64() {
                    self.builder.push_bind(u)
                } else {
                    self.builder.push_bind(n.as_f64().unwrap_or_default())
                }
            }
            Value::String(s) => self.builder.push_bind(s),
            other => self.builder.push_bind(Json(other)),
        };
    }
}
