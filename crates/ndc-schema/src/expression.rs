//! Filtering predicates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::argument::RelationshipArgument;
use crate::error::{DecodeError, NarrowingError};
use crate::wire::{tagged, to_value, TaggedObject};

wire_enum! {
    pub enum ComparisonTargetKind in "ComparisonTarget" {
        Column => "column",
        RootCollectionColumn => "root_collection_column",
    }
}

wire_enum! {
    pub enum UnaryComparisonOperator in "UnaryComparisonOperator" {
        IsNull => "is_null",
    }
}

wire_enum! {
    pub enum BinaryArrayComparisonOperator in "BinaryArrayComparisonOperator" {
        In => "in",
    }
}

wire_enum! {
    pub enum BinaryComparisonOperatorKind in "BinaryComparisonOperator" {
        Equal => "equal",
        Other => "other",
    }
}

wire_enum! {
    pub enum ComparisonValueKind in "ComparisonValue" {
        Column => "column",
        Scalar => "scalar",
        Variable => "variable",
    }
}

wire_enum! {
    pub enum ExistsInCollectionKind in "ExistsInCollection" {
        Related => "related",
        Unrelated => "unrelated",
    }
}

wire_enum! {
    /// Discriminant of [`Expression`].
    pub enum ExpressionKind in "Expression" {
        And => "and",
        Or => "or",
        Not => "not",
        UnaryComparisonOperator => "unary_comparison_operator",
        BinaryComparisonOperator => "binary_comparison_operator",
        BinaryArrayComparisonOperator => "binary_array_comparison_operator",
        Exists => "exists",
    }
}

/// One hop along a relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathElement {
    pub relationship: String,
    #[serde(default)]
    pub arguments: BTreeMap<String, RelationshipArgument>,
    /// Filters the rows of the target collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<Box<Expression>>,
}

/// The column being compared, optionally reached through relationships.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonTarget {
    #[serde(rename = "type")]
    pub kind: ComparisonTargetKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<PathElement>,
}

impl ComparisonTarget {
    pub fn column(name: impl Into<String>) -> Self {
        Self {
            kind: ComparisonTargetKind::Column,
            name: name.into(),
            path: Vec::new(),
        }
    }

    pub fn root_collection_column(name: impl Into<String>) -> Self {
        Self {
            kind: ComparisonTargetKind::RootCollectionColumn,
            name: name.into(),
            path: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryComparisonOperator {
    Equal,
    /// A scalar-specific operator, e.g. `_like` or `_gt`.
    Other { name: String },
}

impl BinaryComparisonOperator {
    pub fn kind(&self) -> BinaryComparisonOperatorKind {
        match self {
            BinaryComparisonOperator::Equal => BinaryComparisonOperatorKind::Equal,
            BinaryComparisonOperator::Other { .. } => BinaryComparisonOperatorKind::Other,
        }
    }

    pub fn as_other(&self) -> Result<&str, NarrowingError> {
        match self {
            BinaryComparisonOperator::Other { name } => Ok(name),
            _ => Err(NarrowingError {
                entity: "BinaryComparisonOperator",
                expected: BinaryComparisonOperatorKind::Other.as_str(),
                found: self.kind().as_str(),
            }),
        }
    }

    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let (kind, mut obj) = TaggedObject::parse::<BinaryComparisonOperatorKind>(value)?;
        Ok(match kind {
            BinaryComparisonOperatorKind::Equal => BinaryComparisonOperator::Equal,
            BinaryComparisonOperatorKind::Other => BinaryComparisonOperator::Other {
                name: obj.string("name")?,
            },
        })
    }

    pub fn encode(&self) -> Map<String, Value> {
        let mut map = tagged(self.kind());
        if let BinaryComparisonOperator::Other { name } = self {
            map.insert("name".to_string(), Value::String(name.clone()));
        }
        map
    }
}

wire_union!(BinaryComparisonOperator);

/// The right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonValue {
    Column { column: ComparisonTarget },
    Scalar { value: Value },
    Variable { name: String },
}

impl ComparisonValue {
    pub fn kind(&self) -> ComparisonValueKind {
        match self {
            ComparisonValue::Column { .. } => ComparisonValueKind::Column,
            ComparisonValue::Scalar { .. } => ComparisonValueKind::Scalar,
            ComparisonValue::Variable { .. } => ComparisonValueKind::Variable,
        }
    }

    fn narrowing(&self, expected: ComparisonValueKind) -> NarrowingError {
        NarrowingError {
            entity: "ComparisonValue",
            expected: expected.as_str(),
            found: self.kind().as_str(),
        }
    }

    pub fn as_column(&self) -> Result<&ComparisonTarget, NarrowingError> {
        match self {
            ComparisonValue::Column { column } => Ok(column),
            _ => Err(self.narrowing(ComparisonValueKind::Column)),
        }
    }

    pub fn as_scalar(&self) -> Result<&Value, NarrowingError> {
        match self {
            ComparisonValue::Scalar { value } => Ok(value),
            _ => Err(self.narrowing(ComparisonValueKind::Scalar)),
        }
    }

    pub fn as_variable(&self) -> Result<&str, NarrowingError> {
        match self {
            ComparisonValue::Variable { name } => Ok(name),
            _ => Err(self.narrowing(ComparisonValueKind::Variable)),
        }
    }

    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let (kind, mut obj) = TaggedObject::parse::<ComparisonValueKind>(value)?;
        Ok(match kind {
            ComparisonValueKind::Column => ComparisonValue::Column {
                column: obj.required("column")?,
            },
            ComparisonValueKind::Scalar => ComparisonValue::Scalar {
                value: obj.value("value")?,
            },
            ComparisonValueKind::Variable => ComparisonValue::Variable {
                name: obj.string("name")?,
            },
        })
    }

    pub fn encode(&self) -> Map<String, Value> {
        let mut map = tagged(self.kind());
        match self {
            ComparisonValue::Column { column } => {
                map.insert("column".to_string(), to_value(column));
            }
            ComparisonValue::Scalar { value } => {
                map.insert("value".to_string(), value.clone());
            }
            ComparisonValue::Variable { name } => {
                map.insert("name".to_string(), Value::String(name.clone()));
            }
        }
        map
    }
}

wire_union!(ComparisonValue);

/// The collection an `exists` predicate ranges over.
#[derive(Debug, Clone, PartialEq)]
pub enum ExistsInCollection {
    /// Rows reached through a relationship of the current row.
    Related {
        relationship: String,
        arguments: BTreeMap<String, RelationshipArgument>,
    },
    /// Rows of an arbitrary collection.
    Unrelated {
        collection: String,
        arguments: BTreeMap<String, RelationshipArgument>,
    },
}

impl ExistsInCollection {
    pub fn kind(&self) -> ExistsInCollectionKind {
        match self {
            ExistsInCollection::Related { .. } => ExistsInCollectionKind::Related,
            ExistsInCollection::Unrelated { .. } => ExistsInCollectionKind::Unrelated,
        }
    }

    fn narrowing(&self, expected: ExistsInCollectionKind) -> NarrowingError {
        NarrowingError {
            entity: "ExistsInCollection",
            expected: expected.as_str(),
            found: self.kind().as_str(),
        }
    }

    /// Returns the relationship name and its arguments.
    pub fn as_related(
        &self,
    ) -> Result<(&str, &BTreeMap<String, RelationshipArgument>), NarrowingError> {
        match self {
            ExistsInCollection::Related {
                relationship,
                arguments,
            } => Ok((relationship, arguments)),
            _ => Err(self.narrowing(ExistsInCollectionKind::Related)),
        }
    }

    /// Returns the collection name and its arguments.
    pub fn as_unrelated(
        &self,
    ) -> Result<(&str, &BTreeMap<String, RelationshipArgument>), NarrowingError> {
        match self {
            ExistsInCollection::Unrelated {
                collection,
                arguments,
            } => Ok((collection, arguments)),
            _ => Err(self.narrowing(ExistsInCollectionKind::Unrelated)),
        }
    }

    pub fn arguments(&self) -> &BTreeMap<String, RelationshipArgument> {
        match self {
            ExistsInCollection::Related { arguments, .. }
            | ExistsInCollection::Unrelated { arguments, .. } => arguments,
        }
    }

    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let (kind, mut obj) = TaggedObject::parse::<ExistsInCollectionKind>(value)?;
        Ok(match kind {
            ExistsInCollectionKind::Related => ExistsInCollection::Related {
                relationship: obj.string("relationship")?,
                arguments: obj.required("arguments")?,
            },
            ExistsInCollectionKind::Unrelated => ExistsInCollection::Unrelated {
                collection: obj.string("collection")?,
                arguments: obj.required("arguments")?,
            },
        })
    }

    pub fn encode(&self) -> Map<String, Value> {
        let mut map = tagged(self.kind());
        match self {
            ExistsInCollection::Related {
                relationship,
                arguments,
            } => {
                map.insert(
                    "relationship".to_string(),
                    Value::String(relationship.clone()),
                );
                map.insert("arguments".to_string(), to_value(arguments));
            }
            ExistsInCollection::Unrelated {
                collection,
                arguments,
            } => {
                map.insert("collection".to_string(), Value::String(collection.clone()));
                map.insert("arguments".to_string(), to_value(arguments));
            }
        }
        map
    }
}

wire_union!(ExistsInCollection);

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryComparisonExpression {
    pub operator: UnaryComparisonOperator,
    pub column: ComparisonTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryComparisonExpression {
    pub operator: BinaryComparisonOperator,
    pub column: ComparisonTarget,
    pub value: ComparisonValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryArrayComparisonExpression {
    pub operator: BinaryArrayComparisonOperator,
    pub column: ComparisonTarget,
    pub values: Vec<ComparisonValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExistsExpression {
    /// Encoded under the `where` key.
    pub predicate: Box<Expression>,
    pub in_collection: ExistsInCollection,
}

/// A boolean predicate over the rows of a collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Conjunction; an empty list is true.
    And(Vec<Expression>),
    /// Disjunction; an empty list is false.
    Or(Vec<Expression>),
    Not(Box<Expression>),
    UnaryComparisonOperator(UnaryComparisonExpression),
    BinaryComparisonOperator(BinaryComparisonExpression),
    BinaryArrayComparisonOperator(BinaryArrayComparisonExpression),
    Exists(ExistsExpression),
}

impl Expression {
    pub fn kind(&self) -> ExpressionKind {
        match self {
            Expression::And(_) => ExpressionKind::And,
            Expression::Or(_) => ExpressionKind::Or,
            Expression::Not(_) => ExpressionKind::Not,
            Expression::UnaryComparisonOperator(_) => ExpressionKind::UnaryComparisonOperator,
            Expression::BinaryComparisonOperator(_) => ExpressionKind::BinaryComparisonOperator,
            Expression::BinaryArrayComparisonOperator(_) => {
                ExpressionKind::BinaryArrayComparisonOperator
            }
            Expression::Exists(_) => ExpressionKind::Exists,
        }
    }

    fn narrowing(&self, expected: ExpressionKind) -> NarrowingError {
        NarrowingError {
            entity: "Expression",
            expected: expected.as_str(),
            found: self.kind().as_str(),
        }
    }

    pub fn as_and(&self) -> Result<&[Expression], NarrowingError> {
        match self {
            Expression::And(exprs) => Ok(exprs),
            _ => Err(self.narrowing(ExpressionKind::And)),
        }
    }

    pub fn as_or(&self) -> Result<&[Expression], NarrowingError> {
        match self {
            Expression::Or(exprs) => Ok(exprs),
            _ => Err(self.narrowing(ExpressionKind::Or)),
        }
    }

    pub fn as_not(&self) -> Result<&Expression, NarrowingError> {
        match self {
            Expression::Not(expr) => Ok(expr),
            _ => Err(self.narrowing(ExpressionKind::Not)),
        }
    }

    pub fn as_unary_comparison_operator(
        &self,
    ) -> Result<&UnaryComparisonExpression, NarrowingError> {
        match self {
            Expression::UnaryComparisonOperator(expr) => Ok(expr),
            _ => Err(self.narrowing(ExpressionKind::UnaryComparisonOperator)),
        }
    }

    pub fn as_binary_comparison_operator(
        &self,
    ) -> Result<&BinaryComparisonExpression, NarrowingError> {
        match self {
            Expression::BinaryComparisonOperator(expr) => Ok(expr),
            _ => Err(self.narrowing(ExpressionKind::BinaryComparisonOperator)),
        }
    }

    pub fn as_binary_array_comparison_operator(
        &self,
    ) -> Result<&BinaryArrayComparisonExpression, NarrowingError> {
        match self {
            Expression::BinaryArrayComparisonOperator(expr) => Ok(expr),
            _ => Err(self.narrowing(ExpressionKind::BinaryArrayComparisonOperator)),
        }
    }

    pub fn as_exists(&self) -> Result<&ExistsExpression, NarrowingError> {
        match self {
            Expression::Exists(expr) => Ok(expr),
            _ => Err(self.narrowing(ExpressionKind::Exists)),
        }
    }

    /// `and []` always holds.
    pub fn is_trivially_true(&self) -> bool {
        matches!(self, Expression::And(exprs) if exprs.is_empty())
    }

    /// `or []` never holds.
    pub fn is_trivially_false(&self) -> bool {
        matches!(self, Expression::Or(exprs) if exprs.is_empty())
    }

    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let (kind, mut obj) = TaggedObject::parse::<ExpressionKind>(value)?;
        Ok(match kind {
            ExpressionKind::And => Expression::And(obj.nested_list("expressions", Expression::from_value)?),
            ExpressionKind::Or => Expression::Or(obj.nested_list("expressions", Expression::from_value)?),
            ExpressionKind::Not => {
                Expression::Not(Box::new(obj.nested("expression", Expression::from_value)?))
            }
            ExpressionKind::UnaryComparisonOperator => {
                Expression::UnaryComparisonOperator(UnaryComparisonExpression {
                    operator: obj.required("operator")?,
                    column: obj.required("column")?,
                })
            }
            ExpressionKind::BinaryComparisonOperator => {
                Expression::BinaryComparisonOperator(BinaryComparisonExpression {
                    operator: obj.nested("operator", BinaryComparisonOperator::from_value)?,
                    column: obj.required("column")?,
                    value: obj.nested("value", ComparisonValue::from_value)?,
                })
            }
            ExpressionKind::BinaryArrayComparisonOperator => {
                Expression::BinaryArrayComparisonOperator(BinaryArrayComparisonExpression {
                    operator: obj.required("operator")?,
                    column: obj.required("column")?,
                    values: obj.nested_list("values", ComparisonValue::from_value)?,
                })
            }
            ExpressionKind::Exists => Expression::Exists(ExistsExpression {
                predicate: Box::new(obj.nested("where", Expression::from_value)?),
                in_collection: obj.nested("in_collection", ExistsInCollection::from_value)?,
            }),
        })
    }

    pub fn encode(&self) -> Map<String, Value> {
        let mut map = tagged(self.kind());
        match self {
            Expression::And(exprs) | Expression::Or(exprs) => {
                let items = exprs.iter().map(|e| Value::Object(e.encode())).collect();
                map.insert("expressions".to_string(), Value::Array(items));
            }
            Expression::Not(expr) => {
                map.insert("expression".to_string(), Value::Object(expr.encode()));
            }
            Expression::UnaryComparisonOperator(expr) => {
                map.insert("operator".to_string(), to_value(&expr.operator));
                map.insert("column".to_string(), to_value(&expr.column));
            }
            Expression::BinaryComparisonOperator(expr) => {
                map.insert("operator".to_string(), Value::Object(expr.operator.encode()));
                map.insert("column".to_string(), to_value(&expr.column));
                map.insert("value".to_string(), Value::Object(expr.value.encode()));
            }
            Expression::BinaryArrayComparisonOperator(expr) => {
                let values = expr.values.iter().map(|v| Value::Object(v.encode())).collect();
                map.insert("operator".to_string(), to_value(&expr.operator));
                map.insert("column".to_string(), to_value(&expr.column));
                map.insert("values".to_string(), Value::Array(values));
            }
            Expression::Exists(expr) => {
                map.insert("where".to_string(), Value::Object(expr.predicate.encode()));
                map.insert(
                    "in_collection".to_string(),
                    Value::Object(expr.in_collection.encode()),
                );
            }
        }
        map
    }
}

wire_union!(Expression);
