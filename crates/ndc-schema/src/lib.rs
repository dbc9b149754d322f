//! NDC Schema - wire model of the Native Data Connector protocol
//!
//! Every polymorphic protocol value is a closed enum discriminated on the
//! wire by a `"type"` key. Each one provides:
//! - `from_value`/`decode` with precise [`DecodeError`]s
//! - `encode` back into an untyped JSON object
//! - `kind()` plus `as_*` narrowing accessors returning [`NarrowingError`]

#[macro_use]
mod wire;

pub mod aggregate;
pub mod argument;
pub mod document;
pub mod error;
pub mod expression;
pub mod field;
pub mod order_by;
pub mod request;
pub mod types;

pub use aggregate::{Aggregate, AggregateKind};
pub use argument::{Argument, ArgumentKind, RelationshipArgument, RelationshipArgumentKind};
pub use document::{
    AggregateFunctionDefinition, ArgumentInfo, CollectionInfo, ComparisonOperatorDefinition,
    ForeignKeyConstraint, FunctionInfo, ObjectField, ObjectType, ProcedureInfo, ScalarType,
    SchemaResponse, TypeRepresentation, UniquenessConstraint,
};
pub use error::{DecodeError, NarrowingError};
pub use expression::{
    BinaryArrayComparisonExpression, BinaryArrayComparisonOperator, BinaryComparisonExpression,
    BinaryComparisonOperator, BinaryComparisonOperatorKind, ComparisonTarget,
    ComparisonTargetKind, ComparisonValue, ComparisonValueKind, ExistsExpression,
    ExistsInCollection, ExistsInCollectionKind, Expression, ExpressionKind, PathElement,
    UnaryComparisonExpression, UnaryComparisonOperator,
};
pub use field::{ColumnField, Field, FieldKind, NestedField, NestedFieldKind, Query, RelationshipField};
pub use order_by::{OrderBy, OrderByElement, OrderByTarget, OrderByTargetKind, OrderDirection};
pub use request::{
    Capabilities, CapabilitiesResponse, ErrorResponse, ExplainResponse, LeafCapability,
    MutationCapabilities, MutationOperation, MutationOperationKind, MutationOperationResults,
    MutationRequest, MutationResponse, QueryCapabilities, QueryRequest, QueryResponse,
    Relationship, RelationshipCapabilities, RelationshipType, Row, RowSet, VariableSet,
};
pub use types::{ArrayType, NamedType, NullableType, Type, TypeKind};
pub use wire::WireKind;

/// Protocol version reported by `/capabilities`.
pub const NDC_VERSION: &str = "0.1.0";
