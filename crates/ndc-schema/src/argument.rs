//! Collection and relationship arguments.

use serde_json::{Map, Value};

use crate::error::{DecodeError, NarrowingError};
use crate::wire::{tagged, TaggedObject};

wire_enum! {
    /// Discriminant of [`Argument`].
    pub enum ArgumentKind in "Argument" {
        Literal => "literal",
        Variable => "variable",
    }
}

wire_enum! {
    /// Discriminant of [`RelationshipArgument`].
    pub enum RelationshipArgumentKind in "RelationshipArgument" {
        Literal => "literal",
        Variable => "variable",
        Column => "column",
    }
}

/// Argument to a collection, function or procedure.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// A fixed JSON value. May itself be null.
    Literal { value: Value },
    /// Reference to a variable binding of the current variable set.
    Variable { name: String },
}

impl Argument {
    pub fn kind(&self) -> ArgumentKind {
        match self {
            Argument::Literal { .. } => ArgumentKind::Literal,
            Argument::Variable { .. } => ArgumentKind::Variable,
        }
    }

    fn narrowing(&self, expected: ArgumentKind) -> NarrowingError {
        NarrowingError {
            entity: "Argument",
            expected: expected.as_str(),
            found: self.kind().as_str(),
        }
    }

    pub fn as_literal(&self) -> Result<&Value, NarrowingError> {
        match self {
            Argument::Literal { value } => Ok(value),
            _ => Err(self.narrowing(ArgumentKind::Literal)),
        }
    }

    pub fn as_variable(&self) -> Result<&str, NarrowingError> {
        match self {
            Argument::Variable { name } => Ok(name),
            _ => Err(self.narrowing(ArgumentKind::Variable)),
        }
    }

    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let (kind, mut obj) = TaggedObject::parse::<ArgumentKind>(value)?;
        Ok(match kind {
            ArgumentKind::Literal => Argument::Literal {
                value: obj.value("value")?,
            },
            ArgumentKind::Variable => Argument::Variable {
                name: obj.string("name")?,
            },
        })
    }

    pub fn encode(&self) -> Map<String, Value> {
        let mut map = tagged(self.kind());
        match self {
            Argument::Literal { value } => {
                map.insert("value".to_string(), value.clone());
            }
            Argument::Variable { name } => {
                map.insert("name".to_string(), Value::String(name.clone()));
            }
        }
        map
    }
}

wire_union!(Argument);

/// Argument supplied along a relationship; may also reference a column of the
/// source row.
#[derive(Debug, Clone, PartialEq)]
pub enum RelationshipArgument {
    Literal { value: Value },
    Variable { name: String },
    Column { name: String },
}

impl RelationshipArgument {
    pub fn kind(&self) -> RelationshipArgumentKind {
        match self {
            RelationshipArgument::Literal { .. } => RelationshipArgumentKind::Literal,
            RelationshipArgument::Variable { .. } => RelationshipArgumentKind::Variable,
            RelationshipArgument::Column { .. } => RelationshipArgumentKind::Column,
        }
    }

    fn narrowing(&self, expected: RelationshipArgumentKind) -> NarrowingError {
        NarrowingError {
            entity: "RelationshipArgument",
            expected: expected.as_str(),
            found: self.kind().as_str(),
        }
    }

    pub fn as_literal(&self) -> Result<&Value, NarrowingError> {
        match self {
            RelationshipArgument::Literal { value } => Ok(value),
            _ => Err(self.narrowing(RelationshipArgumentKind::Literal)),
        }
    }

    pub fn as_variable(&self) -> Result<&str, NarrowingError> {
        match self {
            RelationshipArgument::Variable { name } => Ok(name),
            _ => Err(self.narrowing(RelationshipArgumentKind::Variable)),
        }
    }

    pub fn as_column(&self) -> Result<&str, NarrowingError> {
        match self {
            RelationshipArgument::Column { name } => Ok(name),
            _ => Err(self.narrowing(RelationshipArgumentKind::Column)),
        }
    }

    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let (kind, mut obj) = TaggedObject::parse::<RelationshipArgumentKind>(value)?;
        Ok(match kind {
            RelationshipArgumentKind::Literal => RelationshipArgument::Literal {
                value: obj.value("value")?,
            },
            RelationshipArgumentKind::Variable => RelationshipArgument::Variable {
                name: obj.string("name")?,
            },
            RelationshipArgumentKind::Column => RelationshipArgument::Column {
                name: obj.string("name")?,
            },
        })
    }

    pub fn encode(&self) -> Map<String, Value> {
        let mut map = tagged(self.kind());
        match self {
            RelationshipArgument::Literal { value } => {
                map.insert("value".to_string(), value.clone());
            }
            RelationshipArgument::Variable { name } | RelationshipArgument::Column { name } => {
                map.insert("name".to_string(), Value::String(name.clone()));
            }
        }
        map
    }
}

wire_union!(RelationshipArgument);

impl From<Argument> for RelationshipArgument {
    fn from(arg: Argument) -> Self {
        match arg {
            Argument::Literal { value } => RelationshipArgument::Literal { value },
            Argument::Variable { name } => RelationshipArgument::Variable { name },
        }
    }
}
