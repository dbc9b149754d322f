//! Generation errors. Every variant aborts the run.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("Unknown type {name} referenced from {referenced_from}")]
    UnknownType {
        name: String,
        referenced_from: String,
    },

    #[error("Type {0} is declared more than once with different shapes")]
    DuplicateType(String),

    #[error("Operation {0} is declared more than once")]
    DuplicateOperation(String),

    #[error("Anonymous object {0} contains itself")]
    RecursiveExpansion(String),

    #[error("Invalid manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize the schema document: {0}")]
    Schema(#[source] serde_json::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Refusing to scaffold into non-empty directory {0}")]
    ProjectExists(PathBuf),

    #[error("rustfmt failed: {0}")]
    Format(String),
}

impl CodegenError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CodegenError::Io {
            path: path.into(),
            source,
        }
    }
}
