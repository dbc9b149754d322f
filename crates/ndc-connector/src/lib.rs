//! NDC Connector - runtime SDK for Native Data Connectors
//!
//! Provides:
//! - the [`Connector`] trait and its HTTP server
//! - [`ConnectorError`], the protocol error taxonomy
//! - `utils`, the decode/encode/selection helpers that generated code calls

pub mod config;
pub mod connector;
pub mod error;
pub mod server;
pub mod utils;

pub use config::ServerConfig;
pub use connector::{Connector, Context};
pub use error::ConnectorError;
pub use server::{init_tracing, router, start, ServerState};

pub use ndc_schema as schema;
