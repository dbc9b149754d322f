//! Example connector whose dispatch and marshaling code comes from
//! `ndc-sdk generate -p crates/ndc-functions-example --no-format`. Only
//! `functions/mod.rs` and `types.rs` are written by hand.

pub mod connector_generated;
pub mod functions;
pub mod types;

pub use connector_generated::GeneratedConnector;
