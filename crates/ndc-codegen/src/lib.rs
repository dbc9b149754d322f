//! NDC Codegen - turns signature manifests into connector code
//!
//! A generation run goes manifest -> [`Catalogue`] -> rendered artifacts:
//! - `connector_generated.rs`, the `Connector` impl and operation dispatch
//! - `types_generated.rs` per package, the argument decoders and result encoders
//! - `schema.generated.json`, the schema document

pub mod catalogue;
pub mod emit;
pub mod error;
pub mod generator;
pub mod manifest;
pub mod scaffold;
pub mod schema_builder;

pub use catalogue::{Catalogue, CatalogueBuilder, PrimitiveCategory, TypeInfo};
pub use error::CodegenError;
pub use generator::{
    format_sources, generate, load_catalogue, module_path, render, Artifact, GenerateOptions,
    Package, CONNECTOR_OUTPUT_FILE, SCHEMA_OUTPUT_FILE, TYPES_OUTPUT_FILE,
};
pub use manifest::{Manifest, MANIFEST_FILE};
pub use scaffold::{new_project, NewProject};
pub use schema_builder::{build_schema, render_schema};
