//! Reference NDC connector serving MySQL tables as collections.
//!
//! The configuration carries connection settings and the schema document
//! to publish; each collection in that schema is read from the table of
//! the same name.

pub mod config;
pub mod connector;
pub mod rows;
pub mod sql;

pub use config::MySqlConfiguration;
pub use connector::{MySqlConnector, MySqlState};
