//! Connector configuration and shared state.

use std::sync::atomic::{AtomicI32, AtomicU32};

use serde::Deserialize;
use tokio::sync::Mutex;

use crate::functions::Author;

/// Parsed from the file named by `NDC_CONFIGURATION`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Returned by `hello`.
    pub greeting: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            greeting: "hello world".to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct State {
    pub greeting: String,
    pub counter: AtomicI32,
    pub next_article_id: AtomicU32,
    pub authors: Mutex<Vec<Author>>,
}

pub async fn try_init_state(configuration: &Configuration) -> anyhow::Result<State> {
    Ok(State {
        greeting: configuration.greeting.clone(),
        ..Default::default()
    })
}
