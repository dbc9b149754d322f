//! Functions and procedures of the example connector.
//!
//! Every operation and type here is declared in `signatures.json`; run
//! `ndc-sdk generate` after changing either side.

use std::sync::atomic::Ordering;
use std::time::Duration;

use chrono::{DateTime, Utc};
use ndc_connector::{ConnectorError, Context};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::types::State;

mod types_generated;

/// Free-form comment text, published as the `CommentString` scalar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentText(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SomeEnum {
    Foo,
    Bar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

pub struct GetArticlesArguments {
    pub limit: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetArticlesResult {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetTypesArguments {
    pub author: Author,
    pub boolean: bool,
    pub duration: Duration,
    pub enum_ptr: Option<SomeEnum>,
    pub float32: f32,
    pub int32: i32,
    pub json: Value,
    pub string_ptr: Option<String>,
    pub tags: Vec<String>,
    pub text: CommentText,
    pub time: DateTime<Utc>,
    pub uint8: u8,
}

pub struct FindAuthorArguments {
    pub id: i32,
}

pub struct EchoJsonArguments {
    pub value: Value,
}

pub struct CreateArticleArguments {
    pub author_id: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateArticleResult {
    pub id: u32,
    pub authors: Vec<Author>,
}

pub struct CreateAuthorsArguments {
    pub names: Vec<String>,
}

const MAX_ARTICLES: f64 = 100.0;

/// Sends a hello message.
pub async fn function_hello(_ctx: &Context, state: &State) -> Result<CommentText, ConnectorError> {
    Ok(CommentText(state.greeting.clone()))
}

pub async fn function_get_articles(
    _ctx: &Context,
    _state: &State,
    args: &GetArticlesArguments,
) -> Result<Vec<GetArticlesResult>, ConnectorError> {
    let count = args.limit.clamp(0.0, MAX_ARTICLES) as usize;
    Ok((1..=count)
        .map(|i| GetArticlesResult {
            id: i.to_string(),
            name: format!("Article {i}"),
        })
        .collect())
}

pub async fn function_get_types(
    _ctx: &Context,
    _state: &State,
    args: &GetTypesArguments,
) -> Result<GetTypesArguments, ConnectorError> {
    Ok(args.clone())
}

/// `None` when no author has the id.
pub async fn function_find_author(
    _ctx: &Context,
    state: &State,
    args: &FindAuthorArguments,
) -> Result<Option<Author>, ConnectorError> {
    let authors = state.authors.lock().await;
    Ok(authors.iter().find(|a| a.id == args.id).cloned())
}

pub async fn function_echo_json(
    _ctx: &Context,
    _state: &State,
    args: &EchoJsonArguments,
) -> Result<Value, ConnectorError> {
    Ok(args.value.clone())
}

pub async fn procedure_create_article(
    _ctx: &Context,
    state: &State,
    args: &CreateArticleArguments,
) -> Result<CreateArticleResult, ConnectorError> {
    let authors: Vec<Author> = state
        .authors
        .lock()
        .await
        .iter()
        .filter(|a| f64::from(a.id) == args.author_id)
        .cloned()
        .collect();
    if authors.is_empty() {
        return Err(ConnectorError::unprocessable_content(
            format!("author {} does not exist", args.author_id),
            serde_json::json!({ "author_id": args.author_id }),
        ));
    }
    let id = state.next_article_id.fetch_add(1, Ordering::SeqCst) + 1;
    debug!(id, author_id = args.author_id, "Created article");
    Ok(CreateArticleResult { id, authors })
}

pub async fn procedure_create_authors(
    _ctx: &Context,
    state: &State,
    args: &CreateAuthorsArguments,
) -> Result<Vec<Author>, ConnectorError> {
    let mut authors = state.authors.lock().await;
    let created_at = Utc::now();
    let mut created = Vec::with_capacity(args.names.len());
    for name in &args.names {
        let author = Author {
            id: i32::try_from(authors.len() + 1).map_err(|_| {
                ConnectorError::conflict("too many authors", Value::Null)
            })?,
            name: name.clone(),
            created_at,
        };
        authors.push(author.clone());
        created.push(author);
    }
    Ok(created)
}

pub async fn procedure_increase(_ctx: &Context, state: &State) -> Result<i32, ConnectorError> {
    Ok(state.counter.fetch_add(1, Ordering::SeqCst) + 1)
}
