//! HTTP-level behavior that does not need a live MySQL server.

use std::sync::Arc;

use axum::body::Body;
use axum::response::Response;
use axum::Router;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use ndc_connector::{router, Connector, ServerState};
use ndc_mysql::MySqlConnector;
use serde_json::{json, Value};
use tower::ServiceExt;

const CONFIGURATION: &str = r#"{
    "host": "db.internal",
    "db": "blog",
    "schema": {
        "scalar_types": {"Int": {"comparison_operators": {"_eq": {"type": "equal"}}}},
        "object_types": {"article": {"fields": {
            "id": {"type": {"type": "named", "name": "Int"}},
            "title": {"type": {"type": "named", "name": "Int"}}
        }}},
        "collections": [{"name": "articles", "type": "article", "arguments": {}}],
        "functions": [],
        "procedures": []
    }
}"#;

async fn app() -> Router {
    let connector = MySqlConnector;
    let configuration = connector.parse_configuration(CONFIGURATION).await.unwrap();
    let state = connector.try_init_state(&configuration).await.unwrap();
    router(Arc::new(ServerState {
        connector,
        configuration,
        state,
        service_token: None,
    }))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(resp: Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn schema_is_served_from_configuration() {
    let resp = app()
        .await
        .oneshot(Request::get("/schema").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["collections"][0]["name"], "articles");
}

#[tokio::test]
async fn capabilities_advertise_variables_and_explain() {
    let resp = app()
        .await
        .oneshot(Request::get("/capabilities").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["capabilities"]["query"]["variables"], json!({}));
    assert_eq!(body["capabilities"]["query"]["explain"], json!({}));
}

#[tokio::test]
async fn query_explain_reports_sql() {
    let resp = app()
        .await
        .oneshot(post_json(
            "/query/explain",
            json!({
                "collection": "articles",
                "query": {
                    "fields": {"id": {"type": "column", "column": "id"}},
                    "predicate": {"type": "binary_comparison_operator",
                        "column": {"type": "column", "name": "id"},
                        "operator": {"type": "other", "name": "_lte"},
                        "value": {"type": "variable", "name": "max"}},
                    "limit": 2
                },
                "arguments": {},
                "collection_relationships": {},
                "variables": [{"max": 10}]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(
        body["details"]["query"],
        "SELECT `id` AS `id` FROM `articles` WHERE `id` <= ? LIMIT ?"
    );
}

#[tokio::test]
async fn unknown_collection_is_bad_request() {
    let resp = app()
        .await
        .oneshot(post_json(
            "/query",
            json!({
                "collection": "comments",
                "query": {"fields": {"id": {"type": "column", "column": "id"}}},
                "arguments": {},
                "collection_relationships": {}
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["message"], "unknown collection: comments");
}

#[tokio::test]
async fn mutations_are_not_supported_but_explain_is_empty() {
    let request = json!({"operations": [], "collection_relationships": {}});
    let resp = app()
        .await
        .oneshot(post_json("/mutation", request.clone()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_IMPLEMENTED);

    let resp = app()
        .await
        .oneshot(post_json("/mutation/explain", request))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"details": {}}));
}
