//! HTTP surface of a connector (Axum).

use std::sync::Arc;

use anyhow::{Context as _, Result};
use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use ndc_schema::{
    CapabilitiesResponse, ErrorResponse, ExplainResponse, MutationRequest, MutationResponse,
    QueryRequest, QueryResponse, SchemaResponse,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::ServerConfig;
use crate::connector::{Connector, Context};
use crate::error::ConnectorError;

/// Everything a request handler needs, shared behind an `Arc`.
pub struct ServerState<C: Connector> {
    pub connector: C,
    pub configuration: C::Configuration,
    pub state: C::State,
    pub service_token: Option<String>,
}

/// Build the connector router. `/health` is never behind the service token.
pub fn router<C: Connector>(state: Arc<ServerState<C>>) -> Router {
    let protected = Router::new()
        .route("/capabilities", get(capabilities::<C>))
        .route("/schema", get(schema::<C>))
        .route("/query", post(query::<C>))
        .route("/query/explain", post(query_explain::<C>))
        .route("/mutation", post(mutation::<C>))
        .route("/mutation/explain", post(mutation_explain::<C>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_service_token::<C>,
        ));

    Router::new()
        .route("/health", get(health::<C>))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn require_service_token<C: Connector>(
    State(state): State<Arc<ServerState<C>>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.service_token.as_deref() else {
        return next.run(request).await;
    };
    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if provided == Some(expected) {
        next.run(request).await
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                message: "Unauthorized".to_string(),
                details: serde_json::Value::Null,
            }),
        )
            .into_response()
    }
}

async fn capabilities<C: Connector>(
    State(state): State<Arc<ServerState<C>>>,
) -> Json<CapabilitiesResponse> {
    Json(state.connector.get_capabilities(&state.configuration))
}

async fn schema<C: Connector>(
    State(state): State<Arc<ServerState<C>>>,
) -> Result<Json<SchemaResponse>, ConnectorError> {
    Ok(Json(state.connector.get_schema(&state.configuration).await?))
}

async fn query<C: Connector>(
    State(state): State<Arc<ServerState<C>>>,
    body: Bytes,
) -> Result<Json<QueryResponse>, ConnectorError> {
    let request = QueryRequest::decode(&body)?;
    let ctx = Context::new();
    debug!(request_id = %ctx.request_id, collection = %request.collection, "query");
    let response = state
        .connector
        .query(&ctx, &state.configuration, &state.state, &request)
        .await?;
    Ok(Json(response))
}

async fn query_explain<C: Connector>(
    State(state): State<Arc<ServerState<C>>>,
    body: Bytes,
) -> Result<Json<ExplainResponse>, ConnectorError> {
    let request = QueryRequest::decode(&body)?;
    let ctx = Context::new();
    debug!(request_id = %ctx.request_id, collection = %request.collection, "query explain");
    let response = state
        .connector
        .query_explain(&ctx, &state.configuration, &state.state, &request)
        .await?;
    Ok(Json(response))
}

async fn mutation<C: Connector>(
    State(state): State<Arc<ServerState<C>>>,
    body: Bytes,
) -> Result<Json<MutationResponse>, ConnectorError> {
    let request = MutationRequest::decode(&body)?;
    let ctx = Context::new();
    debug!(
        request_id = %ctx.request_id,
        operations = request.operations.len(),
        "mutation"
    );
    let response = state
        .connector
        .mutation(&ctx, &state.configuration, &state.state, &request)
        .await?;
    Ok(Json(response))
}

async fn mutation_explain<C: Connector>(
    State(state): State<Arc<ServerState<C>>>,
    body: Bytes,
) -> Result<Json<ExplainResponse>, ConnectorError> {
    let request = MutationRequest::decode(&body)?;
    let ctx = Context::new();
    let response = state
        .connector
        .mutation_explain(&ctx, &state.configuration, &state.state, &request)
        .await?;
    Ok(Json(response))
}

async fn health<C: Connector>(
    State(state): State<Arc<ServerState<C>>>,
) -> Result<StatusCode, ConnectorError> {
    state
        .connector
        .health_check(&state.configuration, &state.state)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Install the global fmt subscriber. `RUST_LOG` wins over `level` when set.
pub fn init_tracing(level: Level) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::from_level(level).into()));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn read_configuration(path: &str) -> Result<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => Ok(raw),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Configuration file {} not found, using empty configuration", path);
            Ok("{}".to_string())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to read configuration file {}", path)),
    }
}

/// Serve a connector using settings from the environment. Blocks until
/// the process receives Ctrl-C.
pub async fn start<C: Connector>(connector: C) -> Result<()> {
    let config = ServerConfig::from_env()?;
    init_tracing(config.log_level)?;

    let raw = read_configuration(&config.configuration).await?;
    let configuration = connector
        .parse_configuration(&raw)
        .await
        .context("Failed to parse configuration")?;
    let state = connector
        .try_init_state(&configuration)
        .await
        .context("Failed to initialize connector state")?;

    let app = router(Arc::new(ServerState {
        connector,
        configuration,
        state,
        service_token: config.service_token.clone(),
    }));

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Connector listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;
    Ok(())
}
