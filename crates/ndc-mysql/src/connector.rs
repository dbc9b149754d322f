//! MySQL-backed implementation of [`Connector`].

use std::collections::BTreeMap;
use std::time::Instant;

use async_trait::async_trait;
use ndc_connector::schema::{
    Capabilities, CapabilitiesResponse, ExplainResponse, LeafCapability, MutationRequest,
    MutationResponse, QueryCapabilities, QueryRequest, QueryResponse, RowSet, SchemaResponse,
    NDC_VERSION,
};
use ndc_connector::{utils, Connector, ConnectorError, Context};
use serde_json::json;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use tracing::{debug, error, info};

use crate::config::MySqlConfiguration;
use crate::rows::rows_to_json;
use crate::sql::build_select;

#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlConnector;

pub struct MySqlState {
    pub pool: MySqlPool,
}

/// Maps a driver failure to a 500 without leaking connection details.
pub fn database_error(err: sqlx::Error) -> ConnectorError {
    error!("MySQL error: {}", err);
    ConnectorError::internal("database error", json!({ "cause": err.to_string() }))
}

#[async_trait]
impl Connector for MySqlConnector {
    type Configuration = MySqlConfiguration;
    type State = MySqlState;

    async fn parse_configuration(&self, raw: &str) -> anyhow::Result<Self::Configuration> {
        MySqlConfiguration::parse(raw)
    }

    /// The pool connects on first use, so a connector can start before its
    /// database is reachable.
    async fn try_init_state(&self, configuration: &Self::Configuration) -> anyhow::Result<Self::State> {
        let pool = MySqlPoolOptions::new()
            .max_connections(5)
            .connect_lazy_with(configuration.connect_options());
        info!(
            "MySQL pool configured for {}:{}/{}",
            configuration.host, configuration.port, configuration.db
        );
        Ok(MySqlState { pool })
    }

    fn get_capabilities(&self, _configuration: &Self::Configuration) -> CapabilitiesResponse {
        CapabilitiesResponse {
            version: NDC_VERSION.to_string(),
            capabilities: Capabilities {
                query: QueryCapabilities {
                    variables: Some(LeafCapability {}),
                    explain: Some(LeafCapability {}),
                    ..Default::default()
                },
                ..Default::default()
            },
        }
    }

    async fn get_schema(&self, configuration: &Self::Configuration) -> Result<SchemaResponse, ConnectorError> {
        Ok(configuration.schema.clone())
    }

    async fn query(
        &self,
        ctx: &Context,
        configuration: &Self::Configuration,
        state: &Self::State,
        request: &QueryRequest,
    ) -> Result<QueryResponse, ConnectorError> {
        let start = Instant::now();
        let variable_sets = utils::variable_sets(request);
        let mut row_sets = Vec::with_capacity(variable_sets.len());

        for variables in &variable_sets {
            let Some(mut statement) =
                build_select(&configuration.schema, &request.collection, &request.query, variables)?
            else {
                row_sets.push(RowSet::default());
                continue;
            };
            debug!(
                request_id = %ctx.request_id,
                params = ?statement.params,
                "MySQL query: {}",
                statement.sql()
            );
            let rows = statement
                .builder
                .build()
                .fetch_all(&state.pool)
                .await
                .map_err(database_error)?;
            row_sets.push(RowSet {
                aggregates: None,
                rows: Some(rows_to_json(&rows, &statement.columns)?),
            });
        }

        info!(
            collection = %request.collection,
            row_sets = row_sets.len(),
            exec_time = ?start.elapsed(),
            "Query complete"
        );
        Ok(QueryResponse(row_sets))
    }

    /// Reports the SQL for the first variable set without running it.
    async fn query_explain(
        &self,
        _ctx: &Context,
        configuration: &Self::Configuration,
        _state: &Self::State,
        request: &QueryRequest,
    ) -> Result<ExplainResponse, ConnectorError> {
        let variables = utils::variable_sets(request).swap_remove(0);
        let statement = build_select(&configuration.schema, &request.collection, &request.query, &variables)?;
        let mut details = BTreeMap::new();
        if let Some(statement) = statement {
            details.insert("query".to_string(), statement.sql().to_string());
        }
        Ok(ExplainResponse { details })
    }

    async fn mutation(
        &self,
        _ctx: &Context,
        _configuration: &Self::Configuration,
        _state: &Self::State,
        _request: &MutationRequest,
    ) -> Result<MutationResponse, ConnectorError> {
        Err(ConnectorError::not_supported("mutations are not supported"))
    }

    async fn mutation_explain(
        &self,
        _ctx: &Context,
        _configuration: &Self::Configuration,
        _state: &Self::State,
        _request: &MutationRequest,
    ) -> Result<ExplainResponse, ConnectorError> {
        Ok(ExplainResponse::default())
    }

    async fn health_check(&self, _configuration: &Self::Configuration, state: &Self::State) -> Result<(), ConnectorError> {
        sqlx::query("SELECT 1")
            .execute(&state.pool)
            .await
            .map_err(database_error)?;
        Ok(())
    }
}
