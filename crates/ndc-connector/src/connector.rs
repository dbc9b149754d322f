//! The connector trait implemented by every data connector.

use async_trait::async_trait;
use ndc_schema::{
    CapabilitiesResponse, ExplainResponse, MutationRequest, MutationResponse, QueryRequest,
    QueryResponse, SchemaResponse,
};
use uuid::Uuid;

use crate::error::ConnectorError;

/// Per-request context handed to every handler.
#[derive(Debug, Clone)]
pub struct Context {
    pub request_id: Uuid,
}

impl Context {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// A data connector served over the NDC HTTP protocol.
///
/// `Configuration` is parsed once at startup from the configuration file.
/// `State` holds runtime resources (pools, clients) shared by all requests.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Configuration: Send + Sync + 'static;
    type State: Send + Sync + 'static;

    /// Parse the raw configuration file contents.
    async fn parse_configuration(&self, raw: &str) -> anyhow::Result<Self::Configuration>;

    async fn try_init_state(
        &self,
        configuration: &Self::Configuration,
    ) -> anyhow::Result<Self::State>;

    fn get_capabilities(&self, configuration: &Self::Configuration) -> CapabilitiesResponse;

    async fn get_schema(
        &self,
        configuration: &Self::Configuration,
    ) -> Result<SchemaResponse, ConnectorError>;

    async fn query(
        &self,
        ctx: &Context,
        configuration: &Self::Configuration,
        state: &Self::State,
        request: &QueryRequest,
    ) -> Result<QueryResponse, ConnectorError>;

    async fn query_explain(
        &self,
        _ctx: &Context,
        _configuration: &Self::Configuration,
        _state: &Self::State,
        _request: &QueryRequest,
    ) -> Result<ExplainResponse, ConnectorError> {
        Err(ConnectorError::not_supported("query explain is not supported"))
    }

    async fn mutation(
        &self,
        ctx: &Context,
        configuration: &Self::Configuration,
        state: &Self::State,
        request: &MutationRequest,
    ) -> Result<MutationResponse, ConnectorError>;

    async fn mutation_explain(
        &self,
        _ctx: &Context,
        _configuration: &Self::Configuration,
        _state: &Self::State,
        _request: &MutationRequest,
    ) -> Result<ExplainResponse, ConnectorError> {
        Err(ConnectorError::not_supported("mutation explain is not supported"))
    }

    async fn health_check(
        &self,
        _configuration: &Self::Configuration,
        _state: &Self::State,
    ) -> Result<(), ConnectorError> {
        Ok(())
    }
}
