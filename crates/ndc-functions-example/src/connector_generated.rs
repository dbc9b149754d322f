// Code generated by ndc-sdk, DO NOT EDIT.
#![allow(unused_imports, unused_variables)]

use async_trait::async_trait;
use ndc_connector::schema::{
    Capabilities, CapabilitiesResponse, LeafCapability, MutationOperation,
    MutationOperationResults, MutationRequest, MutationResponse, QueryCapabilities,
    QueryRequest, QueryResponse, SchemaResponse, VariableSet,
};
use ndc_connector::utils::{self, Decoder, FromValue};
use ndc_connector::{Connector, ConnectorError, Context};
use serde_json::{Map, Value};

use crate::functions;
use crate::types::{Configuration, State};

const SCHEMA: &str = include_str!("../schema.generated.json");

#[derive(Debug, Default)]
pub struct GeneratedConnector {
    decoder: Decoder,
}

impl GeneratedConnector {
    pub fn new(decoder: Decoder) -> Self {
        Self { decoder }
    }
}

#[async_trait]
impl Connector for GeneratedConnector {
    type Configuration = Configuration;
    type State = State;

    async fn parse_configuration(&self, raw: &str) -> anyhow::Result<Configuration> {
        Ok(serde_json::from_str(raw)?)
    }

    async fn try_init_state(&self, configuration: &Configuration) -> anyhow::Result<State> {
        crate::types::try_init_state(configuration).await
    }

    fn get_capabilities(&self, configuration: &Configuration) -> CapabilitiesResponse {
        CapabilitiesResponse {
            version: ndc_connector::schema::NDC_VERSION.to_string(),
            capabilities: Capabilities {
                query: QueryCapabilities {
                    variables: Some(LeafCapability {}),
                    ..Default::default()
                },
                ..Default::default()
            },
        }
    }

    async fn get_schema(&self, configuration: &Configuration) -> Result<SchemaResponse, ConnectorError> {
        serde_json::from_str(SCHEMA).map_err(|e| {
            ConnectorError::internal(
                "failed to decode the generated schema",
                serde_json::json!({ "cause": e.to_string() }),
            )
        })
    }

    async fn query(
        &self,
        ctx: &Context,
        configuration: &Configuration,
        state: &State,
        request: &QueryRequest,
    ) -> Result<QueryResponse, ConnectorError> {
        let mut row_sets = Vec::new();
        for variables in utils::variable_sets(request) {
            let result = execute_query(ctx, state, request, &variables, &self.decoder).await?;
            row_sets.push(utils::function_row_set(result));
        }
        Ok(QueryResponse(row_sets))
    }

    async fn mutation(
        &self,
        ctx: &Context,
        configuration: &Configuration,
        state: &State,
        request: &MutationRequest,
    ) -> Result<MutationResponse, ConnectorError> {
        let mut operation_results = Vec::with_capacity(request.operations.len());
        for operation in &request.operations {
            let result = execute_procedure(ctx, state, operation, &self.decoder).await?;
            operation_results.push(MutationOperationResults::Procedure { result });
        }
        Ok(MutationResponse { operation_results })
    }
}

async fn execute_query(
    ctx: &Context,
    state: &State,
    request: &QueryRequest,
    variables: &VariableSet,
    decoder: &Decoder,
) -> Result<Value, ConnectorError> {
    match request.collection.as_str() {
        "echoJson" => {
            utils::check_scalar_selection(&request.query)?;
            let raw_arguments = utils::resolve_argument_variables(&request.arguments, variables)
                .map_err(|e| ConnectorError::bad_request_with_cause("failed to resolve argument variables", e))?;
            let args = <crate::functions::EchoJsonArguments as FromValue>::from_value(decoder, &raw_arguments)
                .map_err(|e| ConnectorError::bad_request_with_cause("failed to resolve arguments", e))?;
            let raw_result = functions::function_echo_json(ctx, state, &args).await?;
            let result = utils::check_result(utils::encode_value(&raw_result))?;
            Ok(result)
        }
        "findAuthor" => {
            let selection = utils::function_selection(&request.query)?;
            let raw_arguments = utils::resolve_argument_variables(&request.arguments, variables)
                .map_err(|e| ConnectorError::bad_request_with_cause("failed to resolve argument variables", e))?;
            let args = <crate::functions::FindAuthorArguments as FromValue>::from_value(decoder, &raw_arguments)
                .map_err(|e| ConnectorError::bad_request_with_cause("failed to resolve arguments", e))?;
            let raw_result = functions::function_find_author(ctx, state, &args).await?;
            let Some(raw_result) = raw_result else {
                return Ok(Value::Null);
            };
            let result = utils::encode_map(&raw_result);
            utils::encode_object_with_column_selection(selection.as_ref(), result)
        }
        "getArticles" => {
            let selection = utils::function_selection(&request.query)?;
            let raw_arguments = utils::resolve_argument_variables(&request.arguments, variables)
                .map_err(|e| ConnectorError::bad_request_with_cause("failed to resolve argument variables", e))?;
            let args = <crate::functions::GetArticlesArguments as FromValue>::from_value(decoder, &raw_arguments)
                .map_err(|e| ConnectorError::bad_request_with_cause("failed to resolve arguments", e))?;
            let raw_result = functions::function_get_articles(ctx, state, &args).await?;
            let result = utils::check_result(utils::encode_maps(&raw_result))?;
            utils::encode_objects_with_column_selection(selection.as_ref(), result)
        }
        "getTypes" => {
            let selection = utils::function_selection(&request.query)?;
            let raw_arguments = utils::resolve_argument_variables(&request.arguments, variables)
                .map_err(|e| ConnectorError::bad_request_with_cause("failed to resolve argument variables", e))?;
            let args = <crate::functions::GetTypesArguments as FromValue>::from_value(decoder, &raw_arguments)
                .map_err(|e| ConnectorError::bad_request_with_cause("failed to resolve arguments", e))?;
            let raw_result = functions::function_get_types(ctx, state, &args).await?;
            let result = utils::check_result(utils::encode_map(&raw_result))?;
            utils::encode_object_with_column_selection(selection.as_ref(), result)
        }
        "hello" => {
            utils::check_scalar_selection(&request.query)?;
            let raw_result = functions::function_hello(ctx, state).await?;
            let result = utils::check_result(utils::encode_value(&raw_result))?;
            Ok(result)
        }
        _ => Err(ConnectorError::bad_request(
            format!("unsupported query: {}", request.collection),
            Value::Null,
        )),
    }
}

async fn execute_procedure(
    ctx: &Context,
    state: &State,
    operation: &MutationOperation,
    decoder: &Decoder,
) -> Result<Value, ConnectorError> {
    let (name, raw_arguments, fields) = operation.as_procedure()?;
    match name {
        "createArticle" => {
            let selection = utils::object_selection(fields)?;
            let args: crate::functions::CreateArticleArguments = utils::decode_arguments(decoder, raw_arguments)?;
            let raw_result = functions::procedure_create_article(ctx, state, &args).await?;
            let result = utils::check_result(utils::encode_map(&raw_result))?;
            utils::eval_nested_column_object(selection, result)
        }
        "createAuthors" => {
            let selection = utils::array_selection(fields)?;
            let args: crate::functions::CreateAuthorsArguments = utils::decode_arguments(decoder, raw_arguments)?;
            let raw_result = functions::procedure_create_authors(ctx, state, &args).await?;
            let result = utils::check_result(utils::encode_maps(&raw_result))?;
            utils::eval_nested_column_array(selection, result)
        }
        "increase" => {
            if fields.is_some() {
                return Err(ConnectorError::bad_request(
                    "cannot evaluate selection fields for scalar",
                    Value::Null,
                ));
            }
            let raw_result = functions::procedure_increase(ctx, state).await?;
            let result = utils::check_result(utils::encode_value(&raw_result))?;
            Ok(result)
        }
        _ => Err(ConnectorError::bad_request(
            format!("unsupported procedure operation: {name}"),
            Value::Null,
        )),
    }
}
