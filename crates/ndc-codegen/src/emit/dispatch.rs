//! `connector_generated.rs`: the `Connector` impl and the query/mutation
//! dispatch over every catalogued operation.

use std::collections::BTreeMap;

use super::encode::ValueEncoder;
use super::{quote, SourceBuilder, GENERATED_HEADER};
use crate::catalogue::{Catalogue, OperationInfo};
use crate::error::CodegenError;

/// Renders the connector source for `catalogue`.
pub fn render_connector(catalogue: &Catalogue) -> Result<String, CodegenError> {
    let modules = module_aliases(catalogue)?;
    let mut sb = SourceBuilder::new();

    sb.line(GENERATED_HEADER);
    sb.line("#![allow(unused_imports, unused_variables)]");
    sb.blank();
    sb.line("use async_trait::async_trait;");
    sb.open("use ndc_connector::schema::{");
    sb.line("Capabilities, CapabilitiesResponse, LeafCapability, MutationOperation,");
    sb.line("MutationOperationResults, MutationRequest, MutationResponse, QueryCapabilities,");
    sb.line("QueryRequest, QueryResponse, SchemaResponse, VariableSet,");
    sb.close("};");
    sb.line("use ndc_connector::utils::{self, Decoder, FromValue};");
    sb.line("use ndc_connector::{Connector, ConnectorError, Context};");
    sb.line("use serde_json::{Map, Value};");
    sb.blank();
    for package in catalogue.imports.iter().filter(|p| p.as_str() != "crate") {
        sb.line(format!("use {package};"));
    }
    sb.line("use crate::types::{Configuration, State};");
    sb.blank();
    sb.line("const SCHEMA: &str = include_str!(\"../schema.generated.json\");");
    sb.blank();

    render_connector_impl(&mut sb);
    sb.blank();
    render_execute_query(&mut sb, catalogue, &modules)?;
    sb.blank();
    render_execute_procedure(&mut sb, catalogue, &modules)?;

    Ok(sb.finish())
}

/// Call prefix per package: the last path segment, brought in by `use`.
fn module_aliases(catalogue: &Catalogue) -> Result<BTreeMap<String, String>, CodegenError> {
    let mut aliases = BTreeMap::new();
    let mut taken: BTreeMap<String, String> = BTreeMap::new();
    for package in &catalogue.imports {
        let alias = package.rsplit("::").next().unwrap_or(package).to_string();
        if let Some(other) = taken.insert(alias.clone(), package.clone()) {
            return Err(CodegenError::UnsupportedInput(format!(
                "packages {other} and {package} share the module name {alias}"
            )));
        }
        aliases.insert(package.clone(), alias);
    }
    Ok(aliases)
}

fn render_connector_impl(sb: &mut SourceBuilder) {
    sb.line("#[derive(Debug, Default)]");
    sb.open("pub struct GeneratedConnector {");
    sb.line("decoder: Decoder,");
    sb.close("}");
    sb.blank();
    sb.open("impl GeneratedConnector {");
    sb.open("pub fn new(decoder: Decoder) -> Self {");
    sb.line("Self { decoder }");
    sb.close("}");
    sb.close("}");
    sb.blank();

    sb.line("#[async_trait]");
    sb.open("impl Connector for GeneratedConnector {");
    sb.line("type Configuration = Configuration;");
    sb.line("type State = State;");
    sb.blank();
    sb.open("async fn parse_configuration(&self, raw: &str) -> anyhow::Result<Configuration> {");
    sb.line("Ok(serde_json::from_str(raw)?)");
    sb.close("}");
    sb.blank();
    sb.open("async fn try_init_state(&self, configuration: &Configuration) -> anyhow::Result<State> {");
    sb.line("crate::types::try_init_state(configuration).await");
    sb.close("}");
    sb.blank();
    sb.open("fn get_capabilities(&self, configuration: &Configuration) -> CapabilitiesResponse {");
    sb.open("CapabilitiesResponse {");
    sb.line("version: ndc_connector::schema::NDC_VERSION.to_string(),");
    sb.open("capabilities: Capabilities {");
    sb.open("query: QueryCapabilities {");
    sb.line("variables: Some(LeafCapability {}),");
    sb.line("..Default::default()");
    sb.close("},");
    sb.line("..Default::default()");
    sb.close("},");
    sb.close("}");
    sb.close("}");
    sb.blank();
    sb.open("async fn get_schema(&self, configuration: &Configuration) -> Result<SchemaResponse, ConnectorError> {");
    sb.open("serde_json::from_str(SCHEMA).map_err(|e| {");
    sb.line("ConnectorError::internal(");
    sb.line("    \"failed to decode the generated schema\",");
    sb.line("    serde_json::json!({ \"cause\": e.to_string() }),");
    sb.line(")");
    sb.close("})");
    sb.close("}");
    sb.blank();
    sb.open("async fn query(");
    sb.line("&self,");
    sb.line("ctx: &Context,");
    sb.line("configuration: &Configuration,");
    sb.line("state: &State,");
    sb.line("request: &QueryRequest,");
    sb.reopen(") -> Result<QueryResponse, ConnectorError> {");
    sb.line("let mut row_sets = Vec::new();");
    sb.open("for variables in utils::variable_sets(request) {");
    sb.line("let result = execute_query(ctx, state, request, &variables, &self.decoder).await?;");
    sb.line("row_sets.push(utils::function_row_set(result));");
    sb.close("}");
    sb.line("Ok(QueryResponse(row_sets))");
    sb.close("}");
    sb.blank();
    sb.open("async fn mutation(");
    sb.line("&self,");
    sb.line("ctx: &Context,");
    sb.line("configuration: &Configuration,");
    sb.line("state: &State,");
    sb.line("request: &MutationRequest,");
    sb.reopen(") -> Result<MutationResponse, ConnectorError> {");
    sb.line("let mut operation_results = Vec::with_capacity(request.operations.len());");
    sb.open("for operation in &request.operations {");
    sb.line("let result = execute_procedure(ctx, state, operation, &self.decoder).await?;");
    sb.line("operation_results.push(MutationOperationResults::Procedure { result });");
    sb.close("}");
    sb.line("Ok(MutationResponse { operation_results })");
    sb.close("}");
    sb.close("}");
}

fn render_execute_query(
    sb: &mut SourceBuilder,
    catalogue: &Catalogue,
    modules: &BTreeMap<String, String>,
) -> Result<(), CodegenError> {
    sb.open("async fn execute_query(");
    sb.line("ctx: &Context,");
    sb.line("state: &State,");
    sb.line("request: &QueryRequest,");
    sb.line("variables: &VariableSet,");
    sb.line("decoder: &Decoder,");
    sb.reopen(") -> Result<Value, ConnectorError> {");
    sb.open("match request.collection.as_str() {");
    for op in catalogue.functions.values() {
        sb.open(format!("{} => {{", quote(&op.name)));
        if op.result.is_scalar() {
            sb.line("utils::check_scalar_selection(&request.query)?;");
        } else {
            sb.line("let selection = utils::function_selection(&request.query)?;");
        }
        if let Some(args) = &op.arguments {
            sb.line("let raw_arguments = utils::resolve_argument_variables(&request.arguments, variables)");
            sb.line("    .map_err(|e| ConnectorError::bad_request_with_cause(\"failed to resolve argument variables\", e))?;");
            sb.line(format!(
                "let args = <{} as FromValue>::from_value(decoder, &raw_arguments)",
                args.rust_type
            ));
            sb.line("    .map_err(|e| ConnectorError::bad_request_with_cause(\"failed to resolve arguments\", e))?;");
        }
        let result = call_and_encode(sb, catalogue, modules, op)?;
        if op.result.is_scalar() {
            sb.line(format!("Ok({result})"));
        } else if op.result.is_array() {
            sb.line(format!("utils::encode_objects_with_column_selection(selection.as_ref(), {result})"));
        } else {
            sb.line(format!("utils::encode_object_with_column_selection(selection.as_ref(), {result})"));
        }
        sb.close("}");
    }
    sb.line("_ => Err(ConnectorError::bad_request(");
    sb.line("    format!(\"unsupported query: {}\", request.collection),");
    sb.line("    Value::Null,");
    sb.line(")),");
    sb.close("}");
    sb.close("}");
    Ok(())
}

fn render_execute_procedure(
    sb: &mut SourceBuilder,
    catalogue: &Catalogue,
    modules: &BTreeMap<String, String>,
) -> Result<(), CodegenError> {
    sb.open("async fn execute_procedure(");
    sb.line("ctx: &Context,");
    sb.line("state: &State,");
    sb.line("operation: &MutationOperation,");
    sb.line("decoder: &Decoder,");
    sb.reopen(") -> Result<Value, ConnectorError> {");
    sb.line("let (name, raw_arguments, fields) = operation.as_procedure()?;");
    sb.open("match name {");
    for op in catalogue.procedures.values() {
        sb.open(format!("{} => {{", quote(&op.name)));
        if op.result.is_scalar() {
            reject_procedure_scalar_selection(sb);
        } else if op.result.is_array() {
            sb.line("let selection = utils::array_selection(fields)?;");
        } else {
            sb.line("let selection = utils::object_selection(fields)?;");
        }
        if let Some(args) = &op.arguments {
            sb.line(format!(
                "let args: {} = utils::decode_arguments(decoder, raw_arguments)?;",
                args.rust_type
            ));
        }
        let result = call_and_encode(sb, catalogue, modules, op)?;
        if op.result.is_scalar() {
            sb.line(format!("Ok({result})"));
        } else if op.result.is_array() {
            sb.line(format!("utils::eval_nested_column_array(selection, {result})"));
        } else {
            sb.line(format!("utils::eval_nested_column_object(selection, {result})"));
        }
        sb.close("}");
    }
    sb.line("_ => Err(ConnectorError::bad_request(");
    sb.line("    format!(\"unsupported procedure operation: {name}\"),");
    sb.line("    Value::Null,");
    sb.line(")),");
    sb.close("}");
    sb.close("}");
    Ok(())
}

fn reject_procedure_scalar_selection(sb: &mut SourceBuilder) {
    sb.open("if fields.is_some() {");
    sb.line("return Err(ConnectorError::bad_request(");
    sb.line("    \"cannot evaluate selection fields for scalar\",");
    sb.line("    Value::Null,");
    sb.line("));");
    sb.close("}");
}

/// Calls the user function and binds the encoded result to `result`.
fn call_and_encode(
    sb: &mut SourceBuilder,
    catalogue: &Catalogue,
    modules: &BTreeMap<String, String>,
    op: &OperationInfo,
) -> Result<&'static str, CodegenError> {
    let module = if op.package == "crate" {
        "crate"
    } else {
        modules.get(&op.package).map(String::as_str).ok_or_else(|| {
            CodegenError::UnsupportedInput(format!("package {} is not imported", op.package))
        })?
    };
    let args = if op.arguments.is_some() { ", &args" } else { "" };
    sb.line(format!(
        "let raw_result = {module}::{}(ctx, state{args}).await?;",
        op.origin
    ));

    let mut encoder = ValueEncoder::new(catalogue);
    if op.result.is_nullable() {
        sb.open("let Some(raw_result) = raw_result else {");
        sb.line("return Ok(Value::Null);");
        sb.close("};");
        let expr = encoder.encode(sb, op.result.without_nullable(), "raw_result", "encoded")?;
        sb.line(format!("let result = {expr};"));
    } else {
        let expr = encoder.encode(sb, &op.result, "raw_result", "encoded")?;
        sb.line(format!("let result = utils::check_result({expr})?;"));
    }
    Ok("result")
}
