#![forbid(unsafe_code)]

use crate::support::ai::{ai_error, ai_ok, gateway_error};
use crate::support::jsonrpc::{
    INVALID_PARAMS, JsonRpcRequest, METHOD_NOT_FOUND, json_rpc_error, json_rpc_response,
    tool_text_content,
};
use crate::{MCP_VERSION, McpServer, SERVER_NAME, SERVER_VERSION};
use jg_core::error::{GatewayError, ValidationError};
use jg_core::ports::Authenticator;
use jg_core::usecases::UseCases;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::time::Instant;

impl McpServer {
    pub(crate) fn new(auth: Arc<dyn Authenticator>, usecases: UseCases) -> Self {
        Self { auth, usecases }
    }

    /// Handles one JSON-RPC message. `authorization` is the credential the
    /// transport carried alongside the message (HTTP header or frame header);
    /// without one, `params._meta.authorization` is used. Notifications
    /// never produce a reply.
    pub(crate) async fn handle(
        &self,
        request: JsonRpcRequest,
        authorization: Option<&str>,
    ) -> Option<Value> {
        let notification = request.is_notification();
        let response = self.respond(request, authorization).await;
        if notification { None } else { response }
    }

    async fn respond(&self, request: JsonRpcRequest, authorization: Option<&str>) -> Option<Value> {
        let method = request.method.as_str();

        if method == "initialize" {
            return Some(json_rpc_response(
                request.id,
                json!({
                    "protocolVersion": MCP_VERSION,
                    "serverInfo": { "name": SERVER_NAME, "version": SERVER_VERSION },
                    "capabilities": { "tools": {} }
                }),
            ));
        }

        if method == "notifications/initialized" {
            tracing::debug!("client initialized");
            return None;
        }

        if method == "ping" {
            return Some(json_rpc_response(request.id, json!({})));
        }

        if method == "tools/list" {
            return Some(json_rpc_response(
                request.id,
                json!({ "tools": crate::tools::tool_definitions() }),
            ));
        }

        if method == "tools/call" {
            let Some(params_obj) = request.params.as_ref().and_then(Value::as_object) else {
                return Some(json_rpc_error(
                    request.id,
                    INVALID_PARAMS,
                    "params must be an object",
                ));
            };
            let Some(tool_name) = params_obj.get("name").and_then(Value::as_str) else {
                return Some(json_rpc_error(
                    request.id,
                    INVALID_PARAMS,
                    "params.name must be a string",
                ));
            };

            let credential = authorization.or_else(|| request.meta_authorization());
            let response_body = self
                .call_tool(tool_name, params_obj.get("arguments"), credential)
                .await;

            return Some(json_rpc_response(
                request.id.clone(),
                json!({
                    "content": [tool_text_content(&response_body)],
                    "isError": !response_body.get("success").and_then(Value::as_bool).unwrap_or(false)
                }),
            ));
        }

        Some(json_rpc_error(
            request.id,
            METHOD_NOT_FOUND,
            &format!("Method not found: {method}"),
        ))
    }

    /// Authenticates, then validates and runs one tool. Always returns an
    /// envelope; failures never escape as JSON-RPC errors.
    pub(crate) async fn call_tool(
        &self,
        name: &str,
        args: Option<&Value>,
        credential: Option<&str>,
    ) -> Value {
        let started = Instant::now();
        if let Err(err) = self.auth.authenticate(credential) {
            tracing::warn!(tool = name, error = %err, "tool call rejected");
            return gateway_error(&GatewayError::from(err));
        }

        let empty = Map::new();
        let args = match args {
            None | Some(Value::Null) => &empty,
            Some(Value::Object(obj)) => obj,
            Some(_) => {
                return gateway_error(&GatewayError::from(ValidationError::new(
                    "arguments",
                    "must be an object",
                )));
            }
        };

        let Some(outcome) = crate::tools::dispatch_tool(&self.usecases, name, args).await else {
            return ai_error("UNKNOWN_TOOL", &format!("Unknown tool: {name}"));
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(result) => {
                tracing::info!(tool = name, elapsed_ms, "tool call succeeded");
                ai_ok(name, result)
            }
            Err(err) => {
                tracing::warn!(tool = name, code = err.code(), error = %err, elapsed_ms, "tool call failed");
                gateway_error(&err)
            }
        }
    }
}
