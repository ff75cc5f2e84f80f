//! Stateless HTTP request builder and response parser for the todo server.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip, keeping the core
//! deterministic and free of I/O dependencies.
//!
//! Two surfaces are covered: the REST API under `/api/todos` and the
//! JSON-RPC protocol endpoint at `/mcp`.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::rpc::{JsonRpcRequest, JsonRpcResponse, ToolOutcome};
use crate::types::{CreateTodo, Todo, UpdateTodo};

/// Path of the JSON-RPC protocol endpoint.
pub const MCP_PATH: &str = "/mcp";
/// Prefix of the REST collection.
pub const REST_PATH: &str = "/api/todos";

/// Synchronous, stateless client for the todo server.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // --- REST ---

    pub fn build_list_todos(&self) -> HttpRequest {
        self.bare(HttpMethod::Get, format!("{}{REST_PATH}", self.base_url))
    }

    pub fn build_get_todo(&self, id: &str) -> HttpRequest {
        self.bare(HttpMethod::Get, self.item_url(id))
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Post, format!("{}{REST_PATH}", self.base_url), input)
    }

    pub fn build_update_todo(&self, id: &str, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Put, self.item_url(id), input)
    }

    pub fn build_delete_todo(&self, id: &str) -> HttpRequest {
        self.bare(HttpMethod::Delete, self.item_url(id))
    }

    pub fn build_toggle_todo(&self, id: &str) -> HttpRequest {
        self.bare(HttpMethod::Post, format!("{}/toggle", self.item_url(id)))
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 201)?;
        decode(&response.body)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)?;
        Ok(())
    }

    pub fn parse_toggle_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    // --- protocol endpoint ---

    /// Build a JSON-RPC `tools/call` request. `request_id` is echoed back by
    /// the server and is otherwise opaque.
    pub fn build_tool_call(
        &self,
        request_id: u64,
        name: &str,
        arguments: Value,
    ) -> Result<HttpRequest, ApiError> {
        let rpc = JsonRpcRequest::new(
            request_id,
            "tools/call",
            json!({ "name": name, "arguments": arguments }),
        );
        self.build_rpc(&rpc)
    }

    /// Build an arbitrary JSON-RPC request against the protocol endpoint.
    pub fn build_rpc(&self, rpc: &JsonRpcRequest) -> Result<HttpRequest, ApiError> {
        let mut req = self.with_json(HttpMethod::Post, format!("{}{MCP_PATH}", self.base_url), rpc)?;
        req.headers.push((
            "accept".to_string(),
            "application/json, text/event-stream".to_string(),
        ));
        Ok(req)
    }

    /// Decode a JSON-RPC response, returning the `result` member.
    pub fn parse_rpc(&self, response: HttpResponse) -> Result<Value, ApiError> {
        check_status(&response, 200)?;
        let rpc: JsonRpcResponse = decode(&response.body)?;
        if let Some(err) = rpc.error {
            return Err(ApiError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        rpc.result
            .ok_or_else(|| ApiError::DeserializationError("response has neither result nor error".into()))
    }

    /// Decode a `tools/call` response into its text message and structured
    /// payload. A tool-level failure (`isError`) is still `Ok`.
    pub fn parse_tool_call(&self, response: HttpResponse) -> Result<ToolOutcome, ApiError> {
        let result = self.parse_rpc(response)?;
        let message = result
            .get("content")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|c| c.get("text").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();
        Ok(ToolOutcome {
            message,
            payload: result.get("structuredContent").cloned().unwrap_or(Value::Null),
            is_error: result.get("isError").and_then(Value::as_bool).unwrap_or(false),
        })
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}{REST_PATH}/{id}", self.base_url)
    }

    fn bare(&self, method: HttpMethod, path: String) -> HttpRequest {
        HttpRequest {
            method,
            path,
            headers: Vec::new(),
            body: None,
        }
    }

    fn with_json<T: serde::Serialize>(
        &self,
        method: HttpMethod,
        path: String,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
