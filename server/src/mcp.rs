//! JSON-RPC protocol endpoint exposing the command handlers as MCP tools and
//! the widget shell as an MCP resource.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use todo_core::rpc::{codes, tools, JsonRpcError, JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION};
use tracing::{debug, warn};

use crate::error::HandlerError;
use crate::AppState;

pub const PROTOCOL_VERSION: &str = "2025-06-18";
pub const WIDGET_URI: &str = "ui://widget/todo.html";
pub const WIDGET_MIME: &str = "text/html+skybridge";

/// `POST /mcp`
pub async fn handle_post(State(state): State<AppState>, body: Bytes) -> Response {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "unparseable JSON-RPC body");
            return reply(JsonRpcResponse::error(
                Value::Null,
                JsonRpcError::parse_error(format!("Parse error: {e}")),
            ));
        }
    };

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(r) => r,
        Err(e) => {
            return reply(JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request(format!("Invalid request: {e}")),
            ))
        }
    };
    if request.jsonrpc != JSONRPC_VERSION {
        return reply(JsonRpcResponse::error(
            id,
            JsonRpcError::invalid_request("jsonrpc must be \"2.0\""),
        ));
    }

    match dispatch(&state, request).await {
        Some(response) => reply(response),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Any other method on `/mcp`.
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(JsonRpcResponse::error(Value::Null, JsonRpcError::method_not_allowed())),
    )
        .into_response()
}

fn reply(response: JsonRpcResponse) -> Response {
    (StatusCode::OK, Json(response)).into_response()
}

/// Route one request. Notifications produce no response.
pub async fn dispatch(state: &AppState, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
    debug!(method = %request.method, "JSON-RPC request");
    let Some(id) = request.id else {
        debug!(method = %request.method, "notification ignored");
        return None;
    };

    let result = match request.method.as_str() {
        "initialize" => Ok(initialize(&request.params)),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({ "tools": tool_descriptors() })),
        "tools/call" => call_tool(state, &request.params).await,
        "resources/list" => Ok(json!({ "resources": [widget_descriptor(state)] })),
        "resources/templates/list" => Ok(json!({ "resourceTemplates": [] })),
        "resources/read" => read_resource(state, &request.params),
        other => Err(JsonRpcError::method_not_found(other)),
    };

    Some(match result {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(error) => JsonRpcResponse::error(id, error),
    })
}

fn initialize(params: &Value) -> Value {
    let version = params
        .get("protocolVersion")
        .and_then(Value::as_str)
        .unwrap_or(PROTOCOL_VERSION);
    json!({
        "protocolVersion": version,
        "capabilities": {
            "tools": { "listChanged": false },
            "resources": { "listChanged": false }
        },
        "serverInfo": {
            "name": "todo-server",
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

async fn call_tool(state: &AppState, params: &Value) -> Result<Value, JsonRpcError> {
    let name = params
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| JsonRpcError::invalid_params("Missing tool name"))?;
    let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

    match state.handlers.call(name, &arguments).await {
        Ok(result) => Ok(result.to_mcp()),
        Err(HandlerError::Validation(v)) => Err(JsonRpcError::invalid_params(v.to_string())
            .with_data(json!({ "field": v.field, "reason": v.reason }))),
        Err(e @ HandlerError::UnknownTool(_)) => Err(JsonRpcError::invalid_params(e.to_string())),
    }
}

fn read_resource(state: &AppState, params: &Value) -> Result<Value, JsonRpcError> {
    let uri = params
        .get("uri")
        .and_then(Value::as_str)
        .ok_or_else(|| JsonRpcError::invalid_params("Missing resource uri"))?;
    if uri != WIDGET_URI {
        return Err(JsonRpcError::new(codes::RESOURCE_NOT_FOUND, format!("Resource not found: {uri}")));
    }
    Ok(json!({
        "contents": [{
            "uri": WIDGET_URI,
            "mimeType": WIDGET_MIME,
            "text": widget_html(state.base_url.as_deref()),
            "_meta": widget_meta(state.base_url.as_deref())
        }]
    }))
}

fn widget_descriptor(state: &AppState) -> Value {
    json!({
        "uri": WIDGET_URI,
        "name": "todo-widget",
        "title": "To-do list",
        "mimeType": WIDGET_MIME,
        "_meta": widget_meta(state.base_url.as_deref())
    })
}

/// HTML shell the host renders in the widget frame. Assets resolve against
/// `base_url`, or relative to the frame when no base URL is configured.
pub fn widget_html(base_url: Option<&str>) -> String {
    let base = base_url.map(|b| b.trim_end_matches('/')).unwrap_or("");
    format!(
        "<div id=\"todo-root\"></div>\n\
         <link rel=\"stylesheet\" href=\"{base}/todo-widget.css\">\n\
         <script type=\"module\" src=\"{base}/todo-widget.js\"></script>\n"
    )
}

fn widget_meta(base_url: Option<&str>) -> Value {
    let mut meta = json!({
        "openai/widgetDescription": "An interactive to-do list the user can add to, check off and clear.",
        "openai/widgetPrefersBorder": true
    });
    if let Some(origin) = base_url.and_then(origin_of) {
        meta["openai/widgetCSP"] = json!({
            "connect_domains": [origin],
            "resource_domains": [origin]
        });
    }
    meta
}

/// `scheme://host[:port]` of the base URL; `None` when it has no usable origin.
fn origin_of(base_url: &str) -> Option<String> {
    match url::Url::parse(base_url) {
        Ok(url) if url.has_host() => Some(url.origin().ascii_serialization()),
        Ok(_) => {
            warn!(base_url, "base URL has no host; widget CSP omitted");
            None
        }
        Err(e) => {
            warn!(base_url, error = %e, "unparseable base URL; widget CSP omitted");
            None
        }
    }
}

fn tool_meta(invoking: &str, invoked: &str) -> Value {
    json!({
        "openai/outputTemplate": WIDGET_URI,
        "openai/toolInvocation/invoking": invoking,
        "openai/toolInvocation/invoked": invoked,
        "openai/widgetAccessible": true,
        "openai/resultCanProduceWidget": true
    })
}

fn no_input() -> Value {
    json!({ "type": "object", "properties": {}, "additionalProperties": false })
}

fn id_input(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": { "id": { "type": "string", "description": description } },
        "required": ["id"],
        "additionalProperties": false
    })
}

pub fn tool_descriptors() -> Vec<Value> {
    let todo_schema = json!({
        "type": "object",
        "properties": {
            "id": { "type": "string", "minLength": 1 },
            "title": { "type": "string", "minLength": 1, "maxLength": todo_core::MAX_TITLE_LEN },
            "completed": { "type": "boolean" },
            "createdAt": { "type": "integer" }
        },
        "required": ["id", "title", "createdAt"]
    });

    vec![
        json!({
            "name": tools::SHOW_LIST,
            "title": "Show to-do list",
            "description": "Show the user's to-do list in an interactive widget.",
            "inputSchema": no_input(),
            "annotations": { "readOnlyHint": true },
            "_meta": tool_meta("Loading your to-dos", "Here are your to-dos")
        }),
        json!({
            "name": tools::REFRESH,
            "title": "Refresh to-do list",
            "description": "Fetch the current to-do list.",
            "inputSchema": no_input(),
            "annotations": { "readOnlyHint": true },
            "_meta": tool_meta("Refreshing", "Refreshed")
        }),
        json!({
            "name": tools::ADD,
            "title": "Add to-do",
            "description": "Add a new item to the to-do list.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "title": {
                        "type": "string",
                        "minLength": 1,
                        "maxLength": todo_core::MAX_TITLE_LEN,
                        "description": "What needs doing"
                    }
                },
                "required": ["title"],
                "additionalProperties": false
            },
            "_meta": tool_meta("Adding to-do", "Added to-do")
        }),
        json!({
            "name": tools::TOGGLE,
            "title": "Toggle to-do",
            "description": "Mark a to-do as completed, or as not completed if it already is.",
            "inputSchema": id_input("Id of the to-do to toggle"),
            "_meta": tool_meta("Updating to-do", "Updated to-do")
        }),
        json!({
            "name": tools::DELETE,
            "title": "Delete to-do",
            "description": "Remove a to-do from the list.",
            "inputSchema": id_input("Id of the to-do to delete"),
            "annotations": { "destructiveHint": true },
            "_meta": tool_meta("Deleting to-do", "Deleted to-do")
        }),
        json!({
            "name": tools::SAVE_STATE,
            "title": "Save widget state",
            "description": "Send the widget's current list to the server. The snapshot is acknowledged but not stored.",
            "inputSchema": {
                "type": "object",
                "properties": { "todos": { "type": "array", "items": todo_schema } },
                "required": ["todos"],
                "additionalProperties": false
            },
            "_meta": {
                "openai/widgetAccessible": true
            }
        }),
    ]
}
