//! Command handlers: the named operations behind the MCP tools.
//!
//! # Design
//! Each handler validates its arguments, runs one store operation under the
//! store lock, and answers with a structured payload (the full list plus the
//! affected item) and a one-line summary for the chat transcript.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;
use todo_core::rpc::tools;
use todo_core::types::validate_title;
use todo_core::{Todo, ValidationError};
use tracing::{info, warn};

use crate::error::HandlerError;
use crate::store::Store;

pub type SharedStore = Arc<RwLock<Store>>;

/// Structured half of a handler result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    pub todos: Vec<Todo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub todo: Option<Todo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_id: Option<String>,
    /// Number of items in an acknowledged `save_state` snapshot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<usize>,
}

impl Payload {
    fn list(todos: Vec<Todo>) -> Self {
        Self {
            todos,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub message: String,
    /// Absent on error results.
    pub payload: Option<Payload>,
    pub is_error: bool,
}

impl ToolResult {
    fn ok(message: impl Into<String>, payload: Payload) -> Self {
        Self {
            message: message.into(),
            payload: Some(payload),
            is_error: false,
        }
    }

    fn not_found(id: &str) -> Self {
        Self {
            message: format!("To-do not found: {id}"),
            payload: None,
            is_error: true,
        }
    }

    /// Render as an MCP `tools/call` result object.
    pub fn to_mcp(&self) -> Value {
        let mut result = json!({
            "content": [{ "type": "text", "text": self.message }],
        });
        if let Some(payload) = &self.payload {
            result["structuredContent"] = json!(payload);
        }
        if self.is_error {
            result["isError"] = json!(true);
        }
        result
    }
}

#[derive(Clone)]
pub struct CommandHandlers {
    store: SharedStore,
}

impl CommandHandlers {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Dispatch a tool by name.
    pub async fn call(&self, name: &str, arguments: &Value) -> Result<ToolResult, HandlerError> {
        let result = match name {
            tools::SHOW_LIST => Ok(self.show_list().await),
            tools::REFRESH => Ok(self.refresh().await),
            tools::ADD => self.add(arguments).await,
            tools::TOGGLE => self.toggle(arguments).await,
            tools::DELETE => self.delete(arguments).await,
            tools::SAVE_STATE => self.save_state(arguments).await,
            other => Err(HandlerError::UnknownTool(other.to_string())),
        };
        match &result {
            Ok(r) => info!(tool = name, is_error = r.is_error, summary = %r.message, "tool call"),
            Err(e) => warn!(tool = name, error = %e, "tool call rejected"),
        }
        result
    }

    pub async fn show_list(&self) -> ToolResult {
        let todos = self.store.read().await.list();
        let message = if todos.is_empty() {
            "Your to-do list is empty.".to_string()
        } else {
            let done = todos.iter().filter(|t| t.completed).count();
            format!("You have {} ({done} completed).", count_noun(todos.len(), "to-do"))
        };
        ToolResult::ok(message, Payload::list(todos))
    }

    pub async fn refresh(&self) -> ToolResult {
        let todos = self.store.read().await.list();
        let message = format!("Refreshed to-do list ({}).", count_noun(todos.len(), "item"));
        ToolResult::ok(message, Payload::list(todos))
    }

    pub async fn add(&self, arguments: &Value) -> Result<ToolResult, HandlerError> {
        let title = required_str(arguments, "title")?;
        let (todo, todos) = {
            let mut store = self.store.write().await;
            let todo = store.create(title)?;
            (todo, store.list())
        };
        Ok(ToolResult::ok(
            format!("Added to-do: \"{}\"", todo.title),
            Payload {
                todo: Some(todo),
                ..Payload::list(todos)
            },
        ))
    }

    pub async fn toggle(&self, arguments: &Value) -> Result<ToolResult, HandlerError> {
        let id = required_str(arguments, "id")?;
        let mut store = self.store.write().await;
        let Some(todo) = store.toggle(id) else {
            return Ok(ToolResult::not_found(id));
        };
        let state = if todo.completed { "completed" } else { "not completed" };
        Ok(ToolResult::ok(
            format!("Marked \"{}\" as {state}.", todo.title),
            Payload {
                todo: Some(todo),
                ..Payload::list(store.list())
            },
        ))
    }

    pub async fn delete(&self, arguments: &Value) -> Result<ToolResult, HandlerError> {
        let id = required_str(arguments, "id")?;
        let mut store = self.store.write().await;
        let Some(todo) = store.get(id) else {
            return Ok(ToolResult::not_found(id));
        };
        store.delete(id);
        Ok(ToolResult::ok(
            format!("Deleted to-do: \"{}\"", todo.title),
            Payload {
                deleted_id: Some(todo.id),
                ..Payload::list(store.list())
            },
        ))
    }

    /// Validate and acknowledge a client snapshot. The store is not touched.
    pub async fn save_state(&self, arguments: &Value) -> Result<ToolResult, HandlerError> {
        let snapshot = parse_snapshot(arguments)?;
        info!(received = snapshot.len(), "widget state acknowledged, not persisted");
        let todos = self.store.read().await.list();
        Ok(ToolResult::ok(
            format!("Saved widget state ({}).", count_noun(snapshot.len(), "to-do")),
            Payload {
                received: Some(snapshot.len()),
                ..Payload::list(todos)
            },
        ))
    }
}

fn count_noun(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

fn arguments_object<'a>(arguments: &'a Value) -> Result<Option<&'a Map<String, Value>>, ValidationError> {
    match arguments {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        _ => Err(ValidationError::new("arguments", "must be an object")),
    }
}

fn required_str<'a>(arguments: &'a Value, field: &str) -> Result<&'a str, ValidationError> {
    let value = arguments_object(arguments)?
        .and_then(|m| m.get(field))
        .ok_or_else(|| ValidationError::new(field, "is required"))?;
    value
        .as_str()
        .ok_or_else(|| ValidationError::new(field, "must be a string"))
}

fn parse_snapshot(arguments: &Value) -> Result<Vec<Todo>, ValidationError> {
    let items = arguments_object(arguments)?
        .and_then(|m| m.get("todos"))
        .ok_or_else(|| ValidationError::new("todos", "is required"))?
        .as_array()
        .ok_or_else(|| ValidationError::new("todos", "must be an array"))?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let todo: Todo = serde_json::from_value(item.clone())
                .map_err(|e| ValidationError::new(format!("todos[{i}]"), e.to_string()))?;
            if todo.id.is_empty() {
                return Err(ValidationError::new(format!("todos[{i}].id"), "must not be empty"));
            }
            validate_title(&format!("todos[{i}].title"), &todo.title)?;
            Ok(todo)
        })
        .collect()
}
