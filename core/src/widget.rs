//! Widget-side mirror of the to-do list.
//!
//! # Design
//! The embedding host is reached only through the [`Host`] trait: a read of
//! the current globals, a register/unregister pair for the single
//! "globals changed" notification, and two capability calls. The widget never
//! assumes a global namespace.
//!
//! Mutations are optimistic: the mirror changes first, then the matching
//! tool is dispatched through the host. A synchronous dispatch failure rolls
//! the change back. Tool responses are folded back in with
//! [`TodoWidget::reconcile`]; host notifications resync from the injected
//! snapshot regardless.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{HostError, WidgetError};
use crate::rpc::{tools, ToolOutcome};
use crate::types::{sort_by_created, validate_title, Todo};

/// Handle returned by [`Host::subscribe`].
pub type SubscriptionId = u64;

/// Callback invoked with the fresh globals whenever the host changes them.
pub type GlobalsListener = Box<dyn Fn(&HostGlobals) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Inline,
    Pip,
    Fullscreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
    Unknown,
}

/// State the host injects into the widget frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostGlobals {
    pub tool_input: Option<Value>,
    pub tool_output: Option<Value>,
    pub widget_state: Option<Value>,
    pub theme: Option<Theme>,
    pub display_mode: Option<DisplayMode>,
    pub max_height: Option<u32>,
    pub locale: Option<String>,
    pub device: Option<DeviceType>,
}

impl HostGlobals {
    /// The todo list carried by the host, preferring the latest tool output
    /// over persisted widget state. `None` when neither holds a readable list.
    pub fn snapshot_todos(&self) -> Option<Vec<Todo>> {
        [&self.tool_output, &self.widget_state]
            .into_iter()
            .flatten()
            .find_map(todos_from)
    }
}

fn todos_from(value: &Value) -> Option<Vec<Todo>> {
    let raw = value.get("todos")?;
    match serde_json::from_value::<Vec<Todo>>(raw.clone()) {
        Ok(mut todos) => {
            sort_by_created(&mut todos);
            Some(todos)
        }
        Err(e) => {
            warn!(error = %e, "ignoring unreadable todo snapshot");
            None
        }
    }
}

/// The embedding environment as seen by the widget.
pub trait Host: Send + Sync {
    fn globals(&self) -> HostGlobals;

    fn subscribe(&self, listener: GlobalsListener) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);

    /// Dispatch a tool call. Completion is reported later through a globals
    /// change carrying the new tool output, not through this return value.
    fn call_tool(&self, name: &str, arguments: Value) -> Result<(), HostError> {
        let _ = (name, arguments);
        Err(HostError::Unavailable("callTool"))
    }

    fn set_widget_state(&self, state: Value) -> Result<(), HostError> {
        let _ = state;
        Err(HostError::Unavailable("setWidgetState"))
    }
}

#[derive(Debug, Default)]
struct Mirror {
    todos: Vec<Todo>,
    in_flight: usize,
    last_created_at: i64,
}

impl Mirror {
    fn replace(&mut self, todos: Vec<Todo>) {
        self.last_created_at = todos
            .iter()
            .map(|t| t.created_at)
            .max()
            .unwrap_or(0)
            .max(self.last_created_at);
        self.todos = todos;
    }

    fn next_created_at(&mut self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        self.last_created_at = now.max(self.last_created_at.saturating_add(1));
        self.last_created_at
    }
}

fn lock(mirror: &Mutex<Mirror>) -> MutexGuard<'_, Mirror> {
    mirror.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Local, optimistic view of the to-do list inside a widget frame.
pub struct TodoWidget<H: Host> {
    host: Arc<H>,
    mirror: Arc<Mutex<Mirror>>,
    subscription: SubscriptionId,
}

impl<H: Host> TodoWidget<H> {
    /// Seed the mirror from the host's current snapshot and start listening
    /// for changes. The listener is removed when the widget is dropped.
    pub fn attach(host: Arc<H>) -> Self {
        let mut mirror = Mirror::default();
        mirror.replace(host.globals().snapshot_todos().unwrap_or_default());
        let mirror = Arc::new(Mutex::new(mirror));

        let shared = Arc::clone(&mirror);
        let subscription = host.subscribe(Box::new(move |globals: &HostGlobals| {
            if let Some(todos) = globals.snapshot_todos() {
                debug!(count = todos.len(), "resyncing mirror from host");
                let mut m = lock(&shared);
                m.replace(todos);
                // The host's snapshot supersedes every dispatched call.
                m.in_flight = 0;
            }
        }));

        Self {
            host,
            mirror,
            subscription,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn todos(&self) -> Vec<Todo> {
        lock(&self.mirror).todos.clone()
    }

    /// True while at least one dispatched call has not been reconciled.
    pub fn is_loading(&self) -> bool {
        lock(&self.mirror).in_flight > 0
    }

    /// Append a provisional todo and dispatch `add`. The provisional id is
    /// replaced once the server's list arrives.
    pub fn add(&self, title: &str) -> Result<Todo, WidgetError> {
        validate_title("title", title)?;
        let provisional = {
            let mut m = lock(&self.mirror);
            let todo = Todo {
                id: format!("pending-{}", Uuid::new_v4()),
                title: title.to_string(),
                completed: false,
                created_at: m.next_created_at(),
            };
            m.todos.push(todo.clone());
            m.in_flight += 1;
            todo
        };

        if let Err(e) = self.host.call_tool(tools::ADD, json!({ "title": title })) {
            let mut m = lock(&self.mirror);
            m.todos.retain(|t| t.id != provisional.id);
            m.in_flight -= 1;
            return Err(e.into());
        }
        Ok(provisional)
    }

    /// Flip `completed` locally and dispatch `toggle`.
    pub fn toggle(&self, id: &str) -> Result<Todo, WidgetError> {
        let toggled = {
            let mut m = lock(&self.mirror);
            let todo = m
                .todos
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| WidgetError::NotFound(id.to_string()))?;
            todo.completed = !todo.completed;
            let toggled = todo.clone();
            m.in_flight += 1;
            toggled
        };

        if let Err(e) = self.host.call_tool(tools::TOGGLE, json!({ "id": id })) {
            let mut m = lock(&self.mirror);
            if let Some(todo) = m.todos.iter_mut().find(|t| t.id == id) {
                todo.completed = !toggled.completed;
            }
            m.in_flight -= 1;
            return Err(e.into());
        }
        Ok(toggled)
    }

    /// Remove locally and dispatch `delete`.
    pub fn delete(&self, id: &str) -> Result<Todo, WidgetError> {
        let (index, removed) = {
            let mut m = lock(&self.mirror);
            let index = m
                .todos
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| WidgetError::NotFound(id.to_string()))?;
            let removed = m.todos.remove(index);
            m.in_flight += 1;
            (index, removed)
        };

        if let Err(e) = self.host.call_tool(tools::DELETE, json!({ "id": id })) {
            let mut m = lock(&self.mirror);
            let index = index.min(m.todos.len());
            m.todos.insert(index, removed);
            m.in_flight -= 1;
            return Err(e.into());
        }
        Ok(removed)
    }

    /// Send the whole mirror to the server's `save_state` tool.
    pub fn save_state(&self) -> Result<(), WidgetError> {
        let todos = {
            let mut m = lock(&self.mirror);
            m.in_flight += 1;
            m.todos.clone()
        };
        if let Err(e) = self.host.call_tool(tools::SAVE_STATE, json!({ "todos": todos })) {
            lock(&self.mirror).in_flight -= 1;
            return Err(e.into());
        }
        Ok(())
    }

    /// Persist the mirror as widget state so the host can restore it.
    pub fn persist(&self) -> Result<(), HostError> {
        let todos = self.todos();
        self.host.set_widget_state(json!({ "todos": todos }))
    }

    /// Fold a tool response into the mirror. Returns true when the mirror was
    /// replaced by the server's list.
    pub fn reconcile(&self, outcome: &ToolOutcome) -> bool {
        let mut m = lock(&self.mirror);
        m.in_flight = m.in_flight.saturating_sub(1);
        if outcome.is_error {
            debug!(summary = %outcome.message, "tool reported an error; keeping mirror");
            return false;
        }
        match todos_from(&outcome.payload) {
            Some(todos) => {
                m.replace(todos);
                true
            }
            None => false,
        }
    }
}

impl<H: Host> Drop for TodoWidget<H> {
    fn drop(&mut self) {
        self.host.unsubscribe(self.subscription);
    }
}
