//! Shared core for the to-do MCP app.
//!
//! # Overview
//! Domain types and validation used by the server, a stateless client for
//! both of the server's surfaces, and the widget-side mirror that talks to
//! an embedding host.
//!
//! # Design
//! - `TodoClient` is stateless; it holds only `base_url`. Each operation is
//!   split into `build_*` (produces request) and `parse_*` (consumes
//!   response), so the I/O boundary is explicit.
//! - `TodoWidget` reaches its host only through the `Host` trait, which makes
//!   it testable with an in-process fake.
//! - Title validation is defined once in `types` and reused everywhere.

pub mod client;
pub mod error;
pub mod http;
pub mod rpc;
pub mod types;
pub mod widget;

pub use client::TodoClient;
pub use error::{ApiError, HostError, ValidationError, WidgetError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use rpc::ToolOutcome;
pub use types::{CreateTodo, Todo, UpdateTodo, MAX_TITLE_LEN};
pub use widget::{Host, HostGlobals, TodoWidget};
