//! Plain-data HTTP messages exchanged between `TodoClient` and its caller.
//!
//! `TodoClient` never opens a socket. It hands back an [`HttpRequest`] for
//! `/api/todos` or `/mcp`, the embedding code sends it with whatever HTTP
//! stack it has, and the reply comes back as an [`HttpResponse`] for the
//! matching `parse_*` call.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Upper-case method token as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Outgoing request. `path` is the absolute URL including the client's base.
/// `body` is JSON text when present, with a matching `content-type` header.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// Reply as read by the caller. An empty `body` is valid (e.g. a 204 delete).
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}
