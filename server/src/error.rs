use thiserror::Error;
use todo_core::ValidationError;

/// Failures a command handler reports to its transport.
///
/// A missing id on `toggle`/`delete` is not here: it is a successful call
/// whose result is flagged as an error for the caller to read.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}
