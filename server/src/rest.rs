use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use todo_core::{CreateTodo, Todo, UpdateTodo, ValidationError};
use tracing::info;

use crate::AppState;

/// REST failures: an absent id or a rejected field.
#[derive(Debug)]
pub enum RestError {
    NotFound,
    Validation(ValidationError),
}

impl From<ValidationError> for RestError {
    fn from(e: ValidationError) -> Self {
        RestError::Validation(e)
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        match self {
            RestError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": "Todo not found" }))).into_response()
            }
            RestError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": e.to_string(), "field": e.field })),
            )
                .into_response(),
        }
    }
}

pub async fn list_todos(State(state): State<AppState>) -> Json<Vec<Todo>> {
    let todos = state.store().read().await.list();
    Json(todos)
}

pub async fn create_todo(
    State(state): State<AppState>,
    Json(input): Json<CreateTodo>,
) -> Result<(StatusCode, Json<Todo>), RestError> {
    let todo = state.store().write().await.create(&input.title)?;
    info!(id = %todo.id, "todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, RestError> {
    let todo = state.store().read().await.get(&id);
    todo.map(Json).ok_or(RestError::NotFound)
}

pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<Todo>, RestError> {
    let todo = state.store().write().await.update(&id, input)?;
    todo.map(Json).ok_or(RestError::NotFound)
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, RestError> {
    let removed = state.store().write().await.delete(&id);
    if removed {
        info!(%id, "todo deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(RestError::NotFound)
    }
}

pub async fn toggle_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, RestError> {
    let todo = state.store().write().await.toggle(&id);
    todo.map(Json).ok_or(RestError::NotFound)
}
