//! Domain DTOs shared by the server, the client and the widget mirror.
//!
//! # Design
//! The server owns `Todo` records; everything else receives clones. The wire
//! form is camelCase JSON because the widget host speaks camelCase.
//! Title validation lives next to the type so the store and the widget's
//! optimistic helpers reject exactly the same inputs.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Longest accepted title, counted in Unicode scalar values.
pub const MAX_TITLE_LEN: usize = 200;

/// A single to-do item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    /// Creation time in milliseconds since the Unix epoch. Never changes.
    pub created_at: i64,
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub title: String,
}

/// Request payload for updating an existing todo. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Check that `title` is between 1 and [`MAX_TITLE_LEN`] characters.
///
/// `field` names the offending input in the returned error, e.g. `title` or
/// `todos[2].title`.
pub fn validate_title(field: &str, title: &str) -> Result<(), ValidationError> {
    let len = title.chars().count();
    if len == 0 {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    if len > MAX_TITLE_LEN {
        return Err(ValidationError::new(
            field,
            format!("must be at most {MAX_TITLE_LEN} characters (got {len})"),
        ));
    }
    Ok(())
}

/// Sort todos ascending by creation time, the only listing order.
pub fn sort_by_created(todos: &mut [Todo]) {
    todos.sort_by_key(|t| t.created_at);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_serializes_camel_case() {
        let todo = Todo {
            id: "abc".to_string(),
            title: "Test".to_string(),
            completed: false,
            created_at: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["id"], "abc");
        assert_eq!(json["createdAt"], 1_700_000_000_000i64);
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn todo_completed_defaults_to_false() {
        let todo: Todo =
            serde_json::from_str(r#"{"id":"x","title":"t","createdAt":1}"#).unwrap();
        assert!(!todo.completed);
    }

    #[test]
    fn update_todo_all_fields_optional() {
        let input: UpdateTodo = serde_json::from_str("{}").unwrap();
        assert!(input.title.is_none());
        assert!(input.completed.is_none());
        assert_eq!(serde_json::to_string(&input).unwrap(), "{}");
    }

    #[test]
    fn title_bounds() {
        assert!(validate_title("title", "a").is_ok());
        assert!(validate_title("title", &"a".repeat(200)).is_ok());

        let err = validate_title("title", "").unwrap_err();
        assert_eq!(err.field, "title");

        let err = validate_title("todos[0].title", &"a".repeat(201)).unwrap_err();
        assert_eq!(err.field, "todos[0].title");
        assert!(err.reason.contains("200"));
    }

    #[test]
    fn title_length_counts_characters_not_bytes() {
        // 200 two-byte characters is still within bounds.
        assert!(validate_title("title", &"é".repeat(200)).is_ok());
    }
}
