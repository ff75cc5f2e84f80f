//! In-memory to-do store.
//!
//! The store owns every `Todo`; readers get clones. It holds no lock of its
//! own: the transport wraps one instance in `Arc<RwLock<_>>` and each call
//! runs a single store operation to completion.

use std::collections::HashMap;

use todo_core::types::{sort_by_created, validate_title};
use todo_core::{Todo, UpdateTodo, ValidationError};
use uuid::Uuid;

/// Millisecond wall clock. Injected so tests can pin creation times.
pub type Clock = Box<dyn Fn() -> i64 + Send + Sync>;

pub struct Store {
    todos: HashMap<String, Todo>,
    clock: Clock,
    last_created_at: i64,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self::with_clock(|| chrono::Utc::now().timestamp_millis())
    }

    pub fn with_clock(clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        Self {
            todos: HashMap::new(),
            clock: Box::new(clock),
            last_created_at: i64::MIN,
        }
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    /// All todos, oldest first.
    pub fn list(&self) -> Vec<Todo> {
        let mut todos: Vec<Todo> = self.todos.values().cloned().collect();
        sort_by_created(&mut todos);
        todos
    }

    pub fn get(&self, id: &str) -> Option<Todo> {
        self.todos.get(id).cloned()
    }

    pub fn create(&mut self, title: &str) -> Result<Todo, ValidationError> {
        validate_title("title", title)?;

        // Strictly increasing so same-millisecond creates keep insertion order.
        let created_at = (self.clock)().max(self.last_created_at.saturating_add(1));
        self.last_created_at = created_at;

        let todo = Todo {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            completed: false,
            created_at,
        };
        self.todos.insert(todo.id.clone(), todo.clone());
        Ok(todo)
    }

    /// Merge the provided fields into an existing todo. `Ok(None)` when the id
    /// is absent; an invalid title leaves the record untouched.
    pub fn update(&mut self, id: &str, patch: UpdateTodo) -> Result<Option<Todo>, ValidationError> {
        if let Some(title) = &patch.title {
            validate_title("title", title)?;
        }
        Ok(self.apply(id, patch))
    }

    pub fn delete(&mut self, id: &str) -> bool {
        self.todos.remove(id).is_some()
    }

    pub fn toggle(&mut self, id: &str) -> Option<Todo> {
        let completed = !self.todos.get(id)?.completed;
        self.apply(
            id,
            UpdateTodo {
                title: None,
                completed: Some(completed),
            },
        )
    }

    fn apply(&mut self, id: &str, patch: UpdateTodo) -> Option<Todo> {
        let todo = self.todos.get_mut(id)?;
        if let Some(title) = patch.title {
            todo.title = title;
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }
        Some(todo.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    #[test]
    fn create_then_get() {
        let mut store = Store::new();
        let before = chrono::Utc::now().timestamp_millis();
        let created = store.create("Buy milk").unwrap();

        let fetched = store.get(&created.id).unwrap();
        assert_eq!(fetched.title, "Buy milk");
        assert!(!fetched.completed);
        assert!(fetched.created_at >= before);
    }

    #[test]
    fn create_accepts_boundary_titles() {
        let mut store = Store::new();
        assert!(store.create("x").is_ok());
        assert!(store.create(&"x".repeat(200)).is_ok());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn create_rejects_empty_and_oversized_titles() {
        let mut store = Store::new();
        store.create("keep").unwrap();

        let err = store.create("").unwrap_err();
        assert_eq!(err.field, "title");
        assert!(store.create(&"x".repeat(201)).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn ids_are_unique() {
        let mut store = Store::new();
        let a = store.create("a").unwrap();
        let b = store.create("a").unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn toggle_twice_restores_state() {
        let mut store = Store::new();
        let todo = store.create("flip").unwrap();
        assert!(store.toggle(&todo.id).unwrap().completed);
        assert!(!store.toggle(&todo.id).unwrap().completed);
    }

    #[test]
    fn toggle_unknown_is_none() {
        let mut store = Store::new();
        assert!(store.toggle("missing").is_none());
    }

    #[test]
    fn delete_present_and_absent() {
        let mut store = Store::new();
        let todo = store.create("gone").unwrap();

        assert!(store.delete(&todo.id));
        assert!(store.get(&todo.id).is_none());

        store.create("stay").unwrap();
        assert!(!store.delete(&todo.id));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_is_partial() {
        let mut store = Store::new();
        let todo = store.create("Walk dog").unwrap();

        let updated = store
            .update(&todo.id, UpdateTodo { title: None, completed: Some(true) })
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Walk dog");
        assert!(updated.completed);

        let updated = store
            .update(&todo.id, UpdateTodo { title: Some("Walk cat".into()), completed: None })
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Walk cat");
        assert!(updated.completed);
        assert_eq!(updated.created_at, todo.created_at);
    }

    #[test]
    fn update_unknown_leaves_store_unmodified() {
        let mut store = Store::new();
        let todo = store.create("A").unwrap();
        let result = store
            .update("unknown", UpdateTodo { title: Some("x".into()), completed: None })
            .unwrap();
        assert!(result.is_none());
        assert_eq!(store.list(), vec![todo]);
    }

    #[test]
    fn update_rejects_invalid_title() {
        let mut store = Store::new();
        let todo = store.create("A").unwrap();
        let err = store
            .update(&todo.id, UpdateTodo { title: Some(String::new()), completed: Some(true) })
            .unwrap_err();
        assert_eq!(err.field, "title");
        assert_eq!(store.get(&todo.id).unwrap(), todo);
    }

    #[test]
    fn list_orders_by_creation_even_with_a_frozen_clock() {
        let mut store = Store::with_clock(|| 1_000);
        let ids: Vec<String> = ["A", "B", "C", "D"]
            .iter()
            .map(|t| store.create(t).unwrap().id)
            .collect();
        store.toggle(&ids[0]);
        let listed: Vec<String> = store.list().into_iter().map(|t| t.id).collect();
        assert_eq!(listed, ids);
    }

    #[test]
    fn list_orders_by_creation_when_clock_goes_backwards() {
        let now = Arc::new(AtomicI64::new(5_000));
        let clock = Arc::clone(&now);
        let mut store = Store::with_clock(move || clock.load(Ordering::SeqCst));

        store.create("first").unwrap();
        now.store(1_000, Ordering::SeqCst);
        store.create("second").unwrap();

        let titles: Vec<String> = store.list().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, ["first", "second"]);
    }

    #[test]
    fn abc_scenario() {
        let mut store = Store::new();
        for title in ["A", "B", "C"] {
            store.create(title).unwrap();
        }
        let titles: Vec<String> = store.list().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, ["A", "B", "C"]);

        let second = store.list()[1].id.clone();
        store.toggle(&second);
        let list = store.list();
        assert!(!list[0].completed);
        assert!(list[1].completed);
        assert!(!list[2].completed);

        let first = list[0].id.clone();
        assert!(store.delete(&first));
        let list = store.list();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].title, "B");
    }
}
