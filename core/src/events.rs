//! Domain events exchanged between containers.
//!
//! | Topic           | Payload              |
//! |-----------------|----------------------|
//! | `todo:added`    | `{ todo }`           |
//! | `todo:updated`  | `{ todo, todos }`    |
//! | `todo:deleted`  | `{ todoId }`         |
//! | `todos:loaded`  | `{ todos }`          |
//!
//! `todos` is always the full collection as known by the publisher at the
//! time of publishing.

use crate::event_bus::{EventBus, Topic};
use crate::todo::{Todo, TodoId};
use serde::Serialize;

/// Topic names
pub mod topics {
    /// A todo was created
    pub const TODO_ADDED: &str = "todo:added";
    /// A todo was changed
    pub const TODO_UPDATED: &str = "todo:updated";
    /// A todo was removed
    pub const TODO_DELETED: &str = "todo:deleted";
    /// The collection was (re)loaded or changed shape
    pub const TODOS_LOADED: &str = "todos:loaded";

    /// Every topic, in the order above
    pub const ALL: [&str; 4] = [TODO_ADDED, TODO_UPDATED, TODO_DELETED, TODOS_LOADED];
}

/// Something that happened to the todo collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TodoEvent {
    /// Published on `todo:added`
    Added {
        /// The created record
        todo: Todo,
    },

    /// Published on `todo:updated`
    Updated {
        /// The record after the update
        todo: Todo,
        /// The whole collection after the update
        todos: Vec<Todo>,
    },

    /// Published on `todo:deleted`
    Deleted {
        /// Identifier of the removed record
        #[serde(rename = "todoId")]
        todo_id: TodoId,
    },

    /// Published on `todos:loaded`
    Loaded {
        /// The whole collection
        todos: Vec<Todo>,
    },
}

impl TodoEvent {
    /// The collection snapshot carried by the payload, if any
    #[must_use]
    pub fn todos(&self) -> Option<&[Todo]> {
        match self {
            Self::Updated { todos, .. } | Self::Loaded { todos } => Some(todos),
            Self::Added { .. } | Self::Deleted { .. } => None,
        }
    }
}

impl Topic for TodoEvent {
    fn topic(&self) -> &'static str {
        match self {
            Self::Added { .. } => topics::TODO_ADDED,
            Self::Updated { .. } => topics::TODO_UPDATED,
            Self::Deleted { .. } => topics::TODO_DELETED,
            Self::Loaded { .. } => topics::TODOS_LOADED,
        }
    }
}

/// The bus containers share.
pub type TodoBus = EventBus<TodoEvent>;

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use serde_json::json;

    fn todo(id: u64, completed: bool) -> Todo {
        let mut todo = Todo::new(
            TodoId::new(id),
            format!("Todo {id}"),
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        );
        todo.completed = completed;
        todo
    }

    #[test]
    fn topics_match_payloads() {
        assert_eq!(TodoEvent::Added { todo: todo(1, false) }.topic(), "todo:added");
        assert_eq!(
            TodoEvent::Updated { todo: todo(1, true), todos: vec![] }.topic(),
            "todo:updated"
        );
        assert_eq!(TodoEvent::Deleted { todo_id: TodoId::new(1) }.topic(), "todo:deleted");
        assert_eq!(TodoEvent::Loaded { todos: vec![] }.topic(), "todos:loaded");
    }

    #[test]
    fn only_collection_payloads_carry_todos() {
        assert!(TodoEvent::Added { todo: todo(1, false) }.todos().is_none());
        assert!(TodoEvent::Deleted { todo_id: TodoId::new(1) }.todos().is_none());
        let loaded = TodoEvent::Loaded { todos: vec![todo(1, false), todo(2, true)] };
        assert_eq!(loaded.todos().map(<[Todo]>::len), Some(2));
    }

    #[test]
    fn payload_shapes() {
        let deleted = serde_json::to_value(TodoEvent::Deleted { todo_id: TodoId::new(5) }).unwrap();
        assert_eq!(deleted, json!({ "todoId": 5 }));

        let added = serde_json::to_value(TodoEvent::Added { todo: todo(1, false) }).unwrap();
        assert_eq!(added["todo"]["text"], "Todo 1");

        let updated = serde_json::to_value(TodoEvent::Updated {
            todo: todo(1, true),
            todos: vec![todo(1, true)],
        })
        .unwrap();
        assert_eq!(updated["todo"]["completed"], true);
        assert_eq!(updated["todos"].as_array().map(Vec::len), Some(1));
    }
}
