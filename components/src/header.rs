//! Header container: collection totals.

use std::sync::Arc;
use todo_pubsub_core::events::topics;
use todo_pubsub_core::{TodoBus, TodoEvent};

use crate::cell::{StateCell, Subscriptions, subscribe_weak};
use crate::view::{HeaderRoot, HeaderView};

/// What the header shows
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderState {
    /// Number of todos
    pub total_todos: usize,
    /// Number of completed todos
    pub completed_todos: usize,
}

struct Inner {
    cell: StateCell<HeaderState, dyn HeaderView>,
    subscriptions: Subscriptions,
}

impl Inner {
    fn handle_todos_update(&self, event: &TodoEvent) {
        // Payloads without the collection (added, deleted) are followed by a
        // todos:loaded republish from the list container
        let Some(todos) = event.todos() else {
            return;
        };

        let total_todos = todos.len();
        let completed_todos = todos.iter().filter(|todo| todo.completed).count();
        self.cell.set_state(|state| {
            state.total_todos = total_todos;
            state.completed_todos = completed_todos;
        });
    }
}

/// Keeps the totals in sync with every collection change on the bus.
#[derive(Clone)]
pub struct HeaderContainer {
    inner: Arc<Inner>,
}

impl HeaderContainer {
    /// Create the container and subscribe it to every todo topic
    #[must_use]
    pub fn new(bus: &TodoBus) -> Self {
        let inner = Arc::new(Inner {
            cell: StateCell::new("header", HeaderState::default()),
            subscriptions: Subscriptions::default(),
        });

        for topic in topics::ALL {
            inner
                .subscriptions
                .hold(subscribe_weak(bus, topic, &inner, Inner::handle_todos_update));
        }

        Self { inner }
    }

    /// Render into `root`
    pub fn init(&self, root: &dyn HeaderRoot) {
        self.inner.cell.bind(root.render());
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> HeaderState {
        self.inner.cell.snapshot()
    }

    /// Stop listening to the bus
    pub fn dispose(&self) {
        let released = self.inner.subscriptions.release();
        tracing::debug!(container = "header", released, "Disposed");
    }
}

impl std::fmt::Debug for HeaderContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeaderContainer")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use todo_pubsub_core::{DateTime, Todo, TodoId, Utc};

    fn todo(id: u64, completed: bool) -> Todo {
        let mut todo = Todo::new(TodoId::new(id), format!("Todo {id}"), DateTime::<Utc>::default());
        todo.completed = completed;
        todo
    }

    #[test]
    fn counts_follow_collection_payloads() {
        let bus = TodoBus::new();
        let header = HeaderContainer::new(&bus);

        bus.publish(&TodoEvent::Loaded {
            todos: vec![todo(1, false), todo(2, true)],
        });
        assert_eq!(
            header.state(),
            HeaderState {
                total_todos: 2,
                completed_todos: 1
            }
        );

        bus.publish(&TodoEvent::Updated {
            todo: todo(1, true),
            todos: vec![todo(1, true), todo(2, true)],
        });
        assert_eq!(header.state().completed_todos, 2);
    }

    #[test]
    fn payloads_without_collection_are_ignored() {
        let bus = TodoBus::new();
        let header = HeaderContainer::new(&bus);

        bus.publish(&TodoEvent::Added { todo: todo(1, false) });
        bus.publish(&TodoEvent::Deleted { todo_id: TodoId::new(1) });
        assert_eq!(header.state(), HeaderState::default());
    }

    #[test]
    fn dispose_unsubscribes_every_topic() {
        let bus = TodoBus::new();
        let header = HeaderContainer::new(&bus);
        assert!(topics::ALL.iter().all(|topic| bus.subscriber_count(topic) == 1));

        header.dispose();
        assert!(topics::ALL.iter().all(|topic| bus.subscriber_count(topic) == 0));

        bus.publish(&TodoEvent::Loaded { todos: vec![todo(1, false)] });
        assert_eq!(header.state(), HeaderState::default());
    }

    #[test]
    fn dropped_container_leaves_the_bus() {
        let bus = TodoBus::new();
        let header = HeaderContainer::new(&bus);
        let clone = header.clone();

        drop(header);
        // A clone keeps the registrations alive
        assert_eq!(bus.subscriber_count(topics::TODOS_LOADED), 1);

        drop(clone);
        assert!(topics::ALL.iter().all(|topic| bus.subscriber_count(topic) == 0));
        assert_eq!(bus.publish(&TodoEvent::Loaded { todos: vec![] }), 0);
    }
}
