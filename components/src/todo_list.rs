//! Todo list container: loads the collection and tracks its shape.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use todo_pubsub_core::events::topics;
use todo_pubsub_core::{Todo, TodoApi, TodoBus, TodoEvent, TodoId};

use crate::cell::{StateCell, Subscriptions, subscribe_weak};
use crate::confirm::Confirm;
use crate::todo_item::TodoItemContainer;
use crate::view::{ItemPosition, TodoListRoot, TodoListView};

/// Shown when loading the collection fails
pub const LOAD_FAILED_ERROR: &str = "Failed to load todos. Please refresh the page.";

/// What the list shows
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoListState {
    /// The collection, newest additions first
    pub todos: Vec<Todo>,
    /// A load is in flight
    pub loading: bool,
    /// Inline error message
    pub error: Option<String>,
}

impl Default for TodoListState {
    fn default() -> Self {
        Self {
            todos: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

struct Inner {
    api: Arc<dyn TodoApi>,
    bus: TodoBus,
    confirm: Arc<dyn Confirm>,
    cell: StateCell<TodoListState, dyn TodoListView>,
    items: Mutex<HashMap<TodoId, TodoItemContainer>>,
    subscriptions: Subscriptions,
}

impl Inner {
    fn items(&self) -> MutexGuard<'_, HashMap<TodoId, TodoItemContainer>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn item_container(&self, todo: Todo) -> TodoItemContainer {
        TodoItemContainer::new(
            todo,
            Arc::clone(&self.api),
            self.bus.clone(),
            Arc::clone(&self.confirm),
        )
    }

    /// Replace every item container with one per record, in order.
    fn mount_all(&self, todos: &[Todo]) {
        let mut items = HashMap::with_capacity(todos.len());
        self.cell.with_view(|view| view.clear_items());

        for todo in todos {
            let item = self.item_container(todo.clone());
            self.cell.with_view(|view| item.init(view, ItemPosition::Last));
            items.insert(todo.id, item);
        }

        *self.items() = items;
    }

    fn handle_todo_added(&self, event: &TodoEvent) {
        let TodoEvent::Added { todo } = event else {
            return;
        };

        let todos = self.cell.set_state(|state| {
            if state.todos.iter().any(|existing| existing.id == todo.id) {
                return None;
            }
            state.todos.insert(0, todo.clone());
            Some(state.todos.clone())
        });
        let Some(todos) = todos else {
            tracing::debug!(id = %todo.id, "Ignoring duplicate todo:added");
            return;
        };

        let item = self.item_container(todo.clone());
        self.cell.with_view(|view| item.init(view, ItemPosition::First));
        self.items().insert(todo.id, item);

        self.bus.publish(&TodoEvent::Loaded { todos });
    }

    fn handle_todo_deleted(&self, event: &TodoEvent) {
        let TodoEvent::Deleted { todo_id } = event else {
            return;
        };

        let todos = self.cell.set_state(|state| {
            state.todos.retain(|todo| todo.id != *todo_id);
            state.todos.clone()
        });

        self.items().remove(todo_id);
        self.cell.with_view(|view| view.remove_item(*todo_id));

        self.bus.publish(&TodoEvent::Loaded { todos });
    }

    fn handle_todo_updated(&self, event: &TodoEvent) {
        let TodoEvent::Updated { todo, .. } = event else {
            return;
        };

        // Keep our copy current so later todos:loaded republishes carry the
        // right completed flags
        self.cell.set_state(|state| {
            if let Some(existing) = state.todos.iter_mut().find(|existing| existing.id == todo.id) {
                existing.clone_from(todo);
            }
        });
    }
}

/// Owns the collection on screen and one [`TodoItemContainer`] per record.
///
/// Listens to `todo:added`, `todo:deleted` and `todo:updated`; republishes
/// the resulting collection on `todos:loaded` whenever its shape changes.
#[derive(Clone)]
pub struct TodoListContainer {
    inner: Arc<Inner>,
}

impl TodoListContainer {
    /// Create the container and subscribe it to the bus.
    ///
    /// `confirm` is handed to every item container for delete confirmation.
    #[must_use]
    pub fn new(api: Arc<dyn TodoApi>, bus: TodoBus, confirm: Arc<dyn Confirm>) -> Self {
        let inner = Arc::new(Inner {
            api,
            bus: bus.clone(),
            confirm,
            cell: StateCell::new("todo-list", TodoListState::default()),
            items: Mutex::new(HashMap::new()),
            subscriptions: Subscriptions::default(),
        });

        let handlers: [(&str, fn(&Inner, &TodoEvent)); 3] = [
            (topics::TODO_ADDED, Inner::handle_todo_added),
            (topics::TODO_DELETED, Inner::handle_todo_deleted),
            (topics::TODO_UPDATED, Inner::handle_todo_updated),
        ];
        for (topic, handler) in handlers {
            inner
                .subscriptions
                .hold(subscribe_weak(&bus, topic, &inner, handler));
        }

        Self { inner }
    }

    /// Render into `root`, then load the collection
    pub async fn init(&self, root: &dyn TodoListRoot) {
        self.inner.cell.bind(root.render());
        self.load_todos().await;
    }

    /// Fetch the collection from the record store.
    ///
    /// On success publishes `todos:loaded` and remounts every item; on
    /// failure shows [`LOAD_FAILED_ERROR`] and publishes nothing.
    pub async fn load_todos(&self) {
        let inner = &self.inner;
        inner.cell.set_state(|state| {
            state.loading = true;
            state.error = None;
        });

        match inner.api.list().await {
            Ok(todos) => {
                tracing::info!(count = todos.len(), "Todos loaded");
                inner.cell.set_state(|state| {
                    state.todos.clone_from(&todos);
                    state.loading = false;
                });
                inner.bus.publish(&TodoEvent::Loaded {
                    todos: todos.clone(),
                });
                inner.mount_all(&todos);
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to load todos");
                inner.cell.set_state(|state| {
                    state.loading = false;
                    state.error = Some(LOAD_FAILED_ERROR.to_string());
                });
            }
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> TodoListState {
        self.inner.cell.snapshot()
    }

    /// The collection as currently shown
    #[must_use]
    pub fn todos(&self) -> Vec<Todo> {
        self.inner.cell.read(|state| state.todos.clone())
    }

    /// The item container for `id`, if the record is shown
    #[must_use]
    pub fn item(&self, id: TodoId) -> Option<TodoItemContainer> {
        self.inner.items().get(&id).cloned()
    }

    /// Stop listening to the bus
    pub fn dispose(&self) {
        let released = self.inner.subscriptions.release();
        tracing::debug!(container = "todo-list", released, "Disposed");
    }
}

impl std::fmt::Debug for TodoListContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoListContainer")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
