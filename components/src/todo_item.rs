//! Todo item container: toggling and deleting one record.

use std::sync::{Arc, Weak};
use todo_pubsub_core::{Todo, TodoApi, TodoBus, TodoEvent, TodoId, TodoPatch};

use crate::cell::StateCell;
use crate::confirm::Confirm;
use crate::view::{ActionFuture, ItemPosition, TodoItemCallbacks, TodoItemView, TodoListView};

/// Question asked before a delete
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this todo?";

/// Shown when toggling fails
pub const UPDATE_FAILED_ERROR: &str = "Failed to update todo";

/// Shown when deleting fails
pub const DELETE_FAILED_ERROR: &str = "Failed to delete todo";

/// What an item row shows
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoItemState {
    /// The record
    pub todo: Todo,
    /// An update or delete is in flight
    pub loading: bool,
    /// Inline error message
    pub error: Option<String>,
}

struct Inner {
    id: TodoId,
    api: Arc<dyn TodoApi>,
    bus: TodoBus,
    confirm: Arc<dyn Confirm>,
    cell: StateCell<TodoItemState, dyn TodoItemView>,
}

/// Owns one record on screen.
///
/// Created by the list container, one per record; publishes `todo:updated`
/// and `todo:deleted`.
#[derive(Clone)]
pub struct TodoItemContainer {
    inner: Arc<Inner>,
}

impl TodoItemContainer {
    /// Create the container for `todo`
    #[must_use]
    pub fn new(todo: Todo, api: Arc<dyn TodoApi>, bus: TodoBus, confirm: Arc<dyn Confirm>) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: todo.id,
                api,
                bus,
                confirm,
                cell: StateCell::new(
                    "todo-item",
                    TodoItemState {
                        todo,
                        loading: false,
                        error: None,
                    },
                ),
            }),
        }
    }

    fn from_weak(inner: &Weak<Inner>) -> Option<Self> {
        inner.upgrade().map(|inner| Self { inner })
    }

    /// Mount a row for this record in `list` and render into it
    pub fn init(&self, list: &mut dyn TodoListView, position: ItemPosition) {
        let for_toggle = Arc::downgrade(&self.inner);
        let for_delete = for_toggle.clone();
        let callbacks = TodoItemCallbacks::new(
            move || {
                let container = for_toggle.clone();
                Box::pin(async move {
                    if let Some(item) = Self::from_weak(&container) {
                        item.toggle().await;
                    }
                }) as ActionFuture
            },
            move || {
                let container = for_delete.clone();
                Box::pin(async move {
                    if let Some(item) = Self::from_weak(&container) {
                        item.delete().await;
                    }
                }) as ActionFuture
            },
        );

        let view = list.mount_item(self.inner.id, position, callbacks);
        self.inner.cell.bind(view);
    }

    /// Identifier of the record
    #[must_use]
    pub fn id(&self) -> TodoId {
        self.inner.id
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> TodoItemState {
        self.inner.cell.snapshot()
    }

    /// Flip the completed flag.
    ///
    /// On success the new record and the whole collection are published on
    /// `todo:updated`.
    pub async fn toggle(&self) {
        let cell = &self.inner.cell;
        let completed = cell.set_state(|state| {
            state.loading = true;
            state.error = None;
            state.todo.completed
        });

        let result = async {
            let updated = self
                .inner
                .api
                .update(self.inner.id, TodoPatch::completed(!completed))
                .await?;
            cell.set_state(|state| {
                state.todo = updated.clone();
                state.loading = false;
            });
            let todos = self.inner.api.list().await?;
            Ok::<_, todo_pubsub_core::ApiError>((updated, todos))
        }
        .await;

        match result {
            Ok((todo, todos)) => {
                tracing::info!(id = %todo.id, completed = todo.completed, "Todo toggled");
                self.inner.bus.publish(&TodoEvent::Updated { todo, todos });
            }
            Err(error) => {
                tracing::warn!(id = %self.inner.id, %error, "Failed to update todo");
                cell.set_state(|state| {
                    state.loading = false;
                    state.error = Some(UPDATE_FAILED_ERROR.to_string());
                });
            }
        }
    }

    /// Delete the record after asking the injected [`Confirm`].
    ///
    /// Declining makes no store call. On success the identifier is
    /// published on `todo:deleted`; the list container then unmounts the row.
    pub async fn delete(&self) {
        if !self.inner.confirm.confirm(DELETE_PROMPT).await {
            tracing::debug!(id = %self.inner.id, "Delete declined");
            return;
        }

        let cell = &self.inner.cell;
        cell.set_state(|state| {
            state.loading = true;
            state.error = None;
        });

        match self.inner.api.delete(self.inner.id).await {
            Ok(_) => {
                tracing::info!(id = %self.inner.id, "Todo deleted");
                self.inner.bus.publish(&TodoEvent::Deleted {
                    todo_id: self.inner.id,
                });
            }
            Err(error) => {
                tracing::warn!(id = %self.inner.id, %error, "Failed to delete todo");
                cell.set_state(|state| {
                    state.loading = false;
                    state.error = Some(DELETE_FAILED_ERROR.to_string());
                });
            }
        }
    }
}

impl std::fmt::Debug for TodoItemContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoItemContainer")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
