//! Add-todo container: validates input and creates records.

use std::sync::{Arc, Weak};
use todo_pubsub_core::{MAX_TEXT_CHARS, TodoApi, TodoBus, TodoEvent, ValidationError, validate_text};

use crate::cell::StateCell;
use crate::view::{ActionFuture, AddTodoCallbacks, AddTodoRoot, AddTodoView};

/// Shown when the submitted text is blank
pub const EMPTY_TEXT_ERROR: &str = "Please enter a todo";

/// Shown when the record store rejects the create
pub const CREATE_FAILED_ERROR: &str = "Failed to add todo. Please try again.";

/// Shown when the submitted text is longer than [`MAX_TEXT_CHARS`]
#[must_use]
pub fn text_too_long_error() -> String {
    format!("Todo must be {MAX_TEXT_CHARS} characters or fewer")
}

/// What the form shows
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddTodoState {
    /// A create is in flight
    pub loading: bool,
    /// Inline error message
    pub error: Option<String>,
}

struct Inner {
    api: Arc<dyn TodoApi>,
    bus: TodoBus,
    cell: StateCell<AddTodoState, dyn AddTodoView>,
}

/// Turns form submissions into created records and `todo:added` events.
#[derive(Clone)]
pub struct AddTodoContainer {
    inner: Arc<Inner>,
}

impl AddTodoContainer {
    /// Create the container
    #[must_use]
    pub fn new(api: Arc<dyn TodoApi>, bus: TodoBus) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                bus,
                cell: StateCell::new("add-todo", AddTodoState::default()),
            }),
        }
    }

    /// Render into `root`, wiring the form's submit to [`Self::submit`]
    pub fn init(&self, root: &dyn AddTodoRoot) {
        let container: Weak<Inner> = Arc::downgrade(&self.inner);
        let callbacks = AddTodoCallbacks::new(move |text| {
            let container = container.clone();
            Box::pin(async move {
                if let Some(inner) = container.upgrade() {
                    AddTodoContainer { inner }.submit(&text).await;
                }
            }) as ActionFuture
        });

        self.inner.cell.bind(root.render(callbacks));
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> AddTodoState {
        self.inner.cell.snapshot()
    }

    /// Handle a form submission.
    ///
    /// Invalid text only sets an error; nothing reaches the record store.
    pub async fn submit(&self, text: &str) {
        let cell = &self.inner.cell;

        if let Err(error) = validate_text(text) {
            let message = match error {
                ValidationError::EmptyText => EMPTY_TEXT_ERROR.to_string(),
                ValidationError::TextTooLong { .. } => text_too_long_error(),
            };
            cell.set_state(|state| state.error = Some(message));
            return;
        }

        cell.set_state(|state| {
            state.loading = true;
            state.error = None;
        });

        match self.inner.api.create(text).await {
            Ok(todo) => {
                tracing::info!(id = %todo.id, "Todo added");
                self.inner.bus.publish(&TodoEvent::Added { todo });
                cell.with_view(|view| view.clear_input());
                cell.set_state(|state| state.loading = false);
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to add todo");
                cell.set_state(|state| {
                    state.loading = false;
                    state.error = Some(CREATE_FAILED_ERROR.to_string());
                });
            }
        }
    }
}

impl std::fmt::Debug for AddTodoContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddTodoContainer")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
