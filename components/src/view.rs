//! View and mount-point contracts.
//!
//! A view renders its fragment once, when a mount point creates it, and is
//! afterwards only told to [`View::update`] from a state snapshot. Views
//! never call the record store or the bus; user actions reach containers
//! through the callbacks handed to the mount point.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use todo_pubsub_core::TodoId;

use crate::add_todo::AddTodoState;
use crate::header::HeaderState;
use crate::todo_item::TodoItemState;
use crate::todo_list::TodoListState;

/// Future returned by a view callback; resolves when the container is done.
pub type ActionFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

type SubmitFn = Arc<dyn Fn(String) -> ActionFuture + Send + Sync>;
type ActionFn = Arc<dyn Fn() -> ActionFuture + Send + Sync>;

/// Re-renders from a state snapshot.
pub trait View<S>: Send {
    /// Bring the rendered fragment in line with `state`
    fn update(&mut self, state: &S);
}

/// Title and totals.
pub trait HeaderView: View<HeaderState> {}

/// Text input, submit button and inline error.
pub trait AddTodoView: View<AddTodoState> {
    /// Empty the text input after a successful submit
    fn clear_input(&mut self);
}

/// Where a newly mounted item goes in the list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemPosition {
    /// Before every other item
    First,
    /// After every other item
    Last,
}

/// The list frame: loading notice, error, empty notice and the items.
///
/// Single-item changes go through [`TodoListView::mount_item`] and
/// [`TodoListView::remove_item`] instead of a full re-render.
pub trait TodoListView: View<TodoListState> {
    /// Remove every item
    fn clear_items(&mut self);

    /// Create the slot for one item and render its view into it
    fn mount_item(
        &mut self,
        id: TodoId,
        position: ItemPosition,
        callbacks: TodoItemCallbacks,
    ) -> Box<dyn TodoItemView>;

    /// Remove the item with identifier `id`, if mounted
    fn remove_item(&mut self, id: TodoId);
}

/// One row: checkbox, text, date and delete button.
pub trait TodoItemView: View<TodoItemState> {}

/// Mount point for the header.
pub trait HeaderRoot: Send + Sync {
    /// Render the header fragment
    fn render(&self) -> Box<dyn HeaderView>;
}

/// Mount point for the add-todo form.
pub trait AddTodoRoot: Send + Sync {
    /// Render the form, wiring its submit action to `callbacks`
    fn render(&self, callbacks: AddTodoCallbacks) -> Box<dyn AddTodoView>;
}

/// Mount point for the todo list.
pub trait TodoListRoot: Send + Sync {
    /// Render the list frame
    fn render(&self) -> Box<dyn TodoListView>;
}

/// Actions the add-todo form can trigger.
#[derive(Clone)]
pub struct AddTodoCallbacks {
    on_submit: SubmitFn,
}

impl AddTodoCallbacks {
    /// Wrap the submit handler
    pub fn new<F>(on_submit: F) -> Self
    where
        F: Fn(String) -> ActionFuture + Send + Sync + 'static,
    {
        Self {
            on_submit: Arc::new(on_submit),
        }
    }

    /// The form was submitted with `text`
    #[must_use]
    pub fn submit(&self, text: impl Into<String>) -> ActionFuture {
        (self.on_submit)(text.into())
    }
}

impl std::fmt::Debug for AddTodoCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddTodoCallbacks").finish_non_exhaustive()
    }
}

/// Actions one item row can trigger.
#[derive(Clone)]
pub struct TodoItemCallbacks {
    on_toggle: ActionFn,
    on_delete: ActionFn,
}

impl TodoItemCallbacks {
    /// Wrap the toggle and delete handlers
    pub fn new<T, D>(on_toggle: T, on_delete: D) -> Self
    where
        T: Fn() -> ActionFuture + Send + Sync + 'static,
        D: Fn() -> ActionFuture + Send + Sync + 'static,
    {
        Self {
            on_toggle: Arc::new(on_toggle),
            on_delete: Arc::new(on_delete),
        }
    }

    /// The checkbox changed
    #[must_use]
    pub fn toggle(&self) -> ActionFuture {
        (self.on_toggle)()
    }

    /// The delete button was pressed
    #[must_use]
    pub fn delete(&self) -> ActionFuture {
        (self.on_delete)()
    }
}

impl std::fmt::Debug for TodoItemCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoItemCallbacks").finish_non_exhaustive()
    }
}
