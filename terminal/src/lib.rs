//! # Todo Pubsub Terminal
//!
//! Plain-text rendering of the todo page.
//!
//! A [`Screen`] owns one panel per mount point. Containers render into the
//! panels through the views the mount points hand out; [`Screen::render`]
//! draws all three panels, top to bottom, as one string.
//!
//! ```text
//! Todo App
//! Total: 2  Completed: 1
//! >   [Add Todo]
//!   1. [ ] Walk the dog (Jan 1, 2025)
//!   2. [x] Buy milk (Jan 1, 2025)
//! ```
//!
//! User actions go the other way: [`Screen::submit`], [`Screen::toggle`] and
//! [`Screen::delete`] invoke the callbacks the containers registered and
//! return the future that completes the action. Controls are disabled while
//! their container is loading: the form during a create, a row during its
//! update or delete.

mod panels;

pub use panels::{ADD_LABEL, ADDING_LABEL, EMPTY_NOTICE, LOADING_NOTICE, TITLE};

use panels::{
    FormPanel, FormPanelView, HeaderPanel, HeaderPanelView, ListPanel, ListPanelView, lock,
};
use std::sync::{Arc, Mutex};
use todo_pubsub_components::{
    ActionFuture, AddTodoCallbacks, AddTodoRoot, AddTodoView, HeaderRoot, HeaderView,
    TodoItemCallbacks, TodoListRoot, TodoListView,
};
use todo_pubsub_core::TodoId;

#[derive(Default)]
struct Panels {
    header: Arc<Mutex<HeaderPanel>>,
    form: Arc<Mutex<FormPanel>>,
    list: Arc<Mutex<ListPanel>>,
}

/// The whole page as text.
///
/// Clones share the same panels.
#[derive(Clone, Default)]
pub struct Screen {
    panels: Arc<Panels>,
}

impl Screen {
    /// An empty screen; nothing is drawn until a container mounts
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount point for the header
    #[must_use]
    pub fn header_root(&self) -> HeaderMount {
        HeaderMount(Arc::clone(&self.panels.header))
    }

    /// Mount point for the add-todo form
    #[must_use]
    pub fn add_todo_root(&self) -> AddTodoMount {
        AddTodoMount(Arc::clone(&self.panels.form))
    }

    /// Mount point for the todo list
    #[must_use]
    pub fn todo_list_root(&self) -> TodoListMount {
        TodoListMount(Arc::clone(&self.panels.list))
    }

    /// Draw every mounted panel
    #[must_use]
    pub fn render(&self) -> String {
        // One panel locked at a time
        let header = lock(&self.panels.header).to_string();
        let form = lock(&self.panels.form).to_string();
        let list = lock(&self.panels.list).to_string();
        format!("{header}{form}{list}")
    }

    /// Type `text` into the form and submit it.
    ///
    /// `None` when no form is mounted or a create is still in flight.
    #[must_use]
    pub fn submit(&self, text: &str) -> Option<ActionFuture> {
        let callbacks = {
            let mut form = lock(&self.panels.form);
            if form.state.loading {
                tracing::debug!("Form busy, submit ignored");
                return None;
            }
            let callbacks = form.callbacks.clone()?;
            form.input = text.to_string();
            callbacks
        };
        Some(callbacks.submit(text))
    }

    /// Click the checkbox of row `row` (1-based).
    ///
    /// `None` when there is no such row or the row is busy.
    #[must_use]
    pub fn toggle(&self, row: usize) -> Option<ActionFuture> {
        self.row_callbacks(row).map(|callbacks| callbacks.toggle())
    }

    /// Click the delete button of row `row` (1-based).
    ///
    /// `None` when there is no such row or the row is busy.
    #[must_use]
    pub fn delete(&self, row: usize) -> Option<ActionFuture> {
        self.row_callbacks(row).map(|callbacks| callbacks.delete())
    }

    /// Number of mounted rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        lock(&self.panels.list).rows.len()
    }

    /// Whether row `row` (1-based) has an update or delete in flight
    #[must_use]
    pub fn row_busy(&self, row: usize) -> bool {
        let list = lock(&self.panels.list);
        row.checked_sub(1)
            .and_then(|index| list.rows.get(index))
            .is_some_and(panels::Row::busy)
    }

    /// Identifier of the record shown in row `row` (1-based)
    #[must_use]
    pub fn row_id(&self, row: usize) -> Option<TodoId> {
        let list = lock(&self.panels.list);
        row.checked_sub(1)
            .and_then(|index| list.rows.get(index))
            .map(|row| row.id)
    }

    fn row_callbacks(&self, row: usize) -> Option<TodoItemCallbacks> {
        let list = lock(&self.panels.list);
        let Some(found) = row.checked_sub(1).and_then(|index| list.rows.get(index)) else {
            tracing::debug!(row, rows = list.rows.len(), "No such row");
            return None;
        };
        if found.busy() {
            tracing::debug!(row, id = %found.id, "Row busy, action ignored");
            return None;
        }
        Some(found.callbacks.clone())
    }
}

impl std::fmt::Debug for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screen")
            .field("rows", &self.row_count())
            .finish_non_exhaustive()
    }
}

/// Where the header renders.
#[derive(Clone, Debug)]
pub struct HeaderMount(Arc<Mutex<HeaderPanel>>);

impl HeaderRoot for HeaderMount {
    fn render(&self) -> Box<dyn HeaderView> {
        lock(&self.0).mounted = true;
        Box::new(HeaderPanelView(Arc::clone(&self.0)))
    }
}

/// Where the add-todo form renders.
#[derive(Clone, Debug)]
pub struct AddTodoMount(Arc<Mutex<FormPanel>>);

impl AddTodoRoot for AddTodoMount {
    fn render(&self, callbacks: AddTodoCallbacks) -> Box<dyn AddTodoView> {
        let mut form = lock(&self.0);
        form.callbacks = Some(callbacks);
        form.input.clear();
        Box::new(FormPanelView(Arc::clone(&self.0)))
    }
}

/// Where the todo list renders.
#[derive(Clone, Debug)]
pub struct TodoListMount(Arc<Mutex<ListPanel>>);

impl TodoListRoot for TodoListMount {
    fn render(&self) -> Box<dyn TodoListView> {
        let mut list = lock(&self.0);
        list.mounted = true;
        list.rows.clear();
        Box::new(ListPanelView(Arc::clone(&self.0)))
    }
}
