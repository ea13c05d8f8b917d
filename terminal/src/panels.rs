//! The three panels a [`Screen`](crate::Screen) draws, and the views that
//! write into them.
//!
//! A view locks only its own panel, and only inside its own methods.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use todo_pubsub_components::{
    AddTodoCallbacks, AddTodoState, AddTodoView, HeaderState, HeaderView, ItemPosition,
    TodoItemCallbacks, TodoItemState, TodoItemView, TodoListState, TodoListView, View,
};
use todo_pubsub_core::TodoId;

/// Page title
pub const TITLE: &str = "Todo App";
/// Submit button label while idle
pub const ADD_LABEL: &str = "Add Todo";
/// Submit button label while a create is in flight
pub const ADDING_LABEL: &str = "Adding...";
/// Shown while the collection loads
pub const LOADING_NOTICE: &str = "Loading todos...";
/// Shown when the loaded collection is empty
pub const EMPTY_NOTICE: &str = "No todos yet. Add one above!";

const DATE_FORMAT: &str = "%b %-d, %Y";

pub(crate) fn lock<T>(panel: &Mutex<T>) -> MutexGuard<'_, T> {
    panel.lock().unwrap_or_else(PoisonError::into_inner)
}

fn format_date(created_at: &DateTime<Utc>) -> impl fmt::Display + '_ {
    created_at.format(DATE_FORMAT)
}

// ============================================================================
// Header
// ============================================================================

#[derive(Debug, Default)]
pub(crate) struct HeaderPanel {
    pub(crate) mounted: bool,
    pub(crate) state: HeaderState,
}

impl fmt::Display for HeaderPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.mounted {
            return Ok(());
        }
        writeln!(f, "{TITLE}")?;
        writeln!(
            f,
            "Total: {}  Completed: {}",
            self.state.total_todos, self.state.completed_todos
        )
    }
}

pub(crate) struct HeaderPanelView(pub(crate) Arc<Mutex<HeaderPanel>>);

impl View<HeaderState> for HeaderPanelView {
    fn update(&mut self, state: &HeaderState) {
        lock(&self.0).state = state.clone();
    }
}

impl HeaderView for HeaderPanelView {}

// ============================================================================
// Add-todo form
// ============================================================================

#[derive(Debug, Default)]
pub(crate) struct FormPanel {
    pub(crate) callbacks: Option<AddTodoCallbacks>,
    pub(crate) input: String,
    pub(crate) state: AddTodoState,
}

impl fmt::Display for FormPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.callbacks.is_none() {
            return Ok(());
        }
        let label = if self.state.loading { ADDING_LABEL } else { ADD_LABEL };
        writeln!(f, "> {}  [{label}]", self.input)?;
        if let Some(error) = &self.state.error {
            writeln!(f, "! {error}")?;
        }
        Ok(())
    }
}

pub(crate) struct FormPanelView(pub(crate) Arc<Mutex<FormPanel>>);

impl View<AddTodoState> for FormPanelView {
    fn update(&mut self, state: &AddTodoState) {
        lock(&self.0).state = state.clone();
    }
}

impl AddTodoView for FormPanelView {
    fn clear_input(&mut self) {
        lock(&self.0).input.clear();
    }
}

// ============================================================================
// List
// ============================================================================

#[derive(Debug)]
pub(crate) struct Row {
    pub(crate) id: TodoId,
    pub(crate) callbacks: TodoItemCallbacks,
    state: Option<TodoItemState>,
}

impl Row {
    /// An update or delete is in flight
    pub(crate) fn busy(&self) -> bool {
        self.state.as_ref().is_some_and(|state| state.loading)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(state) = &self.state else {
            return Ok(());
        };
        let mark = if state.todo.completed { 'x' } else { ' ' };
        write!(
            f,
            "[{mark}] {} ({})",
            state.todo.text,
            format_date(&state.todo.created_at)
        )?;
        if state.loading {
            write!(f, " ...")?;
        }
        if let Some(error) = &state.error {
            write!(f, "\n      ! {error}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub(crate) struct ListPanel {
    pub(crate) mounted: bool,
    pub(crate) state: TodoListState,
    pub(crate) rows: Vec<Row>,
}

impl fmt::Display for ListPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.mounted {
            return Ok(());
        }
        if self.state.loading {
            writeln!(f, "{LOADING_NOTICE}")?;
        }
        if let Some(error) = &self.state.error {
            writeln!(f, "! {error}")?;
        }
        if self.state.loading {
            return Ok(());
        }
        if self.state.todos.is_empty() {
            return writeln!(f, "{EMPTY_NOTICE}");
        }
        for (index, row) in self.rows.iter().enumerate() {
            writeln!(f, "{:>3}. {row}", index + 1)?;
        }
        Ok(())
    }
}

pub(crate) struct ListPanelView(pub(crate) Arc<Mutex<ListPanel>>);

impl View<TodoListState> for ListPanelView {
    fn update(&mut self, state: &TodoListState) {
        lock(&self.0).state = state.clone();
    }
}

impl TodoListView for ListPanelView {
    fn clear_items(&mut self) {
        lock(&self.0).rows.clear();
    }

    fn mount_item(
        &mut self,
        id: TodoId,
        position: ItemPosition,
        callbacks: TodoItemCallbacks,
    ) -> Box<dyn TodoItemView> {
        let row = Row {
            id,
            callbacks,
            state: None,
        };
        let mut panel = lock(&self.0);
        match position {
            ItemPosition::First => panel.rows.insert(0, row),
            ItemPosition::Last => panel.rows.push(row),
        }
        tracing::trace!(%id, rows = panel.rows.len(), "Row mounted");

        Box::new(RowView {
            id,
            panel: Arc::clone(&self.0),
        })
    }

    fn remove_item(&mut self, id: TodoId) {
        lock(&self.0).rows.retain(|row| row.id != id);
    }
}

struct RowView {
    id: TodoId,
    panel: Arc<Mutex<ListPanel>>,
}

impl View<TodoItemState> for RowView {
    fn update(&mut self, state: &TodoItemState) {
        let mut panel = lock(&self.panel);
        if let Some(row) = panel.rows.iter_mut().find(|row| row.id == self.id) {
            row.state = Some(state.clone());
        }
    }
}

impl TodoItemView for RowView {}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use todo_pubsub_components::ActionFuture;
    use todo_pubsub_core::Todo;

    fn noop() -> ActionFuture {
        Box::pin(async {})
    }

    fn todo(id: u64, text: &str, completed: bool) -> Todo {
        let created_at = DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut todo = Todo::new(TodoId::new(id), text.to_string(), created_at);
        todo.completed = completed;
        todo
    }

    #[test]
    fn row_shows_mark_text_and_date() {
        let mut row = Row {
            id: TodoId::new(1),
            callbacks: TodoItemCallbacks::new(noop, noop),
            state: Some(TodoItemState {
                todo: todo(1, "Buy milk", true),
                loading: false,
                error: None,
            }),
        };
        assert_eq!(row.to_string(), "[x] Buy milk (Jan 1, 2025)");

        row.state = Some(TodoItemState {
            todo: todo(1, "Buy milk", false),
            loading: true,
            error: Some("Failed to update todo".into()),
        });
        assert_eq!(
            row.to_string(),
            "[ ] Buy milk (Jan 1, 2025) ...\n      ! Failed to update todo"
        );
    }

    #[test]
    fn list_notices_follow_state() {
        let mut panel = ListPanel {
            mounted: true,
            ..ListPanel::default()
        };
        assert_eq!(panel.to_string(), format!("{LOADING_NOTICE}\n"));

        panel.state.loading = false;
        assert_eq!(panel.to_string(), format!("{EMPTY_NOTICE}\n"));

        panel.state.error = Some("Failed".into());
        assert_eq!(panel.to_string(), format!("! Failed\n{EMPTY_NOTICE}\n"));
    }

    #[test]
    fn unmounted_panels_draw_nothing() {
        assert_eq!(HeaderPanel::default().to_string(), "");
        assert_eq!(FormPanel::default().to_string(), "");
        assert_eq!(ListPanel::default().to_string(), "");
    }

    #[test]
    fn form_label_follows_loading() {
        let mut panel = FormPanel {
            callbacks: Some(AddTodoCallbacks::new(|_| noop())),
            input: "Buy milk".into(),
            state: AddTodoState::default(),
        };
        assert_eq!(panel.to_string(), format!("> Buy milk  [{ADD_LABEL}]\n"));

        panel.state.loading = true;
        assert!(panel.to_string().contains(ADDING_LABEL));
    }
}
