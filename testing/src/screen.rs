//! Mount points that record what containers render.
//!
//! [`RecordingScreen`] implements every root trait. Each view it hands out
//! writes into one shared record, so a test can drive the user actions a
//! real view would trigger and read back what would be on screen.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use todo_pubsub_components::{
    ActionFuture, AddTodoCallbacks, AddTodoRoot, AddTodoState, AddTodoView, HeaderRoot,
    HeaderState, HeaderView, ItemPosition, TodoItemCallbacks, TodoItemState, TodoItemView,
    TodoListRoot, TodoListState, TodoListView, View,
};
use todo_pubsub_core::TodoId;

struct RecordedItem {
    id: TodoId,
    state: Option<TodoItemState>,
    callbacks: TodoItemCallbacks,
}

#[derive(Default)]
struct Recorded {
    header: Vec<HeaderState>,
    add_todo: Vec<AddTodoState>,
    add_callbacks: Option<AddTodoCallbacks>,
    input_clears: usize,
    list: Vec<TodoListState>,
    items: Vec<RecordedItem>,
}

type Shared = Arc<Mutex<Recorded>>;

fn lock(shared: &Shared) -> MutexGuard<'_, Recorded> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared record behind every view it renders.
///
/// Clones observe the same record.
#[derive(Clone, Default)]
pub struct RecordingScreen {
    shared: Shared,
}

impl RecordingScreen {
    /// An empty screen
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last header render
    #[must_use]
    pub fn header(&self) -> Option<HeaderState> {
        lock(&self.shared).header.last().cloned()
    }

    /// Every header render, oldest first
    #[must_use]
    pub fn header_history(&self) -> Vec<HeaderState> {
        lock(&self.shared).header.clone()
    }

    /// Last add-todo form render
    #[must_use]
    pub fn add_todo(&self) -> Option<AddTodoState> {
        lock(&self.shared).add_todo.last().cloned()
    }

    /// Every add-todo form render, oldest first
    #[must_use]
    pub fn add_todo_history(&self) -> Vec<AddTodoState> {
        lock(&self.shared).add_todo.clone()
    }

    /// How many times the form's input was cleared
    #[must_use]
    pub fn input_clears(&self) -> usize {
        lock(&self.shared).input_clears
    }

    /// Last list frame render
    #[must_use]
    pub fn list(&self) -> Option<TodoListState> {
        lock(&self.shared).list.last().cloned()
    }

    /// Every list frame render, oldest first
    #[must_use]
    pub fn list_history(&self) -> Vec<TodoListState> {
        lock(&self.shared).list.clone()
    }

    /// Identifiers of the mounted rows, top to bottom
    #[must_use]
    pub fn item_ids(&self) -> Vec<TodoId> {
        lock(&self.shared).items.iter().map(|item| item.id).collect()
    }

    /// Last render of the row for `id`
    #[must_use]
    pub fn item(&self, id: TodoId) -> Option<TodoItemState> {
        lock(&self.shared)
            .items
            .iter()
            .find(|item| item.id == id)
            .and_then(|item| item.state.clone())
    }

    /// Submit the form, as a user pressing "Add Todo".
    ///
    /// `None` when no form is mounted or the button is disabled by a create
    /// in flight.
    #[must_use]
    pub fn submit(&self, text: &str) -> Option<ActionFuture> {
        let callbacks = {
            let recorded = lock(&self.shared);
            if recorded.add_todo.last().is_some_and(|state| state.loading) {
                return None;
            }
            recorded.add_callbacks.clone()?
        };
        Some(callbacks.submit(text))
    }

    /// Click the checkbox of the row for `id`.
    ///
    /// `None` when the row is missing or busy.
    #[must_use]
    pub fn toggle(&self, id: TodoId) -> Option<ActionFuture> {
        self.item_callbacks(id).map(|callbacks| callbacks.toggle())
    }

    /// Click the delete button of the row for `id`.
    ///
    /// `None` when the row is missing or busy.
    #[must_use]
    pub fn delete(&self, id: TodoId) -> Option<ActionFuture> {
        self.item_callbacks(id).map(|callbacks| callbacks.delete())
    }

    // Cloned out so the record is unlocked while the action runs
    fn item_callbacks(&self, id: TodoId) -> Option<TodoItemCallbacks> {
        lock(&self.shared)
            .items
            .iter()
            .find(|item| item.id == id)
            .filter(|item| !item.state.as_ref().is_some_and(|state| state.loading))
            .map(|item| item.callbacks.clone())
    }
}

impl std::fmt::Debug for RecordingScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingScreen")
            .field("items", &self.item_ids())
            .finish_non_exhaustive()
    }
}

struct HeaderPanel(Shared);

impl View<HeaderState> for HeaderPanel {
    fn update(&mut self, state: &HeaderState) {
        lock(&self.0).header.push(state.clone());
    }
}

impl HeaderView for HeaderPanel {}

impl HeaderRoot for RecordingScreen {
    fn render(&self) -> Box<dyn HeaderView> {
        Box::new(HeaderPanel(Arc::clone(&self.shared)))
    }
}

struct AddTodoPanel(Shared);

impl View<AddTodoState> for AddTodoPanel {
    fn update(&mut self, state: &AddTodoState) {
        lock(&self.0).add_todo.push(state.clone());
    }
}

impl AddTodoView for AddTodoPanel {
    fn clear_input(&mut self) {
        lock(&self.0).input_clears += 1;
    }
}

impl AddTodoRoot for RecordingScreen {
    fn render(&self, callbacks: AddTodoCallbacks) -> Box<dyn AddTodoView> {
        lock(&self.shared).add_callbacks = Some(callbacks);
        Box::new(AddTodoPanel(Arc::clone(&self.shared)))
    }
}

struct ListPanel(Shared);

impl View<TodoListState> for ListPanel {
    fn update(&mut self, state: &TodoListState) {
        lock(&self.0).list.push(state.clone());
    }
}

impl TodoListView for ListPanel {
    fn clear_items(&mut self) {
        lock(&self.0).items.clear();
    }

    fn mount_item(
        &mut self,
        id: TodoId,
        position: ItemPosition,
        callbacks: TodoItemCallbacks,
    ) -> Box<dyn TodoItemView> {
        let item = RecordedItem {
            id,
            state: None,
            callbacks,
        };
        let mut recorded = lock(&self.0);
        match position {
            ItemPosition::First => recorded.items.insert(0, item),
            ItemPosition::Last => recorded.items.push(item),
        }
        Box::new(ItemPanel {
            id,
            shared: Arc::clone(&self.0),
        })
    }

    fn remove_item(&mut self, id: TodoId) {
        lock(&self.0).items.retain(|item| item.id != id);
    }
}

impl TodoListRoot for RecordingScreen {
    fn render(&self) -> Box<dyn TodoListView> {
        Box::new(ListPanel(Arc::clone(&self.shared)))
    }
}

struct ItemPanel {
    id: TodoId,
    shared: Shared,
}

impl View<TodoItemState> for ItemPanel {
    fn update(&mut self, state: &TodoItemState) {
        // Rows already unmounted ignore late renders
        if let Some(item) = lock(&self.shared)
            .items
            .iter_mut()
            .find(|item| item.id == self.id)
        {
            item.state = Some(state.clone());
        }
    }
}

impl TodoItemView for ItemPanel {}
