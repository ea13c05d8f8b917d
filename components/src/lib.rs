//! # Todo Pubsub Components
//!
//! State containers and the view contracts they render through.
//!
//! Each container owns a state record and one bound view. It changes its
//! state only through `set_state`, which re-renders immediately, and talks
//! to other containers only through the [`TodoBus`](todo_pubsub_core::TodoBus).
//!
//! | Container | Publishes | Subscribes |
//! |-----------|-----------|------------|
//! | [`HeaderContainer`] | - | every topic |
//! | [`AddTodoContainer`] | `todo:added` | - |
//! | [`TodoListContainer`] | `todos:loaded` | `todo:added`, `todo:deleted`, `todo:updated` |
//! | [`TodoItemContainer`] | `todo:updated`, `todo:deleted` | - |
//!
//! Containers are cheap handles: cloning shares the same state. Bus
//! callbacks hold weak references, so a dropped container stops reacting
//! even without [`dispose`](HeaderContainer::dispose).
//!
//! ## Mounting
//!
//! The bootstrap hands each container a mount point ([`HeaderRoot`],
//! [`AddTodoRoot`], [`TodoListRoot`]); item rows are mounted by the list
//! container through [`TodoListView::mount_item`]. Construct the header
//! first so it observes the initial `todos:loaded`.

pub mod add_todo;
mod cell;
pub mod confirm;
pub mod header;
pub mod todo_item;
pub mod todo_list;
pub mod view;

pub use add_todo::{AddTodoContainer, AddTodoState};
pub use confirm::{AutoConfirm, Confirm, ConfirmFuture};
pub use header::{HeaderContainer, HeaderState};
pub use todo_item::{TodoItemContainer, TodoItemState};
pub use todo_list::{TodoListContainer, TodoListState};
pub use view::{
    ActionFuture, AddTodoCallbacks, AddTodoRoot, AddTodoView, HeaderRoot, HeaderView,
    ItemPosition, TodoItemCallbacks, TodoItemView, TodoListRoot, TodoListView, View,
};
