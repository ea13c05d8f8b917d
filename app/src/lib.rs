//! # Todo Pubsub App
//!
//! Wires the record store, the bus, the containers and the terminal screen
//! into one application.
//!
//! [`App::bootstrap`] is the page load: it creates one bus and one screen,
//! then constructs and initializes the header, the add-todo form and the
//! list, in that order, so the header is subscribed before the list
//! publishes its first `todos:loaded`.
//!
//! ```ignore
//! let config = AppConfig::from_env();
//! let api = open_api(&config)?;
//! let app = App::bootstrap(api, Arc::new(AutoConfirm::YES)).await;
//!
//! app.execute("add Buy milk".parse()?).await?;
//! print!("{}", app.render());
//! ```

pub mod command;
pub mod config;
pub mod prompt;

pub use command::{Command, CommandError, HELP};
pub use config::{AppConfig, ConfirmPolicy, DEFAULT_LOG_FILTER};
pub use prompt::{PromptConfirm, SharedLines, SharedOutput, confirm_for};

use std::sync::Arc;
use todo_pubsub_components::{AddTodoContainer, Confirm, HeaderContainer, TodoListContainer};
use todo_pubsub_core::{TodoApi, TodoBus};
use todo_pubsub_storage::{FileStorage, MemoryStorage, StorageError, TodoApiClient};
use todo_pubsub_terminal::Screen;

/// Open the record store described by `config`.
///
/// # Errors
///
/// Returns [`StorageError`] when the storage directory cannot be created.
pub fn open_api(config: &AppConfig) -> Result<Arc<dyn TodoApi>, StorageError> {
    let api_config = config.api_config();
    match &config.storage_dir {
        Some(dir) => {
            let storage = FileStorage::open(dir)?;
            tracing::info!(dir = %storage.dir().display(), key = %api_config.storage_key, "Using file storage");
            Ok(Arc::new(TodoApiClient::new(storage, api_config)))
        }
        None => {
            tracing::info!(key = %api_config.storage_key, "Using in-memory storage");
            Ok(Arc::new(TodoApiClient::new(MemoryStorage::new(), api_config)))
        }
    }
}

/// What the REPL should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Redraw the screen
    Render,
    /// Print [`HELP`]
    Help,
    /// Leave the REPL
    Quit,
}

/// The running application.
#[derive(Debug)]
pub struct App {
    bus: TodoBus,
    screen: Screen,
    header: HeaderContainer,
    add_todo: AddTodoContainer,
    list: TodoListContainer,
}

impl App {
    /// Build and mount every container, then load the collection
    pub async fn bootstrap(api: Arc<dyn TodoApi>, confirm: Arc<dyn Confirm>) -> Self {
        let bus = TodoBus::new();
        let screen = Screen::new();

        let header = HeaderContainer::new(&bus);
        header.init(&screen.header_root());

        let add_todo = AddTodoContainer::new(Arc::clone(&api), bus.clone());
        add_todo.init(&screen.add_todo_root());

        let list = TodoListContainer::new(api, bus.clone(), confirm);
        list.init(&screen.todo_list_root()).await;

        tracing::info!(todos = list.todos().len(), "Application initialized");

        Self {
            bus,
            screen,
            header,
            add_todo,
            list,
        }
    }

    /// Run one command to completion.
    ///
    /// # Errors
    ///
    /// [`CommandError::NoSuchRow`] when a row command names a row that is
    /// not on screen, [`CommandError::RowBusy`] or [`CommandError::FormBusy`]
    /// when the control is disabled by an action still in flight.
    pub async fn execute(&self, command: Command) -> Result<Flow, CommandError> {
        tracing::debug!(?command, "Executing command");
        let action = match command {
            Command::Add(text) => Some(self.screen.submit(&text).ok_or(CommandError::FormBusy)?),
            Command::Toggle(row) => Some(
                self.screen
                    .toggle(row)
                    .ok_or_else(|| self.row_error(row))?,
            ),
            Command::Delete(row) => Some(
                self.screen
                    .delete(row)
                    .ok_or_else(|| self.row_error(row))?,
            ),
            Command::Reload => {
                self.list.load_todos().await;
                None
            }
            Command::Show => None,
            Command::Help => return Ok(Flow::Help),
            Command::Quit => return Ok(Flow::Quit),
        };

        if let Some(action) = action {
            action.await;
        }
        Ok(Flow::Render)
    }

    fn row_error(&self, row: usize) -> CommandError {
        if self.screen.row_busy(row) {
            CommandError::RowBusy(row)
        } else {
            CommandError::NoSuchRow(row)
        }
    }

    /// The page as text
    #[must_use]
    pub fn render(&self) -> String {
        self.screen.render()
    }

    /// The screen the containers render into
    #[must_use]
    pub const fn screen(&self) -> &Screen {
        &self.screen
    }

    /// The bus shared by every container
    #[must_use]
    pub const fn bus(&self) -> &TodoBus {
        &self.bus
    }

    /// The header container
    #[must_use]
    pub const fn header(&self) -> &HeaderContainer {
        &self.header
    }

    /// The add-todo container
    #[must_use]
    pub const fn add_todo(&self) -> &AddTodoContainer {
        &self.add_todo
    }

    /// The list container
    #[must_use]
    pub const fn list(&self) -> &TodoListContainer {
        &self.list
    }

    /// Unsubscribe every container from the bus
    pub fn dispose(&self) {
        self.header.dispose();
        self.list.dispose();
    }
}
