//! REPL command parsing.

use std::str::FromStr;
use thiserror::Error;

/// One-line summary of every command, printed by `help`
pub const HELP: &str = "\
Commands:
  add <text>    add a todo
  toggle <n>    toggle row n
  delete <n>    delete row n
  reload        reload the list from storage
  show          redraw the screen
  help          show this help
  quit          exit";

/// A parsed REPL line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Submit the add-todo form; the text may be blank
    Add(String),
    /// Click the checkbox of a row (1-based)
    Toggle(usize),
    /// Click the delete button of a row (1-based)
    Delete(usize),
    /// Reload the collection
    Reload,
    /// Redraw the screen
    Show,
    /// Print [`HELP`]
    Help,
    /// Leave the REPL
    Quit,
}

/// Why a line could not be parsed or run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Blank line
    #[error("empty command")]
    Empty,

    /// First word is not a command
    #[error("unknown command: {0} (type `help`)")]
    Unknown(String),

    /// A row command without a usable row number
    #[error("usage: {command} <n>")]
    MissingRow {
        /// The command that needs the row
        command: &'static str,
    },

    /// The row number does not match a mounted row
    #[error("no todo at row {0}")]
    NoSuchRow(usize),

    /// The row is disabled while its update or delete is in flight
    #[error("todo at row {0} is busy, try again")]
    RowBusy(usize),

    /// The form is disabled while a create is in flight
    #[error("still adding the previous todo, try again")]
    FormBusy,
}

fn row(command: &'static str, argument: &str) -> Result<usize, CommandError> {
    argument
        .parse()
        .map_err(|_| CommandError::MissingRow { command })
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        match word.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "add" | "a" => Ok(Self::Add(rest.to_string())),
            "toggle" | "t" => row("toggle", rest).map(Self::Toggle),
            "delete" | "d" => row("delete", rest).map(Self::Delete),
            "reload" | "r" => Ok(Self::Reload),
            "show" | "s" | "ls" => Ok(Self::Show),
            "help" | "h" | "?" => Ok(Self::Help),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
