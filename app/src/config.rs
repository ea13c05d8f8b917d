//! Configuration management for the todo-pubsub binary.
//!
//! Loads configuration from environment variables with sensible defaults.
//! A `.env` file in the working directory is honored (loaded by `main`).
//!
//! | Variable | Default |
//! |----------|---------|
//! | `TODO_STORAGE_DIR` | unset: in-memory storage |
//! | `TODO_STORAGE_KEY` | `todos` |
//! | `TODO_READ_LATENCY_MS` | `300` |
//! | `TODO_WRITE_LATENCY_MS` | `200` |
//! | `TODO_CONFIRM_DELETE` | `prompt` (`prompt`, `always`, `never`) |
//! | `TODO_LOG` | `warn,todo_pubsub=info` |

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use todo_pubsub_storage::{ApiConfig, DEFAULT_STORAGE_KEY};

/// Tracing filter used when `TODO_LOG` is unset or invalid
pub const DEFAULT_LOG_FILTER: &str = "warn,todo_pubsub=info";

/// How a delete is confirmed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmPolicy {
    /// Ask on the terminal
    #[default]
    Prompt,
    /// Delete without asking
    Always,
    /// Never delete
    Never,
}

impl FromStr for ConfirmPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prompt" => Ok(Self::Prompt),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            other => Err(format!("unknown confirm policy: {other}")),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory for file-backed storage; in-memory when `None`
    pub storage_dir: Option<PathBuf>,
    /// Blob key the collection is stored under
    pub storage_key: String,
    /// Simulated latency of `list`, in milliseconds
    pub read_latency_ms: u64,
    /// Simulated latency of `create`, `update` and `delete`, in milliseconds
    pub write_latency_ms: u64,
    /// How deletes are confirmed
    pub confirm_delete: ConfirmPolicy,
    /// `tracing` filter directives
    pub log_filter: String,
}

impl AppConfig {
    /// Load configuration from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from `lookup`, which maps a variable name to its value.
    ///
    /// Unparseable values fall back to their defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            storage_dir: lookup("TODO_STORAGE_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            storage_key: lookup("TODO_STORAGE_KEY")
                .filter(|key| !key.trim().is_empty())
                .unwrap_or(defaults.storage_key),
            read_latency_ms: lookup("TODO_READ_LATENCY_MS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.read_latency_ms),
            write_latency_ms: lookup("TODO_WRITE_LATENCY_MS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.write_latency_ms),
            confirm_delete: lookup("TODO_CONFIRM_DELETE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.confirm_delete),
            log_filter: lookup("TODO_LOG").unwrap_or(defaults.log_filter),
        }
    }

    /// Record store settings derived from this configuration
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(
            self.storage_key.clone(),
            Duration::from_millis(self.read_latency_ms),
            Duration::from_millis(self.write_latency_ms),
        )
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_dir: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            read_latency_ms: 300,
            write_latency_ms: 200,
            confirm_delete: ConfirmPolicy::Prompt,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}
