//! The todo record and its validated patch.
//!
//! A record has exactly four fields and is persisted as a JSON object:
//!
//! ```json
//! { "id": 1700000000001, "text": "Buy milk", "completed": false, "createdAt": "2025-01-01T00:00:00Z" }
//! ```
//!
//! Only `text` and `completed` may change after creation, and only through
//! [`TodoPatch`], which rejects unknown fields and validates text.

use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of characters in a todo's text.
pub const MAX_TEXT_CHARS: usize = 100;

/// Unique identifier for a todo record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(u64);

impl TodoId {
    /// Wraps a raw identifier
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single todo record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Unique identifier
    pub id: TodoId,
    /// What needs to be done
    pub text: String,
    /// Whether the todo is done
    pub completed: bool,
    /// When the todo was created (epoch for blobs written without it)
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// Creates a new, not yet completed todo
    #[must_use]
    pub const fn new(id: TodoId, text: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            text,
            completed: false,
            created_at,
        }
    }
}

/// Checks that `text` is acceptable as a todo's text.
///
/// # Errors
///
/// - [`ValidationError::EmptyText`] when `text` is empty or only whitespace
/// - [`ValidationError::TextTooLong`] when `text` exceeds [`MAX_TEXT_CHARS`] characters
pub fn validate_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyText);
    }

    let actual = text.chars().count();
    if actual > MAX_TEXT_CHARS {
        return Err(ValidationError::TextTooLong {
            max: MAX_TEXT_CHARS,
            actual,
        });
    }

    Ok(())
}

/// The fields of a todo that an update may change.
///
/// Absent fields are left untouched. Deserializing a patch that names any
/// other field (including `id` or `createdAt`) fails.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TodoPatch {
    /// Replacement text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Replacement completed flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TodoPatch {
    /// A patch that only sets the completed flag
    #[must_use]
    pub const fn completed(completed: bool) -> Self {
        Self {
            text: None,
            completed: Some(completed),
        }
    }

    /// A patch that only replaces the text
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            completed: None,
        }
    }

    /// Returns true when the patch changes nothing
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.text.is_none() && self.completed.is_none()
    }

    /// Validates the patch without applying it.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] of the replacement text, if any.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.text {
            Some(text) => validate_text(text),
            None => Ok(()),
        }
    }

    /// Applies the patch to `todo`. Nothing is changed when validation fails.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] of the replacement text, if any.
    pub fn apply(&self, todo: &mut Todo) -> Result<(), ValidationError> {
        self.validate()?;

        if let Some(text) = &self.text {
            todo.text.clone_from(text);
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;

    fn sample() -> Todo {
        Todo::new(
            TodoId::new(1),
            "Buy milk".to_string(),
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        )
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "text": "Buy milk",
                "completed": false,
                "createdAt": "2025-01-01T00:00:00Z"
            })
        );
    }

    #[test]
    fn legacy_record_without_timestamp_loads() {
        let todo: Todo =
            serde_json::from_str(r#"{"id": 2, "text": "Second Todo", "completed": true}"#).unwrap();
        assert_eq!(todo.id, TodoId::new(2));
        assert!(todo.completed);
        assert_eq!(todo.created_at, DateTime::<Utc>::default());
    }

    #[test]
    fn validate_text_rejects_blank_and_long() {
        assert_eq!(validate_text("   \t"), Err(ValidationError::EmptyText));
        assert_eq!(
            validate_text(&"x".repeat(MAX_TEXT_CHARS + 1)),
            Err(ValidationError::TextTooLong {
                max: MAX_TEXT_CHARS,
                actual: MAX_TEXT_CHARS + 1
            })
        );
        assert!(validate_text(&"é".repeat(MAX_TEXT_CHARS)).is_ok());
    }

    #[test]
    fn patch_applies_only_given_fields() {
        let mut todo = sample();
        TodoPatch::completed(true).apply(&mut todo).unwrap();
        assert!(todo.completed);
        assert_eq!(todo.text, "Buy milk");

        TodoPatch::text("Buy oat milk").apply(&mut todo).unwrap();
        assert_eq!(todo.text, "Buy oat milk");
        assert!(todo.completed);
    }

    #[test]
    fn invalid_patch_leaves_todo_untouched() {
        let mut todo = sample();
        let patch = TodoPatch {
            text: Some(String::new()),
            completed: Some(true),
        };
        assert_eq!(patch.apply(&mut todo), Err(ValidationError::EmptyText));
        assert_eq!(todo, sample());
    }

    #[test]
    fn patch_rejects_unknown_fields() {
        let result: Result<TodoPatch, _> = serde_json::from_str(r#"{"completed": true, "id": 9}"#);
        assert!(result.is_err());

        let patch: TodoPatch = serde_json::from_str(r#"{"completed": true}"#).unwrap();
        assert_eq!(patch, TodoPatch::completed(true));
    }
}
