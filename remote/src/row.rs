//! Wire types for the `todos` table.
//!
//! Field names match the table columns exactly; the store assigns `id` and
//! `created_at` on insert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A row of the `todos` table as returned by the store
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoRow {
    /// Server-generated unique key
    pub id: String,
    /// Server-generated creation timestamp
    pub created_at: DateTime<Utc>,
    /// Required short label
    pub text: String,
    /// Rich-text HTML fragment, possibly empty
    #[serde(default)]
    pub content: String,
    /// Completion flag
    #[serde(default)]
    pub completed: bool,
    /// Owning user; nullable and unused by this client
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Insert payload; omitted columns take their table defaults
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTodoRow {
    /// Short label
    pub text: String,
    /// Rich-text HTML fragment
    pub content: String,
    /// Completion flag
    pub completed: bool,
}

impl NewTodoRow {
    /// An incomplete todo with the given label and body
    #[must_use]
    pub fn new(text: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            content: content.into(),
            completed: false,
        }
    }
}

/// Update payload; only the present fields are written
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPatch {
    /// New label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// New body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// New completion flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TodoPatch {
    /// Patch that only sets the completion flag
    #[must_use]
    pub const fn completed(completed: bool) -> Self {
        Self {
            text: None,
            content: None,
            completed: Some(completed),
        }
    }

    /// Patch that replaces label and body
    #[must_use]
    pub fn content(text: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            content: Some(content.into()),
            completed: None,
        }
    }

    /// Returns `true` if the patch writes nothing
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.text.is_none() && self.content.is_none() && self.completed.is_none()
    }

    /// Applies the present fields to `row`
    pub fn apply(&self, row: &mut TodoRow) {
        if let Some(text) = &self.text {
            row.text.clone_from(text);
        }
        if let Some(content) = &self.content {
            row.content.clone_from(content);
        }
        if let Some(completed) = self.completed {
            row.completed = completed;
        }
    }
}

/// Sortable columns
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderColumn {
    /// `created_at`
    CreatedAt,
    /// `text`
    Text,
}

impl OrderColumn {
    /// Column name as it appears in the table
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Text => "text",
        }
    }
}

/// Ordering for `select_all`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderBy {
    /// Column to sort on
    pub column: OrderColumn,
    /// Ascending when `true`
    pub ascending: bool,
}

impl OrderBy {
    /// Newest first; the order the list is displayed in
    #[must_use]
    pub const fn created_at_desc() -> Self {
        Self {
            column: OrderColumn::CreatedAt,
            ascending: false,
        }
    }
}

impl Default for OrderBy {
    fn default() -> Self {
        Self::created_at_desc()
    }
}

/// Renders the PostgREST `order` parameter, e.g. `created_at.desc`
impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = if self.ascending { "asc" } else { "desc" };
        write!(f, "{}.{direction}", self.column.as_str())
    }
}
