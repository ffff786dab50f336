//! Domain types for the synchronized todo list.

use crate::error::RepositoryError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use todo_sync_remote::TodoRow;

/// Identifier assigned by the remote store; opaque to the client
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// Wraps a store-assigned id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as sent to the store
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TodoId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TodoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier, immutable once assigned
    pub id: TodoId,
    /// Short label
    pub text: String,
    /// Rich-text HTML fragment, possibly empty
    pub content: String,
    /// Whether the todo is done
    pub completed: bool,
    /// When the store created it
    pub created_at: DateTime<Utc>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Self {
            id: TodoId(row.id),
            text: row.text,
            content: row.content,
            completed: row.completed,
            created_at: row.created_at,
        }
    }
}

/// Lifecycle of the list view
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// Not mounted yet
    #[default]
    Idle,
    /// Showing the list and listening for changes
    Mounted,
    /// Torn down; completions are ignored from here on
    Unmounted,
}

/// State of the synchronized list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoState {
    /// Todos in display order
    pub items: Vec<Todo>,
    /// `true` until the first fetch after mount settles
    pub loading: bool,
    /// Where the view is in its lifecycle
    pub phase: Phase,
}

impl TodoState {
    /// Initial state: empty and loading
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            loading: true,
            phase: Phase::Idle,
        }
    }

    /// A mounted list that has finished loading `items`
    #[must_use]
    pub const fn mounted(items: Vec<Todo>) -> Self {
        Self {
            items,
            loading: false,
            phase: Phase::Mounted,
        }
    }

    /// Returns `true` while mounted
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.phase == Phase::Mounted
    }

    /// Returns a todo by ID
    #[must_use]
    pub fn get(&self, id: &TodoId) -> Option<&Todo> {
        self.items.iter().find(|todo| &todo.id == id)
    }

    /// Mutable access to a todo by ID
    pub fn get_mut(&mut self, id: &TodoId) -> Option<&mut Todo> {
        self.items.iter_mut().find(|todo| &todo.id == id)
    }

    /// Number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|todo| todo.completed).count()
    }
}

impl Default for TodoState {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a fetch was started
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOrigin {
    /// The initial fetch on mount
    Mount,
    /// A refetch after a change notification
    ChangeNotification,
}

/// Everything that can happen to the list
///
/// Intents come from the user or the change feed; completions are fed back
/// by effects once a repository call returns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    // ========== Intents ==========
    /// The view appeared: fetch and start listening
    Mount,

    /// The view went away: stop listening
    Unmount,

    /// The change feed reported a change somewhere in the table
    ChangeNotified,

    /// Create a todo
    Add {
        /// Label, trimmed before submission
        text: String,
        /// HTML body
        content: String,
    },

    /// Flip the completion flag of a todo
    Toggle {
        /// Target todo
        id: TodoId,
    },

    /// Delete a todo
    Remove {
        /// Target todo
        id: TodoId,
    },

    /// Replace the label and body of a todo
    Edit {
        /// Target todo
        id: TodoId,
        /// New label
        text: String,
        /// New HTML body
        content: String,
    },

    // ========== Completions ==========
    /// `list_all` returned
    Fetched {
        /// What triggered the fetch
        origin: FetchOrigin,
        /// Full snapshot or failure
        result: Result<Vec<Todo>, RepositoryError>,
    },

    /// `create` returned
    Created {
        /// Stored row, `None` if the store returned none
        result: Result<Option<Todo>, RepositoryError>,
    },

    /// `set_completed` returned
    Toggled {
        /// Target todo
        id: TodoId,
        /// Value that was sent
        completed: bool,
        /// Outcome
        result: Result<(), RepositoryError>,
    },

    /// `delete` returned
    Removed {
        /// Target todo
        id: TodoId,
        /// Outcome
        result: Result<(), RepositoryError>,
    },

    /// `update_content` returned
    Edited {
        /// Target todo
        id: TodoId,
        /// Label that was sent
        text: String,
        /// Body that was sent
        content: String,
        /// Outcome
        result: Result<(), RepositoryError>,
    },
}

impl TodoAction {
    /// Returns `true` for actions fed back by effects
    #[must_use]
    pub const fn is_completion(&self) -> bool {
        matches!(
            self,
            Self::Fetched { .. }
                | Self::Created { .. }
                | Self::Toggled { .. }
                | Self::Removed { .. }
                | Self::Edited { .. }
        )
    }

    /// Returns `true` for a completed fetch, successful or not
    #[must_use]
    pub const fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetched { .. })
    }
}
