//! Repository facade over the remote `todos` table.
//!
//! Turns each verb into exactly one remote call and normalizes the outcome
//! into `Result<_, RepositoryError>` tagged with what failed. Nothing here
//! validates input or retries; the controller decides what to call.

use crate::error::{ErrorKind, RepositoryError};
use crate::types::{Todo, TodoId};
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use todo_sync_remote::{
    ChangeFeed, ChangeSubscription, NewTodoRow, OrderBy, TodoPatch, TodoTable,
};

/// Handle to the remote store, constructed once and injected
#[derive(Clone)]
pub struct TodoRepository {
    table: Arc<dyn TodoTable>,
    feed: Arc<dyn ChangeFeed>,
}

impl TodoRepository {
    /// Builds a repository from separate table and feed clients
    #[must_use]
    pub fn new(table: Arc<dyn TodoTable>, feed: Arc<dyn ChangeFeed>) -> Self {
        Self { table, feed }
    }

    /// Builds a repository from one client serving both roles
    #[must_use]
    pub fn from_remote<R>(remote: Arc<R>) -> Self
    where
        R: TodoTable + ChangeFeed + 'static,
    {
        Self {
            table: Arc::clone(&remote) as Arc<dyn TodoTable>,
            feed: remote,
        }
    }

    /// Every todo, newest first
    ///
    /// A store answer without data is an empty list, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Fetch`] if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Todo>, RepositoryError> {
        match self.table.select_all(OrderBy::created_at_desc()).await {
            Ok(rows) => {
                let todos: Vec<Todo> = rows.unwrap_or_default().into_iter().map(Todo::from).collect();
                tracing::debug!(count = todos.len(), "Listed todos");
                Ok(todos)
            },
            Err(error) => {
                tracing::debug!(%error, "List todos failed");
                Err(RepositoryError::new(ErrorKind::Fetch, error))
            },
        }
    }

    /// Inserts an incomplete todo and returns it as stored
    ///
    /// `Ok(None)` when the store reports success but returns no row.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Insert`] if the store rejects the write.
    pub async fn create(&self, text: &str, content: &str) -> Result<Option<Todo>, RepositoryError> {
        match self.table.insert(vec![NewTodoRow::new(text, content)]).await {
            Ok(rows) => {
                let created = rows.into_iter().next().map(Todo::from);
                tracing::debug!(id = ?created.as_ref().map(|todo| todo.id.as_str()), "Created todo");
                Ok(created)
            },
            Err(error) => {
                tracing::debug!(%error, "Create todo failed");
                Err(RepositoryError::new(ErrorKind::Insert, error))
            },
        }
    }

    /// Sets the completion flag of the todo with `id`
    ///
    /// An unknown id is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Update`] if the update fails.
    pub async fn set_completed(&self, id: &TodoId, completed: bool) -> Result<(), RepositoryError> {
        self.update(id, TodoPatch::completed(completed)).await
    }

    /// Replaces label and body of the todo with `id`
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Update`] if the update fails.
    pub async fn update_content(&self, id: &TodoId, text: &str, content: &str) -> Result<(), RepositoryError> {
        self.update(id, TodoPatch::content(text, content)).await
    }

    async fn update(&self, id: &TodoId, patch: TodoPatch) -> Result<(), RepositoryError> {
        self.table.update(id.as_str(), patch).await.map_err(|error| {
            tracing::debug!(%id, %error, "Update todo failed");
            RepositoryError::new(ErrorKind::Update, error)
        })
    }

    /// Deletes the todo with `id`
    ///
    /// An unknown id is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Delete`] if the delete fails.
    pub async fn delete(&self, id: &TodoId) -> Result<(), RepositoryError> {
        self.table.delete(id.as_str()).await.map_err(|error| {
            tracing::debug!(%id, %error, "Delete todo failed");
            RepositoryError::new(ErrorKind::Delete, error)
        })
    }

    /// Registers for every insert, update and delete on the table
    ///
    /// Registration is complete when this returns.
    #[must_use]
    pub fn subscribe_to_changes(&self) -> Subscription {
        tracing::debug!("Subscribing to todo changes");
        Subscription {
            inner: self.feed.subscribe(),
        }
    }
}

impl std::fmt::Debug for TodoRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoRepository").finish_non_exhaustive()
    }
}

/// Something in the `todos` table changed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChangeNotification;

/// Live change subscription
///
/// Yields one [`ChangeNotification`] per change. Released exactly once,
/// by [`unsubscribe`](Self::unsubscribe) or on drop.
#[derive(Debug)]
pub struct Subscription {
    inner: ChangeSubscription,
}

impl Subscription {
    /// Releases the subscription
    pub fn unsubscribe(self) {
        tracing::debug!("Unsubscribing from todo changes");
        self.inner.unsubscribe();
    }

    /// Returns `true` until released
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }
}

impl Stream for Subscription {
    type Item = ChangeNotification;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner)
            .poll_next(cx)
            .map(|event| event.map(|_| ChangeNotification))
    }
}
