//! The `todos` table operations.

use crate::error::RemoteError;
use crate::row::{NewTodoRow, OrderBy, TodoPatch, TodoRow};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by remote calls
pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RemoteError>> + Send + 'a>>;

/// Query operations on the `todos` table.
///
/// Every call is exactly one round trip to the store.
///
/// # Dyn Compatibility
///
/// Methods return boxed futures instead of using `async fn` so the client
/// can be shared as `Arc<dyn TodoTable>` inside effects.
pub trait TodoTable: Send + Sync {
    /// Select every row in the given order.
    ///
    /// `Ok(None)` means the store answered without data, which callers treat
    /// as an empty table.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteError`] if the query fails.
    fn select_all(&self, order: OrderBy) -> RemoteFuture<'_, Option<Vec<TodoRow>>>;

    /// Insert one or many rows and return them as stored.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Rejected`] if the store refuses the write, or
    /// another [`RemoteError`] on transport failure.
    fn insert(&self, rows: Vec<NewTodoRow>) -> RemoteFuture<'_, Vec<TodoRow>>;

    /// Update the row with the given id. Matching zero rows is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteError`] if the update fails.
    fn update(&self, id: &str, patch: TodoPatch) -> RemoteFuture<'_, ()>;

    /// Delete the row with the given id. Matching zero rows is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteError`] if the delete fails.
    fn delete(&self, id: &str) -> RemoteFuture<'_, ()>;
}
