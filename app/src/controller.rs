//! Handle for driving the list from a UI.

use crate::reducer::{TodoEnvironment, TodoReducer};
use crate::repository::TodoRepository;
use crate::types::{Todo, TodoAction, TodoId, TodoState};
use std::time::Duration;
use todo_sync_runtime::{EffectHandle, Store, StoreError};
use tokio::sync::broadcast;

/// Store running the todo reducer
pub type TodoStore = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;

/// List synchronization controller
///
/// Every method sends one action and returns as soon as the reducer ran.
/// The returned [`EffectHandle`] completes once the repository call the
/// action started has returned and its result has been applied.
///
/// ```ignore
/// let controller = TodoController::new(repository);
/// controller.mount().await?.wait().await;
/// controller.add("Buy milk", "<p>2 litres</p>").await?.wait().await;
/// for todo in controller.items().await { println!("{}", todo.text); }
/// ```
#[derive(Clone)]
pub struct TodoController {
    store: TodoStore,
}

impl TodoController {
    /// Creates an unmounted controller over `repository`
    #[must_use]
    pub fn new(repository: TodoRepository) -> Self {
        Self {
            store: Store::new(
                TodoState::new(),
                TodoReducer::new(),
                TodoEnvironment::new(repository),
            ),
        }
    }

    /// Loads the list and starts listening for changes
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
    pub async fn mount(&self) -> Result<EffectHandle, StoreError> {
        self.store.send(TodoAction::Mount).await
    }

    /// Stops listening; later completions are ignored
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
    pub async fn unmount(&self) -> Result<EffectHandle, StoreError> {
        self.store.send(TodoAction::Unmount).await
    }

    /// Creates a todo unless `text` is blank
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
    pub async fn add(
        &self,
        text: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<EffectHandle, StoreError> {
        self.store
            .send(TodoAction::Add {
                text: text.into(),
                content: content.into(),
            })
            .await
    }

    /// Flips the completion flag of a listed todo
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
    pub async fn toggle(&self, id: &TodoId) -> Result<EffectHandle, StoreError> {
        self.store.send(TodoAction::Toggle { id: id.clone() }).await
    }

    /// Deletes a todo
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
    pub async fn remove(&self, id: &TodoId) -> Result<EffectHandle, StoreError> {
        self.store.send(TodoAction::Remove { id: id.clone() }).await
    }

    /// Replaces label and body of a listed todo unless `text` is blank
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
    pub async fn edit(
        &self,
        id: &TodoId,
        text: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<EffectHandle, StoreError> {
        self.store
            .send(TodoAction::Edit {
                id: id.clone(),
                text: text.into(),
                content: content.into(),
            })
            .await
    }

    /// Current todos in display order
    pub async fn items(&self) -> Vec<Todo> {
        self.store.state(|state| state.items.clone()).await
    }

    /// Whether the loading indicator is shown
    pub async fn is_loading(&self) -> bool {
        self.store.state(|state| state.loading).await
    }

    /// Copy of the whole state
    pub async fn snapshot(&self) -> TodoState {
        self.store.state(Clone::clone).await
    }

    /// Completion actions as they are applied, for re-rendering
    #[must_use]
    pub fn updates(&self) -> broadcast::Receiver<TodoAction> {
        self.store.subscribe_actions()
    }

    /// Rejects further actions, releases the change subscription and waits
    /// for in-flight calls
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if calls are still running
    /// after `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        self.store.shutdown(timeout).await
    }
}

impl std::fmt::Debug for TodoController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoController")
            .field("pending_effects", &self.store.pending_effects())
            .finish_non_exhaustive()
    }
}
