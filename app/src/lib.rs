//! # todo-sync
//!
//! A todo list kept in sync with a hosted `todos` table.
//!
//! The list state is owned by a reducer ([`TodoReducer`]) run by the store
//! runtime. User intents (add, toggle, remove, edit) become one repository
//! call each; successful writes are applied locally right away, and every
//! change notification from the table triggers a full refetch that replaces
//! the list. Failures are logged and otherwise ignored.
//!
//! - [`TodoRepository`]: the facade over the remote table and its change feed
//! - [`TodoController`]: the handle a UI drives
//! - [`view`] and [`cli`]: the text front end used by the `todo-sync` binary
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use todo_sync::{TodoController, TodoRepository};
//! use todo_sync_remote::MemoryRemote;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = TodoRepository::from_remote(Arc::new(MemoryRemote::default()));
//! let controller = TodoController::new(repository);
//!
//! controller.mount().await?.wait().await;
//! controller.add("Buy milk", "<p>2 litres</p>").await?.wait().await;
//!
//! for todo in controller.items().await {
//!     println!("[{}] {}", if todo.completed { 'x' } else { ' ' }, todo.text);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod reducer;
pub mod repository;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use config::{AppConfig, Backend};
pub use controller::{TodoController, TodoStore};
pub use error::{ErrorKind, RepositoryError};
pub use reducer::{CHANGE_FEED, TodoEnvironment, TodoReducer};
pub use repository::{ChangeNotification, Subscription, TodoRepository};
pub use types::{FetchOrigin, Phase, Todo, TodoAction, TodoId, TodoState};
