//! # todo-sync remote
//!
//! The client surface of the hosted store that owns the `todos` table.
//!
//! Two traits describe what the application needs from the store:
//!
//! - [`TodoTable`]: select-all ordered, insert returning rows, update by id,
//!   delete by id
//! - [`ChangeFeed`]: a subscription that fires on every insert, update and
//!   delete in the table, without saying what changed
//!
//! Both are dyn-compatible so a single client can be constructed once at
//! startup and shared as `Arc<dyn TodoTable>` / `Arc<dyn ChangeFeed>`.
//!
//! ## Backends
//!
//! - [`MemoryRemote`]: in-process table with a broadcast change channel
//! - [`PostgrestClient`]: HTTP client for a PostgREST endpoint
//!   (`/rest/v1/todos`)

pub mod config;
pub mod error;
pub mod feed;
pub mod memory;
pub mod postgrest;
pub mod row;
pub mod table;

pub use config::{ConfigError, RemoteConfig};
pub use error::RemoteError;
pub use feed::{ChangeBroadcaster, ChangeEvent, ChangeFeed, ChangeKind, ChangeSubscription};
pub use memory::MemoryRemote;
pub use postgrest::PostgrestClient;
pub use row::{NewTodoRow, OrderBy, OrderColumn, TodoPatch, TodoRow};
pub use table::{RemoteFuture, TodoTable};

/// Name of the table holding the todos
pub const TODOS_TABLE: &str = "todos";
