//! Application configuration from the environment.
//!
//! | Variable            | Meaning                                   | Default  |
//! |---------------------|-------------------------------------------|----------|
//! | `TODO_BACKEND`      | `memory` or `postgrest`                   | `memory` |
//! | `TODO_SEED`         | seed sample rows into the memory backend  | `true`   |
//! | `SUPABASE_URL`      | project URL, required for `postgrest`     |          |
//! | `SUPABASE_ANON_KEY` | anonymous key, required for `postgrest`   |          |

use crate::repository::TodoRepository;
use std::sync::Arc;
use todo_sync_core::environment::SystemClock;
use todo_sync_remote::config::{ANON_KEY_VAR, URL_VAR};
use todo_sync_remote::{
    ConfigError, MemoryRemote, NewTodoRow, PostgrestClient, RemoteConfig, RemoteError, TodoTable,
};

/// Selects the backend
pub const BACKEND_VAR: &str = "TODO_BACKEND";

/// Toggles sample rows for the memory backend
pub const SEED_VAR: &str = "TODO_SEED";

/// Where the todos live
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Backend {
    /// In-process table, optionally seeded with sample rows
    Memory {
        /// Insert sample rows on connect
        seed: bool,
    },
    /// Hosted PostgREST endpoint
    Postgrest(RemoteConfig),
}

impl Backend {
    /// Builds the remote client and wraps it in a repository
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteError`] if seeding the memory backend fails.
    pub async fn connect(&self) -> Result<TodoRepository, RemoteError> {
        match self {
            Self::Memory { seed } => {
                let remote = Arc::new(MemoryRemote::new(Arc::new(SystemClock)));
                if *seed {
                    remote.insert(sample_rows()).await?;
                }
                tracing::info!(seeded = *seed, "Using in-memory backend");
                Ok(TodoRepository::from_remote(remote))
            },
            Self::Postgrest(config) => {
                tracing::info!(url = %config.url, "Using PostgREST backend");
                Ok(TodoRepository::from_remote(Arc::new(PostgrestClient::new(config.clone()))))
            },
        }
    }
}

fn sample_rows() -> Vec<NewTodoRow> {
    vec![
        NewTodoRow::new("Try the todo list", "<p>Type <code>add</code> to create more.</p>"),
        NewTodoRow::new("Toggle me", ""),
    ]
}

/// Top-level configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// Selected backend
    pub backend: Backend,
}

impl AppConfig {
    /// Reads the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unknown backend, a malformed flag, or
    /// missing connection settings.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads configuration through `lookup`
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend = lookup(BACKEND_VAR).unwrap_or_else(|| "memory".to_string());

        let backend = match backend.trim().to_ascii_lowercase().as_str() {
            "memory" => Backend::Memory {
                seed: parse_flag(SEED_VAR, lookup(SEED_VAR))?.unwrap_or(true),
            },
            "postgrest" | "supabase" => {
                let url = lookup(URL_VAR).ok_or(ConfigError::Missing(URL_VAR))?;
                let key = lookup(ANON_KEY_VAR).ok_or(ConfigError::Missing(ANON_KEY_VAR))?;
                Backend::Postgrest(RemoteConfig::new(url, key)?)
            },
            other => {
                return Err(ConfigError::Invalid {
                    var: BACKEND_VAR,
                    reason: format!("expected `memory` or `postgrest`, got {other:?}"),
                });
            },
        };

        Ok(Self { backend })
    }
}

fn parse_flag(var: &'static str, value: Option<String>) -> Result<Option<bool>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        other => Err(ConfigError::Invalid {
            var,
            reason: format!("expected a boolean, got {other:?}"),
        }),
    }
}
