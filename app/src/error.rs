//! Tagged failure outcomes of repository calls.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which repository call failed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// `list_all` failed
    Fetch,
    /// `create` failed
    Insert,
    /// `set_completed` or `update_content` failed
    Update,
    /// `delete` failed
    Delete,
    /// A refetch triggered by a change notification failed
    RealtimeNotify,
}

impl ErrorKind {
    /// Stable tag used in logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fetch => "fetch-error",
            Self::Insert => "insert-error",
            Self::Update => "update-error",
            Self::Delete => "delete-error",
            Self::RealtimeNotify => "realtime-notify-error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed repository call
///
/// Carried inside completion actions, so it is `Clone` and holds the remote
/// error rendered as text.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct RepositoryError {
    /// What failed
    pub kind: ErrorKind,
    /// Description from the remote store
    pub message: String,
}

impl RepositoryError {
    /// Creates an error of `kind` describing `cause`
    pub fn new(kind: ErrorKind, cause: impl fmt::Display) -> Self {
        Self {
            kind,
            message: cause.to_string(),
        }
    }

    /// Same failure, reported under another kind
    #[must_use]
    pub fn with_kind(self, kind: ErrorKind) -> Self {
        Self { kind, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_sync_remote::RemoteError;

    #[test]
    fn kinds_render_as_tags() {
        let tags: Vec<_> = [
            ErrorKind::Fetch,
            ErrorKind::Insert,
            ErrorKind::Update,
            ErrorKind::Delete,
            ErrorKind::RealtimeNotify,
        ]
        .iter()
        .map(ToString::to_string)
        .collect();

        assert_eq!(
            tags,
            ["fetch-error", "insert-error", "update-error", "delete-error", "realtime-notify-error"]
        );
    }

    #[test]
    fn display_prefixes_kind() {
        let error = RepositoryError::new(ErrorKind::Delete, RemoteError::Request("offline".to_string()));
        assert_eq!(error.to_string(), "delete-error: Request failed: offline");
    }

    #[test]
    fn with_kind_keeps_message() {
        let error = RepositoryError::new(ErrorKind::Fetch, "timeout").with_kind(ErrorKind::RealtimeNotify);
        assert_eq!(error.kind, ErrorKind::RealtimeNotify);
        assert_eq!(error.message, "timeout");
    }

    #[test]
    fn kind_serializes_kebab_case() {
        let json = serde_json::to_string(&ErrorKind::RealtimeNotify).unwrap();
        assert_eq!(json, "\"realtime-notify\"");
    }
}
