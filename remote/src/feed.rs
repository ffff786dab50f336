//! Change notifications for the `todos` table.
//!
//! A subscriber learns *that* the table changed, and which row, but the
//! client always answers with a full refetch, so the payload is advisory.

use futures::Stream;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};
use tokio::sync::broadcast;

/// What happened to a row
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    /// A row was inserted
    Insert,
    /// A row was updated
    Update,
    /// A row was deleted
    Delete,
    /// The subscriber fell behind and missed events; treat as "something changed"
    Resync,
}

/// One change notification
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Kind of change
    pub kind: ChangeKind,
    /// Affected row, when known
    pub id: Option<String>,
}

impl ChangeEvent {
    /// Event for a single row
    #[must_use]
    pub fn row(kind: ChangeKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: Some(id.into()),
        }
    }

    /// Event emitted after missed notifications
    #[must_use]
    pub const fn resync() -> Self {
        Self {
            kind: ChangeKind::Resync,
            id: None,
        }
    }
}

/// Source of change subscriptions for the `todos` table.
pub trait ChangeFeed: Send + Sync {
    /// Register interest in every insert, update and delete.
    ///
    /// Registration completes before this returns. The returned handle must
    /// be released exactly once, which it does by itself when dropped.
    fn subscribe(&self) -> ChangeSubscription;
}

type Release = Box<dyn FnOnce() + Send>;

/// A live subscription: a stream of [`ChangeEvent`]s plus its release hook.
///
/// The hook runs exactly once, either from [`unsubscribe`](Self::unsubscribe)
/// or from `Drop`. After release the stream yields nothing more.
pub struct ChangeSubscription {
    events: Pin<Box<dyn Stream<Item = ChangeEvent> + Send>>,
    release: Option<Release>,
}

impl ChangeSubscription {
    /// Wraps an event stream and the action that unregisters it
    pub fn new<S, F>(events: S, release: F) -> Self
    where
        S: Stream<Item = ChangeEvent> + Send + 'static,
        F: FnOnce() + Send + 'static,
    {
        Self {
            events: Box::pin(events),
            release: Some(Box::new(release)),
        }
    }

    /// Release the subscription now
    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// Returns `true` until the subscription is released
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    fn release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for ChangeSubscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl Stream for ChangeSubscription {
    type Item = ChangeEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.release.is_none() {
            return Poll::Ready(None);
        }
        self.events.as_mut().poll_next(cx)
    }
}

impl fmt::Debug for ChangeSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeSubscription")
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

/// In-process fan-out of change events, shared by the backends
#[derive(Clone, Debug)]
pub struct ChangeBroadcaster {
    sender: broadcast::Sender<ChangeEvent>,
    active: Arc<AtomicUsize>,
}

impl ChangeBroadcaster {
    /// Creates a broadcaster buffering `capacity` events per subscriber
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Delivers an event to every live subscription
    pub fn publish(&self, event: ChangeEvent) {
        tracing::trace!(kind = ?event.kind, id = ?event.id, "Publishing change");
        let _ = self.sender.send(event);
    }

    /// Number of subscriptions not yet released
    #[must_use]
    pub fn active_subscriptions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

impl Default for ChangeBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

impl ChangeFeed for ChangeBroadcaster {
    fn subscribe(&self) -> ChangeSubscription {
        let mut receiver = self.sender.subscribe();
        self.active.fetch_add(1, Ordering::SeqCst);
        let active = Arc::clone(&self.active);

        let events = async_stream::stream! {
            loop {
                match receiver.recv().await {
                    Ok(event) => yield event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Change subscriber lagged");
                        yield ChangeEvent::resync();
                    },
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        };

        ChangeSubscription::new(events, move || {
            active.fetch_sub(1, Ordering::SeqCst);
        })
    }
}
