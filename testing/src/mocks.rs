//! Deterministic stand-ins for the environment and the remote store.

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use todo_sync_core::environment::Clock;
use todo_sync_remote::{
    ChangeFeed, ChangeSubscription, MemoryRemote, NewTodoRow, OrderBy, RemoteError, RemoteFuture,
    TodoPatch, TodoRow, TodoTable,
};
use tokio::sync::watch;

/// Fixed clock for deterministic tests
///
/// Always returns the same time, making tests reproducible.
///
/// # Example
///
/// ```
/// use todo_sync_testing::mocks::FixedClock;
/// use todo_sync_core::environment::Clock;
/// use chrono::Utc;
///
/// let clock = FixedClock::new(Utc::now());
/// assert_eq!(clock.now(), clock.now());
/// ```
#[derive(Debug, Clone)]
pub struct FixedClock {
    time: DateTime<Utc>,
}

impl FixedClock {
    /// Create a new fixed clock with the given time
    #[must_use]
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self { time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }
}

/// Clock that advances one second on every reading
///
/// Rows inserted through a [`MemoryRemote`] using it get strictly increasing
/// `created_at` values.
#[derive(Debug)]
pub struct SteppingClock {
    start: DateTime<Utc>,
    ticks: AtomicI64,
}

impl SteppingClock {
    /// Starts at `start`
    #[must_use]
    pub const fn new(start: DateTime<Utc>) -> Self {
        Self {
            start,
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.start + Duration::seconds(tick)
    }
}

/// 2025-01-01 00:00:00 UTC
#[must_use]
#[allow(clippy::expect_used)]
pub fn epoch() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
        .expect("hardcoded timestamp should always parse")
        .with_timezone(&Utc)
}

/// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
#[must_use]
pub fn test_clock() -> FixedClock {
    FixedClock::new(epoch())
}

/// A row as the store would return it, `seconds` after [`epoch`]
#[must_use]
pub fn row(id: &str, text: &str, completed: bool, seconds: i64) -> TodoRow {
    TodoRow {
        id: id.to_string(),
        created_at: epoch() + Duration::seconds(seconds),
        text: text.to_string(),
        content: String::new(),
        completed,
        user_id: None,
    }
}

/// Table operation, used to script and count calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOp {
    /// `select_all`
    Select,
    /// `insert`
    Insert,
    /// `update`
    Update,
    /// `delete`
    Delete,
}

/// One recorded call with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    /// `select_all(order)`
    Select(OrderBy),
    /// `insert(rows)`
    Insert(Vec<NewTodoRow>),
    /// `update(id, patch)`
    Update {
        /// Target row
        id: String,
        /// Fields written
        patch: TodoPatch,
    },
    /// `delete(id)`
    Delete {
        /// Target row
        id: String,
    },
}

impl RemoteCall {
    /// Which operation this call was
    #[must_use]
    pub const fn op(&self) -> RemoteOp {
        match self {
            Self::Select(_) => RemoteOp::Select,
            Self::Insert(_) => RemoteOp::Insert,
            Self::Update { .. } => RemoteOp::Update,
            Self::Delete { .. } => RemoteOp::Delete,
        }
    }
}

/// Scripted outcome for the next call of an operation
#[derive(Debug, Clone)]
enum Script {
    Fail(RemoteError),
    /// Success without data: `select_all` answers `None`, `insert` writes
    /// nothing and returns no rows
    Empty,
}

#[derive(Debug, Default)]
struct Recorder {
    calls: Vec<RemoteCall>,
    scripts: HashMap<RemoteOp, VecDeque<Script>>,
}

/// A [`MemoryRemote`] that records every call and can be told to misbehave
///
/// - [`fail_next`](Self::fail_next) makes the next call of an operation fail
///   without touching the table
/// - [`empty_next`](Self::empty_next) makes it succeed without data
/// - [`hold_selects`](Self::hold_selects) parks `select_all` calls until
///   [`release_selects`](Self::release_selects)
///
/// Subscriptions and their releases are counted separately, so a test can
/// check that a subscription was released exactly once.
#[derive(Clone)]
pub struct ScriptedRemote {
    inner: MemoryRemote,
    recorder: Arc<Mutex<Recorder>>,
    hold: Arc<watch::Sender<bool>>,
    subscribed: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

impl ScriptedRemote {
    /// Wraps an existing table
    #[must_use]
    pub fn new(inner: MemoryRemote) -> Self {
        let (hold, _) = watch::channel(false);
        Self {
            inner,
            recorder: Arc::new(Mutex::new(Recorder::default())),
            hold: Arc::new(hold),
            subscribed: Arc::new(AtomicUsize::new(0)),
            released: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Wraps a table holding `rows`, stamping new rows with a [`SteppingClock`]
    #[must_use]
    pub fn with_rows(rows: impl IntoIterator<Item = TodoRow>) -> Self {
        Self::new(MemoryRemote::with_rows(
            Arc::new(SteppingClock::new(epoch() + Duration::hours(1))),
            rows,
        ))
    }

    /// The wrapped table
    #[must_use]
    pub const fn table(&self) -> &MemoryRemote {
        &self.inner
    }

    /// Current rows, newest first
    #[must_use]
    pub fn rows(&self) -> Vec<TodoRow> {
        self.inner.rows()
    }

    /// Make the next call of `op` fail with `error`
    pub fn fail_next(&self, op: RemoteOp, error: RemoteError) {
        self.script(op, Script::Fail(error));
    }

    /// Make the next call of `op` succeed without data
    pub fn empty_next(&self, op: RemoteOp) {
        self.script(op, Script::Empty);
    }

    /// Park every `select_all` until [`release_selects`](Self::release_selects)
    pub fn hold_selects(&self) {
        self.hold.send_replace(true);
    }

    /// Let parked and future `select_all` calls through
    pub fn release_selects(&self) {
        self.hold.send_replace(false);
    }

    /// Every call so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.lock().calls.clone()
    }

    /// Number of calls of `op` so far
    #[must_use]
    pub fn count(&self, op: RemoteOp) -> usize {
        self.lock().calls.iter().filter(|call| call.op() == op).count()
    }

    /// Number of `subscribe` calls
    #[must_use]
    pub fn subscriptions(&self) -> usize {
        self.subscribed.load(Ordering::SeqCst)
    }

    /// Number of subscriptions released
    #[must_use]
    pub fn releases(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorder> {
        self.recorder.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn script(&self, op: RemoteOp, script: Script) {
        self.lock().scripts.entry(op).or_default().push_back(script);
    }

    fn record(&self, call: RemoteCall) -> Option<Script> {
        let mut recorder = self.lock();
        let op = call.op();
        recorder.calls.push(call);
        recorder.scripts.get_mut(&op).and_then(VecDeque::pop_front)
    }
}

impl std::fmt::Debug for ScriptedRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedRemote")
            .field("inner", &self.inner)
            .field("subscribed", &self.subscriptions())
            .field("released", &self.releases())
            .finish_non_exhaustive()
    }
}

impl TodoTable for ScriptedRemote {
    fn select_all(&self, order: OrderBy) -> RemoteFuture<'_, Option<Vec<TodoRow>>> {
        let script = self.record(RemoteCall::Select(order));
        let mut hold = self.hold.subscribe();
        Box::pin(async move {
            loop {
                let held = *hold.borrow_and_update();
                if !held || hold.changed().await.is_err() {
                    break;
                }
            }
            match script {
                Some(Script::Fail(error)) => Err(error),
                Some(Script::Empty) => Ok(None),
                None => self.inner.select_all(order).await,
            }
        })
    }

    fn insert(&self, rows: Vec<NewTodoRow>) -> RemoteFuture<'_, Vec<TodoRow>> {
        let script = self.record(RemoteCall::Insert(rows.clone()));
        Box::pin(async move {
            match script {
                Some(Script::Fail(error)) => Err(error),
                Some(Script::Empty) => Ok(Vec::new()),
                None => self.inner.insert(rows).await,
            }
        })
    }

    fn update(&self, id: &str, patch: TodoPatch) -> RemoteFuture<'_, ()> {
        let script = self.record(RemoteCall::Update {
            id: id.to_string(),
            patch: patch.clone(),
        });
        let id = id.to_string();
        Box::pin(async move {
            match script {
                Some(Script::Fail(error)) => Err(error),
                Some(Script::Empty) => Ok(()),
                None => self.inner.update(&id, patch).await,
            }
        })
    }

    fn delete(&self, id: &str) -> RemoteFuture<'_, ()> {
        let script = self.record(RemoteCall::Delete { id: id.to_string() });
        let id = id.to_string();
        Box::pin(async move {
            match script {
                Some(Script::Fail(error)) => Err(error),
                Some(Script::Empty) => Ok(()),
                None => self.inner.delete(&id).await,
            }
        })
    }
}

impl ChangeFeed for ScriptedRemote {
    fn subscribe(&self) -> ChangeSubscription {
        self.subscribed.fetch_add(1, Ordering::SeqCst);
        let inner = self.inner.subscribe();
        let released = Arc::clone(&self.released);
        ChangeSubscription::new(inner, move || {
            released.fetch_add(1, Ordering::SeqCst);
        })
    }
}
