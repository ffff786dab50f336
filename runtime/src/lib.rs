//! # todo-sync runtime
//!
//! The [`Store`] coordinates a reducer with the effects it returns.
//!
//! ## Core Components
//!
//! - **Store**: owns the state, runs the reducer, executes effects
//! - **Effect execution**: futures and streams run on tokio tasks and their
//!   actions are fed back into the reducer
//! - **Cancellation**: effects registered with an id can be stopped later by
//!   the reducer (used for the change subscription)
//!
//! ## Example
//!
//! ```ignore
//! use todo_sync_runtime::Store;
//!
//! let store = Store::new(initial_state, reducer, environment);
//!
//! // Send an action and wait for its direct effects
//! store.send(Action::DoSomething).await?.wait().await;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use todo_sync_core::{effect::Effect, reducer::Reducer};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for a matching action
        ///
        /// Returned by `send_and_wait_for` when the timeout expires first.
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`]. It completes once every future effect
/// started by that action has finished and the action it produced (if any)
/// has been reduced. Stream effects are long-lived and are not tracked.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(TodoAction::Toggle { id }).await?;
/// handle.wait().await;
/// // The toggle's remote call has completed and its result is in state
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: Arc::new(tx),
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (_, rx) = watch::channel(());

        Self {
            effects: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Number of tracked effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait for all tracked effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                // Every tracking clone is gone, so the counter is final
                break;
            }
        }
    }

    /// Wait for all tracked effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all
    /// effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: tracking context shared by the effects of one `send`
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: decrements the tracking counter on drop, even if the effect panics
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Internal: decrements the store-wide pending counter on drop
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Store module - the runtime for reducers
pub mod store {
    use super::{
        Arc, AtomicCounterGuard, AtomicUsize, DecrementGuard, Duration, Effect, EffectHandle,
        EffectTracking, Ordering, Reducer, RwLock, StoreError,
    };
    use futures::StreamExt;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicU64};
    use std::sync::{Mutex, PoisonError};
    use todo_sync_core::effect::EffectId;
    use tokio::sync::broadcast;
    use tokio_util::sync::CancellationToken;

    type Cancellations = Arc<Mutex<HashMap<EffectId, Registration>>>;

    /// A registered cancellable effect
    struct Registration {
        generation: u64,
        token: CancellationToken,
    }

    /// Cancellation context handed to the tasks of one cancellable effect
    #[derive(Clone)]
    struct CancelScope {
        token: CancellationToken,
        lease: Arc<ScopeLease>,
    }

    /// Held by every task of a cancellable effect. Once the last holder is
    /// gone the registration is removed, unless the id was re-registered.
    struct ScopeLease {
        id: EffectId,
        generation: u64,
        registry: Cancellations,
        _parent: Option<Arc<ScopeLease>>,
    }

    impl Drop for ScopeLease {
        fn drop(&mut self) {
            let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
            if registry
                .get(&self.id)
                .is_some_and(|registration| registration.generation == self.generation)
            {
                registry.remove(&self.id);
                tracing::trace!(effect_id = %self.id, "Cancellable effect finished");
            }
        }
    }

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` for concurrent access)
    /// 2. Reducer and environment
    /// 3. Effect execution, with actions fed back into the reducer
    /// 4. Cancellation tokens for effects registered under an [`EffectId`]
    ///
    /// Reductions are serialized by the state lock. Effects run concurrently
    /// and complete in whatever order the remote answers; nothing sequences
    /// them, so when two fetches race the last one to complete wins.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
        cancellations: Cancellations,
        generations: Arc<AtomicU64>,
        /// Every action produced by an effect, published after it was reduced
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// The action broadcast buffers 64 actions per observer.
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_broadcast_capacity(initial_state, reducer, environment, 64)
        }

        /// Create a new store with a custom action broadcast capacity
        #[must_use]
        pub fn with_broadcast_capacity(
            initial_state: S,
            reducer: R,
            environment: E,
            capacity: usize,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(capacity);

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
                cancellations: Arc::new(Mutex::new(HashMap::new())),
                generations: Arc::new(AtomicU64::new(0)),
                action_broadcast,
            }
        }

        /// Number of effect tasks still running, streams included
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::Acquire)
        }

        /// Ids of the cancellable effects still running
        #[must_use]
        pub fn active_cancellables(&self) -> Vec<EffectId> {
            self.cancellations
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .keys()
                .cloned()
                .collect()
        }

        /// Initiate graceful shutdown of the store
        ///
        /// Rejects new actions, cancels every cancellable effect, then waits
        /// for the remaining effects to finish.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if effects are still running
        /// when the timeout expires.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            metrics::counter!("store.shutdown.initiated").increment(1);

            self.shutdown.store(true, Ordering::Release);

            let tokens: Vec<CancellationToken> = self
                .cancellations
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .drain()
                .map(|(_, registration)| registration.token)
                .collect();
            for token in tokens {
                token.cancel();
            }

            let start = std::time::Instant::now();
            let poll_interval = Duration::from_millis(10);

            loop {
                let pending = self.pending_effects.load(Ordering::Acquire);

                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(pending_effects = pending, "Shutdown timeout");
                    metrics::counter!("store.shutdown.timeout").increment(1);
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Send an action to the store
        ///
        /// 1. Acquires the write lock on state
        /// 2. Calls the reducer
        /// 3. Starts the returned effects on tokio tasks, still under the lock,
        ///    so cancellations registered or fired by this action are in place
        ///    before the next action is reduced
        ///
        /// `send()` returns once effects are started, not finished; use the
        /// returned [`EffectHandle`] to wait for them.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError>
        where
            R: Clone,
            E: Clone,
        {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            metrics::counter!("store.commands.total").increment(1);

            let (handle, tracking) = EffectHandle::new();

            let mut state = self.state.write().await;

            let start = std::time::Instant::now();
            let effects = self.reducer.reduce(&mut *state, action, &self.environment);
            metrics::histogram!("store.reducer.duration_seconds")
                .record(start.elapsed().as_secs_f64());

            tracing::trace!("Reducer completed, returned {} effects", effects.len());

            for effect in effects {
                self.execute_effect(effect, &tracking, None);
            }
            drop(state);

            Ok(handle)
        }

        /// Send an action and wait for a matching action produced by effects
        ///
        /// Subscribes before sending so the result cannot be missed. The
        /// matching action has already been reduced when this returns.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: no matching action within `timeout`
        /// - [`StoreError::ChannelClosed`]: the broadcast channel closed
        /// - [`StoreError::ShutdownInProgress`]: the store is shutting down
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            R: Clone,
            E: Clone,
            F: Fn(&A) -> bool,
        {
            let mut rx = self.action_broadcast.subscribe();

            self.send(action).await?;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Action observer lagged");
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Subscribe to every action produced by effects
        ///
        /// Actions are published after they were reduced, so reading state
        /// on receipt observes their result.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let count = store.state(|s| s.items.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Reduce an action produced by an effect, then publish it
        async fn feed_back(&self, action: A)
        where
            R: Clone,
            E: Clone,
        {
            if let Err(error) = self.send(action.clone()).await {
                tracing::debug!(%error, "Dropped effect action");
                return;
            }
            let _ = self.action_broadcast.send(action);
        }

        fn register_cancellable(&self, id: EffectId, parent: Option<&CancelScope>) -> CancelScope {
            let token = parent.map_or_else(CancellationToken::new, |scope| scope.token.child_token());
            let generation = self.generations.fetch_add(1, Ordering::Relaxed);

            let previous = self
                .cancellations
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(
                    id.clone(),
                    Registration {
                        generation,
                        token: token.clone(),
                    },
                );

            if let Some(previous) = previous {
                tracing::debug!(effect_id = %id, "Replacing running cancellable effect");
                previous.token.cancel();
            }

            CancelScope {
                token,
                lease: Arc::new(ScopeLease {
                    id,
                    generation,
                    registry: Arc::clone(&self.cancellations),
                    _parent: parent.map(|scope| Arc::clone(&scope.lease)),
                }),
            }
        }

        fn cancel(&self, id: &EffectId) {
            let registration = self
                .cancellations
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(id);

            match registration {
                Some(registration) => {
                    tracing::debug!(effect_id = %id, "Cancelling effect");
                    metrics::counter!("store.effects.cancelled").increment(1);
                    registration.token.cancel();
                },
                None => tracing::trace!(effect_id = %id, "Cancel for unknown effect id"),
            }
        }

        /// Execute an effect
        ///
        /// - `None`: no-op
        /// - `Parallel`: each child executes with the same tracking
        /// - `Future`: spawned and tracked; its action is fed back
        /// - `Stream`: spawned, untracked; each item is fed back
        /// - `Cancellable`: registers a token, then executes the child under it;
        ///   the registration goes away once every task of the child has exited
        /// - `Cancel`: fires the registered token
        ///
        /// Effect failures never halt the store: a panicking task only loses
        /// its own action, and the guards keep the counters accurate.
        fn execute_effect(
            &self,
            effect: Effect<A>,
            tracking: &EffectTracking,
            scope: Option<&CancelScope>,
        ) where
            R: Clone,
            E: Clone,
        {
            match effect {
                Effect::None => {
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Parallel(effects) => {
                    metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);
                    for effect in effects {
                        self.execute_effect(effect, tracking, scope);
                    }
                },
                Effect::Future(fut) => {
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    tracking.increment();
                    let guard = DecrementGuard(tracking.clone());

                    self.pending_effects.fetch_add(1, Ordering::SeqCst);
                    let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

                    let scope = scope.cloned();
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = guard;
                        let _pending_guard = pending_guard;

                        let action = match &scope {
                            Some(scope) => tokio::select! {
                                biased;
                                () = scope.token.cancelled() => {
                                    tracing::trace!("Effect::Future cancelled");
                                    None
                                },
                                action = fut => action,
                            },
                            None => fut.await,
                        };

                        if let Some(action) = action {
                            store.feed_back(action).await;
                        }
                    });
                },
                Effect::Stream(mut stream) => {
                    metrics::counter!("store.effects.executed", "type" => "stream").increment(1);

                    self.pending_effects.fetch_add(1, Ordering::SeqCst);
                    let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

                    let scope = scope.cloned();
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _pending_guard = pending_guard;

                        loop {
                            let next = match &scope {
                                Some(scope) => tokio::select! {
                                    biased;
                                    () = scope.token.cancelled() => {
                                        tracing::trace!("Effect::Stream cancelled");
                                        break;
                                    },
                                    next = stream.next() => next,
                                },
                                None => stream.next().await,
                            };

                            match next {
                                Some(action) => store.feed_back(action).await,
                                None => break,
                            }
                        }

                        // Release whatever the stream holds before the registration
                        drop(stream);
                        drop(scope);
                        tracing::trace!("Effect::Stream finished");
                    });
                },
                Effect::Cancellable { id, effect } => {
                    let scope = self.register_cancellable(id, scope);
                    self.execute_effect(*effect, tracking, Some(&scope));
                },
                Effect::Cancel(id) => self.cancel(&id),
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
                cancellations: Arc::clone(&self.cancellations),
                generations: Arc::clone(&self.generations),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

pub use store::Store;

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use todo_sync_core::{SmallVec, effect::EffectId, smallvec};

    const TICKER: EffectId = EffectId::new("ticker");

    #[derive(Debug, Clone, Default)]
    struct TestState {
        value: i32,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum TestAction {
        Increment,
        ProduceEffect,
        ProduceParallelEffects,
        ProduceNothing,
        StartTicker,
        StartShortTicker,
        StopTicker,
        Done,
    }

    #[derive(Debug, Clone)]
    struct TestEnv;

    #[derive(Debug, Clone)]
    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = TestEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::Increment => {
                    state.value += 1;
                    smallvec![Effect::None]
                },
                TestAction::ProduceEffect => {
                    smallvec![Effect::future(async { Some(TestAction::Increment) })]
                },
                TestAction::ProduceParallelEffects => smallvec![Effect::merge(vec![
                    Effect::future(async { Some(TestAction::Increment) }),
                    Effect::future(async { Some(TestAction::Increment) }),
                    Effect::future(async { Some(TestAction::Done) }),
                ])],
                TestAction::ProduceNothing => smallvec![Effect::future(async { None })],
                TestAction::StartTicker => smallvec![
                    Effect::stream(stream::pending::<TestAction>()).cancellable(TICKER)
                ],
                TestAction::StartShortTicker => smallvec![
                    Effect::stream(stream::iter([TestAction::Increment, TestAction::Increment]))
                        .cancellable(TICKER)
                ],
                TestAction::StopTicker => smallvec![Effect::Cancel(TICKER)],
                TestAction::Done => SmallVec::new(),
            }
        }
    }

    fn store() -> Store<TestState, TestAction, TestEnv, TestReducer> {
        Store::new(TestState::default(), TestReducer, TestEnv)
    }

    #[tokio::test]
    async fn send_reduces_synchronously() {
        let store = store();
        let _ = store.send(TestAction::Increment).await;
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn future_effect_feeds_action_back() {
        let store = store();
        let mut handle = store.send(TestAction::ProduceEffect).await.unwrap();
        handle.wait().await;
        assert_eq!(store.state(|s| s.value).await, 1);
        assert_eq!(handle.pending(), 0);
    }

    #[tokio::test]
    async fn parallel_effects_are_all_tracked() {
        let store = store();
        let mut handle = store.send(TestAction::ProduceParallelEffects).await.unwrap();
        handle
            .wait_with_timeout(Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(store.state(|s| s.value).await, 2);
    }

    #[tokio::test]
    async fn future_without_action_completes_handle() {
        let store = store();
        let mut handle = store.send(TestAction::ProduceNothing).await.unwrap();
        handle.wait().await;
        assert_eq!(store.state(|s| s.value).await, 0);
    }

    #[tokio::test]
    async fn feedback_actions_are_broadcast_after_reduction() {
        let store = store();
        let mut rx = store.subscribe_actions();
        let _ = store.send(TestAction::ProduceEffect).await.unwrap();

        let action = rx.recv().await.unwrap();
        assert_eq!(action, TestAction::Increment);
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn send_and_wait_for_returns_matching_action() {
        let store = store();
        let action = store
            .send_and_wait_for(
                TestAction::ProduceParallelEffects,
                |a| matches!(a, TestAction::Done),
                Duration::from_secs(1),
            )
            .await
            .unwrap();
        assert_eq!(action, TestAction::Done);
    }

    #[tokio::test]
    async fn cancel_stops_registered_stream() {
        let store = store();
        let _ = store.send(TestAction::StartTicker).await.unwrap();
        assert_eq!(store.active_cancellables(), vec![TICKER]);
        assert_eq!(store.pending_effects(), 1);

        let _ = store.send(TestAction::StopTicker).await.unwrap();
        assert!(store.active_cancellables().is_empty());

        tokio::time::timeout(Duration::from_secs(1), async {
            while store.pending_effects() > 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    async fn settle(store: &Store<TestState, TestAction, TestEnv, TestReducer>, pending: usize) {
        tokio::time::timeout(Duration::from_secs(1), async {
            while store.pending_effects() > pending {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn finished_stream_drops_its_registration() {
        let store = store();
        let _ = store.send(TestAction::StartShortTicker).await.unwrap();

        settle(&store, 0).await;

        assert_eq!(store.state(|s| s.value).await, 2);
        assert!(store.active_cancellables().is_empty());
    }

    #[tokio::test]
    async fn replaced_stream_keeps_new_registration() {
        let store = store();
        let _ = store.send(TestAction::StartTicker).await.unwrap();
        let _ = store.send(TestAction::StartTicker).await.unwrap();

        settle(&store, 1).await;
        assert_eq!(store.active_cancellables(), vec![TICKER]);

        let _ = store.send(TestAction::StopTicker).await.unwrap();
        settle(&store, 0).await;
        assert!(store.active_cancellables().is_empty());
    }

    #[tokio::test]
    async fn cancel_for_unknown_id_is_a_no_op() {
        let store = store();
        let mut handle = store.send(TestAction::StopTicker).await.unwrap();
        handle.wait().await;
        assert_eq!(store.pending_effects(), 0);
    }

    #[tokio::test]
    async fn shutdown_cancels_streams_and_rejects_actions() {
        let store = store();
        let _ = store.send(TestAction::StartTicker).await.unwrap();

        store.shutdown(Duration::from_secs(1)).await.unwrap();

        assert!(matches!(
            store.send(TestAction::Increment).await,
            Err(StoreError::ShutdownInProgress)
        ));
    }

    #[tokio::test]
    async fn completed_handle_does_not_wait() {
        let mut handle = EffectHandle::completed();
        handle
            .wait_with_timeout(Duration::from_millis(10))
            .await
            .unwrap();
    }
}
