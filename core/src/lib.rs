//! # todo-sync core
//!
//! Core traits and types shared by every todo-sync crate.
//!
//! The client keeps its list state in a reducer: a pure-ish function
//! `(State, Action, Environment) → (State, Effects)`. Remote calls are not
//! made from the reducer directly; it returns [`effect::Effect`] descriptions
//! which the runtime executes, feeding their resulting actions back in.
//!
//! The one exception is registering a change subscription. That is a
//! synchronous call, and making it while reducing means the subscription
//! exists as soon as the state says it does; the returned stream effect then
//! owns it and releases it when cancelled or dropped.
//!
//! ## Core Concepts
//!
//! - **State**: what the view renders (the list, the loading flag)
//! - **Action**: user intents and remote completions, in one enum
//! - **Reducer**: all state transitions, deterministic given its inputs
//! - **Effect**: a description of asynchronous work (not its execution)
//! - **Environment**: injected dependencies (repository, clock)
//!
//! ## Example
//!
//! ```ignore
//! impl Reducer for TodoReducer {
//!     type State = TodoState;
//!     type Action = TodoAction;
//!     type Environment = TodoEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut TodoState,
//!         action: TodoAction,
//!         env: &TodoEnvironment,
//!     ) -> SmallVec<[Effect<TodoAction>; 4]> {
//!         // transitions go here
//!         SmallVec::new()
//!     }
//! }
//! ```

pub use smallvec::{smallvec, SmallVec};

/// Reducer module - the trait every state machine implements
pub mod reducer {
    use super::SmallVec;
    use super::effect::Effect;

    /// The Reducer trait - core abstraction for state transitions
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// Updates `state` in place and returns the effects the runtime
        /// should execute. Most actions produce zero or one effect, hence
        /// the inline capacity of four.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - side effect descriptions
///
/// Effects are values. The reducer builds them, the runtime runs them.
pub mod effect {
    use futures::Stream;
    use std::borrow::Cow;
    use std::fmt;
    use std::future::Future;
    use std::pin::Pin;

    /// Boxed future produced by an effect
    pub type EffectFuture<Action> = Pin<Box<dyn Future<Output = Option<Action>> + Send>>;

    /// Boxed stream produced by a long-lived effect
    pub type EffectStream<Action> = Pin<Box<dyn Stream<Item = Action> + Send>>;

    /// Identifier for a cancellable effect
    ///
    /// Starting a new cancellable effect under an id that is still running
    /// cancels the previous one first.
    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    pub struct EffectId(Cow<'static, str>);

    impl EffectId {
        /// Creates an id from a static name
        #[must_use]
        pub const fn new(name: &'static str) -> Self {
            Self(Cow::Borrowed(name))
        }

        /// Creates an id from an owned name
        #[must_use]
        pub fn owned(name: String) -> Self {
            Self(Cow::Owned(name))
        }

        /// Returns the id as a string slice
        #[must_use]
        pub fn as_str(&self) -> &str {
            &self.0
        }
    }

    impl fmt::Display for EffectId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions returned
    /// from reducers and executed by the Store runtime.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects concurrently
        Parallel(Vec<Effect<Action>>),

        /// One-shot async computation
        ///
        /// If it resolves to `Some(action)`, the action is fed back into the
        /// reducer.
        Future(EffectFuture<Action>),

        /// Long-lived source of actions
        ///
        /// Every item is fed back into the reducer. The stream runs until it
        /// ends or is cancelled; cancelling drops it.
        Stream(EffectStream<Action>),

        /// Runs `effect` so that it can later be stopped with [`Effect::Cancel`]
        Cancellable {
            /// Identifier used to cancel the effect
            id: EffectId,
            /// The effect to run
            effect: Box<Effect<Action>>,
        },

        /// Cancels the running effect registered under the id, if any
        Cancel(EffectId),
    }

    impl<Action> fmt::Debug for Effect<Action>
    where
        Action: fmt::Debug,
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
                Effect::Stream(_) => write!(f, "Effect::Stream(<stream>)"),
                Effect::Cancellable { id, effect } => f
                    .debug_struct("Effect::Cancellable")
                    .field("id", id)
                    .field("effect", effect)
                    .finish(),
                Effect::Cancel(id) => f.debug_tuple("Effect::Cancel").field(id).finish(),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Wraps an async block whose output is fed back as an action
        #[must_use]
        pub fn future<F>(fut: F) -> Self
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }

        /// Wraps a stream whose items are fed back as actions
        #[must_use]
        pub fn stream<S>(stream: S) -> Self
        where
            S: Stream<Item = Action> + Send + 'static,
        {
            Effect::Stream(Box::pin(stream))
        }

        /// Marks this effect as cancellable under `id`
        #[must_use]
        pub fn cancellable(self, id: EffectId) -> Self {
            Effect::Cancellable {
                id,
                effect: Box::new(self),
            }
        }

        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Returns `true` for [`Effect::None`]
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}

/// Environment module - dependency injection traits
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time for testability
    ///
    /// The remote store stamps `created_at` on insert; in-process backends
    /// take their time from an injected clock so tests stay deterministic.
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::{Effect, EffectId};
    use futures::StreamExt;

    #[test]
    fn effect_id_display() {
        let id = EffectId::new("todos-changes");
        assert_eq!(id.to_string(), "todos-changes");
        assert_eq!(id, EffectId::owned("todos-changes".to_string()));
    }

    #[test]
    fn cancellable_wraps_inner_effect() {
        let effect: Effect<u8> = Effect::stream(futures::stream::iter(vec![1, 2]))
            .cancellable(EffectId::new("numbers"));

        match effect {
            Effect::Cancellable { id, effect } => {
                assert_eq!(id.as_str(), "numbers");
                assert!(matches!(*effect, Effect::Stream(_)));
            },
            other => panic!("expected cancellable, got {other:?}"),
        }
    }

    #[test]
    fn debug_hides_futures() {
        let effect: Effect<u8> = Effect::merge(vec![Effect::None, Effect::future(async { Some(1) })]);
        let rendered = format!("{effect:?}");
        assert!(rendered.contains("Effect::None"));
        assert!(rendered.contains("<future>"));
    }

    #[tokio::test]
    async fn future_and_stream_constructors_box_their_input() {
        let Effect::Future(fut) = Effect::<u8>::future(async { Some(7) }) else {
            panic!("expected future effect");
        };
        assert_eq!(fut.await, Some(7));

        let Effect::Stream(stream) = Effect::<u8>::stream(futures::stream::iter(vec![1, 2, 3])) else {
            panic!("expected stream effect");
        };
        let items: Vec<u8> = stream.collect().await;
        assert_eq!(items, vec![1, 2, 3]);
    }
}
