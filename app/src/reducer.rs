//! List synchronization state machine.
//!
//! Every transition of the list lives here. Repository calls are returned as
//! effects and come back as completion actions; completions that arrive
//! after unmount are dropped without touching state.

use crate::error::{ErrorKind, RepositoryError};
use crate::repository::TodoRepository;
use crate::types::{FetchOrigin, Phase, Todo, TodoAction, TodoId, TodoState};
use futures::StreamExt;
use todo_sync_core::{
    SmallVec,
    effect::{Effect, EffectId},
    reducer::Reducer,
    smallvec,
};

/// Id of the change subscription effect
pub const CHANGE_FEED: EffectId = EffectId::new("todos-changes");

type Effects = SmallVec<[Effect<TodoAction>; 4]>;

/// Environment dependencies for the todo reducer
#[derive(Clone, Debug)]
pub struct TodoEnvironment {
    /// Remote store facade
    pub repository: TodoRepository,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub const fn new(repository: TodoRepository) -> Self {
        Self { repository }
    }
}

/// Reducer for the synchronized todo list
#[derive(Clone, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn fetch(env: &TodoEnvironment, origin: FetchOrigin) -> Effect<TodoAction> {
        let repository = env.repository.clone();
        Effect::future(async move {
            Some(TodoAction::Fetched {
                origin,
                result: repository.list_all().await,
            })
        })
    }

    /// Registers now; the stream effect owns the subscription and releases
    /// it when cancelled
    fn watch_changes(env: &TodoEnvironment) -> Effect<TodoAction> {
        let subscription = env.repository.subscribe_to_changes();
        Effect::stream(subscription.map(|_| TodoAction::ChangeNotified)).cancellable(CHANGE_FEED)
    }

    fn log_failure(what: &str, error: &RepositoryError) {
        tracing::error!(kind = %error.kind, error = %error.message, "{what} failed");
    }

    fn apply_fetch(
        state: &mut TodoState,
        origin: FetchOrigin,
        result: Result<Vec<Todo>, RepositoryError>,
    ) {
        state.loading = false;
        match (result, origin) {
            (Ok(items), _) => {
                tracing::debug!(count = items.len(), ?origin, "Replacing list");
                state.items = items;
            },
            (Err(error), FetchOrigin::Mount) => Self::log_failure("fetch", &error),
            (Err(error), FetchOrigin::ChangeNotification) => {
                Self::log_failure("realtime refetch", &error.with_kind(ErrorKind::RealtimeNotify));
            },
        }
    }

    fn apply_created(state: &mut TodoState, result: Result<Option<Todo>, RepositoryError>) {
        match result {
            // A refetch may already have brought the row in
            Ok(Some(todo)) if state.get(&todo.id).is_none() => state.items.insert(0, todo),
            Ok(_) => {},
            Err(error) => Self::log_failure("add", &error),
        }
    }

    fn apply_toggled(
        state: &mut TodoState,
        id: &TodoId,
        completed: bool,
        result: Result<(), RepositoryError>,
    ) {
        match result {
            Ok(()) => {
                if let Some(todo) = state.get_mut(id) {
                    todo.completed = completed;
                }
            },
            Err(error) => Self::log_failure("toggle", &error),
        }
    }

    fn apply_removed(state: &mut TodoState, id: &TodoId, result: Result<(), RepositoryError>) {
        match result {
            Ok(()) => state.items.retain(|todo| &todo.id != id),
            Err(error) => Self::log_failure("remove", &error),
        }
    }

    fn apply_edited(
        state: &mut TodoState,
        id: &TodoId,
        text: String,
        content: String,
        result: Result<(), RepositoryError>,
    ) {
        match result {
            Ok(()) => {
                if let Some(todo) = state.get_mut(id) {
                    todo.text = text;
                    todo.content = content;
                }
            },
            Err(error) => Self::log_failure("edit", &error),
        }
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    #[allow(clippy::too_many_lines)] // one arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        // Completions after unmount (or before mount) must not touch state
        if action.is_completion() && !state.is_mounted() {
            tracing::debug!(phase = ?state.phase, "Ignoring completion outside mounted phase");
            return Effects::new();
        }

        match action {
            // ========== Intents ==========
            TodoAction::Mount => {
                if state.phase != Phase::Idle {
                    tracing::debug!(phase = ?state.phase, "Ignoring repeated mount");
                    return Effects::new();
                }
                state.phase = Phase::Mounted;
                state.loading = true;
                smallvec![Self::fetch(env, FetchOrigin::Mount), Self::watch_changes(env)]
            },

            TodoAction::Unmount => {
                if !state.is_mounted() {
                    return Effects::new();
                }
                state.phase = Phase::Unmounted;
                smallvec![Effect::Cancel(CHANGE_FEED)]
            },

            TodoAction::ChangeNotified => {
                if !state.is_mounted() {
                    return Effects::new();
                }
                smallvec![Self::fetch(env, FetchOrigin::ChangeNotification)]
            },

            TodoAction::Add { text, content } => {
                let text = text.trim().to_string();
                if text.is_empty() || !state.is_mounted() {
                    return Effects::new();
                }
                let repository = env.repository.clone();
                smallvec![Effect::future(async move {
                    Some(TodoAction::Created {
                        result: repository.create(&text, &content).await,
                    })
                })]
            },

            TodoAction::Toggle { id } => {
                let Some(current) = state.get(&id).filter(|_| state.is_mounted()) else {
                    return Effects::new();
                };
                let completed = !current.completed;
                let repository = env.repository.clone();
                smallvec![Effect::future(async move {
                    let result = repository.set_completed(&id, completed).await;
                    Some(TodoAction::Toggled { id, completed, result })
                })]
            },

            TodoAction::Remove { id } => {
                if !state.is_mounted() {
                    return Effects::new();
                }
                let repository = env.repository.clone();
                smallvec![Effect::future(async move {
                    let result = repository.delete(&id).await;
                    Some(TodoAction::Removed { id, result })
                })]
            },

            TodoAction::Edit { id, text, content } => {
                let text = text.trim().to_string();
                if text.is_empty() || state.get(&id).is_none() || !state.is_mounted() {
                    return Effects::new();
                }
                let repository = env.repository.clone();
                smallvec![Effect::future(async move {
                    let result = repository.update_content(&id, &text, &content).await;
                    Some(TodoAction::Edited {
                        id,
                        text,
                        content,
                        result,
                    })
                })]
            },

            // ========== Completions ==========
            TodoAction::Fetched { origin, result } => {
                Self::apply_fetch(state, origin, result);
                Effects::new()
            },

            TodoAction::Created { result } => {
                Self::apply_created(state, result);
                Effects::new()
            },

            TodoAction::Toggled {
                id,
                completed,
                result,
            } => {
                Self::apply_toggled(state, &id, completed, result);
                Effects::new()
            },

            TodoAction::Removed { id, result } => {
                Self::apply_removed(state, &id, result);
                Effects::new()
            },

            TodoAction::Edited {
                id,
                text,
                content,
                result,
            } => {
                Self::apply_edited(state, &id, text, content, result);
                Effects::new()
            },
        }
    }
}
