//! Reducer logic for the todo list.
//!
//! The reducer updates the list optimistically and describes the backend
//! calls to make as [`Effect::Http`] values. It never waits for the network:
//! failures are logged by the effect callbacks and local state is kept.

use crate::rest::TodoRequests;
use crate::selectors;
use crate::types::{Todo, TodoAction, TodoId, TodoState};
use std::sync::Arc;
use todo_state_core::{
    SmallVec,
    effect::Effect,
    environment::{HttpClient, IdGenerator},
    http_effect,
    reducer::Reducer,
    smallvec,
};

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Source of ids for created todos
    pub ids: Arc<dyn IdGenerator>,
    /// Client the HTTP effects are executed with
    pub http: Arc<dyn HttpClient>,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(ids: Arc<dyn IdGenerator>, http: Arc<dyn HttpClient>) -> Self {
        Self { ids, http }
    }
}

/// Reducer for the todo list
#[derive(Clone, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn create_remotely(env: &TodoEnvironment, todo: &Todo) -> Effect<TodoAction> {
        let id = todo.id.clone();
        let failed_id = todo.id.clone();

        http_effect! {
            client: env.http,
            request: TodoRequests::create(todo),
            on_success: |_response| {
                tracing::info!(%id, "added new todo");
                None
            },
            on_error: |error| {
                tracing::warn!(id = %failed_id, %error, "could not create todo");
                None
            }
        }
    }

    fn remove_remotely(env: &TodoEnvironment, id: &TodoId) -> Effect<TodoAction> {
        let failed_id = id.clone();

        http_effect! {
            client: env.http,
            request: TodoRequests::remove(id),
            on_success: |_response| None,
            on_error: |error| {
                tracing::warn!(id = %failed_id, %error, "could not remove todo");
                None
            }
        }
    }

    fn reset_remotely(env: &TodoEnvironment, todos: &[Todo]) -> Effect<TodoAction> {
        http_effect! {
            client: env.http,
            request: TodoRequests::reset_all(todos),
            on_success: |_response| {
                tracing::debug!("backend reset");
                None
            },
            on_error: |error| {
                tracing::warn!(%error, "could not reset todos");
                None
            }
        }
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TodoAction::Load { todos } => {
                tracing::debug!(count = todos.len(), "Replacing todos");
                state.todos = todos;
                SmallVec::new()
            }

            TodoAction::Create { title } => {
                let todo = Todo::new(env.ids.next_id(), title);
                let effect = Self::create_remotely(env, &todo);
                state.todos.push(todo);
                smallvec![effect]
            }

            TodoAction::Update { values } => {
                // Duplicate ids are all patched
                for todo in state.todos.iter_mut().filter(|todo| todo.id == values.id) {
                    todo.apply(&values);
                }
                SmallVec::new()
            }

            TodoAction::Remove { id } => {
                state.todos.retain(|todo| todo.id != id);
                smallvec![Self::remove_remotely(env, &id)]
            }

            TodoAction::CompleteAll => {
                let completed = !selectors::all_completed(&state.todos);
                for todo in &mut state.todos {
                    todo.completed = completed;
                }
                SmallVec::new()
            }

            TodoAction::ClearCompleted => {
                let reset = selectors::all_completed(&state.todos);
                state.todos.retain(|todo| !todo.completed);
                if reset {
                    smallvec![Self::reset_remotely(env, &state.todos)]
                } else {
                    SmallVec::new()
                }
            }

            TodoAction::SetFilter { filter } => {
                state.filter = filter;
                SmallVec::new()
            }
        }
    }
}
