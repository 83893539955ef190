//! # Todo State Core
//!
//! Core traits and types for the todo state architecture.
//!
//! This crate provides the abstractions shared by the runtime and the todo
//! domain: the Reducer pattern, effect descriptions and injected capabilities.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state owned by a single store
//! - **Action**: Tagged description of a requested state change
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected capabilities (id generation, HTTP)
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell
//! - Unidirectional Data Flow
//! - Explicit Effects (no hidden I/O inside reducers)
//! - Dependency Injection via Environment
//!
//! ## Example
//!
//! ```ignore
//! use todo_state_core::*;
//!
//! impl Reducer for ListReducer {
//!     type State = Vec<String>;
//!     type Action = ListAction;
//!     type Environment = ListEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut Vec<String>,
//!         action: ListAction,
//!         env: &ListEnvironment,
//!     ) -> SmallVec<[Effect<ListAction>; 4]> {
//!         match action {
//!             ListAction::Push(item) => {
//!                 state.push(item);
//!                 SmallVec::new()
//!             }
//!         }
//!     }
//! }
//! ```

// Re-export commonly used types
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

/// HTTP request descriptions and the client capability that executes them
pub mod http;

/// Declarative macros for building effects
pub mod effect_macros;

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
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
        /// This is a pure function that:
        /// 1. Updates state in place
        /// 2. Returns effect descriptions to be executed by the runtime
        ///
        /// Reducers never perform I/O themselves.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable.
pub mod effect {
    use crate::http::{HttpClient, HttpError, HttpRequest, HttpResponse};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Arc;

    /// Callback invoked with the outcome of an HTTP effect
    pub type HttpCallback<T, Action> = Box<dyn FnOnce(T) -> Option<Action> + Send>;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),

        /// Fire-and-forget HTTP request
        Http(HttpOperation<Action>),
    }

    /// An HTTP request together with the client that executes it and the
    /// callbacks that turn its outcome into an optional follow-up action
    pub struct HttpOperation<Action> {
        /// Client used to execute the request
        pub client: Arc<dyn HttpClient>,
        /// The request description
        pub request: HttpRequest,
        /// Called with the response of a 2xx request
        pub on_success: HttpCallback<HttpResponse, Action>,
        /// Called with the failure of a request
        pub on_error: HttpCallback<HttpError, Action>,
    }

    impl<Action> HttpOperation<Action> {
        /// Create an operation whose callbacks produce no follow-up action
        #[must_use]
        pub fn fire_and_forget(client: Arc<dyn HttpClient>, request: HttpRequest) -> Self {
            Self {
                client,
                request,
                on_success: Box::new(|_| None),
                on_error: Box::new(|_| None),
            }
        }
    }

    impl<Action> std::fmt::Debug for HttpOperation<Action> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("HttpOperation")
                .field("request", &self.request)
                .finish_non_exhaustive()
        }
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
                Effect::Http(op) => f.debug_tuple("Effect::Http").field(&op.request).finish(),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Collect every HTTP request described by this effect, depth first
        #[must_use]
        pub fn http_requests(&self) -> Vec<&HttpRequest> {
            match self {
                Effect::Http(op) => vec![&op.request],
                Effect::Parallel(effects) | Effect::Sequential(effects) => {
                    effects.iter().flat_map(Effect::http_requests).collect()
                },
                Effect::None | Effect::Future(_) => Vec::new(),
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    pub use crate::http::HttpClient;

    /// Id generation capability
    ///
    /// Reducers that mint identifiers receive one of these through their
    /// environment, so tests can supply a deterministic implementation.
    /// Any `Fn() -> String` closure is an `IdGenerator`.
    ///
    /// # Examples
    ///
    /// ```
    /// use todo_state_core::environment::IdGenerator;
    ///
    /// let fixed = || "42".to_string();
    /// assert_eq!(fixed.next_id(), "42");
    /// ```
    pub trait IdGenerator: Send + Sync {
        /// Produce a fresh identifier
        fn next_id(&self) -> String;
    }

    impl<F> IdGenerator for F
    where
        F: Fn() -> String + Send + Sync,
    {
        fn next_id(&self) -> String {
            self()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::{Effect, HttpOperation};
    use super::http::{HttpClient, HttpError, HttpRequest, HttpResponse};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Arc;

    struct NoopClient;

    impl HttpClient for NoopClient {
        fn execute(
            &self,
            _request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + '_>> {
            Box::pin(async { Ok(HttpResponse::new(200, String::new())) })
        }
    }

    fn http(path: &str) -> Effect<()> {
        Effect::Http(HttpOperation::fire_and_forget(
            Arc::new(NoopClient),
            HttpRequest::delete(path),
        ))
    }

    #[test]
    fn http_requests_walks_nested_effects() {
        let effect = Effect::merge(vec![
            http("/todos/1"),
            Effect::None,
            Effect::chain(vec![http("/todos/2"), http("/todos/3")]),
        ]);

        let paths: Vec<_> = effect
            .http_requests()
            .into_iter()
            .map(|r| r.path.as_str())
            .collect();
        assert_eq!(paths, vec!["/todos/1", "/todos/2", "/todos/3"]);
    }

    #[test]
    fn debug_shows_request_not_callbacks() {
        let rendered = format!("{:?}", http("/todos/9"));
        assert!(rendered.contains("Effect::Http"));
        assert!(rendered.contains("/todos/9"));
    }

    #[test]
    fn closures_are_id_generators() {
        use super::environment::IdGenerator;

        let generator: Box<dyn IdGenerator> = Box::new(|| "abc".to_string());
        assert_eq!(generator.next_id(), "abc");
    }
}
