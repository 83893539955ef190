//! # Todo State Testing
//!
//! Testing utilities and helpers for the todo state architecture.
//!
//! This crate provides:
//! - Mock implementations of Environment capabilities
//! - A Given-When-Then harness for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use todo_state_testing::{RecordingHttpClient, SequentialIdGenerator};
//! use todo_state_runtime::Store;
//!
//! #[tokio::test]
//! async fn creates_remotely() {
//!     let http = RecordingHttpClient::new();
//!     let env = ListEnvironment::new(Arc::new(SequentialIdGenerator::new()), Arc::new(http.clone()));
//!     let store = Store::new(ListState::default(), ListReducer, env);
//!
//!     let mut handle = store.send(ListAction::Create { title: "a".into() }).await?;
//!     handle.wait().await;
//!
//!     assert_eq!(http.requests().len(), 1);
//! }
//! ```

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use todo_state_core::environment::IdGenerator;
use todo_state_core::http::{HttpClient, HttpError, HttpRequest, HttpResponse};


/// Mock implementations of Environment capabilities
pub mod mocks {
    use super::{
        Arc, AtomicU64, Future, HttpClient, HttpError, HttpRequest, HttpResponse, IdGenerator,
        Mutex, Ordering, Pin, PoisonError, VecDeque,
    };

    /// Predictable ids: `"1"`, `"2"`, `"3"`, ...
    ///
    /// # Example
    ///
    /// ```
    /// use todo_state_testing::mocks::SequentialIdGenerator;
    /// use todo_state_core::environment::IdGenerator;
    ///
    /// let ids = SequentialIdGenerator::new();
    /// assert_eq!(ids.next_id(), "1");
    /// assert_eq!(ids.next_id(), "2");
    /// ```
    #[derive(Debug, Default)]
    pub struct SequentialIdGenerator {
        last: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Start counting from 1
        #[must_use]
        pub const fn new() -> Self {
            Self {
                last: AtomicU64::new(0),
            }
        }

        /// Continue after `last` (the next id is `last + 1`)
        #[must_use]
        pub const fn starting_after(last: u64) -> Self {
            Self {
                last: AtomicU64::new(last),
            }
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> String {
            (self.last.fetch_add(1, Ordering::SeqCst) + 1).to_string()
        }
    }

    /// HTTP client that records every request and replays canned outcomes
    ///
    /// Outcomes queued with [`push_outcome`](Self::push_outcome) are consumed
    /// first, in order; after that every request gets the default outcome
    /// (`200` with an empty body unless changed).
    ///
    /// Clones share the same recording, so keep one clone for assertions and
    /// inject another into the environment.
    #[derive(Clone, Debug)]
    pub struct RecordingHttpClient {
        requests: Arc<Mutex<Vec<HttpRequest>>>,
        queued: Arc<Mutex<VecDeque<Result<HttpResponse, HttpError>>>>,
        default_outcome: Arc<Mutex<Result<HttpResponse, HttpError>>>,
    }

    impl Default for RecordingHttpClient {
        fn default() -> Self {
            Self::new()
        }
    }

    impl RecordingHttpClient {
        /// Client answering `200` with an empty body
        #[must_use]
        pub fn new() -> Self {
            Self {
                requests: Arc::new(Mutex::new(Vec::new())),
                queued: Arc::new(Mutex::new(VecDeque::new())),
                default_outcome: Arc::new(Mutex::new(Ok(HttpResponse::new(200, String::new())))),
            }
        }

        /// Client failing every request with `error`
        #[must_use]
        pub fn failing(error: HttpError) -> Self {
            let client = Self::new();
            client.set_default_outcome(Err(error));
            client
        }

        /// Client answering every request with a `200` JSON body
        #[must_use]
        pub fn responding_json(body: &serde_json::Value) -> Self {
            let client = Self::new();
            client.set_default_outcome(Ok(HttpResponse::new(200, body.to_string())));
            client
        }

        /// Replace the outcome used once the queue is empty
        pub fn set_default_outcome(&self, outcome: Result<HttpResponse, HttpError>) {
            *self
                .default_outcome
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = outcome;
        }

        /// Queue an outcome for the next unanswered request
        pub fn push_outcome(&self, outcome: Result<HttpResponse, HttpError>) {
            self.queued
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_back(outcome);
        }

        /// Every request executed so far, in order
        #[must_use]
        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Number of requests executed so far
        #[must_use]
        pub fn request_count(&self) -> usize {
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        }

        fn next_outcome(&self) -> Result<HttpResponse, HttpError> {
            let queued = self
                .queued
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();

            queued.unwrap_or_else(|| {
                self.default_outcome
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone()
            })
        }
    }

    impl HttpClient for RecordingHttpClient {
        fn execute(
            &self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + '_>> {
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(request);
            let outcome = self.next_outcome();
            Box::pin(async move { outcome })
        }
    }
}

/// Test helpers and utilities
pub mod helpers {
    /// Install a test-friendly `tracing` subscriber once per test binary
    ///
    /// Honors `RUST_LOG`; silently does nothing if a subscriber is already set.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with_test_writer()
            .try_init();
    }
}

// Re-export commonly used items
pub use helpers::init_tracing;
pub use mocks::{RecordingHttpClient, SequentialIdGenerator};
pub use reducer_test::{ReducerTest, assertions};

#[cfg(test)]
mod tests {
    use super::*;
    use todo_state_core::http::HttpMethod;

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIdGenerator::starting_after(41);
        assert_eq!(ids.next_id(), "42");
        assert_eq!(ids.next_id(), "43");
    }

    #[tokio::test]
    async fn test_recording_client_records_and_replays() {
        let client = RecordingHttpClient::new();
        client.push_outcome(Err(HttpError::Transport("down".to_string())));

        let first = client.execute(HttpRequest::get("/todos")).await;
        let second = client.execute(HttpRequest::delete("/todos/1")).await;

        assert!(matches!(first, Err(HttpError::Transport(_))));
        assert_eq!(second, Ok(HttpResponse::new(200, String::new())));

        let requests = client.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, HttpMethod::Get);
        assert_eq!(requests[1].path, "/todos/1");
    }

    #[tokio::test]
    async fn test_clones_share_recording() {
        let client = RecordingHttpClient::failing(HttpError::Status {
            status: 500,
            body: String::new(),
        });
        let injected = client.clone();

        let outcome = injected.execute(HttpRequest::get("/todos")).await;

        assert!(matches!(outcome, Err(HttpError::Status { status: 500, .. })));
        assert_eq!(client.request_count(), 1);
    }
}
