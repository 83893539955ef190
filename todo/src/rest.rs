//! REST client for the todo backend.
//!
//! - `GET /todos` returns every todo
//! - `POST /todos` creates one
//! - `PATCH /todos/:id` updates fields of one
//! - `DELETE /todos/:id` removes one
//! - `POST /reset` with `{"todos": [...]}` replaces the whole collection
//!
//! [`TodoRequests`] builds request descriptions that reducers embed in
//! effects. [`ReqwestHttpClient`] sends descriptions over the network, and
//! [`TodoRestClient`] offers the typed calls used outside the reducer.

use crate::types::{Todo, TodoId, TodoPatch};
use reqwest::{Client, Method};
use serde_json::{Map, Value, json};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use todo_state_core::http::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse,
};

/// Collection endpoint
pub const TODOS_PATH: &str = "/todos";

/// Endpoint replacing the whole collection
pub const RESET_PATH: &str = "/reset";

/// Builders for every backend request
pub struct TodoRequests;

impl TodoRequests {
    /// `GET /todos`
    #[must_use]
    pub fn load_all() -> HttpRequest {
        HttpRequest::get(TODOS_PATH)
    }

    /// `POST /todos` with the full todo
    #[must_use]
    pub fn create(todo: &Todo) -> HttpRequest {
        HttpRequest::post(
            TODOS_PATH,
            json!({
                "id": todo.id,
                "title": todo.title,
                "completed": todo.completed,
            }),
        )
    }

    /// `PATCH /todos/:id` with the fields present in `patch`
    #[must_use]
    pub fn update(patch: &TodoPatch) -> HttpRequest {
        let mut fields = Map::new();
        if let Some(title) = &patch.title {
            fields.insert("title".to_string(), Value::from(title.as_str()));
        }
        if let Some(completed) = patch.completed {
            fields.insert("completed".to_string(), Value::from(completed));
        }
        HttpRequest::patch(Self::item_path(&patch.id), Value::Object(fields))
    }

    /// `DELETE /todos/:id`
    #[must_use]
    pub fn remove(id: &TodoId) -> HttpRequest {
        HttpRequest::delete(Self::item_path(id))
    }

    /// `POST /reset` replacing the collection with `todos`
    #[must_use]
    pub fn reset_all(todos: &[Todo]) -> HttpRequest {
        HttpRequest::post(RESET_PATH, json!({ "todos": todos }))
    }

    fn item_path(id: &TodoId) -> String {
        format!("{TODOS_PATH}/{id}")
    }
}

/// [`HttpClient`] backed by `reqwest`, resolving paths against a base URL
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient {
    client: Client,
    base_url: String,
}

impl ReqwestHttpClient {
    /// Create a client for `base_url` (e.g. `http://localhost:3000`)
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client reusing a configured `reqwest::Client`
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Base URL every request path is appended to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    const fn method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let url = format!("{}{}", self.base_url, request.path);
        tracing::debug!(method = %request.method, %url, "Sending request");

        let mut builder = self.client.request(Self::method(request.method), &url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        if status.is_success() {
            Ok(HttpResponse::new(status.as_u16(), body))
        } else {
            Err(HttpError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + '_>> {
        Box::pin(self.send(request))
    }
}

/// Typed operations on the todo backend
#[derive(Clone)]
pub struct TodoRestClient {
    http: Arc<dyn HttpClient>,
}

impl TodoRestClient {
    /// Wrap any [`HttpClient`]
    #[must_use]
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    /// Fetch every todo
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on transport failure, non-2xx status or an
    /// undecodable body.
    #[tracing::instrument(skip(self))]
    pub async fn load_all(&self) -> Result<Vec<Todo>, HttpError> {
        let response = self.http.execute(TodoRequests::load_all()).await?;
        response.json()
    }

    /// Create `todo` remotely
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on transport failure or non-2xx status.
    #[tracing::instrument(skip(self, todo), fields(id = %todo.id))]
    pub async fn create(&self, todo: &Todo) -> Result<(), HttpError> {
        self.http.execute(TodoRequests::create(todo)).await?;
        tracing::info!("added new todo");
        Ok(())
    }

    /// Apply `patch` remotely
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on transport failure or non-2xx status.
    #[tracing::instrument(skip(self, patch), fields(id = %patch.id))]
    pub async fn update(&self, patch: &TodoPatch) -> Result<(), HttpError> {
        self.http.execute(TodoRequests::update(patch)).await?;
        Ok(())
    }

    /// Delete the todo with `id` remotely
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on transport failure or non-2xx status.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, id: &TodoId) -> Result<(), HttpError> {
        self.http.execute(TodoRequests::remove(id)).await?;
        Ok(())
    }

    /// Replace the whole remote collection with `todos`
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on transport failure or non-2xx status.
    #[tracing::instrument(skip(self, todos), fields(count = todos.len()))]
    pub async fn reset_all(&self, todos: &[Todo]) -> Result<(), HttpError> {
        self.http.execute(TodoRequests::reset_all(todos)).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic
mod tests {
    use super::*;
    use todo_state_testing::RecordingHttpClient;

    #[test]
    fn create_request_carries_the_full_todo() {
        let request = TodoRequests::create(&Todo::new("42", "milk"));

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.path, "/todos");
        assert_eq!(
            request.body,
            Some(json!({ "id": "42", "title": "milk", "completed": false }))
        );
    }

    #[test]
    fn update_request_carries_present_fields_only() {
        let request = TodoRequests::update(&TodoPatch::new("42").with_completed(true));

        assert_eq!(request.method, HttpMethod::Patch);
        assert_eq!(request.path, "/todos/42");
        assert_eq!(request.body, Some(json!({ "completed": true })));
    }

    #[test]
    fn remove_and_reset_requests() {
        let remove = TodoRequests::remove(&TodoId::from("42"));
        assert_eq!(remove.method, HttpMethod::Delete);
        assert_eq!(remove.path, "/todos/42");
        assert!(remove.body.is_none());

        let reset = TodoRequests::reset_all(&[]);
        assert_eq!(reset.path, "/reset");
        assert_eq!(reset.body, Some(json!({ "todos": [] })));
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let client = ReqwestHttpClient::new("http://localhost:3000/");

        assert_eq!(client.base_url(), "http://localhost:3000");
    }

    #[tokio::test]
    async fn load_all_decodes_todos() {
        let http = RecordingHttpClient::responding_json(&json!([
            { "id": "1", "title": "a", "completed": true },
            { "id": "2", "title": "b", "completed": false },
        ]));
        let client = TodoRestClient::new(Arc::new(http.clone()));

        let todos = client.load_all().await.unwrap();

        assert_eq!(
            todos,
            vec![Todo::new("1", "a").with_completed(true), Todo::new("2", "b")]
        );
        assert_eq!(http.requests()[0], TodoRequests::load_all());
    }

    #[tokio::test]
    async fn load_all_rejects_malformed_body() {
        let http = RecordingHttpClient::responding_json(&json!({ "todos": "nope" }));
        let client = TodoRestClient::new(Arc::new(http));

        let result = client.load_all().await;

        assert!(matches!(result, Err(HttpError::Decode(_))));
    }

    #[tokio::test]
    async fn failures_propagate() {
        let http = RecordingHttpClient::failing(HttpError::Status {
            status: 500,
            body: "boom".to_string(),
        });
        let client = TodoRestClient::new(Arc::new(http.clone()));

        let result = client.remove(&TodoId::from("9")).await;

        assert!(matches!(result, Err(HttpError::Status { status: 500, .. })));
        assert_eq!(http.request_count(), 1);
    }
}
