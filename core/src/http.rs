//! HTTP request descriptions and the client capability that executes them.
//!
//! Reducers never talk to the network. They describe the request they want
//! with an [`HttpRequest`] and hand it to the runtime inside an
//! [`Effect::Http`](crate::effect::Effect::Http); the runtime executes it
//! through an [`HttpClient`].
//!
//! # Implementations
//!
//! - `ReqwestHttpClient` (in the `todomvc` crate): Production implementation
//! - `RecordingHttpClient` (in `todo-state-testing`): Captures requests for assertions
//!
//! # Example
//!
//! ```no_run
//! use todo_state_core::http::{HttpClient, HttpError, HttpRequest};
//!
//! async fn example<C: HttpClient>(client: &C) -> Result<(), HttpError> {
//!     let response = client.execute(HttpRequest::get("/todos")).await?;
//!     let todos: Vec<serde_json::Value> = response.json()?;
//!     println!("{} todos", todos.len());
//!     Ok(())
//! }
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors that can occur while executing an HTTP request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// The request never produced a response (connection refused, DNS, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("Unexpected status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
}

/// HTTP methods used by the REST backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// The method name as it appears on the wire
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request relative to the client's base URL.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    /// Request method
    pub method: HttpMethod,
    /// Path starting with `/`
    pub path: String,
    /// Optional JSON body
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    /// `GET path`
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            body: None,
        }
    }

    /// `POST path` with a JSON body
    #[must_use]
    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            body: Some(body),
        }
    }

    /// `PATCH path` with a JSON body
    #[must_use]
    pub fn patch(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: HttpMethod::Patch,
            path: path.into(),
            body: Some(body),
        }
    }

    /// `DELETE path`
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Delete,
            path: path.into(),
            body: None,
        }
    }
}

/// A 2xx response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: String,
}

impl HttpResponse {
    /// Create a response
    #[must_use]
    pub const fn new(status: u16, body: String) -> Self {
        Self { status, body }
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Decode`] if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        serde_json::from_str(&self.body).map_err(|e| HttpError::Decode(e.to_string()))
    }
}

/// Executes [`HttpRequest`] descriptions.
///
/// Implementations resolve `request.path` against their own base URL and
/// must map non-2xx responses to [`HttpError::Status`].
///
/// # Dyn Compatibility
///
/// This trait uses explicit `Pin<Box<dyn Future>>` returns instead of `async fn`
/// so effects can capture an `Arc<dyn HttpClient>`.
pub trait HttpClient: Send + Sync {
    /// Execute a request.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Transport`] when no response arrives and
    /// [`HttpError::Status`] for non-2xx responses.
    fn execute(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + '_>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_error_display() {
        let error = HttpError::Status {
            status: 404,
            body: "not found".to_string(),
        };

        let display = format!("{error}");
        assert!(display.contains("404"));
        assert!(display.contains("not found"));
    }

    #[test]
    fn request_builders_set_method_and_body() {
        let get = HttpRequest::get("/todos");
        assert_eq!(get.method, HttpMethod::Get);
        assert!(get.body.is_none());

        let post = HttpRequest::post("/reset", json!({ "todos": [] }));
        assert_eq!(post.method, HttpMethod::Post);
        assert_eq!(post.body, Some(json!({ "todos": [] })));

        assert_eq!(HttpRequest::delete("/todos/1").method.to_string(), "DELETE");
    }

    #[test]
    fn response_json_reports_decode_errors() {
        let ok = HttpResponse::new(200, "[1,2,3]".to_string());
        assert_eq!(ok.json::<Vec<u8>>(), Ok(vec![1, 2, 3]));

        let bad = HttpResponse::new(200, "<html>".to_string());
        assert!(matches!(bad.json::<Vec<u8>>(), Err(HttpError::Decode(_))));
    }
}
