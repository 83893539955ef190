//! Declarative macros for ergonomic effect construction
//!
//! These macros reduce boilerplate when creating `Effect::Http` values from
//! inside a reducer.

/// Create an `Effect::Http` from a client, a request and two callbacks
///
/// The client expression is cloned with `Arc::clone`, so it can be a field of
/// the reducer environment.
///
/// # Example
///
/// ```rust,ignore
/// use todo_state_core::http_effect;
///
/// http_effect! {
///     client: env.http,
///     request: HttpRequest::delete(format!("/todos/{id}")),
///     on_success: |_response| None,
///     on_error: |error| Some(ListAction::SyncFailed { error: error.to_string() })
/// }
/// ```
#[macro_export]
macro_rules! http_effect {
    (
        client: $client:expr,
        request: $request:expr,
        on_success: |$success_param:pat_param| $success_body:expr,
        on_error: |$error_param:pat_param| $error_body:expr
    ) => {
        $crate::effect::Effect::Http($crate::effect::HttpOperation {
            client: ::std::sync::Arc::clone(&$client),
            request: $request,
            on_success: ::std::boxed::Box::new(move |$success_param| $success_body),
            on_error: ::std::boxed::Box::new(move |$error_param| $error_body),
        })
    };
}
