//! Store-level tests: reducer, subscribers, selections and HTTP effects together.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use todo_state_core::http::{HttpError, HttpMethod};
use todo_state_testing::{RecordingHttpClient, SequentialIdGenerator, init_tracing};
use todomvc::selectors;
use todomvc::{Filter, Todo, TodoAction, TodoEnvironment, TodoId, TodoPatch, TodoReducer, TodoState, TodoStore};

fn store_with(http: &RecordingHttpClient, todos: Vec<Todo>) -> TodoStore {
    init_tracing();
    let env = TodoEnvironment::new(
        Arc::new(SequentialIdGenerator::new()),
        Arc::new(http.clone()),
    );
    TodoStore::new(TodoState::new(todos), TodoReducer::new(), env)
}

#[tokio::test]
async fn create_updates_locally_and_posts() {
    let http = RecordingHttpClient::new();
    let store = store_with(&http, Vec::new());

    let mut handle = store
        .send(TodoAction::Create {
            title: "write tests".to_string(),
        })
        .await
        .unwrap();
    handle.wait().await;

    let todos = store.state(|s| s.todos.clone()).await;
    assert_eq!(todos, vec![Todo::new("1", "write tests")]);

    let requests = http.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, HttpMethod::Post);
    assert_eq!(requests[0].path, "/todos");
    assert_eq!(
        requests[0].body,
        Some(json!({ "id": "1", "title": "write tests", "completed": false }))
    );
}

#[tokio::test]
async fn failed_requests_keep_optimistic_state() {
    let http = RecordingHttpClient::failing(HttpError::Transport("connection refused".to_string()));
    let store = store_with(&http, vec![Todo::new("a", "existing")]);

    for action in [
        TodoAction::Create {
            title: "offline".to_string(),
        },
        TodoAction::Remove {
            id: TodoId::from("a"),
        },
    ] {
        store.send(action).await.unwrap().wait().await;
    }

    let todos = store.state(|s| s.todos.clone()).await;
    assert_eq!(todos, vec![Todo::new("1", "offline")]);
    assert_eq!(http.request_count(), 2);
}

#[tokio::test]
async fn clear_completed_resets_backend_once_when_everything_was_done() {
    let http = RecordingHttpClient::new();
    let store = store_with(
        &http,
        vec![
            Todo::new("1", "a").with_completed(true),
            Todo::new("2", "b").with_completed(true),
        ],
    );

    store
        .send(TodoAction::ClearCompleted)
        .await
        .unwrap()
        .wait()
        .await;
    store
        .send(TodoAction::ClearCompleted)
        .await
        .unwrap()
        .wait()
        .await;

    assert!(store.state(|s| s.todos.is_empty()).await);
    let requests = http.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/reset");
    assert_eq!(requests[0].body, Some(json!({ "todos": [] })));
}

#[tokio::test]
async fn only_remote_actions_issue_requests() {
    let http = RecordingHttpClient::new();
    let store = store_with(&http, vec![Todo::new("1", "a"), Todo::new("2", "b")]);

    for action in [
        TodoAction::Update {
            values: TodoPatch::new("1").with_completed(true),
        },
        TodoAction::CompleteAll,
        TodoAction::ClearCompleted,
        TodoAction::SetFilter {
            filter: Filter::Active,
        },
        TodoAction::Load { todos: Vec::new() },
    ] {
        store.send(action).await.unwrap().wait().await;
    }

    // CompleteAll finished the list, so the clear reset the backend
    let paths: Vec<String> = http.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, ["/reset"]);
}

#[tokio::test]
async fn subscribers_see_every_state() {
    let http = RecordingHttpClient::new();
    let store = store_with(&http, Vec::new());
    let seen = Arc::new(Mutex::new(Vec::new()));

    let recorder = Arc::clone(&seen);
    let id = store.subscribe(move |state: &TodoState| {
        recorder.lock().unwrap().push(state.count());
    });

    for title in ["a", "b"] {
        store
            .send(TodoAction::Create {
                title: title.to_string(),
            })
            .await
            .unwrap();
    }
    store.send(TodoAction::ClearCompleted).await.unwrap();

    assert!(store.unsubscribe(id));
    store
        .send(TodoAction::Remove {
            id: TodoId::from("1"),
        })
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![1, 2, 2]);
}

#[tokio::test]
async fn selections_follow_the_store() {
    let http = RecordingHttpClient::new();
    let store = store_with(&http, vec![Todo::new("1", "a"), Todo::new("2", "b")]);

    let mut remaining = store.select(|s: &TodoState| selectors::remaining_count(&s.todos));
    let visible = store.select(|s: &TodoState| {
        selectors::select_visible(s)
            .into_iter()
            .map(|todo| todo.id.clone())
            .collect::<Vec<_>>()
    });
    assert_eq!(remaining.get(), 2);

    store
        .send(TodoAction::Update {
            values: TodoPatch::new("2").with_completed(true),
        })
        .await
        .unwrap();
    let next = tokio::time::timeout(Duration::from_secs(1), remaining.changed())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(next, 1);

    store
        .send(TodoAction::SetFilter {
            filter: Filter::Completed,
        })
        .await
        .unwrap();
    assert_eq!(visible.get(), vec![TodoId::from("2")]);
}

#[tokio::test]
async fn shutdown_rejects_further_actions() {
    let http = RecordingHttpClient::new();
    let store = store_with(&http, Vec::new());

    store.shutdown(Duration::from_secs(1)).await.unwrap();
    let result = store.send(TodoAction::CompleteAll).await;

    assert!(result.is_err());
    assert_eq!(http.request_count(), 0);
}
