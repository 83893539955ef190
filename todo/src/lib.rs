//! TodoMVC list state on the todo state runtime.
//!
//! A todo list managed through a reducer and a store:
//!
//! - Optimistic local updates for create, edit, toggle, remove and clear
//! - Backend calls described as HTTP effects and run by the store
//! - Pure selectors for completed, remaining and visible todos
//! - A load flow that fetches the list after an initial delay and reloads it
//!   periodically
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use todomvc::ids::RandomIdGenerator;
//! use todomvc::rest::ReqwestHttpClient;
//! use todomvc::{TodoAction, TodoEnvironment, TodoReducer, TodoState, TodoStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let http = Arc::new(ReqwestHttpClient::new("http://localhost:3000"));
//! let env = TodoEnvironment::new(Arc::new(RandomIdGenerator), http);
//! let store = TodoStore::new(TodoState::default(), TodoReducer::new(), env);
//!
//! // Appended locally right away, POSTed in the background
//! let mut handle = store
//!     .send(TodoAction::Create {
//!         title: "Buy milk".to_string(),
//!     })
//!     .await?;
//! handle.wait().await;
//!
//! let state = store.state(Clone::clone).await;
//! println!("Total todos: {}", state.count());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod ids;
pub mod loader;
pub mod reducer;
pub mod rest;
pub mod selectors;
pub mod types;

use todo_state_runtime::Store;

// Re-export commonly used types
pub use error::TodoError;
pub use reducer::{TodoEnvironment, TodoReducer};
pub use types::{Filter, Todo, TodoAction, TodoId, TodoPatch, TodoState};

/// Store running the todo reducer
pub type TodoStore = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;
