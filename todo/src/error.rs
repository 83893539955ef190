//! Errors surfaced by the todo application.

use crate::config::ConfigError;
use thiserror::Error;
use todo_state_core::http::HttpError;
use todo_state_runtime::StoreError;

/// Errors from parsing user input, talking to the backend or driving the store
#[derive(Error, Debug)]
pub enum TodoError {
    /// Filter name not one of `all`, `active`, `completed`
    #[error("Unknown filter: {0} (expected all, active or completed)")]
    UnknownFilter(String),

    /// Command line not understood
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Command is missing an argument
    #[error("Missing argument for '{command}': {argument}")]
    MissingArgument {
        /// Command name
        command: &'static str,
        /// Argument name
        argument: &'static str,
    },

    /// Backend request failed
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Store rejected the action
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}
