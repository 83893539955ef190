//! Configuration management for the todo application.
//!
//! Loads configuration from environment variables with sensible defaults.
//! A `.env` file in the working directory is honored.

use crate::loader::LoadOptions;
use crate::types::{Filter, Todo, TodoState};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors from loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The initial todos file could not be read
    #[error("Could not read initial todos from {path}: {source}")]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The initial todos file is not a JSON array of todos
    #[error("Invalid initial todos in {path}: {source}")]
    Parse {
        /// File that failed
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend base URL (`TODO_API_URL`, default `http://localhost:3000`)
    pub api_url: String,
    /// Load flow timing
    pub load: LoadConfig,
    /// Prometheus listener (`METRICS_ADDR`); metrics are off when unset
    pub metrics_addr: Option<SocketAddr>,
    /// Grace period for in-flight requests on exit (`TODO_SHUTDOWN_TIMEOUT_SECS`, default 5)
    pub shutdown_timeout_secs: u64,
    /// Filter the list starts with (`TODO_FILTER`, default `all`)
    pub initial_filter: Filter,
    /// JSON file with the todos the list starts with (`TODO_INITIAL_TODOS`)
    pub initial_todos: Option<PathBuf>,
}

/// Load flow timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    /// Query-string form, e.g. `delay=500&renderDelay=100` (`TODO_QUERY`)
    pub query: Option<String>,
    /// Milliseconds before the first load (`TODO_LOAD_DELAY_MS`)
    pub delay_ms: Option<u64>,
    /// Milliseconds between fetch and dispatch (`TODO_RENDER_DELAY_MS`)
    pub render_delay_ms: Option<u64>,
    /// Seconds between reloads, 0 disables (`TODO_RELOAD_INTERVAL_SECS`, default 60)
    pub reload_interval_secs: u64,
}

impl Config {
    /// Load configuration from the process environment and `.env`
    #[must_use]
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "Ignoring unreadable .env file");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup
    ///
    /// Unparseable values fall back to their defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parsed = |key: &str| lookup(key).and_then(|s| s.trim().parse().ok());

        Self {
            api_url: lookup("TODO_API_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            load: LoadConfig {
                query: lookup("TODO_QUERY"),
                delay_ms: parsed("TODO_LOAD_DELAY_MS"),
                render_delay_ms: parsed("TODO_RENDER_DELAY_MS"),
                reload_interval_secs: parsed("TODO_RELOAD_INTERVAL_SECS").unwrap_or(60),
            },
            metrics_addr: lookup("METRICS_ADDR").and_then(|s| s.trim().parse().ok()),
            shutdown_timeout_secs: parsed("TODO_SHUTDOWN_TIMEOUT_SECS").unwrap_or(5),
            initial_filter: lookup("TODO_FILTER")
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            initial_todos: lookup("TODO_INITIAL_TODOS").map(PathBuf::from),
        }
    }

    /// Load flow timing; explicit millisecond values win over `TODO_QUERY`
    #[must_use]
    pub fn load_options(&self) -> LoadOptions {
        let mut options = LoadOptions::default()
            .with_reload_interval(Duration::from_secs(self.load.reload_interval_secs));
        if let Some(query) = &self.load.query {
            options = options.merge_query(query);
        }
        if let Some(ms) = self.load.delay_ms {
            options = options.with_delay(Duration::from_millis(ms));
        }
        if let Some(ms) = self.load.render_delay_ms {
            options = options.with_render_delay(Duration::from_millis(ms));
        }
        options
    }

    /// Grace period for in-flight requests on exit
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// The state the store starts with
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the initial todos file cannot be read or parsed.
    pub fn initial_state(&self) -> Result<TodoState, ConfigError> {
        let todos = match &self.initial_todos {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                serde_json::from_str::<Vec<Todo>>(&raw).map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?
            }
            None => Vec::new(),
        };
        Ok(TodoState::new(todos).with_filter(self.initial_filter))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = Config::default();

        assert_eq!(config.api_url, "http://localhost:3000");
        assert_eq!(config.load_options(), LoadOptions::default());
        assert!(config.metrics_addr.is_none());
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(5));
        assert_eq!(config.initial_state().unwrap(), TodoState::default());
    }

    #[test]
    fn explicit_delays_override_query() {
        let config = config_from(&[
            ("TODO_QUERY", "delay=500&renderDelay=100"),
            ("TODO_LOAD_DELAY_MS", "50"),
            ("TODO_RELOAD_INTERVAL_SECS", "0"),
        ]);

        let options = config.load_options();

        assert_eq!(options.delay, Duration::from_millis(50));
        assert_eq!(options.render_delay, Duration::from_millis(100));
        assert_eq!(options.reload_interval, Duration::ZERO);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config_from(&[
            ("METRICS_ADDR", "not an address"),
            ("TODO_SHUTDOWN_TIMEOUT_SECS", "soon"),
            ("TODO_FILTER", "Completed"),
        ]);

        assert!(config.metrics_addr.is_none());
        assert_eq!(config.shutdown_timeout_secs, 5);
        assert_eq!(config.initial_filter, Filter::Completed);
    }

    #[test]
    fn initial_todos_from_file() {
        let path = std::env::temp_dir().join(format!("todomvc-initial-{}.json", std::process::id()));
        std::fs::write(&path, r#"[{"id":"1","title":"seeded","completed":true}]"#).unwrap();
        let config = config_from(&[
            ("TODO_INITIAL_TODOS", path.to_str().unwrap()),
            ("TODO_FILTER", "active"),
        ]);

        let state = config.initial_state().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(state.todos, vec![Todo::new("1", "seeded").with_completed(true)]);
        assert_eq!(state.filter, Filter::Active);
    }

    #[test]
    fn missing_initial_todos_file_is_an_error() {
        let config = config_from(&[("TODO_INITIAL_TODOS", "/nonexistent/todos.json")]);

        assert!(matches!(
            config.initial_state(),
            Err(ConfigError::Read { .. })
        ));
    }
}
