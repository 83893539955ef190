//! Top-level load flow.
//!
//! The [`Loader`] fetches the whole list from the backend and dispatches
//! [`TodoAction::Load`]. It runs once after an initial delay and then on a
//! fixed interval, overwriting local state with whatever the server returns.
//! Creates still in flight can be briefly lost until the next reload.

use crate::TodoStore;
use crate::error::TodoError;
use crate::rest::TodoRestClient;
use crate::types::TodoAction;
use reqwest::Url;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Timing of the load flow
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadOptions {
    /// Wait before the first load
    pub delay: Duration,
    /// Wait between receiving the todos and dispatching them
    pub render_delay: Duration,
    /// Period of the reloads; zero disables reloading
    pub reload_interval: Duration,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delay: Duration::ZERO,
            render_delay: Duration::ZERO,
            reload_interval: Self::DEFAULT_RELOAD_INTERVAL,
        }
    }
}

impl LoadOptions {
    /// Reload period when none is configured
    pub const DEFAULT_RELOAD_INTERVAL: Duration = Duration::from_secs(60);

    /// Parse `delay` and `renderDelay` (milliseconds) from a query string
    ///
    /// Unknown keys and values that are not non-negative numbers are ignored.
    ///
    /// ```
    /// use std::time::Duration;
    /// use todomvc::loader::LoadOptions;
    ///
    /// let options = LoadOptions::from_query("?delay=500&renderDelay=100");
    /// assert_eq!(options.delay, Duration::from_millis(500));
    /// assert_eq!(options.render_delay, Duration::from_millis(100));
    /// ```
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        Self::default().merge_query(query)
    }

    /// Override the fields named in `query`, keeping the others
    #[must_use]
    pub fn merge_query(mut self, query: &str) -> Self {
        let Ok(mut url) = Url::parse("http://localhost/") else {
            return self;
        };
        url.set_query(Some(query.trim_start_matches('?')));

        for (key, value) in url.query_pairs() {
            let Some(duration) = parse_millis(&value) else {
                tracing::debug!(%key, %value, "Ignoring query parameter");
                continue;
            };
            match &*key {
                "delay" => self.delay = duration,
                "renderDelay" => self.render_delay = duration,
                _ => {}
            }
        }
        self
    }

    /// Sets the initial delay
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the render delay
    #[must_use]
    pub const fn with_render_delay(mut self, render_delay: Duration) -> Self {
        self.render_delay = render_delay;
        self
    }

    /// Sets the reload period
    #[must_use]
    pub const fn with_reload_interval(mut self, reload_interval: Duration) -> Self {
        self.reload_interval = reload_interval;
        self
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // finite and non-negative
fn parse_millis(value: &str) -> Option<Duration> {
    let millis: f64 = value.trim().parse().ok()?;
    (millis.is_finite() && millis >= 0.0)
        .then(|| Duration::from_nanos((millis * 1_000_000.0).round() as u64))
}

/// Fetches todos from the backend and feeds them to the store
#[derive(Clone)]
pub struct Loader {
    client: TodoRestClient,
    store: TodoStore,
    options: LoadOptions,
}

impl Loader {
    /// Creates a loader dispatching into `store`
    #[must_use]
    pub const fn new(client: TodoRestClient, store: TodoStore, options: LoadOptions) -> Self {
        Self {
            client,
            store,
            options,
        }
    }

    /// Timing in use
    #[must_use]
    pub const fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Fetch once, wait the render delay, then dispatch `Load`
    ///
    /// Returns the number of todos loaded.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Http`] if the fetch fails (state is untouched) or
    /// [`TodoError::Store`] if the store is shutting down.
    #[tracing::instrument(skip(self), name = "load_todos")]
    pub async fn load_once(&self) -> Result<usize, TodoError> {
        let todos = self.client.load_all().await?;
        let count = todos.len();
        tracing::info!("loaded {count} {}", if count == 1 { "todo" } else { "todos" });

        if !self.options.render_delay.is_zero() {
            tokio::time::sleep(self.options.render_delay).await;
        }

        self.store.send(TodoAction::Load { todos }).await?;
        Ok(count)
    }

    /// Load after the initial delay, then on every reload tick
    ///
    /// Never returns unless reloading is disabled; failures are logged and
    /// the next tick tries again.
    pub async fn run(self) {
        let start = Instant::now();

        tokio::time::sleep(self.options.delay).await;
        self.load_logged().await;

        if self.options.reload_interval.is_zero() {
            tracing::debug!("Periodic reload disabled");
            return;
        }

        let period = self.options.reload_interval;
        let Some(first_tick) = start.checked_add(period) else {
            tracing::warn!(?period, "Reload interval out of range, periodic reload disabled");
            return;
        };
        let mut ticker = tokio::time::interval_at(first_tick, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.load_logged().await;
        }
    }

    /// Run on a background task
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn load_logged(&self) {
        if let Err(error) = self.load_once().await {
            tracing::warn!(%error, "Load failed, keeping current todos");
        }
    }
}
