//! # Todo State Runtime
//!
//! Runtime implementation for the todo state architecture.
//!
//! This crate provides the Store runtime that coordinates reducer execution,
//! state publication and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: Owns the single state value, runs the reducer, notifies subscribers
//! - **Effect Runner**: Executes effect descriptions outside the reduction step
//! - **Selection**: Live, subscribable view of a slice of the state
//!
//! ## Example
//!
//! ```ignore
//! use todo_state_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Observe every new state
//! store.subscribe(|state| println!("{} items", state.items.len()));
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use std::sync::Arc;
use todo_state_core::{
    effect::{Effect, HttpOperation},
    reducer::Reducer,
};
use tokio::sync::RwLock;

/// Prometheus metrics for observability
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// Some effects were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for effects to complete
        #[error("Timeout waiting for effects")]
        Timeout,

        /// State channel closed
        ///
        /// The store that fed a [`Selection`](crate::Selection) was dropped.
        #[error("State channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

/// Configuration for Store instances
///
/// # Example
///
/// ```ignore
/// let config = StoreConfig::default()
///     .with_shutdown_timeout(Duration::from_secs(5));
///
/// let store = Store::with_config(state, reducer, env, config);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Default timeout for graceful shutdown
    pub default_shutdown_timeout: Duration,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub const fn new(default_shutdown_timeout: Duration) -> Self {
        Self {
            default_shutdown_timeout,
        }
    }

    /// Set the default shutdown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.default_shutdown_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for the effects of one
/// action to complete. Sending never waits on its own: network effects are
/// fire-and-forget unless the caller explicitly awaits this handle.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(Action::Start).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// // All effects from Action::Start are now complete
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a new effect handle
    ///
    /// Returns the handle given to the caller and the tracking context used
    /// internally during effect execution.
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: tx,
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (tx, rx) = watch::channel(());
        let _ = tx.send(());

        Self {
            effects: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Number of effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait for all effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                break;
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: Effect tracking context passed through effect execution
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: watch::Sender<()>,
}

impl EffectTracking {
    /// Increment the effect counter (effect started)
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the effect counter (effect completed)
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Counter reached zero, notify waiters
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements effect counter on drop
///
/// Ensures the effect counter is always decremented, even if the effect panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Guard that decrements an atomic counter on drop (for shutdown tracking)
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Identifies a callback registered with [`Store::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback invoked with every new state
type Subscriber<S> = Arc<dyn Fn(&S) + Send + Sync>;

/// Internal: the injected callback list
struct Subscribers<S> {
    next_id: AtomicU64,
    entries: Mutex<Vec<(SubscriptionId, Subscriber<S>)>>,
}

impl<S> Subscribers<S> {
    fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            entries: Mutex::new(Vec::new()),
        }
    }

    fn add(&self, subscriber: Subscriber<S>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, subscriber));
        id
    }

    fn remove(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        entries.len() != before
    }

    fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Call every subscriber in registration order.
    ///
    /// The list is copied first so callbacks may unsubscribe themselves.
    fn notify(&self, state: &S) {
        let snapshot: Vec<Subscriber<S>> = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, subscriber)| Arc::clone(subscriber))
            .collect();

        for subscriber in snapshot {
            subscriber(state);
        }
    }
}

/// A live, subscribable view of one slice of the store's state
///
/// Created by [`Store::select`]. The projection is re-applied to the latest
/// published state on every read, so no value is cached.
///
/// # Example
///
/// ```ignore
/// let mut todos = store.select(|s| s.todos.clone());
/// println!("now: {:?}", todos.get());
/// let next = todos.changed().await?;
/// ```
pub struct Selection<S, T> {
    receiver: watch::Receiver<S>,
    projection: Arc<dyn Fn(&S) -> T + Send + Sync>,
}

impl<S, T> Selection<S, T> {
    /// Project the most recently published state
    #[must_use]
    pub fn get(&self) -> T {
        (self.projection)(&self.receiver.borrow())
    }

    /// Wait for the next published state and project it
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ChannelClosed`] once every clone of the store is dropped.
    pub async fn changed(&mut self) -> Result<T, StoreError> {
        self.receiver
            .changed()
            .await
            .map_err(|_| StoreError::ChannelClosed)?;
        Ok((self.projection)(&self.receiver.borrow_and_update()))
    }
}

impl<S, T> Clone for Selection<S, T> {
    fn clone(&self) -> Self {
        Self {
            receiver: self.receiver.clone(),
            projection: Arc::clone(&self.projection),
        }
    }
}

/// Store module - The runtime for reducers
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicCounterGuard, AtomicUsize, DecrementGuard, Duration, Effect,
        EffectHandle, EffectTracking, HttpOperation, Ordering, Reducer, RwLock, Selection,
        StoreConfig, StoreError, SubscriptionId, Subscribers,
    };
    use std::future::Future;
    use tokio::sync::watch;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`, the single source of truth)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Subscribers (callbacks and watch-based selections)
    /// 5. Effect execution (with feedback loop)
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        config: StoreConfig,
        snapshots: Arc<watch::Sender<S>>,
        subscribers: Arc<Subscribers<S>>,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + 'static,
        S: Clone + Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// Uses [`StoreConfig::default()`].
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        #[must_use]
        pub fn with_config(
            initial_state: S,
            reducer: R,
            environment: E,
            config: StoreConfig,
        ) -> Self {
            let (snapshots, _) = watch::channel(initial_state.clone());

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                config,
                snapshots: Arc::new(snapshots),
                subscribers: Arc::new(Subscribers::new()),
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// The environment this store injects into its reducer
        #[must_use]
        pub const fn environment(&self) -> &E {
            &self.environment
        }

        /// Register a callback invoked with the new state after every action
        ///
        /// Callbacks run synchronously inside `send()`, in registration order,
        /// before any effect starts. They must not call `send()` themselves:
        /// dispatch is not re-entrant.
        pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
        where
            F: Fn(&S) + Send + Sync + 'static,
        {
            let id = self.subscribers.add(Arc::new(callback));
            tracing::debug!(subscription = ?id, "Subscriber registered");
            id
        }

        /// Remove a callback registered with [`subscribe`](Self::subscribe)
        ///
        /// Returns `false` if the subscription was already gone.
        pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
            let removed = self.subscribers.remove(id);
            tracing::debug!(subscription = ?id, removed, "Subscriber removed");
            removed
        }

        /// Number of registered callbacks
        #[must_use]
        pub fn subscriber_count(&self) -> usize {
            self.subscribers.len()
        }

        /// Live view of a slice of the state
        ///
        /// # Example
        ///
        /// ```ignore
        /// let completed = store.select(|s| s.todos.iter().filter(|t| t.completed).count());
        /// ```
        #[must_use]
        pub fn select<T, F>(&self, projection: F) -> Selection<S, T>
        where
            F: Fn(&S) -> T + Send + Sync + 'static,
        {
            Selection {
                receiver: self.snapshots.subscribe(),
                projection: Arc::new(projection),
            }
        }

        /// Raw watch receiver over whole state snapshots
        #[must_use]
        pub fn subscribe_state(&self) -> watch::Receiver<S> {
            self.snapshots.subscribe()
        }

        /// Number of effects currently running across all actions
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::Acquire)
        }

        /// Initiate graceful shutdown of the store
        ///
        /// This method:
        /// 1. Sets the shutdown flag (rejecting new actions)
        /// 2. Waits for pending effects to complete (with timeout)
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before all
        /// pending effects complete.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            metrics::counter!("store.shutdown.initiated").increment(1);

            self.shutdown.store(true, Ordering::Release);

            let start = std::time::Instant::now();
            let poll_interval = Duration::from_millis(20);

            loop {
                let pending = self.pending_effects.load(Ordering::Acquire);

                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    metrics::counter!("store.shutdown.completed").increment(1);
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(
                        pending_effects = pending,
                        "Shutdown timeout: {} effects still running", pending
                    );
                    metrics::counter!("store.shutdown.timeout").increment(1);
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tracing::debug!(
                    pending_effects = pending,
                    elapsed_ms = start.elapsed().as_millis(),
                    "Waiting for effects to complete"
                );

                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Shut down using the configured default timeout
        ///
        /// # Errors
        ///
        /// See [`shutdown`](Self::shutdown).
        pub async fn shutdown_with_default(&self) -> Result<(), StoreError> {
            self.shutdown(self.config.default_shutdown_timeout).await
        }

        /// Send an action to the store
        ///
        /// This is the only way to change state:
        /// 1. Acquires write lock on state
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Publishes the new state to selections and subscriber callbacks
        /// 4. Starts the returned effects asynchronously
        ///
        /// # Concurrency and Effect Execution
        ///
        /// - The reducer executes synchronously while holding a write lock
        /// - Concurrent `send()` calls serialize at the reducer level
        /// - Effects execute in spawned tasks; `send()` never waits for them
        /// - Effects may complete in non-deterministic order
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError>
        where
            R: Clone,
            E: Clone,
        {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            tracing::debug!("Processing action");
            metrics::counter!("store.commands.total").increment(1);

            let (handle, tracking) = EffectHandle::new();

            let effects = {
                let mut state = self.state.write().await;
                tracing::trace!("Acquired write lock on state");

                let span = tracing::debug_span!("reducer_execution");
                let _enter = span.enter();

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                metrics::histogram!("store.reducer.duration_seconds")
                    .record(start.elapsed().as_secs_f64());

                tracing::trace!("Reducer completed, returned {} effects", effects.len());

                // Publish while still holding the lock so observers see
                // states in dispatch order
                self.snapshots.send_replace(state.clone());
                self.subscribers.notify(&state);

                effects
            };

            tracing::trace!("Executing {} effects", effects.len());
            for effect in effects {
                self.execute_effect_internal(effect, &tracking);
            }

            Ok(handle)
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let count = store.state(|s| s.todos.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Spawn a tracked effect task and feed its action (if any) back into the store
        fn spawn_tracked<Fut>(&self, tracking: &EffectTracking, fut: Fut)
        where
            R: Clone,
            E: Clone,
            Fut: Future<Output = Option<A>> + Send + 'static,
        {
            tracking.increment();
            let guard = DecrementGuard(tracking.clone());

            // Track global pending effects for shutdown
            self.pending_effects.fetch_add(1, Ordering::SeqCst);
            let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

            let store = self.clone();

            tokio::spawn(async move {
                let _guard = guard;
                let _pending_guard = pending_guard;

                if let Some(action) = fut.await {
                    tracing::trace!("Effect produced an action, sending to store");
                    if let Err(error) = store.send(action).await {
                        tracing::warn!(error = %error, "Dropped action produced by effect");
                    }
                }
            });
        }

        /// Execute an effect with tracking
        ///
        /// # Effect Types
        ///
        /// - `None`: No-op
        /// - `Future`: Executes async computation, sends resulting action if `Some`
        /// - `Http`: Executes the request, logs failures, hands the outcome to its callbacks
        /// - `Parallel`: Executes effects concurrently
        /// - `Sequential`: Executes effects in order, waiting for each to complete
        ///
        /// # Error Handling Strategy
        ///
        /// Effects are fire-and-forget. Failures are logged and counted; they are
        /// never retried and never roll back state.
        #[tracing::instrument(skip(self, effect, tracking), name = "execute_effect")]
        fn execute_effect_internal(&self, effect: Effect<A>, tracking: &EffectTracking)
        where
            R: Clone,
            E: Clone,
        {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Future(fut) => {
                    tracing::trace!("Executing Effect::Future");
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    self.spawn_tracked(tracking, fut);
                },
                Effect::Http(HttpOperation {
                    client,
                    request,
                    on_success,
                    on_error,
                }) => {
                    tracing::trace!(method = %request.method, path = %request.path, "Executing Effect::Http");
                    metrics::counter!("store.effects.executed", "type" => "http").increment(1);

                    self.spawn_tracked(tracking, async move {
                        let method = request.method;
                        let path = request.path.clone();

                        let start = std::time::Instant::now();
                        let outcome = client.execute(request).await;
                        metrics::histogram!("store.http.duration_seconds")
                            .record(start.elapsed().as_secs_f64());

                        match outcome {
                            Ok(response) => {
                                tracing::debug!(
                                    %method,
                                    %path,
                                    status = response.status,
                                    "HTTP effect succeeded"
                                );
                                on_success(response)
                            },
                            Err(error) => {
                                tracing::warn!(
                                    %method,
                                    %path,
                                    error = %error,
                                    "HTTP effect failed, local state kept"
                                );
                                metrics::counter!("store.http.failures").increment(1);
                                on_error(error)
                            },
                        }
                    });
                },
                Effect::Parallel(effects) => {
                    tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                    metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);

                    for effect in effects {
                        self.execute_effect_internal(effect, tracking);
                    }
                },
                Effect::Sequential(effects) => {
                    let effect_count = effects.len();
                    tracing::trace!("Executing Effect::Sequential with {} effects", effect_count);
                    metrics::counter!("store.effects.executed", "type" => "sequential").increment(1);

                    let store = self.clone();
                    self.spawn_tracked(tracking, async move {
                        for (idx, effect) in effects.into_iter().enumerate() {
                            tracing::trace!(
                                "Executing sequential effect {} of {}",
                                idx + 1,
                                effect_count
                            );

                            let (mut sub_handle, sub_tracking) = EffectHandle::new();
                            store.execute_effect_internal(effect, &sub_tracking);
                            drop(sub_tracking);
                            sub_handle.wait().await;
                        }
                        tracing::trace!("Effect::Sequential completed");
                        None
                    });
                },
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                config: self.config.clone(),
                snapshots: Arc::clone(&self.snapshots),
                subscribers: Arc::clone(&self.subscribers),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;
