//! # Order Detail Runtime
//!
//! Runtime implementation for the order detail engine.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling, plus the two publishing primitives the engine exposes
//! to its consumer.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that manages state and executes effects
//! - **Effect Executor**: Executes effect descriptions and feeds actions back to reducers
//! - **Observable**: A value cell that notifies subscribers synchronously on every write
//! - **Event channel**: One-shot notifications delivered to a single observer
//!
//! ## Example
//!
//! ```ignore
//! use order_detail_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//!
//! // Cancel everything still in flight
//! store.teardown();
//! ```

use order_detail_core::{effect::Effect, reducer::Reducer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tokio_util::sync::CancellationToken;

/// Observable value cells with synchronous subscriber notification
pub mod observable;

/// One-shot event delivery to a single observer
pub mod events;

pub use events::{EventEmitter, EventStream};
pub use observable::{Observable, Subscription};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store has been torn down and is not accepting new actions
        ///
        /// This error is returned when `send()` is called after `teardown()`.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Effects were still running when the idle timeout elapsed
        #[error("Store did not become idle, {0} effects still running")]
        IdleTimeout(usize),
    }
}

pub use error::StoreError;

/// Configuration for Store instances
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// How often `wait_for_idle` re-checks the pending effect counter
    pub idle_poll_interval: Duration,
}

impl StoreConfig {
    /// Create a configuration with the given idle poll interval
    #[must_use]
    pub const fn new(idle_poll_interval: Duration) -> Self {
        Self { idle_poll_interval }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(Duration::from_millis(1))
    }
}

/// Internal: counts the effects of one `Effect::Sequential` step
///
/// The step is settled once the counter drops back to zero, which happens
/// only after the action it produced has been reduced and that action's own
/// effects have been started.
#[derive(Clone)]
struct StepTracker {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl StepTracker {
    fn new() -> (Self, watch::Receiver<()>) {
        let (notifier, rx) = watch::channel(());
        (
            Self {
                counter: Arc::new(AtomicUsize::new(0)),
                notifier: Arc::new(notifier),
            },
            rx,
        )
    }

    fn is_settled(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == 0
    }
}

/// Internal: RAII guard holding one effect of a step open
///
/// Dropped when the effect finishes, panics or is cancelled.
struct StepGuard(StepTracker);

impl StepGuard {
    fn enter(step: &StepTracker) -> Self {
        step.counter.fetch_add(1, Ordering::SeqCst);
        Self(step.clone())
    }
}

impl Drop for StepGuard {
    fn drop(&mut self) {
        if self.0.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.0.notifier.send(());
        }
    }
}

/// Guard that decrements the store-wide pending effect counter on drop
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl AtomicCounterGuard {
    fn acquire(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Store runtime for coordinating reducer execution and effect handling.
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicCounterGuard, AtomicUsize, CancellationToken, Duration, Effect,
        Ordering, Reducer, RwLock, StepGuard, StepTracker, StoreConfig, StoreError,
    };

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`; the reducer is its only writer)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    /// 5. Cancellation of every spawned effect on teardown
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
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
        cancellation: CancellationToken,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + 'static,
        S: Send + Sync + 'static,
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
            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                config,
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
                cancellation: CancellationToken::new(),
            }
        }

        /// Number of effects currently running across the whole store
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::Acquire)
        }

        /// Returns true once [`Store::teardown`] has been called
        #[must_use]
        pub fn is_torn_down(&self) -> bool {
            self.shutdown.load(Ordering::Acquire)
        }

        /// Stop accepting actions and cancel every effect still in flight
        ///
        /// Cancelled effects produce no action. Calling this more than once is
        /// harmless.
        pub fn teardown(&self) {
            if self.shutdown.swap(true, Ordering::AcqRel) {
                return;
            }
            tracing::info!(
                pending_effects = self.pending_effects.load(Ordering::Acquire),
                "Tearing down store"
            );
            metrics::counter!("store.teardown").increment(1);
            self.cancellation.cancel();
        }

        /// Wait until no effect is running
        ///
        /// An effect that is parked on an external signal (for example a
        /// pending confirmation) keeps the store busy until it resolves.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::IdleTimeout`] with the number of effects still
        /// running if the timeout expires first.
        pub async fn wait_for_idle(&self, timeout: Duration) -> Result<(), StoreError> {
            let start = std::time::Instant::now();

            loop {
                let pending = self.pending_effects.load(Ordering::Acquire);

                if pending == 0 {
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::warn!(pending_effects = pending, "Store did not become idle");
                    return Err(StoreError::IdleTimeout(pending));
                }

                tokio::time::sleep(self.config.idle_poll_interval).await;
            }
        }

        /// Send an action to the store
        ///
        /// This is the primary way to interact with the store:
        /// 1. Acquires write lock on state
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Executes returned effects asynchronously
        /// 4. Effects may produce more actions (feedback loop)
        ///
        /// `send()` returns once the reducer has run and its effects have been
        /// started, not when they complete.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store has been torn down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<(), StoreError>
        where
            R: Clone,
            E: Clone,
        {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::debug!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            tracing::debug!("Processing action");
            metrics::counter!("store.commands.total").increment(1);

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
                effects
            };

            for effect in effects {
                self.execute_effect_internal(effect, None);
            }

            Ok(())
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let note_count = store.state(|s| s.notes.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Execute an effect
        ///
        /// Every spawned task races its work against the store's cancellation
        /// token. A cancelled task drops its future and feeds nothing back.
        /// `step` is set while the effect belongs to a step of an
        /// `Effect::Sequential`.
        #[tracing::instrument(skip(self, effect, step), name = "execute_effect")]
        fn execute_effect_internal(&self, effect: Effect<A>, step: Option<&StepTracker>)
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

                    let step_guard = step.map(StepGuard::enter);
                    let pending_guard = AtomicCounterGuard::acquire(&self.pending_effects);
                    let cancellation = self.cancellation.clone();
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _step_guard = step_guard;
                        let _pending_guard = pending_guard;

                        let outcome = tokio::select! {
                            biased;
                            () = cancellation.cancelled() => {
                                tracing::trace!("Effect::Future cancelled");
                                metrics::counter!("store.effects.cancelled").increment(1);
                                None
                            },
                            action = fut => action,
                        };

                        if let Some(action) = outcome {
                            tracing::trace!("Effect::Future produced an action, sending to store");
                            if let Err(error) = store.send(action).await {
                                tracing::debug!(%error, "Feedback action dropped");
                            }
                        }
                    });
                },
                Effect::Parallel(effects) => {
                    tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                    metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);

                    for effect in effects {
                        self.execute_effect_internal(effect, step);
                    }
                },
                Effect::Sequential(effects) => {
                    let effect_count = effects.len();
                    tracing::trace!("Executing Effect::Sequential with {} effects", effect_count);
                    metrics::counter!("store.effects.executed", "type" => "sequential").increment(1);

                    let step_guard = step.map(StepGuard::enter);
                    let pending_guard = AtomicCounterGuard::acquire(&self.pending_effects);
                    let cancellation = self.cancellation.clone();
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _step_guard = step_guard;
                        let _pending_guard = pending_guard;

                        for (idx, effect) in effects.into_iter().enumerate() {
                            if cancellation.is_cancelled() {
                                tracing::trace!("Effect::Sequential cancelled before step {}", idx + 1);
                                return;
                            }

                            tracing::trace!(
                                "Executing sequential effect {} of {}",
                                idx + 1,
                                effect_count
                            );

                            let (current, mut step_done) = StepTracker::new();
                            store.execute_effect_internal(effect, Some(&current));

                            // Wait for this step (and the action it fed back) before continuing
                            while !current.is_settled() {
                                tokio::select! {
                                    biased;
                                    () = cancellation.cancelled() => return,
                                    changed = step_done.changed() => {
                                        if changed.is_err() {
                                            break;
                                        }
                                    },
                                }
                            }
                        }
                        tracing::trace!("Effect::Sequential completed");
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
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
                cancellation: self.cancellation.clone(),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;
