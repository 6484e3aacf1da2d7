//! # Foldview Runtime
//!
//! Runtime implementation for fold-driven views.
//!
//! This crate provides the Store runtime that folds actions into state,
//! publishes every resulting snapshot, and executes the effects reducers ask
//! for, plus the Sequencer that merges intent sources into one ordered
//! stream.
//!
//! ## Core Components
//!
//! - **Store**: The fold engine - owns the state, reduces actions, broadcasts snapshots
//! - **Effect Executor**: Runs `Future` and `Delay` effects and feeds their actions back
//! - **Sequencer**: Merges many intent sources into one totally ordered stream
//!
//! ## Example
//!
//! ```ignore
//! use foldview_runtime::Store;
//!
//! let store = Store::new(Model::default(), TodoReducer::new(), env);
//! let mut snapshots = store.subscribe_snapshots();
//!
//! store.send(TodoAction::SetInput("buy milk".into())).await?;
//! let model = snapshots.recv().await?;
//! assert_eq!(model.input, "buy milk");
//! ```

use foldview_core::{effect::Effect, reducer::Reducer};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, watch};

/// Merging intent sources into one ordered stream
pub mod sequencer;

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

        /// Effects spawned by one action did not finish in time
        #[error("Timed out waiting for effects")]
        Timeout,
    }
}

pub use error::StoreError;

/// Configuration for Store behavior
///
/// # Example
///
/// ```
/// use foldview_runtime::StoreConfig;
///
/// let config = StoreConfig::default().with_snapshot_capacity(256);
/// assert_eq!(config.snapshot_capacity, 256);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Number of snapshots buffered for slow renderers
    pub snapshot_capacity: usize,
}

impl StoreConfig {
    /// Set the snapshot broadcast capacity
    #[must_use]
    pub const fn with_snapshot_capacity(mut self, capacity: usize) -> Self {
        self.snapshot_capacity = capacity;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_capacity: 64,
        }
    }
}

/// Number of spawned effects still running, observable by waiters
#[derive(Clone)]
struct InFlight(Arc<watch::Sender<usize>>);

impl InFlight {
    fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self(Arc::new(tx))
    }

    /// Count one more running effect until the guard drops
    fn enter(&self) -> InFlightGuard {
        self.0.send_modify(|n| *n += 1);
        InFlightGuard(self.clone())
    }

    fn current(&self) -> usize {
        *self.0.borrow()
    }

    /// Resolves once nothing is running
    async fn idle(&self) {
        let mut rx = self.0.subscribe();
        let _ = rx.wait_for(|n| *n == 0).await;
    }
}

/// Decrements on drop, so a panicking effect is still counted as finished
struct InFlightGuard(InFlight);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.0.send_modify(|n| *n = n.saturating_sub(1));
    }
}

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for the effects spawned by
/// that action to complete, including the reduction of the action each one
/// feeds back. Effects spawned by those feedback actions are not tracked by
/// this handle.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(GraphAction::Load).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    in_flight: InFlight,
}

impl EffectHandle {
    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        Self {
            in_flight: InFlight::new(),
        }
    }

    /// Number of effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.in_flight.current()
    }

    /// Wait for all effects to complete
    pub async fn wait(&mut self) {
        self.in_flight.idle().await;
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all
    /// effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.pending())
            .finish()
    }
}

/// A spawned effect: resolves to the action it feeds back, if any
type Feedback<A> = Pin<Box<dyn Future<Output = Option<A>> + Send>>;

/// Store module - The fold engine
pub mod store {
    use super::{
        Arc, AtomicBool, Duration, Effect, EffectHandle, Feedback, InFlight, Ordering, Reducer,
        RwLock, StoreConfig, StoreError,
    };
    use tokio::sync::broadcast;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`, single owner)
    /// 2. Reducer (transition logic)
    /// 3. Environment (injected capabilities)
    /// 4. Snapshot publication (one per reduced action)
    /// 5. Effect execution (with feedback loop)
    ///
    /// # Ordering
    ///
    /// Every call to `send()` reduces under the write lock and publishes the
    /// resulting snapshot before the lock is released, so subscribers see
    /// exactly one snapshot per action, in the order the actions were
    /// reduced.
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
        closed: Arc<AtomicBool>,
        /// Every effect spawned by any action, for shutdown
        in_flight: InFlight,
        snapshots: broadcast::Sender<S>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
        A: Send + 'static,
        S: Send + Sync + Clone + 'static,
        E: Clone + Send + Sync + 'static,
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
            let (snapshots, _) = broadcast::channel(config.snapshot_capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                closed: Arc::new(AtomicBool::new(false)),
                in_flight: InFlight::new(),
                snapshots,
            }
        }

        /// Stop accepting actions, then wait for running effects to finish
        ///
        /// Actions fed back by effects after this point are dropped, so
        /// rescheduling chains such as simulation ticks end with their
        /// current step.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before all
        /// pending effects complete.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            metrics::counter!("store.shutdown.initiated").increment(1);

            self.closed.store(true, Ordering::Release);

            if tokio::time::timeout(timeout, self.in_flight.idle()).await.is_ok() {
                tracing::info!("All effects completed, shutdown successful");
                metrics::counter!("store.shutdown.completed").increment(1);
                return Ok(());
            }

            let pending = self.in_flight.current();
            tracing::error!(pending_effects = pending, "Shutdown timed out");
            metrics::counter!("store.shutdown.timeout").increment(1);
            Err(StoreError::ShutdownTimeout(pending))
        }

        /// Send an action to the store
        ///
        /// 1. Acquires write lock on state
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Publishes the new snapshot while still holding the lock
        /// 4. Spawns returned effects
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        ///
        /// # Panics
        ///
        /// If the reducer panics, the panic will propagate and halt the store.
        /// Reducers should be pure functions that do not panic.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
            if self.closed.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            metrics::counter!("store.commands.total").increment(1);

            let effects = {
                let mut state = self.state.write().await;

                let span = tracing::debug_span!("reducer_execution");
                let _enter = span.enter();

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                metrics::histogram!("store.reducer.duration_seconds")
                    .record(start.elapsed().as_secs_f64());

                // No receivers is fine: nobody is rendering yet.
                let _ = self.snapshots.send(state.clone());
                effects
            };

            tracing::trace!(effects = effects.len(), "Reduced");

            let handle = EffectHandle::completed();
            for effect in effects {
                self.spawn(effect, &handle.in_flight);
            }
            Ok(handle)
        }

        /// Subscribe to state snapshots
        ///
        /// The receiver gets one snapshot per reduced action, starting with
        /// the first action reduced after subscribing. Read the current state
        /// with [`Store::snapshot`] to render the seed.
        ///
        /// A receiver that falls more than the configured snapshot capacity
        /// behind gets `RecvError::Lagged` and resumes at the oldest retained
        /// snapshot.
        #[must_use]
        pub fn subscribe_snapshots(&self) -> broadcast::Receiver<S> {
            self.snapshots.subscribe()
        }

        /// Clone the current state
        pub async fn snapshot(&self) -> S {
            self.state.read().await.clone()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let count = store.state(|m| m.todos.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Run one effect on its own task and send back what it yields
        ///
        /// Counted in both the action's handle and the store-wide total
        /// until the fed-back action has been reduced. A failing feedback
        /// send is logged and dropped.
        fn spawn(&self, effect: Effect<A>, handle: &InFlight) {
            let (kind, feedback): (&'static str, Feedback<A>) = match effect {
                Effect::None => {
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                    return;
                },
                Effect::Future(fut) => ("future", fut),
                Effect::Delay { duration, action } => (
                    "delay",
                    Box::pin(async move {
                        tokio::time::sleep(duration).await;
                        Some(*action)
                    }),
                ),
            };

            metrics::counter!("store.effects.executed", "type" => kind).increment(1);
            tracing::trace!(kind, "Spawning effect");

            let guards = (handle.enter(), self.in_flight.enter());
            let store = self.clone();

            tokio::spawn(async move {
                let _guards = guards;

                let Some(action) = feedback.await else {
                    tracing::trace!(kind, "Effect finished without an action");
                    return;
                };
                if let Err(error) = store.send(action).await {
                    tracing::debug!(kind, %error, "Feedback action dropped");
                }
            });
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
                closed: Arc::clone(&self.closed),
                in_flight: self.in_flight.clone(),
                snapshots: self.snapshots.clone(),
            }
        }
    }
}

// Re-export for convenience
pub use sequencer::{IntentSender, Sequence, Sequenced, Sequencer, SequencerError};
pub use store::Store;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use foldview_core::{SmallVec, smallvec};
    use tokio::sync::broadcast::error::TryRecvError;

    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        value: i32,
    }

    #[derive(Debug, Clone)]
    enum CounterAction {
        Increment,
        Decrement,
        NoOp,
        IncrementLater,
        IncrementAfter(Duration),
        EffectWithoutFeedback,
        PanickingEffect,
    }

    #[derive(Debug, Clone)]
    struct CounterReducer;

    impl Reducer for CounterReducer {
        type State = Counter;
        type Action = CounterAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Counter,
            action: CounterAction,
            _env: &(),
        ) -> SmallVec<[Effect<CounterAction>; 4]> {
            match action {
                CounterAction::Increment => {
                    state.value += 1;
                    smallvec![Effect::None]
                },
                CounterAction::Decrement => {
                    state.value -= 1;
                    SmallVec::new()
                },
                CounterAction::NoOp => SmallVec::new(),
                CounterAction::IncrementLater => {
                    smallvec![Effect::Future(Box::pin(async { Some(CounterAction::Increment) }))]
                },
                CounterAction::IncrementAfter(duration) => {
                    smallvec![Effect::delay(duration, CounterAction::Increment)]
                },
                CounterAction::EffectWithoutFeedback => {
                    smallvec![Effect::Future(Box::pin(async { None }))]
                },
                CounterAction::PanickingEffect => {
                    #[allow(clippy::panic)]
                    {
                        smallvec![Effect::Future(Box::pin(async {
                            panic!("effect failed");
                        }))]
                    }
                },
            }
        }
    }

    fn store() -> Store<Counter, CounterAction, (), CounterReducer> {
        Store::new(Counter { value: 0 }, CounterReducer, ())
    }

    #[tokio::test]
    async fn test_multiple_actions() {
        let store = store();

        let _ = store.send(CounterAction::Increment).await;
        let _ = store.send(CounterAction::Increment).await;
        let _ = store.send(CounterAction::Decrement).await;

        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_one_snapshot_per_action_in_order() {
        let store = store();
        let mut snapshots = store.subscribe_snapshots();

        let _ = store.send(CounterAction::Increment).await;
        let _ = store.send(CounterAction::NoOp).await;
        let _ = store.send(CounterAction::Increment).await;

        let mut values = Vec::new();
        for _ in 0..3 {
            values.push(snapshots.recv().await.unwrap().value);
        }

        assert_eq!(values, vec![1, 1, 2]);
        assert!(matches!(snapshots.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_snapshot_reads_current_state() {
        let store = store();
        let _ = store.send(CounterAction::Decrement).await;
        assert_eq!(store.snapshot().await, Counter { value: -1 });
    }

    #[tokio::test]
    async fn test_future_feeds_back() {
        let store = store();

        let mut handle = store.send(CounterAction::IncrementLater).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

        assert_eq!(handle.pending(), 0);
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_delay_feeds_back_after_sleeping() {
        let store = store();

        let mut handle = store
            .send(CounterAction::IncrementAfter(Duration::from_millis(20)))
            .await
            .unwrap();
        assert_eq!(handle.pending(), 1);
        assert_eq!(store.state(|s| s.value).await, 0);

        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_effect_without_feedback_adds_no_snapshot() {
        let store = store();
        let mut snapshots = store.subscribe_snapshots();

        let mut handle = store.send(CounterAction::EffectWithoutFeedback).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

        assert!(snapshots.recv().await.is_ok());
        assert!(matches!(snapshots.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_panicking_effect_does_not_halt_store() {
        let store = store();

        let mut handle = store.send(CounterAction::PanickingEffect).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

        let _ = store.send(CounterAction::Increment).await;
        assert_eq!(store.state(|s| s.value).await, 1);
        assert!(store.shutdown(Duration::from_millis(100)).await.is_ok());
    }

    #[tokio::test]
    async fn test_shutdown_rejects_new_actions() {
        let store = store();

        store.shutdown(Duration::from_secs(1)).await.unwrap();
        let result = store.send(CounterAction::Increment).await;

        assert!(matches!(result, Err(StoreError::ShutdownInProgress)));
        assert_eq!(store.state(|s| s.value).await, 0);
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_running_delay() {
        let store = store();
        let _ = store
            .send(CounterAction::IncrementAfter(Duration::from_millis(20)))
            .await;

        store.shutdown(Duration::from_secs(1)).await.unwrap();

        // The delay finished but its feedback arrived after closing.
        assert_eq!(store.state(|s| s.value).await, 0);
    }

    #[tokio::test]
    async fn test_shutdown_times_out_on_slow_effect() {
        let store = store();
        let _ = store
            .send(CounterAction::IncrementAfter(Duration::from_secs(30)))
            .await;

        let result = store.shutdown(Duration::from_millis(20)).await;
        assert!(matches!(result, Err(StoreError::ShutdownTimeout(1))));
    }

    #[tokio::test]
    async fn test_completed_handle_has_nothing_pending() {
        let mut handle = EffectHandle::completed();
        assert_eq!(handle.pending(), 0);
        handle.wait().await;
    }
}
