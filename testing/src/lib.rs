//! # Foldview Testing
//!
//! Testing utilities and helpers for fold-driven views.
//!
//! This crate provides:
//! - [`ReducerTest`]: Given-When-Then builder for reducers
//! - [`assertions`]: Effect assertion helpers
//! - [`properties`]: Helpers for checking invariants over whole folds
//! - [`snapshots`]: Helpers for draining snapshot subscriptions
//!
//! ## Example
//!
//! ```ignore
//! use foldview_testing::{ReducerTest, assertions};
//!
//! ReducerTest::new(TodoReducer::new())
//!     .with_env(TodoEnvironment::default())
//!     .given_state(Model::default())
//!     .when_action(TodoAction::Delete(TodoId::new(7)))
//!     .then_state_unchanged()
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```


pub use reducer_test::{ReducerTest, assertions};

/// Property-based testing utilities
///
/// Helpers meant to be driven by proptest-generated action sequences.
pub mod properties {
    use foldview_core::{fold, reducer::Reducer};

    /// Assert that `invariant` holds for the seed and after every fold step.
    ///
    /// The invariant receives the step index (0 is the seed) and the
    /// snapshot.
    ///
    /// # Panics
    ///
    /// Panics naming the first step whose snapshot violates the invariant.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_invariant_each_step<R, I, F>(
        reducer: &R,
        env: &R::Environment,
        initial: R::State,
        actions: I,
        invariant: F,
    ) where
        R: Reducer,
        R::State: Clone + std::fmt::Debug,
        I: IntoIterator<Item = R::Action>,
        F: Fn(&R::State) -> bool,
    {
        for (step, snapshot) in fold::snapshots(reducer, env, initial, actions)
            .iter()
            .enumerate()
        {
            assert!(
                invariant(snapshot),
                "Invariant violated after step {step}: {snapshot:?}"
            );
        }
    }
}

/// Snapshot subscription helpers
pub mod snapshots {
    use std::time::Duration;
    use tokio::sync::broadcast;

    /// Receive exactly `count` snapshots, failing on lag, close, or timeout.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `count` snapshots arrive within `timeout`, or if
    /// the receiver lagged (which would mean snapshots were skipped).
    #[allow(clippy::panic)] // Test assertion
    pub async fn take<S: Clone>(
        rx: &mut broadcast::Receiver<S>,
        count: usize,
        timeout: Duration,
    ) -> Vec<S> {
        let mut out = Vec::with_capacity(count);
        while out.len() < count {
            match tokio::time::timeout(timeout, rx.recv()).await {
                Ok(Ok(snapshot)) => out.push(snapshot),
                Ok(Err(error)) => panic!("Snapshot stream failed after {}: {error}", out.len()),
                Err(_) => panic!("Timed out after {} of {count} snapshots", out.len()),
            }
        }
        out
    }

    /// Receive snapshots until `done` accepts one, returning all of them.
    ///
    /// Lagged receivers skip ahead instead of failing, which suits
    /// long-running simulations where only the end state matters.
    ///
    /// # Panics
    ///
    /// Panics if the stream closes or `timeout` elapses first.
    #[allow(clippy::panic)] // Test assertion
    pub async fn until<S: Clone, F: Fn(&S) -> bool>(
        rx: &mut broadcast::Receiver<S>,
        done: F,
        timeout: Duration,
    ) -> Vec<S> {
        let collect = async {
            let mut out = Vec::new();
            loop {
                match rx.recv().await {
                    Ok(snapshot) => {
                        let finished = done(&snapshot);
                        out.push(snapshot);
                        if finished {
                            return out;
                        }
                    },
                    Err(broadcast::error::RecvError::Lagged(_)) => {},
                    Err(broadcast::error::RecvError::Closed) => {
                        panic!("Snapshot stream closed after {} snapshots", out.len())
                    },
                }
            }
        };
        match tokio::time::timeout(timeout, collect).await {
            Ok(out) => out,
            Err(_) => panic!("Timed out waiting for a matching snapshot"),
        }
    }
}
