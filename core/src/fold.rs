//! Folding actions into snapshots.
//!
//! A fold is seeded with an initial state, emits that seed, and then emits
//! exactly one snapshot per action, in the order the actions arrive. The
//! functions here are the pure form of that engine: effects returned by the
//! reducer are dropped, so they are meant for reducers whose transitions are
//! effect-free (or for replaying recorded actions). Use the runtime `Store`
//! when effects must run.
//!
//! # Example
//!
//! ```
//! use foldview_core::{effect::Effect, fold, reducer::Reducer, SmallVec};
//!
//! struct Sum;
//!
//! impl Reducer for Sum {
//!     type State = i64;
//!     type Action = i64;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut i64, action: i64, _env: &()) -> SmallVec<[Effect<i64>; 4]> {
//!         *state += action;
//!         SmallVec::new()
//!     }
//! }
//!
//! let snapshots = fold::snapshots(&Sum, &(), 0, [1, 2, 3]);
//! assert_eq!(snapshots, vec![0, 1, 3, 6]);
//! ```

use crate::effect::Effect;
use crate::reducer::Reducer;
use futures::stream::{self, Stream, StreamExt};
use smallvec::SmallVec;

/// Apply one action to a copy of `state`, leaving the original untouched.
///
/// Returns the next snapshot together with the effects the reducer asked for.
pub fn step<R>(
    reducer: &R,
    state: &R::State,
    action: R::Action,
    env: &R::Environment,
) -> (R::State, SmallVec<[Effect<R::Action>; 4]>)
where
    R: Reducer,
    R::State: Clone,
{
    let mut next = state.clone();
    let effects = reducer.reduce(&mut next, action, env);
    (next, effects)
}

/// Fold `actions` over `initial` and collect every snapshot.
///
/// The result always starts with the seed, so it holds `actions.len() + 1`
/// entries.
pub fn snapshots<R, I>(
    reducer: &R,
    env: &R::Environment,
    initial: R::State,
    actions: I,
) -> Vec<R::State>
where
    R: Reducer,
    R::State: Clone,
    I: IntoIterator<Item = R::Action>,
{
    let actions = actions.into_iter();
    let mut out = Vec::with_capacity(actions.size_hint().0 + 1);
    let mut state = initial;
    out.push(state.clone());
    for action in actions {
        let _effects = reducer.reduce(&mut state, action, env);
        out.push(state.clone());
    }
    out
}

/// Fold `actions` over `initial` and return only the final state.
pub fn replay<R, I>(reducer: &R, env: &R::Environment, initial: R::State, actions: I) -> R::State
where
    R: Reducer,
    I: IntoIterator<Item = R::Action>,
{
    actions.into_iter().fold(initial, |mut state, action| {
        let _effects = reducer.reduce(&mut state, action, env);
        state
    })
}

/// Turn a stream of actions into a stream of snapshots.
///
/// The seed is emitted first, then one snapshot per action, strictly in
/// arrival order. The stream ends when `actions` ends.
pub fn scan<R, St>(
    reducer: R,
    env: R::Environment,
    initial: R::State,
    actions: St,
) -> impl Stream<Item = R::State>
where
    R: Reducer,
    R::State: Clone,
    St: Stream<Item = R::Action>,
{
    let seed = stream::once(futures::future::ready(initial.clone()));
    let folded = actions.scan(
        (reducer, env, initial),
        |(reducer, env, state), action| {
            let _effects = reducer.reduce(state, action, env);
            futures::future::ready(Some(state.clone()))
        },
    );
    seed.chain(folded)
}
