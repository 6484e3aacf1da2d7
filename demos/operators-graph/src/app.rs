//! Running the pipeline against a store.

use crate::reducer::{GraphEnvironment, GraphReducer};
use crate::types::{GraphAction, GraphState};
use foldview_runtime::{Store, StoreConfig, StoreError};
use tokio::sync::broadcast::error::RecvError;

/// Store type for the graph pipeline
pub type GraphStore = Store<GraphState, GraphAction, GraphEnvironment, GraphReducer>;

/// Build an idle store
///
/// The snapshot buffer is sized for a renderer that is at most a few hundred
/// ticks behind; a lagging renderer skips to the newest snapshot.
#[must_use]
pub fn new_store(env: GraphEnvironment) -> GraphStore {
    Store::with_config(
        GraphState::new(),
        GraphReducer::new(),
        env,
        StoreConfig::default().with_snapshot_capacity(512),
    )
}

/// Start loading and hand every snapshot to `draw` until the pipeline is
/// finished, returning the final state
///
/// # Errors
///
/// Returns [`StoreError`] if the store refuses the initial `Load`.
pub async fn run<F>(store: &GraphStore, mut draw: F) -> Result<GraphState, StoreError>
where
    F: FnMut(&GraphState),
{
    let mut snapshots = store.subscribe_snapshots();
    store.send(GraphAction::Load).await?;

    loop {
        match snapshots.recv().await {
            Ok(state) => {
                draw(&state);
                if state.is_finished() {
                    return Ok(state);
                }
            },
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Renderer fell behind; skipping frames");
            },
            Err(RecvError::Closed) => return Ok(store.snapshot().await),
        }
    }
}
