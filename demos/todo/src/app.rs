//! Wiring: capture → resolve → sequence → fold → render.
//!
//! [`wire`] splits one store into the two halves of the application:
//!
//! - [`Intents`], driven by the host's event source. It captures each UI
//!   event, resolves the resulting intents (prompting for edits) and feeds
//!   them to the sequencer, one source per capture rule.
//! - [`FoldLoop`], which consumes the merged sequence, folds every action
//!   through the store and mounts one rendered view per snapshot.
//!
//! The two halves meet only through the sequencer and a `watch` of the
//! latest snapshot, which intent resolution reads.

use crate::intent::{self, RULES, UiEvent};
use crate::reducer::{TodoEnvironment, TodoReducer};
use crate::resolve::{Prompt, resolve};
use crate::types::{Model, TodoAction};
use crate::view::{View, ViewError, render};
use foldview_runtime::{
    IntentSender, Sequence, Sequencer, SequencerError, Store, StoreConfig, StoreError,
};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::{broadcast, watch};

/// Store type for the todo list
pub type TodoStore = Store<Model, TodoAction, TodoEnvironment, TodoReducer>;

/// Errors surfaced by the host wiring
#[derive(Error, Debug)]
pub enum AppError {
    /// The fold side is gone
    #[error(transparent)]
    Sequencer(#[from] SequencerError),

    /// The store rejected an action
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A snapshot could not be mounted
    #[error(transparent)]
    View(#[from] ViewError),

    /// The renderer fell behind the snapshot broadcast
    #[error("Renderer missed {0} snapshots")]
    Lagged(u64),

    /// The snapshot broadcast closed while actions were still arriving
    #[error("Snapshot stream closed")]
    SnapshotsClosed,
}

/// Build a store holding the empty model
#[must_use]
pub fn new_store(config: StoreConfig) -> TodoStore {
    Store::with_config(Model::new(), TodoReducer::new(), TodoEnvironment::new(), config)
}

/// Split `store` into its intent side and its fold side
#[must_use]
pub fn wire(store: TodoStore) -> (Intents, FoldLoop) {
    let (sequencer, sequence) = Sequencer::channel();
    let (model_tx, model_rx) = watch::channel(Model::new());

    let senders = RULES
        .iter()
        .map(|rule| (rule.name, sequencer.source(rule.name)))
        .collect();

    let intents = Intents {
        senders,
        model: model_rx,
    };
    let fold = FoldLoop {
        store,
        sequence,
        model: model_tx,
    };
    (intents, fold)
}

/// Outcome of dispatching one UI event
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dispatched {
    /// Whether the host must suppress the event's default action
    pub prevent_default: bool,
    /// Sequence numbers given to the resolved actions
    pub sequenced: Vec<u64>,
}

/// Intent side of the application
///
/// Dropping it ends the sequence, which lets the [`FoldLoop`] finish.
#[derive(Debug)]
pub struct Intents {
    senders: HashMap<&'static str, IntentSender<TodoAction>>,
    model: watch::Receiver<Model>,
}

impl Intents {
    /// Capture, resolve and sequence everything `event` proposes
    ///
    /// Edits are resolved against the latest rendered snapshot, so the
    /// prompt shows the text the user currently sees.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Sequencer`] if the fold side has stopped.
    pub fn dispatch(
        &self,
        event: &UiEvent,
        prompt: &mut dyn Prompt,
    ) -> Result<Dispatched, AppError> {
        let mut dispatched = Dispatched::default();

        for captured in intent::capture(event) {
            dispatched.prevent_default |= captured.prevent_default;

            let Some(sender) = self.senders.get(captured.rule) else {
                continue;
            };

            // Clone out of the watch: the prompt may block for a while.
            let model = self.model.borrow().clone();
            let action = resolve(captured.intent, &model, prompt);

            let seq = sender.send(action)?;
            dispatched.sequenced.push(seq);
        }

        if dispatched.sequenced.is_empty() {
            tracing::trace!(kind = ?event.kind, "Event matched no capture rule");
        }
        Ok(dispatched)
    }

    /// Latest snapshot produced by the fold
    #[must_use]
    pub fn model(&self) -> Model {
        self.model.borrow().clone()
    }

    /// Watch of the latest snapshot, for hosts that wait on the fold
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Model> {
        self.model.clone()
    }
}

/// Fold side of the application
pub struct FoldLoop {
    store: TodoStore,
    sequence: Sequence<TodoAction>,
    model: watch::Sender<Model>,
}

impl FoldLoop {
    /// Run until every intent source is gone, returning the final model
    ///
    /// The seed is mounted first; after that exactly one view is mounted
    /// per sequenced action, in sequence order.
    ///
    /// # Errors
    ///
    /// Fails if the store rejects an action, a snapshot goes missing, or
    /// the view cannot be mounted.
    pub async fn run<V: View + ?Sized>(mut self, view: &mut V) -> Result<Model, AppError> {
        let mut snapshots = self.store.subscribe_snapshots();

        let seed = self.store.snapshot().await;
        self.publish(view, seed)?;

        while let Some(sequenced) = self.sequence.recv().await {
            tracing::debug!(
                seq = sequenced.seq,
                source = sequenced.source,
                "Folding action"
            );

            self.store.send(sequenced.action).await?;

            let snapshot = match snapshots.recv().await {
                Ok(snapshot) => snapshot,
                Err(broadcast::error::RecvError::Lagged(n)) => return Err(AppError::Lagged(n)),
                Err(broadcast::error::RecvError::Closed) => return Err(AppError::SnapshotsClosed),
            };
            self.publish(view, snapshot)?;
        }

        tracing::info!("All intent sources closed");
        Ok(self.model.borrow().clone())
    }

    fn publish<V: View + ?Sized>(&self, view: &mut V, model: Model) -> Result<(), AppError> {
        view.mount(render(&model))?;
        self.model.send_replace(model);
        Ok(())
    }

    /// The store this loop folds into
    #[must_use]
    pub const fn store(&self) -> &TodoStore {
        &self.store
    }
}

impl std::fmt::Debug for FoldLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoldLoop").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{CancelPrompt, ScriptedPrompt};
    use crate::types::TodoId;
    use crate::view::RecordingView;

    #[tokio::test]
    async fn seed_is_mounted_before_any_action() {
        let (intents, fold) = wire(new_store(StoreConfig::default()));
        drop(intents);

        let mut view = RecordingView::new();
        let model = fold.run(&mut view).await;

        assert_eq!(model.ok(), Some(Model::new()));
        assert_eq!(view.mounts(), [render(&Model::new())]);
    }

    #[tokio::test]
    async fn one_mount_per_action() {
        let (intents, fold) = wire(new_store(StoreConfig::default()));
        let mut prompt = CancelPrompt;

        let typed = intents.dispatch(&UiEvent::input("milk"), &mut prompt);
        let submitted = intents.dispatch(&UiEvent::submit(), &mut prompt);
        drop(intents);

        assert_eq!(typed.ok().map(|d| d.sequenced), Some(vec![0]));
        let submitted = submitted.unwrap_or_default();
        assert!(submitted.prevent_default);
        assert_eq!(submitted.sequenced, vec![1]);

        let mut view = RecordingView::new();
        let model = fold.run(&mut view).await.unwrap_or_default();

        assert_eq!(view.mounts().len(), 3);
        assert_eq!(model.todos.len(), 1);
        assert_eq!(model.todos[0].text, "milk");
        assert_eq!(view.current(), Some(render(&model).as_str()));
    }

    #[tokio::test]
    async fn unmatched_event_sequences_nothing() {
        let (intents, _fold) = wire(new_store(StoreConfig::default()));
        let event = UiEvent {
            kind: intent::EventKind::Click,
            target: intent::EventTarget::with_id("elsewhere"),
        };

        let dispatched = intents.dispatch(&event, &mut CancelPrompt).unwrap_or_default();
        assert_eq!(dispatched, Dispatched::default());
    }

    #[tokio::test]
    async fn edit_resolves_against_latest_snapshot() {
        let (intents, fold) = wire(new_store(StoreConfig::default()));
        let handle = tokio::spawn(async move {
            let mut view = RecordingView::new();
            fold.run(&mut view).await
        });

        let mut prompt = ScriptedPrompt::new([Some("oat milk")]);
        let _ = intents.dispatch(&UiEvent::input("milk"), &mut prompt);
        let _ = intents.dispatch(&UiEvent::submit(), &mut prompt);

        let mut model = intents.model.clone();
        let _ = model.wait_for(|m| !m.todos.is_empty()).await;

        let _ = intents.dispatch(&UiEvent::edit(TodoId::new(1)), &mut prompt);
        drop(intents);

        let model = handle.await.ok().and_then(Result::ok).unwrap_or_default();
        assert_eq!(model.todos[0].text, "oat milk");
        assert_eq!(prompt.asked(), [("Edit todo".to_string(), "milk".to_string())]);
    }

    #[tokio::test]
    async fn dispatch_fails_once_fold_side_is_gone() {
        let (intents, fold) = wire(new_store(StoreConfig::default()));
        drop(fold);

        let result = intents.dispatch(&UiEvent::submit(), &mut CancelPrompt);
        assert!(matches!(result, Err(AppError::Sequencer(_))));
    }
}
