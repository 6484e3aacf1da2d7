//! Merging intent sources into one ordered stream.
//!
//! Every intent source (text input, form submission, row buttons, ...) gets
//! its own [`IntentSender`]. All senders feed a single [`Sequence`], which
//! yields actions strictly in the order they were accepted, each tagged with
//! a sequence number and the name of its source. Nothing is reordered or
//! batched: the sequence number is assigned under the same lock that pushes
//! the action into the channel, so sequence order and delivery order agree
//! even when senders live on different threads.
//!
//! # Example
//!
//! ```
//! use foldview_runtime::Sequencer;
//!
//! # async fn example() -> Result<(), foldview_runtime::SequencerError> {
//! let (sequencer, mut sequence) = Sequencer::<&'static str>::channel();
//! let clicks = sequencer.source("click");
//! let keys = sequencer.source("input");
//!
//! keys.send("k1")?;
//! clicks.send("c1")?;
//!
//! let first = sequence.recv().await;
//! assert_eq!(first.map(|s| s.source), Some("input"));
//! # Ok(())
//! # }
//! ```

use futures::Stream;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors returned when feeding the sequencer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequencerError {
    /// The consuming side was dropped; nothing will fold this action
    #[error("Sequencer closed: action from source '{0}' was not accepted")]
    Closed(&'static str),
}

/// One action together with its position in the merged stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequenced<A> {
    /// Position in the merged stream, starting at 0
    pub seq: u64,
    /// Name of the intent source that produced the action
    pub source: &'static str,
    /// The action itself
    pub action: A,
}

struct Inner<A> {
    next_seq: Mutex<u64>,
    tx: mpsc::UnboundedSender<Sequenced<A>>,
}

impl<A> Inner<A> {
    fn push(&self, source: &'static str, action: A) -> Result<u64, SequencerError> {
        let mut next = self.next_seq.lock().unwrap_or_else(PoisonError::into_inner);
        let seq = *next;
        self.tx
            .send(Sequenced { seq, source, action })
            .map_err(|_| SequencerError::Closed(source))?;
        *next += 1;
        Ok(seq)
    }
}

/// Factory for intent sources feeding one merged stream
pub struct Sequencer<A> {
    inner: Arc<Inner<A>>,
}

impl<A> Sequencer<A> {
    /// Create a sequencer and the ordered stream it feeds
    ///
    /// The stream ends once the sequencer and every sender created from it
    /// have been dropped.
    #[must_use]
    pub fn channel() -> (Self, Sequence<A>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sequencer = Self {
            inner: Arc::new(Inner {
                next_seq: Mutex::new(0),
                tx,
            }),
        };
        (sequencer, Sequence { rx })
    }

    /// Create a sender for the intent source called `name`
    #[must_use]
    pub fn source(&self, name: &'static str) -> IntentSender<A> {
        IntentSender {
            name,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A> std::fmt::Debug for Sequencer<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequencer").finish_non_exhaustive()
    }
}

/// Handle used by one intent source to submit actions
pub struct IntentSender<A> {
    name: &'static str,
    inner: Arc<Inner<A>>,
}

impl<A> IntentSender<A> {
    /// Submit an action, returning the sequence number it was given
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::Closed`] if the [`Sequence`] was dropped.
    pub fn send(&self, action: A) -> Result<u64, SequencerError> {
        let seq = self.inner.push(self.name, action)?;
        tracing::trace!(source = self.name, seq, "Intent sequenced");
        Ok(seq)
    }

    /// Name of the intent source
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<A> Clone for IntentSender<A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A> std::fmt::Debug for IntentSender<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentSender")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The merged, totally ordered stream of actions
pub struct Sequence<A> {
    rx: mpsc::UnboundedReceiver<Sequenced<A>>,
}

impl<A> Sequence<A> {
    /// Receive the next action, or `None` once every sender is gone
    pub async fn recv(&mut self) -> Option<Sequenced<A>> {
        self.rx.recv().await
    }

    /// Receive the next action if one is already queued
    pub fn try_recv(&mut self) -> Option<Sequenced<A>> {
        self.rx.try_recv().ok()
    }
}

impl<A> Stream for Sequence<A> {
    type Item = Sequenced<A>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl<A> std::fmt::Debug for Sequence<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequence").finish_non_exhaustive()
    }
}
