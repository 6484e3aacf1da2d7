//! Todo list driven by a fold over user intents.
//!
//! The pipeline, end to end:
//!
//! 1. [`intent`]: raw UI events are captured as intents
//! 2. [`resolve`]: intents become actions; edits prompt for text here
//! 3. the runtime `Sequencer` merges every intent source into one ordered
//!    stream
//! 4. the runtime `Store` folds each action through [`TodoReducer`] and
//!    publishes one [`Model`] snapshot per action
//! 5. [`view`]: every snapshot is rendered and mounted, replacing the
//!    previous view
//!
//! [`app`] wires the stages together; [`terminal`] is the interactive host.
//!
//! # Quick Start
//!
//! ```no_run
//! use foldview_runtime::StoreConfig;
//! use todo::app::{new_store, wire};
//! use todo::resolve::CancelPrompt;
//! use todo::intent::UiEvent;
//! use todo::view::RecordingView;
//!
//! # async fn example() -> Result<(), todo::app::AppError> {
//! let (intents, fold) = wire(new_store(StoreConfig::default()));
//!
//! intents.dispatch(&UiEvent::input("buy milk"), &mut CancelPrompt)?;
//! intents.dispatch(&UiEvent::submit(), &mut CancelPrompt)?;
//! drop(intents);
//!
//! let mut view = RecordingView::new();
//! let model = fold.run(&mut view).await?;
//! assert_eq!(model.todos.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod intent;
pub mod reducer;
pub mod resolve;
pub mod terminal;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use reducer::{TodoEnvironment, TodoReducer};
pub use types::{Model, Todo, TodoAction, TodoId};
