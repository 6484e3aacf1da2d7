//! Intent resolution: proposals in, ready-to-fold actions out.
//!
//! Most intents map straight to an action. An edit needs replacement text
//! first, which comes from an interactive [`Prompt`]. Asking happens here,
//! before the action reaches the sequencer, so the reducer only ever sees
//! resolved transitions.

use crate::intent::Intent;
use crate::types::{Model, TodoAction};
use std::collections::VecDeque;

/// Message shown when asking for replacement text
pub const EDIT_PROMPT: &str = "Edit todo";

/// Synchronous user prompt
///
/// Blocks until the user answers. `None` means the prompt was cancelled.
pub trait Prompt {
    /// Ask `message`, pre-filling the answer with `default`
    fn prompt(&mut self, message: &str, default: &str) -> Option<String>;
}

impl<P: Prompt + ?Sized> Prompt for &mut P {
    fn prompt(&mut self, message: &str, default: &str) -> Option<String> {
        (**self).prompt(message, default)
    }
}

/// Prompt that cancels every question; edits leave the todo untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct CancelPrompt;

impl Prompt for CancelPrompt {
    fn prompt(&mut self, _message: &str, _default: &str) -> Option<String> {
        None
    }
}

/// Prompt that replays canned answers, recording every question asked
///
/// Answers are consumed in order; once they run out every prompt is
/// cancelled.
#[derive(Clone, Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<Option<String>>,
    asked: Vec<(String, String)>,
}

impl ScriptedPrompt {
    /// Creates a prompt that answers with `answers`, in order
    #[must_use]
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(|a| a.map(Into::into)).collect(),
            asked: Vec::new(),
        }
    }

    /// `(message, default)` of every question asked so far
    #[must_use]
    pub fn asked(&self) -> &[(String, String)] {
        &self.asked
    }
}

impl Prompt for ScriptedPrompt {
    fn prompt(&mut self, message: &str, default: &str) -> Option<String> {
        self.asked.push((message.to_string(), default.to_string()));
        self.answers.pop_front().flatten()
    }
}

/// Turn a captured intent into an action against the current `model`
///
/// Edits of a todo that is already gone resolve to
/// [`TodoAction::Identity`] without prompting. A cancelled prompt or a blank
/// answer also resolves to `Identity`, so the todo keeps whatever text it
/// has when the action is folded, including edits still queued ahead of it.
pub fn resolve(intent: Intent, model: &Model, prompt: &mut dyn Prompt) -> TodoAction {
    match intent {
        Intent::SetInput(text) => TodoAction::SetInput(text),
        Intent::Add => TodoAction::Add,
        Intent::Delete(id) => TodoAction::Delete(id),
        Intent::Toggle(id) => TodoAction::Toggle(id),
        Intent::EditRequested(id) => {
            let Some(current) = model.get(id) else {
                tracing::debug!(%id, "Edit requested for a todo that no longer exists");
                return TodoAction::Identity;
            };

            match prompt.prompt(EDIT_PROMPT, &current.text) {
                Some(text) if !text.trim().is_empty() => TodoAction::Edit { id, text },
                Some(_) | None => TodoAction::Identity,
            }
        },
    }
}
