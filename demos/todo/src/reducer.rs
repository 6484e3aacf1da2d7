//! Reducer logic for the todo list.
//!
//! Every transition is total: a blank draft or an id that no longer exists
//! leaves the model untouched instead of failing.

use crate::types::{Model, Todo, TodoAction, TodoId};
use foldview_core::{SmallVec, effect::Effect, fold, reducer::Reducer};

/// Environment dependencies for the todo reducer
///
/// Transitions need no capabilities; the edit prompt is injected one stage
/// earlier, into intent resolution.
#[derive(Clone, Copy, Debug, Default)]
pub struct TodoEnvironment;

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Reducer for the todo list
#[derive(Clone, Copy, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn add(state: &mut Model) {
        let text = state.input.trim();
        if text.is_empty() {
            return;
        }

        let todo = Todo::new(TodoId::new(state.next_id), text.to_string());
        state.todos.push(todo);
        state.next_id += 1;
        state.input.clear();
    }
}

impl Reducer for TodoReducer {
    type State = Model;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TodoAction::SetInput(text) => state.input = text,
            TodoAction::Add => Self::add(state),
            TodoAction::Delete(id) => state.todos.retain(|t| t.id != id),
            TodoAction::Toggle(id) => {
                if let Some(todo) = state.get_mut(id) {
                    todo.completed = !todo.completed;
                }
            },
            TodoAction::Edit { id, text } => {
                if let Some(todo) = state.get_mut(id) {
                    todo.text = text;
                }
            },
            TodoAction::Identity => {},
        }

        SmallVec::new()
    }
}

impl Model {
    /// Returns the model that results from applying `action`, leaving `self`
    /// untouched.
    #[must_use]
    pub fn apply(&self, action: TodoAction) -> Self {
        fold::step(&TodoReducer, self, action, &TodoEnvironment).0
    }
}
