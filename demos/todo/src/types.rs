//! Domain types for the todo list.
//!
//! The whole application state is one [`Model`] value. Every user intent
//! becomes one [`TodoAction`], and reducing that action yields the next
//! snapshot of the model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Identifier of a todo, assigned from [`Model::next_id`] when it is added
///
/// Ids start at 1 and are never reused within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(u64);

impl TodoId {
    /// Wraps a raw id
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rows carry their id as text (`data-id`), so it is parsed back on capture.
impl FromStr for TodoId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier
    pub id: TodoId,
    /// Text shown in the row
    pub text: String,
    /// Whether the checkbox is ticked
    pub completed: bool,
}

impl Todo {
    /// Creates an open todo
    #[must_use]
    pub const fn new(id: TodoId, text: String) -> Self {
        Self {
            id,
            text,
            completed: false,
        }
    }
}

/// Application state
///
/// `todos` keeps insertion order; edits, toggles and deletes never reorder
/// it. `next_id` is always greater than every id handed out so far.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Todos in insertion order
    pub todos: Vec<Todo>,
    /// Current draft in the text field
    pub input: String,
    /// Id the next added todo will get
    pub next_id: u64,
}

impl Model {
    /// The empty model every session starts from
    #[must_use]
    pub const fn new() -> Self {
        Self {
            todos: Vec::new(),
            input: String::new(),
            next_id: 1,
        }
    }

    /// Returns a todo by id
    #[must_use]
    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// Returns a mutable todo by id
    pub fn get_mut(&mut self, id: TodoId) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|t| t.id == id)
    }

    /// Checks if a todo exists
    #[must_use]
    pub fn contains(&self, id: TodoId) -> bool {
        self.get(id).is_some()
    }

    /// Number of todos
    #[must_use]
    pub fn count(&self) -> usize {
        self.todos.len()
    }

    /// Number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|t| t.completed).count()
    }

    /// Largest id currently present, if any
    #[must_use]
    pub fn max_id(&self) -> Option<TodoId> {
        self.todos.iter().map(|t| t.id).max()
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

/// One transition of the model
///
/// Every variant is already resolved: anything interactive (the edit prompt)
/// happened before the action was built, so reducing it has no side effects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoAction {
    /// Replace the draft text
    SetInput(String),
    /// Append the trimmed draft as a new todo, unless it is blank
    Add,
    /// Remove the todo with this id
    Delete(TodoId),
    /// Flip `completed` on the todo with this id
    Toggle(TodoId),
    /// Replace the text of the todo with this id
    Edit {
        /// Todo to edit
        id: TodoId,
        /// Replacement text
        text: String,
    },
    /// Leave the model as it is
    Identity,
}
