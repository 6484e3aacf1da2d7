//! Intent capture: raw UI events in, intents out.
//!
//! The host delivers every event that happens inside the root container as
//! a [`UiEvent`]. Each [`CaptureRule`] listens for one event kind and one
//! structural predicate on the event's target; a matching event becomes
//! exactly one [`Intent`]. Capture never touches the model.

use crate::types::TodoId;
use serde::{Deserialize, Serialize};

/// Id of the draft text field
pub const INPUT_ID: &str = "new-todo";
/// Id of the form wrapping the text field
pub const FORM_ID: &str = "todo-form";
/// Class of the per-row completion checkbox
pub const TOGGLE_CLASS: &str = "toggle";
/// Class of the per-row edit button
pub const EDIT_CLASS: &str = "edit";
/// Class of the per-row delete button
pub const DELETE_CLASS: &str = "delete";

/// Event classes the root container listens to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Text typed into a field
    Input,
    /// Form submitted
    Submit,
    /// Button clicked
    Click,
    /// Checkbox flipped
    Change,
}

/// The element an event was dispatched on
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTarget {
    /// Element id, if it has one
    pub id: Option<String>,
    /// Element classes
    pub classes: Vec<String>,
    /// Current value of a form field
    pub value: Option<String>,
    /// `data-id` of the closest enclosing row, if any
    pub row: Option<String>,
}

impl EventTarget {
    /// Target with the given id
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Control inside the row tagged `row`
    #[must_use]
    pub fn row_control(class: impl Into<String>, row: impl ToString) -> Self {
        Self {
            classes: vec![class.into()],
            row: Some(row.to_string()),
            ..Self::default()
        }
    }

    /// Sets the field value
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Whether the element carries `class`
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// One event dispatched inside the root container
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiEvent {
    /// Event class
    pub kind: EventKind,
    /// Element the event was dispatched on
    pub target: EventTarget,
}

impl UiEvent {
    /// Text typed into the draft field
    #[must_use]
    pub fn input(value: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Input,
            target: EventTarget::with_id(INPUT_ID).value(value),
        }
    }

    /// Draft form submitted
    #[must_use]
    pub fn submit() -> Self {
        Self {
            kind: EventKind::Submit,
            target: EventTarget::with_id(FORM_ID),
        }
    }

    /// Delete button clicked on a row
    #[must_use]
    pub fn delete(row: TodoId) -> Self {
        Self {
            kind: EventKind::Click,
            target: EventTarget::row_control(DELETE_CLASS, row),
        }
    }

    /// Checkbox changed on a row
    #[must_use]
    pub fn toggle(row: TodoId) -> Self {
        Self {
            kind: EventKind::Change,
            target: EventTarget::row_control(TOGGLE_CLASS, row),
        }
    }

    /// Edit button clicked on a row
    #[must_use]
    pub fn edit(row: TodoId) -> Self {
        Self {
            kind: EventKind::Click,
            target: EventTarget::row_control(EDIT_CLASS, row),
        }
    }
}

/// Structural predicate on an event target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selector {
    /// Any element
    Any,
    /// Element whose id equals the value
    IdEquals(&'static str),
    /// Element carrying the class
    HasClass(&'static str),
}

impl Selector {
    /// Whether `target` satisfies the predicate
    #[must_use]
    pub fn matches(self, target: &EventTarget) -> bool {
        match self {
            Self::Any => true,
            Self::IdEquals(id) => target.id.as_deref() == Some(id),
            Self::HasClass(class) => target.has_class(class),
        }
    }
}

/// Proposed intent, not yet applied (and, for edits, not yet resolved)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Replace the draft text
    SetInput(String),
    /// Submit the draft
    Add,
    /// Remove a row
    Delete(TodoId),
    /// Flip a row's checkbox
    Toggle(TodoId),
    /// Ask for replacement text for a row
    EditRequested(TodoId),
}

/// How a matched event becomes an intent
#[derive(Clone, Copy, Debug)]
enum Extract {
    Value,
    Submit,
    Row(fn(TodoId) -> Intent),
}

/// One capture rule: event kind + predicate → intent
#[derive(Clone, Copy, Debug)]
pub struct CaptureRule {
    /// Rule name; also the name of the intent source it feeds
    pub name: &'static str,
    /// Event class the rule subscribes to
    pub kind: EventKind,
    /// Predicate on the event target
    pub selector: Selector,
    /// Whether the host must suppress the event's default action
    pub prevent_default: bool,
    extract: Extract,
}

impl CaptureRule {
    /// Map `event` to an intent if this rule matches it
    ///
    /// Row rules need a parseable `data-id`; a row event without one is
    /// ignored.
    #[must_use]
    pub fn capture(&self, event: &UiEvent) -> Option<Intent> {
        if event.kind != self.kind || !self.selector.matches(&event.target) {
            return None;
        }

        match self.extract {
            Extract::Value => Some(Intent::SetInput(
                event.target.value.clone().unwrap_or_default(),
            )),
            Extract::Submit => Some(Intent::Add),
            Extract::Row(make) => {
                let row = event.target.row.as_deref()?;
                match row.parse::<TodoId>() {
                    Ok(id) => Some(make(id)),
                    Err(error) => {
                        tracing::debug!(rule = self.name, row, %error, "Ignoring event with unreadable row id");
                        None
                    },
                }
            },
        }
    }
}

/// The five capture rules of the todo view, in subscription order
pub const RULES: [CaptureRule; 5] = [
    CaptureRule {
        name: "set-input",
        kind: EventKind::Input,
        selector: Selector::IdEquals(INPUT_ID),
        prevent_default: false,
        extract: Extract::Value,
    },
    CaptureRule {
        name: "add",
        kind: EventKind::Submit,
        selector: Selector::Any,
        prevent_default: true,
        extract: Extract::Submit,
    },
    CaptureRule {
        name: "delete",
        kind: EventKind::Click,
        selector: Selector::HasClass(DELETE_CLASS),
        prevent_default: false,
        extract: Extract::Row(Intent::Delete),
    },
    CaptureRule {
        name: "toggle",
        kind: EventKind::Change,
        selector: Selector::HasClass(TOGGLE_CLASS),
        prevent_default: false,
        extract: Extract::Row(Intent::Toggle),
    },
    CaptureRule {
        name: "edit",
        kind: EventKind::Click,
        selector: Selector::HasClass(EDIT_CLASS),
        prevent_default: false,
        extract: Extract::Row(Intent::EditRequested),
    },
];

/// An intent produced by one rule
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Captured {
    /// Name of the rule that matched
    pub rule: &'static str,
    /// The proposed intent
    pub intent: Intent,
    /// Whether the host must suppress the event's default action
    pub prevent_default: bool,
}

/// Run `event` through every rule, in rule order
///
/// Usually zero or one rule matches; an element carrying several row classes
/// yields one intent per matching rule.
#[must_use]
pub fn capture(event: &UiEvent) -> Vec<Captured> {
    RULES
        .iter()
        .filter_map(|rule| {
            rule.capture(event).map(|intent| Captured {
                rule: rule.name,
                intent,
                prevent_default: rule.prevent_default,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intents(event: &UiEvent) -> Vec<Intent> {
        capture(event).into_iter().map(|c| c.intent).collect()
    }

    #[test]
    fn input_on_draft_field_sets_input() {
        assert_eq!(
            intents(&UiEvent::input("buy milk")),
            vec![Intent::SetInput("buy milk".into())]
        );
    }

    #[test]
    fn input_on_other_field_is_ignored() {
        let event = UiEvent {
            kind: EventKind::Input,
            target: EventTarget::with_id("search").value("x"),
        };
        assert!(capture(&event).is_empty());
    }

    #[test]
    fn submit_prevents_default() {
        let captured = capture(&UiEvent::submit());
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].intent, Intent::Add);
        assert!(captured[0].prevent_default);
    }

    #[test]
    fn only_submit_prevents_default() {
        let id = TodoId::new(1);
        for event in [
            UiEvent::input("a"),
            UiEvent::delete(id),
            UiEvent::toggle(id),
            UiEvent::edit(id),
        ] {
            assert!(capture(&event).iter().all(|c| !c.prevent_default));
        }
    }

    #[test]
    fn row_controls_carry_row_id() {
        let id = TodoId::new(7);
        assert_eq!(intents(&UiEvent::delete(id)), vec![Intent::Delete(id)]);
        assert_eq!(intents(&UiEvent::toggle(id)), vec![Intent::Toggle(id)]);
        assert_eq!(intents(&UiEvent::edit(id)), vec![Intent::EditRequested(id)]);
    }

    #[test]
    fn click_on_toggle_is_not_a_change() {
        let event = UiEvent {
            kind: EventKind::Click,
            target: EventTarget::row_control(TOGGLE_CLASS, 3),
        };
        assert!(capture(&event).is_empty());
    }

    #[test]
    fn row_event_without_readable_id_is_ignored() {
        let mut event = UiEvent::delete(TodoId::new(1));
        event.target.row = Some("not-a-number".into());
        assert!(capture(&event).is_empty());

        event.target.row = None;
        assert!(capture(&event).is_empty());
    }

    #[test]
    fn element_with_two_row_classes_yields_two_intents() {
        let event = UiEvent {
            kind: EventKind::Click,
            target: EventTarget {
                classes: vec![EDIT_CLASS.into(), DELETE_CLASS.into()],
                row: Some("2".into()),
                ..EventTarget::default()
            },
        };
        let rules: Vec<&str> = capture(&event).iter().map(|c| c.rule).collect();
        assert_eq!(rules, vec!["delete", "edit"]);
    }
}
