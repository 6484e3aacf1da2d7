//! Line-oriented terminal host.
//!
//! Stands in for the browser: each input line is one UI event inside the
//! root container, and the edit prompt is asked on the same terminal.
//!
//! ```text
//! type <text>    input on the draft field
//! submit         submit the draft form
//! toggle <id>    change on a row checkbox
//! edit <id>      click on a row's edit button
//! delete <id>    click on a row's delete button
//! help           list commands
//! quit           leave
//! ```

use crate::intent::{DELETE_CLASS, EDIT_CLASS, EventKind, EventTarget, TOGGLE_CLASS, UiEvent};
use crate::resolve::Prompt;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Usage text printed by `help`
pub const HELP: &str = "\
commands:
  type <text>    set the draft
  submit         add the draft
  toggle <id>    tick or untick a todo
  edit <id>      change a todo's text
  delete <id>    remove a todo
  quit           leave";

/// One parsed input line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// A UI event to dispatch
    Event(UiEvent),
    /// Print usage
    Help,
    /// Stop reading input
    Quit,
}

/// A line that is not a command
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// First word is not a known command
    #[error("Unknown command '{0}' (try 'help')")]
    Unknown(String),

    /// A row command without a row id
    #[error("'{0}' needs a todo id")]
    MissingId(&'static str),
}

/// Parse one input line; blank lines yield `None`
///
/// Row ids are passed through as text, the way a `data-id` attribute
/// would be; capture decides whether they are readable.
///
/// # Errors
///
/// Returns [`CommandError`] for unknown commands and row commands without
/// an id.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let (word, rest) = trimmed
        .split_once(char::is_whitespace)
        .unwrap_or((trimmed, ""));

    let row = |command: &'static str, kind: EventKind, class: &str| {
        let id = rest.trim();
        if id.is_empty() {
            return Err(CommandError::MissingId(command));
        }
        Ok(Some(Command::Event(UiEvent {
            kind,
            target: EventTarget::row_control(class, id),
        })))
    };

    match word {
        "type" => Ok(Some(Command::Event(UiEvent::input(rest)))),
        "submit" => Ok(Some(Command::Event(UiEvent::submit()))),
        "toggle" => row("toggle", EventKind::Change, TOGGLE_CLASS),
        "edit" => row("edit", EventKind::Click, EDIT_CLASS),
        "delete" => row("delete", EventKind::Click, DELETE_CLASS),
        "help" | "?" => Ok(Some(Command::Help)),
        "quit" | "exit" => Ok(Some(Command::Quit)),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

/// Terminal reading commands from `input` and talking on `output`
#[derive(Debug)]
pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    /// Creates a terminal over the given streams
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Read the next line, or `None` at end of input
    ///
    /// # Errors
    ///
    /// Propagates read failures.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    /// Write one line of feedback
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn say(&mut self, message: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.output, "{message}")?;
        self.output.flush()
    }

    /// Gives back the output stream
    pub fn into_output(self) -> W {
        self.output
    }
}

/// An empty answer accepts the default; end of input cancels.
impl<R: BufRead, W: Write> Prompt for Terminal<R, W> {
    fn prompt(&mut self, message: &str, default: &str) -> Option<String> {
        if let Err(error) = write!(self.output, "{message} [{default}]: ")
            .and_then(|()| self.output.flush())
        {
            tracing::warn!(%error, "Failed to show prompt");
            return None;
        }

        match self.read_line() {
            Ok(Some(line)) => {
                let answer = line.trim_end_matches(['\r', '\n']);
                if answer.is_empty() {
                    Some(default.to_string())
                } else {
                    Some(answer.to_string())
                }
            },
            Ok(None) => None,
            Err(error) => {
                tracing::warn!(%error, "Failed to read prompt answer");
                None
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TodoId;
    use std::io::Cursor;

    fn event(line: &str) -> Option<UiEvent> {
        match parse_command(line) {
            Ok(Some(Command::Event(event))) => Some(event),
            _ => None,
        }
    }

    #[test]
    fn parses_draft_text_verbatim() {
        assert_eq!(event("type buy  milk\n"), Some(UiEvent::input("buy  milk")));
        assert_eq!(event("type"), Some(UiEvent::input("")));
    }

    #[test]
    fn parses_row_commands() {
        let id = TodoId::new(3);
        assert_eq!(event("toggle 3"), Some(UiEvent::toggle(id)));
        assert_eq!(event("edit 3"), Some(UiEvent::edit(id)));
        assert_eq!(event("  delete 3 "), Some(UiEvent::delete(id)));
        assert_eq!(event("submit"), Some(UiEvent::submit()));
    }

    #[test]
    fn control_commands() {
        assert_eq!(parse_command("quit"), Ok(Some(Command::Quit)));
        assert_eq!(parse_command("help"), Ok(Some(Command::Help)));
        assert_eq!(parse_command("   \n"), Ok(None));
    }

    #[test]
    fn rejects_bad_lines() {
        assert_eq!(
            parse_command("frobnicate 1"),
            Err(CommandError::Unknown("frobnicate".into()))
        );
        assert_eq!(parse_command("delete"), Err(CommandError::MissingId("delete")));
    }

    #[test]
    fn prompt_reads_answer() {
        let mut terminal = Terminal::new(Cursor::new("oat milk\n"), Vec::new());
        assert_eq!(terminal.prompt("Edit todo", "milk"), Some("oat milk".into()));
        assert_eq!(
            String::from_utf8(terminal.into_output()).unwrap_or_default(),
            "Edit todo [milk]: "
        );
    }

    #[test]
    fn empty_answer_accepts_default() {
        let mut terminal = Terminal::new(Cursor::new("\n"), Vec::new());
        assert_eq!(terminal.prompt("Edit todo", "milk"), Some("milk".into()));
    }

    #[test]
    fn end_of_input_cancels() {
        let mut terminal = Terminal::new(Cursor::new(""), Vec::new());
        assert_eq!(terminal.prompt("Edit todo", "milk"), None);
    }
}
