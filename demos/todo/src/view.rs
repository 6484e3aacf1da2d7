//! HTML rendering and view sinks.
//!
//! [`render`] is a pure function of the model. Installing the markup is the
//! job of a [`View`]; the host owns the only place that calls
//! [`View::mount`], once per snapshot.

use crate::intent::{DELETE_CLASS, EDIT_CLASS, FORM_ID, INPUT_ID, TOGGLE_CLASS};
use crate::types::{Model, Todo};
use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Id of the list container
pub const LIST_ID: &str = "todo-list";

/// Failure to install a rendered view
#[derive(Error, Debug)]
pub enum ViewError {
    /// Writing the markup failed
    #[error("Failed to write view: {0}")]
    Io(#[from] io::Error),
}

/// Render `model` as the full view markup
///
/// The form and the list sit in one wrapping `<div>`. Text is inserted
/// verbatim; nothing is escaped.
#[must_use]
pub fn render(model: &Model) -> String {
    let mut html = String::from("<div>\n");

    let _ = writeln!(html, r#"  <form id="{FORM_ID}">"#);
    let _ = writeln!(
        html,
        r#"    <input id="{INPUT_ID}" type="text" placeholder="Add Todo" value="{}">"#,
        model.input
    );
    html.push_str("    <button type=\"submit\">Add</button>\n");
    html.push_str("  </form>\n");

    let _ = writeln!(html, r#"  <ul id="{LIST_ID}">"#);
    for todo in &model.todos {
        render_row(&mut html, todo);
    }
    html.push_str("  </ul>\n");
    html.push_str("</div>\n");

    html
}

fn render_row(html: &mut String, todo: &Todo) {
    let checked = if todo.completed { " checked" } else { "" };

    let _ = writeln!(html, r#"    <li data-id="{}">"#, todo.id);
    let _ = writeln!(
        html,
        r#"      <input type="checkbox" class="{TOGGLE_CLASS}"{checked}>"#
    );
    let _ = writeln!(html, r#"      <span class="text">{}</span>"#, todo.text);
    let _ = writeln!(html, r#"      <button class="{EDIT_CLASS}">Edit</button>"#);
    let _ = writeln!(html, r#"      <button class="{DELETE_CLASS}">Delete</button>"#);
    html.push_str("    </li>\n");
}

/// Target that displays the current view
///
/// Each mount replaces the previous view wholesale.
pub trait View {
    /// Install `html` as the current view
    ///
    /// # Errors
    ///
    /// Returns [`ViewError`] if the markup could not be installed.
    fn mount(&mut self, html: String) -> Result<(), ViewError>;
}

/// Overwrites a file with every mount
#[derive(Clone, Debug)]
pub struct FileView {
    path: PathBuf,
}

impl FileView {
    /// Creates a view backed by `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl View for FileView {
    fn mount(&mut self, html: String) -> Result<(), ViewError> {
        std::fs::write(&self.path, html)?;
        tracing::trace!(path = %self.path.display(), "View mounted");
        Ok(())
    }
}

/// Writes every mount to a stream, separated by a marker line
#[derive(Debug)]
pub struct WriterView<W> {
    out: W,
}

impl<W: Write> WriterView<W> {
    /// Creates a view that writes to `out`
    pub const fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> View for WriterView<W> {
    fn mount(&mut self, html: String) -> Result<(), ViewError> {
        writeln!(self.out, "<!-- view -->")?;
        self.out.write_all(html.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Keeps every mounted view in memory
#[derive(Clone, Debug, Default)]
pub struct RecordingView {
    mounts: Vec<String>,
}

impl RecordingView {
    /// Creates an empty recorder
    #[must_use]
    pub const fn new() -> Self {
        Self { mounts: Vec::new() }
    }

    /// Every view mounted so far, oldest first
    #[must_use]
    pub fn mounts(&self) -> &[String] {
        &self.mounts
    }

    /// The view currently installed
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.mounts.last().map(String::as_str)
    }
}

impl View for RecordingView {
    fn mount(&mut self, html: String) -> Result<(), ViewError> {
        self.mounts.push(html);
        Ok(())
    }
}
