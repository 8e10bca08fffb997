//! Changelog transforms.
//!
//! A changelog is handled as an ordered list of lines. Both transforms are
//! folds over that list driven by a small state machine, one step function
//! per machine:
//!
//! - [`stamp_step`] drives [`Changelog::stamp_unpublished`], which inserts a
//!   `# v<version>` heading right after the first `# Unpublished` marker.
//! - [`notes_step`] drives [`Changelog::latest_notes`], which keeps the
//!   heading and body of the most recent version section only.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::Version;
use crate::error::{AutoReleaseError, Result};

fn unpublished_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)#[ \t]+unpublished").expect("static regex"))
}

fn version_heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#[ \t]+v\d+\.\d+\.\d+").expect("static regex"))
}

/// Whether `line` carries the `# Unpublished` marker. The marker may sit
/// anywhere in the line, so `## Unpublished` and `# Unpublished changes` count.
pub fn is_unpublished_marker(line: &str) -> bool {
    unpublished_re().is_match(line)
}

/// Whether `line` opens a version section (`# v1.2.3`).
pub fn is_version_heading(line: &str) -> bool {
    version_heading_re().is_match(line)
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// State of the stamping pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampState {
    /// No marker seen yet
    Before,
    /// The first marker has been stamped
    After,
}

/// What the stamping pass writes for one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampEmit {
    /// The line itself
    Copy,
    /// The line, a blank line and the new version heading
    CopyAndStamp,
}

/// One step of the stamping machine.
pub fn stamp_step(state: StampState, line: &str) -> (StampState, StampEmit) {
    match state {
        StampState::Before if is_unpublished_marker(line) => {
            (StampState::After, StampEmit::CopyAndStamp)
        }
        _ => (state, StampEmit::Copy),
    }
}

/// State of the notes extraction pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotesState {
    /// No version heading seen yet
    Idle,
    /// Inside the most recent version section
    Reading,
    /// Past the most recent version section
    End,
}

/// One step of the extraction machine. Returns the next state and the line
/// to emit, if any.
pub fn notes_step(state: NotesState, line: &str) -> (NotesState, Option<&str>) {
    if is_unpublished_marker(line) || is_blank(line) {
        return (state, None);
    }

    if is_version_heading(line) {
        return match state {
            NotesState::Idle => (NotesState::Reading, Some(line)),
            NotesState::Reading | NotesState::End => (NotesState::End, None),
        };
    }

    match state {
        NotesState::End => (state, None),
        NotesState::Idle | NotesState::Reading => (state, Some(line)),
    }
}

/// An in-memory changelog document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Changelog {
    lines: Vec<String>,
    trailing_newline: bool,
}

impl Changelog {
    /// Split a document on `\n`, remembering whether it ended with one.
    /// A `\r` before the newline stays part of its line.
    pub fn parse(text: &str) -> Self {
        Changelog {
            lines: text.split_terminator('\n').map(str::to_string).collect(),
            trailing_newline: text.ends_with('\n'),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Join the lines back into a document.
    pub fn render(&self) -> String {
        let mut out = self.lines.join("\n");
        if self.trailing_newline {
            out.push('\n');
        }
        out
    }

    /// Number of `# Unpublished` markers in the document.
    pub fn unpublished_marker_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|line| is_unpublished_marker(line))
            .count()
    }

    /// Insert a `# v<version>` heading after the first `# Unpublished` marker.
    ///
    /// The inserted lines take the marker line's ending, so a CRLF document
    /// stays CRLF.
    ///
    /// Returns [`AutoReleaseError::MalformedDocument`] if the document has no
    /// marker. `self` is never modified.
    pub fn stamp_unpublished(&self, version: &Version) -> Result<Changelog> {
        let heading = format!("# v{}", version);
        let mut lines = Vec::with_capacity(self.lines.len() + 2);
        let mut state = StampState::Before;

        for line in &self.lines {
            let (next, emit) = stamp_step(state, line);
            lines.push(line.clone());
            if emit == StampEmit::CopyAndStamp {
                let cr = if line.ends_with('\r') { "\r" } else { "" };
                lines.push(cr.to_string());
                lines.push(format!("{}{}", heading, cr));
            }
            state = next;
        }

        if state == StampState::Before {
            return Err(AutoReleaseError::malformed(
                "changelog has no '# Unpublished' section",
            ));
        }

        Ok(Changelog {
            lines,
            trailing_newline: self.trailing_newline,
        })
    }

    /// Heading and body of the most recent version section, one line per
    /// `\n`-terminated line. Empty when the document has no version heading.
    pub fn latest_notes(&self) -> String {
        let mut notes = String::new();
        let mut state = NotesState::Idle;

        for line in &self.lines {
            let (next, emitted) = notes_step(state, line);
            if let Some(emitted) = emitted {
                notes.push_str(emitted);
                notes.push('\n');
            }
            state = next;
        }

        notes
    }
}

/// Stamp `text` with a heading for `version`. See [`Changelog::stamp_unpublished`].
pub fn stamp_unpublished(text: &str, version: &Version) -> Result<String> {
    Changelog::parse(text)
        .stamp_unpublished(version)
        .map(|changelog| changelog.render())
}

/// Release notes of the most recent version in `text`. See [`Changelog::latest_notes`].
pub fn extract_latest_notes(text: &str) -> String {
    Changelog::parse(text).latest_notes()
}
