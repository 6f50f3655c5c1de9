//! Ticket identifiers and the Toggl project naming convention.
//!
//! A Toggl project mirrors a ticket when its name starts with the ticket's
//! identifier followed by a single space and the ticket title:
//!
//! - numbered trackers (Shotgun): `#123 Fix crash`
//! - keyed trackers (JIRA): `ABC-123 Fix crash`
//!
//! ```rust
//! use togglsync::libs::ticket::{NamePattern, TicketId};
//!
//! let pattern = NamePattern::numbered();
//! let parsed = pattern.parse("#42 Fix login bug").unwrap();
//! assert_eq!(parsed.id, TicketId::Number(42));
//! assert_eq!(parsed.title, "Fix login bug");
//! assert_eq!(pattern.format(&parsed.id, &parsed.title), "#42 Fix login bug");
//! ```

use anyhow::Result;
use regex::Regex;
use std::fmt;

/// Identifier of a ticket in the issue tracker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TicketId {
    /// Numeric entity id, rendered `#<n>` in project names.
    Number(u64),
    /// Full issue key such as `ABC-123`.
    Key(String),
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketId::Number(id) => write!(f, "{}", id),
            TicketId::Key(key) => write!(f, "{}", key),
        }
    }
}

/// A ticket from the tracker's active set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedItem {
    pub id: TicketId,
    pub title: String,
}

impl TrackedItem {
    pub fn new(id: TicketId, title: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
        }
    }
}

/// Identifier and title recovered from a project name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub id: TicketId,
    pub title: String,
}

#[derive(Debug, Clone)]
enum PatternKind {
    Numbered,
    ProjectKey,
}

#[derive(Debug, Clone)]
pub struct NamePattern {
    kind: PatternKind,
    regex: Regex,
}

impl NamePattern {
    /// `#<digits> <title>`. Numbers are canonical (no leading zeros) so that
    /// formatting a parsed name gives back the same string.
    pub fn numbered() -> Self {
        Self {
            kind: PatternKind::Numbered,
            regex: Regex::new(r"(?s)^#(0|[1-9][0-9]*) (.*)$").expect("static regex"),
        }
    }

    /// `<KEY>-<digits> <title>` for the given JIRA project key.
    pub fn project_key(key: &str) -> Result<Self> {
        let key = key.trim().to_uppercase();
        let regex = Regex::new(&format!(r"(?s)^({}-[0-9]+) (.*)$", regex::escape(&key)))?;
        Ok(Self {
            kind: PatternKind::ProjectKey,
            regex,
        })
    }

    /// Splits a project name into ticket id and title, or `None` when the
    /// name does not follow the convention.
    pub fn parse(&self, name: &str) -> Option<ParsedName> {
        let captures = self.regex.captures(name)?;
        let id = match self.kind {
            PatternKind::Numbered => TicketId::Number(captures[1].parse().ok()?),
            PatternKind::ProjectKey => TicketId::Key(captures[1].to_string()),
        };
        Some(ParsedName {
            id,
            title: captures[2].to_string(),
        })
    }

    /// Builds the project name for a ticket.
    pub fn format(&self, id: &TicketId, title: &str) -> String {
        match id {
            TicketId::Number(number) => format!("#{} {}", number, title),
            TicketId::Key(key) => format!("{} {}", key, title),
        }
    }
}
