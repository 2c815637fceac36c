//! Event records handed to the dispatcher by the host.
//!
//! These mirror what the error tracker knows about a newly processed event:
//! the monitored project, the deduplicated group the event belongs to, and
//! the event's own severity and context.

use serde::{Deserialize, Serialize};

/// A monitored project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Numeric project identifier.
    pub id: u64,
    /// URL-safe project slug, used in links and as the option store key.
    pub slug: String,
}

impl Project {
    /// Creates a new project record.
    pub fn new(id: u64, slug: impl Into<String>) -> Self {
        Self {
            id,
            slug: slug.into(),
        }
    }
}

/// A deduplicated bucket of recurring events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Numeric group identifier.
    pub id: u64,
    /// Project owning the group.
    pub project: Project,
    /// Human-readable group title, rendered in the notification body.
    pub title: String,
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// A single reported error occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Group this event was bucketed into.
    pub group: Group,
    /// Numeric severity level (see [`crate::severity::Level`]).
    pub level: i64,
    /// Event message.
    pub message: String,
    /// Name of the logger that reported the event.
    #[serde(default)]
    pub logger: String,
    /// Name of the server the event was reported from.
    #[serde(default)]
    pub server_name: String,
    /// Rendered error text (exception type and value, possibly multi-line).
    ///
    /// Falls back to [`Event::message`] when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Event {
    /// Returns the project the event belongs to.
    pub fn project(&self) -> &Project {
        &self.group.project
    }

    /// Returns the rendered error text, or the message when none was recorded.
    pub fn error_text(&self) -> &str {
        self.error.as_deref().unwrap_or(&self.message)
    }
}
