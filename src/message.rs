//! Notification text composition.
//!
//! Turns an [`Event`] into the three pieces of a Pushover message:
//!
//! - **title** - `"<LEVEL>: <first line of error text>"`
//! - **body** - one `"<Label>: <value>"` line each for server, group, logger
//!   and message, in that order
//! - **link** - `"<prefix>/<project slug>/group/<group id>/"`

use crate::event::Event;
use crate::severity::level_label;

/// Title, body and link for a single event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Notification title.
    pub title: String,
    /// Multi-line notification body.
    pub body: String,
    /// Link back to the group in the web UI.
    pub link: String,
}

impl Message {
    /// Composes the message for `event`, linking under `url_prefix`.
    pub fn compose(event: &Event, url_prefix: &str) -> Self {
        Self {
            title: title(event),
            body: body(event),
            link: link(event, url_prefix),
        }
    }
}

/// Builds the title from the event level and the first line of its error text.
pub fn title(event: &Event) -> String {
    let first_line = event.error_text().lines().next().unwrap_or_default();
    format!("{}: {}", level_label(event.level).to_uppercase(), first_line)
}

/// Builds the four-line body. Every line, including the last, ends in `\n`.
pub fn body(event: &Event) -> String {
    format!(
        "Server: {}\nGroup: {}\nLogger: {}\nMessage: {}\n",
        event.server_name, event.group, event.logger, event.message
    )
}

/// Builds the link to the event's group.
pub fn link(event: &Event, url_prefix: &str) -> String {
    format!(
        "{}/{}/group/{}/",
        url_prefix,
        event.project().slug,
        event.group.id
    )
}
