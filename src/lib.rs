//! Sentry-Pushover - Pushover notifications for new error groups.
//!
//! When the error tracker creates a new group and the event is severe
//! enough, this crate posts a short notification to Pushover with a link
//! back to the group.
//!
//! # Architecture
//!
//! ```text
//! host event hook
//!     ↓
//! Dispatcher::on_new_event(event, is_new)
//!     ↓  first occurrence? set up? level >= threshold?
//! Message::compose (title, body, link)
//!     ↓
//! PushoverClient::send → one form POST → DeliveryOutcome (logged)
//! ```
//!
//! # Modules
//!
//! - [`dispatcher`] - Dispatch gate and the host-facing entry point
//! - [`message`] - Title, body and link composition
//! - [`pushover`] - HTTP delivery and outcome classification
//! - [`settings`] - Typed per-project settings
//! - [`options`] - Per-project option storage
//! - [`config`] - Process-wide configuration loading/saving

// Library modules
pub mod config;
pub mod constants;
pub mod dispatcher;
pub mod event;
pub mod message;
pub mod options;
pub mod pushover;
pub mod settings;
pub mod severity;

// Re-export commonly used types
pub use config::Config;
pub use dispatcher::{DispatchOutcome, Dispatcher, SkipReason};
pub use event::{Event, Group, Project};
pub use message::Message;
pub use options::{FileOptionStore, MemoryOptionStore, OptionStore, OptionValue};
pub use pushover::{
    DeliveryOutcome, NotificationRequest, PushoverClient, ReqwestTransport, Transport,
    TransportResponse,
};
pub use settings::{PushoverSettings, SettingsError};
pub use severity::Level;
