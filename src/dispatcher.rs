//! Dispatch gate for newly created events.
//!
//! The host calls [`Dispatcher::on_new_event`] once per processed event.
//! The gate checks, in order and stopping at the first failure:
//!
//! 1. the event is the first occurrence of its group
//! 2. the project is set up (user key and application token present)
//! 3. the event level is numerically at or above the configured threshold
//!
//! Only then is a message composed and delivered. Skips are expected states
//! and are only logged at debug level.
//!
//! # Failure Isolation
//!
//! `on_new_event` never returns an error and never panics on delivery
//! failure. Every outcome is logged and handed back as a [`DispatchOutcome`]
//! the host is free to ignore, so a broken notification setup can never
//! disrupt event processing.

use anyhow::Result;

use crate::config::Config;
use crate::constants::LOG_TARGET;
use crate::event::Event;
use crate::message::Message;
use crate::options::OptionStore;
use crate::pushover::{
    DeliveryOutcome, NotificationRequest, PushoverClient, ReqwestTransport, Transport,
};
use crate::settings::PushoverSettings;

/// Why an event did not produce a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The event's group already existed.
    Repeat,
    /// The project lacks a user key or application token.
    NotSetUp,
    /// The event level is below the project's threshold.
    BelowThreshold {
        /// Event level.
        level: i64,
        /// Configured threshold.
        threshold: i64,
    },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Repeat => write!(f, "not the first occurrence of its group"),
            SkipReason::NotSetUp => write!(f, "Pushover is not set up for this project"),
            SkipReason::BelowThreshold { level, threshold } => {
                write!(f, "level {} is below threshold {}", level, threshold)
            }
        }
    }
}

/// What the dispatcher did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No notification was attempted.
    Skipped(SkipReason),
    /// One delivery attempt was made.
    Sent(DeliveryOutcome),
}

impl DispatchOutcome {
    /// Whether a delivery attempt was made, regardless of its result.
    pub fn is_sent(&self) -> bool {
        matches!(self, DispatchOutcome::Sent(_))
    }
}

impl std::fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchOutcome::Skipped(reason) => write!(f, "Skipped: {}", reason),
            DispatchOutcome::Sent(outcome) => write!(f, "{}", outcome),
        }
    }
}

/// Decides whether events notify, and sends the notifications.
///
/// Constructed once at startup with its dependencies and shared with the
/// host's event hook.
#[derive(Debug)]
pub struct Dispatcher<S, T = ReqwestTransport> {
    options: S,
    client: PushoverClient<T>,
    url_prefix: String,
}

impl<S: OptionStore> Dispatcher<S, ReqwestTransport> {
    /// Creates a dispatcher using the endpoint, timeout and URL prefix from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(config: &Config, options: S) -> Result<Self> {
        let client = PushoverClient::new(config.api_url.clone(), config.timeout())?;
        Ok(Self::new(options, client, config.url_prefix.clone()))
    }
}

impl<S: OptionStore, T: Transport> Dispatcher<S, T> {
    /// Creates a dispatcher from its parts.
    pub fn new(options: S, client: PushoverClient<T>, url_prefix: impl Into<String>) -> Self {
        Self {
            options,
            client,
            url_prefix: url_prefix.into(),
        }
    }

    /// Returns the option store.
    pub fn options(&self) -> &S {
        &self.options
    }

    /// Returns the Pushover client.
    pub fn client(&self) -> &PushoverClient<T> {
        &self.client
    }

    /// Handles a newly processed event.
    ///
    /// `is_new` is true when the event created its group.
    pub fn on_new_event(&self, event: &Event, is_new: bool) -> DispatchOutcome {
        let project = event.project();
        let settings = PushoverSettings::load(&self.options, project);

        match self.gate(event, is_new, &settings) {
            Err(reason) => {
                log::debug!(
                    target: LOG_TARGET,
                    "Not notifying for group {} of {}: {}",
                    event.group.id,
                    project.slug,
                    reason
                );
                DispatchOutcome::Skipped(reason)
            }
            Ok(()) => {
                let message = Message::compose(event, &self.url_prefix);
                self.send(&settings, &message)
            }
        }
    }

    /// Delivers an already composed message using `settings`.
    ///
    /// Skips with [`SkipReason::NotSetUp`] if the credentials are missing.
    pub fn send(&self, settings: &PushoverSettings, message: &Message) -> DispatchOutcome {
        match NotificationRequest::new(settings, message) {
            Some(request) => DispatchOutcome::Sent(self.client.send(&request)),
            None => DispatchOutcome::Skipped(SkipReason::NotSetUp),
        }
    }

    fn gate(
        &self,
        event: &Event,
        is_new: bool,
        settings: &PushoverSettings,
    ) -> std::result::Result<(), SkipReason> {
        if !is_new {
            return Err(SkipReason::Repeat);
        }

        if !settings.is_setup() {
            return Err(SkipReason::NotSetUp);
        }

        let threshold = settings.threshold();
        if event.level < threshold {
            return Err(SkipReason::BelowThreshold {
                level: event.level,
                threshold,
            });
        }

        Ok(())
    }
}
