//! Typed view of a project's Pushover settings.
//!
//! Four options configure a project: the recipient user key, the
//! application token, the minimum severity, and the high-priority flag.
//! A project without both credentials is simply not set up; that is an
//! expected state, not an error.

use crate::constants::{
    LOG_TARGET, OPTION_API_KEY, OPTION_PRIORITY, OPTION_SEVERITY, OPTION_USER_KEY,
};
use crate::event::Project;
use crate::options::{OptionStore, OptionValue};
use crate::severity::Level;

/// Threshold used when no severity is stored or the stored value is unusable.
pub const DEFAULT_THRESHOLD: Level = Level::Error;

/// Errors reported when validating user-entered settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// The Pushover user key is missing or blank.
    #[error("user key is required (see https://pushover.net/)")]
    MissingUserKey,
    /// The application API token is missing or blank.
    #[error("application API token is required (see https://pushover.net/apps/)")]
    MissingApiKey,
    /// The severity is not one of the five standard levels.
    #[error("invalid severity {0:?}: expected one of CRITICAL, ERROR, WARNING, INFO, DEBUG")]
    InvalidSeverity(String),
}

/// A project's Pushover settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushoverSettings {
    /// Recipient user (or group) key.
    pub user_key: Option<String>,
    /// Application API token.
    pub api_key: Option<String>,
    /// Minimum severity, as stored. Usually a numeric string such as `"40"`.
    pub severity: Option<String>,
    /// Send as high priority (also bypasses the recipient's quiet hours).
    pub priority: bool,
}

impl PushoverSettings {
    /// Reads the settings of `project` from `store`.
    pub fn load<S: OptionStore + ?Sized>(store: &S, project: &Project) -> Self {
        Self {
            user_key: store.get_string(project, OPTION_USER_KEY),
            api_key: store.get_string(project, OPTION_API_KEY),
            severity: store.get_string(project, OPTION_SEVERITY),
            priority: store.get_bool(project, OPTION_PRIORITY),
        }
    }

    /// Writes the settings of `project` into `store`. Unset fields are left untouched.
    pub fn store<S: OptionStore + ?Sized>(&self, store: &mut S, project: &Project) {
        if let Some(ref user_key) = self.user_key {
            store.set(project, OPTION_USER_KEY, user_key.trim().into());
        }
        if let Some(ref api_key) = self.api_key {
            store.set(project, OPTION_API_KEY, api_key.trim().into());
        }
        if let Some(ref severity) = self.severity {
            // Labels are stored as their numeric value, e.g. "40"
            let value = match severity.parse::<Level>() {
                Ok(level) => level.numeric().to_string(),
                Err(_) => severity.clone(),
            };
            store.set(project, OPTION_SEVERITY, value.into());
        }
        store.set(project, OPTION_PRIORITY, OptionValue::Bool(self.priority));
    }

    /// Returns the user key if present and non-blank.
    pub fn user_key(&self) -> Option<&str> {
        non_blank(self.user_key.as_deref())
    }

    /// Returns the application token if present and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        non_blank(self.api_key.as_deref())
    }

    /// Whether both credentials are present.
    pub fn is_setup(&self) -> bool {
        self.user_key().is_some() && self.api_key().is_some()
    }

    /// Resolves the numeric severity threshold.
    ///
    /// Numbers are used literally, level labels map to their numeric value,
    /// and an unset or unparseable value falls back to [`DEFAULT_THRESHOLD`].
    pub fn threshold(&self) -> i64 {
        let Some(raw) = non_blank(self.severity.as_deref()) else {
            return DEFAULT_THRESHOLD.numeric();
        };

        if let Ok(value) = raw.trim().parse::<i64>() {
            return value;
        }

        match raw.parse::<Level>() {
            Ok(level) => level.numeric(),
            Err(e) => {
                log::warn!(
                    target: LOG_TARGET,
                    "{}; using {} as the threshold",
                    e,
                    DEFAULT_THRESHOLD
                );
                DEFAULT_THRESHOLD.numeric()
            }
        }
    }

    /// Pushover priority parameter: 1 for high priority, 0 otherwise.
    pub fn priority_flag(&self) -> u8 {
        u8::from(self.priority)
    }

    /// Validates settings entered by a user before they are stored.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, checking fields in form order.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.user_key().is_none() {
            return Err(SettingsError::MissingUserKey);
        }
        if self.api_key().is_none() {
            return Err(SettingsError::MissingApiKey);
        }
        if let Some(ref severity) = self.severity {
            severity
                .parse::<Level>()
                .map_err(|e| SettingsError::InvalidSeverity(e.0))?;
        }
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
