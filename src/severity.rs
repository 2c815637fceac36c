//! Event severity levels.
//!
//! Levels follow the standard logging convention: each level has a numeric
//! value, and a larger number means a more severe event
//! (`CRITICAL` 50 > `ERROR` 40 > `WARNING` 30 > `INFO` 20 > `DEBUG` 10).
//! Thresholds are compared numerically, so an event at any numeric level
//! can be filtered even if it does not match one of the five named levels.

use std::str::FromStr;

/// One of the five standard severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Diagnostic detail (10).
    Debug,
    /// Informational (20).
    Info,
    /// Something unexpected but recoverable (30).
    Warning,
    /// An error (40).
    Error,
    /// A fatal error (50).
    Critical,
}

impl Level {
    /// All levels, most severe first. This is the order offered in settings.
    pub const ALL: [Level; 5] = [
        Level::Critical,
        Level::Error,
        Level::Warning,
        Level::Info,
        Level::Debug,
    ];

    /// Returns the numeric value of this level.
    pub fn numeric(self) -> i64 {
        match self {
            Level::Debug => 10,
            Level::Info => 20,
            Level::Warning => 30,
            Level::Error => 40,
            Level::Critical => 50,
        }
    }

    /// Returns the uppercase label used in notification titles.
    pub fn label(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }

    /// Maps a numeric value back to a named level.
    ///
    /// Returns `None` for numbers that are not exactly one of the five levels.
    pub fn from_numeric(value: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.numeric() == value)
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Error returned when a string is neither a level label nor a level number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity level: {0:?}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    /// Parses `"40"` or `"error"` (case-insensitive). `fatal` is accepted as
    /// an alias of `CRITICAL`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<i64>() {
            return Level::from_numeric(value).ok_or_else(|| ParseLevelError(s.to_string()));
        }

        match trimmed.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARNING" | "WARN" => Ok(Level::Warning),
            "ERROR" => Ok(Level::Error),
            "CRITICAL" | "FATAL" => Ok(Level::Critical),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// Renders the display label for an arbitrary numeric event level.
///
/// Named levels render their label; any other number renders as itself.
pub fn level_label(value: i64) -> String {
    match Level::from_numeric(value) {
        Some(level) => level.label().to_string(),
        None => value.to_string(),
    }
}
