//! Application-wide constants for sentry-pushover.
//!
//! Centralizes the Pushover endpoint, option key names, and network
//! defaults so they are discoverable in one place.
//!
//! # Categories
//!
//! - **Pushover API**: Endpoint, link label, and response sentinel
//! - **Links**: Default web UI prefix for group links
//! - **Options**: Per-project option keys read from the option store
//! - **Timeouts**: Network timeouts
//! - **Logging**: Log target shared by dispatcher and delivery

use std::time::Duration;

// ============================================================================
// Pushover API
// ============================================================================

/// Pushover message-submission endpoint.
///
/// See <https://pushover.net/api>.
pub const PUSHOVER_MESSAGES_URL: &str = "https://api.pushover.net/1/messages.json";

/// Label shown for the supplementary URL attached to every notification.
pub const URL_TITLE: &str = "More info";

/// Value of the response `status` field when Pushover accepted a message.
pub const STATUS_ACCEPTED: i64 = 1;

// ============================================================================
// Links
// ============================================================================

/// Default URL prefix of the error-tracking web UI.
pub const DEFAULT_URL_PREFIX: &str = "http://localhost:9000";

// ============================================================================
// Options
// ============================================================================

/// Option key holding the recipient's Pushover user key.
pub const OPTION_USER_KEY: &str = "userkey";

/// Option key holding the Pushover application API token.
pub const OPTION_API_KEY: &str = "apikey";

/// Option key holding the minimum numeric severity to notify on.
pub const OPTION_SEVERITY: &str = "severity";

/// Option key holding the high-priority flag.
pub const OPTION_PRIORITY: &str = "priority";

// ============================================================================
// Timeouts
// ============================================================================

/// HTTP request timeout for the Pushover call.
///
/// Delivery is synchronous and runs inline in the host's event pipeline,
/// so an unresponsive endpoint must not block it indefinitely.
pub const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// Logging
// ============================================================================

/// Log target used for every dispatch and delivery message.
pub const LOG_TARGET: &str = "sentry.plugins.pushover";
