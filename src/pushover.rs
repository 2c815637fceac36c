//! Pushover message delivery.
//!
//! This module performs the single outbound call for a qualifying event and
//! classifies what came back. There are no retries: one POST is made, the
//! outcome is logged, and the outcome is returned to the caller.
//!
//! # Outcomes
//!
//! | Response                         | Outcome                           | Logged at |
//! |----------------------------------|-----------------------------------|-----------|
//! | no response (connect, timeout)   | [`DeliveryOutcome::TransportError`] | error   |
//! | non-2xx status                   | [`DeliveryOutcome::HttpFailure`]    | error   |
//! | 2xx, `status` missing or not `1` | [`DeliveryOutcome::Rejected`]       | error   |
//! | 2xx, `status == 1`               | [`DeliveryOutcome::Delivered`]      | info    |
//!
//! # Example
//!
//! ```ignore
//! let client = PushoverClient::new(PUSHOVER_MESSAGES_URL, HTTP_REQUEST_TIMEOUT)?;
//! let outcome = client.send(&request);
//! assert!(outcome.is_delivered());
//! ```

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::time::Duration;

use crate::constants::{LOG_TARGET, STATUS_ACCEPTED, URL_TITLE};
use crate::message::Message;
use crate::settings::PushoverSettings;

/// Parameters of one Pushover message-submission call.
///
/// Only built for projects that are set up, so both credentials are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    /// Recipient user key.
    pub user: String,
    /// Application API token.
    pub token: String,
    /// Message body.
    pub message: String,
    /// Message title.
    pub title: String,
    /// Supplementary URL.
    pub url: String,
    /// Label of the supplementary URL.
    pub url_title: String,
    /// 0 for normal priority, 1 for high priority.
    pub priority: u8,
}

impl NotificationRequest {
    /// Builds the request for `message` using the project's settings.
    ///
    /// Returns `None` if the project is not set up.
    pub fn new(settings: &PushoverSettings, message: &Message) -> Option<Self> {
        let user = settings.user_key()?;
        let token = settings.api_key()?;

        Some(Self {
            user: user.to_string(),
            token: token.to_string(),
            message: message.body.clone(),
            title: message.title.clone(),
            url: message.link.clone(),
            url_title: URL_TITLE.to_string(),
            priority: settings.priority_flag(),
        })
    }

    /// Returns the form parameters in submission order.
    pub fn form_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("user", self.user.clone()),
            ("token", self.token.clone()),
            ("message", self.message.clone()),
            ("title", self.title.clone()),
            ("url", self.url.clone()),
            ("url_title", self.url_title.clone()),
            ("priority", self.priority.to_string()),
        ]
    }
}

/// Raw HTTP response returned by a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl TransportResponse {
    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs a form-encoded HTTP POST.
///
/// The dispatcher is handed a transport instead of creating an HTTP client
/// itself, so delivery can be exercised without a network.
pub trait Transport: Send + Sync {
    /// POSTs `params` form-encoded to `url` and returns the response.
    ///
    /// # Errors
    ///
    /// Returns an error only if no response was received at all.
    fn post_form(&self, url: &str, params: &[(&'static str, String)]) -> Result<TransportResponse>;
}

/// [`Transport`] backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sentry-pushover/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }

    /// Creates a transport with a pre-configured HTTP client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn post_form(&self, url: &str, params: &[(&'static str, String)]) -> Result<TransportResponse> {
        let response = self
            .client
            .post(url)
            .form(params)
            .send()
            .with_context(|| format!("POST {} failed", url))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .context("Failed to read Pushover response")?;
        Ok(TransportResponse { status, body })
    }
}

/// Result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Pushover accepted the message.
    Delivered {
        /// Pushover's request identifier, if returned.
        request_id: Option<String>,
    },
    /// The HTTP call succeeded but Pushover did not accept the message.
    Rejected {
        /// Error strings returned by Pushover.
        errors: Vec<String>,
    },
    /// The HTTP call returned a non-success status code.
    HttpFailure {
        /// HTTP status code.
        status: u16,
        /// Error strings returned by Pushover, if the body carried any.
        errors: Vec<String>,
    },
    /// No response was received.
    TransportError {
        /// Description of the failure.
        reason: String,
    },
}

impl DeliveryOutcome {
    /// Classifies a response from the Pushover endpoint.
    pub fn classify(response: &TransportResponse) -> Self {
        let payload: Option<serde_json::Value> = serde_json::from_str(&response.body).ok();
        let errors = payload.as_ref().map(response_errors).unwrap_or_default();

        if !response.is_success() {
            return DeliveryOutcome::HttpFailure {
                status: response.status,
                errors,
            };
        }

        let status = payload
            .as_ref()
            .and_then(|p| p.get("status"))
            .and_then(serde_json::Value::as_i64);

        if status == Some(STATUS_ACCEPTED) {
            let request_id = payload
                .as_ref()
                .and_then(|p| p.get("request"))
                .and_then(serde_json::Value::as_str)
                .map(str::to_string);
            DeliveryOutcome::Delivered { request_id }
        } else {
            DeliveryOutcome::Rejected { errors }
        }
    }

    /// Whether Pushover accepted the message.
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }

    /// Level this outcome is logged at.
    pub fn level(&self) -> log::Level {
        match self {
            DeliveryOutcome::Delivered { .. } => log::Level::Info,
            _ => log::Level::Error,
        }
    }

    fn log(&self) {
        log::log!(target: LOG_TARGET, self.level(), "{}", self);
    }
}

impl std::fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryOutcome::Delivered { request_id: Some(id) } => {
                write!(f, "Notification sent to Pushover successfully (request {})", id)
            }
            DeliveryOutcome::Delivered { request_id: None } => {
                write!(f, "Notification sent to Pushover successfully")
            }
            DeliveryOutcome::Rejected { errors } if errors.is_empty() => {
                write!(f, "Notification failed to be sent to Pushover")
            }
            DeliveryOutcome::Rejected { errors } => {
                write!(
                    f,
                    "Notification failed to be sent to Pushover: {}",
                    errors.join("; ")
                )
            }
            DeliveryOutcome::HttpFailure { status, errors } if errors.is_empty() => {
                write!(
                    f,
                    "Error happened when sending message to Pushover, status code: {}",
                    status
                )
            }
            DeliveryOutcome::HttpFailure { status, errors } => {
                write!(
                    f,
                    "Error happened when sending message to Pushover, status code: {} ({})",
                    status,
                    errors.join("; ")
                )
            }
            DeliveryOutcome::TransportError { reason } => {
                write!(f, "Error happened when sending message to Pushover: {}", reason)
            }
        }
    }
}

fn response_errors(payload: &serde_json::Value) -> Vec<String> {
    payload
        .get("errors")
        .and_then(serde_json::Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .filter_map(serde_json::Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Sends notification requests to a Pushover endpoint.
#[derive(Debug, Clone)]
pub struct PushoverClient<T = ReqwestTransport> {
    transport: T,
    endpoint: String,
}

impl PushoverClient<ReqwestTransport> {
    /// Creates a client posting to `endpoint` over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self::with_transport(ReqwestTransport::new(timeout)?, endpoint))
    }
}

impl<T: Transport> PushoverClient<T> {
    /// Creates a client with a custom transport.
    pub fn with_transport(transport: T, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
        }
    }

    /// Returns the endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Makes a single delivery attempt and logs the outcome.
    ///
    /// Never fails: transport errors are folded into the outcome.
    pub fn send(&self, request: &NotificationRequest) -> DeliveryOutcome {
        let outcome = match self
            .transport
            .post_form(&self.endpoint, &request.form_params())
        {
            Ok(response) => DeliveryOutcome::classify(&response),
            Err(e) => DeliveryOutcome::TransportError {
                reason: format!("{:#}", e),
            },
        };

        outcome.log();
        outcome
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::FakeTransport;
    use super::*;

    fn settings(priority: bool) -> PushoverSettings {
        PushoverSettings {
            user_key: Some("ukey".to_string()),
            api_key: Some("atoken".to_string()),
            severity: None,
            priority,
        }
    }

    fn message() -> Message {
        Message {
            title: "ERROR: NullPointerException".to_string(),
            body: "Server: web-1\nGroup: g\nLogger: app.logger\nMessage: Out of memory\n"
                .to_string(),
            link: "https://sentry.example.com/myapp/group/42/".to_string(),
        }
    }

    fn response(status: u16, body: &str) -> TransportResponse {
        TransportResponse {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_request_requires_setup() {
        let mut unset = settings(false);
        unset.api_key = None;
        assert!(NotificationRequest::new(&unset, &message()).is_none());
    }

    #[test]
    fn test_form_params_order_and_values() {
        let request = NotificationRequest::new(&settings(false), &message()).unwrap();
        let names: Vec<&str> = request.form_params().iter().map(|(k, _)| *k).collect();
        assert_eq!(
            names,
            vec!["user", "token", "message", "title", "url", "url_title", "priority"]
        );
        assert_eq!(request.url_title, "More info");
        assert_eq!(request.priority, 0);
    }

    #[test]
    fn test_priority_param() {
        let request = NotificationRequest::new(&settings(true), &message()).unwrap();
        assert_eq!(request.priority, 1);
        let params = request.form_params();
        assert!(params.contains(&("priority", "1".to_string())));
    }

    #[test]
    fn test_classify_accepted() {
        let outcome = DeliveryOutcome::classify(&response(200, r#"{"status":1,"request":"abc"}"#));
        assert_eq!(
            outcome,
            DeliveryOutcome::Delivered {
                request_id: Some("abc".to_string())
            }
        );
        assert_eq!(outcome.level(), log::Level::Info);
    }

    #[test]
    fn test_classify_rejected() {
        let outcome = DeliveryOutcome::classify(&response(200, r#"{"status":0}"#));
        assert_eq!(outcome, DeliveryOutcome::Rejected { errors: vec![] });
        assert_eq!(outcome.level(), log::Level::Error);
    }

    #[test]
    fn test_classify_missing_status_is_rejected() {
        let outcome = DeliveryOutcome::classify(&response(200, r#"{"request":"abc"}"#));
        assert!(matches!(outcome, DeliveryOutcome::Rejected { .. }));
    }

    #[test]
    fn test_classify_non_json_success_is_rejected() {
        let outcome = DeliveryOutcome::classify(&response(200, "<html>ok</html>"));
        assert!(matches!(outcome, DeliveryOutcome::Rejected { .. }));
    }

    #[test]
    fn test_classify_http_failure_includes_status() {
        let body = r#"{"user":"invalid","errors":["user identifier is invalid"],"status":0}"#;
        let outcome = DeliveryOutcome::classify(&response(400, body));
        assert_eq!(
            outcome,
            DeliveryOutcome::HttpFailure {
                status: 400,
                errors: vec!["user identifier is invalid".to_string()],
            }
        );
        assert_eq!(outcome.level(), log::Level::Error);
        assert!(outcome.to_string().contains("status code: 400"));
    }

    #[test]
    fn test_classify_http_failure_without_body() {
        let outcome = DeliveryOutcome::classify(&response(503, ""));
        assert_eq!(
            outcome.to_string(),
            "Error happened when sending message to Pushover, status code: 503"
        );
    }

    #[test]
    fn test_send_posts_once_to_endpoint() {
        let transport = FakeTransport::responding(200, r#"{"status":1}"#);
        let client = PushoverClient::with_transport(transport, "https://push.test/1/messages.json");
        let request = NotificationRequest::new(&settings(false), &message()).unwrap();

        let outcome = client.send(&request);

        assert!(outcome.is_delivered());
        assert_eq!(client.transport().call_count(), 1);
        let calls = client.transport().calls.lock().unwrap();
        assert_eq!(calls[0].0, "https://push.test/1/messages.json");
    }

    #[test]
    fn test_send_folds_transport_error() {
        let client = PushoverClient::with_transport(
            FakeTransport::failing("connection refused"),
            "http://x",
        );
        let request = NotificationRequest::new(&settings(false), &message()).unwrap();

        let outcome = client.send(&request);

        assert_eq!(
            outcome,
            DeliveryOutcome::TransportError {
                reason: "connection refused".to_string()
            }
        );
        assert_eq!(outcome.level(), log::Level::Error);
    }
}
