use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Canonical shape of a backend rejection: a message plus, for "already
/// claimed" responses, the time the next claim becomes possible.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub status: Option<u16>,
    pub message: String,
    pub next_claim_at: Option<DateTime<Utc>>,
}

impl Rejection {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            next_claim_at: None,
        }
    }

    pub fn with_next_claim_at(mut self, at: DateTime<Utc>) -> Self {
        self.next_claim_at = Some(at);
        self
    }

    /// Build from a JSON error body.
    ///
    /// The backend is inconsistent about where `nextClaimAt` lives, so all
    /// known locations are checked: top level, `data`, `response.data`, `error`.
    pub fn from_body(status: u16, body: &Value) -> Self {
        let message = lookup(body, &["message"])
            .or_else(|| lookup(body, &["error", "message"]))
            .or_else(|| lookup(body, &["data", "message"]))
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed with status {}", status));

        let next_claim_at = lookup(body, &["nextClaimAt"])
            .or_else(|| lookup(body, &["data", "nextClaimAt"]))
            .or_else(|| lookup(body, &["response", "data", "nextClaimAt"]))
            .or_else(|| lookup(body, &["error", "nextClaimAt"]))
            .and_then(parse_timestamp);

        Self {
            status: Some(status),
            message,
            next_claim_at,
        }
    }
}

/// String at a nested key path, if every step exists.
fn lookup<'a>(body: &'a Value, path: &[&str]) -> Option<&'a str> {
    path.iter()
        .try_fold(body, |node, key| node.get(*key))
        .and_then(Value::as_str)
}

/// Parse an RFC 3339 / ISO-8601 timestamp into UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Errors produced at the HTTP boundary. Every backend failure is turned into
/// one of these before it reaches a consumer.
#[derive(Debug)]
pub enum ApiError {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    Transport(String),
    /// The server answered with something other than JSON.
    UnexpectedContent { status: u16, content_type: String },
    /// The server answered with a non-2xx JSON body.
    Rejected(Rejection),
    /// A 2xx JSON body that did not match the expected shape.
    Decode(String),
    /// The bearer token could not be stored or cleared.
    Session(String),
}

impl ApiError {
    /// Human-readable message suitable for inline display.
    pub fn message(&self) -> String {
        match self {
            ApiError::Rejected(r) => r.message.clone(),
            other => other.to_string(),
        }
    }

    /// The cooldown signal, if this failure carries one.
    pub fn next_claim_at(&self) -> Option<DateTime<Utc>> {
        match self {
            ApiError::Rejected(r) => r.next_claim_at,
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected(r) => r.status,
            ApiError::UnexpectedContent { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether retrying the same idempotent request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport(_) => true,
            ApiError::Rejected(r) => r.status.map(|s| s >= 500).unwrap_or(false),
            ApiError::UnexpectedContent { status, .. } => *status >= 500,
            ApiError::Decode(_) | ApiError::Session(_) => false,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(msg) => write!(f, "Network error: {}", msg),
            ApiError::UnexpectedContent { status, content_type } => write!(
                f,
                "Server returned an unexpected response. Expected JSON but got \"{}\". Status: {}.",
                content_type, status
            ),
            ApiError::Rejected(r) => write!(f, "{}", r.message),
            ApiError::Decode(msg) => write!(f, "Malformed response: {}", msg),
            ApiError::Session(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

impl From<crate::common::session::SessionError> for ApiError {
    fn from(err: crate::common::session::SessionError) -> Self {
        ApiError::Session(err.to_string())
    }
}

impl From<Rejection> for ApiError {
    fn from(r: Rejection) -> Self {
        ApiError::Rejected(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn next_claim_at_is_found_in_every_known_location() {
        let bodies = [
            json!({"message": "Already claimed", "nextClaimAt": "2026-01-01T00:00:00Z"}),
            json!({"message": "Already claimed", "data": {"nextClaimAt": "2026-01-01T00:00:00Z"}}),
            json!({"response": {"data": {"nextClaimAt": "2026-01-01T00:00:00Z"}}}),
            json!({"error": {"message": "Already claimed", "nextClaimAt": "2026-01-01T00:00:00Z"}}),
        ];

        for body in bodies.iter() {
            let r = Rejection::from_body(400, body);
            assert_eq!(
                r.next_claim_at,
                parse_timestamp("2026-01-01T00:00:00Z"),
                "body: {}",
                body
            );
        }
    }

    #[test]
    fn missing_message_defaults_to_status_text() {
        let r = Rejection::from_body(502, &json!({}));
        assert_eq!(r.message, "Request failed with status 502");
        assert!(r.next_claim_at.is_none());
        assert!(ApiError::Rejected(r).is_retryable());
    }

    #[test]
    fn unparseable_timestamp_is_not_a_cooldown() {
        let r = Rejection::from_body(400, &json!({"message": "boom", "nextClaimAt": "soon"}));
        assert_eq!(r.message, "boom");
        assert!(r.next_claim_at.is_none());
    }
}
