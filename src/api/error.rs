//! Failure taxonomy for backend calls.
//!
//! Every request made against the backend ends in one of three failure
//! shapes: the request never completed ([`ApiError::Transport`]), the
//! backend answered with a non-success status ([`ApiError::Status`]), or the
//! body could not be decoded ([`ApiError::Decode`]).

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never reached the backend or the connection dropped.
    #[error("could not reach the backend: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The response body was not the JSON shape we expected.
    #[error("unexpected response from the backend: {0}")]
    Decode(String),
}

impl ApiError {
    /// Builds a status error from a raw response body, preferring the
    /// backend's own `{error}` text.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = extract_error_summary(body)
            .filter(|summary| !summary.is_empty())
            .unwrap_or_else(|| format!("request failed with status {status}"));
        ApiError::Status { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The backend-provided message for application failures.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Pulls a one-line summary out of an error body shaped like `{error}`,
/// `{error: {message}}` or `{message}`.
pub fn extract_error_summary(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body.trim()).ok()?;
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value.get("error").and_then(|v| match v {
                Value::String(s) => Some(s.to_string()),
                _ => None,
            })
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary.map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
}
