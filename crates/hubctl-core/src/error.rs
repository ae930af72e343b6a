//! Structured errors for hub operations.

use std::fmt;

use serde_json::Value;

/// Category of a hub failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubErrorKind {
    /// Non-2xx response from a direct call
    HttpStatus,
    /// The hub reported a server state this client does not recognize
    State,
    /// A wait ended without reaching its terminal condition
    NeverReady,
    /// Connection, TLS or body read failure
    Transport,
    /// Response body could not be decoded
    Parse,
}

impl fmt::Display for HubErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HubErrorKind::HttpStatus => write!(f, "http_status"),
            HubErrorKind::State => write!(f, "state"),
            HubErrorKind::NeverReady => write!(f, "never_ready"),
            HubErrorKind::Transport => write!(f, "transport"),
            HubErrorKind::Parse => write!(f, "parse"),
        }
    }
}

/// Error returned by every hub operation.
#[derive(Debug, Clone)]
pub struct HubError {
    /// Error category
    pub kind: HubErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// HTTP status, when the error came from a response
    pub status: Option<u16>,
    /// Optional additional details (e.g., raw response body)
    pub details: Option<String>,
}

impl HubError {
    /// Creates a new hub error.
    pub fn new(kind: HubErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            details: None,
        }
    }

    /// Creates an HTTP status error carrying the response body.
    ///
    /// The hub reports failures as `{"status": N, "message": "..."}`; when the
    /// body has that shape the message is folded into the summary.
    pub fn http_status(status: u16, body: &str) -> Self {
        let details = (!body.is_empty()).then(|| body.to_string());
        let message = match serde_json::from_str::<Value>(body)
            .ok()
            .as_ref()
            .and_then(|json| json.get("message"))
            .and_then(Value::as_str)
        {
            Some(msg) => format!("HTTP {status}: {msg}"),
            None => format!("HTTP {status}"),
        };
        Self {
            kind: HubErrorKind::HttpStatus,
            message,
            status: Some(status),
            details,
        }
    }

    pub fn state(message: impl Into<String>) -> Self {
        Self::new(HubErrorKind::State, message)
    }

    pub fn never_ready(message: impl Into<String>) -> Self {
        Self::new(HubErrorKind::NeverReady, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(HubErrorKind::Parse, message)
    }

    pub fn transport(err: &reqwest::Error) -> Self {
        Self::new(HubErrorKind::Transport, format!("request failed: {err}"))
    }
}

impl fmt::Display for HubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({details})")?;
        }
        Ok(())
    }
}

impl std::error::Error for HubError {}

/// Result type for hub operations.
pub type HubResult<T> = std::result::Result<T, HubError>;
