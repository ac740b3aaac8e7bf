use std::fmt;

/// API errors with user-friendly messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Network-level failure (connection, timeout, DNS)
    Transport(String),
    /// Non-success HTTP response (4xx, 5xx)
    Request { status: u16, reason: String },
    /// Response body did not match the expected shape
    Parse(String),
    /// A server-provided or configured URL could not be resolved
    InvalidUrl(String),
}

impl ApiError {
    /// Returns a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(details) => {
                if details.contains("timed out") {
                    "Request timed out. Please try again.".into()
                } else if details.contains("connection") {
                    "Network error: Could not reach server.".into()
                } else {
                    format!("Network error: {details}")
                }
            }
            Self::Request { status: 401 | 403, .. } => {
                "Not authorized. Check the session cookie.".into()
            }
            Self::Request { status: 404, .. } => "Not found.".into(),
            Self::Request { status: 429, .. } => "Rate limited. Please wait a moment.".into(),
            Self::Request {
                status: 500..=599, ..
            } => "Server error. Please try again later.".into(),
            Self::Request { status, reason } => format!("HTTP error {status}: {reason}"),
            Self::Parse(details) => format!("Failed to parse response: {details}"),
            Self::InvalidUrl(details) => format!("Invalid URL: {details}"),
        }
    }

    /// Whether repeating the same idempotent request may succeed.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Request { status, .. } => matches!(*status, 408 | 429 | 500..=599),
            Self::Parse(_) | Self::InvalidUrl(_) => false,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport("request timed out".into())
        } else if err.is_connect() {
            Self::Transport("connection failed".into())
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Request {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").into(),
            }
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<reqwest::StatusCode> for ApiError {
    fn from(status: reqwest::StatusCode) -> Self {
        Self::Request {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").into(),
        }
    }
}
