//! Error types for the task list client.

use thiserror::Error;

/// Result type for task list operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while talking to the remote task store or configuring the client.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure from reqwest (connection refused, bad body, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote store answered with a non-2xx status.
    #[error("server responded {status}: {message}")]
    Status { status: u16, message: String },

    /// URL parse error.
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// A request that is allowed to time out did not answer in time.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Configuration error.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    pub fn timeout(limit: std::time::Duration) -> Self {
        Self::Timeout {
            timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_terminal_io_failure_converts() {
        let err: Error = std::io::Error::other("tty gone").into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "I/O error: tty gone");
    }

    #[test]
    fn test_timeout_message() {
        let err = Error::timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "request timed out after 1500ms");
    }
}
