//! Error types for agent-core

use std::time::Duration;
use thiserror::Error;

/// Result type alias for agent-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for agent lifecycle operations
#[derive(Error, Debug)]
pub enum Error {
    /// Agent initialization failed
    #[error("Agent initialization failed: {0}")]
    InitializationFailed(String),

    /// Channel session failure that escaped the loop (only authentication does)
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Failures reported by a [`ChannelSession`](crate::ChannelSession)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Login failed or the input control never became available
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// No message could be observed within the bounded wait
    #[error("No message observed within {0:?}")]
    ObservationTimeout(Duration),

    /// A message could not be appended to the channel
    #[error("Failed to write message: {0}")]
    Write(String),

    /// The session was used before `authenticate` or after `close`
    #[error("Session is not connected")]
    NotConnected,
}

impl SessionError {
    /// Whether the error is the expected "quiet channel" case
    pub fn is_timeout(&self) -> bool {
        matches!(self, SessionError::ObservationTimeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SessionError::Auth("bad password".to_string());
        assert_eq!(err.to_string(), "Authentication failed: bad password");

        let err: Error = SessionError::NotConnected.into();
        assert_eq!(err.to_string(), "Session is not connected");

        let err = Error::InitializationFailed("keyword must not be empty".to_string());
        assert_eq!(
            err.to_string(),
            "Agent initialization failed: keyword must not be empty"
        );
        assert!(matches!(
            Error::from(SessionError::Auth("locked".to_string())),
            Error::Session(SessionError::Auth(_))
        ));
    }

    #[test]
    fn test_timeout_classification() {
        assert!(SessionError::ObservationTimeout(Duration::from_secs(1)).is_timeout());
        assert!(!SessionError::Write("gone".to_string()).is_timeout());
    }
}
