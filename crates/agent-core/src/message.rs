//! Messages observed on a channel and the credentials used to join it

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The most recent message rendered by a channel
///
/// Sessions keep only the latest instance and return it again until
/// something newer appears. Two posts with the same author and text are
/// told apart by `observed_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMessage {
    /// Display name of the participant who posted the message
    pub author: String,
    /// Raw message text
    pub text: String,
    /// When the session observed the message
    pub observed_at: DateTime<Utc>,
}

impl ChannelMessage {
    /// Create a message observed now
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            observed_at: Utc::now(),
        }
    }
}

/// Login credentials for a channel
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
