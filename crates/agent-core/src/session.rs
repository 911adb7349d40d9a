//! Channel session trait
//!
//! A session wraps whatever actually drives the chat channel (a browser, a
//! websocket, a terminal). The agent loop only ever talks to this trait.

use crate::error::SessionError;
use crate::message::{ChannelMessage, Credentials};
use async_trait::async_trait;

/// Connection to a single chat channel
///
/// Sessions are owned exclusively by one agent loop and are never shared
/// between tasks, so methods take `&mut self`.
#[async_trait]
pub trait ChannelSession: Send {
    /// URL or identifier of the channel this session is bound to
    fn channel_url(&self) -> &str;

    /// Log in once and wait (bounded) until the channel accepts input
    async fn authenticate(&mut self, credentials: &Credentials) -> Result<(), SessionError>;

    /// Return the most recent message and its author
    ///
    /// Must not block indefinitely. An empty channel is reported as
    /// [`SessionError::ObservationTimeout`].
    async fn read_latest(&mut self) -> Result<ChannelMessage, SessionError>;

    /// Append a message to the channel as the bot identity
    ///
    /// The written message becomes visible to the next `read_latest`.
    async fn write(&mut self, text: &str) -> Result<(), SessionError>;

    /// Release underlying resources. Must be safe to call more than once.
    async fn close(&mut self) -> Result<(), SessionError> {
        Ok(())
    }
}
