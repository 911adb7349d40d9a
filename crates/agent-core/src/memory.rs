//! Scriptable in-memory channel session
//!
//! Replays a fixed script of channel activity, one step per `read_latest`,
//! and records everything the bot writes. Used for tests and dry runs.

use crate::clock::Clock;
use crate::error::SessionError;
use crate::message::{ChannelMessage, Credentials};
use crate::session::ChannelSession;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One observation in a scripted channel
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// A participant posts a message before the next read
    Post(ChannelMessage),
    /// The next read times out
    Silence,
}

/// In-memory [`ChannelSession`]
pub struct MemorySession {
    url: String,
    bot_name: String,
    latest: Option<ChannelMessage>,
    script: VecDeque<ScriptStep>,
    on_drained: Option<Box<dyn FnOnce() + Send>>,
    clock: Option<Arc<dyn Clock>>,
    read_timeout: Duration,
    auth_failure: Option<String>,
    fail_writes: bool,
    connected: bool,
    closed: bool,
    reads: Vec<Instant>,
    written: Vec<String>,
}

impl MemorySession {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            bot_name: "bot".to_string(),
            latest: None,
            script: VecDeque::new(),
            on_drained: None,
            clock: None,
            read_timeout: Duration::from_secs(1),
            auth_failure: None,
            fail_writes: false,
            connected: false,
            closed: false,
            reads: Vec::new(),
            written: Vec::new(),
        }
    }

    /// Queue a message from `author`
    pub fn post(mut self, author: impl Into<String>, text: impl Into<String>) -> Self {
        self.script
            .push_back(ScriptStep::Post(ChannelMessage::new(author, text)));
        self
    }

    /// Queue a read that times out
    pub fn silence(mut self) -> Self {
        self.script.push_back(ScriptStep::Silence);
        self
    }

    /// Timestamp reads with the given clock instead of the wall clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Run `f` the first time a read finds the script exhausted
    pub fn on_drained(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_drained = Some(Box::new(f));
        self
    }

    /// Make `authenticate` fail with `reason`
    pub fn failing_auth(mut self, reason: impl Into<String>) -> Self {
        self.auth_failure = Some(reason.into());
        self
    }

    /// Make every `write` fail
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Messages written by the bot, oldest first
    pub fn written(&self) -> &[String] {
        &self.written
    }

    /// Instants at which `read_latest` was called
    pub fn reads(&self) -> &[Instant] {
        &self.reads
    }

    pub fn is_authenticated(&self) -> bool {
        self.connected
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn now(&self) -> Instant {
        self.clock.as_ref().map_or_else(Instant::now, |c| c.now())
    }
}

#[async_trait]
impl ChannelSession for MemorySession {
    fn channel_url(&self) -> &str {
        &self.url
    }

    async fn authenticate(&mut self, credentials: &Credentials) -> Result<(), SessionError> {
        if let Some(reason) = &self.auth_failure {
            return Err(SessionError::Auth(reason.clone()));
        }
        if !credentials.username.is_empty() {
            self.bot_name.clone_from(&credentials.username);
        }
        self.connected = true;
        Ok(())
    }

    async fn read_latest(&mut self) -> Result<ChannelMessage, SessionError> {
        if !self.connected {
            return Err(SessionError::NotConnected);
        }
        let now = self.now();
        self.reads.push(now);

        match self.script.pop_front() {
            Some(ScriptStep::Post(message)) => self.latest = Some(message),
            Some(ScriptStep::Silence) => {
                return Err(SessionError::ObservationTimeout(self.read_timeout));
            }
            None => {
                if let Some(f) = self.on_drained.take() {
                    f();
                }
            }
        }

        self.latest
            .clone()
            .ok_or(SessionError::ObservationTimeout(self.read_timeout))
    }

    async fn write(&mut self, text: &str) -> Result<(), SessionError> {
        if !self.connected {
            return Err(SessionError::NotConnected);
        }
        if self.fail_writes {
            return Err(SessionError::Write("channel rejected the message".to_string()));
        }
        self.written.push(text.to_string());
        self.latest = Some(ChannelMessage::new(self.bot_name.clone(), text));
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        self.connected = false;
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_requires_authentication() {
        let mut session = MemorySession::new("mem://test").post("alice", "hi");
        assert_eq!(
            session.read_latest().await.unwrap_err(),
            SessionError::NotConnected
        );
    }

    #[tokio::test]
    async fn test_script_replay_and_echo() {
        let mut session = MemorySession::new("mem://test")
            .post("alice", "!help")
            .silence();
        tokio_test::assert_ok!(
            session
                .authenticate(&Credentials::new("stonks_bot", "pw"))
                .await
        );

        let msg = session.read_latest().await.unwrap();
        assert_eq!(msg.author, "alice");
        assert_eq!(msg.text, "!help");

        assert!(session.read_latest().await.unwrap_err().is_timeout());

        session.write("Bot commands:").await.unwrap();
        let echo = session.read_latest().await.unwrap();
        assert_eq!(echo.author, "stonks_bot");
        assert_eq!(echo.text, "Bot commands:");
    }

    #[tokio::test]
    async fn test_empty_channel_times_out() {
        let mut session = MemorySession::new("mem://test");
        tokio_test::assert_ok!(session.authenticate(&Credentials::default()).await);
        let err = tokio_test::assert_err!(session.read_latest().await);
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_failing_auth_and_close() {
        let mut session = MemorySession::new("mem://test").failing_auth("captcha");
        let err = session
            .authenticate(&Credentials::default())
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::Auth("captcha".to_string()));

        session.close().await.unwrap();
        session.close().await.unwrap();
        assert!(session.is_closed());
    }
}
