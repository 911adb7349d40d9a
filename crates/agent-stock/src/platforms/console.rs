//! Terminal channel: stdin is the chat, stdout is where the bot posts
//!
//! Lines of the form `name: text` are attributed to `name`, anything else
//! to the local user. Like a rendered chat window, the session only ever
//! exposes the most recent message.

use agent_core::{ChannelMessage, ChannelSession, Credentials, SessionError};
use agent_runtime::ShutdownHandle;
use async_trait::async_trait;
use std::io::BufRead;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, info};

const DEFAULT_BOT_NAME: &str = "bot";
const DEFAULT_USER_NAME: &str = "you";

/// [`ChannelSession`] over the process's standard streams
pub struct ConsoleSession {
    url: String,
    read_timeout: Duration,
    user_name: String,
    bot_name: String,
    stop_on_eof: Option<ShutdownHandle>,
    lines: Option<mpsc::Receiver<String>>,
    latest: Option<ChannelMessage>,
}

impl ConsoleSession {
    pub fn new(url: impl Into<String>, read_timeout: Duration) -> Self {
        Self {
            url: url.into(),
            read_timeout,
            user_name: std::env::var("USER").unwrap_or_else(|_| DEFAULT_USER_NAME.to_string()),
            bot_name: DEFAULT_BOT_NAME.to_string(),
            stop_on_eof: None,
            lines: None,
            latest: None,
        }
    }

    /// Request a graceful stop once stdin is exhausted
    pub fn stop_on_eof(mut self, shutdown: ShutdownHandle) -> Self {
        self.stop_on_eof = Some(shutdown);
        self
    }

    fn observe(&mut self, line: &str) -> ChannelMessage {
        let message = match split_author(line) {
            Some((author, text)) => ChannelMessage::new(author, text),
            None => ChannelMessage::new(self.user_name.clone(), line.trim()),
        };
        self.latest = Some(message.clone());
        message
    }

    fn input_closed(&mut self) {
        self.lines = None;
        if let Some(shutdown) = &self.stop_on_eof {
            info!("Console input closed, stopping");
            shutdown.stop();
        }
    }
}

/// `alice: !info AAPL` -> `("alice", "!info AAPL")`
fn split_author(line: &str) -> Option<(&str, &str)> {
    let (author, text) = line.split_once(':')?;
    let author = author.trim();
    if author.is_empty() || author.contains(char::is_whitespace) || author.starts_with('!') {
        return None;
    }
    Some((author, text.trim()))
}

/// Blocking stdin reads live on a plain thread so they never hold up the
/// runtime's shutdown
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(32);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

#[async_trait]
impl ChannelSession for ConsoleSession {
    fn channel_url(&self) -> &str {
        &self.url
    }

    async fn authenticate(&mut self, credentials: &Credentials) -> Result<(), SessionError> {
        if !credentials.username.is_empty() {
            self.bot_name.clone_from(&credentials.username);
        }
        if self.lines.is_none() {
            self.lines = Some(spawn_stdin_reader());
        }
        info!(channel = %self.url, bot = %self.bot_name, "Console session ready");
        Ok(())
    }

    async fn read_latest(&mut self) -> Result<ChannelMessage, SessionError> {
        let Some(lines) = self.lines.as_mut() else {
            return self
                .latest
                .clone()
                .ok_or(SessionError::ObservationTimeout(self.read_timeout));
        };

        // Anything typed since the last poll; only the newest line matters
        let mut newest = None;
        let mut closed = false;
        loop {
            match lines.try_recv() {
                Ok(line) => newest = Some(line),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    closed = true;
                    break;
                }
            }
        }

        if newest.is_none() && !closed && self.latest.is_none() {
            match tokio::time::timeout(self.read_timeout, lines.recv()).await {
                Ok(Some(line)) => newest = Some(line),
                Ok(None) => closed = true,
                Err(_) => {}
            }
        }

        if closed {
            self.input_closed();
        }

        match newest {
            Some(line) => {
                let message = self.observe(&line);
                debug!(author = %message.author, "Console message");
                Ok(message)
            }
            None => self
                .latest
                .clone()
                .ok_or(SessionError::ObservationTimeout(self.read_timeout)),
        }
    }

    async fn write(&mut self, text: &str) -> Result<(), SessionError> {
        if self.lines.is_none() && self.latest.is_none() {
            return Err(SessionError::NotConnected);
        }

        let mut stdout = tokio::io::stdout();
        let rendered = format!("{}: {text}\n", self.bot_name);
        stdout
            .write_all(rendered.as_bytes())
            .await
            .map_err(|e| SessionError::Write(e.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|e| SessionError::Write(e.to_string()))?;

        self.latest = Some(ChannelMessage::new(self.bot_name.clone(), text));
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        // Dropping the receiver ends the reader thread on its next line
        self.lines = None;
        Ok(())
    }
}
