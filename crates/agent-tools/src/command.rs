//! Command handler trait definition

use crate::context::CommandContext;
use async_trait::async_trait;

/// Leading character that marks a chat message as a command
pub const COMMAND_MARKER: char = '!';

/// Result of invoking a command handler
///
/// Handlers never write to the channel themselves; the agent loop writes
/// `Replied` and `Errored` text and skips `NoOp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Normal reply
    Replied(String),
    /// User-visible notice for a failure the handler contained
    Errored(String),
    /// Nothing to post
    NoOp,
}

impl Outcome {
    pub fn reply(text: impl Into<String>) -> Self {
        Outcome::Replied(text.into())
    }

    pub fn error(text: impl Into<String>) -> Self {
        Outcome::Errored(text.into())
    }

    /// Text to post, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            Outcome::Replied(text) | Outcome::Errored(text) => Some(text),
            Outcome::NoOp => None,
        }
    }
}

/// A command message split into keyword and positional arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub keyword: String,
    pub arguments: Vec<String>,
}

impl CommandInvocation {
    /// Parse a chat message
    ///
    /// Returns `None` unless the text starts with [`COMMAND_MARKER`]. A bare
    /// marker yields an empty keyword, which matches no handler.
    pub fn parse(text: &str) -> Option<Self> {
        let body = text.strip_prefix(COMMAND_MARKER)?;
        let mut parts = body.split_whitespace().map(str::to_string);
        let keyword = parts.next().unwrap_or_default();
        Some(Self {
            keyword,
            arguments: parts.collect(),
        })
    }
}

/// Trait for chat commands the bot can answer
///
/// A handler is bound to one keyword and must contain its own failures:
/// anything that goes wrong while talking to an external service is turned
/// into an [`Outcome::Errored`] notice rather than propagated.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Keyword typed after the marker, e.g. `info` for `!info AAPL`
    ///
    /// Must be unique within a [`CommandRegistry`](crate::CommandRegistry).
    fn keyword(&self) -> &str;

    /// One-line description shown by `!help`
    fn help_text(&self) -> &str;

    /// Run the command with the positional arguments that followed the keyword
    async fn invoke(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Outcome;
}
